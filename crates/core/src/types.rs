//! Domain types for a loaded presentation: slides, shapes and their geometry.

use crate::units::{emu_to_inches, inches_to_emu, SLIDE_HEIGHT_IN, SLIDE_WIDTH_IN};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A presentation held in memory for the lifetime of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    /// Slide width in EMU.
    pub slide_width: i64,

    /// Slide height in EMU.
    pub slide_height: i64,

    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Create an empty deck with the standard 16:9 canvas.
    pub fn new() -> Self {
        Self {
            slide_width: inches_to_emu(SLIDE_WIDTH_IN),
            slide_height: inches_to_emu(SLIDE_HEIGHT_IN),
            slides: Vec::new(),
        }
    }

    /// Add a slide to the deck.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    /// Get a slide by its 1-based number.
    pub fn slide(&self, number: usize) -> Option<&Slide> {
        number.checked_sub(1).and_then(|idx| self.slides.get(idx))
    }

    /// Get a mutable slide by its 1-based number.
    pub fn slide_mut(&mut self, number: usize) -> Option<&mut Slide> {
        number.checked_sub(1).and_then(move |idx| self.slides.get_mut(idx))
    }

    /// Slide size as (width, height) in inches.
    pub fn size_inches(&self) -> (f64, f64) {
        (emu_to_inches(self.slide_width), emu_to_inches(self.slide_height))
    }

    /// Whether any shape on any slide differs from its loaded geometry.
    pub fn is_modified(&self) -> bool {
        self.slides.iter().any(Slide::is_modified)
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

/// A single slide: a view into the deck, never persisted on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    /// 1-based slide number.
    pub number: usize,

    /// Package part holding this slide, e.g. `ppt/slides/slide3.xml`.
    pub part_name: String,

    /// Top-level shapes in enumeration order.
    pub shapes: Vec<Shape>,
}

impl Slide {
    /// Create a new slide with the given number and part name.
    pub fn new(number: usize, part_name: impl Into<String>) -> Self {
        Self {
            number,
            part_name: part_name.into(),
            shapes: Vec::new(),
        }
    }

    /// Append a shape, assigning its enumeration index.
    pub fn add_shape(&mut self, mut shape: Shape) {
        shape.index = self.shapes.len();
        self.shapes.push(shape);
    }

    /// Whether any shape on this slide was moved or resized.
    pub fn is_modified(&self) -> bool {
        self.shapes.iter().any(Shape::is_modified)
    }
}

/// Shape type tag, following the element the shape was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// `p:pic`.
    Picture,
    /// `p:sp`: autoshapes, text boxes and placeholders all carry a text frame.
    TextFrame,
    /// `p:grpSp`.
    Group,
    /// `p:graphicFrame` (tables, charts).
    GraphicFrame,
    /// `p:cxnSp`.
    Connector,
    /// Anything else found directly in the shape tree.
    Other,
}

impl ShapeKind {
    /// Map an element local name to a shape kind.
    pub fn from_element(local_name: &[u8]) -> Option<Self> {
        match local_name {
            b"pic" => Some(Self::Picture),
            b"sp" => Some(Self::TextFrame),
            b"grpSp" => Some(Self::Group),
            b"graphicFrame" => Some(Self::GraphicFrame),
            b"cxnSp" => Some(Self::Connector),
            b"contentPart" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Picture => "PICTURE",
            Self::TextFrame => "TEXT_FRAME",
            Self::Group => "GROUP",
            Self::GraphicFrame => "GRAPHIC_FRAME",
            Self::Connector => "CONNECTOR",
            Self::Other => "OTHER",
        };
        f.write_str(label)
    }
}

/// Position and size of a shape, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl Geometry {
    /// Build a geometry from inch values.
    pub fn from_inches(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left: inches_to_emu(left),
            top: inches_to_emu(top),
            width: inches_to_emu(width),
            height: inches_to_emu(height),
        }
    }

    pub fn left_in(&self) -> f64 {
        emu_to_inches(self.left)
    }

    pub fn top_in(&self) -> f64 {
        emu_to_inches(self.top)
    }

    pub fn width_in(&self) -> f64 {
        emu_to_inches(self.width)
    }

    pub fn height_in(&self) -> f64 {
        emu_to_inches(self.height)
    }

    /// Width divided by height; 1.0 for a zero-height box.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height > 0 {
            self.width_in() / self.height_in()
        } else {
            1.0
        }
    }

    /// Bounding-box area in square inches.
    pub fn area_in2(&self) -> f64 {
        self.width_in() * self.height_in()
    }
}

/// The `p:ph` reference of a placeholder shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    /// `type` attribute, `obj` when absent.
    pub kind: String,

    /// `idx` attribute, 0 when absent.
    pub idx: u32,
}

impl Placeholder {
    pub fn new(kind: impl Into<String>, idx: u32) -> Self {
        Self {
            kind: kind.into(),
            idx,
        }
    }

    /// Placeholder type a slide master uses for this kind.
    ///
    /// Masters only carry title, body and the footer family, so content
    /// kinds collapse onto `body` and a centred title onto `title`.
    pub fn master_kind(&self) -> &str {
        match self.kind.as_str() {
            "ctrTitle" => "title",
            "body" | "chart" | "clipArt" | "dgm" | "media" | "obj" | "pic" | "subTitle"
            | "tbl" => "body",
            other => other,
        }
    }
}

/// A positioned, sized element on a slide.
///
/// The shape universe of a slide is fixed by the source file: shapes are
/// moved and resized, never created or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    /// 0-based position in the slide's shape tree.
    pub index: usize,

    /// `id` attribute of the shape's non-visual properties.
    pub id: u32,

    /// `name` attribute of the shape's non-visual properties.
    pub name: String,

    pub kind: ShapeKind,

    /// Text of the shape's text frame; `None` when it has none.
    ///
    /// Paragraphs are joined with `\n`, soft line breaks appear as `\u{b}`.
    pub text: Option<String>,

    /// Current geometry; fix procedures overwrite this.
    pub geometry: Geometry,

    /// Whether the shape carries its own `a:xfrm` element in the XML,
    /// complete or not.
    pub has_xfrm: bool,

    /// Placeholder reference; geometry missing from the shape itself was
    /// taken from the matching layout or master placeholder.
    pub placeholder: Option<Placeholder>,

    /// Geometry as read from the file.
    pub loaded: Geometry,
}

impl Shape {
    /// Create a shape whose current and loaded geometry are the same.
    pub fn new(kind: ShapeKind, name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            index: 0,
            id: 0,
            name: name.into(),
            kind,
            text: None,
            geometry,
            has_xfrm: true,
            placeholder: None,
            loaded: geometry,
        }
    }

    /// Attach text, turning this into a text-bearing shape.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn has_text_frame(&self) -> bool {
        self.kind == ShapeKind::TextFrame
    }

    pub fn is_picture(&self) -> bool {
        self.kind == ShapeKind::Picture
    }

    /// Text content, empty when the shape has no text frame.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Whether the geometry differs from what was loaded.
    pub fn is_modified(&self) -> bool {
        self.geometry != self.loaded
    }
}
