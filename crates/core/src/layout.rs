//! Coordinate correction for the slides the design-tool export broke.
//!
//! Target rectangles were measured on the 4000x2250 px reference images
//! (400 px = 1") and are stated here in inches. Planning is pure: `plan`
//! maps a slide's shapes to placements, `apply` writes them.

use crate::classify::{self, PracticeColumns};
use crate::config::TextHeightPolicy;
use crate::error::{Error, Result};
use crate::types::{Deck, Geometry, Shape, Slide};
use crate::units::inches_to_emu;
use serde::{Deserialize, Serialize};

/// A target rectangle in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Same position with a different size.
    pub const fn with_size(self, width: f64, height: f64) -> Self {
        Self::new(self.left, self.top, width, height)
    }

    pub fn to_geometry(&self) -> Geometry {
        Geometry::from_inches(self.left, self.top, self.width, self.height)
    }
}

// Slide 18: Take It Further (two text columns).
pub const TAKE_IT_FURTHER_TITLE: Rect = Rect::new(0.2, 0.15, 9.6, 0.9);
pub const TAKE_IT_FURTHER_LEFT: Rect = Rect::new(0.2, 1.25, 4.6, 4.0);
pub const TAKE_IT_FURTHER_RIGHT: Rect = Rect::new(5.2, 1.25, 4.6, 4.0);

// Slide 9: Beats, Bars & Phrases.
pub const BEATS_TITLE: Rect = Rect::new(0.2, 0.15, 9.6, 0.8);
pub const BEATS_CONTENT: Rect = Rect::new(0.2, 1.0, 4.0, 2.8);
pub const BEATS_SONG_BODY: Rect = Rect::new(4.2, 0.95, 5.6, 2.2);
pub const BEATS_GRID: Rect = Rect::new(0.8, 4.0, 8.4, 1.2);
pub const BEATS_SINGLE_DIAGRAM: Rect = Rect::new(4.2, 0.95, 5.6, 3.5);

// Slide 2: Who Am I?
pub const WHO_AM_I_TITLE: Rect = Rect::new(0.2, 0.15, 9.6, 0.8);
pub const WHO_AM_I_CONTENT: Rect = Rect::new(0.2, 1.1, 4.4, 1.8);

/// DJ photo: right side below the title, aspect preserved.
pub const DJ_PHOTO: PhotoSlot = PhotoSlot {
    left: 5.0,
    top: 0.8,
    target_width: 5.0,
    max_height: 4.8,
};

/// Meme character: bottom left, aspect preserved.
pub const MEME: PhotoSlot = PhotoSlot {
    left: 0.3,
    top: 3.0,
    target_width: 2.0,
    max_height: 2.5,
};

// Generic text left, image right.
pub const FULL_WIDTH_TITLE: Rect = Rect::new(0.0, 0.15, 10.0, 0.85);
pub const TEXT_LEFT_CONTENT: Rect = Rect::new(0.2, 1.1, 4.4, 2.2);
pub const IMAGE_RIGHT: Rect = Rect::new(4.5, 0.9, 5.5, 4.7);

// Slide 12: Exporting to USB.
pub const USB_CONTENT: Rect = Rect::new(0.2, 1.2, 5.5, 2.5);
pub const USB_DRIVE: Rect = Rect::new(5.5, 1.0, 4.4, 4.4);
pub const USB_SCREENSHOT: Rect = Rect::new(0.9, 3.8, 4.6, 0.75);

// Slide 17: Practice & Next Steps.
pub const PRACTICE_TITLE: Rect = Rect::new(0.0, 0.15, 10.0, 0.75);
pub const PRACTICE_LEFT: Rect = Rect::new(0.5, 1.0, 4.0, 1.0);
pub const PRACTICE_RIGHT: Rect = Rect::new(5.0, 1.0, 4.5, 1.0);
pub const PRACTICE_SINGLE: Rect = Rect::new(0.5, 1.0, 9.0, 1.2);
pub const PRACTICE_IMAGE: Rect = Rect::new(0.5, 2.0, 9.0, 3.5);

/// Anchor and size limits for a photo whose aspect ratio must survive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoSlot {
    pub left: f64,
    pub top: f64,
    pub target_width: f64,
    pub max_height: f64,
}

impl PhotoSlot {
    /// Rectangle for a photo with the given aspect ratio.
    pub fn fit(&self, aspect: f64) -> Rect {
        let (width, height) = fit_preserving_aspect(aspect, self.target_width, self.max_height);
        Rect::new(self.left, self.top, width, height)
    }

    /// Rectangle at the full target width with only the height capped.
    ///
    /// Used for a lone photo; the ratio is lost whenever the cap applies.
    pub fn fit_width(&self, aspect: f64) -> Rect {
        let height = (self.target_width / aspect).min(self.max_height);
        Rect::new(self.left, self.top, self.target_width, height)
    }
}

/// Size a box of the given aspect ratio to `target_width`, capping its height.
///
/// When the height hits `max_height` the width is recomputed from it, so
/// the ratio stays exact either way.
pub fn fit_preserving_aspect(aspect: f64, target_width: f64, max_height: f64) -> (f64, f64) {
    let height = target_width / aspect;
    if height >= max_height {
        (max_height * aspect, max_height)
    } else {
        (target_width, height)
    }
}

/// A correction procedure for one slide of the deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum SlideFix {
    /// Slide 18: two overlapping text columns.
    TwoColumnText,
    /// Slide 9: text next to two diagrams.
    BeatsDiagram,
    /// Slide 2: text, meme character and DJ photo.
    WhoAmI,
    /// Slide 12: text, USB drive and screenshot.
    ExportingToUsb,
    /// Slide 17: two short columns above a wide image.
    PracticeNextSteps,
    /// Any slide with text on the left and one image on the right.
    TextWithImage {
        slide: usize,
        #[serde(default)]
        description: String,
    },
}

impl SlideFix {
    /// The fixes the rebuild applies unless configured otherwise.
    pub fn default_plan() -> Vec<Self> {
        vec![Self::TwoColumnText, Self::BeatsDiagram, Self::WhoAmI]
    }

    /// 1-based number of the slide this fix targets.
    pub fn slide_number(&self) -> usize {
        match self {
            Self::TwoColumnText => 18,
            Self::BeatsDiagram => 9,
            Self::WhoAmI => 2,
            Self::ExportingToUsb => 12,
            Self::PracticeNextSteps => 17,
            Self::TextWithImage { slide, .. } => *slide,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::TwoColumnText => "Two-column text layout",
            Self::BeatsDiagram => "Beats/Bars/Phrases diagram layout",
            Self::WhoAmI => "Who Am I? layout",
            Self::ExportingToUsb => "Exporting to USB layout",
            Self::PracticeNextSteps => "Practice & Next Steps layout",
            Self::TextWithImage { description, .. } => description,
        }
    }
}

/// A shape and the rectangle it should occupy.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Index of the shape on its slide.
    pub shape: usize,

    /// Role the classifier assigned, used for progress output.
    pub role: &'static str,

    pub rect: Rect,
}

impl Placement {
    fn new(shape: usize, role: &'static str, rect: Rect) -> Self {
        Self { shape, role, rect }
    }
}

/// Compute placements for a slide without modifying it.
///
/// Roles the classifier could not fill produce no placement, so their
/// shapes keep whatever geometry they had.
pub fn plan(fix: &SlideFix, shapes: &[Shape]) -> Vec<Placement> {
    let mut out = Vec::new();
    match fix {
        SlideFix::TwoColumnText => {
            let roles = classify::two_column_roles(shapes);
            if let Some(idx) = roles.title {
                out.push(Placement::new(idx, "Title", TAKE_IT_FURTHER_TITLE));
            }
            if let Some(idx) = roles.left {
                out.push(Placement::new(idx, "Left column", TAKE_IT_FURTHER_LEFT));
            }
            if let Some(idx) = roles.right {
                out.push(Placement::new(idx, "Right column", TAKE_IT_FURTHER_RIGHT));
            }
        }
        SlideFix::BeatsDiagram => {
            let roles = classify::diagram_roles(shapes);
            if let Some(idx) = roles.title {
                out.push(Placement::new(idx, "Title", BEATS_TITLE));
            }
            for &idx in &roles.content {
                out.push(Placement::new(idx, "Content text", BEATS_CONTENT));
            }
            match (roles.song_body, roles.beat_grid) {
                (Some(body), Some(grid)) => {
                    out.push(Placement::new(body, "Song-body diagram", BEATS_SONG_BODY));
                    out.push(Placement::new(grid, "16-beat diagram", BEATS_GRID));
                }
                (Some(only), None) => {
                    out.push(Placement::new(only, "Single diagram", BEATS_SINGLE_DIAGRAM));
                }
                _ => {}
            }
        }
        SlideFix::WhoAmI => {
            let roles = classify::photo_roles(shapes);
            if let Some(idx) = roles.title {
                out.push(Placement::new(idx, "Title", WHO_AM_I_TITLE));
            }
            if let Some(idx) = roles.content {
                out.push(Placement::new(idx, "Content text", WHO_AM_I_CONTENT));
            }
            match (roles.dj_photo, roles.meme) {
                (Some(idx), Some(_)) => {
                    let aspect = shapes[idx].geometry.aspect_ratio();
                    out.push(Placement::new(idx, "DJ photo", DJ_PHOTO.fit(aspect)));
                }
                (Some(idx), None) => {
                    let aspect = shapes[idx].geometry.aspect_ratio();
                    out.push(Placement::new(idx, "Single image", DJ_PHOTO.fit_width(aspect)));
                }
                _ => {}
            }
            if let Some(idx) = roles.meme {
                let aspect = shapes[idx].geometry.aspect_ratio();
                out.push(Placement::new(idx, "Meme character", MEME.fit(aspect)));
            }
        }
        SlideFix::TextWithImage { .. } => {
            let roles = classify::text_with_image_roles(shapes);
            if let Some(idx) = roles.title {
                out.push(Placement::new(idx, "Title", FULL_WIDTH_TITLE));
            }
            for &idx in &roles.content {
                out.push(Placement::new(idx, "Content text", TEXT_LEFT_CONTENT));
            }
            if let Some(idx) = roles.image {
                out.push(Placement::new(idx, "Image", IMAGE_RIGHT));
            }
        }
        SlideFix::ExportingToUsb => {
            let roles = classify::usb_roles(shapes);
            if let Some(idx) = roles.title {
                out.push(Placement::new(idx, "Title", FULL_WIDTH_TITLE));
            }
            if let Some(idx) = roles.content {
                out.push(Placement::new(idx, "Content text", USB_CONTENT));
            }
            if let Some(idx) = roles.usb_drive {
                out.push(Placement::new(idx, "USB drive", USB_DRIVE));
            }
            if let Some(idx) = roles.screenshot {
                out.push(Placement::new(idx, "Screenshot", USB_SCREENSHOT));
            }
        }
        SlideFix::PracticeNextSteps => {
            let roles = classify::practice_roles(shapes);
            if let Some(idx) = roles.title {
                out.push(Placement::new(idx, "Title", PRACTICE_TITLE));
            }
            match roles.columns {
                PracticeColumns::Pair { left, right } => {
                    out.push(Placement::new(left, "Left column", PRACTICE_LEFT));
                    out.push(Placement::new(right, "Right column", PRACTICE_RIGHT));
                }
                PracticeColumns::Single(idx) => {
                    out.push(Placement::new(idx, "Content text", PRACTICE_SINGLE));
                }
                PracticeColumns::None => {}
            }
            if let Some(idx) = roles.image {
                out.push(Placement::new(idx, "Equipment image", PRACTICE_IMAGE));
            }
        }
    }
    out
}

/// Overwrite shape geometry with the planned rectangles.
pub fn apply(slide: &mut Slide, placements: &[Placement]) {
    for placement in placements {
        if let Some(shape) = slide.shapes.get_mut(placement.shape) {
            shape.geometry = placement.rect.to_geometry();
        }
    }
}

/// Classify, plan and apply one fix to the deck.
pub fn fix_slide(deck: &mut Deck, fix: &SlideFix) -> Result<Vec<Placement>> {
    let number = fix.slide_number();
    let count = deck.slides.len();
    let slide = deck
        .slide_mut(number)
        .ok_or(Error::SlideNotFound { number, count })?;

    log::info!("FIXING SLIDE {}: {}", number, fix.description());
    let pictures = slide.shapes.iter().filter(|s| s.is_picture()).count();
    let texts = slide.shapes.iter().filter(|s| s.has_text_frame()).count();
    log::info!("  Found {} pictures, {} text shapes", pictures, texts);

    let placements = plan(fix, &slide.shapes);
    if placements.is_empty() {
        log::debug!("  No shapes matched any role on slide {}", number);
    }
    for p in &placements {
        log::info!(
            "  {} at ({:.2}\", {:.2}\"), size={:.2}\"x{:.2}\"",
            p.role,
            p.rect.left,
            p.rect.top,
            p.rect.width,
            p.rect.height
        );
    }
    apply(slide, &placements);
    Ok(placements)
}

/// One text box whose height was clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightFix {
    pub slide: usize,
    pub shape: usize,
    pub old_height_in: f64,
    pub new_height_in: f64,
}

/// Clamp every over-tall text box in the deck to an estimate from its line count.
pub fn clamp_text_heights(deck: &mut Deck, policy: &TextHeightPolicy) -> Vec<HeightFix> {
    let mut fixes = Vec::new();
    for slide in &mut deck.slides {
        for shape in &mut slide.shapes {
            if !shape.has_text_frame() || shape.geometry.height_in() <= policy.trigger_in {
                continue;
            }
            let old_height_in = shape.geometry.height_in();
            let new_height_in = policy.estimate(shape.text_or_empty());
            shape.geometry.height = inches_to_emu(new_height_in);
            if shape.geometry.height_in() != old_height_in {
                log::info!(
                    "  Slide {}: Fixed height {:.2}\" -> {:.2}\"",
                    slide.number,
                    old_height_in,
                    new_height_in
                );
                fixes.push(HeightFix {
                    slide: slide.number,
                    shape: shape.index,
                    old_height_in,
                    new_height_in,
                });
            }
        }
    }
    fixes
}
