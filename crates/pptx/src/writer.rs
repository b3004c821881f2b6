//! Writing corrected geometry back into the PPTX package.
//!
//! Only slides with modified shapes are re-serialised. Inside those, only
//! the `a:off`/`a:ext` attributes of the modified shapes' own transforms
//! change; every other event is copied through as read.

use crate::parser::{is_own_xfrm, local_name, Part, PptxDocument};
use deck_core::{Error, Geometry, Result, Slide};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// New geometry for one top-level shape of a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapePatch {
    pub geometry: Geometry,
    /// Whether the shape already has a transform to rewrite.
    pub has_xfrm: bool,
}

impl PptxDocument {
    /// Write the package to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the package, patching the slides whose shapes were modified.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let slides: HashMap<&str, &Slide> = self
            .deck
            .slides
            .iter()
            .filter(|s| s.is_modified())
            .map(|s| (s.part_name.as_str(), s))
            .collect();

        let mut zip = ZipWriter::new(writer);

        // Entry timestamps are carried over so that saving the same model
        // twice yields the same bytes.
        for part in &self.parts {
            let options = FileOptions::default()
                .compression_method(entry_compression(part.compression))
                .last_modified_time(part.modified);
            if part.is_dir {
                zip.add_directory(part.name.as_str(), options)
                    .map_err(|e| Error::Zip(format!("Failed to add '{}': {}", part.name, e)))?;
                continue;
            }
            zip.start_file(part.name.as_str(), options)
                .map_err(|e| Error::Zip(format!("Failed to add '{}': {}", part.name, e)))?;
            match slides.get(part.name.as_str()) {
                Some(slide) => {
                    let patched = patch_part(part, slide)?;
                    log::debug!("Rewrote geometry in {}", part.name);
                    zip.write_all(&patched)?;
                }
                None => zip.write_all(&part.data)?,
            }
        }

        zip.finish()
            .map_err(|e| Error::Zip(format!("Failed to finish archive: {}", e)))?;
        Ok(())
    }
}

/// Keep the source compression where the writer supports it.
fn entry_compression(method: CompressionMethod) -> CompressionMethod {
    match method {
        CompressionMethod::Stored => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
    }
}

fn patch_part(part: &Part, slide: &Slide) -> Result<Vec<u8>> {
    let xml = std::str::from_utf8(&part.data)
        .map_err(|e| Error::Xml(format!("'{}' is not UTF-8: {}", part.name, e)))?;
    let patches: HashMap<usize, ShapePatch> = slide
        .shapes
        .iter()
        .filter(|s| s.is_modified())
        .map(|s| {
            (
                s.index,
                ShapePatch {
                    geometry: s.geometry,
                    has_xfrm: s.has_xfrm,
                },
            )
        })
        .collect();
    patch_slide_xml(xml, &patches)
}

/// Patch state of the top-level shape currently open.
#[derive(Debug)]
struct OpenShape {
    depth: usize,
    patch: Option<ShapePatch>,
    xfrm_depth: Option<usize>,
    xfrm_done: bool,
    wrote_off: bool,
    wrote_ext: bool,
}

impl OpenShape {
    /// Geometry to write when the element at `depth` is a child of this
    /// shape's own transform and the shape is patched.
    fn xfrm_child_patch(&self, depth: usize) -> Option<Geometry> {
        let patch = self.patch?;
        (self.xfrm_depth.map(|d| d + 1) == Some(depth)).then_some(patch.geometry)
    }
}

/// Rewrite the geometry of the given top-level shapes (by enumeration index).
///
/// A patched shape ends up with exactly one transform: an existing one is
/// rewritten and completed, a missing one is inserted.
pub fn patch_slide_xml(xml: &str, patches: &HashMap<usize, ShapePatch>) -> Result<Vec<u8>> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + 256));

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut ordinal = 0usize;
    let mut current: Option<OpenShape> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::Xml(format!(
                "Error at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(e) => {
                let local = local_name(e.name().as_ref()).to_vec();
                let depth = stack.len();
                let parent = stack.last().map(Vec::as_slice).unwrap_or(b"");
                begin_shape(&local, depth, parent, patches, &mut ordinal, &mut current);
                fill_before(&mut writer, &local, depth, &mut current)?;

                let rewritten = rewrite_start(&e, &local, depth, parent, &mut current);
                write(&mut writer, Event::Start(rewritten.unwrap_or(e)))?;

                if let Some(geometry) = missing_xfrm(&local, depth, &current) {
                    write_xfrm(&mut writer, &geometry)?;
                }
                stack.push(local);
            }
            Event::Empty(e) => {
                let local = local_name(e.name().as_ref()).to_vec();
                let depth = stack.len();
                let parent = stack.last().map(Vec::as_slice).unwrap_or(b"");
                begin_shape(&local, depth, parent, patches, &mut ordinal, &mut current);
                fill_before(&mut writer, &local, depth, &mut current)?;

                let rewritten = rewrite_start(&e, &local, depth, parent, &mut current);
                let opened_xfrm = current
                    .as_ref()
                    .is_some_and(|s| s.xfrm_depth == Some(depth));
                let empty_xfrm_patch = current
                    .as_ref()
                    .and_then(|s| s.patch)
                    .filter(|_| opened_xfrm);

                if let Some(geometry) = missing_xfrm(&local, depth, &current) {
                    // Expand `<p:spPr/>` so the new transform can be its first child.
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    write(&mut writer, Event::Start(e.clone()))?;
                    write_xfrm(&mut writer, &geometry)?;
                    write(&mut writer, Event::End(BytesEnd::new(name)))?;
                } else if let Some(patch) = empty_xfrm_patch {
                    // Expand `<a:xfrm/>` so it can hold the offset and extent.
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    write(&mut writer, Event::Start(e.clone()))?;
                    write_off(&mut writer, &patch.geometry)?;
                    write_ext(&mut writer, &patch.geometry)?;
                    write(&mut writer, Event::End(BytesEnd::new(name)))?;
                } else {
                    write(&mut writer, Event::Empty(rewritten.unwrap_or(e)))?;
                }

                if let Some(shape) = current.as_mut() {
                    if opened_xfrm {
                        shape.xfrm_depth = None;
                        shape.xfrm_done = true;
                    }
                }
                if current.as_ref().is_some_and(|s| s.depth == depth) {
                    current = None;
                }
            }
            Event::End(e) => {
                stack.pop();
                let depth = stack.len();
                if let Some(shape) = current.as_mut() {
                    if shape.xfrm_depth == Some(depth) {
                        complete_xfrm(&mut writer, shape)?;
                        shape.xfrm_depth = None;
                        shape.xfrm_done = true;
                    }
                }
                write(&mut writer, Event::End(e))?;
                if current.as_ref().is_some_and(|s| s.depth == depth) {
                    current = None;
                }
            }
            Event::Eof => break,
            other => write(&mut writer, other)?,
        }
    }

    Ok(writer.into_inner())
}

/// Open a top-level shape if this element is a child of the shape tree.
fn begin_shape(
    local: &[u8],
    depth: usize,
    parent: &[u8],
    patches: &HashMap<usize, ShapePatch>,
    ordinal: &mut usize,
    current: &mut Option<OpenShape>,
) {
    if current.is_some() || parent != b"spTree" {
        return;
    }
    if deck_core::ShapeKind::from_element(local).is_none() {
        return;
    }
    *current = Some(OpenShape {
        depth,
        patch: patches.get(&*ordinal).copied(),
        xfrm_depth: None,
        xfrm_done: false,
        wrote_off: false,
        wrote_ext: false,
    });
    *ordinal += 1;
}

/// Geometry of a new transform, when this element is the properties
/// element of a patched shape that has none.
fn missing_xfrm(local: &[u8], depth: usize, current: &Option<OpenShape>) -> Option<Geometry> {
    let shape = current.as_ref()?;
    let patch = shape.patch?;
    let is_props = depth == shape.depth + 1 && matches!(local, b"spPr" | b"grpSpPr");
    (!patch.has_xfrm && is_props).then_some(patch.geometry)
}

/// Write the offset and extent a transform lacks before a later child.
///
/// `a:off` comes first and `a:ext` second, ahead of `a:chOff`/`a:chExt`.
fn fill_before(
    writer: &mut Writer<Vec<u8>>,
    local: &[u8],
    depth: usize,
    current: &mut Option<OpenShape>,
) -> Result<()> {
    let Some(shape) = current.as_mut() else {
        return Ok(());
    };
    let Some(geometry) = shape.xfrm_child_patch(depth) else {
        return Ok(());
    };
    if local != b"off" && !shape.wrote_off {
        write_off(writer, &geometry)?;
        shape.wrote_off = true;
    }
    if !matches!(local, b"off" | b"ext") && !shape.wrote_ext {
        write_ext(writer, &geometry)?;
        shape.wrote_ext = true;
    }
    Ok(())
}

/// Write whatever a patched transform still lacks before it closes.
fn complete_xfrm(writer: &mut Writer<Vec<u8>>, shape: &mut OpenShape) -> Result<()> {
    let Some(patch) = shape.patch else {
        return Ok(());
    };
    if !shape.wrote_off {
        write_off(writer, &patch.geometry)?;
        shape.wrote_off = true;
    }
    if !shape.wrote_ext {
        write_ext(writer, &patch.geometry)?;
        shape.wrote_ext = true;
    }
    Ok(())
}

/// Replacement for an opening element of a patched shape, if it needs one.
fn rewrite_start(
    e: &BytesStart<'_>,
    local: &[u8],
    depth: usize,
    parent: &[u8],
    current: &mut Option<OpenShape>,
) -> Option<BytesStart<'static>> {
    let shape = current.as_mut()?;

    if local == b"xfrm"
        && !shape.xfrm_done
        && shape.xfrm_depth.is_none()
        && is_own_xfrm(shape.depth, depth, parent)
    {
        shape.xfrm_depth = Some(depth);
        return None;
    }

    let g = shape.xfrm_child_patch(depth)?;
    match local {
        b"off" => {
            shape.wrote_off = true;
            Some(with_attributes(e, &[("x", g.left), ("y", g.top)]))
        }
        b"ext" => {
            shape.wrote_ext = true;
            Some(with_attributes(e, &[("cx", g.width), ("cy", g.height)]))
        }
        _ => None,
    }
}

/// Copy an element, replacing the named attributes.
fn with_attributes(e: &BytesStart<'_>, values: &[(&str, i64)]) -> BytesStart<'static> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut out = BytesStart::new(name);
    for attr in e.attributes().flatten() {
        let replaced = values
            .iter()
            .find(|(key, _)| attr.key.as_ref() == key.as_bytes());
        match replaced {
            Some((key, value)) => out.push_attribute((*key, value.to_string().as_str())),
            None => out.push_attribute(attr),
        }
    }
    out.into_owned()
}

fn write_off(writer: &mut Writer<Vec<u8>>, g: &Geometry) -> Result<()> {
    let mut off = BytesStart::new("a:off");
    off.push_attribute(("x", g.left.to_string().as_str()));
    off.push_attribute(("y", g.top.to_string().as_str()));
    write(writer, Event::Empty(off))
}

fn write_ext(writer: &mut Writer<Vec<u8>>, g: &Geometry) -> Result<()> {
    let mut ext = BytesStart::new("a:ext");
    ext.push_attribute(("cx", g.width.to_string().as_str()));
    ext.push_attribute(("cy", g.height.to_string().as_str()));
    write(writer, Event::Empty(ext))
}

fn write_xfrm(writer: &mut Writer<Vec<u8>>, g: &Geometry) -> Result<()> {
    write(writer, Event::Start(BytesStart::new("a:xfrm")))?;
    write_off(writer, g)?;
    write_ext(writer, g)?;
    write(writer, Event::End(BytesEnd::new("a:xfrm")))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Xml(format!("Failed to write XML: {}", e)))
}
