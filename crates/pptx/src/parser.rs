//! PPTX package loading and slide shape extraction.

use crate::placeholder::PlaceholderMap;
use deck_core::{Deck, Error, Geometry, Placeholder, Result, Shape, ShapeKind, Slide};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::{CompressionMethod, DateTime, ZipArchive};

pub(crate) const PRESENTATION_PART: &str = "ppt/presentation.xml";
pub(crate) const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

/// One entry of the ZIP package, held in memory.
#[derive(Debug, Clone)]
pub(crate) struct Part {
    pub(crate) name: String,
    pub(crate) data: Vec<u8>,
    pub(crate) is_dir: bool,
    pub(crate) compression: CompressionMethod,
    pub(crate) modified: DateTime,
}

/// A PPTX package loaded into memory together with its shape model.
#[derive(Debug, Clone)]
pub struct PptxDocument {
    pub(crate) parts: Vec<Part>,
    pub(crate) deck: Deck,
}

impl PptxDocument {
    /// Open a PPTX file from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a PPTX package from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| Error::Zip(format!("Failed to open ZIP: {}", e)))?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::Zip(format!("Failed to read entry {}: {}", i, e)))?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            parts.push(Part {
                name: file.name().to_string(),
                data,
                is_dir: file.is_dir(),
                compression: file.compression(),
                modified: file.last_modified(),
            });
        }

        let deck = parse_deck(&parts)?;
        Ok(Self { parts, deck })
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn deck_mut(&mut self) -> &mut Deck {
        &mut self.deck
    }

    /// Names of all parts in archive order.
    pub fn part_names(&self) -> Vec<&str> {
        self.parts.iter().map(|p| p.name.as_str()).collect()
    }

    /// Raw bytes of a part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }
}

/// Read a part as UTF-8 text.
pub(crate) fn part_text<'a>(parts: &'a [Part], name: &str) -> Result<&'a str> {
    optional_part_text(parts, name)?.ok_or_else(|| Error::MissingPart(name.to_string()))
}

/// Read a part as UTF-8 text, `None` when the package lacks it.
pub(crate) fn optional_part_text<'a>(parts: &'a [Part], name: &str) -> Result<Option<&'a str>> {
    let Some(part) = parts.iter().find(|p| p.name == name) else {
        return Ok(None);
    };
    std::str::from_utf8(&part.data)
        .map(Some)
        .map_err(|e| Error::Xml(format!("'{}' is not UTF-8: {}", name, e)))
}

/// Relationships part of a package part, e.g. `ppt/slides/_rels/slide1.xml.rels`.
fn rels_part_name(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// First part `part` relates to with a relationship type ending in `/<kind>`.
pub(crate) fn related_part(parts: &[Part], part: &str, kind: &str) -> Result<Option<String>> {
    let Some(xml) = optional_part_text(parts, &rels_part_name(part))? else {
        return Ok(None);
    };
    let suffix = format!("/{}", kind);
    Ok(parse_relationships(xml)?
        .into_iter()
        .find(|r| r.rel_type.ends_with(&suffix))
        .map(|r| resolve_target(part, &r.target)))
}

/// Build the shape model for every slide in presentation order.
fn parse_deck(parts: &[Part]) -> Result<Deck> {
    let presentation = parse_presentation(part_text(parts, PRESENTATION_PART)?)?;
    let rels = parse_relationships(part_text(parts, PRESENTATION_RELS_PART)?)?;
    let slide_paths = slide_order(&presentation, &rels);

    let mut deck = Deck::new();
    if let Some((cx, cy)) = presentation.slide_size {
        deck.slide_width = cx;
        deck.slide_height = cy;
    }

    let mut layouts: HashMap<String, PlaceholderMap> = HashMap::new();
    for (idx, path) in slide_paths.iter().enumerate() {
        let layout = match related_part(parts, path, "slideLayout")? {
            Some(name) => Some(match layouts.entry(name) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => {
                    let map = PlaceholderMap::for_layout(parts, e.key())?;
                    e.insert(map)
                }
            }),
            None => None,
        };

        let mut slide = Slide::new(idx + 1, path.clone());
        for raw in extract_raw_shapes(part_text(parts, path)?)? {
            let base = match (&raw.shape.placeholder, &layout) {
                (Some(ph), Some(layout)) => layout.for_slide(ph),
                _ => None,
            };
            slide.add_shape(raw.into_shape(base));
        }
        log::debug!("{}: {} shapes", path, slide.shapes.len());
        deck.add_slide(slide);
    }
    Ok(deck)
}

/// What the deck needs from `ppt/presentation.xml`.
#[derive(Debug, Default)]
struct PresentationInfo {
    /// Relationship ids of `p:sldId` entries, in presentation order.
    slide_rel_ids: Vec<String>,
    slide_size: Option<(i64, i64)>,
}

fn parse_presentation(xml: &str) -> Result<PresentationInfo> {
    let mut info = PresentationInfo::default();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"sldId" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref().ends_with(b":id") {
                                info.slide_rel_ids
                                    .push(String::from_utf8_lossy(&attr.value).to_string());
                            }
                        }
                    }
                    b"sldSz" => {
                        let cx = attr_i64(e, b"cx");
                        let cy = attr_i64(e, b"cy");
                        if let (Some(cx), Some(cy)) = (cx, cy) {
                            info.slide_size = Some((cx, cy));
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!("Error parsing presentation: {}", e)));
            }
            _ => {}
        }
    }
    Ok(info)
}

/// A package relationship from a `.rels` part.
#[derive(Debug, Clone)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut rels = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut rel = Relationship {
                    id: String::new(),
                    rel_type: String::new(),
                    target: String::new(),
                };
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"Id" => rel.id = value,
                        b"Type" => rel.rel_type = value,
                        b"Target" => rel.target = value,
                        _ => {}
                    }
                }
                rels.push(rel);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!("Error parsing relationships: {}", e)));
            }
            _ => {}
        }
    }
    Ok(rels)
}

fn is_slide_relationship(rel_type: &str) -> bool {
    rel_type.ends_with("/slide")
}

/// Resolve a relationship target of `source` to a part name.
///
/// Relative targets are taken from the source part's directory, with `.`
/// and `..` segments folded.
fn resolve_target(source: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match source.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Slide part names in presentation order.
///
/// Follows `p:sldIdLst`; when that list is absent, falls back to the
/// numbering of the slide relationships.
fn slide_order(presentation: &PresentationInfo, rels: &[Relationship]) -> Vec<String> {
    let by_id: HashMap<&str, &Relationship> = rels
        .iter()
        .filter(|r| is_slide_relationship(&r.rel_type))
        .map(|r| (r.id.as_str(), r))
        .collect();

    if !presentation.slide_rel_ids.is_empty() {
        return presentation
            .slide_rel_ids
            .iter()
            .filter_map(|id| {
                let rel = by_id.get(id.as_str());
                if rel.is_none() {
                    log::warn!("Slide relationship {} not found", id);
                }
                rel.map(|r| resolve_target(PRESENTATION_PART, &r.target))
            })
            .collect();
    }

    let mut slides: Vec<(String, Option<usize>)> = rels
        .iter()
        .filter(|r| is_slide_relationship(&r.rel_type))
        .map(|r| {
            let order_num = extract_slide_number(&r.target).or_else(|| extract_slide_number(&r.id));
            (resolve_target(PRESENTATION_PART, &r.target), order_num)
        })
        .collect();

    slides.sort_by(|a, b| match (a.1, b.1) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    slides.into_iter().map(|(path, _)| path).collect()
}

/// Shape under construction while its element is open.
#[derive(Debug)]
struct ShapeBuilder {
    kind: ShapeKind,
    /// Stack depth of the shape element itself.
    depth: usize,
    id: u32,
    name: Option<String>,
    /// Stack depth of the shape's own transform while it is open.
    xfrm_depth: Option<usize>,
    xfrm_done: bool,
    /// Whether the shape has its own transform element, complete or not.
    has_xfrm: bool,
    placeholder: Option<Placeholder>,
    off: Option<(i64, i64)>,
    ext: Option<(i64, i64)>,
    in_text_body: bool,
    paragraphs: usize,
    text: String,
}

impl ShapeBuilder {
    fn new(kind: ShapeKind, depth: usize) -> Self {
        Self {
            kind,
            depth,
            id: 0,
            name: None,
            xfrm_depth: None,
            xfrm_done: false,
            has_xfrm: false,
            placeholder: None,
            off: None,
            ext: None,
            in_text_body: false,
            paragraphs: 0,
            text: String::new(),
        }
    }

    fn finish(self) -> RawShape {
        let mut shape = Shape::new(self.kind, self.name.unwrap_or_default(), Geometry::default());
        shape.id = self.id;
        shape.has_xfrm = self.has_xfrm;
        shape.placeholder = self.placeholder;
        if self.kind == ShapeKind::TextFrame {
            shape.text = Some(self.text);
        }
        RawShape {
            shape,
            off: self.off,
            ext: self.ext,
        }
    }
}

/// A shape as read from its own part, before placeholder inheritance.
#[derive(Debug, Clone)]
pub(crate) struct RawShape {
    pub(crate) shape: Shape,
    off: Option<(i64, i64)>,
    ext: Option<(i64, i64)>,
}

impl RawShape {
    /// Own offset and extent, each taken from `base` when the shape lacks it.
    fn filled(&self, base: Option<Geometry>) -> (Option<(i64, i64)>, Option<(i64, i64)>) {
        let off = self.off.or_else(|| base.map(|g| (g.left, g.top)));
        let ext = self.ext.or_else(|| base.map(|g| (g.width, g.height)));
        (off, ext)
    }

    /// Geometry once `base` fills the gaps; `None` while still incomplete.
    pub(crate) fn complete_geometry(&self, base: Option<Geometry>) -> Option<Geometry> {
        match self.filled(base) {
            (Some((left, top)), Some((width, height))) => Some(Geometry {
                left,
                top,
                width,
                height,
            }),
            _ => None,
        }
    }

    /// The finished shape. Whatever neither the shape nor `base` provides is zero.
    pub(crate) fn into_shape(self, base: Option<Geometry>) -> Shape {
        let (off, ext) = self.filled(base);
        let (left, top) = off.unwrap_or((0, 0));
        let (width, height) = ext.unwrap_or((0, 0));
        let geometry = Geometry {
            left,
            top,
            width,
            height,
        };
        let mut shape = self.shape;
        shape.geometry = geometry;
        shape.loaded = geometry;
        shape
    }
}

/// Whether an element at `depth` whose parent is `parent` is the shape's own transform.
pub(crate) fn is_own_xfrm(shape_depth: usize, depth: usize, parent: &[u8]) -> bool {
    (depth == shape_depth + 1)
        || (depth == shape_depth + 2 && matches!(parent, b"spPr" | b"grpSpPr"))
}

/// Extract the top-level shapes of a slide's shape tree, without inheritance.
pub(crate) fn extract_shapes_from_xml(xml_content: &str) -> Result<Vec<Shape>> {
    Ok(extract_raw_shapes(xml_content)?
        .into_iter()
        .map(|raw| raw.into_shape(None))
        .collect())
}

/// Extract the top-level shapes of a slide, layout or master shape tree.
pub(crate) fn extract_raw_shapes(xml_content: &str) -> Result<Vec<RawShape>> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<ShapeBuilder> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref()).to_vec();
                open_element(e, &local, &stack, &mut current, false);
                stack.push(local);
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                let local = local_name(name.as_ref()).to_vec();
                open_element(e, &local, &stack, &mut current, true);
                if current.as_ref().is_some_and(|b| b.depth == stack.len()) {
                    if let Some(builder) = current.take() {
                        shapes.push(builder.finish());
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(builder) = current.as_mut() {
                    if builder.in_text_body
                        && stack.last().map(Vec::as_slice) == Some(b"t".as_slice())
                    {
                        let text = e
                            .unescape()
                            .map_err(|err| Error::Xml(format!("Bad text content: {}", err)))?;
                        builder.text.push_str(&text);
                    }
                }
            }
            Ok(Event::End(_)) => {
                let closed = stack.pop();
                if let Some(builder) = current.as_mut() {
                    let depth = stack.len();
                    if builder.xfrm_depth == Some(depth) {
                        builder.xfrm_depth = None;
                        builder.xfrm_done = true;
                    }
                    if builder.in_text_body
                        && depth == builder.depth + 1
                        && closed.as_deref() == Some(b"txBody".as_slice())
                    {
                        builder.in_text_body = false;
                    }
                    if depth == builder.depth {
                        if let Some(builder) = current.take() {
                            shapes.push(builder.finish());
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Xml(format!(
                    "Error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(shapes)
}

/// Update the shape under construction for an opening (or empty) element.
fn open_element(
    e: &BytesStart<'_>,
    local: &[u8],
    stack: &[Vec<u8>],
    current: &mut Option<ShapeBuilder>,
    is_empty: bool,
) {
    let depth = stack.len();
    let parent = stack.last().map(Vec::as_slice).unwrap_or(b"");

    let Some(builder) = current.as_mut() else {
        if parent == b"spTree" {
            if let Some(kind) = ShapeKind::from_element(local) {
                *current = Some(ShapeBuilder::new(kind, depth));
            }
        }
        return;
    };

    match local {
        b"cNvPr" if builder.name.is_none() => {
            builder.name = Some(attr_string(e, b"name").unwrap_or_default());
            builder.id = attr_string(e, b"id")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
        }
        b"xfrm" if !builder.xfrm_done && is_own_xfrm(builder.depth, depth, parent) => {
            builder.has_xfrm = true;
            if is_empty {
                builder.xfrm_done = true;
            } else {
                builder.xfrm_depth = Some(depth);
            }
        }
        b"off" if builder.xfrm_depth.is_some_and(|d| d + 1 == depth) => {
            builder.off = Some((attr_i64(e, b"x").unwrap_or(0), attr_i64(e, b"y").unwrap_or(0)));
        }
        b"ext" if builder.xfrm_depth.is_some_and(|d| d + 1 == depth) => {
            builder.ext = Some((attr_i64(e, b"cx").unwrap_or(0), attr_i64(e, b"cy").unwrap_or(0)));
        }
        b"ph" if builder.placeholder.is_none()
            && parent == b"nvPr"
            && depth == builder.depth + 3 =>
        {
            builder.placeholder = Some(Placeholder::new(
                attr_string(e, b"type").unwrap_or_else(|| "obj".to_string()),
                attr_string(e, b"idx")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0),
            ));
        }
        b"txBody" if depth == builder.depth + 1 && builder.kind == ShapeKind::TextFrame => {
            builder.in_text_body = !is_empty;
        }
        b"p" if builder.in_text_body && parent == b"txBody" => {
            if builder.paragraphs > 0 {
                builder.text.push('\n');
            }
            builder.paragraphs += 1;
        }
        b"br" if builder.in_text_body => {
            builder.text.push('\u{b}');
        }
        _ => {}
    }
}

/// Attribute value as a string, matched on its full (possibly prefixed) name.
fn attr_string(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

fn attr_i64(e: &BytesStart<'_>, key: &[u8]) -> Option<i64> {
    attr_string(e, key).and_then(|v| v.trim().parse().ok())
}

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slides/slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::units::inches_to_emu;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<p:cSld><p:spTree>
<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>
<p:sp>
  <p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
  <p:spPr><a:xfrm><a:off x="182880" y="137160"/><a:ext cx="8778240" cy="731520"/></a:xfrm></p:spPr>
  <p:txBody><a:bodyPr/><a:p><a:r><a:t>Beats &amp; Bars</a:t></a:r></a:p><a:p><a:r><a:t>Line </a:t></a:r><a:br/><a:r><a:t>two</a:t></a:r></a:p></p:txBody>
</p:sp>
<p:pic>
  <p:nvPicPr><p:cNvPr id="3" name="Image 2"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr>
  <p:blipFill><a:blip r:embed="rId2"><a:extLst><a:ext uri="{28A0092B-C50C-407E-A947-70E740481C1C}"/></a:extLst></a:blip></p:blipFill>
  <p:spPr><a:xfrm><a:off x="914400" y="914400"/><a:ext cx="5303520" cy="914400"/></a:xfrm></p:spPr>
</p:pic>
<p:grpSp>
  <p:nvGrpSpPr><p:cNvPr id="4" name="Group 3"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
  <p:grpSpPr><a:xfrm><a:off x="100" y="200"/><a:ext cx="300" cy="400"/><a:chOff x="0" y="0"/><a:chExt cx="300" cy="400"/></a:xfrm></p:grpSpPr>
  <p:sp><p:nvSpPr><p:cNvPr id="5" name="Inner"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
    <p:spPr><a:xfrm><a:off x="1" y="2"/><a:ext cx="3" cy="4"/></a:xfrm></p:spPr>
    <p:txBody><a:bodyPr/><a:p><a:r><a:t>hidden</a:t></a:r></a:p></p:txBody></p:sp>
</p:grpSp>
<p:sp>
  <p:nvSpPr><p:cNvPr id="6" name="Placeholder"/><p:cNvSpPr/><p:nvPr><p:ph type="body"/></p:nvPr></p:nvSpPr>
  <p:spPr/>
</p:sp>
</p:spTree></p:cSld>
</p:sld>"#;

    #[test]
    fn test_extract_shapes() {
        let shapes = extract_shapes_from_xml(SLIDE).unwrap();
        assert_eq!(shapes.len(), 4);

        let title = &shapes[0];
        assert_eq!(title.kind, ShapeKind::TextFrame);
        assert_eq!(title.name, "Title 1");
        assert_eq!(title.id, 2);
        assert_eq!(title.text.as_deref(), Some("Beats & Bars\nLine \u{b}two"));
        assert_eq!(title.geometry.left, inches_to_emu(0.2));
        assert_eq!(title.geometry.height, inches_to_emu(0.8));

        let pic = &shapes[1];
        assert_eq!(pic.kind, ShapeKind::Picture);
        assert_eq!(pic.text, None);
        // The blip's extension list must not be taken for the size.
        assert_eq!(pic.geometry.width, 5_303_520);
        assert_eq!(pic.geometry.height, 914_400);

        let group = &shapes[2];
        assert_eq!(group.kind, ShapeKind::Group);
        assert_eq!(group.name, "Group 3");
        assert_eq!(group.text, None);
        assert_eq!(group.geometry, Geometry { left: 100, top: 200, width: 300, height: 400 });

        let placeholder = &shapes[3];
        assert!(!placeholder.has_xfrm);
        assert_eq!(placeholder.placeholder, Some(Placeholder::new("body", 0)));
        assert_eq!(title.placeholder, None);
        assert_eq!(placeholder.geometry, Geometry::default());
        assert_eq!(placeholder.text.as_deref(), Some(""));
    }

    #[test]
    fn test_slide_order_follows_sld_id_list() {
        let presentation = parse_presentation(
            r#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldIdLst>
                <p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/>
            </p:sldIdLst><p:sldSz cx="9144000" cy="5143500"/></p:presentation>"#,
        )
        .unwrap();
        let rels = parse_relationships(
            r#"<Relationships>
                <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
                <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
                <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="/ppt/slides/slide2.xml"/>
            </Relationships>"#,
        )
        .unwrap();

        assert_eq!(presentation.slide_size, Some((9_144_000, 5_143_500)));
        assert_eq!(
            slide_order(&presentation, &rels),
            vec!["ppt/slides/slide2.xml".to_string(), "ppt/slides/slide1.xml".to_string()]
        );
    }

    #[test]
    fn test_slide_order_fallback_by_number() {
        let rels = parse_relationships(
            r#"<Relationships>
                <Relationship Id="rId9" Type="x/slide" Target="slides/slide10.xml"/>
                <Relationship Id="rId4" Type="x/slide" Target="slides/slide2.xml"/>
                <Relationship Id="rId5" Type="x/slideLayout" Target="slideLayouts/slideLayout1.xml"/>
            </Relationships>"#,
        )
        .unwrap();
        assert_eq!(
            slide_order(&PresentationInfo::default(), &rels),
            vec!["ppt/slides/slide2.xml".to_string(), "ppt/slides/slide10.xml".to_string()]
        );
    }

    #[test]
    fn test_incomplete_transform_is_still_own() {
        let shapes = extract_shapes_from_xml(
            r#"<p:sld xmlns:a="a" xmlns:p="p"><p:cSld><p:spTree>
            <p:sp><p:nvSpPr><p:cNvPr id="2" name="Offset only"/></p:nvSpPr>
              <p:spPr><a:xfrm><a:off x="5" y="6"/></a:xfrm></p:spPr></p:sp>
            <p:sp><p:nvSpPr><p:cNvPr id="3" name="Empty"/></p:nvSpPr>
              <p:spPr><a:xfrm/></p:spPr></p:sp>
            </p:spTree></p:cSld></p:sld>"#,
        )
        .unwrap();

        assert!(shapes[0].has_xfrm);
        assert_eq!(shapes[0].geometry, Geometry { left: 5, top: 6, width: 0, height: 0 });
        assert!(shapes[1].has_xfrm);
        assert_eq!(shapes[1].geometry, Geometry::default());
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target(PRESENTATION_PART, "slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(
            resolve_target(PRESENTATION_PART, "/ppt/slides/slide2.xml"),
            "ppt/slides/slide2.xml"
        );
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", "../slideLayouts/slideLayout2.xml"),
            "ppt/slideLayouts/slideLayout2.xml"
        );
        assert_eq!(rels_part_name("ppt/slides/slide1.xml"), "ppt/slides/_rels/slide1.xml.rels");
    }

    #[test]
    fn test_malformed_slide_is_an_error() {
        let err = extract_shapes_from_xml("<p:sld><p:spTree><p:sp></p:pic></p:spTree></p:sld>");
        assert!(matches!(err, Err(Error::Xml(_))));
    }

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slides/slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }
}
