//! Minimal in-memory decks for tests.
//!
//! The packages carry only the parts the loader reads: content types, the
//! presentation part with its relationships, one slide master and one
//! layout shared by every slide, and the slides.

use deck_core::units::inches_to_emu;
use deck_core::{Error, Result};
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::ZipWriter;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const PML: &str = "application/vnd.openxmlformats-officedocument.presentationml";

/// A shape to place on a fixture slide.
#[derive(Debug, Clone)]
pub enum FixtureShape {
    /// Text box with one paragraph per entry; `None` rect leaves out the transform.
    Text {
        rect: Option<(f64, f64, f64, f64)>,
        paragraphs: Vec<String>,
    },
    Picture {
        rect: (f64, f64, f64, f64),
    },
    /// Placeholder text shape (`p:ph`); `None` rect inherits the layout's.
    Placeholder {
        kind: String,
        idx: u32,
        rect: Option<(f64, f64, f64, f64)>,
        paragraphs: Vec<String>,
    },
}

impl FixtureShape {
    /// Text box at (left, top, width, height) in inches.
    pub fn text(left: f64, top: f64, width: f64, height: f64, body: &str) -> Self {
        Self::Text {
            rect: Some((left, top, width, height)),
            paragraphs: body.split('\n').map(str::to_string).collect(),
        }
    }

    /// Placeholder with no transform of its own.
    pub fn placeholder(kind: &str, idx: u32, body: &str) -> Self {
        Self::Placeholder {
            kind: kind.to_string(),
            idx,
            rect: None,
            paragraphs: body.split('\n').map(str::to_string).collect(),
        }
    }

    /// Placeholder at (left, top, width, height) in inches.
    pub fn placeholder_at(kind: &str, idx: u32, rect: (f64, f64, f64, f64)) -> Self {
        Self::Placeholder {
            kind: kind.to_string(),
            idx,
            rect: Some(rect),
            paragraphs: Vec::new(),
        }
    }

    /// Picture at (left, top, width, height) in inches.
    pub fn picture(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::Picture {
            rect: (left, top, width, height),
        }
    }

    fn to_xml(&self, id: usize) -> String {
        match self {
            Self::Text { rect, paragraphs } => {
                let (sp_pr, body) = text_parts(rect, paragraphs);
                format!(
                    "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"TextBox {id}\"/><p:cNvSpPr txBox=\"1\"/><p:nvPr/></p:nvSpPr>{sp_pr}<p:txBody><a:bodyPr wrap=\"square\"/><a:lstStyle/>{body}</p:txBody></p:sp>"
                )
            }
            Self::Placeholder {
                kind,
                idx,
                rect,
                paragraphs,
            } => {
                let (sp_pr, body) = text_parts(rect, paragraphs);
                format!(
                    "<p:sp><p:nvSpPr><p:cNvPr id=\"{id}\" name=\"{kind} {id}\"/><p:cNvSpPr><a:spLocks noGrp=\"1\"/></p:cNvSpPr><p:nvPr><p:ph type=\"{kind}\" idx=\"{idx}\"/></p:nvPr></p:nvSpPr>{sp_pr}<p:txBody><a:bodyPr/><a:lstStyle/>{body}</p:txBody></p:sp>"
                )
            }
            Self::Picture { rect } => format!(
                "<p:pic><p:nvPicPr><p:cNvPr id=\"{id}\" name=\"Picture {id}\"/><p:cNvPicPr><a:picLocks noChangeAspect=\"1\"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed=\"rId9\"><a:extLst><a:ext uri=\"{{28A0092B-C50C-407E-A947-70E740481C1C}}\"/></a:extLst></a:blip><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>{}<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></p:spPr></p:pic>",
                xfrm(*rect)
            ),
        }
    }
}

fn text_parts(rect: &Option<(f64, f64, f64, f64)>, paragraphs: &[String]) -> (String, String) {
    let sp_pr = match rect {
        Some(rect) => format!(
            "<p:spPr>{}<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></p:spPr>",
            xfrm(*rect)
        ),
        None => "<p:spPr/>".to_string(),
    };
    let body: String = paragraphs
        .iter()
        .map(|p| {
            format!(
                "<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p>",
                escape(p)
            )
        })
        .collect();
    (sp_pr, body)
}

/// A shape tree holding `shapes`, ids starting at 2.
fn sp_tree(shapes: &[FixtureShape]) -> String {
    let tree: String = shapes
        .iter()
        .enumerate()
        .map(|(i, shape)| shape.to_xml(i + 2))
        .collect();
    format!("<p:spTree><p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/><a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>{tree}</p:spTree>")
}

fn rels(entries: &[(String, &str, String)]) -> String {
    let body: String = entries
        .iter()
        .map(|(id, kind, target)| format!("<Relationship Id=\"{id}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/{kind}\" Target=\"{target}\"/>"))
        .collect();
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">{body}</Relationships>")
}

fn xfrm((left, top, width, height): (f64, f64, f64, f64)) -> String {
    format!(
        "<a:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm>",
        inches_to_emu(left),
        inches_to_emu(top),
        inches_to_emu(width),
        inches_to_emu(height)
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// A deck of fixture slides on the 10" x 5.625" canvas.
#[derive(Debug, Clone, Default)]
pub struct FixtureDeck {
    pub slides: Vec<Vec<FixtureShape>>,

    /// Shapes of the layout every slide uses.
    pub layout: Vec<FixtureShape>,

    /// Shapes of the slide master behind the layout.
    pub master: Vec<FixtureShape>,
}

impl FixtureDeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a slide.
    pub fn slide(mut self, shapes: Vec<FixtureShape>) -> Self {
        self.slides.push(shapes);
        self
    }

    /// Set the shared layout's shapes.
    pub fn with_layout(mut self, shapes: Vec<FixtureShape>) -> Self {
        self.layout = shapes;
        self
    }

    /// Set the slide master's shapes.
    pub fn with_master(mut self, shapes: Vec<FixtureShape>) -> Self {
        self.master = shapes;
        self
    }

    /// Append `count` slides without shapes.
    pub fn blank_slides(mut self, count: usize) -> Self {
        self.slides.extend(std::iter::repeat_with(Vec::new).take(count));
        self
    }

    /// Package parts as (name, content), in archive order.
    pub fn parts(&self) -> Vec<(String, String)> {
        let n = self.slides.len();
        let mut parts = Vec::with_capacity(2 * n + 8);

        let overrides: String = (1..=n)
            .map(|i| format!("<Override PartName=\"/ppt/slides/slide{i}.xml\" ContentType=\"{PML}.slide+xml\"/>"))
            .collect();
        parts.push((
            "[Content_Types].xml".to_string(),
            format!("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\"><Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/><Default Extension=\"xml\" ContentType=\"application/xml\"/><Override PartName=\"/ppt/presentation.xml\" ContentType=\"{PML}.presentation.main+xml\"/><Override PartName=\"/ppt/slideMasters/slideMaster1.xml\" ContentType=\"{PML}.slideMaster+xml\"/><Override PartName=\"/ppt/slideLayouts/slideLayout1.xml\" ContentType=\"{PML}.slideLayout+xml\"/>{overrides}</Types>"),
        ));
        parts.push((
            "_rels/.rels".to_string(),
            rels(&[("rId1".to_string(), "officeDocument", "ppt/presentation.xml".to_string())]),
        ));

        let sld_ids: String = (1..=n)
            .map(|i| format!("<p:sldId id=\"{}\" r:id=\"rId{}\"/>", 255 + i, i + 1))
            .collect();
        parts.push((
            "ppt/presentation.xml".to_string(),
            format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<p:presentation {NS}><p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId1\"/></p:sldMasterIdLst><p:sldIdLst>{sld_ids}</p:sldIdLst><p:sldSz cx=\"{}\" cy=\"{}\"/><p:notesSz cx=\"6858000\" cy=\"9144000\"/></p:presentation>",
                inches_to_emu(10.0),
                inches_to_emu(5.625)
            ),
        ));

        let mut presentation_rels = vec![(
            "rId1".to_string(),
            "slideMaster",
            "slideMasters/slideMaster1.xml".to_string(),
        )];
        presentation_rels.extend(
            (1..=n).map(|i| (format!("rId{}", i + 1), "slide", format!("slides/slide{i}.xml"))),
        );
        parts.push((
            "ppt/_rels/presentation.xml.rels".to_string(),
            rels(&presentation_rels),
        ));

        parts.push((
            "ppt/slideMasters/slideMaster1.xml".to_string(),
            format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<p:sldMaster {NS}><p:cSld>{}</p:cSld><p:sldLayoutIdLst><p:sldLayoutId id=\"2147483649\" r:id=\"rId1\"/></p:sldLayoutIdLst></p:sldMaster>",
                sp_tree(&self.master)
            ),
        ));
        parts.push((
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
            rels(&[(
                "rId1".to_string(),
                "slideLayout",
                "../slideLayouts/slideLayout1.xml".to_string(),
            )]),
        ));
        parts.push((
            "ppt/slideLayouts/slideLayout1.xml".to_string(),
            format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<p:sldLayout {NS}><p:cSld>{}</p:cSld></p:sldLayout>",
                sp_tree(&self.layout)
            ),
        ));
        parts.push((
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels".to_string(),
            rels(&[(
                "rId1".to_string(),
                "slideMaster",
                "../slideMasters/slideMaster1.xml".to_string(),
            )]),
        ));

        for (idx, shapes) in self.slides.iter().enumerate() {
            parts.push((
                format!("ppt/slides/slide{}.xml", idx + 1),
                format!(
                    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<p:sld {NS}><p:cSld>{}</p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>",
                    sp_tree(shapes)
                ),
            ));
            parts.push((
                format!("ppt/slides/_rels/slide{}.xml.rels", idx + 1),
                rels(&[(
                    "rId1".to_string(),
                    "slideLayout",
                    "../slideLayouts/slideLayout1.xml".to_string(),
                )]),
            ));
        }
        parts
    }

    /// The deck as PPTX bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        zip_parts(&self.parts())
    }

    /// Write the deck to a file.
    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

/// Zip (name, content) pairs into a package.
pub fn zip_parts(parts: &[(String, String)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        zip.start_file(name.as_str(), FileOptions::default())
            .map_err(|e| Error::Zip(e.to_string()))?;
        zip.write_all(content.as_bytes())?;
    }
    let cursor = zip.finish().map_err(|e| Error::Zip(e.to_string()))?;
    Ok(cursor.into_inner())
}
