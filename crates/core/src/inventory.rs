//! Shape inventory printed by the analysis mode.

use crate::types::{ShapeKind, Slide};
use std::fmt::Write;

/// Characters of text shown per shape.
const TEXT_PREVIEW_CHARS: usize = 100;

/// Describe every shape on a slide: kind, name, position, size and text.
pub fn describe_slide(slide: &Slide) -> String {
    let rule = "=".repeat(60);
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "SLIDE {} ANALYSIS", slide.number);
    let _ = writeln!(out, "{}", rule);

    for shape in &slide.shapes {
        let g = &shape.geometry;
        let _ = writeln!(out, "\nShape {}: {}", shape.index, shape.kind);
        let _ = writeln!(out, "  Name: {}", shape.name);
        let _ = writeln!(out, "  Position: left={:.2}\", top={:.2}\"", g.left_in(), g.top_in());
        let _ = writeln!(out, "  Size: width={:.2}\", height={:.2}\"", g.width_in(), g.height_in());
        if shape.has_text_frame() {
            let _ = writeln!(out, "  Text: {}...", text_preview(shape.text_or_empty()));
        }
        if shape.kind == ShapeKind::Picture {
            let _ = writeln!(out, "  [PICTURE]");
        }
    }
    out
}

/// First characters of a text frame on a single line.
fn text_preview(text: &str) -> String {
    text.chars()
        .take(TEXT_PREVIEW_CHARS)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}
