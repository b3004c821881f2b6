//! PPTX (Office Open XML) backend for the deck repair.
//!
//! Reads a .pptx ZIP archive into a `Deck` of positioned shapes and writes
//! corrected shape geometry back, leaving every other part untouched.
//! Placeholders without a transform of their own load with the geometry
//! their slide layout (or master) gives them.

pub mod parser;
mod placeholder;
pub mod writer;

#[cfg(feature = "fixtures")]
pub mod fixtures;

pub use parser::PptxDocument;
