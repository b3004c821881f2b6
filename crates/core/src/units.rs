//! Length units used by the deck.
//!
//! Reference images are 4000x2250 px for a 10.00" x 5.625" slide, so both
//! axes share the same 400 px per inch scale.

/// OOXML stores lengths in English Metric Units.
pub const EMU_PER_INCH: f64 = 914_400.0;

/// Slide canvas width.
pub const SLIDE_WIDTH_IN: f64 = 10.0;

/// Slide canvas height (16:9).
pub const SLIDE_HEIGHT_IN: f64 = 5.625;

/// Reference image width in pixels.
pub const REF_WIDTH_PX: u32 = 4000;

/// Reference image height in pixels.
pub const REF_HEIGHT_PX: u32 = 2250;

/// Pixels of a reference image per slide inch.
pub const PX_PER_INCH: f64 = REF_WIDTH_PX as f64 / SLIDE_WIDTH_IN;

/// Convert reference-image pixels to inches.
pub fn px_to_inches(px: f64) -> f64 {
    px / PX_PER_INCH
}

/// Convert inches to EMU, rounded to the nearest unit.
pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

/// Convert EMU to inches.
pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMU_PER_INCH
}
