//! Slide verification: render the corrected deck to images and score each
//! slide against its reference image.

pub mod compare;
pub mod render;

pub use compare::{compare_images, compare_slides, ImageComparison};
pub use render::{run_with_timeout, OfficeRenderer, SlideRenderer};
