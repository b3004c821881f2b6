//! Core domain types, shape classification, coordinate correction and
//! verification reporting for repairing the DJ Foundations deck.

pub mod backup;
pub mod classify;
pub mod config;
pub mod error;
pub mod inventory;
pub mod layout;
pub mod report;
pub mod types;
pub mod units;

pub use backup::{backup_output, reset_output, ResetOutcome};
pub use config::{Config, TextHeightPolicy};
pub use error::{Error, Result};
pub use layout::{clamp_text_heights, fix_slide, Placement, SlideFix};
pub use report::{ComparisonResult, SlideStatus, Summary, Thresholds};
pub use types::{Deck, Geometry, Placeholder, Shape, ShapeKind, Slide};
