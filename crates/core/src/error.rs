//! Error types for deck repair and verification.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rebuilding or verifying a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    Zip(String),

    /// XML parsing or writing error (for PPTX).
    #[error("XML error: {0}")]
    Xml(String),

    /// A part the package must contain is absent.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// A fix or analysis asked for a slide the deck does not have.
    #[error("Slide {number} not found (deck has {count} slides)")]
    SlideNotFound {
        /// 1-based slide number that was requested.
        number: usize,
        /// Number of slides in the deck.
        count: usize,
    },

    /// Invalid configuration file.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The external renderer failed.
    #[error("Render error: {0}")]
    Render(String),

    /// An external command did not finish in time.
    #[error("Command timed out after {secs}s: {command}")]
    Timeout {
        /// The command line that was running.
        command: String,
        /// Timeout that elapsed, in seconds.
        secs: u64,
    },

    /// Failed to load, compare or save an image.
    #[error("Image error: {0}")]
    Image(String),
}
