//! Run configuration: file-system layout, renderer settings and fix plan.
//!
//! Every operation takes a `&Config` instead of reading process-wide
//! constants, so tests can point a run at a temporary directory.

use crate::error::{Error, Result};
use crate::layout::SlideFix;
use crate::report::Thresholds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings shared by the rebuild and verify pipelines.
///
/// Relative paths are resolved against `base_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory all relative paths below are resolved against.
    pub base_dir: PathBuf,

    /// Pristine export the output deck is reset from.
    pub source_pptx: PathBuf,

    /// Working deck the rebuild writes and the verifier reads.
    pub output_pptx: PathBuf,

    /// Reference images named `slide-NN.png`.
    pub reference_dir: PathBuf,

    pub backup_dir: PathBuf,

    /// Rendered slides named `export_slide_NN.png`.
    pub export_dir: PathBuf,

    /// Diff maps named `diff_slide_NN.png`.
    pub diff_dir: PathBuf,

    pub report_path: PathBuf,

    /// Office suite executable used for the PDF conversion.
    pub soffice: PathBuf,

    /// PDF rasterizer executable.
    pub rasterizer: PathBuf,

    /// Rasterization resolution.
    pub dpi: u32,

    /// Wall-clock limit for each renderer subprocess.
    pub render_timeout_secs: u64,

    /// First slide number compared by the verifier.
    pub first_slide: usize,

    /// Last slide number compared by the verifier (inclusive).
    pub last_slide: usize,

    /// Slide fixes applied by the rebuild, in order.
    pub fixes: Vec<SlideFix>,

    /// Slides listed by the analysis mode.
    pub analyze_slides: Vec<usize>,

    pub thresholds: Thresholds,

    pub text_height: TextHeightPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_base_dir(".")
    }
}

impl Config {
    /// Default layout rooted at the given directory.
    pub fn from_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            source_pptx: PathBuf::from("source material").join("DJ_Foundations_Styled (4).pptx"),
            output_pptx: PathBuf::from("DJ_Foundations.pptx"),
            reference_dir: PathBuf::from("source material").join("images").join("slides"),
            backup_dir: PathBuf::from("backups"),
            export_dir: PathBuf::from("slide_exports"),
            diff_dir: PathBuf::from("slide_diffs"),
            report_path: PathBuf::from("verification_report.txt"),
            soffice: PathBuf::from("soffice"),
            rasterizer: PathBuf::from("pdftoppm"),
            dpi: 150,
            render_timeout_secs: 120,
            first_slide: 1,
            last_slide: 20,
            fixes: SlideFix::default_plan(),
            analyze_slides: vec![9, 18, 2],
            thresholds: Thresholds::default(),
            text_height: TextHeightPolicy::default(),
        }
    }

    /// Load a JSON configuration file.
    ///
    /// Missing fields take their defaults. A relative `base_dir` is taken
    /// relative to the directory containing the file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_json(&content)?;
        if config.base_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.base_dir = parent.join(&config.base_dir);
            }
        }
        Ok(config)
    }

    /// Parse a JSON configuration string.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could make sense of.
    pub fn validate(&self) -> Result<()> {
        if self.first_slide == 0 || self.first_slide > self.last_slide {
            return Err(Error::Config(format!(
                "invalid slide range {}..={}",
                self.first_slide, self.last_slide
            )));
        }
        if self.dpi == 0 {
            return Err(Error::Config("dpi must be positive".to_string()));
        }
        if self.thresholds.needs_work >= self.thresholds.ok {
            return Err(Error::Config(format!(
                "needs_work threshold {} must be below ok threshold {}",
                self.thresholds.needs_work, self.thresholds.ok
            )));
        }
        Ok(())
    }

    /// Resolve a configured path against `base_dir`.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn source_pptx_path(&self) -> PathBuf {
        self.resolve(&self.source_pptx)
    }

    pub fn output_pptx_path(&self) -> PathBuf {
        self.resolve(&self.output_pptx)
    }

    pub fn reference_dir_path(&self) -> PathBuf {
        self.resolve(&self.reference_dir)
    }

    pub fn backup_dir_path(&self) -> PathBuf {
        self.resolve(&self.backup_dir)
    }

    pub fn export_dir_path(&self) -> PathBuf {
        self.resolve(&self.export_dir)
    }

    pub fn diff_dir_path(&self) -> PathBuf {
        self.resolve(&self.diff_dir)
    }

    pub fn report_file_path(&self) -> PathBuf {
        self.resolve(&self.report_path)
    }

    /// Reference image for a 1-based slide number.
    pub fn reference_image(&self, slide: usize) -> PathBuf {
        self.reference_dir_path().join(format!("slide-{:02}.png", slide))
    }

    /// Rendered image for a 1-based slide number.
    pub fn export_image(&self, slide: usize) -> PathBuf {
        self.export_dir_path().join(export_file_name(slide))
    }

    /// Diff map for a 1-based slide number.
    pub fn diff_image(&self, slide: usize) -> PathBuf {
        self.diff_dir_path().join(format!("diff_slide_{:02}.png", slide))
    }
}

/// File name of a rendered slide image.
pub fn export_file_name(slide: usize) -> String {
    format!("export_slide_{:02}.png", slide)
}

/// Height clamp applied to every over-tall text box after the slide fixes.
///
/// The estimate only counts explicit paragraph breaks; wrapped lines are
/// not seen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextHeightPolicy {
    /// Boxes taller than this are re-estimated.
    pub trigger_in: f64,

    /// Upper bound of the estimate.
    pub max_in: f64,

    /// Lower bound of the estimate.
    pub min_in: f64,

    /// Height allowed per line of text.
    pub per_line_in: f64,
}

impl Default for TextHeightPolicy {
    fn default() -> Self {
        Self {
            trigger_in: 4.5,
            max_in: 4.0,
            min_in: 0.5,
            per_line_in: 0.25,
        }
    }
}

impl TextHeightPolicy {
    /// Estimated height for a text frame holding `text`.
    pub fn estimate(&self, text: &str) -> f64 {
        let lines = text.matches('\n').count() + 1;
        (lines as f64 * self.per_line_in).max(self.min_in).min(self.max_in)
    }
}
