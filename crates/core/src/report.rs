//! Comparison results and the verification report.
//!
//! Classifies similarity scores into status buckets, summarises a run and
//! renders the flat text report written at the end of verification.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Outcome bucket for one slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideStatus {
    Ok,
    NeedsWork,
    MajorDiff,
    MissingRef,
    MissingExport,
}

impl SlideStatus {
    /// Label used in console output and the report file.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NeedsWork => "NEEDS_WORK",
            Self::MajorDiff => "MAJOR_DIFF",
            Self::MissingRef => "missing_ref",
            Self::MissingExport => "missing_export",
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::MissingRef | Self::MissingExport)
    }
}

impl fmt::Display for SlideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Score boundaries between the status buckets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Scores at or above this are OK.
    pub ok: f64,

    /// Scores above this (and below `ok`) need work; the rest are major.
    pub needs_work: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            ok: 0.90,
            needs_work: 0.75,
        }
    }
}

impl Thresholds {
    /// Bucket a similarity score.
    pub fn classify(&self, score: f64) -> SlideStatus {
        if score >= self.ok {
            SlideStatus::Ok
        } else if score > self.needs_work {
            SlideStatus::NeedsWork
        } else {
            SlideStatus::MajorDiff
        }
    }
}

/// Per-slide comparison record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// 1-based slide number.
    pub slide: usize,

    /// Similarity in [0, 1]; `None` when the slide could not be compared.
    pub score: Option<f64>,

    pub status: SlideStatus,

    /// Saved diff map, for compared slides.
    pub diff_path: Option<PathBuf>,
}

impl ComparisonResult {
    /// A compared slide.
    pub fn scored(slide: usize, score: f64, status: SlideStatus, diff_path: PathBuf) -> Self {
        Self {
            slide,
            score: Some(score),
            status,
            diff_path: Some(diff_path),
        }
    }

    /// A slide skipped because an image was absent.
    pub fn missing(slide: usize, status: SlideStatus) -> Self {
        Self {
            slide,
            score: None,
            status,
            diff_path: None,
        }
    }
}

/// Counts per status bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub ok: usize,
    pub needs_work: usize,
    pub major: usize,
    pub missing: usize,
}

impl Summary {
    pub fn from_results(results: &[ComparisonResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result.status {
                SlideStatus::Ok => summary.ok += 1,
                SlideStatus::NeedsWork => summary.needs_work += 1,
                SlideStatus::MajorDiff => summary.major += 1,
                SlideStatus::MissingRef | SlideStatus::MissingExport => summary.missing += 1,
            }
        }
        summary
    }
}

/// Non-OK scored slides, worst first.
pub fn attention(results: &[ComparisonResult]) -> Vec<&ComparisonResult> {
    let mut flagged: Vec<&ComparisonResult> = results
        .iter()
        .filter(|r| matches!(r.status, SlideStatus::NeedsWork | SlideStatus::MajorDiff))
        .collect();
    flagged.sort_by(|a, b| {
        a.score
            .unwrap_or(0.0)
            .partial_cmp(&b.score.unwrap_or(0.0))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    flagged
}

/// Format a score as a percentage with one decimal, e.g. `87.8%`.
pub fn percent(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

/// Console summary: bucket counts and the slides needing attention.
pub fn render_summary(results: &[ComparisonResult], thresholds: &Thresholds) -> String {
    let summary = Summary::from_results(results);
    let ok_pct = (thresholds.ok * 100.0).round();
    let work_pct = (thresholds.needs_work * 100.0).round();

    let mut out = String::new();
    out.push_str("SUMMARY:\n");
    out.push_str(&format!("  OK (>={}% match):     {} slides\n", ok_pct, summary.ok));
    out.push_str(&format!(
        "  Needs work ({}-{}%):  {} slides\n",
        work_pct, ok_pct, summary.needs_work
    ));
    out.push_str(&format!("  Major diff (<={}%):   {} slides\n", work_pct, summary.major));
    out.push_str(&format!("  Missing:              {} slides\n", summary.missing));

    let flagged = attention(results);
    if !flagged.is_empty() {
        out.push_str("\nSLIDES NEEDING ATTENTION:\n");
        for r in flagged {
            let diff = r
                .diff_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "N/A".to_string());
            out.push_str(&format!(
                "  Slide {:2}: {} - see {}\n",
                r.slide,
                percent(r.score.unwrap_or(0.0)),
                diff
            ));
        }
    }
    out
}

/// The report file: one line per slide with score and status.
pub fn render_report(results: &[ComparisonResult]) -> String {
    let mut out = String::new();
    out.push_str("SLIDE VERIFICATION REPORT\n");
    out.push_str(&"=".repeat(40));
    out.push_str("\n\n");
    for r in results {
        let score = r.score.map(percent).unwrap_or_else(|| "N/A".to_string());
        out.push_str(&format!("Slide {:2}: {} - {}\n", r.slide, score, r.status));
    }
    out
}

/// Write the report file, creating its directory if needed.
pub fn write_report(path: &Path, results: &[ComparisonResult]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, render_report(results))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ComparisonResult> {
        vec![
            ComparisonResult::scored(
                1,
                0.953,
                SlideStatus::Ok,
                PathBuf::from("d/diff_slide_01.png"),
            ),
            ComparisonResult::scored(
                2,
                0.814,
                SlideStatus::NeedsWork,
                PathBuf::from("d/diff_slide_02.png"),
            ),
            ComparisonResult::missing(3, SlideStatus::MissingRef),
            ComparisonResult::scored(
                4,
                0.763,
                SlideStatus::NeedsWork,
                PathBuf::from("d/diff_slide_04.png"),
            ),
            ComparisonResult::scored(
                5,
                0.41,
                SlideStatus::MajorDiff,
                PathBuf::from("d/diff_slide_05.png"),
            ),
            ComparisonResult::missing(6, SlideStatus::MissingExport),
        ]
    }

    #[test]
    fn test_threshold_boundaries() {
        let t = Thresholds::default();
        assert_eq!(t.classify(1.0), SlideStatus::Ok);
        assert_eq!(t.classify(0.90), SlideStatus::Ok);
        assert_eq!(t.classify(0.8999), SlideStatus::NeedsWork);
        assert_eq!(t.classify(0.7501), SlideStatus::NeedsWork);
        assert_eq!(t.classify(0.75), SlideStatus::MajorDiff);
        assert_eq!(t.classify(0.7499), SlideStatus::MajorDiff);
        assert_eq!(t.classify(0.0), SlideStatus::MajorDiff);
    }

    #[test]
    fn test_summary_counts() {
        let summary = Summary::from_results(&sample());
        assert_eq!(
            summary,
            Summary { ok: 1, needs_work: 2, major: 1, missing: 2 }
        );
    }

    #[test]
    fn test_attention_sorted_worst_first() {
        let results = sample();
        let slides: Vec<usize> = attention(&results).iter().map(|r| r.slide).collect();
        assert_eq!(slides, vec![5, 4, 2]);
    }

    #[test]
    fn test_report_lines() {
        let report = render_report(&sample());
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "SLIDE VERIFICATION REPORT");
        assert_eq!(lines[1], "=".repeat(40));
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "Slide  1: 95.3% - OK");
        assert_eq!(lines[4], "Slide  2: 81.4% - NEEDS_WORK");
        assert_eq!(lines[5], "Slide  3: N/A - missing_ref");
        assert_eq!(lines[8], "Slide  6: N/A - missing_export");
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn test_summary_lists_attention() {
        let text = render_summary(&sample(), &Thresholds::default());
        assert!(text.contains("OK (>=90% match):     1 slides"));
        assert!(text.contains("Missing:              2 slides"));
        assert!(text.contains("Slide  5: 41.0% - see d/diff_slide_05.png"));
    }

    #[test]
    fn test_write_report_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("verification_report.txt");
        write_report(&path, &sample()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("SLIDE VERIFICATION REPORT\n"));
        assert!(written.contains("Slide  5: 41.0% - MAJOR_DIFF"));
    }
}
