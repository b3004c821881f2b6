//! The verification pipeline: render the working deck, score every slide
//! against its reference image and write the report.

use crate::banner;
use anyhow::{Context, Result};
use deck_core::report::{percent, render_summary, write_report};
use deck_core::{ComparisonResult, Config, SlideStatus};
use deck_verify::{compare_slides, SlideRenderer};

/// Run verification. With `skip_export`, images already in the export
/// directory are compared as they are.
pub fn run(
    config: &Config,
    renderer: &dyn SlideRenderer,
    skip_export: bool,
) -> Result<Vec<ComparisonResult>> {
    let deck = config.output_pptx_path();
    println!("SLIDE VERIFICATION PIPELINE");
    println!("{}", "=".repeat(crate::RULE_WIDTH));
    println!("PPTX: {}", deck.display());
    println!("Reference: {}", config.reference_dir_path().display());
    println!();

    if skip_export {
        log::info!("Skipping export, using {}", config.export_dir_path().display());
    } else {
        banner("STEP 1: Exporting slides via PDF intermediate");
        let exported = renderer
            .render(&deck, &config.export_dir_path())
            .context("Export failed")?;
        log::info!("Exported {} slide images", exported.len());
    }

    println!();
    banner("STEP 2: Comparing slides against references");
    let results = compare_slides(config).context("Comparison failed")?;
    for r in &results {
        println!("{}", slide_line(r));
    }

    println!();
    banner("VERIFICATION REPORT");
    if results.is_empty() {
        println!("No results to report");
        return Ok(results);
    }

    println!();
    print!("{}", render_summary(&results, &config.thresholds));

    let report_path = config.report_file_path();
    write_report(&report_path, &results)
        .with_context(|| format!("Failed to write report {}", report_path.display()))?;
    println!("\nReport saved to: {}", report_path.display());
    Ok(results)
}

/// Console line for one compared slide.
fn slide_line(result: &ComparisonResult) -> String {
    match (result.status, result.score) {
        (SlideStatus::MissingRef, _) => format!("Slide {:2}: MISSING REFERENCE", result.slide),
        (SlideStatus::MissingExport, _) => format!("Slide {:2}: MISSING EXPORT", result.slide),
        (status, Some(score)) => format!(
            "Slide {:2}: {} match - {}",
            result.slide,
            percent(score),
            status
        ),
        (status, None) => format!("Slide {:2}: {}", result.slide, status),
    }
}
