//! The rebuild pipeline: reseed the working deck from the pristine source,
//! apply the configured slide fixes and save.

use crate::banner;
use anyhow::{Context, Result};
use deck_core::inventory::describe_slide;
use deck_core::layout::HeightFix;
use deck_core::{backup_output, clamp_text_heights, fix_slide, reset_output, Config, ResetOutcome};
use deck_pptx::PptxDocument;
use std::path::PathBuf;

/// What a rebuild did.
#[derive(Debug)]
pub struct RebuildOutcome {
    pub backup: Option<PathBuf>,
    pub reset: ResetOutcome,
    /// Shapes repositioned by the slide fixes.
    pub placed: usize,
    pub height_fixes: Vec<HeightFix>,
    pub output: PathBuf,
}

/// Run the full rebuild against `config`.
pub fn run(config: &Config) -> Result<RebuildOutcome> {
    banner("DJ FOUNDATIONS SLIDE REBUILDER");

    let now = chrono::Local::now().naive_local();
    let backup = backup_output(config, now).context("Failed to back up output deck")?;
    let reset = reset_output(config).context("Failed to reset output deck")?;

    let output = config.output_pptx_path();
    println!("\nLoading: {}", output.display());
    let mut doc = PptxDocument::open(&output)
        .with_context(|| format!("Failed to open {}", output.display()))?;

    let (width, height) = doc.deck().size_inches();
    println!("Slides: {}", doc.deck().slides.len());
    println!("Slide size: {:.2}\" x {:.2}\"", width, height);

    let mut placed = 0;
    for fix in &config.fixes {
        let placements = fix_slide(doc.deck_mut(), fix)
            .with_context(|| format!("Failed to fix slide {}", fix.slide_number()))?;
        placed += placements.len();
    }

    log::info!("FIXING TEXT HEIGHTS");
    let height_fixes = clamp_text_heights(doc.deck_mut(), &config.text_height);

    println!("\nSaving: {}", output.display());
    doc.save(&output)
        .with_context(|| format!("Failed to save {}", output.display()))?;
    println!("Done!");

    println!();
    banner_next_steps();

    Ok(RebuildOutcome {
        backup,
        reset,
        placed,
        height_fixes,
        output,
    })
}

fn banner_next_steps() {
    println!("{}", "=".repeat(crate::RULE_WIDTH));
    println!("NEXT STEPS:");
    println!("1. Run verify-slides to check results");
    println!("2. Review slide_diffs/ for visual comparison");
    println!("3. Iterate on problem slides");
    println!("{}", "=".repeat(crate::RULE_WIDTH));
}

/// Print the shape inventory of the configured analysis slides.
///
/// Reads the current output deck and writes nothing.
pub fn analyze(config: &Config) -> Result<Vec<String>> {
    let output = config.output_pptx_path();
    let doc = PptxDocument::open(&output)
        .with_context(|| format!("Failed to open {}", output.display()))?;

    let mut listings = Vec::with_capacity(config.analyze_slides.len());
    for &number in &config.analyze_slides {
        match doc.deck().slide(number) {
            Some(slide) => {
                let listing = describe_slide(slide);
                println!("{}", listing);
                listings.push(listing);
            }
            None => log::warn!(
                "Slide {} not in deck ({} slides)",
                number,
                doc.deck().slides.len()
            ),
        }
    }
    Ok(listings)
}
