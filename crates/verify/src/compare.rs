//! Structural similarity between reference and rendered slide images.

use deck_core::{ComparisonResult, Config, Error, Result, SlideStatus};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, GrayImage};
use image_compare::Algorithm;
use std::fs;
use std::path::Path;

/// Result of comparing one pair of images.
pub struct ImageComparison {
    /// Mean SSIM in `[0, 1]` (can dip below zero for anti-correlated images).
    pub score: f64,
    /// Per-pixel dissimilarity: bright where the images differ.
    pub diff: GrayImage,
}

/// Compare `rendered` against `reference` on luminance.
///
/// The rendered image is resized to the reference dimensions first.
pub fn compare_images(
    reference: &DynamicImage,
    rendered: &DynamicImage,
) -> Result<ImageComparison> {
    let (width, height) = reference.dimensions();
    let reference = reference.to_luma8();
    let rendered = if rendered.dimensions() == (width, height) {
        rendered.to_luma8()
    } else {
        log::debug!(
            "Resizing rendered image {:?} to {}x{}",
            rendered.dimensions(),
            width,
            height
        );
        rendered.resize_exact(width, height, FilterType::Lanczos3).to_luma8()
    };

    let similarity =
        image_compare::gray_similarity_structure(&Algorithm::MSSIMSimple, &reference, &rendered)
            .map_err(|e| Error::Image(format!("SSIM calculation failed: {:?}", e)))?;

    // The similarity map is 1.0 where the images agree; invert it so
    // differences show up bright.
    let mut diff = similarity.image.to_color_map().to_luma8();
    imageops::invert(&mut diff);

    Ok(ImageComparison {
        score: similarity.score,
        diff,
    })
}

fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|e| Error::Image(format!("{}: {}", path.display(), e)))
}

/// Compare every slide in the configured range and write diff images.
///
/// Slides lacking a reference or an export are reported with a missing
/// status rather than failing the run.
pub fn compare_slides(config: &Config) -> Result<Vec<ComparisonResult>> {
    let diff_dir = config.diff_dir_path();
    fs::create_dir_all(&diff_dir)?;

    let mut results = Vec::new();
    for slide in config.first_slide..=config.last_slide {
        let reference_path = config.reference_image(slide);
        let export_path = config.export_image(slide);

        if !reference_path.exists() {
            log::warn!("Slide {}: no reference image at {}", slide, reference_path.display());
            results.push(ComparisonResult::missing(slide, SlideStatus::MissingRef));
            continue;
        }
        if !export_path.exists() {
            log::warn!("Slide {}: no exported image at {}", slide, export_path.display());
            results.push(ComparisonResult::missing(slide, SlideStatus::MissingExport));
            continue;
        }

        let reference = load_image(&reference_path)?;
        let rendered = load_image(&export_path)?;
        let comparison = compare_images(&reference, &rendered)?;

        let diff_path = config.diff_image(slide);
        comparison
            .diff
            .save(&diff_path)
            .map_err(|e| Error::Image(format!("{}: {}", diff_path.display(), e)))?;

        let status = config.thresholds.classify(comparison.score);
        log::debug!("Slide {}: score {:.4} ({})", slide, comparison.score, status);
        results.push(ComparisonResult::scored(slide, comparison.score, status, diff_path));
    }
    Ok(results)
}
