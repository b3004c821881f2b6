use deck_cli::verify;
use deck_core::config::export_file_name;
use deck_core::{Config, Error, Result, SlideStatus};
use deck_verify::SlideRenderer;
use image::{GrayImage, Luma};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

fn pattern(seed: u32) -> GrayImage {
    GrayImage::from_fn(64, 64, |x, y| {
        if ((x + seed) / 4 + y / 4) % 2 == 0 {
            Luma([220u8])
        } else {
            Luma([30u8])
        }
    })
}

/// Writes fixed images instead of running an office suite.
struct StubRenderer {
    images: Vec<GrayImage>,
    calls: Cell<usize>,
}

impl SlideRenderer for StubRenderer {
    fn render(&self, _deck: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
        self.calls.set(self.calls.get() + 1);
        fs::create_dir_all(out_dir)?;
        let mut paths = Vec::new();
        for (i, img) in self.images.iter().enumerate() {
            let path = out_dir.join(export_file_name(i + 1));
            img.save(&path).map_err(|e| Error::Image(e.to_string()))?;
            paths.push(path);
        }
        Ok(paths)
    }
}

struct FailingRenderer;

impl SlideRenderer for FailingRenderer {
    fn render(&self, _deck: &Path, _out_dir: &Path) -> Result<Vec<PathBuf>> {
        Err(Error::Render("soffice exited with 1".to_string()))
    }
}

fn setup(dir: &Path, slides: usize) -> Config {
    let mut config = Config::from_base_dir(dir);
    config.last_slide = slides;
    fs::create_dir_all(config.reference_dir_path()).unwrap();
    config
}

#[test]
fn test_verify_scores_and_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), 3);

    // Slide 1 matches, slide 2 is shifted, slide 3 has no reference.
    pattern(0).save(config.reference_image(1)).unwrap();
    pattern(0).save(config.reference_image(2)).unwrap();
    let renderer = StubRenderer {
        images: vec![pattern(0), pattern(2), pattern(0)],
        calls: Cell::new(0),
    };

    let results = verify::run(&config, &renderer, false).unwrap();
    assert_eq!(renderer.calls.get(), 1);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].status, SlideStatus::Ok);
    assert_ne!(results[1].status, SlideStatus::Ok);
    assert!(results[1].score.unwrap() < results[0].score.unwrap());
    assert_eq!(results[2].status, SlideStatus::MissingRef);

    assert!(config.diff_image(1).exists());
    assert!(config.diff_image(2).exists());
    assert!(!config.diff_image(3).exists());

    let report = fs::read_to_string(config.report_file_path()).unwrap();
    assert!(report.starts_with("SLIDE VERIFICATION REPORT\n"));
    assert!(report.contains("Slide  1: 100.0% - OK"));
    assert!(report.contains("Slide  3: N/A - missing_ref"));
}

#[test]
fn test_skip_export_uses_existing_images() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), 1);
    fs::create_dir_all(config.export_dir_path()).unwrap();
    pattern(0).save(config.reference_image(1)).unwrap();
    pattern(0).save(config.export_image(1)).unwrap();

    let renderer = StubRenderer {
        images: Vec::new(),
        calls: Cell::new(0),
    };
    let results = verify::run(&config, &renderer, true).unwrap();
    assert_eq!(renderer.calls.get(), 0);
    assert_eq!(results[0].status, SlideStatus::Ok);
}

#[test]
fn test_missing_exports_do_not_abort() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), 2);
    pattern(0).save(config.reference_image(1)).unwrap();
    pattern(0).save(config.reference_image(2)).unwrap();

    let renderer = StubRenderer {
        images: vec![pattern(0)],
        calls: Cell::new(0),
    };
    let results = verify::run(&config, &renderer, false).unwrap();
    assert_eq!(results[1].status, SlideStatus::MissingExport);
}

#[test]
fn test_render_failure_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), 2);

    let err = verify::run(&config, &FailingRenderer, false).unwrap_err();
    assert!(format!("{:#}", err).contains("Export failed"));
    assert!(!config.report_file_path().exists());
    assert!(!config.diff_dir_path().exists());
}
