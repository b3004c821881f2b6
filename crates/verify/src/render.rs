//! Rendering a deck to per-slide images through external tools.
//!
//! The office suite converts the deck to PDF, then the rasterizer turns
//! each page into a PNG. Both steps are blocking subprocesses with a
//! wall-clock limit.

use deck_core::config::export_file_name;
use deck_core::{Config, Error, Result};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Poll interval while waiting for a subprocess.
const POLL_INTERVAL_MS: u64 = 50;

/// Prefix the rasterizer uses for page images (`slide-1.png`, `slide-01.png`, ...).
const PAGE_PREFIX: &str = "slide";

/// Turns a deck file into one image per slide.
pub trait SlideRenderer {
    /// Render `deck` into `out_dir`, returning the slide images in slide order.
    fn render(&self, deck: &Path, out_dir: &Path) -> Result<Vec<PathBuf>>;
}

/// Renderer backed by a headless office suite and a PDF rasterizer.
#[derive(Debug, Clone)]
pub struct OfficeRenderer {
    pub soffice: PathBuf,
    pub rasterizer: PathBuf,
    pub dpi: u32,
    pub timeout: Duration,
}

impl OfficeRenderer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            soffice: config.soffice.clone(),
            rasterizer: config.rasterizer.clone(),
            dpi: config.dpi,
            timeout: Duration::from_secs(config.render_timeout_secs),
        }
    }

    /// Convert the deck to PDF inside `out_dir` and return the PDF path.
    fn convert_to_pdf(&self, deck: &Path, out_dir: &Path) -> Result<PathBuf> {
        log::info!("Converting to PDF...");
        let mut cmd = Command::new(&self.soffice);
        cmd.arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(out_dir)
            .arg(deck);
        let output = run_with_timeout(&mut cmd, self.timeout)?;
        log::debug!("Export output: {}", String::from_utf8_lossy(&output.stdout).trim());

        let mut pdfs = files_with_extension(out_dir, "pdf")?;
        pdfs.sort();
        let pdf = pdfs
            .into_iter()
            .next()
            .ok_or_else(|| Error::Render("No PDF generated".to_string()))?;
        log::info!("PDF created: {}", pdf.display());
        Ok(pdf)
    }

    /// Rasterize every PDF page to `<out_dir>/slide-N.png`.
    fn rasterize(&self, pdf: &Path, out_dir: &Path) -> Result<()> {
        log::info!("Converting PDF pages to PNG...");
        let mut cmd = Command::new(&self.rasterizer);
        cmd.arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(pdf)
            .arg(out_dir.join(PAGE_PREFIX));
        run_with_timeout(&mut cmd, self.timeout)?;
        Ok(())
    }
}

impl SlideRenderer for OfficeRenderer {
    fn render(&self, deck: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
        if out_dir.exists() {
            fs::remove_dir_all(out_dir)?;
        }
        fs::create_dir_all(out_dir)?;

        let pdf = self.convert_to_pdf(deck, out_dir)?;
        self.rasterize(&pdf, out_dir)?;

        let exported = rename_pages(out_dir)?;
        log::info!("Exported {} slide images", exported.len());
        Ok(exported)
    }
}

/// Rename rasterized pages to `export_slide_NN.png`, in page order.
pub fn rename_pages(out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages: Vec<(usize, PathBuf)> = files_with_extension(out_dir, "png")?
        .into_iter()
        .filter_map(|path| page_number(&path).map(|n| (n, path)))
        .collect();
    pages.sort();

    let mut renamed = Vec::with_capacity(pages.len());
    for (idx, (_, page)) in pages.into_iter().enumerate() {
        let target = out_dir.join(export_file_name(idx + 1));
        fs::rename(&page, &target)?;
        log::debug!("  {}", target.display());
        renamed.push(target);
    }
    Ok(renamed)
}

/// Page number of a rasterizer output such as `slide-07.png`.
fn page_number(path: &Path) -> Option<usize> {
    let stem = path.file_stem()?.to_str()?;
    let digits = stem.strip_prefix(PAGE_PREFIX)?.strip_prefix('-')?;
    digits.parse().ok()
}

fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(ext) {
            files.push(path);
        }
    }
    Ok(files)
}

/// Run a command to completion, capturing its output.
///
/// The child is killed once `timeout` elapses. A non-zero exit status is an
/// error carrying the captured stderr.
pub fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<Output> {
    let description = format!("{:?}", cmd);
    log::debug!("Running: {}", description);

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::Render(format!("Failed to execute {}: {}", description, e)))?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match wait_with_deadline(&mut child, timeout)? {
        Some(status) => status,
        None => {
            if let Err(e) = child.kill() {
                log::warn!("Failed to kill {}: {}", description, e);
            }
            let _ = child.wait();
            return Err(Error::Timeout {
                command: description,
                secs: timeout.as_secs(),
            });
        }
    };

    let output = Output {
        status,
        stdout: join_drain(stdout),
        stderr: join_drain(stderr),
    };

    if !output.status.success() {
        return Err(Error::Render(format!(
            "{} exited with {}: {}",
            description,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(output)
}

fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
) -> Result<Option<std::process::ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() > timeout {
            return Ok(None);
        }
        thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
    }
}

/// Read a pipe to its end on a separate thread so the child never blocks on a full pipe.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn join_drain(handle: Option<thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}
