//! Render the DJ Foundations deck and compare each slide with its reference image.

use anyhow::Result;
use clap::Parser;
use deck_cli::{init_logging, load_config, verify};
use deck_verify::OfficeRenderer;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "verify-slides")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory the default paths are relative to
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Compare the images already in the export directory instead of rendering
    #[arg(long)]
    skip_export: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.base_dir.as_deref(), args.config.as_deref())?;
    let renderer = OfficeRenderer::from_config(&config);
    verify::run(&config, &renderer, args.skip_export)?;
    Ok(())
}
