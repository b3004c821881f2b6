//! Rebuild the DJ Foundations deck from its pristine source with corrected
//! slide layouts.

use anyhow::Result;
use clap::Parser;
use deck_cli::{init_logging, load_config, rebuild};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rebuild-slides")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pass `analyze` to print shape inventories without modifying the deck
    #[arg(value_parser = ["analyze"])]
    mode: Option<String>,

    /// Directory the default paths are relative to
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.base_dir.as_deref(), args.config.as_deref())?;

    if args.mode.is_some() {
        rebuild::analyze(&config)?;
    } else {
        let outcome = rebuild::run(&config)?;
        log::debug!(
            "Placed {} shapes, clamped {} text heights",
            outcome.placed,
            outcome.height_fixes.len()
        );
    }
    Ok(())
}
