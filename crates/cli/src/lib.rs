//! Rebuild and verification pipelines shared by the `rebuild-slides` and
//! `verify-slides` binaries.

use anyhow::{Context, Result};
use deck_core::Config;
use std::path::Path;

pub mod rebuild;
pub mod verify;

/// Width of the `=` rules framing console sections.
pub const RULE_WIDTH: usize = 60;

/// Set up `env_logger`: `info` by default, `debug` when verbose. `RUST_LOG` wins.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Load the configuration from `config` if given, otherwise use the
/// defaults. An explicit `base_dir` overrides the one in the file; without
/// either, paths are relative to the current directory.
pub fn load_config(base_dir: Option<&Path>, config: Option<&Path>) -> Result<Config> {
    let mut config = match config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::from_base_dir("."),
    };
    if let Some(base_dir) = base_dir {
        config.base_dir = base_dir.to_path_buf();
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Print a section header between two rules.
pub(crate) fn banner(title: &str) {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{}", title);
    println!("{}", "=".repeat(RULE_WIDTH));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_defaults_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(dir.path()), None).unwrap();
        assert_eq!(config.base_dir, dir.path());
        assert_eq!(config.output_pptx_path(), dir.path().join("DJ_Foundations.pptx"));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.json");
        std::fs::write(&path, r#"{ "output_pptx": "fixed.pptx", "last_slide": 5 }"#).unwrap();

        let config = load_config(None, Some(&path)).unwrap();
        assert_eq!(config.last_slide, 5);
        assert_eq!(config.output_pptx_path(), dir.path().join("fixed.pptx"));

        let config = load_config(Some(Path::new("/decks")), Some(&path)).unwrap();
        assert_eq!(config.output_pptx_path(), Path::new("/decks/fixed.pptx"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(None, Some(&dir.path().join("absent.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
