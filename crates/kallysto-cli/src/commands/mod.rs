//! CLI command implementations.

pub mod convert;
pub mod figure;
pub mod init;
pub mod log;
pub mod table;
pub mod value;

use std::path::{Path, PathBuf};

use colored::Colorize;
use kallysto::{ExportHandle, PublicationConfig, ResetMode};

use crate::cli::PublicationArgs;

/// Config file picked up from the working directory when `--config` is
/// not given.
const DEFAULT_CONFIG: &str = "kallysto.toml";

/// Build the publication config from the config file and flags.
///
/// Resets only happen through `init`, so the loaded reset mode is replaced
/// with `reset`.
pub fn load_config(
    args: &PublicationArgs,
    reset: ResetMode,
) -> Result<PublicationConfig, Box<dyn std::error::Error>> {
    let file = match &args.config {
        Some(path) => Some(path.clone()),
        None => Some(PathBuf::from(DEFAULT_CONFIG)).filter(|p| p.exists()),
    };

    let mut config = match file {
        Some(path) => PublicationConfig::load(&path)?,
        None => {
            let (Some(notebook), Some(title)) = (&args.notebook, &args.title) else {
                return Err(format!(
                    "No {} found. Pass --notebook and --title, or --config <FILE>.",
                    DEFAULT_CONFIG
                )
                .into());
            };
            PublicationConfig::new(notebook.clone(), title.clone())
        }
    };

    if let Some(notebook) = &args.notebook {
        config.notebook = notebook.clone();
    }
    if let Some(title) = &args.title {
        config.title = title.clone();
    }
    if let Some(root) = &args.root {
        config.pub_root = root.clone();
    }
    if let Some(format) = args.format {
        config.formatter = format;
    }
    config.reset = reset;

    Ok(config)
}

/// Print a one-line summary of a publish.
pub fn report(export: &ExportHandle, data_file: &Path, verbose: bool) {
    let export = export.borrow();
    println!(
        "{} {} {}",
        "Published".green().bold(),
        export.kind().to_string().cyan(),
        export.name().white().bold()
    );
    println!("  Data: {}", data_file.display());

    if verbose {
        if let Some(def_str) = export.def_str() {
            println!();
            println!("{}", def_str.trim_end().dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kallysto::FormatterKind;
    use tempfile::TempDir;

    #[test]
    fn test_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kallysto.toml");
        std::fs::write(&path, "notebook = \"nb\"\ntitle = \"paper\"\nreset = \"fresh_start\"\n").unwrap();

        let args = PublicationArgs {
            config: Some(path),
            title: Some("thesis".to_string()),
            format: Some(FormatterKind::Markdown),
            ..Default::default()
        };
        let config = load_config(&args, ResetMode::Keep).unwrap();

        assert_eq!(config.notebook, "nb");
        assert_eq!(config.title, "thesis");
        assert_eq!(config.formatter, FormatterKind::Markdown);
        assert_eq!(config.reset, ResetMode::Keep);
    }

    #[test]
    fn test_flags_without_config_file() {
        let args = PublicationArgs {
            config: None,
            notebook: Some("nb".to_string()),
            title: Some("paper".to_string()),
            root: Some(PathBuf::from("/tmp/pubs")),
            format: None,
        };
        let config = load_config(&args, ResetMode::Overwrite).unwrap();

        assert_eq!(config.pub_root, PathBuf::from("/tmp/pubs"));
        assert_eq!(config.reset, ResetMode::Overwrite);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = PublicationArgs {
            config: Some(PathBuf::from("does-not-exist.toml")),
            ..Default::default()
        };
        assert!(load_config(&args, ResetMode::Keep).is_err());
    }
}
