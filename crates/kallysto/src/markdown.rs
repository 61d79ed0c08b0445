//! Convert a Kallysto Markdown manuscript (`.kmd`) to plain Markdown.
//!
//! A manuscript refers to exports as `{name}`. The include file produced by
//! a Markdown publication lists one definitions file per notebook; every
//! `{name:value}` block in those files supplies a replacement.
//!
//! Values cannot contain `}`.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::error::{KallystoError, Result};

static DEFINITION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{([^{}:\s]+):(.*?)\}").unwrap());
static REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}:\s]+)\}").unwrap());

/// Extract every `{name:value}` block from `text`.
///
/// Values may span lines. A name defined more than once keeps its last
/// value.
pub fn parse_definitions(text: &str) -> IndexMap<String, String> {
    let mut defs = IndexMap::new();
    for caps in DEFINITION.captures_iter(text) {
        defs.insert(caps[1].to_string(), caps[2].to_string());
    }
    defs
}

/// Read the definitions files listed in `include_file`.
///
/// Each non-empty line is a path relative to the include file's directory.
/// Files are merged in order, so later notebooks win on shared names.
pub fn include_definitions(include_file: impl AsRef<Path>) -> Result<IndexMap<String, String>> {
    let include_file = include_file.as_ref();
    let base = include_file.parent().unwrap_or(Path::new("."));
    let listing = fs::read_to_string(include_file).map_err(|e| KallystoError::io(include_file, e))?;

    let mut defs = IndexMap::new();
    for line in listing.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let defs_file = base.join(line);
        let text = fs::read_to_string(&defs_file).map_err(|e| KallystoError::io(&defs_file, e))?;
        let found = parse_definitions(&text);
        debug!(file = %defs_file.display(), count = found.len(), "Read definitions");
        defs.extend(found);
    }
    Ok(defs)
}

/// Replace each `{name}` in `text` with its definition.
///
/// References without a definition are left as they are.
pub fn replace_references(text: &str, defs: &IndexMap<String, String>) -> String {
    REFERENCE
        .replace_all(text, |caps: &Captures| match defs.get(&caps[1]) {
            Some(value) => value.clone(),
            None => {
                debug!(name = &caps[1], "No definition for reference");
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Convert `kmd_file` using the definitions listed in `include_file`.
///
/// Writes `<stem>.md` next to the manuscript and returns its path.
pub fn to_markdown(kmd_file: impl AsRef<Path>, include_file: impl AsRef<Path>) -> Result<PathBuf> {
    let kmd_file = kmd_file.as_ref();
    let defs = include_definitions(include_file)?;

    let text = fs::read_to_string(kmd_file).map_err(|e| KallystoError::io(kmd_file, e))?;
    let md_file = kmd_file.with_extension("md");
    if md_file == kmd_file {
        return Err(KallystoError::Config(format!(
            "'{}' would be overwritten by its own output",
            kmd_file.display()
        )));
    }

    fs::write(&md_file, replace_references(&text, &defs)).map_err(|e| KallystoError::io(&md_file, e))?;
    debug!(from = %kmd_file.display(), to = %md_file.display(), "Converted manuscript");
    Ok(md_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_definitions_with_headers() {
        let text = "% Uid: 1.000001\n% Data file: ../data/nb/a.txt\n{a:1}\n\n{table:| x |\n|--:|\n| 1 |}\n\n{a:2}\n\n";
        let defs = parse_definitions(text);

        assert_eq!(defs.len(), 2);
        assert_eq!(defs["a"], "2");
        assert_eq!(defs["table"], "| x |\n|--:|\n| 1 |");
    }

    #[test]
    fn test_replace_references() {
        let mut defs = IndexMap::new();
        defs.insert("meanSales".to_string(), "132.5".to_string());

        let out = replace_references("Mean sales were {meanSales}, see {missing}.", &defs);
        assert_eq!(out, "Mean sales were 132.5, see {missing}.");
    }

    #[test]
    fn test_to_markdown() {
        let dir = TempDir::new().unwrap();
        let defs_dir = dir.path().join("defs").join("nb");
        let src_dir = dir.path().join("md");
        fs::create_dir_all(&defs_dir).unwrap();
        fs::create_dir_all(&src_dir).unwrap();

        fs::write(defs_dir.join("_definitions.kmd"), "{meanSales:132.5}\n\n").unwrap();
        fs::write(src_dir.join("kallysto.kmd"), "../defs/nb/_definitions.kmd\n").unwrap();
        fs::write(src_dir.join("paper.kmd"), "# Results\n\nMean: {meanSales}\n").unwrap();

        let md = to_markdown(src_dir.join("paper.kmd"), src_dir.join("kallysto.kmd")).unwrap();
        assert_eq!(md, src_dir.join("paper.md"));
        assert_eq!(fs::read_to_string(md).unwrap(), "# Results\n\nMean: 132.5\n");
    }

    #[test]
    fn test_missing_definitions_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let include = dir.path().join("kallysto.kmd");
        fs::write(&include, "missing.kmd\n").unwrap();

        assert!(matches!(include_definitions(&include), Err(KallystoError::Io { .. })));
    }
}
