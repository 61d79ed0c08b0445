//! On-disk layout of a publication's data store.
//!
//! ```text
//! <pub_root>/<title>/
//! ├── data/<notebook>/<name>.csv | <name>.txt
//! ├── figs/<notebook>/<name>.pdf | <name>.png
//! ├── defs/<notebook>/_definitions.<ext>
//! └── logs/kallysto.log
//! <src>/kallysto.<ext>
//! ```
//!
//! Paths are computed once, up front, and are absolute and lexically
//! normalized. Nothing touches the filesystem until [`DataStore::reset`] or
//! [`DataStore::ensure`] is called.

mod append_log;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{KallystoError, Result};
use crate::format::Formatter;
use crate::paths;

pub use append_log::AppendLog;

/// Per-notebook data files.
pub const DATA_DIR: &str = "data";
/// Per-notebook figure images.
pub const FIGS_DIR: &str = "figs";
/// Per-notebook definitions files.
pub const DEFS_DIR: &str = "defs";
/// Shared audit log directory.
pub const LOGS_DIR: &str = "logs";
/// Audit log file name.
pub const LOG_FILE: &str = "kallysto.log";

/// What to clear before a publication starts writing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetMode {
    /// Leave everything in place; new definitions are appended.
    #[default]
    Keep,
    /// Remove this notebook's data, figures and definitions.
    Overwrite,
    /// As `Overwrite`, and also remove the shared audit log and the
    /// include-aggregation file.
    FreshStart,
}

/// Resolved paths for one (title, notebook) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataStore {
    title_root: PathBuf,
    data_dir: PathBuf,
    figs_dir: PathBuf,
    defs_dir: PathBuf,
    logs_dir: PathBuf,
    src_dir: PathBuf,
    defs_file: PathBuf,
    log_file: PathBuf,
    include_file: PathBuf,
}

impl DataStore {
    /// Compute the layout under `pub_root`.
    ///
    /// `pub_root` and `src_dir` must be absolute. Without an explicit
    /// `src_dir` the document source lives in the formatter's default
    /// directory under the title root.
    pub fn new(
        pub_root: &Path,
        title: &str,
        notebook: &str,
        src_dir: Option<&Path>,
        formatter: &dyn Formatter,
    ) -> Result<Self> {
        require_absolute(pub_root, "Publication root")?;

        let title_root = paths::normalize(pub_root.join(title));
        let src_dir = match src_dir {
            Some(dir) => {
                require_absolute(dir, "Source directory")?;
                paths::normalize(dir)
            }
            None => title_root.join(formatter.src_dir()),
        };

        let data_dir = title_root.join(DATA_DIR).join(notebook);
        let figs_dir = title_root.join(FIGS_DIR).join(notebook);
        let defs_dir = title_root.join(DEFS_DIR).join(notebook);
        let logs_dir = title_root.join(LOGS_DIR);

        // A reset would delete the document source along with the notebook's files
        for dir in [&data_dir, &figs_dir, &defs_dir] {
            if src_dir.starts_with(dir) {
                return Err(KallystoError::Config(format!(
                    "Source directory '{}' lies inside '{}'",
                    src_dir.display(),
                    dir.display()
                )));
            }
        }

        Ok(Self {
            defs_file: defs_dir.join(formatter.definitions_filename()),
            log_file: logs_dir.join(LOG_FILE),
            include_file: src_dir.join(formatter.includes_filename()),
            title_root,
            data_dir,
            figs_dir,
            defs_dir,
            logs_dir,
            src_dir,
        })
    }

    /// Clear previous output according to `mode`.
    ///
    /// Removal is best effort: anything that cannot be removed, including
    /// things that do not exist, is logged and skipped.
    pub fn reset(&self, mode: ResetMode) {
        if mode == ResetMode::Keep {
            return;
        }

        info!(mode = ?mode, root = %self.title_root.display(), "Resetting data store");
        for dir in [&self.data_dir, &self.figs_dir, &self.defs_dir] {
            remove(dir, |p| fs::remove_dir_all(p));
        }

        if mode == ResetMode::FreshStart {
            remove(&self.log_file, |p| fs::remove_file(p));
            remove(&self.include_file, |p| fs::remove_file(p));
        }
    }

    /// Create the directories and files a publication writes to.
    ///
    /// The definitions directory and file, and the include file, are only
    /// created when `write_defs` is set.
    pub fn ensure(&self, write_defs: bool) -> Result<()> {
        let mut dirs = vec![&self.data_dir, &self.figs_dir, &self.logs_dir, &self.src_dir];
        if write_defs {
            dirs.push(&self.defs_dir);
        }
        for dir in dirs {
            fs::create_dir_all(dir).map_err(|e| KallystoError::io(dir, e))?;
        }

        touch(&self.log_file)?;
        if write_defs {
            touch(&self.defs_file)?;
            touch(&self.include_file)?;
        }

        debug!(root = %self.title_root.display(), "Data store ready");
        Ok(())
    }

    /// `<pub_root>/<title>`.
    pub fn title_root(&self) -> &Path {
        &self.title_root
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn figs_dir(&self) -> &Path {
        &self.figs_dir
    }

    pub fn defs_dir(&self) -> &Path {
        &self.defs_dir
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Document source directory.
    pub fn src_dir(&self) -> &Path {
        &self.src_dir
    }

    /// This notebook's definitions file.
    pub fn defs_file(&self) -> &Path {
        &self.defs_file
    }

    /// The shared audit log.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// The include-aggregation file in the source directory.
    pub fn include_file(&self) -> &Path {
        &self.include_file
    }

    /// Path of a data file in this notebook's data directory.
    pub fn data_file(&self, leaf: &str) -> PathBuf {
        self.data_dir.join(leaf)
    }

    /// Path of an image file in this notebook's figures directory.
    pub fn fig_file(&self, leaf: &str) -> PathBuf {
        self.figs_dir.join(leaf)
    }
}

fn require_absolute(path: &Path, what: &str) -> Result<()> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(KallystoError::Config(format!(
            "{} '{}' must be absolute",
            what,
            path.display()
        )))
    }
}

fn remove(path: &Path, op: fn(&Path) -> io::Result<()>) {
    match op(path) {
        Ok(()) => info!(path = %path.display(), "Removed"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "Nothing to remove")
        }
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove, continuing"),
    }
}

fn touch(path: &Path) -> Result<()> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(|_| ())
        .map_err(|e| KallystoError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{Latex, Markdown};
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> DataStore {
        DataStore::new(dir.path(), "paper", "nb", None, &Latex).unwrap()
    }

    #[test]
    fn test_layout() {
        let store = DataStore::new(Path::new("/pubs/./x/.."), "paper", "nb", None, &Markdown).unwrap();

        assert_eq!(store.title_root(), Path::new("/pubs/paper"));
        assert_eq!(store.data_file("a.csv"), Path::new("/pubs/paper/data/nb/a.csv"));
        assert_eq!(store.fig_file("a.png"), Path::new("/pubs/paper/figs/nb/a.png"));
        assert_eq!(store.defs_file(), Path::new("/pubs/paper/defs/nb/_definitions.kmd"));
        assert_eq!(store.log_file(), Path::new("/pubs/paper/logs/kallysto.log"));
        assert_eq!(store.include_file(), Path::new("/pubs/paper/md/kallysto.kmd"));
    }

    #[test]
    fn test_relative_roots_rejected() {
        let result = DataStore::new(Path::new("pubs"), "paper", "nb", None, &Latex);
        assert!(matches!(result, Err(KallystoError::Config(_))));

        let result = DataStore::new(Path::new("/pubs"), "paper", "nb", Some(Path::new("tex")), &Latex);
        assert!(matches!(result, Err(KallystoError::Config(_))));
    }

    #[test]
    fn test_src_inside_notebook_dirs_rejected() {
        let result = DataStore::new(
            Path::new("/pubs"),
            "paper",
            "nb",
            Some(Path::new("/pubs/paper/defs/nb/tex")),
            &Latex,
        );
        assert!(matches!(result, Err(KallystoError::Config(_))));
    }

    #[test]
    fn test_ensure_creates_layout() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure(true).unwrap();

        assert!(store.data_dir().is_dir());
        assert!(store.figs_dir().is_dir());
        assert!(store.src_dir().is_dir());
        assert!(store.log_file().is_file());
        assert!(store.defs_file().is_file());
        assert!(store.include_file().is_file());
    }

    #[test]
    fn test_ensure_without_defs() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure(false).unwrap();

        assert!(store.log_file().is_file());
        assert!(!store.defs_dir().exists());
        assert!(!store.include_file().exists());
    }

    #[test]
    fn test_reset_modes() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure(true).unwrap();
        fs::write(store.data_file("x.txt"), "1").unwrap();

        store.reset(ResetMode::Keep);
        assert!(store.data_file("x.txt").exists());

        store.reset(ResetMode::Overwrite);
        assert!(!store.data_dir().exists());
        assert!(!store.defs_dir().exists());
        assert!(store.log_file().exists());
        assert!(store.include_file().exists());

        store.reset(ResetMode::FreshStart);
        assert!(!store.log_file().exists());
        assert!(!store.include_file().exists());
    }

    #[test]
    fn test_reset_on_missing_store_is_harmless() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.reset(ResetMode::FreshStart);
        assert!(!store.title_root().exists());
    }

    #[test]
    fn test_reset_mode_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            reset: ResetMode,
        }
        let wrapper: Wrapper = toml::from_str("reset = \"fresh_start\"").unwrap();
        assert_eq!(wrapper.reset, ResetMode::FreshStart);
    }
}
