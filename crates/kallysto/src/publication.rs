//! Publications: the bridge between a notebook and a document project.
//!
//! A [`Publication`] owns the data store layout for one (title, notebook)
//! pair, the formatter for the target document, and the append handles for
//! the audit log and the notebook's definitions file.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::audit::AuditRecord;
use crate::error::{KallystoError, Result};
use crate::export::{Export, ExportHandle, TIMESTAMP_FORMAT};
use crate::format::{Formatter, FormatterKind, RenderContext};
use crate::paths;
use crate::store::{AppendLog, DataStore, ResetMode};

/// Characters that cannot appear in a title or notebook identifier, which
/// become directory names and audit log fields.
const RESERVED_ID_CHARS: &[char] = &['/', '\\', ','];

/// Configuration for a [`Publication`].
///
/// Loadable from TOML; only `notebook` and `title` are required:
///
/// ```toml
/// notebook = "sales-analysis"
/// title = "quarterly-report"
/// formatter = "latex"
/// write_defs = true
/// reset = "overwrite"
/// pub_root = "../../pubs"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationConfig {
    /// Identifier of the producing notebook.
    pub notebook: String,
    /// Publication title; one folder per title under `pub_root`.
    pub title: String,
    /// Target document format.
    #[serde(default)]
    pub formatter: FormatterKind,
    /// Whether to write definitions and the include statement.
    #[serde(default = "default_write_defs")]
    pub write_defs: bool,
    /// What to clear before starting.
    #[serde(default)]
    pub reset: ResetMode,
    /// Root folder holding one data store per title. Relative paths are
    /// resolved against `notebook_root`.
    #[serde(default = "default_pub_root")]
    pub pub_root: PathBuf,
    /// Directory of the producing notebook (default: current directory).
    #[serde(default)]
    pub notebook_root: Option<PathBuf>,
    /// File name of the producing notebook (default: the notebook id).
    #[serde(default)]
    pub notebook_file: Option<String>,
    /// Document source directory (default: `<pub_root>/<title>/tex` or
    /// `md`). Relative paths are resolved against `notebook_root`.
    #[serde(default)]
    pub src_dir: Option<PathBuf>,
}

fn default_write_defs() -> bool {
    true
}

fn default_pub_root() -> PathBuf {
    PathBuf::from("../../pubs")
}

impl PublicationConfig {
    /// Configuration with defaults for everything but the identifiers.
    pub fn new(notebook: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            notebook: notebook.into(),
            title: title.into(),
            formatter: FormatterKind::default(),
            write_defs: default_write_defs(),
            reset: ResetMode::default(),
            pub_root: default_pub_root(),
            notebook_root: None,
            notebook_file: None,
            src_dir: None,
        }
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| KallystoError::io(path, e))?;
        let config: PublicationConfig = toml::from_str(&text)?;
        Ok(config)
    }

    pub fn with_formatter(mut self, formatter: FormatterKind) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_write_defs(mut self, write_defs: bool) -> Self {
        self.write_defs = write_defs;
        self
    }

    pub fn with_reset(mut self, reset: ResetMode) -> Self {
        self.reset = reset;
        self
    }

    pub fn with_pub_root(mut self, pub_root: impl Into<PathBuf>) -> Self {
        self.pub_root = pub_root.into();
        self
    }

    pub fn with_notebook_root(mut self, notebook_root: impl Into<PathBuf>) -> Self {
        self.notebook_root = Some(notebook_root.into());
        self
    }

    pub fn with_notebook_file(mut self, notebook_file: impl Into<String>) -> Self {
        self.notebook_file = Some(notebook_file.into());
        self
    }

    pub fn with_src_dir(mut self, src_dir: impl Into<PathBuf>) -> Self {
        self.src_dir = Some(src_dir.into());
        self
    }

    /// Check the identifiers and the root.
    pub fn validate(&self) -> Result<()> {
        validate_id("Notebook", &self.notebook)?;
        validate_id("Title", &self.title)?;
        if self.pub_root.as_os_str().is_empty() {
            return Err(KallystoError::Config(
                "Publication root must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The notebook directory as an absolute, normalized path.
    pub fn resolved_notebook_root(&self) -> Result<PathBuf> {
        let cwd = std::env::current_dir().map_err(|e| KallystoError::io(".", e))?;
        let root = match &self.notebook_root {
            Some(root) => paths::absolutize(root, &cwd),
            None => cwd,
        };
        Ok(paths::normalize(root))
    }

    /// Resolve the data store layout without touching the filesystem.
    pub fn store(&self, formatter: &dyn Formatter) -> Result<DataStore> {
        let notebook_root = self.resolved_notebook_root()?;
        let pub_root = paths::normalize(paths::absolutize(&self.pub_root, &notebook_root));
        let src_dir = self
            .src_dir
            .as_ref()
            .map(|dir| paths::normalize(paths::absolutize(dir, &notebook_root)));

        DataStore::new(
            &pub_root,
            &self.title,
            &self.notebook,
            src_dir.as_deref(),
            formatter,
        )
    }
}

fn validate_id(what: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(KallystoError::Config(format!("{} must not be empty", what)));
    }
    if id == "." || id == ".." {
        return Err(KallystoError::Config(format!("{} '{}' is not a valid name", what, id)));
    }
    if id
        .chars()
        .any(|c| c.is_control() || RESERVED_ID_CHARS.contains(&c))
    {
        return Err(KallystoError::Config(format!(
            "{} '{}' must not contain path separators, commas or control characters",
            what, id
        )));
    }
    Ok(())
}

/// A notebook's connection to one publication title.
///
/// Construction prepares the data store and leaves the publication ready
/// to receive exports:
///
/// ```no_run
/// use kallysto::{Publication, PublicationConfig, Registry, ResetMode};
///
/// let config = PublicationConfig::new("sales-analysis", "quarterly-report")
///     .with_reset(ResetMode::Overwrite);
/// let mut publication = Publication::new(config)?;
///
/// let mut registry = Registry::new();
/// if let Some(mean) = registry.value("meanSales", 132.5).into_export() {
///     publication.publish(&mean)?;
/// }
/// publication.close()?;
/// # Ok::<(), kallysto::KallystoError>(())
/// ```
#[derive(Debug)]
pub struct Publication {
    notebook: String,
    title: String,
    notebook_file: PathBuf,
    formatter: Box<dyn Formatter>,
    write_defs: bool,
    store: DataStore,
    exports: Vec<ExportHandle>,
    log: AppendLog,
    defs: Option<AppendLog>,
}

impl Publication {
    /// Create a publication using the configured built-in formatter.
    pub fn new(config: PublicationConfig) -> Result<Self> {
        let formatter = config.formatter.formatter();
        Self::with_formatter(config, formatter)
    }

    /// Create a publication with a custom formatter; `config.formatter` is
    /// ignored.
    pub fn with_formatter(config: PublicationConfig, formatter: Box<dyn Formatter>) -> Result<Self> {
        config.validate()?;

        let notebook_root = config.resolved_notebook_root()?;
        let store = config.store(formatter.as_ref())?;
        let notebook_file = notebook_root.join(
            config
                .notebook_file
                .as_deref()
                .unwrap_or(config.notebook.as_str()),
        );

        store.reset(config.reset);
        store.ensure(config.write_defs)?;

        let log = AppendLog::open(store.log_file())?;
        let defs = if config.write_defs {
            Some(AppendLog::open(store.defs_file())?)
        } else {
            None
        };

        let publication = Self {
            notebook: config.notebook,
            title: config.title,
            notebook_file,
            formatter,
            write_defs: config.write_defs,
            store,
            exports: Vec::new(),
            log,
            defs,
        };

        if publication.write_defs {
            publication.add_include()?;
        }

        info!(
            title = %publication.title,
            notebook = %publication.notebook,
            formatter = %publication.formatter.kind(),
            root = %publication.store.title_root().display(),
            "Publication ready"
        );
        Ok(publication)
    }

    /// Append this notebook's include statement to the include file unless
    /// a line of the file already matches it.
    fn add_include(&self) -> Result<()> {
        let include_file = self.store.include_file();
        let statement = self.include_statement()?;
        let line = statement.trim_end();

        let existing = fs::read_to_string(include_file).map_err(|e| KallystoError::io(include_file, e))?;
        if existing.lines().any(|l| l.trim_end() == line) {
            debug!(file = %include_file.display(), "Include statement already present");
            return Ok(());
        }

        let mut includes = AppendLog::open(include_file)?;
        if !existing.is_empty() && !existing.ends_with('\n') {
            includes.append_raw("\n")?;
        }
        includes.append_line(line)?;
        includes.close()
    }

    pub fn notebook(&self) -> &str {
        &self.notebook
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Absolute path of the producing notebook file.
    pub fn notebook_file(&self) -> &Path {
        &self.notebook_file
    }

    pub fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    pub fn write_defs(&self) -> bool {
        self.write_defs
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Exports sent to this publication, in order. The same export appears
    /// once per publish.
    pub fn exports(&self) -> &[ExportHandle] {
        &self.exports
    }

    /// Path of a data file for this notebook.
    pub fn data_file(&self, leaf: &str) -> PathBuf {
        self.store.data_file(leaf)
    }

    /// Path of a figure image for this notebook.
    pub fn fig_file(&self, leaf: &str) -> PathBuf {
        self.store.fig_file(leaf)
    }

    /// Context handed to the formatter for a publish at `exported_at`.
    pub fn render_context(&self, exported_at: DateTime<Local>) -> RenderContext<'_> {
        RenderContext {
            title: &self.title,
            notebook: &self.notebook,
            notebook_file: &self.notebook_file,
            store: &self.store,
            exported_at,
        }
    }

    /// The statement that includes this notebook's definitions.
    pub fn include_statement(&self) -> Result<String> {
        self.formatter.include(&self.render_context(Local::now()))
    }

    /// `path` relative to the document source directory, `/`-separated.
    pub fn path_from_src(&self, path: impl AsRef<Path>) -> Result<String> {
        self.relative_to(self.store.src_dir(), path.as_ref())
    }

    /// `path` relative to the logs directory, `/`-separated.
    pub fn path_from_logs(&self, path: impl AsRef<Path>) -> Result<String> {
        self.relative_to(self.store.logs_dir(), path.as_ref())
    }

    fn relative_to(&self, dir: &Path, path: &Path) -> Result<String> {
        let relative = paths::relative_path_from(dir, path, self.store.title_root())?;
        Ok(paths::to_slash(relative))
    }

    /// Build the audit record for publishing `export` at `published_at`.
    fn audit_record(&self, export: &Export, published_at: DateTime<Local>) -> Result<AuditRecord> {
        let mut paths = Vec::new();
        if let Some(image_file) = export.image_file() {
            paths.push(self.path_from_logs(self.store.fig_file(&image_file))?);
        }
        paths.push(self.path_from_logs(self.store.data_file(&export.data_file()))?);

        Ok(AuditRecord {
            uid: export.uid(),
            published_at: published_at.format(TIMESTAMP_FORMAT).to_string(),
            title: self.title.clone(),
            notebook: self.notebook.clone(),
            kind: export.kind(),
            paths,
        })
    }

    /// Publish an export to this publication.
    ///
    /// Renders the definition and audit record against this publication's
    /// paths, persists the payload, then appends the record and definition.
    /// A name the formatter cannot define, or a persistence failure, leaves
    /// the logs untouched.
    pub fn publish(&mut self, export: &ExportHandle) -> Result<ExportHandle> {
        let published_at = Local::now();

        let (def_str, log_str) = {
            let current = export.borrow();
            self.formatter.check_name(current.name())?;
            let def_str = self
                .formatter
                .render(&current, &self.render_context(published_at))?;
            let log_str = self.audit_record(&current, published_at)?.to_line()?;
            (def_str, log_str)
        };

        {
            let mut current = export.borrow_mut();
            current.def_str = Some(def_str);
            current.log_str = Some(log_str);
        }

        export.borrow().persist(&self.store)?;

        debug!(
            name = %export.borrow().name(),
            kind = %export.borrow().kind(),
            title = %self.title,
            notebook = %self.notebook,
            "Published export"
        );
        self.export(export)
    }

    /// Append an already rendered export to the logs and record it.
    ///
    /// Returns the same handle so calls can be chained.
    pub fn export(&mut self, export: &ExportHandle) -> Result<ExportHandle> {
        {
            let current = export.borrow();
            let log_str = current.log_str().ok_or_else(|| {
                KallystoError::Config(format!(
                    "Export '{}' has not been rendered for publishing",
                    current.name()
                ))
            })?;
            self.log.append_line(log_str)?;

            if let (Some(defs), Some(def_str)) = (self.defs.as_mut(), current.def_str()) {
                defs.append_raw(def_str)?;
            }
        }

        self.exports.push(Rc::clone(export));
        Ok(Rc::clone(export))
    }

    /// Flush and release the log handles.
    pub fn close(mut self) -> Result<()> {
        self.log.close()?;
        if let Some(defs) = self.defs.as_mut() {
            defs.close()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::Registry;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> PublicationConfig {
        PublicationConfig::new("nb", "paper")
            .with_notebook_root(dir.path().join("notebooks"))
            .with_pub_root("../pubs")
    }

    #[test]
    fn test_config_defaults_from_toml() {
        let config: PublicationConfig = toml::from_str("notebook = \"nb\"\ntitle = \"paper\"").unwrap();
        assert_eq!(config, PublicationConfig::new("nb", "paper"));
        assert!(config.write_defs);
        assert_eq!(config.pub_root, PathBuf::from("../../pubs"));
    }

    #[test]
    fn test_invalid_ids_rejected() {
        for (notebook, title) in [("", "paper"), ("nb", "a/b"), ("nb", "a,b"), ("..", "paper")] {
            let result = PublicationConfig::new(notebook, title).validate();
            assert!(matches!(result, Err(KallystoError::Config(_))), "{notebook:?} {title:?}");
        }
    }

    #[test]
    fn test_relative_roots_resolve_from_notebook_root() {
        let dir = TempDir::new().unwrap();
        let publication = Publication::new(config(&dir)).unwrap();

        assert_eq!(publication.store().title_root(), dir.path().join("pubs").join("paper"));
        assert_eq!(publication.notebook_file(), dir.path().join("notebooks").join("nb"));
        assert_eq!(
            publication.path_from_src(publication.notebook_file()).unwrap(),
            "../../../notebooks/nb"
        );
    }

    #[test]
    fn test_export_requires_rendering() {
        let dir = TempDir::new().unwrap();
        let mut publication = Publication::new(config(&dir)).unwrap();
        let mut registry = Registry::new();
        let export = registry.value("x", 1).into_export().unwrap();

        assert!(publication.export(&export).is_err());
        assert!(publication.exports().is_empty());
    }

    #[test]
    fn test_publish_chains() {
        let dir = TempDir::new().unwrap();
        let mut publication = Publication::new(config(&dir)).unwrap();
        let mut registry = Registry::new();
        let export = registry.value("x", 1).into_export().unwrap();

        let returned = publication.publish(&export).unwrap();
        assert!(Rc::ptr_eq(&returned, &export));
        assert_eq!(publication.exports().len(), 1);
    }
}
