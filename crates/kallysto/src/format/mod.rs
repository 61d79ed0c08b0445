//! Formatters turn an export into a document definition.
//!
//! Each formatter renders values, tables and figures for one document
//! format, plus the include statement that pulls a notebook's definitions
//! file into the document. Formatters do no I/O: everything they need
//! arrives through the [`RenderContext`].
//!
//! Every path a formatter embeds is relative to the document source
//! directory, since that is where the definitions are consumed from.

mod latex;
mod markdown;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{KallystoError, Result};
use crate::export::{Export, FigureData, Payload, TableData, TIMESTAMP_FORMAT, ValueData};
use crate::paths;
use crate::store::DataStore;

pub use latex::Latex;
pub use markdown::Markdown;

/// Everything a formatter may refer to while rendering.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    /// Publication title.
    pub title: &'a str,
    /// Producing notebook identifier.
    pub notebook: &'a str,
    /// Absolute path of the producing notebook file.
    pub notebook_file: &'a Path,
    /// The publication's data store layout.
    pub store: &'a DataStore,
    /// Time of the publish call being rendered.
    pub exported_at: DateTime<Local>,
}

impl RenderContext<'_> {
    /// Path of `path` relative to the document source directory, with `/`
    /// separators.
    ///
    /// Fails when `path` cannot be related to the source directory, e.g. it
    /// lives on another drive.
    pub fn from_src(&self, path: impl AsRef<Path>) -> Result<String> {
        let relative =
            paths::relative_path_from(self.store.src_dir(), path, self.store.src_dir())?;
        Ok(paths::to_slash(relative))
    }

    /// Data file of `export`, relative to the document source directory.
    pub fn data_file_from_src(&self, export: &Export) -> Result<String> {
        self.from_src(self.store.data_file(&export.data_file()))
    }

    /// Image file of `export`, relative to the document source directory.
    pub fn image_file_from_src(&self, export: &Export) -> Result<Option<String>> {
        export
            .image_file()
            .map(|leaf| self.from_src(self.store.fig_file(&leaf)))
            .transpose()
    }

    /// The notebook's definitions file, relative to the document source
    /// directory.
    pub fn defs_file_from_src(&self) -> Result<String> {
        self.from_src(self.store.defs_file())
    }

    /// Publish time in the shared timestamp format.
    pub fn exported_str(&self) -> String {
        self.exported_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Renders definitions for one document format.
pub trait Formatter: fmt::Debug {
    /// Which built-in variant this is, if any.
    fn kind(&self) -> FormatterKind;

    /// Default name of the document source directory under the title root.
    fn src_dir(&self) -> &'static str;

    /// File name of the include-aggregation file in the source directory.
    fn includes_filename(&self) -> &'static str;

    /// File name of each notebook's definitions file.
    fn definitions_filename(&self) -> &'static str;

    /// Check that `name` can be defined in this format.
    ///
    /// Names already pass [`crate::export::validate_name`]; formats with
    /// stricter identifier rules refuse the rest here.
    fn check_name(&self, _name: &str) -> Result<()> {
        Ok(())
    }

    /// Definition for a value export.
    fn value(&self, export: &Export, value: &ValueData, ctx: &RenderContext<'_>) -> Result<String>;

    /// Definition for a table export.
    fn table(&self, export: &Export, table: &TableData, ctx: &RenderContext<'_>) -> Result<String>;

    /// Definition for a figure export.
    fn figure(
        &self,
        export: &Export,
        figure: &FigureData,
        ctx: &RenderContext<'_>,
    ) -> Result<String>;

    /// Statement that includes this notebook's definitions file.
    fn include(&self, ctx: &RenderContext<'_>) -> Result<String>;

    /// Dispatch on the export's payload.
    fn render(&self, export: &Export, ctx: &RenderContext<'_>) -> Result<String> {
        match export.payload() {
            Payload::Value(value) => self.value(export, value, ctx),
            Payload::Table(table) => self.table(export, table, ctx),
            Payload::Figure(figure) => self.figure(export, figure, ctx),
        }
    }
}

/// The `% `-prefixed metadata block that heads every definition.
pub fn metadata_header(export: &Export, ctx: &RenderContext<'_>) -> Result<String> {
    let mut header = format!(
        "% Uid: {}\n% Created: {}\n% Exported: {}\n% Title: {}\n% Notebook: {}\n",
        export.uid(),
        export.created_str(),
        ctx.exported_str(),
        ctx.title,
        ctx.from_src(ctx.notebook_file)?,
    );
    if let Some(image_file) = ctx.image_file_from_src(export)? {
        header.push_str(&format!("% Image file: {}\n", image_file));
    }
    header.push_str(&format!("% Data file: {}\n", ctx.data_file_from_src(export)?));
    Ok(header)
}

/// Built-in formatter variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterKind {
    #[default]
    Latex,
    Markdown,
}

impl FormatterKind {
    /// Instantiate the formatter for this variant.
    pub fn formatter(&self) -> Box<dyn Formatter> {
        match self {
            FormatterKind::Latex => Box::new(Latex),
            FormatterKind::Markdown => Box::new(Markdown),
        }
    }
}

impl fmt::Display for FormatterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatterKind::Latex => write!(f, "latex"),
            FormatterKind::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for FormatterKind {
    type Err = KallystoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "latex" | "tex" => Ok(FormatterKind::Latex),
            "markdown" | "md" | "kmd" => Ok(FormatterKind::Markdown),
            other => Err(KallystoError::Config(format!(
                "Unknown formatter: {}. Use latex or markdown.",
                other
            ))),
        }
    }
}
