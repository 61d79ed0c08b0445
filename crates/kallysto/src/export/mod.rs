//! Exports: named artifacts (values, tables, figures) that can be published
//! into a document project.
//!
//! An [`Export`] is created through a [`Registry`], which enforces that each
//! name is used once. Publishing it fills in its definition and log strings;
//! every publish overwrites them.
//!
//! ```
//! use kallysto::{DataTable, Registry};
//!
//! let mut registry = Registry::new();
//! let mean = registry.value("meanSales", 132.5).into_export().unwrap();
//! assert_eq!(mean.borrow().data_file(), "meanSales.txt");
//!
//! // A second registration under the same name returns the first export.
//! let again = registry.table("meanSales", DataTable::from_rows(["a"], [["1"]]), "");
//! assert!(again.is_existing());
//! ```

mod image;
mod registry;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{KallystoError, Result};
use crate::input::DataTable;
use crate::store::DataStore;

pub use image::{EncodedImage, Image, ImageFormat};
pub use registry::{ExportHandle, Registration, Registry, validate_name};

/// Format used for every human-readable timestamp Kallysto writes.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The variant of an export, as recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExportKind {
    Value,
    Table,
    Figure,
}

impl ExportKind {
    /// The audit log tag for this variant.
    pub fn tag(&self) -> &'static str {
        match self {
            ExportKind::Value => "VALUE",
            ExportKind::Table => "TABLE",
            ExportKind::Figure => "FIGURE",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ExportKind {
    type Err = KallystoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "VALUE" => Ok(ExportKind::Value),
            "TABLE" => Ok(ExportKind::Table),
            "FIGURE" => Ok(ExportKind::Figure),
            other => Err(KallystoError::Config(format!("Unknown export kind: {}", other))),
        }
    }
}

/// Creation timestamp used as an export's immutable identity.
///
/// Stored as microseconds since the Unix epoch and displayed as
/// `<seconds>.<microseconds>`. Uids handed out by one process are strictly
/// increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Uid(i64);

impl Uid {
    /// Allocate a uid from the current time.
    pub fn now() -> Self {
        static LAST: AtomicI64 = AtomicI64::new(0);

        let now = Utc::now().timestamp_micros();
        let mut previous = LAST.load(Ordering::SeqCst);
        loop {
            let next = now.max(previous + 1);
            match LAST.compare_exchange(previous, next, Ordering::SeqCst, Ordering::SeqCst) {
                Ok(_) => return Uid(next),
                Err(actual) => previous = actual,
            }
        }
    }

    /// Build a uid from microseconds since the epoch.
    pub fn from_micros(micros: i64) -> Self {
        Uid(micros)
    }

    /// Microseconds since the epoch.
    pub fn as_micros(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:06}",
            self.0.div_euclid(1_000_000),
            self.0.rem_euclid(1_000_000)
        )
    }
}

impl FromStr for Uid {
    type Err = KallystoError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || KallystoError::Config(format!("Invalid uid: {}", s));
        let (secs, micros) = s.split_once('.').ok_or_else(invalid)?;
        if micros.len() != 6 {
            return Err(invalid());
        }
        let secs: i64 = secs.parse().map_err(|_| invalid())?;
        let micros: i64 = micros.parse().map_err(|_| invalid())?;
        if !(0..1_000_000).contains(&micros) {
            return Err(invalid());
        }
        secs.checked_mul(1_000_000)
            .and_then(|us| us.checked_add(micros))
            .map(Uid)
            .ok_or_else(invalid)
    }
}

/// A scalar value rendered through its `Display` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueData {
    pub value: String,
}

/// A table with its caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableData {
    pub data: DataTable,
    pub caption: String,
}

/// A figure: the image, the data behind it, and how it is placed.
#[derive(Debug)]
pub struct FigureData {
    pub image: Box<dyn Image>,
    pub data: DataTable,
    pub caption: String,
    pub format: ImageFormat,
    /// Fraction of the text width the figure occupies in LaTeX output.
    pub width: f64,
}

impl FigureData {
    /// Create figure data at full text width.
    pub fn new(
        image: impl Image + 'static,
        data: DataTable,
        caption: impl Into<String>,
        format: ImageFormat,
    ) -> Self {
        Self {
            image: Box::new(image),
            data,
            caption: caption.into(),
            format,
            width: 1.0,
        }
    }

    /// Set the fraction of the text width used by the figure.
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }
}

/// The variant-specific content of an export.
#[derive(Debug)]
pub enum Payload {
    Value(ValueData),
    Table(TableData),
    Figure(FigureData),
}

impl Payload {
    /// A value payload from anything displayable.
    pub fn value(value: impl fmt::Display) -> Self {
        Payload::Value(ValueData {
            value: value.to_string(),
        })
    }

    /// A table payload.
    pub fn table(data: DataTable, caption: impl Into<String>) -> Self {
        Payload::Table(TableData {
            data,
            caption: caption.into(),
        })
    }

    /// A figure payload at full text width.
    pub fn figure(
        image: impl Image + 'static,
        data: DataTable,
        caption: impl Into<String>,
        format: ImageFormat,
    ) -> Self {
        Payload::Figure(FigureData::new(image, data, caption, format))
    }

    /// The variant of this payload.
    pub fn kind(&self) -> ExportKind {
        match self {
            Payload::Value(_) => ExportKind::Value,
            Payload::Table(_) => ExportKind::Table,
            Payload::Figure(_) => ExportKind::Figure,
        }
    }
}

/// A named artifact pending or already sent to a publication.
#[derive(Debug)]
pub struct Export {
    name: String,
    uid: Uid,
    created: DateTime<Local>,
    pub(crate) def_str: Option<String>,
    pub(crate) log_str: Option<String>,
    payload: Payload,
}

impl Export {
    /// Exports are created through [`Registry`] so names stay unique.
    pub(crate) fn new(name: impl Into<String>, payload: Payload) -> Self {
        Self {
            name: name.into(),
            uid: Uid::now(),
            created: Local::now(),
            def_str: None,
            log_str: None,
            payload,
        }
    }

    /// The definition name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Immutable creation uid.
    pub fn uid(&self) -> Uid {
        self.uid
    }

    /// When the export was created.
    pub fn created(&self) -> DateTime<Local> {
        self.created
    }

    /// Creation time in [`TIMESTAMP_FORMAT`].
    pub fn created_str(&self) -> String {
        self.created.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Definition produced by the most recent publish.
    pub fn def_str(&self) -> Option<&str> {
        self.def_str.as_deref()
    }

    /// Audit record produced by the most recent publish.
    pub fn log_str(&self) -> Option<&str> {
        self.log_str.as_deref()
    }

    /// The variant-specific content.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The variant of this export.
    pub fn kind(&self) -> ExportKind {
        self.payload.kind()
    }

    /// Leaf name of the data file: `<name>.txt` for values, `<name>.csv`
    /// for tables and figures.
    pub fn data_file(&self) -> String {
        match self.payload {
            Payload::Value(_) => format!("{}.txt", self.name),
            Payload::Table(_) | Payload::Figure(_) => format!("{}.csv", self.name),
        }
    }

    /// Leaf name of the image file, for figures.
    pub fn image_file(&self) -> Option<String> {
        match &self.payload {
            Payload::Figure(figure) => {
                Some(format!("{}.{}", self.name, figure.format.extension()))
            }
            _ => None,
        }
    }

    /// Write the payload into the data store.
    ///
    /// Values are written as UTF-8 text, tables and figure data as CSV, and
    /// figure images in their requested format.
    pub(crate) fn persist(&self, store: &DataStore) -> Result<()> {
        let data_path = store.data_file(&self.data_file());

        match &self.payload {
            Payload::Value(value) => write_file(&data_path, value.value.as_bytes()),
            Payload::Table(table) => write_file(&data_path, table.data.to_csv_string()?.as_bytes()),
            Payload::Figure(figure) => {
                write_file(&data_path, figure.data.to_csv_string()?.as_bytes())?;

                let image_file = format!("{}.{}", self.name, figure.format.extension());
                let image_path = store.fig_file(&image_file);
                figure
                    .image
                    .save(&image_path, figure.format)
                    .map_err(|e| KallystoError::persistence(&image_path, e))
            }
        }
    }
}

fn write_file(path: &std::path::Path, contents: &[u8]) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| KallystoError::persistence(path, e))
}
