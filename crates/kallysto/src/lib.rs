//! Kallysto: publish values, tables and figures from analysis code into a
//! LaTeX or Markdown document project.
//!
//! Each publish produces three things: a definition the document can refer
//! to by name, a data file holding the underlying data, and a line in an
//! append-only audit log.
//!
//! # Core Principles
//!
//! - **Named exports**: a document refers to `\meanSales` or `{meanSales}`,
//!   never to a literal number copied out of a notebook
//! - **Traceable**: every definition carries the uid, timestamps and data
//!   file it came from, and every publish is logged
//! - **Document agnostic**: the document source is never parsed or built
//!
//! # Example
//!
//! ```no_run
//! use kallysto::{DataTable, Publication, PublicationConfig, Registry};
//!
//! let mut publication = Publication::new(PublicationConfig::new("analysis", "paper"))?;
//! let mut registry = Registry::new();
//!
//! let table = DataTable::from_rows(["region", "sales"], [["north", "120.5"], ["south", "98"]]);
//! if let Some(export) = registry.table("salesTable", table, "Sales by region.").into_export() {
//!     publication.publish(&export)?;
//! }
//! # Ok::<(), kallysto::KallystoError>(())
//! ```

pub mod audit;
pub mod error;
pub mod export;
pub mod format;
pub mod input;
pub mod markdown;
pub mod paths;
pub mod publication;
pub mod store;

pub use audit::AuditRecord;
pub use error::{KallystoError, Result};
pub use export::{
    EncodedImage, Export, ExportHandle, ExportKind, Image, ImageFormat, Payload, Registration,
    Registry, Uid,
};
pub use format::{Formatter, FormatterKind, Latex, Markdown, RenderContext};
pub use input::{DataTable, Parser, ParserConfig};
pub use publication::{Publication, PublicationConfig};
pub use store::{AppendLog, DataStore, ResetMode};
