//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use kallysto::FormatterKind;

/// Kallysto: publish notebook results into LaTeX and Markdown documents
#[derive(Parser)]
#[command(name = "kallysto")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub publication: PublicationArgs,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Where to publish. Flags override values from the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct PublicationArgs {
    /// Publication config file (default: ./kallysto.toml if present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Notebook identifier
    #[arg(short, long, global = true)]
    pub notebook: Option<String>,

    /// Publication title
    #[arg(short, long, global = true)]
    pub title: Option<String>,

    /// Root folder holding one data store per title
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Document format (latex, markdown)
    #[arg(short, long, global = true)]
    pub format: Option<FormatterKind>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Prepare the data store and register the notebook's definitions
    Init {
        /// Remove this notebook's previous data, figures and definitions
        #[arg(long, conflicts_with = "fresh_start")]
        overwrite: bool,

        /// Also clear the shared audit log and include file
        #[arg(long, conflicts_with = "overwrite")]
        fresh_start: bool,
    },

    /// Publish a scalar value
    Value {
        /// Definition name
        #[arg(value_name = "NAME")]
        name: String,

        /// The value
        #[arg(value_name = "VALUE", allow_hyphen_values = true)]
        value: String,
    },

    /// Publish a table read from a CSV/TSV file
    Table {
        /// Definition name
        #[arg(value_name = "NAME")]
        name: String,

        /// Path to the data file (delimiter is auto-detected)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Table caption
        #[arg(long, default_value = "")]
        caption: String,
    },

    /// Publish an existing image together with the data behind it
    Figure {
        /// Definition name
        #[arg(value_name = "NAME")]
        name: String,

        /// Path to the image (pdf or png)
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Path to the data file (delimiter is auto-detected)
        #[arg(value_name = "DATA")]
        data: PathBuf,

        /// Figure caption
        #[arg(long, default_value = "")]
        caption: String,

        /// Fraction of the text width (LaTeX only)
        #[arg(long, default_value = "1.0")]
        width: f64,
    },

    /// Show the audit log for the publication
    Log {
        /// Include records from every notebook, not just this one
        #[arg(long)]
        all: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a Kallysto Markdown manuscript (.kmd) to Markdown
    Convert {
        /// Path to the manuscript
        #[arg(value_name = "KMD_FILE")]
        file: PathBuf,

        /// Include file listing the definitions files
        #[arg(long, value_name = "FILE")]
        include: PathBuf,
    },
}
