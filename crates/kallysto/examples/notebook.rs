//! Example: publish results from an analysis program into a LaTeX paper.
//!
//! Usage:
//!   cargo run --example notebook -- <csv_file> [pub_root]
//!
//! Example:
//!   cargo run --example notebook -- sales.csv /tmp/pubs

use std::env;
use std::path::PathBuf;

use kallysto::{Parser, Publication, PublicationConfig, Registry, ResetMode};

fn main() -> kallysto::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example notebook -- <csv_file> [pub_root]");
        std::process::exit(1);
    }

    let table = Parser::new().parse_file(&args[1])?;
    let pub_root = args.get(2).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("pubs"));

    let config = PublicationConfig::new("example", "sales-report")
        .with_pub_root(pub_root)
        .with_reset(ResetMode::Overwrite);
    let mut publication = Publication::new(config)?;
    let mut registry = Registry::new();

    // A scalar computed from the first numeric column
    let numeric = (0..table.column_count()).find(|&i| table.is_numeric_column(i));
    if let Some(index) = numeric {
        let values: Vec<f64> = table
            .column_values(index)
            .filter_map(|v| v.trim().parse().ok())
            .collect();
        let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;

        if let Some(export) = registry.value("meanValue", format!("{:.2}", mean)).into_export() {
            publication.publish(&export)?;
        }
    }

    let caption = format!("Data from {}.", args[1]);
    if let Some(export) = registry.table("dataTable", table, caption).into_export() {
        publication.publish(&export)?;
        println!("{}", export.borrow().def_str().unwrap_or_default());
    }

    let store = publication.store();
    println!("Definitions: {}", store.defs_file().display());
    println!("Include:     {}", store.include_file().display());
    println!("Audit log:   {}", store.log_file().display());

    publication.close()
}
