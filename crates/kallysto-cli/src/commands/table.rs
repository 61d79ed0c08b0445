//! Table command - publish a table read from a delimited file.

use std::path::PathBuf;

use kallysto::{Parser, Publication, Registration, Registry, ResetMode};

use crate::cli::PublicationArgs;

pub fn run(
    args: &PublicationArgs,
    name: String,
    file: PathBuf,
    caption: String,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    let data = Parser::new().parse_file(&file)?;

    let config = super::load_config(args, ResetMode::Keep)?;
    let mut publication = Publication::new(config)?;

    let mut registry = Registry::new();
    let export = match registry.table(name, data, caption) {
        Registration::Rejected(reason) => return Err(reason.into()),
        registration => registration.into_export().ok_or("Export was not registered")?,
    };

    publication.publish(&export)?;
    let data_file = publication.data_file(&export.borrow().data_file());
    super::report(&export, &data_file, verbose);

    publication.close()?;
    Ok(())
}
