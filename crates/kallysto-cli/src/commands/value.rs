//! Value command - publish a scalar.

use kallysto::{Publication, Registration, Registry, ResetMode};

use crate::cli::PublicationArgs;

pub fn run(
    args: &PublicationArgs,
    name: String,
    value: String,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(args, ResetMode::Keep)?;
    let mut publication = Publication::new(config)?;

    let mut registry = Registry::new();
    let export = match registry.value(name, value) {
        Registration::Rejected(reason) => return Err(reason.into()),
        registration => registration.into_export().ok_or("Export was not registered")?,
    };

    publication.publish(&export)?;
    let data_file = publication.data_file(&export.borrow().data_file());
    super::report(&export, &data_file, verbose);

    publication.close()?;
    Ok(())
}
