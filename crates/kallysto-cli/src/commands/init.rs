//! Init command - prepare the data store for a notebook.

use colored::Colorize;
use kallysto::{Publication, ResetMode};

use crate::cli::PublicationArgs;

pub fn run(
    args: &PublicationArgs,
    overwrite: bool,
    fresh_start: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let reset = if fresh_start {
        ResetMode::FreshStart
    } else if overwrite {
        ResetMode::Overwrite
    } else {
        ResetMode::Keep
    };

    let config = super::load_config(args, reset)?;
    let publication = Publication::new(config)?;
    let store = publication.store();

    println!(
        "{} {} for notebook {}",
        "Initialized".green().bold(),
        publication.title().white().bold(),
        publication.notebook().white().bold()
    );
    println!("  Data store: {}", store.title_root().display());
    println!("  Source:     {}", store.src_dir().display());
    if publication.write_defs() {
        println!("  Include:    {}", store.include_file().display());
        if verbose {
            println!();
            println!("Add this to the document if it does not include {} yet:", store.include_file().display());
            println!("  {}", publication.include_statement()?.trim_end().cyan());
        }
    }
    if reset != ResetMode::Keep {
        println!("  Reset:      {:?}", reset);
    }

    publication.close()?;
    Ok(())
}
