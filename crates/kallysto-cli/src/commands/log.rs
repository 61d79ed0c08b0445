//! Log command - show the audit log of a publication.

use colored::Colorize;
use kallysto::audit::read_log;
use kallysto::ResetMode;

use crate::cli::PublicationArgs;

pub fn run(
    args: &PublicationArgs,
    all: bool,
    json_output: bool,
    _verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(args, ResetMode::Keep)?;
    config.validate()?;

    // Resolve paths only; reading must not create the data store
    let store = config.store(config.formatter.formatter().as_ref())?;

    if !store.log_file().exists() {
        return Err(format!(
            "No audit log at {}\nRun 'kallysto init' first.",
            store.log_file().display()
        )
        .into());
    }

    let records: Vec<_> = read_log(store.log_file())?
        .into_iter()
        .filter(|r| all || r.notebook == config.notebook)
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!(
        "{} {} ({} records)",
        "Audit log for".cyan().bold(),
        config.title.white(),
        records.len()
    );
    println!();
    for record in &records {
        println!(
            "{}  {:<8} {:<12} {}",
            record.published_at.dimmed(),
            record.kind.to_string().yellow(),
            record.notebook,
            record.paths.join(", ")
        );
    }

    Ok(())
}
