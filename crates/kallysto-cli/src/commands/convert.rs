//! Convert command - substitute published definitions into a manuscript.

use std::path::PathBuf;

use colored::Colorize;

pub fn run(
    file: PathBuf,
    include: PathBuf,
    _verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let md_file = kallysto::markdown::to_markdown(&file, &include)?;
    println!(
        "{} {} -> {}",
        "Converted".green().bold(),
        file.display(),
        md_file.display().to_string().white().bold()
    );
    Ok(())
}
