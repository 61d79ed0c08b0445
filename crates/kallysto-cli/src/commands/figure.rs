//! Figure command - publish an existing image and its data.

use std::path::PathBuf;

use kallysto::{EncodedImage, Parser, Payload, Publication, Registration, Registry, ResetMode};
use kallysto::export::FigureData;

use crate::cli::PublicationArgs;

pub fn run(
    args: &PublicationArgs,
    name: String,
    image: PathBuf,
    data: PathBuf,
    caption: String,
    width: f64,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !(width > 0.0 && width <= 1.0) {
        return Err(format!("Width must be in (0, 1], got {}", width).into());
    }

    let image = EncodedImage::from_file(&image)?;
    let format = image.format();
    let table = Parser::new().parse_file(&data)?;

    let config = super::load_config(args, ResetMode::Keep)?;
    let mut publication = Publication::new(config)?;

    let mut registry = Registry::new();
    let figure = FigureData::new(image, table, caption, format).with_width(width);
    let export = match registry.register(name, Payload::Figure(figure), false) {
        Registration::Rejected(reason) => return Err(reason.into()),
        registration => registration.into_export().ok_or("Export was not registered")?,
    };

    publication.publish(&export)?;
    let data_file = publication.data_file(&export.borrow().data_file());
    super::report(&export, &data_file, verbose);

    publication.close()?;
    Ok(())
}
