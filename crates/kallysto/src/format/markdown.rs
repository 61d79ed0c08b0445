//! Markdown definitions in the `{name:value}` block syntax.
//!
//! Definitions files use the `.kmd` extension. The [`crate::markdown`]
//! converter substitutes them for `{name}` references in a manuscript.

use crate::error::Result;
use crate::export::{Export, FigureData, TableData, ValueData};

use super::{Formatter, FormatterKind, RenderContext, metadata_header};

/// Formatter for Markdown manuscripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Markdown;

fn block(name: &str, body: &str) -> String {
    format!("{{{}:{}}}\n\n", name, body)
}

impl Formatter for Markdown {
    fn kind(&self) -> FormatterKind {
        FormatterKind::Markdown
    }

    fn src_dir(&self) -> &'static str {
        "md"
    }

    fn includes_filename(&self) -> &'static str {
        "kallysto.kmd"
    }

    fn definitions_filename(&self) -> &'static str {
        "_definitions.kmd"
    }

    fn value(&self, export: &Export, value: &ValueData, ctx: &RenderContext<'_>) -> Result<String> {
        let mut out = metadata_header(export, ctx)?;
        out.push_str(&block(export.name(), &value.value));
        Ok(out)
    }

    fn table(&self, export: &Export, table: &TableData, ctx: &RenderContext<'_>) -> Result<String> {
        let mut out = metadata_header(export, ctx)?;
        out.push_str(&block(export.name(), &table.data.to_pipe_table()));
        Ok(out)
    }

    fn figure(
        &self,
        export: &Export,
        figure: &FigureData,
        ctx: &RenderContext<'_>,
    ) -> Result<String> {
        let image_file = ctx.image_file_from_src(export)?.unwrap_or_default();
        let body = format!(
            "![{}]({} \"{}\")",
            export.name(),
            image_file,
            figure.caption.replace('"', "'")
        );

        let mut out = metadata_header(export, ctx)?;
        out.push_str(&block(export.name(), &body));
        Ok(out)
    }

    fn include(&self, ctx: &RenderContext<'_>) -> Result<String> {
        Ok(format!("{}\n", ctx.defs_file_from_src()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{EncodedImage, ImageFormat, Payload};
    use crate::format::fixtures;
    use crate::input::DataTable;

    #[test]
    fn test_value_block() {
        let store = fixtures::store(&Markdown);
        let ctx = fixtures::context(&store);
        let export = Export::new("meanSales", Payload::value(132.5));

        let def = Markdown.render(&export, &ctx).unwrap();
        assert!(def.starts_with("% Uid: "));
        assert!(def.contains("% Data file: ../data/nb/meanSales.txt\n"));
        assert!(def.ends_with("{meanSales:132.5}\n\n"));
    }

    #[test]
    fn test_table_block() {
        let store = fixtures::store(&Markdown);
        let ctx = fixtures::context(&store);
        let data = DataTable::from_rows(["region", "sales"], [["north", "10"], ["south", "2"]]);
        let export = Export::new("salesTable", Payload::table(data, "Sales"));

        let def = Markdown.render(&export, &ctx).unwrap();
        assert!(def.contains(
            "{salesTable:| region | sales |\n|:-------|------:|\n| north  |    10 |\n| south  |     2 |}\n\n"
        ));
    }

    #[test]
    fn test_figure_block() {
        let store = fixtures::store(&Markdown);
        let ctx = fixtures::context(&store);
        let export = Export::new(
            "trend",
            Payload::figure(
                EncodedImage::new(ImageFormat::Png, vec![]),
                DataTable::from_rows(["x"], [["1"]]),
                "Sales trend",
                ImageFormat::Png,
            ),
        );

        let def = Markdown.render(&export, &ctx).unwrap();
        assert!(def.ends_with("{trend:![trend](../figs/nb/trend.png \"Sales trend\")}\n\n"));
    }

    #[test]
    fn test_include_and_file_names() {
        let store = fixtures::store(&Markdown);
        let ctx = fixtures::context(&store);

        assert_eq!(Markdown.include(&ctx).unwrap(), "../defs/nb/_definitions.kmd\n");
        assert_eq!(Markdown.includes_filename(), "kallysto.kmd");
        assert_eq!(store.src_dir(), std::path::Path::new("/pubs/paper/md"));
    }

    #[test]
    fn test_block_names_allow_digits_and_underscores() {
        assert!(Markdown.check_name("mean_sales2").is_ok());
        assert!(Markdown.check_name("sales-2020").is_ok());
    }
}
