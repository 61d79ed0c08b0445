//! LaTeX definitions.
//!
//! Each export becomes a named command. A `\providecommand` /
//! `\renewcommand` pair is emitted instead of `\newcommand` so that a
//! definitions file may define the same name more than once; LaTeX keeps
//! the last definition.

use crate::error::{KallystoError, Result};
use crate::export::{Export, FigureData, TableData, ValueData};

use super::{Formatter, FormatterKind, RenderContext, metadata_header};

/// Formatter for LaTeX manuscripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latex;

/// Wrap `body` in a redefinable command called `name`.
fn redefinable(name: &str, body: &str) -> String {
    format!(
        "\\providecommand{{\\{name}}}{{\ndummy}}\n\\renewcommand{{\\{name}}}{{\n{body}}}\n\n"
    )
}

/// Indent every line after the first so nested environments line up.
fn indent_continuation(text: &str, indent: &str) -> String {
    text.trim_end()
        .lines()
        .collect::<Vec<_>>()
        .join(&format!("\n{}", indent))
}

impl Formatter for Latex {
    fn kind(&self) -> FormatterKind {
        FormatterKind::Latex
    }

    fn src_dir(&self) -> &'static str {
        "tex"
    }

    fn includes_filename(&self) -> &'static str {
        "kallysto.tex"
    }

    fn definitions_filename(&self) -> &'static str {
        "_definitions.tex"
    }

    /// Command names are letters only.
    fn check_name(&self, name: &str) -> Result<()> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(KallystoError::Config(format!(
                "'{}' is not a valid LaTeX command name; use ASCII letters only",
                name
            )));
        }
        Ok(())
    }

    fn value(&self, export: &Export, value: &ValueData, ctx: &RenderContext<'_>) -> Result<String> {
        let mut out = metadata_header(export, ctx)?;
        out.push_str(&redefinable(export.name(), &value.value));
        Ok(out)
    }

    fn table(&self, export: &Export, table: &TableData, ctx: &RenderContext<'_>) -> Result<String> {
        let body = format!(
            "    \\begin{{table}}[h]\n\
             \x20       \\centering\n\
             \x20       {tabular}\n\
             \x20       \\caption{{{caption}}}\n\
             \x20       \\label{{{name}}}\n\
             \x20   \\end{{table}}\n",
            tabular = indent_continuation(&table.data.to_latex(), "        "),
            caption = table.caption,
            name = export.name(),
        );

        let mut out = metadata_header(export, ctx)?;
        out.push_str(&redefinable(export.name(), &body));
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
            "    \\begin{{figure}}\n\
             \x20       \\centering\n\
             \x20       \\includegraphics[width={width}\\textwidth]{{{image_file}}}\n\
             \x20       \\caption{{{caption}}}\n\
             \x20       \\label{{{name}}}\n\
             \x20   \\end{{figure}}\n",
            width = figure.width,
            image_file = image_file,
            caption = figure.caption,
            name = export.name(),
        );

        let mut out = metadata_header(export, ctx)?;
        out.push_str(&redefinable(export.name(), &body));
        Ok(out)
    }

    fn include(&self, ctx: &RenderContext<'_>) -> Result<String> {
        Ok(format!("\\input{{{}}}\n", ctx.defs_file_from_src()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{EncodedImage, ImageFormat, Payload};
    use crate::format::fixtures;
    use crate::input::DataTable;

    fn body(definition: &str) -> String {
        // Skip the metadata header, which carries timing information
        definition
            .lines()
            .skip_while(|line| line.starts_with('%'))
            .collect::<Vec<_>>()
            .join("\n")
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_value_definition() {
        let store = fixtures::store(&Latex);
        let ctx = fixtures::context(&store);
        let export = Export::new("meanSales", Payload::value(132.5));

        let def = Latex.render(&export, &ctx).unwrap();
        assert!(def.contains("% Data file: ../data/nb/meanSales.txt\n"));
        assert_eq!(
            body(&def),
            "\\providecommand{\\meanSales}{\ndummy}\n\\renewcommand{\\meanSales}{\n132.5}"
        );
        assert!(def.ends_with("}\n\n"));
    }

    #[test]
    fn test_table_definition() {
        let store = fixtures::store(&Latex);
        let ctx = fixtures::context(&store);
        let data = DataTable::from_rows(["region", "sales"], [["north", "1"], ["south", "2"]]);
        let export = Export::new("salesTable", Payload::table(data, "Sales by region."));

        let def = Latex.render(&export, &ctx).unwrap();
        assert!(def.contains("    \\begin{table}[h]\n        \\centering\n        \\begin{tabular}{lr}\n"));
        assert!(def.contains("        north & 1 \\\\\n"));
        assert!(def.contains("        \\caption{Sales by region.}\n"));
        assert!(def.contains("        \\label{salesTable}\n    \\end{table}\n}\n\n"));
    }

    #[test]
    fn test_figure_definition() {
        let store = fixtures::store(&Latex);
        let ctx = fixtures::context(&store);
        let figure = crate::export::FigureData::new(
            EncodedImage::new(ImageFormat::Pdf, vec![]),
            DataTable::from_rows(["x"], [["1"]]),
            "Trend.",
            ImageFormat::Pdf,
        )
        .with_width(0.8);
        let export = Export::new("trend", Payload::Figure(figure));

        let def = Latex.render(&export, &ctx).unwrap();
        assert!(def.contains("% Image file: ../figs/nb/trend.pdf\n% Data file: ../data/nb/trend.csv\n"));
        assert!(def.contains("\\includegraphics[width=0.8\\textwidth]{../figs/nb/trend.pdf}\n"));
        assert!(def.contains("\\caption{Trend.}"));
    }

    #[test]
    fn test_include() {
        let store = fixtures::store(&Latex);
        let ctx = fixtures::context(&store);
        assert_eq!(Latex.include(&ctx).unwrap(), "\\input{../defs/nb/_definitions.tex}\n");
    }

    #[test]
    fn test_command_names_are_letters_only() {
        assert!(Latex.check_name("meanSales").is_ok());
        for name in ["mean_sales2", "sales-2020", "a.b", "x1"] {
            assert!(matches!(Latex.check_name(name), Err(KallystoError::Config(_))), "{name}");
        }
    }
}
