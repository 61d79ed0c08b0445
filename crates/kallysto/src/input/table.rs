//! In-memory tabular data and its text renderings.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A labeled 2-D table of string cells.
///
/// This is the data behind table and figure exports. It serializes to CSV
/// for the data store and renders as a LaTeX `tabular` or a Markdown pipe
/// table for definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Create a new data table.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Build a table from anything displayable.
    ///
    /// ```
    /// use kallysto::DataTable;
    ///
    /// let table = DataTable::from_rows(["region", "sales"], [["north", "120.5"], ["south", "98"]]);
    /// assert_eq!(table.row_count(), 2);
    /// ```
    pub fn from_rows<H, R, C>(
        headers: impl IntoIterator<Item = H>,
        rows: impl IntoIterator<Item = R>,
    ) -> Self
    where
        H: ToString,
        R: IntoIterator<Item = C>,
        C: ToString,
    {
        Self {
            headers: headers.into_iter().map(|h| h.to_string()).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// A column is numeric when every non-empty cell parses as a number and
    /// at least one cell is non-empty.
    pub fn is_numeric_column(&self, index: usize) -> bool {
        let mut seen = false;
        for value in self.column_values(index) {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.parse::<f64>().is_err() {
                return false;
            }
            seen = true;
        }
        seen
    }

    /// Serialize as CSV (header row first) into `writer`.
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Serialize as a CSV string.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Render as a booktabs-style LaTeX `tabular`.
    ///
    /// Numeric columns are right aligned; cell text is escaped.
    pub fn to_latex(&self) -> String {
        let alignment: String = (0..self.column_count())
            .map(|i| if self.is_numeric_column(i) { 'r' } else { 'l' })
            .collect();

        let mut out = format!("\\begin{{tabular}}{{{}}}\n\\toprule\n", alignment);
        out.push_str(&latex_row(&self.headers));
        out.push_str("\\midrule\n");
        for row in &self.rows {
            out.push_str(&latex_row(row));
        }
        out.push_str("\\bottomrule\n\\end{tabular}\n");
        out
    }

    /// Render as a Markdown pipe table with padded columns.
    pub fn to_pipe_table(&self) -> String {
        let numeric: Vec<bool> = (0..self.column_count())
            .map(|i| self.is_numeric_column(i))
            .collect();

        let widths: Vec<usize> = (0..self.column_count())
            .map(|i| {
                self.column_values(i)
                    .map(|v| v.chars().count())
                    .chain(std::iter::once(self.headers[i].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let render = |cells: &[String]| -> String {
            let padded: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, &width)| {
                    let cell = cells.get(i).map(|s| s.as_str()).unwrap_or("");
                    if numeric[i] {
                        format!("{:>width$}", cell)
                    } else {
                        format!("{:<width$}", cell)
                    }
                })
                .collect();
            format!("| {} |", padded.join(" | "))
        };

        let separator: Vec<String> = widths
            .iter()
            .zip(&numeric)
            .map(|(&width, &is_numeric)| {
                if is_numeric {
                    format!("{}:", "-".repeat(width + 1))
                } else {
                    format!(":{}", "-".repeat(width + 1))
                }
            })
            .collect();

        let mut lines = vec![render(self.headers.as_slice()), format!("|{}|", separator.join("|"))];
        lines.extend(self.rows.iter().map(|row| render(row.as_slice())));
        lines.join("\n")
    }
}

fn latex_row(cells: &[String]) -> String {
    let escaped: Vec<String> = cells.iter().map(|c| latex_escape(c)).collect();
    format!("{} \\\\\n", escaped.join(" & "))
}

/// Escape LaTeX special characters in table cell text.
pub(crate) fn latex_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\textbackslash{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales() -> DataTable {
        DataTable::from_rows(
            ["region", "sales"],
            [["north", "120.5"], ["south", "98"], ["east", "7"]],
        )
    }

    #[test]
    fn test_numeric_column_detection() {
        let table = sales();
        assert!(!table.is_numeric_column(0));
        assert!(table.is_numeric_column(1));
    }

    #[test]
    fn test_csv_string() {
        let csv = sales().to_csv_string().unwrap();
        assert_eq!(csv, "region,sales\nnorth,120.5\nsouth,98\neast,7\n");
    }

    #[test]
    fn test_csv_quotes_delimiters() {
        let table = DataTable::from_rows(["label"], [["a, b"]]);
        assert_eq!(table.to_csv_string().unwrap(), "label\n\"a, b\"\n");
    }

    #[test]
    fn test_to_latex() {
        let latex = sales().to_latex();
        assert!(latex.starts_with("\\begin{tabular}{lr}\n\\toprule\nregion & sales \\\\\n"));
        assert!(latex.contains("\\midrule\nnorth & 120.5 \\\\\n"));
        assert!(latex.ends_with("\\bottomrule\n\\end{tabular}\n"));
    }

    #[test]
    fn test_latex_escape() {
        assert_eq!(latex_escape("50% of R&D_cost"), "50\\% of R\\&D\\_cost");
        assert_eq!(latex_escape("a\\b"), "a\\textbackslash{}b");
    }

    #[test]
    fn test_to_pipe_table() {
        let table = sales().to_pipe_table();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "| region | sales |");
        assert_eq!(lines[1], "|:-------|------:|");
        assert_eq!(lines[2], "| north  | 120.5 |");
        assert_eq!(lines[4], "| east   |     7 |");
    }
}
