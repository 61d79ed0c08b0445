//! Tabular data: the in-memory table behind table and figure exports, and
//! the delimited-text parser used to read data files back.

mod parser;
mod table;

pub use parser::{Parser, ParserConfig};
pub use table::DataTable;
