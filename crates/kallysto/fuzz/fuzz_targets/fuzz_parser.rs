//! Fuzz target for the data parser.
//!
//! The CSV/TSV parser must never panic on malformed input, and whatever it
//! parses must render as LaTeX and as a pipe table.

#![no_main]

use kallysto::Parser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    if let Ok(table) = Parser::new().parse_bytes(data) {
        let _ = table.to_latex();
        let _ = table.to_pipe_table();
        let _ = table.to_csv_string();
    }
});
