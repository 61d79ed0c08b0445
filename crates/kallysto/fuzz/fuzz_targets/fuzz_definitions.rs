//! Fuzz target for the Markdown definitions converter.
//!
//! The definition and reference patterns run over untrusted manuscript
//! text and must not panic on pathological input.

#![no_main]

use kallysto::markdown::{parse_definitions, replace_references};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }

    let text = String::from_utf8_lossy(data);
    let defs = parse_definitions(&text);
    let _ = replace_references(&text, &defs);
});
