//! Fuzz target for audit log lines.
//!
//! Parsing arbitrary lines must never panic, and any line that parses must
//! render back to a line that parses to the same record.

#![no_main]

use kallysto::AuditRecord;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);

    if let Ok(record) = AuditRecord::parse(&line) {
        if let Ok(rendered) = record.to_line() {
            let reparsed = AuditRecord::parse(&rendered).expect("rendered line must parse");
            assert_eq!(reparsed, record);
        }
    }
});
