//! Property-based tests for path resolution and the export registry.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p kallysto --test property_tests
//!
//! # More cases
//! PROPTEST_CASES=10000 cargo test -p kallysto --test property_tests
//! ```

use std::path::PathBuf;
use std::rc::Rc;

use proptest::prelude::*;

use kallysto::paths::{normalize, relative_path_from, to_slash};
use kallysto::{DataTable, Registry};

// =============================================================================
// Test Strategies
// =============================================================================

/// A single path segment.
fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_\\-]{1,8}"
}

/// An absolute path of 0 to 5 segments.
fn absolute_path() -> impl Strategy<Value = PathBuf> {
    prop::collection::vec(segment(), 0..5).prop_map(|segments| {
        let mut path = PathBuf::from("/");
        path.extend(segments);
        path
    })
}

/// Names accepted by the registry.
fn export_name() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_]{0,12}"
}

// =============================================================================
// Path Properties
// =============================================================================

proptest! {
    /// Joining the relative path onto the starting directory leads back to
    /// the target.
    #[test]
    fn relative_path_resolves_to_target(from in absolute_path(), to in absolute_path()) {
        let relative = relative_path_from(&from, &to, "/").unwrap();
        prop_assert_eq!(normalize(from.join(&relative)), to);
    }

    /// Relative paths never start with the root.
    #[test]
    fn relative_path_is_relative(from in absolute_path(), to in absolute_path()) {
        let relative = relative_path_from(&from, &to, "/").unwrap();
        prop_assert!(relative.is_relative());
    }

    /// Normalizing twice changes nothing.
    #[test]
    fn normalize_is_idempotent(segments in prop::collection::vec(
        prop_oneof![segment(), Just(".".to_string()), Just("..".to_string())],
        0..8,
    )) {
        let mut path = PathBuf::from("/");
        path.extend(&segments);
        let once = normalize(&path);
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(!to_slash(&once).contains("/./"));
    }
}

// =============================================================================
// Registry Properties
// =============================================================================

proptest! {
    /// However names repeat, each is registered once and lookups return
    /// the first export registered under it.
    #[test]
    fn first_registration_wins(names in prop::collection::vec(export_name(), 1..20)) {
        let mut registry = Registry::new();
        let mut first = std::collections::HashMap::new();

        for (i, name) in names.iter().enumerate() {
            let registration = if i % 2 == 0 {
                registry.value(name.clone(), i)
            } else {
                registry.table(name.clone(), DataTable::from_rows(["i"], [[i]]), "")
            };
            let handle = registration.into_export().unwrap();
            let original = first.entry(name.clone()).or_insert_with(|| Rc::clone(&handle));
            prop_assert!(Rc::ptr_eq(original, &handle));
        }

        prop_assert_eq!(registry.len(), first.len());
        for (name, handle) in &first {
            prop_assert!(Rc::ptr_eq(&registry.get(name).unwrap(), handle));
        }
    }

    /// Uids of successive exports are strictly increasing.
    #[test]
    fn uids_increase(count in 2usize..50) {
        let mut registry = Registry::new();
        let uids: Vec<_> = (0..count)
            .map(|i| registry.value(format!("v{}", i), i).into_export().unwrap().borrow().uid())
            .collect();
        prop_assert!(uids.windows(2).all(|w| w[0] < w[1]));
    }
}
