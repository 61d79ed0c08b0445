//! Name registry for exports.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{info, warn};

use crate::input::DataTable;

use super::{Export, Image, ImageFormat, Payload};

/// Shared handle to an export.
///
/// The same export can be published to several publications; each keeps a
/// handle to it. Exports are single-threaded by design.
pub type ExportHandle = Rc<RefCell<Export>>;

/// Characters that would break a definition, a `{name}` reference or an
/// audit log line.
const RESERVED_CHARS: &[char] = &['{', '}', ':', ',', '\\', '/', '%', '#'];

/// Outcome of registering an export.
#[derive(Debug)]
pub enum Registration {
    /// A new export was registered (possibly replacing one, when
    /// overwriting was requested).
    Created(ExportHandle),
    /// The name was already taken; this is the export registered under it.
    Existing(ExportHandle),
    /// The name cannot be used as a definition name.
    Rejected(String),
}

impl Registration {
    /// The export, unless the name was rejected.
    pub fn export(&self) -> Option<&ExportHandle> {
        match self {
            Registration::Created(handle) | Registration::Existing(handle) => Some(handle),
            Registration::Rejected(_) => None,
        }
    }

    /// Consume into the export, unless the name was rejected.
    pub fn into_export(self) -> Option<ExportHandle> {
        match self {
            Registration::Created(handle) | Registration::Existing(handle) => Some(handle),
            Registration::Rejected(_) => None,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Registration::Created(_))
    }

    pub fn is_existing(&self) -> bool {
        matches!(self, Registration::Existing(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Registration::Rejected(_))
    }
}

/// Check that `name` can be used as a definition name.
///
/// Names must be non-empty and contain no whitespace or reserved
/// characters (`{ } : , \ / % #`).
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Export name is empty".to_string());
    }
    if let Some(ch) = name
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || RESERVED_CHARS.contains(c))
    {
        return Err(format!(
            "Export name '{}' contains reserved character {:?}",
            name, ch
        ));
    }
    Ok(())
}

/// Registry of exports keyed by name, in registration order.
///
/// Names are unique across values, tables and figures because they share
/// one definition namespace in the target document. Registering a taken
/// name returns the existing export unless overwriting is requested.
#[derive(Default)]
pub struct Registry {
    exports: IndexMap<String, ExportHandle>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an export.
    ///
    /// With `overwrite = false` a taken name yields
    /// [`Registration::Existing`] and a warning; with `overwrite = true` the
    /// previous export is replaced in place.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        payload: Payload,
        overwrite: bool,
    ) -> Registration {
        let name = name.into();

        if let Err(reason) = validate_name(&name) {
            warn!(name = %name, %reason, "Rejected export name");
            return Registration::Rejected(reason);
        }

        if let Some(existing) = self.exports.get(&name) {
            if !overwrite {
                warn!(
                    name = %name,
                    kind = %existing.borrow().kind(),
                    "Export name already registered, returning the existing export"
                );
                return Registration::Existing(Rc::clone(existing));
            }
            info!(name = %name, kind = %payload.kind(), "Overwriting registered export");
        }

        let handle = Rc::new(RefCell::new(Export::new(name.clone(), payload)));
        self.exports.insert(name, Rc::clone(&handle));
        Registration::Created(handle)
    }

    /// Register a value without overwriting.
    pub fn value(&mut self, name: impl Into<String>, value: impl fmt::Display) -> Registration {
        self.register(name, Payload::value(value), false)
    }

    /// Register a table without overwriting.
    pub fn table(
        &mut self,
        name: impl Into<String>,
        data: DataTable,
        caption: impl Into<String>,
    ) -> Registration {
        self.register(name, Payload::table(data, caption), false)
    }

    /// Register a figure without overwriting.
    pub fn figure(
        &mut self,
        name: impl Into<String>,
        image: impl Image + 'static,
        data: DataTable,
        caption: impl Into<String>,
        format: ImageFormat,
    ) -> Registration {
        self.register(name, Payload::figure(image, data, caption, format), false)
    }

    /// Look up an export by name.
    pub fn get(&self, name: &str) -> Option<ExportHandle> {
        self.exports.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.exports.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.exports.keys().map(|k| k.as_str())
    }

    /// Registered exports in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExportHandle)> {
        self.exports.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Remove an export, returning it if it was registered.
    ///
    /// Publications it was sent to keep their handles.
    pub fn remove(&mut self, name: &str) -> Option<ExportHandle> {
        self.exports.shift_remove(name)
    }

    /// Drop every registration.
    pub fn clear(&mut self) {
        self.exports.clear();
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.exports.keys().collect::<Vec<_>>())
            .finish()
    }
}
