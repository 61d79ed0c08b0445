//! Relative path computation between the notebook, data store and document
//! source directories.
//!
//! Everything here is lexical: paths are made absolute against a base
//! directory and normalized without touching the filesystem, so the
//! directories involved do not need to exist yet.

use std::path::{Component, Path, PathBuf};

use crate::error::{KallystoError, Result};

/// Join `path` onto `base` unless it is already absolute.
pub fn absolutize(path: impl AsRef<Path>, base: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.as_ref().join(path)
    }
}

/// Lexically remove `.` components and resolve `..` against preceding
/// components.
///
/// `..` never climbs above the root of an absolute path. Leading `..`
/// components of a relative path are kept.
pub fn normalize(path: impl AsRef<Path>) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.as_ref().components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(name) => out.push(name),
        }
    }

    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Compute the path of `to` relative to the directory `from_dir`.
///
/// Relative inputs are resolved against the current working directory.
pub fn relative_path(from_dir: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(|e| KallystoError::io(".", e))?;
    relative_path_from(from_dir, to, cwd)
}

/// Compute the path of `to` relative to `from_dir`, resolving relative
/// inputs against `base`.
///
/// Returns `.` when both resolve to the same location. Paths that share no
/// root (different drive prefixes) cannot be related and are a
/// configuration error.
pub fn relative_path_from(
    from_dir: impl AsRef<Path>,
    to: impl AsRef<Path>,
    base: impl AsRef<Path>,
) -> Result<PathBuf> {
    let base = base.as_ref();
    if !base.is_absolute() {
        return Err(KallystoError::Config(format!(
            "Base directory '{}' must be absolute",
            base.display()
        )));
    }

    let from = normalize(absolutize(from_dir, base));
    let to = normalize(absolutize(to, base));

    let from_components: Vec<Component> = from.components().collect();
    let to_components: Vec<Component> = to.components().collect();

    if from_components.first() != to_components.first() {
        return Err(KallystoError::Config(format!(
            "Cannot relate '{}' to '{}': no common root",
            to.display(),
            from.display()
        )));
    }

    let common = from_components
        .iter()
        .zip(&to_components)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in &from_components[common..] {
        relative.push("..");
    }
    for component in &to_components[common..] {
        relative.push(component.as_os_str());
    }

    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    Ok(relative)
}

/// Render a path with `/` separators, as expected by LaTeX and Markdown
/// regardless of the host platform.
pub fn to_slash(path: impl AsRef<Path>) -> String {
    let mut out = String::new();
    for component in path.as_ref().components() {
        match component {
            Component::RootDir => out.push('/'),
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    out
}
