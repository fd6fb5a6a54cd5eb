#[cfg(target_os = "windows")]
pub mod windows;

use std::path::Path;

/// Whether a directory entry should be treated as hidden.
///
/// On Unix-likes this is the dot-prefix convention on the entry name; on
/// Windows it is the `FILE_ATTRIBUTE_HIDDEN` bit of the entry at `path`.
#[cfg(target_os = "windows")]
pub fn is_hidden(path: &Path, _name: &str) -> bool {
    windows::has_hidden_attribute(path)
}

#[cfg(not(target_os = "windows"))]
pub fn is_hidden(_path: &Path, name: &str) -> bool {
    name.starts_with('.')
}
