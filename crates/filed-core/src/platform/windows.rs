use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use winapi::um::fileapi::{GetFileAttributesW, INVALID_FILE_ATTRIBUTES};
use winapi::um::winnt::FILE_ATTRIBUTE_HIDDEN;

pub fn has_hidden_attribute(path: &Path) -> bool {
    let wide: Vec<u16> = path
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    let attributes = unsafe { GetFileAttributesW(wide.as_ptr()) };
    if attributes == INVALID_FILE_ATTRIBUTES {
        return false;
    }
    attributes & FILE_ATTRIBUTE_HIDDEN != 0
}
