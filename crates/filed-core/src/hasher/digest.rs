use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

/// Read buffer for streaming file content into the digest.
pub const HASH_BUFFER_SIZE: usize = 30 * 1024;

/// BLAKE3 digest of the whole file as 64 lowercase hex characters.
/// Memory use is bounded by [`HASH_BUFFER_SIZE`] regardless of file size.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    hash_reader(&mut file)
}

/// Like [`hash_file`], but `Ok(None)` for anything that is not a regular
/// file. Symlinks are checked with `lstat` and never followed.
pub fn hash_regular_file(path: &Path) -> io::Result<Option<String>> {
    if !fs::symlink_metadata(path)?.file_type().is_file() {
        return Ok(None);
    }
    hash_file(path).map(Some)
}

pub fn hash_reader<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}
