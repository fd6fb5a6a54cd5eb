const SIZE_SUFFIXES: [&str; 5] = ["bytes", "kb", "mb", "gb", "tb"];

/// Format a byte count with two decimals and a 1024-based suffix.
pub fn humanize_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for suffix in &SIZE_SUFFIXES[..SIZE_SUFFIXES.len() - 1] {
        if size < 1024.0 {
            return format!("{:.2} {}", size, suffix);
        }
        size /= 1024.0;
    }
    format!("{:.2} {}", size, SIZE_SUFFIXES[SIZE_SUFFIXES.len() - 1])
}
