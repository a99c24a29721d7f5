//! Human-readable formatting helpers

/// Format a byte count with SI prefixes (`999 B`, `1.5 kB`, `2.0 MB`).
pub fn si_bytes(size: u64) -> String {
    let size_f = size as f64;
    if size < 1_000 {
        format!("{size} B")
    } else if size_f < 999_950.0 {
        format!("{:.1} kB", size_f / 1e3)
    } else if size_f < 999_950.0 * 1e3 {
        format!("{:.1} MB", size_f / 1e6)
    } else if size_f < 999_950.0 * 1e6 {
        format!("{:.1} GB", size_f / 1e9)
    } else {
        format!("{:.1} TB", size_f / 1e12)
    }
}
