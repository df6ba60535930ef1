//! CRC32 checksums for snapshot files
//!
//! Format: `crc32:XXXXXXXX` (lowercase hex, zero-padded to 8 characters).
//! Checksums are computed over the exact bytes written and verified on load.

use crc32fast::Hasher;

/// CRC32 (IEEE) of `data`
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Formats a checksum for the manifest
pub fn format_checksum(checksum: u32) -> String {
    format!("crc32:{:08x}", checksum)
}

/// Parses a manifest checksum string. Returns `None` if malformed.
pub fn parse_checksum(formatted: &str) -> Option<u32> {
    let stripped = formatted.strip_prefix("crc32:")?;
    if stripped.is_empty() || stripped.len() > 8 {
        return None;
    }
    u32::from_str_radix(stripped, 16).ok()
}
