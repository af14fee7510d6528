//! Portable filename rules and tile file naming.
//!
//! Prefixes are checked against both POSIX and Windows rules regardless of
//! the host, so a tile set written on one system can be copied to another.

use crate::error::{Result, SplitError};
use crate::raster::Extension;

/// Characters that are not allowed in a filename on at least one platform.
const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Windows device names, matched case-insensitively against the whole name.
const WINDOWS_DEVICES: &[&str] = &["con", "prn", "aux", "nul"];

/// Whether `name` is a Windows device name (`CON`, `COM1`, `lpt9`, ...).
pub fn is_windows_reserved(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    if WINDOWS_DEVICES.contains(&lower.as_str()) {
        return true;
    }
    match lower.as_bytes() {
        [b'c', b'o', b'm', digit] | [b'l', b'p', b't', digit] => (b'1'..=b'9').contains(digit),
        _ => false,
    }
}

/// Reject names that cannot be used as a file name everywhere.
pub fn validate_filename(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SplitError::naming("filename prefix cannot be empty"));
    }
    let bad_char = name
        .chars()
        .any(|c| c.is_control() || RESERVED_CHARS.contains(&c));
    if bad_char || is_windows_reserved(name) {
        return Err(SplitError::naming(format!(
            "{} is not a valid filename",
            name.escape_debug()
        )));
    }
    Ok(())
}

/// Digits needed for the largest index of `count` tiles.
pub fn suffix_width(count: usize) -> usize {
    if count == 0 {
        return 1;
    }
    count.ilog10() as usize + 1
}

/// File name for tile `index` out of `count`.
///
/// A single tile is named after the prefix alone; otherwise every name gets
/// a zero-padded index so lexical order matches tile order.
pub fn tile_file_name(prefix: &str, index: usize, count: usize, extension: Extension) -> String {
    if count == 1 {
        return format!("{}.{}", prefix, extension);
    }
    format!(
        "{}_{:0width$}.{}",
        prefix,
        index,
        extension,
        width = suffix_width(count)
    )
}
