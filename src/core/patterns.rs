/// Pattern definitions for the sequence detector
///
/// This module holds the compiled regular expressions used to tokenize file
/// names into numeric and non-numeric particles, and to detect and mask UUIDs
/// before tokenization.

use lazy_static::lazy_static;
use regex::Regex;

/// Canonical lowercase UUID (8-4-4-4-12 hex groups)
pub const UUID_PATTERN: &str = r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}";

/// Placeholder substituted for every UUID before tokenization
pub const UUID_PLACEHOLDER: &str = "[UUID]";

lazy_static! {
    /// Matches a canonical UUID anywhere in a string
    pub static ref UUID_RE: Regex = Regex::new(UUID_PATTERN).unwrap();

    /// Runs of characters other than ASCII digits, used as captured separators
    pub static ref NON_DIGIT_RE: Regex = Regex::new(r"[^0-9]+").unwrap();

    /// One or more ASCII digits anchored at the start of a token
    pub static ref LEADING_DIGITS_RE: Regex = Regex::new(r"^[0-9]+").unwrap();
}

/// Check whether a string contains a canonical UUID
pub fn contains_uuid(value: &str) -> bool {
    UUID_RE.is_match(value)
}

/// Replace every UUID in a string with [`UUID_PLACEHOLDER`]
pub fn mask_uuids(value: &str) -> String {
    UUID_RE.replace_all(value, UUID_PLACEHOLDER).into_owned()
}

/// Check whether a token starts with a digit run
pub fn is_numerical(token: &str) -> bool {
    LEADING_DIGITS_RE.is_match(token)
}

/// Return the final component of a path string.
///
/// Everything after the last path separator is returned, so a path that ends
/// with a separator has an empty base name.
pub fn basename(path: &str) -> &str {
    path.rsplit(std::path::is_separator).next().unwrap_or(path)
}

/// Split a file name into numeric and non-numeric particles.
///
/// Non-digit runs are kept as tokens between the digit runs. The text before
/// the first separator and after the last one is always emitted, even when
/// empty, so `frame001.png` yields `["", "frame", "001", ".png", ""]`.
///
/// # Arguments
///
/// * `name` - The file name to split
///
/// # Returns
///
/// The ordered list of particles
pub fn numeric_and_non_numeric_particles(name: &str) -> Vec<String> {
    let mut particles = Vec::new();
    let mut last_end = 0;

    for separator in NON_DIGIT_RE.find_iter(name) {
        particles.push(name[last_end..separator.start()].to_string());
        particles.push(separator.as_str().to_string());
        last_end = separator.end();
    }
    particles.push(name[last_end..].to_string());

    particles
}
