/// Core sequence analyzer implementation
///
/// This file contains the implementation of the SequenceAnalyzer which aligns
/// the file name tokens of a set of paths column by column and classifies each
/// column as continuous, constant or garbled.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::core::candidate::{Candidate, Column, Order};
use crate::core::patterns;

/// Errors raised while building a candidate
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    /// No paths to analyze, either given or found in a folder
    #[error("No paths to analyze")]
    EmptyInput,

    /// The folder could not be listed
    #[error("Failed to list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A listed name is not valid UTF-8
    #[error("Path is not valid UTF-8: {0:?}")]
    InvalidPath(PathBuf),
}

/// Options controlling the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerOptions {
    /// Replace UUIDs before tokenizing when the first sorted path holds one
    pub mask_uuids: bool,
    /// List names starting with `.` when analyzing a folder
    pub include_hidden: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            mask_uuids: true,
            include_hidden: false,
        }
    }
}

/// Sequence analyzer
#[derive(Debug, Clone, Default)]
pub struct SequenceAnalyzer {
    options: AnalyzerOptions,
}

impl SequenceAnalyzer {
    /// Create a new SequenceAnalyzer with the given options
    pub fn new(options: AnalyzerOptions) -> Self {
        Self { options }
    }

    /// Analyze a list of paths
    ///
    /// # Arguments
    ///
    /// * `paths` - Paths in any order; they are sorted by code point first
    ///
    /// # Returns
    ///
    /// The candidate, or `SequenceError::EmptyInput` for an empty list
    pub fn analyze<I, S>(&self, paths: I) -> Result<Candidate, SequenceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args: Vec<String> = paths.into_iter().map(Into::into).collect();
        if args.is_empty() {
            return Err(SequenceError::EmptyInput);
        }
        args.sort();

        let masked: Vec<String> = if self.options.mask_uuids && patterns::contains_uuid(&args[0]) {
            debug!("Masking UUIDs before tokenizing {} paths", args.len());
            args.iter().map(|arg| patterns::mask_uuids(arg)).collect()
        } else {
            args.clone()
        };

        let columns = self.check_sequential(&masked);
        Ok(Candidate::from_columns(args, columns))
    }

    /// Analyze the direct children of a folder
    ///
    /// # Arguments
    ///
    /// * `folder_path` - Folder to list; trailing `*`, `/` and `\` are stripped
    ///
    /// # Returns
    ///
    /// A folder candidate carrying the normalized folder path
    pub fn analyze_folder(&self, folder_path: &str) -> Result<Candidate, SequenceError> {
        let folder = normalize_folder_path(folder_path);
        info!("Analyzing folder: {}", if folder.is_empty() { "." } else { folder });

        let children = list_children(folder, self.options.include_hidden)?;
        let candidate = self.analyze(children)?;

        Ok(candidate.with_folder(folder.to_string()))
    }

    /// Classify every token column of the (masked, sorted) paths
    fn check_sequential(&self, args: &[String]) -> Vec<Column> {
        let splits: Vec<Vec<String>> = args
            .iter()
            .map(|arg| patterns::numeric_and_non_numeric_particles(patterns::basename(arg)))
            .collect();

        let width = splits[0].len();
        let mut columns = Vec::with_capacity(width);

        for index in 0..width {
            let mut column = Vec::with_capacity(splits.len());
            // decided by the last row that has a token at this index
            let mut numerical = false;

            for row in &splits {
                match row.get(index) {
                    Some(token) => {
                        numerical = patterns::is_numerical(token);
                        column.push(token.as_str());
                    }
                    // dangling end of a shorter split
                    None => column.push(""),
                }
            }

            let classified = classify_column(&column, numerical);
            debug!("Column {}: {:?}", index, classified);
            columns.push(classified);
        }

        columns
    }
}

/// Classify one column of tokens
fn classify_column(column: &[&str], numerical: bool) -> Column {
    if numerical {
        if let Some(order) = test_continuity(column) {
            return Column::Continuous {
                first: column[0].to_string(),
                last: column[column.len() - 1].to_string(),
                order,
            };
        }
    }

    if column.iter().all(|value| *value == column[0]) {
        Column::Constant(column[0].to_string())
    } else {
        Column::Garbled
    }
}

/// Test whether a column forms an arithmetic progression.
///
/// Every pairwise step must equal the first one and be non-zero. Values are
/// ASCII digit runs of any length; anything else breaks continuity, as does a
/// step that does not fit in an `i128`.
///
/// # Returns
///
/// The order of the progression, or None when the column is not continuous
pub fn test_continuity(sequence: &[&str]) -> Option<Order> {
    if sequence.len() < 2 {
        return None;
    }
    let all_digits = sequence
        .iter()
        .all(|value| !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()));
    if !all_digits {
        return None;
    }

    let initial_step = step_between(sequence[0], sequence[1])?;
    let continuous = sequence
        .windows(2)
        .all(|pair| step_between(pair[0], pair[1]) == Some(initial_step));

    if continuous {
        Order::from_step(initial_step)
    } else {
        None
    }
}

/// Signed difference `to - from` of two ASCII digit runs
fn step_between(from: &str, to: &str) -> Option<i128> {
    if let (Ok(from), Ok(to)) = (from.parse::<i128>(), to.parse::<i128>()) {
        return to.checked_sub(from);
    }

    let from = from.trim_start_matches('0');
    let to = to.trim_start_matches('0');
    let (larger, smaller, sign) = match compare_digits(to, from) {
        Ordering::Equal => return Some(0),
        Ordering::Greater => (to, from, 1),
        Ordering::Less => (from, to, -1),
    };

    let magnitude = subtract_digits(larger, smaller).parse::<i128>().ok()?;
    Some(sign * magnitude)
}

/// Compare digit runs without leading zeros by value
fn compare_digits(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// `larger - smaller` on digit runs without leading zeros, `larger >= smaller`
fn subtract_digits(larger: &str, smaller: &str) -> String {
    let mut digits = Vec::with_capacity(larger.len());
    let mut smaller_digits = smaller.bytes().rev().map(|b| b - b'0');
    let mut borrow = 0u8;

    for digit in larger.bytes().rev().map(|b| b - b'0') {
        let subtrahend = smaller_digits.next().unwrap_or(0) + borrow;
        if digit >= subtrahend {
            digits.push(digit - subtrahend);
            borrow = 0;
        } else {
            digits.push(digit + 10 - subtrahend);
            borrow = 1;
        }
    }

    digits
        .iter()
        .rev()
        .skip_while(|digit| **digit == 0)
        .map(|digit| char::from(b'0' + digit))
        .collect()
}

/// Strip trailing `*`, then `/`, then `\` from a folder path
pub fn normalize_folder_path(folder_path: &str) -> &str {
    folder_path
        .trim_end_matches('*')
        .trim_end_matches('/')
        .trim_end_matches('\\')
}

/// List the direct children of a folder as joined path strings.
///
/// An empty folder path lists the current directory and yields bare names.
fn list_children(folder: &str, include_hidden: bool) -> Result<Vec<String>, SequenceError> {
    let listed = if folder.is_empty() { Path::new(".") } else { Path::new(folder) };

    let entries = fs::read_dir(listed).map_err(|source| SequenceError::Io {
        path: listed.to_path_buf(),
        source,
    })?;

    let mut children = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SequenceError::Io {
            path: listed.to_path_buf(),
            source,
        })?;
        let name = entry.file_name();
        let name = name
            .to_str()
            .ok_or_else(|| SequenceError::InvalidPath(entry.path()))?;

        if !include_hidden && name.starts_with('.') {
            continue;
        }

        let child = if folder.is_empty() {
            PathBuf::from(name)
        } else {
            Path::new(folder).join(name)
        };
        match child.into_os_string().into_string() {
            Ok(child) => children.push(child),
            Err(raw) => return Err(SequenceError::InvalidPath(PathBuf::from(raw))),
        }
    }

    Ok(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::candidate::Direction;

    fn analyze(paths: &[&str]) -> Candidate {
        SequenceAnalyzer::default()
            .analyze(paths.iter().copied())
            .unwrap()
    }

    #[test]
    fn test_pure_literal_set() {
        let candidate = analyze(&["a.txt", "a.txt"]);
        assert_eq!(candidate.composite(), "a.txt");
        assert_eq!(candidate.ffmpeg_pattern(), "a.txt");
        assert!(!candidate.is_sequence());
        assert!(candidate.orders().is_empty());
    }

    #[test]
    fn test_simple_ascending_run() {
        let candidate = analyze(&["frame001.png", "frame002.png", "frame003.png"]);
        assert_eq!(candidate.composite(), "frame[001-003].png");
        assert_eq!(candidate.ffmpeg_pattern(), "frame%03d.png");
        assert_eq!(candidate.orders()[0].to_string(), "ascending by 1");
        assert!(candidate.is_sequence());
    }

    #[test]
    fn test_descending_input_is_sorted_first() {
        let candidate = analyze(&["shot010.jpg", "shot008.jpg", "shot006.jpg"]);
        assert_eq!(
            candidate.inputs(),
            &["shot006.jpg", "shot008.jpg", "shot010.jpg"]
        );
        assert_eq!(candidate.composite(), "shot[006-010].jpg");
        assert_eq!(candidate.orders()[0].to_string(), "ascending by 2");
    }

    #[test]
    fn test_mixed_width_sorts_by_code_point() {
        // "10" < "8" < "9" as strings, so the column is 10, 8, 9
        let candidate = analyze(&["v8.txt", "v9.txt", "v10.txt"]);
        assert_eq!(candidate.inputs(), &["v10.txt", "v8.txt", "v9.txt"]);
        assert_eq!(candidate.composite(), "v[GARBLED].txt");
        assert!(!candidate.is_sequence());
    }

    #[test]
    fn test_descending_order_needs_reverse_sorted_values() {
        // Two-digit prefix ascends with sorting while the suffix descends
        let candidate = analyze(&["a1_9.png", "a2_8.png", "a3_7.png"]);
        assert_eq!(candidate.composite(), "a[1-3]_[9-7].png");
        assert_eq!(candidate.ffmpeg_pattern(), "a%01d_%01d.png");
        let orders: Vec<String> = candidate.orders().iter().map(Order::to_string).collect();
        assert_eq!(orders, vec!["ascending by 1", "descending by -1"]);
        assert_eq!(candidate.orders()[1].direction(), Direction::Descending);
    }

    #[test]
    fn test_non_continuous_numeric_column() {
        let candidate = analyze(&["v1.txt", "v3.txt", "v8.txt"]);
        assert_eq!(candidate.composite(), "v[GARBLED].txt");
        assert_eq!(candidate.ffmpeg_pattern(), "v*.txt");
        assert!(!candidate.is_sequence());
    }

    #[test]
    fn test_constant_numeric_column_is_literal() {
        let candidate = analyze(&["take5_001.wav", "take5_002.wav"]);
        assert_eq!(candidate.composite(), "take5_[001-002].wav");
        assert_eq!(candidate.ffmpeg_pattern(), "take5_%03d.wav");
        assert_eq!(candidate.orders().len(), 1);
    }

    #[test]
    fn test_zero_step_partway_breaks_continuity() {
        let candidate = analyze(&["f1.png", "f2.png", "f2.png"]);
        assert_eq!(candidate.composite(), "f[GARBLED].png");
        assert!(!candidate.is_sequence());
    }

    #[test]
    fn test_single_input_is_not_a_sequence() {
        let candidate = analyze(&["frame001.png"]);
        assert_eq!(candidate.composite(), "frame001.png");
        assert!(!candidate.is_sequence());
    }

    #[test]
    fn test_directories_are_ignored_in_tokens() {
        let candidate = analyze(&["/mnt/disk2/f1.png", "/mnt/disk2/f2.png"]);
        assert_eq!(candidate.composite(), "f[1-2].png");
    }

    #[test]
    fn test_dangling_tokens_are_padded() {
        let candidate = analyze(&["a1.png", "a2.png", "a3"]);
        // "a3" has no ".png" token; its padding differs from ".png" but the
        // trailing empty column stays constant
        assert_eq!(candidate.composite(), "a[1-3][GARBLED]");
        assert_eq!(candidate.ffmpeg_pattern(), "a%01d*");
        assert!(candidate.is_sequence());
    }

    #[test]
    fn test_numerical_gate_uses_last_row() {
        // Column 2 holds "" then "1": the last row gates continuity testing,
        // which then fails on the empty token
        let candidate = analyze(&["a.png", "b1.png"]);
        assert_eq!(candidate.composite(), "[GARBLED][GARBLED]");
        assert!(!candidate.is_sequence());
    }

    #[test]
    fn test_uuid_masking() {
        let candidate = analyze(&[
            "render_123e4567-e89b-12d3-a456-426614174000_001.exr",
            "render_223e4567-e89b-12d3-a456-426614174000_002.exr",
            "render_323e4567-e89b-12d3-a456-426614174000_003.exr",
        ]);
        assert_eq!(candidate.composite(), "render_[UUID]_[001-003].exr");
        assert_eq!(candidate.ffmpeg_pattern(), "render_[UUID]_%03d.exr");
        assert_eq!(candidate.orders().len(), 1);
        // inputs keep the original strings
        assert!(candidate.inputs()[0].contains("123e4567"));
    }

    #[test]
    fn test_uuid_masking_disabled() {
        let analyzer = SequenceAnalyzer::new(AnalyzerOptions {
            mask_uuids: false,
            ..AnalyzerOptions::default()
        });
        let candidate = analyzer
            .analyze(vec![
                "render_123e4567-e89b-12d3-a456-426614174000_001.exr",
                "render_223e4567-e89b-12d3-a456-426614174000_002.exr",
            ])
            .unwrap();
        assert!(candidate.composite().starts_with("render_[123-223]e"));
        assert_eq!(candidate.orders().len(), 2);
    }

    #[test]
    fn test_uuid_only_checked_on_first_sorted_path() {
        let candidate = analyze(&[
            "b_123e4567-e89b-12d3-a456-426614174000.txt",
            "a_1.txt",
        ]);
        // "a_1.txt" sorts first and holds no UUID, so nothing is masked
        assert!(!candidate.composite().contains("[UUID]"));
    }

    #[test]
    fn test_empty_input() {
        let result = SequenceAnalyzer::default().analyze(Vec::<String>::new());
        assert!(matches!(result, Err(SequenceError::EmptyInput)));
    }

    #[test]
    fn test_continuity_steps() {
        assert_eq!(test_continuity(&["1", "2", "3"]).map(|o| o.step()), Some(1));
        assert_eq!(test_continuity(&["9", "6", "3"]).map(|o| o.step()), Some(-3));
        assert!(test_continuity(&["1"]).is_none());
        assert!(test_continuity(&["4", "4"]).is_none());
        assert!(test_continuity(&["1", "3", "8"]).is_none());
        assert!(test_continuity(&["1", "2", ""]).is_none());
        assert!(test_continuity(&["1", "x"]).is_none());
        assert!(test_continuity(&["+1", "+2"]).is_none());
    }

    #[test]
    fn test_continuity_beyond_i128() {
        let values: Vec<String> = (1..=3).map(|i| format!("1{}{}", "0".repeat(40), i)).collect();
        let column: Vec<&str> = values.iter().map(String::as_str).collect();
        assert_eq!(test_continuity(&column).map(|o| o.step()), Some(1));

        let reversed: Vec<&str> = column.iter().rev().copied().collect();
        assert_eq!(test_continuity(&reversed).map(|o| o.step()), Some(-1));

        // crossing a power of ten with leading zeros and mixed widths
        let wide = format!("0{}", "9".repeat(40));
        let next = format!("1{}", "0".repeat(40));
        assert_eq!(test_continuity(&[&wide, &next]).map(|o| o.step()), Some(1));

        // a step that itself overflows is not continuous
        let huge = "9".repeat(45);
        assert!(test_continuity(&["0", &huge]).is_none());
    }

    #[test]
    fn test_long_digit_runs_form_a_sequence() {
        let names: Vec<String> = (1..=3)
            .map(|i| format!("f1{}{}.png", "0".repeat(40), i))
            .collect();
        let candidate = SequenceAnalyzer::default().analyze(names).unwrap();
        assert!(candidate.is_sequence());
        assert_eq!(candidate.ffmpeg_pattern(), "f%042d.png");
    }

    #[test]
    fn test_non_ascii_digits_are_literal_text() {
        let candidate = analyze(&["f\u{661}.png", "f\u{662}.png", "f\u{663}.png"]);
        assert_eq!(candidate.composite(), "[GARBLED]");
        assert!(!candidate.is_sequence());
    }

    #[test]
    fn test_empty_folder_path_lists_current_directory() {
        // unit tests run from the package root
        let children = list_children("", false).unwrap();
        assert!(children.iter().any(|child| child == "Cargo.toml"));
        assert!(children
            .iter()
            .all(|child| !child.contains('/') && !child.starts_with('.')));

        for folder in ["*", "/"] {
            let candidate = SequenceAnalyzer::default().analyze_folder(folder).unwrap();
            assert_eq!(candidate.folder_path(), Some(""));
            assert!(candidate.inputs().iter().any(|input| input == "Cargo.toml"));
        }
    }

    #[test]
    fn test_normalize_folder_path() {
        assert_eq!(normalize_folder_path("/media/shots/*"), "/media/shots");
        assert_eq!(normalize_folder_path("/media/shots//"), "/media/shots");
        assert_eq!(normalize_folder_path("C:\\shots\\"), "C:\\shots");
        assert_eq!(normalize_folder_path("shots\\/"), "shots");
        // each character class is trimmed once, in order
        assert_eq!(normalize_folder_path("shots/\\"), "shots/");
        assert_eq!(normalize_folder_path("shots*/*"), "shots*");
    }
}
