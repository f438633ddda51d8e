/// Utility modules for the sequence detector
///
/// This module contains utility functions for file listing, tree scanning
/// and output formatting.

pub mod file_utils;
pub mod output_formatter;
