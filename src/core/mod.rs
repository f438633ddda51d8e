/// Core module for sequence detection
///
/// This module contains the tokenizer patterns, the candidate model and the
/// analyzer that classifies token columns.

pub mod analyzer;
pub mod candidate;
pub mod patterns;
