/// File Sequence - detection of numbered file sequences
///
/// This library detects sequences such as `frame_0001.png … frame_0100.png`
/// in lists of paths, folders and directory trees, and describes them with a
/// composite pattern (`frame_[0001-0100].png`) and an FFMPEG pattern
/// (`frame_%04d.png`).

// Re-export core modules
pub mod core;
pub mod utils;

// Re-export main analyzer types for convenience
pub use crate::core::analyzer::{AnalyzerOptions, SequenceAnalyzer, SequenceError};
pub use crate::core::candidate::{Candidate, CandidateKind, Column, Direction, Order};
pub use crate::utils::file_utils::{scan_tree, scan_tree_with_progress, ScanEntry, ScanProgress};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Analyze a list of paths with default options
///
/// This is a convenience function for simple use cases.
///
/// # Arguments
///
/// * `paths` - Paths to analyze, in any order
///
/// # Returns
///
/// The sequence candidate, or `SequenceError::EmptyInput` for an empty list
pub fn analyze<I, S>(paths: I) -> Result<Candidate, SequenceError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    SequenceAnalyzer::default().analyze(paths)
}

/// Analyze the direct children of a folder with default options
pub fn analyze_folder(folder_path: &str) -> Result<Candidate, SequenceError> {
    SequenceAnalyzer::default().analyze_folder(folder_path)
}

/// Library configuration and utilities
pub mod config {
    use std::path::Path;

    use log::{error, info};
    use serde::{Deserialize, Serialize};

    use crate::core::analyzer::AnalyzerOptions;

    /// Scan configuration, read from a JSON file
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ScanConfig {
        /// Mask UUIDs before tokenizing
        pub mask_uuids: bool,
        /// Include names starting with `.` in folder listings
        pub include_hidden: bool,
        /// Directory names never entered during tree scans
        pub skip_dirs: Vec<String>,
        /// Maximum tree depth, unlimited when None
        pub max_depth: Option<usize>,
        /// Number of parallel workers (0=auto)
        pub parallel: usize,
    }

    impl Default for ScanConfig {
        fn default() -> Self {
            Self {
                mask_uuids: true,
                include_hidden: false,
                skip_dirs: vec![".git".to_string(), ".svn".to_string()],
                max_depth: None,
                parallel: 0,
            }
        }
    }

    impl ScanConfig {
        pub fn analyzer_options(&self) -> AnalyzerOptions {
            AnalyzerOptions {
                mask_uuids: self.mask_uuids,
                include_hidden: self.include_hidden,
            }
        }

        /// Number of worker threads, resolving 0 to the available parallelism
        pub fn worker_count(&self) -> usize {
            if self.parallel == 0 {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            } else {
                self.parallel
            }
        }
    }

    /// Create default configuration
    pub fn default_config() -> ScanConfig {
        ScanConfig::default()
    }

    /// Load configuration from file if provided.
    ///
    /// A missing or invalid file is logged and the defaults are used.
    pub fn load_config(config_path: Option<&Path>) -> ScanConfig {
        let Some(path) = config_path else {
            return default_config();
        };

        if !path.exists() {
            error!("Configuration file not found: {}", path.display());
            return default_config();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| serde_json::from_str(&content).map_err(|e| e.to_string()));

        match parsed {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                error!("Invalid configuration file {}: {}", path.display(), e);
                default_config()
            }
        }
    }

}

/// Command-line application functionality
pub mod app {
    use std::path::Path;

    use anyhow::Result;

    use crate::config::ScanConfig;
    use crate::core::analyzer::{SequenceAnalyzer, SequenceError};
    use crate::utils::file_utils::{self, ScanEntry, ScanProgress};

    /// What to scan
    #[derive(Debug, Clone)]
    pub enum ScanTarget<'a> {
        /// Explicit paths analyzed as one list
        Paths(&'a [String]),
        /// One folder, non-recursive
        Folder(&'a Path),
        /// A whole tree, one folder at a time
        Tree(&'a Path),
    }

    /// Run the scanner on a target
    ///
    /// # Arguments
    ///
    /// * `target` - Paths, folder or tree to scan
    /// * `config` - Configuration options
    ///
    /// # Returns
    ///
    /// Scan entries; an empty list or folder yields no entry
    pub fn run_scanner(target: ScanTarget<'_>, config: &ScanConfig) -> Result<Vec<ScanEntry>> {
        run_scanner_with_progress(target, config, |_| {})
    }

    /// Run the scanner, reporting tree scan progress to a callback
    pub fn run_scanner_with_progress<F>(
        target: ScanTarget<'_>,
        config: &ScanConfig,
        on_progress: F,
    ) -> Result<Vec<ScanEntry>>
    where
        F: Fn(ScanProgress<'_>) + Sync,
    {
        let analyzer = SequenceAnalyzer::new(config.analyzer_options());

        let analysis = match target {
            ScanTarget::Paths(paths) => analyzer.analyze(paths.iter().cloned()),
            ScanTarget::Folder(folder) => analyzer.analyze_folder(&folder.to_string_lossy()),
            ScanTarget::Tree(root) => {
                return file_utils::scan_tree_with_progress(root, config, on_progress)
            }
        };

        match analysis {
            Ok(candidate) => Ok(vec![ScanEntry::Candidate(candidate)]),
            Err(SequenceError::EmptyInput) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}
