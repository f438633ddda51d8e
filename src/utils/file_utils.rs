/// File handling utilities
///
/// This module provides the file-system side of sequence detection: listing
/// files, finding the directories worth analyzing, and scanning a whole tree
/// so that sequence folders collapse into a single candidate.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use rayon::prelude::*;
use walkdir::{DirEntry, WalkDir};

use crate::config::ScanConfig;
use crate::core::analyzer::SequenceAnalyzer;
use crate::core::candidate::Candidate;

/// One item of a scan result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEntry {
    /// A path list or folder analyzed as a whole
    Candidate(Candidate),
    /// A file not covered by any sequence
    File(String),
}

impl ScanEntry {
    /// Path or composite naming the entry
    pub fn source(&self) -> &str {
        match self {
            ScanEntry::Candidate(candidate) => candidate.source(),
            ScanEntry::File(path) => path,
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, ScanEntry::Candidate(candidate) if candidate.is_sequence())
    }

    /// Number of input paths the entry stands for
    pub fn file_count(&self) -> usize {
        match self {
            ScanEntry::Candidate(candidate) => candidate.number_of_args(),
            ScanEntry::File(_) => 1,
        }
    }
}

fn is_skipped(entry: &DirEntry, skip_dirs: &[String]) -> bool {
    entry.file_type().is_dir()
        && entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| skip_dirs.iter().any(|skip| skip == name))
            .unwrap_or(false)
}

fn walker(root: &Path, config: &ScanConfig) -> impl Iterator<Item = DirEntry> {
    let mut walk = WalkDir::new(root).follow_links(false).sort_by_file_name();
    if let Some(depth) = config.max_depth {
        walk = walk.max_depth(depth);
    }

    let skip_dirs = config.skip_dirs.clone();
    walk.into_iter()
        .filter_entry(move |entry| !is_skipped(entry, &skip_dirs))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
}

/// List every file under a root, recursively.
///
/// Directories named in `config.skip_dirs` are not entered.
pub fn full_file_list(root: &Path, config: &ScanConfig) -> Vec<PathBuf> {
    walker(root, config)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

/// List the files directly inside a directory, sorted by name.
///
/// # Arguments
///
/// * `dir` - Directory to list
/// * `contains` - Optional substring the file name must contain
pub fn list_files(dir: &Path, contains: Option<&str>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let entry = entry?;
        if let Some(needle) = contains {
            if !entry.file_name().to_string_lossy().contains(needle) {
                continue;
            }
        }
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Find the directories under a root that directly contain at least one file
pub fn directories_with_files(root: &Path, config: &ScanConfig) -> Vec<PathBuf> {
    walker(root, config)
        .filter(|entry| entry.file_type().is_dir())
        .filter(|entry| {
            fs::read_dir(entry.path())
                .map(|mut children| {
                    children.any(|child| {
                        child
                            .map(|child| child.path().is_file())
                            .unwrap_or(false)
                    })
                })
                .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect()
}

/// Scan one directory.
///
/// A directory whose children form a sequence yields a single candidate.
/// Otherwise, or when the analysis fails, each file yields its own entry.
pub fn scan_directory(dir: &Path, analyzer: &SequenceAnalyzer) -> Vec<ScanEntry> {
    let analysis = match dir.to_str() {
        Some(folder) => analyzer.analyze_folder(folder).map_err(anyhow::Error::from),
        None => Err(anyhow!("Path is not valid UTF-8: {}", dir.display())),
    };

    match analysis {
        Ok(candidate) if candidate.is_sequence() => {
            info!("Sequence found in {}: {}", dir.display(), candidate);
            return vec![ScanEntry::Candidate(candidate)];
        }
        Ok(_) => debug!("No sequence in {}", dir.display()),
        Err(e) => debug!("Sequence analysis failed for {}: {}", dir.display(), e),
    }

    match list_files(dir, None) {
        Ok(files) => files
            .into_iter()
            .map(|file| ScanEntry::File(file.to_string_lossy().into_owned()))
            .collect(),
        Err(e) => {
            warn!("{:#}", e);
            Vec::new()
        }
    }
}

/// Progress of a tree scan, reported to the callback of [`scan_tree_with_progress`]
#[derive(Debug, Clone, Copy)]
pub enum ScanProgress<'a> {
    /// The walk is done and analysis is about to start
    Started { directories: usize, workers: usize },
    /// One directory has been analyzed
    Scanned(&'a Path),
}

/// Scan a directory tree, collapsing sequence folders.
///
/// # Arguments
///
/// * `root` - Root of the tree
/// * `config` - Scan configuration
///
/// # Returns
///
/// Sequence candidates and the files outside any sequence, sorted by source
pub fn scan_tree(root: &Path, config: &ScanConfig) -> Result<Vec<ScanEntry>> {
    scan_tree_with_progress(root, config, |_| {})
}

/// Scan a directory tree, reporting progress as directories are analyzed.
///
/// Directories are analyzed on a dedicated rayon pool sized from
/// `config.parallel`. The callback may run on any worker thread.
pub fn scan_tree_with_progress<F>(
    root: &Path,
    config: &ScanConfig,
    on_progress: F,
) -> Result<Vec<ScanEntry>>
where
    F: Fn(ScanProgress<'_>) + Sync,
{
    if !root.is_dir() {
        return Err(anyhow!("Directory not found: {}", root.display()));
    }

    let analyzer = SequenceAnalyzer::new(config.analyzer_options());
    let directories = directories_with_files(root, config);
    let workers = config.worker_count();
    info!(
        "Scanning {} directories under {} with {} workers",
        directories.len(),
        root.display(),
        workers
    );
    on_progress(ScanProgress::Started {
        directories: directories.len(),
        workers,
    });

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("Failed to build thread pool")?;

    let mut entries: Vec<ScanEntry> = pool
        .install(|| {
            directories
                .par_iter()
                .map(|dir| {
                    let found = scan_directory(dir, &analyzer);
                    on_progress(ScanProgress::Scanned(dir));
                    found
                })
                .collect::<Vec<_>>()
        })
        .into_iter()
        .flatten()
        .collect();

    entries.sort_by(|a, b| a.source().cmp(b.source()));
    Ok(entries)
}
