/// File Sequence - detection of numbered file sequences
///
/// The main entry point for the sequence scanner. It parses command-line
/// arguments, loads configuration and coordinates the scan and the reports.

use anyhow::Result;
use clap::{ArgAction, ArgGroup, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use file_sequence::app::{run_scanner_with_progress, ScanTarget};
use file_sequence::config::{load_config, ScanConfig};
use file_sequence::utils::file_utils::{ScanEntry, ScanProgress};
use file_sequence::utils::output_formatter;

/// Command line argument structure
#[derive(Parser, Debug)]
#[command(
    name = "file_sequence",
    version,
    about = "Detects numbered file sequences",
    long_about = "This tool detects numbered file sequences such as:
- frame_0001.png ... frame_0100.png  ->  frame_[0001-0100].png
- shot_010_v1.exr ... shot_010_v9.exr  ->  shot_010_v[1-9].exr
and prints a composite pattern and an FFMPEG-compatible pattern for each."
)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .args(["file_paths", "dir"]),
))]
struct Args {
    /// Paths analyzed together as one list
    #[arg(name = "file_paths")]
    file_paths: Vec<String>,

    /// Analyze the files of a directory
    #[arg(long = "dir")]
    dir: Option<String>,

    /// Scan the directory tree, one folder at a time
    #[arg(long = "recursive", action = ArgAction::SetTrue, requires = "dir")]
    recursive: bool,

    /// Output in markdown format (wrapped in triple backticks)
    #[arg(long = "md", action = ArgAction::SetTrue)]
    md: bool,

    /// Export results to JSON file
    #[arg(long = "json")]
    json: Option<String>,

    /// Export results to HTML report
    #[arg(long = "html")]
    html: Option<String>,

    /// Export results to CSV file
    #[arg(long = "csv")]
    csv: Option<String>,

    /// Directory to store all output files
    #[arg(long = "output-dir")]
    output_dir: Option<String>,

    /// Suppress terminal output
    #[arg(long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,

    /// Show only summary information
    #[arg(long = "summary-only", action = ArgAction::SetTrue)]
    summary_only: bool,

    /// Report only sequences, dropping single files
    #[arg(long = "only-sequences", action = ArgAction::SetTrue)]
    only_sequences: bool,

    /// Path to configuration file
    #[arg(long = "config")]
    config: Option<String>,

    /// Number of parallel workers (0=auto, default: from config)
    #[arg(long = "parallel")]
    parallel: Option<usize>,

    /// Do not mask UUIDs before tokenizing
    #[arg(long = "no-uuid-mask", action = ArgAction::SetTrue)]
    no_uuid_mask: bool,

    /// Include hidden files in folder listings
    #[arg(long = "include-hidden", action = ArgAction::SetTrue)]
    include_hidden: bool,

    /// Set logging level (default: INFO)
    #[arg(long = "log-level", default_value = "info")]
    log_level: LevelFilter,

    /// Log file path (default: file_sequence.log)
    #[arg(long = "log-file", default_value = "file_sequence.log")]
    log_file: String,
}

/// Main entry point function
fn main() -> Result<()> {
    let start_time = Instant::now();

    let args = Args::parse();

    setup_logging(&args);

    let config = build_config(&args);

    let mut entries = scan(&args, &config)?;
    if args.only_sequences {
        entries.retain(ScanEntry::is_sequence);
    }

    if entries.is_empty() {
        eprintln!("{}", "Error: No files specified or found for analysis".red());
        eprintln!("Run with --help for usage information");
        process::exit(1);
    }

    export_all_results(&entries, &args)?;

    if !args.quiet {
        println!("\n{}", "Analysis Complete".bold());
        println!("{}", output_formatter::create_summary(&entries));
        println!(
            "{} {:.2} seconds",
            "Time elapsed:".green(),
            start_time.elapsed().as_secs_f64()
        );

        if !args.summary_only {
            println!("\n{}", "=".repeat(80).bold());
            println!("{}", output_formatter::format_results(&entries, args.md));
        }
    }

    Ok(())
}

/// Set up logging with file output when possible
fn setup_logging(args: &Args) {
    let mut builder = env_logger::Builder::new();

    builder.filter_level(args.log_level);

    builder.format(|buf, record| {
        use chrono::Local;
        use std::io::Write;
        writeln!(
            buf,
            "{} - {} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Ok(file) = File::create(&args.log_file) {
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
}

/// Load the configuration file and apply command line overrides
fn build_config(args: &Args) -> ScanConfig {
    let mut config = load_config(args.config.as_deref().map(Path::new));

    if let Some(parallel) = args.parallel {
        config.parallel = parallel;
    }
    if args.no_uuid_mask {
        config.mask_uuids = false;
    }
    if args.include_hidden {
        config.include_hidden = true;
    }

    config
}

/// Run the scan selected by the command line arguments
fn scan(args: &Args, config: &ScanConfig) -> Result<Vec<ScanEntry>> {
    let target = match &args.dir {
        Some(dir) if args.recursive => ScanTarget::Tree(Path::new(dir)),
        Some(dir) => ScanTarget::Folder(Path::new(dir)),
        None => ScanTarget::Paths(&args.file_paths),
    };

    let progress_bar = if args.recursive && !args.quiet {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} directories ({eta})")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let entries = run_scanner_with_progress(target, config, |progress| {
        let Some(pb) = &progress_bar else {
            return;
        };
        match progress {
            ScanProgress::Started { directories, workers } => {
                pb.println(format!(
                    "\n{} {} directories with {} workers...",
                    "Scanning".bold(),
                    directories,
                    workers
                ));
                pb.set_length(directories as u64);
            }
            ScanProgress::Scanned(_) => pb.inc(1),
        }
    })?;

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Scan complete");
    }

    Ok(entries)
}

/// Export results based on command line arguments
fn export_all_results(entries: &[ScanEntry], args: &Args) -> Result<()> {
    if let Some(output_dir) = &args.output_dir {
        std::fs::create_dir_all(output_dir)?;
    }

    if let Some(json_path) = &args.json {
        output_formatter::export_results_json(entries, &output_path(args, json_path))?;
    }

    if let Some(html_path) = &args.html {
        output_formatter::create_html_report(entries, &output_path(args, html_path))?;
    }

    if let Some(csv_path) = &args.csv {
        output_formatter::create_csv_report(entries, &output_path(args, csv_path))?;
    }

    Ok(())
}

/// Place an output file inside the output directory when one is given
fn output_path(args: &Args, file_name: &str) -> PathBuf {
    match &args.output_dir {
        Some(output_dir) => PathBuf::from(output_dir).join(file_name),
        None => PathBuf::from(file_name),
    }
}
