/// Output formatter for scan results
///
/// This module handles formatting and exporting scan results in various formats,
/// including console output, JSON, HTML, and CSV.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use handlebars::Handlebars;
use serde_json::{json, Value};

use crate::core::candidate::Candidate;
use crate::utils::file_utils::ScanEntry;

fn joined_orders(candidate: &Candidate) -> String {
    candidate
        .orders()
        .iter()
        .map(|order| order.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Format one candidate for console output
pub fn format_candidate(candidate: &Candidate) -> String {
    let mut output = String::new();

    output.push_str(&format!("  {}: {}\n", "Composite".cyan().bold(), candidate.composite()));
    output.push_str(&format!("    - ffmpeg: {}\n", candidate.ffmpeg_pattern()));
    output.push_str(&format!("    - files: {}\n", candidate.number_of_args()));
    if let Some(folder) = candidate.folder_path() {
        output.push_str(&format!("    - folder: {}\n", folder));
    }
    for order in candidate.orders() {
        output.push_str(&format!("    - {}\n", order));
    }

    output
}

/// Format scan results for console output
///
/// # Arguments
///
/// * `entries` - Scan entries to print
/// * `use_markdown` - Whether to format output with markdown triple backticks
///
/// # Returns
///
/// Formatted string for console output
pub fn format_results(entries: &[ScanEntry], use_markdown: bool) -> String {
    let mut output = String::new();

    let sequences: Vec<&Candidate> = entries
        .iter()
        .filter_map(|entry| match entry {
            ScanEntry::Candidate(candidate) if candidate.is_sequence() => Some(candidate),
            _ => None,
        })
        .collect();
    let others: Vec<&Candidate> = entries
        .iter()
        .filter_map(|entry| match entry {
            ScanEntry::Candidate(candidate) if !candidate.is_sequence() => Some(candidate),
            _ => None,
        })
        .collect();
    let files: Vec<&str> = entries
        .iter()
        .filter_map(|entry| match entry {
            ScanEntry::File(path) => Some(path.as_str()),
            _ => None,
        })
        .collect();

    if !sequences.is_empty() {
        output.push_str(&format!("{}\n", "Sequences".yellow().bold()));
        for candidate in &sequences {
            output.push_str(&format_candidate(candidate));
            output.push('\n');
        }
    }

    if !others.is_empty() {
        output.push_str(&format!("{}\n", "No Sequence".yellow().bold()));
        for candidate in &others {
            output.push_str(&format_candidate(candidate));
            output.push('\n');
        }
    }

    if !files.is_empty() {
        output.push_str(&format!("{}\n", "Single Files".yellow().bold()));
        for path in &files {
            output.push_str(&format!("    - {}\n", path));
        }
        output.push('\n');
    }

    if output.is_empty() {
        output.push_str("Nothing to report.\n");
    }

    if use_markdown {
        output = format!("```\n{}```\n", output);
    }

    output
}

/// Convert an entry into its JSON form
fn entry_to_json(entry: &ScanEntry) -> Result<Value> {
    match entry {
        ScanEntry::Candidate(candidate) => {
            serde_json::to_value(candidate).context("Failed to serialize candidate")
        }
        ScanEntry::File(path) => Ok(json!({ "type": "File", "path": path })),
    }
}

/// Export results to a JSON file
///
/// # Arguments
///
/// * `entries` - Scan entries to export
/// * `output_path` - Path where the JSON file will be written
///
/// # Returns
///
/// Result indicating success or failure
pub fn export_results_json(entries: &[ScanEntry], output_path: &Path) -> Result<()> {
    let json_output = entries
        .iter()
        .map(entry_to_json)
        .collect::<Result<Vec<_>>>()?;

    let file = File::create(output_path)
        .context(format!("Failed to create JSON output file: {}", output_path.display()))?;

    serde_json::to_writer_pretty(file, &json_output)
        .context("Failed to write JSON data")?;

    Ok(())
}

const HTML_TEMPLATE: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>File Sequence Report</title>
    <style>
        body {
            font-family: Arial, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 1200px;
            margin: 0 auto;
            padding: 20px;
        }
        h1 {
            color: #2c3e50;
            border-bottom: 2px solid #3498db;
            padding-bottom: 10px;
        }
        h2 {
            color: #2980b9;
            margin-top: 30px;
        }
        .candidate {
            background-color: #f8f9fa;
            border-radius: 5px;
            padding: 15px;
            margin-bottom: 20px;
            box-shadow: 0 2px 5px rgba(0,0,0,0.1);
        }
        .candidate code {
            font-size: 1.1em;
        }
        .count {
            background-color: #3498db;
            color: white;
            border-radius: 20px;
            padding: 2px 8px;
            font-size: 0.8em;
            margin-left: 10px;
        }
        .timestamp {
            color: #7f8c8d;
            font-size: 0.9em;
            margin-bottom: 30px;
        }
        .summary {
            background-color: #e8f4f8;
            padding: 15px;
            border-radius: 5px;
            margin-bottom: 30px;
        }
    </style>
</head>
<body>
    <h1>File Sequence Report</h1>
    <div class="timestamp">Generated on: {{timestamp}}</div>

    <div class="summary">
        <h2>Summary</h2>
        <p>Sources: {{total_sources}}</p>
        <p>Sequences found: {{total_sequences}}</p>
        <p>Files covered: {{total_files}}</p>
    </div>

    {{#if candidates.length}}
    <h2>Candidates</h2>
    {{#each candidates}}
    <div class="candidate">
        <h3><code>{{composite}}</code> <span class="count">{{number_of_args}}</span></h3>
        <p>FFMPEG pattern: <code>{{ffmpeg_composite}}</code></p>
        {{#if folder_path}}<p>Folder: {{folder_path}}</p>{{/if}}
        <p>Sequence: {{sequence}}</p>
        <ul>
            {{#each orders}}
            <li>{{this}}</li>
            {{/each}}
        </ul>
    </div>
    {{/each}}
    {{/if}}

    {{#if files.length}}
    <h2>Single Files</h2>
    <ul>
        {{#each files}}
        <li>{{this}}</li>
        {{/each}}
    </ul>
    {{/if}}
</body>
</html>
"#;

/// Render the HTML report for scan results
pub fn render_html_report(entries: &[ScanEntry]) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_template_string("report", HTML_TEMPLATE)
        .context("Failed to register HTML template")?;

    let mut candidates = Vec::new();
    let mut files = Vec::new();
    for entry in entries {
        match entry {
            ScanEntry::Candidate(_) => candidates.push(entry_to_json(entry)?),
            ScanEntry::File(path) => files.push(json!(path)),
        }
    }

    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let template_data = json!({
        "timestamp": timestamp,
        "total_sources": entries.len(),
        "total_sequences": entries.iter().filter(|e| e.is_sequence()).count(),
        "total_files": entries.iter().map(ScanEntry::file_count).sum::<usize>(),
        "candidates": candidates,
        "files": files,
    });

    handlebars.render("report", &template_data)
        .context("Failed to render HTML template")
}

/// Create an HTML report from scan results
///
/// # Arguments
///
/// * `entries` - Scan entries to report
/// * `output_path` - Path where the HTML file will be written
///
/// # Returns
///
/// Result indicating success or failure
pub fn create_html_report(entries: &[ScanEntry], output_path: &Path) -> Result<()> {
    let html = render_html_report(entries)?;

    let mut file = File::create(output_path)
        .context(format!("Failed to create HTML output file: {}", output_path.display()))?;

    file.write_all(html.as_bytes())
        .context("Failed to write HTML data")?;

    Ok(())
}

/// Create a CSV report from scan results
///
/// # Arguments
///
/// * `entries` - Scan entries to report
/// * `output_path` - Path where the CSV file will be written
///
/// # Returns
///
/// Result indicating success or failure
pub fn create_csv_report(entries: &[ScanEntry], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create CSV output file: {}", output_path.display()))?;

    let mut writer = csv::Writer::from_writer(file);

    writer.write_record([
        "Source",
        "Type",
        "Sequence",
        "Files",
        "Composite",
        "FFMPEG Composite",
        "Orders",
    ])
    .context("Failed to write CSV header")?;

    for entry in entries {
        let record = match entry {
            ScanEntry::Candidate(candidate) => [
                candidate.source().to_string(),
                candidate.kind().to_string(),
                candidate.is_sequence().to_string(),
                candidate.number_of_args().to_string(),
                candidate.composite().to_string(),
                candidate.ffmpeg_pattern().to_string(),
                joined_orders(candidate),
            ],
            ScanEntry::File(path) => [
                path.clone(),
                "File".to_string(),
                "false".to_string(),
                "1".to_string(),
                String::new(),
                String::new(),
                String::new(),
            ],
        };
        writer.write_record(&record)
            .context("Failed to write CSV record")?;
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

/// Create a summary of a scan
pub fn create_summary(entries: &[ScanEntry]) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n\n", "Scan Summary".yellow().bold()));

    let sequences = entries.iter().filter(|e| e.is_sequence()).count();
    let total_files: usize = entries.iter().map(ScanEntry::file_count).sum();
    let sequence_files: usize = entries
        .iter()
        .filter(|e| e.is_sequence())
        .map(ScanEntry::file_count)
        .sum();

    output.push_str(&format!("Sources: {}\n", entries.len()));
    output.push_str(&format!("Sequences found: {}\n", sequences));
    output.push_str(&format!("Files covered: {}\n", total_files));
    output.push_str(&format!("Files in sequences: {}\n", sequence_files));

    output
}
