/// Simple example demonstrating how to use the File Sequence library

use anyhow::Result;
use file_sequence::{analyze, analyze_folder};

fn main() -> Result<()> {
    // Analyze an explicit list of paths
    let candidate = analyze(vec![
        "renders/shot010/beauty.1003.exr",
        "renders/shot010/beauty.1001.exr",
        "renders/shot010/beauty.1002.exr",
    ])?;

    println!("Composite: {}", candidate);
    println!("FFMPEG pattern: {}", candidate.ffmpeg_pattern());
    for order in candidate.orders() {
        println!("  - {}", order);
    }

    // Analyze a folder created for the example
    let folder = std::env::temp_dir().join("file_sequence_demo");
    std::fs::create_dir_all(&folder)?;
    for frame in 1..=5 {
        std::fs::write(folder.join(format!("frame_{:04}.png", frame)), b"")?;
    }

    let candidate = analyze_folder(&folder.to_string_lossy())?;
    println!("\n{}", serde_json::to_string_pretty(&candidate)?);

    Ok(())
}
