//! Display utilities for job results and listings.

use console::style;
use symcrypt::{Algorithm, Charset, CryptoError, Direction, FileOutput, MaterialEncoding, Mode, Padding, TextOutput};

/// Formats bytes into human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
    const UNIT: u64 = 1024;

    if bytes < UNIT {
        return format!("{bytes} B");
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= UNIT as f64 && unit_idx < UNITS.len() - 1 {
        size /= UNIT as f64;
        unit_idx += 1;
    }

    format!("{:.1} {}", size, UNITS[unit_idx])
}

/// Prints the job summary line to stderr.
pub fn show_summary(summary: &str) {
    eprintln!("{}", style(summary).dim());
}

/// Prints text output as-is so it can be piped.
pub fn show_text(output: &TextOutput) {
    println!("{}", output.text);
}

/// Prints one line per written file.
pub fn show_files(direction: Direction, output: &FileOutput) {
    let action = match direction {
        Direction::Encrypt => "encrypted",
        Direction::Decrypt => "decrypted",
    };

    for report in &output.reports {
        println!(
            "{} {} {} {} ({})",
            style("✓").green(),
            style(format!("File {action}:")).bold(),
            report.input.display(),
            style("->").dim(),
            format_bytes(report.bytes_written)
        );
        println!("    {}", style(report.output.display()).green());
    }
}

/// Prints isolated item failures to stderr.
pub fn show_failures(failures: &[CryptoError]) {
    for failure in failures {
        eprintln!("{} {}", style("✗").red(), style(failure).red());
    }
}

/// Prints every selectable option in selector order.
pub fn show_listing() {
    println!("{}", style("Algorithms").bold());
    for &algorithm in Algorithm::ALL {
        println!("  {:16} {:>3}-bit block", algorithm.name(), algorithm.block_size() * 8);
    }

    println!("{}", style("Modes").bold());
    for &mode in Mode::ALL {
        let kind = if mode.is_aead() {
            "authenticated"
        } else if mode.is_stream() {
            "stream"
        } else {
            "block"
        };
        println!("  {:16} {kind}", mode.name());
    }

    let names = |items: Vec<&str>| items.join(", ");
    println!("{} {}", style("Paddings:").bold(), names(Padding::ALL.iter().map(|p| p.name()).collect()));
    println!("{} {}", style("Charsets:").bold(), names(Charset::ALL.iter().map(|c| c.name()).collect()));
    println!("{} {}", style("Key/IV encodings:").bold(), names(MaterialEncoding::ALL.iter().map(|e| e.name()).collect()));
}
