//! Human-readable progress output written to stdout.

use osone_core::{bytes_to_gb, bytes_to_mb, CheckStatus, FileCheck, RequiredFileSet, VerificationReport};

pub const RULE_WIDTH: usize = 60;

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn print_banner(title: &str) {
    println!("{title}");
    println!("{}", rule());
}

/// One line per requirement.
pub fn format_check(check: &FileCheck) -> String {
    match &check.status {
        CheckStatus::Found { size_bytes } => {
            format!("  [ok]      {} ({:.2} MB)", check.name, bytes_to_mb(*size_bytes as f64))
        }
        CheckStatus::Sharded { shard_count, .. } => {
            format!("  [ok]      {} (sharded: {shard_count} files)", check.name)
        }
        CheckStatus::Weights { file_count, total_bytes } => format!(
            "  [ok]      MLX weights: {file_count} file(s), {:.2} GB",
            bytes_to_gb(*total_bytes as f64)
        ),
        CheckStatus::Missing if check.name == "*.safetensors" => {
            "  [missing] No MLX weight files found".to_string()
        }
        CheckStatus::Missing => format!("  [missing] {} - MISSING", check.name),
    }
}

/// Print the per-file lines and the verdict.
pub fn print_verification(report: &VerificationReport) {
    match report.file_set {
        RequiredFileSet::Download => println!("\nVerifying model files..."),
        RequiredFileSet::Converted => println!("\nVerifying converted model..."),
    }
    for check in &report.checks {
        println!("{}", format_check(check));
    }

    match (report.file_set, report.passed()) {
        (RequiredFileSet::Download, true) => println!("\nModel verification complete!"),
        (RequiredFileSet::Download, false) => {
            println!("\nWarning: Missing files: {}", report.missing().join(", "))
        }
        (RequiredFileSet::Converted, true) => println!("\nModel verification passed!"),
        (RequiredFileSet::Converted, false) => {
            println!("\nWarning: Model verification failed - some files missing")
        }
    }
}
