use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Create a styled progress bar
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let template =
        "{spinner:.blue} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg} ({eta})";
    pb.set_style(
        ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Format duration in a human-readable way
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if total_secs >= 60 {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{}m {}s", mins, secs)
    } else if total_secs > 0 {
        format!("{}.{:03}s", total_secs, millis)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// The root must exist and be a directory before anything is walked
pub fn validate_root(root: &Path) -> Result<()> {
    let metadata = fs::metadata(root)
        .with_context(|| format!("Root directory does not exist: {}", root.display()))?;
    if !metadata.is_dir() {
        return Err(anyhow::anyhow!(
            "Root path is not a directory: {}",
            root.display()
        ));
    }
    Ok(())
}

/// Print verbose information if verbose mode is enabled
pub fn verbose_println(verbose: bool, message: &str) {
    if verbose {
        println!("{} {}", style("[VERBOSE]").dim(), message);
    }
}

/// Print warning message
pub fn warn_println(message: &str) {
    println!("{} {}", style("[WARNING]").yellow().bold(), message);
}

/// Print error message
pub fn error_println(message: &str) {
    eprintln!("{} {}", style("[ERROR]").red().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(1)), "1.000s");
        assert_eq!(format_duration(Duration::from_millis(12_345)), "12.345s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
    }

    #[test]
    fn test_validate_root() {
        let dir = TempDir::new().unwrap();
        assert!(validate_root(dir.path()).is_ok());

        let missing = validate_root(&dir.path().join("missing")).unwrap_err();
        assert!(missing.to_string().contains("does not exist"));

        let file = dir.path().join("00001.tif");
        fs::write(&file, b"").unwrap();
        let not_dir = validate_root(&file).unwrap_err();
        assert!(not_dir.to_string().contains("not a directory"));
    }

    #[test]
    fn test_progress_bar_length() {
        let pb = create_progress_bar(42);
        assert_eq!(pb.length(), Some(42));
    }
}
