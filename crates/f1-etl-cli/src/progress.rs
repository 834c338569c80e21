//! Progress indicators for CLI operations

use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;

/// Whether interactive progress output makes sense on stderr
pub fn is_interactive() -> bool {
    std::io::stderr().is_terminal()
}

/// Spinner for indeterminate operations; hidden when stderr is not a terminal
pub fn create_spinner(message: &str) -> ProgressBar {
    if !is_interactive() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Format bytes into human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format a millisecond duration as `1.23s` or `2m 03s`
pub fn format_elapsed(ms: u64) -> String {
    if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        format!("{}m {:02}s", ms / 60_000, (ms % 60_000) / 1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(1234), "1.23s");
        assert_eq!(format_elapsed(123_000), "2m 03s");
    }

    #[test]
    fn test_spinner_can_finish() {
        let pb = create_spinner("Working...");
        pb.finish_and_clear();
        assert!(pb.is_finished());
    }
}
