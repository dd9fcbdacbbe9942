//! Terminal output helpers

use chrono::Local;
use colored::*;
use reel_core::LogSink;
use reel_core::domain::job::JobStatus;
use reel_core::domain::log::{LogEntry, LogLevel};

/// Prints progress narration straight to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn publish(&self, entry: LogEntry) {
        print_log_entry(&entry);
    }
}

/// Print a log entry
pub fn print_log_entry(log: &LogEntry) {
    let level_str = log.level.to_string();
    let level_colored = match log.level {
        LogLevel::Debug => level_str.dimmed(),
        LogLevel::Info => level_str.cyan(),
        LogLevel::Warning => level_str.yellow(),
        LogLevel::Error => level_str.red(),
    };

    println!(
        "{} [{}] {}",
        log.timestamp
            .with_timezone(&Local)
            .format("%H:%M:%S")
            .to_string()
            .dimmed(),
        level_colored,
        log.message
    );
}

/// Print a line already rendered by the server
pub fn print_log_line(line: &str) {
    match line_level(line) {
        Some(LogLevel::Error) => println!("{}", line.red()),
        Some(LogLevel::Warning) => println!("{}", line.yellow()),
        Some(LogLevel::Debug) => println!("{}", line.dimmed()),
        _ => println!("{}", line),
    }
}

/// Level tag of a `[timestamp] [LEVEL] message` line
fn line_level(line: &str) -> Option<LogLevel> {
    [
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Info,
        LogLevel::Debug,
    ]
    .into_iter()
    .find(|level| line.contains(&format!("[{}]", level)))
}

/// Colorize job status for display
pub fn colorize_status(status: &JobStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Running => status_str.cyan(),
        JobStatus::Completed => status_str.green(),
        JobStatus::Failed => status_str.red(),
    }
}

/// Human readable byte count
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_level_reads_tag() {
        assert_eq!(
            line_level("[2025-01-31 12:00:00] [WARNING] Status query failed"),
            Some(LogLevel::Warning)
        );
        assert_eq!(
            line_level("[2025-01-31 12:00:00] [ERROR] ❌ Video generation failed"),
            Some(LogLevel::Error)
        );
        assert_eq!(line_level("no tag here"), None);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
