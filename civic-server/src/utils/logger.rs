//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production
//! environments.

use std::path::Path;

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional file output
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level.parse().unwrap_or(tracing::Level::INFO))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // Add file output if log_dir is provided
    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "civic-server");
            subscriber.with_writer(file_appender).init();
            return;
        }
    }

    subscriber.init();
}

/// Clean up log files older than the retention window
pub fn cleanup_old_logs(log_dir: &str, days: u64) -> std::io::Result<()> {
    let cutoff = std::time::SystemTime::now()
        .checked_sub(std::time::Duration::from_secs(days * 24 * 3600));
    let Some(cutoff) = cutoff else {
        return Ok(());
    };

    let dir = Path::new(log_dir);
    if !dir.exists() {
        return Ok(());
    }

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        if let Ok(modified) = meta.modified()
            && modified < cutoff
        {
            let _ = std::fs::remove_file(entry.path());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_ignores_missing_dir() {
        assert!(cleanup_old_logs("/nonexistent/log/dir", 7).is_ok());
    }

    #[test]
    fn test_cleanup_keeps_fresh_files() {
        let dir = tempfile::tempdir().unwrap();
        let log_file = dir.path().join("civic-server.log");
        std::fs::write(&log_file, "recent entry").unwrap();

        cleanup_old_logs(dir.path().to_str().unwrap(), 7).unwrap();
        assert!(log_file.exists());
    }
}
