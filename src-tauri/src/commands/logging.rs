//! Persistent file logging for the shell and its preferences window.
//!
//! Records from the `log` macros are filtered by `env_logger` (`RUST_LOG`,
//! default `info`) and appended to a daily file in the app log directory,
//! with size-based rotation and cleanup.

use chrono::Local;
use log::{Level, Log, Metadata, Record};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tauri::{command, AppHandle, Manager};

use crate::error::{ResultExt, ShellError, ShellResult};

/// Maximum log file size before rotation (5MB)
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;

/// Maximum number of log files to keep
const MAX_LOG_FILES: usize = 5;

const LOG_FILE_PREFIX: &str = "deepseek-shell";

lazy_static::lazy_static! {
    /// Global log file handle
    static ref LOG_FILE: Mutex<Option<File>> = Mutex::new(None);
    /// Log directory path
    static ref LOG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

/// `log` frontend: env_logger decides what passes, the file gets everything
/// that does. Debug builds also echo to stderr.
struct ShellLogger {
    filter: env_logger::Logger,
}

impl Log for ShellLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.filter.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.filter.matches(record) {
            return;
        }
        write_line(&format_line(
            record.level(),
            record.target(),
            &record.args().to_string(),
        ));
        #[cfg(debug_assertions)]
        self.filter.log(record);
    }

    fn flush(&self) {
        if let Ok(mut log_file) = LOG_FILE.lock() {
            if let Some(ref mut file) = *log_file {
                let _ = file.flush();
            }
        }
    }
}

/// Initialize the logging system
pub fn init_logging(app: &AppHandle) -> ShellResult<()> {
    let log_dir = app
        .path()
        .app_log_dir()
        .context("Failed to get log directory")?;

    fs::create_dir_all(&log_dir)?;

    {
        let mut dir = LOG_DIR
            .lock()
            .context("Failed to acquire log directory lock")?;
        *dir = Some(log_dir.clone());
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(current_log_path(&log_dir))?;

    {
        let mut log_file = LOG_FILE
            .lock()
            .context("Failed to acquire log file lock")?;
        *log_file = Some(file);
    }

    let filter =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).build();
    let max_level = filter.filter();
    match log::set_boxed_logger(Box::new(ShellLogger { filter })) {
        Ok(()) => log::set_max_level(max_level),
        Err(e) => eprintln!("Logger already installed: {}", e),
    }

    log::info!("Logging system initialized");
    log::info!("Log directory: {:?}", log_dir);

    cleanup_old_logs(&log_dir);

    Ok(())
}

/// The path for the current log file (one per day)
fn current_log_path(log_dir: &Path) -> PathBuf {
    let date = Local::now().format("%Y-%m-%d");
    log_dir.join(format!("{}_{}.log", LOG_FILE_PREFIX, date))
}

fn format_line(level: Level, source: &str, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    format!("[{}] [{}] [{}] {}\n", timestamp, level, source, message)
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "warn" | "warning" => Level::Warn,
        "error" => Level::Error,
        _ => Level::Info,
    }
}

/// Clean up old log files, keeping only the most recent MAX_LOG_FILES
fn cleanup_old_logs(log_dir: &Path) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "log")
                    .unwrap_or(false)
            })
            .collect();

        // Newest first
        log_files.sort_by(|a, b| {
            let a_time = a.metadata().and_then(|m| m.modified()).ok();
            let b_time = b.metadata().and_then(|m| m.modified()).ok();
            b_time.cmp(&a_time)
        });

        for file in log_files.into_iter().skip(MAX_LOG_FILES) {
            let _ = fs::remove_file(file.path());
        }
    }
}

/// Check if log rotation is needed and rotate if necessary
fn check_rotation() {
    // Poisoned lock: skip rotation rather than panic inside the logger
    let log_dir = {
        let dir = match LOG_DIR.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        match dir.as_ref() {
            Some(d) => d.clone(),
            None => return,
        }
    };

    let current_path = current_log_path(&log_dir);

    if let Ok(metadata) = fs::metadata(&current_path) {
        if metadata.len() > MAX_LOG_SIZE {
            let timestamp = Local::now().format("%Y-%m-%d_%H%M%S");
            let rotated_path = log_dir.join(format!("{}_{}.log", LOG_FILE_PREFIX, timestamp));
            let _ = fs::rename(&current_path, &rotated_path);

            if let Ok(file) = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&current_path)
            {
                if let Ok(mut log_file) = LOG_FILE.lock() {
                    *log_file = Some(file);
                }
            }

            cleanup_old_logs(&log_dir);
        }
    }
}

fn write_line(line: &str) {
    if let Ok(mut log_file) = LOG_FILE.lock() {
        if let Some(ref mut file) = *log_file {
            let _ = file.write_all(line.as_bytes());
            let _ = file.flush();
        }
    }
    check_rotation();
}

// ============================================================================
// Tauri Commands
// ============================================================================

/// Write a log message from the preferences window
#[command]
pub fn write_log(level: String, source: String, message: String) {
    write_line(&format_line(parse_level(&level), &source, &message));
}

/// Get the log directory path
#[command]
pub fn get_log_dir(app: AppHandle) -> Result<String, ShellError> {
    let log_dir = app
        .path()
        .app_log_dir()
        .context("Failed to get log directory")?;

    Ok(log_dir.to_string_lossy().to_string())
}

/// Get recent logs (last N lines) for debugging
#[command]
pub fn get_recent_logs(app: AppHandle, lines: Option<usize>) -> Result<String, ShellError> {
    let log_dir = app
        .path()
        .app_log_dir()
        .context("Failed to get log directory")?;

    let log_path = current_log_path(&log_dir);
    if !log_path.exists() {
        return Ok(String::new());
    }

    Ok(tail(&fs::read_to_string(&log_path)?, lines.unwrap_or(100)))
}

fn tail(content: &str, max_lines: usize) -> String {
    let recent: Vec<&str> = content.lines().rev().take(max_lines).collect();
    recent.into_iter().rev().collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("WARNING"), Level::Warn);
        assert_eq!(parse_level("error"), Level::Error);
        assert_eq!(parse_level("debug"), Level::Debug);
        assert_eq!(parse_level("verbose"), Level::Info);
    }

    #[test]
    fn test_format_line() {
        let line = format_line(Level::Warn, "settings", "stylesheet missing");
        assert!(line.ends_with("] [WARN] [settings] stylesheet missing\n"));
        assert!(line.starts_with('['));
    }

    #[test]
    fn test_current_log_path_is_daily() {
        let path = current_log_path(Path::new("/tmp/logs"));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("deepseek-shell_"));
        assert!(name.ends_with(".log"));
        assert_eq!(name.len(), "deepseek-shell_2026-01-01.log".len());
    }

    #[test]
    fn test_tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc\nd", 2), "c\nd");
        assert_eq!(tail("a\nb", 10), "a\nb");
        assert_eq!(tail("", 3), "");
    }

    #[test]
    fn test_cleanup_keeps_newest_files() {
        let dir = std::env::temp_dir().join(format!("deepseek-logs-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        for i in 0..(MAX_LOG_FILES + 3) {
            fs::write(dir.join(format!("deepseek-shell_{}.log", i)), "x").unwrap();
        }
        fs::write(dir.join("notes.txt"), "keep").unwrap();

        cleanup_old_logs(&dir);

        let remaining: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(remaining.iter().filter(|n| n.ends_with(".log")).count(), MAX_LOG_FILES);
        assert!(remaining.contains(&"notes.txt".to_string()));

        let _ = fs::remove_dir_all(&dir);
    }
}
