use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const LOG_FILE_NAME: &str = "clinic-scheduling-api.log";
const DEFAULT_DIRECTIVES: &str = "info,tower_http=debug";

/// `RUST_LOG` wins when set. Otherwise `LOGLEVEL` sets the base level and
/// request tracing stays at debug.
pub fn filter_directives(rust_log: Option<String>, log_level: Option<String>) -> String {
    if let Some(directives) = rust_log.filter(|value| !value.trim().is_empty()) {
        return directives;
    }
    match log_level.filter(|value| !value.trim().is_empty()) {
        Some(level) => format!("{},tower_http=debug", level.trim().to_lowercase()),
        None => DEFAULT_DIRECTIVES.to_string(),
    }
}

pub fn log_file_path(dir: &Path) -> PathBuf {
    dir.join(LOG_FILE_NAME)
}

/// Opens the log file for appending, creating the directory if needed.
pub fn open_log_file(dir: &Path) -> io::Result<File> {
    fs::create_dir_all(dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path(dir))
}
