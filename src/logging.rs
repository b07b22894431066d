// src/logging.rs

use color_eyre::eyre::Result;
use directories::ProjectDirs;
use lazy_static::lazy_static;
use std::path::PathBuf;
use time::macros::format_description;
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::{self, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref LOG_ENV: String = format!("{}_LOGLEVEL", PROJECT_NAME.clone());
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

pub fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "redink", env!("CARGO_PKG_NAME"))
}

pub fn get_data_dir() -> PathBuf {
    if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn log_file_path() -> PathBuf {
    get_data_dir().join(LOG_FILE.clone())
}

/// Console log level for a headless run: `-v` warn, `-vv` info, `-vvv` debug,
/// errors only otherwise.
pub fn console_level(verbosity: u8, silent: bool) -> &'static str {
    if silent {
        return "error";
    }
    match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    }
}

/// Initializes logging.
///
/// A file layer always writes to the data directory. When `console` carries a
/// level, a second layer mirrors events at that level to stderr; the terminal
/// UI passes `None` because it owns the screen.
pub fn initialize_logging(console: Option<&str>) -> Result<()> {
    let directory = get_data_dir();
    std::fs::create_dir_all(&directory)?;
    let log_file = std::fs::File::create(log_file_path())?;

    let file_log_level = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV.clone()))
        .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")));

    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ));

    let file_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_timer(timer.clone())
        .with_target(false)
        .with_ansi(false)
        .with_filter(EnvFilter::new(file_log_level));

    let console_subscriber = console.map(|level| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_timer(timer)
            .with_target(false)
            .with_filter(EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                level
            )))
    });

    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(console_subscriber)
        .with(ErrorLayer::default())
        .init();

    Ok(())
}

/// Returns the last `max_lines` lines of the log file, oldest first.
pub fn tail_log(max_lines: usize) -> Vec<String> {
    match std::fs::read_to_string(log_file_path()) {
        Ok(content) => {
            let lines: Vec<&str> = content.lines().collect();
            let start = lines.len().saturating_sub(max_lines);
            lines[start..].iter().map(|l| l.to_string()).collect()
        }
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_level_follows_verbosity() {
        assert_eq!(console_level(0, false), "error");
        assert_eq!(console_level(1, false), "warn");
        assert_eq!(console_level(2, false), "info");
        assert_eq!(console_level(3, false), "debug");
        assert_eq!(console_level(5, false), "debug");
        assert_eq!(console_level(3, true), "error");
    }

    #[test]
    fn log_file_lives_in_data_dir() {
        let path = log_file_path();
        assert!(path.starts_with(get_data_dir()));
        assert!(path.ends_with("redink.log"));
    }
}
