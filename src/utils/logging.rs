// Tue Oct 13 2026 - Alex

use colored::*;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Only records from this crate are shown below `Warn`; dependencies stay quiet.
const CRATE_TARGET: &str = "df_structures_import";

pub struct LoggingUtils;

impl LoggingUtils {
    pub fn init_stderr(level: LevelFilter, color: bool) {
        let logger = Box::new(StderrLogger { level, color });
        log::set_boxed_logger(logger).ok();
        log::set_max_level(level);
    }

    pub fn init_file(level: LevelFilter, path: &Path) -> std::io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let logger = Box::new(FileLogger {
            level,
            file: Mutex::new(file),
        });
        log::set_boxed_logger(logger).ok();
        log::set_max_level(level);
        Ok(())
    }

    pub fn level_from_str(s: &str) -> LevelFilter {
        match s.to_lowercase().as_str() {
            "error" => LevelFilter::Error,
            "warn" | "warning" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info,
        }
    }

    pub fn level_from_verbosity(verbosity: usize) -> LevelFilter {
        match verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn admits(level: LevelFilter, metadata: &Metadata) -> bool {
    if metadata.level() > level {
        return false;
    }
    metadata.level() <= Level::Warn || metadata.target().starts_with(CRATE_TARGET)
}

struct StderrLogger {
    level: LevelFilter,
    color: bool,
}

impl StderrLogger {
    fn tag(&self, level: Level) -> String {
        if !self.color {
            return format!("{:5}", level);
        }
        let tag = match level {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".green().bold(),
            Level::Debug => "DEBUG".blue().bold(),
            Level::Trace => "TRACE".magenta().bold(),
        };
        tag.to_string()
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        admits(self.level, metadata)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let module = record
            .target()
            .strip_prefix(CRATE_TARGET)
            .map(|m| m.trim_start_matches("::"))
            .unwrap_or(record.target());
        if module.is_empty() || !self.color {
            eprintln!("{} {}", self.tag(record.level()), record.args());
        } else {
            eprintln!("{} {} {}", self.tag(record.level()), format!("[{}]", module).dimmed(), record.args());
        }
    }

    fn flush(&self) {}
}

struct FileLogger {
    level: LevelFilter,
    file: Mutex<File>,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        admits(self.level, metadata)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("{} {:5} [{}] {}\n", timestamp(), record.level(), record.target(), record.args());
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

fn timestamp() -> String {
    let duration = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    format!("{}.{:03}", duration.as_secs(), duration.subsec_millis())
}

/// Logs how long a phase took when dropped.
pub struct ScopedTimer {
    name: String,
    start: std::time::Instant,
}

impl ScopedTimer {
    pub fn new(name: &str) -> Self {
        log::debug!("{} started", name);
        Self {
            name: name.to_string(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        log::debug!("{} took {}", self.name, super::format_duration(self.start.elapsed()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::MetadataBuilder;

    #[test]
    fn test_levels() {
        assert_eq!(LoggingUtils::level_from_verbosity(0), LevelFilter::Warn);
        assert_eq!(LoggingUtils::level_from_verbosity(5), LevelFilter::Trace);
        assert_eq!(LoggingUtils::level_from_str("WARNING"), LevelFilter::Warn);
        assert_eq!(LoggingUtils::level_from_str("bogus"), LevelFilter::Info);
    }

    #[test]
    fn test_dependencies_only_log_warnings() {
        let own = MetadataBuilder::new()
            .level(Level::Info)
            .target("df_structures_import::layout::registry")
            .build();
        let foreign = MetadataBuilder::new().level(Level::Info).target("quick_xml").build();
        let foreign_warn = MetadataBuilder::new().level(Level::Warn).target("quick_xml").build();

        assert!(admits(LevelFilter::Info, &own));
        assert!(!admits(LevelFilter::Info, &foreign));
        assert!(admits(LevelFilter::Info, &foreign_warn));
        assert!(!admits(LevelFilter::Warn, &own));
    }
}
