//! Stdout logger for the `bigsi` binary, used both by the CLI itself and,
//! in foreground mode, by the daemon before it detaches.

use std::io;
use std::io::Write;

use chrono::prelude::*;
use colored::*;
use log::{Level, Log, Metadata, Record};

/// Logs to `stdout`, one line per record, with a millisecond timestamp and
/// level-coloured text.
pub struct Logger {
    level: Level,
}

impl Logger {
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Installs this logger as the global `log` sink.
    pub fn init(level: Level) {
        let logger = Box::new(Self::new(level));
        log::set_boxed_logger(logger).expect("no other logger should have been set already");
        log::set_max_level(level.to_level_filter());
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = format!(
            "{:<5} {:<12} {}",
            record.level(),
            record.target().cyan(),
            record.args()
        );
        let message = format!(
            "{} {}",
            Local::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            message,
        );
        let message = match record.level() {
            Level::Error => message.red(),
            Level::Warn => message.yellow(),
            Level::Info => message.normal(),
            Level::Debug => message.dimmed(),
            Level::Trace => message.white().dimmed(),
        };
        writeln!(&mut io::stdout(), "{message}").expect("write shouldn't fail");
    }

    fn flush(&self) {}
}

/// The level set by `RUST_LOG`, if present and valid.
pub fn env_level() -> Option<Level> {
    let level = std::env::var("RUST_LOG").ok()?;
    level.parse().ok()
}
