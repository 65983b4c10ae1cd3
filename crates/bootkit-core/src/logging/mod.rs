//! # Bootkit Core Logging
//!
//! The leveled logging capability handed to entries, plugins and the boot
//! orchestrator. Everything funnels into the `log` facade; the binary decides
//! where records end up.
//!
//! - [`Logger`] is the capability itself: a sink with a threshold.
//! - [`StandardLogger`] is the default sink, scoped by a prefix such as
//!   `"announcement-github"` or `"boot"`.
//! - [`parse_level`] turns the `logLevel` strings found in configuration into
//!   a [`LevelFilter`].
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use log::{Level, LevelFilter};

/// Shared handle to a logger, cloned into every component that logs.
pub type SharedLogger = Arc<dyn Logger>;

/// Leveled text sink.
///
/// Implementors only provide the raw write and the threshold; the
/// per-level helpers live on `dyn Logger` and drop messages below
/// [`Logger::level`] before formatting them.
pub trait Logger: Send + Sync {
    /// Current threshold. Messages below it are discarded.
    fn level(&self) -> LevelFilter;

    /// Write a message that already passed the threshold check.
    fn log(&self, level: Level, message: &str);
}

impl dyn Logger {
    fn emit(&self, level: Level, message: &dyn fmt::Display) {
        if level <= self.level() {
            self.log(level, &message.to_string());
        }
    }

    pub fn trace(&self, message: impl fmt::Display) {
        self.emit(Level::Trace, &message);
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.emit(Level::Debug, &message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.emit(Level::Info, &message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.emit(Level::Warn, &message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.emit(Level::Error, &message);
    }
}

/// Default logger: prefixes every message and forwards it to the `log` facade.
#[derive(Debug)]
pub struct StandardLogger {
    prefix: String,
    level: RwLock<LevelFilter>,
}

impl StandardLogger {
    pub fn new(prefix: impl Into<String>, level: LevelFilter) -> Self {
        Self {
            prefix: prefix.into(),
            level: RwLock::new(level),
        }
    }

    /// Logger at `Info`, the level used when configuration does not say otherwise.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::new(prefix, LevelFilter::Info)
    }

    /// Convenience constructor returning the shared form.
    pub fn shared(prefix: impl Into<String>, level: LevelFilter) -> SharedLogger {
        Arc::new(Self::new(prefix, level))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn set_level(&self, level: LevelFilter) {
        let mut guard = self.level.write().unwrap_or_else(|e| e.into_inner());
        *guard = level;
    }
}

impl Logger for StandardLogger {
    fn level(&self) -> LevelFilter {
        *self.level.read().unwrap_or_else(|e| e.into_inner())
    }

    fn log(&self, level: Level, message: &str) {
        if self.prefix.is_empty() {
            log::log!(level, "{}", message);
        } else {
            log::log!(level, "[{}] {}", self.prefix, message);
        }
    }
}

/// Map a configuration level string onto a filter. Unknown or empty strings
/// fall back to `Info`.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.trim() {
        "" => LevelFilter::Info,
        other => LevelFilter::from_str(other).unwrap_or(LevelFilter::Info),
    }
}

#[cfg(test)]
pub(crate) mod tests;
