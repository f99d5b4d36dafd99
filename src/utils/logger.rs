// src/utils/logger.rs
// Structured JSON logging for the analytics engine. Lines are emitted
// through the `log` facade so the host picks the sink; payloads carry a
// timestamp, the level, the message and any scoped fields.

use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    fn to_facade(self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            _ => Err(()),
        }
    }
}

/// Leveled logger carrying a set of scoped fields that appear on every
/// line it emits.
#[derive(Debug, Clone)]
pub struct Logger {
    level: LogLevel,
    fields: BTreeMap<String, Value>,
}

impl Logger {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            fields: BTreeMap::new(),
        }
    }

    /// Level from `LOG_LEVEL`, defaulting to info.
    pub fn from_env() -> Self {
        let level = std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(LogLevel::Info);
        Self::new(level)
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Copy of this logger with one more scoped field.
    pub fn with_field(&self, key: &str, value: Value) -> Self {
        let mut scoped = self.clone();
        scoped.fields.insert(key.to_string(), value);
        scoped
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level
    }

    fn emit(&self, level: LogLevel, message: &str, meta: Option<&Value>) {
        if !self.enabled(level) {
            return;
        }

        let mut line = json!({
            "ts": chrono::Utc::now().to_rfc3339(),
            "level": level.as_str(),
            "msg": message,
        });
        for (key, value) in &self.fields {
            line[key.as_str()] = value.clone();
        }
        if let Some(meta) = meta {
            line["meta"] = meta.clone();
        }

        let payload = serde_json::to_string(&line)
            .unwrap_or_else(|_| format!("{{\"level\":\"{}\",\"msg\":{:?}}}", level.as_str(), message));
        log::log!(level.to_facade(), "{}", payload);
    }

    pub fn error(&self, message: &str) {
        self.emit(LogLevel::Error, message, None);
    }

    pub fn error_with_meta(&self, message: &str, meta: &Value) {
        self.emit(LogLevel::Error, message, Some(meta));
    }

    pub fn warn(&self, message: &str) {
        self.emit(LogLevel::Warn, message, None);
    }

    pub fn warn_with_meta(&self, message: &str, meta: &Value) {
        self.emit(LogLevel::Warn, message, Some(meta));
    }

    pub fn info(&self, message: &str) {
        self.emit(LogLevel::Info, message, None);
    }

    pub fn info_with_meta(&self, message: &str, meta: &Value) {
        self.emit(LogLevel::Info, message, Some(meta));
    }

    pub fn debug(&self, message: &str) {
        self.emit(LogLevel::Debug, message, None);
    }
}

static GLOBAL_LOGGER: OnceLock<Logger> = OnceLock::new();

/// Install the process-wide logger; later calls are no-ops.
pub fn init_logger(level: LogLevel) {
    GLOBAL_LOGGER.set(Logger::new(level)).ok();
}

/// Process-wide logger, initialized from the environment on first use.
pub fn logger() -> &'static Logger {
    GLOBAL_LOGGER.get_or_init(Logger::from_env)
}

#[macro_export]
macro_rules! log_error {
    ($msg:expr) => {
        $crate::utils::logger::logger().error($msg)
    };
    ($msg:expr, $meta:expr) => {
        $crate::utils::logger::logger().error_with_meta($msg, &$meta)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($msg:expr) => {
        $crate::utils::logger::logger().warn($msg)
    };
    ($msg:expr, $meta:expr) => {
        $crate::utils::logger::logger().warn_with_meta($msg, &$meta)
    };
}

#[macro_export]
macro_rules! log_info {
    ($msg:expr) => {
        $crate::utils::logger::logger().info($msg)
    };
    ($msg:expr, $meta:expr) => {
        $crate::utils::logger::logger().info_with_meta($msg, &$meta)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($msg:expr) => {
        $crate::utils::logger::logger().debug($msg)
    };
}
