//! Rule-set data model

use keyremap_core::RemapTable;

/// Default target-app text meaning "every application".
pub const DEFAULT_APP_NAME: &str = "All Apps";

/// Root of a parsed rule-set file
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub global: GlobalConfig,
    /// Rules in file order; single-key and shortcut rules share the table.
    pub rules: RemapTable,
}

/// Global settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalConfig {
    pub log_level: LogLevel,
    /// Target-app text that means OS-wide, compared case-insensitively.
    pub default_app_name: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            default_app_name: DEFAULT_APP_NAME.to_string(),
        }
    }
}

impl GlobalConfig {
    /// Target-app text with the default app name mapped to OS-wide (empty).
    pub fn normalize_app(&self, app: &str) -> String {
        let trimmed = app.trim();
        if trimmed.eq_ignore_ascii_case(self.default_app_name.trim()) {
            String::new()
        } else {
            trimmed.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(format!("Unknown log level: {}", s)),
        }
    }
}
