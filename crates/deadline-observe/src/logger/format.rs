use std::{fmt, str::FromStr};

use crate::logger::error::LoggerError;

/// Output format of the supervisor's own diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
    /// Native systemd journal fields (Linux, `journald` feature).
    Journald,
}

impl LoggerFormat {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            LoggerFormat::Text => "text",
            LoggerFormat::Json => "json",
            LoggerFormat::Journald => "journald",
        }
    }

    fn journald() -> Result<Self, LoggerError> {
        if cfg!(all(target_os = "linux", feature = "journald")) {
            Ok(LoggerFormat::Journald)
        } else {
            Err(LoggerError::JournaldNotSupported)
        }
    }
}

impl FromStr for LoggerFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LoggerFormat::Text),
            "json" => Ok(LoggerFormat::Json),
            "journald" | "journal" => LoggerFormat::journald(),
            _ => Err(LoggerError::InvalidFormat(s.to_string())),
        }
    }
}

impl fmt::Display for LoggerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
