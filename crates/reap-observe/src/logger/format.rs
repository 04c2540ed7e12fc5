use std::{fmt, str::FromStr};

use crate::logger::error::LoggerError;

/// Output encoding of log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggerFormat {
    /// Human-readable lines, colored on a terminal.
    #[default]
    Text,
    /// One JSON object per event, for log shippers.
    Json,
    /// Native systemd journal fields.
    Journald,
}

impl LoggerFormat {
    pub const ALL: [LoggerFormat; 3] = [LoggerFormat::Text, LoggerFormat::Json, LoggerFormat::Journald];

    pub const fn as_str(self) -> &'static str {
        match self {
            LoggerFormat::Text => "text",
            LoggerFormat::Json => "json",
            LoggerFormat::Journald => "journald",
        }
    }

    /// `text|json|journald`, as shown in errors and CLI help.
    pub fn accepted() -> String {
        Self::ALL.map(Self::as_str).join("|")
    }

    fn available(self) -> bool {
        match self {
            LoggerFormat::Journald => cfg!(all(target_os = "linux", feature = "journald")),
            LoggerFormat::Text | LoggerFormat::Json => true,
        }
    }
}

impl fmt::Display for LoggerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoggerFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        let format = match wanted.to_ascii_lowercase().as_str() {
            "journal" => LoggerFormat::Journald,
            name => Self::ALL
                .into_iter()
                .find(|f| f.as_str() == name)
                .ok_or_else(|| LoggerError::InvalidFormat {
                    given: s.to_string(),
                    expected: Self::accepted(),
                })?,
        };
        if !format.available() {
            return Err(LoggerError::JournaldNotSupported);
        }
        Ok(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_display() {
        for format in LoggerFormat::ALL.into_iter().filter(|f| f.available()) {
            assert_eq!(format.to_string().parse::<LoggerFormat>().unwrap(), format);
        }
        assert_eq!(" JSON ".parse::<LoggerFormat>().unwrap(), LoggerFormat::Json);
    }

    #[test]
    fn unknown_format_lists_accepted_names() {
        let err = "yaml".parse::<LoggerFormat>().unwrap_err();
        assert!(matches!(
            err,
            LoggerError::InvalidFormat { ref given, ref expected }
                if given == "yaml" && expected == "text|json|journald"
        ));
        assert!(err.to_string().contains("text|json|journald"));
    }

    #[cfg(not(all(target_os = "linux", feature = "journald")))]
    #[test]
    fn journald_requires_feature() {
        for name in ["journald", "Journal"] {
            let err = name.parse::<LoggerFormat>().unwrap_err();
            assert!(matches!(err, LoggerError::JournaldNotSupported));
        }
    }
}
