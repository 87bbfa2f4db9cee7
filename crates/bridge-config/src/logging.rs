use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;

/// Destination for diagnostic output.
///
/// Standard output carries application-channel frames, so it is deliberately
/// absent here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    /// Write to the process standard error stream.
    Stderr,
    /// Append to the given file, creating it when missing.
    File(Utf8PathBuf),
}

impl LogSink {
    /// Resolves the sink from an optional configured file path.
    #[must_use]
    pub fn from_path(path: Option<&Utf8PathBuf>) -> Self {
        path.map_or(Self::Stderr, |file| Self::File(file.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parses_case_insensitively() {
        let format: LogFormat = "COMPACT".parse().expect("parse format");
        assert_eq!(format, LogFormat::Compact);
        assert_eq!(LogFormat::Json.to_string(), "json");
    }

    #[test]
    fn sink_defaults_to_stderr() {
        assert_eq!(LogSink::from_path(None), LogSink::Stderr);
        let path = Utf8PathBuf::from("/tmp/bridge.log");
        assert_eq!(LogSink::from_path(Some(&path)), LogSink::File(path));
    }
}
