use std::fmt;

use super::parser::LineKind;
use super::schema::expected_header;
use super::units::InvalidNumberFormat;
use crate::collector::traits::LaunchError;

/// Error type for probe failures.
///
/// Line-level variants never escape a session: they are reported to the
/// diagnostic sink and the offending line is skipped. Only launch and state
/// errors are returned from [`DstatProbe::start`](super::DstatProbe::start).
#[derive(Debug)]
pub enum ProbeError {
    /// Banner or header line does not look like dstat `-m --all` output.
    FormatDrift { kind: LineKind, line: String },
    /// Data line does not have the expected 18-column shape.
    RowParse { line: String },
    /// Data line has the right shape but a value could not be decoded.
    InvalidNumber {
        line: String,
        source: InvalidNumberFormat,
    },
    /// dstat could not be started.
    ProcessLaunch { command: String, source: LaunchError },
    /// `start` called while a session is running.
    AlreadyStarted,
    /// `start` called after `stop`.
    Stopped,
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::FormatDrift {
                kind: LineKind::Header,
                line,
            } => write!(
                f,
                "Header line does not match expected header [exp={}, act={}].",
                expected_header(),
                line
            ),
            ProbeError::FormatDrift { line, .. } => write!(f, "Unexpected first line: '{}'.", line),
            ProbeError::RowParse { line } => write!(f, "Can't parse line: '{}'.", line),
            ProbeError::InvalidNumber { line, source } => write!(
                f,
                "Can't parse line '{}' due to exception: '{}'.",
                line, source
            ),
            ProbeError::ProcessLaunch { command, source } => write!(
                f,
                "Can not start '{}' process due to exception: '{}'.",
                command, source
            ),
            ProbeError::AlreadyStarted => write!(f, "probe is already running"),
            ProbeError::Stopped => write!(f, "probe has been stopped"),
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProbeError::InvalidNumber { source, .. } => Some(source),
            ProbeError::ProcessLaunch { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl ProbeError {
    /// Banner drift is advisory; every other line error is reported as an
    /// error.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ProbeError::FormatDrift {
                kind: LineKind::Banner,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ProbeError::FormatDrift {
            kind: LineKind::Banner,
            line: "garbage".into(),
        };
        assert_eq!(err.to_string(), "Unexpected first line: 'garbage'.");
        assert!(err.is_warning());

        let err = ProbeError::FormatDrift {
            kind: LineKind::Header,
            line: "garbage".into(),
        };
        assert!(err.to_string().starts_with("Header line does not match expected header [exp=used buff"));
        assert!(err.to_string().ends_with("act=garbage]."));
        assert!(!err.is_warning());

        let err = ProbeError::RowParse { line: "1 2 3".into() };
        assert_eq!(err.to_string(), "Can't parse line: '1 2 3'.");
        assert!(!err.is_warning());
    }

    #[test]
    fn test_invalid_number_source() {
        use std::error::Error;

        let err = ProbeError::InvalidNumber {
            line: "row".into(),
            source: InvalidNumberFormat::new("5x", "unknown 'x' unit of measure"),
        };
        assert_eq!(
            err.to_string(),
            "Can't parse line 'row' due to exception: 'invalid number '5x': unknown 'x' unit of measure'."
        );
        assert!(err.source().is_some());
    }
}
