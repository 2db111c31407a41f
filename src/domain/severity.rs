use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Severity assigned to a forwarded record.
///
/// Mirrors the level names the Sentry SDKs accept. `Critical` is kept only so
/// that configurations written against older SDKs still validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Log,
    Info,
    Warning,
    Error,
    Fatal,
    Critical,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid severity '{input}'. Valid severities: {}", Severity::allowed_names())]
pub struct SeverityParseError {
    pub input: String,
}

impl Severity {
    /// Every severity in rank order.
    pub const ALL: [Severity; 7] = [
        Severity::Debug,
        Severity::Log,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Fatal,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Log => "log",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
            Severity::Critical => "critical",
        }
    }

    /// Ordinal used only for threshold comparison.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Debug => 1,
            Severity::Log => 2,
            Severity::Info => 3,
            Severity::Warning => 4,
            Severity::Error => 5,
            Severity::Fatal => 6,
            Severity::Critical => 7,
        }
    }

    pub fn is_at_least(&self, threshold: Severity) -> bool {
        self.rank() >= threshold.rank()
    }

    /// Comma separated list of accepted names, in rank order.
    pub fn allowed_names() -> String {
        Self::ALL
            .iter()
            .map(Severity::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = SeverityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|severity| severity.as_str() == s)
            .ok_or_else(|| SeverityParseError {
                input: s.to_string(),
            })
    }
}

impl From<Severity> for sentry::Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Debug => sentry::Level::Debug,
            Severity::Log | Severity::Info => sentry::Level::Info,
            Severity::Warning => sentry::Level::Warning,
            Severity::Error => sentry::Level::Error,
            Severity::Fatal | Severity::Critical => sentry::Level::Fatal,
        }
    }
}

/// Map a pino level (numeric code or label) onto a severity.
///
/// Unknown, absent and non-scalar levels fall back to `Info`.
pub fn level_to_severity(level: &Value) -> Severity {
    let mapped = match level {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|code| code.fract() == 0.0 && *code >= 0.0)
                    .map(|code| code as u64)
            })
            .and_then(severity_for_code),
        Value::String(label) => severity_for_label(label),
        _ => None,
    };

    mapped.unwrap_or(Severity::Info)
}

fn severity_for_code(code: u64) -> Option<Severity> {
    match code {
        10 | 20 => Some(Severity::Debug),
        30 => Some(Severity::Info),
        40 => Some(Severity::Warning),
        50 => Some(Severity::Error),
        60 => Some(Severity::Fatal),
        _ => None,
    }
}

// Labels are matched exactly; a label spelling a code ("50") maps like the code.
fn severity_for_label(label: &str) -> Option<Severity> {
    match label {
        "trace" | "debug" => Some(Severity::Debug),
        "info" => Some(Severity::Info),
        "warning" => Some(Severity::Warning),
        "error" => Some(Severity::Error),
        "fatal" => Some(Severity::Fatal),
        "10" | "20" | "30" | "40" | "50" | "60" => label.parse().ok().and_then(severity_for_code),
        _ => None,
    }
}
