use crate::domain::{Severity, SeverityParseError};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Parse a comma-separated severity list such as `"fatal,error"`.
///
/// Blank entries are ignored, so a trailing comma is accepted.
pub fn parse_severity_list(input: &str) -> Result<Vec<Severity>, SeverityParseError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect()
}

/// Accepts either a TOML array of severity names or a comma-separated string.
pub fn severity_list<'de, D>(deserializer: D) -> Result<Option<Vec<Severity>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrJoined {
        List(Vec<Severity>),
        Joined(String),
    }

    match Option::<ListOrJoined>::deserialize(deserializer)? {
        None => Ok(None),
        Some(ListOrJoined::List(levels)) => Ok(Some(levels)),
        Some(ListOrJoined::Joined(joined)) => parse_severity_list(&joined)
            .map(Some)
            .map_err(D::Error::custom),
    }
}
