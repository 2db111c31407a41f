use crate::domain::RawRecord;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON parse error: {0}")]
    JsonError(#[from] simd_json::Error),
    #[error("Empty line")]
    EmptyLine,
}

/// Decodes one framed line into a `RawRecord`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordParser;

impl RecordParser {
    pub fn new() -> Self {
        Self
    }

    /// Best-effort decode: anything that is not a JSON object yields `None`.
    pub fn decode(&self, line: &str) -> Option<RawRecord> {
        match self.parse(line) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::trace!("Dropping undecodable line: {}", e);
                None
            }
        }
    }

    pub fn parse(&self, line: &str) -> Result<RawRecord, ParseError> {
        if line.trim().is_empty() {
            return Err(ParseError::EmptyLine);
        }

        // simd-json parses in place
        let mut data = line.as_bytes().to_vec();
        let fields: Map<String, Value> = simd_json::serde::from_slice(&mut data)?;

        Ok(RawRecord::new(fields))
    }
}
