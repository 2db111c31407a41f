//! Domain layer for sentry-log-bridge.
//!
//! Contains the canonical types shared across all modules:
//! - `Severity`: Sentry-facing severity (debug/log/info/warning/error/fatal/critical)
//! - `RawRecord`: One decoded log line, split into recognised fields and extra context
//! - `ReconstructedError`: Synthetic error rebuilt from a serialized `err` field

pub mod error;
pub mod record;
pub mod severity;

pub use error::{ReconstructedError, create_error_with_message};
pub use record::{RawRecord, RecordParts, SerializedError};
pub use severity::{Severity, SeverityParseError, level_to_severity};
