#![deny(warnings, rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Level codes and counters stay within realistic bounds
    clippy::cast_precision_loss,      // Acceptable for sample rates
    clippy::missing_errors_doc,       // Internal API
    clippy::missing_panics_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. SinkError in sink module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown              // Internal API
)]

pub mod app;
pub mod context;
pub mod domain;
pub mod parser;
pub mod pipeline;
pub mod sink;
pub mod transport;

// Re-export main types for easy access
pub use domain::{ReconstructedError, Severity, create_error_with_message, level_to_severity};
pub use pipeline::{PipelineBuilder, PipelineError, PipelineStats, WriteStream, create_write_stream};
pub use sink::{ReportingClient, SentryClient, SentryOptions, SinkError};
pub use transport::{Outcome, SentryTransport, TransportError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
