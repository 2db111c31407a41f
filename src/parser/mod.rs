pub mod line;
pub mod record;

pub use line::{DEFAULT_MAX_LINE_LENGTH, FrameError, LineFramer};
pub use record::{ParseError, RecordParser};
