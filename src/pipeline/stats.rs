use crate::transport::Outcome;
use serde::Serialize;

/// Counters for one stream, returned by `WriteStream::finish`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    /// Bytes read from the input side.
    pub bytes: u64,
    /// Complete lines framed, including malformed ones.
    pub lines: u64,
    pub malformed: u64,
    pub filtered: u64,
    pub exceptions: u64,
    pub breadcrumbs: u64,
    /// Unterminated bytes dropped at end of input.
    pub discarded_bytes: u64,
}

impl PipelineStats {
    pub(crate) fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Filtered => self.filtered += 1,
            Outcome::Exception => self.exceptions += 1,
            Outcome::Breadcrumb => self.breadcrumbs += 1,
        }
    }

    /// Records that reached the reporting client.
    pub fn forwarded(&self) -> u64 {
        self.exceptions + self.breadcrumbs
    }
}
