use bytes::BytesMut;
use thiserror::Error;
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};

/// Longest line accepted before it is discarded.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024 * 1024;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Line exceeds maximum length of {max} bytes")]
    LineTooLong { max: usize },
    #[error("Line is not valid UTF-8: {0}")]
    InvalidUtf8(String),
}

/// Splits a byte stream on `\n`, buffering partial lines across chunks.
///
/// A trailing `\r` is stripped from each line. Bytes left over when the stream
/// ends are never emitted as a line.
#[derive(Debug)]
pub struct LineFramer {
    codec: LinesCodec,
    buffer: BytesMut,
    max_length: usize,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LENGTH)
    }
}

impl LineFramer {
    pub fn new(max_length: usize) -> Self {
        Self {
            codec: LinesCodec::new_with_max_length(max_length),
            buffer: BytesMut::new(),
            max_length,
        }
    }

    pub fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Next complete line, a framing failure for a dropped line, or `None`
    /// when more input is needed.
    pub fn next_line(&mut self) -> Option<Result<String, FrameError>> {
        match self.codec.decode(&mut self.buffer) {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => None,
            Err(LinesCodecError::MaxLineLengthExceeded) => Some(Err(FrameError::LineTooLong {
                max: self.max_length,
            })),
            Err(LinesCodecError::Io(e)) => Some(Err(FrameError::InvalidUtf8(e.to_string()))),
        }
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Drop the unterminated remainder, returning how many bytes were discarded.
    pub fn discard_remainder(&mut self) -> usize {
        let discarded = self.buffer.len();
        self.buffer.clear();
        discarded
    }
}
