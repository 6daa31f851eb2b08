//! The frame type and the trait every capture source implements.

use std::error::Error as StdError;
use thiserror::Error;

/// Largest frame the decoder accepts; longer captures are cut to this.
pub const MAX_FRAME_LEN: usize = 65536;

/// One captured link-layer frame.
///
/// Borrows the source's buffer for a single loop iteration. The slice is
/// exactly the captured length, so bytes from an earlier, longer frame can
/// never show through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame<'a> {
    data: &'a [u8],
    timestamp: f64,
    wire_len: u32,
}

impl<'a> Frame<'a> {
    pub fn new(data: &'a [u8], timestamp: f64, wire_len: u32) -> Self {
        let data = &data[..data.len().min(MAX_FRAME_LEN)];
        Frame {
            data,
            timestamp,
            wire_len,
        }
    }

    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Captured length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Capture time in seconds since the epoch.
    #[inline]
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Length of the frame on the wire, which exceeds `len()` when the
    /// snapshot length cut it short.
    #[inline]
    pub fn wire_len(&self) -> u32 {
        self.wire_len
    }
}

/// Why a source did not produce a frame.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Nothing arrived this time (read timeout, interrupted read). The loop
    /// skips and asks again.
    #[error("no frame available")]
    Empty,

    /// An offline source reached its end.
    #[error("capture source exhausted")]
    Exhausted,

    /// The source cannot deliver any more frames.
    #[error("capture source failed: {cause}")]
    Fatal {
        #[source]
        cause: Box<dyn StdError + Send + Sync>,
    },
}

impl SourceError {
    pub fn fatal(cause: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        SourceError::Fatal {
            cause: cause.into(),
        }
    }
}

/// Anything that yields captured frames one at a time.
///
/// The returned frame borrows the source, so the next call cannot happen
/// until the caller is done with it.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Frame<'_>, SourceError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Frame<'_>, SourceError> {
        (**self).next_frame()
    }
}
