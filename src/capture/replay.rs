//! In-memory frame source that plays back a fixed script.
//!
//! Used by the benches and the integration tests to drive the capture loop
//! without a network device.

use super::source::{Frame, FrameSource, SourceError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One scripted read outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scripted {
    Frame(Vec<u8>),
    Empty,
    Fatal(String),
}

/// Replays scripted reads, then reports `Exhausted`.
#[derive(Debug)]
pub struct ReplaySource {
    script: VecDeque<Scripted>,
    current: Vec<u8>,
    clock: f64,
    released: Arc<AtomicBool>,
}

impl ReplaySource {
    pub fn new() -> Self {
        ReplaySource {
            script: VecDeque::new(),
            current: Vec::new(),
            clock: 0.0,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn from_frames<I>(frames: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        frames.into_iter().fold(Self::new(), |src, f| src.frame(f))
    }

    pub fn frame(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.script.push_back(Scripted::Frame(bytes.into()));
        self
    }

    pub fn empty_read(mut self) -> Self {
        self.script.push_back(Scripted::Empty);
        self
    }

    pub fn fatal(mut self, cause: impl Into<String>) -> Self {
        self.script.push_back(Scripted::Fatal(cause.into()));
        self
    }

    /// Reads left in the script.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Flag that flips to `true` once this source is dropped.
    pub fn release_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

impl Default for ReplaySource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> Result<Frame<'_>, SourceError> {
        match self.script.pop_front() {
            Some(Scripted::Frame(bytes)) => {
                // Each frame gets its own buffer; the previous one is dropped here.
                self.current = bytes;
                self.clock += 0.001;
                let wire_len = self.current.len() as u32;
                Ok(Frame::new(&self.current, self.clock, wire_len))
            }
            Some(Scripted::Empty) => Err(SourceError::Empty),
            Some(Scripted::Fatal(cause)) => Err(SourceError::fatal(cause)),
            None => Err(SourceError::Exhausted),
        }
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}
