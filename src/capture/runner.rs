//! Sequential capture loop.
//!
//! One frame is read, resolved and reported before the next is requested.
//! The stop flag is only consulted between frames.

use super::source::{Frame, FrameSource, SourceError};
use super::CaptureError;
use crate::display::FrameSink;
use crate::protocol;
use serde::Serialize;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Where the loop is in its two-state cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Blocked on the source.
    Waiting,
    /// Resolving and reporting one frame.
    Processing,
}

/// Counters for one capture run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CaptureStats {
    /// Frames delivered by the source.
    pub frames: u64,
    /// Frames whose whole header chain resolved.
    pub complete: u64,
    /// Frames that stopped at a decode error.
    pub decode_errors: u64,
    /// Reads that returned nothing.
    pub empty_reads: u64,
    /// Captured bytes across all frames.
    pub bytes: u64,
}

/// Drives a source into a sink until stopped.
pub struct CaptureLoop<S, K> {
    source: S,
    sink: K,
    running: Arc<AtomicBool>,
    limit: u64,
}

impl<S: FrameSource, K: FrameSink> CaptureLoop<S, K> {
    pub fn new(source: S, sink: K, running: Arc<AtomicBool>) -> Self {
        CaptureLoop {
            source,
            sink,
            running,
            limit: 0,
        }
    }

    /// Stop after `count` frames (0 = unlimited).
    pub fn with_limit(mut self, count: u64) -> Self {
        self.limit = count;
        self
    }

    /// Run until the stop flag clears, the frame limit is hit, the source
    /// runs dry, or something fails. The source is dropped before this
    /// returns, whatever the outcome.
    pub fn run(self) -> Result<CaptureStats, CaptureError> {
        let CaptureLoop {
            mut source,
            mut sink,
            running,
            limit,
        } = self;

        let mut stats = CaptureStats::default();
        let mut state = LoopState::Waiting;

        while running.load(Ordering::SeqCst) {
            if limit > 0 && stats.frames >= limit {
                tracing::debug!(limit, "frame limit reached");
                break;
            }

            transition(&mut state, LoopState::Waiting);
            let frame = match source.next_frame() {
                Ok(frame) => frame,
                Err(SourceError::Empty) => {
                    stats.empty_reads += 1;
                    continue;
                }
                Err(SourceError::Exhausted) => {
                    tracing::info!(frames = stats.frames, "capture source exhausted");
                    break;
                }
                Err(SourceError::Fatal { cause }) => {
                    tracing::error!(error = %cause, frames = stats.frames, "capture error");
                    return Err(CaptureError::Fatal { cause });
                }
            };

            transition(&mut state, LoopState::Processing);
            stats.frames += 1;
            stats.bytes += frame.len() as u64;
            process_frame(&mut sink, &mut stats, &frame)?;
        }

        sink.finish(&stats)?;
        Ok(stats)
    }
}

fn transition(state: &mut LoopState, next: LoopState) {
    let from = *state;
    if from != next {
        tracing::trace!(?from, to = ?next, "capture loop state");
        *state = next;
    }
}

/// Resolve one frame and report it. Decode failures are counted and
/// reported, never returned; only sink I/O errors escape.
fn process_frame<K: FrameSink + ?Sized>(
    sink: &mut K,
    stats: &mut CaptureStats,
    frame: &Frame<'_>,
) -> io::Result<()> {
    let index = stats.frames;
    match protocol::resolve(frame.data()) {
        Ok(resolved) => {
            sink.report(index, frame, &resolved)?;
            match &resolved.error {
                Some(error) => {
                    stats.decode_errors += 1;
                    tracing::debug!(index, stage = %error.stage(), %error, "frame partially decoded");
                    sink.diagnostic(index, frame, error)?;
                }
                None => stats.complete += 1,
            }
        }
        Err(error) => {
            stats.decode_errors += 1;
            tracing::debug!(index, stage = %error.stage(), %error, "frame not decoded");
            sink.diagnostic(index, frame, &error)?;
        }
    }
    Ok(())
}
