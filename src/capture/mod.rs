//! Frame acquisition and the capture loop.
//!
//! Sources yield one [`Frame`] at a time; [`CaptureLoop`] resolves each
//! frame's header chain and hands the result to a [`FrameSink`](crate::display::FrameSink).

pub mod engine;
pub mod replay;
pub mod runner;
pub mod source;

pub use runner::{CaptureLoop, CaptureStats, LoopState};
pub use source::{Frame, FrameSource, SourceError, MAX_FRAME_LEN};

use std::error::Error as StdError;
use std::io;
use thiserror::Error;

/// Errors that end a capture run.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Failed to find a suitable network device.
    #[error("no capture device: {0}")]
    NoDevice(String),

    /// Opening or configuring the pcap handle failed.
    #[error("pcap error: {0}")]
    Pcap(#[from] pcap::Error),

    /// The source failed while the loop was running.
    #[error("capture source failed: {cause}")]
    Fatal {
        #[source]
        cause: Box<dyn StdError + Send + Sync>,
    },

    /// Writing a report failed (closed pipe, full disk).
    #[error("report output failed: {0}")]
    Output(#[from] io::Error),
}
