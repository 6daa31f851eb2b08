//! framescope: live Ethernet/IPv4/TCP header decoding.
//!
//! Frames come from a [`capture::FrameSource`], are resolved into
//! length-checked header views by [`protocol::resolve`], and are rendered by a
//! [`display::FrameSink`]. [`capture::CaptureLoop`] ties the three together.

pub mod capture;
pub mod config;
pub mod display;
pub mod protocol;

pub use capture::{CaptureError, CaptureLoop, CaptureStats, Frame, FrameSource};
pub use display::FrameSink;
pub use protocol::{resolve, DecodeError, ResolvedFrame, Stage};
