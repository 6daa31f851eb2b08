//! Presentation of resolved frames.
//!
//! The capture loop talks to a [`FrameSink`]; the renderers here turn the
//! header views into text or JSON lines.

pub mod json;
pub mod text;

pub use json::JsonSink;
pub use text::TextSink;

use crate::capture::{CaptureStats, Frame};
use crate::config::OutputConfig;
use crate::protocol::{DecodeError, ResolvedFrame};
use std::fmt::Write as _;
use std::io;

/// Receives the outcome of every frame the capture loop processes.
pub trait FrameSink {
    /// Headers resolved from frame number `index` (1-based). When
    /// `resolved.error` is set, `diagnostic` follows with the same error.
    fn report(&mut self, index: u64, frame: &Frame<'_>, resolved: &ResolvedFrame<'_>)
        -> io::Result<()>;

    /// A stage of frame `index` could not be resolved.
    fn diagnostic(&mut self, index: u64, frame: &Frame<'_>, error: &DecodeError) -> io::Result<()>;

    /// The run is over.
    fn finish(&mut self, _stats: &CaptureStats) -> io::Result<()> {
        Ok(())
    }
}

impl<K: FrameSink + ?Sized> FrameSink for &mut K {
    fn report(
        &mut self,
        index: u64,
        frame: &Frame<'_>,
        resolved: &ResolvedFrame<'_>,
    ) -> io::Result<()> {
        (**self).report(index, frame, resolved)
    }

    fn diagnostic(&mut self, index: u64, frame: &Frame<'_>, error: &DecodeError) -> io::Result<()> {
        (**self).diagnostic(index, frame, error)
    }

    fn finish(&mut self, stats: &CaptureStats) -> io::Result<()> {
        (**self).finish(stats)
    }
}

impl<K: FrameSink + ?Sized> FrameSink for Box<K> {
    fn report(
        &mut self,
        index: u64,
        frame: &Frame<'_>,
        resolved: &ResolvedFrame<'_>,
    ) -> io::Result<()> {
        (**self).report(index, frame, resolved)
    }

    fn diagnostic(&mut self, index: u64, frame: &Frame<'_>, error: &DecodeError) -> io::Result<()> {
        (**self).diagnostic(index, frame, error)
    }

    fn finish(&mut self, stats: &CaptureStats) -> io::Result<()> {
        (**self).finish(stats)
    }
}

/// Rendering switches shared by all sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub hex_dump: bool,
    pub hex_dump_limit: usize,
    pub quiet: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        DisplayOptions {
            hex_dump: false,
            hex_dump_limit: 256,
            quiet: false,
        }
    }
}

impl From<&OutputConfig> for DisplayOptions {
    fn from(cfg: &OutputConfig) -> Self {
        DisplayOptions {
            hex_dump: cfg.hex_dump,
            hex_dump_limit: cfg.hex_dump_limit,
            quiet: cfg.quiet,
        }
    }
}

/// Format raw bytes as a hex dump with offsets, hex values and ASCII.
pub fn format_hex_dump(data: &[u8], indent: &str) -> String {
    let mut out = String::new();
    for (row, chunk) in data.chunks(16).enumerate() {
        let _ = write!(out, "{}{:04x}  ", indent, row * 16);

        for (i, byte) in chunk.iter().enumerate() {
            let _ = write!(out, "{:02x} ", byte);
            if i == 7 {
                out.push(' ');
            }
        }
        // Padding for incomplete lines
        for i in chunk.len()..16 {
            out.push_str("   ");
            if i == 7 {
                out.push(' ');
            }
        }

        out.push_str(" |");
        for &byte in chunk {
            if byte.is_ascii_graphic() || byte == b' ' {
                out.push(byte as char);
            } else {
                out.push('.');
            }
        }
        out.push_str("|\n");
    }
    out
}

/// Format a capture timestamp (seconds since epoch) as UTC HH:MM:SS.micros.
pub fn format_timestamp(ts: f64) -> String {
    let secs = ts as u64;
    let micros = ((ts - secs as f64) * 1_000_000.0) as u32;

    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    format!("{:02}:{:02}:{:02}.{:06}", hours, minutes, seconds, micros)
}
