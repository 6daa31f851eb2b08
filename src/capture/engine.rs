//! libpcap-backed frame sources: a live device or an offline savefile.

use super::source::{Frame, FrameSource, SourceError};
use super::CaptureError;
use crate::config::CaptureConfig;
use pcap::{Activated, Active, Capture, Device, Linktype, Offline};
use std::path::Path;

/// List all available network interfaces.
pub fn list_interfaces() -> Result<Vec<Device>, CaptureError> {
    Ok(Device::list()?)
}

/// A pcap handle wrapped as a `FrameSource`.
///
/// The handle is closed when this value is dropped, which the capture loop
/// guarantees on every exit path.
pub struct PcapSource<T: Activated + ?Sized> {
    cap: Capture<T>,
    label: String,
}

impl<T: Activated + ?Sized> PcapSource<T> {
    /// Interface name or file path this source reads from.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<T: Activated + ?Sized> FrameSource for PcapSource<T> {
    fn next_frame(&mut self) -> Result<Frame<'_>, SourceError> {
        match self.cap.next_packet() {
            Ok(packet) => {
                let ts = packet.header.ts.tv_sec as f64
                    + packet.header.ts.tv_usec as f64 / 1_000_000.0;
                Ok(Frame::new(packet.data, ts, packet.header.len))
            }
            Err(pcap::Error::TimeoutExpired) => Err(SourceError::Empty),
            Err(pcap::Error::NoMorePackets) => Err(SourceError::Exhausted),
            Err(e) => Err(SourceError::fatal(e)),
        }
    }
}

impl<T: Activated + ?Sized> Drop for PcapSource<T> {
    fn drop(&mut self) {
        tracing::debug!(source = %self.label, "capture handle released");
    }
}

/// Open a live packet capture with the given configuration.
pub fn open_live(config: &CaptureConfig) -> Result<PcapSource<Active>, CaptureError> {
    let device = match &config.interface {
        Some(name) => Device::list()?
            .into_iter()
            .find(|d| d.name == *name)
            .ok_or_else(|| CaptureError::NoDevice(format!("interface '{}' not found", name)))?,
        None => Device::lookup()?
            .ok_or_else(|| CaptureError::NoDevice("no default device found".into()))?,
    };

    let device_name = device.name.clone();

    let cap = Capture::from_device(device)?
        .promisc(config.promiscuous)
        .snaplen(config.snaplen)
        .timeout(config.timeout_ms)
        .open()?;

    warn_on_non_ethernet(cap.get_datalink(), &device_name);

    tracing::info!(
        interface = %device_name,
        promiscuous = config.promiscuous,
        snaplen = config.snaplen,
        timeout_ms = config.timeout_ms,
        "capture started"
    );

    Ok(PcapSource {
        cap,
        label: device_name,
    })
}

/// Open a pcap savefile for replay.
pub fn open_offline(path: &Path) -> Result<PcapSource<Offline>, CaptureError> {
    let cap = Capture::from_file(path)?;
    let label = path.display().to_string();

    warn_on_non_ethernet(cap.get_datalink(), &label);
    tracing::info!(file = %label, "replay started");

    Ok(PcapSource { cap, label })
}

fn warn_on_non_ethernet(link: Linktype, label: &str) {
    if link != Linktype::ETHERNET {
        tracing::warn!(
            source = %label,
            linktype = link.0,
            "link type is not Ethernet, headers will not decode"
        );
    }
}
