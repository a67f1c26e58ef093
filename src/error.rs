use thiserror::Error;

/// Errors surfaced by the capture subsystem.
///
/// Configuration problems (`DeviceList`, `InterfaceNotFound`, `Open`) fail
/// `PacketCapture::start` before any thread exists; `Device` is a fatal
/// mid-capture failure reported when the loop terminates.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to enumerate capture devices: {0}")]
    DeviceList(#[source] pcap::Error),

    #[error("interface {0} not found")]
    InterfaceNotFound(String),

    #[error("cannot open capture on {iface}: {source}")]
    Open {
        iface: String,
        #[source]
        source: pcap::Error,
    },

    #[error("capture device failure: {0}")]
    Device(#[source] pcap::Error),
}

/// Per-frame decode failure. Recoverable: the frame is dropped and capture
/// continues. Truncated frames and unmapped protocols are not errors at
/// all, they decode to `None`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unsupported ethertype {0:#06x}")]
    UnsupportedEtherType(u16),
}
