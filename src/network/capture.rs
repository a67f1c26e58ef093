use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use log::{debug, warn};
use pcap::{Active, Capture, Device};

use crate::error::{CaptureError, DecodeError};
use super::{decode::decode_frame, table::FlowTable};

const SNAPLEN: i32 = 65535;

// Read timeout on the pcap handle. Bounds every blocking next_packet()
// call so the stop flag is observed within this interval even when the
// interface is quiet.
const READ_TIMEOUT_MS: i32 = 500;

/// How the capture source is opened.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub interface: String,
    pub promiscuous: bool,
}

/// Handle to a running capture loop.
///
/// `start` validates and opens the device synchronously, so configuration
/// errors surface before any thread exists; the returned handle owns the
/// capture thread and must be `stop`ped (or dropped) to join it. The pcap
/// handle lives inside the thread and is released only after the loop has
/// fully exited.
#[derive(Debug)]
pub struct PacketCapture {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<(), CaptureError>>>,
}

impl PacketCapture {
    pub fn start(config: &CaptureConfig, table: Arc<FlowTable>) -> Result<Self, CaptureError> {
        let device = list_devices()?
            .into_iter()
            .find(|d| d.name == config.interface)
            .ok_or_else(|| CaptureError::InterfaceNotFound(config.interface.clone()))?;

        let cap = Capture::from_device(device)
            .and_then(|cap| {
                cap.promisc(config.promiscuous)
                    .snaplen(SNAPLEN)
                    .timeout(READ_TIMEOUT_MS)
                    .immediate_mode(true)
                    .open()
            })
            .map_err(|source| CaptureError::Open {
                iface: config.interface.clone(),
                source,
            })?;

        debug!(
            "capture started on {} (promiscuous: {})",
            config.interface, config.promiscuous
        );

        let stop = Arc::new(AtomicBool::new(false));
        let loop_stop = Arc::clone(&stop);
        let thread = thread::spawn(move || run_loop(cap, table, loop_stop));

        Ok(PacketCapture {
            stop,
            thread: Some(thread),
        })
    }

    /// Whether the capture loop has terminated on its own, i.e. a fatal
    /// device failure while no stop was requested.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Requests a stop and joins the capture thread, returning the loop's
    /// outcome: `Ok` for a clean stop, `Err` for a device failure.
    pub fn stop(mut self) -> Result<(), CaptureError> {
        self.stop.store(true, Ordering::Relaxed);
        match self.thread.take() {
            Some(handle) => match handle.join() {
                Ok(outcome) => outcome,
                Err(_) => Err(CaptureError::Device(pcap::Error::PcapError(
                    "capture thread panicked".into(),
                ))),
            },
            None => Ok(()),
        }
    }
}

impl Drop for PacketCapture {
    // Join even on error paths that skip stop(), so the device is never
    // left open behind a detached thread.
    fn drop(&mut self) {
        if let Some(handle) = self.thread.take() {
            self.stop.store(true, Ordering::Relaxed);
            if let Ok(Err(e)) = handle.join() {
                warn!("capture loop ended with error: {e}");
            }
        }
    }
}

/// Enumerates capture-capable devices, for interface selection.
pub fn list_devices() -> Result<Vec<Device>, CaptureError> {
    Device::list().map_err(CaptureError::DeviceList)
}

fn run_loop(
    mut cap: Capture<Active>,
    table: Arc<FlowTable>,
    stop: Arc<AtomicBool>,
) -> Result<(), CaptureError> {
    let mut unsupported = 0u64;

    while !stop.load(Ordering::Relaxed) {
        match cap.next_packet() {
            Ok(packet) => match decode_frame(packet.data) {
                Ok(Some(sample)) => table.merge(&sample),
                Ok(None) => {}
                Err(DecodeError::UnsupportedEtherType(ethertype)) => {
                    unsupported += 1;
                    // Log the first and then every 100th occurrence so a
                    // flood of unknown traffic does not drown the log
                    if unsupported == 1 || unsupported % 100 == 0 {
                        warn!(
                            "dropped frame with unsupported ethertype {ethertype:#06x} \
                             ({unsupported} so far)"
                        );
                    }
                }
            },
            // The read timeout elapsed with no traffic; loop around so a
            // pending stop request is noticed
            Err(pcap::Error::TimeoutExpired) => continue,
            Err(e) => return Err(CaptureError::Device(e)),
        }
    }

    debug!("capture loop stopped cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_with_unknown_interface_fails_synchronously() {
        let table = Arc::new(FlowTable::new());
        let config = CaptureConfig {
            interface: "flowtop-no-such-device".into(),
            promiscuous: false,
        };
        let err = PacketCapture::start(&config, table).expect_err("must fail");
        assert!(matches!(
            err,
            CaptureError::InterfaceNotFound(_) | CaptureError::DeviceList(_)
        ));
    }
}
