use std::{fmt, net::IpAddr};

use clap::ValueEnum;
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};

/// Protocols the classifier recognizes. Anything else is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    Ip,
    Ipv6,
    Icmp,
    Igmp,
    Tcp,
    Udp,
}

impl Protocol {
    /// Maps an IP protocol / next-header number to a known protocol.
    /// Numbers outside the fixed table yield `None` (not classifiable).
    pub fn from_ip_number(proto: IpNextHeaderProtocol) -> Option<Self> {
        match proto {
            // IPPROTO_IP is 0, which pnet names Hopopt
            IpNextHeaderProtocols::Hopopt => Some(Protocol::Ip),
            IpNextHeaderProtocols::Ipv6 => Some(Protocol::Ipv6),
            IpNextHeaderProtocols::Icmp => Some(Protocol::Icmp),
            IpNextHeaderProtocols::Igmp => Some(Protocol::Igmp),
            IpNextHeaderProtocols::Tcp => Some(Protocol::Tcp),
            IpNextHeaderProtocols::Udp => Some(Protocol::Udp),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Protocol::Ip => "ip",
            Protocol::Ipv6 => "ipv6",
            Protocol::Icmp => "icmp",
            Protocol::Igmp => "igmp",
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One side of a flow: an IP address plus a port when the transport has one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Endpoint {
    pub addr: IpAddr,
    pub port: Option<u16>,
}

impl Endpoint {
    pub fn new(addr: IpAddr) -> Self {
        Endpoint { addr, port: None }
    }

    pub fn with_port(addr: IpAddr, port: u16) -> Self {
        Endpoint {
            addr,
            port: Some(port),
        }
    }
}

impl fmt::Display for Endpoint {
    // IPv6 addresses with a port are bracketed: [fe80::1]:80
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.addr, self.port) {
            (IpAddr::V6(addr), Some(port)) => write!(f, "[{}]:{}", addr, port),
            (addr, Some(port)) => write!(f, "{}:{}", addr, port),
            (addr, None) => write!(f, "{}", addr),
        }
    }
}

/// Flow identifier for tracking bidirectional traffic.
///
/// Stored in the orientation of the first packet seen for the pair; a
/// packet matching the swapped tuple belongs to the same flow and counts
/// toward its tx side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowKey {
    pub src: Endpoint,
    pub dst: Endpoint,
    pub proto: Protocol,
}

impl FlowKey {
    /// The same flow viewed from the opposite direction.
    pub fn swapped(&self) -> FlowKey {
        FlowKey {
            src: self.dst.clone(),
            dst: self.src.clone(),
            proto: self.proto,
        }
    }
}

/// Per-flow counters, relative to the first-seen orientation: rx is
/// traffic in the stored direction, tx is the reverse. Counters saturate
/// at `u64::MAX` rather than wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowRecord {
    pub bytes_rx: u64,
    pub packets_rx: u64,
    pub bytes_tx: u64,
    pub packets_tx: u64,
}

impl FlowRecord {
    pub fn add_rx(&mut self, bytes: u64) {
        self.bytes_rx = self.bytes_rx.saturating_add(bytes);
        self.packets_rx = self.packets_rx.saturating_add(1);
    }

    pub fn add_tx(&mut self, bytes: u64) {
        self.bytes_tx = self.bytes_tx.saturating_add(bytes);
        self.packets_tx = self.packets_tx.saturating_add(1);
    }

    pub fn total_bytes(&self) -> u64 {
        self.bytes_rx.saturating_add(self.bytes_tx)
    }

    pub fn total_packets(&self) -> u64 {
        self.packets_rx.saturating_add(self.packets_tx)
    }
}

/// A single classified packet as produced by the frame decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSample {
    pub src: Endpoint,
    pub dst: Endpoint,
    pub proto: Protocol,
    pub bytes: u64,
}

impl FlowSample {
    pub fn key(&self) -> FlowKey {
        FlowKey {
            src: self.src.clone(),
            dst: self.dst.clone(),
            proto: self.proto,
        }
    }
}

/// One snapshot row: a flow and its counters at the time of the snapshot.
pub type FlowEntry = (FlowKey, FlowRecord);

/// Metric used to rank flows for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortMetric {
    /// Total bytes (rx + tx)
    Bytes,
    /// Total packets (rx + tx)
    Packets,
}

impl SortMetric {
    pub fn label(&self) -> &'static str {
        match self {
            SortMetric::Bytes => "Bytes",
            SortMetric::Packets => "Packets",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            SortMetric::Bytes => SortMetric::Packets,
            SortMetric::Packets => SortMetric::Bytes,
        }
    }
}
