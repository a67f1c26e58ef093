use std::net::IpAddr;

use pnet::packet::{
    ethernet::{EtherTypes, EthernetPacket},
    ipv4::Ipv4Packet,
    ipv6::Ipv6Packet,
    tcp::TcpPacket,
    udp::UdpPacket,
    Packet,
};

use crate::error::DecodeError;
use super::types::{Endpoint, FlowSample, Protocol};

const ETHERNET_HEADER_LEN: usize = 14;
const IPV4_MIN_HEADER_LEN: usize = 20;

// Anything shorter cannot carry an IP header worth classifying
const MIN_FRAME_LEN: usize = ETHERNET_HEADER_LEN + IPV4_MIN_HEADER_LEN;

/// Classifies a raw Ethernet frame into a [`FlowSample`].
///
/// Returns `Ok(None)` for frames that are not classifiable: too short,
/// ARP/RARP, an IP protocol number outside the fixed mapping table, or a
/// transport header truncated by the capture. These are discarded silently.
///
/// Returns `Err(DecodeError::UnsupportedEtherType)` for any other
/// ethertype; the caller drops the frame and keeps capturing.
///
/// The byte count is taken from the protocol's own declared length field
/// (IPv4 total length / IPv6 payload length), not the captured length, so
/// statistics reflect the original packet size even when the capture
/// truncates it.
pub fn decode_frame(data: &[u8]) -> Result<Option<FlowSample>, DecodeError> {
    if data.len() < MIN_FRAME_LEN {
        return Ok(None);
    }
    let Some(ethernet) = EthernetPacket::new(data) else {
        return Ok(None);
    };
    match ethernet.get_ethertype() {
        EtherTypes::Ipv4 => Ok(decode_ipv4(ethernet.payload())),
        EtherTypes::Ipv6 => Ok(decode_ipv6(ethernet.payload())),
        EtherTypes::Arp | EtherTypes::Rarp => Ok(None),
        other => Err(DecodeError::UnsupportedEtherType(other.0)),
    }
}

fn decode_ipv4(payload: &[u8]) -> Option<FlowSample> {
    let ipv4 = Ipv4Packet::new(payload)?;
    let proto = Protocol::from_ip_number(ipv4.get_next_level_protocol())?;

    let src_addr = IpAddr::V4(ipv4.get_source());
    let dst_addr = IpAddr::V4(ipv4.get_destination());
    let bytes = u64::from(ipv4.get_total_length());

    // Ipv4Packet::payload() accounts for the IHL-scaled header, so the
    // transport header lands at the right offset even with IP options.
    let (src, dst) = match proto {
        Protocol::Tcp | Protocol::Udp => {
            transport_endpoints(proto, ipv4.payload(), src_addr, dst_addr)?
        }
        _ => (Endpoint::new(src_addr), Endpoint::new(dst_addr)),
    };

    Some(FlowSample {
        src,
        dst,
        proto,
        bytes,
    })
}

fn decode_ipv6(payload: &[u8]) -> Option<FlowSample> {
    let ipv6 = Ipv6Packet::new(payload)?;
    // Next-header only; extension-header chains are not walked, so a
    // packet with extensions classifies by its first extension number
    // (usually unmapped) and is skipped.
    let proto = Protocol::from_ip_number(ipv6.get_next_header())?;

    let src_addr = IpAddr::V6(ipv6.get_source());
    let dst_addr = IpAddr::V6(ipv6.get_destination());
    let bytes = u64::from(ipv6.get_payload_length());

    let (src, dst) = match proto {
        Protocol::Tcp | Protocol::Udp => {
            transport_endpoints(proto, ipv6.payload(), src_addr, dst_addr)?
        }
        _ => (Endpoint::new(src_addr), Endpoint::new(dst_addr)),
    };

    Some(FlowSample {
        src,
        dst,
        proto,
        bytes,
    })
}

// Source and destination ports sit at the same offsets for TCP and UDP,
// but pnet still wants the right view for each.
fn transport_endpoints(
    proto: Protocol,
    transport: &[u8],
    src_addr: IpAddr,
    dst_addr: IpAddr,
) -> Option<(Endpoint, Endpoint)> {
    let (src_port, dst_port) = match proto {
        Protocol::Tcp => {
            let tcp = TcpPacket::new(transport)?;
            (tcp.get_source(), tcp.get_destination())
        }
        Protocol::Udp => {
            let udp = UdpPacket::new(transport)?;
            (udp.get_source(), udp.get_destination())
        }
        _ => return None,
    };
    Some((
        Endpoint::with_port(src_addr, src_port),
        Endpoint::with_port(dst_addr, dst_port),
    ))
}
