use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use super::types::{FlowEntry, FlowKey, FlowRecord, FlowSample};

/// Shared map of flow key to directional counters.
///
/// Written by the capture thread, read by the reporting thread; a single
/// mutex is held only for the duration of one merge or one snapshot.
/// Orientation is fixed by the first packet seen for an endpoint pair: the
/// table never holds both a key and its swapped form.
///
/// Snapshots are cumulative; the table is never cleared, so displayed
/// counters grow monotonically from capture start.
#[derive(Debug, Default)]
pub struct FlowTable {
    inner: Mutex<HashMap<FlowKey, FlowRecord>>,
}

impl FlowTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<FlowKey, FlowRecord>> {
        // Counters stay valid even if a holder panicked mid-increment
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Folds one classified packet into the table.
    ///
    /// If the swapped key is already present the packet is reverse traffic
    /// for that flow and counts toward tx; otherwise it counts toward rx
    /// of the entry under its own orientation, creating it if needed.
    pub fn merge(&self, sample: &FlowSample) {
        let key = sample.key();
        let mut flows = self.lock();
        if let Some(record) = flows.get_mut(&key.swapped()) {
            record.add_tx(sample.bytes);
        } else {
            flows.entry(key).or_default().add_rx(sample.bytes);
        }
    }

    /// Copies out the current contents for ranking and display.
    pub fn snapshot(&self) -> Vec<FlowEntry> {
        self.lock()
            .iter()
            .map(|(key, record)| (key.clone(), *record))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::net::IpAddr;

    use super::*;
    use crate::network::types::{Endpoint, Protocol};

    fn sample(src: &str, sport: u16, dst: &str, dport: u16, bytes: u64) -> FlowSample {
        let src_addr: IpAddr = src.parse().unwrap();
        let dst_addr: IpAddr = dst.parse().unwrap();
        FlowSample {
            src: Endpoint::with_port(src_addr, sport),
            dst: Endpoint::with_port(dst_addr, dport),
            proto: Protocol::Tcp,
            bytes,
        }
    }

    #[test]
    fn first_packet_creates_rx_entry() {
        let table = FlowTable::new();
        table.merge(&sample("10.0.0.1", 5000, "10.0.0.2", 80, 100));

        let snapshot = table.snapshot();
        assert_eq!(snapshot.len(), 1);
        let (key, record) = &snapshot[0];
        assert_eq!(key.src.to_string(), "10.0.0.1:5000");
        assert_eq!(key.dst.to_string(), "10.0.0.2:80");
        assert_eq!(key.proto, Protocol::Tcp);
        assert_eq!(
            *record,
            FlowRecord {
                bytes_rx: 100,
                packets_rx: 1,
                bytes_tx: 0,
                packets_tx: 0,
            }
        );
    }

    #[test]
    fn reverse_packet_merges_into_tx_of_existing_flow() {
        let table = FlowTable::new();
        table.merge(&sample("10.0.0.1", 5000, "10.0.0.2", 80, 100));
        table.merge(&sample("10.0.0.2", 80, "10.0.0.1", 5000, 40));

        let snapshot = table.snapshot();
        assert_eq!(snapshot.len(), 1, "swapped tuple must not get its own entry");
        let (key, record) = &snapshot[0];
        // orientation stays as first seen
        assert_eq!(key.src.to_string(), "10.0.0.1:5000");
        assert_eq!(record.bytes_rx, 100);
        assert_eq!(record.packets_rx, 1);
        assert_eq!(record.bytes_tx, 40);
        assert_eq!(record.packets_tx, 1);
    }

    #[test]
    fn same_direction_packets_accumulate_rx_only() {
        let table = FlowTable::new();
        for len in [100u64, 200, 300] {
            table.merge(&sample("10.0.0.1", 5000, "10.0.0.2", 80, len));
        }

        let snapshot = table.snapshot();
        assert_eq!(snapshot.len(), 1);
        let (_, record) = &snapshot[0];
        assert_eq!(record.packets_rx, 3);
        assert_eq!(record.bytes_rx, 600);
        assert_eq!(record.packets_tx, 0);
        assert_eq!(record.bytes_tx, 0);
    }

    #[test]
    fn different_protocols_are_distinct_flows() {
        let table = FlowTable::new();
        let tcp = sample("10.0.0.1", 5000, "10.0.0.2", 80, 100);
        let udp = FlowSample {
            proto: Protocol::Udp,
            ..tcp.clone()
        };
        table.merge(&tcp);
        table.merge(&udp);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn counters_saturate_instead_of_wrapping() {
        let table = FlowTable::new();
        table.merge(&sample("10.0.0.1", 5000, "10.0.0.2", 80, u64::MAX));
        table.merge(&sample("10.0.0.1", 5000, "10.0.0.2", 80, 100));

        let snapshot = table.snapshot();
        let (_, record) = &snapshot[0];
        assert_eq!(record.bytes_rx, u64::MAX);
        assert_eq!(record.packets_rx, 2);
    }

    #[test]
    fn snapshot_does_not_drain() {
        let table = FlowTable::new();
        table.merge(&sample("10.0.0.1", 5000, "10.0.0.2", 80, 100));
        assert_eq!(table.snapshot().len(), 1);
        assert_eq!(table.snapshot().len(), 1);
        assert!(!table.is_empty());
    }
}
