use crate::network::types::{FlowEntry, SortMetric};

/// How many flows the display shows.
pub const TOP_FLOWS: usize = 10;

/// Orders a table snapshot by descending metric value and truncates it to
/// at most `limit` entries.
///
/// Equal-metric entries are tie-broken by flow key, so the output is
/// deterministic for a given snapshot regardless of hash-map iteration
/// order.
pub fn rank(mut entries: Vec<FlowEntry>, metric: SortMetric, limit: usize) -> Vec<FlowEntry> {
    entries.sort_by(|(a_key, a), (b_key, b)| {
        let (a_val, b_val) = match metric {
            SortMetric::Bytes => (a.total_bytes(), b.total_bytes()),
            SortMetric::Packets => (a.total_packets(), b.total_packets()),
        };
        b_val.cmp(&a_val).then_with(|| a_key.cmp(b_key))
    });
    entries.truncate(limit);
    entries
}
