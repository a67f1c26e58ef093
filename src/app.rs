use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::error::CaptureError;
use crate::network::{
    capture::{CaptureConfig, PacketCapture},
    table::FlowTable,
    types::{FlowEntry, SortMetric},
};
use crate::report::{rank, TOP_FLOWS};

/// Top-level orchestrator: owns the flow table and the capture handle and
/// holds the state the UI renders. No global state anywhere; both threads
/// reach the table through this struct's `Arc`.
pub struct App {
    pub table: Arc<FlowTable>,
    pub interface: String,
    pub sort: SortMetric,
    pub ranked: Vec<FlowEntry>,
    pub total_flows: usize,
    pub last_update: DateTime<Local>,
    pub show_help: bool,
    capture: Option<PacketCapture>,
}

impl App {
    /// Opens the capture and returns a running app. Configuration errors
    /// (unknown interface, permissions) fail here, before any UI exists.
    pub fn start(config: CaptureConfig, sort: SortMetric) -> Result<Self, CaptureError> {
        let table = Arc::new(FlowTable::new());
        let capture = PacketCapture::start(&config, Arc::clone(&table))?;

        Ok(App {
            table,
            interface: config.interface,
            sort,
            ranked: Vec::new(),
            total_flows: 0,
            last_update: Local::now(),
            show_help: false,
            capture: Some(capture),
        })
    }

    /// Refreshes the ranked view from a fresh table snapshot. Called once
    /// per reporting tick.
    pub fn update(&mut self) {
        let snapshot = self.table.snapshot();
        self.total_flows = snapshot.len();
        self.ranked = rank(snapshot, self.sort, TOP_FLOWS);
        self.last_update = Local::now();
    }

    pub fn toggle_sort(&mut self) {
        self.sort = self.sort.next();
        self.update();
    }

    /// True when the capture loop died on its own, i.e. a fatal device
    /// failure rather than a requested stop. The last ranked snapshot
    /// stays available.
    pub fn capture_failed(&self) -> bool {
        self.capture.as_ref().map_or(false, |c| c.is_finished())
    }

    /// Stops the capture and joins its thread. A clean stop returns `Ok`;
    /// a loop that already died returns its device error.
    pub fn stop(mut self) -> Result<(), CaptureError> {
        match self.capture.take() {
            Some(capture) => capture.stop(),
            None => Ok(()),
        }
    }
}
