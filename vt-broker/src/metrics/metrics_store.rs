use dashmap::DashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use vt_core::{ResourceReport, RoomName};

/// Latest resource report per room, kept in memory only.
#[derive(Clone, Default)]
pub struct MetricsStore {
    reports: Arc<DashMap<RoomName, ResourceReport>>,
}

impl MetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `report`, stamping it with the receive time.
    pub fn record(&self, mut report: ResourceReport) -> ResourceReport {
        report.last_updated = now_millis();
        self.reports
            .insert(report.room_name.clone(), report.clone());
        report
    }

    pub fn get(&self, room: &RoomName) -> Option<ResourceReport> {
        self.reports.get(room).map(|entry| entry.value().clone())
    }

    pub fn list(&self) -> Vec<ResourceReport> {
        let mut reports: Vec<ResourceReport> =
            self.reports.iter().map(|entry| entry.value().clone()).collect();
        reports.sort_by(|a, b| a.room_name.cmp(&b.room_name));
        reports
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
