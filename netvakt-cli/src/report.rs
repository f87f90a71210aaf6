//! Plain-text status block printed by `netvakt monitor`.

use std::fmt;

use chrono::{TimeZone, Utc};

use netvakt_core::time::Timestamp;
use netvakt_core::traffic::TrafficMetrics;
use netvakt_detection::Alert;
use netvakt_engine::{Fault, Monitor, MonitorStatistics};

pub struct StatusReport {
    pub running: bool,
    pub source: String,
    pub stats: MonitorStatistics,
    pub traffic: TrafficMetrics,
    pub alerts: Vec<Alert>,
    pub faults: Vec<Fault>,
}

impl StatusReport {
    pub fn capture(monitor: &Monitor, alerts: usize) -> Self {
        Self {
            running: monitor.is_running(),
            source: monitor.source_name().to_string(),
            stats: monitor.get_statistics(),
            traffic: monitor.get_traffic_metrics_default(),
            alerts: monitor.get_recent_alerts(alerts),
            faults: monitor.get_recent_faults(1),
        }
    }
}

fn clock_time(timestamp: Timestamp) -> String {
    Utc.timestamp_nanos(timestamp as i64)
        .format("%H:%M:%S%.3f")
        .to_string()
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.running { "running" } else { "stopped" };
        writeln!(f, "== netvakt [{state}] source: {} ==", self.source)?;

        let last = self
            .stats
            .last_update
            .map(clock_time)
            .unwrap_or_else(|| "never".to_string());
        writeln!(
            f,
            "events: {}  threats: {}  failures: {}  last update: {last}",
            self.stats.total_events, self.stats.threats_detected, self.stats.classification_failures
        )?;

        let traffic = &self.traffic;
        writeln!(
            f,
            "traffic ({}s): {:.2} ev/s  {:.0} B/s  sources: {}  destinations: {}",
            traffic.window.as_secs(),
            traffic.events_per_second,
            traffic.bytes_per_second,
            traffic.unique_sources,
            traffic.unique_destinations
        )?;

        if !traffic.protocol_distribution.is_empty() {
            write!(f, "protocols:")?;
            for (protocol, count) in &traffic.protocol_distribution {
                write!(f, " {protocol} {count}")?;
            }
            writeln!(f)?;
        }

        if self.alerts.is_empty() {
            writeln!(f, "no alerts")?;
        } else {
            writeln!(f, "recent alerts:")?;
            for alert in &self.alerts {
                writeln!(
                    f,
                    "  {}  {:<8}  {:<6} {:.2} ({} risk)  {} -> {}  {}",
                    clock_time(alert.timestamp),
                    alert.severity,
                    alert.threat_type,
                    alert.confidence,
                    alert.risk,
                    alert.source,
                    alert.destination,
                    alert.description
                )?;
            }
        }

        if let Some(fault) = self.faults.first() {
            writeln!(
                f,
                "last fault: {} {} {}",
                clock_time(fault.timestamp),
                fault.kind,
                fault.detail
            )?;
        }
        Ok(())
    }
}
