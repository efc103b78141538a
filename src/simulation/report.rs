//! Reporting sink for the driver loop
//!
//! At every reporting interval the runner hands a [`Report`] to a
//! [`ReportSink`]. The core never formats or persists reports itself;
//! `LogSink` forwards them to the `log` facade and a `Vec<Report>` simply
//! collects them.

use log::{info, warn};

use crate::simulation::states::NVec3;

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub model_time: f64,
    pub positions: Vec<NVec3>,
    pub energy_drift: f64, // dE/E against the initial snapshot
}

pub trait ReportSink {
    fn report(&mut self, report: &Report);
}

impl ReportSink for Vec<Report> {
    fn report(&mut self, report: &Report) {
        self.push(report.clone());
    }
}

/// Logs each report at info level, and warns once the energy drift exceeds
/// `drift_warning` or is not a number
#[derive(Debug, Clone, Copy)]
pub struct LogSink {
    pub drift_warning: f64,
}

impl Default for LogSink {
    fn default() -> Self {
        Self {
            drift_warning: 1.0e-3,
        }
    }
}

impl ReportSink for LogSink {
    fn report(&mut self, report: &Report) {
        info!(
            "t = {:.6}  dE/E = {:+.3e}  ({} particles)",
            report.model_time,
            report.energy_drift,
            report.positions.len()
        );
        for (i, x) in report.positions.iter().enumerate() {
            log::debug!("  [{i}] x = ({:.6}, {:.6}, {:.6})", x.x, x.y, x.z);
        }
        if !(report.energy_drift.abs() <= self.drift_warning) {
            warn!(
                "energy drift {:.3e} above {:.1e} at t = {:.6}",
                report.energy_drift, self.drift_warning, report.model_time
            );
        }
    }
}
