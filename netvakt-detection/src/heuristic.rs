//! Rule-based stand-in for a trained model.
//!
//! Scores rows laid out in [`TRAFFIC_FEATURE_SCHEMA`] order with the same
//! attack fingerprints the synthetic source injects, so a monitor can run end
//! to end without an ML runtime.

use netvakt_core::events::{schema_index, TRAFFIC_FEATURE_SCHEMA};

use crate::classifier::{ModelError, ThreatModel};
use crate::threat::ThreatCategory;

/// Class order of the reference intrusion model.
const CLASSES: [ThreatCategory; 5] = [
    ThreatCategory::Dos,
    ThreatCategory::Benign,
    ThreatCategory::Probe,
    ThreatCategory::R2l,
    ThreatCategory::U2r,
];

const DOS: usize = 0;
const BENIGN: usize = 1;
const PROBE: usize = 2;
const R2L: usize = 3;
const U2R: usize = 4;

#[derive(Debug, Clone, Copy)]
struct Columns {
    hot: usize,
    num_failed_logins: usize,
    logged_in: usize,
    num_compromised: usize,
    count: usize,
    srv_count: usize,
    serror_rate: usize,
}

#[derive(Debug, Clone)]
pub struct HeuristicModel {
    columns: Columns,
}

impl HeuristicModel {
    pub fn new() -> Self {
        // The schema is a compile-time constant; a missing name is a bug in
        // this file, caught by the tests below.
        let column = |name: &str| schema_index(name).unwrap_or(TRAFFIC_FEATURE_SCHEMA.len());
        Self {
            columns: Columns {
                hot: column("hot"),
                num_failed_logins: column("num_failed_logins"),
                logged_in: column("logged_in"),
                num_compromised: column("num_compromised"),
                count: column("count"),
                srv_count: column("srv_count"),
                serror_rate: column("serror_rate"),
            },
        }
    }

    fn matched_class(&self, row: &[f64]) -> Result<(usize, f64), ModelError> {
        let at = |index: usize| {
            row.get(index).copied().ok_or_else(|| {
                ModelError::Inference(format!("row of width {} lacks column {index}", row.len()))
            })
        };
        let c = self.columns;

        let serror_rate = at(c.serror_rate)?;
        let count = at(c.count)?;
        let srv_count = at(c.srv_count)?;
        let failed_logins = at(c.num_failed_logins)?;
        let compromised = at(c.num_compromised)?;
        let logged_in = at(c.logged_in)?;
        let hot = at(c.hot)?;

        let matched = if serror_rate >= 0.5 && count >= 50.0 {
            (DOS, 0.85 + 0.1 * serror_rate.min(1.0))
        } else if count >= 80.0 && srv_count >= 80.0 {
            (PROBE, 0.88)
        } else if failed_logins >= 3.0 && compromised >= 10.0 {
            (R2L, 0.86)
        } else if logged_in >= 1.0 && hot >= 50.0 && compromised >= 5.0 {
            (U2R, 0.84)
        } else {
            (BENIGN, 0.93)
        };
        Ok(matched)
    }
}

impl Default for HeuristicModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreatModel for HeuristicModel {
    fn classes(&self) -> &[ThreatCategory] {
        &CLASSES
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        let (winner, confidence) = self.matched_class(row)?;
        let rest = (1.0 - confidence) / (CLASSES.len() - 1) as f64;
        Ok((0..CLASSES.len())
            .map(|class| if class == winner { confidence } else { rest })
            .collect())
    }
}
