//! Threat taxonomy and the static tables derived from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Class labels a threat model can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatCategory {
    #[serde(alias = "normal")]
    Benign,
    Dos,
    Probe,
    R2l,
    U2r,
    Unknown,
}

impl ThreatCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatCategory::Benign => "benign",
            ThreatCategory::Dos => "dos",
            ThreatCategory::Probe => "probe",
            ThreatCategory::R2l => "r2l",
            ThreatCategory::U2r => "u2r",
            ThreatCategory::Unknown => "unknown",
        }
    }

    pub fn is_benign(&self) -> bool {
        matches!(self, ThreatCategory::Benign)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ThreatCategory::Benign => "Normal Traffic",
            ThreatCategory::Dos => "Denial of Service",
            ThreatCategory::Probe => "Network Probe",
            ThreatCategory::R2l => "Remote to Local",
            ThreatCategory::U2r => "User to Root",
            ThreatCategory::Unknown => "Unclassified",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ThreatCategory::Dos | ThreatCategory::U2r => Severity::Critical,
            ThreatCategory::R2l => Severity::High,
            ThreatCategory::Probe | ThreatCategory::Unknown => Severity::Medium,
            ThreatCategory::Benign => Severity::Info,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ThreatCategory::Dos => "Denial of Service attack detected",
            ThreatCategory::Probe => "Network probe/scanning activity detected",
            ThreatCategory::R2l => "Remote to Local attack detected",
            ThreatCategory::U2r => "User to Root privilege escalation detected",
            ThreatCategory::Unknown => "Suspicious activity detected",
            ThreatCategory::Benign => "Legitimate network traffic",
        }
    }
}

impl fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown threat category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for ThreatCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "benign" | "normal" => Ok(ThreatCategory::Benign),
            "dos" => Ok(ThreatCategory::Dos),
            "probe" => Ok(ThreatCategory::Probe),
            "r2l" => Ok(ThreatCategory::R2l),
            "u2r" => Ok(ThreatCategory::U2r),
            "unknown" => Ok(ThreatCategory::Unknown),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// Criticality tag attached to an alert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Confidence band of an alert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Minimal => "minimal",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        f.write_str(label)
    }
}

/// Lower bounds (inclusive) of the low, medium and high risk bands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiskBands {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl RiskBands {
    pub fn classify(&self, confidence: f64) -> RiskLevel {
        if confidence >= self.high {
            RiskLevel::High
        } else if confidence >= self.medium {
            RiskLevel::Medium
        } else if confidence >= self.low {
            RiskLevel::Low
        } else {
            RiskLevel::Minimal
        }
    }
}

impl Default for RiskBands {
    fn default() -> Self {
        Self {
            low: 0.5,
            medium: 0.7,
            high: 0.9,
        }
    }
}
