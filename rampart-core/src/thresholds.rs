//! Verdict thresholds and live WAF settings

use crate::{ConfigError, VerdictBand};
use serde::{Deserialize, Serialize};

/// Four ordered thresholds classifying an ML score into a verdict band.
///
/// Invariant: `1 >= very_high >= high >= medium >= low >= 0`. Updates that
/// would break the ordering are rejected; all band boundaries are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub very_high: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            very_high: 0.85,
            high: 0.70,
            medium: 0.50,
            low: 0.30,
        }
    }
}

impl Thresholds {
    /// Check the ordering and range invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = self.very_high >= self.high
            && self.high >= self.medium
            && self.medium >= self.low;
        let in_range = self.very_high <= 1.0 && self.low >= 0.0;
        let finite = [self.very_high, self.high, self.medium, self.low]
            .iter()
            .all(|t| t.is_finite());

        if !finite || !in_range {
            return Err(ConfigError::InvalidValue {
                field: "thresholds".into(),
                reason: "thresholds must be finite values in [0, 1]".into(),
            });
        }
        if !ordered {
            return Err(ConfigError::InvalidValue {
                field: "thresholds".into(),
                reason: "ordering very_high >= high >= medium >= low violated".into(),
            });
        }
        Ok(())
    }

    /// Classify a score into its band. Boundaries are inclusive, so a score
    /// exactly at `low` is Low, not Safe.
    pub fn classify(&self, score: f64) -> VerdictBand {
        if score >= self.very_high {
            VerdictBand::VeryHigh
        } else if score >= self.high {
            VerdictBand::High
        } else if score >= self.medium {
            VerdictBand::Medium
        } else if score >= self.low {
            VerdictBand::Low
        } else {
            VerdictBand::Safe
        }
    }
}

/// Live, control-plane-mutable WAF settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WafSettings {
    #[serde(flatten)]
    pub thresholds: Thresholds,
    /// Base URL of the protected upstream application.
    pub upstream_url: String,
    /// URL of the external anomaly-scoring service.
    pub ml_service_url: String,
    /// Whether safe traffic is journaled as well.
    pub log_safe_traffic: bool,
}

impl Default for WafSettings {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            upstream_url: "http://127.0.0.1:3001".to_string(),
            ml_service_url: "http://127.0.0.1:9000/predict".to_string(),
            log_safe_traffic: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_are_valid() {
        assert!(Thresholds::default().validate().is_ok());
    }

    #[test]
    fn unordered_thresholds_rejected() {
        let t = Thresholds {
            very_high: 0.6,
            high: 0.8,
            medium: 0.5,
            low: 0.3,
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn out_of_range_thresholds_rejected() {
        let t = Thresholds {
            very_high: 1.5,
            high: 0.8,
            medium: 0.5,
            low: 0.3,
        };
        assert!(t.validate().is_err());

        let t = Thresholds {
            very_high: 0.9,
            high: 0.8,
            medium: 0.5,
            low: -0.1,
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn classification_boundaries_are_inclusive() {
        let t = Thresholds::default();
        assert_eq!(t.classify(0.85), VerdictBand::VeryHigh);
        assert_eq!(t.classify(0.84), VerdictBand::High);
        assert_eq!(t.classify(0.70), VerdictBand::High);
        assert_eq!(t.classify(0.50), VerdictBand::Medium);
        assert_eq!(t.classify(0.30), VerdictBand::Low);
        assert_eq!(t.classify(0.29), VerdictBand::Safe);
        assert_eq!(t.classify(0.0), VerdictBand::Safe);
    }

    #[test]
    fn settings_serde_flattens_thresholds() {
        let settings = WafSettings::default();
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["very_high"], 0.85);
        assert_eq!(json["upstream_url"], "http://127.0.0.1:3001");
    }
}
