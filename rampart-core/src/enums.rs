//! Enumerations shared across the pipeline and control plane

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// VERDICTS & BANDS
// ============================================================================

/// Final verdict attached to every inspected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Safe,
    Logged,
    Alert,
    Blocked,
}

impl Verdict {
    /// Verdicts that produce a control-plane alert.
    pub fn is_alerting(&self) -> bool {
        matches!(self, Verdict::Blocked | Verdict::Alert)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Safe => "safe",
            Verdict::Logged => "logged",
            Verdict::Alert => "alert",
            Verdict::Blocked => "blocked",
        };
        write!(f, "{}", s)
    }
}

/// Risk band produced by comparing the ML score against the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictBand {
    VeryHigh,
    High,
    Medium,
    Low,
    Safe,
}

impl VerdictBand {
    /// The verdict this band maps to on the hot path.
    pub fn verdict(&self) -> Verdict {
        match self {
            VerdictBand::VeryHigh | VerdictBand::High => Verdict::Blocked,
            VerdictBand::Medium => Verdict::Alert,
            VerdictBand::Low => Verdict::Logged,
            VerdictBand::Safe => Verdict::Safe,
        }
    }
}

impl fmt::Display for VerdictBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VerdictBand::VeryHigh => "very high",
            VerdictBand::High => "high",
            VerdictBand::Medium => "medium",
            VerdictBand::Low => "low",
            VerdictBand::Safe => "safe",
        };
        write!(f, "{}", s)
    }
}

// ============================================================================
// SEVERITY
// ============================================================================

/// Severity label used by control-plane views and alert rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Severity for an inspected request. Pure signature blocks carry no
    /// score and are always Critical.
    pub fn for_score(score: Option<f64>) -> Self {
        match score {
            None => Severity::Critical,
            Some(s) if s >= 0.85 => Severity::Critical,
            Some(s) if s >= 0.70 => Severity::High,
            Some(s) if s >= 0.50 => Severity::Medium,
            Some(_) => Severity::Low,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        };
        write!(f, "{}", s)
    }
}

// ============================================================================
// CONTROL-PLANE ENUMS
// ============================================================================

/// Role assigned to a control-plane user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Analyst,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Analyst => "analyst",
        }
    }

    /// Parse a role from its stored string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            "analyst" => Some(Role::Analyst),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of indicator a restriction or TI lookup refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Ip,
    Domain,
    Hash,
}

impl IndicatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Ip => "ip",
            IndicatorKind::Domain => "domain",
            IndicatorKind::Hash => "hash",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ip" => Some(IndicatorKind::Ip),
            "domain" => Some(IndicatorKind::Domain),
            "hash" => Some(IndicatorKind::Hash),
            _ => None,
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized risk returned by a threat-intelligence provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TiRisk {
    Clean,
    Low,
    Medium,
    High,
    Unknown,
}

/// Source label of a system-activity log row, derived from whichever
/// foreign key is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SysLogSource {
    Restriction,
    Model,
    Signature,
    User,
    SuspiciousUser,
    Report,
    Whitelist,
    System,
}

impl fmt::Display for SysLogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SysLogSource::Restriction => "Restriction",
            SysLogSource::Model => "Model",
            SysLogSource::Signature => "Signature",
            SysLogSource::User => "User",
            SysLogSource::SuspiciousUser => "SuspiciousUser",
            SysLogSource::Report => "Report",
            SysLogSource::Whitelist => "Whitelist",
            SysLogSource::System => "System",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Verdict::Blocked).unwrap(), "\"blocked\"");
        assert_eq!(serde_json::to_string(&Verdict::Safe).unwrap(), "\"safe\"");
        let v: Verdict = serde_json::from_str("\"alert\"").unwrap();
        assert_eq!(v, Verdict::Alert);
    }

    #[test]
    fn band_maps_to_verdict() {
        assert_eq!(VerdictBand::VeryHigh.verdict(), Verdict::Blocked);
        assert_eq!(VerdictBand::High.verdict(), Verdict::Blocked);
        assert_eq!(VerdictBand::Medium.verdict(), Verdict::Alert);
        assert_eq!(VerdictBand::Low.verdict(), Verdict::Logged);
        assert_eq!(VerdictBand::Safe.verdict(), Verdict::Safe);
    }

    #[test]
    fn band_display_names() {
        assert_eq!(VerdictBand::VeryHigh.to_string(), "very high");
        assert_eq!(VerdictBand::Safe.to_string(), "safe");
    }

    #[test]
    fn severity_ladder() {
        assert_eq!(Severity::for_score(None), Severity::Critical);
        assert_eq!(Severity::for_score(Some(0.85)), Severity::Critical);
        assert_eq!(Severity::for_score(Some(0.7)), Severity::High);
        assert_eq!(Severity::for_score(Some(0.5)), Severity::Medium);
        assert_eq!(Severity::for_score(Some(0.1)), Severity::Low);
    }

    #[test]
    fn role_round_trip() {
        for role in [Role::Admin, Role::User, Role::Analyst] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }
}
