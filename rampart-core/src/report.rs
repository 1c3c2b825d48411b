//! Mitigation report schema produced by the analysis service

use serde::{Deserialize, Serialize};

/// Top-level keys every report must carry; schema validation checks these.
pub const REQUIRED_REPORT_KEYS: [&str; 6] = [
    "attack_type",
    "root_cause",
    "risk_level",
    "mitigations",
    "virtual_patches",
    "references",
];

/// Risk level assigned by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Where a mitigation applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MitigationCategory {
    Code,
    Config,
    Waf,
}

/// Target of a virtual patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatchTarget {
    #[serde(rename = "WAF")]
    Waf,
    Nginx,
    App,
}

/// Security standard a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Standard {
    Owasp,
    Cwe,
    Nist,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mitigation {
    pub category: MitigationCategory,
    pub description: String,
}

/// A WAF or upstream-config rule mitigating an attack without code changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualPatch {
    pub target: PatchTarget,
    pub rule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardRef {
    pub standard: Standard,
    pub id: String,
    pub title: String,
}

/// Structured mitigation report. The `error` field is set only on the
/// analysis-failed fallback so downstream consumers never branch on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigationReport {
    pub attack_type: String,
    pub root_cause: String,
    pub risk_level: RiskLevel,
    pub mitigations: Vec<Mitigation>,
    pub virtual_patches: Vec<VirtualPatch>,
    pub references: Vec<StandardRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
