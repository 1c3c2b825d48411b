//! Request records journaled by the detection pipeline

use crate::{Severity, Verdict, VerdictBand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of body bytes captured per inspected request.
pub const BODY_CAPTURE_CAP: usize = 64 * 1024;

/// One journal entry per inspected HTTP request. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Seconds since the Unix epoch.
    pub ts: f64,
    pub method: String,
    /// Path plus raw query string, as received.
    pub url: String,
    /// Header map with lowercased names.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Captured body, lossily decoded, at most [`BODY_CAPTURE_CAP`] bytes.
    #[serde(default)]
    pub body: String,
    pub verdict: Verdict,
    /// `SIG:<id>` for signature blocks, `ML:<score> (<band>)` otherwise.
    pub reason: String,
    /// ML score in [0, 1]; absent on pure signature blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl RequestRecord {
    /// Reason string for a signature block.
    pub fn signature_reason(rule_id: &str) -> String {
        format!("SIG:{}", rule_id)
    }

    /// Reason string for an ML classification.
    pub fn ml_reason(score: f64, band: VerdictBand) -> String {
        format!("ML:{} ({})", score, band)
    }

    /// Severity of this record for control-plane views.
    pub fn severity(&self) -> Severity {
        Severity::for_score(self.score)
    }
}

/// Stable key for the score cache: body text concatenated with the
/// URL-decoded path+query.
pub fn fingerprint(body: &str, url_decoded: &str) -> String {
    let mut key = String::with_capacity(body.len() + url_decoded.len());
    key.push_str(body);
    key.push_str(url_decoded);
    key
}

/// Percent-decode a path+query pair into the form signatures match against.
pub fn url_decode(path_and_query: &str) -> String {
    urlencoding::decode(path_and_query)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| path_and_query.to_string())
}

/// Human attack-type label derived from a record's reason string.
pub fn attack_type_from_reason(reason: &str) -> &str {
    if let Some(sig_id) = reason.strip_prefix("SIG:") {
        if sig_id.contains("SQL") {
            "SQLi"
        } else if sig_id.contains("XSS") {
            "XSS"
        } else if sig_id.contains("CMD") || sig_id.contains("COMMAND") {
            "Command Injection"
        } else if sig_id.contains("TRAVERSAL") || sig_id.contains("LFI") {
            "Path Traversal"
        } else if sig_id.contains("CSRF") {
            "CSRF"
        } else if sig_id.contains("SSRF") {
            "SSRF"
        } else {
            sig_id
        }
    } else if reason.starts_with("ML:") {
        "ML Detected"
    } else {
        "Unknown"
    }
}

/// Detection source label for control-plane rows.
pub fn detection_source_from_reason(reason: &str) -> &'static str {
    if reason.starts_with("SIG:") {
        "signature"
    } else if reason.starts_with("ML:") {
        "ml"
    } else {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(verdict: Verdict, reason: &str, score: Option<f64>) -> RequestRecord {
        RequestRecord {
            ts: 1_700_000_000.5,
            method: "GET".into(),
            url: "/search?q=test".into(),
            headers: BTreeMap::new(),
            body: String::new(),
            verdict,
            reason: reason.into(),
            score,
        }
    }

    #[test]
    fn journal_line_round_trip() {
        let rec = record(Verdict::Blocked, "SIG:SQLI_UNION_SELECT", None);
        let line = serde_json::to_string(&rec).unwrap();
        let parsed: RequestRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, rec);
        // Signature blocks carry no score field on the wire.
        assert!(!line.contains("score"));
    }

    #[test]
    fn ml_reason_format() {
        let reason = RequestRecord::ml_reason(0.92, VerdictBand::VeryHigh);
        assert_eq!(reason, "ML:0.92 (very high)");
    }

    #[test]
    fn url_decode_handles_encoded_query() {
        assert_eq!(
            url_decode("/search?q=UNION%20SELECT%20password"),
            "/search?q=UNION SELECT password"
        );
        // Plain strings pass through untouched.
        assert_eq!(url_decode("/about"), "/about");
    }

    #[test]
    fn fingerprint_is_concatenation() {
        assert_eq!(fingerprint("body", "/path?q=1"), "body/path?q=1");
        assert_eq!(fingerprint("", ""), "");
    }

    #[test]
    fn attack_type_mapping() {
        assert_eq!(attack_type_from_reason("SIG:SQLI_UNION_SELECT"), "SQLi");
        assert_eq!(attack_type_from_reason("SIG:XSS_SCRIPT_TAG"), "XSS");
        assert_eq!(attack_type_from_reason("SIG:CMD_SHELL"), "Command Injection");
        assert_eq!(attack_type_from_reason("SIG:PATH_TRAVERSAL"), "Path Traversal");
        assert_eq!(attack_type_from_reason("SIG:WEIRD_RULE"), "WEIRD_RULE");
        assert_eq!(attack_type_from_reason("ML:0.92 (very high)"), "ML Detected");
        assert_eq!(attack_type_from_reason(""), "Unknown");
    }
}
