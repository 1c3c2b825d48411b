//! Control-plane entity rows
//!
//! These mirror the relational store one-to-one. Derived/joined views live
//! in the API layer; rows here carry only their own columns.

use crate::{IndicatorKind, Role, SysLogSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Control-plane user. Username and email are unique in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i32,
    pub username: String,
    /// Salted password hash (PHC string); never serialized to clients.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub email: String,
    pub role: Role,
}

/// Snapshot of a pipeline record ingested into the event store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WafLog {
    pub wlog_id: i32,
    /// The intercepted request, summarized as `METHOD url - reason`.
    pub intercepted_req: String,
    /// Attack-type label (SQLi, XSS, ML Detected, ...).
    pub wlog_type: String,
    pub wlog_timestamp: DateTime<Utc>,
    pub severity: String,
    /// `signature` or `ml`.
    pub detection_source: String,
}

/// Alert derived from a non-safe verdict. References at most one WAF log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: i32,
    pub alert_type: String,
    /// `open`, `acknowledged`, or `resolved`.
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub wlog_id: Option<i32>,
}

/// Block-list entry: an IP, file hash, or domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restriction {
    pub restriction_id: i32,
    pub restriction_type: IndicatorKind,
    /// The indicator value itself.
    pub restriction_description: String,
    pub created_at: DateTime<Utc>,
}

/// Admin-authored signature stored in the event store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomSignature {
    pub signature_id: i32,
    pub signature_type: String,
    pub signature_content: String,
}

/// Metadata describing a deployed detection model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_id: i32,
    pub model_type: String,
    pub model_description: Option<String>,
    pub model_threshold: f64,
}

/// Mitigation report produced by the analysis service. References at most
/// one WAF log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchingReport {
    pub report_id: i32,
    /// The serialized MitigationReport JSON.
    pub report_details: String,
    pub report_timestamp: DateTime<Utc>,
    pub wlog_id: Option<i32>,
}

/// Behavioral profile of a suspicious client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousUserProfile {
    pub sus_user_id: i32,
    pub sus_username: String,
    pub pc_number: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub session_cookie: Option<String>,
    pub suspicion_level: String,
    pub created_at: DateTime<Utc>,
}

/// Whitelist entry marking a journaled request as a false positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    pub wl_id: i32,
    pub wlog_id: Option<i32>,
    pub reason: String,
    pub user_id: Option<i32>,
    pub made_at: DateTime<Utc>,
}

/// System-activity log row. At most one of the foreign keys is populated;
/// the source label derives from whichever it is, in a fixed priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SysLog {
    pub slog_id: i32,
    pub message: String,
    pub slog_timestamp: DateTime<Utc>,
    pub restriction_id: Option<i32>,
    pub model_id: Option<i32>,
    pub signature_id: Option<i32>,
    pub user_id: Option<i32>,
    pub sus_user_id: Option<i32>,
    pub report_id: Option<i32>,
    pub wl_id: Option<i32>,
}

impl SysLog {
    /// Source label, priority Restriction > Model > Signature > User >
    /// SuspiciousUser > Report > Whitelist > System.
    pub fn source(&self) -> SysLogSource {
        if self.restriction_id.is_some() {
            SysLogSource::Restriction
        } else if self.model_id.is_some() {
            SysLogSource::Model
        } else if self.signature_id.is_some() {
            SysLogSource::Signature
        } else if self.user_id.is_some() {
            SysLogSource::User
        } else if self.sus_user_id.is_some() {
            SysLogSource::SuspiciousUser
        } else if self.report_id.is_some() {
            SysLogSource::Report
        } else if self.wl_id.is_some() {
            SysLogSource::Whitelist
        } else {
            SysLogSource::System
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_syslog() -> SysLog {
        SysLog {
            slog_id: 1,
            message: "test".into(),
            slog_timestamp: Utc::now(),
            restriction_id: None,
            model_id: None,
            signature_id: None,
            user_id: None,
            sus_user_id: None,
            report_id: None,
            wl_id: None,
        }
    }

    #[test]
    fn syslog_source_priority() {
        let mut log = bare_syslog();
        assert_eq!(log.source(), SysLogSource::System);

        log.wl_id = Some(9);
        assert_eq!(log.source(), SysLogSource::Whitelist);

        log.user_id = Some(3);
        assert_eq!(log.source(), SysLogSource::User);

        log.signature_id = Some(2);
        assert_eq!(log.source(), SysLogSource::Signature);

        // Restriction outranks everything else.
        log.restriction_id = Some(1);
        assert_eq!(log.source(), SysLogSource::Restriction);
    }

    #[test]
    fn password_hash_never_serialized() {
        let user = User {
            user_id: 1,
            username: "admin".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            email: "admin@rampart.local".into(),
            role: Role::Admin,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password_hash"));
    }
}
