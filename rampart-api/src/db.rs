//! Relational store client
//!
//! PostgreSQL connection pooling via deadpool-postgres with one method per
//! store operation. The schema mirrors the entity model in `rampart-core`;
//! `ensure_schema` creates it idempotently at startup and `seed_defaults`
//! installs the admin user and model metadata on an empty database.

use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use rampart_core::{
    Alert, CustomSignature, IndicatorKind, ModelInfo, PatchingReport, Restriction, Role,
    SuspiciousUserProfile, SysLog, User, WafLog, WhitelistEntry,
};
use tokio_postgres::{NoTls, Row};

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub max_size: usize,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "rampart".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            max_size: 16,
        }
    }
}

impl DbConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("RAMPART_DB_HOST").unwrap_or(defaults.host),
            port: std::env::var("RAMPART_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            dbname: std::env::var("RAMPART_DB_NAME").unwrap_or(defaults.dbname),
            user: std::env::var("RAMPART_DB_USER").unwrap_or(defaults.user),
            password: std::env::var("RAMPART_DB_PASSWORD").unwrap_or(defaults.password),
            max_size: std::env::var("RAMPART_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_size),
        }
    }

    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id SERIAL PRIMARY KEY,
    username VARCHAR(80) UNIQUE NOT NULL CHECK (length(username) >= 3),
    password_hash VARCHAR(256) NOT NULL,
    email VARCHAR(120) UNIQUE NOT NULL CHECK (email LIKE '%@%.%'),
    role VARCHAR(20) NOT NULL DEFAULT 'user' CHECK (role IN ('admin', 'user', 'analyst'))
);

CREATE TABLE IF NOT EXISTS waf_log (
    wlog_id SERIAL PRIMARY KEY,
    intercepted_req TEXT NOT NULL,
    wlog_type VARCHAR(50) NOT NULL,
    wlog_timestamp TIMESTAMPTZ NOT NULL DEFAULT now(),
    severity VARCHAR(20) NOT NULL,
    detection_source VARCHAR(50) NOT NULL
);

CREATE TABLE IF NOT EXISTS alert (
    alert_id SERIAL PRIMARY KEY,
    alert_type VARCHAR(100) NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'open',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    resolved_at TIMESTAMPTZ,
    wlog_id INTEGER REFERENCES waf_log(wlog_id)
);

CREATE TABLE IF NOT EXISTS restriction (
    restriction_id SERIAL PRIMARY KEY,
    restriction_type VARCHAR(20) NOT NULL,
    restriction_description TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS signature (
    signature_id SERIAL PRIMARY KEY,
    signature_type VARCHAR(50) NOT NULL,
    signature_content TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS model (
    model_id SERIAL PRIMARY KEY,
    model_type VARCHAR(100) NOT NULL,
    model_description TEXT,
    model_threshold DOUBLE PRECISION NOT NULL DEFAULT 0.5
);

CREATE TABLE IF NOT EXISTS patching_report (
    report_id SERIAL PRIMARY KEY,
    report_details TEXT NOT NULL,
    report_timestamp TIMESTAMPTZ NOT NULL DEFAULT now(),
    wlog_id INTEGER REFERENCES waf_log(wlog_id)
);

CREATE TABLE IF NOT EXISTS suspicious_user_profile (
    sus_user_id SERIAL PRIMARY KEY,
    sus_username VARCHAR(100) NOT NULL,
    pc_number VARCHAR(50),
    ip_address VARCHAR(45),
    mac_address VARCHAR(17),
    session_cookie TEXT,
    suspicion_level VARCHAR(20) NOT NULL DEFAULT 'Low',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS whitelisted_request (
    wl_id SERIAL PRIMARY KEY,
    wlog_id INTEGER REFERENCES waf_log(wlog_id),
    reason TEXT NOT NULL,
    user_id INTEGER REFERENCES users(user_id),
    made_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS sys_log (
    slog_id SERIAL PRIMARY KEY,
    message TEXT NOT NULL,
    slog_timestamp TIMESTAMPTZ NOT NULL DEFAULT now(),
    restriction_id INTEGER REFERENCES restriction(restriction_id),
    model_id INTEGER REFERENCES model(model_id),
    signature_id INTEGER REFERENCES signature(signature_id),
    user_id INTEGER REFERENCES users(user_id),
    sus_user_id INTEGER REFERENCES suspicious_user_profile(sus_user_id),
    report_id INTEGER REFERENCES patching_report(report_id),
    wl_id INTEGER REFERENCES whitelisted_request(wl_id)
);
"#;

// ============================================================================
// ROW MAPPERS
// ============================================================================

fn user_from_row(row: &Row) -> User {
    let role: String = row.get("role");
    User {
        user_id: row.get("user_id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        email: row.get("email"),
        role: Role::parse(&role).unwrap_or(Role::User),
    }
}

fn waf_log_from_row(row: &Row) -> WafLog {
    WafLog {
        wlog_id: row.get("wlog_id"),
        intercepted_req: row.get("intercepted_req"),
        wlog_type: row.get("wlog_type"),
        wlog_timestamp: row.get("wlog_timestamp"),
        severity: row.get("severity"),
        detection_source: row.get("detection_source"),
    }
}

fn alert_from_row(row: &Row) -> Alert {
    Alert {
        alert_id: row.get("alert_id"),
        alert_type: row.get("alert_type"),
        status: row.get("status"),
        created_at: row.get("created_at"),
        resolved_at: row.get("resolved_at"),
        wlog_id: row.get("wlog_id"),
    }
}

fn restriction_from_row(row: &Row) -> Restriction {
    let kind: String = row.get("restriction_type");
    Restriction {
        restriction_id: row.get("restriction_id"),
        restriction_type: IndicatorKind::parse(&kind).unwrap_or(IndicatorKind::Ip),
        restriction_description: row.get("restriction_description"),
        created_at: row.get("created_at"),
    }
}

fn signature_from_row(row: &Row) -> CustomSignature {
    CustomSignature {
        signature_id: row.get("signature_id"),
        signature_type: row.get("signature_type"),
        signature_content: row.get("signature_content"),
    }
}

fn model_from_row(row: &Row) -> ModelInfo {
    ModelInfo {
        model_id: row.get("model_id"),
        model_type: row.get("model_type"),
        model_description: row.get("model_description"),
        model_threshold: row.get("model_threshold"),
    }
}

fn report_from_row(row: &Row) -> PatchingReport {
    PatchingReport {
        report_id: row.get("report_id"),
        report_details: row.get("report_details"),
        report_timestamp: row.get("report_timestamp"),
        wlog_id: row.get("wlog_id"),
    }
}

fn profile_from_row(row: &Row) -> SuspiciousUserProfile {
    SuspiciousUserProfile {
        sus_user_id: row.get("sus_user_id"),
        sus_username: row.get("sus_username"),
        pc_number: row.get("pc_number"),
        ip_address: row.get("ip_address"),
        mac_address: row.get("mac_address"),
        session_cookie: row.get("session_cookie"),
        suspicion_level: row.get("suspicion_level"),
        created_at: row.get("created_at"),
    }
}

fn whitelist_from_row(row: &Row) -> WhitelistEntry {
    WhitelistEntry {
        wl_id: row.get("wl_id"),
        wlog_id: row.get("wlog_id"),
        reason: row.get("reason"),
        user_id: row.get("user_id"),
        made_at: row.get("made_at"),
    }
}

fn syslog_from_row(row: &Row) -> SysLog {
    SysLog {
        slog_id: row.get("slog_id"),
        message: row.get("message"),
        slog_timestamp: row.get("slog_timestamp"),
        restriction_id: row.get("restriction_id"),
        model_id: row.get("model_id"),
        signature_id: row.get("signature_id"),
        user_id: row.get("user_id"),
        sus_user_id: row.get("sus_user_id"),
        report_id: row.get("report_id"),
        wl_id: row.get("wl_id"),
    }
}

// ============================================================================
// PARAMETER STRUCTS
// ============================================================================

/// Column values for suspicious-user profile writes.
#[derive(Debug, Clone, Default)]
pub struct ProfileParams {
    pub sus_username: String,
    pub pc_number: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub session_cookie: Option<String>,
    pub suspicion_level: String,
}

/// Nullable foreign keys of a system-activity log row.
#[derive(Debug, Clone, Default)]
pub struct SysLogRefs {
    pub restriction_id: Option<i32>,
    pub model_id: Option<i32>,
    pub signature_id: Option<i32>,
    pub user_id: Option<i32>,
    pub sus_user_id: Option<i32>,
    pub report_id: Option<i32>,
    pub wl_id: Option<i32>,
}

/// Filters for the alert listing.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub status: Option<String>,
    pub severity: Option<String>,
    pub limit: i64,
}

// ============================================================================
// DATABASE CLIENT
// ============================================================================

/// Database client wrapping the connection pool.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        Ok(Self::new(config.create_pool()?))
    }

    async fn conn(&self) -> ApiResult<deadpool_postgres::Object> {
        Ok(self.pool.get().await?)
    }

    /// Liveness probe for the health endpoint.
    pub async fn ping(&self) -> bool {
        match self.conn().await {
            Ok(conn) => conn.simple_query("SELECT 1").await.is_ok(),
            Err(_) => false,
        }
    }

    /// Create every table if missing.
    pub async fn ensure_schema(&self) -> ApiResult<()> {
        let conn = self.conn().await?;
        conn.batch_execute(SCHEMA).await?;
        Ok(())
    }

    /// Seed the admin user and default model metadata on an empty store.
    pub async fn seed_defaults(
        &self,
        admin_username: &str,
        admin_password_hash: &str,
        admin_email: &str,
    ) -> ApiResult<()> {
        let conn = self.conn().await?;

        let users: i64 = conn
            .query_one("SELECT COUNT(*) FROM users", &[])
            .await?
            .get(0);
        if users == 0 {
            conn.execute(
                "INSERT INTO users (username, password_hash, email, role) VALUES ($1, $2, $3, 'admin')",
                &[&admin_username, &admin_password_hash, &admin_email],
            )
            .await?;
            tracing::info!(username = admin_username, "seeded admin user");
        }

        let models: i64 = conn
            .query_one("SELECT COUNT(*) FROM model", &[])
            .await?
            .get(0);
        if models == 0 {
            conn.execute(
                "INSERT INTO model (model_type, model_description, model_threshold) VALUES \
                 ('RandomForest', 'Request feature classifier', 0.87), \
                 ('CharAutoencoder', 'Zero-day URL anomaly detector', 0.85)",
                &[],
            )
            .await?;
        }
        Ok(())
    }

    // ========================================================================
    // USERS
    // ========================================================================

    pub async fn user_create(
        &self,
        username: &str,
        password_hash: &str,
        email: &str,
        role: Role,
    ) -> ApiResult<User> {
        let conn = self.conn().await?;
        let row = conn
            .query_one(
                "INSERT INTO users (username, password_hash, email, role) \
                 VALUES ($1, $2, $3, $4) RETURNING *",
                &[&username, &password_hash, &email, &role.as_str()],
            )
            .await?;
        Ok(user_from_row(&row))
    }

    pub async fn user_find_by_username(&self, username: &str) -> ApiResult<Option<User>> {
        let conn = self.conn().await?;
        let row = conn
            .query_opt("SELECT * FROM users WHERE username = $1", &[&username])
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    pub async fn user_list(&self) -> ApiResult<Vec<User>> {
        let conn = self.conn().await?;
        let rows = conn
            .query("SELECT * FROM users ORDER BY user_id", &[])
            .await?;
        Ok(rows.iter().map(user_from_row).collect())
    }

    pub async fn user_update(
        &self,
        user_id: i32,
        email: Option<&str>,
        role: Option<Role>,
        password_hash: Option<&str>,
    ) -> ApiResult<User> {
        let conn = self.conn().await?;
        let role_str = role.map(|r| r.as_str());
        let row = conn
            .query_opt(
                "UPDATE users SET \
                   email = COALESCE($2, email), \
                   role = COALESCE($3, role), \
                   password_hash = COALESCE($4, password_hash) \
                 WHERE user_id = $1 RETURNING *",
                &[&user_id, &email, &role_str, &password_hash],
            )
            .await?
            .ok_or_else(|| ApiError::not_found(format!("User {} not found", user_id)))?;
        Ok(user_from_row(&row))
    }

    pub async fn user_delete(&self, user_id: i32) -> ApiResult<()> {
        let conn = self.conn().await?;
        let deleted = conn
            .execute("DELETE FROM users WHERE user_id = $1", &[&user_id])
            .await?;
        if deleted == 0 {
            return Err(ApiError::not_found(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    // ========================================================================
    // WAF LOGS
    // ========================================================================

    pub async fn waf_log_insert(
        &self,
        intercepted_req: &str,
        wlog_type: &str,
        severity: &str,
        detection_source: &str,
    ) -> ApiResult<WafLog> {
        let conn = self.conn().await?;
        let row = conn
            .query_one(
                "INSERT INTO waf_log (intercepted_req, wlog_type, severity, detection_source) \
                 VALUES ($1, $2, $3, $4) RETURNING *",
                &[&intercepted_req, &wlog_type, &severity, &detection_source],
            )
            .await?;
        Ok(waf_log_from_row(&row))
    }

    pub async fn waf_log_list(&self, limit: i64, offset: i64) -> ApiResult<Vec<WafLog>> {
        let conn = self.conn().await?;
        let rows = conn
            .query(
                "SELECT * FROM waf_log ORDER BY wlog_timestamp DESC LIMIT $1 OFFSET $2",
                &[&limit, &offset],
            )
            .await?;
        Ok(rows.iter().map(waf_log_from_row).collect())
    }

    pub async fn waf_log_count(&self) -> ApiResult<i64> {
        let conn = self.conn().await?;
        Ok(conn
            .query_one("SELECT COUNT(*) FROM waf_log", &[])
            .await?
            .get(0))
    }

    pub async fn waf_log_blocked_count(&self) -> ApiResult<i64> {
        let conn = self.conn().await?;
        Ok(conn
            .query_one(
                "SELECT COUNT(*) FROM waf_log WHERE severity IN ('Critical', 'High')",
                &[],
            )
            .await?
            .get(0))
    }

    pub async fn waf_log_counts_by_type(&self) -> ApiResult<Vec<(String, i64)>> {
        let conn = self.conn().await?;
        let rows = conn
            .query(
                "SELECT wlog_type, COUNT(*) FROM waf_log GROUP BY wlog_type",
                &[],
            )
            .await?;
        Ok(rows.iter().map(|r| (r.get(0), r.get(1))).collect())
    }

    /// Timestamps of every anomaly row in the window, for calendar
    /// bucketing in the analytics layer.
    pub async fn waf_log_timestamps_since(&self, days: i32) -> ApiResult<Vec<DateTime<Utc>>> {
        let conn = self.conn().await?;
        let rows = conn
            .query(
                "SELECT wlog_timestamp FROM waf_log \
                 WHERE wlog_timestamp > now() - make_interval(days => $1)",
                &[&days],
            )
            .await?;
        Ok(rows.iter().map(|r| r.get(0)).collect())
    }

    // ========================================================================
    // ALERTS
    // ========================================================================

    pub async fn alert_create(&self, alert_type: &str, wlog_id: Option<i32>) -> ApiResult<Alert> {
        let conn = self.conn().await?;
        let row = conn
            .query_one(
                "INSERT INTO alert (alert_type, wlog_id) VALUES ($1, $2) RETURNING *",
                &[&alert_type, &wlog_id],
            )
            .await?;
        Ok(alert_from_row(&row))
    }

    /// Alerts joined with their WAF log (for severity/description views).
    pub async fn alert_list(&self, filter: &AlertFilter) -> ApiResult<Vec<(Alert, Option<WafLog>)>> {
        let conn = self.conn().await?;
        let rows = conn
            .query(
                "SELECT a.*, w.wlog_id AS w_id, w.intercepted_req, w.wlog_type, \
                        w.wlog_timestamp, w.severity, w.detection_source \
                 FROM alert a LEFT JOIN waf_log w ON a.wlog_id = w.wlog_id \
                 WHERE ($1::text IS NULL OR a.status = $1) \
                   AND ($2::text IS NULL OR w.severity = $2) \
                 ORDER BY a.created_at DESC LIMIT $3",
                &[&filter.status, &filter.severity, &filter.limit],
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let alert = alert_from_row(row);
                let wlog_id: Option<i32> = row.get("w_id");
                let log = wlog_id.map(|_| waf_log_from_row(row));
                (alert, log)
            })
            .collect())
    }

    pub async fn alert_update_status(&self, alert_id: i32, status: &str) -> ApiResult<Alert> {
        let conn = self.conn().await?;
        let resolved_at: Option<DateTime<Utc>> = if status == "resolved" {
            Some(Utc::now())
        } else {
            None
        };
        let row = conn
            .query_opt(
                "UPDATE alert SET status = $2, resolved_at = COALESCE($3, resolved_at) \
                 WHERE alert_id = $1 RETURNING *",
                &[&alert_id, &status, &resolved_at],
            )
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Alert {} not found", alert_id)))?;
        Ok(alert_from_row(&row))
    }

    // ========================================================================
    // RESTRICTIONS
    // ========================================================================

    pub async fn restriction_create(
        &self,
        kind: IndicatorKind,
        value: &str,
    ) -> ApiResult<Restriction> {
        let conn = self.conn().await?;
        let row = conn
            .query_one(
                "INSERT INTO restriction (restriction_type, restriction_description) \
                 VALUES ($1, $2) RETURNING *",
                &[&kind.as_str(), &value],
            )
            .await?;
        Ok(restriction_from_row(&row))
    }

    pub async fn restriction_list(&self) -> ApiResult<Vec<Restriction>> {
        let conn = self.conn().await?;
        let rows = conn
            .query("SELECT * FROM restriction ORDER BY restriction_id", &[])
            .await?;
        Ok(rows.iter().map(restriction_from_row).collect())
    }

    /// Exact local block-list match for the TI short-circuit.
    pub async fn restriction_exists(&self, kind: IndicatorKind, value: &str) -> ApiResult<bool> {
        let conn = self.conn().await?;
        let row = conn
            .query_opt(
                "SELECT 1 FROM restriction \
                 WHERE restriction_type = $1 AND restriction_description = $2 LIMIT 1",
                &[&kind.as_str(), &value],
            )
            .await?;
        Ok(row.is_some())
    }

    pub async fn restriction_delete(&self, restriction_id: i32) -> ApiResult<()> {
        let conn = self.conn().await?;
        let deleted = conn
            .execute(
                "DELETE FROM restriction WHERE restriction_id = $1",
                &[&restriction_id],
            )
            .await?;
        if deleted == 0 {
            return Err(ApiError::not_found(format!(
                "Restriction {} not found",
                restriction_id
            )));
        }
        Ok(())
    }

    // ========================================================================
    // CUSTOM SIGNATURES
    // ========================================================================

    pub async fn signature_create(
        &self,
        signature_type: &str,
        signature_content: &str,
    ) -> ApiResult<CustomSignature> {
        let conn = self.conn().await?;
        let row = conn
            .query_one(
                "INSERT INTO signature (signature_type, signature_content) \
                 VALUES ($1, $2) RETURNING *",
                &[&signature_type, &signature_content],
            )
            .await?;
        Ok(signature_from_row(&row))
    }

    pub async fn signature_list(&self) -> ApiResult<Vec<CustomSignature>> {
        let conn = self.conn().await?;
        let rows = conn
            .query("SELECT * FROM signature ORDER BY signature_id", &[])
            .await?;
        Ok(rows.iter().map(signature_from_row).collect())
    }

    pub async fn signature_update(
        &self,
        signature_id: i32,
        signature_type: Option<&str>,
        signature_content: Option<&str>,
    ) -> ApiResult<CustomSignature> {
        let conn = self.conn().await?;
        let row = conn
            .query_opt(
                "UPDATE signature SET \
                   signature_type = COALESCE($2, signature_type), \
                   signature_content = COALESCE($3, signature_content) \
                 WHERE signature_id = $1 RETURNING *",
                &[&signature_id, &signature_type, &signature_content],
            )
            .await?
            .ok_or_else(|| {
                ApiError::not_found(format!("Signature {} not found", signature_id))
            })?;
        Ok(signature_from_row(&row))
    }

    pub async fn signature_delete(&self, signature_id: i32) -> ApiResult<()> {
        let conn = self.conn().await?;
        let deleted = conn
            .execute(
                "DELETE FROM signature WHERE signature_id = $1",
                &[&signature_id],
            )
            .await?;
        if deleted == 0 {
            return Err(ApiError::not_found(format!(
                "Signature {} not found",
                signature_id
            )));
        }
        Ok(())
    }

    // ========================================================================
    // MODELS
    // ========================================================================

    pub async fn model_create(
        &self,
        model_type: &str,
        model_description: Option<&str>,
        model_threshold: f64,
    ) -> ApiResult<ModelInfo> {
        let conn = self.conn().await?;
        let row = conn
            .query_one(
                "INSERT INTO model (model_type, model_description, model_threshold) \
                 VALUES ($1, $2, $3) RETURNING *",
                &[&model_type, &model_description, &model_threshold],
            )
            .await?;
        Ok(model_from_row(&row))
    }

    pub async fn model_list(&self) -> ApiResult<Vec<ModelInfo>> {
        let conn = self.conn().await?;
        let rows = conn
            .query("SELECT * FROM model ORDER BY model_id", &[])
            .await?;
        Ok(rows.iter().map(model_from_row).collect())
    }

    pub async fn model_update(
        &self,
        model_id: i32,
        model_type: Option<&str>,
        model_description: Option<&str>,
        model_threshold: Option<f64>,
    ) -> ApiResult<ModelInfo> {
        let conn = self.conn().await?;
        let row = conn
            .query_opt(
                "UPDATE model SET \
                   model_type = COALESCE($2, model_type), \
                   model_description = COALESCE($3, model_description), \
                   model_threshold = COALESCE($4, model_threshold) \
                 WHERE model_id = $1 RETURNING *",
                &[&model_id, &model_type, &model_description, &model_threshold],
            )
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Model {} not found", model_id)))?;
        Ok(model_from_row(&row))
    }

    pub async fn model_delete(&self, model_id: i32) -> ApiResult<()> {
        let conn = self.conn().await?;
        let deleted = conn
            .execute("DELETE FROM model WHERE model_id = $1", &[&model_id])
            .await?;
        if deleted == 0 {
            return Err(ApiError::not_found(format!("Model {} not found", model_id)));
        }
        Ok(())
    }

    /// Mean model threshold, the dashboard's confidence scalar.
    pub async fn model_confidence(&self) -> ApiResult<f64> {
        let conn = self.conn().await?;
        let row = conn
            .query_one("SELECT COALESCE(AVG(model_threshold), 0) FROM model", &[])
            .await?;
        Ok(row.get(0))
    }

    // ========================================================================
    // PATCHING REPORTS
    // ========================================================================

    pub async fn report_create(
        &self,
        report_details: &str,
        wlog_id: Option<i32>,
    ) -> ApiResult<PatchingReport> {
        let conn = self.conn().await?;
        let row = conn
            .query_one(
                "INSERT INTO patching_report (report_details, wlog_id) \
                 VALUES ($1, $2) RETURNING *",
                &[&report_details, &wlog_id],
            )
            .await?;
        Ok(report_from_row(&row))
    }

    pub async fn report_list(&self, limit: i64, offset: i64) -> ApiResult<Vec<PatchingReport>> {
        let conn = self.conn().await?;
        let rows = conn
            .query(
                "SELECT * FROM patching_report ORDER BY report_timestamp DESC \
                 LIMIT $1 OFFSET $2",
                &[&limit, &offset],
            )
            .await?;
        Ok(rows.iter().map(report_from_row).collect())
    }

    pub async fn report_get(&self, report_id: i32) -> ApiResult<PatchingReport> {
        let conn = self.conn().await?;
        let row = conn
            .query_opt(
                "SELECT * FROM patching_report WHERE report_id = $1",
                &[&report_id],
            )
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Report {} not found", report_id)))?;
        Ok(report_from_row(&row))
    }

    pub async fn report_delete(&self, report_id: i32) -> ApiResult<()> {
        let conn = self.conn().await?;
        let deleted = conn
            .execute(
                "DELETE FROM patching_report WHERE report_id = $1",
                &[&report_id],
            )
            .await?;
        if deleted == 0 {
            return Err(ApiError::not_found(format!("Report {} not found", report_id)));
        }
        Ok(())
    }

    // ========================================================================
    // SUSPICIOUS USER PROFILES
    // ========================================================================

    pub async fn profile_create(&self, params: &ProfileParams) -> ApiResult<SuspiciousUserProfile> {
        let conn = self.conn().await?;
        let row = conn
            .query_one(
                "INSERT INTO suspicious_user_profile \
                   (sus_username, pc_number, ip_address, mac_address, session_cookie, suspicion_level) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
                &[
                    &params.sus_username,
                    &params.pc_number,
                    &params.ip_address,
                    &params.mac_address,
                    &params.session_cookie,
                    &params.suspicion_level,
                ],
            )
            .await?;
        Ok(profile_from_row(&row))
    }

    pub async fn profile_list(&self) -> ApiResult<Vec<SuspiciousUserProfile>> {
        let conn = self.conn().await?;
        let rows = conn
            .query(
                "SELECT * FROM suspicious_user_profile ORDER BY sus_user_id",
                &[],
            )
            .await?;
        Ok(rows.iter().map(profile_from_row).collect())
    }

    pub async fn profile_update(
        &self,
        sus_user_id: i32,
        params: &ProfileParams,
    ) -> ApiResult<SuspiciousUserProfile> {
        let conn = self.conn().await?;
        let row = conn
            .query_opt(
                "UPDATE suspicious_user_profile SET \
                   sus_username = $2, pc_number = $3, ip_address = $4, \
                   mac_address = $5, session_cookie = $6, suspicion_level = $7 \
                 WHERE sus_user_id = $1 RETURNING *",
                &[
                    &sus_user_id,
                    &params.sus_username,
                    &params.pc_number,
                    &params.ip_address,
                    &params.mac_address,
                    &params.session_cookie,
                    &params.suspicion_level,
                ],
            )
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Profile {} not found", sus_user_id)))?;
        Ok(profile_from_row(&row))
    }

    pub async fn profile_delete(&self, sus_user_id: i32) -> ApiResult<()> {
        let conn = self.conn().await?;
        let deleted = conn
            .execute(
                "DELETE FROM suspicious_user_profile WHERE sus_user_id = $1",
                &[&sus_user_id],
            )
            .await?;
        if deleted == 0 {
            return Err(ApiError::not_found(format!(
                "Profile {} not found",
                sus_user_id
            )));
        }
        Ok(())
    }

    // ========================================================================
    // WHITELIST
    // ========================================================================

    pub async fn whitelist_create(
        &self,
        wlog_id: Option<i32>,
        reason: &str,
        user_id: Option<i32>,
    ) -> ApiResult<WhitelistEntry> {
        let conn = self.conn().await?;
        let row = conn
            .query_one(
                "INSERT INTO whitelisted_request (wlog_id, reason, user_id) \
                 VALUES ($1, $2, $3) RETURNING *",
                &[&wlog_id, &reason, &user_id],
            )
            .await?;
        Ok(whitelist_from_row(&row))
    }

    pub async fn whitelist_list(&self) -> ApiResult<Vec<WhitelistEntry>> {
        let conn = self.conn().await?;
        let rows = conn
            .query("SELECT * FROM whitelisted_request ORDER BY wl_id", &[])
            .await?;
        Ok(rows.iter().map(whitelist_from_row).collect())
    }

    pub async fn whitelist_count(&self) -> ApiResult<i64> {
        let conn = self.conn().await?;
        Ok(conn
            .query_one("SELECT COUNT(*) FROM whitelisted_request", &[])
            .await?
            .get(0))
    }

    pub async fn whitelist_delete(&self, wl_id: i32) -> ApiResult<()> {
        let conn = self.conn().await?;
        let deleted = conn
            .execute("DELETE FROM whitelisted_request WHERE wl_id = $1", &[&wl_id])
            .await?;
        if deleted == 0 {
            return Err(ApiError::not_found(format!(
                "Whitelist entry {} not found",
                wl_id
            )));
        }
        Ok(())
    }

    // ========================================================================
    // SYSTEM LOGS
    // ========================================================================

    pub async fn syslog_create(&self, message: &str, refs: &SysLogRefs) -> ApiResult<SysLog> {
        let conn = self.conn().await?;
        let row = conn
            .query_one(
                "INSERT INTO sys_log \
                   (message, restriction_id, model_id, signature_id, user_id, sus_user_id, report_id, wl_id) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
                &[
                    &message,
                    &refs.restriction_id,
                    &refs.model_id,
                    &refs.signature_id,
                    &refs.user_id,
                    &refs.sus_user_id,
                    &refs.report_id,
                    &refs.wl_id,
                ],
            )
            .await?;
        Ok(syslog_from_row(&row))
    }

    pub async fn syslog_list(&self, limit: i64) -> ApiResult<Vec<SysLog>> {
        let conn = self.conn().await?;
        let rows = conn
            .query(
                "SELECT * FROM sys_log ORDER BY slog_timestamp DESC LIMIT $1",
                &[&limit],
            )
            .await?;
        Ok(rows.iter().map(syslog_from_row).collect())
    }
}

impl std::fmt::Debug for DbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbClient")
            .field("pool_status", &self.pool.status())
            .finish()
    }
}
