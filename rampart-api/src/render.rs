//! Report download rendering
//!
//! Patching reports can be downloaded as CSV or as a minimal single-page
//! PDF. The PDF is assembled by hand (uncompressed streams, fixed Helvetica
//! font) so no document toolkit is pulled onto the server for a plain text
//! export.

use rampart_core::PatchingReport;
use serde_json::Value;

/// Flatten a report into (section, field, value) rows shared by both
/// renderers.
fn report_rows(report: &PatchingReport) -> Vec<(String, String, String)> {
    let mut rows = Vec::new();
    let details: Value = serde_json::from_str(&report.report_details).unwrap_or(Value::Null);

    rows.push((
        "report".into(),
        "report_id".into(),
        report.report_id.to_string(),
    ));
    rows.push((
        "report".into(),
        "created_at".into(),
        report.report_timestamp.to_rfc3339(),
    ));
    if let Some(wlog_id) = report.wlog_id {
        rows.push(("report".into(), "wlog_id".into(), wlog_id.to_string()));
    }

    for field in ["attack_type", "root_cause", "risk_level"] {
        if let Some(value) = details[field].as_str() {
            rows.push(("report".into(), field.into(), value.to_string()));
        }
    }

    if let Some(mitigations) = details["mitigations"].as_array() {
        for m in mitigations {
            rows.push((
                "mitigation".into(),
                m["category"].as_str().unwrap_or("unknown").to_string(),
                m["description"].as_str().unwrap_or_default().to_string(),
            ));
        }
    }
    if let Some(patches) = details["virtual_patches"].as_array() {
        for p in patches {
            rows.push((
                "virtual_patch".into(),
                p["target"].as_str().unwrap_or("unknown").to_string(),
                p["rule"].as_str().unwrap_or_default().to_string(),
            ));
        }
    }
    if let Some(references) = details["references"].as_array() {
        for r in references {
            rows.push((
                "reference".into(),
                format!(
                    "{} {}",
                    r["standard"].as_str().unwrap_or_default(),
                    r["id"].as_str().unwrap_or_default()
                ),
                r["title"].as_str().unwrap_or_default().to_string(),
            ));
        }
    }
    rows
}

// ============================================================================
// CSV
// ============================================================================

/// Render the report as CSV with a `section,field,value` header.
pub fn report_csv(report: &PatchingReport) -> String {
    let mut out = String::from("section,field,value\n");
    for (section, field, value) in report_rows(report) {
        out.push_str(&csv_field(&section));
        out.push(',');
        out.push_str(&csv_field(&field));
        out.push(',');
        out.push_str(&csv_field(&value));
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// ============================================================================
// PDF
// ============================================================================

/// Render the report as a one-page PDF.
pub fn report_pdf(report: &PatchingReport) -> Vec<u8> {
    let mut lines = vec![format!("Rampart Patching Report #{}", report.report_id)];
    for (section, field, value) in report_rows(report) {
        let line = format!("[{}] {}: {}", section, field, value);
        // Page width bounds the line; the content is available in full via CSV.
        lines.push(truncate_chars(&line, 95));
    }
    lines.truncate(48);
    pdf_document(&lines)
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max - 3).collect();
        out.push_str("...");
        out
    }
}

/// Assemble a single-page PDF 1.4 document from text lines.
fn pdf_document(lines: &[String]) -> Vec<u8> {
    let mut content = String::from("BT\n/F1 10 Tf\n14 TL\n50 780 Td\n");
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            content.push_str("T*\n");
        }
        content.push_str(&format!("({}) Tj\n", pdf_escape(line)));
    }
    content.push_str("ET\n");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ),
    ];

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, object));
    }

    let xref_start = out.len();
    out.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
    out.push_str("0000000000 65535 f \n");
    for offset in offsets {
        out.push_str(&format!("{:010} 00000 n \n", offset));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_start
    ));
    out.into_bytes()
}

fn pdf_escape(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '(' => "\\(".to_string(),
            ')' => "\\)".to_string(),
            '\\' => "\\\\".to_string(),
            c if c.is_ascii() => c.to_string(),
            // Helvetica + default encoding only covers ASCII here.
            _ => '?'.to_string(),
        })
        .collect()
}
