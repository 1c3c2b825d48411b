//! Signature engine
//!
//! Rules are loaded once at startup from a YAML sequence of `{id, regex}`,
//! compiled case-insensitively, and matched against both the raw body text
//! and the URL-decoded path+query. Only the `enabled` flag is mutable at
//! runtime, through the control plane.

use rampart_core::SignatureError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::RwLock;

/// One rule as it appears in the signature configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureDef {
    pub id: String,
    pub regex: String,
}

/// Rule state as listed to the control plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
}

struct CompiledRule {
    id: String,
    name: String,
    description: String,
    pattern: Regex,
    enabled: bool,
}

/// The compiled signature set with runtime enable flags.
pub struct RuleSet {
    rules: RwLock<Vec<CompiledRule>>,
}

impl RuleSet {
    /// Load and compile the signature file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SignatureError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| SignatureError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let defs: Vec<SignatureDef> = serde_yaml::from_str(&raw)?;
        Self::compile(defs)
    }

    /// Compile a rule list; every rule starts enabled.
    pub fn compile(defs: Vec<SignatureDef>) -> Result<Self, SignatureError> {
        let mut rules = Vec::with_capacity(defs.len());
        for def in defs {
            let pattern = RegexBuilder::new(&def.regex)
                .case_insensitive(true)
                .build()
                .map_err(|e| SignatureError::InvalidRegex {
                    id: def.id.clone(),
                    reason: e.to_string(),
                })?;

            let description = if def.regex.chars().count() > 50 {
                let prefix: String = def.regex.chars().take(50).collect();
                format!("Pattern: {}...", prefix)
            } else {
                format!("Pattern: {}", def.regex)
            };

            rules.push(CompiledRule {
                name: title_case(&def.id),
                description,
                id: def.id,
                pattern,
                enabled: true,
            });
        }
        Ok(Self {
            rules: RwLock::new(rules),
        })
    }

    /// Test every enabled rule against the body text and the URL-decoded
    /// path+query; return the first matching rule id.
    pub fn scan(&self, body: &str, url_decoded: &str) -> Option<String> {
        let rules = self.rules.read().ok()?;
        for rule in rules.iter() {
            if !rule.enabled {
                continue;
            }
            if rule.pattern.is_match(body) || rule.pattern.is_match(url_decoded) {
                return Some(rule.id.clone());
            }
        }
        None
    }

    /// Snapshot of every rule with its enabled flag.
    pub fn list(&self) -> Vec<RuleView> {
        self.rules
            .read()
            .map(|rules| {
                rules
                    .iter()
                    .map(|r| RuleView {
                        id: r.id.clone(),
                        name: r.name.clone(),
                        description: r.description.clone(),
                        enabled: r.enabled,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Toggle one rule. Idempotent; unknown ids are an error.
    pub fn set_enabled(&self, id: &str, enabled: bool) -> Result<RuleView, SignatureError> {
        let mut rules = self
            .rules
            .write()
            .map_err(|_| SignatureError::UnknownRule(id.to_string()))?;
        let rule = rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| SignatureError::UnknownRule(id.to_string()))?;
        rule.enabled = enabled;
        Ok(RuleView {
            id: rule.id.clone(),
            name: rule.name.clone(),
            description: rule.description.clone(),
            enabled: rule.enabled,
        })
    }

    pub fn len(&self) -> usize {
        self.rules.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet").field("rules", &self.len()).finish()
    }
}

/// `SQLI_UNION_SELECT` -> `Sqli Union Select`.
fn title_case(id: &str) -> String {
    id.split('_')
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rules() -> RuleSet {
        RuleSet::compile(vec![
            SignatureDef {
                id: "SQLI_UNION_SELECT".into(),
                regex: r"union\s+select".into(),
            },
            SignatureDef {
                id: "XSS_SCRIPT_TAG".into(),
                regex: r"<script[^>]*>".into(),
            },
        ])
        .unwrap()
    }

    #[test]
    fn matching_is_case_insensitive() {
        let rules = sample_rules();
        assert_eq!(
            rules.scan("", "/search?q=UNION SELECT password"),
            Some("SQLI_UNION_SELECT".into())
        );
        assert_eq!(
            rules.scan("", "/search?q=union select 1"),
            Some("SQLI_UNION_SELECT".into())
        );
    }

    #[test]
    fn body_and_url_are_both_scanned() {
        let rules = sample_rules();
        assert_eq!(
            rules.scan("<script>alert(1)</script>", "/comment"),
            Some("XSS_SCRIPT_TAG".into())
        );
        assert_eq!(rules.scan("hello world", "/comment"), None);
    }

    #[test]
    fn disabled_rules_are_skipped() {
        let rules = sample_rules();
        rules.set_enabled("SQLI_UNION_SELECT", false).unwrap();
        assert_eq!(rules.scan("", "/q=union select 1"), None);

        rules.set_enabled("SQLI_UNION_SELECT", true).unwrap();
        assert!(rules.scan("", "/q=union select 1").is_some());
    }

    #[test]
    fn toggle_is_idempotent() {
        let rules = sample_rules();
        let first = rules.set_enabled("XSS_SCRIPT_TAG", false).unwrap();
        let second = rules.set_enabled("XSS_SCRIPT_TAG", false).unwrap();
        assert_eq!(first, second);
        assert!(!second.enabled);
    }

    #[test]
    fn unknown_rule_is_an_error() {
        let rules = sample_rules();
        assert!(matches!(
            rules.set_enabled("NO_SUCH_RULE", true),
            Err(SignatureError::UnknownRule(_))
        ));
    }

    #[test]
    fn invalid_regex_fails_compilation() {
        let err = RuleSet::compile(vec![SignatureDef {
            id: "BROKEN".into(),
            regex: "(unclosed".into(),
        }])
        .unwrap_err();
        assert!(matches!(err, SignatureError::InvalidRegex { .. }));
    }

    #[test]
    fn list_reports_display_metadata() {
        let rules = sample_rules();
        let views = rules.list();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].name, "Sqli Union Select");
        assert!(views[0].description.starts_with("Pattern: "));
        assert!(views[0].enabled);
    }

    #[test]
    fn yaml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signatures.yml");
        std::fs::write(
            &path,
            "- id: SQLI_UNION_SELECT\n  regex: union\\s+select\n- id: LFI_DOT_DOT\n  regex: \\.\\./\n",
        )
        .unwrap();

        let rules = RuleSet::load(&path).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(
            rules.scan("", "/download?file=../../etc/passwd"),
            Some("LFI_DOT_DOT".into())
        );
    }
}
