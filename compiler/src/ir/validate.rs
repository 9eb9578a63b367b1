//! Sanity checks over a compiled document (D001–D004).
//!
//! The compiler never refuses to emit; these findings are logged so a broken
//! document is visible before it is deployed.

use std::collections::HashSet;

use super::types::XrayConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentIssue {
    pub code: &'static str,
    pub message: String,
    pub tag: Option<String>,
}

impl std::fmt::Display for DocumentIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "[{}] {} (at '{}')", self.code, self.message, tag),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

pub fn validate_document(doc: &XrayConfig) -> Vec<DocumentIssue> {
    let mut issues = Vec::new();

    check_unique_tags(doc, &mut issues);
    check_rule_targets(doc, &mut issues);
    check_balancer_selectors(doc, &mut issues);

    issues
}

fn check_unique_tags(doc: &XrayConfig, issues: &mut Vec<DocumentIssue>) {
    let mut seen = HashSet::new();
    for tag in doc.inbounds.iter().map(|i| &i.tag).chain(doc.outbounds.iter().map(|o| &o.tag)) {
        if !tag.is_empty() && !seen.insert(tag.as_str()) {
            issues.push(DocumentIssue {
                code: "D001",
                message: format!("Tag '{}' is declared more than once", tag),
                tag: Some(tag.clone()),
            });
        }
    }
}

fn check_rule_targets(doc: &XrayConfig, issues: &mut Vec<DocumentIssue>) {
    let outbounds: HashSet<&str> = doc.outbounds.iter().map(|o| o.tag.as_str()).collect();
    let balancers: HashSet<&str> = doc.routing.balancers.iter().map(|b| b.tag.as_str()).collect();

    for (i, rule) in doc.routing.rules.iter().enumerate() {
        match (&rule.outbound_tag, &rule.balancer_tag) {
            (Some(tag), _) if !outbounds.contains(tag.as_str()) => issues.push(DocumentIssue {
                code: "D002",
                message: format!("Rule #{} targets undeclared outbound '{}'", i + 1, tag),
                tag: Some(tag.clone()),
            }),
            (None, Some(tag)) if !balancers.contains(tag.as_str()) => issues.push(DocumentIssue {
                code: "D002",
                message: format!("Rule #{} targets undeclared balancer '{}'", i + 1, tag),
                tag: Some(tag.clone()),
            }),
            (None, None) => issues.push(DocumentIssue {
                code: "D003",
                message: format!("Rule #{} has neither outboundTag nor balancerTag", i + 1),
                tag: None,
            }),
            _ => {}
        }
    }
}

fn check_balancer_selectors(doc: &XrayConfig, issues: &mut Vec<DocumentIssue>) {
    for balancer in &doc.routing.balancers {
        if balancer.selector.is_empty() {
            issues.push(DocumentIssue {
                code: "D004",
                message: format!("Balancer '{}' has an empty selector", balancer.tag),
                tag: Some(balancer.tag.clone()),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::types::*;

    fn doc() -> XrayConfig {
        XrayConfig {
            log: XrayLog::default(),
            inbounds: vec![],
            outbounds: vec![XrayOutbound {
                tag: "direct".into(),
                protocol: "freedom".into(),
                settings: serde_json::Value::Null,
                stream_settings: None,
            }],
            routing: XrayRouting::default(),
        }
    }

    #[test]
    fn clean_document_has_no_issues() {
        let mut d = doc();
        d.routing.rules.push(FieldRule {
            rule_type: "field".into(),
            outbound_tag: Some("direct".into()),
            ..Default::default()
        });
        assert!(validate_document(&d).is_empty());
    }

    #[test]
    fn undeclared_targets_and_empty_rules() {
        let mut d = doc();
        d.routing.rules.push(FieldRule {
            rule_type: "field".into(),
            outbound_tag: Some("missing".into()),
            ..Default::default()
        });
        d.routing.rules.push(FieldRule::default());
        let codes: Vec<&str> = validate_document(&d).iter().map(|i| i.code).collect();
        assert_eq!(codes, vec!["D002", "D003"]);
    }

    #[test]
    fn duplicate_tags() {
        let mut d = doc();
        let dup = d.outbounds[0].clone();
        d.outbounds.push(dup);
        let codes: Vec<&str> = validate_document(&d).iter().map(|i| i.code).collect();
        assert_eq!(codes, vec!["D001"]);
    }
}
