//! Domain rule grammar.
//!
//! | form | meaning |
//! |---|---|
//! | `regexp:<pattern>` | case-insensitive regex test |
//! | `domain:<x>` | exact or dot-suffix |
//! | `full:<x>` | exact only |
//! | `keyword:<x>` | substring |
//! | `geosite:<name>` | approximation table, see `geosite` |
//! | `<x>` | same as `domain:` |

use regex::RegexBuilder;

use super::geosite;

pub fn match_domain_rule(rule: &str, domain: &str) -> bool {
    let domain = normalize(domain);
    if domain.is_empty() {
        return false;
    }
    let rule = rule.trim();

    if let Some(pattern) = rule.strip_prefix("regexp:") {
        return RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(|re| re.is_match(&domain))
            .unwrap_or(false);
    }
    if let Some(suffix) = rule.strip_prefix("domain:") {
        return matches_suffix(&domain, suffix);
    }
    if let Some(exact) = rule.strip_prefix("full:") {
        return domain == normalize(exact);
    }
    if let Some(keyword) = rule.strip_prefix("keyword:") {
        let keyword = normalize(keyword);
        return !keyword.is_empty() && domain.contains(keyword.as_str());
    }
    if let Some(category) = rule.strip_prefix("geosite:") {
        return geosite::match_geosite(category, &domain);
    }
    matches_suffix(&domain, rule)
}

/// `domain` equals `suffix` or ends with `.suffix`.
pub(crate) fn matches_suffix(domain: &str, suffix: &str) -> bool {
    let suffix = normalize(suffix);
    let suffix = suffix.trim_start_matches('.');
    if suffix.is_empty() {
        return false;
    }
    domain == suffix
        || (domain.len() > suffix.len()
            && domain.ends_with(suffix)
            && domain.as_bytes()[domain.len() - suffix.len() - 1] == b'.')
}

fn normalize(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_prefix_is_exact_or_suffix() {
        assert!(match_domain_rule("domain:example.com", "example.com"));
        assert!(match_domain_rule("domain:example.com", "api.Example.com"));
        assert!(!match_domain_rule("domain:example.com", "badexample.com"));
        assert!(!match_domain_rule("domain:example.com", "example.org"));
    }

    #[test]
    fn full_is_exact_only() {
        assert!(match_domain_rule("full:example.com", "example.com"));
        assert!(!match_domain_rule("full:example.com", "www.example.com"));
    }

    #[test]
    fn keyword_is_substring() {
        assert!(match_domain_rule("keyword:tube", "www.YouTube.com"));
        assert!(match_domain_rule("keyword:example", "example.org"));
        assert!(!match_domain_rule("keyword:tube", "vimeo.com"));
        assert!(!match_domain_rule("keyword:", "vimeo.com"));
    }

    #[test]
    fn regexp_is_case_insensitive() {
        assert!(match_domain_rule(r"regexp:^api\.", "API.example.com"));
        assert!(!match_domain_rule(r"regexp:^api\.", "www.example.com"));
        assert!(!match_domain_rule("regexp:(", "anything.com"));
    }

    #[test]
    fn bare_string_is_suffix() {
        assert!(match_domain_rule("example.com", "cdn.example.com"));
        assert!(!match_domain_rule("example.com", "other.com"));
    }

    #[test]
    fn geosite_uses_table() {
        assert!(match_domain_rule("geosite:netflix", "www.netflix.com"));
        assert!(!match_domain_rule("geosite:unknown", "www.netflix.com"));
    }

    #[test]
    fn empty_domain_never_matches() {
        assert!(!match_domain_rule("domain:example.com", ""));
        assert!(!match_domain_rule("regexp:.*", "  "));
    }
}
