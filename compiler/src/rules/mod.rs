//! Rule-matching semantics shared by the compiler, the validator and the simulator.
//!
//! The simulator approximates what the proxy runtime does: there is no geo-IP or
//! geo-site database and no DNS resolution, so `geosite:` uses a small table and
//! IP rules only count once a domain predicate on the same rule has matched.

pub mod domain;
pub mod geosite;
pub mod port;

pub use domain::match_domain_rule;
pub use port::{is_valid_port_spec, match_port_rule};

use crate::parse::types::RulePredicates;

/// What a rule is matched against.
#[derive(Debug, Clone, Copy)]
pub struct RuleSubject<'a> {
    pub domain: &'a str,
    /// `tcp` or `udp`.
    pub protocol: &'a str,
    pub port: u16,
    /// Tag of the inbound the traffic is currently standing behind.
    pub inbound_tag: &'a str,
}

/// AND across the categories that are present, OR within a category.
/// A rule with no predicates is a catch-all.
pub fn predicates_match(predicates: &RulePredicates, subject: &RuleSubject<'_>) -> bool {
    if predicates.is_catch_all() {
        return true;
    }

    if let Some(tag) = predicates.inbound_tag_spec() {
        if tag != subject.inbound_tag {
            return false;
        }
    }

    let domain_matched = !predicates.domain.is_empty()
        && predicates
            .domain
            .iter()
            .any(|rule| match_domain_rule(rule, subject.domain));
    if !predicates.domain.is_empty() && !domain_matched {
        return false;
    }

    // No resolution is available: an IP category is only satisfied by a domain match.
    if !predicates.ip.is_empty() && !domain_matched {
        return false;
    }

    if let Some(spec) = predicates.port_spec() {
        if !match_port_rule(spec, subject.port) {
            return false;
        }
    }

    if !predicates.protocol.is_empty()
        && !predicates
            .protocol
            .iter()
            .any(|p| p.trim().eq_ignore_ascii_case(subject.protocol))
    {
        return false;
    }

    if let Some(network) = predicates.network_spec() {
        if !network_matches(network, subject.protocol) {
            return false;
        }
    }

    true
}

/// `network` is `tcp`, `udp` or `tcp,udp`.
pub fn network_matches(network: &str, protocol: &str) -> bool {
    network
        .split(',')
        .map(str::trim)
        .any(|n| n.eq_ignore_ascii_case(protocol))
}

/// Balancer selectors are tag prefixes.
pub fn selector_matches(selector: &[String], tag: &str) -> bool {
    selector
        .iter()
        .map(|s| s.trim())
        .any(|prefix| !prefix.is_empty() && tag.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(domain: &str) -> RuleSubject<'_> {
        RuleSubject {
            domain,
            protocol: "tcp",
            port: 443,
            inbound_tag: "in1",
        }
    }

    #[test]
    fn empty_predicates_are_catch_all() {
        let p = RulePredicates::default();
        assert!(predicates_match(&p, &subject("anything.org")));
        assert!(predicates_match(&p, &subject("")));
    }

    #[test]
    fn categories_are_anded() {
        let p = RulePredicates {
            domain: vec!["domain:example.com".into()],
            port: Some("80,443".into()),
            ..Default::default()
        };
        assert!(predicates_match(&p, &subject("example.com")));
        let mut s = subject("example.com");
        s.port = 8443;
        assert!(!predicates_match(&p, &s));
    }

    #[test]
    fn rules_within_category_are_ored() {
        let p = RulePredicates {
            domain: vec!["full:a.com".into(), "domain:b.com".into()],
            ..Default::default()
        };
        assert!(predicates_match(&p, &subject("x.b.com")));
        assert!(!predicates_match(&p, &subject("x.a.com")));
    }

    #[test]
    fn ip_alone_never_matches() {
        let p = RulePredicates {
            ip: vec!["geoip:private".into()],
            ..Default::default()
        };
        assert!(!predicates_match(&p, &subject("10.0.0.1")));
    }

    #[test]
    fn ip_satisfied_by_domain_match() {
        let p = RulePredicates {
            domain: vec!["example.com".into()],
            ip: vec!["1.1.1.1/32".into()],
            ..Default::default()
        };
        assert!(predicates_match(&p, &subject("example.com")));
        assert!(!predicates_match(&p, &subject("other.com")));
    }

    #[test]
    fn inbound_tag_must_equal_current_inbound() {
        let p = RulePredicates {
            inbound_tag: Some("in2".into()),
            ..Default::default()
        };
        assert!(!predicates_match(&p, &subject("example.com")));
        let mut s = subject("example.com");
        s.inbound_tag = "in2";
        assert!(predicates_match(&p, &s));
    }

    #[test]
    fn network_and_protocol() {
        let p = RulePredicates {
            network: Some("udp".into()),
            ..Default::default()
        };
        assert!(!predicates_match(&p, &subject("example.com")));
        let p = RulePredicates {
            network: Some("tcp,udp".into()),
            protocol: vec!["TCP".into()],
            ..Default::default()
        };
        assert!(predicates_match(&p, &subject("example.com")));
    }

    #[test]
    fn selector_prefixes() {
        let selector = vec!["proxy-".to_string(), "".to_string()];
        assert!(selector_matches(&selector, "proxy-eu"));
        assert!(!selector_matches(&selector, "direct"));
        assert!(!selector_matches(&[], "proxy-eu"));
    }
}
