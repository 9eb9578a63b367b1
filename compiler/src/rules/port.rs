//! Port-list grammar: single ports and `start-end` ranges joined by commas,
//! e.g. `80,443,1000-2000`.

use std::sync::LazyLock;

use regex::Regex;

static PORT_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(-\d+)?)(,\d+(-\d+)?)*$").expect("port grammar regex is valid")
});

/// Whether `spec` is well-formed according to the port-list grammar.
pub fn is_valid_port_spec(spec: &str) -> bool {
    PORT_SPEC.is_match(spec.trim())
}

/// Whether `port` is listed in `rule`. Malformed entries never match.
pub fn match_port_rule(rule: &str, port: u16) -> bool {
    let port = u32::from(port);
    rule.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .any(|part| match part.split_once('-') {
            Some((start, end)) => match (start.trim().parse::<u32>(), end.trim().parse::<u32>()) {
                (Ok(start), Ok(end)) => (start..=end).contains(&port),
                _ => false,
            },
            None => part.parse::<u32>().is_ok_and(|p| p == port),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_lists_and_ranges() {
        assert!(match_port_rule("80,443,1000-2000", 443));
        assert!(match_port_rule("80,443,1000-2000", 1000));
        assert!(match_port_rule("80,443,1000-2000", 2000));
        assert!(match_port_rule("80,443,1000-2000", 1500));
        assert!(!match_port_rule("80,443", 8080));
        assert!(!match_port_rule("1000-2000", 999));
    }

    #[test]
    fn malformed_entries_never_match() {
        assert!(!match_port_rule("http", 80));
        assert!(!match_port_rule("", 80));
        assert!(match_port_rule("x,80", 80));
    }

    #[test]
    fn grammar() {
        assert!(is_valid_port_spec("443"));
        assert!(is_valid_port_spec("80,443,1000-2000"));
        assert!(!is_valid_port_spec("80,"));
        assert!(!is_valid_port_spec("80-"));
        assert!(!is_valid_port_spec("80 443"));
        assert!(!is_valid_port_spec(""));
    }
}
