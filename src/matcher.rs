/// Domain pattern matching for Wiresock Auto Launcher
use log::warn;
use regex::{Regex, RegexBuilder};
use url::Url;

/// A monitored-domain pattern, normalized and ready to match
#[derive(Debug, Clone)]
pub enum DomainPattern {
    /// Plain domain: matches itself and every subdomain
    Suffix(String),
    /// Pattern containing `*`, compiled to an anchored expression
    Wildcard(Regex),
}

impl DomainPattern {
    /// Normalize and compile a user-entered pattern
    ///
    /// Whitespace is trimmed and the pattern lower-cased. Blank patterns
    /// yield `None` so they can never match.
    pub fn parse(pattern: &str) -> Option<DomainPattern> {
        let clean = pattern.trim().to_lowercase();
        if clean.is_empty() {
            return None;
        }

        if !clean.contains('*') {
            return Some(DomainPattern::Suffix(clean));
        }

        match wildcard_to_regex(&clean) {
            Ok(regex) => Some(DomainPattern::Wildcard(regex)),
            Err(e) => {
                warn!("Skipping unusable domain pattern {:?}: {}", clean, e);
                None
            }
        }
    }

    /// Test a lower-cased hostname against this pattern
    pub fn matches(&self, hostname: &str) -> bool {
        match self {
            DomainPattern::Suffix(domain) => {
                hostname == domain
                    || hostname
                        .strip_suffix(domain.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.'))
            }
            DomainPattern::Wildcard(regex) => regex.is_match(hostname),
        }
    }
}

/// Translate a `*` wildcard pattern into an anchored, case-insensitive regex
///
/// Every `*` becomes `.*`; all other characters are matched literally.
///
/// Examples:
/// - `*.example.org` → `^.*\.example\.org$`
/// - `mail.*`        → `^mail\..*$`
pub fn wildcard_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    RegexBuilder::new(&format!("^{}$", body))
        .case_insensitive(true)
        .build()
}

/// The monitored set compiled for repeated matching
#[derive(Debug, Clone, Default)]
pub struct DomainMatcher {
    patterns: Vec<DomainPattern>,
}

impl DomainMatcher {
    pub fn new<S: AsRef<str>>(domains: &[S]) -> DomainMatcher {
        DomainMatcher {
            patterns: domains
                .iter()
                .filter_map(|d| DomainPattern::parse(d.as_ref()))
                .collect(),
        }
    }

    /// True iff any pattern matches the hostname (case-insensitive)
    pub fn matches(&self, hostname: &str) -> bool {
        let hostname = hostname.to_lowercase();
        self.patterns.iter().any(|p| p.matches(&hostname))
    }
}

/// Extract the lower-cased hostname from a URL
///
/// Returns `None` for malformed URLs and for URLs without a host
/// (`about:blank`, `data:` and similar). The port is never included.
pub fn hostname_from_url(url: &str) -> Option<String> {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Failed to parse URL {:?}: {}", url, e);
            return None;
        }
    };

    parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .map(|host| host.to_lowercase())
}

/// Check whether a URL's hostname is covered by any monitored pattern
///
/// Malformed URLs report no match.
pub fn is_domain_monitored<S: AsRef<str>>(url: &str, domains: &[S]) -> bool {
    hostname_from_url(url)
        .map(|hostname| DomainMatcher::new(domains).matches(&hostname))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(domains: &[&str]) -> DomainMatcher {
        DomainMatcher::new(domains)
    }

    #[test]
    fn test_plain_pattern_matches_itself_and_subdomains() {
        let m = matcher(&["mail.ru"]);

        assert!(m.matches("mail.ru"));
        assert!(m.matches("sub.mail.ru"));
        assert!(m.matches("a.b.mail.ru"));
    }

    #[test]
    fn test_plain_pattern_rejects_lookalikes() {
        let m = matcher(&["mail.ru"]);

        assert!(!m.matches("evilmail.ru"));
        assert!(!m.matches("mail.ru.evil.com"));
        assert!(!m.matches("ru"));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let m = matcher(&["  Mail.RU "]);

        assert!(m.matches("MAIL.ru"));
        assert!(m.matches("Inbox.Mail.Ru"));
    }

    #[test]
    fn test_wildcard_prefix() {
        let m = matcher(&["*.example.org"]);

        assert!(m.matches("a.example.org"));
        assert!(m.matches("a.b.example.org"));
        assert!(m.matches("A.EXAMPLE.ORG"));
        assert!(!m.matches("example.org"));
        assert!(!m.matches("a.example.org.evil.com"));
    }

    #[test]
    fn test_wildcard_suffix() {
        let m = matcher(&["mail.*"]);

        assert!(m.matches("mail.ru"));
        assert!(m.matches("mail.example.com"));
        assert!(!m.matches("gmail.ru"));
    }

    #[test]
    fn test_wildcard_escapes_metacharacters() {
        let m = matcher(&["a+b*.com"]);

        assert!(m.matches("a+bzz.com"));
        assert!(m.matches("a+b.com"));
        assert!(!m.matches("aab.com"));
        assert!(!m.matches("a+bxcom"));
    }

    #[test]
    fn test_lone_star_matches_everything() {
        let m = matcher(&["*"]);

        assert!(m.matches("anything.at.all"));
    }

    #[test]
    fn test_blank_patterns_are_dropped() {
        let m = matcher(&["", "   ", "example.com"]);

        assert!(!m.matches("trailing."));
        assert!(!m.matches(""));
        assert!(m.matches("example.com"));
    }

    #[test]
    fn test_empty_matcher_matches_nothing() {
        let m = matcher(&[]);

        assert!(!m.matches("mail.ru"));
        assert!(!m.matches(""));
    }

    #[test]
    fn test_wildcard_to_regex_shape() {
        let regex = wildcard_to_regex("*.example.org").unwrap();
        assert_eq!(regex.as_str(), r"^.*\.example\.org$");
    }

    #[test]
    fn test_hostname_from_url() {
        assert_eq!(
            hostname_from_url("https://Sub.Mail.ru:8443/inbox?x=1"),
            Some("sub.mail.ru".to_string())
        );
        assert_eq!(
            hostname_from_url("http://127.0.0.1:8080/"),
            Some("127.0.0.1".to_string())
        );
    }

    #[test]
    fn test_hostname_from_url_without_host() {
        assert_eq!(hostname_from_url("about:blank"), None);
        assert_eq!(hostname_from_url("data:text/plain,Stuff"), None);
    }

    #[test]
    fn test_hostname_from_malformed_url() {
        assert_eq!(hostname_from_url(""), None);
        assert_eq!(hostname_from_url("not a url"), None);
        assert_eq!(hostname_from_url("https://"), None);
    }

    #[test]
    fn test_is_domain_monitored_example() {
        let domains = vec!["mail.ru".to_string(), "*.example.org".to_string()];

        assert!(is_domain_monitored("https://sub.mail.ru/", domains.as_slice()));
        assert!(!is_domain_monitored("https://evilmail.ru/", domains.as_slice()));
        assert!(is_domain_monitored("https://a.b.example.org/page", domains.as_slice()));
    }

    #[test]
    fn test_is_domain_monitored_malformed_url() {
        let domains = vec!["mail.ru".to_string()];

        assert!(!is_domain_monitored("mail.ru", domains.as_slice()));
        assert!(!is_domain_monitored("::::", domains.as_slice()));
    }
}
