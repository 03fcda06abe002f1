/// Persisted settings and popup-side editing of the monitored domain list
use serde::{Deserialize, Serialize};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Native messaging host name (must match the host manifest)
pub const NATIVE_HOST_NAME: &str = "com.wiresock.launcher";

pub const STORAGE_KEY_DOMAINS: &str = "domains";
pub const STORAGE_KEY_CONFIG_PATH: &str = "configPath";

/// Seeded on first install when no list is stored
pub const DEFAULT_DOMAINS: [&str; 2] = ["mail.ru", "example.com"];

/// Sent to the native host when no profile path has been saved
pub const DEFAULT_CONFIG_PATH: &str = r"C:\path\to\config.conf";

/// Hostname used by the popup's "Test connection" button
pub const TEST_DOMAIN: &str = "test-domain.com";

pub const NOTIFICATION_ICON: &str = "icons/icon48.png";

/// How long popup status messages stay visible
pub const MESSAGE_TIMEOUT_MS: u64 = 3000;

/// Contents of `chrome.storage.sync`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
}

impl Settings {
    pub fn with_domains(domains: &[String]) -> Settings {
        Settings {
            domains: Some(domains.to_vec()),
            config_path: None,
        }
    }

    pub fn with_config_path(config_path: &str) -> Settings {
        Settings {
            domains: None,
            config_path: Some(config_path.to_string()),
        }
    }

    /// Saved profile path, or the placeholder when unset or blank
    pub fn config_path_or_default(&self) -> String {
        self.config_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_CONFIG_PATH)
            .to_string()
    }
}

pub fn default_domains() -> Vec<String> {
    DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect()
}

/// Rejected popup input, displayed to the user as-is
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Enter a domain")]
    Empty,

    #[error("Invalid domain format: {0}")]
    InvalidFormat(String),

    #[error("Domain already added: {0}")]
    Duplicate(String),

    #[error("Enter the path to the configuration file")]
    EmptyConfigPath,
}

// Labels of [a-z0-9-*], no leading/trailing '-', alphabetic or '*' TLD.
static DOMAIN_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    let label = r"[a-z0-9*](?:[a-z0-9*-]{0,61}[a-z0-9*])?";
    Regex::new(&format!(r"^{label}(?:\.{label})*\.(?:[a-z]{{2,}}|\*)$"))
        .expect("domain format pattern is valid")
});

/// Normalize user input into a monitored-domain pattern
pub fn validate_domain(input: &str) -> Result<String, InputError> {
    let domain = input.trim().to_lowercase();
    if domain.is_empty() {
        return Err(InputError::Empty);
    }

    let well_formed = domain.len() <= 253 && DOMAIN_FORMAT.is_match(&domain);

    if well_formed {
        Ok(domain)
    } else {
        Err(InputError::InvalidFormat(input.trim().to_string()))
    }
}

pub fn validate_config_path(input: &str) -> Result<String, InputError> {
    let path = input.trim();
    if path.is_empty() {
        Err(InputError::EmptyConfigPath)
    } else {
        Ok(path.to_string())
    }
}

/// The popup's editable copy of the monitored set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainList {
    pub domains: Vec<String>,
}

impl DomainList {
    pub fn new(domains: Vec<String>) -> Self {
        DomainList { domains }
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.domains.iter().any(|d| d.eq_ignore_ascii_case(domain))
    }

    /// Validate and append; returns the stored form
    pub fn add(&mut self, input: &str) -> Result<String, InputError> {
        let domain = validate_domain(input)?;
        if self.contains(&domain) {
            return Err(InputError::Duplicate(domain));
        }

        self.domains.push(domain.clone());
        Ok(domain)
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.domains.len() {
            Some(self.domains.remove(index))
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_settings_from_empty_store() {
        let settings: Settings = serde_json::from_value(json!({})).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.config_path_or_default(), DEFAULT_CONFIG_PATH);
    }

    #[test]
    fn test_settings_from_store() {
        let settings: Settings = serde_json::from_value(json!({
            "domains": ["mail.ru"],
            "configPath": r"C:\vpn\work.conf"
        }))
        .unwrap();

        assert_eq!(settings.domains, Some(vec!["mail.ru".to_string()]));
        assert_eq!(settings.config_path_or_default(), r"C:\vpn\work.conf");
    }

    #[test]
    fn test_blank_config_path_falls_back() {
        let settings = Settings::with_config_path("   ");
        assert_eq!(settings.config_path_or_default(), DEFAULT_CONFIG_PATH);
    }

    #[test]
    fn test_partial_settings_serialize_only_their_key() {
        let domains = vec!["mail.ru".to_string()];

        assert_eq!(
            serde_json::to_value(Settings::with_domains(&domains)).unwrap(),
            json!({ "domains": ["mail.ru"] })
        );
        assert_eq!(
            serde_json::to_value(Settings::with_config_path("/etc/wg.conf")).unwrap(),
            json!({ "configPath": "/etc/wg.conf" })
        );
    }

    #[test]
    fn test_validate_domain_accepts() {
        assert_eq!(validate_domain("mail.ru"), Ok("mail.ru".to_string()));
        assert_eq!(validate_domain("  Sub.Example.COM "), Ok("sub.example.com".to_string()));
        assert_eq!(validate_domain("*.example.org"), Ok("*.example.org".to_string()));
        assert_eq!(validate_domain("mail.*"), Ok("mail.*".to_string()));
        assert_eq!(validate_domain("my-site.co.uk"), Ok("my-site.co.uk".to_string()));
    }

    #[test]
    fn test_validate_domain_rejects() {
        assert_eq!(validate_domain(""), Err(InputError::Empty));
        assert_eq!(validate_domain("   "), Err(InputError::Empty));

        for bad in [
            "localhost",
            "-bad.com",
            "bad-.com",
            "exa mple.com",
            "example.c0m",
            "http://example.com",
            "example..com",
        ] {
            assert_eq!(
                validate_domain(bad),
                Err(InputError::InvalidFormat(bad.to_string())),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_validate_config_path() {
        assert_eq!(validate_config_path("  /etc/wg.conf "), Ok("/etc/wg.conf".to_string()));
        assert_eq!(validate_config_path(" "), Err(InputError::EmptyConfigPath));
    }

    #[test]
    fn test_domain_list_add() {
        let mut list = DomainList::new(default_domains());

        assert_eq!(list.add("Proton.Me"), Ok("proton.me".to_string()));
        assert_eq!(list.domains, vec!["mail.ru", "example.com", "proton.me"]);
    }

    #[test]
    fn test_domain_list_rejects_duplicates() {
        let mut list = DomainList::new(vec!["mail.ru".to_string()]);

        assert_eq!(
            list.add("MAIL.RU"),
            Err(InputError::Duplicate("mail.ru".to_string()))
        );
        assert_eq!(list.domains.len(), 1);
    }

    #[test]
    fn test_domain_list_remove() {
        let mut list = DomainList::new(default_domains());

        assert_eq!(list.remove(0), Some("mail.ru".to_string()));
        assert_eq!(list.remove(5), None);
        assert_eq!(list.domains, vec!["example.com"]);
    }

    #[test]
    fn test_domain_format_compiles() {
        assert!(DOMAIN_FORMAT.is_match("mail.ru"));
        assert!(!DOMAIN_FORMAT.is_match("mail"));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(InputError::Empty.to_string(), "Enter a domain");
        assert_eq!(
            InputError::Duplicate("mail.ru".to_string()).to_string(),
            "Domain already added: mail.ru"
        );
    }
}
