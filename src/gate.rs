/// Launch gate: decides which navigations start a tunnel launch
use crate::matcher::{DomainMatcher, hostname_from_url};
use crate::protocol::NavigationDetails;
use std::collections::HashSet;

/// Outcome of checking a navigation against the gate
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationDecision {
    /// Sub-frame navigation, never considered
    SubFrame,
    /// URL without a usable hostname
    Unparseable,
    NotMonitored(String),
    /// A launch already succeeded for this hostname this session
    AlreadyActive(String),
    /// A launch for this hostname is waiting on the native host
    InFlight(String),
    Launch(String),
}

/// Monitored set plus per-session launch bookkeeping
///
/// Created empty of connections on every extension start; mutated only
/// through its methods.
#[derive(Debug, Clone, Default)]
pub struct LaunchGate {
    domains: Vec<String>,
    matcher: DomainMatcher,
    active: HashSet<String>,
    in_flight: HashSet<String>,
}

impl LaunchGate {
    pub fn new(domains: Vec<String>) -> LaunchGate {
        LaunchGate {
            matcher: DomainMatcher::new(domains.as_slice()),
            domains,
            active: HashSet::new(),
            in_flight: HashSet::new(),
        }
    }

    /// Replace the monitored set; connection state is kept
    pub fn set_domains(&mut self, domains: Vec<String>) {
        self.matcher = DomainMatcher::new(domains.as_slice());
        self.domains = domains;
    }

    /// Monitored patterns in display order
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn is_monitored(&self, hostname: &str) -> bool {
        self.matcher.matches(hostname)
    }

    pub fn is_active(&self, hostname: &str) -> bool {
        self.active.contains(hostname)
    }

    pub fn is_in_flight(&self, hostname: &str) -> bool {
        self.in_flight.contains(hostname)
    }

    /// Active hostnames, sorted for display
    pub fn active_connections(&self) -> Vec<String> {
        let mut active: Vec<String> = self.active.iter().cloned().collect();
        active.sort();
        active
    }

    /// Classify a navigation without changing state
    pub fn evaluate(&self, details: &NavigationDetails) -> NavigationDecision {
        if !details.is_top_level() {
            return NavigationDecision::SubFrame;
        }

        let Some(hostname) = hostname_from_url(&details.url) else {
            return NavigationDecision::Unparseable;
        };

        if !self.is_monitored(&hostname) {
            NavigationDecision::NotMonitored(hostname)
        } else if self.is_active(&hostname) {
            NavigationDecision::AlreadyActive(hostname)
        } else if self.is_in_flight(&hostname) {
            NavigationDecision::InFlight(hostname)
        } else {
            NavigationDecision::Launch(hostname)
        }
    }

    /// Evaluate a navigation and reserve the launch when one is due
    pub fn admit(&mut self, details: &NavigationDetails) -> NavigationDecision {
        let decision = self.evaluate(details);
        if let NavigationDecision::Launch(hostname) = &decision {
            self.begin_launch(hostname);
        }
        decision
    }

    /// Mark a launch as waiting on the native host
    pub fn begin_launch(&mut self, hostname: &str) {
        self.in_flight.insert(hostname.to_string());
    }

    /// Record the native host's answer; failures stay retryable
    pub fn complete_launch(&mut self, hostname: &str, succeeded: bool) {
        self.in_flight.remove(hostname);
        if succeeded {
            self.active.insert(hostname.to_string());
        }
    }
}
