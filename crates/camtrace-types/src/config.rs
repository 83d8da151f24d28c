use serde::{Deserialize, Serialize};

/// Hostname substring -> role pattern, evaluated case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostnamePattern {
    pub substring: String,
    pub role: crate::session::Role,
}

/// IP/CIDR prefix -> role table entry. The prefix is matched as a
/// literal string prefix against dotted IPv4 text; full CIDR math is out of
/// scope for this configurable, externally-supplied table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpRolePattern {
    pub prefix: String,
    pub role: crate::session::Role,
}

/// All tunables collected into a single immutable value. Passed by reference into every engine entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Approved TLS cipher suites for the compliance check; empty disables it.
    pub approved_ciphers: Vec<u16>,
    pub hostname_role_patterns: Vec<HostnamePattern>,
    pub ip_role_patterns: Vec<IpRolePattern>,
    /// Role detection processes at most the first N items of a session's TLS stream.
    pub role_detection_item_cap: usize,
    pub max_gap_seconds_default: i64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        use crate::session::Role;
        Self {
            approved_ciphers: Vec::new(),
            hostname_role_patterns: vec![
                HostnamePattern { substring: "smdpplus".into(), role: Role::SmDpPlus },
                HostnamePattern { substring: "smdp".into(), role: Role::SmDpPlus },
                HostnamePattern { substring: "smds".into(), role: Role::SmDs },
                HostnamePattern { substring: "dpplus".into(), role: Role::Eim },
                HostnamePattern { substring: "eim".into(), role: Role::Eim },
                HostnamePattern { substring: "tac.".into(), role: Role::Tac },
                HostnamePattern { substring: "thales".into(), role: Role::Tac },
            ],
            ip_role_patterns: Vec::new(),
            role_detection_item_cap: 20,
            max_gap_seconds_default: 30,
        }
    }
}

impl AnalysisConfig {
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder(Self::default())
    }

    /// Resolve the role for an SNI hostname by the configured pattern table,
    /// in priority (insertion) order, matching case-insensitive substrings.
    pub fn role_for_hostname(&self, hostname: &str) -> Option<crate::session::Role> {
        let lower = hostname.to_ascii_lowercase();
        self.hostname_role_patterns
            .iter()
            .find(|p| lower.contains(&p.substring.to_ascii_lowercase()))
            .map(|p| p.role)
    }

    pub fn role_for_ip(&self, ip: &str) -> Option<crate::session::Role> {
        self.ip_role_patterns
            .iter()
            .find(|p| ip.starts_with(&p.prefix))
            .map(|p| p.role)
    }
}

/// Small fluent builder, mirroring the configuration layering the CLI applies
/// (defaults, overridden by a TOML file, overridden by flags).
pub struct AnalysisConfigBuilder(AnalysisConfig);

impl AnalysisConfigBuilder {
    pub fn approved_ciphers(mut self, ciphers: Vec<u16>) -> Self {
        self.0.approved_ciphers = ciphers;
        self
    }

    pub fn role_detection_item_cap(mut self, cap: usize) -> Self {
        self.0.role_detection_item_cap = cap;
        self
    }

    pub fn max_gap_seconds_default(mut self, secs: i64) -> Self {
        self.0.max_gap_seconds_default = secs;
        self
    }

    pub fn build(self) -> AnalysisConfig {
        self.0
    }
}
