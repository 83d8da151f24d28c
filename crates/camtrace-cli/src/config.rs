use std::fs;
use std::path::Path;

use camtrace_types::{AnalysisConfig, HostnamePattern, IpRolePattern};
use serde::Deserialize;

use crate::error::CliError;

/// Mirrors [`AnalysisConfig`], but every field is optional so a file only
/// needs to name the tunables it overrides.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    approved_ciphers: Option<Vec<u16>>,
    hostname_role_patterns: Option<Vec<HostnamePattern>>,
    ip_role_patterns: Option<Vec<IpRolePattern>>,
    role_detection_item_cap: Option<usize>,
    max_gap_seconds_default: Option<i64>,
}

/// Load [`AnalysisConfig`], starting from its defaults and layering a TOML
/// file's overrides on top when one is given.
pub fn load(path: Option<&Path>) -> Result<AnalysisConfig, CliError> {
    let mut config = AnalysisConfig::default();

    let Some(path) = path else {
        return Ok(config);
    };

    let text = fs::read_to_string(path)
        .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
    let file: ConfigFile =
        toml::from_str(&text).map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;

    if let Some(v) = file.approved_ciphers {
        config.approved_ciphers = v;
    }
    if let Some(v) = file.hostname_role_patterns {
        config.hostname_role_patterns = v;
    }
    if let Some(v) = file.ip_role_patterns {
        config.ip_role_patterns = v;
    }
    if let Some(v) = file.role_detection_item_cap {
        config.role_detection_item_cap = v;
    }
    if let Some(v) = file.max_gap_seconds_default {
        config.max_gap_seconds_default = v;
    }

    Ok(config)
}
