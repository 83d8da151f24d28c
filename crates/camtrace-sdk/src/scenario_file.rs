use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use camtrace_types::{GapConstraints, Scenario, ScenarioStep};

use crate::error::{Error, Result};

/// A step written as either a bare string (shorthand for a Required step
/// matching that type) or a full step object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StepEntry {
    Shorthand(String),
    Full(ScenarioStep),
}

impl From<StepEntry> for ScenarioStep {
    fn from(entry: StepEntry) -> Self {
        match entry {
            StepEntry::Shorthand(type_name) => ScenarioStep::required(type_name),
            StepEntry::Full(step) => step,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScenarioEntry {
    sequence: Vec<StepEntry>,
    #[serde(default)]
    constraints: GapConstraints,
}

#[derive(Debug, Deserialize)]
struct ScenarioFileRaw {
    scenarios: HashMap<String, ScenarioEntry>,
    selected_scenario: Option<String>,
}

/// A parsed scenario config file: a named table of scenarios plus an
/// optional default selection.
#[derive(Debug, Clone)]
pub struct ScenarioFile {
    scenarios: HashMap<String, Scenario>,
    selected_scenario: Option<String>,
}

impl ScenarioFile {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let raw: ScenarioFileRaw =
            serde_json::from_slice(bytes).map_err(|e| Error::InvalidScenarioFile(e.to_string()))?;

        let mut scenarios = HashMap::with_capacity(raw.scenarios.len());
        for (name, entry) in raw.scenarios {
            if entry.sequence.is_empty() {
                return Err(Error::InvalidScenarioFile(format!(
                    "scenario {name:?} has an empty sequence"
                )));
            }
            let sequence = entry.sequence.into_iter().map(ScenarioStep::from).collect();
            scenarios.insert(name, Scenario { sequence, constraints: entry.constraints });
        }

        Ok(Self { scenarios, selected_scenario: raw.selected_scenario })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| Error::InvalidScenarioFile(e.to_string()))?;
        Self::from_json(&bytes)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Result<&Scenario> {
        self.scenarios.get(name).ok_or_else(|| Error::UnknownScenario(name.to_string()))
    }

    /// The file's declared `selected_scenario`, if any.
    pub fn selected(&self) -> Result<&Scenario> {
        let name = self
            .selected_scenario
            .as_deref()
            .ok_or_else(|| Error::InvalidScenarioFile("no selected_scenario set".to_string()))?;
        self.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camtrace_types::Presence;

    const FILE: &str = r#"{
        "scenarios": {
            "happy": {
                "sequence": ["DNSbyME", "DNS", {"kind": "TAC", "presence": "required"}],
                "constraints": {"max_gap_enabled": true, "max_gap_seconds": 30, "max_gap_on_unknown": "warn", "max_gap_on_violation": "fail"}
            }
        },
        "selected_scenario": "happy"
    }"#;

    #[test]
    fn shorthand_strings_become_required_type_steps() {
        let file = ScenarioFile::from_json(FILE.as_bytes()).unwrap();
        let scenario = file.get("happy").unwrap();
        assert_eq!(scenario.sequence.len(), 3);
        assert_eq!(scenario.sequence[0].presence, Presence::Required);
    }

    #[test]
    fn selected_scenario_resolves_by_name() {
        let file = ScenarioFile::from_json(FILE.as_bytes()).unwrap();
        let scenario = file.selected().unwrap();
        assert_eq!(scenario.sequence.len(), 3);
    }

    #[test]
    fn unknown_scenario_name_is_an_error() {
        let file = ScenarioFile::from_json(FILE.as_bytes()).unwrap();
        assert!(matches!(file.get("missing"), Err(Error::UnknownScenario(_))));
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let bad = r#"{"scenarios": {"empty": {"sequence": []}}, "selected_scenario": null}"#;
        assert!(ScenarioFile::from_json(bad.as_bytes()).is_err());
    }
}
