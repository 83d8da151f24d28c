use serde::{Deserialize, Serialize};

/// How a step's occurrence count is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Required,
    Optional,
    Forbidden,
}

impl Presence {
    /// Default `(min, max)` per presence
    pub fn default_bounds(&self) -> (usize, usize) {
        match self {
            Presence::Required => (1, 1),
            Presence::Optional => (0, 1),
            Presence::Forbidden => (0, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Segment,
    Global,
}

impl Default for Scope {
    fn default() -> Self {
        Scope::Segment
    }
}

/// Per-step outcome status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Ok,
    Warn,
    Fail,
}

impl StepOutcome {
    /// Never downgrades: returns the worse of `self` and `other`.
    pub fn worse(self, other: StepOutcome) -> StepOutcome {
        use StepOutcome::*;
        match (self, other) {
            (Fail, _) | (_, Fail) => Fail,
            (Warn, _) | (_, Warn) => Warn,
            _ => Ok,
        }
    }
}

/// What a step matches against a timeline row's `type` label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepKind {
    Type(String),
    AnyOf(Vec<String>),
}

impl StepKind {
    pub fn matches(&self, label: &str) -> bool {
        match self {
            StepKind::Type(t) => t == label,
            StepKind::AnyOf(types) => types.iter().any(|t| t == label),
        }
    }
}

/// One step of a declarative scenario sequence.
///
/// A bare JSON string is shorthand for `{kind: Type(string), presence: Required}`
/// (handled at deserialization by the scenario config loader, not here, since
/// serde's untagged/shorthand handling lives with the file format in camtrace-sdk).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub kind: StepKind,
    pub presence: Presence,
    #[serde(default)]
    pub min: Option<usize>,
    #[serde(default)]
    pub max: Option<usize>,
    #[serde(default)]
    pub too_few: Option<StepOutcome>,
    #[serde(default)]
    pub too_many: Option<StepOutcome>,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub label: Option<String>,
}

impl ScenarioStep {
    pub fn required(kind: impl Into<String>) -> Self {
        Self {
            kind: StepKind::Type(kind.into()),
            presence: Presence::Required,
            min: None,
            max: None,
            too_few: None,
            too_many: None,
            scope: Scope::Segment,
            label: None,
        }
    }

    pub fn bounds(&self) -> (usize, usize) {
        let (dmin, dmax) = self.presence.default_bounds();
        (self.min.unwrap_or(dmin), self.max.unwrap_or(dmax))
    }

    /// Default too-few/too-many outcomes per presence
    pub fn default_too_few(&self) -> StepOutcome {
        match self.presence {
            Presence::Required => StepOutcome::Fail,
            Presence::Optional | Presence::Forbidden => StepOutcome::Ok,
        }
    }

    pub fn default_too_many(&self) -> StepOutcome {
        match self.presence {
            Presence::Required => StepOutcome::Fail,
            Presence::Optional => StepOutcome::Warn,
            Presence::Forbidden => StepOutcome::Fail,
        }
    }

    pub fn display_label(&self) -> String {
        self.label.clone().unwrap_or_else(|| match &self.kind {
            StepKind::Type(t) => t.clone(),
            StepKind::AnyOf(types) => types.join("|"),
        })
    }
}

/// Max-gap timing constraints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GapConstraints {
    pub max_gap_enabled: bool,
    pub max_gap_seconds: i64,
    pub max_gap_on_unknown: StepOutcome,
    pub max_gap_on_violation: StepOutcome,
}

impl Default for GapConstraints {
    fn default() -> Self {
        Self {
            max_gap_enabled: false,
            max_gap_seconds: 30,
            max_gap_on_unknown: StepOutcome::Warn,
            max_gap_on_violation: StepOutcome::Fail,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub sequence: Vec<ScenarioStep>,
    pub constraints: GapConstraints,
}

/// Result of evaluating one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub label: String,
    pub status: StepOutcome,
    pub matched_types: Vec<String>,
    pub item_indices: Vec<usize>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub steps: Vec<StepResult>,
    pub overall: StepOutcome,
}
