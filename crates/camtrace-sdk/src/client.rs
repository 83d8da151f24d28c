use std::path::Path;

use camtrace_ingest::CancelCheck;
use camtrace_types::{
    AnalysisConfig, ChannelSession, Direction, Pairing, Scenario, ScenarioResult, TimelineRow,
    TlsMessage, TlsRecord, TraceModel, ValidationIssue,
};

use crate::error::Result;

/// A loaded trace paired with the configuration every derived analysis reads.
/// Every method is read-only and may be called in any order or repeatedly;
/// stages never mutate the underlying model.
pub struct Trace {
    model: TraceModel,
    config: AnalysisConfig,
}

impl Trace {
    /// Load a Universal-Tracer XML file from disk.
    pub fn load(path: &Path, cancel: CancelCheck<'_>) -> Result<Self> {
        let model = camtrace_ingest::load(path, cancel)?;
        Ok(Self { model, config: AnalysisConfig::default() })
    }

    /// Load Universal-Tracer XML already held in memory.
    pub fn load_bytes(bytes: &[u8], cancel: CancelCheck<'_>) -> Result<Self> {
        let model = camtrace_ingest::load_bytes(bytes, cancel)?;
        Ok(Self { model, config: AnalysisConfig::default() })
    }

    /// Replace the default [`AnalysisConfig`] (role tables, approved ciphers,
    /// role-detection item cap) used by every subsequent analysis call.
    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn model(&self) -> &TraceModel {
        &self.model
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn pairs(&self) -> Pairing {
        camtrace_engine::pairs(&self.model)
    }

    pub fn sessions(&self) -> (Vec<ChannelSession>, Vec<ValidationIssue>) {
        camtrace_engine::sessions(&self.model, &self.config)
    }

    pub fn session_tls(&self, session: &ChannelSession) -> Vec<(Direction, Vec<TlsRecord>, Vec<TlsMessage>)> {
        camtrace_engine::session_tls(&self.model, session)
    }

    pub fn tls_flow(&self, session: &ChannelSession, direction: Direction) -> (Vec<TlsRecord>, Vec<TlsMessage>) {
        camtrace_engine::tls_flow(&self.model, session, direction)
    }

    pub fn validate(&self) -> Vec<ValidationIssue> {
        camtrace_engine::validate(&self.model, &self.config)
    }

    pub fn flow(&self) -> Vec<TimelineRow> {
        camtrace_engine::flow(&self.model, &self.config)
    }

    pub fn run_scenario(&self, scenario: &Scenario) -> Result<ScenarioResult> {
        Ok(camtrace_engine::run_scenario(&self.model, scenario, &self.config)?)
    }
}
