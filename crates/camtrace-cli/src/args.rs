use std::fmt;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum SeverityArg {
    Info,
    Warning,
    Critical,
}

#[derive(Parser)]
#[command(name = "camtrace")]
#[command(about = "Inspect and analyze Universal-Tracer SIM/eUICC trace files", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Optional TOML file of AnalysisConfig overrides, layered under any CLI flags.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct TraceArgs {
    /// Universal-Tracer XML trace file.
    pub trace: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ParsingLogArgs {
    pub trace: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Show every issue regardless of severity/category/time filters.
    #[arg(long)]
    pub all: bool,

    #[arg(long = "severity", value_enum)]
    pub severities: Vec<SeverityArg>,

    #[arg(long = "category")]
    pub categories: Vec<String>,

    #[arg(long)]
    pub since: Option<String>,

    #[arg(long)]
    pub until: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ScenarioArgs {
    /// List the scenario names defined in the given scenario config file.
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Scenario config file (JSON): `{ scenarios: { name: { sequence, constraints } } }`.
    #[arg(long)]
    pub scenarios: PathBuf,

    /// Scenario name to run. Required unless --list.
    pub name: Option<String>,

    /// Trace file to evaluate the scenario against. Required unless --list.
    pub trace: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Full chronological timeline: sessions and events together.
    FlowOverview(TraceArgs),
    /// Timeline filtered to session rows only.
    FlowSessions(TraceArgs),
    /// Timeline filtered to event rows only.
    FlowEvents(TraceArgs),
    /// Validation issues, optionally filtered by severity/category/time.
    ParsingLog(ParsingLogArgs),
    /// The ICCID decoded from the trace, if any.
    Iccid(TraceArgs),
    /// Aggregate counts: items, sessions, pairs, issues by severity.
    Stats(TraceArgs),
    /// List or run a declarative scenario against a trace.
    Scenario(ScenarioArgs),
}
