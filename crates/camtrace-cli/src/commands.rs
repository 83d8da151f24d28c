use camtrace_types::FlowFilter;

use crate::args::{Cli, Commands};
use crate::config;
use crate::error::{CliError, Result};
use crate::handlers;
use crate::presentation;

/// Exit code contract: `0` success, `2` invalid input, `3` invalid trace XML,
/// `4` a scenario run that completed but evaluated to `Fail`.
pub fn run(cli: Cli) -> Result<i32> {
    let global_config = cli.config.as_deref();
    match cli.command {
        Commands::FlowOverview(args) => run_flow(global_config, args, FlowFilter::All),
        Commands::FlowSessions(args) => run_flow(global_config, args, FlowFilter::Sessions),
        Commands::FlowEvents(args) => run_flow(global_config, args, FlowFilter::Events),
        Commands::ParsingLog(args) => run_parsing_log(global_config, args),
        Commands::Iccid(args) => run_iccid(global_config, args),
        Commands::Stats(args) => run_stats(global_config, args),
        Commands::Scenario(args) => run_scenario(global_config, args),
    }
}

fn run_flow(global_config: Option<&std::path::Path>, args: crate::args::TraceArgs, filter: FlowFilter) -> Result<i32> {
    let analysis_config = config::load(global_config)?;
    let rows = handlers::flow::run(&args.trace, analysis_config, filter)?;
    presentation::emit(
        args.format,
        presentation::text::flow(&rows),
        presentation::json::flow(&rows),
        args.out.as_deref(),
    )?;
    Ok(0)
}

fn run_parsing_log(global_config: Option<&std::path::Path>, args: crate::args::ParsingLogArgs) -> Result<i32> {
    let analysis_config = config::load(global_config)?;
    let issues = handlers::parsing_log::run(
        &args.trace,
        analysis_config,
        args.all,
        &args.severities,
        &args.categories,
        args.since.as_deref(),
        args.until.as_deref(),
    )?;
    presentation::emit(
        args.format,
        presentation::text::issues(&issues),
        presentation::json::issues(&issues),
        args.out.as_deref(),
    )?;
    Ok(0)
}

fn run_iccid(global_config: Option<&std::path::Path>, args: crate::args::TraceArgs) -> Result<i32> {
    let analysis_config = config::load(global_config)?;
    let iccid = handlers::iccid::run(&args.trace, analysis_config)?;
    presentation::emit(
        args.format,
        presentation::text::iccid(&iccid),
        presentation::json::iccid(&iccid),
        args.out.as_deref(),
    )?;
    Ok(0)
}

fn run_stats(global_config: Option<&std::path::Path>, args: crate::args::TraceArgs) -> Result<i32> {
    let analysis_config = config::load(global_config)?;
    let stats = handlers::stats::run(&args.trace, analysis_config)?;
    presentation::emit(
        args.format,
        presentation::text::stats(&stats),
        presentation::json::stats(&stats),
        args.out.as_deref(),
    )?;
    Ok(0)
}

fn run_scenario(global_config: Option<&std::path::Path>, args: crate::args::ScenarioArgs) -> Result<i32> {
    if args.list {
        let names = handlers::scenario::list(&args.scenarios)?;
        presentation::emit(
            args.format,
            presentation::text::scenario_names(&names),
            presentation::json::scenario_names(&names),
            args.out.as_deref(),
        )?;
        return Ok(0);
    }

    let name = args
        .name
        .as_deref()
        .ok_or_else(|| CliError::InvalidInput("scenario: <name> is required unless --list is given".to_string()))?;
    let trace = args
        .trace
        .as_deref()
        .ok_or_else(|| CliError::InvalidInput("scenario: <trace> is required unless --list is given".to_string()))?;

    let analysis_config = config::load(global_config)?;
    let result = handlers::scenario::run(&args.scenarios, name, trace, analysis_config)?;

    presentation::emit(
        args.format,
        presentation::text::scenario_result(&result),
        presentation::json::scenario_result(&result),
        args.out.as_deref(),
    )?;

    if result.overall == camtrace_types::StepOutcome::Fail {
        Ok(4)
    } else {
        Ok(0)
    }
}
