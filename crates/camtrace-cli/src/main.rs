use clap::Parser;
use tracing_subscriber::EnvFilter;

use camtrace_cli::args::{Cli, LogLevel};
use camtrace_cli::commands;

fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let exit_code = match commands::run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("error: {err}");
            err.exit_code()
        }
    };

    std::process::exit(exit_code);
}
