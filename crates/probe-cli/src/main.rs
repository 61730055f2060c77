//! mcp-probe - Validation and troubleshooting CLI for Neo4j MCP servers.

use clap::Parser;
use probe_cli::cli::MenuArgs;
use probe_cli::config::{env_file_arg, load_env};
use probe_cli::{menu, suites};
use probe_cli::{Cli, Command, Formatter, Settings, SuiteContext};
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // .env must be loaded before clap reads its env fallbacks
    if let Err(e) = load_env(env_file_arg(std::env::args()).as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::load().unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable settings");
        Settings::default()
    });

    let format = cli.format.map(Into::into).unwrap_or(settings.format);
    let color_enabled = !cli.no_color && settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let mut ctx = SuiteContext::new(formatter, &settings);
    ctx.endpoint = cli.endpoint;
    ctx.mcp_path = cli.mcp_path;
    if let Some(secs) = cli.timeout {
        ctx.timeout = Duration::from_secs(secs);
    }

    let code = match run(cli.command, &ctx).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", ctx.formatter.error(&format!("Error: {}", e)));
            if let Some(diagnosis) = e.diagnosis() {
                eprintln!("Diagnosis: {}", diagnosis);
            }
            1
        }
    };
    std::process::exit(code);
}

/// Run the command (the menu when none is given) and return the exit code.
async fn run(command: Option<Command>, ctx: &SuiteContext) -> probe_cli::Result<i32> {
    let results = match command.unwrap_or(Command::Menu(MenuArgs::default())) {
        Command::Menu(args) => menu::run(&args, ctx).await?,
        command => suites::execute(command, ctx).await?,
    };

    match results {
        Some(results) => {
            println!("{}", ctx.formatter.summary(&results)?);
            Ok(results.exit_code())
        }
        None => Ok(0),
    }
}

/// Log to stderr; `RUST_LOG` wins unless `-v` asks for debug.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
