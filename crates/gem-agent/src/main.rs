//! Gem agent binary: extension discovery at startup plus the interactive
//! command loop used to inspect and toggle extensions for the session.

mod commands;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use gem_cli::Cli;
use gem_extensions::{
    discover_extensions, render_extensions_list, ExtensionDiagnostic, ExtensionDiagnosticLevel,
    ExtensionSessionRuntime,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::commands::{handle_command, CommandAction};

const REPL_PROMPT: &str = "gem> ";

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn resolve_home_dir() -> Result<PathBuf> {
    for variable in ["HOME", "USERPROFILE"] {
        if let Ok(value) = std::env::var(variable) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }
    }
    bail!("unable to resolve the user home directory (HOME/USERPROFILE unset)");
}

fn report_diagnostics(diagnostics: &[ExtensionDiagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.level {
            ExtensionDiagnosticLevel::Info => println!("{}", diagnostic.message),
            ExtensionDiagnosticLevel::Warning => tracing::warn!("{}", diagnostic.message),
        }
    }
}

async fn run_cli(cli: Cli) -> Result<()> {
    let home_dir = match cli.home_override.clone() {
        Some(home_dir) => home_dir,
        None => resolve_home_dir()?,
    };

    let discovery = discover_extensions(&cli.workspace_root, &home_dir);
    report_diagnostics(&discovery.diagnostics);

    let mut runtime = ExtensionSessionRuntime::new(
        discovery.extensions,
        cli.extensions,
        cli.additional_extensions,
    );

    let activation = runtime.active_extensions();
    report_diagnostics(&activation.diagnostics);

    if cli.list_extensions {
        println!("{}", render_extensions_list(&runtime));
        return Ok(());
    }

    if let Some(command) = cli.command.as_deref() {
        handle_command(command, &mut runtime)?;
        return Ok(());
    }

    run_interactive_loop(&mut runtime).await
}

async fn run_interactive_loop(runtime: &mut ExtensionSessionRuntime) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_prompt()?;
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            match handle_command(trimmed, runtime)? {
                CommandAction::Continue => {}
                CommandAction::Exit => break,
            }
        }
        print_prompt()?;
    }
    Ok(())
}

fn print_prompt() -> Result<()> {
    print!("{REPL_PROMPT}");
    std::io::stdout().flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run_cli(cli).await
}
