use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use nmap_pilot_core::{
    catalog, NmapCommand, ProcessRunner, ScanSession, ScanStatus, StdoutSink, Target,
};
use tracing_subscriber::EnvFilter;

mod menu;
mod privileges;
mod settings;
mod ui;

#[derive(Parser, Debug)]
#[command(
    name = "nmap-pilot",
    author,
    version,
    about = "Interactive menu front-end for Nmap"
)]
struct Cli {
    /// Path to the nmap executable
    #[arg(long = "nmap-path", value_name = "PATH", global = true)]
    nmap_path: Option<String>,

    /// Directory where generated scan output files are placed
    #[arg(long = "output-dir", value_name = "DIR", global = true)]
    output_dir: Option<PathBuf>,

    /// Optional settings file (nmap_path, output_dir)
    #[arg(long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the scan category catalog
    Categories {
        /// Emit the catalog as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
    /// Run a single scan non-interactively with explicit nmap flags
    Run {
        /// IPv4 address or CIDR range to scan
        target: String,
        /// Flags passed through to nmap; a verbosity flag is ensured
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        flags: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = settings::Settings::load(
        cli.config.as_deref(),
        cli.nmap_path.clone(),
        cli.output_dir.clone(),
    )?;

    let session = ScanSession::new();
    spawn_interrupt_watcher(session.clone());

    match cli.command {
        Some(Commands::Categories { json }) => list_categories(json)?,
        Some(Commands::Run { target, flags }) => {
            run_once(&settings, &session, &target, flags).await?
        }
        None => menu::run(&settings, &session).await?,
    }
    Ok(())
}

/// Forward Ctrl+C to the running child through the session handle. With no
/// scan in flight the interrupt simply ends the program.
fn spawn_interrupt_watcher(session: ScanSession) {
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            if session.is_scanning() {
                session.request_termination();
            } else {
                ui::print_error("Interrupted. Exiting...");
                std::process::exit(130);
            }
        }
    });
}

fn list_categories(json: bool) -> Result<()> {
    let summaries = catalog::summaries();
    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("{} scan categories available", summaries.len());
    for category in summaries {
        println!(
            "- {id:<18} {title}",
            id = category.id,
            title = category.title
        );
        for option in category.options {
            println!("    * {option}");
        }
    }
    Ok(())
}

async fn run_once(
    settings: &settings::Settings,
    session: &ScanSession,
    target: &str,
    flags: Vec<String>,
) -> Result<()> {
    let target: Target = target.parse()?;
    let mut command = NmapCommand::new(target);
    command.extend_flags(flags);

    let runner = ProcessRunner::new(&settings.nmap_path);
    println!(
        "\n{}\n",
        format!(">>> Running Nmap Scan: {} {} <<<", runner.program(), command)
            .cyan()
            .bold()
    );

    let status = runner
        .run(&command, session, &mut StdoutSink)
        .await
        .context("scan failed")?;
    match status {
        ScanStatus::Completed { exit_code, stderr } => {
            if let Some(message) = stderr {
                ui::print_error(&message);
            }
            if let Some(code) = exit_code.filter(|code| *code != 0) {
                ui::print_warning(&format!("nmap exited with status {code}"));
            }
        }
        ScanStatus::Interrupted => {
            ui::print_error("Scan interrupted. Exiting...");
            std::process::exit(130);
        }
    }
    Ok(())
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tokio=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init();
}
