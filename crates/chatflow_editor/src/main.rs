// SPDX-License-Identifier: MIT OR Apache-2.0
//! Chatbot Flow Builder - headless editor
//!
//! Drives the flow builder core without a canvas:
//! - Validate saved flows (JSON or RON)
//! - Replay scripted editing sessions
//!
//! ## Architecture
//!
//! All flow rules live in `chatflow_graph`. This binary wires them to an
//! `EditorSession` with settings loaded from RON and a save sink chosen on
//! the command line.

use chatflow_editor::commands;
use chatflow_editor::settings::{EditorSettings, SETTINGS_FILE_NAME};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Chatbot flow builder command line
#[derive(Parser, Debug)]
#[command(name = "chatflow_editor", version, about, long_about = None)]
struct Cli {
    /// Editor settings file
    #[arg(long, global = true, default_value = SETTINGS_FILE_NAME)]
    config: PathBuf,

    /// Require flows to be a single simple path
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a saved flow
    Validate {
        /// Flow file (.json or .ron)
        flow: PathBuf,
    },
    /// Replay a scripted editing session
    Replay {
        /// Script file (.ron)
        script: PathBuf,
        /// Write saved flows here instead of logging them
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("chatflow_editor=debug".parse().unwrap())
        .add_directive("chatflow_graph=info".parse().unwrap());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::info!("Starting chatflow editor v{}", env!("CARGO_PKG_VERSION"));

    let mut settings = match EditorSettings::load_or_default(&cli.config) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Could not load settings from {:?}: {e}", cli.config);
            return ExitCode::FAILURE;
        }
    };
    if cli.strict {
        settings.validation_mode = chatflow_graph::ValidationMode::Strict;
    }

    match cli.command {
        Command::Validate { flow } => match commands::validate_file(&flow, &settings) {
            Ok(report) => {
                println!("{}", commands::describe(&report));
                if report.valid {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                }
            }
            Err(e) => {
                tracing::error!("Validation of {:?} failed: {e}", flow);
                ExitCode::FAILURE
            }
        },
        Command::Replay { script, out } => match commands::replay_file(&script, out.as_deref(), &settings) {
            Ok(summary) => {
                println!(
                    "{} steps, {} connections created, {} gestures refused",
                    summary.steps, summary.connections_created, summary.gestures_rejected
                );
                for (i, report) in summary.saves.iter().enumerate() {
                    println!("save #{}: {}", i + 1, commands::describe(report));
                }
                if let Some(status) = summary.final_status {
                    println!("status: {status}");
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!("Replay of {:?} failed: {e}", script);
                ExitCode::FAILURE
            }
        },
    }
}
