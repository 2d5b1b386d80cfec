// SPDX-License-Identifier: MIT OR Apache-2.0

//! BraidsTag CLI - Headless game control
//!
//! This binary drives the game state engine from the terminal: operator
//! commands are read one per line from stdin, events are printed as they
//! happen, and the game clock is checked once a second so an elapsed game
//! stops on its own.

use anyhow::{Context, Result};
use braidstag_cli::input::HELP;
use braidstag_cli::render::{describe_change, render_roster};
use braidstag_cli::{parse_line, CliCommand};
use braidstag_core::config::{load_config, load_config_from};
use braidstag_core::{GameEvent, GameState};
use clap::Parser;
use crossbeam_channel::Receiver;
use std::path::PathBuf;
use tokio::io::AsyncBufReadExt;
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(
    name = "braidstag-cli",
    about = "BraidsTag game control command-line interface",
    version
)]
struct Args {
    /// Config file to use instead of the platform default
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Number of teams (overrides the config file)
    #[clap(short, long)]
    teams: Option<u8>,

    /// Game length in seconds (overrides the config file)
    #[clap(long)]
    time: Option<u32>,

    /// Enable debug logging
    #[clap(long)]
    debug: bool,
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let mut config = match args.config.as_deref() {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(teams) = args.teams {
        config.target_team_count = teams;
    }
    if let Some(time) = args.time {
        config.game_time_secs = time;
    }

    let mut state = GameState::new(&config).context("Invalid game settings")?;
    let events = state.channel();
    tracing::info!(
        teams = state.target_team_count(),
        game_time = state.game_time(),
        "Game control ready"
    );

    println!("BraidsTag game control. Type 'help' for commands.");
    print!("{}", render_roster(&state.snapshot()));

    run_control_loop(&mut state, &events).await
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run the main control loop
async fn run_control_loop(
    state: &mut GameState,
    events: &Receiver<GameEvent>,
) -> Result<()> {
    let mut stdin_lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut tick = tokio::time::interval(std::time::Duration::from_secs(1));

    loop {
        tokio::select! {
            // Handle Ctrl+C gracefully
            _ = signal::ctrl_c() => {
                println!("\nReceived Ctrl+C, shutting down...");
                break;
            }

            // Once a second, let an elapsed game stop itself
            _ = tick.tick() => {
                state.expire_if_elapsed();
            }

            // Handle operator input
            result = stdin_lines.next_line() => {
                let line = match result {
                    Ok(Some(line)) => line,
                    Ok(None) => break, // EOF
                    Err(e) => {
                        eprintln!("Error reading input: {}", e);
                        continue;
                    }
                };

                let command = match parse_line(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        eprintln!("{:#}", e);
                        continue;
                    }
                };

                match command {
                    CliCommand::Game(cmd) => {
                        if let Err(e) = state.apply(cmd) {
                            tracing::debug!(error = %e, "Command rejected");
                            eprintln!("Rejected: {}", e);
                        }
                    }
                    CliCommand::Show => print!("{}", render_roster(&state.snapshot())),
                    CliCommand::Json => println!("{}", state.snapshot().to_json()?),
                    CliCommand::Help => println!("{}", HELP),
                    CliCommand::Quit => break,
                }
            }
        }

        print_events(state, events);
    }

    if state.is_game_started() {
        tracing::info!("Stopping running game before exit");
        state.stop_game()?;
    }
    print_events(state, events);

    Ok(())
}

/// Print pending events with the roster entries they touched
fn print_events(state: &GameState, events: &Receiver<GameEvent>) {
    let pending: Vec<GameEvent> = events.try_iter().collect();
    if pending.is_empty() {
        return;
    }
    let snapshot = state.snapshot();
    for event in &pending {
        println!("* {}", describe_change(&snapshot, event));
    }
}
