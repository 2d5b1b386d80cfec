// SPDX-License-Identifier: MIT OR Apache-2.0

//! ASCII roster rendering for the CLI.

use braidstag_core::{format_clock, GameEvent, GameSnapshot, Player};

/// Width of the health bar in characters
const BAR_WIDTH: usize = 10;
/// Width of one team column
const CELL_WIDTH: usize = 20;

/// Render the roster as a table: one column per team, one row per slot
pub fn render_roster(snapshot: &GameSnapshot) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Time: {}   Game: {}\n",
        clock_label(snapshot),
        if snapshot.running { "running" } else { "stopped" }
    ));

    // Column headers
    output.push_str("    ");
    for team in 1..=snapshot.team_count {
        output.push_str(&format!(
            "{:<width$}",
            GameSnapshot::team_header(team),
            width = CELL_WIDTH
        ));
    }
    output.push('\n');

    for slot in 1..=snapshot.largest_team {
        output.push_str(&format!("{:>2}  ", slot));
        for team in 1..=snapshot.team_count {
            let cell = snapshot.cell(team, slot).map(render_cell).unwrap_or_default();
            output.push_str(&format!("{:<width$}", cell, width = CELL_WIDTH));
        }
        output.truncate(output.trim_end().len());
        output.push('\n');
    }

    if snapshot.players.is_empty() {
        output.push_str("    (no players)\n");
    }

    output
}

/// Clock text: remaining time while running, `--:--` otherwise
pub fn clock_label(snapshot: &GameSnapshot) -> String {
    if snapshot.running {
        format_clock(snapshot.time_remaining_secs)
    } else {
        "--:--".to_string()
    }
}

/// Ammo count followed by a health bar, e.g. ` 42 [######    ]`.
/// Players with no health left are marked with `X`.
pub fn render_cell(player: &Player) -> String {
    let mut cell = format!("{:>3} [{}]", player.ammo, health_bar(player));
    if !player.is_alive() {
        cell.push_str(" X");
    }
    cell
}

fn health_bar(player: &Player) -> String {
    let filled = (player.health_fraction() * BAR_WIDTH as f32).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "#".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}

/// One-line description of an event
pub fn describe_event(event: &GameEvent) -> String {
    match event {
        GameEvent::GameStarted { ends_at } => {
            format!("Game started, ends at {}", ends_at.format("%H:%M:%S UTC"))
        }
        GameEvent::GameStopped => "Game stopped".to_string(),
        GameEvent::PlayerUpdated { team, slot } => format!("Player {}/{} updated", team, slot),
        GameEvent::PlayerAdded { team, slot } => format!("Player {}/{} joined", team, slot),
    }
}

/// Event description followed by the current contents of the roster entry
/// it refers to, so a vacated slot reads as `(empty)`
pub fn describe_change(snapshot: &GameSnapshot, event: &GameEvent) -> String {
    let description = describe_event(event);
    match event.player_key() {
        Some(key) => {
            let cell = snapshot
                .cell(key.team, key.slot)
                .map(render_cell)
                .unwrap_or_else(|| "(empty)".to_string());
            format!("{}: {}", description, cell.trim_start())
        }
        None => description,
    }
}
