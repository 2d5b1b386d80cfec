// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of operator command lines

use anyhow::{anyhow, bail, Context, Result};
use braidstag_core::{Command, PlayerKey, PlayerUpdate};

/// Usage text printed by `help`
pub const HELP: &str = "\
Commands:
  start | stop | toggle | reset
  add [TEAM]                      add a player (smallest team if omitted)
  move T S T S                    move a player into an empty slot
  drop T S T S                    drop a player into a slot, pushing others down
  delete T S                      remove a player
  update T S [ammo=N] [health=N]  apply reported stats
  teams N                         set the number of teams (1-8)
  time SECS|MM:SS                 set the game length (01:00-30:00)
  show | json | help | quit";

/// A parsed operator line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Forward to the game state
    Game(Command),
    /// Print the roster table
    Show,
    /// Print the snapshot as JSON
    Json,
    /// Print usage
    Help,
    /// Leave the program
    Quit,
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<CliCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default().to_lowercase();
    let args: Vec<&str> = words.collect();

    let cmd = match verb.as_str() {
        "start" => game(Command::StartGame, &args, 0)?,
        "stop" => game(Command::StopGame, &args, 0)?,
        "toggle" => game(Command::ToggleGame, &args, 0)?,
        "reset" => game(Command::ResetGame, &args, 0)?,
        "add" => {
            let team = match args.as_slice() {
                [] => None,
                [team] => Some(parse_number(team, "team")?),
                _ => bail!("Usage: add [TEAM]"),
            };
            CliCommand::Game(Command::AddPlayer { team })
        }
        "move" | "drop" => {
            let [from_team, from_slot, to_team, to_slot] = args.as_slice() else {
                bail!("Usage: {} FROM_TEAM FROM_SLOT TO_TEAM TO_SLOT", verb);
            };
            let from = parse_key(from_team, from_slot)?;
            let to = parse_key(to_team, to_slot)?;
            if verb == "move" {
                CliCommand::Game(Command::MovePlayer { from, to })
            } else {
                CliCommand::Game(Command::InsertPlayer { from, to })
            }
        }
        "delete" => {
            let [team, slot] = args.as_slice() else {
                bail!("Usage: delete TEAM SLOT");
            };
            CliCommand::Game(Command::DeletePlayer {
                key: parse_key(team, slot)?,
            })
        }
        "update" => {
            let (team, slot, fields) = match args.as_slice() {
                [team, slot, fields @ ..] if !fields.is_empty() => (team, slot, fields),
                _ => bail!("Usage: update TEAM SLOT [ammo=N] [health=N]"),
            };
            CliCommand::Game(Command::UpdatePlayer {
                key: parse_key(team, slot)?,
                update: parse_update(fields)?,
            })
        }
        "teams" => {
            let [count] = args.as_slice() else {
                bail!("Usage: teams N");
            };
            CliCommand::Game(Command::SetTargetTeamCount {
                count: parse_number(count, "team count")?,
            })
        }
        "time" => {
            let [value] = args.as_slice() else {
                bail!("Usage: time SECS|MM:SS");
            };
            CliCommand::Game(Command::SetGameTime {
                seconds: parse_duration(value)?,
            })
        }
        "show" => CliCommand::Show,
        "json" => CliCommand::Json,
        "help" | "?" => CliCommand::Help,
        "quit" | "exit" => CliCommand::Quit,
        other => bail!("Unknown command '{}'. Type 'help' for a list.", other),
    };

    Ok(Some(cmd))
}

fn game(cmd: Command, args: &[&str], expected: usize) -> Result<CliCommand> {
    if args.len() != expected {
        bail!("Unexpected arguments: {}", args.join(" "));
    }
    Ok(CliCommand::Game(cmd))
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &str) -> Result<T> {
    value
        .parse::<T>()
        .map_err(|_| anyhow!("Invalid {}: '{}'", what, value))
}

fn parse_key(team: &str, slot: &str) -> Result<PlayerKey> {
    Ok(PlayerKey::new(
        parse_number(team, "team")?,
        parse_number(slot, "slot")?,
    ))
}

fn parse_update(fields: &[&str]) -> Result<PlayerUpdate> {
    let mut update = PlayerUpdate::default();
    for field in fields {
        let (name, value) = field
            .split_once('=')
            .with_context(|| format!("Expected NAME=VALUE, got '{}'", field))?;
        match name.to_lowercase().as_str() {
            "ammo" => update.ammo = Some(parse_number(value, "ammo")?),
            "health" => update.health = Some(parse_number(value, "health")?),
            other => bail!("Unknown player field '{}'", other),
        }
    }
    Ok(update)
}

/// Parse `SECS` or `MM:SS` into seconds
pub fn parse_duration(value: &str) -> Result<u32> {
    match value.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u32 = parse_number(minutes, "minutes")?;
            let seconds: u32 = parse_number(seconds, "seconds")?;
            if seconds >= 60 {
                bail!("Seconds must be below 60 in '{}'", value);
            }
            minutes
                .checked_mul(60)
                .and_then(|m| m.checked_add(seconds))
                .ok_or_else(|| anyhow!("Time '{}' is too large", value))
        }
        None => parse_number(value, "seconds"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("90").unwrap(), 90);
        assert_eq!(parse_duration("05:00").unwrap(), 300);
        assert_eq!(parse_duration("1:30").unwrap(), 90);
        assert!(parse_duration("1:75").is_err());
        assert!(parse_duration("abc").is_err());
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# setup").unwrap(), None);
    }
}
