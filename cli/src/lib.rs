// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text front-end for the BraidsTag game state: line commands in,
//! plain-text tables and event descriptions out.

pub mod input;
pub mod render;

pub use input::{parse_line, CliCommand};
