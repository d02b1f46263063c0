//! Parsing of input lines into commands.

use std::str::FromStr;

use crate::error::CliError;

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run one tick and print what happened.
    Advance,
    /// Print the current state without ticking.
    Status,
    /// List the commands.
    Help,
    /// Save (if configured) and exit.
    Quit,
    /// A blank line; does nothing.
    Empty,
}

/// Usage text printed by `help` and after unknown input.
pub const USAGE: &str = "\
Commands:
  advance (a)   run one tick and show the events it produced
  status  (s)   show grain, unrest, prices and open contracts
  help    (h)   show this list
  quit    (q)   save the world (with --snapshot) and exit";

impl FromStr for Command {
    type Err = CliError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let input = line.trim();
        match input.to_ascii_lowercase().as_str() {
            "" => Ok(Self::Empty),
            "advance" | "a" | "next" => Ok(Self::Advance),
            "status" | "s" => Ok(Self::Status),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            _ => Err(CliError::UnknownCommand {
                input: input.to_owned(),
            }),
        }
    }
}
