//! Error types for the command loop.

/// A line of input that is not a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CliError {
    /// The line named no known command.
    #[error("unknown command `{input}` (type `help` for the list)")]
    UnknownCommand {
        /// The trimmed input line.
        input: String,
    },
}
