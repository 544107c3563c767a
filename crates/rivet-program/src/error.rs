//! Programmer error types.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProgrammerError>;

/// Errors from dispatching a bitstream to an external programming tool.
///
/// The tool's own output goes to the terminal unparsed; only the two
/// failure shapes the dispatcher can observe are modeled.
#[derive(Debug, Error)]
pub enum ProgrammerError {
    /// The external tool could not be started at all.
    #[error("failed to invoke '{tool}'")]
    Invocation {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The external tool ran and exited with a non-zero status.
    #[error("'{tool}' exited with code {code}")]
    Exit { tool: String, code: i32 },

    /// The external tool was killed by a signal before exiting.
    #[error("'{tool}' terminated by signal")]
    Terminated { tool: String },
}
