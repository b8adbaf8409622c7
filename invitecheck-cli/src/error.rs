//! CLI-specific error types and exit code mapping

use invitecheck_core::error::{HarnessError, RegistryError};

/// CLI-specific error type.
///
/// `exit_code()` maps each variant to the process exit status.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The run finished but some scenarios failed.
    #[error("{failed} of {total} scenarios failed")]
    ScenariosFailed { failed: usize, total: usize },

    /// Admin login failed or the target could not be reached.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Unknown suite or duplicate scenario.
    #[error("{0}")]
    Registry(#[from] RegistryError),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from invitecheck-core.
    #[error("{0}")]
    Core(#[from] HarnessError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                  |
    /// |------|------------------------------------------|
    /// | 0    | Success                                  |
    /// | 1    | Scenario failures / command error        |
    /// | 2    | Configuration error                      |
    /// | 3    | Authentication failed / target unreachable |
    /// | 10   | IO error                                 |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(HarnessError::Config(_)) => 2,
            Self::Auth(_) | Self::Core(HarnessError::Auth(_) | HarnessError::Transport(_)) => 3,
            Self::Io(_) | Self::Core(HarnessError::Io(_)) => 10,
            Self::Command(_)
            | Self::ScenariosFailed { .. }
            | Self::Registry(_)
            | Self::JsonSerialize(_)
            | Self::Core(HarnessError::Registry(_)) => 1,
        }
    }
}
