use thiserror::Error;

/// Errors reported to the caller of a bridge command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// No command is registered under this name.
    #[error("unknown command {module}.{command}")]
    UnknownCommand {
        /// Module the caller addressed.
        module: String,
        /// Command the caller addressed.
        command: String,
    },

    /// The command ran and failed. Carries the command's own error text.
    #[error("{message}")]
    Command {
        /// Display text of the command's error.
        message: String,
    },

    /// The command result could not be marshalled to JSON.
    #[error("failed to marshal result: {0}")]
    Marshal(String),

    /// The worker thread could not be started.
    #[error("failed to spawn worker: {0}")]
    Spawn(String),

    /// The worker thread ended without producing a result (it panicked).
    #[error("worker for {0} exited without a result")]
    WorkerLost(String),
}
