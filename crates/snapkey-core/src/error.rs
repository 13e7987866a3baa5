use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapkeyError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Key injection error: {0}")]
    Injection(String),

    #[error("Keyboard hook error: {0}")]
    Hook(String),

    #[error("Snippet store not found at: {0}")]
    StoreNotFound(String),

    #[error("Daemon already running with PID {0}")]
    DaemonAlreadyRunning(u32),

    #[error("Daemon is not running")]
    DaemonNotRunning,

    #[error("Invalid PID in daemon file")]
    InvalidPid,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SnapkeyError>;
