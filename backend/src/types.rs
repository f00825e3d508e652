//! Data types and error definitions for process table snapshots.

use nix::errno::Errno;
use thiserror::Error;

/// A process as handed to callers once it has left the collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessInfo {
    pub pid: i32,
    pub name: String,
}

/// Why an enumeration produced no collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnumError {
    #[error("cannot open process table source: {0}")]
    SourceUnavailable(String),
    #[error("allocation failure while recording process table entries")]
    AllocationFailure,
}

/// Misuse of ring handles, reported instead of corrupting links.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingError {
    #[error("handle refers to a freed slot")]
    StaleHandle,
    #[error("node is already linked into a ring")]
    AlreadyLinked,
    #[error("node is not linked into a ring")]
    NotLinked,
    #[error("cannot splice a ring next to its own head")]
    SelfSplice,
    #[error("could not allocate a ring slot")]
    AllocationFailure,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown process source {0:?} (expected auto, directory or sysctl)")]
    UnknownSource(String),
    #[error("{0} must not be empty")]
    EmptyValue(&'static str),
}

/// One failed delivery inside a batch signal operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalFailure {
    pub pid: i32,
    pub errno: Errno,
}

/// Errors that can occur while querying or signalling processes.
#[derive(Error, Debug)]
pub enum ProcError {
    #[error("can't get process list: {0}")]
    Enumeration(#[from] EnumError),
    #[error("Failed to send signal to PID {0}: {1}")]
    SignalError(i32, Errno),
    #[error("Failed to signal {} of {attempted} processes named {name:?}", .failures.len())]
    SignalBatch {
        name: String,
        attempted: usize,
        failures: Vec<SignalFailure>,
    },
    #[error("Invalid signal number {0}")]
    InvalidSignal(i32),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
