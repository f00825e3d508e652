//! UI-agnostic process table snapshots.
//!
//! Enumerates the OS process table into a [`ProcessCollection`] of
//! `(pid, name)` records, then lists, filters or signals them. Uses `procfs`
//! to walk `/proc` on Linux, a bulk `sysctl` query elsewhere, and `nix` for
//! signal delivery.

pub mod ring;

mod collection;
mod config;
mod enumerate;
mod query;
mod record;
mod types;

pub use collection::{IntoIter, ProcessCollection};
pub use config::{ScanConfig, SourceKind, DEFAULT_PROC_ROOT, PROC_ROOT_ENV, SOURCE_ENV};
pub use enumerate::{enumerate_processes, Entries, ProcessSource, RawEntry, Scanner};
pub use query::{
    drain_all, find_by_name, find_in, kill, killall, list_all, parse_signal, send_signal,
    signal_by_name, signal_in, NixSignaller, SignalSender, DEFAULT_SIGNAL,
};
pub use record::{bounded_name, HeapFactory, ProcessRecord, RecordFactory, MAX_NAME_LEN};
pub use types::{ConfigError, EnumError, ProcError, ProcessInfo, RingError, SignalFailure};

pub use nix::errno::Errno;
pub use nix::sys::signal::Signal;
