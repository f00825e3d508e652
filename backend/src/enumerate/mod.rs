//! Process table enumeration over a swappable OS source.

#[cfg(any(target_os = "linux", target_os = "android"))]
mod proc_dir;
mod sysctl;

use crate::collection::ProcessCollection;
use crate::config::{ScanConfig, SourceKind};
use crate::record::{HeapFactory, RecordFactory};
use crate::types::EnumError;
use std::path::PathBuf;
use tracing::{debug, warn};

/// A candidate that passed the per-entry checks of its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub pid: i32,
    pub name: String,
}

/// Where process entries come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessSource {
    /// One numeric directory per process under `root`, name in `<pid>/comm`.
    DirectoryScan { root: PathBuf },
    /// One bulk kernel query returning the whole table at once.
    SysControlQuery,
}

impl ProcessSource {
    pub fn from_config(config: &ScanConfig) -> Self {
        match config.source.resolve() {
            SourceKind::SysControlQuery => ProcessSource::SysControlQuery,
            _ => ProcessSource::DirectoryScan {
                root: config.proc_root.clone(),
            },
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            ProcessSource::DirectoryScan { .. } => SourceKind::DirectoryScan,
            ProcessSource::SysControlQuery => SourceKind::SysControlQuery,
        }
    }

    /// Opens the source. The returned iterator holds any OS handle and
    /// releases it when dropped.
    pub fn open(&self) -> Result<Entries, EnumError> {
        let inner = match self {
            #[cfg(any(target_os = "linux", target_os = "android"))]
            ProcessSource::DirectoryScan { root } => EntriesInner::Directory(proc_dir::open(root)?),
            #[cfg(not(any(target_os = "linux", target_os = "android")))]
            ProcessSource::DirectoryScan { root } => {
                return Err(EnumError::SourceUnavailable(format!(
                    "{}: directory scan is not supported on this platform",
                    root.display()
                )))
            }
            ProcessSource::SysControlQuery => EntriesInner::Buffer(sysctl::query()?.into_iter()),
        };
        Ok(Entries { inner })
    }
}

impl Default for ProcessSource {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

/// Entries of an open source, in the order the OS reports them.
pub struct Entries {
    inner: EntriesInner,
}

enum EntriesInner {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    Directory(proc_dir::DirScan),
    Buffer(std::vec::IntoIter<RawEntry>),
}

impl Iterator for Entries {
    type Item = RawEntry;

    fn next(&mut self) -> Option<RawEntry> {
        match &mut self.inner {
            #[cfg(any(target_os = "linux", target_os = "android"))]
            EntriesInner::Directory(scan) => scan.next(),
            EntriesInner::Buffer(entries) => entries.next(),
        }
    }
}

/// Builds collections from a [`ProcessSource`].
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    source: ProcessSource,
}

impl Scanner {
    pub fn new(source: ProcessSource) -> Self {
        Self { source }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(ProcessSource::from_config(config))
    }

    pub fn source(&self) -> &ProcessSource {
        &self.source
    }

    pub fn enumerate(&self) -> Result<ProcessCollection, EnumError> {
        self.enumerate_with(&mut HeapFactory)
    }

    /// Populates a fresh collection, one record per entry, in discovery order.
    ///
    /// Either every entry the source yields ends up in the collection or an
    /// error is returned. On error the partial collection and the open source
    /// are dropped before returning.
    pub fn enumerate_with<F>(&self, factory: &mut F) -> Result<ProcessCollection, EnumError>
    where
        F: RecordFactory + ?Sized,
    {
        let entries = self.source.open()?;
        let mut collection = ProcessCollection::new()?;
        for entry in entries {
            let record = factory.create(entry.pid, &entry.name).map_err(|e| {
                warn!(
                    pid = entry.pid,
                    recorded = collection.len(),
                    error = %e,
                    "discarding partial process table"
                );
                e
            })?;
            collection.push_back(record)?;
        }
        debug!(
            count = collection.len(),
            source = ?self.source.kind(),
            "process table enumerated"
        );
        Ok(collection)
    }
}

/// Snapshots the process table with the build target's default source.
pub fn enumerate_processes() -> Result<ProcessCollection, EnumError> {
    Scanner::default().enumerate()
}
