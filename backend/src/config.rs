//! Scan settings: which process table source to use and where it lives.

use crate::types::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;

/// Default mount point of the process filesystem.
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Overrides the source selection (`auto`, `directory`, `sysctl`).
pub const SOURCE_ENV: &str = "PROCTABLE_SOURCE";
/// Overrides the directory scanned by the directory backend.
pub const PROC_ROOT_ENV: &str = "PROCTABLE_PROC_ROOT";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Whatever the build target supports natively.
    #[default]
    Auto,
    DirectoryScan,
    SysControlQuery,
}

impl SourceKind {
    /// Resolves [`SourceKind::Auto`] for the current build target.
    pub fn resolve(self) -> SourceKind {
        match self {
            SourceKind::Auto if cfg!(any(target_os = "linux", target_os = "android")) => {
                SourceKind::DirectoryScan
            }
            SourceKind::Auto => SourceKind::SysControlQuery,
            other => other,
        }
    }
}

impl FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(SourceKind::Auto),
            "directory" | "dir" | "procfs" => Ok(SourceKind::DirectoryScan),
            "sysctl" => Ok(SourceKind::SysControlQuery),
            _ => Err(ConfigError::UnknownSource(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub source: SourceKind,
    pub proc_root: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Auto,
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
        }
    }
}

impl ScanConfig {
    /// Defaults overridden by [`SOURCE_ENV`] and [`PROC_ROOT_ENV`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(source) = lookup(SOURCE_ENV) {
            config.source = source.parse()?;
        }
        if let Some(root) = lookup(PROC_ROOT_ENV) {
            if root.trim().is_empty() {
                return Err(ConfigError::EmptyValue(PROC_ROOT_ENV));
            }
            config.proc_root = PathBuf::from(root);
        }
        Ok(config)
    }

    pub fn with_proc_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.proc_root = root.into();
        self
    }

    pub fn with_source(mut self, source: SourceKind) -> Self {
        self.source = source;
        self
    }
}
