//! Directory backend: walks a procfs mount with the `procfs` crate.

use super::RawEntry;
use crate::types::EnumError;
use procfs::process::{all_processes_with_root, ProcessesIter};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Bytes read from a `comm` file; anything longer is cut.
const COMM_BUF_LEN: usize = 256;

pub(super) struct DirScan {
    root: PathBuf,
    processes: ProcessesIter,
}

pub(super) fn open(root: &Path) -> Result<DirScan, EnumError> {
    let processes = all_processes_with_root(root)
        .map_err(|e| EnumError::SourceUnavailable(format!("{}: {}", root.display(), e)))?;
    Ok(DirScan {
        root: root.to_path_buf(),
        processes,
    })
}

impl Iterator for DirScan {
    type Item = RawEntry;

    fn next(&mut self) -> Option<RawEntry> {
        loop {
            // Non-numeric names never reach us; a numeric entry that is not a
            // directory, or that vanished since readdir, fails to open here.
            let process = match self.processes.next()? {
                Ok(process) => process,
                Err(e) => {
                    trace!(error = %e, "skipping process entry");
                    continue;
                }
            };
            let pid = process.pid();
            match read_comm(&self.root, pid) {
                Ok(name) => return Some(RawEntry { pid, name }),
                Err(e) => debug!(pid, error = %e, "process name unreadable, skipping"),
            }
        }
    }
}

fn read_comm(root: &Path, pid: i32) -> io::Result<String> {
    let mut file = File::open(root.join(pid.to_string()).join("comm"))?;
    let mut buf = [0u8; COMM_BUF_LEN];
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(String::from_utf8_lossy(&buf[..filled]).into_owned())
}
