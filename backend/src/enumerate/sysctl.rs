//! Bulk-query backend: the whole table in one kernel call.

use super::RawEntry;
use crate::types::EnumError;

/// Decodes a fixed-size C name buffer up to its first NUL.
#[cfg(any(target_os = "freebsd", target_os = "macos", test))]
fn name_from_c_buf(buf: &[libc::c_char]) -> String {
    let bytes: Vec<u8> = buf
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(target_os = "freebsd")]
pub(super) fn query() -> Result<Vec<RawEntry>, EnumError> {
    use std::{io, mem, ptr};
    use tracing::debug;

    // The table can grow between sizing and fetching; retry a few times.
    const ATTEMPTS: usize = 4;

    let mib = [libc::CTL_KERN, libc::KERN_PROC, libc::KERN_PROC_PROC];
    let record_size = mem::size_of::<libc::kinfo_proc>();

    for attempt in 0..ATTEMPTS {
        let mut size: libc::size_t = 0;
        // SAFETY: a null buffer asks the kernel for the required size only.
        let rc = unsafe {
            libc::sysctl(
                mib.as_ptr(),
                mib.len() as libc::c_uint,
                ptr::null_mut(),
                &mut size,
                ptr::null(),
                0,
            )
        };
        if rc != 0 {
            return Err(EnumError::SourceUnavailable(format!(
                "sysctl kern.proc: {}",
                io::Error::last_os_error()
            )));
        }

        let capacity = size / record_size + size / record_size / 8 + 1;
        let mut records: Vec<libc::kinfo_proc> = Vec::new();
        records
            .try_reserve_exact(capacity)
            .map_err(|_| EnumError::AllocationFailure)?;
        let mut bytes = capacity * record_size;
        // SAFETY: `records` has room for `capacity` records, i.e. `bytes` bytes.
        let rc = unsafe {
            libc::sysctl(
                mib.as_ptr(),
                mib.len() as libc::c_uint,
                records.as_mut_ptr().cast(),
                &mut bytes,
                ptr::null(),
                0,
            )
        };
        if rc != 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::ENOMEM) {
                debug!(attempt, "process table grew during query, retrying");
                continue;
            }
            return Err(EnumError::SourceUnavailable(format!("sysctl kern.proc: {err}")));
        }
        // SAFETY: the kernel wrote `bytes` bytes of whole records.
        unsafe { records.set_len(bytes / record_size) };

        let mut entries = Vec::new();
        entries
            .try_reserve_exact(records.len())
            .map_err(|_| EnumError::AllocationFailure)?;
        entries.extend(records.iter().map(|kp| RawEntry {
            pid: kp.ki_pid,
            name: name_from_c_buf(&kp.ki_comm),
        }));
        return Ok(entries);
    }

    Err(EnumError::SourceUnavailable(
        "sysctl kern.proc: process table kept growing".to_string(),
    ))
}

#[cfg(target_os = "macos")]
pub(super) fn query() -> Result<Vec<RawEntry>, EnumError> {
    use std::{io, mem};
    use tracing::trace;

    const NAME_BUF_LEN: usize = 256;

    // libc has no kinfo_proc for Apple targets.
    // SAFETY: a null buffer asks for the current number of pids.
    let hint = unsafe { libc::proc_listallpids(std::ptr::null_mut(), 0) };
    if hint <= 0 {
        return Err(EnumError::SourceUnavailable(format!(
            "proc_listallpids: {}",
            io::Error::last_os_error()
        )));
    }

    let capacity = hint as usize + hint as usize / 8 + 16;
    let mut pids: Vec<libc::pid_t> = Vec::new();
    pids.try_reserve_exact(capacity)
        .map_err(|_| EnumError::AllocationFailure)?;
    pids.resize(capacity, 0);
    let bytes = (capacity * mem::size_of::<libc::pid_t>()) as libc::c_int;
    // SAFETY: `pids` holds `capacity` initialised pid slots.
    let count = unsafe { libc::proc_listallpids(pids.as_mut_ptr().cast(), bytes) };
    if count <= 0 {
        return Err(EnumError::SourceUnavailable(format!(
            "proc_listallpids: {}",
            io::Error::last_os_error()
        )));
    }
    pids.truncate(count as usize);

    let mut entries = Vec::new();
    entries
        .try_reserve_exact(pids.len())
        .map_err(|_| EnumError::AllocationFailure)?;
    let mut name = [0 as libc::c_char; NAME_BUF_LEN];
    for pid in pids {
        // SAFETY: `name` is NAME_BUF_LEN bytes long.
        let len = unsafe { libc::proc_name(pid, name.as_mut_ptr().cast(), NAME_BUF_LEN as u32) };
        if len <= 0 {
            trace!(pid, "process name unavailable, skipping");
            continue;
        }
        entries.push(RawEntry {
            pid,
            name: name_from_c_buf(&name[..len as usize]),
        });
    }
    Ok(entries)
}

#[cfg(not(any(target_os = "freebsd", target_os = "macos")))]
pub(super) fn query() -> Result<Vec<RawEntry>, EnumError> {
    Err(EnumError::SourceUnavailable(
        "sysctl process query is not supported on this platform".to_string(),
    ))
}
