//! Queries that consume a snapshot: list, find by name, signal by name.

use crate::collection::ProcessCollection;
use crate::enumerate::Scanner;
use crate::types::{ProcError, ProcessInfo, SignalFailure};
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

/// Signal used by [`kill`] and [`killall`].
pub const DEFAULT_SIGNAL: i32 = Signal::SIGTERM as i32;

/// Delivers raw signal numbers; `0` is the existence probe.
pub trait SignalSender {
    fn send(&mut self, pid: i32, signal: i32) -> Result<(), Errno>;
}

/// Sends through `kill(2)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NixSignaller;

impl SignalSender for NixSignaller {
    fn send(&mut self, pid: i32, signal: i32) -> Result<(), Errno> {
        match parse_signal(signal) {
            Ok(typed) => signal::kill(Pid::from_raw(pid), typed),
            // Real-time signals and anything else nix has no variant for.
            Err(_) => {
                // SAFETY: kill(2) takes no pointers.
                Errno::result(unsafe { libc::kill(pid, signal) }).map(drop)
            }
        }
    }
}

/// Maps a raw signal number to the variant `nix` knows; `0` means "probe only".
///
/// Numbers without a variant (such as `SIGRTMIN..=SIGRTMAX` on Linux) are
/// [`ProcError::InvalidSignal`] here but are still deliverable through
/// [`SignalSender`].
pub fn parse_signal(signal: i32) -> Result<Option<Signal>, ProcError> {
    if signal == 0 {
        return Ok(None);
    }
    Signal::try_from(signal)
        .map(Some)
        .map_err(|_| ProcError::InvalidSignal(signal))
}

/// Rejects numbers no kernel accepts before any work is done.
fn check_signal(signal: i32) -> Result<(), ProcError> {
    if signal < 0 {
        return Err(ProcError::InvalidSignal(signal));
    }
    Ok(())
}

/// The kernel reports an unknown signal number as `EINVAL`.
fn delivery_error(pid: i32, signal: i32, errno: Errno) -> ProcError {
    if errno == Errno::EINVAL {
        ProcError::InvalidSignal(signal)
    } else {
        ProcError::SignalError(pid, errno)
    }
}

/// Sends `signal` to a single process, passing the number through to the OS.
pub fn send_signal(pid: i32, signal: i32) -> Result<(), ProcError> {
    check_signal(signal)?;
    NixSignaller
        .send(pid, signal)
        .map_err(|errno| delivery_error(pid, signal, errno))
}

/// Sends [`DEFAULT_SIGNAL`] to a single process.
pub fn kill(pid: i32) -> Result<(), ProcError> {
    send_signal(pid, DEFAULT_SIGNAL)
}

/// Moves every record out of `collection`.
pub fn drain_all(collection: ProcessCollection) -> Vec<ProcessInfo> {
    collection.into_infos()
}

/// Pids whose name equals `target` exactly. Every record is destroyed.
pub fn find_in(collection: ProcessCollection, target: &str) -> Vec<i32> {
    collection
        .into_iter()
        .filter(|record| record.name() == target)
        .map(|record| record.pid())
        .collect()
}

/// Signals every record named `target`, returning how many were signalled.
///
/// A failed delivery does not stop the batch: every match is attempted and
/// all failures are reported together in [`ProcError::SignalBatch`]. A
/// signal number the kernel rejects ends the batch with
/// [`ProcError::InvalidSignal`].
pub fn signal_in<S>(
    collection: ProcessCollection,
    target: &str,
    signal: i32,
    sender: &mut S,
) -> Result<usize, ProcError>
where
    S: SignalSender + ?Sized,
{
    check_signal(signal)?;
    let mut attempted = 0;
    let mut failures = Vec::new();

    for record in collection {
        if record.name() != target {
            continue;
        }
        attempted += 1;
        if let Err(errno) = sender.send(record.pid(), signal) {
            if errno == Errno::EINVAL {
                return Err(ProcError::InvalidSignal(signal));
            }
            warn!(pid = record.pid(), signal, error = %errno, "signal delivery failed");
            failures.push(SignalFailure {
                pid: record.pid(),
                errno,
            });
        }
    }

    debug!(name = target, attempted, failed = failures.len(), "batch signal done");
    if failures.is_empty() {
        Ok(attempted)
    } else {
        Err(ProcError::SignalBatch {
            name: target.to_string(),
            attempted,
            failures,
        })
    }
}

impl Scanner {
    pub fn list_all(&self) -> Result<Vec<ProcessInfo>, ProcError> {
        Ok(drain_all(self.enumerate()?))
    }

    pub fn find_by_name(&self, target: &str) -> Result<Vec<i32>, ProcError> {
        Ok(find_in(self.enumerate()?, target))
    }

    pub fn signal_by_name(&self, target: &str, signal: i32) -> Result<usize, ProcError> {
        self.signal_by_name_with(target, signal, &mut NixSignaller)
    }

    pub fn signal_by_name_with<S>(
        &self,
        target: &str,
        signal: i32,
        sender: &mut S,
    ) -> Result<usize, ProcError>
    where
        S: SignalSender + ?Sized,
    {
        // Reject a bad signal before paying for a scan.
        check_signal(signal)?;
        signal_in(self.enumerate()?, target, signal, sender)
    }
}

/// Every visible process, in discovery order.
pub fn list_all() -> Result<Vec<ProcessInfo>, ProcError> {
    Scanner::default().list_all()
}

/// Pids of every process named exactly `target`.
pub fn find_by_name(target: &str) -> Result<Vec<i32>, ProcError> {
    Scanner::default().find_by_name(target)
}

/// Signals every process named exactly `target`; see [`signal_in`].
pub fn signal_by_name(target: &str, signal: i32) -> Result<usize, ProcError> {
    Scanner::default().signal_by_name(target, signal)
}

/// [`signal_by_name`] with [`DEFAULT_SIGNAL`].
pub fn killall(target: &str) -> Result<usize, ProcError> {
    signal_by_name(target, DEFAULT_SIGNAL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ProcessRecord;

    fn collection_of(entries: &[(i32, &str)]) -> ProcessCollection {
        let mut collection = ProcessCollection::new().unwrap();
        for (pid, name) in entries {
            collection
                .push_back(ProcessRecord::create(*pid, name).unwrap())
                .unwrap();
        }
        collection
    }

    #[derive(Default)]
    struct Recorder {
        sent: Vec<(i32, i32)>,
    }

    impl SignalSender for Recorder {
        fn send(&mut self, pid: i32, signal: i32) -> Result<(), Errno> {
            self.sent.push((pid, signal));
            Ok(())
        }
    }

    #[test]
    fn find_matches_exact_names_only() {
        let collection = collection_of(&[(1, "sh"), (2, "bash"), (3, "sh"), (4, "Sh")]);
        assert_eq!(find_in(collection, "sh"), [1, 3]);
    }

    #[test]
    fn find_with_no_match_is_empty() {
        assert!(find_in(collection_of(&[(1, "init")]), "sshd").is_empty());
    }

    #[test]
    fn drain_all_keeps_order() {
        let infos = drain_all(collection_of(&[(5, "e"), (2, "b")]));
        let pids: Vec<_> = infos.iter().map(|info| info.pid).collect();
        assert_eq!(pids, [5, 2]);
    }

    #[test]
    fn signal_in_only_touches_matches() {
        let mut recorder = Recorder::default();
        let sent = signal_in(
            collection_of(&[(1, "x"), (2, "y"), (3, "x")]),
            "x",
            Signal::SIGHUP as i32,
            &mut recorder,
        )
        .unwrap();
        assert_eq!(sent, 2);
        assert_eq!(
            recorder.sent,
            [(1, Signal::SIGHUP as i32), (3, Signal::SIGHUP as i32)]
        );
    }

    #[test]
    fn signal_zero_is_a_probe() {
        let mut recorder = Recorder::default();
        signal_in(collection_of(&[(1, "x")]), "x", 0, &mut recorder).unwrap();
        assert_eq!(recorder.sent, [(1, 0)]);
    }

    #[test]
    fn no_matches_is_success() {
        let mut recorder = Recorder::default();
        let sent = signal_in(collection_of(&[(1, "a")]), "x", DEFAULT_SIGNAL, &mut recorder).unwrap();
        assert_eq!(sent, 0);
        assert!(recorder.sent.is_empty());
    }

    #[test]
    fn negative_signal_sends_nothing() {
        let mut recorder = Recorder::default();
        let err = signal_in(collection_of(&[(1, "x")]), "x", -1, &mut recorder).unwrap_err();
        assert!(matches!(err, ProcError::InvalidSignal(-1)));
        assert!(recorder.sent.is_empty());
    }

    #[test]
    fn realtime_signal_reaches_the_sender() {
        let mut recorder = Recorder::default();
        let sent = signal_in(collection_of(&[(1, "x"), (2, "x")]), "x", 35, &mut recorder).unwrap();
        assert_eq!(sent, 2);
        assert_eq!(recorder.sent, [(1, 35), (2, 35)]);
    }

    struct Rejecting {
        attempts: usize,
    }

    impl SignalSender for Rejecting {
        fn send(&mut self, _pid: i32, _signal: i32) -> Result<(), Errno> {
            self.attempts += 1;
            Err(Errno::EINVAL)
        }
    }

    #[test]
    fn kernel_rejection_ends_the_batch() {
        let mut sender = Rejecting { attempts: 0 };
        let err = signal_in(collection_of(&[(1, "x"), (2, "x")]), "x", 200, &mut sender).unwrap_err();
        assert!(matches!(err, ProcError::InvalidSignal(200)));
        assert_eq!(sender.attempts, 1);
    }

    #[test]
    fn realtime_numbers_have_no_nix_variant() {
        assert!(matches!(parse_signal(35), Err(ProcError::InvalidSignal(35))));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn realtime_signal_reaches_kill() {
        // No pid this large exists, so only kill(2) can produce ESRCH.
        let err = send_signal(i32::MAX - 1, 35).unwrap_err();
        assert!(matches!(err, ProcError::SignalError(_, Errno::ESRCH)), "{err:?}");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn out_of_range_signal_is_rejected_by_the_kernel() {
        let err = send_signal(std::process::id() as i32, 9999).unwrap_err();
        assert!(matches!(err, ProcError::InvalidSignal(9999)), "{err:?}");
    }

    #[test]
    fn default_signal_is_sigterm() {
        assert_eq!(parse_signal(DEFAULT_SIGNAL).unwrap(), Some(Signal::SIGTERM));
    }

    #[test]
    fn probing_ourselves_succeeds() {
        send_signal(std::process::id() as i32, 0).unwrap();
    }
}
