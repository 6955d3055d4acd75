use serde::{Deserialize, Serialize};

use crate::error::InspectError;

/// OS process identifier. The kernel reuses pids after a process exits, so a
/// `Pid` is only meaningful relative to the snapshot it came from; never use
/// one as a durable key across snapshots.
pub type Pid = u32;

/// One process as seen at snapshot time. Never mutated; a refresh produces
/// entirely new records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: Pid,
    /// Executable or command name. May be truncated by the OS and is not
    /// unique across processes. Empty when the name could not be read.
    pub name: String,
    /// Parent pid when the platform embeds it in the enumeration (Toolhelp
    /// does). `None` on the /proc backend, where parent linkage is resolved
    /// lazily per candidate in [`crate::ProcessDirectory::find_children`].
    pub parent: Option<Pid>,
}

/// A point-in-time enumeration of every process visible to the caller.
///
/// Records appear in platform enumeration order. That order is stable within
/// one snapshot (display stability) but carries no other meaning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub records: Vec<ProcessRecord>,
}

impl ProcessSnapshot {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A source of process snapshots.
///
/// One trait, two backends: the Toolhelp32 snapshot API on Windows and the
/// `/proc` pseudo-filesystem on Linux. Platform conditionals live behind
/// this seam, not in the query logic.
pub trait SnapshotSource {
    /// Enumerate every process visible to the caller.
    ///
    /// Entries whose name cannot be decoded degrade to an empty name; only a
    /// total enumeration failure (the process table itself cannot be opened)
    /// is an error. Stale data is never returned in place of a failure.
    fn capture(&self) -> Result<ProcessSnapshot, InspectError>;
}

/// Capture a snapshot with the native source for this platform.
pub fn capture() -> Result<ProcessSnapshot, InspectError> {
    #[cfg(target_os = "linux")]
    {
        SnapshotSource::capture(&crate::platform::linux::ProcFsSource)
    }
    #[cfg(target_os = "windows")]
    {
        SnapshotSource::capture(&crate::platform::windows::ToolhelpSource)
    }
    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Err(InspectError::SnapshotUnavailable(
            "no process enumeration backend for this platform".into(),
        ))
    }
}

#[cfg(all(test, any(target_os = "linux", target_os = "windows")))]
mod tests {
    use super::*;

    #[test]
    fn capture_includes_own_process() {
        let snapshot = capture().unwrap();
        assert!(!snapshot.is_empty());

        let me = std::process::id();
        assert!(
            snapshot.records.iter().any(|r| r.pid == me),
            "own pid {me} missing from snapshot"
        );
    }

    #[test]
    fn pids_are_unique_within_one_snapshot() {
        let snapshot = capture().unwrap();
        let mut pids: Vec<Pid> = snapshot.records.iter().map(|r| r.pid).collect();
        pids.sort_unstable();
        pids.dedup();
        assert_eq!(pids.len(), snapshot.len());
    }
}
