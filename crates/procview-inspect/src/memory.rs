use serde::{Deserialize, Serialize};

use crate::snapshot::Pid;

/// Resident and committed memory for one process, in kilobytes.
///
/// Always computed fresh from the OS. A process's usage changes continuously,
/// so caching a result would report stale numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUsage {
    /// Pages currently backed by physical RAM (working set / resident set).
    pub physical_kb: u64,
    /// Committed address space (private bytes / total program size).
    pub virtual_kb: u64,
}

/// Query current memory usage for `pid`.
///
/// A vanished or unopenable process reports zero usage rather than an error;
/// an enumeration pass covering many pids must not fail because one of them
/// exited mid-pass.
pub fn usage(pid: Pid) -> MemoryUsage {
    #[cfg(target_os = "linux")]
    {
        crate::platform::linux::memory_usage(pid)
    }
    #[cfg(target_os = "windows")]
    {
        crate::platform::windows::memory_usage(pid)
    }
    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        let _ = pid;
        MemoryUsage::default()
    }
}
