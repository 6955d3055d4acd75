#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "windows")]
pub mod windows;

use crate::snapshot::Pid;

/// Targeted parent-pid lookup for records whose snapshot entry did not embed
/// parent linkage. Only the /proc backend needs this; Toolhelp snapshots
/// carry the parent inline, so the fallback is never consulted on Windows.
pub fn parent_of(pid: Pid) -> Option<Pid> {
    #[cfg(target_os = "linux")]
    {
        linux::parent_of(pid)
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = pid;
        None
    }
}
