// Windows backend: Toolhelp32 snapshot for enumeration, psapi counters for
// memory, TerminateProcess for control.

use std::mem;

use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
    TH32CS_SNAPPROCESS,
};
use windows::Win32::System::ProcessStatus::{
    GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS, PROCESS_MEMORY_COUNTERS_EX,
};
use windows::Win32::System::Threading::{
    OpenProcess, TerminateProcess, PROCESS_QUERY_INFORMATION, PROCESS_TERMINATE, PROCESS_VM_READ,
};

use crate::error::InspectError;
use crate::memory::MemoryUsage;
use crate::snapshot::{Pid, ProcessRecord, ProcessSnapshot, SnapshotSource};

/// Closes the wrapped handle on drop, so every exit path releases it,
/// including early failure.
struct OwnedHandle(HANDLE);

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        // SAFETY: the handle was returned open by the API that produced it
        // and is closed exactly once, here.
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// Snapshot source backed by `CreateToolhelp32Snapshot`.
///
/// Toolhelp entries carry `th32ParentProcessID`, so parent linkage is
/// embedded in every record at capture time; no deferred lookup is needed.
pub struct ToolhelpSource;

impl SnapshotSource for ToolhelpSource {
    fn capture(&self) -> Result<ProcessSnapshot, InspectError> {
        // SAFETY: PROCESSENTRY32W is plain data with dwSize set before use;
        // the snapshot handle outlives every Process32 call via the guard.
        unsafe {
            let raw = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0).map_err(|err| {
                InspectError::SnapshotUnavailable(format!("toolhelp snapshot failed: {err}"))
            })?;
            if raw.is_invalid() {
                return Err(InspectError::SnapshotUnavailable(
                    "toolhelp snapshot handle is invalid".into(),
                ));
            }
            let snapshot = OwnedHandle(raw);

            #[allow(clippy::cast_possible_truncation)]
            let mut entry = PROCESSENTRY32W {
                dwSize: mem::size_of::<PROCESSENTRY32W>() as u32,
                ..Default::default()
            };
            if Process32FirstW(snapshot.0, &mut entry).is_err() {
                return Err(InspectError::SnapshotUnavailable(
                    "toolhelp snapshot walk failed on first entry".into(),
                ));
            }

            let mut out = ProcessSnapshot::default();
            loop {
                out.records.push(ProcessRecord {
                    pid: entry.th32ProcessID,
                    name: decode_exe_name(&entry.szExeFile),
                    parent: Some(entry.th32ParentProcessID),
                });
                if Process32NextW(snapshot.0, &mut entry).is_err() {
                    break;
                }
            }
            Ok(out)
        }
    }
}

/// Decode the NUL-terminated UTF-16 exe name from a snapshot entry.
/// Malformed names lossy-decode rather than failing the whole walk.
fn decode_exe_name(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}

/// Working set and private bytes for one process, in kilobytes.
///
/// A pid that cannot be opened (already exited, or access denied) reports
/// zero usage so a wide enumeration pass never fails on a single process.
pub fn memory_usage(pid: Pid) -> MemoryUsage {
    // SAFETY: the counters struct is plain data sized and passed per the API
    // contract; the process handle is closed by the guard.
    unsafe {
        let Ok(raw) = OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, false, pid) else {
            tracing::debug!(pid, "cannot open process for memory query");
            return MemoryUsage::default();
        };
        if raw.is_invalid() {
            return MemoryUsage::default();
        }
        let process = OwnedHandle(raw);

        let mut counters = PROCESS_MEMORY_COUNTERS_EX::default();
        #[allow(clippy::cast_possible_truncation)]
        if GetProcessMemoryInfo(
            process.0,
            std::ptr::addr_of_mut!(counters).cast::<PROCESS_MEMORY_COUNTERS>(),
            mem::size_of::<PROCESS_MEMORY_COUNTERS_EX>() as u32,
        )
        .is_err()
        {
            tracing::debug!(pid, "memory counters query failed");
            return MemoryUsage::default();
        }

        MemoryUsage {
            physical_kb: counters.WorkingSetSize as u64 / 1024,
            virtual_kb: counters.PrivateUsage as u64 / 1024,
        }
    }
}

/// Forced termination via `TerminateProcess`.
///
/// Windows has no graceful peer of SIGTERM for arbitrary processes, so this
/// side is always forced. That asymmetry with the Linux backend is inherent
/// platform behavior. True means the OS accepted the request.
pub fn terminate(pid: Pid) -> bool {
    // SAFETY: the process handle is closed by the guard on every path.
    unsafe {
        let Ok(raw) = OpenProcess(PROCESS_TERMINATE, false, pid) else {
            return false;
        };
        if raw.is_invalid() {
            return false;
        }
        let process = OwnedHandle(raw);
        TerminateProcess(process.0, 1).is_ok()
    }
}
