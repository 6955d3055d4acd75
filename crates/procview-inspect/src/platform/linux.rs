// Linux backend: everything comes from the /proc pseudo-filesystem.
//
//   /proc/<pid>/comm   process name, one line
//   /proc/<pid>/stat   "<pid> (<comm>) <state> <ppid> ...", parent lookup
//   /proc/<pid>/statm  "<total-pages> <resident-pages> ...", memory usage
//
// The file layout is an implementation detail of this backend, not a stable
// external format.

use std::fs;
use std::path::Path;

use crate::error::InspectError;
use crate::memory::MemoryUsage;
use crate::snapshot::{Pid, ProcessRecord, ProcessSnapshot, SnapshotSource};

/// Snapshot source backed by iterating `/proc`.
///
/// Parent pids are not embedded in the records; `/proc` has no cheap way to
/// read them during enumeration, so they resolve lazily one `stat` read at a
/// time when a caller asks for children.
pub struct ProcFsSource;

impl SnapshotSource for ProcFsSource {
    fn capture(&self) -> Result<ProcessSnapshot, InspectError> {
        capture_from(Path::new("/proc"))
    }
}

fn capture_from(root: &Path) -> Result<ProcessSnapshot, InspectError> {
    let entries = fs::read_dir(root).map_err(|err| {
        InspectError::SnapshotUnavailable(format!("cannot open {}: {err}", root.display()))
    })?;

    let mut snapshot = ProcessSnapshot::default();
    for entry in entries.flatten() {
        // Only numeric directory names are processes.
        let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<Pid>().ok()) else {
            continue;
        };
        // The process may exit between read_dir and this read; an empty name
        // is the degraded per-entry outcome, never an aborted snapshot.
        let name = read_comm(root, pid);
        snapshot.records.push(ProcessRecord {
            pid,
            name,
            parent: None,
        });
    }
    Ok(snapshot)
}

fn read_comm(root: &Path, pid: Pid) -> String {
    match fs::read_to_string(root.join(pid.to_string()).join("comm")) {
        Ok(s) => s.trim().to_string(),
        Err(err) => {
            tracing::debug!(pid, error = %err, "process name unreadable");
            String::new()
        }
    }
}

/// Resolve a process's parent pid from `/proc/<pid>/stat`.
///
/// `None` if the process vanished or its stat record cannot be parsed.
pub fn parent_of(pid: Pid) -> Option<Pid> {
    parent_from(Path::new("/proc"), pid)
}

fn parent_from(root: &Path, pid: Pid) -> Option<Pid> {
    let stat = fs::read_to_string(root.join(pid.to_string()).join("stat")).ok()?;
    parse_stat_ppid(&stat)
}

/// Extract the ppid (fourth field) from a stat line.
///
/// The comm field is parenthesized and may itself contain spaces and
/// parentheses, so split at the LAST ')' before counting fields.
fn parse_stat_ppid(stat: &str) -> Option<Pid> {
    let (_, rest) = stat.rsplit_once(')')?;
    // rest: " <state> <ppid> <pgrp> ..."
    rest.split_whitespace().nth(1)?.parse().ok()
}

/// Memory usage from `/proc/<pid>/statm`, in kilobytes.
///
/// A vanished or unreadable pid reports zero usage so that an enumeration
/// pass over many processes never fails on one of them.
pub fn memory_usage(pid: Pid) -> MemoryUsage {
    let path = Path::new("/proc").join(pid.to_string()).join("statm");
    match fs::read_to_string(&path) {
        Ok(statm) => parse_statm(&statm, page_size_kb()),
        Err(err) => {
            tracing::debug!(pid, error = %err, "statm unreadable, reporting zero usage");
            MemoryUsage::default()
        }
    }
}

/// The first two statm fields are (total program pages, resident pages), in
/// that order. Each scales by the page size to kilobytes.
fn parse_statm(statm: &str, page_kb: u64) -> MemoryUsage {
    let mut fields = statm.split_whitespace();
    let virtual_pages: u64 = fields.next().and_then(|f| f.parse().ok()).unwrap_or(0);
    let resident_pages: u64 = fields.next().and_then(|f| f.parse().ok()).unwrap_or(0);
    MemoryUsage {
        physical_kb: resident_pages * page_kb,
        virtual_kb: virtual_pages * page_kb,
    }
}

fn page_size_kb() -> u64 {
    // SAFETY: sysconf takes no pointers and has no preconditions.
    let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    u64::try_from(page).unwrap_or(4096) / 1024
}

/// Send SIGTERM. True means the kernel accepted the signal, not that the
/// process has exited by the time this returns.
pub fn terminate(pid: Pid) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    // SAFETY: kill takes no pointers; any pid value is safe to pass.
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    rc == 0
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn fake_proc(entries: &[(&str, Option<&str>)]) -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        for (dir, comm) in entries {
            let path = root.path().join(dir);
            fs::create_dir(&path).unwrap();
            if let Some(comm) = comm {
                fs::write(path.join("comm"), comm).unwrap();
            }
        }
        root
    }

    #[test]
    fn capture_keeps_only_numeric_entries() {
        let root = fake_proc(&[
            ("1", Some("init\n")),
            ("50", Some("shell\n")),
            ("self", Some("not-a-pid\n")),
            ("sys", None),
        ]);

        let mut snapshot = capture_from(root.path()).unwrap();
        snapshot.records.sort_by_key(|r| r.pid);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.records[0].pid, 1);
        assert_eq!(snapshot.records[0].name, "init");
        assert_eq!(snapshot.records[0].parent, None);
        assert_eq!(snapshot.records[1].pid, 50);
        assert_eq!(snapshot.records[1].name, "shell");
    }

    #[test]
    fn unreadable_comm_degrades_to_empty_name() {
        let root = fake_proc(&[("77", None)]);

        let snapshot = capture_from(root.path()).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.records[0].pid, 77);
        assert_eq!(snapshot.records[0].name, "");
    }

    #[test]
    fn missing_proc_root_is_snapshot_unavailable() {
        let root = tempfile::tempdir().unwrap();
        let gone = root.path().join("no-proc-here");

        let err = capture_from(&gone).unwrap_err();
        assert!(matches!(err, InspectError::SnapshotUnavailable(_)));
    }

    #[test]
    fn stat_ppid_plain_name() {
        let stat = "50 (shell) S 1 50 50 0 -1 4194560 1234 0 0 0";
        assert_eq!(parse_stat_ppid(stat), Some(1));
    }

    #[test]
    fn stat_ppid_name_with_spaces_and_parens() {
        // comm can contain anything; only the last ')' ends it
        let stat = "99 (evil (proc) name) R 50 99 99 0 -1 4194560 0 0 0 0";
        assert_eq!(parse_stat_ppid(stat), Some(50));
    }

    #[test]
    fn stat_ppid_garbage_is_none() {
        assert_eq!(parse_stat_ppid(""), None);
        assert_eq!(parse_stat_ppid("50 shell S"), None);
        assert_eq!(parse_stat_ppid("50 (shell) S"), None);
    }

    #[test]
    fn parent_from_reads_stat_record() {
        let root = fake_proc(&[("99", Some("helper\n"))]);
        fs::write(
            root.path().join("99").join("stat"),
            "99 (helper) S 50 99 99 0 -1 4194560 0 0 0 0",
        )
        .unwrap();

        assert_eq!(parent_from(root.path(), 99), Some(50));
        assert_eq!(parent_from(root.path(), 1234), None);
    }

    #[test]
    fn statm_scales_pages_to_kilobytes() {
        // 1000 virtual pages, 200 resident pages at 4 KB pages
        let usage = parse_statm("1000 200 180 45 0 300 0\n", 4);
        assert_eq!(usage.virtual_kb, 4000);
        assert_eq!(usage.physical_kb, 800);
    }

    #[test]
    fn malformed_statm_reports_zero() {
        assert_eq!(parse_statm("", 4), MemoryUsage::default());
        assert_eq!(parse_statm("junk here", 4), MemoryUsage::default());
    }

    #[test]
    fn memory_usage_for_vanished_pid_is_zero() {
        // pid_max caps at 2^22 on Linux, so this pid can never exist
        assert_eq!(memory_usage(Pid::MAX), MemoryUsage::default());
    }

    #[test]
    fn page_size_is_sane() {
        let page = page_size_kb();
        assert!(page >= 4, "page size {page} KB below any real architecture");
    }
}
