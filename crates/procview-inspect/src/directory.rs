use std::collections::HashMap;

use crate::platform;
use crate::snapshot::{Pid, ProcessRecord, ProcessSnapshot};

/// Immutable pid/name index over one snapshot.
///
/// A directory never updates in place. Refreshing means capturing a new
/// snapshot and building a new directory; anything sharing a directory across
/// threads swaps the whole value (see [`crate::DirectoryWatcher`]).
pub struct ProcessDirectory {
    records: Vec<ProcessRecord>,
    by_pid: HashMap<Pid, usize>,
}

impl ProcessDirectory {
    pub fn from_snapshot(snapshot: ProcessSnapshot) -> Self {
        let by_pid = snapshot
            .records
            .iter()
            .enumerate()
            .map(|(idx, record)| (record.pid, idx))
            .collect();
        Self {
            records: snapshot.records,
            by_pid,
        }
    }

    pub fn find_by_pid(&self, pid: Pid) -> Option<&ProcessRecord> {
        self.by_pid.get(&pid).map(|&idx| &self.records[idx])
    }

    /// Records whose parent is `parent`, in snapshot order.
    ///
    /// Records that did not embed a parent at snapshot time (the /proc
    /// backend) get one targeted stat lookup each; a candidate whose lookup
    /// fails is excluded rather than failing the query. The queried pid is
    /// never a result, even if the OS reports a process as its own parent.
    pub fn find_children(&self, parent: Pid) -> Vec<&ProcessRecord> {
        self.find_children_with(parent, platform::parent_of)
    }

    fn find_children_with(
        &self,
        parent: Pid,
        resolve: impl Fn(Pid) -> Option<Pid>,
    ) -> Vec<&ProcessRecord> {
        self.records
            .iter()
            .filter(|r| r.pid != parent)
            .filter(|r| r.parent.or_else(|| resolve(r.pid)) == Some(parent))
            .collect()
    }

    /// Case-sensitive substring search over process names. An empty pattern
    /// matches every record. Snapshot order is preserved.
    ///
    /// Name search and pid lookup are deliberately separate operations; a
    /// numeric string here searches names, it does not address a pid.
    pub fn find_by_name(&self, pattern: &str) -> Vec<&ProcessRecord> {
        self.records
            .iter()
            .filter(|r| r.name.contains(pattern))
            .collect()
    }

    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
