//! End-to-end pass against the real OS: capture, index, enrich, query.
#![cfg(any(target_os = "linux", target_os = "windows"))]

use procview_inspect::{memory, snapshot, ProcessDirectory};

#[test]
fn snapshot_to_directory_to_memory() {
    let snap = snapshot::capture().expect("enumeration should work on a live system");
    assert!(!snap.is_empty());

    let total = snap.len();
    let dir = ProcessDirectory::from_snapshot(snap);

    // every captured pid resolves in the directory built from that snapshot
    assert_eq!(dir.len(), total);
    for record in dir.records() {
        assert_eq!(dir.find_by_pid(record.pid).map(|r| r.pid), Some(record.pid));
    }

    // empty search returns the whole table in order
    let everything = dir.find_by_name("");
    assert_eq!(everything.len(), total);

    // the test process itself is visible and using memory
    let me = std::process::id();
    assert!(dir.find_by_pid(me).is_some(), "own pid {me} not indexed");
    let own = memory::usage(me);
    assert!(own.physical_kb > 0);
}

#[test]
fn children_of_own_parent_include_self() {
    let snap = snapshot::capture().unwrap();
    let dir = ProcessDirectory::from_snapshot(snap);

    let me = std::process::id();
    #[cfg(target_os = "linux")]
    let parent = std::os::unix::process::parent_id();
    #[cfg(target_os = "windows")]
    let parent = match dir.find_by_pid(me).and_then(|r| r.parent) {
        Some(p) => p,
        None => return,
    };

    let children = dir.find_children(parent);
    assert!(
        children.iter().any(|r| r.pid == me),
        "pid {me} missing from children of {parent}"
    );
    assert!(children.iter().all(|r| r.pid != parent));
}
