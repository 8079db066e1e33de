//! Open descriptor count. Kept as its own test binary so no other test opens
//! files while the count is taken.

#![cfg(target_os = "linux")]
#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use hiload_core::metrics::ProcessCollector;

/// Entries under `/proc/self/fd`, minus the one pointing at the listing itself.
fn fds_held_by_process() -> u64 {
    let listing = PathBuf::from(format!("/proc/{}/fd", std::process::id()));
    std::fs::read_dir("/proc/self/fd")
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| std::fs::read_link(e.path()).map_or(true, |target| target != listing))
        .count() as u64
}

#[test]
fn open_fds_matches_descriptors_held() {
    let collector = ProcessCollector::new();

    let before = collector.stats().open_fds.unwrap();
    assert_eq!(before, fds_held_by_process());

    let extra = std::fs::File::open("/proc/self/status").unwrap();
    assert_eq!(collector.stats().open_fds.unwrap(), before + 1);

    drop(extra);
    assert_eq!(collector.stats().open_fds.unwrap(), before);
}
