use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::directory::ProcessDirectory;
use crate::snapshot::{self, ProcessSnapshot};

/// Periodic rebuild-then-swap refresh of the process directory.
///
/// Every tick captures a fresh snapshot, builds a new directory and publishes
/// it over a `watch` channel. Readers hold a cheap receiver and always see a
/// complete directory; no directory visible to a reader is ever mutated.
///
/// Purely optional: synchronous callers can capture and build directly and
/// never touch this module.
pub struct DirectoryWatcher {
    interval: Duration,
}

impl DirectoryWatcher {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Start the refresh loop. The initial directory is built before this
    /// returns, so the receiver never observes a placeholder value.
    ///
    /// The loop stops once every receiver is dropped.
    pub fn spawn(
        self,
    ) -> (
        tokio::task::JoinHandle<()>,
        watch::Receiver<Arc<ProcessDirectory>>,
    ) {
        let (tx, rx) = watch::channel(Arc::new(build_directory()));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // the first tick of a tokio interval fires immediately; the
            // initial value already covers it
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if tx.send(Arc::new(build_directory())).is_err() {
                    tracing::debug!("all directory receivers dropped, stopping refresh loop");
                    break;
                }
            }
        });

        (handle, rx)
    }
}

fn build_directory() -> ProcessDirectory {
    match snapshot::capture() {
        Ok(snap) => ProcessDirectory::from_snapshot(snap),
        Err(err) => {
            // an empty directory, not a stale one
            tracing::warn!(error = %err, "process enumeration failed, publishing empty directory");
            ProcessDirectory::from_snapshot(ProcessSnapshot::default())
        }
    }
}

#[cfg(all(test, any(target_os = "linux", target_os = "windows")))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publishes_fresh_directories() {
        let (handle, mut rx) = DirectoryWatcher::new(Duration::from_millis(10)).spawn();

        let me = std::process::id();
        assert!(rx.borrow().find_by_pid(me).is_some());

        rx.changed().await.unwrap();
        assert!(rx.borrow().find_by_pid(me).is_some());

        drop(rx);
        handle.await.unwrap();
    }
}
