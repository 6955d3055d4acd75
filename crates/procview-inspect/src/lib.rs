pub mod control;
pub mod directory;
pub mod error;
pub mod memory;
pub mod platform;
pub mod snapshot;
pub mod watcher;

pub use directory::ProcessDirectory;
pub use error::InspectError;
pub use memory::MemoryUsage;
pub use snapshot::{Pid, ProcessRecord, ProcessSnapshot, SnapshotSource};
pub use watcher::DirectoryWatcher;
