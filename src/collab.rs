//! Contracts the orchestration engine expects from its collaborators.
//!
//! Production implementations live in [`crate::system`] and shell out to
//! the usual tooling; tests substitute fakes. Queries are typed: whatever
//! text parsing an implementation needs stays behind this boundary.

use anyhow::Result;
use std::path::Path;
use std::time::Duration;
use zeroize::Zeroizing;

/// Recursive directory synchronization, permissions preserved. `dst` is
/// created if absent; existing entries under `dst` are overwritten but not
/// deleted (callers clear first when replacement semantics are needed).
pub trait TreeSync {
    fn sync(&self, src: &Path, dst: &Path) -> Result<()>;
}

pub trait DatabaseAdmin {
    /// Block until the database accepts connections or the timeout lapses.
    fn wait_ready(&self, timeout: Duration) -> Result<()>;

    /// Full logical dump with table locking into `to_file`.
    fn dump(&self, to_file: &Path) -> Result<()>;

    /// Drop the target database, recreate it, restore grants, then load
    /// the dump from `from_file`.
    fn restore(&self, from_file: &Path) -> Result<()>;

    /// The target host's own database credential. Never read from a
    /// backup; the exported config carries only a sentinel.
    fn derive_password(&self) -> Result<Zeroizing<String>>;
}

pub trait AppService {
    /// Suspend (`true`) or resume (`false`) the application's write path.
    fn set_maintenance(&self, on: bool) -> Result<()>;

    /// Whether per-user encryption is active. Implementations filter the
    /// benign maintenance-mode notice the status tool emits while the
    /// application is suspended; any other diagnostic is surfaced as a
    /// warning.
    fn encryption_enabled(&self) -> Result<bool>;

    fn list_users(&self) -> Result<Vec<String>>;
}
