//! Configuration for the SQLite store.

use std::time::Duration;

/// SQLite `synchronous` pragma level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Synchronous {
    Off,
    Normal,
    Full,
}

impl Synchronous {
    pub(crate) fn as_pragma(&self) -> &'static str {
        match self {
            Synchronous::Off => "OFF",
            Synchronous::Normal => "NORMAL",
            Synchronous::Full => "FULL",
        }
    }
}

/// Configuration for [`SqliteKvStore`](crate::SqliteKvStore).
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Use write-ahead logging. Ignored for in-memory databases.
    pub wal: bool,
    /// How long a connection waits on a locked database before failing.
    pub busy_timeout: Duration,
    /// Durability level.
    pub synchronous: Synchronous,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            wal: true,
            busy_timeout: Duration::from_secs(5),
            synchronous: Synchronous::Normal,
        }
    }
}
