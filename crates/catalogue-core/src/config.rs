//! Configuration for catalogue-core
//!
//! Storage settings shared by every repository: where the database lives,
//! how many connections the pool holds and how long a storage call may run.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Storage handle configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file. `:memory:` opens a private in-memory database.
    pub path: PathBuf,
    /// Number of pooled connections
    pub pool_size: usize,
    /// Deadline for one storage call, pool checkout included, in milliseconds
    pub query_timeout_ms: u64,
    /// How long a connection waits on a locked database, in milliseconds
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("catalogue.db"),
            pool_size: 4,
            query_timeout_ms: 3000,
            busy_timeout_ms: 1000,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for a database file at `path` with default tuning.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == ":memory:"
    }
}
