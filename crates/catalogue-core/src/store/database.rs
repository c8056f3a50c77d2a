//! The shared storage handle.
//!
//! `Database` owns a fixed set of SQLite connections. Every storage call
//! checks one out, runs on tokio's blocking pool and is bounded by the
//! configured deadline. A call that overruns its deadline, or whose future is
//! dropped, interrupts the statement still running on its connection.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rusqlite::{Connection, InterruptHandle};
use tokio::sync::Semaphore;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::error::{CatalogueError, Result};
use crate::store::schema::Schema;
use crate::text;

struct Pool {
    idle: Mutex<Vec<Connection>>,
    permits: Arc<Semaphore>,
}

impl Pool {
    fn checkout(&self) -> Result<Connection> {
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .ok_or_else(|| CatalogueError::Storage("no idle connection behind pool permit".into()))
    }

    fn checkin(&self, conn: Connection) {
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(conn);
    }
}

/// Interrupt handle of the statement a call is running, if it is still running.
///
/// The blocking task clears the slot before returning its connection to the
/// pool, so a late interrupt can never reach the next caller's statement.
struct InFlight {
    state: Mutex<FlightState>,
}

struct FlightState {
    handle: Option<InterruptHandle>,
    abandoned: bool,
}

impl InFlight {
    fn new(handle: InterruptHandle) -> Self {
        Self {
            state: Mutex::new(FlightState {
                handle: Some(handle),
                abandoned: false,
            }),
        }
    }

    fn is_abandoned(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .abandoned
    }

    fn finish(&self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handle
            .take();
    }

    fn abandon(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.abandoned = true;
        if let Some(handle) = state.handle.as_ref() {
            handle.interrupt();
        }
    }
}

/// Abandons the in-flight call unless disarmed.
struct AbandonOnDrop {
    flight: Arc<InFlight>,
    armed: bool,
}

impl AbandonOnDrop {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbandonOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.flight.abandon();
        }
    }
}

/// Pooled SQLite storage shared by every repository.
pub struct Database {
    pool: Arc<Pool>,
    size: usize,
    query_timeout: Duration,
}

impl Database {
    /// Open the database, creating missing tables.
    ///
    /// An in-memory database is private to its connection, so it always gets
    /// a pool of one.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let size = if config.is_in_memory() {
            1
        } else {
            config.pool_size.max(1)
        };

        let mut connections = Vec::with_capacity(size);
        for _ in 0..size {
            connections.push(open_connection(&config.path, config)?);
        }
        if let Some(conn) = connections.first() {
            Schema::initialize(conn)?;
        }

        debug!(
            path = %config.path.display(),
            pool_size = size,
            timeout_ms = config.query_timeout_ms,
            "opened catalogue database"
        );

        Ok(Self {
            pool: Arc::new(Pool {
                idle: Mutex::new(connections),
                permits: Arc::new(Semaphore::new(size)),
            }),
            size,
            query_timeout: config.query_timeout(),
        })
    }

    pub fn pool_size(&self) -> usize {
        self.size
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Run `f` on a pooled connection within the query deadline.
    ///
    /// Waiting for a free connection counts against the same deadline.
    pub async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let deadline = Instant::now() + self.query_timeout;

        let permit = match timeout_at(deadline, self.pool.permits.clone().acquire_owned()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(CatalogueError::Storage("connection pool closed".into())),
            Err(_) => {
                debug!(timeout = ?self.query_timeout, "timed out waiting for a connection");
                return Err(CatalogueError::Timeout(self.query_timeout));
            }
        };
        let conn = self.pool.checkout()?;

        let flight = Arc::new(InFlight::new(conn.get_interrupt_handle()));
        let guard = AbandonOnDrop {
            flight: Arc::clone(&flight),
            armed: true,
        };

        let pool = Arc::clone(&self.pool);
        let query_timeout = self.query_timeout;
        let task = tokio::task::spawn_blocking(move || {
            let result = if flight.is_abandoned() {
                Err(CatalogueError::Timeout(query_timeout))
            } else {
                f(&conn)
            };
            flight.finish();
            pool.checkin(conn);
            drop(permit);
            result
        });

        match timeout_at(deadline, task).await {
            Ok(Ok(result)) => {
                guard.disarm();
                result
            }
            Ok(Err(join_error)) => {
                guard.disarm();
                Err(CatalogueError::Storage(format!(
                    "storage task failed: {}",
                    join_error
                )))
            }
            Err(_) => {
                debug!(timeout = ?self.query_timeout, "storage call exceeded its deadline");
                drop(guard);
                Err(CatalogueError::Timeout(self.query_timeout))
            }
        }
    }
}

fn open_connection(path: &Path, config: &DatabaseConfig) -> Result<Connection> {
    let conn = Connection::open(path)
        .map_err(|e| CatalogueError::Storage(format!("open {}: {}", path.display(), e)))?;
    conn.busy_timeout(config.busy_timeout())?;
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA foreign_keys = ON;
        ",
    )?;
    text::register(&conn)?;
    Ok(conn)
}
