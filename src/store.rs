//! Storage-side half of the pipeline: the connection pool, the reference-set
//! query and the batch row fetch.
//!
//! Both queries follow the same failure policy: a connectivity or query error
//! is logged and degrades to an empty result. The pipeline then proceeds and
//! naturally produces no output, which is the intended outcome for a run
//! whose storage is unreachable.

use std::collections::HashSet;
use std::ops::Deref;
use std::path::Path;
use std::sync::{Arc, Condvar, Mutex};

use rusqlite::{params_from_iter, Connection};
use tracing::{info, warn};

use crate::datatype::{ColumnValue, Row};
use crate::document::normalize;
use crate::error::Result;
use crate::settings::StorageSettings;

// ------------- Connection pool -------------

/// A fixed-size pool of connections to the reference database. Connections
/// are handed out through [`PooledConnection`] guards that return them on
/// drop, so every exit path releases its connection.
pub struct Pool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    idle: Mutex<Vec<Connection>>,
    available: Condvar,
}

impl Pool {
    pub fn open(path: &Path, size: usize) -> Result<Pool> {
        let mut idle = Vec::with_capacity(size);
        for _ in 0..size {
            idle.push(Connection::open(path)?);
        }
        info!(path = %path.display(), size, "initialized database connection pool");
        Ok(Pool {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(idle),
                available: Condvar::new(),
            }),
        })
    }

    /// Blocks until a connection is free. The pipeline issues exactly one
    /// query at a time, so in practice this never waits.
    pub fn acquire(&self) -> PooledConnection {
        let mut idle = self.inner.idle.lock().unwrap();
        loop {
            if let Some(connection) = idle.pop() {
                return PooledConnection {
                    connection: Some(connection),
                    pool: Arc::clone(&self.inner),
                };
            }
            idle = self.inner.available.wait(idle).unwrap();
        }
    }
}

pub struct PooledConnection {
    connection: Option<Connection>,
    pool: Arc<PoolInner>,
}

impl Deref for PooledConnection {
    type Target = Connection;
    fn deref(&self) -> &Connection {
        self.connection.as_ref().unwrap()
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.pool.idle.lock().unwrap().push(connection);
            self.pool.available.notify_one();
        }
    }
}

// ------------- Store -------------

/// The reference table: one identifier column plus arbitrary attribute
/// columns, reachable through the pool.
pub struct Store {
    pool: Pool,
    table: String,
    column: String,
}

impl Store {
    pub fn open(settings: &StorageSettings) -> Result<Store> {
        Ok(Store {
            pool: Pool::open(&settings.path, settings.pool_size)?,
            table: settings.table.clone(),
            column: settings.column.clone(),
        })
    }

    /// The identifier column the reference table is joined on.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// The universe of identifiers known to storage, normalized. Null and
    /// blank identifiers are dropped. An unreachable or failing query logs
    /// and yields an empty set, which makes the rest of the run a no-op.
    pub fn reference_set(&self) -> HashSet<String> {
        match self.try_reference_set() {
            Ok(set) => {
                info!(identifiers = set.len(), "loaded reference set");
                set
            }
            Err(e) => {
                warn!(table = %self.table, error = %e, "error querying the reference table");
                HashSet::new()
            }
        }
    }

    fn try_reference_set(&self) -> rusqlite::Result<HashSet<String>> {
        let connection = self.pool.acquire();
        let mut statement = connection.prepare(&format!(
            "select {} from {}",
            self.column, self.table
        ))?;
        let identifiers = statement.query_map([], |row| row.get::<_, Option<String>>(0))?;
        let mut set = HashSet::new();
        for identifier in identifiers {
            if let Some(normalized) = identifier?.as_deref().and_then(normalize) {
                set.insert(normalized);
            }
        }
        Ok(set)
    }

    /// Fetches all columns for the matched identifiers in one query, one
    /// bound placeholder per identifier. The predicate compares on the
    /// normalized identifier so storage rows match on the same key features
    /// do. An empty matched list short-circuits without touching storage,
    /// since an IN-predicate needs at least one placeholder. Query failures
    /// log and yield no rows.
    pub fn rows_for(&self, matched: &[String]) -> Vec<Row> {
        if matched.is_empty() {
            return Vec::new();
        }
        match self.try_rows_for(matched) {
            Ok(rows) => {
                info!(matched = matched.len(), rows = rows.len(), "fetched matching rows");
                rows
            }
            Err(e) => {
                warn!(table = %self.table, error = %e, "error querying the reference table");
                Vec::new()
            }
        }
    }

    fn try_rows_for(&self, matched: &[String]) -> rusqlite::Result<Vec<Row>> {
        let connection = self.pool.acquire();
        let placeholders = vec!["?"; matched.len()].join(", ");
        let mut statement = connection.prepare(&format!(
            "select * from {} where lower(trim({})) in ({})",
            self.table, self.column, placeholders
        ))?;
        let columns: Vec<(String, Option<String>)> = statement
            .columns()
            .iter()
            .map(|c| (c.name().to_owned(), c.decl_type().map(str::to_owned)))
            .collect();
        let rows = statement.query_map(params_from_iter(matched), |row| {
            let mut converted = Vec::with_capacity(columns.len());
            for (index, (name, decl_type)) in columns.iter().enumerate() {
                let value = ColumnValue::from_sql(row.get_ref(index)?, decl_type.as_deref());
                converted.push((name.clone(), value));
            }
            Ok(Row::new(converted))
        })?;
        rows.collect()
    }
}
