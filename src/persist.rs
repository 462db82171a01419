use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use redb::{Database, ReadableDatabase, TableDefinition, TableError};

use crate::error::Result;

/// Fixed namespace keys for the two persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKey {
    Posts,
    Artworks,
}

impl CollectionKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Artworks => "artworks",
        }
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

const COLLECTIONS: TableDefinition<'static, &'static str, &'static str> =
    TableDefinition::new("collections");

/// Durable local store mirroring the in-memory collections.
///
/// One key per collection, value = the full collection serialized as a
/// JSON string. Every write overwrites the whole value; there is no
/// incremental update. Concurrent writers are last-write-wins with no
/// conflict detection, an accepted limitation for a single-user tool.
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Database>,
    path: PathBuf,
}

impl fmt::Debug for LocalStore {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LocalStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl LocalStore {
    /// Opens the database file, creating it if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(&path).map_err(redb::Error::from)?;
        Ok(Self {
            db: Arc::new(db),
            path,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wraps an already-built database, for tests that need a custom
    /// storage backend.
    #[cfg(test)]
    pub(crate) fn with_database(db: Database) -> Self {
        Self {
            db: Arc::new(db),
            path: PathBuf::from("<in-memory>"),
        }
    }

    /// Returns the persisted collection for `key`, or `None` when the
    /// key has never been written.
    pub fn read(&self, key: CollectionKey) -> Result<Option<String>> {
        let txn = self.db.begin_read().map_err(redb::Error::from)?;
        let table = match txn.open_table(COLLECTIONS) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(err) => return Err(redb::Error::from(err).into()),
        };
        let value = table
            .get(key.as_str())
            .map_err(redb::Error::from)?
            .map(|guard| guard.value().to_string());
        Ok(value)
    }

    /// Overwrites the stored value for `key` with the full serialized
    /// collection. Failures surface to the caller so an edit is never
    /// silently lost.
    pub fn write(&self, key: CollectionKey, json: &str) -> Result<()> {
        let txn = self.db.begin_write().map_err(redb::Error::from)?;
        {
            let mut table = txn.open_table(COLLECTIONS).map_err(redb::Error::from)?;
            table
                .insert(key.as_str(), json)
                .map_err(redb::Error::from)?;
        }
        txn.commit().map_err(redb::Error::from)?;
        Ok(())
    }

    /// Removes the persisted value for `key`, so the next load falls
    /// back to the seed source.
    pub fn clear(&self, key: CollectionKey) -> Result<()> {
        let txn = self.db.begin_write().map_err(redb::Error::from)?;
        {
            let mut table = txn.open_table(COLLECTIONS).map_err(redb::Error::from)?;
            table.remove(key.as_str()).map_err(redb::Error::from)?;
        }
        txn.commit().map_err(redb::Error::from)?;
        Ok(())
    }
}
