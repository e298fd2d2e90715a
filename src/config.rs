use std::path::Path;

#[cfg(doc)]
use crate::Database;

/// [Config] is used to open a database from a file or in memory.
///
/// Pass it to [Database::new] to create the tables of a registry.
pub struct Config {
    pub(crate) manager: r2d2_sqlite::SqliteConnectionManager,
    /// Configure how often SQLite will synchronize the database to disk.
    ///
    /// The default is [Synchronous::Full].
    pub synchronous: Synchronous,
    /// Configure whether SQLite checks foreign keys.
    ///
    /// The default is [ForeignKeys::On].
    pub foreign_keys: ForeignKeys,
}

/// <https://www.sqlite.org/pragma.html#pragma_synchronous>
#[non_exhaustive]
pub enum Synchronous {
    /// SQLite will fsync after every transaction.
    Full,

    /// SQLite will only do essential fsync to prevent corruption.
    ///
    /// Use this when performance is more important than durability.
    Normal,
}

impl Synchronous {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Synchronous::Full => "FULL",
            Synchronous::Normal => "NORMAL",
        }
    }
}

/// <https://www.sqlite.org/pragma.html#pragma_foreign_keys>
#[non_exhaustive]
pub enum ForeignKeys {
    /// Rows that point at a missing row are rejected.
    On,
    /// Foreign keys are only declared, not checked.
    ///
    /// This is useful for tests that insert rows without their parents.
    Off,
}

impl ForeignKeys {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            ForeignKeys::On => "ON",
            ForeignKeys::Off => "OFF",
        }
    }
}

impl Config {
    /// Open a database that is stored in a file.
    /// Creates the database if it does not exist.
    pub fn open(p: impl AsRef<Path>) -> Self {
        let manager = r2d2_sqlite::SqliteConnectionManager::file(p);
        Self::open_internal(manager)
    }

    /// Creates a new empty database in memory.
    pub fn open_in_memory() -> Self {
        let manager = r2d2_sqlite::SqliteConnectionManager::memory();
        Self::open_internal(manager)
    }

    fn open_internal(manager: r2d2_sqlite::SqliteConnectionManager) -> Self {
        Self {
            manager,
            synchronous: Synchronous::Full,
            foreign_keys: ForeignKeys::On,
        }
    }
}
