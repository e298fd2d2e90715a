use rusqlite::ffi;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("model `{model}` has no field `{field}`")]
    UnknownField { model: &'static str, field: String },

    /// Two conditional indexes would get the same name.
    ///
    /// Index names share a single namespace in SQLite, so this is also reported
    /// when the two indexes are on different tables.
    #[error("index `{name}` on `{table}` has the same name as an index on `{other}`")]
    IndexNameCollision {
        name: String,
        table: &'static str,
        other: &'static str,
    },

    /// [crate::Model::values] did not return one value per field.
    #[error("model `{model}` has {expected} fields, but {found} values were given")]
    ValueCount {
        model: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("unique constraint on `{table}` has no columns besides the nullable `{column}`")]
    NoIndexColumns {
        table: &'static str,
        column: &'static str,
    },
}

impl Error {
    /// Returns `true` if a unique constraint or unique index rejected a row.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => {
                err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
            }
            _ => false,
        }
    }
}
