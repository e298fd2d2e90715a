use std::marker::PhantomData;

use r2d2::ManageConnection;
use rusqlite::Connection;
use sea_query::{Alias, InsertStatement, SqliteQueryBuilder};
use sea_query_rusqlite::RusqliteBinder;

use crate::{
    Config, ConditionalIndex, Error, IndexInfo, Model, Registry, conditional_indexes, pragma,
};


/// A database with the tables of all models in registry `R`.
///
/// [Database] owns a single connection.
/// Conditional indexes are created on that connection with [Database::create_conditional_indexes],
/// all other work happens inside a [Transaction].
pub struct Database<R> {
    conn: Connection,
    _p: PhantomData<R>,
}

impl<R: Registry> Database<R> {
    /// Open the database and create the tables that do not exist yet.
    ///
    /// The tables only get the unique constraints that SQLite can enforce on its own,
    /// use [Database::create_conditional_indexes] to add the rest.
    pub fn new(config: Config) -> Result<Self, Error> {
        let conn = config.manager.connect()?;
        conn.pragma_update(None, "foreign_keys", config.foreign_keys.as_str())?;
        conn.pragma_update(None, "synchronous", config.synchronous.as_str())?;

        let txn = conn.unchecked_transaction()?;
        for model in R::MODELS {
            let mut sql = model.create_table()?.to_string(SqliteQueryBuilder);
            sql.push_str(" STRICT");
            tracing::debug!(table = model.db_table, "creating table");
            txn.execute(&sql, [])?;
        }
        txn.commit()?;

        Ok(Self {
            conn,
            _p: PhantomData,
        })
    }

    /// Create a conditional unique index for every unique-together constraint with
    /// a nullable field.
    ///
    /// The indexes are created directly on the connection and are not part of any
    /// [Transaction]. If SQLite rejects one of the statements, the error is returned
    /// and the indexes created before it stay in place.
    /// Calling this twice on the same database fails, because the index names are taken.
    pub fn create_conditional_indexes(&self) -> Result<Vec<ConditionalIndex>, Error> {
        let indexes = conditional_indexes(R::MODELS)?;
        for index in &indexes {
            let sql = index.to_sql();
            tracing::debug!(%sql, "creating conditional index");
            self.conn.execute(&sql, [])?;
        }
        tracing::info!(count = indexes.len(), "created conditional indexes");
        Ok(indexes)
    }

    /// Start a transaction. It is rolled back when dropped without [Transaction::commit].
    pub fn transaction(&mut self) -> Result<Transaction<'_, R>, Error> {
        Ok(Transaction {
            inner: Scope::Transaction(self.conn.transaction()?),
            _p: PhantomData,
        })
    }

    /// The `CREATE` statements of all tables and indexes, ordered by table.
    pub fn schema(&self) -> Result<Vec<String>, Error> {
        pragma::read_schema(&self.conn)
    }
}

enum Scope<'a> {
    Transaction(rusqlite::Transaction<'a>),
    Savepoint(rusqlite::Savepoint<'a>),
}

/// A transaction or a savepoint inside of one.
///
/// Changes are rolled back when this is dropped, unless it is committed.
pub struct Transaction<'a, R> {
    inner: Scope<'a>,
    _p: PhantomData<R>,
}

impl<R: Registry> Transaction<'_, R> {
    fn conn(&self) -> &Connection {
        match &self.inner {
            Scope::Transaction(txn) => txn,
            Scope::Savepoint(sp) => sp,
        }
    }

    /// Insert a row and return its `id`.
    pub fn insert<M: Model<Registry = R>>(&self, val: &M) -> Result<i64, Error> {
        let meta = M::META;
        let values = val.values();
        if values.len() != meta.fields.len() {
            return Err(Error::ValueCount {
                model: meta.name,
                expected: meta.fields.len(),
                found: values.len(),
            });
        }

        let mut insert = InsertStatement::new();
        insert
            .into_table(Alias::new(meta.db_table))
            .columns(meta.fields.iter().map(|field| Alias::new(field.column)))
            .values_panic(values.into_iter().map(Into::into));

        let (sql, values) = insert.build_rusqlite(SqliteQueryBuilder);
        let conn = self.conn();
        conn.prepare_cached(&sql)?.execute(&*values.as_params())?;
        Ok(conn.last_insert_rowid())
    }

    /// Number of rows in the table of `M`.
    pub fn count<M: Model<Registry = R>>(&self) -> Result<i64, Error> {
        let sql = format!(r#"SELECT COUNT(*) FROM "{}""#, M::META.db_table);
        Ok(self.conn().query_row(&sql, [], |row| row.get(0))?)
    }

    /// Run `f` inside a savepoint.
    ///
    /// When `f` returns an error, everything it did is rolled back and the error is
    /// returned. This transaction can still be used afterwards, which makes it possible
    /// to check for expected constraint violations.
    pub fn atomic<T>(
        &mut self,
        f: impl FnOnce(&mut Transaction<'_, R>) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let savepoint = match &mut self.inner {
            Scope::Transaction(txn) => txn.savepoint()?,
            Scope::Savepoint(sp) => sp.savepoint()?,
        };
        let mut nested = Transaction {
            inner: Scope::Savepoint(savepoint),
            _p: PhantomData,
        };
        let res = f(&mut nested)?;
        nested.commit()?;
        Ok(res)
    }

    /// Indexes on the table of `M`, sorted by name.
    pub fn indexes<M: Model<Registry = R>>(&self) -> Result<Vec<IndexInfo>, Error> {
        pragma::read_indexes(self.conn(), M::META.db_table)
    }

    /// Make the changes permanent, or part of the enclosing transaction for a savepoint.
    pub fn commit(self) -> Result<(), Error> {
        match self.inner {
            Scope::Transaction(txn) => txn.commit()?,
            Scope::Savepoint(sp) => sp.commit()?,
        }
        Ok(())
    }
}
