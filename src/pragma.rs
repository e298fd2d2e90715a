use rusqlite::Connection;

use crate::Error;

/// An index as SQLite reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    pub name: String,
    pub unique: bool,
    pub partial: bool,
    /// Column names in index order.
    /// Expressions and the `rowid` have no name and are skipped.
    pub columns: Vec<String>,
}

pub(crate) fn read_indexes(conn: &Connection, table: &str) -> Result<Vec<IndexInfo>, Error> {
    let mut list = conn.prepare(
        r#"SELECT "name", "unique", "partial" FROM pragma_index_list(?1) ORDER BY "name""#,
    )?;
    let indexes = list
        .query_map([table], |row| {
            Ok((row.get::<_, String>(0)?, row.get(1)?, row.get(2)?))
        })?
        .collect::<Result<Vec<(String, bool, bool)>, _>>()?;

    let mut info = conn.prepare(
        r#"SELECT "name" FROM pragma_index_info(?1) WHERE "name" IS NOT NULL ORDER BY "seqno""#,
    )?;
    let mut out = Vec::new();
    for (name, unique, partial) in indexes {
        let columns = info
            .query_map([&name], |row| row.get::<_, String>(0))?
            .collect::<Result<_, _>>()?;
        out.push(IndexInfo {
            name,
            unique,
            partial,
            columns,
        });
    }
    Ok(out)
}

/// The `sql` of every table and index that was created with a statement.
pub(crate) fn read_schema(conn: &Connection) -> Result<Vec<String>, Error> {
    let mut stmt = conn.prepare(
        r#"SELECT "sql" FROM "sqlite_schema" WHERE "sql" IS NOT NULL ORDER BY "tbl_name", "type" DESC, "name""#,
    )?;
    let sql = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<_, _>>()?;
    Ok(sql)
}
