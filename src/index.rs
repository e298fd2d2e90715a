use std::collections::BTreeMap;

use sea_query::{
    Alias, ConditionalStatement, Expr, ExprTrait, Index, IndexCreateStatement, SqliteQueryBuilder,
};

use crate::{Error, ModelMeta};


/// A unique index that only covers rows where one nullable column is `NULL`.
///
/// Together with the normal unique constraint on the table, this makes sure that
/// there can be at most one row with `NULL` for each combination of the other columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalIndex {
    pub table: &'static str,
    /// The non-null columns of the constraint, in declaration order.
    pub columns: Vec<&'static str>,
    /// The column that must be `NULL` for a row to be in the index.
    pub nullable_column: &'static str,
    pub name: String,
}

/// The name of a conditional index over these columns.
pub fn index_name(columns: &[&str]) -> String {
    format!("{}_uniq", columns.join("_"))
}

impl ConditionalIndex {
    /// The `WHERE` predicate of this index.
    pub fn condition(&self) -> String {
        format!("\"{}\" IS NULL", self.nullable_column)
    }

    pub fn statement(&self) -> IndexCreateStatement {
        let mut index = Index::create();
        index
            .unique()
            .name(self.name.as_str())
            .table(Alias::new(self.table))
            .and_where(Expr::col(Alias::new(self.nullable_column)).is_null());
        for col in &self.columns {
            index.col(Alias::new(*col));
        }
        index
    }

    pub fn to_sql(&self) -> String {
        self.statement().to_string(SqliteQueryBuilder)
    }
}

/// Find all conditional indexes that are needed for these models.
///
/// For every unique-together constraint, the first nullable field (if any) is
/// excluded from the index and becomes the condition.
/// Other nullable fields of the same constraint stay normal index columns, so
/// rows that are `NULL` in more than one of them are still not deduplicated.
/// All index names are checked for collisions before anything is returned.
pub fn conditional_indexes(models: &[&'static ModelMeta]) -> Result<Vec<ConditionalIndex>, Error> {
    let mut out = Vec::new();
    let mut names = BTreeMap::new();

    for model in models {
        for constraint in model.unique_together {
            let mut nullable = None;
            for field_name in *constraint {
                let field = model.get_field(field_name)?;
                if field.nullable {
                    nullable = Some(field);
                    break;
                }
            }
            let Some(nullable) = nullable else {
                continue;
            };

            let columns = constraint
                .iter()
                .filter(|name| **name != nullable.name)
                .map(|name| -> Result<_, Error> { Ok(model.get_field(name)?.column) })
                .collect::<Result<Vec<_>, _>>()?;
            if columns.is_empty() {
                return Err(Error::NoIndexColumns {
                    table: model.db_table,
                    column: nullable.column,
                });
            }

            let name = index_name(&columns);
            if let Some(other) = names.insert(name.clone(), model.db_table) {
                return Err(Error::IndexNameCollision {
                    name,
                    table: model.db_table,
                    other,
                });
            }

            out.push(ConditionalIndex {
                table: model.db_table,
                columns,
                nullable_column: nullable.column,
                name,
            });
        }
    }
    Ok(out)
}
