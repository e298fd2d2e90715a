//! Static description of the models in a registry.
//! These descriptors are generated by the `#[models]` macro and are
//! used to create tables and to find conditional indexes.

use sea_query::{Alias, ColumnDef, ForeignKey, Index, Table, TableCreateStatement};

use crate::Error;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Blob,
}

impl ColumnType {
    fn sea_type(self) -> sea_query::ColumnType {
        use sea_query::ColumnType as T;
        match self {
            ColumnType::Integer => T::Integer,
            ColumnType::Real => T::custom("REAL"),
            ColumnType::Text => T::Text,
            ColumnType::Blob => T::Blob,
        }
    }
}

/// A single field of a model.
#[derive(Debug, Hash, PartialEq, Eq)]
pub struct Field {
    /// Name of the field in the model.
    pub name: &'static str,
    /// Name of the column that stores this field.
    pub column: &'static str,
    pub typ: ColumnType,
    pub nullable: bool,
    /// Table that this field points at with a foreign key on `id`.
    pub references: Option<&'static str>,
}

/// Everything there is to know about a model.
///
/// The `name` is used to identify the model, it is unique within a registry.
#[derive(Debug, Hash, PartialEq, Eq)]
pub struct ModelMeta {
    pub name: &'static str,
    pub db_table: &'static str,
    pub fields: &'static [Field],
    /// Each entry is an ordered list of field names that must be unique together.
    pub unique_together: &'static [&'static [&'static str]],
}

impl ModelMeta {
    pub fn get_field(&self, name: &str) -> Result<&Field, Error> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .ok_or_else(|| Error::UnknownField {
                model: self.name,
                field: name.to_owned(),
            })
    }

    /// The `CREATE TABLE` statement for this model.
    ///
    /// Unique-together constraints become plain unique constraints of the table.
    pub fn create_table(&self) -> Result<TableCreateStatement, Error> {
        let mut create = Table::create();
        create
            .table(Alias::new(self.db_table))
            .if_not_exists()
            .col(ColumnDef::new(Alias::new("id")).integer().primary_key());

        for field in self.fields {
            let name = Alias::new(field.column);
            let mut def = ColumnDef::new_with_type(name.clone(), field.typ.sea_type());
            if field.nullable {
                def.null();
            } else {
                def.not_null();
            }
            create.col(&mut def);
            if let Some(table) = field.references {
                create.foreign_key(
                    ForeignKey::create()
                        .to(Alias::new(table), Alias::new("id"))
                        .from_col(name),
                );
            }
        }

        for constraint in self.unique_together {
            let mut index = Index::create();
            index.unique();
            // Keep the declared order, so that the index can serve prefix lookups.
            for field in *constraint {
                index.col(Alias::new(self.get_field(field)?.column));
            }
            create.index(&mut index);
        }
        Ok(create)
    }
}

pub struct Null;
pub struct NotNull;

/// Rust types that can be used as a column.
#[diagnostic::on_unimplemented(
    message = "Can not use `{Self}` as a model field",
    note = "Supported types are `i64`, `f64`, `String`, `Vec<u8>` and `Option` of those"
)]
pub trait SchemaType {
    type N;
    const TYP: ColumnType;
    const NULLABLE: bool;
}

impl SchemaType for i64 {
    type N = NotNull;
    const TYP: ColumnType = ColumnType::Integer;
    const NULLABLE: bool = false;
}
impl SchemaType for f64 {
    type N = NotNull;
    const TYP: ColumnType = ColumnType::Real;
    const NULLABLE: bool = false;
}
impl SchemaType for String {
    type N = NotNull;
    const TYP: ColumnType = ColumnType::Text;
    const NULLABLE: bool = false;
}
impl SchemaType for Vec<u8> {
    type N = NotNull;
    const TYP: ColumnType = ColumnType::Blob;
    const NULLABLE: bool = false;
}
impl<T: SchemaType<N = NotNull>> SchemaType for Option<T> {
    type N = Null;
    const TYP: ColumnType = T::TYP;
    const NULLABLE: bool = true;
}
