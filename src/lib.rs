extern crate self as partial_unique;

mod config;
mod error;
mod index;
mod pragma;
mod registry;
mod schema;
mod transaction;

pub use config::{Config, ForeignKeys, Synchronous};
pub use error::Error;
pub use index::{ConditionalIndex, conditional_indexes, index_name};
pub use pragma::IndexInfo;
pub use registry::{Model, Registry, find_models_with_unique_together_nullable_fields};
pub use schema::{ColumnType, Field, ModelMeta};
pub use transaction::{Database, Transaction};

/// Turns a module of plain structs into a model registry.
///
/// Every struct in the module becomes a model. The attribute argument names
/// the generated registry type, which lists all models of the module.
///
/// ```
/// #[partial_unique::models(Analytics)]
/// pub mod models {
///     #[unique_together(property, subgroup, end_time)]
///     #[db_table(analytics_installationcount)]
///     pub struct InstallationCount {
///         pub property: String,
///         pub subgroup: Option<String>,
///         pub end_time: i64,
///         pub value: i64,
///     }
/// }
/// use partial_unique::Registry;
/// assert_eq!(models::Analytics::MODELS.len(), 1);
/// ```
///
/// ## Supported data types
/// - `i64` (sqlite `integer`)
/// - `f64` (sqlite `real`)
/// - `String` (sqlite `text`)
/// - `Vec<u8>` (sqlite `blob`)
/// - `Option<T>` where `T` is one of the above (sqlite nullable)
///
/// ## Attributes
/// - `#[unique_together(a, b, ..)]` on a struct declares a unique constraint
///   over at least two of its fields. It can be repeated.
/// - `#[db_table(name)]` on a struct overrides the table name, which defaults
///   to the snake case struct name.
/// - `#[references(Other)]` on an `i64` field makes it a foreign key to the `id`
///   of another model in the same module. Its column is named `<field>_id`.
/// - `#[column(name)]` on a field overrides the column name.
///
/// Declaring two constraints that would produce the same conditional index
/// name is a compile error.
pub use partial_unique_macros::models;

#[doc(hidden)]
pub mod private {
    pub use crate::schema::SchemaType;
    pub use sea_query::Value;
}
