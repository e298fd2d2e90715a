use std::collections::BTreeSet;

use crate::{ModelMeta, private::Value};

/// A set of models that live in the same database.
///
/// This is implemented by the type named in `#[models(..)]`.
pub trait Registry: 'static {
    const MODELS: &'static [&'static ModelMeta];
}

/// A single model, implemented by `#[models(..)]` for each struct.
///
/// Implementing this by hand is possible, but [Model::values] must return exactly
/// one value per field or [crate::Transaction::insert] fails with [crate::Error::ValueCount].
pub trait Model: 'static {
    type Registry: Registry;
    const META: &'static ModelMeta;

    /// Values of all fields, in the same order as [ModelMeta::fields].
    fn values(&self) -> Vec<Value>;
}

/// Find all models that have a nullable field in one of their unique-together constraints.
///
/// These are the models that need a conditional index, because `NULL` is never equal
/// to `NULL` and the unique constraint of the table is thus not enforced for such rows.
pub fn find_models_with_unique_together_nullable_fields(
    models: &[&'static ModelMeta],
) -> BTreeSet<&'static str> {
    let mut found = BTreeSet::new();
    'models: for model in models {
        for constraint in model.unique_together {
            for field_name in *constraint {
                // the macro makes sure that this exists
                let Ok(field) = model.get_field(field_name) else {
                    continue;
                };
                if field.nullable {
                    found.insert(model.name);
                    continue 'models;
                }
            }
        }
    }
    found
}
