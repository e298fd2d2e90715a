use std::collections::BTreeMap;

use syn::Ident;

use crate::parse::{Model, Registry};

/// The conditional index that a unique constraint needs, if any.
pub struct ConditionalIndex<'a> {
    pub name: String,
    pub nullable: &'a Ident,
}

impl Model {
    /// Check that a unique constraint makes sense and find its conditional index.
    pub fn conditional_index(&self, columns: &[Ident]) -> syn::Result<Option<ConditionalIndex<'_>>> {
        let mut nullable = None;
        let mut names = vec![];
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].contains(col) {
                return Err(syn::Error::new_spanned(col, "column is used twice"));
            }
            let field = self.get_field(col)?;
            if field.nullable && nullable.is_none() {
                nullable = Some(&field.name);
            } else {
                names.push(field.column.as_str());
            }
        }
        Ok(nullable.map(|nullable| ConditionalIndex {
            name: format!("{}_uniq", names.join("_")),
            nullable,
        }))
    }
}

impl Registry {
    /// Check all unique constraints and references.
    ///
    /// Conditional index names must be unique for the whole database,
    /// so collisions are reported here instead of when the indexes are created.
    pub fn validate(&self) -> syn::Result<()> {
        let mut tables = BTreeMap::new();
        let mut index_names = BTreeMap::new();

        for model in &self.models {
            if let Some(other) = tables.insert(&model.db_table, &model.name) {
                return Err(syn::Error::new_spanned(
                    &model.name,
                    format!("table `{}` is already used by `{other}`", model.db_table),
                ));
            }

            let mut columns = BTreeMap::new();
            for field in &model.fields {
                if field.column == "id" {
                    return Err(syn::Error::new_spanned(
                        &field.name,
                        "The `id` column is reserved for the primary key",
                    ));
                }
                if let Some(other) = columns.insert(&field.column, &field.name) {
                    return Err(syn::Error::new_spanned(
                        &field.name,
                        format!("column `{}` is already used by `{other}`", field.column),
                    ));
                }
                if let Some(target) = &field.references {
                    if !self.models.iter().any(|m| m.name == *target) {
                        return Err(syn::Error::new_spanned(
                            target,
                            "can only reference models in the same module",
                        ));
                    }
                }
            }

            for unique in &model.uniques {
                if unique.columns.len() < 2 {
                    return Err(syn::Error::new_spanned(
                        &unique.attr,
                        "unique_together needs at least two fields",
                    ));
                }
                let Some(index) = model.conditional_index(&unique.columns)? else {
                    continue;
                };
                if let Some(other) = index_names.insert(index.name.clone(), &model.name) {
                    return Err(syn::Error::new_spanned(
                        &unique.attr,
                        format!(
                            "conditional index `{}` (where `{}` is null) has the same name as an index of `{other}`",
                            index.name, index.nullable
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}
