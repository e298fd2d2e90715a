use proc_macro2::TokenStream;
use quote::quote;
use syn::Ident;

use crate::parse::{Model, Registry};

pub fn define_registry(registry_name: &Ident, registry: Registry) -> TokenStream {
    let Registry { module, models } = registry;

    let mut items = TokenStream::new();
    let mut model_metas = vec![];
    for model in &models {
        items.extend(define_model(registry_name, model, &models));

        let name = &model.name;
        model_metas.push(quote! {<#name as ::partial_unique::Model>::META});
    }

    let attrs = &module.attrs;
    let vis = &module.vis;
    let ident = &module.ident;
    quote! {
        #(#attrs)*
        #vis mod #ident {
            #items

            pub struct #registry_name;

            impl ::partial_unique::Registry for #registry_name {
                const MODELS: &'static [&'static ::partial_unique::ModelMeta] = &[#(#model_metas),*];
            }
        }
    }
}

fn define_model(registry_name: &Ident, model: &Model, models: &[Model]) -> TokenStream {
    let item = &model.item;
    let name = &model.name;
    let name_str = name.to_string();
    let db_table = &model.db_table;

    let mut fields = vec![];
    let mut values = vec![];
    let mut checks = vec![];
    for field in &model.fields {
        let field_ident = &field.name;
        let field_str = field_ident.to_string();
        let column = &field.column;
        let typ = &field.typ;
        // `validate` made sure that the target exists
        let references = match models
            .iter()
            .find(|m| field.references.as_ref() == Some(&m.name))
        {
            Some(target) => {
                let table = &target.db_table;
                quote! {::std::option::Option::Some(#table)}
            }
            None => quote! {::std::option::Option::None},
        };
        fields.push(quote! {
            ::partial_unique::Field {
                name: #field_str,
                column: #column,
                typ: <#typ as ::partial_unique::private::SchemaType>::TYP,
                nullable: <#typ as ::partial_unique::private::SchemaType>::NULLABLE,
                references: #references,
            }
        });
        // conditional index names are checked using the syntactic nullability
        let nullable = field.nullable;
        let msg = format!(
            "nullability of `{name_str}::{field_str}` must be visible in its type, write `Option<..>` instead of an alias"
        );
        checks.push(quote! {
            const _: () = ::std::assert!(
                <#typ as ::partial_unique::private::SchemaType>::NULLABLE == #nullable,
                #msg
            );
        });
        values.push(quote! {
            ::partial_unique::private::Value::from(::std::clone::Clone::clone(&self.#field_ident))
        });
    }

    let uniques = model.uniques.iter().map(|unique| {
        let columns = unique.columns.iter().map(|col| col.to_string());
        quote! {&[#(#columns),*]}
    });

    quote! {
        #item

        impl ::partial_unique::Model for #name {
            type Registry = #registry_name;
            const META: &'static ::partial_unique::ModelMeta = &::partial_unique::ModelMeta {
                name: #name_str,
                db_table: #db_table,
                fields: &[#(#fields),*],
                unique_together: &[#(#uniques),*],
            };

            fn values(&self) -> ::std::vec::Vec<::partial_unique::private::Value> {
                ::std::vec![#(#values),*]
            }
        }

        #(#checks)*
    }
}
