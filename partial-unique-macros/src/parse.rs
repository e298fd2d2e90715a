use heck::ToSnekCase;
use syn::{
    Attribute, Field, Ident, Item, ItemMod, ItemStruct, Token, Type, Visibility,
    punctuated::Punctuated,
};

pub struct Registry {
    pub module: ItemMod,
    pub models: Vec<Model>,
}

pub struct Model {
    /// The struct without the attributes that belong to this macro.
    pub item: ItemStruct,
    pub name: Ident,
    pub db_table: String,
    pub fields: Vec<ModelField>,
    pub uniques: Vec<Unique>,
}

pub struct ModelField {
    pub name: Ident,
    pub column: String,
    pub typ: Type,
    pub nullable: bool,
    pub references: Option<Ident>,
}

pub struct Unique {
    pub attr: Attribute,
    pub columns: Vec<Ident>,
}

impl ModelField {
    fn parse(field: &mut Field) -> syn::Result<Self> {
        let Some(name) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(&*field, "field must be named"));
        };

        let Visibility::Public(_) = field.vis else {
            return Err(syn::Error::new_spanned(name, "field must be public"));
        };

        if name.to_string().to_lowercase() == "id" {
            return Err(syn::Error::new_spanned(
                name,
                "The `id` column is reserved for the primary key",
            ));
        }

        let mut references = None;
        let mut column = None;
        let mut other_attrs = vec![];
        for attr in field.attrs.drain(..) {
            if attr.path().is_ident("references") {
                references = Some(attr.parse_args::<Ident>()?);
            } else if attr.path().is_ident("column") {
                column = Some(attr.parse_args::<Ident>()?.to_string());
            } else {
                other_attrs.push(attr);
            }
        }
        field.attrs = other_attrs;

        let column = column.unwrap_or_else(|| match references {
            Some(_) => format!("{name}_id"),
            None => name.to_string(),
        });

        Ok(ModelField {
            nullable: is_option(&field.ty),
            typ: field.ty.clone(),
            name,
            column,
            references,
        })
    }
}

impl Model {
    fn parse(mut item: ItemStruct) -> syn::Result<Self> {
        let Visibility::Public(_) = item.vis else {
            return Err(syn::Error::new_spanned(item.ident, "model must be public"));
        };

        let mut uniques = vec![];
        let mut db_table = None;
        let mut other_attrs = vec![];
        for attr in item.attrs.drain(..) {
            if attr.path().is_ident("unique_together") {
                let idents = attr
                    .parse_args_with(Punctuated::<Ident, Token![,]>::parse_separated_nonempty)?;
                uniques.push(Unique {
                    columns: idents.into_iter().collect(),
                    attr,
                });
            } else if attr.path().is_ident("db_table") {
                db_table = Some(attr.parse_args::<Ident>()?.to_string());
            } else {
                other_attrs.push(attr);
            }
        }
        item.attrs = other_attrs;

        let fields = item
            .fields
            .iter_mut()
            .map(ModelField::parse)
            .collect::<syn::Result<_>>()?;

        Ok(Model {
            name: item.ident.clone(),
            db_table: db_table.unwrap_or_else(|| item.ident.to_string().to_snek_case()),
            fields,
            uniques,
            item,
        })
    }

    pub fn get_field(&self, name: &Ident) -> syn::Result<&ModelField> {
        self.fields
            .iter()
            .find(|field| field.name == *name)
            .ok_or_else(|| {
                syn::Error::new_spanned(
                    name,
                    format!("`{}` has no field named `{name}`", self.name),
                )
            })
    }
}

impl Registry {
    pub fn parse(mut module: ItemMod) -> syn::Result<Self> {
        let Visibility::Public(_) = module.vis else {
            return Err(syn::Error::new_spanned(module.ident, "module must be public"));
        };

        let Some((_, content)) = module.content.take() else {
            return Err(syn::Error::new_spanned(module.ident, "module must be inline"));
        };

        let models = content
            .into_iter()
            .map(|item| {
                let Item::Struct(item) = item else {
                    return Err(syn::Error::new_spanned(item, "only struct items are allowed"));
                };
                Model::parse(item)
            })
            .collect::<syn::Result<_>>()?;

        Ok(Registry { module, models })
    }
}

fn is_option(typ: &Type) -> bool {
    let Type::Path(path) = typ else {
        return false;
    };
    path.qself.is_none()
        && path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Option")
}
