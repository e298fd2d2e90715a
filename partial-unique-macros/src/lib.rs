use parse::Registry;
use proc_macro2::TokenStream;
use syn::{Ident, ItemMod};
use table::define_registry;

mod parse;
mod table;
mod unique;

/// Use this macro to define the models of a database.
///
/// See the documentation of `partial_unique::models` for the supported attributes.
#[proc_macro_attribute]
pub fn models(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let name = syn::parse_macro_input!(attr as Ident);
    let item = syn::parse_macro_input!(item as ItemMod);

    match generate(name, item) {
        Ok(x) => x,
        Err(e) => e.into_compile_error(),
    }
    .into()
}

fn generate(registry_name: Ident, item: ItemMod) -> syn::Result<TokenStream> {
    let registry = Registry::parse(item)?;
    registry.validate()?;
    Ok(define_registry(&registry_name, registry))
}
