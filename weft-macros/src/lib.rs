//! Procedural macros for weft
//!
//! This crate provides the `#[derive(Extract)]` macro that implements the
//! `weft::Extract` trait for named-field structs, enabling field-path input
//! descriptors (`use_task("fetch").field("address")`) to descend into a
//! task's output at run time.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Visibility};

/// Derive macro implementing the `Extract` trait.
///
/// Apply this to a struct with named fields. The generated implementation:
/// - Answers `field(name)` for every `pub` field by cloning it into a
///   type-erased `weft::Value`
/// - Reports non-`pub` fields as not exported, so a field path that names
///   one fails with a clear error instead of leaking private state
/// - Reports unknown names as not found
///
/// Field types looked up through a path must themselves implement
/// `Extract` (and `Clone`); primitives, `String`, common containers, and
/// other derived structs all qualify.
///
/// # Examples
///
/// ```ignore
/// use weft::Extract;
///
/// #[derive(Clone, Extract)]
/// struct User {
///     pub name: String,
///     pub address: Address,
///     internal_flags: u32, // not exported: unreachable from field paths
/// }
///
/// #[derive(Clone, Extract)]
/// struct Address {
///     pub city: String,
/// }
/// ```
#[proc_macro_derive(Extract)]
pub fn derive_extract(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            other => {
                return syn::Error::new_spanned(
                    other,
                    "Extract can only be derived for structs with named fields\n\n\
                     Field paths address fields by name; tuple and unit structs \
                     have no named fields to look up.",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(
                &input.ident,
                "Extract can only be derived for structs with named fields",
            )
            .to_compile_error()
            .into();
        }
    };

    let arms = fields.iter().map(|field| {
        let ident = field.ident.as_ref().expect("named field");
        let lit = ident.to_string();
        if matches!(field.vis, Visibility::Public(_)) {
            quote! {
                #lit => ::weft::Field::Value(::weft::Value::new(self.#ident.clone())),
            }
        } else {
            quote! {
                #lit => ::weft::Field::NotExported,
            }
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote! {
        impl #impl_generics ::weft::Extract for #name #ty_generics #where_clause {
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn kind(&self) -> &'static str {
                "struct"
            }

            fn field(&self, name: &str) -> ::weft::Field {
                match name {
                    #(#arms)*
                    _ => ::weft::Field::NotFound,
                }
            }
        }
    }
    .into()
}
