//! `#[rpc_service]` implementation
//!
//! Expansion steps:
//!
//! 1. Parse the `impl` block with `syn::ItemImpl`
//! 2. Keep every `pub fn` whose receiver is `&self`
//! 3. Read and strip `#[rpc(..)]` helper attributes
//! 4. Count the return values of each method and detect `Result` returns
//! 5. Emit the original block plus an `RpcService` impl registering the methods
//!
//! # Code Generation Example
//!
//! Input:
//! ```ignore
//! #[rpc_service]
//! impl Calc {
//!     #[rpc(name = "Add")]
//!     pub fn add(&self, a: i64, b: i64) -> i64 { a + b }
//!     pub fn check(&self, v: i64) -> Result<i64, String> { Ok(v) }
//! }
//! ```
//!
//! Generated output (beside the unchanged block):
//! ```ignore
//! impl ::rpclite_server::RpcService for Calc {
//!     fn methods(builder: ::rpclite_server::ServiceBuilder<Self>)
//!         -> ::rpclite_server::ServiceBuilder<Self>
//!     {
//!         builder
//!             .method_with_arity("Add", 1usize, <Calc>::add)
//!             .fallible_with_arity("check", 1usize, <Calc>::check)
//!     }
//! }
//! ```

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    FnArg, GenericArgument, ImplItem, ImplItemFn, ItemImpl, LitStr, PathArguments, ReturnType,
    Type, Visibility,
};

struct Exposed {
    ident: syn::Ident,
    name: String,
    arity: usize,
    fallible: bool,
}

/// Expand an attributed `impl` block
pub fn rpc_service_impl(mut item: ItemImpl) -> syn::Result<TokenStream> {
    let mut exposed = Vec::new();

    for impl_item in item.items.iter_mut() {
        if let ImplItem::Fn(method) = impl_item {
            let options = take_rpc_options(method)?;
            if options.skip || !is_exposed(method) {
                continue;
            }

            let (arity, fallible) = match &method.sig.output {
                ReturnType::Default => (0, false),
                ReturnType::Type(_, ty) => match result_ok_type(ty) {
                    Some(ok) => (count_values(ok), true),
                    None => (count_values(ty), false),
                },
            };

            exposed.push(Exposed {
                name: options
                    .name
                    .unwrap_or_else(|| method.sig.ident.to_string()),
                ident: method.sig.ident.clone(),
                arity,
                fallible,
            });
        }
    }

    let self_ty = &item.self_ty;
    let (impl_generics, _, where_clause) = item.generics.split_for_impl();

    let registrations = exposed.iter().map(|method| {
        let Exposed {
            ident,
            name,
            arity,
            fallible,
        } = method;
        if *fallible {
            quote! { .fallible_with_arity(#name, #arity, <#self_ty>::#ident) }
        } else {
            quote! { .method_with_arity(#name, #arity, <#self_ty>::#ident) }
        }
    });

    Ok(quote! {
        #item

        impl #impl_generics ::rpclite_server::RpcService for #self_ty #where_clause {
            fn methods(
                builder: ::rpclite_server::ServiceBuilder<Self>,
            ) -> ::rpclite_server::ServiceBuilder<Self> {
                builder #(#registrations)*
            }
        }
    })
}

#[derive(Default)]
struct RpcOptions {
    name: Option<String>,
    skip: bool,
}

// Reads `#[rpc(name = "..")]` / `#[rpc(skip)]` and removes them, since `rpc`
// is not a real attribute outside this macro.
fn take_rpc_options(method: &mut ImplItemFn) -> syn::Result<RpcOptions> {
    let mut options = RpcOptions::default();
    let mut kept = Vec::with_capacity(method.attrs.len());

    for attr in method.attrs.drain(..) {
        if !attr.path().is_ident("rpc") {
            kept.push(attr);
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                options.name = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `name = \"..\"` or `skip`"))
            }
        })?;
    }

    method.attrs = kept;
    Ok(options)
}

fn is_exposed(method: &ImplItemFn) -> bool {
    if !matches!(method.vis, Visibility::Public(_)) || method.sig.asyncness.is_some() {
        return false;
    }
    match method.sig.inputs.first() {
        Some(FnArg::Receiver(receiver)) => {
            receiver.reference.is_some() && receiver.mutability.is_none()
        }
        _ => false,
    }
}

fn count_values(ty: &Type) -> usize {
    match ty {
        Type::Tuple(tuple) => tuple.elems.len(),
        Type::Paren(paren) => count_values(&paren.elem),
        Type::Group(group) => count_values(&group.elem),
        _ => 1,
    }
}

fn result_ok_type(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Result" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}
