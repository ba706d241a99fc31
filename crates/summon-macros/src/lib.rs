//! The `#[composable]` attribute macro.
//!
//! `summon-core`'s `remember`/`remember_keyed` already derive a call-site
//! identity from `#[track_caller]` + `Location::caller()` (see
//! `summon_core::composer::CallSiteId`), so this macro's job is narrow:
//! wrap a function body in [`summon_core::error::run_composable_body`]
//! so a panicking composable is contained rather than unwinding into
//! whatever called it, and forward `#[track_caller]` onto the generated
//! wrapper so a panic's location still points at the composable's own
//! call site rather than at this macro's internals.
//!
//! Grounded on `compose-macros`'s placeholder `#[proc_macro] pub fn
//! view(...)` — the teacher's proc-macro crates are thin, single-purpose
//! shims rather than large code generators, and this one follows suit.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemFn};

/// Wraps a composable function so a panic inside its body is caught and
/// surfaced as a `summon_core::ComposeError` instead of unwinding.
///
/// ```ignore
/// #[composable]
/// fn greeting(name: &str) -> String {
///     format!("hello, {name}")
/// }
/// ```
///
/// expands to a function with the same signature whose return type is
/// wrapped in `Result<T, summon_core::ComposeError>` and whose body runs
/// inside `summon_core::error::run_composable_body`.
#[proc_macro_attribute]
pub fn composable(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name = &sig.ident;
    let inputs = &sig.inputs;
    let output = match &sig.output {
        syn::ReturnType::Default => quote! { () },
        syn::ReturnType::Type(_, ty) => quote! { #ty },
    };
    let generics = &sig.generics;
    let where_clause = &sig.generics.where_clause;

    let expanded = quote! {
        #[track_caller]
        #vis fn #fn_name #generics (#inputs) -> ::std::result::Result<#output, ::summon_core::ComposeError>
        #where_clause
        {
            ::summon_core::error::run_composable_body(move || #block)
        }
    };

    TokenStream::from(expanded)
}
