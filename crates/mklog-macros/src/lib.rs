//! Procedural macros for mklog.
//!
//! `#[log_args]` logs a function's arguments, by parameter name, each time it
//! is called and before its body runs. Parameter names are taken from the
//! signature at compile time, so a call with the wrong arity is a compile
//! error rather than a runtime binding failure.
//!
//! Generated code refers to the `mklog` crate by absolute path; depend on
//! `mklog` (which re-exports this macro), not on this crate directly.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{Expr, ExprLit, ExprPath, FnArg, Ident, ItemFn, Lit, Pat, parse_macro_input};

const SEVERITIES: [&str; 4] = ["DEBUG", "INFO", "WARNING", "ERROR"];

/// Log the decorated function's arguments on every call.
///
/// Options, all optional and in any order:
///
/// - `DEBUG` / `INFO` / `WARNING` / `ERROR`, or `level = <name|rank|expr>`;
///   defaults to `DEBUG`. A string name is checked at compile time; any
///   other expression must convert into `mklog::Level`.
/// - `args(a, b)`: log only these parameters (declaration order is kept,
///   unknown names are ignored).
/// - `facility = <expr>`: where to log; defaults to `mklog::global()`. When
///   the expression is one of the function's parameters, that parameter is
///   not logged.
///
/// Every logged parameter type must implement `mklog::ToArgValue`. The line
/// is written when the function is called, before its body runs; `async fn`
/// is rejected because its body only starts at the first poll.
///
/// ```ignore
/// #[mklog::log_args(INFO, facility = log, args(user))]
/// fn login(log: &mklog::Facility, user: &str, password: &str) -> bool { true }
///
/// login(&log, "ann", "secret"); // INFO: login(user='ann')
/// ```
#[proc_macro_attribute]
pub fn log_args(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut options = LogArgsOptions::default();
    let parser = syn::meta::parser(|meta| options.parse(&meta));
    parse_macro_input!(attr with parser);

    let item = parse_macro_input!(item as ItemFn);
    expand(&options, item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Default)]
struct LogArgsOptions {
    level: Option<TokenStream2>,
    args: Option<Vec<Ident>>,
    facility: Option<Expr>,
}

impl LogArgsOptions {
    fn parse(&mut self, meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
        if let Some(ident) = meta.path.get_ident() {
            let name = ident.to_string();
            if SEVERITIES.contains(&name.as_str()) {
                return self.set_level(meta, quote!(::mklog::Level::#ident));
            }
        }

        if meta.path.is_ident("level") {
            let expr: Expr = meta.value()?.parse()?;
            let level = level_tokens(&expr)?;
            return self.set_level(meta, level);
        }

        if meta.path.is_ident("args") {
            if self.args.is_some() {
                return Err(meta.error("duplicate `args` option"));
            }
            let mut names = Vec::new();
            meta.parse_nested_meta(|inner| {
                let ident = inner
                    .path
                    .get_ident()
                    .ok_or_else(|| inner.error("expected a parameter name"))?;
                names.push(ident.clone());
                Ok(())
            })?;
            self.args = Some(names);
            return Ok(());
        }

        if meta.path.is_ident("facility") {
            if self.facility.is_some() {
                return Err(meta.error("duplicate `facility` option"));
            }
            self.facility = Some(meta.value()?.parse()?);
            return Ok(());
        }

        Err(meta.error(
            "expected DEBUG, INFO, WARNING, ERROR, `level = ...`, `args(...)` or `facility = ...`",
        ))
    }

    fn set_level(&mut self, meta: &ParseNestedMeta<'_>, level: TokenStream2) -> syn::Result<()> {
        if self.level.is_some() {
            return Err(meta.error("level given more than once"));
        }
        self.level = Some(level);
        Ok(())
    }

    /// Parameter used as the facility, which is never logged.
    fn facility_param(&self) -> Option<&Ident> {
        match &self.facility {
            Some(Expr::Path(ExprPath { path, qself: None, .. })) => path.get_ident(),
            _ => None,
        }
    }
}

fn level_tokens(expr: &Expr) -> syn::Result<TokenStream2> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(name),
            ..
        }) => {
            let value = name.value();
            if !SEVERITIES.contains(&value.as_str()) {
                return Err(syn::Error::new_spanned(
                    name,
                    format!("unknown severity {value:?}; expected DEBUG, INFO, WARNING or ERROR"),
                ));
            }
            let ident = Ident::new(&value, name.span());
            Ok(quote!(::mklog::Level::#ident))
        }
        Expr::Lit(ExprLit {
            lit: Lit::Int(rank),
            ..
        }) => {
            let rank: u32 = rank.base10_parse()?;
            Ok(quote!(::mklog::Level::from_rank(#rank)))
        }
        other => Ok(quote!(::std::convert::From::from(#other))),
    }
}

fn expand(options: &LogArgsOptions, item: ItemFn) -> syn::Result<TokenStream2> {
    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = item;

    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "#[log_args] does not support async fn: the arguments would be logged at the \
             first poll, not at the call",
        ));
    }

    let fn_name = sig.ident.to_string();
    let skip = options.facility_param();

    let params: Vec<&Ident> = sig
        .inputs
        .iter()
        .filter_map(|input| match input {
            FnArg::Typed(typed) => match &*typed.pat {
                Pat::Ident(pat) => Some(&pat.ident),
                _ => None,
            },
            FnArg::Receiver(_) => None,
        })
        .filter(|ident| Some(*ident) != skip)
        .filter(|ident| {
            options
                .args
                .as_ref()
                .is_none_or(|selected| selected.iter().any(|s| s == *ident))
        })
        .collect();
    let names: Vec<String> = params.iter().map(|ident| ident.to_string()).collect();

    let level = options
        .level
        .clone()
        .unwrap_or_else(|| quote!(::mklog::Level::DEBUG));
    let facility = match &options.facility {
        Some(expr) => quote!(#expr),
        None => quote!(::mklog::global()),
    };

    Ok(quote! {
        #(#attrs)*
        #vis #sig {
            {
                let __mklog_target = &#facility;
                let __mklog_level: ::mklog::Level = #level;
                if __mklog_target.enabled(__mklog_level) {
                    let mut __mklog_call = ::mklog::BoundCall::new(#fn_name);
                    #(
                        __mklog_call.push(#names, ::mklog::ToArgValue::to_arg_value(&#params));
                    )*
                    __mklog_target.emit(
                        __mklog_level,
                        &::mklog::call_site!(),
                        &__mklog_call.message::<&str>(::std::option::Option::None),
                    );
                }
            }
            #block
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse::Parser;
    use syn::parse_quote;

    fn options(attr: TokenStream2) -> LogArgsOptions {
        let mut options = LogArgsOptions::default();
        syn::meta::parser(|meta| options.parse(&meta))
            .parse2(attr)
            .unwrap();
        options
    }

    #[test]
    fn async_fn_is_rejected() {
        let item: ItemFn = parse_quote! {
            async fn fetch(id: u32) -> u32 { id }
        };
        let err = expand(&LogArgsOptions::default(), item).unwrap_err();
        assert!(err.to_string().contains("async fn"));
    }

    #[test]
    fn facility_param_and_receiver_are_not_logged() {
        let item: ItemFn = parse_quote! {
            fn connect(log: &Facility, (a, b): (u8, u8), host: &str) {}
        };
        let tokens = expand(&options(quote!(INFO, facility = log)), item)
            .unwrap()
            .to_string();
        assert!(tokens.contains("\"host\""));
        assert!(!tokens.contains("\"log\""));
        assert!(!tokens.contains("\"a\""));
        assert!(tokens.contains("INFO"));
    }

    #[test]
    fn unknown_level_name_is_rejected() {
        let mut options = LogArgsOptions::default();
        let result = syn::meta::parser(|meta| options.parse(&meta))
            .parse2(quote!(level = "LOUD"));
        assert!(result.unwrap_err().to_string().contains("unknown severity"));
    }
}
