//! `#[intercepted]` attribute for Wiretap.
//!
//! Rewrites a function or method so its body runs through
//! `Interceptor::execute` (or `execute_async` for `async fn`), with the
//! parameters captured as the call's arguments. Use it through the
//! `wiretap_intercept` re-export; the generated code refers to that crate.

#![deny(clippy::unwrap_used)]

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{
    Attribute, Expr, ExprLit, FnArg, Ident, ItemFn, Lit, LitStr, MetaNameValue, Pat, ReturnType,
    Token, Type, parse_macro_input, parse_quote,
};

/// Record every call of the annotated function.
///
/// ```ignore
/// #[intercepted(target = "billing", via = self.interceptor)]
/// fn charge(&self, amount: u64, currency: &str) -> Result<Receipt, BillingError> { ... }
/// ```
///
/// * `target`: target service name (required).
/// * `via`: expression yielding an `Interceptor` or a reference to one (required).
/// * `name`: method name to record, defaults to the function name.
///
/// Parameters are recorded by name in declaration order. `self` is never
/// recorded, and a parameter marked `#[wiretap(skip)]` is left out. Every
/// recorded parameter must be `Serialize` and bound to a plain identifier.
/// A return type other than `Result<_, _>` is treated as infallible.
#[proc_macro_attribute]
pub fn intercepted(attr: TokenStream, item: TokenStream) -> TokenStream {
    let options = parse_macro_input!(attr with Punctuated::<MetaNameValue, Token![,]>::parse_terminated);
    let item = parse_macro_input!(item as ItemFn);

    match expand(options, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct Options {
    target: LitStr,
    via: Expr,
    name: Option<LitStr>,
}

impl Options {
    fn parse(pairs: Punctuated<MetaNameValue, Token![,]>) -> syn::Result<Self> {
        let mut target = None;
        let mut via = None;
        let mut name = None;

        for pair in pairs {
            let key = pair
                .path
                .get_ident()
                .map(Ident::to_string)
                .unwrap_or_default();
            match key.as_str() {
                "target" => target = Some(string_value(&pair.value)?),
                "name" => name = Some(string_value(&pair.value)?),
                "via" => via = Some(pair.value),
                _ => {
                    return Err(syn::Error::new(
                        pair.path.span(),
                        "unknown option, expected `target`, `via` or `name`",
                    ));
                }
            }
        }

        let target = target.ok_or_else(|| {
            syn::Error::new(Span::call_site(), "missing `target = \"...\"`")
        })?;
        let via = via.ok_or_else(|| {
            syn::Error::new(Span::call_site(), "missing `via = <interceptor expression>`")
        })?;

        Ok(Self { target, via, name })
    }
}

fn string_value(expr: &Expr) -> syn::Result<LitStr> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.clone()),
        other => Err(syn::Error::new(other.span(), "expected a string literal")),
    }
}

fn expand(pairs: Punctuated<MetaNameValue, Token![,]>, item: ItemFn) -> syn::Result<TokenStream2> {
    let options = Options::parse(pairs)?;
    let ItemFn {
        attrs,
        vis,
        mut sig,
        block,
    } = item;

    let mut recorded: Vec<Ident> = Vec::new();
    for input in sig.inputs.iter_mut() {
        let FnArg::Typed(param) = input else {
            continue;
        };
        if take_skip(&mut param.attrs)? {
            continue;
        }
        match param.pat.as_ref() {
            Pat::Ident(pat) => recorded.push(pat.ident.clone()),
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "intercepted parameters must be plain identifiers; bind it to a name or mark it #[wiretap(skip)]",
                ));
            }
        }
    }

    let method = options
        .name
        .clone()
        .unwrap_or_else(|| LitStr::new(&sig.ident.to_string(), sig.ident.span()));
    let target = &options.target;
    let via = &options.via;
    let labels = recorded.iter().map(Ident::to_string);
    let args = quote! {
        ::wiretap_intercept::__private::CallArgs::new()
            #( .with(#labels, &#recorded) )*
    };

    let ret: Type = match &sig.output {
        ReturnType::Default => parse_quote!(()),
        ReturnType::Type(_, ty) => (**ty).clone(),
    };
    let fallible = is_result(&ret);

    let body = match (sig.asyncness.is_some(), fallible) {
        (false, true) => quote! {
            __wiretap_interceptor.execute(|| -> #ret #block, #method, __wiretap_args, #target)
        },
        (false, false) => quote! {
            match __wiretap_interceptor.execute(
                || ::wiretap_intercept::__private::infallible((|| -> #ret #block)()),
                #method,
                __wiretap_args,
                #target,
            ) {
                ::core::result::Result::Ok(value) => value,
                ::core::result::Result::Err(never) => match never {},
            }
        },
        (true, true) => quote! {
            __wiretap_interceptor
                .execute_async(
                    ::wiretap_intercept::__private::typed_future::<#ret, _>(async #block),
                    #method,
                    __wiretap_args,
                    #target,
                )
                .await
        },
        (true, false) => quote! {
            match __wiretap_interceptor
                .execute_async(
                    async {
                        ::wiretap_intercept::__private::infallible(
                            ::wiretap_intercept::__private::typed_future::<#ret, _>(async #block).await,
                        )
                    },
                    #method,
                    __wiretap_args,
                    #target,
                )
                .await
            {
                ::core::result::Result::Ok(value) => value,
                ::core::result::Result::Err(never) => match never {},
            }
        },
    };

    Ok(quote! {
        #(#attrs)*
        #[allow(clippy::redundant_closure_call)]
        #vis #sig {
            let __wiretap_args = #args;
            // Owned, so the body may still borrow `self` mutably.
            let __wiretap_interceptor = ::wiretap_intercept::__private::interceptor(&(#via));
            #body
        }
    })
}

/// Strip `#[wiretap(...)]` from a parameter, reporting whether it asked to be skipped.
fn take_skip(attrs: &mut Vec<Attribute>) -> syn::Result<bool> {
    let mut skip = false;
    let mut result = Ok(());
    attrs.retain(|attr| {
        if !attr.path().is_ident("wiretap") {
            return true;
        }
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported wiretap option, expected `skip`"))
            }
        });
        if let Err(e) = parsed {
            result = Err(e);
        }
        false
    });
    result.map(|()| skip)
}

fn is_result(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Result"),
        Type::Paren(inner) => is_result(&inner.elem),
        Type::Group(inner) => is_result(&inner.elem),
        _ => false,
    }
}
