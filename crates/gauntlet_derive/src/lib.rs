//! Attribute macro for the gauntlet harness.
//!
//! `#[operations]` turns an inherent `impl` block into the type's registered operation table:
//! - every `pub fn` taking `&self` or `&mut self` becomes an `Operation`,
//! - `#[gauntlet(skip)]` leaves a method out, `#[gauntlet(rename = "add")]` registers it under another name,
//! - consuming (`self`) methods and associated functions are never registered.
//!
//! Parameter labels form the qualified name: last path segment, no generics, references stripped, `&[T]` written
//! `T[]`. The impl's type parameters and `Value` are labelled `Object`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{
    Attribute, FnArg, ImplItem, ImplItemFn, ItemImpl, LitStr, ReturnType, Type, TypeParamBound, Visibility,
    parse_macro_input, parse_quote,
};

/// Registers the public borrowing methods of an inherent impl as operations of the type.
///
/// # Example
/// ```ignore
/// #[derive(Debug, Default)]
/// struct Counter(i64);
///
/// #[gauntlet::operations]
/// impl Counter {
///     pub fn add(&mut self, by: i64) -> i64 { self.0 += by; self.0 }
///     pub fn get(&self) -> i64 { self.0 }
///     #[gauntlet(skip)]
///     pub fn reset(&mut self) { self.0 = 0 }
/// }
///
/// // Generates `impl gauntlet::Subject for Counter` with `add(i64)` and `get()`.
/// ```
#[proc_macro_attribute]
pub fn operations(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut item = parse_macro_input!(item as ItemImpl);
    let attr = TokenStream2::from(attr);

    let mut errors: Vec<syn::Error> = Vec::new();
    if !attr.is_empty() {
        errors.push(syn::Error::new_spanned(&attr, "`#[operations]` takes no arguments"));
    }
    if let Some((_, path, _)) = &item.trait_ {
        errors.push(syn::Error::new_spanned(path, "`#[operations]` belongs on an inherent impl, not a trait impl"));
    }

    let erased: Vec<String> = item.generics.type_params().map(|p| p.ident.to_string()).collect();
    let mut registrations = Vec::new();

    for impl_item in &mut item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let options = match method_options(&method.attrs) {
            Ok(options) => options,
            Err(err) => {
                errors.push(err);
                continue;
            }
        };
        method.attrs.retain(|a| !a.path().is_ident("gauntlet"));
        if options.skip || !is_registrable(method) {
            continue;
        }
        match registration(method, options.rename, &erased) {
            Ok(tokens) => registrations.push(tokens),
            Err(err) => errors.push(err),
        }
    }

    if let Some(err) = errors.into_iter().reduce(|mut acc, err| {
        acc.combine(err);
        acc
    }) {
        let compile_error = err.to_compile_error();
        return TokenStream::from(quote! {
            #item
            #compile_error
        });
    }

    let mut generics = item.generics.clone();
    let bounded: Vec<_> = generics.type_params().map(|p| p.ident.clone()).collect();
    let where_clause = generics.make_where_clause();
    for ident in bounded {
        where_clause.predicates.push(parse_quote! {
            #ident: ::gauntlet::FromValue + ::gauntlet::IntoValue + ::std::clone::Clone + ::std::fmt::Debug + 'static
        });
    }
    let (impl_generics, _, where_clause) = generics.split_for_impl();
    let self_ty = &item.self_ty;

    let expanded = quote! {
        #item

        impl #impl_generics ::gauntlet::Subject for #self_ty #where_clause {
            fn operations() -> ::std::vec::Vec<::gauntlet::Operation<Self>> {
                ::std::vec![#(#registrations),*]
            }
        }
    };

    TokenStream::from(expanded)
}

#[derive(Default)]
struct MethodOptions {
    skip: bool,
    rename: Option<LitStr>,
}

fn method_options(attrs: &[Attribute]) -> syn::Result<MethodOptions> {
    let mut options = MethodOptions::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("gauntlet")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                options.rename = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `skip` or `rename = \"..\"`"))
            }
        })?;
    }
    Ok(options)
}

/// Public and taking `self` by reference.
fn is_registrable(method: &ImplItemFn) -> bool {
    matches!(method.vis, Visibility::Public(_))
        && method
            .sig
            .receiver()
            .is_some_and(|receiver| matches!(&*receiver.ty, Type::Reference(_)))
}

enum Pass {
    Owned,
    Shared,
    Exclusive,
}

struct Param {
    label: String,
    target: Type,
    pass: Pass,
}

fn registration(method: &ImplItemFn, rename: Option<LitStr>, erased: &[String]) -> syn::Result<TokenStream2> {
    let sig = &method.sig;
    if let Some(param) = sig.generics.type_params().next() {
        return Err(syn::Error::new_spanned(
            param,
            "generic methods cannot be registered; add `#[gauntlet(skip)]` or a concrete wrapper",
        ));
    }

    let params = sig
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(pat) => Some(plan_param(&pat.ty, erased)),
            FnArg::Receiver(_) => None,
        })
        .collect::<syn::Result<Vec<_>>>()?;

    let ident = &sig.ident;
    let name = rename.map_or_else(|| ident.unraw().to_string(), |lit| lit.value());
    let labels = params.iter().map(|p| p.label.as_str());
    let arity = params.len();

    let slots: Vec<_> = (0..arity).map(|i| format_ident!("a{}", i)).collect();
    let bound: Vec<_> = (0..arity).map(|i| format_ident!("v{}", i)).collect();
    let targets: Vec<_> = params.iter().map(|p| &p.target).collect();
    let bindings = params.iter().zip(&bound).map(|(p, v)| match p.pass {
        Pass::Exclusive => quote!(mut #v),
        Pass::Owned | Pass::Shared => quote!(#v),
    });
    let passes = params.iter().zip(&bound).map(|(p, v)| match p.pass {
        Pass::Owned => quote!(#v),
        Pass::Shared => quote!(&#v),
        Pass::Exclusive => quote!(&mut #v),
    });

    let output = match cursor_wrapper(&sig.output)? {
        Some(wrapper) => quote!(::gauntlet::IntoValue::into_value(#wrapper(out))),
        None => quote!(::gauntlet::IntoValue::into_value(out)),
    };

    Ok(quote! {
        ::gauntlet::Operation::new(
            #name,
            &[#(#labels),*],
            |receiver: &mut Self, args: &[::gauntlet::Value]| -> ::std::result::Result<::gauntlet::Value, ::gauntlet::ArgumentError> {
                let [#(#slots),*] = args else {
                    return ::std::result::Result::Err(::gauntlet::ArgumentError::arity(#arity, args.len()));
                };
                #(let #bindings = <#targets as ::gauntlet::FromValue>::from_value(#slots)?;)*
                let out = receiver.#ident(#(#passes),*);
                ::std::result::Result::Ok(#output)
            },
        )
        .with_check(|args: &[::gauntlet::Value]| -> ::std::result::Result<(), ::gauntlet::ArgumentError> {
            let [#(#slots),*] = args else {
                return ::std::result::Result::Err(::gauntlet::ArgumentError::arity(#arity, args.len()));
            };
            #(<#targets as ::gauntlet::FromValue>::from_value(#slots)?;)*
            ::std::result::Result::Ok(())
        })
    })
}

fn plan_param(ty: &Type, erased: &[String]) -> syn::Result<Param> {
    let label = type_label(ty, erased)?;
    let (target, pass) = match ty {
        Type::Reference(reference) => {
            let pass = if reference.mutability.is_some() {
                Pass::Exclusive
            } else {
                Pass::Shared
            };
            let target: Type = match &*reference.elem {
                Type::Path(path) if path.path.is_ident("str") => parse_quote!(::std::string::String),
                Type::Slice(slice) => {
                    let elem = &slice.elem;
                    parse_quote!(::std::vec::Vec<#elem>)
                }
                other => other.clone(),
            };
            (target, pass)
        }
        other => (other.clone(), Pass::Owned),
    };
    Ok(Param { label, target, pass })
}

fn type_label(ty: &Type, erased: &[String]) -> syn::Result<String> {
    match ty {
        Type::Reference(reference) => type_label(&reference.elem, erased),
        Type::Paren(paren) => type_label(&paren.elem, erased),
        Type::Group(group) => type_label(&group.elem, erased),
        Type::Slice(slice) => Ok(format!("{}[]", type_label(&slice.elem, erased)?)),
        Type::Array(array) => Ok(format!("{}[]", type_label(&array.elem, erased)?)),
        Type::Path(path) if path.qself.is_none() => {
            let segment = path
                .path
                .segments
                .last()
                .ok_or_else(|| syn::Error::new_spanned(path, "empty type path"))?;
            let name = segment.ident.unraw().to_string();
            if name == "Value" || erased.contains(&name) {
                Ok("Object".to_string())
            } else {
                Ok(name)
            }
        }
        other => Err(syn::Error::new_spanned(
            other,
            "unsupported parameter type; operations take named types, references to them, or slices",
        )),
    }
}

/// `impl Iterator` / `impl DoubleEndedIterator` returns are recorded as cursors.
fn cursor_wrapper(output: &ReturnType) -> syn::Result<Option<TokenStream2>> {
    let ReturnType::Type(_, ty) = output else {
        return Ok(None);
    };
    let Type::ImplTrait(impl_trait) = &**ty else {
        return Ok(None);
    };
    let traits: Vec<String> = impl_trait
        .bounds
        .iter()
        .filter_map(|bound| match bound {
            TypeParamBound::Trait(t) => t.path.segments.last().map(|s| s.ident.to_string()),
            _ => None,
        })
        .collect();
    if traits.iter().any(|t| t == "DoubleEndedIterator") {
        Ok(Some(quote!(::gauntlet::Bidirectional)))
    } else if traits.iter().any(|t| t == "Iterator" || t == "ExactSizeIterator") {
        Ok(Some(quote!(::gauntlet::Forward)))
    } else {
        Err(syn::Error::new_spanned(
            ty,
            "only `impl Iterator` and `impl DoubleEndedIterator` are supported as `impl Trait` return types",
        ))
    }
}
