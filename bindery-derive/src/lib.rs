//! Derive macro for bindery
//!
//! `#[derive(Constructible)]` turns a struct with named fields into a
//! constructible type: every `#[inject]` field becomes a constructor
//! parameter (in field order) or a property injection, and every other field
//! is filled with `Default::default()`.
//!
//! # Example
//!
//! ```rust,ignore
//! use bindery::{Constructible, Container, Deferred, Property, Token};
//! use std::sync::Arc;
//!
//! struct Database;
//! struct Cache;
//! struct Metrics;
//! struct AuditLog;
//!
//! #[derive(Constructible)]
//! struct UserService {
//!     #[inject]
//!     db: Arc<Database>,
//!     #[inject(optional)]
//!     cache: Option<Arc<Cache>>,
//!     #[inject(deferred, named = "primary")]
//!     metrics: Deferred<Metrics>,
//!     #[inject(property, token = "audit")]
//!     audit: Property<AuditLog>,
//!     // Non-injected fields use Default
//!     request_count: u64,
//! }
//!
//! let container = Container::new();
//! container.bind(Token::of::<Database>()).to_value(Database);
//! container.bind("audit").to_value(AuditLog);
//! container
//!     .bind(Token::of::<UserService>())
//!     .to_constructed::<UserService>()
//!     .in_singleton_scope();
//!
//! let service = container.get::<UserService>().unwrap();
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Expr, Fields, LitStr, Type, parse_macro_input};

/// Derive `bindery::Constructible`.
///
/// # Attributes
///
/// - `#[inject]` - Required constructor parameter. The field type must be `Arc<T>`.
/// - `#[inject(optional)]` - `None` when resolution fails. Uses `Option<Arc<T>>`.
/// - `#[inject(deferred)]` - Resolved on first use. Uses `Deferred<T>`.
/// - `#[inject(property)]` - Injected after construction. Uses `Property<T>`.
/// - `token = EXPR` - Resolve from this token instead of `Token::of::<T>()`.
/// - `named = "name"` - Resolve the named variant of the token.
///
/// Options combine, e.g. `#[inject(optional, named = "replica")]`.
#[proc_macro_derive(Constructible, attributes(inject))]
pub fn derive_constructible(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Constructible can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Constructible can only be derived for structs",
            ));
        }
    };

    let mut params = Vec::new();
    let mut properties = Vec::new();
    let mut field_inits = Vec::new();

    for field in fields.iter() {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let field_type = &field.ty;

        let Some(attr) = find_inject_attr(&field.attrs)? else {
            field_inits.push(quote! {
                #field_name: ::std::default::Default::default()
            });
            continue;
        };

        let (wrapper, usage) = match attr.mode {
            Mode::Required => ("Arc", "#[inject] requires type Arc<T>"),
            Mode::Optional => ("Option", "#[inject(optional)] requires type Option<Arc<T>>"),
            Mode::Deferred => ("Deferred", "#[inject(deferred)] requires type Deferred<T>"),
            Mode::Property => ("Property", "#[inject(property)] requires type Property<T>"),
        };
        let inner = match attr.mode {
            Mode::Optional => extract_inner_type(field_type, "Option")
                .and_then(|ty| extract_inner_type(ty, "Arc")),
            _ => extract_inner_type(field_type, wrapper),
        }
        .ok_or_else(|| syn::Error::new_spanned(field_type, usage))?;

        let mut token = match &attr.token {
            Some(expr) => quote! { ::bindery::Token::from(#expr) },
            None => quote! { ::bindery::Token::of::<#inner>() },
        };
        if let Some(named) = &attr.named {
            token = quote! { #token.named(#named) };
        }

        if attr.mode == Mode::Property {
            let key = field_name.to_string();
            properties.push(quote! {
                .property::<#inner, _>(#key, #token, |target: &Self, value| {
                    let _ = target.#field_name.set(value);
                })
            });
            field_inits.push(quote! {
                #field_name: ::bindery::Property::new()
            });
            continue;
        }

        let position = params.len();
        let (modifier, accessor) = match attr.mode {
            Mode::Optional => (quote! { .optional() }, quote! { optional }),
            Mode::Deferred => (quote! { .deferred() }, quote! { deferred }),
            _ => (quote! {}, quote! { get }),
        };
        params.push(quote! {
            .param(::bindery::ParamSpec::new(#token) #modifier)
        });
        field_inits.push(quote! {
            #field_name: _args.#accessor(#position)?
        });
    }

    Ok(quote! {
        impl #impl_generics ::bindery::Constructible for #name #ty_generics #where_clause {
            fn descriptor() -> ::bindery::TypeDescriptor {
                ::bindery::TypeDescriptor::builder::<Self>()
                    #(#params)*
                    #(#properties)*
                    .build(|_args: &::bindery::Arguments| {
                        ::std::result::Result::Ok(Self {
                            #(#field_inits),*
                        })
                    })
            }
        }
    })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Required,
    Optional,
    Deferred,
    Property,
}

struct InjectAttr {
    mode: Mode,
    token: Option<Expr>,
    named: Option<LitStr>,
}

/// Find and parse the #[inject] attribute
fn find_inject_attr(attrs: &[Attribute]) -> syn::Result<Option<InjectAttr>> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident("inject")) else {
        return Ok(None);
    };

    let mut parsed = InjectAttr {
        mode: Mode::Required,
        token: None,
        named: None,
    };

    // Bare #[inject]
    if attr.meta.require_path_only().is_ok() {
        return Ok(Some(parsed));
    }

    attr.parse_nested_meta(|meta| {
        let mode = if meta.path.is_ident("optional") {
            Mode::Optional
        } else if meta.path.is_ident("deferred") {
            Mode::Deferred
        } else if meta.path.is_ident("property") {
            Mode::Property
        } else if meta.path.is_ident("token") {
            parsed.token = Some(meta.value()?.parse()?);
            return Ok(());
        } else if meta.path.is_ident("named") {
            parsed.named = Some(meta.value()?.parse()?);
            return Ok(());
        } else {
            return Err(meta.error(
                "expected one of: optional, deferred, property, token = ..., named = \"...\"",
            ));
        };

        if parsed.mode != Mode::Required {
            return Err(meta.error("optional, deferred and property are mutually exclusive"));
        }
        parsed.mode = mode;
        Ok(())
    })?;

    Ok(Some(parsed))
}

/// Extract T from Wrapper<T>
fn extract_inner_type<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
