use crate::rule_check;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Index, LitStr, Token, parse_macro_input};

/// Metadata collected from the attributes of one field
#[derive(Default)]
struct FieldAttrs {
    rules: Option<LitStr>,
    query: Option<LitStr>,
    rename: Option<LitStr>,
    serde_rename: Option<LitStr>,
    skip: bool,
}

impl FieldAttrs {
    fn external_name(&self) -> Option<&LitStr> {
        self.rename.as_ref().or(self.serde_rename.as_ref())
    }
}

/// Container-level `#[record(...)]` options
#[derive(Default)]
struct ContainerAttrs {
    strict_rules: bool,
}

fn parse_container_attrs(input: &DeriveInput) -> syn::Result<ContainerAttrs> {
    let mut attrs = ContainerAttrs::default();

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("record")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("strict_rules") {
                attrs.strict_rules = true;
                Ok(())
            } else {
                Err(meta.error("unsupported record attribute, expected `strict_rules`"))
            }
        })?;
    }

    Ok(attrs)
}

fn parse_field_attrs(field: &syn::Field) -> syn::Result<FieldAttrs> {
    let mut attrs = FieldAttrs::default();

    for attr in &field.attrs {
        if attr.path().is_ident("valid") {
            attrs.rules = Some(attr.parse_args::<LitStr>()?);
        } else if attr.path().is_ident("query") {
            attrs.query = Some(attr.parse_args::<LitStr>()?);
        } else if attr.path().is_ident("record") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    attrs.rename = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    attrs.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported record attribute, expected `rename` or `skip`"))
                }
            })?;
        } else if attr.path().is_ident("serde") {
            // Only the external name matters here; serde validates the rest.
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    if meta.input.peek(Token![=]) {
                        attrs.serde_rename = Some(meta.value()?.parse()?);
                    } else {
                        meta.parse_nested_meta(|inner| {
                            let value: LitStr = inner.value()?.parse()?;
                            if inner.path.is_ident("serialize") {
                                attrs.serde_rename = Some(value);
                            }
                            Ok(())
                        })?;
                    }
                } else if meta.input.peek(Token![=]) {
                    let _: syn::Expr = meta.value()?.parse()?;
                }
                Ok(())
            });
        }
    }

    Ok(attrs)
}

/// Derive `tagrule_core::Record` (and `AsFieldValue`, so the type nests)
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Record)]
/// struct App2 {
///     #[valid("funcVal:Required")]
///     id: u32,
///     status: String,
///     #[valid("funcVal:CondRequired,compareKey:Status,compareValue:approved|rejected")]
///     approval_reason: String,
/// }
/// ```
pub fn derive_record_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let name_str = name.to_string();
    let container = parse_container_attrs(input)?;

    let data = match &input.data {
        Data::Struct(data) => data,
        Data::Enum(data) => {
            return Err(syn::Error::new(
                data.enum_token.span(),
                "Record can only be derived for structs",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span(),
                "Record can only be derived for structs",
            ));
        }
    };

    let mut field_exprs = Vec::new();
    let mut field_types = Vec::new();

    let members: Vec<(String, TokenStream2, &syn::Field)> = match &data.fields {
        Fields::Named(fields) => fields
            .named
            .iter()
            .filter_map(|f| {
                f.ident.as_ref().map(|ident| {
                    (ident.unraw().to_string(), quote! { #ident }, f)
                })
            })
            .collect(),
        Fields::Unnamed(fields) => fields
            .unnamed
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let index = Index::from(i);
                (i.to_string(), quote! { #index }, f)
            })
            .collect(),
        Fields::Unit => Vec::new(),
    };

    for (ident_str, member, field) in members {
        let attrs = parse_field_attrs(field)?;
        if attrs.skip {
            continue;
        }

        if let Some(rules) = &attrs.rules {
            if container.strict_rules {
                rule_check::check_rules(&rules.value(), rules.span())?;
            }
        }

        let mut expr = quote! {
            ::tagrule_core::Field::new(
                #ident_str,
                ::tagrule_core::AsFieldValue::as_field_value(&self.#member),
            )
        };
        if let Some(rename) = attrs.external_name() {
            expr = quote! { #expr.with_rename(#rename) };
        }
        if let Some(rules) = &attrs.rules {
            expr = quote! { #expr.with_rules(#rules) };
        }
        if let Some(query) = &attrs.query {
            expr = quote! { #expr.with_query(#query) };
        }

        field_exprs.push(expr);
        field_types.push(field.ty.clone());
    }

    let mut generics = input.generics.clone();
    if generics.type_params().next().is_some() {
        let where_clause = generics.make_where_clause();
        for ty in &field_types {
            where_clause
                .predicates
                .push(syn::parse_quote! { #ty: ::tagrule_core::AsFieldValue });
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::tagrule_core::Record for #name #ty_generics #where_clause {
            fn type_name(&self) -> &'static str {
                #name_str
            }

            fn fields(&self) -> ::std::vec::Vec<::tagrule_core::Field<'_>> {
                ::std::vec![#(#field_exprs),*]
            }
        }

        impl #impl_generics ::tagrule_core::AsFieldValue for #name #ty_generics #where_clause {
            fn as_field_value(&self) -> ::tagrule_core::FieldValue<'_> {
                ::tagrule_core::FieldValue::Record(self)
            }
        }
    })
}
