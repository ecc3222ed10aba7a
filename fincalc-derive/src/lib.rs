use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, Meta, Type};

/// Derive macro that generates configuration field information from struct fields.
///
/// For each field, extracts:
/// - Key name (respects #[serde(rename = "...")])
/// - Required (false for `Option<T>` and `#[serde(default)]` fields)
/// - Description (from doc comments)
///
/// Implements `crate::core::ConfigSchema` for the struct.
#[proc_macro_derive(ConfigSchema, attributes(serde))]
pub fn derive_config_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => panic!("ConfigSchema only supports structs with named fields"),
        },
        _ => panic!("ConfigSchema only supports structs"),
    };

    let field_entries: Vec<proc_macro2::TokenStream> = fields
        .iter()
        .map(|field| {
            let field_name = field.ident.as_ref().unwrap().to_string();
            let serde = serde_options(&field.attrs);

            let key = serde.rename.unwrap_or(field_name);
            let required = !serde.has_default && !is_option_type(&field.ty);
            let description = get_doc_comment(&field.attrs);

            quote! {
                crate::core::ConfigField {
                    name: #key,
                    required: #required,
                    description: #description,
                }
            }
        })
        .collect();

    let expanded = quote! {
        impl crate::core::ConfigSchema for #name {
            fn config_fields() -> &'static [crate::core::ConfigField] {
                static FIELDS: &[crate::core::ConfigField] = &[
                    #(#field_entries),*
                ];
                FIELDS
            }
        }
    };

    TokenStream::from(expanded)
}

#[derive(Default)]
struct SerdeOptions {
    rename: Option<String>,
    has_default: bool,
}

fn serde_options(attrs: &[syn::Attribute]) -> SerdeOptions {
    let mut options = SerdeOptions::default();
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }

        if let Meta::List(meta_list) = &attr.meta {
            let tokens = meta_list.tokens.to_string();
            if options.rename.is_none() {
                options.rename = parse_rename(&tokens);
            }
            // `default` or `default = "path"`
            if tokens
                .split(',')
                .any(|part| part.trim().starts_with("default"))
            {
                options.has_default = true;
            }
        }
    }
    options
}

fn parse_rename(tokens: &str) -> Option<String> {
    let start = tokens.find("rename")?;
    let rest = &tokens[start..];
    let eq_pos = rest.find('=')?;
    let after_eq = rest[eq_pos + 1..].trim();
    let stripped = after_eq.strip_prefix('"')?;
    let end_quote = stripped.find('"')?;
    Some(stripped[..end_quote].to_string())
}

fn get_doc_comment(attrs: &[syn::Attribute]) -> String {
    attrs
        .iter()
        .filter_map(|attr| {
            if !attr.path().is_ident("doc") {
                return None;
            }
            if let Meta::NameValue(meta) = &attr.meta {
                if let syn::Expr::Lit(expr_lit) = &meta.value {
                    if let Lit::Str(lit_str) = &expr_lit.lit {
                        return Some(lit_str.value().trim().to_string());
                    }
                }
            }
            None
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}
