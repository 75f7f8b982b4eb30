use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use proc_macro_crate::{FoundCrate, crate_name};
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Error, Field, Fields, LitStr, Result, Type};

/// Path to the engine crate: the facade when present, the core crate as a
/// fallback for direct users.
fn engine_path() -> TokenStream {
    let resolved = crate_name("aquifer").or_else(|_| crate_name("aquifer-core"));
    match resolved {
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) | Err(_) => quote!(::aquifer),
    }
}

pub(crate) fn expand(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "Hydrate cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(Error::new_spanned(
                    struct_name,
                    "Hydrate can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(Error::new_spanned(
                struct_name,
                "Hydrate can only be derived for structs",
            ));
        }
    };

    let root = engine_path();
    let table = parse_table_attr(&input)?
        .unwrap_or_else(|| struct_name.to_string().to_snake_case());

    let field_shapes = fields
        .iter()
        .map(|field| field_shape(&root, struct_name, field))
        .collect::<Result<Vec<_>>>()?;

    Ok(quote! {
        impl #root::scan::Hydrate for #struct_name {
            fn struct_shape() -> #root::scan::StructShape {
                #root::scan::StructShape {
                    type_name: ::core::any::type_name::<#struct_name>(),
                    table: #table,
                    fields: ::std::vec![#(#field_shapes),*],
                }
            }
        }

        impl #root::scan::HydrateField for #struct_name {
            fn field_kind() -> #root::scan::FieldKind {
                #root::scan::FieldKind::Single {
                    shape: <#struct_name as #root::scan::Hydrate>::struct_shape,
                    enter: #root::scan::enter_plain,
                    optional: false,
                }
            }
        }

        impl #root::scan::HydrateField for ::core::option::Option<#struct_name> {
            fn field_kind() -> #root::scan::FieldKind {
                #root::scan::FieldKind::Single {
                    shape: <#struct_name as #root::scan::Hydrate>::struct_shape,
                    enter: #root::scan::enter_option::<#struct_name>,
                    optional: true,
                }
            }
        }

        impl #root::scan::HydrateField for ::std::vec::Vec<#struct_name> {
            fn field_kind() -> #root::scan::FieldKind {
                #root::scan::FieldKind::Collection {
                    shape: <#struct_name as #root::scan::Hydrate>::struct_shape,
                    push: #root::scan::push_vec::<#struct_name>,
                    last: #root::scan::last_vec::<#struct_name>,
                    optional: false,
                }
            }
        }

        impl #root::scan::HydrateField
            for ::core::option::Option<::std::vec::Vec<#struct_name>>
        {
            fn field_kind() -> #root::scan::FieldKind {
                #root::scan::FieldKind::Collection {
                    shape: <#struct_name as #root::scan::Hydrate>::struct_shape,
                    push: #root::scan::push_opt_vec::<#struct_name>,
                    last: #root::scan::last_opt_vec::<#struct_name>,
                    optional: true,
                }
            }
        }
    })
}

/// Parses `#[aquifer(table = "...")]` on the struct itself.
fn parse_table_attr(input: &DeriveInput) -> Result<Option<String>> {
    let mut table = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("aquifer") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let value: LitStr = meta.value()?.parse()?;
                table = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported aquifer attribute; expected `table`"))
            }
        })?;
    }
    Ok(table)
}

struct FieldAttrs {
    column: Option<String>,
    unique: bool,
    flatten: bool,
}

/// Parses `#[aquifer(column = "...", unique, flatten)]` on a field.
fn parse_field_attrs(field: &Field) -> Result<FieldAttrs> {
    let mut attrs = FieldAttrs {
        column: None,
        unique: false,
        flatten: false,
    };
    for attr in &field.attrs {
        if !attr.path().is_ident("aquifer") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("column") {
                let value: LitStr = meta.value()?.parse()?;
                attrs.column = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("unique") {
                attrs.unique = true;
                Ok(())
            } else if meta.path.is_ident("flatten") {
                attrs.flatten = true;
                Ok(())
            } else {
                Err(meta.error(
                    "unsupported aquifer attribute; expected `column`, `unique` or `flatten`",
                ))
            }
        })?;
    }
    Ok(attrs)
}

fn field_shape(root: &TokenStream, struct_name: &syn::Ident, field: &Field) -> Result<TokenStream> {
    let field_ident = field.ident.as_ref().expect("named field");
    let field_name = field_ident.to_string();
    let attrs = parse_field_attrs(field)?;

    let column = match &attrs.column {
        Some(column) => quote!(::core::option::Option::Some(#column)),
        None => quote!(::core::option::Option::None),
    };
    let unique = attrs.unique;
    let flatten = attrs.flatten;

    let field_ty = &field.ty;
    let kind = if wrapper_chain_supported(field_ty) {
        quote!(<#field_ty as #root::scan::HydrateField>::field_kind())
    } else {
        // Lowered to a plan-build-time error naming the field and type,
        // mirroring how unclassifiable shapes are reported at runtime.
        let type_string = quote!(#field_ty).to_string().replace(' ', "");
        quote!(#root::scan::FieldKind::Unsupported { ty: #type_string })
    };

    Ok(quote! {
        #root::scan::FieldShape {
            name: #field_name,
            column: #column,
            unique: #unique,
            flatten: #flatten,
            project: |__parent| {
                &mut #root::scan::downcast_slot::<#struct_name>(__parent).#field_ident
            },
            kind: #kind,
        }
    })
}

#[derive(Clone, Copy, PartialEq)]
enum Wrapper {
    Opt,
    List,
}

/// Peels `Option`/`Vec` wrappers and checks the chain against the shapes
/// the engine classifies; anything else (`Option<Option<_>>`,
/// `Vec<Vec<_>>` beyond blobs, deeper stacks) is unsupported.
fn wrapper_chain_supported(ty: &Type) -> bool {
    use Wrapper::{List, Opt};

    let mut wrappers = Vec::new();
    let mut current = ty;
    loop {
        if let Some(inner) = generic_arg(current, "Option") {
            wrappers.push(Opt);
            current = inner;
        } else if let Some(inner) = generic_arg(current, "Vec") {
            // Vec<u8> is the blob leaf, not a list wrapper.
            if is_u8(inner) {
                break;
            }
            wrappers.push(List);
            current = inner;
        } else {
            break;
        }
    }

    matches!(
        wrappers.as_slice(),
        [] | [Opt] | [List] | [Opt, List] | [List, Opt] | [Opt, List, Opt]
    )
}

/// The single type argument of `name<T>`, matched on the path's last segment.
fn generic_arg<'a>(ty: &'a Type, name: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    if segment.ident != name {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

fn is_u8(ty: &Type) -> bool {
    matches!(ty, Type::Path(path) if path.path.is_ident("u8"))
}
