use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, FieldsNamed, FieldsUnnamed, Generics, Visibility};

use crate::attributes::{FieldAttributes, TypeAttributes};

/// Generate the `Shaped` implementation of a derive input.
pub(crate) fn impl_shaped(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let attrs = TypeAttributes::parse_attrs(&ast.attrs)?;
    let vc_shape_path = crate::path::vc_shape();

    let Data::Struct(data) = &ast.data else {
        return Err(syn::Error::new(
            ast.ident.span(),
            "`Shaped` can only be derived for structs",
        ));
    };

    let body = match &data.fields {
        Fields::Named(fields) if attrs.transparent.is_none() => {
            if let Some(members) = &attrs.closed_enum {
                return Err(syn::Error::new(
                    members[0].span(),
                    "`closed_enum` requires `#[shape(transparent)]`",
                ));
            }
            struct_body(&vc_shape_path, &attrs, fields)?
        }
        Fields::Unnamed(fields) if attrs.transparent.is_some() => {
            transparent_body(&vc_shape_path, &attrs, fields)?
        }
        _ => {
            return Err(syn::Error::new(
                ast.ident.span(),
                "`Shaped` needs named fields, or a newtype with `#[shape(transparent)]`",
            ));
        }
    };

    let ShapedBody {
        shape,
        zero,
        is_zero,
    } = body;

    let shaped_ = crate::path::shaped_(&vc_shape_path);
    let shape_ = crate::path::shape_(&vc_shape_path);

    let cell_tokens = if ast.generics.type_params().next().is_some() {
        let cell_ = crate::path::generic_shape_cell_(&vc_shape_path);
        quote! {
            static CELL: #cell_ = #cell_::new();
            CELL.get_or_insert::<Self>(|| { #shape })
        }
    } else {
        let cell_ = crate::path::non_generic_shape_cell_(&vc_shape_path);
        quote! {
            static CELL: #cell_ = #cell_::new();
            CELL.get_or_init(|| { #shape })
        }
    };

    let ident = &ast.ident;
    let generics = add_shaped_bounds(&ast.generics, &shaped_);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        // SAFETY: the shape is built from `Self` and its own fields.
        #[allow(unsafe_code)]
        unsafe impl #impl_generics #shaped_ for #ident #ty_generics #where_clause {
            fn shape() -> &'static #shape_ {
                #cell_tokens
            }

            #[inline]
            fn zero() -> Self {
                #zero
            }

            #[inline]
            fn is_zero(&self) -> bool {
                #is_zero
            }
        }
    })
}

struct ShapedBody {
    shape: TokenStream,
    zero: TokenStream,
    is_zero: TokenStream,
}

fn add_shaped_bounds(generics: &Generics, shaped_: &TokenStream) -> Generics {
    let mut generics = generics.clone();
    let params: Vec<_> = generics.type_params().map(|param| param.ident.clone()).collect();
    let where_clause = generics.make_where_clause();
    for param in params {
        where_clause.predicates.push(syn::parse_quote!(#param: #shaped_));
    }
    generics
}

// -----------------------------------------------------------------------------
// Records

fn struct_body(
    vc_shape_path: &syn::Path,
    attrs: &TypeAttributes,
    fields: &FieldsNamed,
) -> syn::Result<ShapedBody> {
    let shaped_ = crate::path::shaped_(vc_shape_path);
    let shape_ = crate::path::shape_(vc_shape_path);
    let shape_kind_ = crate::path::shape_kind_(vc_shape_path);
    let struct_shape_ = crate::path::struct_shape_(vc_shape_path);
    let field_ = crate::path::field_(vc_shape_path);
    let field_flags_ = crate::path::field_flags_(vc_shape_path);
    let offset_of_ = crate::path::offset_of_(vc_shape_path);

    let mut field_tokens = Vec::with_capacity(fields.named.len());
    let mut zero_tokens = Vec::with_capacity(fields.named.len());
    let mut is_zero_tokens = Vec::with_capacity(fields.named.len());

    for field in &fields.named {
        let field_attrs = FieldAttributes::parse_attrs(&field.attrs)?;
        let Some(ident) = &field.ident else {
            unreachable!("named fields have identifiers");
        };
        let ty = &field.ty;
        let name = ident.to_string();

        let skip = field_attrs
            .skip
            .then(|| quote! { .with_flags(#field_flags_::SKIP) });
        let private = (!matches!(field.vis, Visibility::Public(_)))
            .then(|| quote! { .with_flags(#field_flags_::PRIVATE) });
        let key = field_attrs.key.map(|key| quote! { .with_key(#key) });
        let tags = (!field_attrs.tags.is_empty()).then(|| {
            let tags = field_attrs
                .tags
                .iter()
                .map(|(namespace, name)| quote! { (#namespace, #name) });
            quote! { .with_tags(&[#(#tags),*]) }
        });

        field_tokens.push(quote_spanned! { field.span() =>
            #field_::new::<#ty>(#name, #offset_of_!(Self, #ident))
                #skip
                #private
                #key
                #tags
        });
        zero_tokens.push(quote! { #ident: <#ty as #shaped_>::zero() });
        is_zero_tokens.push(quote! { #shaped_::is_zero(&self.#ident) });
    }

    let serde = attrs
        .serde
        .map(|span| quote_spanned! { span => .with_self_serializing::<Self>() });
    let copy_to = attrs
        .copy_to
        .map(|span| quote_spanned! { span => .with_copy_to::<Self>() });

    Ok(ShapedBody {
        shape: quote! {
            #shape_::new::<Self>(#shape_kind_::Struct(#struct_shape_::new([
                #(#field_tokens),*
            ])))
            #serde
            #copy_to
        },
        zero: quote! {
            Self { #(#zero_tokens),* }
        },
        is_zero: quote! {
            true #(&& #is_zero_tokens)*
        },
    })
}

// -----------------------------------------------------------------------------
// Newtypes

fn transparent_body(
    vc_shape_path: &syn::Path,
    attrs: &TypeAttributes,
    fields: &FieldsUnnamed,
) -> syn::Result<ShapedBody> {
    let Some(span) = attrs.transparent else {
        unreachable!("checked by the caller");
    };
    if !attrs.repr_transparent {
        return Err(syn::Error::new(
            span,
            "`#[shape(transparent)]` requires `#[repr(transparent)]`",
        ));
    }
    if fields.unnamed.len() != 1 {
        return Err(syn::Error::new(
            fields.span(),
            "`#[shape(transparent)]` requires exactly one field",
        ));
    }
    if let Some(span) = attrs.serde.or(attrs.copy_to) {
        return Err(syn::Error::new(
            span,
            "transparent newtypes take the serialization and capabilities of their field",
        ));
    }

    let shaped_ = crate::path::shaped_(vc_shape_path);
    let shape_ = crate::path::shape_(vc_shape_path);
    let inner = &fields.unnamed[0].ty;

    let closed_enum = attrs
        .closed_enum
        .as_ref()
        .map(|members| quote! { .with_closed_enum(&[#(#members),*]) });

    Ok(ShapedBody {
        shape: quote! {
            #shape_::transparent::<Self, #inner>()
            #closed_enum
        },
        zero: quote! {
            Self(<#inner as #shaped_>::zero())
        },
        is_zero: quote! {
            #shaped_::is_zero(&self.0)
        },
    })
}
