//! Paths to `vc_shape` items used by generated code.

use proc_macro2::TokenStream;
use quote::quote;

/// Get the correct access path to the `vc_shape` crate.
///
/// 1. For crates that depend on `vc_shape`, `::vc_shape` is returned.
/// 2. For crates that depend on `vc_transform`, `::vc_transform::shape` is returned.
/// 3. Otherwise `::vc_shape` is returned, which may be incorrect.
pub(crate) fn vc_shape() -> syn::Path {
    vc_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("vc_shape"))
}

#[inline(always)]
pub(crate) fn shaped_(vc_shape_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_shape_path::Shaped
    }
}

#[inline(always)]
pub(crate) fn shape_(vc_shape_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_shape_path::Shape
    }
}

#[inline(always)]
pub(crate) fn shape_kind_(vc_shape_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_shape_path::ShapeKind
    }
}

#[inline(always)]
pub(crate) fn struct_shape_(vc_shape_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_shape_path::shape::StructShape
    }
}

#[inline(always)]
pub(crate) fn field_(vc_shape_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_shape_path::Field
    }
}

#[inline(always)]
pub(crate) fn field_flags_(vc_shape_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_shape_path::FieldFlags
    }
}

#[inline(always)]
pub(crate) fn offset_of_(vc_shape_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_shape_path::__macro_exports::offset_of
    }
}

#[inline(always)]
pub(crate) fn non_generic_shape_cell_(vc_shape_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_shape_path::cell::NonGenericShapeCell
    }
}

#[inline(always)]
pub(crate) fn generic_shape_cell_(vc_shape_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_shape_path::cell::GenericShapeCell
    }
}
