//! See [`Shaped`].
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static SHAPE_ATTRIBUTE_NAME: &str = "shape";

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod path;
mod shaped;

// -----------------------------------------------------------------------------
// Macros

/// # Shape Derivation
///
/// `#[derive(Shaped)]` implements `Shaped` for structs with named fields and
/// for transparent newtypes. The type must also implement `Clone`.
///
/// ## Records
///
/// Every field type must implement `Shaped`. Fields that are not `pub` are
/// marked private: the struct copier skips them on the source side, map
/// conversions and serialization leave them out, and transmutation rejects
/// them.
///
/// ```rust, ignore
/// #[derive(Clone, Shaped)]
/// struct Car {
///     #[shape(tag(json = "make", yaml = "Make"))]
///     pub make: String,
///     #[shape(key = "Num")]
///     pub number: u32,
///     #[shape(skip)]
///     pub cache: Vec<u8>,
/// }
/// ```
///
/// Field attributes:
///
/// - `skip`: never copied.
/// - `key = "..."`: key used instead of the field name in map conversions.
/// - `tag(namespace = "...")`: serialization name for a tag namespace, used
///   by serialization shapes. `"-"` leaves the field out.
///
/// Type attributes:
///
/// - `serde`: the type owns its serialization. Requires `serde::Serialize`,
///   which is then used by shape-driven serialization.
/// - `copy_to`: conversions out of the type defer to its `CopyTo` impl.
///
/// ## Newtypes
///
/// A `#[repr(transparent)]` single-field tuple struct marked
/// `#[shape(transparent)]` shares the kind of its field. String newtypes can
/// be restricted to a closed set of members:
///
/// ```rust, ignore
/// #[derive(Clone, Shaped)]
/// #[repr(transparent)]
/// #[shape(transparent, closed_enum("a1", "b2"))]
/// struct Grade(String);
/// ```
#[proc_macro_derive(Shaped, attributes(shape))]
pub fn derive_shaped(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    shaped::impl_shaped(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
