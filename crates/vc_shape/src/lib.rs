//! Runtime shape descriptions for value transformation.
//!
//! A [`Shape`] describes how a type is laid out: its kind, its byte size,
//! and, for records, the ordered list of fields with their offsets, map key
//! overrides and serialization tags. Shapes are built once per type through
//! [`Shaped::shape`] and never change afterwards, so conversion plans can be
//! compiled from them and reused for the lifetime of the process.
//!
//! ```
//! use vc_shape::{Shaped, ShapeKind};
//!
//! #[derive(Clone, Shaped)]
//! struct Engine {
//!     pub hp: u32,
//!     pub fuel: String,
//! }
//!
//! let shape = Engine::shape();
//! let ShapeKind::Struct(info) = shape.kind() else { unreachable!() };
//! assert_eq!(info.field("fuel").unwrap().shape().type_path(), "alloc::string::String");
//! ```
//!
//! Besides description, the crate owns the pieces that operate on shapes
//! without a compiled plan:
//!
//! - [`DynMap`] / [`DynValue`], the dynamic key-value map records convert to and from.
//! - [`ValueRef`], a (descriptor, address) pair that serializes through serde by
//!   walking the shape.
//! - [`transmute`], deriving layout-identical shapes keyed by serialization tags
//!   and reinterpreting values under them.
#![expect(unsafe_code, reason = "Shapes operate on type-erased addresses.")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// Generated code names `vc_shape`, which must also resolve inside this crate
// (tests and doctests derive `Shaped` here).
extern crate self as vc_shape;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod dynamic;
mod required;
mod shaped;

pub mod cell;
pub mod impls;
pub mod ser;
pub mod shape;
pub mod transmute;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use dynamic::{DynMap, DynValue};
pub use required::Required;
pub use ser::ValueRef;
pub use shape::{CopyTo, Field, FieldFlags, ScalarKind, Shape, ShapeFlags, ShapeKind};
pub use shaped::Shaped;
pub use vc_shape_derive::Shaped;

/// Items referenced by `#[derive(Shaped)]` expansions.
#[doc(hidden)]
pub mod __macro_exports {
    pub use core::mem::offset_of;
}
