//! Compiled value conversion between shaped types.
//!
//! A conversion plan is compiled once per (destination, source) pair from
//! the two [`Shape`](vc_shape::Shape)s, following the
//! [rules below](#conversion-rules), then run on every value
//! without looking at the shapes again. Record pairs are compiled into
//! [`StructCopier`]s, cached by pair and [`CopierOptions`].
//!
//! ```
//! use vc_copier::CopyError;
//! use vc_shape::{Required, Shaped};
//!
//! #[derive(Clone, Shaped)]
//! struct Request {
//!     pub name: Required<String>,
//!     pub tags: Vec<String>,
//!     pub limit: Option<u32>,
//! }
//!
//! #[derive(Clone, Shaped)]
//! struct Query {
//!     pub name: String,
//!     pub tags: Vec<String>,
//!     pub limit: Option<Box<u64>>,
//! }
//!
//! let request = Request {
//!     name: Required::new("users".into()),
//!     tags: vec!["active".into()],
//!     limit: Some(10),
//! };
//! let mut query = Query::zero();
//! vc_copier::copy(&mut query, &request).unwrap();
//! assert_eq!(query.name, "users");
//! assert_eq!(query.limit.as_deref(), Some(&10));
//!
//! let request = Request { name: Required::missing(), ..request };
//! let err = vc_copier::copy(&mut query, &request).unwrap_err();
//! assert!(matches!(err, CopyError::Convert(_)));
//! ```
//!
//! # Conversion rules
//!
//! 1. Identical types are copied (bytes for plain data, a clone otherwise).
//!    Conversions of the [`ConversionRegistry`] are consulted right after.
//! 2. A string into a closed enumeration validates the value.
//! 3. Distinct scalars of the same kind copy the value.
//! 4. Numbers convert into other numeric kinds, narrowing is checked.
//! 5. Times convert to and from protocol timestamps; identifiers, decimals
//!    and language tags to and from strings.
//! 6. A source implementing [`CopyTo`](vc_shape::CopyTo) produces the
//!    destination itself.
//! 7. Pointer into pointer.
//! 8. List into list, item by item.
//! 9. Optional into pointer.
//! 10. Pointer into optional.
//! 11. Anything else into an optional, a zero value becomes absent.
//! 12. A [`Required`](vc_shape::Required) source must hold a value.
//! 13. Value into pointer.
//! 14. Pointer into value, a null pointer leaves the destination as is.
//! 15. Record into record, field by field.
//! 16. Record into a [`DynMap`](vc_shape::DynMap).
//! 17. [`DynMap`](vc_shape::DynMap) into a record.
#![expect(unsafe_code, reason = "Compiled plans read and write through erased pointers.")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod cache;
mod conversion;
mod copier;
mod domain;
mod error;
mod numeric;
mod options;
mod registry;
mod resolver;
mod struct_copier;

// -----------------------------------------------------------------------------
// Top-level exports

pub use cache::{CopierCache, TypePair};
pub use copier::{Cast, Copier, Copying, SliceCopier, ValueCopier, cast};
pub use error::{BoxedError, CompileError, ConvertError, CopyError};
pub use options::CopierOptions;
pub use registry::{ConversionRegistry, CustomConversion};
pub use struct_copier::StructCopier;

use alloc::sync::Arc;
use alloc::vec::Vec;

use vc_shape::{Shape, Shaped};

// -----------------------------------------------------------------------------
// Global engine

/// Copies the record `src` into the record `dst` with the global engine.
#[inline]
pub fn copy<D: Shaped, S: Shaped>(dst: &mut D, src: &S) -> Result<(), CopyError> {
    Copier::global().copy(dst, src)
}

/// Converts a list of records with the global engine.
#[inline]
pub fn copy_map<D: Shaped, S: Shaped>(src: &[S]) -> Result<Vec<D>, CopyError> {
    Copier::global().copy_map(src)
}

/// See [`Copier::struct_copier`].
#[inline]
pub fn struct_copier(
    dst: &'static Shape,
    src: &'static Shape,
) -> Result<Arc<StructCopier>, CompileError> {
    Copier::global().struct_copier(dst, src)
}

/// See [`Copier::struct_copier_with`].
#[inline]
pub fn struct_copier_with(
    dst: &'static Shape,
    src: &'static Shape,
    options: &CopierOptions,
) -> Result<Arc<StructCopier>, CompileError> {
    Copier::global().struct_copier_with(dst, src, options)
}

/// See [`Copier::value_copier`].
#[inline]
pub fn value_copier<D: Shaped, S: Shaped>() -> Result<ValueCopier<D, S>, CompileError> {
    Copier::global().value_copier()
}

/// See [`Copier::slice_copier`].
#[inline]
pub fn slice_copier<D: Shaped, S: Shaped>() -> Result<SliceCopier<D, S>, CompileError> {
    Copier::global().slice_copier()
}

// -----------------------------------------------------------------------------
// Macro exports

/// Items referenced by [`auto_conversion!`] expansions.
#[doc(hidden)]
pub mod __macro_exports {
    #[cfg(feature = "auto_register")]
    pub mod auto_register {
        pub use inventory;

        use crate::ConversionRegistry;

        /// A registration submitted with `auto_conversion!`.
        pub struct AutoConversion(pub fn(&mut ConversionRegistry));

        inventory::collect!(AutoConversion);

        // Always present: a registry that saw it knows collection works on
        // this platform.
        inventory::submit! {
            AutoConversion(ConversionRegistry::mark_auto_registered)
        }
    }
}
