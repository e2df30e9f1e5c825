//! Lifetime-carrying type-erased pointers and the raw copy primitive used by
//! compiled conversion plans.
//!
//! **Ptr** and **PtrMut**
//!
//! [`Ptr<'a>`] and [`PtrMut<'a>`] are type-erased `&T` and `&mut T` equivalents.
//! A conversion plan only knows byte offsets and layouts, so every field access
//! goes through these pointers. Compared to raw pointers they keep a lifetime
//! and offer alignment checks in debug builds.
//!
//! **memcopy**
//!
//! [`memcopy`] copies a fixed number of bytes between two erased addresses,
//! with specialized paths for the 8, 16 and 24 byte sizes that dominate
//! plain-old-data fields.
#![expect(unsafe_code, reason = "Raw pointers are inherently unsafe.")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Modules

mod memcopy;
mod type_erased;

// -----------------------------------------------------------------------------
// Top-level exports

pub use memcopy::memcopy;
pub use type_erased::{Ptr, PtrMut};
