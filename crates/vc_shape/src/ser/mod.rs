//! Shape-driven serialization.
//!
//! A [`ValueRef`] pairs a descriptor with the address of a value. Serializing
//! it walks the descriptor: records become serde structs keyed by field name
//! (or, under a transmuted descriptor, by serialization tag), lists become
//! sequences, null pointers and empty optionals become `none`, and leaf types
//! defer to their own serde implementation.
//!
//! Private fields are not serialized.
//!
//! ```
//! use vc_shape::{Shaped, ValueRef};
//!
//! #[derive(Clone, Shaped)]
//! struct Engine {
//!     pub hp: u32,
//!     pub fuel: String,
//! }
//!
//! let engine = Engine { hp: 130, fuel: "gasoline".into() };
//! let json = serde_json::to_string(&ValueRef::new(&engine)).unwrap();
//! assert_eq!(json, r#"{"hp":130,"fuel":"gasoline"}"#);
//! ```

// -----------------------------------------------------------------------------
// Modules

mod shape_serializer;
mod transmuted_serializer;
mod value_ref;

// -----------------------------------------------------------------------------
// Exports

pub(crate) use shape_serializer::ShapeSerializer;
pub(crate) use transmuted_serializer::TransmutedSerializer;
pub use value_ref::{Descriptor, ValueRef};
