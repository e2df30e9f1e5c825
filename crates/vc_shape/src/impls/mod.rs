//! [`Shaped`](crate::Shaped) implementations for foreign types.
//!
//! - `primitives`: booleans, characters, numbers and `String`.
//! - `containers`: `Vec<T>`, `Box<T>`, `Option<T>`, `Required<T>` and the dynamic map.
//! - `domain`: times, protocol timestamps, identifiers, decimals and language tags.

mod containers;
mod domain;
mod primitives;

pub use domain::{timestamp_is_valid, timestamp_to_datetime};
