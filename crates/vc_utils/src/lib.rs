//! Hash containers shared by the shape and copier crates.
//!
//! Every map keyed by runtime type information lives behind these aliases,
//! so the hashing strategy is chosen in one place.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Modules

mod typeid_map;

pub mod hash;

// -----------------------------------------------------------------------------
// Top-level exports

pub use typeid_map::TypeIdMap;
