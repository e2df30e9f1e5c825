#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use vc_copier as copier;
pub use vc_ptr as ptr;
pub use vc_shape as shape;
pub use vc_utils as utils;

pub use vc_copier::{Copier, CopyError, Copying, auto_conversion, copy, copy_map};
pub use vc_shape::{DynMap, DynValue, Required, Shape, Shaped, ValueRef};
