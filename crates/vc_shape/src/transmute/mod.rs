//! Serialization shapes keyed by field tags.
//!
//! [`derive_serialization_shape`] mirrors a record shape field by field,
//! keeping every offset and size, but naming each field after the tag it
//! declares for a namespace:
//!
//! ```
//! use vc_shape::transmute::{Reinterpreter, derive_serialization_shape};
//! use vc_shape::{Shaped, ValueRef};
//!
//! #[derive(Clone, Shaped)]
//! struct Engine {
//!     #[shape(tag(json = "hp"))]
//!     pub horse_power: u32,
//!     #[shape(tag(json = "fuel"))]
//!     pub fuel_kind: String,
//! }
//!
//! let shape = derive_serialization_shape(Engine::shape(), "json").unwrap();
//! let reinterpreter = Reinterpreter::checked(shape);
//!
//! let engine = Engine { horse_power: 130, fuel_kind: "gasoline".into() };
//! let value = reinterpreter.apply(ValueRef::new(&engine)).unwrap();
//! assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"hp":130,"fuel":"gasoline"}"#);
//! ```
//!
//! Time values and decimals are never restructured, their own
//! serialization is kept. Records that serialize themselves, records with
//! private fields and records reachable from themselves are rejected.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{Shape, ShapeKind};

// -----------------------------------------------------------------------------
// Modules

mod reinterpret;

// -----------------------------------------------------------------------------
// Exports

pub use reinterpret::{ReinterpretMode, Reinterpreter, Transmuted, TransmutedValue};

/// Tag value that leaves a field out of the serialization shape.
pub const OMIT_TAG: &str = "-";

// -----------------------------------------------------------------------------
// Error

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransmuteError {
    #[error("circular type reference to `{ty}` not supported by transmuter")]
    Circular { ty: &'static str },

    #[error("unexported field `{field}` in transmutable structure `{ty}`")]
    UnexportedField {
        ty: &'static str,
        field: &'static str,
    },

    #[error("transmuting `{ty}`, which owns its serialization")]
    SelfSerializing { ty: &'static str },

    #[error("field `{field}` of `{ty}` declares no `{namespace}` tag")]
    MissingTag {
        ty: &'static str,
        field: &'static str,
        namespace: String,
    },

    #[error("reinterpreting `{found}` under a shape derived from `{expected}`")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

// -----------------------------------------------------------------------------
// TransmutedShape

/// A shape with the layout of [`source`](Self::source) and fields renamed
/// after their serialization tags.
#[derive(Debug)]
pub struct TransmutedShape {
    source: &'static Shape,
    node: TransmutedNode,
}

/// How a [`TransmutedShape`] differs from its source.
#[derive(Debug)]
pub enum TransmutedNode {
    /// Serialized exactly as the source shape.
    Unchanged,
    /// A record, fields in declaration order minus omitted ones.
    Struct(Box<[TransmutedField]>),
    /// A list of records or pointers.
    List(Arc<TransmutedShape>),
    /// A box or a nullable box.
    Pointer(Arc<TransmutedShape>),
    Optional(Arc<TransmutedShape>),
    Required(Arc<TransmutedShape>),
}

/// A record field under its serialization name.
#[derive(Debug)]
pub struct TransmutedField {
    name: &'static str,
    key: &'static str,
    offset: usize,
    shape: Arc<TransmutedShape>,
}

impl TransmutedField {
    /// Name of the field in the source record.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Serialization name.
    #[inline]
    pub fn key(&self) -> &'static str {
        self.key
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn shape(&self) -> &TransmutedShape {
        &self.shape
    }
}

impl TransmutedShape {
    fn unchanged(source: &'static Shape) -> Arc<Self> {
        Arc::new(Self {
            source,
            node: TransmutedNode::Unchanged,
        })
    }

    /// The shape whose memory layout this one follows.
    #[inline]
    pub fn source(&self) -> &'static Shape {
        self.source
    }

    #[inline]
    pub fn node(&self) -> &TransmutedNode {
        &self.node
    }

    #[inline]
    pub fn is_unchanged(&self) -> bool {
        matches!(self.node, TransmutedNode::Unchanged)
    }

    /// Fields of a transmuted record.
    pub fn fields(&self) -> Option<&[TransmutedField]> {
        match &self.node {
            TransmutedNode::Struct(fields) => Some(fields),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// Derivation

/// Derives the serialization shape of `shape` for the tag `namespace`.
///
/// Every record reachable from `shape` (through fields, lists of records or
/// pointers, pointers, optionals and required values) must have only `pub`
/// fields, each tagged for `namespace`. A tag of `"-"` leaves the field out.
pub fn derive_serialization_shape(
    shape: &'static Shape,
    namespace: &str,
) -> Result<Arc<TransmutedShape>, TransmuteError> {
    let mut ancestors = Vec::new();
    let derived = derive(shape, namespace, &mut ancestors)?;
    log::debug!(
        "derived `{namespace}` serialization shape of `{}`",
        shape.type_path()
    );
    Ok(derived)
}

#[inline]
fn is_restructurable(shape: &Shape) -> bool {
    !shape.is::<DateTime<Utc>>() && !shape.is::<Decimal>()
}

fn derive(
    shape: &'static Shape,
    namespace: &str,
    ancestors: &mut Vec<TypeId>,
) -> Result<Arc<TransmutedShape>, TransmuteError> {
    if !is_restructurable(shape) {
        return Ok(TransmutedShape::unchanged(shape));
    }

    if ancestors.contains(&shape.id()) {
        return Err(TransmuteError::Circular {
            ty: shape.type_path(),
        });
    }

    ancestors.push(shape.id());
    let node = derive_node(shape, namespace, ancestors);
    ancestors.pop();

    Ok(Arc::new(TransmutedShape {
        source: shape,
        node: node?,
    }))
}

fn derive_node(
    shape: &'static Shape,
    namespace: &str,
    ancestors: &mut Vec<TypeId>,
) -> Result<TransmutedNode, TransmuteError> {
    let ty = shape.type_path();
    Ok(match shape.kind() {
        ShapeKind::Struct(info) => {
            if shape.is_self_serializing() {
                return Err(TransmuteError::SelfSerializing { ty });
            }
            let mut fields = Vec::with_capacity(info.len());
            for field in info.fields() {
                if field.is_private() {
                    return Err(TransmuteError::UnexportedField {
                        ty,
                        field: field.name(),
                    });
                }
                let Some(key) = field.tag(namespace) else {
                    return Err(TransmuteError::MissingTag {
                        ty,
                        field: field.name(),
                        namespace: namespace.to_string(),
                    });
                };
                if key == OMIT_TAG {
                    continue;
                }
                fields.push(TransmutedField {
                    name: field.name(),
                    key,
                    offset: field.offset(),
                    shape: derive(field.shape(), namespace, ancestors)?,
                });
            }
            TransmutedNode::Struct(fields.into_boxed_slice())
        }
        ShapeKind::List(list) => {
            let item = list.item();
            if item.is_struct() || item.is_pointer() {
                TransmutedNode::List(derive(item, namespace, ancestors)?)
            } else {
                TransmutedNode::Unchanged
            }
        }
        ShapeKind::Pointer(pointer) => {
            TransmutedNode::Pointer(derive(pointer.pointee(), namespace, ancestors)?)
        }
        ShapeKind::Optional(optional) => {
            TransmutedNode::Optional(derive(optional.inner(), namespace, ancestors)?)
        }
        ShapeKind::Required(required) => {
            TransmutedNode::Required(derive(required.inner(), namespace, ancestors)?)
        }
        ShapeKind::Scalar(_) | ShapeKind::DynMap | ShapeKind::Opaque => TransmutedNode::Unchanged,
    })
}
