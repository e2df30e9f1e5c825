use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;

use serde_core::ser::{SerializeSeq, SerializeStruct};
use serde_core::{Serialize, Serializer};
use vc_ptr::Ptr;

use super::{TransmuteError, TransmutedNode, TransmutedShape};
use crate::ser::ShapeSerializer;
use crate::{DynValue, ShapeKind, ValueRef};

// -----------------------------------------------------------------------------
// ReinterpretMode

/// How a [`Reinterpreter`] presents values under its shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReinterpretMode {
    /// Copies the value into an owned [`TransmutedValue`] tree.
    #[default]
    Reconstruct,
    /// Swaps the descriptor of the value, after checking its type.
    Checked,
    /// Swaps the descriptor of the value without any check.
    Unchecked,
}

// -----------------------------------------------------------------------------
// Reinterpreter

/// Presents values of a record type under one of its serialization shapes.
///
/// All modes serialize to the same output. [`Checked`](ReinterpretMode::Checked)
/// and [`Unchecked`](ReinterpretMode::Unchecked) neither allocate nor copy.
#[derive(Clone, Debug)]
pub struct Reinterpreter {
    shape: Arc<TransmutedShape>,
    mode: ReinterpretMode,
}

impl Reinterpreter {
    /// A reinterpreter that copies values, see [`ReinterpretMode::Reconstruct`].
    pub fn new(shape: Arc<TransmutedShape>) -> Self {
        Self {
            shape,
            mode: ReinterpretMode::Reconstruct,
        }
    }

    pub fn checked(shape: Arc<TransmutedShape>) -> Self {
        Self {
            shape,
            mode: ReinterpretMode::Checked,
        }
    }

    /// # Safety
    /// Every value passed to [`apply`](Self::apply) must have the layout of
    /// the shape `shape` was derived from.
    pub unsafe fn unchecked(shape: Arc<TransmutedShape>) -> Self {
        Self {
            shape,
            mode: ReinterpretMode::Unchecked,
        }
    }

    #[inline]
    pub fn mode(&self) -> ReinterpretMode {
        self.mode
    }

    #[inline]
    pub fn shape(&self) -> &Arc<TransmutedShape> {
        &self.shape
    }

    /// Presents `value` under the serialization shape.
    pub fn apply<'a>(&'a self, value: ValueRef<'a>) -> Result<Transmuted<'a>, TransmuteError> {
        let source = self.shape.source();
        if self.mode != ReinterpretMode::Unchecked {
            let found = value.descriptor().source();
            if found != source {
                return Err(TransmuteError::ShapeMismatch {
                    expected: source.type_path(),
                    found: found.type_path(),
                });
            }
        }

        Ok(match self.mode {
            // SAFETY: the type was checked above, or the caller of
            // `unchecked` guaranteed the layout.
            ReinterpretMode::Checked | ReinterpretMode::Unchecked => {
                Transmuted::Borrowed(unsafe { value.with_transmuted(&self.shape) })
            }
            // SAFETY: the type was checked above.
            ReinterpretMode::Reconstruct => {
                Transmuted::Owned(unsafe { reconstruct(&self.shape, value.data()) })
            }
        })
    }
}

// -----------------------------------------------------------------------------
// Transmuted

/// A value presented under a serialization shape.
#[derive(Debug)]
pub enum Transmuted<'a> {
    /// The original value, described by the serialization shape.
    Borrowed(ValueRef<'a>),
    /// A copy of the value.
    Owned(TransmutedValue),
}

impl Serialize for Transmuted<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Borrowed(value) => value.serialize(serializer),
            Self::Owned(value) => value.serialize(serializer),
        }
    }
}

/// An owned copy of a value, structured by its serialization shape.
#[derive(Clone, Debug)]
pub enum TransmutedValue {
    /// A value serialized by its own shape.
    Leaf(DynValue),
    Struct {
        name: &'static str,
        fields: Vec<(&'static str, TransmutedValue)>,
    },
    List(Vec<TransmutedValue>),
    /// A present optional or non-null pointer.
    Present(Box<TransmutedValue>),
    /// A missing value or a null pointer.
    Absent,
}

/// # Safety
/// `data` must point to a value of `shape.source()`.
unsafe fn reconstruct(shape: &TransmutedShape, data: Ptr<'_>) -> TransmutedValue {
    let source = shape.source();
    match (shape.node(), source.kind()) {
        (TransmutedNode::Struct(fields), _) => TransmutedValue::Struct {
            name: source.type_ident(),
            fields: fields
                .iter()
                .map(|field| {
                    let value = unsafe { reconstruct(field.shape(), data.byte_add(field.offset())) };
                    (field.key(), value)
                })
                .collect(),
        },
        (TransmutedNode::List(item), ShapeKind::List(list)) => {
            let (first, len) = unsafe { list.parts(data) };
            let stride = item.source().size();
            TransmutedValue::List(
                (0..len)
                    .map(|index| unsafe { reconstruct(item, first.byte_add(index * stride)) })
                    .collect(),
            )
        }
        (TransmutedNode::Pointer(pointee), ShapeKind::Pointer(pointer)) => {
            match unsafe { pointer.get(data) } {
                Some(data) if pointer.is_nullable() => {
                    TransmutedValue::Present(Box::new(unsafe { reconstruct(pointee, data) }))
                }
                Some(data) => unsafe { reconstruct(pointee, data) },
                None => TransmutedValue::Absent,
            }
        }
        (TransmutedNode::Optional(inner), ShapeKind::Optional(optional)) => {
            match unsafe { optional.get(data) } {
                Some(data) => TransmutedValue::Present(Box::new(unsafe { reconstruct(inner, data) })),
                None => TransmutedValue::Absent,
            }
        }
        (TransmutedNode::Required(inner), ShapeKind::Required(required)) => {
            match unsafe { required.get(data) } {
                Some(data) => unsafe { reconstruct(inner, data) },
                None => TransmutedValue::Absent,
            }
        }
        // SAFETY: `data` points to a value of `source`.
        _ => TransmutedValue::Leaf(unsafe { source.vtable().to_dyn(data) }),
    }
}

impl Serialize for TransmutedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Leaf(value) => ShapeSerializer {
                shape: value.shape(),
                data: value.as_ptr(),
            }
            .serialize(serializer),
            Self::Struct { name, fields } => {
                let mut state = serializer.serialize_struct(*name, fields.len())?;
                for (key, value) in fields {
                    state.serialize_field(*key, value)?;
                }
                state.end()
            }
            Self::List(items) => {
                let mut state = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    state.serialize_element(item)?;
                }
                state.end()
            }
            Self::Present(value) => serializer.serialize_some(value),
            Self::Absent => serializer.serialize_none(),
        }
    }
}
