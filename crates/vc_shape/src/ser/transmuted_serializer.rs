use serde_core::ser::{SerializeSeq, SerializeStruct};
use serde_core::{Serialize, Serializer};
use vc_ptr::Ptr;

use super::ShapeSerializer;
use crate::ShapeKind;
use crate::transmute::{TransmutedNode, TransmutedShape};

/// Serializes the value at `data` under a serialization shape.
///
/// Walks the same memory as [`ShapeSerializer`] would for the source shape,
/// only record keys differ.
pub(crate) struct TransmutedSerializer<'a> {
    pub shape: &'a TransmutedShape,
    pub data: Ptr<'a>,
}

impl Serialize for TransmutedSerializer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Self { shape, data } = *self;
        let source = shape.source();

        match (shape.node(), source.kind()) {
            (TransmutedNode::Struct(fields), _) => {
                let mut state = serializer.serialize_struct(source.type_ident(), fields.len())?;
                for field in fields.iter() {
                    state.serialize_field(
                        field.key(),
                        &TransmutedSerializer {
                            shape: field.shape(),
                            data: unsafe { data.byte_add(field.offset()) },
                        },
                    )?;
                }
                state.end()
            }
            (TransmutedNode::List(item), ShapeKind::List(list)) => {
                let (first, len) = unsafe { list.parts(data) };
                let stride = item.source().size();
                let mut state = serializer.serialize_seq(Some(len))?;
                for index in 0..len {
                    state.serialize_element(&TransmutedSerializer {
                        shape: item,
                        data: unsafe { first.byte_add(index * stride) },
                    })?;
                }
                state.end()
            }
            (TransmutedNode::Pointer(pointee), ShapeKind::Pointer(pointer)) => {
                match unsafe { pointer.get(data) } {
                    Some(data) if pointer.is_nullable() => {
                        serializer.serialize_some(&TransmutedSerializer {
                            shape: pointee,
                            data,
                        })
                    }
                    Some(data) => TransmutedSerializer {
                        shape: pointee,
                        data,
                    }
                    .serialize(serializer),
                    None => serializer.serialize_none(),
                }
            }
            (TransmutedNode::Optional(inner), ShapeKind::Optional(optional)) => {
                match unsafe { optional.get(data) } {
                    Some(data) => serializer.serialize_some(&TransmutedSerializer {
                        shape: inner,
                        data,
                    }),
                    None => serializer.serialize_none(),
                }
            }
            (TransmutedNode::Required(inner), ShapeKind::Required(required)) => {
                match unsafe { required.get(data) } {
                    Some(data) => TransmutedSerializer { shape: inner, data }.serialize(serializer),
                    None => serializer.serialize_none(),
                }
            }
            _ => ShapeSerializer {
                shape: source,
                data,
            }
            .serialize(serializer),
        }
    }
}
