use alloc::vec::Vec;

use serde_core::ser::{Error as _, SerializeMap, SerializeSeq, SerializeStruct};
use serde_core::{Serialize, Serializer};
use vc_ptr::Ptr;

use crate::{DynMap, Shape, ShapeKind};

/// Serializes the value at `data` as described by `shape`.
pub(crate) struct ShapeSerializer<'a> {
    pub shape: &'static Shape,
    pub data: Ptr<'a>,
}

impl Serialize for ShapeSerializer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let Self { shape, data } = *self;

        if let Some(serialize) = shape.serialize_fn() {
            // SAFETY: `data` points to a value of `shape`.
            return erased_serde::serialize(unsafe { serialize(data) }, serializer);
        }

        match shape.kind() {
            ShapeKind::Struct(info) => {
                let fields = info.fields().iter().filter(|field| !field.is_private());
                let mut state = serializer.serialize_struct(shape.type_ident(), fields.clone().count())?;
                for field in fields {
                    let field_data = unsafe { data.byte_add(field.offset()) };
                    state.serialize_field(
                        field.name(),
                        &ShapeSerializer {
                            shape: field.shape(),
                            data: field_data,
                        },
                    )?;
                }
                state.end()
            }
            ShapeKind::List(list) => {
                let item = list.item();
                let (first, len) = unsafe { list.parts(data) };
                let mut state = serializer.serialize_seq(Some(len))?;
                for index in 0..len {
                    state.serialize_element(&ShapeSerializer {
                        shape: item,
                        data: unsafe { first.byte_add(index * item.size()) },
                    })?;
                }
                state.end()
            }
            ShapeKind::Pointer(pointer) => {
                let pointee = pointer.pointee();
                match unsafe { pointer.get(data) } {
                    Some(data) if pointer.is_nullable() => {
                        serializer.serialize_some(&ShapeSerializer { shape: pointee, data })
                    }
                    Some(data) => ShapeSerializer { shape: pointee, data }.serialize(serializer),
                    None => serializer.serialize_none(),
                }
            }
            ShapeKind::Optional(optional) => match unsafe { optional.get(data) } {
                Some(data) => serializer.serialize_some(&ShapeSerializer {
                    shape: optional.inner(),
                    data,
                }),
                None => serializer.serialize_none(),
            },
            ShapeKind::Required(required) => match unsafe { required.get(data) } {
                Some(data) => ShapeSerializer {
                    shape: required.inner(),
                    data,
                }
                .serialize(serializer),
                None => serializer.serialize_none(),
            },
            ShapeKind::DynMap => {
                // SAFETY: only the map shape has the `DynMap` kind.
                let map = unsafe { data.as_ref::<DynMap>() };
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
                let mut state = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    state.serialize_entry(
                        key,
                        &ShapeSerializer {
                            shape: value.shape(),
                            data: value.as_ptr(),
                        },
                    )?;
                }
                state.end()
            }
            ShapeKind::Scalar(_) | ShapeKind::Opaque => Err(S::Error::custom(format_args!(
                "`{}` has no serialization",
                shape.type_path()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::{DynMap, DynValue, Required, Shaped, ValueRef};

    #[derive(Clone, Shaped)]
    struct Color {
        pub base: String,
        pub metallic: bool,
        #[allow(dead_code, reason = "private fields are not serialized")]
        secret: u8,
    }

    #[derive(Clone, Shaped)]
    struct Palette {
        pub colors: Vec<Color>,
        pub favorite: Option<Box<Color>>,
        pub note: Option<String>,
        pub id: Required<u32>,
    }

    fn json<T: Shaped>(value: &T) -> String {
        serde_json::to_string(&ValueRef::new(value)).unwrap()
    }

    #[test]
    fn nested_records_and_wrappers() {
        let red = Color {
            base: "red".into(),
            metallic: true,
            secret: 9,
        };
        let palette = Palette {
            colors: vec![red.clone()],
            favorite: None,
            note: Some("warm".into()),
            id: Required::new(4),
        };
        assert_eq!(
            json(&palette),
            r#"{"colors":[{"base":"red","metallic":true}],"favorite":null,"note":"warm","id":4}"#
        );
    }

    #[test]
    fn map_keys_are_sorted() {
        let mut map = DynMap::default();
        map.insert("b".into(), DynValue::new(2_u8));
        map.insert("a".into(), DynValue::new(String::from("x")));
        assert_eq!(json(&map), r#"{"a":"x","b":2}"#);
    }

    #[test]
    fn missing_required_is_null() {
        assert_eq!(json(&Required::<u8>::missing()), "null");
        assert_eq!(json(&Box::new(5_u8)), "5");
    }
}
