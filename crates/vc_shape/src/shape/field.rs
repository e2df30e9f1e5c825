use alloc::boxed::Box;
use core::fmt;

use bitflags::bitflags;

use crate::{Shape, Shaped};

bitflags! {
    /// Per-field markers.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u8 {
        /// Excluded from copying (`#[shape(skip)]`).
        const SKIP      = 1 << 0;
        /// Not `pub`. Private fields are skipped by the struct copier, never
        /// exposed through maps or serialization, and block transmutation.
        const PRIVATE   = 1 << 1;
    }
}

/// A named field of a record shape.
#[derive(Clone)]
pub struct Field {
    name: &'static str,
    shape: fn() -> &'static Shape,
    offset: usize,
    flags: FieldFlags,
    key: Option<&'static str>,
    tags: &'static [(&'static str, &'static str)],
}

impl Field {
    /// A field of type `T` located `offset` bytes into its record.
    ///
    /// The field's shape is resolved lazily, so a record may refer to
    /// itself through a pointer or a list.
    pub fn new<T: Shaped>(name: &'static str, offset: usize) -> Self {
        Self {
            name,
            shape: T::shape,
            offset,
            flags: FieldFlags::empty(),
            key: None,
            tags: &[],
        }
    }

    pub fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Overrides the key used when the record converts to or from a map.
    pub fn with_key(mut self, key: &'static str) -> Self {
        self.key = Some(key);
        self
    }

    /// Declares serialization names as `(namespace, name)` pairs.
    pub fn with_tags(mut self, tags: &'static [(&'static str, &'static str)]) -> Self {
        self.tags = tags;
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn shape(&self) -> &'static Shape {
        (self.shape)()
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    #[inline]
    pub fn is_skipped(&self) -> bool {
        self.flags.contains(FieldFlags::SKIP)
    }

    #[inline]
    pub fn is_private(&self) -> bool {
        self.flags.contains(FieldFlags::PRIVATE)
    }

    /// Whether the field takes part in map conversions.
    #[inline]
    pub fn is_map_eligible(&self) -> bool {
        !self.flags.intersects(FieldFlags::SKIP | FieldFlags::PRIVATE)
    }

    /// Map key: the override if declared, the field name otherwise.
    #[inline]
    pub fn key(&self) -> &'static str {
        self.key.unwrap_or(self.name)
    }

    /// Serialization name declared for `namespace`.
    pub fn tag(&self, namespace: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(ns, _)| *ns == namespace)
            .map(|(_, name)| *name)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("offset", &self.offset)
            .field("flags", &self.flags)
            .field("key", &self.key)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

/// Fields of a record shape, in declaration order.
#[derive(Clone, Debug)]
pub struct StructShape {
    fields: Box<[Field]>,
}

impl StructShape {
    pub fn new(fields: impl Into<Box<[Field]>>) -> Self {
        Self {
            fields: fields.into(),
        }
    }

    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}
