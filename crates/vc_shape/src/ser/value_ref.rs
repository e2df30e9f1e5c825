use core::alloc::Layout;
use core::fmt;

use serde_core::{Serialize, Serializer};
use vc_ptr::Ptr;

use super::{ShapeSerializer, TransmutedSerializer};
use crate::transmute::TransmutedShape;
use crate::{Shape, Shaped};

/// How a [`ValueRef`] is interpreted.
#[derive(Clone, Copy, Debug)]
pub enum Descriptor<'a> {
    /// The shape of the value's own type.
    Shape(&'static Shape),
    /// A layout-identical shape keyed by serialization tags.
    Transmuted(&'a TransmutedShape),
}

impl Descriptor<'_> {
    /// The shape whose memory layout the descriptor follows.
    pub fn source(&self) -> &'static Shape {
        match self {
            Self::Shape(shape) => shape,
            Self::Transmuted(shape) => shape.source(),
        }
    }
}

/// A borrowed value together with its descriptor.
#[derive(Clone, Copy)]
pub struct ValueRef<'a> {
    descriptor: Descriptor<'a>,
    data: Ptr<'a>,
}

impl<'a> ValueRef<'a> {
    /// Borrows `value` under the shape of `T`.
    pub fn new<T: Shaped>(value: &'a T) -> Self {
        Self {
            descriptor: Descriptor::Shape(T::shape()),
            data: Ptr::from_ref(value),
        }
    }

    /// # Safety
    /// `data` must point to a value described by `shape`.
    pub unsafe fn from_raw(shape: &'static Shape, data: Ptr<'a>) -> Self {
        Self {
            descriptor: Descriptor::Shape(shape),
            data,
        }
    }

    /// Swaps the descriptor, keeping the address.
    ///
    /// # Safety
    /// The data must have the layout of `shape`'s source.
    pub(crate) unsafe fn with_transmuted(self, shape: &'a TransmutedShape) -> Self {
        Self {
            descriptor: Descriptor::Transmuted(shape),
            data: self.data,
        }
    }

    #[inline]
    pub fn descriptor(&self) -> Descriptor<'a> {
        self.descriptor
    }

    #[inline]
    pub fn data(&self) -> Ptr<'a> {
        self.data
    }

    #[inline]
    pub fn layout(&self) -> Layout {
        self.descriptor.source().layout()
    }
}

impl Serialize for ValueRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.descriptor {
            Descriptor::Shape(shape) => ShapeSerializer {
                shape,
                data: self.data,
            }
            .serialize(serializer),
            Descriptor::Transmuted(shape) => TransmutedSerializer {
                shape,
                data: self.data,
            }
            .serialize(serializer),
        }
    }
}

impl fmt::Debug for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.descriptor {
            Descriptor::Shape(_) => "shape",
            Descriptor::Transmuted(_) => "transmuted",
        };
        f.debug_struct("ValueRef")
            .field("type", &self.descriptor.source().type_path())
            .field("descriptor", &kind)
            .field("data", &self.data)
            .finish()
    }
}
