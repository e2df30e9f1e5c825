use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::cell::{GenericShapeCell, NonGenericShapeCell};
use crate::shape::{ListShape, OptionOps, OptionalShape, PointerShape, RequiredShape};
use crate::{DynMap, Required, Shape, ShapeKind, Shaped};

// SAFETY: the shape is built for `Self` over the shape of `T`.
unsafe impl<T: Shaped> Shaped for Vec<T> {
    fn shape() -> &'static Shape {
        static CELL: GenericShapeCell = GenericShapeCell::new();
        CELL.get_or_insert::<Self>(|| Shape::new::<Self>(ShapeKind::List(ListShape::new::<T>())))
    }

    #[inline]
    fn zero() -> Self {
        Vec::new()
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

// SAFETY: the shape is built for `Self` over the shape of `T`.
unsafe impl<T: Shaped> Shaped for Box<T> {
    fn shape() -> &'static Shape {
        static CELL: GenericShapeCell = GenericShapeCell::new();
        CELL.get_or_insert::<Self>(|| {
            Shape::new::<Self>(ShapeKind::Pointer(PointerShape::boxed::<T>()))
        })
    }

    #[inline]
    fn zero() -> Self {
        Box::new(T::zero())
    }

    /// A box always points somewhere, it is never the null pointer.
    #[inline]
    fn is_zero(&self) -> bool {
        false
    }
}

/// `Option<Box<T>>` is the nullable pointer, any other `Option<T>` is optional.
// SAFETY: the shape is built for `Self` over the shape of `T`.
unsafe impl<T: Shaped> Shaped for Option<T> {
    fn shape() -> &'static Shape {
        static CELL: GenericShapeCell = GenericShapeCell::new();
        CELL.get_or_insert::<Self>(|| {
            let kind = match T::shape().kind() {
                ShapeKind::Pointer(pointer) if !pointer.is_nullable() => {
                    ShapeKind::Pointer(pointer.nullable(OptionOps::of::<T>()))
                }
                _ => ShapeKind::Optional(OptionalShape::new::<T>()),
            };
            Shape::new::<Self>(kind)
        })
    }

    #[inline]
    fn zero() -> Self {
        None
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

// SAFETY: the shape is built for `Self` over the shape of `T`.
unsafe impl<T: Shaped> Shaped for Required<T> {
    fn shape() -> &'static Shape {
        static CELL: GenericShapeCell = GenericShapeCell::new();
        CELL.get_or_insert::<Self>(|| {
            Shape::new::<Self>(ShapeKind::Required(RequiredShape::new::<T>()))
        })
    }

    #[inline]
    fn zero() -> Self {
        Required::missing()
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.is_missing()
    }
}

// SAFETY: the shape is built for `Self` over the shape of `T`.
unsafe impl Shaped for DynMap {
    fn shape() -> &'static Shape {
        static CELL: NonGenericShapeCell = NonGenericShapeCell::new();
        CELL.get_or_init(|| Shape::new::<Self>(ShapeKind::DynMap))
    }

    #[inline]
    fn zero() -> Self {
        DynMap::default()
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}
