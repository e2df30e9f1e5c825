use alloc::string::String;

use crate::cell::NonGenericShapeCell;
use crate::{ScalarKind, Shape, ShapeKind, Shaped};

macro_rules! impl_scalar {
    ($($ty:ty => $kind:ident, $zero:expr;)*) => {$(
        // SAFETY: the shape is built for `Self`.
        unsafe impl Shaped for $ty {
            fn shape() -> &'static Shape {
                static CELL: NonGenericShapeCell = NonGenericShapeCell::new();
                CELL.get_or_init(|| {
                    Shape::new::<Self>(ShapeKind::Scalar(ScalarKind::$kind)).with_serialize::<Self>()
                })
            }

            #[inline]
            fn zero() -> Self {
                $zero
            }

            #[inline]
            fn is_zero(&self) -> bool {
                *self == $zero
            }
        }
    )*};
}

impl_scalar! {
    bool => Bool, false;
    char => Char, '\0';
    i8 => I8, 0;
    i16 => I16, 0;
    i32 => I32, 0;
    i64 => I64, 0;
    isize => Isize, 0;
    u8 => U8, 0;
    u16 => U16, 0;
    u32 => U32, 0;
    u64 => U64, 0;
    usize => Usize, 0;
    f32 => F32, 0.0;
    f64 => F64, 0.0;
}

// SAFETY: the shape is built for `Self`.
unsafe impl Shaped for String {
    fn shape() -> &'static Shape {
        static CELL: NonGenericShapeCell = NonGenericShapeCell::new();
        CELL.get_or_init(|| {
            Shape::new::<Self>(ShapeKind::Scalar(ScalarKind::String)).with_serialize::<Self>()
        })
    }

    #[inline]
    fn zero() -> Self {
        String::new()
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use crate::{ScalarKind, Shaped};

    #[test]
    fn scalar_shapes() {
        assert_eq!(i16::shape().as_scalar(), Some(ScalarKind::I16));
        assert_eq!(String::shape().as_scalar(), Some(ScalarKind::String));
        assert_eq!(f64::shape().size(), 8);
        assert!(i16::shape().serialize_fn().is_some());
    }

    #[test]
    fn scalar_zero() {
        assert!(0_u64.is_zero());
        assert!(!1_u64.is_zero());
        assert!(String::new().is_zero());
        assert!(!'a'.is_zero());
    }
}
