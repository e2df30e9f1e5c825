//! Conversions between numeric scalars of different kinds.

use alloc::string::ToString;
use core::fmt;

use vc_ptr::{Ptr, PtrMut};
use vc_shape::{ScalarKind, Shape};

use crate::ConvertError;

#[derive(Clone, Copy, Debug)]
enum Number {
    Int(i128),
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => fmt::Display::fmt(value, f),
            Self::Float(value) => fmt::Display::fmt(value, f),
        }
    }
}

/// Plan converting one numeric kind into another.
///
/// Widening is infallible. Integer narrowing and signedness changes are
/// checked on every value. Any integer converts into either float kind,
/// rounding to the nearest representable value when it is wider than the
/// mantissa. Floats never convert into integers and `f64` never into `f32`,
/// those pairs have no plan.
#[derive(Clone, Copy, Debug)]
pub(crate) struct NumericConversion {
    dst: ScalarKind,
    src: ScalarKind,
    dst_ty: &'static str,
}

impl NumericConversion {
    pub fn new(dst: &'static Shape, src: &'static Shape) -> Option<Self> {
        let (dst_kind, src_kind) = (dst.as_scalar()?, src.as_scalar()?);
        if !dst_kind.is_numeric() || !src_kind.is_numeric() {
            return None;
        }
        let allowed = match (dst_kind, src_kind.is_float()) {
            (ScalarKind::F64, true) => true,
            (ScalarKind::F32, true) => src_kind == ScalarKind::F32,
            (_, true) => false,
            _ => true,
        };
        allowed.then_some(Self {
            dst: dst_kind,
            src: src_kind,
            dst_ty: dst.type_path(),
        })
    }

    /// # Safety
    /// `dst` and `src` must point to values of the planned kinds.
    pub unsafe fn run(&self, dst: PtrMut<'_>, src: Ptr<'_>) -> Result<(), ConvertError> {
        let number = unsafe { read(self.src, src) };
        if unsafe { write(self.dst, dst, number) } {
            Ok(())
        } else {
            Err(ConvertError::NumericOverflow {
                value: number.to_string(),
                ty: self.dst_ty,
            })
        }
    }
}

unsafe fn read(kind: ScalarKind, src: Ptr<'_>) -> Number {
    // SAFETY: the caller guarantees `src` holds a value of `kind`.
    unsafe {
        match kind {
            ScalarKind::I8 => Number::Int(i128::from(*src.as_ref::<i8>())),
            ScalarKind::I16 => Number::Int(i128::from(*src.as_ref::<i16>())),
            ScalarKind::I32 => Number::Int(i128::from(*src.as_ref::<i32>())),
            ScalarKind::I64 => Number::Int(i128::from(*src.as_ref::<i64>())),
            ScalarKind::Isize => Number::Int(*src.as_ref::<isize>() as i128),
            ScalarKind::U8 => Number::Int(i128::from(*src.as_ref::<u8>())),
            ScalarKind::U16 => Number::Int(i128::from(*src.as_ref::<u16>())),
            ScalarKind::U32 => Number::Int(i128::from(*src.as_ref::<u32>())),
            ScalarKind::U64 => Number::Int(i128::from(*src.as_ref::<u64>())),
            ScalarKind::Usize => Number::Int(*src.as_ref::<usize>() as i128),
            ScalarKind::F32 => Number::Float(f64::from(*src.as_ref::<f32>())),
            ScalarKind::F64 => Number::Float(*src.as_ref::<f64>()),
            ScalarKind::Bool | ScalarKind::Char | ScalarKind::String => {
                unreachable!("numeric plans only hold numeric kinds")
            }
        }
    }
}

/// Writes `number` as `kind`, `false` when it does not fit.
unsafe fn write(kind: ScalarKind, dst: PtrMut<'_>, number: Number) -> bool {
    macro_rules! integer {
        ($ty:ty) => {
            match number {
                Number::Int(value) => match <$ty>::try_from(value) {
                    Ok(value) => {
                        // SAFETY: the caller guarantees `dst` holds a value of `kind`.
                        *unsafe { dst.consume::<$ty>() } = value;
                        true
                    }
                    Err(_) => false,
                },
                Number::Float(_) => false,
            }
        };
    }

    // Wide integers round to the nearest float.
    macro_rules! float {
        ($ty:ty) => {{
            let value = match number {
                Number::Int(value) => value as $ty,
                Number::Float(value) => value as $ty,
            };
            // SAFETY: the caller guarantees `dst` holds a value of `kind`.
            *unsafe { dst.consume::<$ty>() } = value;
            true
        }};
    }

    match kind {
        ScalarKind::I8 => integer!(i8),
        ScalarKind::I16 => integer!(i16),
        ScalarKind::I32 => integer!(i32),
        ScalarKind::I64 => integer!(i64),
        ScalarKind::Isize => integer!(isize),
        ScalarKind::U8 => integer!(u8),
        ScalarKind::U16 => integer!(u16),
        ScalarKind::U32 => integer!(u32),
        ScalarKind::U64 => integer!(u64),
        ScalarKind::Usize => integer!(usize),
        ScalarKind::F32 => float!(f32),
        ScalarKind::F64 => float!(f64),
        ScalarKind::Bool | ScalarKind::Char | ScalarKind::String => false,
    }
}
