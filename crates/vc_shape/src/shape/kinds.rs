use alloc::boxed::Box;
use alloc::vec::Vec;
use core::iter;

use vc_ptr::{Ptr, PtrMut};

use crate::{Shape, Shaped};

// -----------------------------------------------------------------------------
// ScalarKind

/// Scalar representations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    String,
}

impl ScalarKind {
    #[inline]
    pub fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    #[inline]
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::Isize
        )
    }

    #[inline]
    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            Self::U8 | Self::U16 | Self::U32 | Self::U64 | Self::Usize
        )
    }

    #[inline]
    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    #[inline]
    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Width in bits of numeric kinds.
    pub fn bits(self) -> Option<u32> {
        Some(match self {
            Self::I8 | Self::U8 => 8,
            Self::I16 | Self::U16 => 16,
            Self::I32 | Self::U32 | Self::F32 => 32,
            Self::I64 | Self::U64 | Self::F64 => 64,
            Self::Isize | Self::Usize => usize::BITS,
            Self::Bool | Self::Char | Self::String => return None,
        })
    }
}

// -----------------------------------------------------------------------------
// List

/// Type-erased operations on a `Vec<T>`.
#[derive(Clone, Copy, Debug)]
pub struct ListOps {
    parts: unsafe fn(Ptr<'_>) -> (Ptr<'_>, usize),
    reset: unsafe fn(PtrMut<'_>, usize) -> PtrMut<'_>,
}

impl ListOps {
    pub fn of<T: Shaped>() -> Self {
        Self {
            parts: vec_parts::<T>,
            reset: vec_reset::<T>,
        }
    }
}

unsafe fn vec_parts<T: 'static>(list: Ptr<'_>) -> (Ptr<'_>, usize) {
    // SAFETY: list shapes only hand out pointers to their own `Vec<T>`.
    let list = unsafe { list.as_ref::<Vec<T>>() };
    (Ptr::from_ref(list.as_slice()), list.len())
}

unsafe fn vec_reset<T: Shaped>(list: PtrMut<'_>, len: usize) -> PtrMut<'_> {
    // SAFETY: list shapes only hand out pointers to their own `Vec<T>`.
    let list = unsafe { list.consume::<Vec<T>>() };
    list.clear();
    list.extend(iter::repeat_with(T::zero).take(len));
    PtrMut::from_mut(list.as_mut_slice())
}

/// A `Vec<T>`.
#[derive(Clone, Debug)]
pub struct ListShape {
    item: fn() -> &'static Shape,
    ops: ListOps,
}

impl ListShape {
    pub fn new<T: Shaped>() -> Self {
        Self {
            item: T::shape,
            ops: ListOps::of::<T>(),
        }
    }

    #[inline]
    pub fn item(&self) -> &'static Shape {
        (self.item)()
    }

    /// Address of the first item and the item count.
    ///
    /// # Safety
    /// `list` must point to a value of this shape.
    #[inline]
    pub unsafe fn parts<'a>(&self, list: Ptr<'a>) -> (Ptr<'a>, usize) {
        unsafe { (self.ops.parts)(list) }
    }

    /// Replaces the content with `len` zero items and returns the address
    /// of the first one.
    ///
    /// # Safety
    /// `list` must point to a value of this shape.
    #[inline]
    pub unsafe fn reset<'a>(&self, list: PtrMut<'a>, len: usize) -> PtrMut<'a> {
        unsafe { (self.ops.reset)(list, len) }
    }
}

// -----------------------------------------------------------------------------
// Box and Option

/// Type-erased operations on a `Box<T>`.
#[derive(Clone, Copy, Debug)]
pub struct BoxOps {
    deref: unsafe fn(Ptr<'_>) -> Ptr<'_>,
    deref_mut: unsafe fn(PtrMut<'_>) -> PtrMut<'_>,
    reset: unsafe fn(PtrMut<'_>) -> PtrMut<'_>,
}

impl BoxOps {
    pub fn of<T: Shaped>() -> Self {
        Self {
            deref: box_deref::<T>,
            deref_mut: box_deref_mut::<T>,
            reset: box_reset::<T>,
        }
    }
}

unsafe fn box_deref<T: 'static>(ptr: Ptr<'_>) -> Ptr<'_> {
    // SAFETY: pointer shapes only hand out pointers to their own `Box<T>`.
    Ptr::from_ref(&**unsafe { ptr.as_ref::<Box<T>>() })
}

unsafe fn box_deref_mut<T: 'static>(ptr: PtrMut<'_>) -> PtrMut<'_> {
    // SAFETY: pointer shapes only hand out pointers to their own `Box<T>`.
    PtrMut::from_mut(&mut **unsafe { ptr.consume::<Box<T>>() })
}

unsafe fn box_reset<T: Shaped>(ptr: PtrMut<'_>) -> PtrMut<'_> {
    // SAFETY: pointer shapes only hand out pointers to their own `Box<T>`.
    let boxed = unsafe { ptr.consume::<Box<T>>() };
    **boxed = T::zero();
    PtrMut::from_mut(&mut **boxed)
}

/// Type-erased operations on an `Option<T>`.
#[derive(Clone, Copy, Debug)]
pub struct OptionOps {
    get: unsafe fn(Ptr<'_>) -> Option<Ptr<'_>>,
    insert: unsafe fn(PtrMut<'_>) -> PtrMut<'_>,
    clear: unsafe fn(PtrMut<'_>),
}

impl OptionOps {
    pub fn of<T: Shaped>() -> Self {
        Self {
            get: option_get::<T>,
            insert: option_insert::<T>,
            clear: option_clear::<T>,
        }
    }
}

unsafe fn option_get<T: 'static>(ptr: Ptr<'_>) -> Option<Ptr<'_>> {
    // SAFETY: option shapes only hand out pointers to their own `Option<T>`.
    unsafe { ptr.as_ref::<Option<T>>() }.as_ref().map(Ptr::from_ref)
}

unsafe fn option_insert<T: Shaped>(ptr: PtrMut<'_>) -> PtrMut<'_> {
    // SAFETY: option shapes only hand out pointers to their own `Option<T>`.
    let slot = unsafe { ptr.consume::<Option<T>>() };
    PtrMut::from_mut(slot.insert(T::zero()))
}

unsafe fn option_clear<T: 'static>(ptr: PtrMut<'_>) {
    // SAFETY: option shapes only hand out pointers to their own `Option<T>`.
    *unsafe { ptr.consume::<Option<T>>() } = None;
}

/// A pointer: `Box<T>`, or the nullable `Option<Box<T>>`.
#[derive(Clone, Debug)]
pub struct PointerShape {
    pointee: fn() -> &'static Shape,
    boxed: BoxOps,
    slot: Option<OptionOps>,
}

impl PointerShape {
    /// `Box<T>`.
    pub fn boxed<T: Shaped>() -> Self {
        Self {
            pointee: T::shape,
            boxed: BoxOps::of::<T>(),
            slot: None,
        }
    }

    /// Wraps this `Box<T>` description into `Option<Box<T>>`, `slot`
    /// operating on the option.
    pub fn nullable(&self, slot: OptionOps) -> Self {
        Self {
            pointee: self.pointee,
            boxed: self.boxed,
            slot: Some(slot),
        }
    }

    #[inline]
    pub fn pointee(&self) -> &'static Shape {
        (self.pointee)()
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        self.slot.is_some()
    }

    /// Address of the pointee, `None` for a null pointer.
    ///
    /// # Safety
    /// `ptr` must point to a value of this shape.
    pub unsafe fn get<'a>(&self, ptr: Ptr<'a>) -> Option<Ptr<'a>> {
        let boxed = match self.slot {
            Some(slot) => unsafe { (slot.get)(ptr) }?,
            None => ptr,
        };
        Some(unsafe { (self.boxed.deref)(boxed) })
    }

    /// Points the pointer at fresh zero storage and returns its address.
    ///
    /// # Safety
    /// `ptr` must point to a value of this shape.
    pub unsafe fn allocate<'a>(&self, ptr: PtrMut<'a>) -> PtrMut<'a> {
        match self.slot {
            Some(slot) => unsafe { (self.boxed.deref_mut)((slot.insert)(ptr)) },
            None => unsafe { (self.boxed.reset)(ptr) },
        }
    }

    /// Sets a nullable pointer to null. A `Box<T>` is left unchanged.
    ///
    /// # Safety
    /// `ptr` must point to a value of this shape.
    pub unsafe fn clear(&self, ptr: PtrMut<'_>) {
        if let Some(slot) = self.slot {
            unsafe { (slot.clear)(ptr) }
        }
    }
}

/// An `Option<T>` whose `T` is not a box.
#[derive(Clone, Debug)]
pub struct OptionalShape {
    inner: fn() -> &'static Shape,
    ops: OptionOps,
}

impl OptionalShape {
    pub fn new<T: Shaped>() -> Self {
        Self {
            inner: T::shape,
            ops: OptionOps::of::<T>(),
        }
    }

    #[inline]
    pub fn inner(&self) -> &'static Shape {
        (self.inner)()
    }

    /// Address of the present value.
    ///
    /// # Safety
    /// `ptr` must point to a value of this shape.
    #[inline]
    pub unsafe fn get<'a>(&self, ptr: Ptr<'a>) -> Option<Ptr<'a>> {
        unsafe { (self.ops.get)(ptr) }
    }

    /// Makes the value present with a zero inner value and returns its address.
    ///
    /// # Safety
    /// `ptr` must point to a value of this shape.
    #[inline]
    pub unsafe fn insert<'a>(&self, ptr: PtrMut<'a>) -> PtrMut<'a> {
        unsafe { (self.ops.insert)(ptr) }
    }

    /// # Safety
    /// `ptr` must point to a value of this shape.
    #[inline]
    pub unsafe fn clear(&self, ptr: PtrMut<'_>) {
        unsafe { (self.ops.clear)(ptr) }
    }
}

/// A [`Required<T>`](crate::Required).
#[derive(Clone, Debug)]
pub struct RequiredShape {
    inner: fn() -> &'static Shape,
    ops: OptionOps,
}

impl RequiredShape {
    /// `Required<T>` is a transparent `Option<T>`, both share operations.
    pub fn new<T: Shaped>() -> Self {
        Self {
            inner: T::shape,
            ops: OptionOps::of::<T>(),
        }
    }

    #[inline]
    pub fn inner(&self) -> &'static Shape {
        (self.inner)()
    }

    /// Address of the held value, `None` when the value is missing.
    ///
    /// # Safety
    /// `ptr` must point to a value of this shape.
    #[inline]
    pub unsafe fn get<'a>(&self, ptr: Ptr<'a>) -> Option<Ptr<'a>> {
        unsafe { (self.ops.get)(ptr) }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use vc_ptr::{Ptr, PtrMut};

    use super::ScalarKind;
    use crate::{Shaped, ShapeKind};

    #[test]
    fn scalar_classification() {
        assert!(ScalarKind::I8.is_signed());
        assert!(ScalarKind::Usize.is_unsigned());
        assert!(ScalarKind::F32.is_numeric());
        assert!(!ScalarKind::String.is_numeric());
        assert_eq!(ScalarKind::U16.bits(), Some(16));
        assert_eq!(ScalarKind::Bool.bits(), None);
    }

    #[test]
    fn list_ops_reset_and_parts() {
        let ShapeKind::List(list) = <Vec<u32>>::shape().kind() else {
            panic!("expected a list");
        };
        let mut value = vec![7u32, 8];
        let items = unsafe { list.reset(PtrMut::from_mut(&mut value), 3) };
        unsafe { *items.consume::<u32>() = 5 };
        assert_eq!(value, [5, 0, 0]);

        let (first, len) = unsafe { list.parts(Ptr::from_ref(&value)) };
        assert_eq!(len, 3);
        assert_eq!(unsafe { *first.as_ref::<u32>() }, 5);
    }

    #[test]
    fn nullable_pointer_ops() {
        let pointer = <Option<Box<String>>>::shape().as_pointer().unwrap();
        assert!(pointer.is_nullable());
        assert_eq!(pointer.pointee(), String::shape());

        let mut value: Option<Box<String>> = None;
        assert!(unsafe { pointer.get(Ptr::from_ref(&value)) }.is_none());

        let pointee = unsafe { pointer.allocate(PtrMut::from_mut(&mut value)) };
        unsafe { pointee.consume::<String>().push_str("set") };
        assert_eq!(value.as_deref().map(String::as_str), Some("set"));

        unsafe { pointer.clear(PtrMut::from_mut(&mut value)) };
        assert!(value.is_none());
    }

    #[test]
    fn box_pointer_is_never_null() {
        let pointer = <Box<u8>>::shape().as_pointer().unwrap();
        assert!(!pointer.is_nullable());
        let value = Box::new(3u8);
        let pointee = unsafe { pointer.get(Ptr::from_ref(&value)) }.unwrap();
        assert_eq!(unsafe { *pointee.as_ref::<u8>() }, 3);
    }
}
