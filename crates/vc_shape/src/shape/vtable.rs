use vc_ptr::{Ptr, PtrMut};

use crate::{DynValue, Shaped};

/// Type-erased operations every shaped type supports.
#[derive(Clone, Copy, Debug)]
pub struct ShapeVTable {
    clone_into: unsafe fn(PtrMut<'_>, Ptr<'_>),
    is_zero: unsafe fn(Ptr<'_>) -> bool,
    to_dyn: unsafe fn(Ptr<'_>) -> DynValue,
    assign_dyn: unsafe fn(PtrMut<'_>, &DynValue) -> bool,
}

impl ShapeVTable {
    pub fn of<T: Shaped>() -> Self {
        Self {
            clone_into: clone_into::<T>,
            is_zero: is_zero::<T>,
            to_dyn: to_dyn::<T>,
            assign_dyn: assign_dyn::<T>,
        }
    }

    /// Overwrites `dst` with a clone of `src`.
    ///
    /// # Safety
    /// Both pointers must point to values of the shape owning this table.
    #[inline]
    pub unsafe fn clone_into(&self, dst: PtrMut<'_>, src: Ptr<'_>) {
        unsafe { (self.clone_into)(dst, src) }
    }

    /// # Safety
    /// `value` must point to a value of the shape owning this table.
    #[inline]
    pub unsafe fn is_zero(&self, value: Ptr<'_>) -> bool {
        unsafe { (self.is_zero)(value) }
    }

    /// Boxes a clone of the value.
    ///
    /// # Safety
    /// `value` must point to a value of the shape owning this table.
    #[inline]
    pub unsafe fn to_dyn(&self, value: Ptr<'_>) -> DynValue {
        unsafe { (self.to_dyn)(value) }
    }

    /// Overwrites `dst` with a clone of the boxed value when its type
    /// matches, returns `false` and leaves `dst` alone otherwise.
    ///
    /// # Safety
    /// `dst` must point to a value of the shape owning this table.
    #[inline]
    pub unsafe fn assign_dyn(&self, dst: PtrMut<'_>, value: &DynValue) -> bool {
        unsafe { (self.assign_dyn)(dst, value) }
    }
}

unsafe fn clone_into<T: Shaped>(dst: PtrMut<'_>, src: Ptr<'_>) {
    // SAFETY: the vtable of `T` only receives pointers to `T`.
    unsafe { dst.consume::<T>().clone_from(src.as_ref::<T>()) }
}

unsafe fn is_zero<T: Shaped>(value: Ptr<'_>) -> bool {
    // SAFETY: the vtable of `T` only receives pointers to `T`.
    unsafe { value.as_ref::<T>() }.is_zero()
}

unsafe fn to_dyn<T: Shaped>(value: Ptr<'_>) -> DynValue {
    // SAFETY: the vtable of `T` only receives pointers to `T`.
    DynValue::new(unsafe { value.as_ref::<T>() }.clone())
}

unsafe fn assign_dyn<T: Shaped>(dst: PtrMut<'_>, value: &DynValue) -> bool {
    match value.downcast_ref::<T>() {
        Some(value) => {
            // SAFETY: the vtable of `T` only receives pointers to `T`.
            unsafe { dst.consume::<T>().clone_from(value) };
            true
        }
        None => false,
    }
}
