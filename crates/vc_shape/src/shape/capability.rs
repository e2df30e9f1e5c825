use vc_ptr::Ptr;

use crate::{DynValue, Shape, Shaped};

/// A type that knows how to produce values of other types itself.
///
/// Conversions out of a `CopyTo` type defer to it instead of matching
/// fields. Register the capability with `#[shape(copy_to)]`.
///
/// # Examples
///
/// ```
/// use vc_shape::{CopyTo, DynValue, Shape, Shaped};
///
/// #[derive(Clone, Shaped)]
/// #[shape(copy_to)]
/// struct Celsius {
///     pub degrees: f64,
/// }
///
/// impl CopyTo for Celsius {
///     fn can_copy_to(target: &Shape) -> bool {
///         target.is::<String>()
///     }
///
///     fn copy_to(&self, _target: &'static Shape) -> DynValue {
///         DynValue::new(format!("{}°C", self.degrees))
///     }
/// }
///
/// let copy_to = Celsius::shape().copy_to().unwrap();
/// assert!(copy_to.can_copy_to(String::shape()));
/// ```
pub trait CopyTo: Shaped {
    /// Whether values can be copied into `target`. Asked once, when a
    /// conversion plan is compiled.
    fn can_copy_to(target: &Shape) -> bool;

    /// Produces a value of the type described by `target`.
    fn copy_to(&self, target: &'static Shape) -> DynValue;
}

/// Type-erased [`CopyTo`] implementation.
#[derive(Clone, Copy, Debug)]
pub struct CopyToVTable {
    can_copy_to: fn(&Shape) -> bool,
    copy_to: unsafe fn(Ptr<'_>, &'static Shape) -> DynValue,
}

impl CopyToVTable {
    pub fn of<T: CopyTo>() -> Self {
        Self {
            can_copy_to: T::can_copy_to,
            copy_to: erased_copy_to::<T>,
        }
    }

    #[inline]
    pub fn can_copy_to(&self, target: &Shape) -> bool {
        (self.can_copy_to)(target)
    }

    /// # Safety
    /// `value` must point to a value of the shape owning this table.
    #[inline]
    pub unsafe fn copy_to(&self, value: Ptr<'_>, target: &'static Shape) -> DynValue {
        unsafe { (self.copy_to)(value, target) }
    }
}

unsafe fn erased_copy_to<T: CopyTo>(value: Ptr<'_>, target: &'static Shape) -> DynValue {
    // SAFETY: the table of `T` only receives pointers to `T`.
    unsafe { value.as_ref::<T>() }.copy_to(target)
}
