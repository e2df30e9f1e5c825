use alloc::boxed::Box;
use alloc::string::String;
use core::any::Any;
use core::fmt;

use vc_ptr::Ptr;
use vc_utils::hash::HashMap;

use crate::{Shape, Shaped};

/// The dynamic key-value map records convert to and from.
///
/// Keys are field names, or the key override declared with
/// `#[shape(key = "...")]`.
pub type DynMap = HashMap<String, DynValue>;

/// An owned value of any shaped type, remembering its shape.
///
/// ```
/// use vc_shape::{DynValue, Shaped};
///
/// let value = DynValue::new(42_i64);
/// assert_eq!(value.shape(), i64::shape());
/// assert_eq!(value.downcast_ref::<i64>(), Some(&42));
/// assert!(value.downcast_ref::<i32>().is_none());
/// ```
pub struct DynValue {
    shape: &'static Shape,
    value: Box<dyn Any + Send + Sync>,
}

impl DynValue {
    pub fn new<T: Shaped>(value: T) -> Self {
        Self {
            shape: T::shape(),
            value: Box::new(value),
        }
    }

    #[inline]
    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    #[inline]
    pub fn is<T: Shaped>(&self) -> bool {
        self.value.is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Shaped>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }

    /// Takes the value out, or gives `self` back if it is not a `T`.
    pub fn downcast<T: Shaped>(self) -> Result<T, Self> {
        let Self { shape, value } = self;
        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self { shape, value }),
        }
    }

    /// Address of the boxed value, described by [`shape`](Self::shape).
    #[inline]
    pub fn as_ptr(&self) -> Ptr<'_> {
        Ptr::from_ref(&*self.value)
    }
}

impl Clone for DynValue {
    fn clone(&self) -> Self {
        // SAFETY: `as_ptr` points to a value of `self.shape`.
        unsafe { self.shape.vtable().to_dyn(self.as_ptr()) }
    }
}

impl fmt::Debug for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DynValue").field(&self.shape.type_path()).finish()
    }
}
