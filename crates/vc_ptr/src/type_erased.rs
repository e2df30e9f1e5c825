use core::fmt;
use core::marker::PhantomData;
use core::ptr::NonNull;

// -----------------------------------------------------------------------------
// Common methods

macro_rules! impl_ptr {
    ($ptr:ident) => {
        impl $ptr<'_> {
            /// Moves the pointer forward by `count` bytes.
            ///
            /// Shapes record field offsets in bytes, so this is how a plan
            /// reaches a field from the address of its record, or an item
            /// from the first item of a list.
            ///
            /// # Safety
            /// - The result must stay inside the allocation of the pointee.
            /// - The result must be valid for the lifetime of this pointer.
            #[inline]
            pub const unsafe fn byte_add(self, count: usize) -> Self {
                // SAFETY: upheld by the caller, the result stays non-null.
                Self(unsafe { self.0.add(count) }, PhantomData)
            }

            #[cfg_attr(debug_assertions, track_caller)]
            #[inline(always)]
            fn debug_assert_aligned<T>(&self) {
                debug_assert!(
                    self.0.as_ptr().cast::<T>().is_aligned(),
                    "address {:p} is misaligned for `{}`",
                    self.0,
                    core::any::type_name::<T>(),
                );
            }
        }

        impl fmt::Debug for $ptr<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:p})", stringify!($ptr), self.0)
            }
        }
    };
}

// -----------------------------------------------------------------------------
// Ptr

/// The address of a value read by a conversion, like a `&'a T` whose `T`
/// is only known to the shape describing it.
///
/// ```
/// # use vc_ptr::Ptr;
/// let pair = (3u16, 9u16);
/// let second = unsafe { Ptr::from_ref(&pair).byte_add(2) };
/// assert_eq!(unsafe { *second.as_ref::<u16>() }, 9);
/// ```
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct Ptr<'a>(NonNull<u8>, PhantomData<&'a u8>);

impl_ptr!(Ptr);

impl<'a> Ptr<'a> {
    /// Unsized referents lose their metadata, only the data address is kept.
    #[inline(always)]
    pub const fn from_ref<T: ?Sized>(value: &'a T) -> Self {
        Self(NonNull::from_ref(value).cast(), PhantomData)
    }

    #[inline(always)]
    pub const fn as_ptr(self) -> *const u8 {
        self.0.as_ptr()
    }

    /// # Safety
    /// The pointee must be a valid `T`.
    #[inline]
    #[cfg_attr(debug_assertions, track_caller)]
    pub unsafe fn as_ref<T>(self) -> &'a T {
        self.debug_assert_aligned::<T>();
        // SAFETY: upheld by the caller.
        unsafe { &*self.0.as_ptr().cast::<T>() }
    }
}

// -----------------------------------------------------------------------------
// PtrMut

/// The address of a value written by a conversion, like a `&'a mut T`.
///
/// Not `Copy`: [`reborrow`](PtrMut::reborrow) hands a shorter lived pointer
/// to a field or an item and keeps this one usable afterwards.
///
/// ```
/// # use vc_ptr::PtrMut;
/// let mut count = 8i32;
/// let mut ptr = PtrMut::from_mut(&mut count);
/// unsafe { *ptr.reborrow().consume::<i32>() += 2 };
/// unsafe { *ptr.consume::<i32>() *= 2 };
/// assert_eq!(count, 20);
/// ```
#[repr(transparent)]
pub struct PtrMut<'a>(NonNull<u8>, PhantomData<&'a mut u8>);

impl_ptr!(PtrMut);

impl<'a> PtrMut<'a> {
    #[inline(always)]
    pub const fn from_mut<T: ?Sized>(value: &'a mut T) -> Self {
        Self(NonNull::from_mut(value).cast(), PhantomData)
    }

    #[inline(always)]
    pub const fn as_ptr(&self) -> *mut u8 {
        self.0.as_ptr()
    }

    /// A read-only view for the lifetime of `&self`.
    #[inline(always)]
    pub const fn borrow(&self) -> Ptr<'_> {
        Ptr(self.0, PhantomData)
    }

    #[inline(always)]
    pub const fn reborrow(&mut self) -> PtrMut<'_> {
        PtrMut(self.0, PhantomData)
    }

    /// Turns the pointer into `&'a mut T`.
    ///
    /// # Safety
    /// The pointee must be a valid `T`.
    #[inline]
    #[cfg_attr(debug_assertions, track_caller)]
    pub unsafe fn consume<T>(self) -> &'a mut T {
        self.debug_assert_aligned::<T>();
        // SAFETY: upheld by the caller.
        unsafe { &mut *self.0.as_ptr().cast::<T>() }
    }
}
