use core::ptr;

use crate::{Ptr, PtrMut};

/// Copies `size` bytes from `src` into `dst`.
///
/// The 8, 16 and 24 byte sizes (a word, two words and a `String`/`Vec`
/// sized triple) are copied as fixed-size arrays so the compiler emits
/// plain moves instead of a `memcpy` call.
///
/// # Safety
///
/// - `src` must be valid for reads of `size` bytes.
/// - `dst` must be valid for writes of `size` bytes.
/// - The two regions must not overlap.
/// - Overwriting `dst` must not leak or duplicate ownership, i.e. the
///   copied type owns no resources.
///
/// # Examples
///
/// ```
/// # use vc_ptr::{memcopy, Ptr, PtrMut};
/// let src = [1u64, 2, 3];
/// let mut dst = [0u64; 3];
/// unsafe { memcopy(PtrMut::from_mut(&mut dst), Ptr::from_ref(&src), 24) };
/// assert_eq!(dst, src);
/// ```
#[inline]
pub unsafe fn memcopy(dst: PtrMut<'_>, src: Ptr<'_>, size: usize) {
    let dst = dst.as_ptr();
    let src = src.as_ptr();
    // SAFETY: guaranteed by the caller, `[u8; N]` has no alignment requirement.
    unsafe {
        match size {
            0 => {}
            8 => ptr::copy_nonoverlapping(src.cast::<[u8; 8]>(), dst.cast::<[u8; 8]>(), 1),
            16 => ptr::copy_nonoverlapping(src.cast::<[u8; 16]>(), dst.cast::<[u8; 16]>(), 1),
            24 => ptr::copy_nonoverlapping(src.cast::<[u8; 24]>(), dst.cast::<[u8; 24]>(), 1),
            _ => ptr::copy_nonoverlapping(src, dst, size),
        }
    }
}
