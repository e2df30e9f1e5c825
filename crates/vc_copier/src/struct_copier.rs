use alloc::boxed::Box;
use core::fmt;

use vc_ptr::{Ptr, PtrMut};
use vc_shape::{Shape, Shaped};

use crate::conversion::Conversion;
use crate::{ConvertError, TypePair};

/// Copies one field of a record pair.
#[derive(Clone, Debug)]
pub(crate) struct FieldConverter {
    pub name: &'static str,
    pub dst_offset: usize,
    pub src_offset: usize,
    pub conversion: Conversion,
}

/// A compiled copier between two record types.
///
/// Obtained from [`Copier::struct_copier`](crate::Copier::struct_copier).
/// Fields run in source declaration order; the first failing field stops
/// the copy and leaves the fields before it written.
pub struct StructCopier {
    dst: &'static Shape,
    src: &'static Shape,
    fields: Box<[FieldConverter]>,
}

impl StructCopier {
    pub(crate) fn new(
        dst: &'static Shape,
        src: &'static Shape,
        fields: impl Into<Box<[FieldConverter]>>,
    ) -> Self {
        Self {
            dst,
            src,
            fields: fields.into(),
        }
    }

    #[inline]
    pub fn dst(&self) -> &'static Shape {
        self.dst
    }

    #[inline]
    pub fn src(&self) -> &'static Shape {
        self.src
    }

    #[inline]
    pub fn pair(&self) -> TypePair {
        TypePair::new(self.dst, self.src)
    }

    /// Number of copied fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Names of the copied source fields.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name)
    }

    /// Copies `src` into `dst`.
    ///
    /// Fails with [`ConvertError::TypeMismatch`] when the copier was
    /// compiled for other types.
    pub fn copy_into<D: Shaped, S: Shaped>(
        &self,
        dst: &mut D,
        src: &S,
    ) -> Result<(), ConvertError> {
        self.check::<D, S>()?;
        // SAFETY: both types were just checked.
        unsafe { self.copy_erased(PtrMut::from_mut(dst), Ptr::from_ref(src)) }
    }

    /// Copies the record at `src` into the record at `dst`.
    ///
    /// # Safety
    /// `dst` must point to a value of [`dst`](Self::dst) and `src` to a
    /// value of [`src`](Self::src).
    pub unsafe fn copy_erased(&self, mut dst: PtrMut<'_>, src: Ptr<'_>) -> Result<(), ConvertError> {
        for field in &self.fields {
            // SAFETY: offsets come from the shapes the copier was compiled for.
            unsafe {
                let dst_field = dst.reborrow().byte_add(field.dst_offset);
                let src_field = src.byte_add(field.src_offset);
                field.conversion.run(dst_field, src_field)
            }
            .map_err(|err| err.in_field(field.name))?;
        }
        Ok(())
    }

    pub(crate) fn check<D: Shaped, S: Shaped>(&self) -> Result<(), ConvertError> {
        for (expected, found) in [(self.dst, D::shape()), (self.src, S::shape())] {
            if expected != found {
                return Err(ConvertError::TypeMismatch {
                    expected: expected.type_path(),
                    found: found.type_path(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for StructCopier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("StructCopier");
        debug
            .field("dst", &self.dst.type_path())
            .field("src", &self.src.type_path());
        for field in &self.fields {
            debug.field(field.name, &field.conversion.name());
        }
        debug.finish()
    }
}
