//! Static storage for shapes.
//!
//! Usually used to implement [`Shaped`](crate::Shaped):
//!
//! - [`NonGenericShapeCell`] for non-generic types, a plain [`OnceLock`].
//! - [`GenericShapeCell`] for generic types. The `static` inside a generic
//!   function is shared by every instantiation, so the cell keeps one
//!   leaked shape per [`TypeId`].
//!
//! Building a shape never holds the lock of a generic cell, so shapes may
//! look up other shapes while they are built.

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use std::sync::{OnceLock, PoisonError, RwLock};

use vc_utils::TypeIdMap;

use crate::Shape;

/// Container for the shape of a non-generic type.
///
/// ```
/// # #![allow(unsafe_code)]
/// use vc_shape::cell::NonGenericShapeCell;
/// use vc_shape::{Shape, ShapeKind, Shaped};
///
/// #[derive(Clone)]
/// struct Opaque;
///
/// // SAFETY: the shape is built for `Self`.
/// unsafe impl Shaped for Opaque {
///     fn shape() -> &'static Shape {
///         static CELL: NonGenericShapeCell = NonGenericShapeCell::new();
///         CELL.get_or_init(|| Shape::new::<Self>(ShapeKind::Opaque))
///     }
///     fn zero() -> Self { Opaque }
///     fn is_zero(&self) -> bool { true }
/// }
///
/// assert_eq!(Opaque::shape().type_ident(), "Opaque");
/// ```
pub struct NonGenericShapeCell(OnceLock<Shape>);

impl NonGenericShapeCell {
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored shape, building it with `f` on first call.
    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> Shape) -> &Shape {
        self.0.get_or_init(f)
    }
}

/// Container for the shapes of a generic type.
pub struct GenericShapeCell(RwLock<TypeIdMap<&'static Shape>>);

impl GenericShapeCell {
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::new()))
    }

    /// Returns the shape stored for `G`, building it with `f` if absent.
    ///
    /// Concurrent first calls may each run `f`, only the first result is kept.
    #[inline(always)]
    pub fn get_or_insert<G: Any + ?Sized>(&self, f: impl FnOnce() -> Shape) -> &'static Shape {
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    // Separate to reduce code compilation times
    #[inline(never)]
    fn get_or_insert_by_type_id(
        &self,
        type_id: TypeId,
        f: impl FnOnce() -> Shape,
    ) -> &'static Shape {
        match self.get_by_type_id(type_id) {
            Some(shape) => shape,
            None => self.insert_by_type_id(type_id, f()),
        }
    }

    #[inline(never)]
    fn get_by_type_id(&self, type_id: TypeId) -> Option<&'static Shape> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied()
    }

    #[inline(never)]
    fn insert_by_type_id(&self, type_id: TypeId, shape: Shape) -> &'static Shape {
        let mut shapes = self.0.write().unwrap_or_else(PoisonError::into_inner);
        *shapes.get_or_insert(type_id, || Box::leak(Box::new(shape)))
    }
}
