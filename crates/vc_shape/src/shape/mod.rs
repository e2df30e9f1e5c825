//! Shape descriptors.

use core::alloc::Layout;
use core::any::TypeId;
use core::fmt;
use core::mem::needs_drop;

use bitflags::bitflags;
use vc_ptr::Ptr;

use crate::Shaped;

// -----------------------------------------------------------------------------
// Modules

mod capability;
mod field;
mod kinds;
mod vtable;

// -----------------------------------------------------------------------------
// Exports

pub use capability::{CopyTo, CopyToVTable};
pub use field::{Field, FieldFlags, StructShape};
pub use kinds::{ListOps, ListShape, ScalarKind};
pub use kinds::{BoxOps, OptionOps, OptionalShape, PointerShape, RequiredShape};
pub use vtable::ShapeVTable;

/// Borrows a value as something serde can drive.
///
/// Stored on shapes whose values serialize themselves (leaf types and
/// records declared `#[shape(serde)]`).
pub type SerializeFn = for<'a> unsafe fn(Ptr<'a>) -> &'a dyn erased_serde::Serialize;

// -----------------------------------------------------------------------------
// Type

/// Identity and names of a shaped type.
#[derive(Clone, Copy, Debug)]
pub struct Type {
    id: TypeId,
    path: &'static str,
    ident: &'static str,
}

impl Type {
    /// Describes `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        let path = core::any::type_name::<T>();
        Self {
            id: TypeId::of::<T>(),
            path,
            ident: ident_of(path),
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Full path as reported by [`core::any::type_name`].
    #[inline]
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// Last path segment without generic arguments, e.g. `Vec` for `alloc::vec::Vec<u8>`.
    #[inline]
    pub fn ident(&self) -> &'static str {
        self.ident
    }

    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

fn ident_of(path: &'static str) -> &'static str {
    let base = match path.find('<') {
        Some(generics) => &path[..generics],
        None => path,
    };
    match base.rfind("::") {
        Some(sep) => &base[sep + 2..],
        None => base,
    }
}

// -----------------------------------------------------------------------------
// ShapeFlags

bitflags! {
    /// Properties of a shape that plans check at compile time.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ShapeFlags: u8 {
        /// Values own no resources, a byte copy is a valid clone.
        const POD               = 1 << 0;
        /// The type owns its serialization logic (`#[shape(serde)]`).
        const SELF_SERIALIZING  = 1 << 1;
    }
}

// -----------------------------------------------------------------------------
// ShapeKind

/// Structural category of a shape.
#[derive(Clone, Debug)]
pub enum ShapeKind {
    /// Booleans, characters, numbers and strings.
    Scalar(ScalarKind),
    /// A record with named fields.
    Struct(StructShape),
    /// `Vec<T>`.
    List(ListShape),
    /// `Box<T>`, or `Option<Box<T>>` as the nullable pointer.
    Pointer(PointerShape),
    /// `Option<T>` for any `T` that is not a box.
    Optional(OptionalShape),
    /// [`Required<T>`](crate::Required).
    Required(RequiredShape),
    /// The dynamic key-value map, [`DynMap`](crate::DynMap).
    DynMap,
    /// Leaf types with no visible structure (identifiers, times, decimals).
    Opaque,
}

impl ShapeKind {
    /// Name of the kind, for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Struct(_) => "struct",
            Self::List(_) => "list",
            Self::Pointer(_) => "pointer",
            Self::Optional(_) => "optional",
            Self::Required(_) => "required",
            Self::DynMap => "dynamic map",
            Self::Opaque => "opaque",
        }
    }
}

// -----------------------------------------------------------------------------
// Shape

/// Immutable description of a type.
///
/// Two shapes are equal when they describe the same type.
pub struct Shape {
    ty: Type,
    layout: Layout,
    kind: ShapeKind,
    vtable: ShapeVTable,
    flags: ShapeFlags,
    closed_enum: Option<&'static [&'static str]>,
    copy_to: Option<CopyToVTable>,
    serialize: Option<SerializeFn>,
}

impl Shape {
    /// Describes `T` as `kind`.
    ///
    /// `T` is marked [`ShapeFlags::POD`] when it has no drop glue.
    pub fn new<T: Shaped>(kind: ShapeKind) -> Self {
        let mut flags = ShapeFlags::empty();
        if !needs_drop::<T>() {
            flags |= ShapeFlags::POD;
        }
        Self {
            ty: Type::of::<T>(),
            layout: Layout::new::<T>(),
            kind,
            vtable: ShapeVTable::of::<T>(),
            flags,
            closed_enum: None,
            copy_to: None,
            serialize: None,
        }
    }

    /// Describes the `#[repr(transparent)]` wrapper `T` around `Inner`.
    ///
    /// The wrapper shares the kind and serialization of `Inner`, the
    /// memory of both types being identical, but keeps its own identity.
    pub fn transparent<T: Shaped, Inner: Shaped>() -> Self {
        debug_assert_eq!(Layout::new::<T>(), Layout::new::<Inner>());
        let inner = Inner::shape();
        let mut shape = Self::new::<T>(inner.kind.clone());
        shape.serialize = inner.serialize;
        shape
    }

    /// Restricts a string-kind shape to the declared members.
    pub fn with_closed_enum(mut self, members: &'static [&'static str]) -> Self {
        debug_assert!(
            matches!(self.kind, ShapeKind::Scalar(ScalarKind::String)),
            "closed enumerations must be string-backed, `{}` is not",
            self.ty.path,
        );
        self.closed_enum = Some(members);
        self
    }

    /// Records the [`CopyTo`] implementation of `T`.
    pub fn with_copy_to<T: CopyTo>(mut self) -> Self {
        self.copy_to = Some(CopyToVTable::of::<T>());
        self
    }

    /// Serializes values through the serde implementation of `T`.
    pub fn with_serialize<T: Shaped + serde_core::Serialize>(mut self) -> Self {
        self.serialize = Some(erased_serialize::<T>);
        self
    }

    /// Serializes values through `serialize`.
    pub fn with_serialize_fn(mut self, serialize: SerializeFn) -> Self {
        self.serialize = Some(serialize);
        self
    }

    /// Marks a record as owning its serialization logic.
    pub fn with_self_serializing<T: Shaped + serde_core::Serialize>(self) -> Self {
        let mut shape = self.with_serialize::<T>();
        shape.flags |= ShapeFlags::SELF_SERIALIZING;
        shape
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.ty.id
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.ty.path
    }

    #[inline]
    pub fn type_ident(&self) -> &'static str {
        self.ty.ident
    }

    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.ty.is::<T>()
    }

    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.layout.size()
    }

    #[inline]
    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    #[inline]
    pub fn vtable(&self) -> &ShapeVTable {
        &self.vtable
    }

    #[inline]
    pub fn flags(&self) -> ShapeFlags {
        self.flags
    }

    #[inline]
    pub fn is_pod(&self) -> bool {
        self.flags.contains(ShapeFlags::POD)
    }

    #[inline]
    pub fn is_self_serializing(&self) -> bool {
        self.flags.contains(ShapeFlags::SELF_SERIALIZING)
    }

    /// Declared members when the shape is a closed enumeration.
    #[inline]
    pub fn closed_enum(&self) -> Option<&'static [&'static str]> {
        self.closed_enum
    }

    #[inline]
    pub fn copy_to(&self) -> Option<&CopyToVTable> {
        self.copy_to.as_ref()
    }

    #[inline]
    pub fn serialize_fn(&self) -> Option<SerializeFn> {
        self.serialize
    }

    /// Returns the scalar kind, if any.
    #[inline]
    pub fn as_scalar(&self) -> Option<ScalarKind> {
        match self.kind {
            ShapeKind::Scalar(kind) => Some(kind),
            _ => None,
        }
    }

    #[inline]
    pub fn as_struct(&self) -> Option<&StructShape> {
        match &self.kind {
            ShapeKind::Struct(info) => Some(info),
            _ => None,
        }
    }

    #[inline]
    pub fn as_pointer(&self) -> Option<&PointerShape> {
        match &self.kind {
            ShapeKind::Pointer(info) => Some(info),
            _ => None,
        }
    }

    #[inline]
    pub fn is_struct(&self) -> bool {
        matches!(self.kind, ShapeKind::Struct(_))
    }

    #[inline]
    pub fn is_pointer(&self) -> bool {
        matches!(self.kind, ShapeKind::Pointer(_))
    }

    #[inline]
    pub fn is_dyn_map(&self) -> bool {
        matches!(self.kind, ShapeKind::DynMap)
    }
}

unsafe fn erased_serialize<T: serde_core::Serialize + 'static>(
    ptr: Ptr<'_>,
) -> &'_ dyn erased_serde::Serialize {
    // SAFETY: the shape of `T` only hands out pointers to `T`.
    unsafe { ptr.as_ref::<T>() }
}

impl PartialEq for Shape {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ty.id == other.ty.id
    }
}

impl Eq for Shape {}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("type", &self.ty.path)
            .field("kind", &self.kind.name())
            .field("size", &self.layout.size())
            .finish()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ty.path)
    }
}
