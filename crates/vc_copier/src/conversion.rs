//! Compiled conversion plans.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;

use vc_ptr::{Ptr, PtrMut, memcopy};
use vc_shape::shape::{
    CopyToVTable, ListShape, OptionalShape, PointerShape, RequiredShape, ShapeVTable,
};
use vc_shape::{DynMap, Shape};

use crate::domain::DomainConversion;
use crate::numeric::NumericConversion;
use crate::registry::CustomConversion;
use crate::{ConvertError, StructCopier};

/// A record field taking part in a map conversion.
#[derive(Clone, Debug)]
pub(crate) struct MapField {
    pub key: &'static str,
    pub offset: usize,
    pub ty: &'static str,
    pub vtable: ShapeVTable,
}

/// How a value of one shape is turned into a value of another.
///
/// Built once per pair by the resolver, then run for every value. Running
/// a plan writes into an existing destination value: parts of the
/// destination the plan does not reach keep their content.
#[derive(Clone, Debug)]
pub(crate) enum Conversion {
    /// Plain bytes, the same type on both sides.
    Memcopy { size: usize },
    /// The same type on both sides, owning resources.
    Clone { vtable: ShapeVTable },
    /// A string into a closed enumeration, validated against its members.
    ClosedEnum {
        members: &'static [&'static str],
        ty: &'static str,
    },
    /// Distinct scalars of the same kind. `owned` scalars are strings.
    Alias { size: usize, owned: bool },
    Numeric(NumericConversion),
    Domain(DomainConversion),
    Custom(CustomConversion),
    CopyTo {
        copy_to: CopyToVTable,
        dst: &'static Shape,
    },
    /// Two pointers to the same type: the pointee is cloned.
    PointerClone {
        dst: PointerShape,
        src: PointerShape,
        pointee: ShapeVTable,
    },
    /// A null source leaves the destination untouched.
    PointerDeep {
        dst: PointerShape,
        src: PointerShape,
        element: Box<Conversion>,
    },
    List {
        dst: ListShape,
        src: ListShape,
        dst_stride: usize,
        src_stride: usize,
        element: Box<Conversion>,
    },
    /// An absent source leaves the destination untouched, like a null
    /// source of [`PointerDeep`](Conversion::PointerDeep).
    OptionalToPointer {
        dst: PointerShape,
        src: OptionalShape,
        element: Box<Conversion>,
    },
    /// A null source leaves the destination untouched.
    PointerToOptional {
        dst: OptionalShape,
        src: PointerShape,
        element: Box<Conversion>,
    },
    OptionalToOptional {
        dst: OptionalShape,
        src: OptionalShape,
        element: Box<Conversion>,
    },
    /// A zero source leaves the destination absent.
    ValueToOptional {
        dst: OptionalShape,
        src: ShapeVTable,
        element: Box<Conversion>,
    },
    Required {
        src: RequiredShape,
        ty: &'static str,
        element: Box<Conversion>,
    },
    ValueToPointer {
        dst: PointerShape,
        element: Box<Conversion>,
    },
    /// A null source leaves the destination untouched.
    PointerToValue {
        src: PointerShape,
        element: Box<Conversion>,
    },
    Struct(Arc<StructCopier>),
    StructToMap(Box<[MapField]>),
    MapToStruct(Box<[MapField]>),
}

impl Conversion {
    /// Name of the plan, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memcopy { .. } => "memcopy",
            Self::Clone { .. } => "clone",
            Self::ClosedEnum { .. } => "closed enum",
            Self::Alias { .. } => "alias",
            Self::Numeric(_) => "numeric",
            Self::Domain(_) => "domain",
            Self::Custom(_) => "custom",
            Self::CopyTo { .. } => "copy-to",
            Self::PointerClone { .. } => "pointer clone",
            Self::PointerDeep { .. } => "pointer deep copy",
            Self::List { .. } => "list",
            Self::OptionalToPointer { .. } => "optional to pointer",
            Self::PointerToOptional { .. } => "pointer to optional",
            Self::OptionalToOptional { .. } => "optional to optional",
            Self::ValueToOptional { .. } => "value to optional",
            Self::Required { .. } => "required",
            Self::ValueToPointer { .. } => "value to pointer",
            Self::PointerToValue { .. } => "pointer to value",
            Self::Struct(_) => "struct",
            Self::StructToMap(_) => "struct to map",
            Self::MapToStruct(_) => "map to struct",
        }
    }

    /// Converts the value at `src` into the value at `dst`.
    ///
    /// # Safety
    /// `dst` and `src` must point to values of the pair the plan was
    /// compiled for.
    pub unsafe fn run(&self, mut dst: PtrMut<'_>, src: Ptr<'_>) -> Result<(), ConvertError> {
        // SAFETY: every pointer handed down is derived from `dst` and `src`
        // through the shapes the plan was compiled from.
        unsafe {
            match self {
                Self::Memcopy { size } => memcopy(dst, src, *size),
                Self::Clone { vtable } => vtable.clone_into(dst, src),
                Self::ClosedEnum { members, ty } => {
                    // Closed enumerations are transparent strings.
                    let value = src.as_ref::<String>();
                    if !members.iter().any(|member| *member == value.as_str()) {
                        return Err(ConvertError::ClosedEnum {
                            value: value.clone(),
                            ty: *ty,
                        });
                    }
                    dst.consume::<String>().clone_from(value);
                }
                Self::Alias { size, owned } => {
                    if *owned {
                        dst.consume::<String>().clone_from(src.as_ref::<String>());
                    } else {
                        memcopy(dst, src, *size);
                    }
                }
                Self::Numeric(numeric) => numeric.run(dst, src)?,
                Self::Domain(domain) => domain.run(dst, src)?,
                Self::Custom(custom) => custom.run(dst, src)?,
                Self::CopyTo { copy_to, dst: shape } => {
                    let value = copy_to.copy_to(src, *shape);
                    if !shape.vtable().assign_dyn(dst, &value) {
                        return Err(ConvertError::TypeMismatch {
                            expected: shape.type_path(),
                            found: value.shape().type_path(),
                        });
                    }
                }
                Self::PointerClone {
                    dst: dst_pointer,
                    src: src_pointer,
                    pointee,
                } => match src_pointer.get(src) {
                    Some(value) => pointee.clone_into(dst_pointer.allocate(dst), value),
                    None => dst_pointer.clear(dst),
                },
                Self::PointerDeep {
                    dst: dst_pointer,
                    src: src_pointer,
                    element,
                } => {
                    if let Some(value) = src_pointer.get(src) {
                        element.run(dst_pointer.allocate(dst), value)?;
                    }
                }
                Self::List {
                    dst: dst_list,
                    src: src_list,
                    dst_stride,
                    src_stride,
                    element,
                } => {
                    let (first, len) = src_list.parts(src);
                    let mut items = dst_list.reset(dst, len);
                    for index in 0..len {
                        let item = items.reborrow().byte_add(index * dst_stride);
                        element.run(item, first.byte_add(index * src_stride))?;
                    }
                }
                Self::OptionalToPointer {
                    dst: dst_pointer,
                    src: src_optional,
                    element,
                } => {
                    if let Some(value) = src_optional.get(src) {
                        element.run(dst_pointer.allocate(dst), value)?;
                    }
                }
                Self::PointerToOptional {
                    dst: dst_optional,
                    src: src_pointer,
                    element,
                } => {
                    if let Some(value) = src_pointer.get(src) {
                        element.run(dst_optional.insert(dst), value)?;
                    }
                }
                Self::OptionalToOptional {
                    dst: dst_optional,
                    src: src_optional,
                    element,
                } => match src_optional.get(src) {
                    Some(value) => element.run(dst_optional.insert(dst), value)?,
                    None => dst_optional.clear(dst),
                },
                Self::ValueToOptional {
                    dst: dst_optional,
                    src: src_vtable,
                    element,
                } => {
                    if src_vtable.is_zero(src) {
                        dst_optional.clear(dst);
                    } else {
                        element.run(dst_optional.insert(dst), src)?;
                    }
                }
                Self::Required {
                    src: src_required,
                    ty,
                    element,
                } => match src_required.get(src) {
                    Some(value) => element.run(dst, value)?,
                    None => return Err(ConvertError::RequiredMissing { ty: *ty }),
                },
                Self::ValueToPointer {
                    dst: dst_pointer,
                    element,
                } => element.run(dst_pointer.allocate(dst), src)?,
                Self::PointerToValue {
                    src: src_pointer,
                    element,
                } => {
                    if let Some(value) = src_pointer.get(src) {
                        element.run(dst, value)?;
                    }
                }
                Self::Struct(copier) => copier.copy_erased(dst, src)?,
                Self::StructToMap(fields) => {
                    let map = dst.consume::<DynMap>();
                    for field in fields {
                        let value = field.vtable.to_dyn(src.byte_add(field.offset));
                        map.insert(field.key.into(), value);
                    }
                }
                Self::MapToStruct(fields) => {
                    let map = src.as_ref::<DynMap>();
                    for field in fields {
                        let Some(value) = map.get(field.key) else {
                            return Err(ConvertError::MapKeyMissing { key: field.key });
                        };
                        let target = dst.reborrow().byte_add(field.offset);
                        if !field.vtable.assign_dyn(target, value) {
                            return Err(ConvertError::MapValueMismatch {
                                key: field.key,
                                expected: field.ty,
                                found: value.shape().type_path(),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
