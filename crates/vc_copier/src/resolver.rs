//! Resolution of the conversion rules listed in the crate documentation.
//!
//! Numbered comments in [`Resolver::resolve`] refer to that list.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;

use vc_shape::shape::StructShape;
use vc_shape::{ScalarKind, Shape, ShapeKind};

use crate::conversion::{Conversion, MapField};
use crate::domain::DomainConversion;
use crate::numeric::NumericConversion;
use crate::struct_copier::FieldConverter;
use crate::{CompileError, Copier, CopierOptions, StructCopier, TypePair};

/// Resolves conversion rules for one compilation.
///
/// Keeps the record pairs being compiled so a pair reached again through
/// its own fields is reported instead of recursing forever.
pub(crate) struct Resolver<'c> {
    copier: &'c Copier,
    compiling: Vec<TypePair>,
}

impl<'c> Resolver<'c> {
    pub fn new(copier: &'c Copier) -> Self {
        Self {
            copier,
            compiling: Vec::new(),
        }
    }

    /// Compiles a struct copier from `src` into `dst`.
    pub fn compile(
        &mut self,
        dst: &'static Shape,
        src: &'static Shape,
        options: &CopierOptions,
    ) -> Result<StructCopier, CompileError> {
        let Some(dst_info) = dst.as_struct() else {
            return Err(CompileError::NotStruct {
                ty: dst.type_path(),
            });
        };
        let Some(src_info) = src.as_struct() else {
            return Err(CompileError::NotStruct {
                ty: src.type_path(),
            });
        };

        self.compiling.push(TypePair::new(dst, src));
        let fields = self.compile_fields(dst, src, dst_info, src_info, options);
        self.compiling.pop();

        Ok(StructCopier::new(dst, src, fields?))
    }

    fn compile_fields(
        &mut self,
        dst: &'static Shape,
        src: &'static Shape,
        dst_info: &'static StructShape,
        src_info: &'static StructShape,
        options: &CopierOptions,
    ) -> Result<Vec<FieldConverter>, CompileError> {
        let mut fields = Vec::with_capacity(src_info.len());
        for src_field in src_info.fields() {
            let name = src_field.name();
            if src_field.is_skipped() || src_field.is_private() || !options.accepts(name) {
                continue;
            }
            let Some(dst_field) = dst_info.field(name) else {
                if options.is_omit_not_found() {
                    log::trace!("`{}` has no field `{name}`, omitted", dst.type_path());
                    continue;
                }
                return Err(CompileError::FieldNotFound {
                    field: name,
                    src: src.type_path(),
                    dst: dst.type_path(),
                });
            };
            let conversion = self
                .resolve(dst_field.shape(), src_field.shape())
                .map_err(|err| err.in_field(name))?;
            log::trace!(
                "`{}.{name}` -> `{}.{name}`: {}",
                src.type_ident(),
                dst.type_ident(),
                conversion.name()
            );
            fields.push(FieldConverter {
                name,
                dst_offset: dst_field.offset(),
                src_offset: src_field.offset(),
                conversion,
            });
        }
        Ok(fields)
    }

    /// Resolves the conversion from `src` into `dst`.
    pub fn resolve(
        &mut self,
        dst: &'static Shape,
        src: &'static Shape,
    ) -> Result<Conversion, CompileError> {
        // 1
        if dst == src {
            return Ok(if src.is_pod() {
                Conversion::Memcopy { size: src.size() }
            } else {
                Conversion::Clone {
                    vtable: *src.vtable(),
                }
            });
        }
        if let Some(custom) = self.copier.registry().get(TypePair::new(dst, src)) {
            return Ok(Conversion::Custom(custom.clone()));
        }

        // 2, 3
        if let (Some(dst_kind), Some(src_kind)) = (dst.as_scalar(), src.as_scalar())
            && dst_kind == src_kind
        {
            if let Some(members) = dst.closed_enum()
                && dst_kind == ScalarKind::String
            {
                return Ok(Conversion::ClosedEnum {
                    members,
                    ty: dst.type_ident(),
                });
            }
            return Ok(Conversion::Alias {
                size: src.size(),
                owned: !src.is_pod(),
            });
        }

        // 4, 5
        if let Some(numeric) = NumericConversion::new(dst, src) {
            return Ok(Conversion::Numeric(numeric));
        }
        if let Some(domain) = DomainConversion::find(dst, src) {
            return Ok(Conversion::Domain(domain));
        }

        // 6
        if let Some(copy_to) = src.copy_to() {
            if !copy_to.can_copy_to(dst) {
                return Err(CompileError::CopyToRefused {
                    src: src.type_path(),
                    dst: dst.type_path(),
                });
            }
            return Ok(Conversion::CopyTo {
                copy_to: *copy_to,
                dst,
            });
        }

        let conversion = match (dst.kind(), src.kind()) {
            // 7
            (ShapeKind::Pointer(dst_pointer), ShapeKind::Pointer(src_pointer)) => {
                if dst_pointer.pointee() == src_pointer.pointee() {
                    Conversion::PointerClone {
                        dst: dst_pointer.clone(),
                        src: src_pointer.clone(),
                        pointee: *src_pointer.pointee().vtable(),
                    }
                } else {
                    Conversion::PointerDeep {
                        dst: dst_pointer.clone(),
                        src: src_pointer.clone(),
                        element: self.element(dst_pointer.pointee(), src_pointer.pointee())?,
                    }
                }
            }
            // 8
            (ShapeKind::List(dst_list), ShapeKind::List(src_list)) => Conversion::List {
                dst: dst_list.clone(),
                src: src_list.clone(),
                dst_stride: dst_list.item().size(),
                src_stride: src_list.item().size(),
                element: self.element(dst_list.item(), src_list.item())?,
            },
            // 9
            (ShapeKind::Pointer(dst_pointer), ShapeKind::Optional(src_optional)) => {
                Conversion::OptionalToPointer {
                    dst: dst_pointer.clone(),
                    src: src_optional.clone(),
                    element: self.element(dst_pointer.pointee(), src_optional.inner())?,
                }
            }
            // 10
            (ShapeKind::Optional(dst_optional), ShapeKind::Pointer(src_pointer)) => {
                Conversion::PointerToOptional {
                    dst: dst_optional.clone(),
                    src: src_pointer.clone(),
                    element: self.element(dst_optional.inner(), src_pointer.pointee())?,
                }
            }
            // 11
            (ShapeKind::Optional(dst_optional), ShapeKind::Optional(src_optional)) => {
                Conversion::OptionalToOptional {
                    dst: dst_optional.clone(),
                    src: src_optional.clone(),
                    element: self.element(dst_optional.inner(), src_optional.inner())?,
                }
            }
            (ShapeKind::Optional(dst_optional), _) => Conversion::ValueToOptional {
                dst: dst_optional.clone(),
                src: *src.vtable(),
                element: self.element(dst_optional.inner(), src)?,
            },
            // 12
            (_, ShapeKind::Required(src_required)) => Conversion::Required {
                src: src_required.clone(),
                ty: src.type_path(),
                element: self.element(dst, src_required.inner())?,
            },
            // 13
            (ShapeKind::Pointer(dst_pointer), _) => Conversion::ValueToPointer {
                dst: dst_pointer.clone(),
                element: self.element(dst_pointer.pointee(), src)?,
            },
            // 14
            (_, ShapeKind::Pointer(src_pointer)) => Conversion::PointerToValue {
                src: src_pointer.clone(),
                element: self.element(dst, src_pointer.pointee())?,
            },
            // 15
            (ShapeKind::Struct(_), ShapeKind::Struct(_)) => {
                Conversion::Struct(self.nested_struct(dst, src)?)
            }
            // 16
            (ShapeKind::DynMap, ShapeKind::Struct(src_info)) => {
                Conversion::StructToMap(map_fields(src_info))
            }
            // 17
            (ShapeKind::Struct(dst_info), ShapeKind::DynMap) => {
                Conversion::MapToStruct(map_fields(dst_info))
            }
            _ => {
                return Err(CompileError::Unsupported {
                    src: src.type_path(),
                    dst: dst.type_path(),
                });
            }
        };
        Ok(conversion)
    }

    #[inline]
    fn element(
        &mut self,
        dst: &'static Shape,
        src: &'static Shape,
    ) -> Result<Box<Conversion>, CompileError> {
        self.resolve(dst, src).map(Box::new)
    }

    /// Struct copier of a record pair met inside another one, compiled
    /// with default options and shared through the cache.
    fn nested_struct(
        &mut self,
        dst: &'static Shape,
        src: &'static Shape,
    ) -> Result<Arc<StructCopier>, CompileError> {
        let pair = TypePair::new(dst, src);
        if self.compiling.contains(&pair) {
            return Err(CompileError::Circular {
                src: src.type_path(),
                dst: dst.type_path(),
            });
        }

        let options = CopierOptions::new();
        let cache = self.copier.cache();
        if let Some(copier) = cache.get(pair, &options) {
            return Ok(copier);
        }
        let copier = self.compile(dst, src, &options)?;
        Ok(cache.insert(options, Arc::new(copier)))
    }
}

fn map_fields(info: &StructShape) -> Box<[MapField]> {
    info.fields()
        .iter()
        .filter(|field| field.is_map_eligible())
        .map(|field| MapField {
            key: field.key(),
            offset: field.offset(),
            ty: field.shape().type_path(),
            vtable: *field.shape().vtable(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec::Vec;

    use chrono::{DateTime, Utc};
    use prost_types::Timestamp;
    use uuid::Uuid;
    use vc_shape::{DynMap, Required, Shaped};

    use super::Resolver;
    use crate::conversion::Conversion;
    use crate::{CompileError, Copier, ConversionRegistry};

    #[derive(Clone, Shaped)]
    #[repr(transparent)]
    #[shape(transparent, closed_enum("a1", "b2"))]
    struct Grade(String);

    #[derive(Clone, Shaped)]
    #[repr(transparent)]
    #[shape(transparent)]
    struct Label(String);

    #[derive(Clone, Shaped)]
    struct Point {
        pub x: i32,
        pub y: i32,
    }

    #[derive(Clone, Shaped)]
    struct Coordinates {
        pub x: i64,
        pub y: i64,
    }

    fn resolve_pair<D: Shaped, S: Shaped>(copier: &Copier) -> Result<Conversion, CompileError> {
        Resolver::new(copier).resolve(D::shape(), S::shape())
    }

    fn name<D: Shaped, S: Shaped>() -> &'static str {
        let copier = Copier::with_registry(ConversionRegistry::empty());
        resolve_pair::<D, S>(&copier).unwrap().name()
    }

    #[test]
    fn rules_in_order() {
        assert_eq!(name::<u64, u64>(), "memcopy");
        assert_eq!(name::<String, String>(), "clone");
        assert_eq!(name::<Grade, String>(), "closed enum");
        assert_eq!(name::<String, Grade>(), "alias");
        assert_eq!(name::<Label, Grade>(), "alias");
        assert_eq!(name::<i64, i32>(), "numeric");
        assert_eq!(name::<String, Uuid>(), "domain");
        assert_eq!(name::<Option<Timestamp>, DateTime<Utc>>(), "domain");
        assert_eq!(name::<Option<Box<u8>>, Box<u8>>(), "pointer clone");
        assert_eq!(name::<Box<i64>, Box<i32>>(), "pointer deep copy");
        assert_eq!(name::<Vec<i64>, Vec<i32>>(), "list");
        assert_eq!(name::<Option<Box<i64>>, Option<i32>>(), "optional to pointer");
        assert_eq!(name::<Option<i64>, Box<i32>>(), "pointer to optional");
        assert_eq!(name::<Option<i64>, Option<i32>>(), "optional to optional");
        assert_eq!(name::<Option<i64>, i32>(), "value to optional");
        assert_eq!(name::<i64, Required<i32>>(), "required");
        assert_eq!(name::<Box<i64>, i32>(), "value to pointer");
        assert_eq!(name::<i64, Option<Box<i32>>>(), "pointer to value");
        assert_eq!(name::<Coordinates, Point>(), "struct");
        assert_eq!(name::<DynMap, Point>(), "struct to map");
        assert_eq!(name::<Point, DynMap>(), "map to struct");
    }

    #[test]
    fn registry_overrides_built_in_rules() {
        let mut registry = ConversionRegistry::empty();
        registry.register(|value: &i32| Ok::<i64, core::convert::Infallible>(i64::from(*value) * 2));
        let copier = Copier::with_registry(registry);
        assert!(matches!(
            resolve_pair::<i64, i32>(&copier).unwrap(),
            Conversion::Custom(_)
        ));
        // Identity stays ahead of the registry.
        assert!(matches!(
            resolve_pair::<i32, i32>(&copier).unwrap(),
            Conversion::Memcopy { .. }
        ));
    }

    #[test]
    fn unsupported_pairs() {
        let copier = Copier::with_registry(ConversionRegistry::empty());
        let err = resolve_pair::<bool, String>(&copier).unwrap_err();
        assert_eq!(
            err,
            CompileError::Unsupported {
                src: "alloc::string::String",
                dst: "bool"
            }
        );
        assert!(resolve_pair::<i32, f64>(&copier).is_err());
        assert!(resolve_pair::<Uuid, Vec<u8>>(&copier).is_err());
    }
}
