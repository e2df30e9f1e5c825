use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;
use std::sync::OnceLock;

use vc_ptr::{Ptr, PtrMut};
use vc_shape::{Shape, Shaped};

use crate::conversion::Conversion;
use crate::resolver::Resolver;
use crate::{
    CompileError, ConversionRegistry, ConvertError, CopierCache, CopierOptions, CopyError,
    StructCopier, TypePair,
};

// -----------------------------------------------------------------------------
// Copier

/// The conversion engine: a registry of user conversions and a cache of
/// compiled struct copiers.
///
/// Most applications use the process-wide [`Copier::global`] through the
/// free functions of this crate. A dedicated engine isolates registrations
/// and cached plans, tests build their own for that reason.
///
/// ```
/// use vc_copier::Copier;
/// use vc_shape::Shaped;
///
/// #[derive(Clone, Shaped)]
/// struct Row {
///     pub id: String,
///     pub count: i32,
/// }
///
/// #[derive(Clone, Shaped)]
/// struct Model {
///     pub id: uuid::Uuid,
///     pub count: i64,
/// }
///
/// let copier = Copier::new();
/// let mut model = Model::zero();
/// let row = Row { id: "67e55044-10b1-426f-9247-bb680e5fe0c8".into(), count: 3 };
/// copier.copy(&mut model, &row).unwrap();
/// assert_eq!(model.id.to_string(), row.id);
/// assert_eq!(model.count, 3);
/// ```
pub struct Copier {
    registry: ConversionRegistry,
    cache: CopierCache,
}

impl Copier {
    /// An engine with the automatically registered conversions.
    pub fn new() -> Self {
        Self::with_registry(ConversionRegistry::new())
    }

    pub fn with_registry(registry: ConversionRegistry) -> Self {
        Self {
            registry,
            cache: CopierCache::new(),
        }
    }

    /// The process-wide engine, built on first use.
    pub fn global() -> &'static Copier {
        static GLOBAL: OnceLock<Copier> = OnceLock::new();
        GLOBAL.get_or_init(Copier::new)
    }

    #[inline]
    pub fn registry(&self) -> &ConversionRegistry {
        &self.registry
    }

    #[inline]
    pub fn cache(&self) -> &CopierCache {
        &self.cache
    }

    /// The struct copier from `src` into `dst` with default options.
    pub fn struct_copier(
        &self,
        dst: &'static Shape,
        src: &'static Shape,
    ) -> Result<Arc<StructCopier>, CompileError> {
        self.struct_copier_with(dst, src, &CopierOptions::new())
    }

    /// The struct copier from `src` into `dst`, compiled on first request
    /// and cached with its options.
    pub fn struct_copier_with(
        &self,
        dst: &'static Shape,
        src: &'static Shape,
        options: &CopierOptions,
    ) -> Result<Arc<StructCopier>, CompileError> {
        let pair = TypePair::new(dst, src);
        if let Some(copier) = self.cache.get(pair, options) {
            log::trace!(
                "struct copier `{}` -> `{}` found in cache",
                src.type_path(),
                dst.type_path()
            );
            return Ok(copier);
        }

        log::debug!(
            "compiling struct copier `{}` -> `{}`",
            src.type_path(),
            dst.type_path()
        );
        let copier = Resolver::new(self).compile(dst, src, options)?;
        Ok(self.cache.insert(options.clone(), Arc::new(copier)))
    }

    /// Copies the record `src` into the record `dst`.
    pub fn copy<D: Shaped, S: Shaped>(&self, dst: &mut D, src: &S) -> Result<(), CopyError> {
        self.copy_with(dst, src, &CopierOptions::new())
    }

    pub fn copy_with<D: Shaped, S: Shaped>(
        &self,
        dst: &mut D,
        src: &S,
        options: &CopierOptions,
    ) -> Result<(), CopyError> {
        let copier = self.struct_copier_with(D::shape(), S::shape(), options)?;
        copier.copy_into(dst, src)?;
        Ok(())
    }

    /// Converts a list of records, starting every destination from zero.
    pub fn copy_map<D: Shaped, S: Shaped>(&self, src: &[S]) -> Result<Vec<D>, CopyError> {
        let copier = self.struct_copier(D::shape(), S::shape())?;
        let mut dst = Vec::with_capacity(src.len());
        for item in src {
            let mut value = D::zero();
            copier.copy_into(&mut value, item)?;
            dst.push(value);
        }
        Ok(dst)
    }

    /// A copier between any two convertible types, not only records.
    pub fn value_copier<D: Shaped, S: Shaped>(&self) -> Result<ValueCopier<D, S>, CompileError> {
        let conversion = Resolver::new(self).resolve(D::shape(), S::shape())?;
        Ok(ValueCopier {
            conversion,
            _marker: PhantomData,
        })
    }

    /// A copier converting slices item by item.
    pub fn slice_copier<D: Shaped, S: Shaped>(&self) -> Result<SliceCopier<D, S>, CompileError> {
        Ok(SliceCopier {
            item: self.value_copier()?,
        })
    }
}

impl Default for Copier {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Copier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Copier")
            .field("registry", &self.registry)
            .field("cache", &self.cache)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Copying

/// Produces a `D` from a `&S`.
///
/// Implemented by the compiled copiers and by [`cast`], so code can accept
/// either a compiled plan or a hand-written function.
pub trait Copying<D, S> {
    fn copy(&self, src: &S) -> Result<D, ConvertError>;

    fn copy_boxed(&self, src: &S) -> Result<Box<D>, ConvertError> {
        self.copy(src).map(Box::new)
    }
}

impl<D: Shaped, S: Shaped> Copying<D, S> for StructCopier {
    fn copy(&self, src: &S) -> Result<D, ConvertError> {
        let mut dst = D::zero();
        self.copy_into(&mut dst, src)?;
        Ok(dst)
    }
}

/// A [`Copying`] implementation calling `f`.
///
/// ```
/// use vc_copier::{Copying, cast};
///
/// let len = cast(|text: &String| text.len());
/// assert_eq!(len.copy(&"four".to_string()).unwrap(), 4);
/// ```
pub fn cast<D, S, F>(f: F) -> Cast<F>
where
    F: Fn(&S) -> D,
{
    Cast(f)
}

/// See [`cast`].
#[derive(Clone, Copy)]
pub struct Cast<F>(F);

impl<D, S, F> Copying<D, S> for Cast<F>
where
    F: Fn(&S) -> D,
{
    #[inline]
    fn copy(&self, src: &S) -> Result<D, ConvertError> {
        Ok((self.0)(src))
    }
}

// -----------------------------------------------------------------------------
// ValueCopier

/// A compiled conversion from `S` into `D`.
pub struct ValueCopier<D, S> {
    conversion: Conversion,
    _marker: PhantomData<fn(&S) -> D>,
}

impl<D: Shaped, S: Shaped> ValueCopier<D, S> {
    /// Converts `src` into the existing value `dst`.
    pub fn copy_into(&self, dst: &mut D, src: &S) -> Result<(), ConvertError> {
        // SAFETY: the conversion was resolved for `(D, S)`.
        unsafe {
            self.conversion
                .run(PtrMut::from_mut(dst), Ptr::from_ref(src))
        }
    }
}

impl<D: Shaped, S: Shaped> Copying<D, S> for ValueCopier<D, S> {
    fn copy(&self, src: &S) -> Result<D, ConvertError> {
        let mut dst = D::zero();
        self.copy_into(&mut dst, src)?;
        Ok(dst)
    }
}

impl<D, S> Clone for ValueCopier<D, S> {
    fn clone(&self) -> Self {
        Self {
            conversion: self.conversion.clone(),
            _marker: PhantomData,
        }
    }
}

impl<D, S> fmt::Debug for ValueCopier<D, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValueCopier")
            .field(&self.conversion.name())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// SliceCopier

/// Converts slices of `S` into vectors of `D`.
pub struct SliceCopier<D, S> {
    item: ValueCopier<D, S>,
}

impl<D, S> Clone for SliceCopier<D, S> {
    fn clone(&self) -> Self {
        Self {
            item: self.item.clone(),
        }
    }
}

impl<D, S> fmt::Debug for SliceCopier<D, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SliceCopier").field(&self.item).finish()
    }
}

impl<D: Shaped, S: Shaped> SliceCopier<D, S> {
    /// Converts every item, stopping at the first failure.
    pub fn copy(&self, src: &[S]) -> Result<Vec<D>, ConvertError> {
        src.iter().map(|item| self.item.copy(item)).collect()
    }
}
