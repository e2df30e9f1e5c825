use alloc::sync::Arc;
use core::any::TypeId;
use core::fmt;
use std::sync::{PoisonError, RwLock};

use vc_shape::Shape;
use vc_utils::hash::hashbrown::Equivalent;
use vc_utils::hash::{FixedHashState, HashMap};

use crate::{CopierOptions, StructCopier};

// -----------------------------------------------------------------------------
// TypePair

/// An ordered (destination, source) pair of types.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypePair {
    dst: TypeId,
    src: TypeId,
}

impl TypePair {
    #[inline]
    pub fn new(dst: &Shape, src: &Shape) -> Self {
        Self {
            dst: dst.id(),
            src: src.id(),
        }
    }

    #[inline]
    pub fn of<D: ?Sized + 'static, S: ?Sized + 'static>() -> Self {
        Self {
            dst: TypeId::of::<D>(),
            src: TypeId::of::<S>(),
        }
    }

    #[inline]
    pub fn dst(&self) -> TypeId {
        self.dst
    }

    #[inline]
    pub fn src(&self) -> TypeId {
        self.src
    }
}

impl fmt::Debug for TypePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypePair({:?} <- {:?})", self.dst, self.src)
    }
}

// -----------------------------------------------------------------------------
// CopierCache

#[derive(PartialEq, Eq, Hash)]
struct CacheKey {
    pair: TypePair,
    options: CopierOptions,
}

// Looks up a `CacheKey` without cloning the options.
#[derive(Hash)]
struct CacheKeyRef<'a> {
    pair: TypePair,
    options: &'a CopierOptions,
}

impl Equivalent<CacheKey> for CacheKeyRef<'_> {
    #[inline]
    fn equivalent(&self, key: &CacheKey) -> bool {
        self.pair == key.pair && *self.options == key.options
    }
}

/// Compiled struct copiers, keyed by type pair and options.
///
/// Lookups take a read lock. Compilation happens outside of the lock, so
/// two threads racing on the same pair both compile and the last insert
/// wins. Both results are equivalent.
pub struct CopierCache {
    copiers: RwLock<HashMap<CacheKey, Arc<StructCopier>>>,
}

impl CopierCache {
    #[inline]
    pub const fn new() -> Self {
        Self {
            copiers: RwLock::new(HashMap::with_hasher(FixedHashState)),
        }
    }

    pub fn get(&self, pair: TypePair, options: &CopierOptions) -> Option<Arc<StructCopier>> {
        let copiers = self.copiers.read().unwrap_or_else(PoisonError::into_inner);
        copiers.get(&CacheKeyRef { pair, options }).cloned()
    }

    /// Stores `copier` and hands it back.
    pub(crate) fn insert(
        &self,
        options: CopierOptions,
        copier: Arc<StructCopier>,
    ) -> Arc<StructCopier> {
        let key = CacheKey {
            pair: copier.pair(),
            options,
        };
        let mut copiers = self.copiers.write().unwrap_or_else(PoisonError::into_inner);
        if copiers.insert(key, copier.clone()).is_some() {
            log::warn!(
                "struct copier `{}` -> `{}` was compiled concurrently, replacing the cached one",
                copier.src().type_path(),
                copier.dst().type_path(),
            );
        } else {
            log::debug!(
                "cached struct copier `{}` -> `{}` ({} fields)",
                copier.src().type_path(),
                copier.dst().type_path(),
                copier.len(),
            );
        }
        copier
    }

    pub fn len(&self) -> usize {
        self.copiers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every compiled copier. Copiers handed out stay usable.
    pub fn clear(&self) {
        self.copiers.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Default for CopierCache {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CopierCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopierCache")
            .field("len", &self.len())
            .finish()
    }
}
