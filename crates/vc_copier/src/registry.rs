//! User conversions between type pairs.
//!
//! A registered conversion takes precedence over every built-in rule except
//! the identity copy, for exactly the pair it was registered for.
//!
//! ```
//! use vc_copier::{Copier, ConversionRegistry};
//! use vc_shape::Shaped;
//!
//! #[derive(Clone, Shaped)]
//! struct Reading {
//!     pub celsius: f64,
//! }
//!
//! #[derive(Clone, Shaped)]
//! struct Panel {
//!     pub celsius: String,
//! }
//!
//! let mut registry = ConversionRegistry::empty();
//! registry.register(|value: &f64| Ok::<_, core::convert::Infallible>(format!("{value:.1}°C")));
//!
//! let copier = Copier::with_registry(registry);
//! let mut panel = Panel::zero();
//! copier.copy(&mut panel, &Reading { celsius: 21.5 }).unwrap();
//! assert_eq!(panel.celsius, "21.5°C");
//! ```

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::convert::Infallible;
use core::fmt;

use chrono::{DateTime, Utc};
use prost_types::Timestamp;
use uuid::Uuid;
use vc_ptr::{Ptr, PtrMut};
use vc_shape::Shaped;
use vc_shape::impls::timestamp_to_datetime;
use vc_utils::hash::HashMap;

use crate::domain::to_timestamp;
use crate::{BoxedError, ConvertError, TypePair};

// -----------------------------------------------------------------------------
// CustomConversion

type ErasedConvert = dyn Fn(PtrMut<'_>, Ptr<'_>) -> Result<(), BoxedError> + Send + Sync;

/// A registered conversion with its types erased.
#[derive(Clone)]
pub struct CustomConversion {
    src: &'static str,
    dst: &'static str,
    convert: Arc<ErasedConvert>,
}

impl CustomConversion {
    fn new<D, S, E, F>(convert: F) -> Self
    where
        D: Shaped,
        S: Shaped,
        E: Into<BoxedError>,
        F: Fn(&S) -> Result<D, E> + Send + Sync + 'static,
    {
        let erased = move |dst: PtrMut<'_>, src: Ptr<'_>| -> Result<(), BoxedError> {
            // SAFETY: `run` is only reached through plans compiled for `(D, S)`.
            let value = convert(unsafe { src.as_ref::<S>() }).map_err(Into::into)?;
            *unsafe { dst.consume::<D>() } = value;
            Ok(())
        };
        Self {
            src: S::shape().type_path(),
            dst: D::shape().type_path(),
            convert: Arc::new(erased),
        }
    }

    /// # Safety
    /// `dst` and `src` must point to values of the registered pair.
    pub(crate) unsafe fn run(&self, dst: PtrMut<'_>, src: Ptr<'_>) -> Result<(), ConvertError> {
        (self.convert)(dst, src).map_err(|source| ConvertError::Custom {
            src: self.src,
            dst: self.dst,
            source,
        })
    }
}

impl fmt::Debug for CustomConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomConversion")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ConversionRegistry

/// Conversions registered by the application, keyed by type pair.
#[derive(Clone, Default)]
pub struct ConversionRegistry {
    conversions: HashMap<TypePair, CustomConversion>,
    auto_registered: bool,
}

impl ConversionRegistry {
    /// A registry without any conversion.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding the conversions declared with
    /// [`auto_conversion!`](crate::auto_conversion).
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.auto_register();
        registry
    }

    /// Adds conversions between identifiers and strings, and between times
    /// and protocol timestamps.
    ///
    /// Built-in rules already cover these pairs. Registered here they can
    /// be replaced one by one.
    pub fn with_domain_conversions(mut self) -> Self {
        self.register(|id: &Uuid| Ok::<_, Infallible>(id.to_string()));
        self.register(|text: &String| text.parse::<Uuid>());
        self.register(|time: &DateTime<Utc>| Ok::<_, Infallible>(Some(to_timestamp(time))));
        self.register(|timestamp: &Option<Timestamp>| match timestamp {
            None => Ok(DateTime::<Utc>::UNIX_EPOCH),
            Some(timestamp) => {
                timestamp_to_datetime(timestamp).ok_or(ConvertError::InvalidTimestamp {
                    seconds: timestamp.seconds,
                    nanos: timestamp.nanos,
                })
            }
        });
        self
    }

    /// Registers `convert` for the pair `(D, S)`, replacing any conversion
    /// registered for it before.
    pub fn register<D, S, E, F>(&mut self, convert: F)
    where
        D: Shaped,
        S: Shaped,
        E: Into<BoxedError>,
        F: Fn(&S) -> Result<D, E> + Send + Sync + 'static,
    {
        let pair = TypePair::of::<D, S>();
        let conversion = CustomConversion::new(convert);
        if let Some(old) = self.conversions.insert(pair, conversion) {
            log::debug!(
                "replaced conversion from `{}` to `{}`",
                old.src,
                old.dst
            );
        }
    }

    #[inline]
    pub fn get(&self, pair: TypePair) -> Option<&CustomConversion> {
        self.conversions.get(&pair)
    }

    #[inline]
    pub fn contains(&self, pair: TypePair) -> bool {
        self.conversions.contains_key(&pair)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.conversions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.conversions.is_empty()
    }

    /// Registers every conversion declared with
    /// [`auto_conversion!`](crate::auto_conversion).
    ///
    /// Returns `true` if automatic registration works on the current
    /// platform. Repeated calls are cheap.
    ///
    /// Requires the `auto_register` feature, without it this does nothing
    /// and returns `false`.
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            use crate::__macro_exports::auto_register::{AutoConversion, inventory};

            if self.auto_registered {
                return true;
            }
            for auto in inventory::iter::<AutoConversion> {
                (auto.0)(self);
            }
            self.auto_registered
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }

    #[cfg(feature = "auto_register")]
    pub(crate) fn mark_auto_registered(&mut self) {
        self.auto_registered = true;
    }
}

impl fmt::Debug for ConversionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.conversions.values()).finish()
    }
}

// -----------------------------------------------------------------------------
// Auto registration

/// Registers a conversion in every registry built with
/// [`ConversionRegistry::new`].
///
/// The argument is anything [`ConversionRegistry::register`] accepts that
/// does not capture its environment.
///
/// ```no_run
/// use vc_copier::{ConversionRegistry, TypePair};
///
/// fn parse_level(text: &String) -> Result<u8, core::num::ParseIntError> {
///     text.trim_start_matches('L').parse()
/// }
///
/// vc_copier::auto_conversion!(parse_level);
///
/// let registry = ConversionRegistry::new();
/// assert!(registry.contains(TypePair::of::<u8, String>()));
/// ```
///
/// Without the `auto_register` feature the conversion is type-checked but
/// never registered.
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! auto_conversion {
    ($convert:expr) => {
        $crate::__macro_exports::auto_register::inventory::submit! {
            $crate::__macro_exports::auto_register::AutoConversion(|registry| {
                registry.register($convert);
            })
        }
    };
}

#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! auto_conversion {
    ($convert:expr) => {
        const _: fn(&mut $crate::ConversionRegistry) = |registry| {
            registry.register($convert);
        };
    };
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use core::num::ParseIntError;

    use chrono::DateTime;
    use prost_types::Timestamp;
    use uuid::Uuid;
    use vc_ptr::{Ptr, PtrMut};

    use super::ConversionRegistry;
    use crate::{ConvertError, TypePair};

    fn parse_port(text: &String) -> Result<u16, ParseIntError> {
        text.parse()
    }

    crate::auto_conversion!(parse_port);

    #[test]
    fn register_and_run() {
        let mut registry = ConversionRegistry::empty();
        registry.register(parse_port);
        let pair = TypePair::of::<u16, String>();
        let conversion = registry.get(pair).unwrap();

        let mut port = 0u16;
        let text = String::from("8080");
        unsafe { conversion.run(PtrMut::from_mut(&mut port), Ptr::from_ref(&text)) }.unwrap();
        assert_eq!(port, 8080);

        let text = String::from("http");
        let err = unsafe { conversion.run(PtrMut::from_mut(&mut port), Ptr::from_ref(&text)) }
            .unwrap_err();
        assert!(matches!(err, ConvertError::Custom { dst: "u16", .. }));
        assert_eq!(port, 8080);
    }

    #[test]
    fn register_replaces() {
        let mut registry = ConversionRegistry::empty();
        registry.register(|_: &String| Ok::<u16, ParseIntError>(1));
        registry.register(|_: &String| Ok::<u16, ParseIntError>(2));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn domain_conversions() {
        let registry = ConversionRegistry::empty().with_domain_conversions();
        assert!(registry.contains(TypePair::of::<String, Uuid>()));
        assert!(registry.contains(TypePair::of::<Uuid, String>()));
        assert!(registry.contains(TypePair::of::<Option<Timestamp>, DateTime<chrono::Utc>>()));
        assert!(registry.contains(TypePair::of::<DateTime<chrono::Utc>, Option<Timestamp>>()));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    #[cfg(feature = "auto_register")]
    fn auto_register_collects_declared_conversions() {
        let mut registry = ConversionRegistry::empty();
        assert!(registry.auto_register());
        assert!(registry.contains(TypePair::of::<u16, String>()));
        assert!(registry.auto_register());
        assert!(ConversionRegistry::new().contains(TypePair::of::<u16, String>()));
    }
}
