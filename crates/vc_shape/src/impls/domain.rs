use chrono::{DateTime, NaiveDate, Utc};
use language_tags::LanguageTag;
use prost_types::Timestamp;
use rust_decimal::Decimal;
use serde_core::ser::Error as _;
use serde_core::{Serialize, Serializer};
use ulid::Ulid;
use uuid::Uuid;
use vc_ptr::Ptr;

use crate::cell::NonGenericShapeCell;
use crate::{Shape, ShapeKind, Shaped};

macro_rules! impl_leaf {
    ($ty:ty, $zero:expr) => {
        // SAFETY: the shape is built for `Self`.
        unsafe impl Shaped for $ty {
            fn shape() -> &'static Shape {
                static CELL: NonGenericShapeCell = NonGenericShapeCell::new();
                CELL.get_or_init(|| Shape::new::<Self>(ShapeKind::Opaque).with_serialize::<Self>())
            }

            #[inline]
            fn zero() -> Self {
                $zero
            }

            #[inline]
            fn is_zero(&self) -> bool {
                *self == $zero
            }
        }
    };
}

impl_leaf!(DateTime<Utc>, DateTime::<Utc>::UNIX_EPOCH);
impl_leaf!(NaiveDate, DateTime::<Utc>::UNIX_EPOCH.date_naive());
impl_leaf!(Uuid, Uuid::nil());
impl_leaf!(Ulid, Ulid::nil());
impl_leaf!(Decimal, Decimal::ZERO);

const UNDETERMINED: &str = "und";

// SAFETY: the shape is built for `Self`.
unsafe impl Shaped for LanguageTag {
    fn shape() -> &'static Shape {
        static CELL: NonGenericShapeCell = NonGenericShapeCell::new();
        CELL.get_or_init(|| Shape::new::<Self>(ShapeKind::Opaque).with_serialize::<Self>())
    }

    /// The undetermined language, `und`.
    fn zero() -> Self {
        LanguageTag::parse(UNDETERMINED).expect("`und` is a well-formed language tag")
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.as_str() == UNDETERMINED
    }
}

// -----------------------------------------------------------------------------
// Timestamp

// 0001-01-01T00:00:00Z and 10000-01-01T00:00:00Z.
const MIN_VALID_SECONDS: i64 = -62_135_596_800;
const MAX_VALID_SECONDS: i64 = 253_402_300_800;

/// Whether `timestamp` lies within years 1 to 9999 with in-range nanoseconds.
pub fn timestamp_is_valid(timestamp: &Timestamp) -> bool {
    (MIN_VALID_SECONDS..MAX_VALID_SECONDS).contains(&timestamp.seconds)
        && (0..1_000_000_000).contains(&timestamp.nanos)
}

/// The time a valid `timestamp` denotes.
pub fn timestamp_to_datetime(timestamp: &Timestamp) -> Option<DateTime<Utc>> {
    if !timestamp_is_valid(timestamp) {
        return None;
    }
    DateTime::from_timestamp(timestamp.seconds, timestamp.nanos.unsigned_abs())
}

/// Serializes a timestamp as the time it denotes.
#[repr(transparent)]
struct TimestampRepr(Timestamp);

impl Serialize for TimestampRepr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match timestamp_to_datetime(&self.0) {
            Some(time) => time.serialize(serializer),
            None => Err(S::Error::custom(format_args!(
                "timestamp {}s {}ns is out of range",
                self.0.seconds, self.0.nanos
            ))),
        }
    }
}

unsafe fn serialize_timestamp(ptr: Ptr<'_>) -> &'_ dyn erased_serde::Serialize {
    // SAFETY: `TimestampRepr` is a transparent `Timestamp`.
    unsafe { ptr.as_ref::<TimestampRepr>() }
}

// SAFETY: the shape is built for `Self`.
unsafe impl Shaped for Timestamp {
    fn shape() -> &'static Shape {
        static CELL: NonGenericShapeCell = NonGenericShapeCell::new();
        CELL.get_or_init(|| {
            Shape::new::<Self>(ShapeKind::Opaque).with_serialize_fn(serialize_timestamp)
        })
    }

    #[inline]
    fn zero() -> Self {
        Timestamp::default()
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.seconds == 0 && self.nanos == 0
    }
}
