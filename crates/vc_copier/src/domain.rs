//! Conversions between the leaf domain types and their portable forms.
//!
//! | source                     | destination                |
//! |----------------------------|----------------------------|
//! | `DateTime<Utc>`            | `Option<Timestamp>`        |
//! | `Option<Timestamp>`        | `DateTime<Utc>`            |
//! | `Option<DateTime<Utc>>`    | `Option<Timestamp>`        |
//! | `Option<Timestamp>`        | `Option<DateTime<Utc>>`    |
//! | `NaiveDate`                | `Option<Timestamp>`        |
//! | `Option<Timestamp>`        | `NaiveDate`                |
//! | `Uuid`, `Ulid`, `Decimal`, `LanguageTag` | `String`     |
//! | `String`                   | `Uuid`, `Ulid`, `Decimal`, `LanguageTag` |
//!
//! The optional timestamp is how protocol messages carry a time. A missing
//! or out of range timestamp leaves the destination time untouched. An
//! empty string parses to the zero decimal.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use language_tags::LanguageTag;
use prost_types::Timestamp;
use rust_decimal::Decimal;
use ulid::Ulid;
use uuid::Uuid;
use vc_ptr::{Ptr, PtrMut};
use vc_shape::impls::timestamp_to_datetime;
use vc_shape::{Shape, Shaped};

use crate::{BoxedError, ConvertError};

/// Fixed conversions between domain types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DomainConversion {
    TimeToTimestamp,
    TimestampToTime,
    OptionalTimeToTimestamp,
    TimestampToOptionalTime,
    DateToTimestamp,
    TimestampToDate,
    /// `Option<DateTime<Utc>>` into `Option<Box<Timestamp>>`.
    OptionalTimeToBoxedTimestamp,
    /// `Option<Box<Timestamp>>` into `Option<DateTime<Utc>>`.
    BoxedTimestampToOptionalTime,
    UuidToString,
    StringToUuid,
    UlidToString,
    StringToUlid,
    DecimalToString,
    StringToDecimal,
    LanguageTagToString,
    StringToLanguageTag,
}

impl DomainConversion {
    /// The conversion from `src` into `dst`, if the pair is a domain pair.
    pub fn find(dst: &Shape, src: &Shape) -> Option<Self> {
        macro_rules! pairs {
            ($($src:ty => $dst:ty: $conversion:ident,)*) => {
                $(
                    if src.is::<$src>() && dst.is::<$dst>() {
                        return Some(Self::$conversion);
                    }
                )*
            };
        }

        pairs! {
            DateTime<Utc> => Option<Timestamp>: TimeToTimestamp,
            Option<Timestamp> => DateTime<Utc>: TimestampToTime,
            Option<DateTime<Utc>> => Option<Timestamp>: OptionalTimeToTimestamp,
            Option<Timestamp> => Option<DateTime<Utc>>: TimestampToOptionalTime,
            NaiveDate => Option<Timestamp>: DateToTimestamp,
            Option<Timestamp> => NaiveDate: TimestampToDate,
            Option<DateTime<Utc>> => Option<Box<Timestamp>>: OptionalTimeToBoxedTimestamp,
            Option<Box<Timestamp>> => Option<DateTime<Utc>>: BoxedTimestampToOptionalTime,
            Uuid => String: UuidToString,
            String => Uuid: StringToUuid,
            Ulid => String: UlidToString,
            String => Ulid: StringToUlid,
            Decimal => String: DecimalToString,
            String => Decimal: StringToDecimal,
            LanguageTag => String: LanguageTagToString,
            String => LanguageTag: StringToLanguageTag,
        }
        None
    }

    /// # Safety
    /// `dst` and `src` must point to values of the pair this conversion
    /// was found for.
    pub unsafe fn run(self, dst: PtrMut<'_>, src: Ptr<'_>) -> Result<(), ConvertError> {
        // SAFETY: the caller guarantees the pointee types.
        unsafe {
            match self {
                Self::TimeToTimestamp => {
                    let time = src.as_ref::<DateTime<Utc>>();
                    *dst.consume::<Option<Timestamp>>() = Some(to_timestamp(time));
                }
                Self::TimestampToTime => {
                    if let Some(time) = valid_time(src.as_ref::<Option<Timestamp>>()) {
                        *dst.consume::<DateTime<Utc>>() = time;
                    }
                }
                Self::OptionalTimeToTimestamp => {
                    if let Some(time) = src.as_ref::<Option<DateTime<Utc>>>() {
                        *dst.consume::<Option<Timestamp>>() = Some(to_timestamp(time));
                    }
                }
                Self::TimestampToOptionalTime => {
                    if let Some(time) = valid_time(src.as_ref::<Option<Timestamp>>()) {
                        *dst.consume::<Option<DateTime<Utc>>>() = Some(time);
                    }
                }
                Self::DateToTimestamp => {
                    let date = src.as_ref::<NaiveDate>();
                    *dst.consume::<Option<Timestamp>>() = Some(date_to_timestamp(date));
                }
                Self::TimestampToDate => {
                    if let Some(time) = valid_time(src.as_ref::<Option<Timestamp>>()) {
                        *dst.consume::<NaiveDate>() = time.date_naive();
                    }
                }
                Self::OptionalTimeToBoxedTimestamp => {
                    if let Some(time) = src.as_ref::<Option<DateTime<Utc>>>() {
                        let timestamp = Box::new(to_timestamp(time));
                        *dst.consume::<Option<Box<Timestamp>>>() = Some(timestamp);
                    }
                }
                Self::BoxedTimestampToOptionalTime => {
                    let timestamp = src.as_ref::<Option<Box<Timestamp>>>().as_deref();
                    if let Some(time) = timestamp.and_then(timestamp_to_datetime) {
                        *dst.consume::<Option<DateTime<Utc>>>() = Some(time);
                    }
                }
                Self::UuidToString => write_string(dst, src.as_ref::<Uuid>()),
                Self::UlidToString => write_string(dst, src.as_ref::<Ulid>()),
                Self::DecimalToString => write_string(dst, src.as_ref::<Decimal>()),
                Self::LanguageTagToString => write_string(dst, src.as_ref::<LanguageTag>()),
                Self::StringToUuid => parse_into::<Uuid>(dst, src.as_ref::<String>())?,
                Self::StringToUlid => parse_into::<Ulid>(dst, src.as_ref::<String>())?,
                Self::StringToDecimal => {
                    let text = src.as_ref::<String>();
                    if text.is_empty() {
                        *dst.consume::<Decimal>() = Decimal::ZERO;
                    } else {
                        parse_into::<Decimal>(dst, text)?;
                    }
                }
                Self::StringToLanguageTag => {
                    parse_into::<LanguageTag>(dst, src.as_ref::<String>())?;
                }
            }
        }
        Ok(())
    }
}

fn valid_time(timestamp: &Option<Timestamp>) -> Option<DateTime<Utc>> {
    timestamp.as_ref().and_then(timestamp_to_datetime)
}

pub(crate) fn to_timestamp(time: &DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: time.timestamp(),
        // Always below 2e9, leap seconds included.
        nanos: time.timestamp_subsec_nanos() as i32,
    }
}

fn date_to_timestamp(date: &NaiveDate) -> Timestamp {
    to_timestamp(&date.and_time(chrono::NaiveTime::MIN).and_utc())
}

unsafe fn write_string<T: ToString>(dst: PtrMut<'_>, value: &T) {
    // SAFETY: string plans only write into a `String`.
    let dst = unsafe { dst.consume::<String>() };
    *dst = value.to_string();
}

unsafe fn parse_into<T>(dst: PtrMut<'_>, text: &str) -> Result<(), ConvertError>
where
    T: Shaped + FromStr,
    T::Err: Into<BoxedError>,
{
    match text.parse::<T>() {
        Ok(value) => {
            // SAFETY: parse plans only write into a `T`.
            *unsafe { dst.consume::<T>() } = value;
            Ok(())
        }
        Err(source) => Err(ConvertError::Parse {
            value: text.into(),
            ty: T::shape().type_ident(),
            source: source.into(),
        }),
    }
}
