use alloc::boxed::Box;
use alloc::string::String;

use thiserror::Error;

/// Error produced by a user conversion. Any error type converts into it.
pub type BoxedError = Box<dyn core::error::Error + Send + Sync>;

// -----------------------------------------------------------------------------
// CompileError

/// A conversion plan could not be built for a type pair.
///
/// Compile errors depend on types only, the same pair always fails the
/// same way. Failed plans are not cached.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompileError {
    #[error("struct copier needs records on both sides, `{ty}` is not a record")]
    NotStruct { ty: &'static str },

    #[error("field not found srcField={field} srcType={src} dstType={dst}")]
    FieldNotFound {
        field: &'static str,
        src: &'static str,
        dst: &'static str,
    },

    #[error("unsupported conversion from `{src}` to `{dst}`")]
    Unsupported { src: &'static str, dst: &'static str },

    #[error("can't copy `{src}` to `{dst}`")]
    CopyToRefused { src: &'static str, dst: &'static str },

    #[error("circular structure reference between `{src}` and `{dst}`")]
    Circular { src: &'static str, dst: &'static str },

    #[error("field `{field}`: {source}")]
    InField {
        field: &'static str,
        source: Box<CompileError>,
    },
}

impl CompileError {
    /// The error without the field path leading to it.
    pub fn root(&self) -> &CompileError {
        match self {
            Self::InField { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn in_field(self, field: &'static str) -> Self {
        Self::InField {
            field,
            source: Box::new(self),
        }
    }
}

// -----------------------------------------------------------------------------
// ConvertError

/// A compiled plan failed on a particular value.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    #[error("bad value for closed enum value={value} dstType={ty}")]
    ClosedEnum { value: String, ty: &'static str },

    #[error("cannot parse `{value}` as `{ty}`: {source}")]
    Parse {
        value: String,
        ty: &'static str,
        source: BoxedError,
    },

    #[error("required field has no value srcType={ty}")]
    RequiredMissing { ty: &'static str },

    #[error("missing field in structure for key `{key}`")]
    MapKeyMissing { key: &'static str },

    #[error("unable to set field in structure for key `{key}`: expected `{expected}`, found `{found}`")]
    MapValueMismatch {
        key: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} does not fit in `{ty}`")]
    NumericOverflow {
        value: String,
        ty: &'static str,
    },

    #[error("timestamp {seconds}s {nanos}ns is out of range")]
    InvalidTimestamp { seconds: i64, nanos: i32 },

    #[error("conversion from `{src}` to `{dst}` failed: {source}")]
    Custom {
        src: &'static str,
        dst: &'static str,
        source: BoxedError,
    },

    #[error("copier for `{expected}` applied to `{found}`")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("field `{field}`: {source}")]
    InField {
        field: &'static str,
        source: Box<ConvertError>,
    },
}

impl ConvertError {
    /// The error without the field path leading to it.
    pub fn root(&self) -> &ConvertError {
        match self {
            Self::InField { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn in_field(self, field: &'static str) -> Self {
        Self::InField {
            field,
            source: Box::new(self),
        }
    }
}

// -----------------------------------------------------------------------------
// CopyError

/// Error of the one-shot entry points, which compile and run in one call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CopyError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Convert(#[from] ConvertError),
}
