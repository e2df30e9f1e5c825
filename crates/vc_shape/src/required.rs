use serde_core::{Serialize, Serializer};

/// A value that must be present when it is converted.
///
/// Unlike `Option<T>`, converting a missing `Required` is an error rather
/// than an empty result. A present value is unwrapped transparently.
///
/// ```
/// use vc_shape::Required;
///
/// let id = Required::new(7);
/// assert_eq!(id.get(), Some(&7));
/// assert!(Required::<i32>::missing().is_missing());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Required<T>(Option<T>);

impl<T> Required<T> {
    #[inline]
    pub const fn new(value: T) -> Self {
        Self(Some(value))
    }

    #[inline]
    pub const fn missing() -> Self {
        Self(None)
    }

    #[inline]
    pub const fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    #[inline]
    pub const fn is_missing(&self) -> bool {
        self.0.is_none()
    }

    #[inline]
    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

impl<T> Default for Required<T> {
    #[inline]
    fn default() -> Self {
        Self::missing()
    }
}

impl<T> From<T> for Required<T> {
    #[inline]
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Serialize> Serialize for Required<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Some(value) => value.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }
}
