use alloc::string::String;
use alloc::vec::Vec;

/// Options of a struct copier.
///
/// Options take part in the cache key: the same pair compiled with
/// different options yields distinct copiers.
///
/// ```
/// use vc_copier::CopierOptions;
///
/// let options = CopierOptions::new()
///     .omit_not_found()
///     .exclude(["password"]);
/// assert!(options.is_omit_not_found());
/// assert!(!options.accepts("password"));
/// assert!(options.accepts("name"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CopierOptions {
    omit_not_found: bool,
    include: Option<Vec<String>>,
    exclude: Vec<String>,
}

impl CopierOptions {
    /// Copy every field, fail on source fields without a destination.
    #[inline]
    pub const fn new() -> Self {
        Self {
            omit_not_found: false,
            include: None,
            exclude: Vec::new(),
        }
    }

    /// Skip source fields that have no destination field of the same name
    /// instead of failing.
    pub fn omit_not_found(mut self) -> Self {
        self.omit_not_found = true;
        self
    }

    /// Copy only the named source fields.
    ///
    /// Calling it again extends the list.
    pub fn include<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.include
            .get_or_insert_with(Vec::new)
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Never copy the named source fields.
    pub fn exclude<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.exclude.extend(fields.into_iter().map(Into::into));
        self
    }

    #[inline]
    pub fn is_omit_not_found(&self) -> bool {
        self.omit_not_found
    }

    /// Whether the source field `name` passes the include and exclude lists.
    pub fn accepts(&self, name: &str) -> bool {
        if self.exclude.iter().any(|field| field == name) {
            return false;
        }
        match &self.include {
            Some(include) => include.iter().any(|field| field == name),
            None => true,
        }
    }
}
