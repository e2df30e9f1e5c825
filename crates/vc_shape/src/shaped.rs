use crate::Shape;

/// A type with a runtime [`Shape`].
///
/// Implemented for primitives, `String`, `Vec<T>`, `Box<T>`, `Option<T>`,
/// [`Required<T>`](crate::Required), [`DynMap`](crate::DynMap) and the leaf
/// domain types (times, identifiers, decimals, language tags). Records and
/// transparent newtypes use `#[derive(Shaped)]`.
///
/// # Safety
///
/// Conversions read and write values through type-erased pointers sized and
/// laid out by [`Shaped::shape`], so an implementation must return the shape
/// of `Self`: a shape built with `Shape::new::<Self>`, whose field offsets
/// and shapes match the fields of `Self`. Prefer `#[derive(Shaped)]`.
pub unsafe trait Shaped: Clone + Send + Sync + 'static {
    /// The shape of `Self`, built on first use.
    fn shape() -> &'static Shape;

    /// The zero value: what a destination holds before anything is written
    /// to it, and what a null source leaves behind.
    fn zero() -> Self;

    /// Whether `self` equals [`zero`](Shaped::zero).
    ///
    /// A record is zero when all of its fields are.
    fn is_zero(&self) -> bool;
}
