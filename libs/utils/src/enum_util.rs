//! Narrowing of closed enums to one of their variants.

/// Returned by [`Variant::extract`] when the enum holds a different variant.
#[derive(Debug, thiserror::Error)]
#[error("bad enum variant: expected {expected}")]
pub struct BadVariantError {
    /// Name of the variant that was expected.
    pub expected: &'static str,
}

/// `impl Variant<E> for A` embeds `A` into the enum `E`.
///
/// ```
/// use hotstuff_utils::enum_util::{BadVariantError, Variant};
///
/// enum Shape {
///     Circle(f32),
///     Square(u32),
/// }
///
/// struct Circle(f32);
///
/// impl Variant<Shape> for Circle {
///     fn insert(self) -> Shape {
///         Shape::Circle(self.0)
///     }
///     fn extract(e: Shape) -> Result<Self, BadVariantError> {
///         let Shape::Circle(r) = e else {
///             return Err(BadVariantError { expected: "circle" });
///         };
///         Ok(Circle(r))
///     }
/// }
///
/// assert!(Circle::extract(Shape::Square(1)).is_err());
/// ```
///
/// `A::extract(a.insert())` must give back `a`.
pub trait Variant<Enum: Sized>: Sized {
    /// Wraps the value into the enum.
    fn insert(self) -> Enum;
    /// Unwraps the enum, failing if it holds another variant.
    fn extract(e: Enum) -> Result<Self, BadVariantError>;
}
