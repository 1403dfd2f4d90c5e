//! Geometry for rigcheck: local collision shapes, axis-aligned bounds and
//! the [`SpatialQueryProvider`] seam the validation checks query through.
//!
//! [`ContactQuery`] is the built-in provider, backed by parry. Engines with their own
//! physics backend can implement the trait instead.

pub mod aabb;
pub mod query;
pub mod shape;

pub use aabb::Aabb;
pub use query::{ContactQuery, SpatialQueryProvider};
pub use shape::Shape;

pub mod prelude {
    pub use crate::aabb::Aabb;
    pub use crate::query::{ContactQuery, SpatialQueryProvider};
    pub use crate::shape::Shape;
}
