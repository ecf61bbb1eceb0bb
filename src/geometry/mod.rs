//! Plane geometry for the mesh grammar: exact-equality points and the
//! named comparators that give production inputs their canonical order.

pub mod ordering;
pub mod point2;

pub use ordering::{by_x, by_y, by_y_reversed};
pub use point2::Point2;
