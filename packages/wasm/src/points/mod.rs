//! Base point storage.
//!
//! Points are stored once, in the fundamental cell, in a dense `Vec`. Their
//! periodic copies are never materialized here; a [`PointImage`] pairs a
//! [`PointId`] with a [`Sector`](crate::geometry::Sector) and is resolved on
//! demand by the periodic view.

mod image;
mod point;
mod set;

pub use image::PointImage;
pub use point::{Point, PointId};
pub use set::PointSet;
