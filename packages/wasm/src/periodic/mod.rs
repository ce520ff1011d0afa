//! Periodic images of the point set.

mod view;

pub use view::{NEIGHBORHOOD_RADIUS, PeriodicView};
