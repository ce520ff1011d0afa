//! Lattice-translation offsets.
//!
//! A sector names one periodic copy of the fundamental cell: the copy shifted
//! by `dx·U + dy·V`. Sector `(0, 0)` is the fundamental cell itself.

use std::fmt;
use std::ops::Neg;

use serde::{Deserialize, Serialize};

/// Integer lattice translation `(dx, dy)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Sector {
    pub dx: i32,
    pub dy: i32,
}

impl Sector {
    /// The fundamental cell.
    pub const ORIGIN: Sector = Sector { dx: 0, dy: 0 };

    /// Create a new sector.
    #[inline]
    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// True for the fundamental cell `(0, 0)`.
    #[inline]
    pub fn is_origin(self) -> bool {
        self == Self::ORIGIN
    }

    /// All sectors with `|dx| <= radius` and `|dy| <= radius`, row-major
    /// (`dy` outer, `dx` inner).
    ///
    /// The order is load-bearing: it fixes draw order and the tie-breaking of
    /// nearest-image picking. A negative radius yields no sectors.
    pub fn window(radius: i32) -> Vec<Sector> {
        if radius < 0 {
            return Vec::new();
        }
        let side = (2 * radius + 1) as usize;
        let mut sectors = Vec::with_capacity(side * side);
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                sectors.push(Sector { dx, dy });
            }
        }
        sectors
    }
}

impl Neg for Sector {
    type Output = Sector;

    #[inline]
    fn neg(self) -> Sector {
        Sector {
            dx: -self.dx,
            dy: -self.dy,
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sector({}, {})", self.dx, self.dy)
    }
}

impl From<(i32, i32)> for Sector {
    #[inline]
    fn from((dx, dy): (i32, i32)) -> Self {
        Self { dx, dy }
    }
}
