//! The periodic cell and its coordinate transforms.
//!
//! A lattice is spanned by two linearly independent basis vectors `U` and `V`.
//! Absolute positions convert to fractional `(u, v)` coordinates through the
//! inverse of the column matrix `[U V]`, which is recomputed on every basis
//! change so queries never see a stale inverse.

use glam::{DMat2, DVec2};
use thiserror::Error;

use super::sector::Sector;

/// Smallest `|det[U V]|` accepted for a basis.
pub const BASIS_TOLERANCE: f64 = 1e-10;

/// Reasons a basis is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LatticeError {
    #[error("basis vectors are linearly dependent or too short (determinant {determinant:e})")]
    Degenerate { determinant: f64 },
    #[error("basis vectors must be finite")]
    NonFinite,
}

/// A 2D lattice basis with its cached inverse.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    u: DVec2,
    v: DVec2,
    inverse: DMat2,
}

impl Lattice {
    /// Build a lattice from two basis vectors.
    pub fn new(u: DVec2, v: DVec2) -> Result<Self, LatticeError> {
        let inverse = checked_inverse(u, v)?;
        Ok(Self { u, v, inverse })
    }

    /// The hexagonal cell with side `scale`: `U = (1, 0)·s`, `V = (½, √¾)·s`.
    pub fn hexagonal(scale: f64) -> Result<Self, LatticeError> {
        Self::new(
            DVec2::new(1.0, 0.0) * scale,
            DVec2::new(0.5, 0.75_f64.sqrt()) * scale,
        )
    }

    #[inline]
    pub fn u(&self) -> DVec2 {
        self.u
    }

    #[inline]
    pub fn v(&self) -> DVec2 {
        self.v
    }

    /// Replace both basis vectors. On error the previous basis is kept.
    pub fn set_basis(&mut self, u: DVec2, v: DVec2) -> Result<(), LatticeError> {
        let inverse = checked_inverse(u, v)?;
        self.u = u;
        self.v = v;
        self.inverse = inverse;
        Ok(())
    }

    /// Replace `U` only.
    pub fn set_u(&mut self, u: DVec2) -> Result<(), LatticeError> {
        self.set_basis(u, self.v)
    }

    /// Replace `V` only.
    pub fn set_v(&mut self, v: DVec2) -> Result<(), LatticeError> {
        self.set_basis(self.u, v)
    }

    /// Fractional `(u, v)` coordinates of an absolute position.
    #[inline]
    pub fn fractional_of(&self, p: DVec2) -> DVec2 {
        self.inverse * p
    }

    /// Absolute position of fractional coordinates.
    #[inline]
    pub fn absolute_of(&self, frac: DVec2) -> DVec2 {
        self.u * frac.x + self.v * frac.y
    }

    /// Translation vector of a sector: `U·dx + V·dy`.
    #[inline]
    pub fn offset(&self, sector: Sector) -> DVec2 {
        self.u * sector.dx as f64 + self.v * sector.dy as f64
    }

    /// The sector containing `p`: `(floor(u), floor(v))`.
    pub fn sector_of(&self, p: DVec2) -> Sector {
        let frac = self.fractional_of(p);
        Sector::new(frac.x.floor() as i32, frac.y.floor() as i32)
    }

    /// Translate `p` into the fundamental cell.
    ///
    /// The result has fractional coordinates in `[0, 1)` on both axes. A point
    /// that lands exactly on the far edge after rounding is moved across once
    /// more so the half-open bound holds.
    pub fn canonicalize(&self, p: DVec2) -> DVec2 {
        let shifted = p - self.offset(self.sector_of(p));
        let frac = self.fractional_of(shifted);
        let fix = Sector::new(edge_correction(frac.x), edge_correction(frac.y));
        if fix.is_origin() {
            shifted
        } else {
            shifted - self.offset(fix)
        }
    }

    /// Corners of the fundamental cell: `0, U, U+V, V`.
    pub fn cell_outline(&self) -> [DVec2; 4] {
        [DVec2::ZERO, self.u, self.u + self.v, self.v]
    }

    /// Smallest sector radius whose window contains every image within
    /// `radius` of the origin, whatever the basis obliquity.
    ///
    /// `|frac_i| <= |row_i(B⁻¹)|·|p|`, so the bound follows from the larger row
    /// norm of the inverse. One extra ring covers the cell extent of the base
    /// points themselves.
    pub fn covering_window(&self, radius: f64) -> i32 {
        let row_norm = self
            .inverse
            .row(0)
            .length()
            .max(self.inverse.row(1).length());
        let reach = (radius.max(0.0) * row_norm).ceil();
        if reach >= (i32::MAX / 2) as f64 {
            i32::MAX / 2
        } else {
            reach as i32 + 1
        }
    }
}

impl Default for Lattice {
    fn default() -> Self {
        Self {
            u: DVec2::X,
            v: DVec2::Y,
            inverse: DMat2::IDENTITY,
        }
    }
}

fn checked_inverse(u: DVec2, v: DVec2) -> Result<DMat2, LatticeError> {
    if !u.is_finite() || !v.is_finite() {
        return Err(LatticeError::NonFinite);
    }
    let basis = DMat2::from_cols(u, v);
    let determinant = basis.determinant();
    if determinant.abs() < BASIS_TOLERANCE {
        return Err(LatticeError::Degenerate { determinant });
    }
    Ok(basis.inverse())
}

fn edge_correction(frac: f64) -> i32 {
    if frac >= 1.0 {
        1
    } else if frac < 0.0 {
        -1
    } else {
        0
    }
}
