//! Small numeric helpers shared by the UI-facing setters.

/// Linear interpolation between `min` and `max`.
#[inline]
pub fn lerp(t: f64, min: f64, max: f64) -> f64 {
    min + (max - min) * t
}

/// Exponential interpolation: `min·(max/min)^t`.
///
/// Maps a linear slider position onto a range spanning orders of magnitude.
/// Both bounds must be positive.
#[inline]
pub fn interpolate_exp(t: f64, min: f64, max: f64) -> f64 {
    lerp(t, min.ln(), max.ln()).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 2.0, 4.0), 2.0);
        assert_eq!(lerp(0.5, 2.0, 4.0), 3.0);
        assert_eq!(lerp(1.0, 2.0, 4.0), 4.0);
    }

    #[test]
    fn test_interpolate_exp() {
        assert!((interpolate_exp(0.0, 0.001, 1.0) - 0.001).abs() < 1e-12);
        assert!((interpolate_exp(1.0, 0.001, 1.0) - 1.0).abs() < 1e-12);
        // Geometric midpoint.
        assert!((interpolate_exp(0.5, 0.01, 1.0) - 0.1).abs() < 1e-12);
    }
}
