//! Sine/cosine lookup with linear interpolation
//!
//! One sample per integer degree over [0, 360]. The extra sample at 360
//! lets the interpolation between 359 and 360 read `table[i + 1]` without a
//! wrap check. Interpolation error is bounded by the curvature between
//! neighbouring samples (about 4e-5), good enough for transforms, not for
//! exact geometry.

use std::sync::OnceLock;

const SAMPLES: usize = 361;

/// Precomputed sine and cosine tables indexed by whole degrees.
#[derive(Debug, Clone)]
pub struct TrigTable {
    sin: [f32; SAMPLES],
    cos: [f32; SAMPLES],
}

impl TrigTable {
    pub fn new() -> Self {
        let mut sin = [0.0; SAMPLES];
        let mut cos = [0.0; SAMPLES];
        for deg in 0..SAMPLES {
            let rad = (deg as f64).to_radians();
            sin[deg] = rad.sin() as f32;
            cos[deg] = rad.cos() as f32;
        }
        Self { sin, cos }
    }

    /// Sine of an angle in degrees. Any finite angle is accepted.
    pub fn sin(&self, degrees: f32) -> f32 {
        Self::lookup(&self.sin, degrees)
    }

    /// Cosine of an angle in degrees. Any finite angle is accepted.
    pub fn cos(&self, degrees: f32) -> f32 {
        Self::lookup(&self.cos, degrees)
    }

    /// Both at once, in `(sin, cos)` order like `f32::sin_cos`.
    pub fn sin_cos(&self, degrees: f32) -> (f32, f32) {
        (self.sin(degrees), self.cos(degrees))
    }

    fn lookup(table: &[f32; SAMPLES], degrees: f32) -> f32 {
        let mut theta = degrees % 360.0;
        if theta < 0.0 {
            theta += 360.0;
        }
        // -1e-9 % 360 + 360 rounds to exactly 360.0
        let index = (theta as usize).min(SAMPLES - 2);
        let frac = theta - index as f32;
        table[index] + frac * (table[index + 1] - table[index])
    }
}

impl Default for TrigTable {
    fn default() -> Self {
        Self::new()
    }
}

static TABLE: OnceLock<TrigTable> = OnceLock::new();

/// Process-wide table, built on first use.
pub fn trig_table() -> &'static TrigTable {
    TABLE.get_or_init(TrigTable::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_table_accuracy_full_circle() {
        let table = TrigTable::new();
        // Quarter-degree steps hit both samples and midpoints
        for step in 0..(360 * 4) {
            let deg = step as f32 * 0.25;
            let rad = deg.to_radians();
            assert_abs_diff_eq!(table.sin(deg), rad.sin(), epsilon = 1e-3);
            assert_abs_diff_eq!(table.cos(deg), rad.cos(), epsilon = 1e-3);
        }
    }

    #[test]
    fn test_exact_at_integer_degrees() {
        let table = TrigTable::new();
        assert_abs_diff_eq!(table.sin(90.0), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(table.cos(180.0), -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(table.sin(0.0), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_negative_and_large_angles_wrap() {
        let table = TrigTable::new();
        assert_abs_diff_eq!(table.sin(-90.0), -1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(table.sin(450.0), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(table.cos(-720.5), table.cos(359.5), epsilon = 1e-5);
        assert_abs_diff_eq!(table.sin(-1e-9), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_shared_table_matches_fresh_table() {
        let fresh = TrigTable::new();
        let shared = trig_table();
        assert_eq!(shared.sin(33.3), fresh.sin(33.3));
        assert_eq!(shared.cos(-12.5), fresh.cos(-12.5));
        assert!(std::ptr::eq(shared, trig_table()));
    }
}
