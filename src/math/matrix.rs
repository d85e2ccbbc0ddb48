//! 4x4 homogeneous matrices
//!
//! Row-major storage, column-vector convention: `m * p` transforms `p`, and
//! `a * b` applies `b` first. Rotations take degrees and read the trig table.

use std::ops::Mul;

use super::trig::trig_table;
use super::vector::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub m: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn translation(t: Vec3) -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, t.x],
                [0.0, 1.0, 0.0, t.y],
                [0.0, 0.0, 1.0, t.z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn scale(s: Vec3) -> Self {
        Self {
            m: [
                [s.x, 0.0, 0.0, 0.0],
                [0.0, s.y, 0.0, 0.0],
                [0.0, 0.0, s.z, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Rotation about +X. Positive angles turn +Y toward +Z.
    pub fn rotation_x(degrees: f32) -> Self {
        let (s, c) = trig_table().sin_cos(degrees);
        Self {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, -s, 0.0],
                [0.0, s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Rotation about +Y. Positive angles turn +Z toward +X.
    pub fn rotation_y(degrees: f32) -> Self {
        let (s, c) = trig_table().sin_cos(degrees);
        Self {
            m: [
                [c, 0.0, s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [-s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Rotation about +Z. Positive angles turn +X toward +Y.
    pub fn rotation_z(degrees: f32) -> Self {
        let (s, c) = trig_table().sin_cos(degrees);
        Self {
            m: [
                [c, -s, 0.0, 0.0],
                [s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Object rotation from euler angles in degrees, applied X, then Y, then Z.
    pub fn rotation_xyz(rot: Vec3) -> Self {
        Self::rotation_z(rot.z) * Self::rotation_y(rot.y) * Self::rotation_x(rot.x)
    }

    /// Rotation whose rows are the given basis vectors. Maps `u` to +X,
    /// `v` to +Y and `n` to +Z when the basis is orthonormal.
    pub fn from_rows(u: Vec3, v: Vec3, n: Vec3) -> Self {
        Self {
            m: [
                [u.x, u.y, u.z, 0.0],
                [v.x, v.y, v.z, 0.0],
                [n.x, n.y, n.z, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn transpose(&self) -> Self {
        let mut result = [[0.0; 4]; 4];
        for (i, row) in result.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = self.m[j][i];
            }
        }
        Self { m: result }
    }

    /// Transform a point (w = 1).
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z + m[0][3],
            m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z + m[1][3],
            m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z + m[2][3],
        )
    }

    /// Transform a direction (w = 0): translation is ignored.
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    /// Column `i` of the upper 3x3 (the image of the i-th unit axis).
    pub fn column(&self, i: usize) -> Vec3 {
        Vec3::new(self.m[0][i], self.m[1][i], self.m[2][i])
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, other: Mat4) -> Mat4 {
        let mut result = [[0.0; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    result[i][j] += self.m[i][k] * other.m[k][j];
                }
            }
        }
        Mat4 { m: result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-4);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-4);
        assert_abs_diff_eq!(a.z, b.z, epsilon = 1e-4);
    }

    #[test]
    fn test_rotation_y_turns_forward_to_right() {
        let r = Mat4::rotation_y(90.0);
        assert_vec_eq(r.transform_vector(Vec3::FORWARD), Vec3::RIGHT);
    }

    #[test]
    fn test_rotation_inverse_is_transpose() {
        let r = Mat4::rotation_xyz(Vec3::new(30.0, -45.0, 12.0));
        let p = Vec3::new(1.0, 2.0, 3.0);
        let back = r.transpose().transform_vector(r.transform_vector(p));
        assert_vec_eq(back, p);
    }

    #[test]
    fn test_translation_ignored_for_vectors() {
        let t = Mat4::translation(Vec3::new(5.0, 6.0, 7.0));
        assert_vec_eq(t.transform_point(Vec3::ZERO), Vec3::new(5.0, 6.0, 7.0));
        assert_vec_eq(t.transform_vector(Vec3::UP), Vec3::UP);
    }

    #[test]
    fn test_mul_applies_right_operand_first() {
        let m = Mat4::translation(Vec3::new(10.0, 0.0, 0.0)) * Mat4::scale(Vec3::new(2.0, 2.0, 2.0));
        assert_vec_eq(m.transform_point(Vec3::new(1.0, 1.0, 1.0)), Vec3::new(12.0, 2.0, 2.0));
    }

    #[test]
    fn test_from_rows_maps_basis_to_axes() {
        let u = Vec3::new(0.0, 0.0, -1.0);
        let v = Vec3::UP;
        let n = Vec3::RIGHT;
        let m = Mat4::from_rows(u, v, n);
        assert_vec_eq(m.transform_vector(n), Vec3::FORWARD);
        assert_vec_eq(m.transform_vector(u), Vec3::RIGHT);
    }
}
