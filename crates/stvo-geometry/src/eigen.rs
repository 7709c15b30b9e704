//! Eigenvalues of symmetric 3×3 matrices.
//!
//! Covariance matrices coming out of stereo triangulation are small, dense
//! and symmetric, so a cyclic Jacobi sweep in double precision converges in a
//! handful of rotations and avoids pulling in a general-purpose solver.
//!
//! # Example
//!
//! ```
//! use glam::DMat3;
//! use stvo_geometry::eigen::symmetric_eigenvalues3;
//!
//! let m = DMat3::from_diagonal(glam::DVec3::new(3.0, 1.0, 2.0));
//! assert_eq!(symmetric_eigenvalues3(&m), [1.0, 2.0, 3.0]);
//! ```

use glam::DMat3;

const MAX_SWEEPS: usize = 32;

/// A symmetric 3x3 matrix storing only its lower triangle.
#[derive(Debug, Clone, Copy)]
struct Symmetric3x3 {
    m_00: f64,
    m_10: f64,
    m_11: f64,
    m_20: f64,
    m_21: f64,
    m_22: f64,
}

impl Symmetric3x3 {
    fn from_mat3(mat: &DMat3) -> Self {
        Self {
            m_00: mat.x_axis.x,
            m_10: mat.x_axis.y,
            m_11: mat.y_axis.y,
            m_20: mat.x_axis.z,
            m_21: mat.y_axis.z,
            m_22: mat.z_axis.z,
        }
    }

    #[inline]
    fn off_diagonal_norm_sq(&self) -> f64 {
        self.m_10 * self.m_10 + self.m_20 * self.m_20 + self.m_21 * self.m_21
    }

    #[inline]
    fn diagonal_norm_sq(&self) -> f64 {
        self.m_00 * self.m_00 + self.m_11 * self.m_11 + self.m_22 * self.m_22
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        match (row.max(col), row.min(col)) {
            (0, 0) => self.m_00,
            (1, 0) => self.m_10,
            (1, 1) => self.m_11,
            (2, 0) => self.m_20,
            (2, 1) => self.m_21,
            _ => self.m_22,
        }
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        match (row.max(col), row.min(col)) {
            (0, 0) => self.m_00 = value,
            (1, 0) => self.m_10 = value,
            (1, 1) => self.m_11 = value,
            (2, 0) => self.m_20 = value,
            (2, 1) => self.m_21 = value,
            _ => self.m_22 = value,
        }
    }

    /// Annihilate the (p, q) entry with an exact Jacobi rotation.
    fn rotate(&mut self, p: usize, q: usize) {
        let a_pq = self.get(p, q);
        if a_pq == 0.0 {
            return;
        }
        let a_pp = self.get(p, p);
        let a_qq = self.get(q, q);

        let theta = (a_qq - a_pp) / (2.0 * a_pq);
        let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
        let c = 1.0 / (t * t + 1.0).sqrt();
        let s = t * c;

        // the remaining index of {0, 1, 2}
        let r = 3 - p - q;
        let a_rp = self.get(r, p);
        let a_rq = self.get(r, q);
        self.set(r, p, c * a_rp - s * a_rq);
        self.set(r, q, s * a_rp + c * a_rq);

        self.set(p, p, a_pp - t * a_pq);
        self.set(q, q, a_qq + t * a_pq);
        self.set(p, q, 0.0);
    }
}

/// Compute the eigenvalues of a symmetric 3x3 matrix in ascending order.
///
/// Only the lower triangle of `mat` is read.
pub fn symmetric_eigenvalues3(mat: &DMat3) -> [f64; 3] {
    let mut s = Symmetric3x3::from_mat3(mat);

    for _ in 0..MAX_SWEEPS {
        let off = s.off_diagonal_norm_sq();
        if off == 0.0 || off <= f64::EPSILON * f64::EPSILON * s.diagonal_norm_sq() {
            break;
        }
        s.rotate(0, 1);
        s.rotate(0, 2);
        s.rotate(1, 2);
    }

    let mut eigenvalues = [s.m_00, s.m_11, s.m_22];
    eigenvalues.sort_by(f64::total_cmp);
    eigenvalues
}

/// Largest eigenvalue of a symmetric 3x3 matrix.
pub fn max_symmetric_eigenvalue3(mat: &DMat3) -> f64 {
    symmetric_eigenvalues3(mat)[2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec3;

    #[test]
    fn test_diagonal() {
        let m = DMat3::from_diagonal(DVec3::new(5.0, -1.0, 2.0));
        assert_eq!(symmetric_eigenvalues3(&m), [-1.0, 2.0, 5.0]);
    }

    #[test]
    fn test_known_spectrum() {
        // eigenvalues of [[2, 1, 0], [1, 2, 0], [0, 0, 3]] are {1, 3, 3}
        let m = DMat3::from_cols(
            DVec3::new(2.0, 1.0, 0.0),
            DVec3::new(1.0, 2.0, 0.0),
            DVec3::new(0.0, 0.0, 3.0),
        );
        let ev = symmetric_eigenvalues3(&m);
        assert_relative_eq!(ev[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(ev[1], 3.0, epsilon = 1e-12);
        assert_relative_eq!(ev[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invariants_of_dense_matrix() {
        let m = DMat3::from_cols(
            DVec3::new(4.0, -2.0, 1.5),
            DVec3::new(-2.0, 3.0, 0.5),
            DVec3::new(1.5, 0.5, 6.0),
        );
        let ev = symmetric_eigenvalues3(&m);
        // trace and determinant are preserved by the similarity transforms
        assert_relative_eq!(ev.iter().sum::<f64>(), 13.0, epsilon = 1e-9);
        assert_relative_eq!(ev[0] * ev[1] * ev[2], m.determinant(), epsilon = 1e-9);
        for lambda in ev {
            let shifted = m - DMat3::IDENTITY * lambda;
            assert_relative_eq!(shifted.determinant(), 0.0, epsilon = 1e-8);
        }
        assert_relative_eq!(max_symmetric_eigenvalue3(&m), ev[2]);
    }
}
