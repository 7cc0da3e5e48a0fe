use crate::homography::Homography;
use crate::types::Point2;

/// A 4x4 matrix stored column-major, as GL-style matrix stacks expect.
///
/// Element `(row, col)` lives at `data[col * 4 + row]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform4x4 {
    pub data: [f64; 16],
}

impl Transform4x4 {
    #[rustfmt::skip]
    pub const IDENTITY: Transform4x4 = Transform4x4 {
        data: [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// Embed a 2D homography acting on the XY plane.
    ///
    /// Starts from the identity and overwrites the nine positions that carry
    /// `x`, `y` and `w`; the `z` row and column stay untouched:
    ///
    /// ```text
    ///   h0 h1  0 h2
    ///   h3 h4  0 h5
    ///    0  0  1  0
    ///   h6 h7  0 h8
    /// ```
    pub fn from_homography(h: &Homography) -> Self {
        let m = h.as_row_major();
        let mut out = Self::IDENTITY;
        let d = &mut out.data;

        d[0] = m[0];
        d[4] = m[1];
        d[12] = m[2];

        d[1] = m[3];
        d[5] = m[4];
        d[13] = m[5];

        d[3] = m[6];
        d[7] = m[7];
        d[15] = m[8];

        out
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[col * 4 + row]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Single-precision copy for uploading to a renderer.
    pub fn to_f32(&self) -> [f32; 16] {
        self.data.map(|v| v as f32)
    }

    /// Multiply a homogeneous column vector: `out[r] = Σ_c m(r, c) * v[c]`.
    pub fn transform(&self, v: [f64; 4]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (r, o) in out.iter_mut().enumerate() {
            *o = (0..4).map(|c| self.get(r, c) * v[c]).sum();
        }
        out
    }

    /// Transform `(x, y, 0, 1)` and divide by w. `None` when w vanishes.
    pub fn transform_point2(&self, x: f64, y: f64) -> Option<Point2> {
        let [tx, ty, _, w] = self.transform([x, y, 0.0, 1.0]);
        if w.abs() < 1e-15 || !w.is_finite() {
            return None;
        }
        Some(Point2::new(tx / w, ty / w))
    }
}

impl Default for Transform4x4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<&Homography> for Transform4x4 {
    fn from(h: &Homography) -> Self {
        Transform4x4::from_homography(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_homography_gives_identity_matrix() {
        let m = Homography::identity().to_column_major_4x4();
        assert_eq!(m, Transform4x4::IDENTITY);
    }

    #[test]
    fn layout_positions() {
        let h = Homography::from_row_major([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let m = Transform4x4::from_homography(&h);
        #[rustfmt::skip]
        let expected = [
            1.0, 4.0, 0.0, 7.0,
            2.0, 5.0, 0.0, 8.0,
            0.0, 0.0, 1.0, 0.0,
            3.0, 6.0, 0.0, 9.0,
        ];
        assert_eq!(m.data, expected);
        assert_eq!(m.get(0, 3), 3.0);
        assert_eq!(m.get(3, 0), 7.0);
    }

    #[test]
    fn transform_point_reproduces_projection() {
        let h = Homography::from_row_major([1.2, 0.1, 5.0, -0.05, 0.9, 3.0, 1e-3, -2e-3, 1.0]);
        let m = h.to_column_major_4x4();
        for &(x, y) in &[(0.0, 0.0), (10.0, 20.0), (-7.5, 42.0)] {
            let (ex, ey) = h.project(x, y);
            let p = m.transform_point2(x, y).unwrap();
            assert!((p.x - ex).abs() < 1e-12 && (p.y - ey).abs() < 1e-12);
        }
    }

    #[test]
    fn z_passes_through() {
        let m = Homography::identity().to_column_major_4x4();
        assert_eq!(m.transform([1.0, 2.0, 3.0, 1.0]), [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn vanishing_w_is_none() {
        let h = Homography::from_row_major([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
        assert!(h.to_column_major_4x4().transform_point2(0.0, 5.0).is_none());
    }
}
