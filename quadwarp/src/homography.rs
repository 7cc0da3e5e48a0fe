//! Four-point homography solving.
//!
//! Both point sets are Hartley-normalized (centroid at the origin, mean
//! distance √2) before the 8x8 direct linear system is built, so pixel-scale
//! coordinates do not wreck the pivots. The result is mapped back to the
//! caller's coordinates and scaled so that `h8 == 1`.

use log::debug;

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::error::WarpError;
use crate::matrix::Transform4x4;
use crate::types::{Point2, Quad};

/// Smallest pivot accepted during elimination (normalized coordinates).
const PIVOT_EPS: f64 = 1e-10;

/// Smallest |cross product| for a corner triple to count as non-collinear
/// (normalized coordinates, where the quad spans roughly 2x2 units).
const COLLINEAR_EPS: f64 = 1e-9;

/// A 3x3 homography matrix (row-major), normalized so `data[2][2] == 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    pub data: [[f64; 3]; 3],
}

/// Compute the homography mapping each `src` corner onto the matching `dst`
/// corner, i.e. `dst ≈ H * src` in homogeneous coordinates.
///
/// Fails with [`WarpError::InvalidArgument`] on non-finite input and with
/// [`WarpError::DegenerateConfiguration`] when three corners of either quad
/// are collinear (or coincide), since no unique projective map exists then.
///
/// A valid map can still be rejected: the result is scaled so `h8 == 1`, and
/// `h8` is zero when the source origin `(0, 0)` maps to the line at infinity.
/// Such a map has no `h8 == 1` form and is reported as
/// [`WarpError::DegenerateConfiguration`]. Translating both quads away from
/// the offending point avoids it.
pub fn solve(src: &Quad, dst: &Quad) -> Result<Homography, WarpError> {
    src.ensure_finite()?;
    dst.ensure_finite()?;

    let (t_src, src_n) = normalize_points(src)?;
    let (t_dst, dst_n) = normalize_points(dst)?;
    check_collinear(&src_n, "source")?;
    check_collinear(&dst_n, "destination")?;

    let h = solve_normalized(&src_n, &dst_n)?;
    let hn = [[h[0], h[1], h[2]], [h[3], h[4], h[5]], [h[6], h[7], 1.0]];

    // H = T_dst^-1 * Hn * T_src
    let denorm = mat_mul(&mat_mul(&t_dst.inverse_matrix(), &hn), &t_src.matrix());

    let scale = denorm[2][2];
    let max_abs = denorm
        .iter()
        .flatten()
        .fold(0.0f64, |acc, v| acc.max(v.abs()));
    if !scale.is_finite() || scale.abs() <= 1e-12 * max_abs {
        debug!("homography rejected: h8 vanishes (scale={scale}, max={max_abs})");
        return Err(WarpError::DegenerateConfiguration(
            "source origin maps to infinity; h8 cannot be normalized to 1".into(),
        ));
    }

    let mut data = denorm;
    for v in data.iter_mut().flatten() {
        *v /= scale;
    }
    data[2][2] = 1.0;
    Ok(Homography { data })
}

/// The transform from `dst` back to `src`; identical to `solve(dst, src)`.
pub fn solve_inverse(src: &Quad, dst: &Quad) -> Result<Homography, WarpError> {
    solve(dst, src)
}

impl Homography {
    pub const fn identity() -> Self {
        Homography {
            data: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Build from `[h0, h1, ..., h8]` in row-major order.
    pub fn from_row_major(h: [f64; 9]) -> Self {
        Homography {
            data: [[h[0], h[1], h[2]], [h[3], h[4], h[5]], [h[6], h[7], h[8]]],
        }
    }

    /// Entries `[h0, h1, ..., h8]` in row-major order.
    pub fn as_row_major(&self) -> [f64; 9] {
        let d = &self.data;
        [
            d[0][0], d[0][1], d[0][2], d[1][0], d[1][1], d[1][2], d[2][0], d[2][1], d[2][2],
        ]
    }

    /// Project a point through the homography, dividing by w.
    pub fn project(&self, x: f64, y: f64) -> (f64, f64) {
        let h = &self.data;
        let xx = h[0][0] * x + h[0][1] * y + h[0][2];
        let yy = h[1][0] * x + h[1][1] * y + h[1][2];
        let zz = h[2][0] * x + h[2][1] * y + h[2][2];
        (xx / zz, yy / zz)
    }

    pub fn project_point(&self, p: &Point2) -> Point2 {
        let (x, y) = self.project(p.x, p.y);
        Point2::new(x, y)
    }

    /// Project a batch of points, e.g. the vertices of a warped mesh.
    pub fn project_points(&self, points: &[Point2]) -> Vec<Point2> {
        #[cfg(feature = "parallel")]
        let projected = points.par_iter().map(|p| self.project_point(p)).collect();

        #[cfg(not(feature = "parallel"))]
        let projected = points.iter().map(|p| self.project_point(p)).collect();

        projected
    }

    /// Matrix product `self * rhs`: the map that applies `rhs` first.
    pub fn compose(&self, rhs: &Homography) -> Homography {
        Homography {
            data: mat_mul(&self.data, &rhs.data),
        }
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.data;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Compute the inverse homography, rescaled so `h8 == 1` where possible.
    pub fn inverse(&self) -> Option<Self> {
        let m = &self.data;
        let det = self.determinant();

        if det.abs() < 1e-10 {
            return None;
        }

        let inv_det = 1.0 / det;
        let mut inv = [[0.0f64; 3]; 3];

        inv[0][0] = (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det;
        inv[0][1] = (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det;
        inv[0][2] = (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det;
        inv[1][0] = (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det;
        inv[1][1] = (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det;
        inv[1][2] = (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det;
        inv[2][0] = (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det;
        inv[2][1] = (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det;
        inv[2][2] = (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det;

        let w = inv[2][2];
        if w.abs() > 1e-12 {
            for v in inv.iter_mut().flatten() {
                *v /= w;
            }
        }

        Some(Homography { data: inv })
    }

    /// Embed into the column-major 4x4 layout used by GL-style matrix stacks.
    pub fn to_column_major_4x4(&self) -> Transform4x4 {
        Transform4x4::from_homography(self)
    }
}

impl Default for Homography {
    fn default() -> Self {
        Homography::identity()
    }
}

/// Similarity `p -> s * (p - c)` taking a point set to Hartley-normalized form.
#[derive(Debug, Clone, Copy)]
struct Normalization {
    s: f64,
    cx: f64,
    cy: f64,
}

impl Normalization {
    fn matrix(&self) -> [[f64; 3]; 3] {
        let Normalization { s, cx, cy } = *self;
        [[s, 0.0, -s * cx], [0.0, s, -s * cy], [0.0, 0.0, 1.0]]
    }

    fn inverse_matrix(&self) -> [[f64; 3]; 3] {
        let Normalization { s, cx, cy } = *self;
        [[1.0 / s, 0.0, cx], [0.0, 1.0 / s, cy], [0.0, 0.0, 1.0]]
    }
}

fn normalize_points(q: &Quad) -> Result<(Normalization, [[f64; 2]; 4]), WarpError> {
    let cx = q.iter().map(|p| p.x).sum::<f64>() / 4.0;
    let cy = q.iter().map(|p| p.y).sum::<f64>() / 4.0;
    let mean_dist = q
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / 4.0;

    if mean_dist <= f64::MIN_POSITIVE {
        debug!("homography rejected: all corners coincide at ({cx}, {cy})");
        return Err(WarpError::DegenerateConfiguration(
            "all four corners coincide".into(),
        ));
    }

    let s = std::f64::consts::SQRT_2 / mean_dist;
    let pts = q.corners.map(|p| [s * (p.x - cx), s * (p.y - cy)]);
    Ok((Normalization { s, cx, cy }, pts))
}

fn check_collinear(pts: &[[f64; 2]; 4], side: &str) -> Result<(), WarpError> {
    const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
    for [i, j, k] in TRIPLES {
        let (a, b, c) = (pts[i], pts[j], pts[k]);
        let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
        if cross.abs() < COLLINEAR_EPS {
            debug!("homography rejected: {side} corners {i}, {j}, {k} are collinear");
            return Err(WarpError::DegenerateConfiguration(format!(
                "{side} corners {i}, {j}, {k} are collinear"
            )));
        }
    }
    Ok(())
}

/// Solve the 8x8 DLT system with h8 = 1 fixed.
fn solve_normalized(src: &[[f64; 2]; 4], dst: &[[f64; 2]; 4]) -> Result<[f64; 8], WarpError> {
    // Build 8x9 augmented system [A | b]
    let mut a = [[0.0f64; 9]; 8];
    for i in 0..4 {
        let [sx, sy] = src[i];
        let [dx, dy] = dst[i];

        let row0 = &mut a[i * 2];
        row0[0] = sx;
        row0[1] = sy;
        row0[2] = 1.0;
        row0[6] = -sx * dx;
        row0[7] = -sy * dx;
        row0[8] = dx;

        let row1 = &mut a[i * 2 + 1];
        row1[3] = sx;
        row1[4] = sy;
        row1[5] = 1.0;
        row1[6] = -sx * dy;
        row1[7] = -sy * dy;
        row1[8] = dy;
    }

    // Gaussian elimination with partial pivoting
    for col in 0..8 {
        let mut max_val = a[col][col].abs();
        let mut max_row = col;
        for row in (col + 1)..8 {
            let v = a[row][col].abs();
            if v > max_val {
                max_val = v;
                max_row = row;
            }
        }
        if max_val < PIVOT_EPS {
            debug!("homography rejected: pivot {max_val:e} in column {col}");
            return Err(WarpError::DegenerateConfiguration(format!(
                "linear system is singular (column {col})"
            )));
        }

        if max_row != col {
            a.swap(col, max_row);
        }

        let pivot = a[col][col];
        for row in (col + 1)..8 {
            let factor = a[row][col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for c in col..9 {
                a[row][c] -= factor * a[col][c];
            }
        }
    }

    // Back-substitute
    let mut h = [0.0f64; 8];
    for row in (0..8).rev() {
        let mut sum = a[row][8];
        for c in (row + 1)..8 {
            sum -= a[row][c] * h[c];
        }
        h[row] = sum / a[row][row];
    }

    Ok(h)
}

fn mat_mul(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut c = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            c[i][j] = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    c
}
