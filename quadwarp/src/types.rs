use std::ops::{Index, IndexMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::WarpError;

/// A 2D point in warp space (pixels, for the usual projector use).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Component-wise `self - other`.
    pub fn offset_by(&self, other: &Point2) -> Point2 {
        Point2::new(self.x - other.x, self.y - other.y)
    }
}

impl From<[f64; 2]> for Point2 {
    fn from(p: [f64; 2]) -> Self {
        Point2::new(p[0], p[1])
    }
}

impl From<Point2> for [f64; 2] {
    fn from(p: Point2) -> Self {
        [p.x, p.y]
    }
}

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// One of the four handles of a quad, in winding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Corner {
    TopLeft = 0,
    TopRight = 1,
    BottomRight = 2,
    BottomLeft = 3,
}

impl Corner {
    /// All corners in winding order: TL, TR, BR, BL.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomRight,
        Corner::BottomLeft,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for Corner {
    type Error = WarpError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Corner::ALL.get(index).copied().ok_or_else(|| {
            WarpError::InvalidArgument(format!("corner index {index} is out of range 0..4"))
        })
    }
}

/// Four ordered corner points.
///
/// When built from a rectangle the corners follow top-left, top-right,
/// bottom-right, bottom-left. Any other four points are accepted as-is; the
/// solver pairs them with the other quad by position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Quad {
    pub corners: [Point2; 4],
}

impl Quad {
    pub const fn new(corners: [Point2; 4]) -> Self {
        Self { corners }
    }

    pub fn from_rect(r: &Rect) -> Self {
        Self::new([
            Point2::new(r.x, r.y),
            Point2::new(r.x + r.width, r.y),
            Point2::new(r.x + r.width, r.y + r.height),
            Point2::new(r.x, r.y + r.height),
        ])
    }

    /// Build a quad from a slice that must hold exactly four points.
    pub fn from_points(points: &[Point2]) -> Result<Self, WarpError> {
        let corners: [Point2; 4] = points.try_into().map_err(|_| {
            WarpError::InvalidArgument(format!("expected 4 points, got {}", points.len()))
        })?;
        Ok(Self::new(corners))
    }

    /// Fail with `InvalidArgument` if any coordinate is NaN or infinite.
    pub fn ensure_finite(&self) -> Result<(), WarpError> {
        match self.corners.iter().position(|p| !p.is_finite()) {
            Some(i) => Err(WarpError::InvalidArgument(format!(
                "corner {i} is not finite: ({}, {})",
                self.corners[i].x, self.corners[i].y
            ))),
            None => Ok(()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point2> {
        self.corners.iter()
    }
}

impl From<[[f64; 2]; 4]> for Quad {
    fn from(c: [[f64; 2]; 4]) -> Self {
        Quad::new(c.map(Point2::from))
    }
}

impl Index<Corner> for Quad {
    type Output = Point2;

    fn index(&self, corner: Corner) -> &Point2 {
        &self.corners[corner.index()]
    }
}

impl IndexMut<Corner> for Quad {
    fn index_mut(&mut self, corner: Corner) -> &mut Point2 {
        &mut self.corners[corner.index()]
    }
}
