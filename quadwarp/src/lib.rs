pub mod types;
pub mod error;
#[allow(clippy::needless_range_loop)]
pub mod homography;
pub mod matrix;
pub mod warp;
#[cfg(feature = "serde")]
pub mod settings;

pub use error::WarpError;
pub use homography::{solve, solve_inverse, Homography};
pub use matrix::Transform4x4;
pub use types::{Corner, Point2, Quad, Rect};
pub use warp::{CornerState, Key, QuadWarp};
