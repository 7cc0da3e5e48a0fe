//! Saved warp settings.
//!
//! The control only produces and consumes strings; where they are stored is
//! up to the host.

use serde::{Deserialize, Serialize};

use crate::error::WarpError;
use crate::types::{Point2, Quad};
use crate::warp::QuadWarp;

/// Source and target corners of a warp, in TL, TR, BR, BL order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarpSettings {
    pub src: [Point2; 4],
    pub dst: [Point2; 4],
}

impl WarpSettings {
    pub fn to_toml_string(&self) -> Result<String, WarpError> {
        toml::to_string(self).map_err(|e| WarpError::Settings(e.to_string()))
    }

    pub fn from_toml_str(toml_str: &str) -> Result<WarpSettings, WarpError> {
        let settings: WarpSettings =
            toml::from_str(toml_str).map_err(|e| WarpError::Settings(e.to_string()))?;
        Quad::new(settings.src).ensure_finite()?;
        Quad::new(settings.dst).ensure_finite()?;
        Ok(settings)
    }
}

impl QuadWarp {
    pub fn settings(&self) -> WarpSettings {
        WarpSettings {
            src: self.source().corners,
            dst: self.target().corners,
        }
    }

    pub fn apply_settings(&mut self, settings: &WarpSettings) {
        self.set_source(Quad::new(settings.src));
        self.set_target(Quad::new(settings.dst));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Corner, Rect};

    #[test]
    fn settings_roundtrip_through_toml() {
        let mut w = QuadWarp::new();
        w.set_source_rect(&Rect::new(0.0, 0.0, 1920.0, 1200.0));
        w.reset();
        w.set_corner(Corner::BottomLeft, Point2::new(12.5, 1180.0));

        let text = w.settings().to_toml_string().unwrap();
        let parsed = WarpSettings::from_toml_str(&text).unwrap();

        let mut restored = QuadWarp::new();
        restored.apply_settings(&parsed);
        assert_eq!(restored.source(), w.source());
        assert_eq!(restored.target(), w.target());
    }

    #[test]
    fn parses_inline_tables() {
        let text = r#"
src = [{ x = 0.0, y = 0.0 }, { x = 100.0, y = 0.0 }, { x = 100.0, y = 100.0 }, { x = 0.0, y = 100.0 }]
dst = [{ x = 10.0, y = 10.0 }, { x = 90.0, y = 5.0 }, { x = 95.0, y = 95.0 }, { x = 5.0, y = 90.0 }]
"#;
        let s = WarpSettings::from_toml_str(text).unwrap();
        assert_eq!(s.dst[1], Point2::new(90.0, 5.0));
    }

    #[test]
    fn wrong_point_count_is_rejected() {
        let text = r#"
src = [{ x = 0.0, y = 0.0 }, { x = 100.0, y = 0.0 }, { x = 100.0, y = 100.0 }]
dst = [{ x = 10.0, y = 10.0 }, { x = 90.0, y = 5.0 }, { x = 95.0, y = 95.0 }, { x = 5.0, y = 90.0 }]
"#;
        assert!(matches!(
            WarpSettings::from_toml_str(text),
            Err(WarpError::Settings(_))
        ));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let text = r#"
src = [{ x = nan, y = 0.0 }, { x = 100.0, y = 0.0 }, { x = 100.0, y = 100.0 }, { x = 0.0, y = 100.0 }]
dst = [{ x = 10.0, y = 10.0 }, { x = 90.0, y = 5.0 }, { x = 95.0, y = 95.0 }, { x = 5.0, y = 90.0 }]
"#;
        assert!(matches!(
            WarpSettings::from_toml_str(text),
            Err(WarpError::InvalidArgument(_))
        ));
    }
}
