/// Saved corner settings restore the same warp after a restart. Built only
/// with the `serde` feature; see `[[test]]` in Cargo.toml.
use quadwarp::settings::WarpSettings;
use quadwarp::{Corner, Point2, QuadWarp, Rect};

fn projector_warp() -> QuadWarp {
    let mut warp = QuadWarp::new();
    warp.set_source_rect(&Rect::new(0.0, 0.0, 1920.0, 1200.0));
    warp.set_target_rect(&Rect::new(0.0, 0.0, 1920.0, 1200.0));
    warp.setup();
    warp
}

#[test]
fn settings_survive_a_restart() {
    let mut warp = projector_warp();
    warp.set_corner(Corner::BottomLeft, Point2::new(30.0, 1170.0));
    warp.set_corner(Corner::TopRight, Point2::new(1890.0, -12.5));
    let saved = warp.settings().to_toml_string().unwrap();

    let mut restarted = projector_warp();
    restarted.apply_settings(&WarpSettings::from_toml_str(&saved).unwrap());
    assert_eq!(restarted.target(), warp.target());
    assert_eq!(restarted.source(), warp.source());
    assert_eq!(restarted.matrix().unwrap(), warp.matrix().unwrap());
}

#[test]
fn corrupt_settings_are_reported() {
    let err = WarpSettings::from_toml_str("src = 3").unwrap_err();
    assert!(matches!(err, quadwarp::WarpError::Settings(_)), "{err}");
}
