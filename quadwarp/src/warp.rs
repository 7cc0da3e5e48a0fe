//! The quad-warp control model.
//!
//! A host application owns a [`QuadWarp`], forwards pointer and key input to
//! it through the `on_*` methods, draws the handles however it likes from the
//! accessors, and feeds [`QuadWarp::matrix`] to its renderer. Nothing here
//! subscribes to events or touches a window.

use log::{trace, warn};

use crate::error::WarpError;
use crate::homography::{self, Homography};
use crate::matrix::Transform4x4;
use crate::types::{Corner, Point2, Quad, Rect};

pub const DEFAULT_ANCHOR_SIZE: f64 = 10.0;
pub const DEFAULT_NUDGE_AMOUNT: f64 = 1.0;
pub const MIN_NUDGE_AMOUNT: f64 = 0.3;
pub const MAX_NUDGE_AMOUNT: f64 = 25.0;

/// Step applied to the nudge amount by the `[` and `]` keys.
const NUDGE_STEP: f64 = 1.0;

/// Pointer state over the handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CornerState {
    #[default]
    Idle,
    /// The pointer hovers over a handle.
    CornerHighlighted(Corner),
    /// A handle is held down and follows the pointer.
    CornerDragging(Corner),
}

/// Keys the control reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Left,
    Right,
    Up,
    Down,
}

/// Four draggable corner handles mapping a source quad onto a target quad.
#[derive(Debug, Clone)]
pub struct QuadWarp {
    src: Quad,
    dst: Quad,
    position: Point2,
    anchor_size: f64,
    nudge_amount: f64,
    visible: bool,
    mouse_enabled: bool,
    keyboard_enabled: bool,
    state: CornerState,
    /// Corner the keyboard nudges act on. Set by grabbing a handle or by a
    /// number key; outlives the drag.
    selected: Option<Corner>,
}

impl Default for QuadWarp {
    fn default() -> Self {
        Self {
            src: Quad::default(),
            dst: Quad::default(),
            position: Point2::default(),
            anchor_size: DEFAULT_ANCHOR_SIZE,
            nudge_amount: DEFAULT_NUDGE_AMOUNT,
            visible: false,
            mouse_enabled: false,
            keyboard_enabled: false,
            state: CornerState::Idle,
            selected: None,
        }
    }
}

impl QuadWarp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pointer and keyboard input and show the handles.
    pub fn setup(&mut self) {
        self.enable_mouse_controls();
        self.enable_keyboard_shortcuts();
        self.show();
    }

    // ── source / target points ──

    pub fn set_source_rect(&mut self, r: &Rect) {
        self.src = Quad::from_rect(r);
    }

    pub fn set_source_points(&mut self, points: &[Point2]) -> Result<(), WarpError> {
        self.src = Quad::from_points(points)?;
        Ok(())
    }

    pub fn set_source(&mut self, q: Quad) {
        self.src = q;
    }

    pub fn source(&self) -> &Quad {
        &self.src
    }

    pub fn set_target_rect(&mut self, r: &Rect) {
        self.dst = Quad::from_rect(r);
    }

    pub fn set_target_points(&mut self, points: &[Point2]) -> Result<(), WarpError> {
        self.dst = Quad::from_points(points)?;
        Ok(())
    }

    pub fn set_target(&mut self, q: Quad) {
        self.dst = q;
    }

    pub fn target(&self) -> &Quad {
        &self.dst
    }

    /// Move one target corner.
    pub fn set_corner(&mut self, corner: Corner, p: Point2) {
        self.dst[corner] = p;
    }

    /// Replace all four target corners (TL, TR, BR, BL).
    pub fn set_corners(&mut self, corners: &[Point2]) -> Result<(), WarpError> {
        self.set_target_points(corners)
    }

    /// Snap the target back onto the source.
    pub fn reset(&mut self) {
        self.dst = self.src;
    }

    // ── matrix ──

    pub fn homography(&self) -> Result<Homography, WarpError> {
        homography::solve(&self.src, &self.dst)
    }

    pub fn homography_inverse(&self) -> Result<Homography, WarpError> {
        homography::solve_inverse(&self.src, &self.dst)
    }

    /// Source-to-target transform as a column-major 4x4 matrix.
    pub fn matrix(&self) -> Result<Transform4x4, WarpError> {
        Ok(self.homography()?.to_column_major_4x4())
    }

    /// Target-to-source transform as a column-major 4x4 matrix.
    pub fn matrix_inverse(&self) -> Result<Transform4x4, WarpError> {
        Ok(self.homography_inverse()?.to_column_major_4x4())
    }

    // ── settings ──

    /// Screen offset of the control; subtracted from pointer positions.
    pub fn set_position(&mut self, p: Point2) {
        self.position = p;
    }

    pub fn position(&self) -> Point2 {
        self.position
    }

    /// Handle size in pixels. A pointer within half of it grabs the handle.
    pub fn set_anchor_size(&mut self, size: f64) -> Result<(), WarpError> {
        if !size.is_finite() || size <= 0.0 {
            return Err(WarpError::InvalidArgument(format!(
                "anchor size must be positive and finite, got {size}"
            )));
        }
        self.anchor_size = size;
        Ok(())
    }

    pub fn anchor_size(&self) -> f64 {
        self.anchor_size
    }

    /// Set the keyboard nudge step, clamped to
    /// [`MIN_NUDGE_AMOUNT`]..=[`MAX_NUDGE_AMOUNT`]. NaN keeps the old value.
    pub fn set_nudge_amount(&mut self, amount: f64) {
        if amount.is_nan() {
            warn!("ignoring NaN nudge amount");
            return;
        }
        let clamped = amount.clamp(MIN_NUDGE_AMOUNT, MAX_NUDGE_AMOUNT);
        if clamped != amount {
            warn!("nudge amount {amount} clamped to {clamped}");
        }
        self.nudge_amount = clamped;
    }

    pub fn nudge_amount(&self) -> f64 {
        self.nudge_amount
    }

    // ── show / hide ──

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn toggle_show(&mut self) {
        self.visible = !self.visible;
    }

    pub fn is_showing(&self) -> bool {
        self.visible
    }

    pub fn enable_mouse_controls(&mut self) {
        self.mouse_enabled = true;
    }

    pub fn disable_mouse_controls(&mut self) {
        self.mouse_enabled = false;
    }

    pub fn enable_keyboard_shortcuts(&mut self) {
        self.keyboard_enabled = true;
    }

    pub fn disable_keyboard_shortcuts(&mut self) {
        self.keyboard_enabled = false;
    }

    // ── selection ──

    pub fn state(&self) -> CornerState {
        self.state
    }

    pub fn highlighted(&self) -> Option<Corner> {
        match self.state {
            CornerState::CornerHighlighted(c) => Some(c),
            _ => None,
        }
    }

    pub fn dragging(&self) -> Option<Corner> {
        match self.state {
            CornerState::CornerDragging(c) => Some(c),
            _ => None,
        }
    }

    pub fn selected(&self) -> Option<Corner> {
        self.selected
    }

    fn select(&mut self, corner: Option<Corner>) {
        if corner != self.selected {
            trace!("selected corner {:?} -> {:?}", self.selected, corner);
            self.selected = corner;
        }
    }

    fn set_state(&mut self, state: CornerState) {
        if state != self.state {
            trace!("corner state {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    fn pointer_active(&self) -> bool {
        self.visible && self.mouse_enabled
    }

    fn local(&self, pos: Point2) -> Point2 {
        pos.offset_by(&self.position)
    }

    /// First target corner within half the anchor size of `p`.
    fn hit_test(&self, p: &Point2) -> Option<Corner> {
        let radius = self.anchor_size * 0.5;
        Corner::ALL
            .into_iter()
            .find(|&c| p.distance(&self.dst[c]) <= radius)
    }

    // ── input ──

    fn hover(&mut self, p: &Point2) {
        let next = match self.hit_test(p) {
            Some(c) => CornerState::CornerHighlighted(c),
            None => CornerState::Idle,
        };
        self.set_state(next);
    }

    pub fn on_pointer_move(&mut self, pos: Point2) {
        if !self.pointer_active() || self.dragging().is_some() {
            return;
        }
        let p = self.local(pos);
        self.hover(&p);
    }

    pub fn on_pointer_down(&mut self, pos: Point2) {
        if !self.pointer_active() {
            return;
        }
        let p = self.local(pos);
        match self.hit_test(&p) {
            Some(c) => {
                self.dst[c] = p;
                self.set_state(CornerState::CornerDragging(c));
                self.select(Some(c));
            }
            None => {
                self.set_state(CornerState::Idle);
                self.select(None);
            }
        }
    }

    pub fn on_pointer_drag(&mut self, pos: Point2) {
        if !self.pointer_active() {
            return;
        }
        if let Some(c) = self.dragging() {
            self.dst[c] = self.local(pos);
        }
    }

    /// Drop the held handle at `pos`. The corner stays selected for keyboard
    /// nudges; the pointer state falls back to hovering.
    pub fn on_pointer_up(&mut self, pos: Point2) {
        if !self.pointer_active() {
            return;
        }
        let p = self.local(pos);
        if let Some(c) = self.dragging() {
            self.dst[c] = p;
        }
        self.hover(&p);
    }

    /// `[`/`]` shrink or grow the nudge step, `1`-`4` select a corner,
    /// arrows nudge the selected target corner and `a`/`d`/`w`/`s` nudge the
    /// selected source corner.
    pub fn on_key_press(&mut self, key: Key) {
        if !self.visible || !self.keyboard_enabled {
            return;
        }

        match key {
            Key::Char('[') => {
                self.set_nudge_amount(self.nudge_amount - NUDGE_STEP);
                return;
            }
            Key::Char(']') => {
                self.set_nudge_amount(self.nudge_amount + NUDGE_STEP);
                return;
            }
            Key::Char(d @ '1'..='4') => {
                let index = d as usize - '1' as usize;
                if let Ok(c) = Corner::try_from(index) {
                    self.select(Some(c));
                }
            }
            _ => {}
        }

        let Some(corner) = self.selected() else {
            return;
        };
        let step = self.nudge_amount;

        let dst = &mut self.dst[corner];
        match key {
            Key::Left => dst.x -= step,
            Key::Right => dst.x += step,
            Key::Up => dst.y -= step,
            Key::Down => dst.y += step,
            _ => {}
        }

        let src = &mut self.src[corner];
        match key {
            Key::Char('d') => src.x -= step,
            Key::Char('a') => src.x += step,
            Key::Char('s') => src.y -= step,
            Key::Char('w') => src.y += step,
            _ => {}
        }
    }
}
