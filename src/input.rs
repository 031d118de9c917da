/// Touch sampling, coordinate mapping and hit testing.
///
/// The touch controller reports raw panel units (roughly 0..4095 per axis).
/// They are mapped linearly from the calibrated `[200, 3800]` span onto the
/// screen; points falling outside the screen are simply not matched by any
/// region.

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::ui::{self, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Raw panel value mapped to screen coordinate 0.
pub const TOUCH_RAW_MIN: i32 = 200;
/// Raw panel value mapped to the full screen dimension.
pub const TOUCH_RAW_MAX: i32 = 3800;

/// Quiet period after a touch on the main view.
pub const MAIN_DEBOUNCE_MS: u64 = 200;
/// Quiet period after a touch inside a list view.
pub const LIST_DEBOUNCE_MS: u64 = 50;

/// A point in raw touch-panel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPoint {
    pub x: u16,
    pub y: u16,
}

/// The touch controller as seen by the input router.
pub trait TouchPanel {
    fn touched(&mut self) -> bool;
    fn point(&mut self) -> RawPoint;
}

/// Linear map of one axis (integer arithmetic, no clamping).
fn map_axis(raw: u16, dim: i32) -> i32 {
    (raw as i32 - TOUCH_RAW_MIN) * dim / (TOUCH_RAW_MAX - TOUCH_RAW_MIN)
}

/// Map a raw panel point to screen pixels.
pub fn to_screen(raw: RawPoint) -> Point {
    Point::new(
        map_axis(raw.x, SCREEN_WIDTH as i32),
        map_axis(raw.y, SCREEN_HEIGHT as i32),
    )
}

/// Semantic regions of the main view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainHit {
    AllDevices,
    UsableDevices,
    Alerts,
    ShieldsButton,
}

/// Hit-test a screen point against the main view.
pub fn hit_main(p: Point) -> Option<MainHit> {
    match p.y {
        40..=59 => Some(MainHit::AllDevices),
        70..=89 => Some(MainHit::UsableDevices),
        110..=139 => Some(MainHit::Alerts),
        _ if shields_button().contains(p) => Some(MainHit::ShieldsButton),
        _ => None,
    }
}

/// Shields toggle rectangle, shared with the renderer.
pub fn shields_button() -> Rectangle {
    ui::main_view::shields_button_rect()
}

/// What a touch inside a list view means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListHit {
    /// Anywhere left of the scroll strip: back to the main view
    Exit,
    /// On the scroll strip: jump to this scroll position
    ScrollTo(usize),
}

/// Left edge of the scroll strip.
pub const SCROLL_STRIP_X: i32 = SCREEN_WIDTH as i32 - 20;

/// Hit-test a screen point against a list view with `max_scroll` positions.
pub fn hit_list(p: Point, max_scroll: usize) -> ListHit {
    if p.x < SCROLL_STRIP_X {
        return ListHit::Exit;
    }
    let top = ui::list_view::LIST_TOP;
    let bottom = SCREEN_HEIGHT as i32 - 20;
    let pos = (p.y - top) * max_scroll as i32 / (bottom - top);
    ListHit::ScrollTo(pos.clamp(0, max_scroll as i32) as usize)
}

/// Samples the panel and applies the post-touch quiet period.
#[derive(Debug, Default)]
pub struct InputRouter {
    quiet_until: u64,
}

impl InputRouter {
    pub const fn new() -> Self {
        Self { quiet_until: 0 }
    }

    /// Return the touched screen point, if any, and start a quiet period
    /// of `debounce_ms`. Touches during a quiet period are ignored.
    pub fn poll<T: TouchPanel>(&mut self, now: u64, touch: &mut T, debounce_ms: u64) -> Option<Point> {
        if now < self.quiet_until || !touch.touched() {
            return None;
        }
        let p = to_screen(touch.point());
        self.quiet_until = now + debounce_ms;
        log::debug!("Touch at ({}, {})", p.x, p.y);
        Some(p)
    }
}
