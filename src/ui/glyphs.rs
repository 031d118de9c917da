/// Small vector glyphs: the rotating alert triangle and the sparkline.
///
/// Rotation uses a 15-degree sine table so the renderer needs no float
/// math; angles are always multiples of the table step.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle, Triangle};

use super::{RED, WHITE};

/// Triangle flip interval while alerts are present.
pub const BLINK_INTERVAL_MS: u64 = 500;
/// Rotation added on every blink.
pub const ROTATION_STEP_DEG: u16 = 15;
/// Nominal triangle size in pixels; the circumradius is half of it.
pub const TRIANGLE_SIZE: i32 = 20;

/// sin(k * 15deg) scaled by 1000
const SIN_TABLE: [i32; 24] = [
    0, 259, 500, 707, 866, 966, 1000, 966, 866, 707, 500, 259, 0, -259, -500, -707, -866, -966,
    -1000, -966, -866, -707, -500, -259,
];

const STEPS: usize = SIN_TABLE.len();

fn sin_step(step: usize) -> i32 {
    SIN_TABLE[step % STEPS]
}

fn cos_step(step: usize) -> i32 {
    SIN_TABLE[(step + STEPS / 4) % STEPS]
}

/// Vertices of an equilateral triangle centered on `center`, first vertex
/// at `angle_deg`, the others 120 degrees apart.
pub fn triangle_vertices(center: Point, size: i32, angle_deg: u16) -> [Point; 3] {
    let r = size / 2;
    let base = (angle_deg / ROTATION_STEP_DEG) as usize;
    let third = STEPS / 3;
    let vertex = |k: usize| {
        let step = base + k * third;
        Point::new(
            center.x + r * cos_step(step) / 1000,
            center.y + r * sin_step(step) / 1000,
        )
    };
    [vertex(0), vertex(1), vertex(2)]
}

/// Blink/rotation state of the alert triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertAnimation {
    angle_deg: u16,
    lit: bool,
    last_step: u64,
}

impl AlertAnimation {
    pub const fn new() -> Self {
        Self {
            angle_deg: 0,
            lit: false,
            last_step: 0,
        }
    }

    /// Advance one step if the blink interval has elapsed since the last one.
    pub fn step(&mut self, now: u64) -> bool {
        if now.saturating_sub(self.last_step) < BLINK_INTERVAL_MS {
            return false;
        }
        self.lit = !self.lit;
        self.angle_deg = (self.angle_deg + ROTATION_STEP_DEG) % 360;
        self.last_step = now;
        true
    }

    pub fn angle_deg(&self) -> u16 {
        self.angle_deg
    }

    /// Current fill: red when lit, white otherwise.
    pub fn color(&self) -> Rgb565 {
        if self.lit {
            RED
        } else {
            WHITE
        }
    }
}

/// Draw one filled alert triangle.
pub fn draw_alert_triangle<D>(
    display: &mut D,
    center: Point,
    anim: &AlertAnimation,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let [a, b, c] = triangle_vertices(center, TRIANGLE_SIZE, anim.angle_deg());
    Triangle::new(a, b, c)
        .into_styled(PrimitiveStyle::with_fill(anim.color()))
        .draw(display)?;
    Ok(())
}

/// Polyline vertex `i` of a sparkline over `data` scaled into `area`.
/// Values are scaled against `max(1, max(data))`.
pub fn sparkline_point(area: &Rectangle, data: &[u32], i: usize) -> Point {
    let peak = data.iter().copied().max().unwrap_or(0).max(1) as i64;
    let w = area.size.width as i64;
    let h = area.size.height as i64;
    let segments = data.len().saturating_sub(1).max(1) as i64;
    let x = area.top_left.x as i64 + i as i64 * w / segments;
    let y = area.top_left.y as i64 + h - data[i] as i64 * h / peak;
    Point::new(x as i32, y as i32)
}

/// Draw `data` as a polyline in storage order.
pub fn draw_sparkline<D>(
    display: &mut D,
    area: &Rectangle,
    data: &[u32],
    color: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let style = PrimitiveStyle::with_stroke(color, 1);
    for i in 1..data.len() {
        Line::new(sparkline_point(area, data, i - 1), sparkline_point(area, data, i))
            .into_styled(style)
            .draw(display)?;
    }
    Ok(())
}
