/// Main view: counters, sparklines, alert bar and the shields button.

use core::fmt::Write;

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle, RoundedRectangle};

use super::glyphs::{self, AlertAnimation, TRIANGLE_SIZE};
use super::{
    draw_gradient, text_centered, BLACK, BT_BLUE, BT_LIGHT_BLUE, RED, SCREEN_WIDTH, WHITE,
};
use crate::history::History;
use crate::shields::Shields;

const BUTTON_X: i32 = 73;
const BUTTON_Y: i32 = 160;
const BUTTON_W: u32 = 173;
const BUTTON_H: u32 = 60;

const SPARK_X: i32 = 120;
const SPARK_W: u32 = 180;
const SPARK_H: u32 = 30;
const TOTAL_ROW_Y: i32 = 50;
const USABLE_ROW_Y: i32 = 80;
const ALERT_BAR_Y: i32 = 110;
const ALERT_BAR_H: u32 = 30;

/// Touch/draw rectangle of the shields toggle.
pub fn shields_button_rect() -> Rectangle {
    Rectangle::new(
        Point::new(BUTTON_X, BUTTON_Y),
        Size::new(BUTTON_W, BUTTON_H),
    )
}

/// Everything the main view shows.
pub struct MainModel<'a> {
    pub total: u32,
    pub usable: u32,
    pub alerts: u32,
    pub shields: Shields,
    pub scanning: bool,
    pub history: &'a History,
    pub animation: &'a AlertAnimation,
}

/// Frame around a counter row's sparkline.
fn spark_frame(row_y: i32) -> Rectangle {
    Rectangle::new(
        Point::new(SPARK_X, row_y - SPARK_H as i32 / 2),
        Size::new(SPARK_W, SPARK_H),
    )
}

fn draw_counter_row<D>(
    display: &mut D,
    prefix: char,
    count: u32,
    row_y: i32,
    samples: &[u32],
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let mut label: heapless::String<16> = heapless::String::new();
    let _ = write!(label, "{} {}", prefix, count);
    text_centered(display, &label, Point::new(60, row_y), &FONT_10X20, BT_LIGHT_BLUE, None)?;

    let frame = spark_frame(row_y);
    frame
        .into_styled(PrimitiveStyle::with_stroke(BT_LIGHT_BLUE, 1))
        .draw(display)?;
    let inner = frame.offset(-2);
    glyphs::draw_sparkline(display, &inner, samples, BT_LIGHT_BLUE)
}

fn draw_alert_bar<D>(display: &mut D, alerts: u32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let bar = Rectangle::new(Point::new(0, ALERT_BAR_Y), Size::new(SCREEN_WIDTH, ALERT_BAR_H));
    let (fg, bg) = if alerts > 0 {
        bar.into_styled(PrimitiveStyle::with_fill(RED)).draw(display)?;
        (WHITE, Some(RED))
    } else {
        (BT_LIGHT_BLUE, None)
    };
    let mut label: heapless::String<24> = heapless::String::new();
    let _ = write!(label, "Alerts ({})", alerts);
    text_centered(display, &label, bar.center(), &FONT_10X20, fg, bg)
}

/// Shields toggle drawn as a ring: outer body, black band, inner face.
fn draw_shields_button<D>(display: &mut D, shields: Shields) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let color = if shields.is_up() { RED } else { BT_BLUE };
    let body = shields_button_rect();
    for (inset, radius, fill) in [(0, 10, color), (3, 9, BLACK), (5, 8, color)] {
        RoundedRectangle::with_equal_corners(body.offset(-inset), Size::new(radius, radius))
            .into_styled(PrimitiveStyle::with_fill(fill))
            .draw(display)?;
    }
    text_centered(display, shields.label(), body.center(), &FONT_10X20, WHITE, Some(color))
}

/// Full repaint of the main view.
pub fn draw<D>(display: &mut D, model: &MainModel<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    draw_gradient(display)?;
    text_centered(
        display,
        "Bluetooth Scanner",
        Point::new(SCREEN_WIDTH as i32 / 2, 15),
        &FONT_10X20,
        WHITE,
        None,
    )?;

    draw_counter_row(display, 'T', model.total, TOTAL_ROW_Y, model.history.total())?;
    draw_counter_row(display, 'U', model.usable, USABLE_ROW_Y, model.history.usable())?;
    draw_alert_bar(display, model.alerts)?;
    draw_shields_button(display, model.shields)?;

    if model.scanning {
        text_centered(
            display,
            "Scanning...",
            Point::new(SCREEN_WIDTH as i32 / 2, 230),
            &FONT_6X10,
            BT_LIGHT_BLUE,
            None,
        )?;
    }

    if model.alerts > 0 {
        let margin = TRIANGLE_SIZE;
        glyphs::draw_alert_triangle(display, Point::new(margin, margin), model.animation)?;
        glyphs::draw_alert_triangle(
            display,
            Point::new(SCREEN_WIDTH as i32 - margin, margin),
            model.animation,
        )?;
    }
    Ok(())
}
