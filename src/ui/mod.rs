//! Screen rendering for the 320x240 landscape display.
//!
//! Renderers are plain functions over any `embedded-graphics` target in
//! RGB565. They read application state handed to them and keep none of
//! their own, apart from the list view's scroll position. Every draw call
//! returns the target's error so the caller can log it and retry on the
//! next tick.

pub mod glyphs;
pub mod list_view;
pub mod main_view;

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyle, TextStyleBuilder};

// ── Display geometry ─────────────────────────────────────────────────

pub const SCREEN_WIDTH: u32 = 320;
pub const SCREEN_HEIGHT: u32 = 240;

// ── Color palette ────────────────────────────────────────────────────

/// Pack 8-bit channels into RGB565.
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgb565 {
    Rgb565::new(r >> 3, g >> 2, b >> 3)
}

pub const BT_BLUE: Rgb565 = rgb(0, 103, 198);
pub const BT_LIGHT_BLUE: Rgb565 = rgb(94, 169, 255);
pub const BT_BACKGROUND: Rgb565 = rgb(10, 20, 50);
pub const WHITE: Rgb565 = Rgb565::WHITE;
pub const BLACK: Rgb565 = Rgb565::BLACK;
pub const RED: Rgb565 = Rgb565::RED;
pub const YELLOW: Rgb565 = Rgb565::YELLOW;

/// Row color of the vertical blue ramp.
pub fn gradient_color(y: i32) -> Rgb565 {
    let blue = 50 + y.clamp(0, SCREEN_HEIGHT as i32 - 1) * 150 / SCREEN_HEIGHT as i32;
    rgb(10, 20, blue as u8)
}

/// Paint the full-screen vertical gradient, one row at a time.
pub fn draw_gradient<D>(display: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    for y in 0..SCREEN_HEIGHT as i32 {
        Rectangle::new(Point::new(0, y), Size::new(SCREEN_WIDTH, 1))
            .into_styled(PrimitiveStyle::with_fill(gradient_color(y)))
            .draw(display)?;
    }
    Ok(())
}

// ── Text helpers ─────────────────────────────────────────────────────

const CENTERED: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Center)
    .baseline(Baseline::Middle)
    .build();

const TOP_LEFT: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Left)
    .baseline(Baseline::Top)
    .build();

fn char_style(font: &'static MonoFont<'static>, fg: Rgb565, bg: Option<Rgb565>) -> MonoTextStyle<'static, Rgb565> {
    let builder = MonoTextStyleBuilder::new().font(font).text_color(fg);
    match bg {
        Some(bg) => builder.background_color(bg).build(),
        None => builder.build(),
    }
}

/// Draw `text` centered on `pos` (middle baseline).
pub fn text_centered<D>(
    display: &mut D,
    text: &str,
    pos: Point,
    font: &'static MonoFont<'static>,
    fg: Rgb565,
    bg: Option<Rgb565>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Text::with_text_style(text, pos, char_style(font, fg, bg), CENTERED).draw(display)?;
    Ok(())
}

/// Draw `text` with its top-left corner at `pos`.
pub fn text_at<D>(
    display: &mut D,
    text: &str,
    pos: Point,
    font: &'static MonoFont<'static>,
    fg: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Text::with_text_style(text, pos, char_style(font, fg, None), TOP_LEFT).draw(display)?;
    Ok(())
}
