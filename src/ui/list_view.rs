/// Scrollable device lists.
///
/// A list view owns a copy of the buffer it shows, taken when it opens, so
/// discoveries during a running scan do not shift lines under the user.
/// The alert list is refreshed explicitly when a scan completes.

use alloc::string::String;

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10, FONT_9X15};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

use super::{
    draw_gradient, text_at, text_centered, BT_BLUE, BT_LIGHT_BLUE, RED, SCREEN_HEIGHT,
    SCREEN_WIDTH, WHITE, YELLOW,
};
use crate::registry::line_count;

/// Y of the first list line.
pub const LIST_TOP: i32 = 40;
/// Vertical pitch of list lines.
pub const LIST_LINE_HEIGHT: i32 = 24;
/// Lines shown at once.
pub const LIST_VISIBLE_LINES: usize = 8;

const LIST_TEXT_X: i32 = 13;
const SCROLLBAR_W: u32 = 10;
const SCROLLBAR_H: u32 = 200;
const THUMB_MIN_H: u32 = 20;

/// Which buffer a list view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    All,
    Usable,
    Alerts,
}

impl ListKind {
    pub fn title(self) -> &'static str {
        match self {
            ListKind::All => "All Devices",
            ListKind::Usable => "Usable Devices",
            ListKind::Alerts => "Alert Devices",
        }
    }
}

/// Split an alert line into (name, details) for two-row rendering.
///
/// The name ends at the first `" ("`, or failing that the first `" ["`;
/// a line with neither is all name.
pub fn split_alert_line(line: &str) -> (&str, &str) {
    let cut = line.find(" (").or_else(|| line.find(" ["));
    match cut {
        Some(i) => (&line[..i], line[i + 1..].trim_start()),
        None => (line, ""),
    }
}

/// An open list with its own text snapshot and scroll position.
#[derive(Debug, Clone)]
pub struct ListView {
    kind: ListKind,
    text: String,
    lines: usize,
    scroll: usize,
    dirty: bool,
}

impl ListView {
    pub fn new(kind: ListKind, text: &str) -> Self {
        let mut view = Self {
            kind,
            text: String::new(),
            lines: 0,
            scroll: 0,
            dirty: true,
        };
        view.refresh(text);
        view
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    /// Replace the snapshot, keeping the scroll position where it still fits.
    pub fn refresh(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
        self.lines = line_count(text);
        self.scroll = self.scroll.min(self.max_scroll());
        self.dirty = true;
    }

    pub fn line_count(&self) -> usize {
        self.lines
    }

    /// Highest valid scroll offset.
    pub fn max_scroll(&self) -> usize {
        self.lines.saturating_sub(LIST_VISIBLE_LINES)
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Move to `pos` (clamped). Returns `true` if the position changed.
    pub fn scroll_to(&mut self, pos: usize) -> bool {
        let pos = pos.min(self.max_scroll());
        if pos == self.scroll {
            return false;
        }
        self.scroll = pos;
        self.dirty = true;
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Lines currently in the window.
    pub fn visible(&self) -> impl Iterator<Item = &str> {
        self.text.lines().skip(self.scroll).take(LIST_VISIBLE_LINES)
    }

    /// Scroll bar track.
    pub fn scrollbar(&self) -> Rectangle {
        Rectangle::new(
            Point::new(SCREEN_WIDTH as i32 - SCROLLBAR_W as i32, LIST_TOP),
            Size::new(SCROLLBAR_W, SCROLLBAR_H),
        )
    }

    /// Scroll bar thumb, sized by the number of scroll positions.
    pub fn thumb(&self) -> Rectangle {
        let max = self.max_scroll() as u32;
        let h = (SCROLLBAR_H / (max + 1)).max(THUMB_MIN_H);
        let y = LIST_TOP + (self.scroll as u32 * (SCROLLBAR_H - h) / max.max(1)) as i32;
        let track = self.scrollbar();
        Rectangle::new(
            Point::new(track.top_left.x + 2, y),
            Size::new(SCROLLBAR_W - 4, h),
        )
    }

    /// Repaint if anything changed since the last successful draw.
    pub fn draw<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        if !self.dirty {
            return Ok(());
        }

        let alerts = self.kind == ListKind::Alerts;
        let title = Point::new(SCREEN_WIDTH as i32 / 2, 15);
        let accent = if alerts {
            display.clear(RED)?;
            text_centered(display, self.kind.title(), title, &FONT_10X20, WHITE, Some(RED))?;
            WHITE
        } else {
            draw_gradient(display)?;
            text_centered(display, self.kind.title(), title, &FONT_10X20, BT_BLUE, None)?;
            BT_LIGHT_BLUE
        };

        let mut y = LIST_TOP;
        for line in self.visible() {
            if alerts {
                let (name, details) = split_alert_line(line);
                text_at(display, name, Point::new(LIST_TEXT_X, y), &FONT_9X15, WHITE)?;
                text_at(display, details, Point::new(LIST_TEXT_X, y + 15), &FONT_6X10, YELLOW)?;
            } else {
                text_at(display, line, Point::new(LIST_TEXT_X, y), &FONT_6X10, WHITE)?;
            }
            y += LIST_LINE_HEIGHT;
            if y > SCREEN_HEIGHT as i32 - LIST_LINE_HEIGHT / 2 {
                break;
            }
        }

        self.scrollbar()
            .into_styled(PrimitiveStyle::with_stroke(accent, 1))
            .draw(display)?;
        self.thumb()
            .into_styled(PrimitiveStyle::with_fill(accent))
            .draw(display)?;

        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec::Vec;

    use crate::ui::tests::FrameBuffer;
    use crate::ui::BLACK;

    fn lines(n: usize) -> String {
        (0..n).map(|i| format!("Device {}\n", i)).collect()
    }

    #[test]
    fn titles() {
        assert_eq!(ListKind::All.title(), "All Devices");
        assert_eq!(ListKind::Usable.title(), "Usable Devices");
        assert_eq!(ListKind::Alerts.title(), "Alert Devices");
    }

    #[test]
    fn split_prefers_vendor_paren() {
        assert_eq!(
            split_alert_line("Pixel 7 (Google) [F8:0F:F9:00:00:01] RSSI: -50"),
            ("Pixel 7", "(Google) [F8:0F:F9:00:00:01] RSSI: -50")
        );
    }

    #[test]
    fn split_falls_back_to_bracket() {
        assert_eq!(
            split_alert_line("Apple [AC:BC:32:00:00:02] RSSI: -61"),
            ("Apple", "[AC:BC:32:00:00:02] RSSI: -61")
        );
    }

    #[test]
    fn split_without_markers() {
        assert_eq!(split_alert_line("lonely"), ("lonely", ""));
        assert_eq!(split_alert_line(""), ("", ""));
    }

    #[test]
    fn max_scroll_from_line_count() {
        assert_eq!(ListView::new(ListKind::All, "").max_scroll(), 0);
        assert_eq!(ListView::new(ListKind::All, &lines(8)).max_scroll(), 0);
        assert_eq!(ListView::new(ListKind::All, &lines(13)).max_scroll(), 5);
    }

    #[test]
    fn scroll_clamps_and_marks_dirty() {
        let mut fb = FrameBuffer::new();
        let mut view = ListView::new(ListKind::Usable, &lines(20));
        view.draw(&mut fb).unwrap();
        assert!(!view.is_dirty());

        assert!(view.scroll_to(99));
        assert_eq!(view.scroll(), 12);
        assert!(view.is_dirty());
        assert!(!view.scroll_to(12));

        let shown: Vec<&str> = view.visible().collect();
        assert_eq!(shown.len(), LIST_VISIBLE_LINES);
        assert_eq!(shown[0], "Device 12");
        assert_eq!(shown[7], "Device 19");
    }

    #[test]
    fn refresh_keeps_scroll_within_new_range() {
        let mut view = ListView::new(ListKind::Alerts, &lines(20));
        view.scroll_to(10);
        view.refresh(&lines(25));
        assert_eq!(view.scroll(), 10);
        view.refresh(&lines(12));
        assert_eq!(view.scroll(), 4);
        view.refresh("");
        assert_eq!(view.scroll(), 0);
    }

    #[test]
    fn thumb_geometry() {
        let view = ListView::new(ListKind::All, &lines(3));
        assert_eq!(view.thumb().size.height, 200);
        assert_eq!(view.thumb().top_left, Point::new(312, 40));

        let mut view = ListView::new(ListKind::All, &lines(100));
        assert_eq!(view.thumb().size.height, 20);
        view.scroll_to(view.max_scroll());
        assert_eq!(view.thumb().top_left.y, 40 + 180);
    }

    #[test]
    fn alert_list_paints_red() {
        let mut fb = FrameBuffer::new();
        let mut view = ListView::new(ListKind::Alerts, "Pixel (Google) [F8:0F:F9:00:00:01] RSSI: -50\n");
        view.draw(&mut fb).unwrap();
        assert_eq!(fb.pixel(150, 230), RED);
        assert!(fb.count_in(Rectangle::new(Point::new(13, 55), Size::new(200, 10)), YELLOW) > 0);
        assert_eq!(fb.count(BLACK), 0);
    }

    #[test]
    fn clean_view_does_not_repaint() {
        let mut fb = FrameBuffer::new();
        let mut view = ListView::new(ListKind::All, &lines(2));
        view.draw(&mut fb).unwrap();
        let calls = fb.draw_calls;
        view.draw(&mut fb).unwrap();
        assert_eq!(fb.draw_calls, calls);
    }

    #[test]
    fn failed_draw_stays_dirty() {
        let mut fb = FrameBuffer::new();
        fb.fail = true;
        let mut view = ListView::new(ListKind::All, &lines(2));
        assert!(view.draw(&mut fb).is_err());
        assert!(view.is_dirty());
    }
}
