use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Painter, Shape},
        Block, Paragraph, Widget,
    },
};
use unicode_width::UnicodeWidthStr;

use crate::{
    config::Rgb,
    geometry::{BoxRect, DOTS_PER_CELL_X, DOTS_PER_CELL_Y},
    motion::CircleState,
    session::{FrameView, Session},
    timer::format_clock,
};

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Rgb(rgb.r, rgb.g, rgb.b)
    }
}

/// Screen pixels have y growing downward; the canvas grows upward.
#[derive(Debug, Clone, Copy)]
struct PixelGrid {
    width: f64,
    height: f64,
}

impl PixelGrid {
    fn for_area(area: Rect) -> Self {
        Self {
            width: f64::from(area.width) * f64::from(DOTS_PER_CELL_X),
            height: f64::from(area.height) * f64::from(DOTS_PER_CELL_Y),
        }
    }

    fn paint(&self, painter: &mut Painter, x: i64, y: i64, color: Color) {
        let canvas_y = self.height - 1.0 - y as f64;
        if let Some((px, py)) = painter.get_point(x as f64, canvas_y) {
            painter.paint(px, py, color);
        }
    }
}

/// Filled circle in screen pixels
struct Disc {
    grid: PixelGrid,
    circle: CircleState,
    color: Color,
}

impl Shape for Disc {
    fn draw(&self, painter: &mut Painter) {
        let CircleState { x: cx, y: cy, radius } = self.circle;
        // only the part of the bounding square that lands on the grid
        let reach = radius.ceil() as i64;
        let (x0, x1) = clip_span(cx, reach, self.grid.width as i64);
        let (y0, y1) = clip_span(cy, reach, self.grid.height as i64);
        let r2 = radius * radius;

        for y in y0..y1 {
            let dy = (y - cy) as f64;
            for x in x0..x1 {
                let dx = (x - cx) as f64;
                if dx * dx + dy * dy <= r2 {
                    self.grid.paint(painter, x, y, self.color);
                }
            }
        }
    }
}

/// Half-open range of `center ± reach` clipped to `0..len`
fn clip_span(center: i64, reach: i64, len: i64) -> (i64, i64) {
    let lo = center.saturating_sub(reach).max(0);
    let hi = center.saturating_add(reach).saturating_add(1).min(len);
    (lo, hi.max(lo))
}

/// Box outline with the stroke drawn inward from the rectangle edge.
/// Zero thickness still draws a single pixel line.
struct Border {
    grid: PixelGrid,
    rect: BoxRect,
    thickness: i64,
    color: Color,
}

impl Border {
    fn fill(&self, painter: &mut Painter, x0: i64, y0: i64, x1: i64, y1: i64) {
        for y in y0..y1 {
            for x in x0..x1 {
                self.grid.paint(painter, x, y, self.color);
            }
        }
    }
}

impl Shape for Border {
    fn draw(&self, painter: &mut Painter) {
        let BoxRect {
            x,
            y,
            width,
            height,
        } = self.rect;
        let t = self.thickness.max(1).min(width.min(height));
        let (right, bottom) = (x + width, y + height);

        self.fill(painter, x, y, right, y + t);
        self.fill(painter, x, bottom - t, right, bottom);
        self.fill(painter, x, y + t, x + t, bottom - t);
        self.fill(painter, right - t, y + t, right, bottom - t);
    }
}

impl Widget for &Session {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let config = self.config();
        let background = Color::from(config.background_color);

        match *self.view() {
            FrameView::Breathing {
                rect,
                circle,
                leg_seconds_left,
                countdown_secs_left,
                ..
            } => {
                let grid = PixelGrid::for_area(area);
                let border = Border {
                    grid,
                    rect,
                    thickness: i64::from(config.box_thickness),
                    color: config.box_color.into(),
                };
                let disc = Disc {
                    grid,
                    circle,
                    color: config.circle_color.into(),
                };
                let label = config.circle_text.color(config.box_color).map(|rgb| {
                    let text = leg_seconds_left.to_string();
                    // one cell is two dots wide; shift left by half the text
                    let x = (circle.x - text.width() as i64).max(0) as f64;
                    let y = grid.height - 1.0 - circle.y as f64;
                    (x, y, Span::styled(text, Style::default().fg(rgb.into())))
                });

                Canvas::default()
                    .marker(Marker::Braille)
                    .background_color(background)
                    .x_bounds([0.0, grid.width - 1.0])
                    .y_bounds([0.0, grid.height - 1.0])
                    .paint(|ctx| {
                        ctx.draw(&border);
                        ctx.layer();
                        ctx.draw(&disc);
                        if let Some((x, y, span)) = &label {
                            ctx.print(*x, *y, Line::from(span.clone()));
                        }
                    })
                    .render(area, buf);

                if let Some(secs) = countdown_secs_left {
                    let timer_area = Rect { height: 1, ..area };
                    Paragraph::new(Span::styled(
                        format_clock(secs),
                        Style::default()
                            .fg(config.countdown_color.into())
                            .add_modifier(Modifier::BOLD),
                    ))
                    .alignment(Alignment::Center)
                    .render(timer_area, buf);
                }
            }
            FrameView::Complete => {
                Block::default()
                    .style(Style::default().bg(background))
                    .render(area, buf);

                let text_style = Style::default().fg(config.countdown_color.into());
                let lines = vec![
                    Line::from(Span::styled(
                        "Session complete",
                        text_style.add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(Span::styled("(r)estart / (q)uit", text_style)),
                ];
                let height = (lines.len() as u16).min(area.height);
                let message_area = Rect {
                    y: area.y + (area.height - height) / 2,
                    height,
                    ..area
                };
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .render(message_area, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, TextMode};
    use crate::geometry::Size;
    use ratatui::{backend::TestBackend, Terminal};
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    fn draw(session: &Session, width: u16, height: u16) -> Buffer {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| f.render_widget(session, f.area()))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn content(buffer: &Buffer) -> String {
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    fn session(config: Config, cols: u16, rows: u16) -> Session {
        Session::new(Rc::new(config), Size::from_cells(cols, rows))
    }

    #[test]
    fn rgb_to_color() {
        assert_eq!(Color::from(Rgb::new(1, 2, 3)), Color::Rgb(1, 2, 3));
    }

    #[test]
    fn breathing_frame_draws_braille() {
        let s = session(Config::default(), 40, 12);
        let buffer = draw(&s, 40, 12);
        let text = content(&buffer);
        assert!(
            text.chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)),
            "expected braille dots in {text:?}"
        );
    }

    #[test]
    fn background_fills_area() {
        let s = session(Config::default(), 20, 6);
        let buffer = draw(&s, 20, 6);
        assert_eq!(buffer[(0, 0)].bg, Color::Rgb(255, 255, 255));
        assert_eq!(buffer[(19, 5)].bg, Color::Rgb(255, 255, 255));
    }

    #[test]
    fn countdown_renders_top_centered_clock() {
        let cfg = Config {
            countdown_secs: Some(90),
            ..Config::default()
        };
        let s = session(cfg, 40, 12);
        let buffer = draw(&s, 40, 12);
        let top_row: String = (0..40).map(|x| buffer[(x, 0)].symbol()).collect();
        assert!(top_row.contains("01:30"), "top row was {top_row:?}");
    }

    #[test]
    fn circle_text_shows_leg_seconds() {
        let cfg = Config {
            circle_text: TextMode::CustomColor(Rgb::new(0, 0, 255)),
            leg_durations: crate::config::LegDurations::new([7, 2, 2, 2]).unwrap(),
            ..Config::default()
        };
        let s = session(cfg, 60, 20);
        let buffer = draw(&s, 60, 20);
        let cell = buffer
            .content
            .iter()
            .find(|c| c.symbol() == "7")
            .expect("leg seconds printed");
        assert_eq!(cell.fg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn no_circle_text_when_off() {
        let cfg = Config {
            leg_durations: crate::config::LegDurations::new([7, 2, 2, 2]).unwrap(),
            ..Config::default()
        };
        let s = session(cfg, 60, 20);
        let buffer = draw(&s, 60, 20);
        assert!(!content(&buffer).contains('7'));
    }

    #[test]
    fn complete_view_shows_message() {
        let cfg = Config {
            countdown_secs: Some(1),
            ..Config::default()
        };
        let mut s = session(cfg, 40, 12);
        for _ in 0..60 {
            s.advance(&[]);
        }
        let buffer = draw(&s, 40, 12);
        let text = content(&buffer);
        assert!(text.contains("Session complete"), "{text:?}");
        assert!(text.contains("(r)estart"));
    }

    #[test]
    fn pixel_grid_does_not_overflow_on_huge_areas() {
        let grid = PixelGrid::for_area(Rect {
            x: 0,
            y: 0,
            width: 40_000,
            height: 20_000,
        });
        assert_eq!(grid.width, 80_000.0);
        assert_eq!(grid.height, 80_000.0);
    }

    #[test]
    fn clip_span_stays_on_grid() {
        assert_eq!(clip_span(10, 3, 40), (7, 14));
        assert_eq!(clip_span(1, 3, 40), (0, 5));
        assert_eq!(clip_span(38, 3, 40), (35, 40));
        assert_eq!(clip_span(5, i64::MAX, 40), (0, 40));
    }

    #[test]
    fn huge_radius_fills_the_area() {
        let cfg = Config::parse("circle_start_radius=1e10\ncircle_end_radius=1e10").unwrap();
        let s = session(cfg, 20, 6);
        let buffer = draw(&s, 20, 6);
        // every dot of every cell is lit
        assert!(buffer.content.iter().all(|c| c.symbol() == "\u{28FF}"));
        assert_eq!(buffer[(10, 3)].fg, Color::Rgb(255, 0, 0));
    }

    #[test]
    fn large_radius_renders_within_a_frame() {
        let cfg = Config {
            circle_start_radius: 1e6,
            circle_end_radius: 1e6,
            ..Config::default()
        };
        let s = session(cfg, 20, 6);
        let started = Instant::now();
        draw(&s, 20, 6);
        assert!(
            started.elapsed() < Duration::from_millis(250),
            "took {:?}",
            started.elapsed()
        );
    }

    #[test]
    fn tiny_area_does_not_panic() {
        let s = session(Config::default(), 1, 1);
        draw(&s, 1, 1);
    }
}
