use crate::app::App;
use crate::braille::{BrailleCanvas, BLANK};
use crate::map::{pixel_to_cell, MapLayers};
use crate::pins::PinStyle;
use crate::popup::{PinRef, PopupSource, PopupSpec};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
    Frame,
};

const POPUP_MAX_WIDTH: u16 = 48;
const POPUP_MAX_HEIGHT: u16 = 16;
const CURSOR_MARK: char = '▏';

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

/// A pin reduced to what the map widget draws
struct PinMark {
    col: u16,
    row: u16,
    glyph: char,
    color: Color,
    selected: bool,
}

fn pin_color(style: PinStyle) -> Color {
    match style {
        PinStyle::Blue => Color::LightBlue,
        PinStyle::Violet => Color::Magenta,
        PinStyle::Black => Color::Gray,
        PinStyle::Green => Color::Green,
        PinStyle::SeaMonster => Color::LightGreen,
    }
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Editable Popups ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut viewport = app.viewport.clone();
    viewport.resize(inner.width as usize * 2, inner.height as usize * 4);

    let selected_pos = app.selected.and_then(|pin| app.board.coords(pin));
    let layers = app
        .map_renderer
        .render(inner.width as usize, inner.height as usize, &viewport, selected_pos);

    let pins = app
        .board
        .pins()
        .into_iter()
        .filter_map(|pin| {
            let pos = app.board.coords(pin)?;
            let style = app.board.style(pin)?;
            let (px, py) = viewport.project(pos.lng, pos.lat);
            let (col, row) = pixel_to_cell(px, py)?;
            (col < inner.width && row < inner.height).then_some(PinMark {
                col,
                row,
                glyph: style.glyph(),
                color: pin_color(style),
                selected: app.selected == Some(pin),
            })
        })
        .collect();

    frame.render_widget(MapWidget { layers, pins }, inner);

    // Open popups, the active one last so it sits on top
    let active = app.popups.active();
    let mut open: Vec<PinRef> = app
        .board
        .pins()
        .into_iter()
        .filter(|&pin| app.board.popup(pin).is_some_and(|s| s.open) && Some(pin) != active)
        .collect();
    open.extend(active.filter(|&pin| app.board.popup(pin).is_some_and(|s| s.open)));

    for pin in open {
        let (Some(spec), Some(pos)) = (app.board.popup(pin), app.board.coords(pin)) else {
            continue;
        };
        let (px, py) = viewport.project(pos.lng, pos.lat);
        if !viewport.is_visible(px, py) {
            continue;
        }
        let anchor = (
            inner.x as i32 + px / 2,
            inner.y as i32 + py / 4,
        );
        let editing = app.popups.editing().filter(|s| s.pin == pin).map(|s| s.buffer.with_cursor(CURSOR_MARK));
        let popup = PopupWidget {
            spec,
            editing,
            active: Some(pin) == active,
        };
        let rect = popup_rect(&popup, anchor, inner);
        frame.render_widget(Clear, rect);
        frame.render_widget(popup, rect);
    }
}

/// Braille layers with pin glyphs on top
struct MapWidget {
    layers: MapLayers,
    pins: Vec<PinMark>,
}

impl MapWidget {
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for row in 0..canvas.height().min(area.height as usize) {
            for col in 0..canvas.width().min(area.width as usize) {
                match canvas.char_at(col, row) {
                    Some(ch) if ch != BLANK => {
                        buf[(area.x + col as u16, area.y + row as u16)].set_char(ch).set_fg(color);
                    }
                    _ => {}
                }
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Self::render_layer(&self.layers.coastlines, Color::Cyan, area, buf);
        Self::render_layer(&self.layers.borders, Color::DarkGray, area, buf);
        Self::render_layer(&self.layers.halo, Color::Yellow, area, buf);

        for pin in &self.pins {
            let style = if pin.selected {
                Style::default().fg(pin.color).add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(pin.color).add_modifier(Modifier::BOLD)
            };
            buf[(area.x + pin.col, area.y + pin.row)].set_char(pin.glyph).set_style(style);
        }
    }
}

/// One popup box: content, or the edit buffer, plus its action hints
struct PopupWidget<'a> {
    spec: PopupSpec<'a>,
    /// Edit buffer with the cursor spliced in
    editing: Option<String>,
    active: bool,
}

impl PopupWidget<'_> {
    fn body(&self) -> &str {
        self.editing.as_deref().unwrap_or(self.spec.content)
    }

    fn footer(&self) -> Line<'static> {
        let key = Style::default().fg(Color::Yellow);
        let hint = Style::default().fg(Color::DarkGray);
        if self.editing.is_some() {
            return Line::from(vec![
                Span::styled("Ctrl-S", key),
                Span::styled(" save  ", hint),
                Span::styled("Esc", key),
                Span::styled(" cancel", hint),
            ]);
        }

        let mut spans = Vec::new();
        if self.spec.flags.editable {
            spans.push(Span::styled("e", key));
            spans.push(Span::styled(" edit  ", hint));
        }
        if self.spec.flags.removable {
            spans.push(Span::styled("x", key));
            spans.push(Span::styled(format!(" {}", self.spec.remove_label()), hint));
        }
        Line::from(spans)
    }

    /// Rows the wrapped body needs at `width` columns
    fn body_rows(&self, width: u16) -> u16 {
        let width = width.max(1) as usize;
        self.body()
            .split('\n')
            .map(|line| line.chars().count().max(1).div_ceil(width))
            .sum::<usize>()
            .min(u16::MAX as usize) as u16
    }
}

impl Widget for PopupWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.editing.is_some() {
            Color::Yellow
        } else if self.active {
            Color::White
        } else {
            Color::DarkGray
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title_bottom(self.footer());

        let mut text = Text::default();
        for line in self.body().split('\n') {
            text.push_line(Line::raw(line.to_string()));
        }

        Paragraph::new(text)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

/// Place a popup above its pin, below it if there is no room, clamped to the map
fn popup_rect(popup: &PopupWidget, anchor: (i32, i32), bounds: Rect) -> Rect {
    let width = POPUP_MAX_WIDTH.min(bounds.width);
    let max_height = POPUP_MAX_HEIGHT.min(bounds.height);
    let height = (popup.body_rows(width.saturating_sub(2)) + 2).min(max_height);

    let left = bounds.x as i32;
    let right = (bounds.x + bounds.width) as i32 - width as i32;
    let x = (anchor.0 - width as i32 / 2).clamp(left, right.max(left));

    let above = anchor.1 - height as i32;
    let y = if above >= bounds.y as i32 {
        above
    } else {
        anchor.1 + 1
    };
    let bottom = (bounds.y + bounds.height) as i32 - height as i32;
    let y = y.clamp(bounds.y as i32, bottom.max(bounds.y as i32));

    Rect::new(x as u16, y as u16, width, height)
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);

    let help = if app.is_editing() {
        " | editing: type to change text, Ctrl-S save, Esc cancel"
    } else {
        " | m:marker Tab:select Enter:popup e:edit x:remove hjkl:pan +/-:zoom r:reset q:quit"
    };
    let borders_on = app.map_renderer.settings.show_borders;

    let status = Line::from(vec![
        Span::styled(" Zoom: ", dim),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" (", dim),
        Span::styled(app.lod_level(), Style::default().fg(Color::Magenta)),
        Span::styled(") ", dim),
        Span::styled(
            if borders_on { "[B]order " } else { "[b]order " },
            Style::default().fg(if borders_on { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled("| markers: ", dim),
        Span::styled(app.board.markers.len().to_string(), Style::default().fg(Color::LightBlue)),
        Span::styled(" | ", dim),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(help, dim),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::popup::PopupFlags;

    fn spec(content: &str) -> PopupSpec<'_> {
        PopupSpec {
            content,
            flags: PopupFlags {
                editable: true,
                removable: true,
            },
            open: true,
            auto_close: true,
            nametag: None,
        }
    }

    fn widget(content: &str) -> PopupWidget<'_> {
        PopupWidget {
            spec: spec(content),
            editing: None,
            active: true,
        }
    }

    #[test]
    fn test_body_rows_wraps_and_counts_blank_lines() {
        let w = widget("abcdef\n\nxy");
        assert_eq!(w.body_rows(4), 2 + 1 + 1);
    }

    #[test]
    fn test_popup_sits_above_pin() {
        let w = widget("short");
        let bounds = Rect::new(1, 1, 100, 40);
        let rect = popup_rect(&w, (50, 30), bounds);
        assert_eq!(rect.height, 3);
        assert_eq!(rect.y, 27);
        assert_eq!(rect.x, 26);
    }

    #[test]
    fn test_popup_flips_below_and_clamps() {
        let w = widget("short");
        let bounds = Rect::new(1, 1, 100, 40);
        let rect = popup_rect(&w, (99, 1), bounds);
        assert_eq!(rect.y, 2);
        assert_eq!(rect.x + rect.width, 101);
    }

    #[test]
    fn test_footer_uses_nametag() {
        let mut w = widget("x");
        w.spec.nametag = Some("Sea Monster");
        let text: String = w.footer().spans.iter().map(|s| &*s.content).collect();
        assert!(text.contains("Remove this Sea Monster"));
        assert!(text.contains("edit"));
    }
}
