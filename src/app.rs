use crate::config::Config;
use crate::map::{Lod, MapRenderer, Viewport};
use crate::pins::Board;
use crate::popup::{LineEditor, PinRef, PopupEvent, PopupEvents, PopupLayer};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Terminal cell to braille pixel, accounting for the 1-cell border
#[inline(always)]
fn cell_to_pixel(col: u16, row: u16) -> (i32, i32) {
    ((col.saturating_sub(1)) as i32 * 2, (row.saturating_sub(1)) as i32 * 4)
}

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub map_renderer: MapRenderer,
    /// Sample pins and the random marker list
    pub board: Board,
    pub popups: PopupLayer,
    /// Pin the keyboard acts on
    pub selected: Option<PinRef>,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Whether the current press turned into a drag
    dragged: bool,
    /// Center and zoom restored by `reset_view`
    home: (f64, f64, f64),
    rng: StdRng,
}

impl App {
    pub fn new(width: usize, height: usize, config: &Config) -> Self {
        Self::with_rng(width, height, config, StdRng::from_os_rng())
    }

    /// Build with a caller-supplied rng so marker placement is reproducible
    pub fn with_rng(width: usize, height: usize, config: &Config, rng: StdRng) -> Self {
        let (pixel_width, pixel_height) = Self::map_pixels(width, height);
        let mut app = Self {
            viewport: Viewport::new(config.center_lon, config.center_lat, config.zoom, pixel_width, pixel_height),
            map_renderer: MapRenderer::new(),
            board: Board::new(),
            popups: PopupLayer::new(),
            selected: None,
            should_quit: false,
            last_mouse: None,
            dragged: false,
            home: (config.center_lon, config.center_lat, config.zoom),
            rng,
        };

        // Pins that start open become the active popup, like a popup opened on load
        let initially_open: Vec<PinRef> = app
            .board
            .samples
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_open)
            .map(|(i, _)| PinRef::Sample(i))
            .collect();
        for pin in initially_open {
            let events = app.popups.open(&app.board, pin);
            app.deliver(events);
        }
        app
    }

    /// Braille gives 2x4 dots per cell; the border takes 2 columns and the
    /// border plus status bar take 3 rows
    fn map_pixels(width: usize, height: usize) -> (usize, usize) {
        (width.saturating_sub(2) * 2, height.saturating_sub(3) * 4)
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        let (w, h) = Self::map_pixels(width, height);
        self.viewport.resize(w, h);
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Zoom in towards a terminal cell
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_in_at(px, py);
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_out_at(px, py);
    }

    /// Back to the configured center and zoom. Pins stay.
    pub fn reset_view(&mut self) {
        let (lon, lat, zoom) = self.home;
        self.viewport = Viewport::new(lon, lat, zoom, self.viewport.width, self.viewport.height);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }

    pub fn lod_level(&self) -> &'static str {
        Lod::from_zoom(self.viewport.zoom).label()
    }

    pub fn mouse_down(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.dragged = false;
    }

    /// Pan by the mouse delta, more per cell when zoomed in
    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - col as i32;
            let dy = last_y as i32 - row as i32;
            if dx != 0 || dy != 0 {
                self.dragged = true;
            }
            let scale = if self.viewport.zoom < 2.0 {
                2
            } else if self.viewport.zoom < 4.0 {
                3
            } else {
                4
            };
            self.pan(dx * scale, dy * scale);
        }
        self.last_mouse = Some((col, row));
    }

    /// Release: a press that never dragged counts as a click
    pub fn mouse_up(&mut self, col: u16, row: u16) {
        let was_click = self.last_mouse.is_some() && !self.dragged;
        self.last_mouse = None;
        self.dragged = false;
        if was_click {
            self.click(col, row);
        }
    }

    /// Clicking a pin selects it and toggles its popup; clicking bare map
    /// closes the active popup
    pub fn click(&mut self, col: u16, row: u16) {
        if self.is_editing() {
            return;
        }
        let (map_col, map_row) = (col.saturating_sub(1), row.saturating_sub(1));
        match self.board.pin_at(&self.viewport, map_col, map_row) {
            Some(pin) => {
                self.selected = Some(pin);
                let events = self.popups.toggle(&self.board, pin);
                self.deliver(events);
            }
            None => self.close_popup(),
        }
    }

    /// Feed widget events to the handlers below
    fn deliver(&mut self, events: Vec<PopupEvent>) {
        for event in events {
            event.deliver(self);
        }
    }

    /// Drop a random marker somewhere in the visible area and select it
    pub fn place_random_marker(&mut self) -> PinRef {
        let bounds = self.viewport.bounds();
        let pin = self.board.place_random_marker(&bounds, &mut self.rng);
        self.selected = Some(pin);
        pin
    }

    /// Close the active popup, then remove random marker `index`
    pub fn remove_marker(&mut self, index: usize) {
        self.on_remove(PinRef::Random(index));
    }

    pub fn set_popup_content(&mut self, index: usize, content: String) {
        self.on_save_content(content, PinRef::Random(index));
    }

    /// Open or close a random marker's popup through the popup layer, so it
    /// becomes active and auto-closes the previous one like a click would
    pub fn set_open_state(&mut self, index: usize, open: bool) {
        let pin = PinRef::Random(index);
        let events = if open {
            self.popups.open(&self.board, pin)
        } else {
            self.popups.close(&self.board, pin)
        };
        self.deliver(events);
    }

    /// Map command: close whichever popup is active
    pub fn close_popup(&mut self) {
        let events = self.popups.close_active(&self.board);
        self.deliver(events);
    }

    pub fn select_next(&mut self) {
        self.step_selection(1);
    }

    pub fn select_prev(&mut self) {
        self.step_selection(-1);
    }

    fn step_selection(&mut self, step: isize) {
        let pins = self.board.pins();
        if pins.is_empty() {
            self.selected = None;
            return;
        }
        let len = pins.len() as isize;
        let next = match self.selected.and_then(|s| pins.iter().position(|&p| p == s)) {
            Some(pos) => (pos as isize + step).rem_euclid(len),
            None if step > 0 => 0,
            None => len - 1,
        };
        self.selected = Some(pins[next as usize]);
    }

    pub fn toggle_selected_popup(&mut self) {
        if let Some(pin) = self.selected {
            let events = self.popups.toggle(&self.board, pin);
            self.deliver(events);
        }
    }

    /// Start editing the selected popup; opens it first if needed
    pub fn edit_selected(&mut self) -> bool {
        let Some(pin) = self.selected else {
            return false;
        };
        let events = self.popups.open(&self.board, pin);
        self.deliver(events);
        self.popups.begin_edit(&self.board, pin)
    }

    pub fn remove_selected(&mut self) {
        if let Some(pin) = self.selected {
            let events = self.popups.request_remove(&self.board, pin);
            self.deliver(events);
        }
    }

    pub fn is_editing(&self) -> bool {
        self.popups.editing().is_some()
    }

    pub fn editor_mut(&mut self) -> Option<&mut LineEditor> {
        self.popups.editor_mut()
    }

    pub fn save_edit(&mut self) {
        let events = self.popups.save();
        self.deliver(events);
    }

    pub fn cancel_edit(&mut self) {
        self.popups.cancel_edit();
    }
}

impl PopupEvents for App {
    fn on_open(&mut self, pin: PinRef) {
        self.board.set_open(pin, true);
    }

    fn on_close(&mut self, pin: PinRef) {
        self.board.set_open(pin, false);
    }

    fn on_save_content(&mut self, content: String, pin: PinRef) {
        self.board.set_content(pin, content);
    }

    fn on_remove(&mut self, pin: PinRef) {
        self.close_popup();
        if self.board.remove(pin) {
            self.popups.pin_removed(pin);
            self.selected = self.selected.and_then(|s| s.after_removal(pin));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::popup::PopupSource;

    fn app() -> App {
        App::with_rng(102, 43, &Config::default(), StdRng::seed_from_u64(11))
    }

    fn is_open(app: &App, pin: PinRef) -> bool {
        app.board.popup(pin).is_some_and(|s| s.open)
    }

    #[test]
    fn test_welcome_popup_open_on_start() {
        let app = app();
        assert!(is_open(&app, PinRef::Sample(0)));
        assert_eq!(app.popups.active(), Some(PinRef::Sample(0)));
    }

    #[test]
    fn test_place_inside_viewport() {
        let mut app = app();
        let bounds = app.viewport.bounds();
        for _ in 0..20 {
            app.place_random_marker();
        }
        assert_eq!(app.board.markers.len(), 20);
        assert!(app.board.markers.markers().iter().all(|m| bounds.contains(m.coords)));
        assert_eq!(app.selected, Some(PinRef::Random(19)));
    }

    #[test]
    fn test_remove_closes_active_popup_first() {
        let mut app = app();
        app.place_random_marker();
        app.place_random_marker();
        app.selected = Some(PinRef::Random(1));
        app.toggle_selected_popup();
        assert!(is_open(&app, PinRef::Random(1)));
        app.remove_marker(0);
        assert_eq!(app.board.markers.len(), 1);
        // Old index 1 shifted to 0 and its popup was closed by the removal
        assert!(!is_open(&app, PinRef::Random(0)));
        assert_eq!(app.popups.active(), None);
        assert_eq!(app.selected, Some(PinRef::Random(0)));
    }

    #[test]
    fn test_remove_stale_index_is_noop() {
        let mut app = app();
        app.place_random_marker();
        app.remove_marker(4);
        assert_eq!(app.board.markers.len(), 1);
    }

    #[test]
    fn test_opening_random_keeps_sticky_welcome() {
        let mut app = app();
        app.place_random_marker();
        app.place_random_marker();
        app.selected = Some(PinRef::Random(0));
        app.toggle_selected_popup();
        app.selected = Some(PinRef::Random(1));
        app.toggle_selected_popup();
        assert!(is_open(&app, PinRef::Sample(0)));
        assert!(!is_open(&app, PinRef::Random(0)));
        assert!(is_open(&app, PinRef::Random(1)));
    }

    #[test]
    fn test_edit_and_save_random_marker() {
        let mut app = app();
        app.place_random_marker();
        assert!(app.edit_selected());
        assert!(app.is_editing());
        let editor = app.editor_mut().unwrap();
        editor.newline();
        editor.insert('✓');
        app.save_edit();
        assert!(!app.is_editing());
        let content = &app.board.markers.get(0).unwrap().popup_content;
        assert!(content.ends_with("\n✓"));
    }

    #[test]
    fn test_edit_refused_for_removable_only_pin() {
        let mut app = app();
        app.selected = Some(PinRef::Sample(1));
        assert!(!app.edit_selected());
        // The popup still opened
        assert!(is_open(&app, PinRef::Sample(1)));
    }

    #[test]
    fn test_remove_refused_for_editable_only_pin() {
        let mut app = app();
        app.selected = Some(PinRef::Sample(4));
        app.remove_selected();
        assert_eq!(app.board.samples.len(), 8);
        app.selected = Some(PinRef::Sample(1));
        app.remove_selected();
        assert_eq!(app.board.samples.len(), 7);
        assert_eq!(app.selected, None);
    }

    #[test]
    fn test_selection_cycles() {
        let mut app = app();
        app.select_prev();
        assert_eq!(app.selected, Some(PinRef::Sample(7)));
        app.select_next();
        assert_eq!(app.selected, Some(PinRef::Sample(0)));
        app.place_random_marker();
        app.select_next();
        assert_eq!(app.selected, Some(PinRef::Sample(0)));
    }

    #[test]
    fn test_click_on_pin_and_bare_map() {
        let mut app = app();
        app.place_random_marker();
        let pos = app.board.markers.get(0).unwrap().coords;
        let (px, py) = app.viewport.project(pos.lng, pos.lat);
        let (col, row) = ((px / 2) as u16 + 1, (py / 4) as u16 + 1);
        app.selected = None;
        app.mouse_down(col, row);
        app.mouse_up(col, row);
        assert_eq!(app.selected, Some(PinRef::Random(0)));
        assert!(is_open(&app, PinRef::Random(0)));
        assert_eq!(app.popups.active(), Some(PinRef::Random(0)));

        app.close_popup();
        assert!(!is_open(&app, PinRef::Random(0)));
    }

    #[test]
    fn test_drag_is_not_a_click() {
        let mut app = app();
        let before = app.viewport.center_lon;
        app.mouse_down(10, 10);
        app.handle_drag(5, 10);
        app.mouse_up(5, 10);
        assert!(app.viewport.center_lon > before);
        assert!(is_open(&app, PinRef::Sample(0)));
    }

    #[test]
    fn test_reset_view_keeps_markers() {
        let mut app = app();
        app.place_random_marker();
        app.pan(40, 10);
        app.zoom_in();
        app.reset_view();
        assert_eq!(app.viewport.zoom, Config::default().zoom);
        assert_eq!(app.board.markers.len(), 1);
    }

    #[test]
    fn test_set_open_state_through_app() {
        let mut app = app();
        app.place_random_marker();
        app.place_random_marker();
        app.set_open_state(0, true);
        assert!(is_open(&app, PinRef::Random(0)));
        assert!(!is_open(&app, PinRef::Random(1)));
        app.set_popup_content(1, "hi".into());
        assert_eq!(app.board.markers.get(1).unwrap().popup_content, "hi");
    }

    #[test]
    fn test_set_open_state_tracks_active_popup() {
        let mut app = app();
        for _ in 0..3 {
            app.place_random_marker();
        }
        app.set_open_state(0, true);
        assert_eq!(app.popups.active(), Some(PinRef::Random(0)));
        app.set_open_state(1, true);
        assert_eq!(app.popups.active(), Some(PinRef::Random(1)));
        assert!(!is_open(&app, PinRef::Random(0)));

        app.remove_marker(2);
        assert!(!is_open(&app, PinRef::Random(1)));
        assert!(is_open(&app, PinRef::Sample(0)));

        app.set_open_state(0, true);
        app.set_open_state(0, false);
        assert_eq!(app.popups.active(), None);
        assert!(!is_open(&app, PinRef::Random(0)));
        app.set_open_state(7, true);
        assert_eq!(app.popups.active(), None);
    }
}
