//! Popup widget: which popups are open, which one is active, and the edit
//! session. The widget never owns pin data. It reads a [`PopupSpec`] from a
//! [`PopupSource`] and reports what the user did as [`PopupEvent`]s, which the
//! owner feeds to its [`PopupEvents`] handlers.

mod editor;

pub use editor::LineEditor;

/// Identity of a pin as the popup widget sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinRef {
    /// Hard-coded demo pin
    Sample(usize),
    /// Entry in the random marker list
    Random(usize),
}

impl PinRef {
    /// Where this ref points once `removed` is gone from its list.
    /// `None` if it was the removed pin.
    pub fn after_removal(self, removed: PinRef) -> Option<PinRef> {
        match (self, removed) {
            (a, b) if a == b => None,
            (PinRef::Sample(i), PinRef::Sample(r)) if i > r => Some(PinRef::Sample(i - 1)),
            (PinRef::Random(i), PinRef::Random(r)) if i > r => Some(PinRef::Random(i - 1)),
            (other, _) => Some(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PopupFlags {
    pub editable: bool,
    pub removable: bool,
}

/// Everything the widget needs to draw and drive one popup
#[derive(Debug, Clone, PartialEq)]
pub struct PopupSpec<'a> {
    pub content: &'a str,
    pub flags: PopupFlags,
    pub open: bool,
    pub auto_close: bool,
    /// Name used in the remove button, "marker" when unset
    pub nametag: Option<&'a str>,
}

impl PopupSpec<'_> {
    pub fn remove_label(&self) -> String {
        format!("Remove this {}", self.nametag.unwrap_or("marker"))
    }
}

/// Read access to the popups the widget can show
pub trait PopupSource {
    fn popup(&self, pin: PinRef) -> Option<PopupSpec<'_>>;
}

/// Handlers the popup owner wires to its state
pub trait PopupEvents {
    fn on_open(&mut self, pin: PinRef);
    fn on_close(&mut self, pin: PinRef);
    fn on_save_content(&mut self, content: String, pin: PinRef);
    /// The user pressed the remove button
    fn on_remove(&mut self, pin: PinRef);
}

#[derive(Debug, Clone, PartialEq)]
pub enum PopupEvent {
    Opened(PinRef),
    Closed(PinRef),
    Saved { pin: PinRef, content: String },
    RemoveRequested(PinRef),
}

impl PopupEvent {
    /// Hand this event to the matching handler
    pub fn deliver<H: PopupEvents + ?Sized>(self, handler: &mut H) {
        match self {
            PopupEvent::Opened(pin) => handler.on_open(pin),
            PopupEvent::Closed(pin) => handler.on_close(pin),
            PopupEvent::Saved { pin, content } => handler.on_save_content(content, pin),
            PopupEvent::RemoveRequested(pin) => handler.on_remove(pin),
        }
    }
}

/// An in-progress edit of one popup
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub pin: PinRef,
    pub buffer: LineEditor,
}

/// Popup open/close/edit state machine
#[derive(Debug, Default)]
pub struct PopupLayer {
    active: Option<PinRef>,
    editing: Option<EditSession>,
}

impl PopupLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently opened popup
    pub fn active(&self) -> Option<PinRef> {
        self.active
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut LineEditor> {
        self.editing.as_mut().map(|s| &mut s.buffer)
    }

    /// Open `pin`. The previously active popup closes first if it auto-closes.
    pub fn open<S: PopupSource + ?Sized>(&mut self, source: &S, pin: PinRef) -> Vec<PopupEvent> {
        let Some(spec) = source.popup(pin) else {
            return Vec::new();
        };

        let mut events = Vec::new();
        if let Some(prev) = self.active.filter(|&p| p != pin) {
            if source.popup(prev).is_some_and(|s| s.open && s.auto_close) {
                events.extend(self.close(source, prev));
            }
        }

        self.active = Some(pin);
        if !spec.open {
            events.push(PopupEvent::Opened(pin));
        }
        events
    }

    /// Close `pin` if it is open. Ends its edit session without saving.
    pub fn close<S: PopupSource + ?Sized>(&mut self, source: &S, pin: PinRef) -> Vec<PopupEvent> {
        if self.active == Some(pin) {
            self.active = None;
        }
        if self.editing.as_ref().is_some_and(|s| s.pin == pin) {
            self.editing = None;
        }

        match source.popup(pin) {
            Some(spec) if spec.open => vec![PopupEvent::Closed(pin)],
            _ => Vec::new(),
        }
    }

    pub fn toggle<S: PopupSource + ?Sized>(&mut self, source: &S, pin: PinRef) -> Vec<PopupEvent> {
        match source.popup(pin) {
            Some(spec) if spec.open => self.close(source, pin),
            Some(_) => self.open(source, pin),
            None => Vec::new(),
        }
    }

    /// Close whichever popup is active
    pub fn close_active<S: PopupSource + ?Sized>(&mut self, source: &S) -> Vec<PopupEvent> {
        match self.active {
            Some(pin) => self.close(source, pin),
            None => Vec::new(),
        }
    }

    /// Enter edit mode on an open, editable popup. Returns whether editing started.
    pub fn begin_edit<S: PopupSource + ?Sized>(&mut self, source: &S, pin: PinRef) -> bool {
        match source.popup(pin) {
            Some(spec) if spec.open && spec.flags.editable => {
                self.editing = Some(EditSession {
                    pin,
                    buffer: LineEditor::new(spec.content),
                });
                self.active = Some(pin);
                true
            }
            _ => false,
        }
    }

    /// Finish editing and emit the new content
    pub fn save(&mut self) -> Vec<PopupEvent> {
        match self.editing.take() {
            Some(EditSession { pin, buffer }) => vec![PopupEvent::Saved {
                pin,
                content: buffer.into_text(),
            }],
            None => Vec::new(),
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Press the remove button of a removable popup
    pub fn request_remove<S: PopupSource + ?Sized>(&mut self, source: &S, pin: PinRef) -> Vec<PopupEvent> {
        match source.popup(pin) {
            Some(spec) if spec.flags.removable => vec![PopupEvent::RemoveRequested(pin)],
            _ => Vec::new(),
        }
    }

    /// Shift stored refs after `removed` left its list
    pub fn pin_removed(&mut self, removed: PinRef) {
        self.active = self.active.and_then(|p| p.after_removal(removed));
        self.editing = self.editing.take().and_then(|mut s| {
            s.pin = s.pin.after_removal(removed)?;
            Some(s)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Fake {
        pins: HashMap<PinRef, (String, PopupFlags, bool, bool)>,
    }

    impl Fake {
        fn new() -> Self {
            Self { pins: HashMap::new() }
        }

        fn with(mut self, pin: PinRef, editable: bool, removable: bool, open: bool, auto_close: bool) -> Self {
            self.pins.insert(
                pin,
                (format!("{pin:?}"), PopupFlags { editable, removable }, open, auto_close),
            );
            self
        }

        fn apply(&mut self, events: Vec<PopupEvent>) {
            for e in events {
                e.deliver(self);
            }
        }
    }

    impl PopupSource for Fake {
        fn popup(&self, pin: PinRef) -> Option<PopupSpec<'_>> {
            self.pins.get(&pin).map(|(content, flags, open, auto_close)| PopupSpec {
                content,
                flags: *flags,
                open: *open,
                auto_close: *auto_close,
                nametag: None,
            })
        }
    }

    impl PopupEvents for Fake {
        fn on_open(&mut self, pin: PinRef) {
            self.pins.get_mut(&pin).unwrap().2 = true;
        }
        fn on_close(&mut self, pin: PinRef) {
            self.pins.get_mut(&pin).unwrap().2 = false;
        }
        fn on_save_content(&mut self, content: String, pin: PinRef) {
            self.pins.get_mut(&pin).unwrap().0 = content;
        }
        fn on_remove(&mut self, pin: PinRef) {
            self.pins.remove(&pin);
        }
    }

    const A: PinRef = PinRef::Random(0);
    const B: PinRef = PinRef::Random(1);
    const S: PinRef = PinRef::Sample(0);

    fn is_open(f: &Fake, pin: PinRef) -> bool {
        f.popup(pin).unwrap().open
    }

    #[test]
    fn test_open_closes_previous_auto_close_popup() {
        let mut f = Fake::new().with(A, true, true, false, true).with(B, true, true, false, true);
        let mut layer = PopupLayer::new();
        let ev = layer.open(&f, A);
        f.apply(ev);
        let ev = layer.open(&f, B);
        assert_eq!(ev, vec![PopupEvent::Closed(A), PopupEvent::Opened(B)]);
        f.apply(ev);
        assert!(!is_open(&f, A));
        assert!(is_open(&f, B));
        assert_eq!(layer.active(), Some(B));
    }

    #[test]
    fn test_sticky_popup_survives_other_opens() {
        let mut f = Fake::new().with(S, true, true, true, false).with(A, true, true, false, true);
        let mut layer = PopupLayer::new();
        let ev = layer.open(&f, S);
        assert!(ev.is_empty());
        let ev = layer.open(&f, A);
        f.apply(ev);
        assert!(is_open(&f, S));
        assert!(is_open(&f, A));
    }

    #[test]
    fn test_close_active() {
        let mut f = Fake::new().with(A, false, true, false, true);
        let mut layer = PopupLayer::new();
        let ev = layer.open(&f, A);
        f.apply(ev);
        let ev = layer.close_active(&f);
        f.apply(ev);
        assert!(!is_open(&f, A));
        assert_eq!(layer.active(), None);
        assert!(layer.close_active(&f).is_empty());
    }

    #[test]
    fn test_edit_requires_editable_and_open() {
        let mut f = Fake::new().with(A, false, true, false, true).with(B, true, false, false, true);
        let mut layer = PopupLayer::new();
        assert!(!layer.begin_edit(&f, B));
        let ev = layer.toggle(&f, B);
        f.apply(ev);
        assert!(layer.begin_edit(&f, B));
        let ev = layer.toggle(&f, A);
        f.apply(ev);
        assert!(!layer.begin_edit(&f, A));
    }

    #[test]
    fn test_save_emits_edited_text() {
        let mut f = Fake::new().with(A, true, false, false, true);
        let mut layer = PopupLayer::new();
        let ev = layer.open(&f, A);
        f.apply(ev);
        assert!(layer.begin_edit(&f, A));
        layer.editor_mut().unwrap().insert('!');
        let ev = layer.save();
        f.apply(ev);
        assert_eq!(f.popup(A).unwrap().content, "Random(0)!");
        assert!(layer.editing().is_none());
        assert!(layer.save().is_empty());
    }

    #[test]
    fn test_cancel_discards() {
        let mut f = Fake::new().with(A, true, false, false, true);
        let mut layer = PopupLayer::new();
        let ev = layer.open(&f, A);
        f.apply(ev);
        layer.begin_edit(&f, A);
        layer.editor_mut().unwrap().insert('x');
        layer.cancel_edit();
        assert_eq!(f.popup(A).unwrap().content, "Random(0)");
    }

    #[test]
    fn test_closing_ends_edit_session() {
        let mut f = Fake::new().with(A, true, false, false, true);
        let mut layer = PopupLayer::new();
        let ev = layer.open(&f, A);
        f.apply(ev);
        layer.begin_edit(&f, A);
        let ev = layer.close(&f, A);
        f.apply(ev);
        assert!(layer.editing().is_none());
    }

    #[test]
    fn test_remove_only_when_removable() {
        let f = Fake::new().with(A, true, false, true, true).with(B, false, true, true, true);
        let mut layer = PopupLayer::new();
        assert!(layer.request_remove(&f, A).is_empty());
        assert_eq!(layer.request_remove(&f, B), vec![PopupEvent::RemoveRequested(B)]);
    }

    #[test]
    fn test_pin_removed_reindexes() {
        let mut f = Fake::new().with(PinRef::Random(2), true, true, false, true);
        let mut layer = PopupLayer::new();
        let ev = layer.open(&f, PinRef::Random(2));
        f.apply(ev);
        layer.begin_edit(&f, PinRef::Random(2));
        layer.pin_removed(PinRef::Random(0));
        assert_eq!(layer.active(), Some(PinRef::Random(1)));
        assert_eq!(layer.editing().unwrap().pin, PinRef::Random(1));
        layer.pin_removed(PinRef::Sample(0));
        assert_eq!(layer.active(), Some(PinRef::Random(1)));
        layer.pin_removed(PinRef::Random(1));
        assert_eq!(layer.active(), None);
        assert!(layer.editing().is_none());
    }

    #[test]
    fn test_remove_label_uses_nametag() {
        let spec = PopupSpec {
            content: "",
            flags: PopupFlags::default(),
            open: false,
            auto_close: true,
            nametag: Some("Sea Monster"),
        };
        assert_eq!(spec.remove_label(), "Remove this Sea Monster");
        assert_eq!(PopupSpec { nametag: None, ..spec }.remove_label(), "Remove this marker");
    }
}
