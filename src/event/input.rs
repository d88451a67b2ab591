//! Input event types consumed by the interaction handlers.
//!
//! Defines [`Event`], [`EventType`], [`EventValue`], [`Key`] and [`Modifiers`].
//! Crossterm events are converted through [`EventTranslator`] so the handlers
//! never depend on crossterm directly.

use std::ops::{BitAnd, BitOr};
use std::time::{Duration, Instant};

use crate::geometry::Point;

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Keyboard key, decoupled from crossterm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

impl Key {
    /// Human-readable name, used when a key is captured into a hotkey widget.
    pub fn name(self) -> String {
        match self {
            Key::Char(' ') => "Space".to_owned(),
            Key::Char(c) => c.to_uppercase().collect(),
            Key::F(n) => format!("F{n}"),
            other => format!("{other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// Modifier key bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const CTRL: Modifiers = Modifiers(2);
    pub const ALT: Modifiers = Modifiers(4);
    pub const OSKEY: Modifiers = Modifiers(8);

    /// Check whether `self` contains all the bits in `other`.
    pub fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check whether no modifier bits are set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Ctrl on most platforms, the OS key on others; either one counts.
    pub fn command(self) -> bool {
        self.contains(Modifiers::CTRL) || self.contains(Modifiers::OSKEY)
    }

    /// Human-readable prefix such as `"Ctrl+Shift+"`.
    pub fn prefix(self) -> String {
        let mut out = String::new();
        for (flag, name) in [
            (Modifiers::CTRL, "Ctrl+"),
            (Modifiers::ALT, "Alt+"),
            (Modifiers::SHIFT, "Shift+"),
            (Modifiers::OSKEY, "OS+"),
        ] {
            if self.contains(flag) {
                out.push_str(name);
            }
        }
        out
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;
    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitAnd for Modifiers {
    type Output = Modifiers;
    fn bitand(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 & rhs.0)
    }
}

// ---------------------------------------------------------------------------
// TimerId
// ---------------------------------------------------------------------------

/// Opaque handle of a window timer; carried as the payload of timer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    MouseMove,
    Button(MouseButton),
    WheelUp,
    WheelDown,
    Key(Key),
    Timer(TimerId),
    /// A drag-and-drop payload was released over the window.
    Drop,
    /// The window lost focus; active widgets are canceled.
    WindowDeactivate,
}

/// Press/release state of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventValue {
    #[default]
    Nothing,
    Press,
    Release,
    Click,
    DoubleClick,
}

/// A single input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub kind: EventType,
    pub value: EventValue,
    pub modifiers: Modifiers,
    /// Pointer position in window space.
    pub mouse_pos: Point,
    /// Pointer position of the previous event.
    pub prev_mouse_pos: Point,
}

impl Event {
    /// Create an event with no modifiers, pointer unchanged at `pos`.
    pub fn new(kind: EventType, value: EventValue, pos: Point) -> Self {
        Self { kind, value, modifiers: Modifiers::NONE, mouse_pos: pos, prev_mouse_pos: pos }
    }

    /// Pointer motion from `from` to `to`.
    pub fn mouse_move(from: Point, to: Point) -> Self {
        Self {
            kind: EventType::MouseMove,
            value: EventValue::Nothing,
            modifiers: Modifiers::NONE,
            mouse_pos: to,
            prev_mouse_pos: from,
        }
    }

    pub fn press(button: MouseButton, pos: Point) -> Self {
        Self::new(EventType::Button(button), EventValue::Press, pos)
    }

    pub fn release(button: MouseButton, pos: Point) -> Self {
        Self::new(EventType::Button(button), EventValue::Release, pos)
    }

    pub fn double_click(button: MouseButton, pos: Point) -> Self {
        Self::new(EventType::Button(button), EventValue::DoubleClick, pos)
    }

    pub fn wheel(up: bool, pos: Point) -> Self {
        let kind = if up { EventType::WheelUp } else { EventType::WheelDown };
        Self::new(kind, EventValue::Press, pos)
    }

    /// Key press at `pos`.
    pub fn key(key: Key, pos: Point) -> Self {
        Self::new(EventType::Key(key), EventValue::Press, pos)
    }

    /// Key release at `pos`.
    pub fn key_release(key: Key, pos: Point) -> Self {
        Self::new(EventType::Key(key), EventValue::Release, pos)
    }

    /// Timer tick for `id`.
    pub fn timer(id: TimerId, pos: Point) -> Self {
        Self::new(EventType::Timer(id), EventValue::Nothing, pos)
    }

    /// Return a copy with the given modifiers.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn is_mouse(&self) -> bool {
        matches!(
            self.kind,
            EventType::MouseMove | EventType::Button(_) | EventType::WheelUp | EventType::WheelDown
        )
    }

    pub fn is_keyboard(&self) -> bool {
        matches!(self.kind, EventType::Key(_))
    }

    pub fn is_timer(&self) -> bool {
        matches!(self.kind, EventType::Timer(_))
    }

    pub fn is_mouse_move(&self) -> bool {
        self.kind == EventType::MouseMove
    }

    /// Whether this is a press of `button`.
    pub fn is_press(&self, button: MouseButton) -> bool {
        self.kind == EventType::Button(button) && self.value == EventValue::Press
    }

    /// Whether this is a release of `button`.
    pub fn is_release(&self, button: MouseButton) -> bool {
        self.kind == EventType::Button(button) && self.value == EventValue::Release
    }

    /// Whether this is a press of `key` (any modifiers).
    pub fn is_key_press(&self, key: Key) -> bool {
        self.kind == EventType::Key(key) && self.value == EventValue::Press
    }

    /// Press of Enter, which doubles as "confirm".
    pub fn is_confirm(&self) -> bool {
        self.is_key_press(Key::Enter)
    }

    /// The pressed key, if this is a key press.
    pub fn pressed_key(&self) -> Option<Key> {
        match (self.kind, self.value) {
            (EventType::Key(k), EventValue::Press) => Some(k),
            _ => None,
        }
    }

    pub fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    pub fn ctrl(&self) -> bool {
        self.modifiers.command()
    }

    pub fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Pointer displacement since the previous event.
    pub fn delta(&self) -> Point {
        self.mouse_pos - self.prev_mouse_pos
    }
}

// ---------------------------------------------------------------------------
// Crossterm translation
// ---------------------------------------------------------------------------

/// Convert crossterm key modifiers to our `Modifiers`.
fn convert_modifiers(m: crossterm::event::KeyModifiers) -> Modifiers {
    let mut out = Modifiers::NONE;
    if m.contains(crossterm::event::KeyModifiers::SHIFT) {
        out = out | Modifiers::SHIFT;
    }
    if m.contains(crossterm::event::KeyModifiers::CONTROL) {
        out = out | Modifiers::CTRL;
    }
    if m.contains(crossterm::event::KeyModifiers::ALT) {
        out = out | Modifiers::ALT;
    }
    if m.contains(crossterm::event::KeyModifiers::SUPER) {
        out = out | Modifiers::OSKEY;
    }
    out
}

/// Convert a crossterm key code; `None` for codes we don't handle.
fn convert_key(code: crossterm::event::KeyCode) -> Option<Key> {
    use crossterm::event::KeyCode;
    Some(match code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::F(n) => Key::F(n),
        _ => return None,
    })
}

/// Convert a crossterm mouse button to our `MouseButton`.
fn convert_mouse_button(b: crossterm::event::MouseButton) -> MouseButton {
    match b {
        crossterm::event::MouseButton::Left => MouseButton::Left,
        crossterm::event::MouseButton::Right => MouseButton::Right,
        crossterm::event::MouseButton::Middle => MouseButton::Middle,
    }
}

/// Stateful crossterm-to-[`Event`] converter.
///
/// Crossterm reports cells and has no notion of a previous pointer position
/// or double-clicks; the translator tracks both.
#[derive(Debug, Clone)]
pub struct EventTranslator {
    /// Pixel size of one terminal cell.
    pub cell_size: Point,
    /// Maximum interval between two presses to count as a double-click.
    pub double_click_time: Duration,
    last_pos: Point,
    last_press: Option<(MouseButton, Point, Instant)>,
}

impl EventTranslator {
    pub fn new() -> Self {
        Self {
            cell_size: Point::new(1.0, 1.0),
            double_click_time: Duration::from_millis(350),
            last_pos: Point::ZERO,
            last_press: None,
        }
    }

    /// Set the pixel size of one cell.
    pub fn with_cell_size(mut self, width: f32, height: f32) -> Self {
        self.cell_size = Point::new(width, height);
        self
    }

    /// Last known pointer position.
    pub fn mouse_pos(&self) -> Point {
        self.last_pos
    }

    /// Translate one crossterm event, `None` if it has no counterpart.
    pub fn translate(&mut self, ct: crossterm::event::Event) -> Option<Event> {
        self.translate_at(ct, Instant::now())
    }

    fn translate_at(&mut self, ct: crossterm::event::Event, now: Instant) -> Option<Event> {
        use crossterm::event::{KeyEventKind, MouseEventKind};

        let prev = self.last_pos;
        match ct {
            crossterm::event::Event::Key(ke) => {
                let key = convert_key(ke.code)?;
                let value = match ke.kind {
                    KeyEventKind::Release => EventValue::Release,
                    _ => EventValue::Press,
                };
                Some(
                    Event::new(EventType::Key(key), value, prev)
                        .with_modifiers(convert_modifiers(ke.modifiers)),
                )
            }
            crossterm::event::Event::Mouse(me) => {
                let pos = Point::new(
                    f32::from(me.column) * self.cell_size.x,
                    f32::from(me.row) * self.cell_size.y,
                );
                self.last_pos = pos;
                let (kind, value) = match me.kind {
                    MouseEventKind::Down(b) => {
                        let button = convert_mouse_button(b);
                        let value = match self.last_press {
                            Some((last, at, when))
                                if last == button
                                    && at == pos
                                    && now.duration_since(when) <= self.double_click_time =>
                            {
                                self.last_press = None;
                                EventValue::DoubleClick
                            }
                            _ => {
                                self.last_press = Some((button, pos, now));
                                EventValue::Press
                            }
                        };
                        (EventType::Button(button), value)
                    }
                    MouseEventKind::Up(b) => {
                        (EventType::Button(convert_mouse_button(b)), EventValue::Release)
                    }
                    MouseEventKind::Drag(_) | MouseEventKind::Moved => {
                        (EventType::MouseMove, EventValue::Nothing)
                    }
                    MouseEventKind::ScrollUp => (EventType::WheelUp, EventValue::Press),
                    MouseEventKind::ScrollDown => (EventType::WheelDown, EventValue::Press),
                    _ => return None,
                };
                Some(Event {
                    kind,
                    value,
                    modifiers: convert_modifiers(me.modifiers),
                    mouse_pos: pos,
                    prev_mouse_pos: prev,
                })
            }
            crossterm::event::Event::FocusLost => {
                Some(Event::new(EventType::WindowDeactivate, EventValue::Nothing, prev))
            }
            _ => None,
        }
    }
}

impl Default for EventTranslator {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{
        KeyCode, KeyEvent as CtKeyEvent, KeyModifiers, MouseButton as CtButton,
        MouseEvent as CtMouseEvent, MouseEventKind,
    };

    fn ct_mouse(kind: MouseEventKind, column: u16, row: u16) -> crossterm::event::Event {
        crossterm::event::Event::Mouse(CtMouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    // ── Modifiers ────────────────────────────────────────────────────

    #[test]
    fn modifiers_none_is_empty() {
        assert!(Modifiers::NONE.is_empty());
    }

    #[test]
    fn modifiers_combined() {
        let mods = Modifiers::CTRL | Modifiers::ALT;
        assert!(mods.contains(Modifiers::CTRL));
        assert!(mods.contains(Modifiers::ALT));
        assert!(!mods.contains(Modifiers::SHIFT));
        assert_eq!(mods & Modifiers::CTRL, Modifiers::CTRL);
    }

    #[test]
    fn modifiers_command_accepts_oskey() {
        assert!(Modifiers::OSKEY.command());
        assert!(Modifiers::CTRL.command());
        assert!(!Modifiers::SHIFT.command());
    }

    #[test]
    fn modifiers_prefix() {
        assert_eq!((Modifiers::SHIFT | Modifiers::CTRL).prefix(), "Ctrl+Shift+");
        assert_eq!(Modifiers::NONE.prefix(), "");
    }

    // ── Key ──────────────────────────────────────────────────────────

    #[test]
    fn key_names() {
        assert_eq!(Key::Char('k').name(), "K");
        assert_eq!(Key::Char(' ').name(), "Space");
        assert_eq!(Key::F(5).name(), "F5");
        assert_eq!(Key::Escape.name(), "Escape");
    }

    // ── Event ────────────────────────────────────────────────────────

    #[test]
    fn event_constructors() {
        let p = Point::new(3.0, 4.0);
        assert!(Event::press(MouseButton::Left, p).is_press(MouseButton::Left));
        assert!(Event::release(MouseButton::Left, p).is_release(MouseButton::Left));
        assert!(Event::key(Key::Enter, p).is_confirm());
        assert!(Event::timer(TimerId(7), p).is_timer());
        assert!(Event::wheel(true, p).is_mouse());
    }

    #[test]
    fn event_delta() {
        let e = Event::mouse_move(Point::new(1.0, 1.0), Point::new(4.0, -1.0));
        assert_eq!(e.delta(), Point::new(3.0, -2.0));
        assert!(e.is_mouse_move());
    }

    #[test]
    fn pressed_key_ignores_release() {
        assert_eq!(Event::key(Key::Tab, Point::ZERO).pressed_key(), Some(Key::Tab));
        assert_eq!(Event::key_release(Key::Tab, Point::ZERO).pressed_key(), None);
    }

    // ── EventTranslator ──────────────────────────────────────────────

    #[test]
    fn translate_key_with_ctrl() {
        let mut t = EventTranslator::new();
        let ct = crossterm::event::Event::Key(CtKeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        ));
        let e = t.translate(ct).unwrap();
        assert_eq!(e.kind, EventType::Key(Key::Char('c')));
        assert!(e.ctrl());
    }

    #[test]
    fn translate_unsupported_key_is_none() {
        let mut t = EventTranslator::new();
        let ct = crossterm::event::Event::Key(CtKeyEvent::new(
            KeyCode::CapsLock,
            KeyModifiers::NONE,
        ));
        assert!(t.translate(ct).is_none());
    }

    #[test]
    fn translate_mouse_tracks_previous_position() {
        let mut t = EventTranslator::new().with_cell_size(10.0, 20.0);
        let first = t.translate(ct_mouse(MouseEventKind::Moved, 1, 1)).unwrap();
        assert_eq!(first.mouse_pos, Point::new(10.0, 20.0));
        let second = t.translate(ct_mouse(MouseEventKind::Drag(CtButton::Left), 2, 1)).unwrap();
        assert_eq!(second.kind, EventType::MouseMove);
        assert_eq!(second.prev_mouse_pos, Point::new(10.0, 20.0));
        assert_eq!(second.mouse_pos, Point::new(20.0, 20.0));
    }

    #[test]
    fn translate_double_click() {
        let mut t = EventTranslator::new();
        let now = Instant::now();
        let down = ct_mouse(MouseEventKind::Down(CtButton::Left), 5, 5);
        let first = t.translate_at(down.clone(), now).unwrap();
        assert_eq!(first.value, EventValue::Press);
        let second = t.translate_at(down, now + Duration::from_millis(100)).unwrap();
        assert_eq!(second.value, EventValue::DoubleClick);
    }

    #[test]
    fn translate_slow_second_press_is_plain_press() {
        let mut t = EventTranslator::new();
        let now = Instant::now();
        let down = ct_mouse(MouseEventKind::Down(CtButton::Left), 5, 5);
        t.translate_at(down.clone(), now);
        let second = t.translate_at(down, now + Duration::from_secs(2)).unwrap();
        assert_eq!(second.value, EventValue::Press);
    }

    #[test]
    fn translate_focus_lost() {
        let mut t = EventTranslator::new();
        let e = t.translate(crossterm::event::Event::FocusLost).unwrap();
        assert_eq!(e.kind, EventType::WindowDeactivate);
    }

    #[test]
    fn translate_scroll() {
        let mut t = EventTranslator::new();
        let e = t.translate(ct_mouse(MouseEventKind::ScrollDown, 0, 0)).unwrap();
        assert_eq!(e.kind, EventType::WheelDown);
    }
}
