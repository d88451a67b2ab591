//! Pilot: programmatic interaction with a headless [`Interface`].
//!
//! The `Pilot` wires an [`Interface`] to a [`MemoryStore`] and the recording
//! doubles from [`mock`](super::mock), tracks the pointer, and offers
//! gesture-level input (hover, click, drag, type) addressed by widget label.

use crate::block::{Block, Region, WidgetRef};
use crate::event::{Event, Key, Modifiers, MouseButton};
use crate::geometry::Point;
use crate::handler::{HandlerResult, InteractionState};
use crate::host::TimerKind;
use crate::interface::Interface;
use crate::prefs::UiPreferences;
use crate::property::{MemoryStore, PropertyHandle, RawAccessor, Value};
use crate::widget::Widget;

use super::mock::{recording_services, Recorders};

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless interface driver for testing.
///
/// # Examples
///
/// ```ignore
/// use kraken_ui::testing::Pilot;
///
/// let mut pilot = Pilot::new(store).with_block(panel);
/// pilot.drag("Opacity", Point::new(20.0, 0.0));
/// assert_eq!(pilot.value(&opacity), Value::Float(0.7));
/// ```
pub struct Pilot {
    ui: Interface,
    rec: Recorders,
    pos: Point,
}

impl Pilot {
    /// Create an interface over `store` with recording collaborators.
    pub fn new(store: MemoryStore) -> Self {
        let (services, rec) = recording_services(store);
        Self { ui: Interface::new(services), rec, pos: Point::ZERO }
    }

    pub fn with_block(self, block: Block) -> Self {
        let Pilot { ui, rec, pos } = self;
        Pilot { ui: ui.with_block(block), rec, pos }
    }

    pub fn with_prefs(self, prefs: UiPreferences) -> Self {
        let Pilot { ui, rec, pos } = self;
        Pilot { ui: ui.with_prefs(prefs), rec, pos }
    }

    pub fn with_context_menu(self, f: impl Fn(&Widget) -> Option<Block> + 'static) -> Self {
        let Pilot { ui, rec, pos } = self;
        Pilot { ui: ui.with_context_menu(f), rec, pos }
    }

    /// Replace the accessor behind raw bindings.
    pub fn with_raw(mut self, raw: impl RawAccessor + 'static) -> Self {
        self.ui.services_mut().raw = Box::new(raw);
        self
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Send an arbitrary event.
    pub fn send(&mut self, event: Event) -> HandlerResult {
        self.ui.handle_event(&event)
    }

    /// Move the pointer to `to`.
    pub fn move_to(&mut self, to: Point) -> HandlerResult {
        let from = std::mem::replace(&mut self.pos, to);
        self.send(Event::mouse_move(from, to))
    }

    /// Move the pointer by `delta` in `steps` equal motions.
    pub fn move_by(&mut self, delta: Point, steps: usize) {
        let steps = steps.max(1);
        let start = self.pos;
        for i in 1..=steps {
            let f = i as f32 / steps as f32;
            self.move_to(start + Point::new(delta.x * f, delta.y * f));
        }
    }

    /// Move the pointer to the centre of the widget labelled `label`.
    ///
    /// # Panics
    ///
    /// Panics if no such widget is shown.
    pub fn hover(&mut self, label: &str) -> HandlerResult {
        let to = self.centre_of(label).unwrap_or_else(|| panic!("no widget labelled `{label}`"));
        self.move_to(to)
    }

    pub fn press(&mut self, button: MouseButton) -> HandlerResult {
        self.send(Event::press(button, self.pos))
    }

    pub fn release(&mut self, button: MouseButton) -> HandlerResult {
        self.send(Event::release(button, self.pos))
    }

    pub fn double_click(&mut self, button: MouseButton) -> HandlerResult {
        self.send(Event::double_click(button, self.pos))
    }

    /// Left click at the current pointer position.
    pub fn click_here(&mut self) {
        self.press(MouseButton::Left);
        self.release(MouseButton::Left);
    }

    /// Hover the widget labelled `label` and left-click it.
    pub fn click(&mut self, label: &str) {
        self.hover(label);
        self.click_here();
    }

    /// Press on `label`, move by `delta` in a few steps, release.
    pub fn drag(&mut self, label: &str, delta: Point) {
        self.hover(label);
        self.press(MouseButton::Left);
        self.move_by(delta, 4);
        self.release(MouseButton::Left);
    }

    pub fn wheel(&mut self, up: bool) -> HandlerResult {
        self.send(Event::wheel(up, self.pos))
    }

    pub fn key(&mut self, key: Key) -> HandlerResult {
        self.send(Event::key(key, self.pos))
    }

    pub fn key_with(&mut self, key: Key, modifiers: Modifiers) -> HandlerResult {
        self.send(Event::key(key, self.pos).with_modifiers(modifiers))
    }

    pub fn key_release(&mut self, key: Key) -> HandlerResult {
        self.send(Event::key_release(key, self.pos))
    }

    /// Type each character of `text` as a key press.
    pub fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.key(Key::Char(c));
        }
    }

    /// Fire the oldest running timer of `kind`. Returns `false` if none runs.
    pub fn fire_timer(&mut self, kind: TimerKind) -> bool {
        let id = {
            let mut log = self.rec.window.borrow_mut();
            let Some(id) = log.timer(kind) else {
                return false;
            };
            log.fire(id);
            id
        };
        self.send(Event::timer(id, self.pos));
        true
    }

    // ── Query ────────────────────────────────────────────────────────

    pub fn ui(&self) -> &Interface {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut Interface {
        &mut self.ui
    }

    /// Logs of the recording collaborators.
    pub fn rec(&self) -> &Recorders {
        &self.rec
    }

    pub fn pointer(&self) -> Point {
        self.pos
    }

    /// Stored value of a property.
    ///
    /// # Panics
    ///
    /// Panics if the store has no such property.
    pub fn value(&self, handle: &PropertyHandle) -> Value {
        self.ui.services().store.get(handle).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn active_state(&self) -> Option<InteractionState> {
        self.ui.region().active_state()
    }

    /// Label of the main region's active widget.
    pub fn active_label(&self) -> Option<String> {
        let region = self.ui.region();
        let (bi, id) = region.active_widget()?;
        region.widget(bi, id).map(|w| w.label.clone())
    }

    /// Active state in popup frame `depth`.
    pub fn popup_state(&self, depth: usize) -> Option<InteractionState> {
        self.ui.popups().frame(depth)?.region.active_state()
    }

    /// Reference to the main-region widget labelled `label`.
    pub fn find(&self, label: &str) -> Option<WidgetRef> {
        self.ui.find(label)
    }

    /// Window-space centre of the widget labelled `label`, topmost popup
    /// first.
    pub fn centre_of(&self, label: &str) -> Option<Point> {
        let popups = self.ui.popups();
        (0..popups.len())
            .rev()
            .filter_map(|i| popups.frame(i).map(|f| &f.region))
            .chain(std::iter::once(self.ui.region()))
            .find_map(|region| centre_in(region, label))
    }

    /// Number of after-func entries drained so far.
    pub fn drained(&self) -> usize {
        self.ui.after().drained()
    }
}

fn centre_in(region: &Region, label: &str) -> Option<Point> {
    let (bi, id) = region.find_label(label)?;
    let block = &region.blocks[bi];
    Some(block.block_to_window(block[id].rect.center()))
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn pilot() -> Pilot {
        let block = Block::new("panel")
            .with(Widget::button("Apply").with_rect(Rect::new(0.0, 0.0, 80.0, 20.0)))
            .with(Widget::button("Reset").with_rect(Rect::new(0.0, 20.0, 80.0, 20.0)).with_tip("Back to defaults"))
            .with_offset(Point::new(100.0, 100.0));
        Pilot::new(MemoryStore::new()).with_block(block)
    }

    // ── Pointer ──────────────────────────────────────────────────────

    #[test]
    fn centre_includes_block_offset() {
        let pilot = pilot();
        assert_eq!(pilot.centre_of("Reset"), Some(Point::new(140.0, 130.0)));
        assert_eq!(pilot.centre_of("Nothing"), None);
    }

    #[test]
    fn hover_tracks_pointer() {
        let mut pilot = pilot();
        pilot.hover("Apply");
        assert_eq!(pilot.pointer(), Point::new(140.0, 110.0));
        assert_eq!(pilot.active_label().as_deref(), Some("Apply"));
        assert_eq!(pilot.active_state(), Some(InteractionState::Highlight));
    }

    // ── Timers ───────────────────────────────────────────────────────

    #[test]
    fn firing_a_missing_timer_is_a_no_op() {
        let mut pilot = pilot();
        assert!(!pilot.fire_timer(TimerKind::Flash));
    }

    #[test]
    fn tooltip_timer_shows_tip() {
        let mut pilot = pilot();
        pilot.hover("Reset");
        assert!(pilot.fire_timer(TimerKind::Tooltip));
        assert_eq!(pilot.rec().window.borrow().tooltip.as_deref(), Some("Back to defaults"));
    }
}
