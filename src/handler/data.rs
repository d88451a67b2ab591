//! Transient state of the active widget.
//!
//! [`InteractionData`] is created when a widget is activated and dropped when
//! it exits. Everything an edit needs to commit or roll back lives here: the
//! three-way value snapshot, the text buffer, drag geometry, multi-drag peers
//! and the select-others context.

use crate::block::{InteractionHandleRef, WidgetId, WidgetRef};
use crate::event::{Key, Modifiers, TimerId};
use crate::geometry::Point;
use crate::property::{PropertyHandle, Value};
use crate::widget::SearchItem;

use super::numedit::NumDrag;
use super::state::{ActivationType, InteractionState};
use super::text::TextEdit;

// ---------------------------------------------------------------------------
// Timers
// ---------------------------------------------------------------------------

/// Timers owned by the active widget; removed before the data is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timers {
    pub tooltip: Option<TimerId>,
    pub auto_open: Option<TimerId>,
    pub flash: Option<TimerId>,
    pub hold: Option<TimerId>,
}

impl Timers {
    /// Which timer `id` is, if it is one of ours.
    pub fn kind_of(&self, id: TimerId) -> Option<crate::host::TimerKind> {
        use crate::host::TimerKind;
        if self.tooltip == Some(id) {
            Some(TimerKind::Tooltip)
        } else if self.auto_open == Some(id) {
            Some(TimerKind::AutoOpen)
        } else if self.flash == Some(id) {
            Some(TimerKind::Flash)
        } else if self.hold == Some(id) {
            Some(TimerKind::HoldAction)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Multi-drag
// ---------------------------------------------------------------------------

/// Progress of a multi-number drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MultiInit {
    /// Direction not decided yet.
    #[default]
    Unset,
    /// Vertical sweep; peers are re-tagged every motion.
    Setup,
    /// Peers snapshotted; edits are mirrored.
    Enable,
    /// Plain single-widget drag.
    Disable,
}

/// A peer joined to a multi-drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerState {
    pub wref: WidgetRef,
    pub origvalue: f64,
    pub select_others: SelectContext,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiDrag {
    pub init: MultiInit,
    /// Accumulated absolute pointer motion per axis.
    pub drag_dir: Point,
    pub drag_start: Point,
    pub last: Point,
    pub lock_x: f32,
    /// At least one peer is tagged.
    pub has_peers: bool,
    pub peers: Vec<PeerState>,
    /// Scale peers by the origin's ratio instead of offsetting them.
    pub is_proportional: bool,
}

impl MultiDrag {
    pub fn is_enabled(&self) -> bool {
        self.init == MultiInit::Enable
    }
}

// ---------------------------------------------------------------------------
// Select others
// ---------------------------------------------------------------------------

/// Same property on another selected owner.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectElem {
    pub handle: PropertyHandle,
    pub orig: Value,
}

/// Propagation of an edit to every selected owner of the property.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectContext {
    pub is_enabled: bool,
    /// Elements were collected (possibly none).
    pub is_init: bool,
    /// Copy the value instead of applying the delta.
    pub is_copy: bool,
    pub elems: Vec<SelectElem>,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Result list of a search widget being edited.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchState {
    pub items: Vec<SearchItem>,
    pub active: Option<usize>,
}

impl SearchState {
    pub fn active_item(&self) -> Option<&SearchItem> {
        self.items.get(self.active?)
    }

    /// Move the highlight by `step`, wrapping.
    pub fn step(&mut self, step: isize) {
        let n = self.items.len() as isize;
        if n == 0 {
            self.active = None;
            return;
        }
        let next = match self.active {
            Some(i) => (i as isize + step).rem_euclid(n),
            None if step > 0 => 0,
            None => n - 1,
        };
        self.active = Some(next as usize);
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|i| i.name == name)
    }
}

// ---------------------------------------------------------------------------
// InteractionData
// ---------------------------------------------------------------------------

/// Which side arrow of a number field the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrowZone {
    Left,
    Right,
}

/// Per-activation state of the active widget.
#[derive(Debug, Default)]
pub struct InteractionData {
    pub state: InteractionState,
    /// Return value reported to the owning popup.
    pub retval: i32,
    pub cancel: bool,
    /// Escape: cancel every enclosing popup too.
    pub escapecancel: bool,
    pub applied: bool,
    pub applied_interactive: bool,
    pub apply_through_extra_icon: bool,
    /// Values are written while dragging instead of only on exit.
    pub interactive: bool,
    pub used_mouse: bool,
    pub timers: Timers,

    pub value: f64,
    pub origvalue: f64,
    pub startvalue: f64,
    /// Last value written by an interactive apply.
    pub last_interactive: Option<f64>,
    pub vec: [f32; 3],
    pub origvec: [f32; 3],
    /// Value chosen in a child menu.
    pub ret_value: Option<Value>,
    /// Captured key of a key-event widget.
    pub hotkey: Option<(Key, Modifiers)>,

    pub text: Option<TextEdit>,
    pub origstr: Option<String>,
    pub search: Option<SearchState>,

    pub drag: Option<NumDrag>,
    /// Press position for drag detection.
    pub press_pos: Point,
    pub arrow: Option<ArrowZone>,
    pub multi: MultiDrag,
    pub select_others: SelectContext,

    /// Popup frame opened by this widget.
    pub menu: Option<usize>,
    pub interaction: Option<InteractionHandleRef>,
    /// Widget to activate once this one exits (Tab navigation).
    pub post: Option<(WidgetRef, ActivationType)>,
    /// Do not re-highlight after exit even if the pointer is still over it.
    pub skip_reactivate: bool,
    /// The pointer is grabbed for a numeric drag.
    pub grabbed: bool,
    /// Pointer position to restore after a grab.
    pub ungrab_pos: Option<Point>,
    pub extra_icon: Option<usize>,
    pub cursor_changed: bool,
    pub tooltip_shown: bool,
}

impl InteractionData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a text buffer holds typed input.
    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn text_str(&self) -> Option<&str> {
        self.text.as_ref().map(TextEdit::text)
    }
}

/// The single active widget of a region with its interaction data.
#[derive(Debug)]
pub struct ActiveButton {
    pub block: usize,
    pub widget: WidgetId,
    pub data: InteractionData,
}

impl ActiveButton {
    pub fn new(block: usize, widget: WidgetId) -> Self {
        Self { block, widget, data: InteractionData::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_step_wraps() {
        let mut s = SearchState {
            items: vec![SearchItem::new("a", Value::Int(0)), SearchItem::new("b", Value::Int(1))],
            active: None,
        };
        s.step(1);
        assert_eq!(s.active, Some(0));
        s.step(1);
        s.step(1);
        assert_eq!(s.active, Some(0));
        s.step(-1);
        assert_eq!(s.active_item().unwrap().name, "b");
    }

    #[test]
    fn empty_search_has_no_active() {
        let mut s = SearchState::default();
        s.step(1);
        assert_eq!(s.active, None);
    }

    #[test]
    fn timer_lookup() {
        let timers = Timers { flash: Some(TimerId(3)), ..Timers::default() };
        assert_eq!(timers.kind_of(TimerId(3)), Some(crate::host::TimerKind::Flash));
        assert_eq!(timers.kind_of(TimerId(4)), None);
    }
}
