//! Recording doubles of the host collaborators.
//!
//! Each double appends what it was asked to do to a log shared through
//! `Rc<RefCell<_>>`, so a test keeps a handle to the log after the double
//! itself has moved into [`Services`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::event::TimerId;
use crate::geometry::Point;
use crate::host::{
    ContextStore, CursorShape, ModalHandler, OperatorCall, OperatorResult, OperatorRuntime, ReportLevel,
    Services, TimerKind, UndoStack, WindowManager,
};
use crate::property::{MemoryStore, UpdateLog};

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// Everything a [`RecordingWindow`] was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowLog {
    next_timer: u64,
    /// Timers started and not yet removed or fired.
    pub timers: BTreeMap<TimerId, TimerKind>,
    pub removed_timers: Vec<TimerId>,
    pub cursor: Vec<CursorShape>,
    /// Pointer grabs; `true` for wrapping grabs.
    pub grabs: Vec<bool>,
    pub grabbed: bool,
    pub ungrab_positions: Vec<Option<Point>>,
    pub modal_handlers: Vec<ModalHandler>,
    pub reports: Vec<(ReportLevel, String)>,
    pub tooltip: Option<String>,
    pub tooltips_shown: Vec<String>,
    pub mousemoves: usize,
    pub redraws: usize,
    pub clipboard: String,
    pub alive: bool,
}

impl Default for WindowLog {
    fn default() -> Self {
        Self {
            next_timer: 1,
            timers: BTreeMap::new(),
            removed_timers: Vec::new(),
            cursor: Vec::new(),
            grabs: Vec::new(),
            grabbed: false,
            ungrab_positions: Vec::new(),
            modal_handlers: Vec::new(),
            reports: Vec::new(),
            tooltip: None,
            tooltips_shown: Vec::new(),
            mousemoves: 0,
            redraws: 0,
            clipboard: String::new(),
            alive: true,
        }
    }
}

impl WindowLog {
    /// Oldest running timer of `kind`.
    pub fn timer(&self, kind: TimerKind) -> Option<TimerId> {
        self.timers.iter().find(|(_, k)| **k == kind).map(|(id, _)| *id)
    }

    /// Take a timer off the running list, as the window does when it fires.
    pub fn fire(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    pub fn has_modal(&self, handler: ModalHandler) -> bool {
        self.modal_handlers.contains(&handler)
    }

    pub fn report_messages(&self) -> Vec<&str> {
        self.reports.iter().map(|(_, m)| m.as_str()).collect()
    }
}

/// [`WindowManager`] recording into a shared [`WindowLog`].
#[derive(Debug, Clone, Default)]
pub struct RecordingWindow {
    pub log: Rc<RefCell<WindowLog>>,
}

impl WindowManager for RecordingWindow {
    fn add_timer(&mut self, kind: TimerKind, _delay: f64) -> TimerId {
        let mut log = self.log.borrow_mut();
        let id = TimerId(log.next_timer);
        log.next_timer += 1;
        log.timers.insert(id, kind);
        id
    }

    fn remove_timer(&mut self, id: TimerId) {
        let mut log = self.log.borrow_mut();
        log.timers.remove(&id);
        log.removed_timers.push(id);
    }

    fn set_cursor(&mut self, shape: CursorShape) {
        self.log.borrow_mut().cursor.push(shape);
    }

    fn restore_cursor(&mut self) {
        self.log.borrow_mut().cursor.pop();
    }

    fn grab_cursor(&mut self, warp: bool) {
        let mut log = self.log.borrow_mut();
        log.grabs.push(warp);
        log.grabbed = true;
    }

    fn ungrab_cursor(&mut self, restore_to: Option<Point>) {
        let mut log = self.log.borrow_mut();
        log.grabbed = false;
        log.ungrab_positions.push(restore_to);
    }

    fn add_modal_handler(&mut self, handler: ModalHandler) {
        self.log.borrow_mut().modal_handlers.push(handler);
    }

    fn remove_modal_handler(&mut self, handler: ModalHandler) {
        let mut log = self.log.borrow_mut();
        if let Some(i) = log.modal_handlers.iter().rposition(|h| *h == handler) {
            log.modal_handlers.remove(i);
        }
    }

    fn add_mousemove(&mut self) {
        self.log.borrow_mut().mousemoves += 1;
    }

    fn tag_redraw(&mut self) {
        self.log.borrow_mut().redraws += 1;
    }

    fn report(&mut self, level: ReportLevel, message: &str) {
        self.log.borrow_mut().reports.push((level, message.to_owned()));
    }

    fn show_tooltip(&mut self, text: &str, _at: Point) {
        let mut log = self.log.borrow_mut();
        log.tooltip = Some(text.to_owned());
        log.tooltips_shown.push(text.to_owned());
    }

    fn clear_tooltip(&mut self) {
        self.log.borrow_mut().tooltip = None;
    }

    fn clipboard_get(&self) -> String {
        self.log.borrow().clipboard.clone()
    }

    fn clipboard_set(&mut self, text: &str) {
        self.log.borrow_mut().clipboard = text.to_owned();
    }

    fn is_alive(&self) -> bool {
        self.log.borrow().alive
    }
}

// ---------------------------------------------------------------------------
// Operators / undo
// ---------------------------------------------------------------------------

/// Records operator idnames; every call finishes.
#[derive(Debug, Clone, Default)]
pub struct RecordingOperators {
    pub calls: Rc<RefCell<Vec<String>>>,
}

impl OperatorRuntime for RecordingOperators {
    fn call(&mut self, call: &OperatorCall, _context: Option<&ContextStore>) -> OperatorResult {
        self.calls.borrow_mut().push(call.idname.clone());
        OperatorResult::Finished
    }
}

/// Records undo push labels.
#[derive(Debug, Clone, Default)]
pub struct RecordingUndo {
    pub pushes: Rc<RefCell<Vec<String>>>,
}

impl UndoStack for RecordingUndo {
    fn push(&mut self, label: &str) {
        self.pushes.borrow_mut().push(label.to_owned());
    }
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// Handles to the logs of a recording [`Services`] bundle.
#[derive(Debug, Clone)]
pub struct Recorders {
    pub window: Rc<RefCell<WindowLog>>,
    pub operators: Rc<RefCell<Vec<String>>>,
    pub undo: Rc<RefCell<Vec<String>>>,
    /// Properties the store was notified about, in order.
    pub updates: UpdateLog,
}

/// Services over `store` with recording doubles, plus handles to their logs.
pub fn recording_services(store: MemoryStore) -> (Services, Recorders) {
    let window = RecordingWindow::default();
    let operators = RecordingOperators::default();
    let undo = RecordingUndo::default();
    let rec = Recorders {
        window: Rc::clone(&window.log),
        operators: Rc::clone(&operators.calls),
        undo: Rc::clone(&undo.pushes),
        updates: store.update_log(),
    };
    let services = Services::new(Box::new(store), Box::new(window), Box::new(operators), Box::new(undo));
    (services, rec)
}

/// Services over `store` whose logs nobody reads.
pub fn services(store: MemoryStore) -> Services {
    recording_services(store).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_are_tracked_until_removed() {
        let (mut s, rec) = recording_services(MemoryStore::new());
        let a = s.window.add_timer(TimerKind::Tooltip, 0.5);
        let b = s.window.add_timer(TimerKind::Flash, 0.02);
        assert_eq!(rec.window.borrow().timer(TimerKind::Flash), Some(b));
        s.window.remove_timer(a);
        assert_eq!(rec.window.borrow().timer(TimerKind::Tooltip), None);
        assert_eq!(rec.window.borrow().removed_timers, [a]);
    }

    #[test]
    fn modal_handlers_nest() {
        let mut w = RecordingWindow::default();
        w.add_modal_handler(ModalHandler::Popup);
        w.add_modal_handler(ModalHandler::Region);
        w.remove_modal_handler(ModalHandler::Popup);
        assert_eq!(w.log.borrow().modal_handlers, [ModalHandler::Region]);
    }
}
