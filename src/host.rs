//! Collaborators supplied by the host application.
//!
//! The interaction core never talks to a window system, an operator runtime
//! or an undo stack directly. The host implements these traits and hands
//! them over bundled in [`Services`].

use std::collections::BTreeMap;

use crate::event::TimerId;
use crate::geometry::Point;
use crate::property::{PropertyStore, RawAccessor, RawSlots, Value};

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// Purpose of a timer, for the host's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Tooltip,
    AutoOpen,
    Flash,
    HoldAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorShape {
    Default,
    Text,
    /// Horizontal drag on a number field.
    NumberDrag,
    MoveX,
    MoveY,
    Hand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportLevel {
    Info,
    Warning,
    Error,
}

/// A blocking handler that funnels all window input to the interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalHandler {
    /// The region's active widget is in a modal state.
    Region,
    /// A floating popup is open.
    Popup,
}

/// Window-system services.
pub trait WindowManager {
    /// Start a one-shot timer firing after `delay` seconds.
    fn add_timer(&mut self, kind: TimerKind, delay: f64) -> TimerId;
    fn remove_timer(&mut self, id: TimerId);

    fn set_cursor(&mut self, shape: CursorShape);
    fn restore_cursor(&mut self);
    /// Confine the pointer; with `warp` it wraps at the window edges.
    fn grab_cursor(&mut self, warp: bool);
    /// Release the grab, optionally moving the pointer to `restore_to`.
    fn ungrab_cursor(&mut self, restore_to: Option<Point>);

    fn add_modal_handler(&mut self, handler: ModalHandler);
    fn remove_modal_handler(&mut self, handler: ModalHandler);

    /// Queue a synthetic pointer motion so hover state is re-evaluated.
    fn add_mousemove(&mut self);
    fn tag_redraw(&mut self);

    /// Transient user-visible message.
    fn report(&mut self, level: ReportLevel, message: &str);
    fn show_tooltip(&mut self, text: &str, at: Point);
    fn clear_tooltip(&mut self);

    fn clipboard_get(&self) -> String;
    fn clipboard_set(&mut self, text: &str);

    /// `false` once the window is being destroyed.
    fn is_alive(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// How an operator is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OperatorContext {
    #[default]
    InvokeDefault,
    ExecDefault,
    InvokeRegionWin,
    ExecRegionWin,
}

/// Outcome reported by the operator runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorResult {
    Finished,
    Cancelled,
    RunningModal,
    PassThrough,
}

/// Key/value context captured from the layout that built a widget.
pub type ContextStore = BTreeMap<String, String>;

/// A pending operator invocation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperatorCall {
    pub idname: String,
    pub context: OperatorContext,
    pub params: BTreeMap<String, Value>,
}

impl OperatorCall {
    pub fn new(idname: impl Into<String>) -> Self {
        Self { idname: idname.into(), ..Self::default() }
    }

    pub fn with_context(mut self, context: OperatorContext) -> Self {
        self.context = context;
        self
    }

    /// Add a parameter.
    pub fn param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params.insert(name.into(), value);
        self
    }
}

/// Operator runtime.
pub trait OperatorRuntime {
    fn call(&mut self, call: &OperatorCall, context: Option<&ContextStore>) -> OperatorResult;
}

/// Undo system.
pub trait UndoStack {
    fn push(&mut self, label: &str);
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// All host collaborators, passed to handlers and callbacks.
pub struct Services {
    pub store: Box<dyn PropertyStore>,
    pub raw: Box<dyn RawAccessor>,
    pub window: Box<dyn WindowManager>,
    pub operators: Box<dyn OperatorRuntime>,
    pub undo: Box<dyn UndoStack>,
}

impl Services {
    /// Bundle collaborators; raw slots start out as an empty [`RawSlots`].
    pub fn new(
        store: Box<dyn PropertyStore>,
        window: Box<dyn WindowManager>,
        operators: Box<dyn OperatorRuntime>,
        undo: Box<dyn UndoStack>,
    ) -> Self {
        Self { store, raw: Box::new(RawSlots::new()), window, operators, undo }
    }

    /// Replace the raw slot accessor.
    pub fn with_raw(mut self, raw: Box<dyn RawAccessor>) -> Self {
        self.raw = raw;
        self
    }

    /// Report to the user and mirror the message into the log.
    pub fn report(&mut self, level: ReportLevel, message: &str) {
        match level {
            ReportLevel::Info => log::info!("{message}"),
            ReportLevel::Warning => log::warn!("{message}"),
            ReportLevel::Error => log::error!("{message}"),
        }
        self.window.report(level, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_call_builder() {
        let call = OperatorCall::new("object.delete")
            .with_context(OperatorContext::ExecDefault)
            .param("confirm", Value::Bool(false));
        assert_eq!(call.idname, "object.delete");
        assert_eq!(call.context, OperatorContext::ExecDefault);
        assert_eq!(call.params.get("confirm"), Some(&Value::Bool(false)));
    }

    #[test]
    fn operator_call_default_context() {
        assert_eq!(OperatorCall::new("x").context, OperatorContext::InvokeDefault);
    }
}
