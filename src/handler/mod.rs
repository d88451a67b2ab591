//! The widget interaction state machine.
//!
//! One widget per region is active at a time. Its [`InteractionData`] lives
//! in the region's [`ActiveButton`](data::ActiveButton) slot and is *taken
//! out* while an event is handled, so handlers get the region and the active
//! widget's data as two disjoint `&mut` borrows. Commits are queued as
//! [`AfterFunc`](after::AfterFunc) records and run once the event settles.
//!
//! - [`activate`]: state transitions, activation and exit
//! - [`dispatch`]: per-event entry point, cross-cutting handling, kind table
//! - [`buttons`], [`number`], [`textfield`], [`vector`]: per-kind handlers
//! - [`apply`]: the commit pipeline
//! - [`multidrag`], [`drag_toggle`], [`select_others`]: multi-widget edits

pub mod activate;
pub mod after;
pub mod apply;
pub mod buttons;
pub mod clipboard;
pub mod data;
pub mod dispatch;
pub mod drag_toggle;
pub mod multidrag;
pub mod number;
pub mod numedit;
pub mod region;
pub mod select_others;
pub mod state;
pub mod text;
pub mod textfield;
pub mod vector;

pub use after::{AfterFunc, AfterQueue, CallbackCtx};
pub use data::InteractionData;
pub use drag_toggle::DragToggle;
pub use state::{ActivationType, HandlerResult, InteractionState};

use crate::host::Services;
use crate::popup::{ContextMenuFn, PopupStack};
use crate::prefs::UiPreferences;

// ---------------------------------------------------------------------------
// HandlerCtx
// ---------------------------------------------------------------------------

/// Which region an event is being handled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Level {
    /// The window's main region.
    #[default]
    Main,
    /// The region of popup frame `i`.
    Popup(usize),
}

impl Level {
    pub fn popup_index(self) -> Option<usize> {
        match self {
            Level::Main => None,
            Level::Popup(i) => Some(i),
        }
    }

    pub fn is_popup(self) -> bool {
        matches!(self, Level::Popup(_))
    }
}

/// Everything a handler may touch besides the region it runs in.
///
/// Built from disjoint borrows of the [`Interface`](crate::Interface)'s
/// fields for the duration of one event.
pub struct HandlerCtx<'a> {
    pub services: &'a mut Services,
    pub after: &'a mut AfterQueue,
    pub prefs: &'a UiPreferences,
    pub popups: &'a mut PopupStack,
    pub drag_toggle: &'a mut Option<DragToggle>,
    pub context_menu: Option<&'a ContextMenuFn>,
    pub level: Level,
}

impl HandlerCtx<'_> {
    /// Run `f` with `level` as the current level, restoring it afterwards.
    pub(crate) fn at_level<R>(&mut self, level: Level, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = std::mem::replace(&mut self.level, level);
        let out = f(self);
        self.level = saved;
        out
    }
}
