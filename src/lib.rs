//! # kraken-ui
//!
//! The widget interaction core of the Kraken content-creation UI.
//!
//! Widgets are plain records rebuilt every redraw; this crate gives them
//! behaviour. It routes input events to the single active widget of a
//! region, runs its state machine (hover, press, drag, numeric and text
//! editing, menus), mirrors drags across sibling widgets, and commits edits
//! to the host's property store through a deferred after-func queue so
//! operators and undo only ever see settled state.
//!
//! ## Core Systems
//!
//! - **[`block`]**: `Block` widget containers, `Region`s and generation-checked `WidgetRef`s
//! - **[`widget`]**: widget records, kinds, flags and callbacks
//! - **[`handler`]**: the interaction state machine, per-kind handlers, multi-drag and the commit pipeline
//! - **[`popup`]**: the popup stack, menu cascades, pie menus and popup invocation
//! - **[`interface`]**: the per-window entry point the host feeds events into
//! - **[`property`]**: typed values, the `PropertyStore` trait and value bindings
//! - **[`host`]**: window, operator and undo collaborators
//! - **[`layout`]**: taffy-powered row/column layout of widgets
//! - **[`expr`]**: numeric text-entry evaluation with units
//! - **[`event`]**: input events and the crossterm adapter
//! - **[`prefs`]**: user preferences loaded from TOML
//! - **[`testing`]**: headless `Pilot` and recording collaborators
//! - **[`geometry`]**: `Point` and `Rect` primitives

// Foundation
pub mod error;
pub mod geometry;

// Data model
pub mod block;
pub mod property;
pub mod widget;

// Host boundary
pub mod event;
pub mod host;
pub mod prefs;

// Interaction
pub mod expr;
pub mod handler;
pub mod interface;
pub mod layout;
pub mod popup;

// Testing
pub mod testing;

pub use error::{Result, UiError};
pub use interface::Interface;

/// Commonly used types.
pub mod prelude {
    pub use crate::block::{Block, BlockFlags, Region, WidgetId, WidgetRef};
    pub use crate::error::{Result, UiError};
    pub use crate::event::{Event, EventType, EventValue, Key, Modifiers, MouseButton};
    pub use crate::geometry::{Point, Rect};
    pub use crate::handler::{ActivationType, HandlerResult, InteractionState};
    pub use crate::host::{OperatorCall, ReportLevel, Services, TimerKind};
    pub use crate::interface::Interface;
    pub use crate::layout::{Layout, LayoutNode};
    pub use crate::popup::{PopupInvocation, PopupReturn, ReturnFlags};
    pub use crate::prefs::UiPreferences;
    pub use crate::property::{MemoryStore, PropertyHandle, PropertyInfo, PropertyStore, Value};
    pub use crate::widget::{Widget, WidgetFlags, WidgetKind};
}
