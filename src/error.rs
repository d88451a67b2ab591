//! Error types.
//!
//! Event handling itself never fails: user-input problems become a report
//! plus a canceled edit. These errors surface from the programmatic API
//! (activation, property access, preferences loading).

use crate::expr::ExprError;
use crate::property::PropertyError;

/// Errors returned by the interface API.
#[derive(Debug, thiserror::Error)]
pub enum UiError {
    /// More than one widget in a region carries the active flag.
    #[error("{0} widgets are active in one region, at most one is allowed")]
    MultipleActive(usize),

    /// A numeric edit was requested on a widget without a value slot.
    #[error("widget has no editable value")]
    NoEditableValue,

    /// A raw binding whose owner no longer resolves.
    #[error("widget binding does not resolve to a value")]
    UnresolvedBinding,

    /// The widget cannot be activated (label, separator, disabled, ...).
    #[error("widget is not interactive")]
    NotInteractive,

    /// The widget reference is stale or was never part of the region.
    #[error("widget not found")]
    WidgetNotFound,

    /// No popup exists at the given depth.
    #[error("no popup at depth {0}")]
    NoSuchPopup(usize),

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Expr(#[from] ExprError),

    #[error("layout failed: {0}")]
    Layout(#[from] taffy::TaffyError),

    #[error("invalid preferences: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to read preferences: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias.
pub type Result<T, E = UiError> = std::result::Result<T, E>;
