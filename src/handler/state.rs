//! State enums of the widget interaction state machine.

/// State of the active widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteractionState {
    #[default]
    Init,
    Highlight,
    /// Drawn pressed for a moment after keyboard activation.
    WaitFlash,
    WaitRelease,
    WaitKeyEvent,
    NumEditing,
    TextEditing,
    TextSelecting,
    MenuOpen,
    /// Pressed; waiting to see whether the pointer starts a drag.
    WaitDrag,
    Exit,
}

impl InteractionState {
    /// States that funnel all window input to the widget.
    pub fn is_modal(self) -> bool {
        matches!(
            self,
            InteractionState::WaitRelease
                | InteractionState::WaitKeyEvent
                | InteractionState::NumEditing
                | InteractionState::TextEditing
                | InteractionState::TextSelecting
                | InteractionState::MenuOpen
        )
    }

    pub fn is_text(self) -> bool {
        matches!(self, InteractionState::TextEditing | InteractionState::TextSelecting)
    }

    /// An edit is in progress.
    pub fn is_editing(self) -> bool {
        matches!(
            self,
            InteractionState::TextEditing
                | InteractionState::TextSelecting
                | InteractionState::NumEditing
                | InteractionState::MenuOpen
                | InteractionState::WaitKeyEvent
        )
    }
}

/// How a widget is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationType {
    /// Highlight only, as on hover.
    Over,
    /// Highlight without a mouse (keyboard navigation).
    Activate,
    /// Flash, then apply.
    Apply,
    TextEditing,
    /// Open the widget's menu and highlight its first item.
    Open,
}

/// Whether an event was consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerResult {
    /// Not consumed; later handlers may see it.
    Continue,
    /// Consumed.
    Break,
}

impl HandlerResult {
    pub fn is_break(self) -> bool {
        self == HandlerResult::Break
    }

    /// `Break` if either is.
    pub fn or(self, other: HandlerResult) -> HandlerResult {
        if self.is_break() {
            self
        } else {
            other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modal_states() {
        assert!(InteractionState::NumEditing.is_modal());
        assert!(InteractionState::MenuOpen.is_modal());
        assert!(!InteractionState::Highlight.is_modal());
        assert!(!InteractionState::WaitDrag.is_modal());
        assert!(!InteractionState::WaitFlash.is_modal());
    }

    #[test]
    fn result_or() {
        assert_eq!(HandlerResult::Continue.or(HandlerResult::Break), HandlerResult::Break);
        assert_eq!(HandlerResult::Break.or(HandlerResult::Continue), HandlerResult::Break);
    }
}
