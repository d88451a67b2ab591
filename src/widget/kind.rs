//! The closed set of widget kinds and their classification.

/// What a widget is; selects its event handler and commit logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    // Push buttons
    Button,
    /// Item inside a menu; commits its hard-min as the chosen value.
    ButtonMenu,
    Decorator,

    // Toggles
    Toggle,
    ToggleN,
    IconToggle,
    IconToggleN,
    ButtonToggle,
    Checkbox,
    CheckboxN,

    // One-of-many
    Row,
    ListRow,
    Tab,
    ViewItem,

    // Numbers
    Number,
    NumberSlider,
    Scroll,
    Grip,

    // Text
    Text,
    SearchMenu,

    // Vectors and editors
    Color,
    UnitVec,
    HsvCube,
    HsvCircle,
    Curve,
    CurveProfile,
    ColorBand,

    // Menus
    Menu,
    Pulldown,
    Block,
    Popover,

    // Key capture
    KeyEvent,
    HotkeyEvent,

    // Display only
    Label,
    Separator,
    SeparatorLine,
    SeparatorSpacer,
    Roundbox,
    ListBox,
    Image,
    Histogram,
    Waveform,
    TrackPreview,
    ProgressBar,
    Extra,
}

impl WidgetKind {
    /// Flips a boolean or a bit on click.
    pub fn is_toggle(self) -> bool {
        matches!(
            self,
            WidgetKind::Toggle
                | WidgetKind::ToggleN
                | WidgetKind::IconToggle
                | WidgetKind::IconToggleN
                | WidgetKind::ButtonToggle
                | WidgetKind::Checkbox
                | WidgetKind::CheckboxN
        )
    }

    /// Toggle variants that display the inverse of the stored value.
    pub fn is_inverted(self) -> bool {
        matches!(self, WidgetKind::ToggleN | WidgetKind::IconToggleN | WidgetKind::CheckboxN)
    }

    /// Sets its backing value to its hard-max when chosen.
    pub fn is_row(self) -> bool {
        matches!(self, WidgetKind::Row | WidgetKind::ListRow | WidgetKind::Tab)
    }

    /// Number fields that can be dragged and joined in multi-drag.
    pub fn is_number(self) -> bool {
        matches!(self, WidgetKind::Number | WidgetKind::NumberSlider)
    }

    pub fn is_text(self) -> bool {
        matches!(self, WidgetKind::Text | WidgetKind::SearchMenu)
    }

    /// Clicking opens a child popup.
    pub fn opens_menu(self) -> bool {
        matches!(
            self,
            WidgetKind::Menu
                | WidgetKind::Pulldown
                | WidgetKind::Block
                | WidgetKind::Popover
                | WidgetKind::Color
        )
    }

    /// Menu buttons that open on hover once a menu is already open.
    pub fn auto_opens(self) -> bool {
        matches!(self, WidgetKind::Block | WidgetKind::Pulldown | WidgetKind::Popover)
    }

    /// Edits a three-component vector.
    pub fn is_vector(self) -> bool {
        matches!(
            self,
            WidgetKind::Color | WidgetKind::UnitVec | WidgetKind::HsvCube | WidgetKind::HsvCircle
        )
    }

    /// Editors whose data is edited by their own popups; commit runs callbacks only.
    pub fn is_opaque_editor(self) -> bool {
        matches!(
            self,
            WidgetKind::Curve
                | WidgetKind::CurveProfile
                | WidgetKind::ColorBand
                | WidgetKind::Histogram
                | WidgetKind::Waveform
                | WidgetKind::TrackPreview
        )
    }

    /// Never becomes active.
    pub fn is_display_only(self) -> bool {
        matches!(
            self,
            WidgetKind::Label
                | WidgetKind::Separator
                | WidgetKind::SeparatorLine
                | WidgetKind::SeparatorSpacer
                | WidgetKind::Roundbox
                | WidgetKind::ListBox
                | WidgetKind::Image
                | WidgetKind::ProgressBar
                | WidgetKind::Extra
        )
    }

    /// Uses the shorter label tooltip delay.
    pub fn is_label_like(self) -> bool {
        matches!(self, WidgetKind::Label | WidgetKind::Decorator)
    }

    /// Whether Ctrl+C/Ctrl+V apply to this kind at all.
    pub fn supports_clipboard(self) -> bool {
        !self.is_display_only()
            && !matches!(
                self,
                WidgetKind::Grip
                    | WidgetKind::Scroll
                    | WidgetKind::Button
                    | WidgetKind::ButtonMenu
                    | WidgetKind::Tab
                    | WidgetKind::ViewItem
                    | WidgetKind::KeyEvent
                    | WidgetKind::HotkeyEvent
                    | WidgetKind::Menu
                    | WidgetKind::Pulldown
                    | WidgetKind::Block
                    | WidgetKind::Popover
            )
    }

    /// Values edited continuously while dragging.
    pub fn is_interactive_drag(self) -> bool {
        matches!(
            self,
            WidgetKind::Number
                | WidgetKind::NumberSlider
                | WidgetKind::Scroll
                | WidgetKind::Grip
                | WidgetKind::HsvCube
                | WidgetKind::HsvCircle
                | WidgetKind::UnitVec
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles() {
        assert!(WidgetKind::Checkbox.is_toggle());
        assert!(WidgetKind::IconToggleN.is_inverted());
        assert!(!WidgetKind::Toggle.is_inverted());
        assert!(!WidgetKind::Row.is_toggle());
    }

    #[test]
    fn menus() {
        assert!(WidgetKind::Pulldown.opens_menu());
        assert!(WidgetKind::Pulldown.auto_opens());
        assert!(WidgetKind::Menu.opens_menu());
        assert!(!WidgetKind::Menu.auto_opens());
        assert!(WidgetKind::Color.opens_menu());
    }

    #[test]
    fn display_only() {
        for kind in [WidgetKind::Label, WidgetKind::Separator, WidgetKind::ListBox] {
            assert!(kind.is_display_only(), "{kind:?}");
            assert!(!kind.supports_clipboard(), "{kind:?}");
        }
        assert!(!WidgetKind::Number.is_display_only());
    }

    #[test]
    fn clipboard_kinds() {
        assert!(WidgetKind::Number.supports_clipboard());
        assert!(WidgetKind::Text.supports_clipboard());
        assert!(WidgetKind::Color.supports_clipboard());
        assert!(WidgetKind::Toggle.supports_clipboard());
        assert!(!WidgetKind::Button.supports_clipboard());
    }

    #[test]
    fn rows() {
        assert!(WidgetKind::Row.is_row());
        assert!(WidgetKind::ListRow.is_row());
        assert!(WidgetKind::Tab.is_row());
        assert!(!WidgetKind::ViewItem.is_row());
    }
}
