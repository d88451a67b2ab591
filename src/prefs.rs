//! User preferences for widget interaction.
//!
//! Loaded from TOML (`[ui]`-less flat table); every field has a default so a
//! partial file is fine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Interaction preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiPreferences {
    /// Show tooltips when hovering widgets.
    pub show_tooltips: bool,
    /// Seconds before a tooltip appears.
    pub tooltip_delay: f64,
    /// Seconds before a tooltip appears over a label-like widget.
    pub tooltip_delay_label: f64,
    /// Open menus in a menu bar by hovering once one is open.
    pub menu_open_auto: bool,
    /// Auto-open ticks for top-level menu buttons (one tick is 20 ms, times five).
    pub menu_threshold1: u32,
    /// Auto-open ticks for sub-menus inside popups.
    pub menu_threshold2: u32,
    /// Seconds a button stays pressed after keyboard activation.
    pub flash_delay: f64,
    /// Seconds of press before a hold action fires.
    pub hold_delay: f64,
    /// Pixels of motion before a press becomes a drag.
    pub drag_threshold: f32,
    /// Interface scale.
    pub dpi_fac: f32,
    /// Height of one widget row in pixels at scale 1.
    pub widget_unit: f32,
    /// Pixels a full local soft range spans while dragging a number.
    pub drag_map_pixel_max: f32,
    /// Sweep vertically across number fields to edit them together.
    pub multi_drag: bool,
    /// Drag over toggles to set them all.
    pub drag_toggle: bool,
    /// Alt-edits also apply to every selected owner of the property.
    pub select_others: bool,
    /// Approximate glyph advance for placing the text cursor.
    pub text_char_width: f32,
    /// Undo steps kept per text edit.
    pub text_undo_steps: usize,
    /// Distance beyond which leaving a menu closes it.
    pub menu_quit_margin: f32,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            show_tooltips: true,
            tooltip_delay: 0.5,
            tooltip_delay_label: 0.2,
            menu_open_auto: true,
            menu_threshold1: 5,
            menu_threshold2: 2,
            flash_delay: 0.02,
            hold_delay: 0.5,
            drag_threshold: 3.0,
            dpi_fac: 1.0,
            widget_unit: 20.0,
            drag_map_pixel_max: 1000.0,
            multi_drag: true,
            drag_toggle: true,
            select_others: true,
            text_char_width: 7.0,
            text_undo_steps: 32,
            menu_quit_margin: 40.0,
        }
    }
}

impl UiPreferences {
    /// Parse preferences from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load preferences from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> String {
        // Only plain scalars; serialization cannot fail.
        toml::to_string(self).unwrap_or_default()
    }

    pub fn with_tooltips(mut self, show: bool) -> Self {
        self.show_tooltips = show;
        self
    }

    pub fn with_menu_open_auto(mut self, auto: bool) -> Self {
        self.menu_open_auto = auto;
        self
    }

    pub fn with_dpi(mut self, dpi_fac: f32) -> Self {
        self.dpi_fac = dpi_fac;
        self
    }

    pub fn with_multi_drag(mut self, enabled: bool) -> Self {
        self.multi_drag = enabled;
        self
    }

    pub fn with_drag_toggle(mut self, enabled: bool) -> Self {
        self.drag_toggle = enabled;
        self
    }

    /// Widget row height at the current scale.
    pub fn unit_y(&self) -> f32 {
        self.widget_unit * self.dpi_fac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = UiPreferences::default();
        assert!(p.show_tooltips);
        assert_eq!(p.menu_threshold1, 5);
        assert_eq!(p.unit_y(), 20.0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let p = UiPreferences::from_toml_str("menu_open_auto = false\ndpi_fac = 2.0\n").unwrap();
        assert!(!p.menu_open_auto);
        assert_eq!(p.unit_y(), 40.0);
        assert_eq!(p.tooltip_delay, 0.5);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = UiPreferences::from_toml_str("dpi_fac = \"big\"").unwrap_err();
        assert!(matches!(err, crate::error::UiError::Config(_)));
    }

    #[test]
    fn toml_round_trip() {
        let p = UiPreferences::default().with_tooltips(false).with_dpi(1.5);
        let back = UiPreferences::from_toml_str(&p.to_toml_string()).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = UiPreferences::load("/nonexistent/kraken-ui.toml").unwrap_err();
        assert!(matches!(err, crate::error::UiError::Io(_)));
    }
}
