//! Widget records: identity, geometry, value binding, range and callbacks.
//!
//! A [`Widget`] is plain data owned by its [`Block`](crate::block::Block).
//! Blocks are rebuilt every redraw, so nothing here holds interaction
//! state; that lives in the handler's
//! [`InteractionData`](crate::handler::InteractionData) while the widget is
//! active.

pub mod callbacks;
pub mod flags;
pub mod kind;
mod value;

pub(crate) use value::format_vec3;

use std::fmt;
use std::rc::Rc;

pub use callbacks::{
    AutocompleteFn, BlockHandleFn, ButtonFn, ButtonNFn, CallbackInfo, HoldFn, MenuCreateFn,
    MenuHandleFn, RenameFn, SearchArgFree, SearchData, SearchItem, SearchUpdateFn, TooltipFn,
    WidgetCallbacks,
};
pub use flags::{Emboss, WidgetFlags};
pub use kind::WidgetKind;

use crate::block::Block;
use crate::event::{Key, Modifiers};
use crate::geometry::Rect;
use crate::handler::after::CallbackCtx;
use crate::host::{ContextStore, OperatorCall};
use crate::property::{
    PropertyHandle, PropertyInfo, PropertyKind, RawSlot, ScaleType, UnitType, Value, ValueBinding,
    ValueType,
};

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Hard and soft value limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub hard_min: f64,
    pub hard_max: f64,
    pub soft_min: f64,
    pub soft_max: f64,
}

impl Range {
    /// Same hard and soft limits.
    pub fn new(min: f64, max: f64) -> Self {
        Self { hard_min: min, hard_max: max, soft_min: min, soft_max: max }
    }

    pub fn clamp_hard(&self, value: f64) -> f64 {
        value.clamp(self.hard_min, self.hard_max)
    }

    pub fn clamp_soft(&self, value: f64) -> f64 {
        value.clamp(self.soft_min, self.soft_max)
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::new(f64::from(f32::MIN), f64::from(f32::MAX))
    }
}

/// How a number widget steps, rounds, maps and displays its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberSettings {
    /// Click step; floats use hundredths.
    pub step: f64,
    pub precision: usize,
    pub scale: ScaleType,
    pub unit: UnitType,
    pub proportional: bool,
    pub is_int: bool,
}

impl Default for NumberSettings {
    fn default() -> Self {
        Self {
            step: 1.0,
            precision: 3,
            scale: ScaleType::Linear,
            unit: UnitType::None,
            proportional: false,
            is_int: false,
        }
    }
}

/// Position of an item in a pie menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadialDirection {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl RadialDirection {
    pub const ALL: [RadialDirection; 8] = [
        RadialDirection::North,
        RadialDirection::NorthEast,
        RadialDirection::East,
        RadialDirection::SouthEast,
        RadialDirection::South,
        RadialDirection::SouthWest,
        RadialDirection::West,
        RadialDirection::NorthWest,
    ];

    /// Angle in degrees, counter-clockwise from east, y pointing down.
    pub fn angle(self) -> f32 {
        match self {
            RadialDirection::East => 0.0,
            RadialDirection::NorthEast => 45.0,
            RadialDirection::North => 90.0,
            RadialDirection::NorthWest => 135.0,
            RadialDirection::West => 180.0,
            RadialDirection::SouthWest => 225.0,
            RadialDirection::South => 270.0,
            RadialDirection::SouthEast => 315.0,
        }
    }

    /// Nearest direction to the screen-space vector `(dx, dy)`.
    pub fn from_vector(dx: f32, dy: f32) -> RadialDirection {
        let mut deg = (-dy).atan2(dx).to_degrees();
        if deg < 0.0 {
            deg += 360.0;
        }
        let sector = ((deg + 22.5) / 45.0) as usize % 8;
        [
            RadialDirection::East,
            RadialDirection::NorthEast,
            RadialDirection::North,
            RadialDirection::NorthWest,
            RadialDirection::West,
            RadialDirection::SouthWest,
            RadialDirection::South,
            RadialDirection::SouthEast,
        ][sector]
    }
}

/// Small operator button drawn at the right edge of a widget.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraOpIcon {
    pub icon: u32,
    pub operator: OperatorCall,
    pub disabled: bool,
    pub highlighted: bool,
}

/// Scroll state of a list box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListState {
    pub offset: usize,
    pub len: usize,
    pub visible: usize,
}

impl ListState {
    pub fn new(len: usize, visible: usize) -> Self {
        Self { offset: 0, len, visible }
    }

    /// Scroll by `delta` rows, clamped to `[0, len - visible]`.
    pub fn scroll(&mut self, delta: isize) -> bool {
        let max = self.len.saturating_sub(self.visible) as isize;
        let next = (self.offset as isize + delta).clamp(0, max) as usize;
        let changed = next != self.offset;
        self.offset = next;
        changed
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

/// A single interactive element.
pub struct Widget {
    pub kind: WidgetKind,
    /// Block-local rectangle.
    pub rect: Rect,
    pub label: String,
    /// Text as last drawn: label plus formatted value.
    pub draw_str: String,
    pub icon: u32,
    /// Static tooltip text.
    pub tip: Option<String>,
    pub flags: WidgetFlags,
    pub emboss: Emboss,

    pub binding: ValueBinding,
    /// Declared type of the bound value, when known.
    pub value_type: Option<ValueType>,
    pub range: Range,
    pub number: NumberSettings,
    /// Toggle a single bit of an integer instead of a boolean.
    pub bit: Option<u8>,
    /// Value reported to block handlers and popups.
    pub retval: i32,
    /// Maximum text length in characters; 0 means unlimited.
    pub max_len: usize,
    /// Extra identity for matching across rebuilds.
    pub key: Option<String>,
    /// Accelerator inside menus.
    pub menu_key: Option<char>,
    pub pie_dir: Option<RadialDirection>,
    /// Last key captured by key-event widgets.
    pub hotkey: Option<(Key, Modifiers)>,
    pub list: Option<ListState>,

    pub callbacks: WidgetCallbacks,
    pub operator: Option<OperatorCall>,
    pub context: Option<ContextStore>,
    pub search: Option<SearchData>,
    pub extra_icons: Vec<ExtraOpIcon>,

    /// Value of unbound widgets.
    pub(crate) local: Value,
}

impl Widget {
    pub fn new(kind: WidgetKind, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            kind,
            rect: Rect::EMPTY,
            draw_str: label.clone(),
            label,
            icon: 0,
            tip: None,
            flags: WidgetFlags::NONE,
            emboss: Emboss::Normal,
            binding: ValueBinding::None,
            value_type: None,
            range: Range::default(),
            number: NumberSettings::default(),
            bit: None,
            retval: 0,
            max_len: 0,
            key: None,
            menu_key: None,
            pie_dir: None,
            hotkey: None,
            list: None,
            callbacks: WidgetCallbacks::default(),
            operator: None,
            context: None,
            search: None,
            extra_icons: Vec::new(),
            local: Value::Double(0.0),
        }
    }

    // ── Common constructors ──────────────────────────────────────────

    pub fn button(label: impl Into<String>) -> Self {
        Self::new(WidgetKind::Button, label)
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self::new(WidgetKind::Label, text)
    }

    /// A widget of `kind` bound to a property described by `info`.
    pub fn property(
        kind: WidgetKind,
        label: impl Into<String>,
        handle: PropertyHandle,
        info: &PropertyInfo,
    ) -> Self {
        Self::new(kind, label).bind_property(handle, info)
    }

    pub fn number(label: impl Into<String>, handle: PropertyHandle, info: &PropertyInfo) -> Self {
        Self::property(WidgetKind::Number, label, handle, info)
    }

    pub fn slider(label: impl Into<String>, handle: PropertyHandle, info: &PropertyInfo) -> Self {
        Self::property(WidgetKind::NumberSlider, label, handle, info)
    }

    pub fn toggle(label: impl Into<String>, handle: PropertyHandle, info: &PropertyInfo) -> Self {
        Self::property(WidgetKind::Toggle, label, handle, info)
    }

    pub fn text(label: impl Into<String>, handle: PropertyHandle, info: &PropertyInfo) -> Self {
        Self::property(WidgetKind::Text, label, handle, info)
    }

    /// A radio row that selects `value` for the bound property.
    pub fn row(
        label: impl Into<String>,
        handle: PropertyHandle,
        info: &PropertyInfo,
        value: f64,
    ) -> Self {
        let mut w = Self::property(WidgetKind::Row, label, handle, info);
        w.range.hard_max = value;
        w
    }

    /// A menu button opening the block built by `create`.
    pub fn menu(label: impl Into<String>, create: impl Fn(&Widget) -> Block + 'static) -> Self {
        let mut w = Self::new(WidgetKind::Pulldown, label);
        w.callbacks.menu_create = Some(Rc::new(create));
        w
    }

    /// An item inside a menu choosing `value`.
    pub fn menu_item(label: impl Into<String>, value: f64) -> Self {
        let mut w = Self::new(WidgetKind::ButtonMenu, label);
        w.range.hard_min = value;
        w
    }

    // ── Builders ─────────────────────────────────────────────────────

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Bind to a property; range, step and display settings come from `info`.
    pub fn bind_property(mut self, handle: PropertyHandle, info: &PropertyInfo) -> Self {
        self.range = Range {
            hard_min: info.hard_min,
            hard_max: info.hard_max,
            soft_min: info.soft_min,
            soft_max: info.soft_max,
        };
        self.number = NumberSettings {
            step: info.step,
            precision: info.precision,
            scale: info.scale,
            unit: info.unit,
            proportional: info.proportional,
            is_int: matches!(info.kind, PropertyKind::Int | PropertyKind::Enum | PropertyKind::Bool),
        };
        self.value_type =
            Some(if handle.index.is_some() && info.value_type == ValueType::Vec3 {
                ValueType::Float
            } else {
                info.value_type
            });
        self.flags.insert(WidgetFlags::UNDO);
        self.binding = ValueBinding::Property(handle);
        self
    }

    /// Bind to a legacy raw slot.
    pub fn bind_raw(mut self, slot: RawSlot) -> Self {
        self.number.is_int = !slot.ty.is_float();
        if self.number.is_int {
            self.number.precision = 0;
        }
        self.binding = ValueBinding::Raw(slot);
        self
    }

    /// Initial value of an unbound widget.
    pub fn with_value(mut self, value: Value) -> Self {
        self.local = value;
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Range::new(min, max);
        self
    }

    pub fn with_soft_range(mut self, min: f64, max: f64) -> Self {
        self.range.soft_min = min.max(self.range.hard_min);
        self.range.soft_max = max.min(self.range.hard_max);
        self
    }

    pub fn with_step(mut self, step: f64, precision: usize) -> Self {
        self.number.step = step;
        self.number.precision = precision;
        self
    }

    pub fn with_scale(mut self, scale: ScaleType) -> Self {
        self.number.scale = scale;
        self
    }

    pub fn with_unit(mut self, unit: UnitType) -> Self {
        self.number.unit = unit;
        self
    }

    pub fn proportional(mut self) -> Self {
        self.number.proportional = true;
        self
    }

    pub fn with_bit(mut self, bit: u8) -> Self {
        self.bit = Some(bit);
        self
    }

    pub fn with_retval(mut self, retval: i32) -> Self {
        self.retval = retval;
        self
    }

    pub fn with_icon(mut self, icon: u32) -> Self {
        self.icon = icon;
        self
    }

    pub fn with_tip(mut self, tip: impl Into<String>) -> Self {
        self.tip = Some(tip.into());
        self
    }

    pub fn with_flags(mut self, flags: WidgetFlags) -> Self {
        self.flags.insert(flags);
        self
    }

    pub fn with_emboss(mut self, emboss: Emboss) -> Self {
        self.emboss = emboss;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_menu_key(mut self, key: char) -> Self {
        self.menu_key = Some(key.to_ascii_lowercase());
        self
    }

    pub fn with_pie_dir(mut self, dir: RadialDirection) -> Self {
        self.pie_dir = Some(dir);
        self
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn with_list(mut self, list: ListState) -> Self {
        self.list = Some(list);
        self
    }

    pub fn with_operator(mut self, call: OperatorCall) -> Self {
        self.operator = Some(call);
        self
    }

    pub fn with_context(mut self, context: ContextStore) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_search(mut self, search: SearchData) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_extra_icon(mut self, icon: u32, call: OperatorCall) -> Self {
        self.extra_icons.push(ExtraOpIcon { icon, operator: call, disabled: false, highlighted: false });
        self
    }

    pub fn on_click(mut self, f: impl Fn(&mut CallbackCtx<'_>, &CallbackInfo) + 'static) -> Self {
        self.callbacks.on_click = Some(Rc::new(f));
        self
    }

    pub fn on_click_n<A: 'static>(
        mut self,
        f: impl Fn(&mut CallbackCtx<'_>, &CallbackInfo, &dyn std::any::Any) + 'static,
        arg: A,
    ) -> Self {
        self.callbacks.on_click_n = Some((Rc::new(f), Rc::new(arg)));
        self
    }

    pub fn on_rename(mut self, f: impl Fn(&mut CallbackCtx<'_>, &str, &str) + 'static) -> Self {
        self.callbacks.rename = Some(Rc::new(f));
        self
    }

    pub fn on_hold(mut self, f: impl Fn(&mut CallbackCtx<'_>, &CallbackInfo) + 'static) -> Self {
        self.callbacks.hold = Some(Rc::new(f));
        self
    }

    pub fn with_tooltip_fn(mut self, f: impl Fn(&Widget) -> String + 'static) -> Self {
        self.callbacks.tooltip = Some(Rc::new(f));
        self
    }

    pub fn with_menu(mut self, create: impl Fn(&Widget) -> Block + 'static) -> Self {
        self.callbacks.menu_create = Some(Rc::new(create));
        self
    }

    pub fn with_autocomplete(mut self, f: impl Fn(&str) -> Vec<String> + 'static) -> Self {
        self.callbacks.autocomplete = Some(Rc::new(f));
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Can become active.
    pub fn is_interactive(&self) -> bool {
        !self.kind.is_display_only() && !self.flags.contains(WidgetFlags::DISABLED)
    }

    pub fn is_float(&self) -> bool {
        !self.number.is_int
    }

    pub fn is_active(&self) -> bool {
        self.flags.contains(WidgetFlags::ACTIVE)
    }

    /// Whether `self` and `other` are the same widget across a rebuild.
    pub fn same_identity(&self, other: &Widget) -> bool {
        self.kind == other.kind
            && self.label == other.label
            && self.retval == other.retval
            && self.key == other.key
            && self.bit == other.bit
            && (self.binding.same_target(&other.binding)
                || (self.binding.is_none() && other.binding.is_none()))
            && (!self.kind.is_row() || self.range.hard_max == other.range.hard_max)
            && (self.kind != WidgetKind::ButtonMenu || self.range.hard_min == other.range.hard_min)
    }

    /// Info passed to click callbacks.
    pub fn callback_info(&self) -> CallbackInfo {
        CallbackInfo {
            retval: self.retval,
            label: self.label.clone(),
            handle: self.binding.property().cloned(),
        }
    }

    /// Label used for undo steps.
    pub fn undo_label(&self) -> String {
        if !self.label.is_empty() {
            return self.label.clone();
        }
        if let Some(tip) = &self.tip {
            return tip.clone();
        }
        match &self.binding {
            ValueBinding::Property(h) => h.prop.clone(),
            _ => String::new(),
        }
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("rect", &self.rect)
            .field("flags", &self.flags)
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn bind_property_copies_info() {
        let info = PropertyInfo::float().range(0.0, 10.0).soft_range(1.0, 5.0).step(5.0).precision(2);
        let w = Widget::number("Size", PropertyHandle::new("/Cube", "size"), &info);
        assert_eq!(w.range.hard_max, 10.0);
        assert_eq!(w.range.soft_min, 1.0);
        assert_eq!(w.number.step, 5.0);
        assert!(w.is_float());
        assert!(w.flags.contains(WidgetFlags::UNDO));
        assert_eq!(w.value_type, Some(ValueType::Float));
    }

    #[test]
    fn vector_element_binding_is_scalar() {
        let w = Widget::slider(
            "R",
            PropertyHandle::new("/Cube", "color").with_index(0),
            &PropertyInfo::vec3(),
        );
        assert_eq!(w.value_type, Some(ValueType::Float));
    }

    #[test]
    fn int_property_is_int() {
        let w = Widget::number("Count", PropertyHandle::new("/A", "n"), &PropertyInfo::int());
        assert!(!w.is_float());
    }

    #[test]
    fn row_stores_choice_in_hard_max() {
        let info = PropertyInfo::enumeration([(0, "A"), (1, "B")]);
        let w = Widget::row("B", PropertyHandle::new("/A", "mode"), &info, 1.0);
        assert_eq!(w.range.hard_max, 1.0);
    }

    // ── Identity ─────────────────────────────────────────────────────

    #[test]
    fn identity_matches_across_rebuild() {
        let info = PropertyInfo::float();
        let a = Widget::number("Size", PropertyHandle::new("/A", "size"), &info);
        let b = Widget::number("Size", PropertyHandle::new("/A", "size"), &info)
            .with_rect(Rect::new(5.0, 5.0, 10.0, 10.0));
        let c = Widget::number("Size", PropertyHandle::new("/B", "size"), &info);
        assert!(a.same_identity(&b));
        assert!(!a.same_identity(&c));
    }

    #[test]
    fn identity_distinguishes_rows_by_choice() {
        let info = PropertyInfo::int();
        let h = PropertyHandle::new("/A", "mode");
        let a = Widget::row("X", h.clone(), &info, 0.0);
        let b = Widget::row("X", h, &info, 1.0);
        assert!(!a.same_identity(&b));
    }

    #[test]
    fn unbound_buttons_match_by_label() {
        assert!(Widget::button("OK").same_identity(&Widget::button("OK")));
        assert!(!Widget::button("OK").same_identity(&Widget::button("Cancel")));
    }

    // ── Misc ─────────────────────────────────────────────────────────

    #[test]
    fn interactive() {
        assert!(Widget::button("A").is_interactive());
        assert!(!Widget::label("A").is_interactive());
        assert!(!Widget::button("A").with_flags(WidgetFlags::DISABLED).is_interactive());
    }

    #[test]
    fn undo_label_falls_back_to_property() {
        let w = Widget::number("", PropertyHandle::new("/A", "size"), &PropertyInfo::float());
        assert_eq!(w.undo_label(), "size");
    }

    #[test]
    fn radial_direction_from_vector() {
        assert_eq!(RadialDirection::from_vector(10.0, 0.0), RadialDirection::East);
        assert_eq!(RadialDirection::from_vector(0.0, -10.0), RadialDirection::North);
        assert_eq!(RadialDirection::from_vector(-10.0, 10.0), RadialDirection::SouthWest);
    }

    #[test]
    fn list_scroll_clamps() {
        let mut list = ListState::new(10, 4);
        assert!(!list.scroll(-1));
        assert!(list.scroll(100));
        assert_eq!(list.offset, 6);
        assert!(list.scroll(-2));
        assert_eq!(list.offset, 4);
    }
}
