//! Reading and writing a widget's bound value.

use crate::error::{Result, UiError};
use crate::expr;
use crate::host::Services;
use crate::property::{RawType, Value, ValueBinding, ValueType};

use super::{Widget, WidgetFlags, WidgetKind};

impl Widget {
    /// Declared type of the value this widget edits.
    pub fn effective_value_type(&self) -> ValueType {
        if let Some(ty) = self.value_type {
            return ty;
        }
        match &self.binding {
            ValueBinding::Raw(slot) => match slot.ty {
                RawType::Bool => ValueType::Bool,
                RawType::Float => ValueType::Float,
                RawType::Double => ValueType::Double,
                _ => ValueType::Int,
            },
            _ => self.local.value_type(),
        }
    }

    /// Whether the binding resolves to a readable value.
    pub fn has_value(&self, services: &Services) -> bool {
        self.read_value(services).is_ok()
    }

    pub fn read_value(&self, services: &Services) -> Result<Value> {
        match &self.binding {
            ValueBinding::Property(handle) => Ok(services.store.get(handle)?),
            ValueBinding::Raw(slot) => {
                let f = services.raw.read(slot).ok_or(UiError::UnresolvedBinding)?;
                Ok(match slot.ty {
                    RawType::Bool => Value::Bool(f != 0.0),
                    RawType::Float => Value::Float(f as f32),
                    RawType::Double => Value::Double(f),
                    _ => Value::Int(f as i64),
                })
            }
            ValueBinding::None => Ok(self.local.clone()),
        }
    }

    /// Numeric view of the value.
    pub fn read_f64(&self, services: &Services) -> Result<f64> {
        self.read_value(services)?.as_f64().ok_or(UiError::NoEditableValue)
    }

    pub fn write_value(&mut self, services: &mut Services, value: Value) -> Result<()> {
        match &self.binding {
            ValueBinding::Property(handle) => services.store.set(handle, value)?,
            ValueBinding::Raw(slot) => {
                let f = value.as_f64().ok_or(UiError::NoEditableValue)?;
                if !services.raw.write(slot, f) {
                    return Err(UiError::UnresolvedBinding);
                }
            }
            ValueBinding::None => self.local = value,
        }
        Ok(())
    }

    /// Write a number, clamped to the hard range and rounded for integers.
    pub fn write_f64(&mut self, services: &mut Services, value: f64) -> Result<()> {
        let mut value = self.range.clamp_hard(value);
        if self.number.is_int {
            value = value.round();
        }
        let ty = match self.effective_value_type() {
            ValueType::String | ValueType::Token | ValueType::Vec3 => ValueType::Double,
            ty => ty,
        };
        self.write_value(services, Value::from_f64(ty, value))
    }

    /// The value as the text shown when editing.
    pub fn read_string(&self, services: &Services) -> Result<String> {
        let value = self.read_value(services)?;
        Ok(match value {
            Value::String(s) | Value::Token(s) => s,
            Value::Vec3(v) => format_vec3(v),
            other if self.kind.is_number() || matches!(other, Value::Float(_) | Value::Double(_)) => {
                let f = other.as_f64().unwrap_or_default();
                expr::format_for_edit(f, self.number.is_int)
            }
            other => other.to_string(),
        })
    }

    pub fn write_string(&mut self, services: &mut Services, text: &str) -> Result<()> {
        self.write_value(services, Value::String(text.to_owned()))
    }

    pub fn read_vec3(&self, services: &Services) -> Result<[f32; 3]> {
        self.read_value(services)?.as_vec3().ok_or(UiError::NoEditableValue)
    }

    pub fn write_vec3(&mut self, services: &mut Services, v: [f32; 3]) -> Result<()> {
        self.write_value(services, Value::Vec3(v))
    }

    /// Toggle state for `value`, honouring bit toggles and inverted kinds.
    pub fn toggle_is_on(&self, value: f64) -> bool {
        let on = match self.bit {
            Some(bit) => ((value as i64) >> bit) & 1 == 1,
            None => value != 0.0,
        };
        on ^ self.kind.is_inverted()
    }

    /// Value a toggle click produces from `value`.
    pub fn toggled(&self, value: f64) -> f64 {
        match self.bit {
            Some(bit) => ((value as i64) ^ (1 << bit)) as f64,
            None => {
                if value != 0.0 {
                    0.0
                } else {
                    1.0
                }
            }
        }
    }

    /// Recompute the draw string and the `ON` flag from the bound value.
    pub fn refresh(&mut self, services: &Services) {
        let Ok(value) = self.read_value(services) else {
            self.draw_str = self.label.clone();
            return;
        };
        let f = value.as_f64();
        if self.kind.is_toggle() {
            self.flags.set(WidgetFlags::ON, f.is_some_and(|f| self.toggle_is_on(f)));
        } else if self.kind.is_row() {
            self.flags.set(WidgetFlags::ON, f == Some(self.range.hard_max));
        }
        self.draw_str = match self.kind {
            WidgetKind::Number | WidgetKind::NumberSlider => {
                let shown = f.map(|f| expr::format_value(f, self.shown_precision(), self.number.unit));
                match (shown, self.label.is_empty()) {
                    (Some(s), true) => s,
                    (Some(s), false) => format!("{}: {s}", self.label),
                    (None, _) => self.label.clone(),
                }
            }
            WidgetKind::Text | WidgetKind::SearchMenu => {
                let text = value.as_str().map(str::to_owned).unwrap_or_else(|| value.to_string());
                if self.label.is_empty() {
                    text
                } else {
                    format!("{}: {text}", self.label)
                }
            }
            WidgetKind::KeyEvent | WidgetKind::HotkeyEvent => match self.hotkey {
                Some((key, mods)) => format!("{}{}", mods.prefix(), key.name()),
                None => self.label.clone(),
            },
            _ => self.label.clone(),
        };
    }

    fn shown_precision(&self) -> usize {
        if self.number.is_int {
            0
        } else {
            self.number.precision
        }
    }
}

/// `[r, g, b]` with up to 6 decimals.
pub(crate) fn format_vec3(v: [f32; 3]) -> String {
    let [r, g, b] = v.map(|c| expr::format_for_edit(f64::from(c), false));
    format!("[{r}, {g}, {b}]")
}
