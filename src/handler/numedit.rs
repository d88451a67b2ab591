//! Numeric drag editing: local soft range, scale mapping and pointer steps.
//!
//! A drag edits a normalized fraction `f` in `0..=1` which is mapped onto a
//! soft range by the widget's scale type. For plain number fields the soft
//! range is first narrowed around the current value so one pixel stays a
//! sensible step even when the property allows huge values.

use crate::prefs::UiPreferences;
use crate::property::ScaleType;
use crate::widget::{Widget, WidgetKind};

/// Floats step in hundredths of their configured step.
pub const FLOAT_STEP_SCALE: f64 = 0.01;
/// Smallest value considered by the log mapping.
pub const LOG_SCALE_MIN: f64 = 0.5e-8;
/// Pixels of motion ignored before a drag starts changing the value.
pub const DRAG_LOCK_THRESHOLD: f32 = 3.0;

/// Snapping requested by modifier keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Snap {
    #[default]
    Off,
    On,
    Fine,
}

impl Snap {
    /// Ctrl snaps, Ctrl+Shift snaps finer.
    pub fn from_modifiers(ctrl: bool, shift: bool) -> Snap {
        match (ctrl, shift) {
            (true, true) => Snap::Fine,
            (true, false) => Snap::On,
            _ => Snap::Off,
        }
    }
}

// ---------------------------------------------------------------------------
// DragMap
// ---------------------------------------------------------------------------

/// Mapping between a drag fraction and a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragMap {
    pub soft_min: f64,
    pub soft_max: f64,
    pub log_min: f64,
    pub scale: ScaleType,
}

impl DragMap {
    /// Build the mapping used while dragging `widget` from `value`.
    ///
    /// Number fields get a local soft range no wider than twice the value
    /// span of `drag_map_pixel_max` pixels, centred on `value` and kept
    /// inside the widget's own soft range. A soft range that misses `value`
    /// is first widened to reach it, within the hard range.
    pub fn for_widget(widget: &Widget, value: f64, prefs: &UiPreferences) -> DragMap {
        let range = &widget.range;
        let outer_min = range.soft_min.min(value).max(range.hard_min);
        let outer_max = range.soft_max.max(value).min(range.hard_max);
        let mut soft_min = outer_min;
        let mut soft_max = outer_max;
        let mut soft_range = soft_max - soft_min;
        let scale = widget.number.scale;
        let mut log_min = if scale == ScaleType::Log { soft_min.max(LOG_SCALE_MIN) } else { 0.0 };

        if widget.kind == WidgetKind::Number {
            if scale == ScaleType::Log {
                log_min = log_min.max(10f64.powi(-(widget.number.precision as i32)) * 0.5);
            }
            let step_float_min = 0.1;
            let is_float = widget.is_float();
            let step = if is_float {
                widget.number.step * FLOAT_STEP_SCALE
            } else {
                widget.number.step.trunc()
            };
            let pixels = f64::from(prefs.drag_map_pixel_max * prefs.dpi_fac);
            let soft_range_max = soft_range.min(
                2.0 * if is_float { step.min(step_float_min) * (pixels / step_float_min) } else { pixels },
            );
            if soft_range > soft_range_max {
                soft_min = value - soft_range_max / 2.0;
                soft_max = value + soft_range_max / 2.0;
                let far = if value > 0.0 { f64::from(f32::MAX) } else { f64::from(f32::MIN) };
                if !soft_min.is_finite() {
                    soft_min = far;
                }
                if !soft_max.is_finite() {
                    soft_max = far;
                }
                if soft_min < outer_min {
                    soft_min = outer_min;
                    soft_max = soft_min + soft_range_max;
                } else if soft_max > outer_max {
                    soft_max = outer_max;
                    soft_min = soft_max - soft_range_max;
                }
                if soft_min == soft_max {
                    if value > 0.0 {
                        soft_min = next_toward(soft_min, f64::NEG_INFINITY);
                    } else {
                        soft_max = next_toward(soft_max, f64::INFINITY);
                    }
                }
                soft_range = soft_max - soft_min;
            }
        }
        debug_assert!(soft_range >= 0.0);
        DragMap { soft_min, soft_max, log_min, scale }
    }

    pub fn range(&self) -> f64 {
        self.soft_max - self.soft_min
    }

    /// Drag fraction that maps to `value`.
    pub fn fraction_of(&self, value: f64) -> f64 {
        let range = self.range();
        if range == 0.0 {
            return 0.0;
        }
        match self.scale {
            ScaleType::Linear => (value - self.soft_min) / range,
            ScaleType::Log => {
                let base = self.soft_max / self.log_min;
                (value / self.log_min).ln() / base.ln()
            }
            ScaleType::Cubic => {
                let cubic_min = self.soft_min.powi(3);
                let cubic_range = self.soft_max.powi(3) - cubic_min;
                let f = (value - self.soft_min) * cubic_range / range + cubic_min;
                (f.cbrt() - self.soft_min) / range
            }
        }
    }

    /// Value at drag fraction `f`.
    pub fn value_at(&self, f: f64) -> f64 {
        match self.scale {
            ScaleType::Linear => self.soft_min + f * self.range(),
            ScaleType::Log => self.log_min * (self.soft_max / self.log_min).powf(f),
            ScaleType::Cubic => {
                let cubic_min = self.soft_min.powi(3);
                let cubic_range = self.soft_max.powi(3) - cubic_min;
                (cubic_min + f * cubic_range).cbrt()
            }
        }
    }
}

/// Next representable value after `x` in the direction of `toward`.
fn next_toward(x: f64, toward: f64) -> f64 {
    let x32 = x as f32;
    let bits = x32.to_bits();
    let up = toward > x;
    let next = if x32 == 0.0 {
        if up {
            f32::from_bits(1)
        } else {
            -f32::from_bits(1)
        }
    } else if (x32 > 0.0) == up {
        f32::from_bits(bits + 1)
    } else {
        f32::from_bits(bits - 1)
    };
    f64::from(next)
}

// ---------------------------------------------------------------------------
// NumDrag
// ---------------------------------------------------------------------------

/// Pointer state of a numeric drag.
#[derive(Debug, Clone, PartialEq)]
pub struct NumDrag {
    pub start_x: f32,
    pub last_x: f32,
    /// Motion below the lock threshold is ignored.
    pub lock: bool,
    pub dragf: f64,
    pub dragf_start: f64,
    /// The value changed at least once.
    pub changed: bool,
    pub map: DragMap,
}

impl NumDrag {
    pub fn new(x: f32, value: f64, map: DragMap) -> Self {
        let f = map.fraction_of(value);
        Self { start_x: x, last_x: x, lock: true, dragf: f, dragf_start: f, changed: false, map }
    }

    /// Release the drag lock once the pointer moves past the threshold.
    /// With `hold` the lock is kept regardless. Returns whether motion at
    /// `x` should edit the value.
    pub fn update_lock(&mut self, x: f32, hold: bool) -> bool {
        if x == self.last_x {
            return false;
        }
        if self.lock {
            if (x - self.start_x).abs() <= DRAG_LOCK_THRESHOLD || hold {
                return false;
            }
            self.lock = false;
            self.start_x = x;
            self.last_x = x;
        }
        true
    }

    /// Relative drag of a number field to `x`. Returns the new value when
    /// it differs from `current`.
    pub fn number_step(
        &mut self,
        x: f32,
        current: f64,
        is_float: bool,
        fac: f64,
        snap: Snap,
        dpi_fac: f32,
    ) -> Option<f64> {
        let range = self.map.range();
        let mut deler = 500.0;
        let (linear_limit, pixel_map) = if is_float { (11.0, 500.0) } else { (129.0, 250.0) };
        if !is_float {
            if range > 600.0 {
                deler = range.powf(0.75);
            } else if range < 25.0 {
                deler = 50.0;
            } else if range < 100.0 {
                deler = 100.0;
            }
        }
        deler /= fac;
        let mut non_linear = if range > linear_limit {
            f64::from((x - self.start_x).abs()) / pixel_map
        } else {
            1.0
        };
        if !is_float {
            non_linear = non_linear.max(0.5 * f64::from(dpi_fac));
        }
        self.dragf += f64::from(x - self.last_x) / deler * non_linear;
        self.dragf = self.dragf.clamp(0.0, 1.0);
        self.last_x = x;

        let mut value = self.map.value_at(self.dragf);
        if is_float {
            value = snap_float(value, range, snap);
        } else {
            value = snap_int(value.round(), range, snap);
        }
        value = value.clamp(self.map.soft_min, self.map.soft_max);
        self.accept(value, current)
    }

    /// Absolute drag of a slider across `width` pixels to `x`.
    pub fn slider_step(
        &mut self,
        x: f32,
        width: f32,
        current: f64,
        is_float: bool,
        shift: bool,
        snap: Snap,
    ) -> Option<f64> {
        let width = f64::from(width.max(1.0));
        let mut f = f64::from(x - self.start_x) / width + self.dragf_start;
        if shift {
            f = (f - self.dragf) / 10.0 + self.dragf;
        }
        f = f.clamp(0.0, 1.0);
        self.dragf = f;
        self.last_x = x;
        let range = self.map.range();
        let mut value = self.map.value_at(f);
        value = if is_float { snap_float(value, range, snap) } else { snap_int(value.round(), range, snap) };
        self.accept(value.clamp(self.map.soft_min, self.map.soft_max), current)
    }

    fn accept(&mut self, value: f64, current: f64) -> Option<f64> {
        if value == current {
            return None;
        }
        self.changed = true;
        Some(value)
    }
}

fn snap_float(value: f64, range: f64, snap: Snap) -> f64 {
    if snap == Snap::Off {
        return value;
    }
    let mut fac = if range < 2.10 {
        0.1
    } else if range < 21.0 {
        1.0
    } else {
        10.0
    };
    if snap == Snap::Fine {
        fac /= 10.0;
    }
    (value / fac).round() * fac
}

fn snap_int(value: f64, range: f64, snap: Snap) -> f64 {
    if snap == Snap::Off || range < 21.0 {
        return value;
    }
    let fac = if snap == Snap::Fine { 1.0 } else { 10.0 };
    (value / fac).round() * fac
}

// ===========================================================================
// Tests
// ===========================================================================
