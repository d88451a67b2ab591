//! Value bindings: where a widget's value lives.
//!
//! A widget is bound either to a property-store handle or to a legacy raw
//! numeric slot. Raw slots are never dereferenced directly; reads and writes
//! go through an injected [`RawAccessor`].

use std::collections::HashMap;

use super::store::PropertyHandle;

/// Storage type of a raw slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawType {
    Bool,
    Char,
    Short,
    Int,
    Float,
    Double,
}

impl RawType {
    /// Convert `value` to what the slot can hold.
    pub fn normalize(self, value: f64) -> f64 {
        match self {
            RawType::Bool => f64::from(u8::from(value != 0.0)),
            RawType::Char => value.round().clamp(0.0, 255.0),
            RawType::Short => value.round().clamp(f64::from(i16::MIN), f64::from(i16::MAX)),
            RawType::Int => value.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)),
            RawType::Float => f64::from(value as f32),
            RawType::Double => value,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, RawType::Float | RawType::Double)
    }
}

/// A legacy numeric slot: owner token, field id and storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawSlot {
    pub owner: u64,
    pub field: u32,
    pub ty: RawType,
}

impl RawSlot {
    pub fn new(owner: u64, field: u32, ty: RawType) -> Self {
        Self { owner, field, ty }
    }
}

/// Host access to raw slots.
pub trait RawAccessor {
    /// Current value, `None` when the owner no longer resolves.
    fn read(&self, slot: &RawSlot) -> Option<f64>;

    /// Store `value`; `false` when the owner no longer resolves.
    fn write(&mut self, slot: &RawSlot, value: f64) -> bool;
}

/// In-memory [`RawAccessor`].
#[derive(Debug, Default, Clone)]
pub struct RawSlots {
    values: HashMap<(u64, u32), f64>,
}

impl RawSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite a slot.
    pub fn insert(&mut self, slot: RawSlot, value: f64) {
        self.values.insert((slot.owner, slot.field), slot.ty.normalize(value));
    }

    /// Drop every slot of `owner`, as if it was freed.
    pub fn remove_owner(&mut self, owner: u64) {
        self.values.retain(|(o, _), _| *o != owner);
    }
}

impl RawAccessor for RawSlots {
    fn read(&self, slot: &RawSlot) -> Option<f64> {
        self.values.get(&(slot.owner, slot.field)).copied()
    }

    fn write(&mut self, slot: &RawSlot, value: f64) -> bool {
        match self.values.get_mut(&(slot.owner, slot.field)) {
            Some(v) => {
                *v = slot.ty.normalize(value);
                true
            }
            None => false,
        }
    }
}

/// Where a widget reads and writes its value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ValueBinding {
    /// Display-only or callback-driven widgets.
    #[default]
    None,
    Property(PropertyHandle),
    Raw(RawSlot),
}

impl ValueBinding {
    pub fn is_none(&self) -> bool {
        matches!(self, ValueBinding::None)
    }

    pub fn property(&self) -> Option<&PropertyHandle> {
        match self {
            ValueBinding::Property(h) => Some(h),
            _ => None,
        }
    }

    /// Whether both bindings address the same backing value.
    pub fn same_target(&self, other: &ValueBinding) -> bool {
        match (self, other) {
            (ValueBinding::Property(a), ValueBinding::Property(b)) => a == b,
            (ValueBinding::Raw(a), ValueBinding::Raw(b)) => {
                a.owner == b.owner && a.field == b.field
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_type_normalize() {
        assert_eq!(RawType::Bool.normalize(3.0), 1.0);
        assert_eq!(RawType::Char.normalize(300.0), 255.0);
        assert_eq!(RawType::Int.normalize(2.6), 3.0);
        assert_eq!(RawType::Double.normalize(0.1), 0.1);
    }

    #[test]
    fn raw_slots_read_write() {
        let slot = RawSlot::new(1, 0, RawType::Int);
        let mut slots = RawSlots::new();
        assert_eq!(slots.read(&slot), None);
        assert!(!slots.write(&slot, 1.0));
        slots.insert(slot, 4.0);
        assert!(slots.write(&slot, 6.4));
        assert_eq!(slots.read(&slot), Some(6.0));
    }

    #[test]
    fn raw_slots_remove_owner() {
        let slot = RawSlot::new(9, 2, RawType::Float);
        let mut slots = RawSlots::new();
        slots.insert(slot, 1.0);
        slots.remove_owner(9);
        assert_eq!(slots.read(&slot), None);
    }

    #[test]
    fn same_target() {
        let a = ValueBinding::Property(PropertyHandle::new("/A", "mode"));
        let b = ValueBinding::Property(PropertyHandle::new("/A", "mode"));
        let c = ValueBinding::Raw(RawSlot::new(1, 1, RawType::Int));
        let d = ValueBinding::Raw(RawSlot::new(1, 1, RawType::Short));
        assert!(a.same_target(&b));
        assert!(!a.same_target(&c));
        assert!(c.same_target(&d));
        assert!(!ValueBinding::None.same_target(&ValueBinding::None));
    }
}
