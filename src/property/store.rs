//! The property store collaborator and an in-memory implementation.
//!
//! Widgets bound through [`PropertyHandle`] read and write the host's typed
//! attribute database via [`PropertyStore`]. [`MemoryStore`] is a complete
//! store backed by a `HashMap`, used by tests and small hosts.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::value::{PropertyKind, ScaleType, UnitType, Value, ValueType};

// ---------------------------------------------------------------------------
// PropertyHandle
// ---------------------------------------------------------------------------

/// Address of a property value: owning object path, property name and an
/// optional array element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyHandle {
    pub owner: String,
    pub prop: String,
    pub index: Option<usize>,
}

impl PropertyHandle {
    pub fn new(owner: impl Into<String>, prop: impl Into<String>) -> Self {
        Self { owner: owner.into(), prop: prop.into(), index: None }
    }

    /// Address a single array element.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Same owner and property, ignoring the element index.
    pub fn same_property(&self, other: &PropertyHandle) -> bool {
        self.owner == other.owner && self.prop == other.prop
    }

    /// The same property and index on another owner.
    pub fn on_owner(&self, owner: impl Into<String>) -> Self {
        Self { owner: owner.into(), prop: self.prop.clone(), index: self.index }
    }
}

impl fmt::Display for PropertyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.prop)?;
        if let Some(i) = self.index {
            write!(f, "[{i}]")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PropertyInfo
// ---------------------------------------------------------------------------

/// Static description of a property: type, ranges and UI hints.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo {
    pub kind: PropertyKind,
    pub value_type: ValueType,
    pub hard_min: f64,
    pub hard_max: f64,
    pub soft_min: f64,
    pub soft_max: f64,
    /// Click step; floats use hundredths (a step of 1 means 0.01).
    pub step: f64,
    pub precision: usize,
    pub unit: UnitType,
    pub scale: ScaleType,
    /// Multi-drag edits scale peers instead of offsetting them.
    pub proportional: bool,
    pub read_only: bool,
    /// Allowed values of an enum property, as `(value, label)`.
    pub items: Vec<(i64, String)>,
}

impl PropertyInfo {
    fn base(kind: PropertyKind, value_type: ValueType) -> Self {
        Self {
            kind,
            value_type,
            hard_min: f64::from(f32::MIN),
            hard_max: f64::from(f32::MAX),
            soft_min: f64::from(f32::MIN),
            soft_max: f64::from(f32::MAX),
            step: 1.0,
            precision: 3,
            unit: UnitType::None,
            scale: ScaleType::Linear,
            proportional: false,
            read_only: false,
            items: Vec::new(),
        }
    }

    pub fn float() -> Self {
        Self::base(PropertyKind::Float, ValueType::Float)
    }

    pub fn double() -> Self {
        Self::base(PropertyKind::Float, ValueType::Double)
    }

    pub fn int() -> Self {
        let mut info = Self::base(PropertyKind::Int, ValueType::Int);
        info.hard_min = f64::from(i32::MIN);
        info.hard_max = f64::from(i32::MAX);
        info.soft_min = info.hard_min;
        info.soft_max = info.hard_max;
        info.precision = 0;
        info
    }

    pub fn boolean() -> Self {
        let mut info = Self::base(PropertyKind::Bool, ValueType::Bool);
        info.hard_min = 0.0;
        info.hard_max = 1.0;
        info.soft_min = 0.0;
        info.soft_max = 1.0;
        info.precision = 0;
        info
    }

    pub fn string() -> Self {
        Self::base(PropertyKind::String, ValueType::String)
    }

    pub fn token() -> Self {
        Self::base(PropertyKind::String, ValueType::Token)
    }

    /// An enum stored as an integer.
    pub fn enumeration<S: Into<String>>(items: impl IntoIterator<Item = (i64, S)>) -> Self {
        let mut info = Self::base(PropertyKind::Enum, ValueType::Int);
        info.items = items.into_iter().map(|(v, s)| (v, s.into())).collect();
        let lo = info.items.iter().map(|(v, _)| *v).min().unwrap_or(0) as f64;
        let hi = info.items.iter().map(|(v, _)| *v).max().unwrap_or(0) as f64;
        info.hard_min = lo;
        info.hard_max = hi;
        info.soft_min = lo;
        info.soft_max = hi;
        info.precision = 0;
        info
    }

    /// A three-component float vector (colors, directions).
    pub fn vec3() -> Self {
        let mut info = Self::base(PropertyKind::Float, ValueType::Vec3);
        info.hard_min = 0.0;
        info.hard_max = 1.0;
        info.soft_min = 0.0;
        info.soft_max = 1.0;
        info
    }

    /// Set both hard and soft ranges.
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.hard_min = min;
        self.hard_max = max;
        self.soft_min = min;
        self.soft_max = max;
        self
    }

    /// Narrow the soft range only.
    pub fn soft_range(mut self, min: f64, max: f64) -> Self {
        self.soft_min = min.max(self.hard_min);
        self.soft_max = max.min(self.hard_max);
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn unit(mut self, unit: UnitType) -> Self {
        self.unit = unit;
        self
    }

    pub fn scale(mut self, scale: ScaleType) -> Self {
        self.scale = scale;
        self
    }

    pub fn proportional(mut self) -> Self {
        self.proportional = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Whether values of this property are numbers on a range.
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, PropertyKind::Bool | PropertyKind::Int | PropertyKind::Float | PropertyKind::Enum)
    }
}

// ---------------------------------------------------------------------------
// PropertyStore
// ---------------------------------------------------------------------------

/// Errors from property access.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    #[error("property `{0}` not found")]
    NotFound(String),
    #[error("cannot assign a {found} value to a {expected} property")]
    TypeMismatch { expected: ValueType, found: ValueType },
    #[error("index {0} out of range")]
    IndexOutOfRange(usize),
    #[error("property `{0}` is read-only")]
    ReadOnly(String),
}

/// The host's typed attribute database.
pub trait PropertyStore {
    /// Read the value at `handle`.
    fn get(&self, handle: &PropertyHandle) -> Result<Value, PropertyError>;

    /// Write `value` at `handle`, coercing to the declared type.
    fn set(&mut self, handle: &PropertyHandle, value: Value) -> Result<(), PropertyError>;

    /// Describe the property at `handle`.
    fn info(&self, handle: &PropertyHandle) -> Result<PropertyInfo, PropertyError>;

    /// `type(prop)`.
    fn kind(&self, handle: &PropertyHandle) -> Result<PropertyKind, PropertyError> {
        Ok(self.info(handle)?.kind)
    }

    /// Signal that a committed edit changed `handle`; dependents re-evaluate.
    fn notify_update(&mut self, handle: &PropertyHandle);

    /// The same property on every other selected owner.
    fn selected_others(&self, _handle: &PropertyHandle) -> Vec<PropertyHandle> {
        Vec::new()
    }
}

/// Shared record of `notify_update` calls.
pub type UpdateLog = Rc<RefCell<Vec<PropertyHandle>>>;

struct Entry {
    info: PropertyInfo,
    value: Value,
}

/// In-memory [`PropertyStore`].
#[derive(Default)]
pub struct MemoryStore {
    entries: HashMap<(String, String), Entry>,
    selection: Vec<String>,
    updates: UpdateLog,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, owner: &str, prop: &str, info: PropertyInfo, value: Value) -> Self {
        self.insert(owner, prop, info, value);
        self
    }

    /// Declare a property with its initial value.
    pub fn insert(&mut self, owner: &str, prop: &str, info: PropertyInfo, value: Value) {
        self.entries.insert((owner.to_owned(), prop.to_owned()), Entry { info, value });
    }

    /// Set the selected owners, in order.
    pub fn select<S: AsRef<str>>(&mut self, owners: &[S]) {
        self.selection = owners.iter().map(|s| s.as_ref().to_owned()).collect();
    }

    /// Handle onto the `notify_update` log; stays valid after the store is boxed.
    pub fn update_log(&self) -> UpdateLog {
        Rc::clone(&self.updates)
    }

    fn entry(&self, handle: &PropertyHandle) -> Result<&Entry, PropertyError> {
        self.entries
            .get(&(handle.owner.clone(), handle.prop.clone()))
            .ok_or_else(|| PropertyError::NotFound(handle.to_string()))
    }
}

fn clamp_numeric(value: Value, info: &PropertyInfo) -> Value {
    let clamp = |f: f64| f.clamp(info.hard_min, info.hard_max);
    match value {
        Value::Int(i) => Value::Int(clamp(i as f64).round() as i64),
        Value::Float(f) => Value::Float(clamp(f64::from(f)) as f32),
        Value::Double(d) => Value::Double(clamp(d)),
        Value::Vec3(v) => Value::Vec3(v.map(|c| clamp(f64::from(c)) as f32)),
        other => other,
    }
}

impl PropertyStore for MemoryStore {
    fn get(&self, handle: &PropertyHandle) -> Result<Value, PropertyError> {
        let entry = self.entry(handle)?;
        match (handle.index, &entry.value) {
            (None, value) => Ok(value.clone()),
            (Some(i), Value::Vec3(v)) => {
                v.get(i).map(|c| Value::Float(*c)).ok_or(PropertyError::IndexOutOfRange(i))
            }
            (Some(i), _) => Err(PropertyError::IndexOutOfRange(i)),
        }
    }

    fn set(&mut self, handle: &PropertyHandle, value: Value) -> Result<(), PropertyError> {
        let key = (handle.owner.clone(), handle.prop.clone());
        let entry = self
            .entries
            .get_mut(&key)
            .ok_or_else(|| PropertyError::NotFound(handle.to_string()))?;
        if entry.info.read_only {
            return Err(PropertyError::ReadOnly(handle.to_string()));
        }
        let found = value.value_type();
        match (handle.index, &mut entry.value) {
            (Some(i), Value::Vec3(v)) => {
                let slot = v.get_mut(i).ok_or(PropertyError::IndexOutOfRange(i))?;
                let f = value.as_f64().ok_or(PropertyError::TypeMismatch {
                    expected: ValueType::Float,
                    found,
                })?;
                *slot = f.clamp(entry.info.hard_min, entry.info.hard_max) as f32;
                Ok(())
            }
            (Some(i), _) => Err(PropertyError::IndexOutOfRange(i)),
            (None, current) => {
                let expected = entry.info.value_type;
                let coerced = value
                    .coerce(expected)
                    .ok_or(PropertyError::TypeMismatch { expected, found })?;
                *current = clamp_numeric(coerced, &entry.info);
                Ok(())
            }
        }
    }

    fn info(&self, handle: &PropertyHandle) -> Result<PropertyInfo, PropertyError> {
        Ok(self.entry(handle)?.info.clone())
    }

    fn notify_update(&mut self, handle: &PropertyHandle) {
        self.updates.borrow_mut().push(handle.clone());
    }

    fn selected_others(&self, handle: &PropertyHandle) -> Vec<PropertyHandle> {
        if !self.selection.iter().any(|o| *o == handle.owner) {
            return Vec::new();
        }
        self.selection
            .iter()
            .filter(|o| **o != handle.owner)
            .filter(|o| self.entries.contains_key(&((*o).clone(), handle.prop.clone())))
            .map(|o| handle.on_owner(o.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with("/Cube", "size", PropertyInfo::float().range(0.0, 1.0), Value::Float(0.5))
            .with("/Cube", "color", PropertyInfo::vec3(), Value::Vec3([0.1, 0.2, 0.3]))
            .with("/Cube", "name", PropertyInfo::string(), Value::String("Cube".into()))
            .with("/Sphere", "size", PropertyInfo::float().range(0.0, 1.0), Value::Float(0.25))
    }

    // ── Handles ──────────────────────────────────────────────────────

    #[test]
    fn handle_display() {
        let h = PropertyHandle::new("/Cube", "color").with_index(2);
        assert_eq!(h.to_string(), "/Cube.color[2]");
    }

    #[test]
    fn handle_same_property_ignores_index() {
        let a = PropertyHandle::new("/Cube", "color").with_index(0);
        let b = PropertyHandle::new("/Cube", "color").with_index(1);
        assert!(a.same_property(&b));
        assert!(!a.same_property(&PropertyHandle::new("/Sphere", "color")));
    }

    // ── Get / set ────────────────────────────────────────────────────

    #[test]
    fn get_scalar_and_element() {
        let s = store();
        assert_eq!(s.get(&PropertyHandle::new("/Cube", "size")), Ok(Value::Float(0.5)));
        assert_eq!(
            s.get(&PropertyHandle::new("/Cube", "color").with_index(1)),
            Ok(Value::Float(0.2))
        );
        assert_eq!(
            s.get(&PropertyHandle::new("/Cube", "color").with_index(3)),
            Err(PropertyError::IndexOutOfRange(3))
        );
    }

    #[test]
    fn set_coerces_and_clamps() {
        let mut s = store();
        let h = PropertyHandle::new("/Cube", "size");
        s.set(&h, Value::Double(1.7)).unwrap();
        assert_eq!(s.get(&h), Ok(Value::Float(1.0)));
    }

    #[test]
    fn set_type_mismatch() {
        let mut s = store();
        let h = PropertyHandle::new("/Cube", "size");
        assert_eq!(
            s.set(&h, Value::Vec3([0.0; 3])),
            Err(PropertyError::TypeMismatch { expected: ValueType::Float, found: ValueType::Vec3 })
        );
    }

    #[test]
    fn set_read_only() {
        let mut s = MemoryStore::new().with("/A", "x", PropertyInfo::int().read_only(), Value::Int(1));
        let h = PropertyHandle::new("/A", "x");
        assert!(matches!(s.set(&h, Value::Int(2)), Err(PropertyError::ReadOnly(_))));
    }

    #[test]
    fn missing_property() {
        let s = store();
        assert!(matches!(
            s.get(&PropertyHandle::new("/Cube", "mass")),
            Err(PropertyError::NotFound(_))
        ));
    }

    #[test]
    fn kind_defaults_to_info() {
        let s = store();
        assert_eq!(s.kind(&PropertyHandle::new("/Cube", "name")), Ok(PropertyKind::String));
    }

    // ── Updates and selection ────────────────────────────────────────

    #[test]
    fn notify_update_is_logged() {
        let mut s = store();
        let log = s.update_log();
        s.notify_update(&PropertyHandle::new("/Cube", "size"));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn selected_others_requires_owner_selected() {
        let mut s = store();
        let h = PropertyHandle::new("/Cube", "size");
        assert!(s.selected_others(&h).is_empty());
        s.select(&["/Cube", "/Sphere", "/Light"]);
        assert_eq!(s.selected_others(&h), vec![PropertyHandle::new("/Sphere", "size")]);
    }

    #[test]
    fn enumeration_range_from_items() {
        let info = PropertyInfo::enumeration([(0, "X"), (1, "Y"), (2, "Z")]);
        assert_eq!(info.hard_min, 0.0);
        assert_eq!(info.hard_max, 2.0);
        assert!(info.is_numeric());
    }
}
