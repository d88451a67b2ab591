//! Typed values exchanged with the property store.

use std::fmt;

/// Declared value type of a property; drives coercion on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Double,
    Token,
    String,
    Vec3,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::Token => "token",
            ValueType::String => "string",
            ValueType::Vec3 => "vec3",
        };
        f.write_str(name)
    }
}

/// Property category as reported by `type(prop)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Bool,
    Int,
    Float,
    String,
    Enum,
    Pointer,
    Collection,
}

/// Unit category of a numeric property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnitType {
    #[default]
    None,
    /// Base unit metres.
    Length,
    /// Edited in degrees.
    Rotation,
    /// Base unit seconds.
    Time,
    Percentage,
}

/// Mapping from a normalized drag fraction to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScaleType {
    #[default]
    Linear,
    Log,
    Cubic,
}

/// A property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f32),
    Double(f64),
    Token(String),
    String(String),
    Vec3([f32; 3]),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Double(_) => ValueType::Double,
            Value::Token(_) => ValueType::Token,
            Value::String(_) => ValueType::String,
            Value::Vec3(_) => ValueType::Vec3,
        }
    }

    /// Numeric view of scalar values; strings parse if they can.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(f64::from(*f)),
            Value::Double(d) => Some(*d),
            Value::Token(s) | Value::String(s) => s.trim().parse().ok(),
            Value::Vec3(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            other => other.as_f64().map(|f| f != 0.0),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Token(s) | Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<[f32; 3]> {
        match self {
            Value::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    /// Build a value of type `ty` from a float.
    pub fn from_f64(ty: ValueType, f: f64) -> Value {
        match ty {
            ValueType::Bool => Value::Bool(f != 0.0),
            ValueType::Int => Value::Int(f.round() as i64),
            ValueType::Float => Value::Float(f as f32),
            ValueType::Token => Value::Token(format!("{}", f.round() as i64)),
            ValueType::String => Value::String(format!("{f}")),
            ValueType::Vec3 => Value::Vec3([f as f32; 3]),
            ValueType::Double => Value::Double(f),
        }
    }

    /// Convert to `ty`, `None` when no sensible conversion exists.
    pub fn coerce(&self, ty: ValueType) -> Option<Value> {
        if self.value_type() == ty {
            return Some(self.clone());
        }
        match (self, ty) {
            (Value::Token(s), ValueType::String) | (Value::String(s), ValueType::String) => {
                Some(Value::String(s.clone()))
            }
            (Value::String(s), ValueType::Token) | (Value::Token(s), ValueType::Token) => {
                Some(Value::Token(s.clone()))
            }
            (Value::Int(i), ValueType::Token) => Some(Value::Token(i.to_string())),
            (Value::Vec3(_), _) | (_, ValueType::Vec3) => None,
            (Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Double(_), ValueType::String) => {
                Some(Value::String(self.to_string()))
            }
            _ => self.as_f64().map(|f| Value::from_f64(ty, f)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", u8::from(*b)),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Token(s) | Value::String(s) => f.write_str(s),
            Value::Vec3([r, g, b]) => write!(f, "[{r}, {g}, {b}]"),
        }
    }
}
