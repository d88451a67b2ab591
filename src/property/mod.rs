//! Property access: typed values, the store collaborator and value bindings.

pub mod binding;
pub mod store;
pub mod value;

pub use binding::{RawAccessor, RawSlot, RawSlots, RawType, ValueBinding};
pub use store::{
    MemoryStore, PropertyError, PropertyHandle, PropertyInfo, PropertyStore, UpdateLog,
};
pub use value::{PropertyKind, ScaleType, UnitType, Value, ValueType};
