//! Input events and the crossterm backend adapter.

pub mod input;

pub use input::{
    Event, EventTranslator, EventType, EventValue, Key, Modifiers, MouseButton, TimerId,
};
