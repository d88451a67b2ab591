//! Headless testing framework: Pilot and recording collaborators.
//!
//! Use the [`Pilot`] to drive an [`Interface`](crate::Interface) with
//! pointer and keyboard gestures. The doubles in [`mock`] record what the
//! interface asked of the window, operator runtime and undo stack.

pub mod mock;
pub mod pilot;

pub use mock::{recording_services, services, Recorders, RecordingWindow, WindowLog};
pub use pilot::Pilot;
