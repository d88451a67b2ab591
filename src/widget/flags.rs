//! Widget state and presentation flags.

use std::ops::{BitAnd, BitOr};

/// Widget flag bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WidgetFlags(pub u32);

impl WidgetFlags {
    pub const NONE: WidgetFlags = WidgetFlags(0);
    /// Drawn pressed.
    pub const SELECT: WidgetFlags = WidgetFlags(1 << 0);
    /// Holds the region's interaction data.
    pub const ACTIVE: WidgetFlags = WidgetFlags(1 << 1);
    /// Was the last widget to exit; tooltips stay quiet over it.
    pub const LAST_ACTIVE: WidgetFlags = WidgetFlags(1 << 2);
    pub const DISABLED: WidgetFlags = WidgetFlags(1 << 3);
    /// Joined to a multi-drag gesture.
    pub const DRAG_MULTI: WidgetFlags = WidgetFlags(1 << 4);
    pub const ANIMATED: WidgetFlags = WidgetFlags(1 << 5);
    /// Value comes from a driver; edits are refused.
    pub const DRIVEN: WidgetFlags = WidgetFlags(1 << 6);
    pub const OVERRIDDEN: WidgetFlags = WidgetFlags(1 << 7);
    /// Commits push an undo step.
    pub const UNDO: WidgetFlags = WidgetFlags(1 << 8);
    /// The bound value equals this widget's choice (toggles on, row chosen).
    pub const ON: WidgetFlags = WidgetFlags(1 << 9);
    /// No tooltip timer.
    pub const NO_TOOLTIP: WidgetFlags = WidgetFlags(1 << 10);

    pub fn contains(self, other: WidgetFlags) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: WidgetFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: WidgetFlags) {
        self.0 &= !other.0;
    }

    pub fn set(&mut self, other: WidgetFlags, on: bool) {
        if on {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }
}

impl BitOr for WidgetFlags {
    type Output = WidgetFlags;
    fn bitor(self, rhs: Self) -> Self::Output {
        WidgetFlags(self.0 | rhs.0)
    }
}

impl BitAnd for WidgetFlags {
    type Output = WidgetFlags;
    fn bitand(self, rhs: Self) -> Self::Output {
        WidgetFlags(self.0 & rhs.0)
    }
}

/// How the widget background is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Emboss {
    #[default]
    Normal,
    None,
    Pulldown,
    Radial,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_remove() {
        let mut f = WidgetFlags::NONE;
        f.insert(WidgetFlags::ACTIVE | WidgetFlags::SELECT);
        assert!(f.contains(WidgetFlags::ACTIVE));
        f.remove(WidgetFlags::SELECT);
        assert!(!f.contains(WidgetFlags::SELECT));
        assert!(f.contains(WidgetFlags::ACTIVE));
    }

    #[test]
    fn set_toggles() {
        let mut f = WidgetFlags::NONE;
        f.set(WidgetFlags::ON, true);
        assert_eq!(f, WidgetFlags::ON);
        f.set(WidgetFlags::ON, false);
        assert!(f.is_empty());
    }
}
