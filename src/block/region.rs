//! A region: the blocks drawn in one area plus its single active widget.

use crate::error::{Result, UiError};
use crate::geometry::Point;
use crate::handler::data::ActiveButton;
use crate::handler::InteractionState;
use crate::widget::{Widget, WidgetFlags};

use super::{Block, WidgetId, WidgetRef};

/// Blocks of one screen area, topmost last.
#[derive(Default)]
pub struct Region {
    pub blocks: Vec<Block>,
    pub(crate) active: Option<ActiveButton>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.add_block(block);
        self
    }

    /// Add a block on top; returns its index.
    pub fn add_block(&mut self, block: Block) -> usize {
        self.blocks.push(block);
        self.blocks.len() - 1
    }

    pub fn block(&self, name: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.name == name)
    }

    pub fn block_index(&self, name: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.name == name)
    }

    pub fn widget(&self, block: usize, id: WidgetId) -> Option<&Widget> {
        self.blocks.get(block)?.get(id)
    }

    pub fn widget_mut(&mut self, block: usize, id: WidgetId) -> Option<&mut Widget> {
        self.blocks.get_mut(block)?.get_mut(id)
    }

    /// First widget labelled `label` in any block.
    pub fn find_label(&self, label: &str) -> Option<(usize, WidgetId)> {
        self.blocks
            .iter()
            .enumerate()
            .find_map(|(bi, b)| b.find_by_label(label).map(|id| (bi, id)))
    }

    /// Topmost interactive widget under the window-space `pos`.
    pub fn find_widget_at(&self, pos: Point) -> Option<(usize, WidgetId)> {
        self.blocks.iter().enumerate().rev().find_map(|(bi, b)| {
            if b.flags.contains(super::BlockFlags::CLIP_EVENTS) && !b.contains_point(pos) {
                return None;
            }
            b.widget_at(b.window_to_block(pos)).map(|id| (bi, id))
        })
    }

    /// Whether the window-space `pos` is inside any block.
    pub fn contains_point(&self, pos: Point) -> bool {
        self.blocks.iter().any(|b| b.contains_point(pos))
    }

    // ── References ───────────────────────────────────────────────────

    pub fn widget_ref(&self, block: usize, id: WidgetId) -> Option<WidgetRef> {
        let b = self.blocks.get(block)?;
        b.contains(id).then(|| b.widget_ref(id))
    }

    /// Resolve a reference; `None` once its block was rebuilt.
    pub fn resolve(&self, r: WidgetRef) -> Option<(usize, WidgetId)> {
        let bi = self.blocks.iter().position(|b| b.generation() == r.generation)?;
        self.blocks[bi].contains(r.id).then_some((bi, r.id))
    }

    // ── Active widget ────────────────────────────────────────────────

    /// Location of the active widget.
    pub fn active_widget(&self) -> Option<(usize, WidgetId)> {
        self.active.as_ref().map(|a| (a.block, a.widget))
    }

    pub fn active_state(&self) -> Option<InteractionState> {
        self.active.as_ref().map(|a| a.data.state)
    }

    /// Count widgets flagged active; more than one is an invariant violation.
    pub fn verify_single_active(&self) -> Result<()> {
        let n = self
            .blocks
            .iter()
            .flat_map(|b| b.iter())
            .filter(|(_, w)| w.flags.contains(WidgetFlags::ACTIVE))
            .count();
        if n > 1 {
            return Err(UiError::MultipleActive(n));
        }
        Ok(())
    }

    /// Enable or disable tooltips in every block.
    pub(crate) fn set_tooltips(&mut self, enable: bool) {
        for b in &mut self.blocks {
            b.tooltip_disabled = !enable;
        }
    }

    pub(crate) fn tooltips_disabled(&self, block: usize) -> bool {
        self.blocks.get(block).is_none_or(|b| b.tooltip_disabled)
    }
}

impl std::fmt::Debug for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Region")
            .field("blocks", &self.blocks)
            .field("active", &self.active_widget())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn region() -> Region {
        let a = Block::new("a").with(Widget::button("A").with_rect(Rect::new(0.0, 0.0, 50.0, 20.0)));
        let b = Block::new("b")
            .with(Widget::button("B").with_rect(Rect::new(0.0, 0.0, 50.0, 20.0)))
            .with_offset(Point::new(0.0, 100.0));
        Region::new().with_block(a).with_block(b)
    }

    #[test]
    fn hit_test_uses_block_offsets() {
        let r = region();
        let (bi, id) = r.find_widget_at(Point::new(10.0, 110.0)).unwrap();
        assert_eq!(bi, 1);
        assert_eq!(r.widget(bi, id).unwrap().label, "B");
        assert!(r.find_widget_at(Point::new(10.0, 50.0)).is_none());
    }

    #[test]
    fn references_die_with_their_block() {
        let mut r = region();
        let (bi, id) = r.find_label("A").unwrap();
        let wref = r.widget_ref(bi, id).unwrap();
        assert_eq!(r.resolve(wref), Some((0, id)));
        r.blocks[0] = Block::new("a").with(Widget::button("A"));
        assert_eq!(r.resolve(wref), None);
    }

    #[test]
    fn two_active_flags_are_rejected() {
        let mut r = region();
        for b in &mut r.blocks {
            for (_, w) in b.iter_mut() {
                w.flags.insert(WidgetFlags::ACTIVE);
            }
        }
        assert!(matches!(r.verify_single_active(), Err(UiError::MultipleActive(2))));
    }
}
