//! Blocks: ordered widget containers rebuilt every redraw.
//!
//! Widgets live in a [`SlotMap`] keyed by [`WidgetId`]; insertion order is
//! kept separately and doubles as tab order and draw order. Every block gets
//! a fresh generation number, so a [`WidgetRef`] taken before a rebuild
//! never resolves into the new block.

pub mod interaction;
pub mod region;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::ops::{BitAnd, BitOr, Index, IndexMut};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::{new_key_type, SlotMap};

pub use interaction::{BlockInteraction, InteractionHandle, InteractionHandleRef, InteractionParams};
pub use region::Region;

use crate::event::EventType;
use crate::geometry::{Point, Rect};
use crate::handler::after::CallbackCtx;
use crate::widget::{BlockHandleFn, MenuHandleFn, Widget};

new_key_type! {
    /// Key of a widget within its block.
    pub struct WidgetId;
}

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

// ---------------------------------------------------------------------------
// BlockFlags
// ---------------------------------------------------------------------------

/// Block behaviour flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockFlags(pub u32);

impl BlockFlags {
    pub const NONE: BlockFlags = BlockFlags(0);
    /// A popup menu; keyboard navigation loops and widgets highlight on hover.
    pub const LOOP: BlockFlags = BlockFlags(1 << 0);
    /// Stays open after an item is applied.
    pub const KEEP_OPEN: BlockFlags = BlockFlags(1 << 1);
    /// Floating block owned by the popup stack.
    pub const POPUP: BlockFlags = BlockFlags(1 << 2);
    /// Closes when the pointer moves away past the quit margin.
    pub const MOVEMOUSE_QUIT: BlockFlags = BlockFlags(1 << 3);
    /// Pie menu.
    pub const RADIAL: BlockFlags = BlockFlags(1 << 4);
    /// Remembers the last chosen item.
    pub const POPUP_MEMORY: BlockFlags = BlockFlags(1 << 5);
    /// Letter keys choose items by accelerator.
    pub const NUMSELECT: BlockFlags = BlockFlags(1 << 6);
    /// Events outside the block rect are ignored.
    pub const CLIP_EVENTS: BlockFlags = BlockFlags(1 << 7);
    pub const SHOW_SHORTCUT_ALWAYS: BlockFlags = BlockFlags(1 << 8);
    /// Pointer is above the block; items are ordered bottom-up.
    pub const DIRECTION_UP: BlockFlags = BlockFlags(1 << 9);

    pub fn contains(self, other: BlockFlags) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: BlockFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: BlockFlags) {
        self.0 &= !other.0;
    }
}

impl BitOr for BlockFlags {
    type Output = BlockFlags;
    fn bitor(self, rhs: Self) -> Self::Output {
        BlockFlags(self.0 | rhs.0)
    }
}

impl BitAnd for BlockFlags {
    type Output = BlockFlags;
    fn bitand(self, rhs: Self) -> Self::Output {
        BlockFlags(self.0 & rhs.0)
    }
}

// ---------------------------------------------------------------------------
// ButtonGroup / WidgetRef
// ---------------------------------------------------------------------------

/// Visually linked widgets kept together (number + label + decorator).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ButtonGroup {
    pub name: String,
    pub widgets: Vec<WidgetId>,
}

/// Generation-checked reference to a widget, valid until its block is rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetRef {
    pub generation: u64,
    pub id: WidgetId,
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// An ordered container of widgets.
pub struct Block {
    pub name: String,
    widgets: SlotMap<WidgetId, Widget>,
    order: Vec<WidgetId>,
    pub groups: Vec<ButtonGroup>,
    pub flags: BlockFlags,
    /// Block-local bounds; grown to fit widgets as they are added.
    pub rect: Rect,
    /// Block origin in window space.
    pub offset: Point,
    /// Menu buttons in this block open after a single tick.
    pub auto_open: bool,
    pub tooltip_disabled: bool,
    pub handle_func: Option<BlockHandleFn>,
    pub butm_func: Option<MenuHandleFn>,
    pub interaction: Option<BlockInteraction>,
    /// Key that opened a pie menu; its release applies the item.
    pub pie_event: Option<EventType>,
    generation: u64,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            widgets: SlotMap::with_key(),
            order: Vec::new(),
            groups: Vec::new(),
            flags: BlockFlags::NONE,
            rect: Rect::EMPTY,
            offset: Point::ZERO,
            auto_open: false,
            tooltip_disabled: false,
            handle_func: None,
            butm_func: None,
            interaction: None,
            pie_event: None,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// A popup menu block.
    pub fn menu(name: impl Into<String>) -> Self {
        Self::new(name).with_flags(BlockFlags::LOOP | BlockFlags::POPUP | BlockFlags::NUMSELECT)
    }

    pub fn with_flags(mut self, flags: BlockFlags) -> Self {
        self.flags.insert(flags);
        self
    }

    pub fn with_offset(mut self, offset: Point) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_handle_func(mut self, f: impl Fn(&mut CallbackCtx<'_>, i32) + 'static) -> Self {
        self.handle_func = Some(Rc::new(f));
        self
    }

    pub fn with_menu_func(mut self, f: impl Fn(&mut CallbackCtx<'_>, f64) + 'static) -> Self {
        self.butm_func = Some(Rc::new(f));
        self
    }

    pub fn with_interaction(mut self, interaction: BlockInteraction) -> Self {
        self.interaction = Some(interaction);
        self
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, widget: Widget) -> Self {
        self.add(widget);
        self
    }

    /// Append a widget; it goes last in tab order.
    pub fn add(&mut self, widget: Widget) -> WidgetId {
        let rect = widget.rect;
        let id = self.widgets.insert(widget);
        self.order.push(id);
        if rect.width() > 0.0 || rect.height() > 0.0 {
            self.rect = if self.order.len() == 1 { rect } else { self.rect.union(rect) };
        }
        id
    }

    /// Group widgets under `name`.
    pub fn group(&mut self, name: impl Into<String>, widgets: Vec<WidgetId>) {
        self.groups.push(ButtonGroup { name: name.into(), widgets });
    }

    // ── Lookup ───────────────────────────────────────────────────────

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.get_mut(id)
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Widget ids in tab order.
    pub fn ids(&self) -> &[WidgetId] {
        &self.order
    }

    /// Widgets in tab order.
    pub fn iter(&self) -> impl Iterator<Item = (WidgetId, &Widget)> + '_ {
        self.order.iter().filter_map(|id| self.widgets.get(*id).map(|w| (*id, w)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (WidgetId, &mut Widget)> + '_ {
        self.widgets.iter_mut()
    }

    /// First widget matching `pred`, in tab order.
    pub fn find(&self, pred: impl Fn(&Widget) -> bool) -> Option<WidgetId> {
        self.iter().find(|(_, w)| pred(w)).map(|(id, _)| id)
    }

    pub fn find_by_label(&self, label: &str) -> Option<WidgetId> {
        self.find(|w| w.label == label)
    }

    /// Interactive widget under `pos` (block space); later widgets win.
    pub fn widget_at(&self, pos: Point) -> Option<WidgetId> {
        self.order
            .iter()
            .rev()
            .copied()
            .find(|id| self.widgets.get(*id).is_some_and(|w| w.is_interactive() && w.rect.contains(pos)))
    }

    /// Any widget under `pos`, including display-only ones.
    pub fn any_widget_at(&self, pos: Point) -> Option<WidgetId> {
        self.order
            .iter()
            .rev()
            .copied()
            .find(|id| self.widgets.get(*id).is_some_and(|w| w.rect.contains(pos)))
    }

    /// Next interactive widget after `id` in tab order matching `pred`, wrapping.
    pub fn next_matching(
        &self,
        id: WidgetId,
        forward: bool,
        pred: impl Fn(&Widget) -> bool,
    ) -> Option<WidgetId> {
        let pos = self.order.iter().position(|x| *x == id)?;
        let n = self.order.len();
        (1..n)
            .map(|step| if forward { (pos + step) % n } else { (pos + n - step) % n })
            .map(|i| self.order[i])
            .find(|other| self.widgets.get(*other).is_some_and(|w| w.is_interactive() && pred(w)))
    }

    /// First interactive widget in tab order.
    pub fn first_interactive(&self) -> Option<WidgetId> {
        self.find(Widget::is_interactive)
    }

    /// Widget matching `other` by identity, for rebuild continuity.
    pub fn find_same(&self, other: &Widget) -> Option<WidgetId> {
        self.find(|w| w.same_identity(other))
    }

    // ── Coordinates ──────────────────────────────────────────────────

    pub fn window_to_block(&self, p: Point) -> Point {
        p - self.offset
    }

    pub fn block_to_window(&self, p: Point) -> Point {
        p + self.offset
    }

    /// Block bounds in window space.
    pub fn window_rect(&self) -> Rect {
        self.rect.translate(self.offset)
    }

    /// Whether the window-space `p` is inside the block.
    pub fn contains_point(&self, p: Point) -> bool {
        self.rect.contains(self.window_to_block(p))
    }

    /// Recompute `rect` from widget rects.
    pub fn fit_rect(&mut self) {
        let mut rects = self.iter().map(|(_, w)| w.rect);
        if let Some(first) = rects.next() {
            self.rect = rects.fold(first, Rect::union);
        }
    }

    // ── Identity ─────────────────────────────────────────────────────

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn widget_ref(&self, id: WidgetId) -> WidgetRef {
        WidgetRef { generation: self.generation, id }
    }

    /// Hash of the block name; keys the popup memory.
    pub fn puphash(&self) -> u64 {
        let mut h = DefaultHasher::new();
        self.name.hash(&mut h);
        h.finish()
    }
}

impl Index<WidgetId> for Block {
    type Output = Widget;

    /// Panics if `id` is not in this block.
    fn index(&self, id: WidgetId) -> &Widget {
        &self.widgets[id]
    }
}

impl IndexMut<WidgetId> for Block {
    fn index_mut(&mut self, id: WidgetId) -> &mut Widget {
        &mut self.widgets[id]
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("widgets", &self.order.len())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::WidgetKind;

    fn three_buttons() -> (Block, Vec<WidgetId>) {
        let mut b = Block::new("panel");
        let ids = ["A", "B", "C"]
            .iter()
            .enumerate()
            .map(|(i, l)| b.add(Widget::button(*l).with_rect(Rect::new(0.0, i as f32 * 20.0, 100.0, 20.0))))
            .collect();
        (b, ids)
    }

    // ── Order and lookup ─────────────────────────────────────────────

    #[test]
    fn insertion_order_is_tab_order() {
        let (b, ids) = three_buttons();
        assert_eq!(b.ids(), ids.as_slice());
        let labels: Vec<_> = b.iter().map(|(_, w)| w.label.as_str()).collect();
        assert_eq!(labels, ["A", "B", "C"]);
    }

    #[test]
    fn rect_grows_with_widgets() {
        let (b, _) = three_buttons();
        assert_eq!(b.rect, Rect::new(0.0, 0.0, 100.0, 60.0));
    }

    #[test]
    fn widget_at_skips_display_only() {
        let mut b = Block::new("p");
        let btn = b.add(Widget::button("A").with_rect(Rect::new(0.0, 0.0, 50.0, 20.0)));
        b.add(Widget::label("L").with_rect(Rect::new(0.0, 0.0, 50.0, 20.0)));
        assert_eq!(b.widget_at(Point::new(10.0, 10.0)), Some(btn));
        assert!(b.any_widget_at(Point::new(10.0, 10.0)).is_some());
    }

    #[test]
    fn next_matching_wraps() {
        let (b, ids) = three_buttons();
        assert_eq!(b.next_matching(ids[2], true, |_| true), Some(ids[0]));
        assert_eq!(b.next_matching(ids[0], false, |_| true), Some(ids[2]));
        assert_eq!(b.next_matching(ids[0], true, |w| w.kind == WidgetKind::Text), None);
    }

    #[test]
    fn offset_converts_coordinates() {
        let (b, _) = three_buttons();
        let b = b.with_offset(Point::new(100.0, 50.0));
        assert!(b.contains_point(Point::new(150.0, 60.0)));
        assert!(!b.contains_point(Point::new(50.0, 60.0)));
        assert_eq!(b.window_to_block(Point::new(110.0, 55.0)), Point::new(10.0, 5.0));
    }

    // ── Generations ──────────────────────────────────────────────────

    #[test]
    fn generations_are_unique() {
        let a = Block::new("x");
        let b = Block::new("x");
        assert_ne!(a.generation(), b.generation());
        assert_eq!(a.puphash(), b.puphash());
    }

    #[test]
    fn groups_keep_ids() {
        let (mut b, ids) = three_buttons();
        b.group("size", vec![ids[0], ids[1]]);
        assert_eq!(b.groups[0].widgets.len(), 2);
    }
}
