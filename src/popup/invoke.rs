//! Popups invoked by the host rather than opened by a widget.

use std::fmt;

use crate::block::{Block, BlockFlags};
use crate::error::Result;
use crate::event::EventType;
use crate::geometry::Point;
use crate::handler::after::CallbackCtx;
use crate::handler::HandlerCtx;
use crate::host::OperatorCall;
use crate::layout::{Layout, LayoutNode};
use crate::prefs::UiPreferences;
use crate::widget::Widget;

use super::{close_popups, pie, push_block, PopupReturn};

/// Builds the block of an invoked popup.
pub type PopupCreateFn = Box<dyn FnOnce(&UiPreferences) -> Block>;

/// Everything needed to open a floating popup.
pub struct PopupInvocation {
    pub create: PopupCreateFn,
    pub free: Option<super::PopupFreeFn>,
    /// Run with every commit made inside the popup.
    pub operator: Option<OperatorCall>,
    pub on_success: Option<super::PopupCallback>,
    pub on_cancel: Option<super::PopupCallback>,
    /// Window position of the top-left corner; the pointer when `None`.
    pub position: Option<Point>,
}

impl PopupInvocation {
    pub fn new(create: impl FnOnce(&UiPreferences) -> Block + 'static) -> Self {
        Self { create: Box::new(create), free: None, operator: None, on_success: None, on_cancel: None, position: None }
    }

    pub fn with_free(mut self, free: impl FnOnce() + 'static) -> Self {
        self.free = Some(Box::new(free));
        self
    }

    pub fn with_operator(mut self, call: OperatorCall) -> Self {
        self.operator = Some(call);
        self
    }

    pub fn on_success(mut self, f: impl FnOnce(&mut CallbackCtx<'_>, &PopupReturn) + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_cancel(mut self, f: impl FnOnce(&mut CallbackCtx<'_>, &PopupReturn) + 'static) -> Self {
        self.on_cancel = Some(Box::new(f));
        self
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }
}

impl fmt::Debug for PopupInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopupInvocation")
            .field("operator", &self.operator)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

/// Open `inv` as the root of the popup stack, replacing any open popup.
pub(crate) fn open_floating(cx: &mut HandlerCtx<'_>, inv: PopupInvocation, pointer: Point) -> usize {
    close_popups(cx, 0);
    let PopupInvocation { create, free, operator, on_success, on_cancel, position } = inv;
    let block = create(cx.prefs);
    let idx = push_block(cx, block, position.unwrap_or(pointer), None);
    if let Some(frame) = cx.popups.frame_mut(idx) {
        frame.free = free;
        frame.popup_op = operator;
        frame.on_success = on_success;
        frame.on_cancel = on_cancel;
    }
    idx
}

/// A titled menu with `items` stacked below the title.
pub(crate) fn menu_block(title: &str, items: Vec<Widget>, prefs: &UiPreferences) -> Result<Block> {
    let mut block = Block::menu(title).with_flags(BlockFlags::POPUP_MEMORY);
    let mut rows = Vec::with_capacity(items.len() + 1);
    if !title.is_empty() {
        rows.push(LayoutNode::widget(Widget::label(title)));
    }
    rows.extend(items.into_iter().map(LayoutNode::widget));
    Layout::for_prefs(LayoutNode::column(rows), prefs).apply(&mut block)?;
    Ok(block)
}

/// A pie of `items` centred on `pointer`, triggered by `trigger`. Returns
/// the block and where its corner must go.
pub(crate) fn pie_block(title: &str, items: Vec<Widget>, trigger: EventType, pointer: Point, prefs: &UiPreferences) -> (Block, Point) {
    let mut block = Block::menu(title);
    for w in items {
        block.add(w);
    }
    pie::pie_layout(&mut block, trigger, prefs);
    let corner = pointer + Point::new(block.rect.xmin, block.rect.ymin);
    (block, corner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::WidgetKind;

    #[test]
    fn menu_block_puts_title_first() {
        let prefs = UiPreferences::default();
        let block = menu_block("Add", vec![Widget::menu_item("Cube", 0.0), Widget::menu_item("Sphere", 1.0)], &prefs)
            .unwrap();
        let labels: Vec<_> = block.iter().map(|(_, w)| (w.kind, w.label.as_str())).collect();
        assert_eq!(
            labels,
            [(WidgetKind::Label, "Add"), (WidgetKind::ButtonMenu, "Cube"), (WidgetKind::ButtonMenu, "Sphere")]
        );
        let sphere = block.find_by_label("Sphere").unwrap();
        assert_eq!(block[sphere].rect.ymin, 2.0 * prefs.unit_y());
        assert!(block.flags.contains(BlockFlags::POPUP_MEMORY | BlockFlags::LOOP));
    }

    #[test]
    fn pie_corner_puts_origin_under_pointer() {
        let prefs = UiPreferences::default();
        let pointer = Point::new(300.0, 200.0);
        let (block, corner) =
            pie_block("Mode", vec![Widget::menu_item("A", 0.0)], EventType::Key(crate::event::Key::Tab), pointer, &prefs);
        assert_eq!(corner - Point::new(block.rect.xmin, block.rect.ymin), pointer);
    }
}
