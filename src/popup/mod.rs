//! Popup stack: floating blocks, nested menus and their return values.
//!
//! Popups form a true stack of [`PopupFrame`]s. Frame `i + 1` is always the
//! child opened by the active widget of frame `i`; frame 0 is either opened
//! by a widget of the main region or invoked directly by the host. Return
//! values travel from a child to its parent through the child frame's
//! [`PopupReturn`] slots, read on the next pass down the stack.
//!
//! While a frame's region is handled it is taken out of the stack (see
//! [`with_frame_region`]), the same way the active widget's data is taken
//! out of its region.

pub mod invoke;
pub mod menu;
pub mod pie;

use std::collections::HashMap;
use std::fmt;
use std::ops::{BitAnd, BitOr};
use std::rc::Rc;

use log::{debug, warn};

pub use invoke::PopupInvocation;

use crate::block::{Block, BlockFlags, Region, WidgetRef};
use crate::geometry::{Point, Rect};
use crate::handler::activate::{activate_init, free_active};
use crate::handler::after::CallbackCtx;
use crate::handler::data::ActiveButton;
use crate::handler::{ActivationType, HandlerCtx, Level};
use crate::host::{ModalHandler, OperatorCall};
use crate::property::{PropertyKind, Value};
use crate::widget::{Widget, WidgetKind};

/// Builds the right-click menu for a widget; `None` means no menu.
pub type ContextMenuFn = Rc<dyn Fn(&Widget) -> Option<Block>>;
/// Called once with the final return value of an invoked popup.
pub type PopupCallback = Box<dyn FnOnce(&mut CallbackCtx<'_>, &PopupReturn)>;
/// Called when an invoked popup is torn down.
pub type PopupFreeFn = Box<dyn FnOnce()>;

// ---------------------------------------------------------------------------
// ReturnFlags
// ---------------------------------------------------------------------------

/// Outcome a popup reports to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ReturnFlags(pub u8);

impl ReturnFlags {
    pub const NONE: ReturnFlags = ReturnFlags(0);
    pub const CANCEL: ReturnFlags = ReturnFlags(1 << 0);
    pub const OK: ReturnFlags = ReturnFlags(1 << 1);
    /// The pointer left; the parent decides what that means.
    pub const OUT: ReturnFlags = ReturnFlags(1 << 2);
    /// Handle the event in the parent too.
    pub const OUT_PARENT: ReturnFlags = ReturnFlags(1 << 3);
    /// Apply without closing.
    pub const UPDATE: ReturnFlags = ReturnFlags(1 << 4);
    pub const POPUP_OK: ReturnFlags = ReturnFlags(1 << 5);

    pub fn contains(self, other: ReturnFlags) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn intersects(self, other: ReturnFlags) -> bool {
        (self.0 & other.0) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: ReturnFlags) {
        self.0 |= other.0;
    }
}

impl BitOr for ReturnFlags {
    type Output = ReturnFlags;
    fn bitor(self, rhs: Self) -> Self::Output {
        ReturnFlags(self.0 | rhs.0)
    }
}

impl BitAnd for ReturnFlags {
    type Output = ReturnFlags;
    fn bitand(self, rhs: Self) -> Self::Output {
        ReturnFlags(self.0 & rhs.0)
    }
}

/// Return-value slots of one frame, written by the frame's own widgets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PopupReturn {
    pub menuretval: ReturnFlags,
    /// `retval` of the widget that closed the popup.
    pub butretval: i32,
    /// Value chosen in a menu.
    pub retvalue: Option<Value>,
    /// Color chosen in a picker.
    pub retvec: Option<[f32; 3]>,
    /// Closed by Escape; every ancestor cancels too.
    pub escape: bool,
}

impl PopupReturn {
    /// The popup is done (accepted, canceled or left).
    pub fn is_final(&self) -> bool {
        self.menuretval.intersects(ReturnFlags::OK | ReturnFlags::CANCEL | ReturnFlags::OUT)
    }

    pub fn is_ok(&self) -> bool {
        self.menuretval.intersects(ReturnFlags::OK | ReturnFlags::POPUP_OK)
    }
}

// ---------------------------------------------------------------------------
// PopupFrame / PopupStack
// ---------------------------------------------------------------------------

/// One floating block on the stack.
pub struct PopupFrame {
    pub region: Region,
    /// Widget whose menu this is; `None` for popups invoked by the host.
    pub owner: Option<WidgetRef>,
    pub ret: PopupReturn,
    /// Operator run by every commit inside the popup.
    pub popup_op: Option<OperatorCall>,
    pub(crate) free: Option<PopupFreeFn>,
    pub(crate) on_success: Option<PopupCallback>,
    pub(crate) on_cancel: Option<PopupCallback>,
}

impl PopupFrame {
    pub fn new(block: Block) -> Self {
        Self {
            region: Region::new().with_block(block),
            owner: None,
            ret: PopupReturn::default(),
            popup_op: None,
            free: None,
            on_success: None,
            on_cancel: None,
        }
    }

    pub fn block(&self) -> Option<&Block> {
        self.region.blocks.first()
    }

    fn flags(&self) -> BlockFlags {
        self.block().map_or(BlockFlags::NONE, |b| b.flags)
    }
}

impl fmt::Debug for PopupFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopupFrame")
            .field("block", &self.block().map(|b| &b.name))
            .field("owner", &self.owner)
            .field("ret", &self.ret)
            .finish_non_exhaustive()
    }
}

/// The open popups, root first.
#[derive(Debug, Default)]
pub struct PopupStack {
    frames: Vec<PopupFrame>,
    /// Last chosen item label per block hash.
    memory: HashMap<u64, String>,
}

impl PopupStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, i: usize) -> Option<&PopupFrame> {
        self.frames.get(i)
    }

    pub fn frame_mut(&mut self, i: usize) -> Option<&mut PopupFrame> {
        self.frames.get_mut(i)
    }

    pub fn top(&self) -> Option<&PopupFrame> {
        self.frames.last()
    }

    /// Push a frame; returns its index.
    pub fn push(&mut self, frame: PopupFrame) -> usize {
        self.frames.push(frame);
        self.frames.len() - 1
    }

    pub(crate) fn pop(&mut self) -> Option<PopupFrame> {
        self.frames.pop()
    }

    /// The root popup was invoked by the host rather than opened by a widget.
    pub fn is_floating(&self) -> bool {
        self.frames.first().is_some_and(|f| f.owner.is_none())
    }

    pub fn remember(&mut self, puphash: u64, label: String) {
        self.memory.insert(puphash, label);
    }

    pub fn memory(&self, puphash: u64) -> Option<&str> {
        self.memory.get(&puphash).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Frame access
// ---------------------------------------------------------------------------

/// Run `f` on the region of frame `i` at level `Popup(i)`.
///
/// The region is moved out of the stack for the duration so `f` may still
/// push, inspect or close the frames above it. Returns `None` if the frame
/// does not exist.
pub(crate) fn with_frame_region<R>(
    cx: &mut HandlerCtx<'_>,
    i: usize,
    f: impl FnOnce(&mut HandlerCtx<'_>, &mut Region) -> R,
) -> Option<R> {
    let mut region = std::mem::take(&mut cx.popups.frame_mut(i)?.region);
    let out = cx.at_level(Level::Popup(i), |cx| f(cx, &mut region));
    match cx.popups.frame_mut(i) {
        Some(frame) => frame.region = region,
        None => warn!("popup {i} closed while it was being handled"),
    }
    Some(out)
}

/// Close frame `idx` and every frame above it, innermost first.
pub(crate) fn close_popups(cx: &mut HandlerCtx<'_>, idx: usize) {
    while cx.popups.len() > idx {
        let i = cx.popups.len() - 1;
        let Some(mut frame) = cx.popups.pop() else {
            break;
        };
        cx.at_level(Level::Popup(i), |cx| free_active(cx, &mut frame.region));
        if let Some(free) = frame.free.take() {
            free();
        }
        if i == 0 && frame.owner.is_none() {
            cx.services.window.remove_modal_handler(ModalHandler::Popup);
        }
        debug!("closed popup {i} `{}`", frame.block().map_or("", |b| b.name.as_str()));
    }
    cx.services.window.tag_redraw();
}

/// Highlight the first item of frame `idx` for keyboard use.
pub(crate) fn activate_first_item(cx: &mut HandlerCtx<'_>, idx: usize) {
    with_frame_region(cx, idx, |cx, region| {
        if region.active.is_some() {
            return;
        }
        if let Some(id) = region.blocks.first().and_then(Block::first_interactive) {
            activate_init(cx, region, 0, id, ActivationType::Activate);
        }
    });
}

/// Highlight the remembered item of a POPUP_MEMORY block.
fn highlight_remembered(cx: &mut HandlerCtx<'_>, idx: usize) {
    let Some(block) = cx.popups.frame(idx).and_then(PopupFrame::block) else {
        return;
    };
    if !block.flags.contains(BlockFlags::POPUP_MEMORY) {
        return;
    }
    let Some(id) = cx.popups.memory(block.puphash()).and_then(|label| block.find_by_label(label)) else {
        return;
    };
    with_frame_region(cx, idx, |cx, region| {
        if region.active.is_none() {
            activate_init(cx, region, 0, id, ActivationType::Activate);
        }
    });
}

/// Push `block` as a new frame, placed at `at`, and prepare it for input.
pub(crate) fn push_block(cx: &mut HandlerCtx<'_>, mut block: Block, at: Point, owner: Option<WidgetRef>) -> usize {
    block.flags.insert(BlockFlags::POPUP | BlockFlags::LOOP);
    block.offset = at - Point::new(block.rect.xmin, block.rect.ymin);
    debug!("opening popup `{}` at {at:?}", block.name);
    let mut frame = PopupFrame::new(block);
    frame.owner = owner;
    let idx = cx.popups.push(frame);
    if owner.is_none() && idx == 0 {
        cx.services.window.add_modal_handler(ModalHandler::Popup);
    }
    highlight_remembered(cx, idx);
    cx.services.window.tag_redraw();
    idx
}

// ---------------------------------------------------------------------------
// Child menus
// ---------------------------------------------------------------------------

/// Items of an enum property as menu entries.
fn enum_menu(w: &Widget, items: &[(i64, String)], unit: f32) -> Block {
    let width = w.rect.width().max(unit * 6.0);
    let mut block = Block::menu(format!("{} enum", w.label));
    for (row, (value, name)) in items.iter().enumerate() {
        let y = row as f32 * unit;
        block.add(Widget::menu_item(name.clone(), *value as f64).with_rect(Rect::new(0.0, y, width, unit)));
    }
    block
}

/// Hue circle and value cube editing the swatch's own property.
fn color_picker(w: &Widget, unit: f32) -> Block {
    let size = unit * 6.0;
    let mut block = Block::menu(format!("{} picker", w.label))
        .with_flags(BlockFlags::KEEP_OPEN | BlockFlags::MOVEMOUSE_QUIT);
    for (kind, y) in [(WidgetKind::HsvCircle, 0.0), (WidgetKind::HsvCube, size)] {
        let mut picker = Widget::new(kind, "").with_rect(Rect::new(0.0, y, size, size));
        picker.binding = w.binding.clone();
        picker.value_type = w.value_type;
        block.add(picker);
    }
    block
}

/// Open the menu of the active widget `ab` of `region`. Returns `false` if
/// the widget has nothing to open.
pub(crate) fn open_child(cx: &mut HandlerCtx<'_>, region: &Region, ab: &mut ActiveButton) -> bool {
    let parent_block = &region.blocks[ab.block];
    let Some(w) = parent_block.get(ab.widget) else {
        return false;
    };
    let unit = cx.prefs.unit_y();
    let block = match &w.callbacks.menu_create {
        Some(create) => create(w),
        None => match w.kind {
            WidgetKind::Color => color_picker(w, unit),
            WidgetKind::Menu => {
                let info = w.binding.property().and_then(|h| cx.services.store.info(h).ok());
                match info {
                    Some(info) if info.kind == PropertyKind::Enum && !info.items.is_empty() => {
                        enum_menu(w, &info.items, unit)
                    }
                    _ => return false,
                }
            }
            _ => return false,
        },
    };

    // Submenus open to the side, everything else below.
    let wr = w.rect.translate(parent_block.offset);
    let at = if parent_block.flags.contains(BlockFlags::LOOP) {
        Point::new(wr.xmax, wr.ymin)
    } else {
        Point::new(wr.xmin, wr.ymax)
    };
    let owner = parent_block.widget_ref(ab.widget);

    let next = cx.level.popup_index().map_or(0, |i| i + 1);
    close_popups(cx, next);
    let idx = push_block(cx, block, at, Some(owner));
    ab.data.menu = Some(idx);
    true
}

/// Open the registered context menu for `w` at `at`.
pub(crate) fn open_context_menu(cx: &mut HandlerCtx<'_>, w: &Widget, at: Point) -> bool {
    let Some(create) = cx.context_menu.cloned() else {
        return false;
    };
    let Some(block) = create(w) else {
        return false;
    };
    close_popups(cx, 0);
    push_block(cx, block, at, None);
    true
}
