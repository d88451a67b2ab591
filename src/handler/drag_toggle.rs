//! Drag-toggle: press a toggle and drag across others to set them all to
//! the pressed state.
//!
//! The gesture outlives the toggle's own activation, so it is kept on the
//! interface and sees every event until the button is released.

use log::debug;

use crate::block::{Region, WidgetId};
use crate::event::{Event, MouseButton};
use crate::geometry::Point;
use crate::host::ModalHandler;
use crate::widget::{Widget, WidgetFlags};

use super::after::AfterFunc;
use super::data::ActiveButton;
use super::{apply, HandlerCtx, Level};

/// State of a drag-toggle gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragToggle {
    /// State every crossed toggle is set to.
    pub pushed_state: bool,
    /// Centre of the pressed toggle, window space.
    pub start_centre: Point,
    /// Axis held at `start_centre`: `[x, y]`.
    pub xy_lock: [bool; 2],
    /// The lock axis has been chosen.
    pub lock_init: bool,
    pub last: Point,
    /// Region the gesture runs in.
    pub level: Level,
}

impl DragToggle {
    /// Pointer position with the locked axis pinned.
    fn project(&self, pos: Point) -> Point {
        Point::new(
            if self.xy_lock[0] { self.start_centre.x } else { pos.x },
            if self.xy_lock[1] { self.start_centre.y } else { pos.y },
        )
    }
}

fn is_supported(w: &Widget) -> bool {
    w.kind.is_toggle() && w.is_interactive()
}

/// Start a gesture from the active toggle, which was just flipped to
/// `pushed_state`.
pub(crate) fn start(cx: &mut HandlerCtx<'_>, region: &Region, ab: &ActiveButton, pushed_state: bool) {
    let block = &region.blocks[ab.block];
    let Some(w) = block.get(ab.widget) else {
        return;
    };
    let start_centre = block.block_to_window(w.rect.center());
    debug!("drag-toggle from `{}` to {pushed_state}", w.label);
    *cx.drag_toggle = Some(DragToggle {
        pushed_state,
        start_centre,
        xy_lock: [false; 2],
        lock_init: false,
        last: ab.data.press_pos,
        level: cx.level,
    });
    cx.services.window.add_modal_handler(ModalHandler::Region);
}

/// Feed an event to the running gesture. Returns `true` once it ended.
pub(crate) fn handle(cx: &mut HandlerCtx<'_>, region: &mut Region, event: &Event) -> bool {
    let Some(mut dt) = cx.drag_toggle.take() else {
        return true;
    };
    if event.is_release(MouseButton::Left) {
        cx.services.window.remove_modal_handler(ModalHandler::Region);
        cx.services.window.add_mousemove();
        debug!("drag-toggle done");
        return true;
    }
    if event.is_mouse_move() {
        set_crossed(cx, region, &mut dt, event.mouse_pos);
    }
    *cx.drag_toggle = Some(dt);
    false
}

/// Flip every toggle crossed between the last position and `pos`.
fn set_crossed(cx: &mut HandlerCtx<'_>, region: &mut Region, dt: &mut DragToggle, pos: Point) {
    if !dt.lock_init {
        // The first toggle reached decides which axis is locked.
        let first = region.blocks.iter().find_map(|b| {
            b.iter()
                .filter(|(_, w)| {
                    is_supported(w) && w.rect.translate(b.offset).intersects_segment(dt.last, pos)
                })
                .map(|(_, w)| b.block_to_window(w.rect.center()))
                .find(|c| *c != dt.start_centre)
        });
        if let Some(centre) = first {
            let d = centre - dt.start_centre;
            if d.x.abs() > d.y.abs() {
                dt.xy_lock[1] = true;
            } else {
                dt.xy_lock[0] = true;
            }
            dt.lock_init = true;
        }
    }

    let from = dt.project(dt.last);
    let to = dt.project(pos);
    dt.last = pos;

    let mut hits: Vec<(usize, WidgetId)> = Vec::new();
    for (bi, b) in region.blocks.iter().enumerate() {
        for (id, w) in b.iter() {
            if !is_supported(w) || !w.rect.translate(b.offset).intersects_segment(from, to) {
                continue;
            }
            let on = w.read_f64(cx.services).is_ok_and(|v| w.toggle_is_on(v));
            if on != dt.pushed_state {
                hits.push((bi, id));
            }
        }
    }
    for (bi, id) in hits {
        toggle_one(cx, region, bi, id);
    }
}

fn toggle_one(cx: &mut HandlerCtx<'_>, region: &mut Region, bi: usize, id: WidgetId) {
    let Some(w) = region.widget_mut(bi, id) else {
        return;
    };
    let Ok(value) = w.read_f64(cx.services) else {
        return;
    };
    if let Err(e) = w.write_f64(cx.services, w.toggled(value)) {
        log::warn!("drag-toggle: `{}`: {e}", w.label);
        return;
    }
    w.refresh(cx.services);
    let undo = w.flags.contains(WidgetFlags::UNDO).then(|| w.undo_label());
    let entry = apply::after_func_for(cx, region, bi, id, None);
    let source = entry.source;
    if !entry.is_empty() {
        cx.after.push(entry);
    }
    if undo.is_some() {
        cx.after.push(AfterFunc { source, undo, ..AfterFunc::default() });
    }
    cx.services.window.tag_redraw();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_axis_is_pinned_to_the_start() {
        let dt = DragToggle {
            pushed_state: true,
            start_centre: Point::new(10.0, 10.0),
            xy_lock: [false, true],
            lock_init: true,
            last: Point::ZERO,
            level: Level::Main,
        };
        assert_eq!(dt.project(Point::new(40.0, 23.0)), Point::new(40.0, 10.0));
    }
}
