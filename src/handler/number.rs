//! Number fields, sliders, scroll bars and grips.
//!
//! A press starts [`NumEditing`](InteractionState::NumEditing); dragging
//! edits the value through a [`NumDrag`], a click without drag opens the
//! text editor (or steps the value on a number field's side arrows).

use log::{debug, warn};

use crate::block::Region;
use crate::event::{Event, EventType, Key, MouseButton};
use crate::geometry::Point;
use crate::host::{CursorShape, ReportLevel};
use crate::widget::{WidgetFlags, WidgetKind};

use super::activate::activate_state;
use super::data::{ActiveButton, ArrowZone, MultiInit};
use super::numedit::{DragMap, NumDrag, Snap, FLOAT_STEP_SCALE};
use super::{apply, textfield, HandlerCtx, HandlerResult, InteractionState};

use InteractionState as S;

// ---------------------------------------------------------------------------
// Begin / end
// ---------------------------------------------------------------------------

/// Kinds whose drag grabs and wraps the pointer.
fn grabs_pointer(kind: WidgetKind) -> bool {
    matches!(
        kind,
        WidgetKind::Number | WidgetKind::NumberSlider | WidgetKind::HsvCube | WidgetKind::HsvCircle
    )
}

/// Entering numeric editing: snapshot the value and set up the drag.
pub(crate) fn numedit_begin(cx: &mut HandlerCtx<'_>, region: &Region, ab: &mut ActiveButton) {
    let Some(w) = region.widget(ab.block, ab.widget) else {
        return;
    };
    if w.kind.is_vector() {
        match w.read_vec3(cx.services) {
            Ok(v) => {
                ab.data.vec = v;
                ab.data.origvec = v;
            }
            Err(e) => {
                warn!("`{}` has no vector to edit: {e}", w.label);
                ab.data.cancel = true;
                ab.data.drag = None;
                return;
            }
        }
    } else {
        match w.read_f64(cx.services) {
            Ok(v) => {
                ab.data.value = v;
                ab.data.origvalue = v;
                ab.data.startvalue = v;
            }
            Err(e) => {
                warn!("`{}` has no number to edit: {e}", w.label);
                ab.data.cancel = true;
                ab.data.drag = None;
                return;
            }
        }
    }
    let map = DragMap::for_widget(w, ab.data.value, cx.prefs);
    ab.data.drag = Some(NumDrag::new(ab.data.press_pos.x, ab.data.value, map));

    if grabs_pointer(w.kind) {
        cx.services.window.grab_cursor(true);
        ab.data.grabbed = true;
        ab.data.ungrab_pos = Some(ab.data.press_pos);
    }
    if w.kind == WidgetKind::Grip {
        let shape = if w.rect.width() > w.rect.height() { CursorShape::MoveX } else { CursorShape::MoveY };
        cx.services.window.set_cursor(shape);
        ab.data.cursor_changed = true;
    }
}

/// Leaving numeric editing towards `next`.
pub(crate) fn numedit_end(cx: &mut HandlerCtx<'_>, region: &Region, ab: &mut ActiveButton, next: InteractionState) {
    let driven = region.widget(ab.block, ab.widget).is_some_and(|w| w.flags.contains(WidgetFlags::DRIVEN));
    if driven && next != S::TextEditing {
        cx.services.report(ReportLevel::Info, "can't edit driven value");
        ab.data.cancel = true;
    }
    if std::mem::take(&mut ab.data.grabbed) {
        cx.services.window.ungrab_cursor(ab.data.ungrab_pos.take());
    }
    ab.data.drag = None;
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn exit(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton) -> HandlerResult {
    activate_state(cx, region, ab, S::Exit);
    HandlerResult::Break
}

fn cancel_exit(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton) -> HandlerResult {
    ab.data.cancel = true;
    ab.data.escapecancel = true;
    exit(cx, region, ab)
}

/// Side arrow of a number field under the window-space `pos`.
fn arrow_zone(region: &Region, ab: &ActiveButton, pos: Point) -> Option<ArrowZone> {
    let block = &region.blocks[ab.block];
    let rect = block.get(ab.widget)?.rect;
    let p = block.window_to_block(pos);
    let handle = (rect.width() / 3.0).min(rect.height());
    if p.x < rect.xmin + handle {
        Some(ArrowZone::Left)
    } else if p.x > rect.xmax - handle {
        Some(ArrowZone::Right)
    } else {
        None
    }
}

/// Step the value one unit towards `dir` and commit.
fn step_and_exit(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    ab: &mut ActiveButton,
    dir: ArrowZone,
    fine: bool,
) -> HandlerResult {
    let Some(w) = region.widget(ab.block, ab.widget) else {
        return HandlerResult::Continue;
    };
    let step = match (w.is_float(), fine) {
        (true, true) => FLOAT_STEP_SCALE,
        (true, false) => w.number.step * FLOAT_STEP_SCALE,
        (false, true) => 1.0,
        (false, false) => w.number.step.trunc().max(1.0),
    };
    let sign = if dir == ArrowZone::Left { -1.0 } else { 1.0 };
    ab.data.value = w.range.clamp_soft(ab.data.value + sign * step);
    debug!("stepped `{}` to {}", w.label, ab.data.value);
    exit(cx, region, ab)
}

/// Start dragging from a left press.
fn drag_begin(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton, event: &Event) -> HandlerResult {
    ab.data.press_pos = event.mouse_pos;
    ab.data.multi.drag_start = event.mouse_pos;
    ab.data.multi.last = event.mouse_pos;
    activate_state(cx, region, ab, S::NumEditing);
    if ab.data.drag.is_none() {
        return exit(cx, region, ab);
    }
    HandlerResult::Break
}

fn ctrl_wheel(event: &Event) -> Option<ArrowZone> {
    if !event.ctrl() {
        return None;
    }
    match event.kind {
        EventType::WheelDown => Some(ArrowZone::Left),
        EventType::WheelUp => Some(ArrowZone::Right),
        _ => None,
    }
}

/// Highlight handling shared by number fields and sliders.
fn numeric_highlight(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    ab: &mut ActiveButton,
    event: &Event,
    slider: bool,
) -> HandlerResult {
    if event.is_mouse_move() && !slider {
        ab.data.arrow = arrow_zone(region, ab, event.mouse_pos);
        return HandlerResult::Continue;
    }
    if (event.is_press(MouseButton::Left) || event.is_confirm()) && event.ctrl() {
        activate_state(cx, region, ab, S::TextEditing);
        return HandlerResult::Break;
    }
    if event.is_press(MouseButton::Left) {
        return drag_begin(cx, region, ab, event);
    }
    if event.is_confirm() {
        return click(cx, region, ab, event.mouse_pos, slider);
    }
    if let Some(dir) = ctrl_wheel(event) {
        return step_and_exit(cx, region, ab, dir, slider);
    }
    if event.is_key_press(Key::Char('-')) && event.ctrl() {
        if let Some(w) = region.widget(ab.block, ab.widget) {
            ab.data.value = w.range.clamp_hard(-ab.data.value);
        }
        return exit(cx, region, ab);
    }
    HandlerResult::Continue
}

/// A click without drag: side arrows step, anywhere else edits as text.
fn click(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    ab: &mut ActiveButton,
    pos: Point,
    slider: bool,
) -> HandlerResult {
    if !slider {
        if let Some(dir) = arrow_zone(region, ab, pos) {
            return step_and_exit(cx, region, ab, dir, false);
        }
    }
    activate_state(cx, region, ab, S::TextEditing);
    HandlerResult::Break
}

/// Dragging state shared by number fields and sliders.
fn numeric_editing(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    ab: &mut ActiveButton,
    event: &Event,
    slider: bool,
) -> HandlerResult {
    if event.is_key_press(Key::Escape) || event.is_press(MouseButton::Right) {
        return cancel_exit(cx, region, ab);
    }
    if event.is_release(MouseButton::Left) {
        let changed = ab.data.drag.as_ref().is_some_and(|d| d.changed);
        if changed && ab.data.multi.init != MultiInit::Setup {
            return exit(cx, region, ab);
        }
        // Multi-drag sweeps that never went sideways end in text editing.
        if changed {
            return click(cx, region, ab, ab.data.press_pos, true);
        }
        return click(cx, region, ab, event.mouse_pos, slider);
    }
    if event.is_mouse_move() {
        drag_motion(cx, region, ab, event, slider);
    }
    HandlerResult::Break
}

fn drag_motion(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton, event: &Event, slider: bool) {
    let Some(w) = region.widget(ab.block, ab.widget) else {
        return;
    };
    let (is_float, width) = (w.is_float(), w.rect.width());
    let hold = cx.prefs.multi_drag && matches!(ab.data.multi.init, MultiInit::Unset | MultiInit::Setup);
    let Some(drag) = ab.data.drag.as_mut() else {
        return;
    };
    let x = event.mouse_pos.x;
    if !drag.update_lock(x, hold) {
        return;
    }
    let snap = Snap::from_modifiers(event.ctrl(), event.shift());
    let next = if slider {
        drag.slider_step(x, width, ab.data.value, is_float, event.shift(), snap)
    } else {
        let fac = if event.shift() { 0.1 } else { 1.0 };
        drag.number_step(x, ab.data.value, is_float, fac, snap, cx.prefs.dpi_fac)
    };
    if let Some(v) = next {
        ab.data.value = v;
        apply::apply_button(cx, region, ab, true);
    }
}

// ---------------------------------------------------------------------------
// Kind handlers
// ---------------------------------------------------------------------------

fn numeric(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton, event: &Event, slider: bool) -> HandlerResult {
    match ab.data.state {
        S::Highlight => numeric_highlight(cx, region, ab, event, slider),
        S::NumEditing => numeric_editing(cx, region, ab, event, slider),
        S::TextEditing | S::TextSelecting => textfield::edit_event(cx, region, ab, event),
        _ => HandlerResult::Continue,
    }
}

pub(crate) fn number(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton, event: &Event) -> HandlerResult {
    numeric(cx, region, ab, event, false)
}

pub(crate) fn slider(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton, event: &Event) -> HandlerResult {
    numeric(cx, region, ab, event, true)
}

/// Scroll bars and grips: the value follows the pointer along the long axis.
pub(crate) fn scroll(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton, event: &Event) -> HandlerResult {
    match ab.data.state {
        S::Highlight if event.is_press(MouseButton::Left) => {
            ab.data.press_pos = event.mouse_pos;
            activate_state(cx, region, ab, S::NumEditing);
            if ab.data.drag.is_none() {
                return exit(cx, region, ab);
            }
            HandlerResult::Break
        }
        S::NumEditing => {
            if event.is_key_press(Key::Escape) || event.is_press(MouseButton::Right) {
                return cancel_exit(cx, region, ab);
            }
            if event.is_release(MouseButton::Left) {
                return exit(cx, region, ab);
            }
            if event.is_mouse_move() {
                let Some(w) = region.widget(ab.block, ab.widget) else {
                    return HandlerResult::Break;
                };
                let horizontal = w.rect.width() > w.rect.height();
                let d = event.mouse_pos - ab.data.press_pos;
                let (delta, size) = if horizontal { (d.x, w.rect.width()) } else { (d.y, w.rect.height()) };
                let span = w.range.hard_max - w.range.hard_min;
                let v = w.range.clamp_hard(ab.data.startvalue + f64::from(delta / size.max(1.0)) * span);
                if v != ab.data.value {
                    ab.data.value = v;
                    apply::apply_button(cx, region, ab, true);
                }
            }
            HandlerResult::Break
        }
        _ => HandlerResult::Continue,
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use crate::geometry::Rect;
    use crate::property::{PropertyHandle, PropertyInfo};
    use crate::widget::Widget;

    fn region_with(w: Widget) -> (Region, ActiveButton) {
        let mut block = Block::new("b").with_offset(Point::new(10.0, 0.0));
        let id = block.add(w.with_rect(Rect::new(0.0, 0.0, 90.0, 20.0)));
        (Region::new().with_block(block), ActiveButton::new(0, id))
    }

    #[test]
    fn arrow_zones_are_a_third_capped_at_the_height() {
        let w = Widget::number("N", PropertyHandle::new("/A", "n"), &PropertyInfo::float());
        let (region, ab) = region_with(w);
        // Handles are min(30, 20) wide; the block is offset by 10.
        assert_eq!(arrow_zone(&region, &ab, Point::new(25.0, 5.0)), Some(ArrowZone::Left));
        assert_eq!(arrow_zone(&region, &ab, Point::new(50.0, 5.0)), None);
        assert_eq!(arrow_zone(&region, &ab, Point::new(85.0, 5.0)), Some(ArrowZone::Right));
    }

    #[test]
    fn only_dragged_fields_grab_the_pointer() {
        assert!(grabs_pointer(WidgetKind::Number));
        assert!(grabs_pointer(WidgetKind::HsvCircle));
        assert!(!grabs_pointer(WidgetKind::Scroll));
        assert!(!grabs_pointer(WidgetKind::UnitVec));
    }
}
