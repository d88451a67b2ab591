//! Direction balls and HSV pickers: the pointer position maps directly to
//! a three-component value.

use crate::block::Region;
use crate::event::{Event, Key, MouseButton};
use crate::geometry::{Point, Rect};
use crate::widget::WidgetKind;

use super::activate::activate_state;
use super::data::ActiveButton;
use super::{apply, HandlerCtx, HandlerResult, InteractionState};

use InteractionState as S;

// ---------------------------------------------------------------------------
// Color space
// ---------------------------------------------------------------------------

pub(crate) fn rgb_to_hsv([r, g, b]: [f32; 3]) -> [f32; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let s = if max > 0.0 { delta / max } else { 0.0 };
    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.0) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };
    [h, s, max]
}

pub(crate) fn hsv_to_rgb([h, s, v]: [f32; 3]) -> [f32; 3] {
    let h6 = h.rem_euclid(1.0) * 6.0;
    let c = v * s;
    let x = c * (1.0 - (h6.rem_euclid(2.0) - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h6 as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [r + m, g + m, b + m]
}

// ---------------------------------------------------------------------------
// Pointer mapping
// ---------------------------------------------------------------------------

/// New value of a `kind` widget at block-space `p` inside `rect`.
fn map_pointer(kind: WidgetKind, rect: Rect, p: Point, current: [f32; 3]) -> [f32; 3] {
    let centre = rect.center();
    let radius = (rect.width().min(rect.height()) / 2.0).max(1.0);
    match kind {
        WidgetKind::UnitVec => {
            let mut x = (p.x - centre.x) / radius;
            let mut y = (centre.y - p.y) / radius;
            let len = (x * x + y * y).sqrt();
            if len > 1.0 {
                x /= len;
                y /= len;
            }
            let z = (1.0 - x * x - y * y).max(0.0).sqrt();
            [x, y, z]
        }
        WidgetKind::HsvCube => {
            let [h, _, _] = rgb_to_hsv(current);
            let s = ((p.x - rect.xmin) / rect.width().max(1.0)).clamp(0.0, 1.0);
            let v = (1.0 - (p.y - rect.ymin) / rect.height().max(1.0)).clamp(0.0, 1.0);
            hsv_to_rgb([h, s, v])
        }
        WidgetKind::HsvCircle => {
            let [_, _, v] = rgb_to_hsv(current);
            let d = p - centre;
            let s = (d.length() / radius).clamp(0.0, 1.0);
            let h = (-d.y).atan2(d.x) / std::f32::consts::TAU;
            hsv_to_rgb([h.rem_euclid(1.0), s, v])
        }
        _ => current,
    }
}

fn follow(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton, pos: Point) {
    let block = &region.blocks[ab.block];
    let Some(w) = block.get(ab.widget) else {
        return;
    };
    let next = map_pointer(w.kind, w.rect, block.window_to_block(pos), ab.data.vec);
    if next != ab.data.vec {
        ab.data.vec = next;
        apply::apply_button(cx, region, ab, true);
    }
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

pub(crate) fn vector(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    ab: &mut ActiveButton,
    event: &Event,
) -> HandlerResult {
    match ab.data.state {
        S::Highlight if event.is_press(MouseButton::Left) => {
            ab.data.press_pos = event.mouse_pos;
            activate_state(cx, region, ab, S::NumEditing);
            if ab.data.drag.is_none() {
                activate_state(cx, region, ab, S::Exit);
                return HandlerResult::Break;
            }
            follow(cx, region, ab, event.mouse_pos);
            HandlerResult::Break
        }
        S::NumEditing => {
            if event.is_key_press(Key::Escape) || event.is_press(MouseButton::Right) {
                ab.data.cancel = true;
                ab.data.escapecancel = true;
                activate_state(cx, region, ab, S::Exit);
            } else if event.is_release(MouseButton::Left) {
                activate_state(cx, region, ab, S::Exit);
            } else if event.is_mouse_move() {
                follow(cx, region, ab, event.mouse_pos);
            }
            HandlerResult::Break
        }
        _ => HandlerResult::Continue,
    }
}
