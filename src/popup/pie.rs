//! Pie menus: items sit around the pointer and are chosen by direction.

use crate::block::{Block, BlockFlags, Region, WidgetId};
use crate::event::{Event, EventType, EventValue, Key, MouseButton};
use crate::geometry::{Point, Rect};
use crate::handler::activate::{activate_state, handle_button_activate, settle};
use crate::handler::{ActivationType, HandlerCtx, HandlerResult, InteractionState};
use crate::prefs::UiPreferences;
use crate::widget::RadialDirection;

use super::ReturnFlags;

/// Place the items of `block` around its origin and flag it radial.
///
/// Items without a direction take the free directions in order. The block
/// origin ends up under the pointer once the block is pushed at `at`.
pub(crate) fn pie_layout(block: &mut Block, trigger: EventType, prefs: &UiPreferences) {
    let unit = prefs.unit_y();
    let radius = unit * 3.0;
    let (item_w, item_h) = (unit * 5.0, unit);

    let mut free = RadialDirection::ALL
        .into_iter()
        .filter(|d| !block.iter().any(|(_, w)| w.pie_dir == Some(*d)))
        .collect::<Vec<_>>()
        .into_iter();
    for (_, widget) in block.iter_mut() {
        if widget.pie_dir.is_none() {
            widget.pie_dir = free.next();
        }
        let Some(dir) = widget.pie_dir else {
            continue;
        };
        let a = dir.angle().to_radians();
        let c = Point::new(a.cos() * radius, -a.sin() * radius);
        widget.rect = Rect::new(c.x - item_w / 2.0, c.y - item_h / 2.0, item_w, item_h);
    }
    block.fit_rect();
    block.rect = block.rect.union(Rect::new(-radius, -radius, 2.0 * radius, 2.0 * radius));
    block.flags.insert(BlockFlags::RADIAL);
    block.pie_event = Some(trigger);
}

/// Item lying in the direction of `pos` from the pie centre.
fn item_towards(block: &Block, pos: Point, threshold: f32) -> Option<WidgetId> {
    let d = block.window_to_block(pos);
    if d.length() < threshold {
        return None;
    }
    let dir = RadialDirection::from_vector(d.x, d.y);
    block.find(|w| w.is_interactive() && w.pie_dir == Some(dir))
}

fn set_ret(cx: &mut HandlerCtx<'_>, flags: ReturnFlags, escape: bool) {
    if let Some(frame) = cx.level.popup_index().and_then(|i| cx.popups.frame_mut(i)) {
        frame.ret.menuretval = flags;
        frame.ret.escape |= escape;
    }
}

/// Apply (or open) the highlighted item.
fn pick_active(cx: &mut HandlerCtx<'_>, region: &mut Region, event: &Event) {
    let Some(mut ab) = region.active.take() else {
        return;
    };
    let state_orig = ab.data.state;
    let opens = region.widget(ab.block, ab.widget).is_some_and(|w| w.kind.opens_menu());
    if opens {
        let (bi, id) = (ab.block, ab.widget);
        region.active = Some(ab);
        handle_button_activate(cx, region, bi, id, ActivationType::Open);
        return;
    }
    activate_state(cx, region, &mut ab, InteractionState::Exit);
    settle(cx, region, ab, Some(event), state_orig);
}

pub(crate) fn pie_handler(cx: &mut HandlerCtx<'_>, region: &mut Region, event: &Event) -> HandlerResult {
    let Some(block) = region.blocks.first() else {
        return HandlerResult::Continue;
    };
    let trigger = block.pie_event;
    let threshold = cx.prefs.unit_y() * 0.6;

    if event.is_mouse_move() {
        let towards = item_towards(block, event.mouse_pos, threshold);
        match (towards, region.active_widget()) {
            (Some(id), Some((_, active))) if id == active => {}
            (Some(id), _) => handle_button_activate(cx, region, 0, id, ActivationType::Over),
            (None, Some(_)) => {
                if let Some(mut ab) = region.active.take() {
                    ab.data.cancel = true;
                    ab.data.skip_reactivate = true;
                    activate_state(cx, region, &mut ab, InteractionState::Exit);
                    settle(cx, region, ab, Some(event), InteractionState::Highlight);
                }
            }
            (None, None) => {}
        }
        return HandlerResult::Break;
    }

    let trigger_release = trigger == Some(event.kind) && event.value == EventValue::Release;
    if event.is_key_press(Key::Escape) || event.is_press(MouseButton::Right) {
        set_ret(cx, ReturnFlags::CANCEL, true);
    } else if trigger_release || event.is_release(MouseButton::Left) || event.is_confirm() {
        pick_active(cx, region, event);
    } else if event.is_press(MouseButton::Left) && region.active.is_none() {
        set_ret(cx, ReturnFlags::CANCEL, false);
    }
    HandlerResult::Break
}
