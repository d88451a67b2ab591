//! Region-level entry: list scrolling, hover activation and the hand-off
//! to an open menu.

use log::trace;

use crate::block::Region;
use crate::event::{Event, EventType, EventValue};
use crate::popup::menu::{handle_menus, return_submenu};

use super::activate::{activate_init, activate_state, settle};
use super::dispatch::handle_button_event;
use super::{ActivationType, HandlerCtx, HandlerResult, InteractionState};

fn is_press(event: &Event) -> bool {
    matches!(event.kind, EventType::Button(_)) && event.value == EventValue::Press
}

/// Plain wheel over a list scrolls it before anything else sees the event.
pub(crate) fn handle_list_event(cx: &mut HandlerCtx<'_>, region: &mut Region, event: &Event) -> Option<HandlerResult> {
    let step = match event.kind {
        EventType::WheelUp => -1,
        EventType::WheelDown => 1,
        _ => return None,
    };
    if !event.modifiers.is_empty() {
        return None;
    }
    let (bi, id) = region.blocks.iter().enumerate().rev().find_map(|(bi, b)| {
        b.any_widget_at(b.window_to_block(event.mouse_pos))
            .filter(|id| b[*id].list.is_some())
            .map(|id| (bi, id))
    })?;
    let list = region.widget_mut(bi, id)?.list.as_mut()?;
    if list.scroll(step) {
        trace!("list scrolled to {}", list.offset);
        cx.services.window.tag_redraw();
    }
    Some(HandlerResult::Break)
}

/// Highlight the widget under the pointer when nothing is active. A press
/// is passed on to the widget it activated.
pub(crate) fn button_over(cx: &mut HandlerCtx<'_>, region: &mut Region, event: &Event) -> HandlerResult {
    let press = is_press(event);
    if region.active.is_some() || !(event.is_mouse_move() || press) {
        return HandlerResult::Continue;
    }
    let Some((bi, id)) = region.find_widget_at(event.mouse_pos) else {
        return HandlerResult::Continue;
    };
    activate_init(cx, region, bi, id, ActivationType::Over);
    if press {
        handle_button_event(cx, region, event)
    } else {
        HandlerResult::Continue
    }
}

/// Feed the active widget, or activate the one under the pointer.
pub(crate) fn button_or_over(cx: &mut HandlerCtx<'_>, region: &mut Region, event: &Event) -> HandlerResult {
    let result = handle_button_event(cx, region, event);
    if region.active.is_none() && !result.is_break() {
        return button_over(cx, region, event);
    }
    result
}

/// Open the menu of the widget under the pointer, as when sliding along a
/// menu bar. Returns `false` if there is no such widget.
fn open_hovered_menu(cx: &mut HandlerCtx<'_>, region: &mut Region, event: &Event) -> bool {
    let Some((bi, id)) = region.find_widget_at(event.mouse_pos) else {
        return false;
    };
    if !region.widget(bi, id).is_some_and(|w| w.kind.opens_menu()) {
        return false;
    }
    activate_init(cx, region, bi, id, ActivationType::Over);
    if let Some(mut ab) = region.active.take() {
        activate_state(cx, region, &mut ab, InteractionState::MenuOpen);
        settle(cx, region, ab, None, InteractionState::Highlight);
    }
    true
}

/// The active widget of `region` owns popup frame `idx`.
fn region_menu_handler(cx: &mut HandlerCtx<'_>, region: &mut Region, idx: usize, event: &Event) -> HandlerResult {
    let result = handle_menus(cx, idx, event);
    if result.is_break() && !event.is_timer() {
        return result;
    }
    let ret = cx.popups.frame(idx).map(|f| f.ret.clone()).filter(|r| !r.menuretval.is_empty());
    match ret {
        Some(ret) => {
            return_submenu(cx, region, &ret, event);
            HandlerResult::Break
        }
        None => handle_button_event(cx, region, event),
    }
}

/// Handle `event` in a region that is not a popup.
pub(crate) fn region_handler(cx: &mut HandlerCtx<'_>, region: &mut Region, event: &Event) -> HandlerResult {
    if let Some(result) = handle_list_event(cx, region, event) {
        return result;
    }
    let menu = region
        .active
        .as_ref()
        .filter(|ab| ab.data.state == InteractionState::MenuOpen)
        .and_then(|ab| ab.data.menu);

    let result = match menu {
        Some(idx) => region_menu_handler(cx, region, idx, event),
        None => handle_button_event(cx, region, event),
    };
    if region.active.is_some() || (result.is_break() && menu.is_none()) {
        return result;
    }
    if menu.is_some() {
        // Leaving an open menu for another menu button opens that one.
        if (event.is_mouse_move() || is_press(event)) && open_hovered_menu(cx, region, event) {
            return HandlerResult::Break;
        }
        if event.is_mouse_move() {
            return result.or(button_over(cx, region, event));
        }
        return result;
    }
    result.or(button_over(cx, region, event))
}
