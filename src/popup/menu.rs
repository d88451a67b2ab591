//! Event handling inside popup menus.
//!
//! [`handle_menus`] walks the stack from the innermost open frame down to a
//! starting frame. Each level first sees what its child returned; the event
//! itself reaches a level only when the child did not consume it.

use log::{debug, trace};

use crate::block::{BlockFlags, Region};
use crate::event::{Event, EventType, EventValue, Key, MouseButton};
use crate::handler::activate::{activate_state, handle_button_activate, settle};
use crate::handler::dispatch::handle_button_event;
use crate::handler::region::{button_or_over, handle_list_event};
use crate::handler::{apply, ActivationType, HandlerCtx, HandlerResult, InteractionState};
use crate::widget::WidgetKind;

use super::{pie, with_frame_region, PopupReturn, ReturnFlags};

use InteractionState as S;

// ---------------------------------------------------------------------------
// Stack walk
// ---------------------------------------------------------------------------

/// Handle `event` in frames `start..` of the popup stack.
pub(crate) fn handle_menus(cx: &mut HandlerCtx<'_>, start: usize, event: &Event) -> HandlerResult {
    let n = cx.popups.len();
    if start >= n {
        return HandlerResult::Continue;
    }

    // The key that opened a pie also acts inside it, not in a submenu.
    let top = (start..n)
        .find(|&i| {
            cx.popups.frame(i).and_then(|f| f.block()).is_some_and(|b| {
                b.flags.contains(BlockFlags::RADIAL) && b.pie_event == Some(event.kind)
            })
        })
        .unwrap_or(n - 1);

    // Inside-ness only grows towards the top of the stack.
    let mut parent_inside = vec![false; top + 1];
    let mut inside = false;
    for (i, slot) in parent_inside.iter_mut().enumerate().skip(start) {
        *slot = inside;
        inside |= cx.popups.frame(i).is_some_and(|f| f.region.contains_point(event.mouse_pos));
    }

    let mut result = level_event(cx, top, event, parent_inside[top]);
    for i in (start..top).rev() {
        if result.is_break() && !event.is_timer() {
            return HandlerResult::Break;
        }
        let child = cx.popups.frame(i + 1).map(|f| f.ret.clone()).unwrap_or_default();
        if !child.menuretval.is_empty() {
            let out_parent = child.menuretval.contains(ReturnFlags::OUT_PARENT);
            result = menu_return_submenu(cx, i, &child, event);
            if !(result.is_break() && out_parent) {
                continue;
            }
        }
        result = level_event(cx, i, event, parent_inside[i]);
    }
    result
}

/// Frame `i` reacts to the return value of its child.
fn menu_return_submenu(cx: &mut HandlerCtx<'_>, i: usize, child: &PopupReturn, event: &Event) -> HandlerResult {
    let Some(frame) = cx.popups.frame_mut(i) else {
        return HandlerResult::Continue;
    };
    let keep_open = frame.flags().contains(BlockFlags::KEEP_OPEN);
    let closing = child.menuretval.intersects(ReturnFlags::OK | ReturnFlags::CANCEL);
    if closing && (!keep_open || child.escape) {
        frame.ret.menuretval = child.menuretval & (ReturnFlags::OK | ReturnFlags::CANCEL);
        frame.ret.escape |= child.escape;
        frame.ret.butretval = child.butretval;
        frame.ret.retvalue.clone_from(&child.retvalue);
    }
    with_frame_region(cx, i, |cx, region| return_submenu(cx, region, child, event));

    let parent_done = cx.popups.frame(i).is_some_and(|f| !f.ret.menuretval.is_empty());
    if parent_done {
        HandlerResult::Continue
    } else {
        HandlerResult::Break
    }
}

/// The active widget of `region` owns a popup that returned `ret`.
pub(crate) fn return_submenu(cx: &mut HandlerCtx<'_>, region: &mut Region, ret: &PopupReturn, event: &Event) {
    let Some(mut ab) = region.active.take() else {
        return;
    };
    let state_orig = ab.data.state;
    let Some(kind) = region.widget(ab.block, ab.widget).map(|w| w.kind) else {
        region.active = Some(ab);
        return;
    };
    let flags = ret.menuretval;
    trace!("{kind:?} got {flags:?} from its popup");

    if flags.intersects(ReturnFlags::OK | ReturnFlags::UPDATE) {
        if kind == WidgetKind::Color {
            if let Some(vec) = ret.retvec {
                ab.data.vec = vec;
            }
        } else if let Some(value) = &ret.retvalue {
            if let Some(f) = value.as_f64() {
                ab.data.value = f;
            }
            ab.data.ret_value = Some(value.clone());
        }
    }

    if flags.contains(ReturnFlags::UPDATE) {
        apply::apply_button(cx, region, &mut ab, true);
        if let Some(frame) = ab.data.menu.and_then(|idx| cx.popups.frame_mut(idx)) {
            frame.ret = PopupReturn::default();
        }
    } else if flags.intersects(ReturnFlags::OK | ReturnFlags::CANCEL) {
        ab.data.cancel = flags.contains(ReturnFlags::CANCEL) || !flags.contains(ReturnFlags::OK);
        ab.data.escapecancel |= ret.escape;
        activate_state(cx, region, &mut ab, S::Exit);
    } else if flags.contains(ReturnFlags::OUT) {
        let over = {
            let block = &region.blocks[ab.block];
            block.get(ab.widget).is_some_and(|w| w.rect.contains(block.window_to_block(event.mouse_pos)))
        };
        if (event.is_mouse_move() && over) || event.is_keyboard() {
            ab.data.used_mouse = !event.is_keyboard();
            activate_state(cx, region, &mut ab, S::Highlight);
        } else {
            // A color picker applies as it goes; leaving keeps the result.
            ab.data.cancel = kind != WidgetKind::Color;
            activate_state(cx, region, &mut ab, S::Exit);
        }
    }
    settle(cx, region, ab, Some(event), state_orig);
}

// ---------------------------------------------------------------------------
// One level
// ---------------------------------------------------------------------------

fn level_event(cx: &mut HandlerCtx<'_>, i: usize, event: &Event, parent_inside: bool) -> HandlerResult {
    with_frame_region(cx, i, |cx, region| {
        let Some(flags) = region.blocks.first().map(|b| b.flags) else {
            return HandlerResult::Continue;
        };
        let searching = region.active.as_ref().is_some_and(|ab| {
            ab.data.state.is_text()
                && region.widget(ab.block, ab.widget).is_some_and(|w| w.kind == WidgetKind::SearchMenu)
        });
        if searching {
            return handle_button_event(cx, region, event);
        }
        if flags.contains(BlockFlags::RADIAL) {
            return pie::pie_handler(cx, region, event);
        }
        if let Some(result) = handle_list_event(cx, region, event) {
            return result;
        }
        if event.value == EventValue::DoubleClick && event.kind != EventType::Button(MouseButton::Left) {
            return HandlerResult::Continue;
        }
        menu_event(cx, region, event, parent_inside)
    })
    .unwrap_or(HandlerResult::Continue)
}

fn set_ret(cx: &mut HandlerCtx<'_>, flags: ReturnFlags, escape: bool) {
    if let Some(frame) = cx.level.popup_index().and_then(|i| cx.popups.frame_mut(i)) {
        frame.ret.menuretval = flags;
        frame.ret.escape |= escape;
    }
}

fn ret_is_set(cx: &HandlerCtx<'_>) -> bool {
    cx.level
        .popup_index()
        .and_then(|i| cx.popups.frame(i))
        .is_some_and(|f| !f.ret.menuretval.is_empty())
}

/// Widget index chosen by a digit key: `1` is the first item, `0` the tenth.
fn numselect_index(c: char) -> Option<usize> {
    let d = c.to_digit(10)? as usize;
    Some(if d == 0 { 9 } else { d - 1 })
}

/// Keyboard and pointer handling of a plain menu block.
fn menu_event(cx: &mut HandlerCtx<'_>, region: &mut Region, event: &Event, parent_inside: bool) -> HandlerResult {
    let (flags, window_rect) = {
        let block = &region.blocks[0];
        (block.flags, block.window_rect())
    };
    let inside = region.contains_point(event.mouse_pos);
    let is_submenu = cx.level.popup_index().is_some_and(|i| i > 0);

    // A widget in the middle of an edit sees everything.
    if region.active_state().is_some_and(|s| s.is_modal() && s != S::MenuOpen) {
        return handle_button_event(cx, region, event);
    }

    let mut result = HandlerResult::Continue;
    if let Some(key) = event.pressed_key() {
        result = HandlerResult::Break;
        match key {
            Key::Up | Key::Down => {
                let forward = key == Key::Down;
                let block = &region.blocks[0];
                let next = match region.active_widget() {
                    Some((_, id)) => block.next_matching(id, forward, |_| true),
                    None if forward => block.first_interactive(),
                    None => block.ids().iter().rev().copied().find(|id| block[*id].is_interactive()),
                };
                if let Some(id) = next {
                    handle_button_activate(cx, region, 0, id, ActivationType::Activate);
                }
            }
            Key::Left if is_submenu => set_ret(cx, ReturnFlags::OUT, false),
            Key::Right | Key::Enter
                if region
                    .active
                    .as_ref()
                    .and_then(|ab| region.widget(ab.block, ab.widget))
                    .is_some_and(|w| w.kind.opens_menu()) =>
            {
                if let Some((bi, id)) = region.active_widget() {
                    handle_button_activate(cx, region, bi, id, ActivationType::Open);
                }
            }
            Key::Escape => {
                debug!("menu canceled");
                set_ret(cx, ReturnFlags::CANCEL, true);
            }
            Key::Char(c) if !event.ctrl() && !event.alt() => {
                let block = &region.blocks[0];
                let by_key = block.find(|w| w.is_interactive() && w.menu_key == Some(c.to_ascii_lowercase()));
                let by_number = || {
                    let n = numselect_index(c)?;
                    block.iter().filter(|(_, w)| w.is_interactive()).nth(n).map(|(id, _)| id)
                };
                let pick = by_key.or_else(|| flags.contains(BlockFlags::NUMSELECT).then(by_number).flatten());
                match pick {
                    Some(id) => {
                        let ty = if block[id].kind.opens_menu() {
                            ActivationType::Open
                        } else {
                            ActivationType::Apply
                        };
                        handle_button_activate(cx, region, 0, id, ty);
                    }
                    None => result = button_or_over(cx, region, event),
                }
            }
            _ => result = button_or_over(cx, region, event),
        }
    } else if matches!(event.kind, EventType::Button(_)) && event.value == EventValue::Press && !inside {
        let mut ret = if flags.contains(BlockFlags::KEEP_OPEN) {
            ReturnFlags::OK
        } else {
            ReturnFlags::OUT
        };
        if parent_inside {
            ret.insert(ReturnFlags::OUT_PARENT);
        }
        set_ret(cx, ret, false);
    } else if event.is_mouse_move()
        && flags.contains(BlockFlags::MOVEMOUSE_QUIT)
        && !inside
        && !parent_inside
        && !window_rect.expand(cx.prefs.menu_quit_margin * cx.prefs.dpi_fac).contains(event.mouse_pos)
    {
        set_ret(cx, ReturnFlags::OUT, false);
    } else if event.is_press(MouseButton::Right) && region.active.is_none() {
        set_ret(cx, ReturnFlags::CANCEL, false);
    } else {
        result = button_or_over(cx, region, event);
    }

    if ret_is_set(cx) {
        HandlerResult::Continue
    } else if inside {
        HandlerResult::Break
    } else {
        result
    }
}

// ---------------------------------------------------------------------------
// Floating popups
// ---------------------------------------------------------------------------

/// Root handler while a host-invoked popup is open.
///
/// Consumes every event except drops and double-clicks. Once the popup
/// returns a final value it is closed and exactly one of its callbacks runs.
pub(crate) fn popup_handler(cx: &mut HandlerCtx<'_>, event: &Event) -> HandlerResult {
    handle_menus(cx, 0, event);

    let Some(frame) = cx.popups.frame_mut(0) else {
        return HandlerResult::Continue;
    };
    let ret = frame.ret.clone();
    if ret.is_final() {
        let on_success = frame.on_success.take();
        let on_cancel = frame.on_cancel.take();
        super::close_popups(cx, 0);

        if cx.services.window.is_alive() {
            let ok = ret.is_ok() && !ret.escape;
            let callback = if ok { on_success } else { on_cancel };
            if let Some(f) = callback {
                cx.after.with_ctx(cx.services, |ctx| f(ctx, &ret));
            }
        } else {
            debug!("window closed; dropping popup callbacks");
        }
        cx.services.window.add_mousemove();
    } else if ret.menuretval.contains(ReturnFlags::UPDATE) {
        frame.ret.menuretval = ReturnFlags::NONE;
    }

    if matches!(event.value, EventValue::DoubleClick) || matches!(event.kind, EventType::Drop) {
        HandlerResult::Continue
    } else {
        HandlerResult::Break
    }
}
