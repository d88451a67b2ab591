//! Per-event entry point for the active widget.
//!
//! [`handle_button_event`] takes the active widget out of its region, runs
//! the state-level logic shared by every kind (hover exit, timers, press
//! tracking), hands the event to [`do_button`] and finally settles the
//! widget back into the region or through its exit.

use log::{debug, trace};

use crate::block::Region;
use crate::event::{Event, EventType, Key, MouseButton};
use crate::geometry::Rect;
use crate::host::TimerKind;
use crate::widget::{WidgetFlags, WidgetKind};

use super::activate::{activate_state, settle, show_tooltip, tooltip_timer_remove, tooltip_timer_reset};
use super::after::{AfterFunc, CallbackCtx};
use super::data::ActiveButton;
use super::{apply, buttons, clipboard, multidrag, number, textfield, vector, HandlerCtx, HandlerResult, InteractionState, Level};

use InteractionState as S;

/// Per-kind event handler.
pub type KindHandler =
    fn(&mut HandlerCtx<'_>, &mut Region, &mut ActiveButton, &Event) -> HandlerResult;

/// The handler table. Display-only kinds have none.
pub(crate) fn handler_for(kind: WidgetKind) -> Option<KindHandler> {
    use WidgetKind as K;
    let handler: KindHandler = match kind {
        K::Button | K::ButtonMenu | K::Decorator => buttons::button,
        k if k.is_opaque_editor() => buttons::button,
        k if k.is_toggle() => buttons::toggle,
        K::Row | K::ListRow | K::Tab | K::ViewItem => buttons::row,
        K::KeyEvent | K::HotkeyEvent => buttons::key_event,
        K::Number => number::number,
        K::NumberSlider => number::slider,
        K::Scroll | K::Grip => number::scroll,
        K::Text | K::SearchMenu => textfield::text,
        K::UnitVec | K::HsvCube | K::HsvCircle => vector::vector,
        K::Menu | K::Pulldown | K::Block | K::Popover | K::Color => buttons::menu,
        _ => return None,
    };
    Some(handler)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Feed `event` to the region's active widget.
pub(crate) fn handle_button_event(cx: &mut HandlerCtx<'_>, region: &mut Region, event: &Event) -> HandlerResult {
    let Some(mut ab) = region.active.take() else {
        return HandlerResult::Continue;
    };
    let state_orig = ab.data.state;
    trace!("{:?} in {state_orig:?}", event.kind);
    let result = match state_orig {
        S::Highlight => highlight_event(cx, region, &mut ab, event),
        S::WaitRelease => wait_release_event(cx, region, &mut ab, event),
        S::WaitFlash => {
            if let EventType::Timer(id) = event.kind {
                if ab.data.timers.kind_of(id) == Some(TimerKind::Flash) {
                    ab.data.timers.flash = None;
                    activate_state(cx, region, &mut ab, S::Exit);
                }
            }
            HandlerResult::Continue
        }
        S::MenuOpen => menu_open_event(cx, region, &mut ab, event),
        _ => do_button(cx, region, &mut ab, event),
    };
    settle(cx, region, ab, Some(event), state_orig);
    result
}

fn exit_canceled(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton) {
    ab.data.cancel = true;
    activate_state(cx, region, ab, S::Exit);
}

fn pointer_inside(region: &Region, ab: &ActiveButton, event: &Event) -> bool {
    let block = &region.blocks[ab.block];
    block.get(ab.widget).is_some_and(|w| w.rect.contains(block.window_to_block(event.mouse_pos)))
}

fn highlight_event(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton, event: &Event) -> HandlerResult {
    match event.kind {
        EventType::MouseMove => {
            let flags = region.blocks[ab.block].flags;
            let is_menu = flags.contains(crate::block::BlockFlags::LOOP);
            let is_pie = flags.contains(crate::block::BlockFlags::RADIAL);
            let over = region.find_widget_at(event.mouse_pos);
            let leaving = (!is_menu || is_pie) && !pointer_inside(region, ab, event);
            let over_other = over.is_some_and(|o| o != (ab.block, ab.widget));
            if leaving || over_other {
                exit_canceled(cx, region, ab);
                return HandlerResult::Continue;
            }
            if event.delta().manhattan_length() > 0.0 {
                region.set_tooltips(true);
                tooltip_timer_reset(cx, region, ab);
            }
        }
        EventType::Timer(id) => match ab.data.timers.kind_of(id) {
            Some(TimerKind::Tooltip) => {
                show_tooltip(cx, region, ab);
                return HandlerResult::Break;
            }
            Some(TimerKind::AutoOpen) => {
                ab.data.timers.auto_open = None;
                activate_state(cx, region, ab, S::MenuOpen);
                ab.data.used_mouse = true;
                return HandlerResult::Break;
            }
            _ => {}
        },
        EventType::WheelUp | EventType::WheelDown | EventType::Button(MouseButton::Middle) => {
            tooltip_timer_remove(cx, ab);
        }
        _ => {}
    }
    if ab.data.state == S::Exit {
        return HandlerResult::Continue;
    }
    do_button(cx, region, ab, event)
}

fn wait_release_event(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton, event: &Event) -> HandlerResult {
    match event.kind {
        EventType::WindowDeactivate => {
            exit_canceled(cx, region, ab);
            return HandlerResult::Continue;
        }
        EventType::Timer(id) if ab.data.timers.kind_of(id) == Some(TimerKind::HoldAction) => {
            ab.data.timers.hold = None;
            queue_hold(cx, region, ab);
            exit_canceled(cx, region, ab);
            return HandlerResult::Break;
        }
        EventType::MouseMove => {
            let inside = pointer_inside(region, ab, event);
            if let Some(w) = region.widget_mut(ab.block, ab.widget) {
                let selected = w.flags.contains(WidgetFlags::SELECT);
                if inside && !selected {
                    w.flags.insert(WidgetFlags::SELECT);
                    ab.data.cancel = false;
                    cx.services.window.tag_redraw();
                } else if !inside && selected {
                    w.flags.remove(WidgetFlags::SELECT);
                    ab.data.cancel = true;
                    cx.services.window.tag_redraw();
                }
            }
        }
        _ => {}
    }
    do_button(cx, region, ab, event);
    HandlerResult::Break
}

/// Run the hold callback once the event settles, instead of the click.
fn queue_hold(cx: &mut HandlerCtx<'_>, region: &Region, ab: &ActiveButton) {
    let block = &region.blocks[ab.block];
    let Some(w) = block.get(ab.widget) else {
        return;
    };
    let Some(hold) = w.callbacks.hold.clone() else {
        return;
    };
    let info = w.callback_info();
    debug!("hold action on `{}`", w.label);
    cx.after.push(AfterFunc {
        source: Some(block.widget_ref(ab.widget)),
        deferred: Some(Box::new(move |ctx: &mut CallbackCtx<'_>| hold(ctx, &info))),
        ..AfterFunc::default()
    });
}

fn menu_open_event(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton, event: &Event) -> HandlerResult {
    if event.is_mouse_move() {
        let in_child = ab
            .data
            .menu
            .and_then(|i| cx.popups.frame(i))
            .is_some_and(|f| f.region.contains_point(event.mouse_pos));
        let over_other = region.find_widget_at(event.mouse_pos).is_some_and(|o| o != (ab.block, ab.widget));
        if !in_child && over_other {
            // Color swatches keep what their picker already applied.
            let is_color = region.widget(ab.block, ab.widget).is_some_and(|w| w.kind == WidgetKind::Color);
            ab.data.cancel = !is_color;
            activate_state(cx, region, ab, S::Exit);
            return HandlerResult::Continue;
        }
    }
    do_button(cx, region, ab, event);
    HandlerResult::Continue
}

// ---------------------------------------------------------------------------
// do_button
// ---------------------------------------------------------------------------

/// Hit rectangles of the widget's extra operator icons, rightmost first, in
/// block space.
pub(crate) fn extra_icon_rects(rect: Rect, count: usize) -> Vec<Rect> {
    let size = 0.8 * rect.height();
    let pad = 0.2 * size;
    (0..count)
        .map(|i| {
            let xmax = rect.xmax - pad - i as f32 * (size + pad);
            Rect::from_bounds(xmax - size, rect.ymin + (rect.height() - size) / 2.0, xmax, rect.ymin + (rect.height() + size) / 2.0)
        })
        .collect()
}

/// Index of the enabled extra icon under the pointer.
fn extra_icon_at(region: &Region, ab: &ActiveButton, event: &Event) -> Option<usize> {
    let block = &region.blocks[ab.block];
    let w = block.get(ab.widget)?;
    if w.extra_icons.is_empty() {
        return None;
    }
    let p = block.window_to_block(event.mouse_pos);
    extra_icon_rects(w.rect, w.extra_icons.len())
        .iter()
        .position(|r| r.contains(p))
        .filter(|&i| !w.extra_icons[i].disabled)
}

/// Press and release over an extra operator icon.
fn extra_icon_event(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton, event: &Event) -> Option<HandlerResult> {
    match ab.data.state {
        S::Highlight if event.is_press(MouseButton::Left) => {
            let i = extra_icon_at(region, ab, event)?;
            ab.data.extra_icon = Some(i);
            activate_state(cx, region, ab, S::WaitRelease);
            Some(HandlerResult::Break)
        }
        S::WaitRelease if event.is_release(MouseButton::Left) => {
            let pressed = ab.data.extra_icon?;
            if extra_icon_at(region, ab, event) == Some(pressed) {
                let block = &region.blocks[ab.block];
                if let Some(w) = block.get(ab.widget) {
                    debug!("extra icon {pressed} of `{}`", w.label);
                    cx.after.push(AfterFunc {
                        source: Some(block.widget_ref(ab.widget)),
                        info: w.callback_info(),
                        operator: Some(w.extra_icons[pressed].operator.clone()),
                        context: w.context.clone(),
                        ..AfterFunc::default()
                    });
                }
                ab.data.apply_through_extra_icon = true;
                ab.data.cancel = false;
            } else {
                ab.data.cancel = true;
            }
            activate_state(cx, region, ab, S::Exit);
            Some(HandlerResult::Break)
        }
        _ => None,
    }
}

/// Cross-cutting handling, then the kind's own handler.
pub(crate) fn do_button(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton, event: &Event) -> HandlerResult {
    let Some((kind, disabled)) = region
        .widget(ab.block, ab.widget)
        .map(|w| (w.kind, w.flags.contains(WidgetFlags::DISABLED)))
    else {
        return HandlerResult::Continue;
    };

    if ab.data.state == S::Highlight {
        if event.ctrl() && !event.alt() && !event.shift() {
            if event.is_key_press(Key::Char('c')) {
                let result = clipboard::copy(cx, region, ab);
                if result.is_break() {
                    return result;
                }
            } else if event.is_key_press(Key::Char('v')) && !disabled {
                let result = clipboard::paste(cx, region, ab);
                if result.is_break() {
                    return result;
                }
            }
        }
        if cx.prefs.select_others
            && event.alt()
            && (event.is_press(MouseButton::Left) || event.is_confirm())
        {
            ab.data.select_others.is_enabled = true;
        }
        if event.is_press(MouseButton::Right) && !disabled && open_context_menu(cx, region, ab, kind, event) {
            return HandlerResult::Break;
        }
    }

    if disabled {
        return HandlerResult::Continue;
    }
    if let Some(result) = extra_icon_event(cx, region, ab, event) {
        return result;
    }

    let result = match handler_for(kind) {
        Some(handler) => handler(cx, region, ab, event),
        None => HandlerResult::Continue,
    };
    multidrag::handle(cx, region, ab, event);
    result
}

/// Right-click menu. View items are applied first so the menu sees the
/// clicked item as current.
fn open_context_menu(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    ab: &mut ActiveButton,
    kind: WidgetKind,
    event: &Event,
) -> bool {
    if cx.level != Level::Main || cx.context_menu.is_none() {
        return false;
    }
    if kind == WidgetKind::ViewItem {
        apply::apply_button(cx, region, ab, false);
        apply::queue_undo(cx, region, ab);
        // The commit is queued; leaving must not roll it back.
        ab.data.origvalue = ab.data.value;
        ab.data.applied = false;
        ab.data.applied_interactive = false;
        ab.data.last_interactive = None;
    }
    let Some(w) = region.widget(ab.block, ab.widget) else {
        return false;
    };
    if !crate::popup::open_context_menu(cx, w, event.mouse_pos) {
        return false;
    }
    // The menu now owns the pointer.
    ab.data.skip_reactivate = true;
    exit_canceled(cx, region, ab);
    true
}
