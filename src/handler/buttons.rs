//! Handlers for push buttons, toggles, rows, key capture and menu buttons.

use log::debug;

use crate::block::{Region, WidgetId};
use crate::event::{Event, EventType, EventValue, Key, MouseButton};
use crate::property::Value;
use crate::widget::{WidgetFlags, WidgetKind};

use super::activate::activate_state;
use super::data::ActiveButton;
use super::{apply, drag_toggle, ActivationType, HandlerCtx, HandlerResult, InteractionState};

use InteractionState as S;

fn exit(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton) -> HandlerResult {
    activate_state(cx, region, ab, S::Exit);
    HandlerResult::Break
}

fn cancel(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton) -> HandlerResult {
    ab.data.cancel = true;
    exit(cx, region, ab)
}

// ---------------------------------------------------------------------------
// Push buttons
// ---------------------------------------------------------------------------

/// Buttons, menu items, decorators and opaque editors.
pub(crate) fn button(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    ab: &mut ActiveButton,
    event: &Event,
) -> HandlerResult {
    match ab.data.state {
        S::Highlight => {
            if event.is_press(MouseButton::Left) {
                activate_state(cx, region, ab, S::WaitRelease);
                return HandlerResult::Break;
            }
            if event.is_release(MouseButton::Left) && cx.level.is_popup() {
                // Press opened the menu, release picks the item under it.
                let selected = region
                    .widget(ab.block, ab.widget)
                    .is_some_and(|w| w.flags.contains(WidgetFlags::SELECT) || w.flags.contains(WidgetFlags::ACTIVE));
                ab.data.cancel = !selected;
                return exit(cx, region, ab);
            }
            if event.is_confirm() {
                activate_state(cx, region, ab, S::WaitFlash);
                return HandlerResult::Break;
            }
        }
        S::WaitRelease if event.is_release(MouseButton::Left) => {
            let selected =
                region.widget(ab.block, ab.widget).is_some_and(|w| w.flags.contains(WidgetFlags::SELECT));
            ab.data.cancel = !selected;
            return exit(cx, region, ab);
        }
        _ => {}
    }
    HandlerResult::Continue
}

// ---------------------------------------------------------------------------
// Toggles
// ---------------------------------------------------------------------------

pub(crate) fn toggle(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    ab: &mut ActiveButton,
    event: &Event,
) -> HandlerResult {
    match ab.data.state {
        S::Highlight => {
            if event.is_press(MouseButton::Left) {
                let Some(w) = region.widget(ab.block, ab.widget) else {
                    return HandlerResult::Continue;
                };
                ab.data.value = w.toggled(ab.data.origvalue);
                ab.data.press_pos = event.mouse_pos;
                if cx.prefs.drag_toggle {
                    apply::apply_button(cx, region, ab, true);
                    activate_state(cx, region, ab, S::WaitDrag);
                    return HandlerResult::Break;
                }
                return exit(cx, region, ab);
            }
            if event.is_confirm() {
                if let Some(w) = region.widget(ab.block, ab.widget) {
                    ab.data.value = w.toggled(ab.data.origvalue);
                }
                return exit(cx, region, ab);
            }
        }
        S::WaitDrag => {
            if event.is_mouse_move() {
                let moved = (event.mouse_pos - ab.data.press_pos).manhattan_length();
                if moved > cx.prefs.drag_threshold {
                    let pushed = region
                        .widget(ab.block, ab.widget)
                        .is_some_and(|w| w.toggle_is_on(ab.data.value));
                    ab.data.skip_reactivate = true;
                    drag_toggle::start(cx, region, ab, pushed);
                    return exit(cx, region, ab);
                }
                return HandlerResult::Continue;
            }
            if event.is_release(MouseButton::Left) {
                return exit(cx, region, ab);
            }
        }
        _ => {}
    }
    HandlerResult::Continue
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// Text field overlapping the pointer inside the active widget's block.
fn text_under(region: &Region, bi: usize, skip: WidgetId, event: &Event) -> Option<WidgetId> {
    let block = &region.blocks[bi];
    let pos = block.window_to_block(event.mouse_pos);
    block
        .iter()
        .find(|(id, w)| *id != skip && w.kind == WidgetKind::Text && w.is_interactive() && w.rect.contains(pos))
        .map(|(id, _)| id)
}

/// Cancel the row and start renaming the text field under the pointer.
fn redirect_to_text(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    ab: &mut ActiveButton,
    event: &Event,
) -> Option<HandlerResult> {
    let id = text_under(region, ab.block, ab.widget, event)?;
    let wref = region.widget_ref(ab.block, id)?;
    debug!("row redirected to its text field");
    ab.data.post = Some((wref, ActivationType::TextEditing));
    Some(cancel(cx, region, ab))
}

/// Rows, list rows, tabs and view items.
pub(crate) fn row(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    ab: &mut ActiveButton,
    event: &Event,
) -> HandlerResult {
    if ab.data.state != S::Highlight {
        return HandlerResult::Continue;
    }
    let Some(kind) = region.widget(ab.block, ab.widget).map(|w| w.kind) else {
        return HandlerResult::Continue;
    };
    let renamable = matches!(kind, WidgetKind::ListRow | WidgetKind::ViewItem);
    let double = event.kind == EventType::Button(MouseButton::Left) && event.value == EventValue::DoubleClick;
    let ctrl_press = event.is_press(MouseButton::Left) && event.ctrl() && kind == WidgetKind::ListRow;
    if renamable && (double || ctrl_press) {
        if let Some(result) = redirect_to_text(cx, region, ab, event) {
            return result;
        }
    }
    if event.is_press(MouseButton::Left) || event.is_confirm() {
        return exit(cx, region, ab);
    }
    HandlerResult::Continue
}

// ---------------------------------------------------------------------------
// Key capture
// ---------------------------------------------------------------------------

pub(crate) fn key_event(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    ab: &mut ActiveButton,
    event: &Event,
) -> HandlerResult {
    match ab.data.state {
        S::Highlight if event.is_press(MouseButton::Left) || event.is_confirm() => {
            activate_state(cx, region, ab, S::WaitKeyEvent);
            HandlerResult::Break
        }
        S::WaitKeyEvent => {
            if event.is_mouse_move() {
                return HandlerResult::Continue;
            }
            if event.is_key_press(Key::Escape) {
                return cancel(cx, region, ab);
            }
            let is_hotkey = region.widget(ab.block, ab.widget).is_some_and(|w| w.kind == WidgetKind::HotkeyEvent);
            if is_hotkey && event.is_press(MouseButton::Left) {
                let inside = region.blocks[ab.block]
                    .get(ab.widget)
                    .is_some_and(|w| w.rect.contains(region.blocks[ab.block].window_to_block(event.mouse_pos)));
                if !inside {
                    return cancel(cx, region, ab);
                }
            }
            if let Some(key) = event.pressed_key() {
                ab.data.hotkey = Some((key, event.modifiers));
                return exit(cx, region, ab);
            }
            HandlerResult::Break
        }
        _ => HandlerResult::Continue,
    }
}

// ---------------------------------------------------------------------------
// Menu buttons
// ---------------------------------------------------------------------------

/// Next enum item after `current` in direction `step`, wrapping.
fn cycle_item(items: &[(i64, String)], current: i64, step: isize) -> Option<i64> {
    if items.is_empty() {
        return None;
    }
    let n = items.len() as isize;
    let pos = items.iter().position(|(v, _)| *v == current).map_or(0, |p| p as isize);
    Some(items[(pos + step).rem_euclid(n) as usize].0)
}

/// Menus, pulldowns, popovers, block buttons and color swatches.
pub(crate) fn menu(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    ab: &mut ActiveButton,
    event: &Event,
) -> HandlerResult {
    if ab.data.state != S::Highlight {
        return HandlerResult::Continue;
    }
    if event.is_press(MouseButton::Left) || event.is_confirm() {
        activate_state(cx, region, ab, S::MenuOpen);
        return HandlerResult::Break;
    }
    let wheel = match event.kind {
        EventType::WheelUp => Some(-1),
        EventType::WheelDown => Some(1),
        _ => None,
    };
    if let (Some(step), true) = (wheel, event.ctrl()) {
        let Some(w) = region.widget(ab.block, ab.widget) else {
            return HandlerResult::Continue;
        };
        if w.kind != WidgetKind::Menu {
            return HandlerResult::Continue;
        }
        let Some(items) = w.binding.property().and_then(|h| cx.services.store.info(h).ok()).map(|i| i.items)
        else {
            return HandlerResult::Continue;
        };
        if let Some(next) = cycle_item(&items, ab.data.value as i64, step) {
            ab.data.ret_value = Some(Value::Int(next));
            return exit(cx, region, ab);
        }
    }
    HandlerResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<(i64, String)> {
        vec![(0, "A".into()), (2, "B".into()), (5, "C".into())]
    }

    #[test]
    fn cycling_wraps_both_ways() {
        assert_eq!(cycle_item(&items(), 0, 1), Some(2));
        assert_eq!(cycle_item(&items(), 5, 1), Some(0));
        assert_eq!(cycle_item(&items(), 0, -1), Some(5));
        assert_eq!(cycle_item(&[], 0, 1), None);
    }
}
