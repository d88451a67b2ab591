//! Activation, state transitions and exit of the active widget.
//!
//! [`activate_state`] is the single place where the active widget moves
//! between [`InteractionState`]s; every side effect tied to entering or
//! leaving a state (timers, text buffers, pointer grabs, child popups, modal
//! handler registration) hangs off it.

use log::{debug, warn};

use crate::block::{Block, BlockFlags, InteractionHandle, Region, WidgetId};
use crate::event::Event;
use crate::geometry::Point;
use crate::host::{ModalHandler, TimerKind};
use crate::popup::{self, ReturnFlags};
use crate::prefs::UiPreferences;
use crate::property::Value;
use crate::widget::{WidgetFlags, WidgetKind};

use super::data::ActiveButton;
use super::{apply, number, textfield, ActivationType, HandlerCtx, InteractionState, Level};

// ---------------------------------------------------------------------------
// Tooltips
// ---------------------------------------------------------------------------

/// Restart the tooltip timer if the widget has something to show.
pub(crate) fn tooltip_timer_reset(cx: &mut HandlerCtx<'_>, region: &Region, ab: &mut ActiveButton) {
    tooltip_timer_remove(cx, ab);
    if !cx.prefs.show_tooltips || region.tooltips_disabled(ab.block) {
        return;
    }
    let Some(w) = region.widget(ab.block, ab.widget) else {
        return;
    };
    if w.flags.contains(WidgetFlags::NO_TOOLTIP) || (w.tip.is_none() && w.callbacks.tooltip.is_none()) {
        return;
    }
    let delay = if w.kind.is_label_like() {
        cx.prefs.tooltip_delay_label
    } else {
        cx.prefs.tooltip_delay
    };
    ab.data.timers.tooltip = Some(cx.services.window.add_timer(TimerKind::Tooltip, delay));
}

pub(crate) fn tooltip_timer_remove(cx: &mut HandlerCtx<'_>, ab: &mut ActiveButton) {
    if let Some(id) = ab.data.timers.tooltip.take() {
        cx.services.window.remove_timer(id);
    }
    if std::mem::take(&mut ab.data.tooltip_shown) {
        cx.services.window.clear_tooltip();
    }
}

/// The tooltip timer fired.
pub(crate) fn show_tooltip(cx: &mut HandlerCtx<'_>, region: &Region, ab: &mut ActiveButton) {
    ab.data.timers.tooltip = None;
    let block = &region.blocks[ab.block];
    let Some(w) = block.get(ab.widget) else {
        return;
    };
    let text = match (&w.callbacks.tooltip, &w.tip) {
        (Some(f), _) => f(w),
        (None, Some(tip)) => tip.clone(),
        (None, None) => return,
    };
    let at = block.block_to_window(Point::new(w.rect.xmin, w.rect.ymax));
    cx.services.window.show_tooltip(&text, at);
    ab.data.tooltip_shown = true;
}

/// Ticks of 20 ms before a hovered menu button opens by itself.
fn auto_open_ticks(prefs: &UiPreferences, block: &Block, kind: WidgetKind) -> Option<u32> {
    if block.auto_open {
        Some(1)
    } else if block.flags.contains(BlockFlags::LOOP) && kind != WidgetKind::Block {
        Some(5 * prefs.menu_threshold2)
    } else if prefs.menu_open_auto {
        Some(5 * prefs.menu_threshold1)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// State transitions
// ---------------------------------------------------------------------------

/// Move the active widget to `state`, running the enter/leave side effects.
pub fn activate_state(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    ab: &mut ActiveButton,
    state: InteractionState,
) {
    let old = ab.data.state;
    if old == state {
        return;
    }
    let Some(widget) = region.widget(ab.block, ab.widget) else {
        return;
    };
    let kind = widget.kind;
    let has_hold = widget.callbacks.hold.is_some();
    let block_flags = region.blocks[ab.block].flags;

    if state == InteractionState::Highlight {
        if let Some(w) = region.widget_mut(ab.block, ab.widget) {
            w.flags.remove(WidgetFlags::SELECT);
        }
        tooltip_timer_reset(cx, region, ab);
        if kind.auto_opens() && ab.data.used_mouse && ab.data.timers.auto_open.is_none() {
            if let Some(ticks) = auto_open_ticks(cx.prefs, &region.blocks[ab.block], kind) {
                let delay = 0.02 * f64::from(ticks);
                ab.data.timers.auto_open =
                    Some(cx.services.window.add_timer(TimerKind::AutoOpen, delay));
            }
        }
    } else {
        if let Some(w) = region.widget_mut(ab.block, ab.widget) {
            w.flags.insert(WidgetFlags::SELECT);
        }
        tooltip_timer_remove(cx, ab);
        if let Some(id) = ab.data.timers.auto_open.take() {
            cx.services.window.remove_timer(id);
        }
    }

    // Text editing.
    if state == InteractionState::TextEditing && old != InteractionState::TextSelecting {
        textfield::begin(cx, region, ab);
    } else if (old == InteractionState::TextEditing && state != InteractionState::TextSelecting)
        || (old == InteractionState::TextSelecting && state != InteractionState::TextEditing)
    {
        textfield::end(cx, region, ab);
    }

    // Number editing.
    if state == InteractionState::NumEditing {
        number::numedit_begin(cx, region, ab);
    } else if old == InteractionState::NumEditing {
        number::numedit_end(cx, region, ab, state);
    }

    // Child popup.
    if state == InteractionState::MenuOpen {
        if !popup::open_child(cx, region, ab) {
            debug!("{kind:?} has no menu to open");
            ab.data.cancel = true;
            activate_state(cx, region, ab, InteractionState::Exit);
            return;
        }
    } else if old == InteractionState::MenuOpen {
        if let Some(idx) = ab.data.menu.take() {
            popup::close_popups(cx, idx);
        }
    }

    if state == InteractionState::WaitFlash {
        ab.data.timers.flash = Some(cx.services.window.add_timer(TimerKind::Flash, cx.prefs.flash_delay));
    } else if let Some(id) = ab.data.timers.flash.take() {
        cx.services.window.remove_timer(id);
    }

    if state == InteractionState::WaitRelease && has_hold {
        ab.data.timers.hold =
            Some(cx.services.window.add_timer(TimerKind::HoldAction, cx.prefs.hold_delay));
    } else if let Some(id) = ab.data.timers.hold.take() {
        cx.services.window.remove_timer(id);
    }

    // Popups already funnel window input to themselves.
    if cx.level == Level::Main {
        if state.is_modal() && !old.is_modal() {
            cx.services.window.add_modal_handler(ModalHandler::Region);
        } else if !state.is_modal() && old.is_modal() {
            cx.services.window.remove_modal_handler(ModalHandler::Region);
        }
    }

    if state == InteractionState::WaitDrag {
        if let Some(w) = region.widget_mut(ab.block, ab.widget) {
            w.flags.remove(WidgetFlags::SELECT);
        }
    }

    if state == InteractionState::TextEditing
        || (state == InteractionState::Exit && old == InteractionState::NumEditing)
    {
        apply::interaction_begin_ensure(cx, region, ab, true);
    }

    debug!("{kind:?} {old:?} -> {state:?}");
    ab.data.state = state;

    if state != InteractionState::Exit
        && (state != InteractionState::Highlight || block_flags.contains(BlockFlags::LOOP))
    {
        if let Some(w) = region.widget_mut(ab.block, ab.widget) {
            w.refresh(cx.services);
        }
    }
    cx.services.window.tag_redraw();
}

// ---------------------------------------------------------------------------
// Activation
// ---------------------------------------------------------------------------

/// Make widget `id` of block `bi` the active widget.
///
/// The region must have no active widget; use [`handle_button_activate`] to
/// replace one.
pub fn activate_init(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    bi: usize,
    id: WidgetId,
    ty: ActivationType,
) {
    debug_assert!(region.active.is_none(), "activating a widget while another one is active");
    let Some(widget) = region.widget_mut(bi, id) else {
        warn!("activating a widget that is not in the region");
        return;
    };
    let mut ab = ActiveButton::new(bi, id);
    ab.data.interactive = !matches!(
        widget.kind,
        WidgetKind::Curve | WidgetKind::CurveProfile | WidgetKind::SearchMenu
    );
    widget.flags.insert(WidgetFlags::ACTIVE);
    if let Ok(v) = widget.read_f64(cx.services) {
        ab.data.value = v;
        ab.data.origvalue = v;
        ab.data.startvalue = v;
    }
    if widget.kind.is_vector() {
        if let Ok(v) = widget.read_vec3(cx.services) {
            ab.data.vec = v;
            ab.data.origvec = v;
        }
    }
    if ty == ActivationType::Over {
        ab.data.used_mouse = true;
    }
    activate_state(cx, region, &mut ab, InteractionState::Highlight);

    match ty {
        ActivationType::Open => {
            activate_state(cx, region, &mut ab, InteractionState::MenuOpen);
            if let Some(idx) = ab.data.menu {
                popup::activate_first_item(cx, idx);
            }
        }
        ActivationType::TextEditing => {
            activate_state(cx, region, &mut ab, InteractionState::TextEditing)
        }
        ActivationType::Apply => activate_state(cx, region, &mut ab, InteractionState::WaitFlash),
        ActivationType::Over | ActivationType::Activate => {}
    }
    settle(cx, region, ab, None, InteractionState::Init);
}

/// Replace the active widget, canceling the old one first.
pub fn handle_button_activate(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    bi: usize,
    id: WidgetId,
    ty: ActivationType,
) {
    if let Some(mut old) = region.active.take() {
        old.data.cancel = true;
        activate_exit(cx, region, &mut old, false, false);
    }
    activate_init(cx, region, bi, id, ty);
}

/// Put `ab` back as the region's active widget, or finish its exit.
///
/// After an exit the `post` target (Tab navigation, list-row redirection) is
/// activated; otherwise the widget is highlighted again if the pointer is
/// still over it.
pub(crate) fn settle(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    mut ab: ActiveButton,
    event: Option<&Event>,
    state_orig: InteractionState,
) {
    if ab.data.state != InteractionState::Exit {
        region.active = Some(ab);
        return;
    }
    let post = ab.data.post.take();
    let (bi, id, skip) = (ab.block, ab.widget, ab.data.skip_reactivate);
    activate_exit(cx, region, &mut ab, post.is_none(), false);
    drop(ab);

    if let Some((wref, ty)) = post {
        match region.resolve(wref) {
            Some((pb, pid)) => {
                if let Some(w) = region.widget_mut(pb, pid) {
                    w.refresh(cx.services);
                }
                activate_init(cx, region, pb, pid, ty);
            }
            None => warn!("stale widget reference {wref:?}"),
        }
    } else if let Some(event) = event {
        let reactivate = !skip
            && matches!(
                state_orig,
                InteractionState::Init | InteractionState::Highlight | InteractionState::WaitDrag
            )
            && region.active.is_none()
            && region.find_widget_at(event.mouse_pos) == Some((bi, id));
        if reactivate {
            activate_init(cx, region, bi, id, ActivationType::Over);
        }
    }
}

// ---------------------------------------------------------------------------
// Exit
// ---------------------------------------------------------------------------

/// Leave the active state: commit (or roll back), report to the owning
/// popup, queue undo and release everything the activation held.
///
/// With `onfree` the widget is going away with its block; nothing is
/// applied and the widget is not refreshed.
pub fn activate_exit(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    ab: &mut ActiveButton,
    mousemove: bool,
    onfree: bool,
) {
    let Some(kind) = region.widget(ab.block, ab.widget).map(|w| w.kind) else {
        return;
    };
    if kind == WidgetKind::Grip {
        cx.services.window.restore_cursor();
    }
    if ab.data.state != InteractionState::Exit {
        activate_state(cx, region, ab, InteractionState::Exit);
    }
    if !onfree {
        apply::apply_button(cx, region, ab, false);
    }

    if ab.data.multi.has_peers {
        for (_, w) in region.blocks[ab.block].iter_mut() {
            w.flags.remove(WidgetFlags::DRAG_MULTI);
        }
        ab.data.multi.peers.clear();
    }

    let block_flags = region.blocks[ab.block].flags;
    if let Level::Popup(i) = cx.level {
        if !block_flags.contains(BlockFlags::KEEP_OPEN) && (!ab.data.cancel || ab.data.escapecancel) {
            if let Some(frame) = cx.popups.frame_mut(i) {
                frame.ret.butretval = ab.data.retval;
                frame.ret.menuretval =
                    if ab.data.cancel { ReturnFlags::CANCEL } else { ReturnFlags::OK };
                frame.ret.escape |= ab.data.escapecancel;
                if !ab.data.cancel {
                    frame.ret.retvalue =
                        Some(ab.data.ret_value.clone().unwrap_or(Value::Double(ab.data.value)));
                }
            }
        } else if !ab.data.cancel && kind.is_vector() {
            // Pickers in a kept-open popup update their owner live.
            if let Some(frame) = cx.popups.frame_mut(i) {
                frame.ret.retvec = Some(ab.data.vec);
                frame.ret.menuretval.insert(ReturnFlags::UPDATE);
            }
        }
    }

    if !onfree && !ab.data.cancel {
        apply::queue_undo(cx, region, ab);
        if block_flags.contains(BlockFlags::POPUP_MEMORY) {
            let block = &region.blocks[ab.block];
            if let Some(w) = block.get(ab.widget) {
                cx.popups.remember(block.puphash(), w.label.clone());
            }
        }
    }

    for block in &mut region.blocks {
        for (_, w) in block.iter_mut() {
            w.flags.remove(WidgetFlags::LAST_ACTIVE);
        }
    }
    region.set_tooltips(false);

    tooltip_timer_remove(cx, ab);
    let timers = std::mem::take(&mut ab.data.timers);
    for id in [timers.auto_open, timers.flash, timers.hold].into_iter().flatten() {
        cx.services.window.remove_timer(id);
    }
    if ab.data.cursor_changed {
        cx.services.window.restore_cursor();
    }
    cx.services.window.tag_redraw();

    if let Some(handle) = ab.data.interaction.take() {
        InteractionHandle::release(&handle, cx.services);
    }

    if let Some(w) = region.widget_mut(ab.block, ab.widget) {
        w.flags.remove(WidgetFlags::ACTIVE | WidgetFlags::SELECT);
        w.flags.insert(WidgetFlags::LAST_ACTIVE);
        if !onfree {
            w.refresh(cx.services);
        }
    }
    if mousemove {
        cx.services.window.add_mousemove();
    }
}

/// Force-exit the active widget of `region` without applying, as when its
/// block is freed.
pub(crate) fn free_active(cx: &mut HandlerCtx<'_>, region: &mut Region) {
    if let Some(mut ab) = region.active.take() {
        ab.data.cancel = true;
        activate_exit(cx, region, &mut ab, false, true);
    }
}
