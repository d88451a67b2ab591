//! The commit pipeline.
//!
//! [`apply_button`] writes the active widget's edited value back through its
//! binding. Interactive applies run while a drag is in progress and only
//! write; the final apply on exit writes (unless the drag already wrote the
//! same value) and queues the commit record that runs callbacks, operators
//! and property notifications once the event settles.

use log::{debug, error};

use crate::block::{InteractionHandle, InteractionParams, Region};
use crate::expr;
use crate::host::ReportLevel;
use crate::widget::{Widget, WidgetFlags, WidgetKind};

use super::after::AfterFunc;
use super::data::{ActiveButton, InteractionData};
use super::{multidrag, select_others, HandlerCtx};

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

/// Write the edit of the active widget.
///
/// With `interactive` the value is written but no commit is queued. A
/// canceled edit restores the original value if anything was written.
pub fn apply_button(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton, interactive: bool) {
    ab.data.retval = 0;

    if ab.data.cancel {
        if ab.data.applied || ab.data.applied_interactive {
            revert(cx, region, ab);
        }
        return;
    }
    let Some(kind) = region.widget(ab.block, ab.widget).map(|w| w.kind) else {
        return;
    };

    if ab.data.apply_through_extra_icon {
        // Only the icon's operator runs.
        ab.data.applied = true;
        return;
    }

    if kind.is_number() && ab.data.has_text() && !interactive && !eval_typed_number(cx, region, ab) {
        return;
    }

    if !write_kind(cx, region, ab, kind, interactive) {
        return;
    }

    let block = &mut region.blocks[ab.block];
    let Some(w) = block.get_mut(ab.widget) else {
        return;
    };
    w.refresh(cx.services);
    ab.data.retval = w.retval;
    if kind.is_row() {
        refresh_row_siblings(cx, region, ab);
    }

    if ab.data.multi.is_enabled() {
        multidrag::apply_peers(cx, region, ab);
    }
    select_others::apply(cx, region, ab);

    if interactive {
        interaction_begin_ensure(cx, region, ab, false);
        ab.data.applied_interactive = true;
    }
    if let Some(handle) = &ab.data.interaction {
        InteractionHandle::update(handle, cx.services);
    }

    if !interactive {
        let entry = after_func_for(cx, region, ab.block, ab.widget, Some(&ab.data));
        if !entry.is_empty() {
            cx.after.push(entry);
        }
        if ab.data.multi.is_enabled() {
            multidrag::queue_peer_commits(cx, region, ab);
        }
        select_others::queue_commits(cx, region, ab);
        ab.data.applied = true;
    }
}

/// Evaluate the typed text of a number field into `data.value`. Returns
/// `false` when the edit was canceled instead.
fn eval_typed_number(cx: &mut HandlerCtx<'_>, region: &Region, ab: &mut ActiveButton) -> bool {
    let Some(w) = region.widget(ab.block, ab.widget) else {
        return false;
    };
    let text = ab.data.text_str().unwrap_or_default().trim().to_owned();
    if ab.data.origstr.as_deref().is_some_and(|o| o.trim() == text) {
        ab.data.cancel = true;
        return false;
    }
    if w.flags.contains(WidgetFlags::DRIVEN) {
        cx.services.report(ReportLevel::Info, "can't edit driven value");
        ab.data.cancel = true;
        return false;
    }
    match expr::evaluate(&text, w.number.unit) {
        Ok(v) => {
            let v = if w.number.is_int { v.round() } else { v };
            let v = w.range.clamp_hard(v);
            if v == ab.data.startvalue {
                ab.data.cancel = true;
                return false;
            }
            ab.data.value = v;
            true
        }
        Err(e) => {
            cx.services.report(ReportLevel::Error, &format!("invalid number `{text}`: {e}"));
            ab.data.cancel = true;
            false
        }
    }
}

/// Per-kind write. Returns `false` if nothing should be committed.
fn write_kind(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    ab: &mut ActiveButton,
    kind: WidgetKind,
    interactive: bool,
) -> bool {
    let data = &mut ab.data;
    let Some(w) = region.widget_mut(ab.block, ab.widget) else {
        return false;
    };
    use WidgetKind as K;
    let result = match kind {
        K::KeyEvent | K::HotkeyEvent => {
            if data.hotkey.is_some() {
                w.hotkey = data.hotkey;
            }
            Ok(())
        }
        K::Button | K::Decorator => Ok(()),
        k if k.is_opaque_editor() => Ok(()),
        K::Text | K::SearchMenu => match data.ret_value.clone() {
            Some(v) => w.write_value(cx.services, v),
            None => match data.text_str() {
                Some(text) => w.write_string(cx.services, text),
                None => Ok(()),
            },
        },
        K::Block | K::Pulldown | K::Popover => Ok(()),
        K::Menu => match data.ret_value.clone() {
            Some(v) => {
                let ty = w.effective_value_type();
                let v = v.coerce(ty).unwrap_or(v);
                w.write_value(cx.services, v)
            }
            None => Ok(()),
        },
        K::Color | K::UnitVec | K::HsvCube | K::HsvCircle => w.write_vec3(cx.services, data.vec),
        K::ButtonMenu => {
            data.value = w.range.hard_min;
            write_number(cx, w, data, interactive)
        }
        k if k.is_row() || k == K::ViewItem => {
            data.value = w.range.hard_max;
            write_number(cx, w, data, interactive)
        }
        _ => write_number(cx, w, data, interactive),
    };
    match result {
        Ok(()) => true,
        Err(e) => {
            error!("applying {kind:?} `{}` failed: {e}", w.label);
            false
        }
    }
}

/// Write `data.value` unless an interactive apply already wrote it.
fn write_number(
    cx: &mut HandlerCtx<'_>,
    w: &mut Widget,
    data: &mut InteractionData,
    interactive: bool,
) -> crate::error::Result<()> {
    if data.last_interactive == Some(data.value) {
        return Ok(());
    }
    w.write_f64(cx.services, data.value)?;
    if interactive {
        data.last_interactive = Some(data.value);
    }
    Ok(())
}

/// Kinds whose commit writes `data.value`.
fn has_numeric_value(kind: WidgetKind) -> bool {
    use WidgetKind as K;
    !(kind.is_opaque_editor()
        || matches!(
            kind,
            K::Button | K::Decorator | K::KeyEvent | K::HotkeyEvent | K::Menu | K::Pulldown | K::Block | K::Popover
        ))
}

fn refresh_row_siblings(cx: &HandlerCtx<'_>, region: &mut Region, ab: &ActiveButton) {
    let block = &mut region.blocks[ab.block];
    let Some(binding) = block.get(ab.widget).map(|w| w.binding.clone()) else {
        return;
    };
    for (id, w) in block.iter_mut() {
        if id != ab.widget && (w.kind.is_row() || w.kind == WidgetKind::ViewItem) && w.binding.same_target(&binding) {
            w.refresh(cx.services);
        }
    }
}

/// Restore the values an interactive or canceled edit wrote.
fn revert(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton) {
    let data = &mut ab.data;
    data.value = data.origvalue;
    data.vec = data.origvec;
    if let Some(w) = region.widget_mut(ab.block, ab.widget) {
        let result = if w.kind.is_vector() {
            w.write_vec3(cx.services, data.origvec)
        } else if w.kind.is_text() {
            match &data.origstr {
                Some(orig) => w.write_string(cx.services, orig),
                None => Ok(()),
            }
        } else if !has_numeric_value(w.kind) {
            Ok(())
        } else {
            w.write_f64(cx.services, data.origvalue)
        };
        if let Err(e) = result {
            error!("restoring `{}` failed: {e}", w.label);
        }
        w.refresh(cx.services);
    }
    debug!("reverted edit");
    if region.widget(ab.block, ab.widget).is_some_and(|w| w.kind.is_row()) {
        refresh_row_siblings(cx, region, ab);
    }
    if ab.data.multi.is_enabled() {
        multidrag::restore_peers(cx, region, ab);
    }
    select_others::revert(cx, ab);
    if let Some(handle) = &ab.data.interaction {
        InteractionHandle::update(handle, cx.services);
    }
    ab.data.applied = false;
    ab.data.applied_interactive = false;
    ab.data.last_interactive = None;
}

// ---------------------------------------------------------------------------
// Commit records
// ---------------------------------------------------------------------------

/// Capture everything the commit of widget `id` must run.
///
/// `data` is the interaction data when the widget is the active one; peers
/// committed alongside it pass `None`.
pub(crate) fn after_func_for(
    cx: &HandlerCtx<'_>,
    region: &mut Region,
    bi: usize,
    id: crate::block::WidgetId,
    data: Option<&InteractionData>,
) -> AfterFunc {
    let popup_op = cx
        .level
        .popup_index()
        .and_then(|i| cx.popups.frame(i))
        .and_then(|f| f.popup_op.clone());
    let block = &mut region.blocks[bi];
    let source = block.widget_ref(id);
    let handle_func = block.handle_func.clone();
    let butm_func = block.butm_func.clone();
    let Some(w) = block.get_mut(id) else {
        return AfterFunc::default();
    };

    let rename = match (&w.callbacks.rename, data) {
        (Some(f), Some(d)) if w.kind.is_text() => {
            let new = d.text_str().map(str::to_owned).unwrap_or_default();
            let old = d.origstr.clone().unwrap_or_default();
            Some((f.clone(), new, old))
        }
        _ => None,
    };
    let search_arg = match w.search.as_mut() {
        Some(s) if w.kind == WidgetKind::SearchMenu => match (s.arg.take(), s.arg_free.take()) {
            (Some(arg), Some(free)) => Some((arg, free)),
            (arg, free) => {
                s.arg = arg;
                s.arg_free = free;
                None
            }
        },
        _ => None,
    };
    let butm_func = match butm_func {
        Some(f) if w.kind == WidgetKind::ButtonMenu => Some((f, w.range.hard_min)),
        _ => None,
    };

    AfterFunc {
        source: Some(source),
        info: w.callback_info(),
        on_click: w.callbacks.on_click.clone(),
        on_click_n: w.callbacks.on_click_n.clone(),
        rename,
        handle_func: handle_func.map(|f| (f, w.retval)),
        butm_func,
        popup_op,
        operator: w.operator.clone(),
        context: w.context.clone(),
        update: w.binding.property().cloned(),
        search_arg,
        interaction: data.and_then(|d| d.interaction.clone()),
        undo: None,
        deferred: None,
    }
}

/// Queue the undo push for a committed widget carrying the undo flag.
pub(crate) fn queue_undo(cx: &mut HandlerCtx<'_>, region: &Region, ab: &ActiveButton) {
    let block = &region.blocks[ab.block];
    let Some(w) = block.get(ab.widget) else {
        return;
    };
    if !w.flags.contains(WidgetFlags::UNDO) {
        return;
    }
    cx.after.push(AfterFunc {
        source: Some(block.widget_ref(ab.widget)),
        undo: Some(w.undo_label()),
        ..AfterFunc::default()
    });
}

// ---------------------------------------------------------------------------
// Block interaction
// ---------------------------------------------------------------------------

/// Start the block's custom interaction unless one is already running.
pub(crate) fn interaction_begin_ensure(
    cx: &mut HandlerCtx<'_>,
    region: &Region,
    ab: &mut ActiveButton,
    is_click: bool,
) {
    if ab.data.interaction.is_some() {
        return;
    }
    let block = &region.blocks[ab.block];
    let Some(callbacks) = &block.interaction else {
        return;
    };
    let Some(origin) = block.get(ab.widget) else {
        return;
    };
    let mut ids = vec![origin.retval];
    if ab.data.multi.has_peers {
        ids.extend(
            block
                .iter()
                .filter(|(id, w)| *id != ab.widget && w.flags.contains(WidgetFlags::DRAG_MULTI))
                .map(|(_, w)| w.retval),
        );
    }
    ids.sort_unstable();
    ids.dedup();
    let params = InteractionParams { is_click, unique_retval_ids: ids };
    ab.data.interaction = Some(InteractionHandle::begin(cx.services, callbacks, params));
}
