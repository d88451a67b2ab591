//! Propagating an edit to every selected owner of the edited property.
//!
//! Enabled by holding Alt when the edit starts. Elements are collected on
//! the first apply; numeric edits add the origin's delta to each element's
//! own starting value, everything else copies the value.

use log::{error, trace};

use crate::block::Region;
use crate::property::Value;

use super::after::AfterFunc;
use super::data::{ActiveButton, SelectContext, SelectElem};
use super::HandlerCtx;

/// Collect the other selected owners of `handle` once.
fn ensure_init(cx: &HandlerCtx<'_>, ctx: &mut SelectContext, handle: &crate::property::PropertyHandle) {
    if ctx.is_init {
        return;
    }
    ctx.is_init = true;
    ctx.elems = cx
        .services
        .store
        .selected_others(handle)
        .into_iter()
        .filter_map(|h| {
            let orig = cx.services.store.get(&h).ok()?;
            Some(SelectElem { handle: h, orig })
        })
        .collect();
    trace!("select-others: {} elements for {handle}", ctx.elems.len());
}

/// Value `elem` takes when the origin moved from `origvalue` to `value`.
fn propagated(elem: &SelectElem, value: &Value, origvalue: f64, is_copy: bool) -> Value {
    let delta_applies = !is_copy && !matches!(value, Value::Bool(_)) && !matches!(elem.orig, Value::Bool(_));
    match (delta_applies, value.as_f64(), elem.orig.as_f64()) {
        (true, Some(v), Some(orig)) => Value::from_f64(elem.orig.value_type(), orig + (v - origvalue)),
        _ => value.clone(),
    }
}

/// Write the origin's new value to every selected element.
pub(crate) fn apply(cx: &mut HandlerCtx<'_>, region: &Region, ab: &mut ActiveButton) {
    apply_context(cx, region, ab.block, ab.widget, ab.data.origvalue, &mut ab.data.select_others);
}

/// [`apply`] for any widget with its own select context, used by multi-drag
/// peers too.
pub(crate) fn apply_context(
    cx: &mut HandlerCtx<'_>,
    region: &Region,
    bi: usize,
    id: crate::block::WidgetId,
    origvalue: f64,
    ctx: &mut SelectContext,
) {
    if !ctx.is_enabled {
        return;
    }
    let Some(w) = region.widget(bi, id) else {
        return;
    };
    let Some(handle) = w.binding.property() else {
        return;
    };
    ensure_init(cx, ctx, handle);
    let Ok(value) = w.read_value(cx.services) else {
        return;
    };
    for elem in &ctx.elems {
        let next = propagated(elem, &value, origvalue, ctx.is_copy);
        if let Err(e) = cx.services.store.set(&elem.handle, next) {
            error!("select-others: {}: {e}", elem.handle);
        }
    }
}

/// Put every element back to its original value.
pub(crate) fn revert(cx: &mut HandlerCtx<'_>, ab: &ActiveButton) {
    revert_context(cx, &ab.data.select_others);
}

pub(crate) fn revert_context(cx: &mut HandlerCtx<'_>, ctx: &SelectContext) {
    for elem in &ctx.elems {
        if let Err(e) = cx.services.store.set(&elem.handle, elem.orig.clone()) {
            error!("select-others: {}: {e}", elem.handle);
        }
    }
}

/// Queue a property notification per element.
pub(crate) fn queue_commits(cx: &mut HandlerCtx<'_>, region: &Region, ab: &ActiveButton) {
    queue_context_commits(cx, region, ab.block, ab.widget, &ab.data.select_others);
}

pub(crate) fn queue_context_commits(
    cx: &mut HandlerCtx<'_>,
    region: &Region,
    bi: usize,
    id: crate::block::WidgetId,
    ctx: &SelectContext,
) {
    let Some(w) = region.widget(bi, id) else {
        return;
    };
    let source = region.widget_ref(bi, id);
    for elem in &ctx.elems {
        cx.after.push(AfterFunc {
            source,
            info: w.callback_info(),
            update: Some(elem.handle.clone()),
            ..AfterFunc::default()
        });
    }
}
