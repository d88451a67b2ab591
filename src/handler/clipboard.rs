//! Ctrl+C / Ctrl+V on a highlighted widget.

use log::debug;

use crate::block::Region;
use crate::expr;
use crate::host::ReportLevel;
use crate::property::Value;
use crate::widget::{format_vec3, Widget};

use super::activate::activate_state;
use super::data::ActiveButton;
use super::{HandlerCtx, HandlerResult, InteractionState};

/// Text copied from `w`, if its kind has a clipboard form.
fn copy_text(cx: &HandlerCtx<'_>, w: &Widget) -> Option<String> {
    if w.kind.is_vector() {
        return w.read_vec3(cx.services).ok().map(format_vec3);
    }
    if w.kind.is_text() {
        return w.read_string(cx.services).ok();
    }
    let value = w.read_f64(cx.services).ok()?;
    if w.kind.is_toggle() {
        return Some(if w.toggle_is_on(value) { "1" } else { "0" }.to_owned());
    }
    Some(expr::format_for_edit(value, w.number.is_int))
}

/// Parse `[r, g, b]` (brackets optional).
fn parse_vec3(text: &str) -> Option<[f32; 3]> {
    let inner = text.trim().trim_start_matches('[').trim_end_matches(']');
    let mut parts = inner.split(',').map(|p| p.trim().parse::<f32>());
    let v = [parts.next()?.ok()?, parts.next()?.ok()?, parts.next()?.ok()?];
    parts.next().is_none().then_some(v)
}

/// Copy the widget's value. Works on disabled widgets too.
pub(crate) fn copy(cx: &mut HandlerCtx<'_>, region: &Region, ab: &ActiveButton) -> HandlerResult {
    let Some(w) = region.widget(ab.block, ab.widget) else {
        return HandlerResult::Continue;
    };
    if !w.kind.supports_clipboard() {
        return HandlerResult::Continue;
    }
    match copy_text(cx, w) {
        Some(text) => {
            debug!("copied `{text}` from `{}`", w.label);
            cx.services.window.clipboard_set(&text);
            HandlerResult::Break
        }
        None => HandlerResult::Continue,
    }
}

/// Paste the clipboard into the widget and commit it.
pub(crate) fn paste(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton) -> HandlerResult {
    let Some(w) = region.widget(ab.block, ab.widget) else {
        return HandlerResult::Continue;
    };
    let kind = w.kind;
    if !kind.supports_clipboard() || kind.is_row() || kind.is_opaque_editor() {
        return HandlerResult::Continue;
    }
    let text = cx.services.window.clipboard_get();
    let text = text.trim();

    let parsed = if kind.is_vector() {
        parse_vec3(text).map(|v| ab.data.vec = v).ok_or_else(|| format!("`{text}` is not a color or vector"))
    } else if kind.is_text() {
        ab.data.ret_value = Some(Value::String(text.to_owned()));
        Ok(())
    } else if kind.is_toggle() {
        match text.parse::<f64>() {
            Ok(f) => {
                let current = ab.data.value;
                if (f != 0.0) != w.toggle_is_on(current) {
                    ab.data.value = w.toggled(current);
                }
                Ok(())
            }
            Err(_) => Err(format!("`{text}` is not a number")),
        }
    } else {
        expr::evaluate(text, w.number.unit)
            .map(|v| ab.data.value = w.range.clamp_hard(if w.number.is_int { v.round() } else { v }))
            .map_err(|e| format!("invalid number `{text}`: {e}"))
    };

    match parsed {
        Ok(()) => {
            debug!("pasted `{text}` into {kind:?}");
            activate_state(cx, region, ab, InteractionState::Exit);
        }
        Err(msg) => cx.services.report(ReportLevel::Error, &format!("paste failed: {msg}")),
    }
    HandlerResult::Break
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors_parse_with_or_without_brackets() {
        assert_eq!(parse_vec3("[1, 0.5, 0]"), Some([1.0, 0.5, 0.0]));
        assert_eq!(parse_vec3("0.1,0.2,0.3"), Some([0.1, 0.2, 0.3]));
        assert_eq!(parse_vec3("[1, 2]"), None);
        assert_eq!(parse_vec3("[1, 2, 3, 4]"), None);
        assert_eq!(parse_vec3("red"), None);
    }
}
