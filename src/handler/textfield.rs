//! Text editing of text fields, search fields and number fields.
//!
//! [`begin`] and [`end`] run from the state transitions; [`edit_event`]
//! handles every event while the buffer is open.

use log::debug;

use crate::block::Region;
use crate::event::{Event, Key, MouseButton};
use crate::expr;
use crate::host::{CursorShape, ReportLevel};
use crate::widget::{Widget, WidgetKind};

use super::activate::activate_state;
use super::data::{ActiveButton, SearchState};
use super::text::TextEdit;
use super::{ActivationType, HandlerCtx, HandlerResult, InteractionState};

use InteractionState as S;

// ---------------------------------------------------------------------------
// Begin / end
// ---------------------------------------------------------------------------

/// Run the widget's search for `text`; the exact match (or the first item)
/// is highlighted.
fn search_for(w: &Widget, text: &str) -> Option<SearchState> {
    let search = w.search.as_ref()?;
    let items = (search.update)(text);
    let mut state = SearchState { active: None, items };
    state.active = state.find(text).or((!state.items.is_empty()).then_some(0));
    Some(state)
}

/// Open the edit buffer with the current value, fully selected.
pub(crate) fn begin(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton) {
    let Some(w) = region.widget(ab.block, ab.widget) else {
        return;
    };
    let text = if w.kind.is_number() {
        match w.read_f64(cx.services) {
            Ok(v) => {
                ab.data.value = v;
                ab.data.startvalue = v;
                expr::format_for_edit(v, w.number.is_int)
            }
            Err(_) => String::new(),
        }
    } else {
        w.read_string(cx.services).unwrap_or_default()
    };
    ab.data.origstr = Some(text.clone());
    if w.kind == WidgetKind::SearchMenu {
        ab.data.search = search_for(w, &text);
    }
    ab.data.text = Some(TextEdit::new(text, w.max_len, cx.prefs.text_undo_steps));
    cx.services.window.set_cursor(CursorShape::Text);
    ab.data.cursor_changed = true;
    debug!("text editing `{}`", w.label);
}

/// Close the edit buffer. The text itself is kept for the commit.
pub(crate) fn end(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton) {
    let Some(w) = region.widget(ab.block, ab.widget) else {
        return;
    };
    if w.kind == WidgetKind::SearchMenu && !ab.data.cancel {
        let text = ab.data.text_str().unwrap_or_default().to_owned();
        let pick = ab.data.search.as_ref().and_then(|s| {
            s.active_item().or_else(|| s.find(&text).and_then(|i| s.items.get(i))).cloned()
        });
        match pick {
            Some(item) => ab.data.ret_value = Some(item.value),
            None => {
                let suggestions = w.search.as_ref().is_some_and(|s| s.results_are_suggestions);
                if !suggestions {
                    cx.services.report(ReportLevel::Error, &format!("failed to find '{text}'"));
                    ab.data.cancel = true;
                    ab.data.escapecancel = true;
                }
            }
        }
    }
    ab.data.search = None;
    if std::mem::take(&mut ab.data.cursor_changed) {
        cx.services.window.restore_cursor();
    }
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// Text and search fields.
pub(crate) fn text(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    ab: &mut ActiveButton,
    event: &Event,
) -> HandlerResult {
    match ab.data.state {
        S::Highlight if event.is_press(MouseButton::Left) || event.is_confirm() => {
            activate_state(cx, region, ab, S::TextEditing);
            HandlerResult::Break
        }
        S::TextEditing | S::TextSelecting => edit_event(cx, region, ab, event),
        _ => HandlerResult::Continue,
    }
}

/// Longest common prefix of `words`.
fn common_prefix(words: &[String]) -> &str {
    let Some(first) = words.first() else {
        return "";
    };
    let mut end = first.len();
    for w in &words[1..] {
        end = first
            .char_indices()
            .zip(w.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map_or(0, |((i, a), _)| i + a.len_utf8())
            .min(end);
    }
    &first[..end]
}

/// Complete the buffer. Returns `true` on a full match.
fn autocomplete(w: &Widget, edit: &mut TextEdit) -> bool {
    let Some(f) = &w.callbacks.autocomplete else {
        return false;
    };
    let typed = edit.text().to_owned();
    let candidates: Vec<String> = f(&typed).into_iter().filter(|c| c.starts_with(&typed)).collect();
    match candidates.as_slice() {
        [] => false,
        [only] => {
            edit.set_text(only);
            true
        }
        _ => {
            let prefix = common_prefix(&candidates).to_owned();
            if prefix.len() > typed.len() {
                edit.set_text(&prefix);
            }
            false
        }
    }
}

/// Move editing to the next (or previous) text or number field.
fn tab_to_neighbor(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton, forward: bool) {
    let block = &region.blocks[ab.block];
    let next = block.next_matching(ab.widget, forward, |w| w.kind.is_text() || w.kind.is_number());
    if let Some(id) = next {
        ab.data.post = Some((block.widget_ref(id), ActivationType::TextEditing));
    }
    activate_state(cx, region, ab, S::Exit);
}

/// Every event while the buffer is open.
pub(crate) fn edit_event(
    cx: &mut HandlerCtx<'_>,
    region: &mut Region,
    ab: &mut ActiveButton,
    event: &Event,
) -> HandlerResult {
    let (rect, offset, kind) = {
        let block = &region.blocks[ab.block];
        match block.get(ab.widget) {
            Some(w) => (w.rect, block.offset, w.kind),
            None => return HandlerResult::Break,
        }
    };
    let char_width = cx.prefs.text_char_width * cx.prefs.dpi_fac;
    let local_x = event.mouse_pos.x - offset.x - rect.xmin;
    let is_search = kind == WidgetKind::SearchMenu;
    let mut changed = false;

    if event.is_mouse_move() {
        if ab.data.state == S::TextSelecting {
            if let Some(edit) = ab.data.text.as_mut() {
                edit.set_cursor_from_x(local_x, char_width, true);
            }
        }
        return HandlerResult::Break;
    }
    if event.is_press(MouseButton::Left) {
        if rect.contains(event.mouse_pos - offset) {
            if let Some(edit) = ab.data.text.as_mut() {
                edit.set_cursor_from_x(local_x, char_width, event.shift());
            }
            activate_state(cx, region, ab, S::TextSelecting);
        } else {
            // Clicking away commits, except for searches.
            ab.data.cancel = is_search;
            activate_state(cx, region, ab, S::Exit);
        }
        return HandlerResult::Break;
    }
    if event.is_release(MouseButton::Left) {
        if ab.data.state == S::TextSelecting {
            activate_state(cx, region, ab, S::TextEditing);
        }
        return HandlerResult::Break;
    }
    if event.is_key_press(Key::Escape) || event.is_press(MouseButton::Right) {
        ab.data.cancel = true;
        ab.data.escapecancel = true;
        activate_state(cx, region, ab, S::Exit);
        return HandlerResult::Break;
    }
    if event.is_confirm() {
        activate_state(cx, region, ab, S::Exit);
        return HandlerResult::Break;
    }

    let Some(key) = event.pressed_key() else {
        return HandlerResult::Break;
    };
    let (ctrl, shift) = (event.ctrl(), event.shift());

    if matches!(key, Key::Tab | Key::BackTab) {
        let full = match (region.widget(ab.block, ab.widget), ab.data.text.as_mut()) {
            (Some(w), Some(edit)) if w.callbacks.autocomplete.is_some() => Some(autocomplete(w, edit)),
            _ => None,
        };
        match full {
            Some(true) => activate_state(cx, region, ab, S::Exit),
            Some(false) => changed = true,
            None => tab_to_neighbor(cx, region, ab, key == Key::Tab && !shift),
        }
        if !changed {
            return HandlerResult::Break;
        }
    }

    if let Some(edit) = ab.data.text.as_mut() {
        match key {
            Key::Backspace => changed = edit.delete_prev(ctrl),
            Key::Delete => changed = edit.delete_next(ctrl),
            Key::Left => edit.move_left(ctrl, shift),
            Key::Right => edit.move_right(ctrl, shift),
            Key::Home => edit.home(shift),
            Key::End => edit.end(shift),
            Key::Up | Key::Down if is_search => {
                if let Some(search) = ab.data.search.as_mut() {
                    search.step(if key == Key::Up { -1 } else { 1 });
                }
            }
            Key::Up => edit.home(shift),
            Key::Down => edit.end(shift),
            Key::Char('a') if ctrl => edit.select_all(),
            Key::Char('c') if ctrl => {
                if let Some(sel) = edit.selected_text() {
                    cx.services.window.clipboard_set(sel);
                }
            }
            Key::Char('x') if ctrl => {
                if let Some(cut) = edit.cut() {
                    cx.services.window.clipboard_set(&cut);
                    changed = true;
                }
            }
            Key::Char('v') if ctrl => {
                let pasted = cx.services.window.clipboard_get().replace(['\n', '\r'], " ");
                changed = edit.insert(&pasted);
            }
            Key::Char('z') | Key::Char('Z') if ctrl => {
                changed = if shift { edit.redo() } else { edit.undo() };
            }
            Key::Char(c) if !ctrl => changed = edit.insert_char(c),
            _ => {}
        }
    }

    if changed {
        let text = ab.data.text_str().unwrap_or_default().to_owned();
        if let Some(w) = region.widget_mut(ab.block, ab.widget) {
            if is_search {
                ab.data.search = search_for(w, &text);
            }
            w.draw_str = text;
        }
    }
    cx.services.window.tag_redraw();
    HandlerResult::Break
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Value;

    #[test]
    fn common_prefix_of_candidates() {
        let words = vec!["location".to_owned(), "locale".to_owned(), "local".to_owned()];
        assert_eq!(common_prefix(&words), "loca");
        assert_eq!(common_prefix(&["same".to_owned()]), "same");
        assert_eq!(common_prefix(&[]), "");
    }

    #[test]
    fn single_candidate_completes_fully() {
        let w = Widget::new(WidgetKind::Text, "Name").with_autocomplete(|_| vec!["Cube".into(), "Sphere".into()]);
        let mut edit = TextEdit::new("Cu", 0, 8);
        assert!(autocomplete(&w, &mut edit));
        assert_eq!(edit.text(), "Cube");
    }

    #[test]
    fn several_candidates_extend_to_the_shared_prefix() {
        let w = Widget::new(WidgetKind::Text, "Name")
            .with_autocomplete(|_| vec!["Camera".into(), "CameraRig".into()]);
        let mut edit = TextEdit::new("Ca", 0, 8);
        assert!(!autocomplete(&w, &mut edit));
        assert_eq!(edit.text(), "Camera");
    }

    #[test]
    fn search_highlights_exact_match_first() {
        let w = Widget::new(WidgetKind::SearchMenu, "Find").with_search(crate::widget::SearchData::new(|q| {
            ["Cube", "Cube.001"]
                .iter()
                .filter(|n| n.starts_with(q))
                .enumerate()
                .map(|(i, n)| crate::widget::SearchItem::new(*n, Value::Int(i as i64)))
                .collect()
        }));
        let state = search_for(&w, "Cube.001").unwrap();
        assert_eq!(state.active_item().unwrap().name, "Cube.001");
        let state = search_for(&w, "C").unwrap();
        assert_eq!(state.active, Some(0));
    }
}
