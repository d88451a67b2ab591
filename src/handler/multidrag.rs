//! Multi-number drag: sweep vertically across number fields, then drag
//! sideways to edit all of them at once.
//!
//! The gesture starts undecided. Once the pointer has moved far enough its
//! direction picks between a plain drag and the vertical sweep; during the
//! sweep every compatible field the pointer crosses is tagged as a peer.
//! Moving sideways (or typing) snapshots the peers and from then on every
//! apply of the origin is mirrored onto them.

use std::mem::discriminant;

use log::{debug, warn};

use crate::block::{Region, WidgetId};
use crate::event::Event;
use crate::geometry::Point;
use crate::property::UnitType;
use crate::widget::{Widget, WidgetFlags};

use super::data::{ActiveButton, MultiInit, PeerState, SelectContext};
use super::{apply, select_others, HandlerCtx, InteractionState};

/// Whether `peer` may join a multi-drag started on `origin`.
fn is_compatible(origin: &Widget, peer: &Widget) -> bool {
    peer.is_interactive()
        && peer.kind == origin.kind
        && peer.is_float() == origin.is_float()
        && peer.number.unit == origin.number.unit
        && discriminant(&peer.binding) == discriminant(&origin.binding)
}

/// Value a peer takes when the origin moved from `origvalue` to `value`.
fn peer_value(peer_orig: f64, origvalue: f64, value: f64, is_proportional: bool) -> f64 {
    if is_proportional && origvalue != 0.0 {
        peer_orig * (value / origvalue)
    } else {
        peer_orig + (value - origvalue)
    }
}

/// Track the gesture for the active number field.
pub(crate) fn handle(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton, event: &Event) {
    if !cx.prefs.multi_drag
        || !matches!(ab.data.state, InteractionState::TextEditing | InteractionState::NumEditing)
    {
        return;
    }
    if !region.widget(ab.block, ab.widget).is_some_and(|w| w.kind.is_number()) {
        return;
    }
    if !event.is_mouse_move() && ab.data.multi.drag_dir == Point::ZERO {
        return;
    }
    let pos = event.mouse_pos;
    let margin = cx.prefs.unit_y() / 4.0;

    match ab.data.multi.init {
        MultiInit::Unset => {
            let multi = &mut ab.data.multi;
            let d = pos - multi.last;
            multi.drag_dir = multi.drag_dir + Point::new(d.x.abs(), d.y.abs());
            multi.last = pos;
            if multi.drag_dir.length() > margin {
                if multi.drag_dir.normalized().y.abs() > 0.75 {
                    multi.init = MultiInit::Setup;
                    multi.lock_x = pos.x;
                } else {
                    multi.init = MultiInit::Disable;
                }
                debug!("multi-drag direction decided: {:?}", multi.init);
            }
        }
        MultiInit::Setup => {
            let text_changed = ab.data.state == InteractionState::TextEditing
                && ab.data.text_str() != ab.data.origstr.as_deref();
            let d = event.delta();
            let sideways = (ab.data.multi.lock_x - pos.x).abs() > margin && d.x.abs() > d.y.abs();
            if text_changed || sideways {
                if ab.data.multi.has_peers {
                    enable(cx, region, ab);
                } else {
                    ab.data.multi.init = MultiInit::Disable;
                }
            }
        }
        MultiInit::Enable | MultiInit::Disable => {}
    }

    if ab.data.multi.init == MultiInit::Setup {
        tag_crossed(region, ab, pos);
        cx.services.window.tag_redraw();
    }
}

/// Tag compatible fields crossed by the sweep from the press to `pos`.
fn tag_crossed(region: &mut Region, ab: &mut ActiveButton, pos: Point) {
    let start = ab.data.multi.drag_start;
    let block = &mut region.blocks[ab.block];
    let offset = block.offset;
    let Some(origin) = block.get(ab.widget) else {
        return;
    };
    let hits: Vec<WidgetId> = block
        .iter()
        .filter(|(id, w)| {
            *id != ab.widget
                && !w.flags.contains(WidgetFlags::DRAG_MULTI)
                && is_compatible(origin, w)
                && w.rect.translate(offset).intersects_segment(start, pos)
        })
        .map(|(id, _)| id)
        .collect();
    for id in hits {
        if let Some(w) = block.get_mut(id) {
            w.flags.insert(WidgetFlags::DRAG_MULTI);
            ab.data.multi.has_peers = true;
        }
    }
}

/// Snapshot the tagged peers and start mirroring.
fn enable(cx: &mut HandlerCtx<'_>, region: &Region, ab: &mut ActiveButton) {
    let block = &region.blocks[ab.block];
    let Some(origin) = block.get(ab.widget) else {
        return;
    };
    let select = &ab.data.select_others;
    let peers: Vec<PeerState> = block
        .iter()
        .filter(|(id, w)| *id != ab.widget && w.flags.contains(WidgetFlags::DRAG_MULTI))
        .filter_map(|(id, w)| {
            let origvalue = w.read_f64(cx.services).ok()?;
            Some(PeerState {
                wref: block.widget_ref(id),
                origvalue,
                select_others: SelectContext {
                    is_enabled: select.is_enabled,
                    is_copy: select.is_copy,
                    ..SelectContext::default()
                },
            })
        })
        .collect();
    let multi = &mut ab.data.multi;
    multi.is_proportional = origin.number.proportional || origin.number.unit == UnitType::Length;
    debug!("multi-drag enabled with {} peers", peers.len());
    multi.peers = peers;
    multi.init = MultiInit::Enable;
}

/// Mirror the origin's current value onto every peer.
pub(crate) fn apply_peers(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &mut ActiveButton) {
    let value = ab.data.value;
    let origvalue = ab.data.origvalue;
    let typed = ab.data.has_text();
    let is_proportional = ab.data.multi.is_proportional;
    for peer in &mut ab.data.multi.peers {
        let Some((bi, id)) = region.resolve(peer.wref) else {
            warn!("multi-drag: can't find button {:?}", peer.wref);
            continue;
        };
        let Some(w) = region.widget_mut(bi, id) else {
            continue;
        };
        let next = if typed {
            value
        } else {
            w.range.clamp_soft(peer_value(peer.origvalue, origvalue, value, is_proportional))
        };
        if let Err(e) = w.write_f64(cx.services, next) {
            warn!("multi-drag: writing `{}` failed: {e}", w.label);
            continue;
        }
        w.refresh(cx.services);
        select_others::apply_context(cx, region, bi, id, peer.origvalue, &mut peer.select_others);
    }
}

/// Put every peer back to its snapshot.
pub(crate) fn restore_peers(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &ActiveButton) {
    for peer in &ab.data.multi.peers {
        let Some(w) = region.resolve(peer.wref).and_then(|(bi, id)| region.widget_mut(bi, id)) else {
            continue;
        };
        if let Err(e) = w.write_f64(cx.services, peer.origvalue) {
            warn!("multi-drag: restoring `{}` failed: {e}", w.label);
        }
        w.refresh(cx.services);
        select_others::revert_context(cx, &peer.select_others);
    }
}

/// Queue a commit for every peer.
pub(crate) fn queue_peer_commits(cx: &mut HandlerCtx<'_>, region: &mut Region, ab: &ActiveButton) {
    for peer in &ab.data.multi.peers {
        let Some((bi, id)) = region.resolve(peer.wref) else {
            continue;
        };
        let entry = apply::after_func_for(cx, region, bi, id, None);
        if !entry.is_empty() {
            cx.after.push(entry);
        }
        select_others::queue_context_commits(cx, region, bi, id, &peer.select_others);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{PropertyHandle, PropertyInfo};

    #[test]
    fn offset_mode_adds_the_delta() {
        assert!((peer_value(0.2, 0.5, 0.6, false) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn proportional_mode_scales() {
        assert!((peer_value(2.0, 1.0, 1.5, true) - 3.0).abs() < 1e-12);
        // A zero origin cannot scale; fall back to the offset.
        assert!((peer_value(2.0, 0.0, 1.0, true) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn compatibility_requires_matching_kind_and_type() {
        let float = PropertyInfo::float();
        let a = Widget::number("A", PropertyHandle::new("/A", "x"), &float);
        let b = Widget::number("B", PropertyHandle::new("/A", "y"), &float);
        let int = Widget::number("C", PropertyHandle::new("/A", "n"), &PropertyInfo::int());
        let slider = Widget::slider("D", PropertyHandle::new("/A", "z"), &float);
        let unbound = Widget::new(crate::widget::WidgetKind::Number, "E");
        assert!(is_compatible(&a, &b));
        assert!(!is_compatible(&a, &int));
        assert!(!is_compatible(&a, &slider));
        assert!(!is_compatible(&a, &unbound));
    }
}
