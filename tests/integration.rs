//! Integration tests for kraken-ui.
//!
//! These tests drive whole gestures through the public API with a headless
//! `Pilot`, checking what ends up in the property store and what the host
//! collaborators were asked to do.

use std::cell::RefCell;
use std::rc::Rc;

use insta::assert_snapshot;
use pretty_assertions::assert_eq;

use kraken_ui::block::Block;
use kraken_ui::event::{Event, EventType, Key, Modifiers, MouseButton};
use kraken_ui::geometry::{Point, Rect};
use kraken_ui::handler::{ActivationType, InteractionState};
use kraken_ui::host::{OperatorCall, TimerKind};
use kraken_ui::popup::PopupInvocation;
use kraken_ui::property::{
    MemoryStore, PropertyHandle, PropertyInfo, RawAccessor, RawSlot, RawSlots, RawType, UnitType, Value,
};
use kraken_ui::testing::Pilot;
use kraken_ui::widget::{RadialDirection, SearchData, SearchItem, Widget, WidgetFlags, WidgetKind};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn row_rect(row: usize) -> Rect {
    Rect::new(0.0, row as f32 * 20.0, 200.0, 20.0)
}

// ---------------------------------------------------------------------------
// Slider: drag, commit and cancel
// ---------------------------------------------------------------------------

fn opacity() -> (PropertyHandle, PropertyInfo) {
    let info = PropertyInfo::float().range(0.0, 1.0).step(0.01);
    (PropertyHandle::new("/World/Cube", "opacity"), info)
}

fn slider_pilot() -> (Pilot, PropertyHandle) {
    init_logging();
    let (handle, info) = opacity();
    let store = MemoryStore::new().with("/World/Cube", "opacity", info.clone(), Value::Float(0.5));
    let block = Block::new("material")
        .with(Widget::slider("Opacity", handle.clone(), &info).with_rect(row_rect(0)).with_tip("Surface opacity"));
    (Pilot::new(store).with_block(block), handle)
}

/// Press on the slider and drag it by a fifth of its width. The first two
/// motions only release the drag lock.
fn drag_slider_by_a_fifth(pilot: &mut Pilot) {
    pilot.hover("Opacity");
    pilot.press(MouseButton::Left);
    pilot.move_by(Point::new(10.0, 0.0), 1);
    pilot.move_by(Point::new(10.0, 0.0), 1);
    pilot.move_by(Point::new(40.0, 0.0), 4);
}

#[test]
fn test_slider_drag_commits_once() {
    let (mut pilot, handle) = slider_pilot();
    drag_slider_by_a_fifth(&mut pilot);
    assert_eq!(pilot.active_state(), Some(InteractionState::NumEditing));
    assert_eq!(pilot.value(&handle), Value::Float(0.7));
    // Interactive writes queue nothing.
    assert_eq!(pilot.drained(), 0);
    assert!(pilot.rec().updates.borrow().is_empty());

    pilot.release(MouseButton::Left);
    assert_eq!(pilot.value(&handle), Value::Float(0.7));
    assert_eq!(pilot.drained(), 1);
    assert_eq!(*pilot.rec().updates.borrow(), [handle]);
    assert_eq!(pilot.rec().undo.borrow().len(), 1);
    assert!(!pilot.rec().window.borrow().grabbed);
}

#[test]
fn test_slider_escape_restores_original() {
    let (mut pilot, handle) = slider_pilot();
    drag_slider_by_a_fifth(&mut pilot);
    assert_eq!(pilot.value(&handle), Value::Float(0.7));

    pilot.key(Key::Escape);
    assert_eq!(pilot.value(&handle), Value::Float(0.5));
    assert_eq!(pilot.drained(), 0);
    assert!(pilot.rec().updates.borrow().is_empty());
    assert!(pilot.rec().undo.borrow().is_empty());

    // The release that ends the gesture does nothing more.
    pilot.release(MouseButton::Left);
    assert_eq!(pilot.value(&handle), Value::Float(0.5));
    assert_eq!(pilot.drained(), 0);
}

#[test]
fn test_slider_click_enters_text_editing() {
    let (mut pilot, handle) = slider_pilot();
    pilot.click("Opacity");
    assert_eq!(pilot.active_state(), Some(InteractionState::TextEditing));
    pilot.type_text("0.25");
    pilot.key(Key::Enter);
    assert_eq!(pilot.value(&handle), Value::Float(0.25));
    assert_eq!(pilot.drained(), 1);
}

#[test]
fn test_slider_state_trace() {
    let (mut pilot, _) = slider_pilot();
    let mut trace = Vec::new();
    pilot.hover("Opacity");
    trace.push(format!("{:?}", pilot.active_state()));
    pilot.press(MouseButton::Left);
    trace.push(format!("{:?}", pilot.active_state()));
    pilot.move_by(Point::new(30.0, 0.0), 3);
    trace.push(format!("{:?}", pilot.active_state()));
    pilot.release(MouseButton::Left);
    trace.push(format!("{:?}", pilot.active_state()));
    assert_snapshot!(trace.join(" -> "), @"Some(Highlight) -> Some(NumEditing) -> Some(NumEditing) -> None");
}

// ---------------------------------------------------------------------------
// Tooltips
// ---------------------------------------------------------------------------

#[test]
fn test_tooltip_shows_after_delay() {
    let (mut pilot, _) = slider_pilot();
    pilot.hover("Opacity");
    assert!(pilot.fire_timer(TimerKind::Tooltip));
    assert_eq!(pilot.rec().window.borrow().tooltip.as_deref(), Some("Surface opacity"));

    // Leaving hides it again.
    pilot.move_to(Point::new(500.0, 500.0));
    assert_eq!(pilot.rec().window.borrow().tooltip, None);
}

#[test]
fn test_tooltips_wait_for_motion_after_an_exit() {
    init_logging();
    let block = Block::new("tools").with(
        Widget::button("Bake")
            .with_rect(row_rect(0))
            .with_tooltip_fn(|w| format!("{} the simulation", w.label)),
    );
    let mut pilot = Pilot::new(MemoryStore::new()).with_block(block);
    pilot.click("Bake");
    assert_eq!(pilot.active_state(), None);

    // The first motion highlights again without a tooltip timer.
    pilot.move_by(Point::new(1.0, 0.0), 1);
    assert_eq!(pilot.active_state(), Some(InteractionState::Highlight));
    assert_eq!(pilot.rec().window.borrow().timer(TimerKind::Tooltip), None);

    pilot.move_by(Point::new(1.0, 0.0), 1);
    assert!(pilot.fire_timer(TimerKind::Tooltip));
    assert_eq!(pilot.rec().window.borrow().tooltips_shown, ["Bake the simulation"]);
}

// ---------------------------------------------------------------------------
// Multi-drag
// ---------------------------------------------------------------------------

#[test]
fn test_multi_drag_mirrors_the_delta() {
    init_logging();
    let info = PropertyInfo::float().range(-100.0, 100.0);
    let axes = ["x", "y", "z"].map(|axis| PropertyHandle::new("/World/Cube", format!("location_{axis}")));
    let mut store = MemoryStore::new();
    let mut block = Block::new("transform");
    for (row, handle) in axes.iter().enumerate() {
        store = store.with("/World/Cube", &handle.prop, info.clone(), Value::Float(row as f32 + 1.0));
        block.add(Widget::number(handle.prop.to_uppercase(), handle.clone(), &info).with_rect(row_rect(row)));
    }
    let mut pilot = Pilot::new(store).with_block(block);

    // Sweep down across all three fields, then drag sideways.
    pilot.hover("LOCATION_X");
    pilot.press(MouseButton::Left);
    pilot.move_to(Point::new(100.0, 30.0));
    pilot.move_to(Point::new(100.0, 50.0));
    pilot.move_by(Point::new(120.0, 0.0), 4);
    pilot.release(MouseButton::Left);

    let values = axes.each_ref().map(|h| pilot.value(h).as_f64().unwrap());
    let delta = values[0] - 1.0;
    assert!(delta > 0.0, "origin did not move: {values:?}");
    assert!((values[1] - 2.0 - delta).abs() < 1e-4, "{values:?}");
    assert!((values[2] - 3.0 - delta).abs() < 1e-4, "{values:?}");

    let mut updated = pilot.rec().updates.borrow().clone();
    updated.sort_by(|a, b| a.prop.cmp(&b.prop));
    assert_eq!(updated, axes.to_vec());
    assert_eq!(pilot.rec().undo.borrow().len(), 1);

    // Peers are untagged once the gesture is over.
    let region = pilot.ui().region();
    assert!(region.blocks[0].iter().all(|(_, w)| !w.flags.contains(WidgetFlags::DRAG_MULTI)));
}

/// Three number fields on `/World/Cube`, one per row, each with its own
/// property info and starting value.
fn axis_pilot(fields: [(&str, PropertyInfo, f32); 3]) -> (Pilot, Vec<PropertyHandle>) {
    init_logging();
    let mut store = MemoryStore::new();
    let mut block = Block::new("transform");
    let mut handles = Vec::new();
    for (row, (prop, info, value)) in fields.into_iter().enumerate() {
        let handle = PropertyHandle::new("/World/Cube", prop);
        store = store.with("/World/Cube", prop, info.clone(), Value::Float(value));
        block.add(Widget::number(prop.to_uppercase(), handle.clone(), &info).with_rect(row_rect(row)));
        handles.push(handle);
    }
    (Pilot::new(store).with_block(block), handles)
}

/// Press on the top field, sweep down over the other two, then drag
/// sideways by `dx`. The button stays pressed.
fn sweep_and_drag(pilot: &mut Pilot, top: &str, dx: f32) {
    pilot.hover(top);
    pilot.press(MouseButton::Left);
    pilot.move_to(Point::new(100.0, 30.0));
    pilot.move_to(Point::new(100.0, 50.0));
    pilot.move_by(Point::new(dx, 0.0), 8);
}

fn values(pilot: &Pilot, handles: &[PropertyHandle]) -> Vec<f64> {
    handles.iter().map(|h| pilot.value(h).as_f64().unwrap()).collect()
}

#[test]
fn test_multi_drag_escape_restores_peers() {
    let info = PropertyInfo::float().range(-100.0, 100.0);
    let (mut pilot, handles) =
        axis_pilot([("location_x", info.clone(), 1.0), ("location_y", info.clone(), 2.0), ("location_z", info, 3.0)]);
    sweep_and_drag(&mut pilot, "LOCATION_X", 120.0);
    let mid = values(&pilot, &handles);
    assert!(mid[0] > 1.0 && mid[1] > 2.0 && mid[2] > 3.0, "{mid:?}");

    pilot.key(Key::Escape);
    pilot.release(MouseButton::Left);
    assert_eq!(values(&pilot, &handles), [1.0, 2.0, 3.0]);
    assert_eq!(pilot.drained(), 0);
    assert!(pilot.rec().updates.borrow().is_empty());
    assert!(pilot.rec().undo.borrow().is_empty());
}

#[test]
fn test_multi_drag_proportional_for_lengths() {
    let info = PropertyInfo::float().range(-100.0, 100.0).unit(UnitType::Length);
    let (mut pilot, handles) =
        axis_pilot([("scale_x", info.clone(), 1.0), ("scale_y", info.clone(), 2.0), ("scale_z", info, 4.0)]);
    sweep_and_drag(&mut pilot, "SCALE_X", 120.0);
    pilot.release(MouseButton::Left);

    let v = values(&pilot, &handles);
    let factor = v[0] / 1.0;
    assert!(factor > 1.0, "{v:?}");
    // Peers scale with the origin instead of shifting by its delta.
    assert!((v[1] - 2.0 * factor).abs() < 1e-4, "{v:?}");
    assert!((v[2] - 4.0 * factor).abs() < 1e-4, "{v:?}");
}

#[test]
fn test_multi_drag_clamps_each_peer() {
    let info = PropertyInfo::float().range(-100.0, 100.0);
    let narrow = info.clone().soft_range(0.0, 2.5);
    let (mut pilot, handles) =
        axis_pilot([("location_x", info.clone(), 1.0), ("location_y", narrow, 2.0), ("location_z", info, 3.0)]);
    sweep_and_drag(&mut pilot, "LOCATION_X", 300.0);
    pilot.release(MouseButton::Left);

    let v = values(&pilot, &handles);
    let delta = v[0] - 1.0;
    assert!(delta > 0.5, "drag too short: {v:?}");
    assert_eq!(v[1], 2.5);
    assert!((v[2] - 3.0 - delta).abs() < 1e-4, "{v:?}");
}

#[test]
fn test_multi_drag_then_select_others_compose() {
    // Multi-drag mirrors onto the peers first; each peer then carries the
    // edit to the other selected owners from its own starting value.
    init_logging();
    let info = PropertyInfo::float().range(-100.0, 100.0);
    let props = ["location_x", "location_y", "location_z"];
    let mut store = MemoryStore::new();
    let mut block = Block::new("transform");
    for (row, prop) in props.iter().enumerate() {
        store = store
            .with("/World/Cube", prop, info.clone(), Value::Float(row as f32 + 1.0))
            .with("/World/Sphere", prop, info.clone(), Value::Float((row as f32 + 1.0) * 10.0));
        let handle = PropertyHandle::new("/World/Cube", *prop);
        block.add(Widget::number(prop.to_uppercase(), handle, &info).with_rect(row_rect(row)));
    }
    store.select(&["/World/Cube", "/World/Sphere"]);
    let mut pilot = Pilot::new(store).with_block(block);

    pilot.hover("LOCATION_X");
    pilot.send(Event::press(MouseButton::Left, pilot.pointer()).with_modifiers(Modifiers::ALT));
    pilot.move_to(Point::new(100.0, 30.0));
    pilot.move_to(Point::new(100.0, 50.0));
    pilot.move_by(Point::new(120.0, 0.0), 4);
    pilot.release(MouseButton::Left);

    let read = |owner: &str, prop: &str| pilot.value(&PropertyHandle::new(owner, prop)).as_f64().unwrap();
    let delta = read("/World/Cube", "location_x") - 1.0;
    assert!(delta > 0.0);
    for (row, prop) in props.iter().enumerate() {
        let base = row as f64 + 1.0;
        assert!((read("/World/Cube", prop) - base - delta).abs() < 1e-4, "{prop}");
        assert!((read("/World/Sphere", prop) - base * 10.0 - delta).abs() < 1e-4, "{prop}");
    }
    let updates = pilot.rec().updates.borrow().clone();
    assert_eq!(updates.len(), 6);
    assert!(props.iter().all(|p| updates.contains(&PropertyHandle::new("/World/Sphere", *p))));
}

// ---------------------------------------------------------------------------
// Number drag
// ---------------------------------------------------------------------------

#[test]
fn test_drag_from_below_the_soft_range_moves_gradually() {
    init_logging();
    let handle = PropertyHandle::new("/World/Cube", "offset");
    let info = PropertyInfo::float().range(-1.0e9, 1.0e9).soft_range(0.0, 1.0e6);
    let store = MemoryStore::new().with("/World/Cube", "offset", info.clone(), Value::Float(-500.0));
    let block = Block::new("panel").with(Widget::number("Offset", handle.clone(), &info).with_rect(row_rect(0)));
    let mut pilot = Pilot::new(store).with_block(block);

    pilot.hover("Offset");
    pilot.press(MouseButton::Left);
    pilot.move_by(Point::new(5.0, 0.0), 1);
    pilot.move_by(Point::new(1.0, 0.0), 1);
    pilot.move_by(Point::new(1.0, 0.0), 1);
    pilot.release(MouseButton::Left);

    let v = pilot.value(&handle).as_f64().unwrap();
    assert!(v > -500.0 && v < -499.0, "value jumped to {v}");
    assert_eq!(pilot.drained(), 1);
}

// ---------------------------------------------------------------------------
// Rows and toggles
// ---------------------------------------------------------------------------

#[test]
fn test_row_click_commits_only_the_clicked_row() {
    init_logging();
    let handle = PropertyHandle::new("/Render", "shading");
    let info = PropertyInfo::enumeration([(0, "Flat"), (1, "Solid"), (2, "Smooth")]);
    let store = MemoryStore::new().with("/Render", "shading", info.clone(), Value::Int(0));
    let mut block = Block::new("viewport");
    for (i, label) in ["Flat", "Solid", "Smooth"].into_iter().enumerate() {
        block.add(
            Widget::row(label, handle.clone(), &info, i as f64)
                .with_rect(Rect::new(i as f32 * 60.0, 0.0, 60.0, 20.0)),
        );
    }
    let mut pilot = Pilot::new(store).with_block(block);

    pilot.click("Solid");
    assert_eq!(pilot.value(&handle), Value::Int(1));
    assert_eq!(pilot.drained(), 1);
    assert_eq!(*pilot.rec().updates.borrow(), [handle]);

    let on: Vec<_> = ["Flat", "Solid", "Smooth"]
        .into_iter()
        .map(|label| {
            let wref = pilot.find(label).unwrap();
            pilot.ui().widget(wref).unwrap().flags.contains(WidgetFlags::ON)
        })
        .collect();
    assert_eq!(on, [false, true, false]);
}

#[test]
fn test_drag_toggle_sets_every_crossed_toggle() {
    init_logging();
    let info = PropertyInfo::boolean();
    let layers = ["layer_1", "layer_2", "layer_3"].map(|p| PropertyHandle::new("/Scene", p));
    let mut store = MemoryStore::new();
    let mut block = Block::new("layers");
    for (row, handle) in layers.iter().enumerate() {
        store = store.with("/Scene", &handle.prop, info.clone(), Value::Bool(false));
        block.add(Widget::toggle(handle.prop.clone(), handle.clone(), &info).with_rect(Rect::new(0.0, row as f32 * 20.0, 80.0, 20.0)));
    }
    let mut pilot = Pilot::new(store).with_block(block);

    pilot.hover("layer_1");
    pilot.press(MouseButton::Left);
    assert_eq!(pilot.value(&layers[0]), Value::Bool(true));
    pilot.move_to(Point::new(40.0, 30.0));
    assert!(pilot.ui().drag_toggle().is_some());
    pilot.move_to(Point::new(40.0, 50.0));
    pilot.release(MouseButton::Left);

    assert!(pilot.ui().drag_toggle().is_none());
    for handle in &layers {
        assert_eq!(pilot.value(handle), Value::Bool(true), "{}", handle.prop);
    }
    assert_eq!(*pilot.rec().updates.borrow(), layers.to_vec());
    assert_eq!(pilot.drained(), 3);
    assert_eq!(pilot.rec().undo.borrow().len(), 3);
}

#[test]
fn test_toggle_click_flips_once() {
    init_logging();
    let handle = PropertyHandle::new("/Scene", "visible");
    let info = PropertyInfo::boolean();
    let store = MemoryStore::new().with("/Scene", "visible", info.clone(), Value::Bool(true));
    let block = Block::new("b").with(Widget::toggle("Visible", handle.clone(), &info).with_rect(row_rect(0)));
    let mut pilot = Pilot::new(store).with_block(block);
    pilot.click("Visible");
    assert_eq!(pilot.value(&handle), Value::Bool(false));
    assert!(pilot.ui().drag_toggle().is_none());
    assert_eq!(pilot.drained(), 1);
}

// ---------------------------------------------------------------------------
// Menus
// ---------------------------------------------------------------------------

#[test]
fn test_enum_menu_pick() {
    init_logging();
    let handle = PropertyHandle::new("/World/Cube", "mode");
    let info = PropertyInfo::enumeration([(0, "Object"), (3, "Edit")]);
    let store = MemoryStore::new().with("/World/Cube", "mode", info.clone(), Value::Int(0));
    let block = Block::new("header")
        .with(Widget::property(WidgetKind::Menu, "Mode", handle.clone(), &info).with_rect(row_rect(0)));
    let mut pilot = Pilot::new(store).with_block(block);

    pilot.click("Mode");
    assert_eq!(pilot.active_state(), Some(InteractionState::MenuOpen));
    assert_eq!(pilot.ui().popups().len(), 1);

    pilot.click("Edit");
    assert_eq!(pilot.ui().popups().len(), 0);
    assert_eq!(pilot.value(&handle), Value::Int(3));
    assert_eq!(*pilot.rec().updates.borrow(), [handle]);
}

#[test]
fn test_pulldown_return_leaves_its_property_alone() {
    init_logging();
    let handle = PropertyHandle::new("/World/Cube", "mode");
    let info = PropertyInfo::enumeration([(0, "Object"), (3, "Edit")]);
    let store = MemoryStore::new().with("/World/Cube", "mode", info.clone(), Value::Int(0));
    let pulldown = Widget::property(WidgetKind::Pulldown, "Mode", handle.clone(), &info)
        .with_rect(row_rect(0))
        .with_menu(|_| Block::menu("modes").with(Widget::menu_item("Edit", 3.0).with_rect(row_rect(0))));
    let mut pilot = Pilot::new(store).with_block(Block::new("header").with(pulldown));

    pilot.click("Mode");
    assert_eq!(pilot.ui().popups().len(), 1);
    pilot.click("Edit");
    assert_eq!(pilot.ui().popups().len(), 0);
    // Only plain menus write the chosen item back.
    assert_eq!(pilot.value(&handle), Value::Int(0));
}

fn export_menu(_: &Widget) -> Block {
    Block::menu("export").with(
        Widget::button("Wavefront (.obj)")
            .with_rect(row_rect(0))
            .with_operator(OperatorCall::new("wm.obj_export")),
    )
}

fn file_items(_: &Widget) -> Block {
    Block::menu("file")
        .with(Widget::button("New").with_rect(row_rect(0)).with_operator(OperatorCall::new("wm.read_homefile")))
        .with(Widget::menu("Export", export_menu).with_rect(row_rect(1)))
}

fn file_menu() -> Block {
    Block::new("topbar").with(Widget::menu("File", file_items).with_rect(Rect::new(0.0, 0.0, 60.0, 20.0)))
}

#[test]
fn test_submenu_item_runs_its_operator() {
    init_logging();
    let mut pilot = Pilot::new(MemoryStore::new()).with_block(file_menu());
    pilot.click("File");
    pilot.click("Export");
    assert_eq!(pilot.ui().popups().len(), 2);

    pilot.click("Wavefront (.obj)");
    assert_eq!(pilot.ui().popups().len(), 0);
    assert_eq!(pilot.active_state(), None);
    assert_eq!(*pilot.rec().operators.borrow(), ["wm.obj_export"]);
}

#[test]
fn test_escape_cancels_the_whole_cascade() {
    init_logging();
    let mut pilot = Pilot::new(MemoryStore::new()).with_block(file_menu());
    pilot.click("File");
    pilot.click("Export");
    assert_eq!(pilot.ui().popups().len(), 2);

    pilot.key(Key::Escape);
    assert_eq!(pilot.ui().popups().len(), 0);
    assert_eq!(pilot.active_state(), None);
    assert!(pilot.rec().operators.borrow().is_empty());
}

#[test]
fn test_keyboard_navigation_in_menu() {
    init_logging();
    let mut pilot = Pilot::new(MemoryStore::new()).with_block(file_menu());
    pilot.click("File");
    pilot.key(Key::Down);
    assert_eq!(pilot.popup_state(0), Some(InteractionState::Highlight));
    pilot.key(Key::Enter);
    assert!(pilot.fire_timer(TimerKind::Flash));
    assert_eq!(pilot.ui().popups().len(), 0);
    assert_eq!(*pilot.rec().operators.borrow(), ["wm.read_homefile"]);
}

// ---------------------------------------------------------------------------
// Text entry
// ---------------------------------------------------------------------------

fn scale_pilot() -> (Pilot, PropertyHandle) {
    init_logging();
    let handle = PropertyHandle::new("/World/Cube", "scale");
    let info = PropertyInfo::float().range(0.0, 100.0);
    let store = MemoryStore::new().with("/World/Cube", "scale", info.clone(), Value::Float(1.0));
    let block = Block::new("transform")
        .with(Widget::number("Scale", handle.clone(), &info).with_rect(row_rect(0)))
        .with(Widget::number("Offset", PropertyHandle::new("/World/Cube", "offset"), &info).with_rect(row_rect(1)));
    let store = store.with("/World/Cube", "offset", info, Value::Float(0.0));
    (Pilot::new(store).with_block(block), handle)
}

#[test]
fn test_typed_expression_is_evaluated() {
    let (mut pilot, handle) = scale_pilot();
    let scale = pilot.find("Scale").unwrap();
    pilot.ui_mut().activate(scale, ActivationType::TextEditing).unwrap();
    assert!(pilot.ui().is_editing(scale));

    pilot.type_text("2*(1+2)");
    pilot.key(Key::Enter);
    assert_eq!(pilot.value(&handle), Value::Float(6.0));
    assert!(!pilot.ui().is_editing(scale));
}

#[test]
fn test_invalid_expression_reports_and_cancels() {
    let (mut pilot, handle) = scale_pilot();
    let scale = pilot.find("Scale").unwrap();
    pilot.ui_mut().activate(scale, ActivationType::TextEditing).unwrap();
    pilot.type_text("2*");
    pilot.key(Key::Enter);

    assert_eq!(pilot.value(&handle), Value::Float(1.0));
    assert_eq!(pilot.drained(), 0);
    let window = pilot.rec().window.borrow();
    let messages = window.report_messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("invalid number `2*`"), "{messages:?}");
}

#[test]
fn test_tab_moves_to_the_next_field() {
    let (mut pilot, handle) = scale_pilot();
    let scale = pilot.find("Scale").unwrap();
    pilot.ui_mut().activate(scale, ActivationType::TextEditing).unwrap();
    pilot.type_text("4");
    pilot.key(Key::Tab);

    assert_eq!(pilot.value(&handle), Value::Float(4.0));
    assert_eq!(pilot.active_label().as_deref(), Some("Offset"));
    assert_eq!(pilot.active_state(), Some(InteractionState::TextEditing));
}

#[test]
fn test_driven_values_refuse_edits() {
    init_logging();
    let handle = PropertyHandle::new("/World/Cube", "scale");
    let info = PropertyInfo::float().range(0.0, 100.0);
    let store = MemoryStore::new().with("/World/Cube", "scale", info.clone(), Value::Float(1.0));
    let block = Block::new("b").with(
        Widget::number("Scale", handle.clone(), &info).with_rect(row_rect(0)).with_flags(WidgetFlags::DRIVEN),
    );
    let mut pilot = Pilot::new(store).with_block(block);
    let scale = pilot.find("Scale").unwrap();
    pilot.ui_mut().activate(scale, ActivationType::TextEditing).unwrap();
    pilot.type_text("3");
    pilot.key(Key::Enter);

    assert_eq!(pilot.value(&handle), Value::Float(1.0));
    assert_eq!(pilot.rec().window.borrow().report_messages(), ["can't edit driven value"]);
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

fn material_search() -> (Pilot, PropertyHandle) {
    init_logging();
    let handle = PropertyHandle::new("/World/Cube", "material");
    let info = PropertyInfo::string();
    let store = MemoryStore::new().with("/World/Cube", "material", info.clone(), Value::String(String::new()));
    let search = SearchData::new(|query| {
        ["Metal", "Mesh Light", "Glass"]
            .into_iter()
            .filter(|name| name.starts_with(query))
            .map(|name| SearchItem::new(name, Value::String(name.to_owned())))
            .collect()
    });
    let block = Block::new("material").with(
        Widget::property(WidgetKind::SearchMenu, "Material", handle.clone(), &info)
            .with_rect(row_rect(0))
            .with_search(search),
    );
    (Pilot::new(store).with_block(block), handle)
}

#[test]
fn test_search_commits_the_highlighted_item() {
    let (mut pilot, handle) = material_search();
    pilot.click("Material");
    assert_eq!(pilot.active_state(), Some(InteractionState::TextEditing));
    pilot.type_text("Me");
    pilot.key(Key::Down);
    pilot.key(Key::Enter);
    assert_eq!(pilot.value(&handle), Value::String("Mesh Light".into()));
}

#[test]
fn test_search_without_match_reports_and_cancels() {
    let (mut pilot, handle) = material_search();
    pilot.click("Material");
    pilot.type_text("Wood");
    pilot.key(Key::Enter);
    assert_eq!(pilot.value(&handle), Value::String(String::new()));
    assert_eq!(pilot.rec().window.borrow().report_messages(), ["failed to find 'Wood'"]);
    assert_eq!(pilot.drained(), 0);
}

// ---------------------------------------------------------------------------
// Context menu and pie menus
// ---------------------------------------------------------------------------

#[test]
fn test_right_click_opens_context_menu() {
    let (pilot, handle) = slider_pilot();
    let mut pilot = pilot.with_context_menu(|w| {
        (w.kind == WidgetKind::NumberSlider).then(|| {
            Block::menu("context").with(
                Widget::button("Copy Data Path")
                    .with_rect(Rect::new(0.0, 0.0, 120.0, 20.0))
                    .with_operator(OperatorCall::new("ui.copy_data_path")),
            )
        })
    });
    pilot.hover("Opacity");
    pilot.press(MouseButton::Right);
    assert_eq!(pilot.ui().popups().len(), 1);
    assert_eq!(pilot.active_state(), None);

    pilot.click("Copy Data Path");
    assert_eq!(pilot.ui().popups().len(), 0);
    assert_eq!(*pilot.rec().operators.borrow(), ["ui.copy_data_path"]);
    assert_eq!(pilot.value(&handle), Value::Float(0.5));
}

#[test]
fn test_pie_picks_by_direction_on_trigger_release() {
    init_logging();
    let mut pilot = Pilot::new(MemoryStore::new());
    pilot.move_to(Point::new(300.0, 200.0));
    let items = vec![
        Widget::menu_item("Object Mode", 0.0)
            .with_pie_dir(RadialDirection::North)
            .with_operator(OperatorCall::new("object.mode_set_object")),
        Widget::menu_item("Edit Mode", 1.0)
            .with_pie_dir(RadialDirection::East)
            .with_operator(OperatorCall::new("object.mode_set_edit")),
    ];
    pilot.ui_mut().pie_menu_invoke("Mode", items, EventType::Key(Key::Tab));
    assert_eq!(pilot.ui().popups().len(), 1);

    pilot.move_to(Point::new(360.0, 201.0));
    assert_eq!(pilot.popup_state(0), Some(InteractionState::Highlight));
    pilot.key_release(Key::Tab);

    assert_eq!(pilot.ui().popups().len(), 0);
    assert_eq!(*pilot.rec().operators.borrow(), ["object.mode_set_edit"]);
}

// ---------------------------------------------------------------------------
// Floating popups
// ---------------------------------------------------------------------------

type Outcomes = Rc<RefCell<Vec<&'static str>>>;

fn confirm_popup(outcomes: &Outcomes) -> PopupInvocation {
    let (success, cancel, free) = (outcomes.clone(), outcomes.clone(), outcomes.clone());
    PopupInvocation::new(|_| {
        Block::menu("confirm")
            .with(Widget::button("Delete").with_rect(Rect::new(0.0, 0.0, 100.0, 20.0)))
            .with(Widget::button("Keep").with_rect(Rect::new(0.0, 20.0, 100.0, 20.0)))
    })
    .with_free(move || free.borrow_mut().push("free"))
    .on_success(move |_, _| success.borrow_mut().push("success"))
    .on_cancel(move |_, _| cancel.borrow_mut().push("cancel"))
    .at(Point::new(50.0, 50.0))
}

#[test]
fn test_popup_accept_runs_success_only() {
    init_logging();
    let outcomes = Outcomes::default();
    let mut pilot = Pilot::new(MemoryStore::new());
    pilot.ui_mut().popup_block_invoke_ex(confirm_popup(&outcomes));
    assert!(pilot.ui().popups().is_floating());

    pilot.click("Delete");
    assert!(pilot.ui().popups().is_empty());
    assert_eq!(*outcomes.borrow(), ["free", "success"]);
}

#[test]
fn test_popup_escape_runs_cancel_only() {
    init_logging();
    let outcomes = Outcomes::default();
    let mut pilot = Pilot::new(MemoryStore::new());
    pilot.ui_mut().popup_block_invoke_ex(confirm_popup(&outcomes));
    pilot.hover("Keep");
    pilot.key(Key::Escape);
    assert!(pilot.ui().popups().is_empty());
    assert_eq!(*outcomes.borrow(), ["free", "cancel"]);
}

#[test]
fn test_popup_of_a_closed_window_runs_no_callback() {
    init_logging();
    let outcomes = Outcomes::default();
    let mut pilot = Pilot::new(MemoryStore::new());
    pilot.ui_mut().popup_block_invoke_ex(confirm_popup(&outcomes));
    pilot.rec().window.borrow_mut().alive = false;
    pilot.key(Key::Escape);
    assert!(pilot.ui().popups().is_empty());
    assert_eq!(*outcomes.borrow(), ["free"]);
}

#[test]
fn test_popup_menu_invoke_stacks_items() {
    init_logging();
    let mut pilot = Pilot::new(MemoryStore::new());
    pilot.move_to(Point::new(10.0, 10.0));
    pilot
        .ui_mut()
        .popup_menu_invoke("Add", || {
            vec![
                Widget::menu_item("Cube", 0.0).with_operator(OperatorCall::new("mesh.primitive_cube_add")),
                Widget::menu_item("Sphere", 1.0).with_operator(OperatorCall::new("mesh.primitive_uv_sphere_add")),
            ]
        })
        .unwrap();
    pilot.click("Sphere");
    assert_eq!(*pilot.rec().operators.borrow(), ["mesh.primitive_uv_sphere_add"]);
}

// ---------------------------------------------------------------------------
// Rebuild continuity
// ---------------------------------------------------------------------------

#[test]
fn test_drag_survives_a_rebuild() {
    let (mut pilot, handle) = slider_pilot();
    let (_, info) = opacity();
    pilot.hover("Opacity");
    pilot.press(MouseButton::Left);
    pilot.move_by(Point::new(10.0, 0.0), 1);
    pilot.move_by(Point::new(10.0, 0.0), 1);

    let before = pilot.find("Opacity").unwrap();
    pilot.ui_mut().rebuild(vec![
        Block::new("material").with(Widget::slider("Opacity", handle.clone(), &info).with_rect(row_rect(0))),
    ]);
    assert!(pilot.ui().widget(before).is_none());
    assert_eq!(pilot.active_state(), Some(InteractionState::NumEditing));

    pilot.move_by(Point::new(40.0, 0.0), 4);
    pilot.release(MouseButton::Left);
    assert_eq!(pilot.value(&handle), Value::Float(0.7));
    assert_eq!(pilot.drained(), 1);
}

// ---------------------------------------------------------------------------
// Raw slots and keys
// ---------------------------------------------------------------------------

#[test]
fn test_ctrl_wheel_steps_a_raw_slot() {
    init_logging();
    let slot = RawSlot::new(7, 0, RawType::Int);
    let mut raw = RawSlots::new();
    raw.insert(slot, 5.0);
    let block = Block::new("legacy").with(Widget::new(WidgetKind::Number, "Samples").bind_raw(slot).with_range(0.0, 64.0).with_rect(row_rect(0)));
    let mut pilot = Pilot::new(MemoryStore::new()).with_block(block).with_raw(raw);

    pilot.hover("Samples");
    let at = pilot.pointer();
    pilot.send(Event::wheel(true, at).with_modifiers(Modifiers::CTRL));
    assert_eq!(pilot.ui().services().raw.read(&slot), Some(6.0));
}

#[test]
fn test_hotkey_capture() {
    init_logging();
    let block = Block::new("keymap").with(Widget::new(WidgetKind::HotkeyEvent, "Shortcut").with_rect(row_rect(0)));
    let mut pilot = Pilot::new(MemoryStore::new()).with_block(block);
    pilot.click("Shortcut");
    assert_eq!(pilot.active_state(), Some(InteractionState::WaitKeyEvent));
    pilot.key_with(Key::Char('d'), Modifiers::SHIFT);

    let wref = pilot.find("Shortcut").unwrap();
    let w = pilot.ui().widget(wref).unwrap();
    assert_eq!(w.hotkey, Some((Key::Char('d'), Modifiers::SHIFT)));
}
