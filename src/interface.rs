//! The per-window interface: one main region, its popups and the queue of
//! pending commits.
//!
//! [`Interface`] is the entry point the host talks to. Every input event
//! goes through [`Interface::handle_event`], which routes it to the running
//! drag-toggle gesture, the floating popup or the main region, then drains
//! the after-func queue once the state machine has settled.

use log::{debug, trace};

use crate::block::{Block, Region, WidgetRef};
use crate::error::{Result, UiError};
use crate::event::{Event, EventType, EventValue};
use crate::geometry::Point;
use crate::handler::activate::{activate_exit, free_active, handle_button_activate};
use crate::handler::region::region_handler;
use crate::handler::{
    drag_toggle, ActivationType, AfterQueue, DragToggle, HandlerCtx, HandlerResult, Level,
};
use crate::host::Services;
use crate::popup::invoke::{menu_block, open_floating, pie_block};
use crate::popup::menu::popup_handler;
use crate::popup::{close_popups, push_block, with_frame_region, ContextMenuFn, PopupInvocation, PopupStack};
use crate::prefs::UiPreferences;
use crate::property::ValueBinding;
use crate::widget::{Widget, WidgetFlags};

// ---------------------------------------------------------------------------
// Interface
// ---------------------------------------------------------------------------

/// Widget interaction for one window.
///
/// Owns the main [`Region`], the [`PopupStack`] and the [`AfterQueue`], and
/// hands handlers disjoint borrows of them for each event.
///
/// # Examples
///
/// ```ignore
/// let mut ui = Interface::new(services).with_block(block);
/// ui.handle_event(&Event::mouse_move(Point::ZERO, Point::new(10.0, 5.0)));
/// ui.handle_event(&Event::press(MouseButton::Left, Point::new(10.0, 5.0)));
/// ```
pub struct Interface {
    main: Region,
    popups: PopupStack,
    services: Services,
    after: AfterQueue,
    prefs: UiPreferences,
    drag_toggle: Option<DragToggle>,
    context_menu: Option<ContextMenuFn>,
    last_mouse: Point,
}

impl Interface {
    pub fn new(services: Services) -> Self {
        Self {
            main: Region::new(),
            popups: PopupStack::new(),
            services,
            after: AfterQueue::new(),
            prefs: UiPreferences::default(),
            drag_toggle: None,
            context_menu: None,
            last_mouse: Point::ZERO,
        }
    }

    pub fn with_prefs(mut self, prefs: UiPreferences) -> Self {
        self.prefs = prefs;
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.main.add_block(block);
        self
    }

    /// Register the builder of right-click menus.
    pub fn with_context_menu(mut self, f: impl Fn(&Widget) -> Option<Block> + 'static) -> Self {
        self.context_menu = Some(std::rc::Rc::new(f));
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn region(&self) -> &Region {
        &self.main
    }

    pub fn popups(&self) -> &PopupStack {
        &self.popups
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn services_mut(&mut self) -> &mut Services {
        &mut self.services
    }

    pub fn prefs(&self) -> &UiPreferences {
        &self.prefs
    }

    pub fn after(&self) -> &AfterQueue {
        &self.after
    }

    /// The running drag-toggle gesture.
    pub fn drag_toggle(&self) -> Option<&DragToggle> {
        self.drag_toggle.as_ref()
    }

    pub fn last_mouse(&self) -> Point {
        self.last_mouse
    }

    /// Reference to the first main-region widget labelled `label`.
    pub fn find(&self, label: &str) -> Option<WidgetRef> {
        let (bi, id) = self.main.find_label(label)?;
        self.main.widget_ref(bi, id)
    }

    /// Reference to the widget labelled `label` in popup frame `depth`.
    pub fn find_in_popup(&self, depth: usize, label: &str) -> Option<WidgetRef> {
        let region = &self.popups.frame(depth)?.region;
        let (bi, id) = region.find_label(label)?;
        region.widget_ref(bi, id)
    }

    /// Look a reference up in the main region and every popup.
    pub fn widget(&self, wref: WidgetRef) -> Option<&Widget> {
        let regions = std::iter::once(&self.main).chain((0..self.popups.len()).filter_map(|i| {
            self.popups.frame(i).map(|f| &f.region)
        }));
        for region in regions {
            if let Some((bi, id)) = region.resolve(wref) {
                return region.widget(bi, id);
            }
        }
        None
    }

    fn split(&mut self) -> (HandlerCtx<'_>, &mut Region) {
        let cx = HandlerCtx {
            services: &mut self.services,
            after: &mut self.after,
            prefs: &self.prefs,
            popups: &mut self.popups,
            drag_toggle: &mut self.drag_toggle,
            context_menu: self.context_menu.as_ref(),
            level: Level::Main,
        };
        (cx, &mut self.main)
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Handle one input event, then run the commits it queued.
    pub fn handle_event(&mut self, event: &Event) -> HandlerResult {
        if event.is_mouse() {
            self.last_mouse = event.mouse_pos;
        }
        let mut result = self.dispatch(event);
        // An unhandled double-click is seen again as a plain press.
        if result == HandlerResult::Continue && event.value == EventValue::DoubleClick {
            trace!("double-click not handled, retrying as press");
            result = self.dispatch(&Event { value: EventValue::Press, ..*event });
        }
        self.after.drain(&mut self.services);
        debug_assert!(self.main.verify_single_active().is_ok(), "more than one active widget");
        result
    }

    fn dispatch(&mut self, event: &Event) -> HandlerResult {
        trace!("event {:?} {:?} at {:?}", event.kind, event.value, event.mouse_pos);
        let (mut cx, region) = self.split();

        if let Some(level) = cx.drag_toggle.as_ref().map(|dt| dt.level) {
            match level {
                Level::Main => {
                    drag_toggle::handle(&mut cx, region, event);
                }
                Level::Popup(i) => {
                    let handled = with_frame_region(&mut cx, i, |cx, r| drag_toggle::handle(cx, r, event));
                    if handled.is_none() {
                        debug!("drag-toggle popup closed, dropping gesture");
                        *cx.drag_toggle = None;
                    }
                }
            }
            return HandlerResult::Break;
        }

        if cx.popups.is_floating() {
            return popup_handler(&mut cx, event);
        }
        region_handler(&mut cx, region, event)
    }

    // ── Programmatic control ─────────────────────────────────────────

    /// Activate a main-region widget, replacing the active one.
    ///
    /// Fails without touching the region when the widget is gone, not
    /// interactive, or asked to edit a value it does not have.
    pub fn activate(&mut self, wref: WidgetRef, ty: ActivationType) -> Result<()> {
        self.main.verify_single_active()?;
        let (bi, id) = self.main.resolve(wref).ok_or(UiError::WidgetNotFound)?;
        let w = self.main.widget(bi, id).ok_or(UiError::WidgetNotFound)?;
        if !w.is_interactive() {
            return Err(UiError::NotInteractive);
        }
        if let ValueBinding::Raw(slot) = &w.binding {
            if self.services.raw.read(slot).is_none() {
                return Err(UiError::UnresolvedBinding);
            }
        }
        if ty == ActivationType::TextEditing && w.kind.is_number() {
            w.read_f64(&self.services)?;
        }

        let (mut cx, region) = self.split();
        handle_button_activate(&mut cx, region, bi, id, ty);
        self.after.drain(&mut self.services);
        Ok(())
    }

    /// Whether `wref` is the active widget and an edit is in progress.
    pub fn is_editing(&self, wref: WidgetRef) -> bool {
        let editing = |region: &Region| {
            region.resolve(wref).is_some_and(|loc| {
                region.active_widget() == Some(loc) && region.active_state().is_some_and(|s| s.is_editing())
            })
        };
        editing(&self.main) || (0..self.popups.len()).any(|i| self.popups.frame(i).is_some_and(|f| editing(&f.region)))
    }

    /// Cancel the active widget and close every popup, as when the window
    /// loses focus.
    pub fn cancel_all(&mut self) {
        let (mut cx, region) = self.split();
        if let Some(mut ab) = region.active.take() {
            ab.data.cancel = true;
            activate_exit(&mut cx, region, &mut ab, false, false);
        }
        close_popups(&mut cx, 0);
        if cx.drag_toggle.take().is_some() {
            cx.services.window.remove_modal_handler(crate::host::ModalHandler::Region);
        }
        self.after.drain(&mut self.services);
    }

    /// Replace the main region's blocks with a freshly built set.
    ///
    /// The active widget keeps its interaction data when a widget with the
    /// same identity exists in the new block of the same name; otherwise it
    /// is released as if its block had been freed.
    pub fn rebuild(&mut self, blocks: Vec<Block>) {
        let old = std::mem::replace(&mut self.main.blocks, blocks);
        let Some(mut ab) = self.main.active.take() else {
            return;
        };
        let target = old.get(ab.block).and_then(|ob| {
            let w = ob.get(ab.widget)?;
            let nbi = self.main.block_index(&ob.name)?;
            let nid = self.main.blocks[nbi].find_same(w)?;
            Some((nbi, nid))
        });

        match target {
            Some((nbi, nid)) => {
                debug!("rebuild kept active widget in `{}`", self.main.blocks[nbi].name);
                ab.block = nbi;
                ab.widget = nid;
                if let Some(w) = self.main.widget_mut(nbi, nid) {
                    w.flags.insert(WidgetFlags::ACTIVE);
                }
                let owner = self.main.widget_ref(nbi, nid);
                if let Some(frame) = ab.data.menu.and_then(|i| self.popups.frame_mut(i)) {
                    frame.owner = owner;
                }
                self.main.active = Some(ab);
            }
            None => {
                debug!("rebuild dropped the active widget");
                let fresh = std::mem::replace(&mut self.main.blocks, old);
                self.main.active = Some(ab);
                let (mut cx, region) = self.split();
                free_active(&mut cx, region);
                self.main.blocks = fresh;
                self.after.drain(&mut self.services);
            }
        }
    }

    // ── Popup invocation ─────────────────────────────────────────────

    /// Open a floating popup built by `create`; `free` runs when it closes.
    pub fn popup_block_invoke(
        &mut self,
        create: impl FnOnce(&UiPreferences) -> Block + 'static,
        free: impl FnOnce() + 'static,
    ) -> usize {
        self.popup_block_invoke_ex(PopupInvocation::new(create).with_free(free))
    }

    /// Open a floating popup with an operator and result callbacks.
    pub fn popup_block_invoke_ex(&mut self, inv: PopupInvocation) -> usize {
        let pointer = self.last_mouse;
        let (mut cx, _) = self.split();
        open_floating(&mut cx, inv, pointer)
    }

    /// Open a titled menu listing `items` at the pointer.
    pub fn popup_menu_invoke(&mut self, title: &str, items: impl FnOnce() -> Vec<Widget>) -> Result<usize> {
        let block = menu_block(title, items(), &self.prefs)?;
        Ok(self.popup_block_invoke_ex(PopupInvocation::new(move |_| block)))
    }

    /// Open a pie menu centred on the pointer. `trigger` is the key or
    /// button that opened it; releasing it picks the highlighted item.
    pub fn pie_menu_invoke(&mut self, title: &str, items: Vec<Widget>, trigger: EventType) -> usize {
        let (block, corner) = pie_block(title, items, trigger, self.last_mouse, &self.prefs);
        let (mut cx, _) = self.split();
        close_popups(&mut cx, 0);
        push_block(&mut cx, block, corner, None)
    }
}

impl std::fmt::Debug for Interface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interface")
            .field("main", &self.main)
            .field("popups", &self.popups)
            .field("after", &self.after.len())
            .field("drag_toggle", &self.drag_toggle)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MouseButton;
    use crate::geometry::Rect;
    use crate::handler::InteractionState;
    use crate::property::{MemoryStore, PropertyHandle, PropertyInfo, RawSlot, RawType, Value};
    use crate::testing::mock;
    use crate::widget::WidgetKind;

    fn size() -> PropertyHandle {
        PropertyHandle::new("/cube", "size")
    }

    fn ui() -> Interface {
        let info = PropertyInfo::float().range(0.0, 10.0);
        let store = MemoryStore::new().with("/cube", "size", info.clone(), Value::Float(2.0));
        let block = Block::new("panel")
            .with(Widget::number("Size", size(), &info).with_rect(Rect::new(0.0, 0.0, 100.0, 20.0)))
            .with(Widget::label("Note").with_rect(Rect::new(0.0, 20.0, 100.0, 20.0)))
            .with(Widget::button("Go").with_rect(Rect::new(0.0, 40.0, 100.0, 20.0)));
        Interface::new(mock::services(store)).with_block(block)
    }

    // ── Activation ───────────────────────────────────────────────────

    #[test]
    fn activate_rejects_labels() {
        let mut ui = ui();
        let note = ui.find("Note").unwrap();
        assert!(matches!(ui.activate(note, ActivationType::Activate), Err(UiError::NotInteractive)));
        assert!(ui.region().active_widget().is_none());
    }

    #[test]
    fn activate_replaces_the_active_widget() {
        let mut ui = ui();
        let size = ui.find("Size").unwrap();
        let go = ui.find("Go").unwrap();
        ui.activate(size, ActivationType::Activate).unwrap();
        ui.activate(go, ActivationType::Activate).unwrap();
        assert_eq!(ui.region().active_widget(), ui.region().resolve(go));
        assert!(ui.region().verify_single_active().is_ok());
    }

    #[test]
    fn text_editing_a_number_is_editing() {
        let mut ui = ui();
        let size = ui.find("Size").unwrap();
        ui.activate(size, ActivationType::TextEditing).unwrap();
        assert!(ui.is_editing(size));
        assert_eq!(ui.region().active_state(), Some(InteractionState::TextEditing));
    }

    #[test]
    fn dangling_raw_binding_is_refused() {
        let block = Block::new("raw").with(
            Widget::new(WidgetKind::Number, "Raw")
                .bind_raw(RawSlot::new(9, 0, RawType::Float))
                .with_rect(Rect::new(0.0, 0.0, 50.0, 20.0)),
        );
        let mut ui = Interface::new(mock::services(MemoryStore::new())).with_block(block);
        let raw = ui.find("Raw").unwrap();
        assert!(matches!(ui.activate(raw, ActivationType::TextEditing), Err(UiError::UnresolvedBinding)));
    }

    // ── Rebuild ──────────────────────────────────────────────────────

    #[test]
    fn rebuild_keeps_the_edit_on_the_matching_widget() {
        let mut ui = ui();
        let size = ui.find("Size").unwrap();
        ui.activate(size, ActivationType::TextEditing).unwrap();

        let info = PropertyInfo::float().range(0.0, 10.0);
        ui.rebuild(vec![Block::new("panel")
            .with(Widget::label("Header").with_rect(Rect::new(0.0, 0.0, 100.0, 20.0)))
            .with(Widget::number("Size", self::size(), &info).with_rect(Rect::new(0.0, 20.0, 100.0, 20.0)))]);

        assert_eq!(ui.region().resolve(size), None);
        let fresh = ui.find("Size").unwrap();
        assert!(ui.is_editing(fresh));
        assert!(ui.widget(fresh).unwrap().flags.contains(WidgetFlags::ACTIVE));
    }

    #[test]
    fn rebuild_without_match_releases_the_widget() {
        let mut ui = ui();
        let go = ui.find("Go").unwrap();
        ui.activate(go, ActivationType::Activate).unwrap();
        ui.rebuild(vec![Block::new("other").with(Widget::button("Go"))]);
        assert!(ui.region().active_widget().is_none());
    }

    // ── Routing ──────────────────────────────────────────────────────

    #[test]
    fn hover_highlights() {
        let mut ui = ui();
        let to = Point::new(10.0, 50.0);
        ui.handle_event(&Event::mouse_move(Point::ZERO, to));
        assert_eq!(ui.region().active_state(), Some(InteractionState::Highlight));
        assert_eq!(ui.region().active_widget(), ui.find("Go").and_then(|r| ui.region().resolve(r)));
        ui.handle_event(&Event::press(MouseButton::Left, to));
        assert_eq!(ui.region().active_state(), Some(InteractionState::WaitRelease));
    }

    #[test]
    fn cancel_all_closes_popups() {
        let mut ui = ui();
        ui.popup_menu_invoke("Add", || vec![Widget::menu_item("Cube", 0.0)]).unwrap();
        assert!(ui.popups().is_floating());
        ui.cancel_all();
        assert!(ui.popups().is_empty());
    }
}
