//! Callbacks attached to widgets and blocks.
//!
//! Closures capture their own arguments; the N-ary handler additionally gets
//! an opaque shared argument, mirroring handlers that are registered once and
//! reused across many widgets. All of them run from the after-func drain
//! through a [`CallbackCtx`], never while a widget is mid-transition.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::block::Block;
use crate::handler::after::CallbackCtx;
use crate::property::{PropertyHandle, Value};

use super::Widget;

/// What a click callback learns about the widget that fired it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallbackInfo {
    pub retval: i32,
    pub label: String,
    pub handle: Option<PropertyHandle>,
}

/// Plain click handler.
pub type ButtonFn = Rc<dyn Fn(&mut CallbackCtx<'_>, &CallbackInfo)>;
/// N-ary handler with a shared opaque argument.
pub type ButtonNFn = Rc<dyn Fn(&mut CallbackCtx<'_>, &CallbackInfo, &dyn Any)>;
/// Rename handler: `(ctx, new_name, old_name)`.
pub type RenameFn = Rc<dyn Fn(&mut CallbackCtx<'_>, &str, &str)>;
/// Runs when the press is held past the hold delay.
pub type HoldFn = Rc<dyn Fn(&mut CallbackCtx<'_>, &CallbackInfo)>;
/// Builds tooltip text on demand.
pub type TooltipFn = Rc<dyn Fn(&Widget) -> String>;
/// Builds the child block shown when a menu widget opens.
pub type MenuCreateFn = Rc<dyn Fn(&Widget) -> Block>;
/// Candidate completions for the text typed so far.
pub type AutocompleteFn = Rc<dyn Fn(&str) -> Vec<String>>;

/// Block-level handler run after any widget of the block commits, with the
/// widget's return value.
pub type BlockHandleFn = Rc<dyn Fn(&mut CallbackCtx<'_>, i32)>;
/// Menu handler run when a menu item commits, with the item's value.
pub type MenuHandleFn = Rc<dyn Fn(&mut CallbackCtx<'_>, f64)>;

/// The optional callbacks of a widget.
#[derive(Clone, Default)]
pub struct WidgetCallbacks {
    pub on_click: Option<ButtonFn>,
    pub on_click_n: Option<(ButtonNFn, Rc<dyn Any>)>,
    pub rename: Option<RenameFn>,
    pub hold: Option<HoldFn>,
    pub tooltip: Option<TooltipFn>,
    pub menu_create: Option<MenuCreateFn>,
    pub autocomplete: Option<AutocompleteFn>,
}

impl WidgetCallbacks {
    /// Whether anything runs on commit.
    pub fn has_click(&self) -> bool {
        self.on_click.is_some() || self.on_click_n.is_some() || self.rename.is_some()
    }
}

impl fmt::Debug for WidgetCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetCallbacks")
            .field("on_click", &self.on_click.is_some())
            .field("on_click_n", &self.on_click_n.is_some())
            .field("rename", &self.rename.is_some())
            .field("hold", &self.hold.is_some())
            .field("tooltip", &self.tooltip.is_some())
            .field("menu_create", &self.menu_create.is_some())
            .field("autocomplete", &self.autocomplete.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// One entry of a search widget's result list.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchItem {
    pub name: String,
    pub value: Value,
}

impl SearchItem {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self { name: name.into(), value }
    }
}

/// Produces the items matching the current search string.
pub type SearchUpdateFn = Rc<dyn Fn(&str) -> Vec<SearchItem>>;
/// Releases a search argument once the commit that owns it has run.
pub type SearchArgFree = Box<dyn FnOnce(Box<dyn Any>)>;

/// Search behaviour of a [`WidgetKind::SearchMenu`](super::WidgetKind::SearchMenu).
pub struct SearchData {
    pub update: SearchUpdateFn,
    /// Owned argument; moved into the commit record on apply.
    pub arg: Option<Box<dyn Any>>,
    pub arg_free: Option<SearchArgFree>,
    /// Typed text may be committed without matching an item.
    pub results_are_suggestions: bool,
}

impl SearchData {
    pub fn new(update: impl Fn(&str) -> Vec<SearchItem> + 'static) -> Self {
        Self { update: Rc::new(update), arg: None, arg_free: None, results_are_suggestions: false }
    }

    pub fn with_arg(mut self, arg: Box<dyn Any>, free: impl FnOnce(Box<dyn Any>) + 'static) -> Self {
        self.arg = Some(arg);
        self.arg_free = Some(Box::new(free));
        self
    }

    pub fn suggestions(mut self) -> Self {
        self.results_are_suggestions = true;
        self
    }
}

impl fmt::Debug for SearchData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchData")
            .field("has_arg", &self.arg.is_some())
            .field("results_are_suggestions", &self.results_are_suggestions)
            .finish()
    }
}
