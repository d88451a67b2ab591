//! Deferred commit records and their queue.
//!
//! A widget commit never runs callbacks, operators or undo pushes directly;
//! it captures everything into an [`AfterFunc`] and queues it. The queue is
//! drained once per processed event, after every state transition of that
//! event has settled.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::block::{InteractionHandle, InteractionHandleRef, WidgetRef};
use crate::host::{ContextStore, OperatorCall, OperatorResult, ReportLevel, Services};
use crate::property::PropertyHandle;
use crate::widget::{
    BlockHandleFn, ButtonFn, ButtonNFn, CallbackInfo, MenuHandleFn, RenameFn, SearchArgFree,
};

/// Work deferred to the drain by a callback.
pub type DeferredFn = Box<dyn FnOnce(&mut CallbackCtx<'_>)>;

// ---------------------------------------------------------------------------
// CallbackCtx
// ---------------------------------------------------------------------------

/// What widget callbacks get to work with.
pub struct CallbackCtx<'a> {
    pub services: &'a mut Services,
    queue: &'a mut Vec<AfterFunc>,
}

impl<'a> CallbackCtx<'a> {
    /// Queue `f` for the next drain pass.
    pub(crate) fn new(services: &'a mut Services, queue: &'a mut Vec<AfterFunc>) -> Self {
        Self { services, queue }
    }

    pub fn defer(&mut self, f: impl FnOnce(&mut CallbackCtx<'_>) + 'static) {
        self.queue.push(AfterFunc { deferred: Some(Box::new(f)), ..AfterFunc::default() });
    }

    pub fn call_operator(&mut self, call: &OperatorCall) -> OperatorResult {
        self.services.operators.call(call, None)
    }

    pub fn report(&mut self, level: ReportLevel, message: &str) {
        self.services.report(level, message);
    }
}

// ---------------------------------------------------------------------------
// AfterFunc
// ---------------------------------------------------------------------------

/// Snapshot of what one commit must do once the event settles.
#[derive(Default)]
pub struct AfterFunc {
    /// Widget the entry was captured from.
    pub source: Option<WidgetRef>,
    pub info: CallbackInfo,
    pub on_click: Option<ButtonFn>,
    pub on_click_n: Option<(ButtonNFn, Rc<dyn Any>)>,
    /// Rename callback with `(new, old)` names.
    pub rename: Option<(RenameFn, String, String)>,
    pub handle_func: Option<(BlockHandleFn, i32)>,
    pub butm_func: Option<(MenuHandleFn, f64)>,
    /// Operator of the popup the widget lives in.
    pub popup_op: Option<OperatorCall>,
    pub operator: Option<OperatorCall>,
    pub context: Option<ContextStore>,
    /// Property to notify.
    pub update: Option<PropertyHandle>,
    pub search_arg: Option<(Box<dyn Any>, SearchArgFree)>,
    pub interaction: Option<InteractionHandleRef>,
    pub undo: Option<String>,
    pub deferred: Option<DeferredFn>,
}

impl AfterFunc {
    fn run(self, services: &mut Services, queue: &mut Vec<AfterFunc>) {
        let AfterFunc {
            info,
            on_click,
            on_click_n,
            rename,
            handle_func,
            butm_func,
            popup_op,
            operator,
            context,
            update,
            search_arg,
            interaction,
            undo,
            deferred,
            ..
        } = self;

        if let Some(call) = &operator {
            let result = services.operators.call(call, context.as_ref());
            log::debug!("operator {} -> {result:?}", call.idname);
        }
        if let Some(handle) = &update {
            services.store.notify_update(handle);
        }
        {
            let mut ctx = CallbackCtx { services: &mut *services, queue: &mut *queue };
            if let Some(f) = &on_click {
                f(&mut ctx, &info);
            }
            if let Some((f, arg)) = &on_click_n {
                f(&mut ctx, &info, arg.as_ref());
            }
            if let Some((f, new, old)) = &rename {
                f(&mut ctx, new, old);
            }
            if let Some((f, retval)) = &handle_func {
                f(&mut ctx, *retval);
            }
            if let Some((f, value)) = &butm_func {
                f(&mut ctx, *value);
            }
            if let Some(call) = &popup_op {
                ctx.services.operators.call(call, context.as_ref());
            }
            if let Some(f) = deferred {
                f(&mut ctx);
            }
        }
        if let Some((arg, free)) = search_arg {
            free(arg);
        }
        if let Some(handle) = &interaction {
            InteractionHandle::release(handle, services);
        }
        if let Some(label) = undo.filter(|l| !l.is_empty()) {
            services.undo.push(&label);
        }
    }

    /// Whether running the entry does anything beyond the undo push.
    pub fn is_empty(&self) -> bool {
        self.on_click.is_none()
            && self.on_click_n.is_none()
            && self.rename.is_none()
            && self.handle_func.is_none()
            && self.butm_func.is_none()
            && self.popup_op.is_none()
            && self.operator.is_none()
            && self.update.is_none()
            && self.search_arg.is_none()
            && self.interaction.is_none()
            && self.deferred.is_none()
    }
}

impl fmt::Debug for AfterFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AfterFunc")
            .field("source", &self.source)
            .field("label", &self.info.label)
            .field("operator", &self.operator.as_ref().map(|c| &c.idname))
            .field("update", &self.update)
            .field("undo", &self.undo)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// AfterQueue
// ---------------------------------------------------------------------------

/// FIFO of pending commits.
#[derive(Debug, Default)]
pub struct AfterQueue {
    entries: Vec<AfterFunc>,
    drained: usize,
}

impl AfterQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `entry`. A handle already held by the previous entry moves over
    /// to the new one so the interaction's `end` runs exactly once, last.
    pub fn push(&mut self, mut entry: AfterFunc) {
        if let Some(handle) = &entry.interaction {
            match self.entries.last_mut() {
                Some(prev)
                    if prev.interaction.as_ref().is_some_and(|h| Rc::ptr_eq(h, handle)) =>
                {
                    prev.interaction = None;
                }
                _ => InteractionHandle::retain(handle),
            }
        }
        if entry.undo.is_some() && entry.is_empty() {
            if let Some(prev) = self
                .entries
                .last_mut()
                .filter(|p| p.source.is_some() && p.source == entry.source && p.undo.is_none())
            {
                prev.undo = entry.undo.take();
                return;
            }
        }
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries drained since creation.
    pub fn drained(&self) -> usize {
        self.drained
    }

    /// Pending entries, oldest first.
    pub fn entries(&self) -> &[AfterFunc] {
        &self.entries
    }

    /// Run `f` with a callback context whose deferred work joins this queue.
    pub(crate) fn with_ctx<R>(
        &mut self,
        services: &mut Services,
        f: impl FnOnce(&mut CallbackCtx<'_>) -> R,
    ) -> R {
        f(&mut CallbackCtx::new(services, &mut self.entries))
    }

    /// Run every queued entry in FIFO order. Entries queued while draining
    /// wait for the next pass. Returns how many ran.
    pub fn drain(&mut self, services: &mut Services) -> usize {
        let batch = std::mem::take(&mut self.entries);
        let n = batch.len();
        for entry in batch {
            entry.run(services, &mut self.entries);
        }
        self.drained += n;
        if n > 0 {
            log::debug!("drained {n} after-funcs, {} queued for next pass", self.entries.len());
        }
        n
    }
}
