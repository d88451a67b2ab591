//! Custom block interaction callbacks.
//!
//! A block can observe a whole interaction (one drag, possibly over several
//! widgets) through `begin`/`update`/`end`. The handle is shared between the
//! active widget and the commit records it queues; `end` runs once the last
//! user lets go.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::host::Services;

/// What an interaction covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionParams {
    pub is_click: bool,
    /// Return values of the origin widget and its multi-drag peers.
    pub unique_retval_ids: Vec<i32>,
}

pub type InteractionBeginFn = Rc<dyn Fn(&mut Services, &InteractionParams) -> Box<dyn Any>>;
pub type InteractionUpdateFn = Rc<dyn Fn(&mut Services, &InteractionParams, &mut dyn Any)>;
pub type InteractionEndFn = Rc<dyn Fn(&mut Services, &InteractionParams, Box<dyn Any>)>;

/// Callbacks registered on a block.
#[derive(Clone)]
pub struct BlockInteraction {
    pub begin: InteractionBeginFn,
    pub update: InteractionUpdateFn,
    pub end: InteractionEndFn,
}

impl BlockInteraction {
    pub fn new(
        begin: impl Fn(&mut Services, &InteractionParams) -> Box<dyn Any> + 'static,
        update: impl Fn(&mut Services, &InteractionParams, &mut dyn Any) + 'static,
        end: impl Fn(&mut Services, &InteractionParams, Box<dyn Any>) + 'static,
    ) -> Self {
        Self { begin: Rc::new(begin), update: Rc::new(update), end: Rc::new(end) }
    }
}

impl fmt::Debug for BlockInteraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BlockInteraction")
    }
}

/// A running interaction.
pub struct InteractionHandle {
    pub params: InteractionParams,
    user_data: Option<Box<dyn Any>>,
    /// Active widget plus every queued commit holding the handle.
    pub user_count: usize,
    callbacks: BlockInteraction,
}

pub type InteractionHandleRef = Rc<RefCell<InteractionHandle>>;

impl InteractionHandle {
    /// Run `begin`; the caller holds the first reference.
    pub fn begin(
        services: &mut Services,
        callbacks: &BlockInteraction,
        params: InteractionParams,
    ) -> InteractionHandleRef {
        let user_data = (callbacks.begin)(services, &params);
        Rc::new(RefCell::new(Self {
            params,
            user_data: Some(user_data),
            user_count: 1,
            callbacks: callbacks.clone(),
        }))
    }

    pub fn update(this: &InteractionHandleRef, services: &mut Services) {
        let mut handle = this.borrow_mut();
        let InteractionHandle { params, user_data, callbacks, .. } = &mut *handle;
        if let Some(data) = user_data.as_deref_mut() {
            (callbacks.update)(services, params, data);
        }
    }

    /// Add a user.
    pub fn retain(this: &InteractionHandleRef) {
        this.borrow_mut().user_count += 1;
    }

    /// Drop a user; runs `end` and returns `true` when it was the last one.
    pub fn release(this: &InteractionHandleRef, services: &mut Services) -> bool {
        let (end, params, data) = {
            let mut handle = this.borrow_mut();
            handle.user_count = handle.user_count.saturating_sub(1);
            if handle.user_count > 0 {
                return false;
            }
            let Some(data) = handle.user_data.take() else {
                return false;
            };
            (Rc::clone(&handle.callbacks.end), handle.params.clone(), data)
        };
        end(services, &params, data);
        true
    }
}

impl fmt::Debug for InteractionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionHandle")
            .field("params", &self.params)
            .field("user_count", &self.user_count)
            .finish_non_exhaustive()
    }
}
