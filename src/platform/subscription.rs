//! Event subscriptions with disposers
//!
//! Every listener the engine registers hands back a [`Disposer`]. The engine
//! keeps them in one [`Subscriptions`] list and disposes them all on stop.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::input::HostEvent;

/// Removes one listener when called
pub type Disposer = Box<dyn FnOnce()>;

/// Callback invoked for each host event
pub type Listener = Rc<dyn Fn(HostEvent)>;

/// Anything that can deliver host events to a listener
pub trait EventSource {
    fn subscribe(&self, listener: Listener) -> Disposer;
}

/// Disposers collected for atomic teardown
#[derive(Default)]
pub struct Subscriptions {
    disposers: Vec<Disposer>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, disposer: Disposer) {
        self.disposers.push(disposer);
    }

    pub fn len(&self) -> usize {
        self.disposers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disposers.is_empty()
    }

    /// Run every disposer once, in reverse registration order
    pub fn dispose_all(&mut self) {
        while let Some(dispose) = self.disposers.pop() {
            dispose();
        }
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

type Slots = RefCell<Vec<(u64, Listener)>>;

#[derive(Default)]
struct BusInner {
    slots: Slots,
    next_id: RefCell<u64>,
}

/// In-process event source for headless runs and tests
#[derive(Clone, Default)]
pub struct LocalEventBus {
    inner: Rc<BusInner>,
}

impl LocalEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every current listener. Listeners added or removed
    /// during delivery take effect from the next emit.
    pub fn emit(&self, event: HostEvent) {
        let listeners: Vec<Listener> = self
            .inner
            .slots
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.slots.borrow().len()
    }
}

impl EventSource for LocalEventBus {
    fn subscribe(&self, listener: Listener) -> Disposer {
        let id = {
            let mut next = self.inner.next_id.borrow_mut();
            *next += 1;
            *next
        };
        self.inner.slots.borrow_mut().push((id, listener));

        let weak: Weak<BusInner> = Rc::downgrade(&self.inner);
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.slots.borrow_mut().retain(|(slot, _)| *slot != id);
            }
        })
    }
}
