use std::cell::RefCell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use spdlog::{error, trace};

pub type Listener = Rc<dyn Fn() -> Result<(), String>>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Payload-free "snapshot changed" channel.
///
/// Clones share the same listener registry. Separate `ChangeNotifier::new()`
/// calls give independent registries.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    registry: Rc<RefCell<Registry>>,
}

/// Handle returned by [`ChangeNotifier::subscribe`].
///
/// Dropping it leaves the listener registered; call `unsubscribe` to remove it.
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().listeners.retain(|(id, _)| *id != self.id);
            trace!("Listener {} unsubscribed", self.id);
        }
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() -> Result<(), String> + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        let listener: Listener = Rc::new(listener);
        registry.listeners.push((id, listener));

        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Calls every listener registered when the publish started, in
    /// subscription order. Failures are logged and never reach the caller.
    pub fn publish(&self) {
        let listeners: Vec<(u64, Listener)> = self.registry.borrow().listeners.clone();
        trace!("Publishing snapshot change to {} listeners", listeners.len());

        for (id, listener) in listeners {
            match catch_unwind(AssertUnwindSafe(|| listener())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Listener {} failed: {}", id, e),
                Err(_) => error!("Listener {} panicked", id),
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}
