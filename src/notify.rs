//! Lifecycle notifications and their fault-isolated delivery.
//!
//! Every notification goes first to the manager-wide hooks, in the order they
//! were added, then to the overlay's own observer. Each callback runs inside
//! `catch_unwind`: a panicking callback is logged and skipped, and neither the
//! remaining callbacks nor the stack bookkeeping that follows are affected.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use crate::handle::OverlayHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    BeforeOpen,
    Open,
    BeforeClose,
    Close,
    FocusFirst,
    FocusLast,
    Blur,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Notification::BeforeOpen => "before-open",
            Notification::Open => "open",
            Notification::BeforeClose => "before-close",
            Notification::Close => "close",
            Notification::FocusFirst => "focus-first",
            Notification::FocusLast => "focus-last",
            Notification::Blur => "blur",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayEvent {
    pub handle: OverlayHandle,
    pub notification: Notification,
    /// Number of open overlays when the notification was delivered.
    pub depth: usize,
}

pub type Observer = Box<dyn FnMut(&OverlayEvent)>;

/// Ordered list of manager-wide lifecycle hooks.
#[derive(Default)]
pub struct Hooks {
    hooks: Vec<Observer>,
}

impl Hooks {
    pub fn push(&mut self, hook: Observer) {
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks").field("len", &self.hooks.len()).finish()
    }
}

/// Deliver `event` to every hook and then to `observer`. Returns how many
/// callbacks panicked.
pub fn dispatch(hooks: &mut Hooks, observer: Option<&mut Observer>, event: &OverlayEvent) -> usize {
    let mut failed = 0;
    for hook in hooks.hooks.iter_mut() {
        if !invoke(hook, event) {
            failed += 1;
        }
    }
    if let Some(observer) = observer
        && !invoke(observer, event)
    {
        failed += 1;
    }
    failed
}

fn invoke(callback: &mut Observer, event: &OverlayEvent) -> bool {
    match catch_unwind(AssertUnwindSafe(|| callback(event))) {
        Ok(()) => true,
        Err(payload) => {
            tracing::error!(
                overlay = %event.handle,
                notification = %event.notification,
                reason = %panic_message(payload.as_ref()),
                "overlay notification callback panicked"
            );
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "<non-string panic>".to_string()
    }
}

/// Shared, cloneable record of delivered notifications.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<OverlayEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// An observer that appends every event it sees to this log.
    pub fn observer(&self) -> Observer {
        let events = Rc::clone(&self.events);
        Box::new(move |event| events.borrow_mut().push(*event))
    }

    pub fn events(&self) -> Vec<OverlayEvent> {
        self.events.borrow().clone()
    }

    /// Notifications delivered for `handle`, in order.
    pub fn for_handle(&self, handle: OverlayHandle) -> Vec<Notification> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.handle == handle)
            .map(|e| e.notification)
            .collect()
    }

    pub fn count(&self, handle: OverlayHandle, notification: Notification) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.handle == handle && e.notification == notification)
            .count()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(n: Notification) -> OverlayEvent {
        OverlayEvent {
            handle: OverlayHandle::new(0, 0),
            notification: n,
            depth: 1,
        }
    }

    #[test]
    fn hooks_run_in_order_before_observer() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut hooks = Hooks::default();
        for tag in ["first", "second"] {
            let order = Rc::clone(&order);
            hooks.push(Box::new(move |_| order.borrow_mut().push(tag)));
        }
        let seen = Rc::clone(&order);
        let mut observer: Observer = Box::new(move |_| seen.borrow_mut().push("observer"));

        let failed = dispatch(&mut hooks, Some(&mut observer), &event(Notification::Open));
        assert_eq!(failed, 0);
        assert_eq!(*order.borrow(), vec!["first", "second", "observer"]);
    }

    #[test]
    fn panicking_hook_does_not_stop_delivery() {
        let log = EventLog::new();
        let mut hooks = Hooks::default();
        hooks.push(Box::new(|_| panic!("observer exploded")));
        let mut observer = log.observer();

        let failed = dispatch(&mut hooks, Some(&mut observer), &event(Notification::Close));
        assert_eq!(failed, 1);
        assert_eq!(log.len(), 1);
        assert_eq!(log.events()[0].notification, Notification::Close);
    }

    #[test]
    fn notification_names_match_event_names() {
        assert_eq!(Notification::BeforeOpen.to_string(), "before-open");
        assert_eq!(Notification::FocusLast.to_string(), "focus-last");
    }
}
