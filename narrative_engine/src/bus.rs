//! Synchronous publish/subscribe relay for world events.
//!
//! The bus is a value owned by one runtime instance, never a process-wide
//! singleton, so multiple levels (e.g., in tests) never cross-talk.
//! Delivery is synchronous and in emission order. Handlers return follow-up
//! events instead of re-entering `emit`; follow-ups are queued and
//! dispatched only after the current event has been delivered to every
//! subscriber (breadth-first), so a narrative chain cannot grow the stack.

use std::collections::VecDeque;
use tracing::trace;

/// A subscriber: handles one event, returns follow-up events to queue.
pub type EventHandler<E> = Box<dyn FnMut(&E) -> Vec<E>>;

/// Synchronous event bus with breadth-first follow-up dispatch.
pub struct EventBus<E> {
    handlers: Vec<EventHandler<E>>,
    queue: VecDeque<E>,
    delivered: u64,
}

impl<E: std::fmt::Debug> EventBus<E> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            queue: VecDeque::new(),
            delivered: 0,
        }
    }

    /// Subscribe a handler. Handlers are invoked in subscription order.
    pub fn subscribe(&mut self, handler: EventHandler<E>) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Total events delivered since creation.
    pub fn events_delivered(&self) -> u64 {
        self.delivered
    }

    /// Emit an event and drain it plus any follow-ups.
    ///
    /// Returns only after every queued event has been handled by every
    /// subscriber.
    pub fn emit(&mut self, event: E) {
        self.queue.push_back(event);
        while let Some(event) = self.queue.pop_front() {
            trace!(?event, "delivering event");
            self.delivered += 1;
            let mut follow_ups = Vec::new();
            for handler in &mut self.handlers {
                follow_ups.extend(handler(&event));
            }
            self.queue.extend(follow_ups);
        }
    }
}

impl<E: std::fmt::Debug> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_reaches_every_handler_in_order() {
        let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let mut bus: EventBus<u32> = EventBus::new();

        for name in ["first", "second"] {
            let log = Rc::clone(&log);
            bus.subscribe(Box::new(move |event: &u32| {
                log.borrow_mut().push(format!("{name}:{event}"));
                Vec::new()
            }));
        }

        bus.emit(7);
        assert_eq!(*log.borrow(), vec!["first:7", "second:7"]);
        assert_eq!(bus.events_delivered(), 1);
        assert_eq!(bus.handler_count(), 2);
    }

    #[test]
    fn test_follow_ups_are_dispatched_breadth_first() {
        let log: Rc<RefCell<Vec<(String, u32)>>> = Rc::new(RefCell::new(Vec::new()));
        let mut bus: EventBus<u32> = EventBus::new();

        // The chaining handler turns 1 into 2 and 2 into 3.
        let chain_log = Rc::clone(&log);
        bus.subscribe(Box::new(move |event: &u32| {
            chain_log.borrow_mut().push(("chain".to_string(), *event));
            match event {
                1 => vec![2],
                2 => vec![3],
                _ => Vec::new(),
            }
        }));

        let watch_log = Rc::clone(&log);
        bus.subscribe(Box::new(move |event: &u32| {
            watch_log.borrow_mut().push(("watch".to_string(), *event));
            Vec::new()
        }));

        bus.emit(1);

        // Every subscriber sees event 1 before the follow-up 2 is delivered.
        let entries = log.borrow();
        assert_eq!(
            *entries,
            vec![
                ("chain".to_string(), 1),
                ("watch".to_string(), 1),
                ("chain".to_string(), 2),
                ("watch".to_string(), 2),
                ("chain".to_string(), 3),
                ("watch".to_string(), 3),
            ]
        );
        assert_eq!(bus.events_delivered(), 3);
    }

    #[test]
    fn test_emit_with_no_handlers_is_a_no_op() {
        let mut bus: EventBus<u32> = EventBus::new();
        bus.emit(42);
        assert_eq!(bus.events_delivered(), 1);
    }
}
