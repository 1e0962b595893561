//! Publish/subscribe core.
//!
//! Delivery is synchronous and depth-first. For a single `publish(A)`:
//! - handlers subscribed to A's kind run in ascending priority, ties in
//!   registration order;
//! - an event published by one of those handlers is queued until that
//!   handler returns, then fully drained (its own cascade included) before
//!   the next handler of A runs;
//! - `publish(A)` returns only when the whole cascade is done.
//!
//! The cascade is driven by an explicit frame stack rather than recursion.
//! Top-level publishes from different threads serialize on a dispatch lock,
//! so each cascade is atomic with respect to handler ordering.
//!
//! Follow-up events must be published from the handler's own thread. A
//! handler that hands a publish to another thread and waits for it will
//! deadlock on the dispatch lock.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::Serialize;

use super::{EventContext, EventHandler, EventKind, XivEvent};
use crate::state::XivState;

/// Maximum nesting of follow-up events within one cascade. Anything deeper
/// is a handler feedback loop; those events are dropped and logged.
pub const MAX_CASCADE_DEPTH: usize = 64;

static NEXT_DISTRIBUTOR_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Handlers currently running on this thread, innermost last, with the
    /// events they have published so far.
    static ACTIVE: RefCell<Vec<ActiveHandler>> = const { RefCell::new(Vec::new()) };
}

struct ActiveHandler {
    distributor: u64,
    pending: Vec<XivEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscription {
    Kind(EventKind),
    Any,
}

impl Subscription {
    fn matches(self, kind: EventKind) -> bool {
        match self {
            Self::Kind(k) => k == kind,
            Self::Any => true,
        }
    }
}

struct Registration {
    id: HandlerId,
    subscription: Subscription,
    priority: i32,
    handler: Arc<dyn EventHandler>,
}

/// Counters since the distributor was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DistributorCounts {
    /// Events dispatched, follow-ups included.
    pub published: u64,
    /// Individual handler invocations.
    pub deliveries: u64,
    pub handler_failures: u64,
    /// Follow-ups discarded for exceeding [`MAX_CASCADE_DEPTH`].
    pub dropped: u64,
}

#[derive(Default)]
struct DistributorStats {
    published: AtomicU64,
    deliveries: AtomicU64,
    handler_failures: AtomicU64,
    dropped: AtomicU64,
}

pub struct EventDistributor {
    id: u64,
    state: Arc<XivState>,
    registrations: RwLock<Vec<Arc<Registration>>>,
    next_handler_id: AtomicU64,
    dispatch_lock: Mutex<()>,
    stats: DistributorStats,
}

impl Default for EventDistributor {
    fn default() -> Self {
        Self::new(Arc::new(XivState::new()))
    }
}

struct Frame {
    event: Arc<XivEvent>,
    handlers: Vec<Arc<Registration>>,
    next: usize,
    depth: usize,
}

impl EventDistributor {
    pub fn new(state: Arc<XivState>) -> Self {
        Self {
            id: NEXT_DISTRIBUTOR_ID.fetch_add(1, Ordering::Relaxed),
            state,
            registrations: RwLock::new(Vec::new()),
            next_handler_id: AtomicU64::new(0),
            dispatch_lock: Mutex::new(()),
            stats: DistributorStats::default(),
        }
    }

    pub fn state(&self) -> &Arc<XivState> {
        &self.state
    }

    /// Subscribe `handler` to one event kind.
    pub fn register<H>(&self, kind: EventKind, priority: i32, handler: H) -> HandlerId
    where
        H: EventHandler + 'static,
    {
        self.add(Subscription::Kind(kind), priority, Arc::new(handler))
    }

    /// Subscribe `handler` to every event.
    pub fn register_any<H>(&self, priority: i32, handler: H) -> HandlerId
    where
        H: EventHandler + 'static,
    {
        self.add(Subscription::Any, priority, Arc::new(handler))
    }

    pub fn unregister(&self, id: HandlerId) -> bool {
        let mut regs = self
            .registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = regs.len();
        regs.retain(|r| r.id != id);
        regs.len() != before
    }

    pub fn handler_count(&self) -> usize {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn counts(&self) -> DistributorCounts {
        DistributorCounts {
            published: self.stats.published.load(Ordering::Relaxed),
            deliveries: self.stats.deliveries.load(Ordering::Relaxed),
            handler_failures: self.stats.handler_failures.load(Ordering::Relaxed),
            dropped: self.stats.dropped.load(Ordering::Relaxed),
        }
    }

    fn add(&self, subscription: Subscription, priority: i32, handler: Arc<dyn EventHandler>) -> HandlerId {
        let id = HandlerId(self.next_handler_id.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(handler = handler.name(), ?subscription, priority, "Registering event handler");

        let mut regs = self
            .registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // After every registration with priority <= ours keeps ties stable.
        let pos = regs.partition_point(|r| r.priority <= priority);
        regs.insert(
            pos,
            Arc::new(Registration {
                id,
                subscription,
                priority,
                handler,
            }),
        );
        id
    }

    /// Deliver `event` to every matching handler.
    ///
    /// Called from inside a handler of this distributor, the event is queued
    /// behind that handler instead and this returns immediately.
    pub fn publish(&self, event: XivEvent) {
        let Some(event) = self.enqueue_nested(event) else {
            return;
        };

        let _dispatch = self
            .dispatch_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.drain(event);
    }

    fn enqueue_nested(&self, event: XivEvent) -> Option<XivEvent> {
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            match active.iter_mut().rev().find(|a| a.distributor == self.id) {
                Some(handler) => {
                    handler.pending.push(event);
                    None
                }
                None => Some(event),
            }
        })
    }

    fn drain(&self, root: XivEvent) {
        let mut stack = vec![self.frame(root, 0)];

        while let Some(frame) = stack.last_mut() {
            let Some(reg) = frame.handlers.get(frame.next).cloned() else {
                stack.pop();
                continue;
            };
            frame.next += 1;
            let event = Arc::clone(&frame.event);
            let depth = frame.depth;

            let emitted = self.invoke(&reg, &event);
            if emitted.is_empty() {
                continue;
            }

            if depth + 1 >= MAX_CASCADE_DEPTH {
                tracing::error!(
                    handler = reg.handler.name(),
                    kind = ?event.kind(),
                    dropped = emitted.len(),
                    "Event cascade too deep, dropping follow-up events"
                );
                self.stats
                    .dropped
                    .fetch_add(emitted.len() as u64, Ordering::Relaxed);
                continue;
            }

            // Reverse so the first follow-up ends up on top of the stack.
            for nested in emitted.into_iter().rev() {
                stack.push(self.frame(nested, depth + 1));
            }
        }
    }

    fn frame(&self, event: XivEvent, depth: usize) -> Frame {
        let kind = event.kind();
        let handlers: Vec<Arc<Registration>> = self
            .registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.subscription.matches(kind))
            .cloned()
            .collect();

        self.stats.published.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(?kind, handlers = handlers.len(), depth, "Dispatching event");

        Frame {
            event: Arc::new(event),
            handlers,
            next: 0,
            depth,
        }
    }

    /// Run one handler, returning whatever it published.
    fn invoke(&self, reg: &Registration, event: &XivEvent) -> Vec<XivEvent> {
        let active = ActiveGuard::enter(self.id);
        let ctx = EventContext::new(self);

        let result = panic::catch_unwind(AssertUnwindSafe(|| reg.handler.handle_event(&ctx, event)));
        self.stats.deliveries.fetch_add(1, Ordering::Relaxed);

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.stats.handler_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    handler = reg.handler.name(),
                    kind = ?event.kind(),
                    error = %e,
                    "Event handler failed"
                );
            }
            Err(payload) => {
                self.stats.handler_failures.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    handler = reg.handler.name(),
                    kind = ?event.kind(),
                    panic = panic_message(payload.as_ref()),
                    "Event handler panicked"
                );
            }
        }

        active.finish()
    }
}

/// Marks a handler of one distributor as running on this thread.
struct ActiveGuard {
    finished: bool,
}

impl ActiveGuard {
    fn enter(distributor: u64) -> Self {
        ACTIVE.with(|active| {
            active.borrow_mut().push(ActiveHandler {
                distributor,
                pending: Vec::new(),
            })
        });
        Self { finished: false }
    }

    fn finish(mut self) -> Vec<XivEvent> {
        self.finished = true;
        ACTIVE
            .with(|active| active.borrow_mut().pop())
            .map(|a| a.pending)
            .unwrap_or_default()
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        if !self.finished {
            ACTIVE.with(|active| {
                active.borrow_mut().pop();
            });
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
