pub mod distributor;
pub mod event;
pub mod handler;

#[cfg(test)]
mod distributor_tests;

pub use distributor::{DistributorCounts, EventDistributor, HandlerId, MAX_CASCADE_DEPTH, Subscription};
pub use event::{EventKind, XivEvent};
pub use handler::{
    DEFAULT_PRIORITY, EventContext, EventHandler, FnHandler, HandlerError, REDUCER_PRIORITY, handler_fn,
};
