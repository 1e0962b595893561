use std::sync::Arc;

use super::{EventDistributor, XivEvent};
use crate::state::XivState;

/// Priority used by the state reducers. Runs before every other handler.
pub const REDUCER_PRIORITY: i32 = i32::MIN;

/// Priority for ordinary observers.
pub const DEFAULT_PRIORITY: i32 = 5000;

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// Receives events from the [`EventDistributor`].
///
/// Errors are logged by the distributor and never stop delivery to the
/// remaining handlers.
pub trait EventHandler: Send + Sync {
    fn handle_event(&self, ctx: &EventContext<'_>, event: &XivEvent) -> Result<(), HandlerError>;

    /// Name used in log output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Closure-backed handler, see [`handler_fn`].
pub struct FnHandler<F> {
    name: &'static str,
    f: F,
}

/// Wrap a closure as a named [`EventHandler`].
pub fn handler_fn<F>(name: &'static str, f: F) -> FnHandler<F>
where
    F: Fn(&EventContext<'_>, &XivEvent) -> Result<(), HandlerError> + Send + Sync,
{
    FnHandler { name, f }
}

impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&EventContext<'_>, &XivEvent) -> Result<(), HandlerError> + Send + Sync,
{
    fn handle_event(&self, ctx: &EventContext<'_>, event: &XivEvent) -> Result<(), HandlerError> {
        (self.f)(ctx, event)
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// What a handler sees besides the event itself.
pub struct EventContext<'a> {
    distributor: &'a EventDistributor,
}

impl<'a> EventContext<'a> {
    pub(crate) fn new(distributor: &'a EventDistributor) -> Self {
        Self { distributor }
    }

    pub fn state(&self) -> &'a Arc<XivState> {
        self.distributor.state()
    }

    /// Publish a follow-up event. It is delivered in full, including its own
    /// cascade, as soon as the current handler returns and before the next
    /// handler of the current event runs.
    pub fn publish(&self, event: XivEvent) {
        self.distributor.publish(event);
    }
}
