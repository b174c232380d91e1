use super::{CancelHandle, Carrier, ContextError, ContextKey};
use crate::core::Event;

/// Request-scoped carrier for one `process_event` call.
///
/// Callers may attach values and cancellation before handing the context to
/// the engine; the engine stamps the event being processed into a private
/// slot that only [`event_from_context`] can read.
#[derive(Clone, Debug)]
pub struct EventContext {
    carrier: Carrier,
    event: Option<Event>,
}

impl EventContext {
    /// Fresh root context: no values, no event, never cancelled.
    pub fn background() -> Self {
        EventContext {
            carrier: Carrier::background(),
            event: None,
        }
    }

    pub fn with_value<T>(&self, key: ContextKey<T>, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        EventContext {
            carrier: self.carrier.with_value(key, value),
            event: self.event.clone(),
        }
    }

    pub fn value<T: 'static>(&self, key: ContextKey<T>) -> Result<&T, ContextError> {
        self.carrier.value(key)
    }

    /// Derive a child that can be cancelled independently of its parent.
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let (carrier, handle) = self.carrier.with_cancel();
        let ctx = EventContext {
            carrier,
            event: self.event.clone(),
        };
        (ctx, handle)
    }

    /// `Err(Cancelled)` once this context or any ancestor is cancelled.
    pub fn err(&self) -> Result<(), ContextError> {
        self.carrier.err()
    }

    pub fn is_cancelled(&self) -> bool {
        self.err().is_err()
    }

    /// Wait until the context is cancelled.
    pub async fn cancelled(&self) {
        self.carrier.cancelled().await
    }

    pub(crate) fn with_event(&self, event: Event) -> Self {
        EventContext {
            carrier: self.carrier.clone(),
            event: Some(event),
        }
    }
}

impl Default for EventContext {
    fn default() -> Self {
        Self::background()
    }
}

/// Read the event stamped by the engine.
///
/// Fails with [`ContextError::EventNotFound`] for contexts the engine never
/// touched.
pub fn event_from_context(ctx: &EventContext) -> Result<Event, ContextError> {
    ctx.event.clone().ok_or(ContextError::EventNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: ContextKey<&'static str> = ContextKey::new("test.user");

    #[test]
    fn stamped_event_reads_back() {
        let ctx = EventContext::background().with_event(Event::from("event1"));
        assert_eq!(event_from_context(&ctx), Ok(Event::from("event1")));
    }

    #[test]
    fn missing_event_is_an_error() {
        let ctx = EventContext::background();
        assert_eq!(event_from_context(&ctx), Err(ContextError::EventNotFound));
    }

    #[test]
    fn stamping_keeps_caller_values() {
        let caller = EventContext::background().with_value(USER, "alice");
        let stamped = caller.with_event(Event::from("go"));

        assert_eq!(stamped.value(USER), Ok(&"alice"));
        assert!(event_from_context(&caller).is_err());
    }

    #[test]
    fn event_survives_later_derivation() {
        let ctx = EventContext::background()
            .with_event(Event::from("go"))
            .with_value(USER, "bob");
        let (child, _handle) = ctx.with_cancel();

        assert_eq!(event_from_context(&child), Ok(Event::from("go")));
    }

    #[tokio::test]
    async fn cancelled_future_resolves_after_cancel() {
        let (ctx, handle) = EventContext::background().with_cancel();
        let waiter = {
            let ctx = ctx.clone();
            tokio::spawn(async move { ctx.cancelled().await })
        };

        handle.cancel();
        waiter.await.unwrap();
        assert!(ctx.is_cancelled());
    }
}
