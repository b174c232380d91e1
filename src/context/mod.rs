//! Cancellable key-value carriers threaded through the engine.
//!
//! Two carriers exist:
//! - [`EventContext`]: request-scoped data for a single `process_event` call
//! - [`FsmContext`]: the machine's memory, carried across transitions
//!
//! Both are immutable: deriving a child with an extra value returns a new
//! carrier and never touches the parent. Cancellation is sticky and
//! inherited; once a context is cancelled, every context derived from it
//! reports [`ContextError::Cancelled`].

mod event;
mod fsm;

pub use event::{event_from_context, EventContext};
pub use fsm::{state_from_context, FsmContext};

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors surfaced by context queries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("context canceled")]
    Cancelled,

    #[error("can't extract event from context")]
    EventNotFound,

    #[error("can't extract state from context")]
    StateNotFound,

    /// Raised both for absent keys and for values of a different type.
    #[error("value not found in context for key [{key}]")]
    ValueNotFound { key: &'static str },
}

/// Typed key for values stored in a context.
///
/// Keys are compared by name; the type parameter fixes what a lookup
/// returns. Namespacing the name (`"robot.degrees"`) keeps unrelated
/// components from colliding.
///
/// # Example
///
/// ```rust
/// use switchyard::context::{ContextKey, EventContext};
///
/// const DEGREES: ContextKey<u32> = ContextKey::new("robot.degrees");
///
/// let ctx = EventContext::background().with_value(DEGREES, 30);
/// assert_eq!(ctx.value(DEGREES), Ok(&30));
/// ```
pub struct ContextKey<T> {
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> ContextKey<T> {
    pub const fn new(name: &'static str) -> Self {
        ContextKey {
            name,
            _phantom: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for ContextKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ContextKey<T> {}

impl<T> fmt::Debug for ContextKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextKey").field(&self.name).finish()
    }
}

/// Handle that cancels the context it was created with.
///
/// Cancelling is idempotent. Dropping the handle does not cancel.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// `Err(Cancelled)` once [`cancel`](Self::cancel) was called.
    pub fn err(&self) -> Result<(), ContextError> {
        if self.is_cancelled() {
            Err(ContextError::Cancelled)
        } else {
            Ok(())
        }
    }
}

type Value = Arc<dyn Any + Send + Sync>;

/// Shared storage behind both context types.
#[derive(Clone)]
pub(crate) struct Carrier {
    values: Arc<HashMap<&'static str, Value>>,
    token: CancellationToken,
}

impl Carrier {
    pub(crate) fn background() -> Self {
        Carrier {
            values: Arc::new(HashMap::new()),
            token: CancellationToken::new(),
        }
    }

    pub(crate) fn with_value<T>(&self, key: ContextKey<T>, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        let mut values = HashMap::clone(&self.values);
        values.insert(key.name, Arc::new(value));
        Carrier {
            values: Arc::new(values),
            token: self.token.clone(),
        }
    }

    pub(crate) fn value<T: 'static>(&self, key: ContextKey<T>) -> Result<&T, ContextError> {
        self.values
            .get(key.name)
            .and_then(|value| value.downcast_ref::<T>())
            .ok_or(ContextError::ValueNotFound { key: key.name })
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub(crate) fn with_cancel(&self) -> (Self, CancelHandle) {
        let token = self.token.child_token();
        let handle = CancelHandle {
            token: token.clone(),
        };
        let carrier = Carrier {
            values: Arc::clone(&self.values),
            token,
        };
        (carrier, handle)
    }

    pub(crate) fn err(&self) -> Result<(), ContextError> {
        if self.token.is_cancelled() {
            Err(ContextError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub(crate) async fn cancelled(&self) {
        self.token.cancelled().await
    }

    pub(crate) fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.values.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

impl fmt::Debug for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Carrier")
            .field("keys", &self.keys())
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

/// Return the first cancellation found among the given checks.
pub(crate) fn first_error<I>(checks: I) -> Result<(), ContextError>
where
    I: IntoIterator<Item = Result<(), ContextError>>,
{
    checks.into_iter().collect()
}
