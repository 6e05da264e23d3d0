//! Cooperative cancellation context forwarded to every task.
//!
//! A [`Context`] bundles a [`CancellationToken`] with an optional immutable
//! value map. The orchestrator forwards it unchanged as the leading argument
//! of every task function; tasks are expected to check it at their own
//! convenient points. Cancellation is never pre-emptive.

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::store::Value;

/// Execution context passed to task functions as their first parameter.
///
/// Cloning is cheap: clones share the same token and value map, so a task
/// observing `is_cancelled` sees cancellations requested on any clone.
///
/// # Examples
///
/// ```
/// use weft::{Context, TaskResult};
///
/// async fn fetch(ctx: Context) -> TaskResult<String> {
///     if ctx.is_cancelled() {
///         return Err("fetch cancelled".into());
///     }
///     Ok("data".to_string())
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub struct Context {
    token: CancellationToken,
    values: Option<Arc<HashMap<String, Value>>>,
}

impl Context {
    /// Creates a context with a fresh cancellation token and no values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context around an existing token, e.g. a child token of a
    /// wider shutdown signal.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            values: None,
        }
    }

    /// Returns a context carrying an additional keyed value. The token is
    /// shared with `self`; the value map is copied.
    pub fn with_value(&self, key: impl Into<String>, value: Value) -> Self {
        let mut values = self
            .values
            .as_deref()
            .cloned()
            .unwrap_or_default();
        values.insert(key.into(), value);
        Self {
            token: self.token.clone(),
            values: Some(Arc::new(values)),
        }
    }

    /// Looks up a value attached via [`Context::with_value`].
    pub fn value(&self, key: &str) -> Option<Value> {
        self.values.as_ref()?.get(key).cloned()
    }

    /// Requests cancellation. Running tasks observe it on their next check.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when cancellation is requested.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// The underlying cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl From<CancellationToken> for Context {
    fn from(token: CancellationToken) -> Self {
        Self::from_token(token)
    }
}
