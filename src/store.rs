//! Type-erased values and the shared result store.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Error;
use crate::extract::{Extract, Field};

/// A type-erased, cheaply clonable value.
///
/// `Value` is the currency of the result store: runtime inputs are wrapped
/// into it by the caller, task outputs by the orchestrator. Retrieval
/// narrows back to a concrete type with [`Value::downcast_ref`].
///
/// # Examples
///
/// ```
/// use weft::Value;
///
/// let value = Value::new(42i32);
/// assert_eq!(value.downcast_ref::<i32>(), Some(&42));
/// assert_eq!(value.downcast_ref::<String>(), None);
/// ```
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Extract>,
    type_name: &'static str,
}

impl Value {
    /// Wraps a concrete value, capturing its type name for diagnostics.
    pub fn new<T: Extract>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The `TypeId` of the wrapped value.
    pub fn type_id(&self) -> TypeId {
        self.inner.as_any().type_id()
    }

    /// The full type name of the wrapped value, as captured at construction.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrows the wrapped value as `T`, if that is what it holds.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref()
    }

    /// Clones the wrapped value out as `T`, if that is what it holds.
    pub fn downcast<T: Clone + 'static>(&self) -> Option<T> {
        self.downcast_ref().cloned()
    }

    pub(crate) fn is_nil(&self) -> bool {
        self.inner.is_nil()
    }

    pub(crate) fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    pub(crate) fn field(&self, name: &str) -> Field {
        self.inner.field(name)
    }
}

// The payload is type-erased, so all Debug can show is the type name.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Value").field(&self.type_name).finish()
    }
}

impl<T: Extract> From<T> for Value {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

/// Thread-safe results of a run, keyed by task id or runtime input name.
///
/// Handles are cheap to clone and share the same underlying map. Instances
/// are normally created by [`Weft::run`](crate::Weft::run); `new` exists
/// for tests that exercise resolution directly.
#[derive(Clone, Debug, Default)]
pub struct Results {
    data: Arc<RwLock<HashMap<String, Value>>>,
}

impl Results {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves the value for a task id or runtime input name.
    ///
    /// The returned [`Value`] requires downcasting to the expected type:
    ///
    /// ```
    /// # use weft::Results;
    /// # let results = Results::new();
    /// match results.get("fetch_user") {
    ///     Ok(value) => {
    ///         let _user_count = value.downcast_ref::<usize>();
    ///     }
    ///     Err(missing) => {
    ///         let _ = missing;
    ///     }
    /// }
    /// ```
    pub fn get(&self, task_id: &str) -> Result<Value, Error> {
        self.data
            .read()
            .get(task_id)
            .cloned()
            .ok_or_else(|| Error::TaskNotFound {
                key: task_id.to_owned(),
            })
    }

    /// Stores a value under a task id or runtime input name.
    pub(crate) fn set(&self, task_id: impl Into<String>, value: Value) {
        self.data.write().insert(task_id.into(), value);
    }
}
