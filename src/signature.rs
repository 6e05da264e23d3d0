//! Runtime callable signatures, validation, and the typed adapter layer.
//!
//! Rust cannot reflect over an arbitrary function value, so registration
//! erases user functions through [`TaskFn`]: macro-generated adapters wrap
//! any `async fn(Context, P1, .., Pn) -> Result<T, E>` in a small closure
//! that pulls its typed arguments out of a heterogeneous [`Value`] vector,
//! recording the full parameter and return shape as a [`Signature`] at
//! registration time. The [`analyze`] pass then enforces the accepted
//! shapes over that recorded signature, exactly as a reflective
//! implementation would over the function itself.
//!
//! Callables can also be assembled at run time with [`Callable::new`] from
//! a hand-built [`Signature`] and invoker, e.g. by plugin registries.

use std::any::{Any, TypeId};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::context::Context;
use crate::error::{Error, TaskError};
use crate::extract::{Extract, Field};
use crate::store::Value;

/// Runtime identity of a parameter or return slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    /// The type info of a concrete type.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The sentinel for error-typed return slots.
    pub fn error() -> Self {
        Self {
            id: TypeId::of::<TaskError>(),
            name: "error",
        }
    }

    /// The underlying `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type name, as captured at construction.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn is_error(&self) -> bool {
        self.id == TypeId::of::<TaskError>()
    }
}

/// The declared shape of a callable: ordered parameter slots (index 0 is
/// the [`Context`] slot), return slots, and a variadic flag.
///
/// Typed adapters always produce well-formed signatures; the constructor is
/// public so runtime-assembled callables can declare theirs, which
/// [`analyze`] then validates like any other.
#[derive(Debug, Clone)]
pub struct Signature {
    params: Vec<TypeInfo>,
    returns: Vec<TypeInfo>,
    variadic: bool,
}

impl Signature {
    /// A non-variadic signature from parameter and return slots.
    pub fn new(params: Vec<TypeInfo>, returns: Vec<TypeInfo>) -> Self {
        Self {
            params,
            returns,
            variadic: false,
        }
    }

    /// Marks the signature as variadic. Variadic callables are rejected at
    /// registration; the flag exists so runtime-assembled wrappers over
    /// variable-arity calls are honest about their shape.
    pub fn with_variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Ordered parameter slots, including the leading [`Context`] slot.
    pub fn params(&self) -> &[TypeInfo] {
        &self.params
    }

    /// Declared return slots.
    pub fn returns(&self) -> &[TypeInfo] {
        &self.returns
    }

    /// Whether the callable declares a variable-length parameter list.
    pub fn is_variadic(&self) -> bool {
        self.variadic
    }
}

/// Validated signature metadata: full parameter list and optional output.
#[derive(Debug, Clone)]
pub(crate) struct FnInfo {
    pub(crate) params: Vec<TypeInfo>,
    pub(crate) output: Option<TypeInfo>,
}

/// Enforces the accepted callable shapes over a declared signature.
///
/// Accepted shapes, with `Context` always leading:
/// - `(Context) -> error`
/// - `(Context) -> (T, error)`
/// - `(Context, P1, .., Pn) -> error` or `-> (T, error)`
pub(crate) fn analyze(signature: &Signature) -> Result<FnInfo, Error> {
    if signature.params.is_empty() {
        return Err(Error::MustHaveAtLeastContext);
    }
    if signature.variadic {
        return Err(Error::VariadicNotSupported);
    }
    if signature.params[0].id != TypeId::of::<Context>() {
        return Err(Error::FirstParamMustBeContext);
    }

    let output = match signature.returns.as_slice() {
        [] => return Err(Error::MustReturnAtLeastError),
        [only] => {
            if !only.is_error() {
                return Err(Error::SingleReturnMustBeError);
            }
            None
        }
        [first, second] => {
            if !second.is_error() {
                return Err(Error::SecondReturnMustBeError);
            }
            Some(*first)
        }
        _ => return Err(Error::TooManyReturnValues),
    };

    Ok(FnInfo {
        params: signature.params.clone(),
        output,
    })
}

/// The boxed future returned by a callable's invoker: the produced output
/// value (`None` for error-only shapes) or the task's own error.
pub type InvokeFuture = BoxFuture<'static, Result<Option<Value>, TaskError>>;

type Invoker = Arc<dyn Fn(Context, Vec<Value>) -> InvokeFuture + Send + Sync>;

/// A registered function: its declared [`Signature`] plus the type-erased
/// invoker that calls it with resolved arguments.
///
/// Most callers never touch this type: [`Weft::add_task`](crate::Weft::add_task)
/// builds it from any accepted closure shape. It is public for runtime
/// registration through [`Weft::add_callable`](crate::Weft::add_callable).
#[derive(Clone)]
pub struct Callable {
    signature: Signature,
    invoker: Invoker,
}

impl Callable {
    /// Assembles a callable from a declared signature and an invoker.
    ///
    /// The invoker receives the forwarded [`Context`] and the resolved
    /// argument vector (one [`Value`] per non-Context parameter slot, in
    /// declaration order, types already checked against the signature).
    pub fn new<F>(signature: Signature, invoker: F) -> Self
    where
        F: Fn(Context, Vec<Value>) -> InvokeFuture + Send + Sync + 'static,
    {
        Self {
            signature,
            invoker: Arc::new(invoker),
        }
    }

    /// Reinterprets an erased value as a callable, rejecting anything else.
    pub fn from_value(value: &Value) -> Result<Self, Error> {
        value
            .downcast_ref::<Callable>()
            .cloned()
            .ok_or(Error::MustBeFunction)
    }

    /// The declared signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub(crate) fn invoke(&self, ctx: Context, args: Vec<Value>) -> InvokeFuture {
        (self.invoker)(ctx, args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl Extract for Callable {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> &'static str {
        "func"
    }

    fn field(&self, _name: &str) -> Field {
        Field::NotStruct
    }
}

/// Conversion from user functions into [`Callable`]s.
///
/// Implemented for `Fn(Context, P1, .., Pn) -> impl Future<Output =
/// Result<T, E>>` up to eight parameters. `T = ()` selects the error-only
/// return shape: the task produces no stored output. The `Args` parameter
/// only disambiguates the blanket implementations; let inference pick it.
pub trait TaskFn<Args> {
    /// Erases the function into a callable with its recorded signature.
    fn into_callable(self) -> Callable;
}

fn erase_output<T: Extract>(output: T) -> Option<Value> {
    if TypeId::of::<T>() == TypeId::of::<()>() {
        None
    } else {
        Some(Value::new(output))
    }
}

// One adapter per arity; Rust lacks variadic generics.
macro_rules! impl_task_fn {
    ($($P:ident : $idx:tt),*) => {
        impl<F, Fut, T, E $(, $P)*> TaskFn<(Fut, T, E $(, $P)*)> for F
        where
            F: Fn(Context $(, $P)*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = Result<T, E>> + Send + 'static,
            T: Extract,
            E: Into<TaskError>,
            $($P: Clone + Send + 'static,)*
        {
            fn into_callable(self) -> Callable {
                let params = vec![TypeInfo::of::<Context>() $(, TypeInfo::of::<$P>())*];
                let returns = if TypeId::of::<T>() == TypeId::of::<()>() {
                    vec![TypeInfo::error()]
                } else {
                    vec![TypeInfo::of::<T>(), TypeInfo::error()]
                };

                let f = self;
                let invoker = move |ctx: Context, _args: Vec<Value>| -> InvokeFuture {
                    // The resolver checks arity and parameter types against
                    // the recorded signature before dispatch, so these
                    // extractions cannot miss.
                    $(
                        #[allow(non_snake_case)]
                        let $P: $P = _args[$idx].downcast_ref::<$P>().cloned().unwrap();
                    )*
                    let fut = f(ctx $(, $P)*);
                    Box::pin(async move {
                        match fut.await {
                            Ok(output) => Ok(erase_output(output)),
                            Err(err) => Err(err.into()),
                        }
                    })
                };

                Callable::new(Signature::new(params, returns), invoker)
            }
        }
    };
}

impl_task_fn!();
impl_task_fn!(P1: 0);
impl_task_fn!(P1: 0, P2: 1);
impl_task_fn!(P1: 0, P2: 1, P3: 2);
impl_task_fn!(P1: 0, P2: 1, P3: 2, P4: 3);
impl_task_fn!(P1: 0, P2: 1, P3: 2, P4: 3, P5: 4);
impl_task_fn!(P1: 0, P2: 1, P3: 2, P4: 3, P5: 4, P6: 5);
impl_task_fn!(P1: 0, P2: 1, P3: 2, P4: 3, P5: 4, P6: 5, P7: 6);
impl_task_fn!(P1: 0, P2: 1, P3: 2, P4: 3, P5: 4, P6: 5, P7: 6, P8: 7);
