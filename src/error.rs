//! Error types for registration, graph validation, and execution.

use std::sync::Arc;

/// Error type returned by user task functions.
///
/// Task functions may fail with any error convertible into this boxed form,
/// including plain `String`s and custom error types.
pub type TaskError = Box<dyn std::error::Error + Send + Sync>;

/// Convenience alias for the return type of task functions.
pub type TaskResult<T> = Result<T, TaskError>;

/// Errors raised during registration, graph validation, and execution.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The registered callable is not a function.
    #[error("must be a function")]
    MustBeFunction,

    /// The callable declares no parameters at all.
    #[error("must have at least one parameter (Context)")]
    MustHaveAtLeastContext,

    /// The callable's first parameter is not the cancellation [`Context`](crate::Context).
    #[error("first parameter must be Context")]
    FirstParamMustBeContext,

    /// The callable declares a variable-length parameter list.
    #[error("variadic functions are not supported")]
    VariadicNotSupported,

    /// The callable declares no return values.
    #[error("must return at least an error")]
    MustReturnAtLeastError,

    /// The callable's single return value is not error-typed.
    #[error("single return value must be an error")]
    SingleReturnMustBeError,

    /// The callable's second return value is not error-typed.
    #[error("second return value must be an error")]
    SecondReturnMustBeError,

    /// The callable declares three or more return values.
    #[error("must return 1 or 2 values")]
    TooManyReturnValues,

    /// The task id is empty after trimming whitespace.
    #[error("task id must not be empty")]
    TaskIdEmpty,

    /// The number of input descriptors does not match the callable's
    /// parameter count. `want` counts every parameter including the leading
    /// Context slot; `got` is the descriptor count plus that slot.
    #[error("invalid number of input specs for task {task:?}, want: {want}, got: {got}")]
    ParamCountMismatch {
        task: String,
        want: usize,
        got: usize,
    },

    /// A task id was registered twice. The first registration wins.
    #[error("task {task:?} already registered")]
    DuplicateTask { task: String },

    /// The dependency graph contains a cycle.
    #[error("cyclic dependency detected")]
    CyclicDependency,

    /// A task depends on an id that is not registered.
    #[error("node {node:?} depends on non-existent node {dependency:?}")]
    MissingDependency { node: String, dependency: String },

    /// A result store lookup missed. Covers unregistered runtime inputs and
    /// absent upstream task outputs alike.
    #[error("no result for {key:?}")]
    TaskNotFound { key: String },

    /// A resolved value's runtime type is not assignable to the parameter
    /// it feeds. The index is one-based and counts the Context slot.
    #[error("invalid type for parameter {index}: expected {expected}, got {actual}")]
    InvalidParamType {
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },

    /// A field-path walk over a resolved value failed.
    #[error("{message}")]
    InvalidInput { message: String },

    /// A task function returned an error.
    #[error("task {task:?} failed: {cause}")]
    TaskFailed {
        task: String,
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// A task function panicked. The panic is captured and surfaced as an
    /// error so one misbehaving task cannot take down the whole run.
    #[error("task {task:?} panicked: {message}")]
    TaskPanicked { task: String, message: String },

    /// An error wrapped with additional formatted context.
    #[error("{context}: {cause}")]
    Context { context: String, cause: Box<Error> },

    /// Multiple task errors collected at a level barrier.
    #[error("{}", join_display(.0))]
    Join(Vec<Error>),
}

/// Fieldless mirror of [`Error`] used for matching on failure categories
/// through context wrappers and joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    MustBeFunction,
    MustHaveAtLeastContext,
    FirstParamMustBeContext,
    VariadicNotSupported,
    MustReturnAtLeastError,
    SingleReturnMustBeError,
    SecondReturnMustBeError,
    TooManyReturnValues,
    TaskIdEmpty,
    ParamCountMismatch,
    DuplicateTask,
    CyclicDependency,
    MissingDependency,
    TaskNotFound,
    InvalidParamType,
    InvalidInput,
    TaskFailed,
    TaskPanicked,
    Join,
}

impl Error {
    /// Wraps this error with formatted context, preserving the underlying
    /// kind for [`Error::kind`] and [`Error::is_kind`].
    pub fn context(self, context: impl Into<String>) -> Self {
        Error::Context {
            context: context.into(),
            cause: Box::new(self),
        }
    }

    /// The failure category, looking through context wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MustBeFunction => ErrorKind::MustBeFunction,
            Error::MustHaveAtLeastContext => ErrorKind::MustHaveAtLeastContext,
            Error::FirstParamMustBeContext => ErrorKind::FirstParamMustBeContext,
            Error::VariadicNotSupported => ErrorKind::VariadicNotSupported,
            Error::MustReturnAtLeastError => ErrorKind::MustReturnAtLeastError,
            Error::SingleReturnMustBeError => ErrorKind::SingleReturnMustBeError,
            Error::SecondReturnMustBeError => ErrorKind::SecondReturnMustBeError,
            Error::TooManyReturnValues => ErrorKind::TooManyReturnValues,
            Error::TaskIdEmpty => ErrorKind::TaskIdEmpty,
            Error::ParamCountMismatch { .. } => ErrorKind::ParamCountMismatch,
            Error::DuplicateTask { .. } => ErrorKind::DuplicateTask,
            Error::CyclicDependency => ErrorKind::CyclicDependency,
            Error::MissingDependency { .. } => ErrorKind::MissingDependency,
            Error::TaskNotFound { .. } => ErrorKind::TaskNotFound,
            Error::InvalidParamType { .. } => ErrorKind::InvalidParamType,
            Error::InvalidInput { .. } => ErrorKind::InvalidInput,
            Error::TaskFailed { .. } => ErrorKind::TaskFailed,
            Error::TaskPanicked { .. } => ErrorKind::TaskPanicked,
            Error::Context { cause, .. } => cause.kind(),
            Error::Join(_) => ErrorKind::Join,
        }
    }

    /// Whether this error, anything it wraps, or any joined member matches
    /// the given kind.
    pub fn is_kind(&self, kind: ErrorKind) -> bool {
        match self {
            Error::Context { cause, .. } => cause.is_kind(kind),
            Error::Join(members) => {
                kind == ErrorKind::Join || members.iter().any(|e| e.is_kind(kind))
            }
            other => other.kind() == kind,
        }
    }
}

fn join_display(members: &[Error]) -> String {
    members
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
