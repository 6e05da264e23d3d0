//! Async DAG Task Orchestration
//!
//! weft coordinates a collection of dependent async tasks as a directed
//! acyclic graph, replacing hand-rolled join-handle and channel plumbing
//! with a fluent registration API, automatic level-based scheduling, and
//! runtime-typed result passing between tasks.
//!
//! # Features
//!
//! - **Level-synchronous scheduling**: Kahn's algorithm groups tasks into
//!   execution levels; every task of a level runs concurrently, and a level
//!   starts only after all of its predecessors' levels have finished.
//! - **Runtime validation**: cycles, dangling dependencies, duplicate ids,
//!   descriptor/parameter count mismatches, and argument type mismatches
//!   are all caught before the affected task runs.
//! - **Typed result passing**: task outputs flow through a shared store as
//!   type-erased [`Value`]s; each parameter is checked against the
//!   consuming function's declared type before dispatch.
//! - **Field paths**: an input descriptor can descend into a producer's
//!   output by field name (`use_task("fetch").field("address.city")`),
//!   powered by `#[derive(Extract)]`.
//! - **Cooperative cancellation**: every task receives a [`Context`] as its
//!   first argument and decides for itself when to honor a cancellation.
//! - **Inline fast path**: a level holding a single task executes on the
//!   calling task instead of being spawned, which removes scheduling
//!   overhead from deep sequential chains.
//!
//! # Quick Start
//!
//! ```
//! use std::collections::HashMap;
//! use weft::{use_task, Context, TaskResult, Weft};
//!
//! async fn fetch(_ctx: Context) -> TaskResult<i32> {
//!     Ok(10)
//! }
//!
//! async fn left(_ctx: Context, v: i32) -> TaskResult<i32> {
//!     Ok(v * 2)
//! }
//!
//! async fn right(_ctx: Context, v: i32) -> TaskResult<i32> {
//!     Ok(v * 3)
//! }
//!
//! async fn join(_ctx: Context, a: i32, b: i32) -> TaskResult<i32> {
//!     Ok(a + b)
//! }
//!
//! # async {
//! let flow = Weft::new();
//! flow.add_task("fetch", fetch, [])
//!     .add_task("left", left, [use_task("fetch")])
//!     .add_task("right", right, [use_task("fetch")])
//!     .add_task("join", join, [use_task("left"), use_task("right")]);
//!
//! let results = flow.run(Context::new(), HashMap::new()).await?;
//! assert_eq!(results.get("join")?.downcast_ref::<i32>(), Some(&50));
//! # Ok::<(), weft::Error>(())
//! # };
//! ```
//!
//! `left` and `right` run concurrently: both depend only on `fetch`, so
//! they share an execution level.
//!
//! # Accepted task shapes
//!
//! A task function always takes [`Context`] first and returns a `Result`:
//!
//! - `async fn(Context) -> Result<T, E>`
//! - `async fn(Context, P1, .., P8) -> Result<T, E>`
//!
//! where `E` converts into [`TaskError`]. `T = ()` marks a task that
//! produces no stored output (the error-only shape). Each non-Context
//! parameter is bound, in order, to an [`InputSpec`] created with
//! [`use_task`] (another task's output) or [`use_run`] (a caller-provided
//! runtime input).
//!
//! # Error handling
//!
//! Registration failures are sticky: the first one is retained and returned
//! by [`Weft::run`] without executing anything; [`Weft::build_error`]
//! probes for it earlier. During a run, all failures of the first failing
//! level are collected and joined, and later levels never start. Match
//! failure categories with [`Error::kind`] / [`Error::is_kind`], which look
//! through context wrappers and joins.

// Allows the derive macro's `::weft` paths to resolve inside this crate's
// own tests.
extern crate self as weft;

mod context;
mod error;
mod extract;
mod graph;
mod input;
mod resolve;
mod runner;
mod signature;
mod store;
mod task;

pub use context::Context;
pub use error::{Error, ErrorKind, TaskError, TaskResult};
pub use extract::{Extract, Field};
pub use input::{use_run, use_task, InputKind, InputSpec};
pub use runner::Weft;
pub use signature::{Callable, InvokeFuture, Signature, TaskFn, TypeInfo};
pub use store::{Results, Value};

pub use weft_macros::Extract;
