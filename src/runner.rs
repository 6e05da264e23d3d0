//! The orchestrator: task registration, scheduling, and staged execution.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, trace};

use crate::context::Context;
use crate::error::Error;
use crate::graph::DependencyGraph;
use crate::input::InputSpec;
use crate::resolve::resolve_inputs;
use crate::signature::{Callable, TaskFn, TypeInfo};
use crate::store::{Results, Value};
use crate::task::Task;

/// Coordinates dependent tasks, running them concurrently whenever the
/// dependency graph allows, and passing results between them.
///
/// # Workflow
///
/// 1. Create an orchestrator with [`Weft::new`]
/// 2. Register tasks with [`Weft::add_task`], binding parameters to other
///    tasks' outputs ([`use_task`](crate::use_task)) or caller-provided
///    inputs ([`use_run`](crate::use_run))
/// 3. Execute with [`Weft::run`]; retrieve outputs from the returned
///    [`Results`]
///
/// Registration errors are sticky: the first one is kept and surfaced by
/// `run`, while later `add_task` calls keep validating. A duplicate id
/// records the error and discards the newcomer.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use weft::{use_run, use_task, Context, TaskResult, Weft};
///
/// async fn load(_ctx: Context, region: String) -> TaskResult<i32> {
///     Ok(if region == "eu" { 40 } else { 2 })
/// }
///
/// async fn double(_ctx: Context, n: i32) -> TaskResult<i32> {
///     Ok(n * 2)
/// }
///
/// # async {
/// let flow = Weft::new();
/// flow.add_task("load", load, [use_run("region")])
///     .add_task("double", double, [use_task("load")]);
///
/// let inputs = HashMap::from([("region".to_owned(), weft::Value::new("eu".to_owned()))]);
/// let results = flow.run(Context::new(), inputs).await?;
/// assert_eq!(results.get("double")?.downcast_ref::<i32>(), Some(&80));
/// # Ok::<(), weft::Error>(())
/// # };
/// ```
pub struct Weft {
    tasks: RwLock<HashMap<String, Arc<Task>>>,
    error: Mutex<Option<Error>>,
}

impl Default for Weft {
    fn default() -> Self {
        Self::new()
    }
}

impl Weft {
    /// Creates an orchestrator with an empty registry and no pending error.
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            error: Mutex::new(None),
        }
    }

    /// Registers a task and returns `self` for chaining.
    ///
    /// `f` is any function or closure of an accepted shape:
    /// `async fn(Context) -> Result<T, E>` or
    /// `async fn(Context, P1, .., P8) -> Result<T, E>`, where `E` converts
    /// into [`TaskError`](crate::TaskError). `T = ()` means the task
    /// produces no stored output. `inputs` must supply exactly one
    /// descriptor per non-Context parameter, in order.
    ///
    /// Registration failures are recorded (first one wins) and surfaced by
    /// [`Weft::run`]; the chain itself never breaks.
    pub fn add_task<Args>(
        &self,
        id: &str,
        f: impl TaskFn<Args>,
        inputs: impl IntoIterator<Item = InputSpec>,
    ) -> &Self {
        self.register(id, f.into_callable(), inputs.into_iter().collect())
    }

    /// Registers a runtime-assembled [`Callable`]. Same validation and
    /// chaining behavior as [`Weft::add_task`].
    pub fn add_callable(
        &self,
        id: &str,
        callable: Callable,
        inputs: impl IntoIterator<Item = InputSpec>,
    ) -> &Self {
        self.register(id, callable, inputs.into_iter().collect())
    }

    fn register(&self, id: &str, callable: Callable, input_specs: Vec<InputSpec>) -> &Self {
        let task = match Task::new(id, callable, input_specs) {
            Ok(task) => task,
            Err(err) => {
                self.record(err);
                return self;
            }
        };

        let mut tasks = self.tasks.write();
        if tasks.contains_key(task.id()) {
            let id = task.id().to_owned();
            drop(tasks);
            self.record(Error::DuplicateTask { task: id });
            return self;
        }

        debug!(task_id = task.id(), "task registered");
        tasks.insert(task.id().to_owned(), Arc::new(task));
        self
    }

    fn record(&self, err: Error) {
        let mut slot = self.error.lock();
        if slot.is_none() {
            debug!(%err, "registration error recorded");
            *slot = Some(err);
        }
    }

    /// The first registration error, if any. `run` surfaces the same error;
    /// this probe allows detecting it before that.
    pub fn build_error(&self) -> Option<Error> {
        self.error.lock().clone()
    }

    /// Executes the whole graph and returns the filled result store.
    ///
    /// The run seeds a fresh store with `inputs`, computes execution levels
    /// from the registered dependencies, then runs the levels in order:
    /// every task of a level is dispatched concurrently, and the next level
    /// starts only after the current one has fully finished. The first
    /// level to produce errors ends the run with those errors joined.
    ///
    /// `ctx` is forwarded unchanged to every task as its first argument;
    /// cancelling it is cooperative and never pre-empts a running task.
    ///
    /// # Errors
    ///
    /// A sticky registration error, a graph error (cycle, missing
    /// dependency), or the collected errors of the first failing level.
    #[tracing::instrument(skip_all)]
    pub async fn run(
        &self,
        ctx: Context,
        inputs: HashMap<String, Value>,
    ) -> Result<Results, Error> {
        if let Some(err) = self.build_error() {
            return Err(err.context("task registration failed"));
        }

        info!("starting execution");

        let results = Results::new();
        for (key, value) in inputs {
            results.set(key, value);
        }

        let deps: HashMap<String, Vec<String>> = {
            let tasks = self.tasks.read();
            tasks
                .values()
                .map(|task| {
                    let prereqs = task
                        .dependencies()
                        .iter()
                        .map(|dep| (*dep).to_owned())
                        .collect();
                    (task.id().to_owned(), prereqs)
                })
                .collect()
        };

        let levels = DependencyGraph::new(deps).execution_levels()?;
        debug!(level_count = levels.len(), "computed execution levels");

        for level in levels {
            self.run_level(&ctx, level, &results).await?;
        }

        info!("execution completed");
        Ok(results)
    }

    async fn run_level(
        &self,
        ctx: &Context,
        level: Vec<String>,
        results: &Results,
    ) -> Result<(), Error> {
        debug!(task_count = level.len(), "executing level");

        // A single-task level runs inline: no spawn, no scheduling overhead
        // for the common deep-chain shape.
        if let [id] = level.as_slice() {
            let Some(task) = self.tasks.read().get(id).cloned() else {
                return Ok(());
            };
            trace!(task_id = %id, "executing task inline (single-task level)");

            return match AssertUnwindSafe(run_task(ctx.clone(), task, results.clone()))
                .catch_unwind()
                .await
            {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let message = panic_message(payload);
                    error!(task_id = %id, panic_message = %message, "task panicked");
                    Err(Error::TaskPanicked {
                        task: id.clone(),
                        message,
                    })
                }
            };
        }

        let mut workers = FuturesUnordered::new();
        for id in level {
            let Some(task) = self.tasks.read().get(&id).cloned() else {
                continue;
            };
            trace!(task_id = %id, "spawning task");
            let handle = tokio::spawn(run_task(ctx.clone(), task, results.clone()));
            workers.push(async move { (id, handle.await) });
        }

        // Level barrier: drain every worker, collecting all errors.
        let mut errors = Vec::new();
        while let Some((id, joined)) = workers.next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => errors.push(err),
                Err(join_err) => {
                    let message = join_err
                        .try_into_panic()
                        .map(panic_message)
                        .unwrap_or_else(|_| "task aborted".to_owned());
                    error!(task_id = %id, panic_message = %message, "task panicked");
                    errors.push(Error::TaskPanicked { task: id, message });
                }
            }
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Error::Join(errors)),
        }
    }
}

async fn run_task(ctx: Context, task: Arc<Task>, results: Results) -> Result<(), Error> {
    trace!(
        task_id = task.id(),
        output = ?task.output().map(TypeInfo::name),
        "dispatching task"
    );

    let args = resolve_inputs(&task, &results)?;

    match task.invoke(ctx, args).await {
        Ok(Some(output)) => {
            results.set(task.id(), output);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(cause) => {
            error!(task_id = task.id(), %cause, "task failed");
            Err(Error::TaskFailed {
                task: task.id().to_owned(),
                cause: Arc::from(cause),
            })
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
