//! Task descriptors: id, callable, input bindings, cached signature info.

use crate::context::Context;
use crate::error::Error;
use crate::input::{InputKind, InputSpec};
use crate::signature::{analyze, Callable, FnInfo, InvokeFuture, TypeInfo};
use crate::store::Value;

/// An immutable registered task. Created at registration, never mutated.
#[derive(Debug)]
pub(crate) struct Task {
    id: String,
    callable: Callable,
    input_specs: Vec<InputSpec>,
    info: FnInfo,
}

impl Task {
    /// Validates and builds a task descriptor.
    ///
    /// The id is whitespace-trimmed and must be non-empty; the callable's
    /// signature must pass [`analyze`]; the descriptor count must equal the
    /// parameter count minus the leading Context slot.
    pub(crate) fn new(
        id: &str,
        callable: Callable,
        input_specs: Vec<InputSpec>,
    ) -> Result<Self, Error> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::TaskIdEmpty);
        }

        let info = analyze(callable.signature())
            .map_err(|err| err.context(format!("invalid function for task {id:?}")))?;

        if input_specs.len() != info.params.len() - 1 {
            return Err(Error::ParamCountMismatch {
                task: id.to_owned(),
                want: info.params.len(),
                got: input_specs.len() + 1,
            });
        }

        Ok(Self {
            id: id.to_owned(),
            callable,
            input_specs,
            info,
        })
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    /// The ids of the tasks this one consumes, in parameter order.
    pub(crate) fn dependencies(&self) -> Vec<&str> {
        self.input_specs
            .iter()
            .filter(|spec| spec.kind() == InputKind::TaskResult)
            .map(InputSpec::source)
            .collect()
    }

    /// The input descriptors paired with the full parameter type list.
    /// `input_specs[i]` feeds `params[i + 1]`; `params[0]` is the Context.
    pub(crate) fn input_params(&self) -> (&[InputSpec], &[TypeInfo]) {
        (&self.input_specs, &self.info.params)
    }

    /// The recorded output type, `None` for error-only shapes.
    pub(crate) fn output(&self) -> Option<&TypeInfo> {
        self.info.output.as_ref()
    }

    pub(crate) fn invoke(&self, ctx: Context, args: Vec<Value>) -> InvokeFuture {
        self.callable.invoke(ctx, args)
    }
}
