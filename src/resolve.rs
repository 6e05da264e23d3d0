//! Argument resolution for a task about to be dispatched.

use crate::error::Error;
use crate::extract::extract_path;
use crate::store::{Results, Value};
use crate::task::Task;

/// Assembles a task's positional argument vector from the result store.
///
/// Returns one [`Value`] per non-Context parameter, in declaration order;
/// the Context itself travels alongside the vector at dispatch. Parameter
/// indices in errors are one-based and count the hidden Context slot, so
/// the first resolvable parameter is "parameter 2".
pub(crate) fn resolve_inputs(task: &Task, results: &Results) -> Result<Vec<Value>, Error> {
    let (specs, types) = task.input_params();
    let mut args = Vec::with_capacity(specs.len());

    for (i, spec) in specs.iter().enumerate() {
        let mut value = results.get(spec.source()).map_err(|err| {
            err.context(format!(
                "failed to get {:?} for task {:?}, did you miss to set it in the run inputs",
                spec.source(),
                task.id(),
            ))
        })?;

        if !spec.field_path().is_empty() {
            value = extract_path(&value, spec.field_path())
                .map_err(|err| err.context(format!("parameter {}", i + 2)))?;
        }

        // Strict assignability: the runtime type must be exactly the
        // declared parameter type. A `None` of the expected `Option<T>`
        // carries that same type and passes.
        let expected = &types[i + 1];
        if value.type_id() != expected.id() {
            return Err(Error::InvalidParamType {
                index: i + 2,
                expected: expected.name(),
                actual: value.type_name(),
            });
        }

        args.push(value);
    }

    Ok(args)
}
