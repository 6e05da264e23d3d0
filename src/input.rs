//! Input descriptors binding task parameters to their sources.

/// Where an input value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A caller-provided value from the runtime inputs passed to `run`.
    Runtime,
    /// Another task's output, looked up by task id.
    TaskResult,
}

/// Describes where a single positional task parameter comes from: a source
/// key, and an optional field path to descend into the resolved value.
///
/// Built with [`use_task`] or [`use_run`]; do not assemble one by hand.
///
/// # Examples
///
/// ```
/// use weft::{use_run, use_task};
///
/// let whole = use_task("fetch_user");
/// let city = use_task("fetch_user").field("address").field("city");
/// let dotted = use_task("fetch_user").field("address.city"); // same path
/// let runtime = use_run("user_id");
/// # assert_eq!(city, dotted);
/// # let _ = (whole, runtime);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    kind: InputKind,
    source: String,
    field_path: Vec<String>,
}

impl InputSpec {
    /// Appends a segment to the field path. Dot-separated strings are split
    /// into one segment per component, so `.field("a.b")` equals
    /// `.field("a").field("b")`.
    pub fn field(mut self, segment: impl AsRef<str>) -> Self {
        self.field_path
            .extend(segment.as_ref().split('.').map(str::to_owned));
        self
    }

    /// The source kind.
    pub fn kind(&self) -> InputKind {
        self.kind
    }

    /// The lookup key: a task id or a runtime input name.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The ordered field path, empty when the whole value is used.
    pub fn field_path(&self) -> &[String] {
        &self.field_path
    }
}

/// Descriptor for another task's output.
///
/// ```
/// use weft::use_task;
///
/// let spec = use_task("fetch_user");
/// let nested = use_task("fetch_user").field("address").field("street");
/// # let _ = (spec, nested);
/// ```
pub fn use_task(source: impl Into<String>) -> InputSpec {
    InputSpec {
        kind: InputKind::TaskResult,
        source: source.into(),
        field_path: Vec::new(),
    }
}

/// Descriptor for a caller-provided runtime input.
///
/// ```
/// use weft::use_run;
///
/// let spec = use_run("user_id");
/// # let _ = spec;
/// ```
pub fn use_run(source: impl Into<String>) -> InputSpec {
    InputSpec {
        kind: InputKind::Runtime,
        source: source.into(),
        field_path: Vec::new(),
    }
}
