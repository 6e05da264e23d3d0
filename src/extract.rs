//! Runtime field access over type-erased values.
//!
//! Rust has no general-purpose reflection, so descending into a task output
//! by field name is driven by the [`Extract`] trait instead. Implementations
//! exist for primitives, common containers, and pointer-like wrappers;
//! user structs opt in with `#[derive(Extract)]` from `weft-macros`.
//!
//! Pointer-like wrappers (`Option`, `Box`, `Arc`) forward field access to
//! the value they point at, but keep their own type identity: a stored
//! `Option<User>` still type-checks against an `Option<User>` parameter,
//! while a field path walks straight through it.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Error;
use crate::store::Value;

/// Runtime access to a value's shape and named fields.
///
/// Every value stored in the result store implements this trait; it is what
/// lets an input descriptor's field path descend into the value. Derive it
/// for structs with `#[derive(Extract)]`; the implementations for leaf types
/// simply report that they have no fields.
pub trait Extract: Send + Sync + 'static {
    /// The value as `Any`, for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Short word describing the value's shape, used in extraction errors.
    fn kind(&self) -> &'static str;

    /// Looks up a named field.
    fn field(&self, name: &str) -> Field;

    /// Whether this value is a null pointer-like (`Option::None`).
    fn is_nil(&self) -> bool {
        false
    }
}

/// Outcome of a single [`Extract::field`] lookup.
#[derive(Debug)]
pub enum Field {
    /// The field exists and is accessible; its value, type-erased.
    Value(Value),
    /// No field with that name exists on the type.
    NotFound,
    /// The field exists but is not `pub`.
    NotExported,
    /// The value has no fields at all (primitive, container, ...).
    NotStruct,
}

/// Walks a non-empty field path through a starting value, per segment:
/// nil check, pointer dereference, field lookup.
pub(crate) fn extract_path(start: &Value, path: &[String]) -> Result<Value, Error> {
    let mut current = start.clone();
    for (i, segment) in path.iter().enumerate() {
        if current.is_nil() {
            let message = if i == 0 {
                "value is nil".to_string()
            } else {
                format!("nil pointer while accessing {segment}")
            };
            return Err(Error::InvalidInput { message });
        }
        current = match current.field(segment) {
            Field::Value(value) => value,
            Field::NotStruct => {
                return Err(Error::InvalidInput {
                    message: format!(
                        "field {segment} is not a struct (found {})",
                        current.kind()
                    ),
                })
            }
            Field::NotFound => {
                return Err(Error::InvalidInput {
                    message: format!(
                        "field {segment} not found in type {}",
                        current.type_name()
                    ),
                })
            }
            Field::NotExported => {
                return Err(Error::InvalidInput {
                    message: format!("field {segment} is not exported"),
                })
            }
        };
    }
    Ok(current)
}

// Leaf implementations for primitives and other field-less types.
// One impl per type; the kind word is the type's own name.
macro_rules! impl_extract_leaf {
    ($($t:ty),+ $(,)?) => {
        $(
            impl Extract for $t {
                fn as_any(&self) -> &dyn Any {
                    self
                }

                fn kind(&self) -> &'static str {
                    stringify!($t)
                }

                fn field(&self, _name: &str) -> Field {
                    Field::NotStruct
                }
            }
        )+
    };
}

impl_extract_leaf!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, String,
    ()
);

impl Extract for &'static str {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> &'static str {
        "str"
    }

    fn field(&self, _name: &str) -> Field {
        Field::NotStruct
    }
}

// Containers are leaves too: a field path cannot index into them.
impl<T: Send + Sync + 'static> Extract for Vec<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> &'static str {
        "Vec"
    }

    fn field(&self, _name: &str) -> Field {
        Field::NotStruct
    }
}

impl<K, V> Extract for HashMap<K, V>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> &'static str {
        "HashMap"
    }

    fn field(&self, _name: &str) -> Field {
        Field::NotStruct
    }
}

// Pointer-like wrappers: field access dereferences, type identity does not.
impl<T: Extract> Extract for Option<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> &'static str {
        match self {
            Some(inner) => inner.kind(),
            None => "nil",
        }
    }

    fn field(&self, name: &str) -> Field {
        match self {
            Some(inner) => inner.field(name),
            // The path walk checks is_nil before looking up fields.
            None => Field::NotStruct,
        }
    }

    fn is_nil(&self) -> bool {
        self.is_none()
    }
}

impl<T: Extract> Extract for Box<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn field(&self, name: &str) -> Field {
        (**self).field(name)
    }

    fn is_nil(&self) -> bool {
        (**self).is_nil()
    }
}

impl<T: Extract> Extract for Arc<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn field(&self, name: &str) -> Field {
        (**self).field(name)
    }

    fn is_nil(&self) -> bool {
        (**self).is_nil()
    }
}

// Tuple leaves. Rust lacks variadic generics, so one impl per size.
macro_rules! impl_extract_tuple {
    ($($T:ident),+) => {
        impl<$($T: Send + Sync + 'static),+> Extract for ($($T,)+) {
            fn as_any(&self) -> &dyn Any {
                self
            }

            fn kind(&self) -> &'static str {
                "tuple"
            }

            fn field(&self, _name: &str) -> Field {
                Field::NotStruct
            }
        }
    };
}

impl_extract_tuple!(A, B);
impl_extract_tuple!(A, B, C);
impl_extract_tuple!(A, B, C, D);
impl_extract_tuple!(A, B, C, D, E);
impl_extract_tuple!(A, B, C, D, E, F);
impl_extract_tuple!(A, B, C, D, E, F, G);
impl_extract_tuple!(A, B, C, D, E, F, G, H);
