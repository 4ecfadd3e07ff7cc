//! Option values
//!
//! Literal defaults and overrides are either plain data (anything a YAML document can
//! hold) or a live handle such as an open stream. Data is deep-copied when a default is
//! handed out; handles are shared, so every resolution sees the same instance.

use serde_yaml::{Mapping, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A shared, non-copyable object (stream, socket, logger sink, ...).
#[derive(Clone)]
pub struct Handle {
    inner: Arc<dyn Any + Send + Sync>,
}

impl Handle {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self { inner: value }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// True when both handles point at the same instance.
    pub fn ptr_eq(&self, other: &Handle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:p})", Arc::as_ptr(&self.inner))
    }
}

/// Value of a literal option, or of an override.
#[derive(Debug, Clone)]
pub enum OptionValue {
    Data(Value),
    Handle(Handle),
}

impl OptionValue {
    pub fn null() -> Self {
        OptionValue::Data(Value::Null)
    }

    /// Copy with value semantics. Handles alias the original instance.
    pub fn duplicate(&self) -> Self {
        match self {
            OptionValue::Data(value) => OptionValue::Data(deep_copy(value)),
            OptionValue::Handle(handle) => OptionValue::Handle(handle.clone()),
        }
    }

    pub fn as_data(&self) -> Option<&Value> {
        match self {
            OptionValue::Data(value) => Some(value),
            OptionValue::Handle(_) => None,
        }
    }

    pub fn as_handle(&self) -> Option<&Handle> {
        match self {
            OptionValue::Handle(handle) => Some(handle),
            OptionValue::Data(_) => None,
        }
    }

    /// `null` and `false` clear a file-backed option when used as an override.
    pub fn is_cleared(&self) -> bool {
        matches!(self, OptionValue::Data(Value::Null | Value::Bool(false)))
    }
}

fn deep_copy(value: &Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.iter()
                .map(|(k, v)| (deep_copy(k), deep_copy(v)))
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.iter().map(deep_copy).collect()),
        Value::Tagged(tagged) => Value::Tagged(Box::new(serde_yaml::value::TaggedValue {
            tag: tagged.tag.clone(),
            value: deep_copy(&tagged.value),
        })),
        scalar => scalar.clone(),
    }
}

impl PartialEq for OptionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OptionValue::Data(a), OptionValue::Data(b)) => a == b,
            (OptionValue::Handle(a), OptionValue::Handle(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<Value> for OptionValue {
    fn from(value: Value) -> Self {
        OptionValue::Data(value)
    }
}

impl From<Mapping> for OptionValue {
    fn from(map: Mapping) -> Self {
        OptionValue::Data(Value::Mapping(map))
    }
}

impl From<Handle> for OptionValue {
    fn from(handle: Handle) -> Self {
        OptionValue::Handle(handle)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Data(Value::String(s.to_string()))
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Data(Value::String(s))
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Data(Value::Bool(b))
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Data(Value::Number(n.into()))
    }
}

impl From<i32> for OptionValue {
    fn from(n: i32) -> Self {
        OptionValue::Data(Value::Number(i64::from(n).into()))
    }
}

impl From<u64> for OptionValue {
    fn from(n: u64) -> Self {
        OptionValue::Data(Value::Number(n.into()))
    }
}

impl From<f64> for OptionValue {
    fn from(n: f64) -> Self {
        OptionValue::Data(Value::Number(n.into()))
    }
}

impl<T: Into<OptionValue>> From<Option<T>> for OptionValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_else(OptionValue::null)
    }
}
