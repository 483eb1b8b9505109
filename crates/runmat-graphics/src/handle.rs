use std::fmt;
use std::hash::{Hash, Hasher};

use crate::value::Value;

/// Opaque identifier of a graphics object.
///
/// Figures use small positive integers, every other kind a negative
/// non-integer value. `0` is the root.
#[derive(Debug, Clone, Copy)]
pub struct Handle(f64);

impl Handle {
    pub const ROOT: Handle = Handle(0.0);

    pub fn new(value: f64) -> Self {
        // -0.0 and 0.0 must hash identically.
        if value == 0.0 {
            Handle(0.0)
        } else {
            Handle(value)
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_root(self) -> bool {
        self.0 == 0.0
    }

    pub fn is_integer(self) -> bool {
        self.0.fract() == 0.0
    }

    /// Interpret a dynamic value as a single handle reference.
    pub fn from_value(value: &Value) -> Option<Handle> {
        match value {
            Value::Num(n) if n.is_finite() => Some(Handle::new(*n)),
            Value::Tensor(t) if t.len() == 1 && t.data[0].is_finite() => {
                Some(Handle::new(t.data[0]))
            }
            _ => None,
        }
    }

    /// Interpret a dynamic value as a list of handles (`[]` is an empty list).
    pub fn list_from_value(value: &Value) -> Option<Vec<Handle>> {
        match value {
            Value::Empty => Some(Vec::new()),
            Value::Num(n) => Some(vec![Handle::new(*n)]),
            Value::Tensor(t) => Some(t.data.iter().map(|v| Handle::new(*v)).collect()),
            _ => None,
        }
    }

    pub fn list_to_value(handles: &[Handle]) -> Value {
        if handles.is_empty() {
            return Value::Empty;
        }
        let data: Vec<f64> = handles.iter().map(|h| h.0).collect();
        Value::Tensor(crate::value::Tensor::column(&data))
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Handle {}

impl Hash for Handle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::value::format_short_g(self.0))
    }
}

impl From<Handle> for Value {
    fn from(h: Handle) -> Self {
        Value::Num(h.0)
    }
}

impl From<f64> for Handle {
    fn from(value: f64) -> Self {
        Handle::new(value)
    }
}
