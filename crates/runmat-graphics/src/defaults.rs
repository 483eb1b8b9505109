use std::collections::BTreeMap;

use crate::kinds::ObjectKind;
use crate::value::{StructValue, Value};

/// Per-object list of user defaults, keyed by object kind then property name.
#[derive(Debug, Clone, Default)]
pub struct PropertyList {
    entries: BTreeMap<ObjectKind, BTreeMap<String, Value>>,
}

impl PropertyList {
    /// Store a default; the string `"remove"` deletes the entry instead.
    pub fn set(&mut self, kind: ObjectKind, name: &str, value: Value) {
        if matches!(&value, Value::String(s) if s.eq_ignore_ascii_case("remove")) {
            self.remove(kind, name);
            return;
        }
        self.entries
            .entry(kind)
            .or_default()
            .insert(name.to_ascii_lowercase(), value);
    }

    pub fn remove(&mut self, kind: ObjectKind, name: &str) {
        if let Some(map) = self.entries.get_mut(&kind) {
            map.remove(&name.to_ascii_lowercase());
            if map.is_empty() {
                self.entries.remove(&kind);
            }
        }
    }

    pub fn lookup(&self, kind: ObjectKind, name: &str) -> Option<&Value> {
        self.entries
            .get(&kind)
            .and_then(|map| map.get(&name.to_ascii_lowercase()))
    }

    pub fn entries_for(&self, kind: ObjectKind) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.get(&kind).into_iter().flat_map(|m| m.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries rendered as `default<kind><prop>` fields.
    pub fn to_struct(&self) -> StructValue {
        let mut out = StructValue::new();
        for (kind, map) in &self.entries {
            for (name, value) in map {
                out.insert(format!("default{}{}", kind.name(), name), value.clone());
            }
        }
        out
    }
}

/// Pseudo-property names addressing default lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultName {
    Default { kind: ObjectKind, property: String },
    Factory { kind: ObjectKind, property: String },
}

impl DefaultName {
    pub fn parse(name: &str) -> Option<Self> {
        let lowered = name.to_ascii_lowercase();
        if let Some(rest) = lowered.strip_prefix("default") {
            let (kind, property) = ObjectKind::split_prefixed(rest)?;
            return Some(DefaultName::Default { kind, property });
        }
        if let Some(rest) = lowered.strip_prefix("factory") {
            let (kind, property) = ObjectKind::split_prefixed(rest)?;
            return Some(DefaultName::Factory { kind, property });
        }
        None
    }
}

/// `"default"` / `"factory"` keyword values accepted by `set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKeyword {
    Default,
    Factory,
}

impl ValueKeyword {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if s.eq_ignore_ascii_case("default") => Some(ValueKeyword::Default),
            Value::String(s) if s.eq_ignore_ascii_case("factory") => Some(ValueKeyword::Factory),
            _ => None,
        }
    }
}
