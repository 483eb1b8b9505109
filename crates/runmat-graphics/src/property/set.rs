use std::collections::BTreeMap;

use super::{match_prefix, PrefixMatch, Property};
use crate::error::{GraphicsError, GraphicsResult};
use crate::value::StructValue;

/// Name-indexed collection of an object's properties. Keys are lower-case;
/// core properties come from the kind's declaration, dynamic ones are added
/// at runtime.
#[derive(Debug, Clone, Default)]
pub struct PropertySet {
    object: String,
    props: BTreeMap<String, Property>,
}

impl PropertySet {
    pub fn new(object: &str) -> Self {
        PropertySet {
            object: object.to_string(),
            props: BTreeMap::new(),
        }
    }

    pub fn object_name(&self) -> &str {
        &self.object
    }

    /// Add a core property; a later declaration with the same name replaces
    /// the earlier one (kinds refine shared base declarations this way).
    pub fn declare(&mut self, property: Property) {
        self.props.insert(property.name().to_string(), property);
    }

    pub fn add_dynamic(&mut self, property: Property) -> GraphicsResult<()> {
        let key = property.name().to_string();
        if self.props.contains_key(&key) {
            return Err(GraphicsError::PropertyExists { name: key });
        }
        self.props.insert(key, property.into_dynamic());
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.props.contains_key(&name.to_ascii_lowercase())
    }

    /// Resolve a case-insensitive, possibly abbreviated name to its canonical
    /// key. Hidden properties only match when spelled out.
    pub fn resolve(&self, name: &str) -> GraphicsResult<String> {
        let lowered = name.to_ascii_lowercase();
        if self.props.contains_key(&lowered) {
            return Ok(lowered);
        }
        let visible = self
            .props
            .values()
            .filter(|p| !p.is_hidden())
            .map(|p| p.name());
        match match_prefix(&lowered, visible) {
            PrefixMatch::Exact(hit) | PrefixMatch::Unique(hit) => Ok(hit.to_string()),
            PrefixMatch::Ambiguous(hits) => Err(GraphicsError::AmbiguousProperty {
                object: self.object.clone(),
                name: name.to_string(),
                matches: hits.into_iter().map(str::to_string).collect(),
            }),
            PrefixMatch::NoMatch => Err(self.unknown(name)),
        }
    }

    pub fn unknown(&self, name: &str) -> GraphicsError {
        GraphicsError::UnknownProperty {
            object: self.object.clone(),
            name: name.to_string(),
        }
    }

    /// Look up by canonical name.
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.props.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.props.get_mut(name)
    }

    pub fn lookup(&self, name: &str) -> GraphicsResult<&Property> {
        let key = self.resolve(name)?;
        self.props.get(&key).ok_or_else(|| self.unknown(name))
    }

    pub fn value(&self, name: &str) -> Option<&crate::value::Value> {
        self.props.get(name).map(Property::get)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.props.keys().map(String::as_str)
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.props.values()
    }

    pub fn properties_mut(&mut self) -> impl Iterator<Item = &mut Property> {
        self.props.values_mut()
    }

    /// Snapshot of every property value; hidden ones only on request.
    pub fn get_all(&self, include_hidden: bool) -> StructValue {
        let mut out = StructValue::new();
        for prop in self.props.values() {
            if prop.is_hidden() && !include_hidden {
                continue;
            }
            out.insert(prop.name(), prop.get().clone());
        }
        out
    }
}
