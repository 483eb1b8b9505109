//! A single node of the scene graph.

use crate::defaults::PropertyList;
use crate::handle::Handle;
use crate::kinds::ObjectKind;
use crate::property::{on_off_str, PropertySet};
use crate::props::factory_properties;
use crate::ticks::DataLimits;
use crate::transform::GraphicsTransform;
use crate::value::Value;

/// Index into [`DataCache::limits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitAxis {
    X = 0,
    Y = 1,
    Z = 2,
    C = 3,
    A = 4,
}

impl LimitAxis {
    pub const ALL: [LimitAxis; 5] = [
        LimitAxis::X,
        LimitAxis::Y,
        LimitAxis::Z,
        LimitAxis::C,
        LimitAxis::A,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            LimitAxis::X => "x",
            LimitAxis::Y => "y",
            LimitAxis::Z => "z",
            LimitAxis::C => "c",
            LimitAxis::A => "a",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.prefix() == prefix)
    }
}

/// Extrema of an object's data arrays, one slot per [`LimitAxis`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataCache {
    pub limits: [DataLimits; 5],
}

impl DataCache {
    pub fn get(&self, axis: LimitAxis) -> &DataLimits {
        &self.limits[axis as usize]
    }

    pub fn set(&mut self, axis: LimitAxis, limits: DataLimits) {
        self.limits[axis as usize] = limits;
    }
}

/// Screen-space classification of one axis after projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisOrientation {
    #[default]
    Any,
    Horizontal,
    Vertical,
    Depth,
}

/// Plane and tick placement derived from the current view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxesLayout {
    pub orientation: [AxisOrientation; 3],
    /// Coordinate (in scaled data space) of the plane each axis line lies on.
    pub planes: [f64; 3],
    /// Position of the tick marks along the other two axes, per axis.
    pub tick_anchor: [[f64; 2]; 3],
    pub x_on_top: bool,
    pub y_on_right: bool,
    /// Pixel bounding box `[left, top, width, height]`.
    pub bounding_box: [f64; 4],
    /// Tick length in pixels (major).
    pub tick_length: f64,
}

/// Saved state for `unzoom`.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomSnapshot {
    pub entries: Vec<(String, Value)>,
}

#[derive(Debug, Clone, Default)]
pub struct AxesState {
    pub transform: GraphicsTransform,
    pub layout: AxesLayout,
    pub zoom: Option<ZoomSnapshot>,
}

/// Kind-specific derived state kept beside the property set.
#[derive(Debug, Clone, Default)]
pub enum ObjectState {
    #[default]
    None,
    Axes(Box<AxesState>),
    Data(DataCache),
    /// Objects whose `uicontextmenu` refers to this menu.
    ContextMenu { dependents: Vec<Handle> },
}

#[derive(Debug, Clone)]
pub struct GraphicsObject {
    handle: Handle,
    kind: ObjectKind,
    parent: Option<Handle>,
    /// Newest first.
    children: Vec<Handle>,
    pub(crate) props: PropertySet,
    pub(crate) defaults: PropertyList,
    pub(crate) state: ObjectState,
    pub(crate) being_deleted: bool,
    pub(crate) modified: bool,
}

impl GraphicsObject {
    pub fn new(handle: Handle, kind: ObjectKind, parent: Option<Handle>) -> Self {
        let mut props = factory_properties(kind);
        if let Some(p) = props.get_mut("parent") {
            p.store(parent.map(Value::from).unwrap_or(Value::Empty));
        }
        let state = match kind {
            ObjectKind::Axes => ObjectState::Axes(Box::default()),
            ObjectKind::UiContextMenu => ObjectState::ContextMenu {
                dependents: Vec::new(),
            },
            k if k.has_data_limits() => ObjectState::Data(DataCache::default()),
            _ => ObjectState::None,
        };
        GraphicsObject {
            handle,
            kind,
            parent,
            children: Vec::new(),
            props,
            defaults: PropertyList::default(),
            state,
            being_deleted: false,
            modified: true,
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub(crate) fn set_handle(&mut self, handle: Handle) {
        self.handle = handle;
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn parent(&self) -> Option<Handle> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
        if let Some(p) = self.props.get_mut("parent") {
            p.store(parent.map(Value::from).unwrap_or(Value::Empty));
        }
    }

    /// All children, newest first, regardless of handle visibility.
    pub fn children(&self) -> &[Handle] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Handle> {
        &mut self.children
    }

    pub fn properties(&self) -> &PropertySet {
        &self.props
    }

    pub fn is_being_deleted(&self) -> bool {
        self.being_deleted
    }

    /// Value of a property by canonical name, or `Empty` when undeclared.
    pub fn value(&self, name: &str) -> Value {
        self.props.value(name).cloned().unwrap_or_default()
    }

    pub fn str_value(&self, name: &str) -> String {
        self.props
            .value(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    pub fn f64_value(&self, name: &str) -> Option<f64> {
        self.props.value(name).and_then(Value::as_f64)
    }

    pub fn numbers(&self, name: &str) -> Vec<f64> {
        self.props
            .value(name)
            .and_then(Value::numbers)
            .unwrap_or_default()
    }

    pub fn handle_value(&self, name: &str) -> Option<Handle> {
        self.props.value(name).and_then(Handle::from_value)
    }

    pub fn is_on(&self, name: &str) -> bool {
        self.props.value(name).and_then(Value::as_str) == Some(on_off_str(true))
    }

    /// `true` when the `<name>mode` companion reads `auto` (or is absent).
    pub fn is_auto(&self, name: &str) -> bool {
        self.props
            .value(&format!("{name}mode"))
            .and_then(Value::as_str)
            .map(|m| m == "auto")
            .unwrap_or(true)
    }

    pub fn axes_state(&self) -> Option<&AxesState> {
        match &self.state {
            ObjectState::Axes(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn axes_state_mut(&mut self) -> Option<&mut AxesState> {
        match &mut self.state {
            ObjectState::Axes(s) => Some(s),
            _ => None,
        }
    }

    pub fn data_cache(&self) -> Option<&DataCache> {
        match &self.state {
            ObjectState::Data(c) => Some(c),
            _ => None,
        }
    }

    pub(crate) fn data_cache_mut(&mut self) -> Option<&mut DataCache> {
        match &mut self.state {
            ObjectState::Data(c) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_property_tracks_link() {
        let mut obj = GraphicsObject::new(Handle::new(-1.5), ObjectKind::Line, None);
        assert_eq!(obj.value("parent"), Value::Empty);
        obj.set_parent(Some(Handle::new(-2.25)));
        assert_eq!(obj.value("parent"), Value::Num(-2.25));
        assert!(obj.data_cache().is_some());
    }

    #[test]
    fn mode_companions() {
        let obj = GraphicsObject::new(Handle::new(-1.5), ObjectKind::Axes, None);
        assert!(obj.is_auto("xlim"));
        assert!(obj.is_auto("linewidth"));
        assert!(obj.axes_state().is_some());
        assert!(obj.is_on("visible"));
    }
}
