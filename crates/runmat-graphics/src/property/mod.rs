//! Typed, validated property cells.

pub mod color;
pub mod radio;
pub mod set;

use std::fmt;
use std::rc::Rc;

use crate::engine::GraphicsEngine;
use crate::handle::Handle;
use crate::value::{Tensor, Value};

pub use radio::{match_prefix, PrefixMatch, RadioValues};
pub use set::PropertySet;

/// Why a candidate value was refused.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub reason: String,
    pub candidates: Vec<String>,
}

impl Rejection {
    fn new(reason: impl Into<String>) -> Self {
        Rejection {
            reason: reason.into(),
            candidates: Vec::new(),
        }
    }

    fn with_candidates(reason: impl Into<String>, candidates: &[String]) -> Self {
        Rejection {
            reason: reason.into(),
            candidates: candidates.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub value: f64,
    pub inclusive: bool,
}

/// Numeric range constraint; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Range {
    pub min: Option<Bound>,
    pub max: Option<Bound>,
}

impl Range {
    pub fn greater_than(value: f64) -> Self {
        Range {
            min: Some(Bound {
                value,
                inclusive: false,
            }),
            max: None,
        }
    }

    pub fn at_least(value: f64) -> Self {
        Range {
            min: Some(Bound {
                value,
                inclusive: true,
            }),
            max: None,
        }
    }

    pub fn between(lo: f64, hi: f64) -> Self {
        Range {
            min: Some(Bound {
                value: lo,
                inclusive: true,
            }),
            max: Some(Bound {
                value: hi,
                inclusive: true,
            }),
        }
    }

    pub fn check(&self, x: f64) -> Result<(), String> {
        if x.is_nan() {
            return Ok(());
        }
        if let Some(min) = self.min {
            if min.inclusive && x < min.value {
                return Err(format!(
                    "must be greater than or equal to {}",
                    crate::value::format_short_g(min.value)
                ));
            }
            if !min.inclusive && x <= min.value {
                return Err(format!(
                    "must be greater than {}",
                    crate::value::format_short_g(min.value)
                ));
            }
        }
        if let Some(max) = self.max {
            if max.inclusive && x > max.value {
                return Err(format!(
                    "must be less than or equal to {}",
                    crate::value::format_short_g(max.value)
                ));
            }
            if !max.inclusive && x >= max.value {
                return Err(format!(
                    "must be less than {}",
                    crate::value::format_short_g(max.value)
                ));
            }
        }
        Ok(())
    }
}

/// Shape and range limits for numeric-array properties. A dimension of `-1`
/// accepts any extent; no shapes at all accepts any array.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayConstraints {
    pub shapes: Vec<Vec<i64>>,
    pub range: Option<Range>,
    pub force_row: bool,
}

impl ArrayConstraints {
    fn shape_ok(&self, dims: &[usize]) -> bool {
        if self.shapes.is_empty() {
            return true;
        }
        self.shapes.iter().any(|shape| {
            shape.len() == dims.len()
                && shape
                    .iter()
                    .zip(dims)
                    .all(|(want, got)| *want < 0 || *want as usize == *got)
        })
    }

    fn describe_shapes(&self) -> String {
        self.shapes
            .iter()
            .map(|s| {
                s.iter()
                    .map(|d| if *d < 0 { "N".to_string() } else { d.to_string() })
                    .collect::<Vec<_>>()
                    .join("x")
            })
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    /// Plain character string.
    String,
    /// String or cell array of strings (multi-line text).
    Text,
    /// Any value, unchecked.
    Any,
    /// `"on"`/`"off"` switch; logical values are accepted and normalised.
    Bool,
    Radio(RadioValues),
    Double {
        range: Option<Range>,
    },
    DoubleRadio {
        radio: RadioValues,
        range: Option<Range>,
    },
    Array(ArrayConstraints),
    Color {
        radio: Option<RadioValues>,
    },
    Handle,
    Children,
    Callback,
}

impl PropertyKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyKind::String => "string",
            PropertyKind::Text => "text",
            PropertyKind::Any => "any",
            PropertyKind::Bool => "boolean",
            PropertyKind::Radio(_) => "radio",
            PropertyKind::Double { .. } => "double",
            PropertyKind::DoubleRadio { .. } => "doubleradio",
            PropertyKind::Array(_) => "data",
            PropertyKind::Color { .. } => "color",
            PropertyKind::Handle => "handle",
            PropertyKind::Children => "children",
            PropertyKind::Callback => "callback",
        }
    }
}

/// Lifecycle moment a listener is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerMoment {
    PreSet,
    PostSet,
    Persistent,
    PreDelete,
}

impl ListenerMoment {
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "preset" | "no" => Some(ListenerMoment::PreSet),
            "postset" => Some(ListenerMoment::PostSet),
            "persistent" => Some(ListenerMoment::Persistent),
            "predelete" => Some(ListenerMoment::PreDelete),
            _ => None,
        }
    }
}

pub type NativeAction = Rc<dyn Fn(&mut GraphicsEngine, Handle, &Value)>;

/// A property listener: either an interpreter callback value or an in-process
/// action (used by `waitfor`).
#[derive(Clone)]
pub enum Listener {
    Callback(Value),
    Native { id: u64, action: NativeAction },
}

impl Listener {
    fn same_as(&self, other: &Listener) -> bool {
        match (self, other) {
            (Listener::Callback(a), Listener::Callback(b)) => a == b,
            (Listener::Native { id: a, .. }, Listener::Native { id: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listener::Callback(v) => f.debug_tuple("Callback").field(v).finish(),
            Listener::Native { id, .. } => f.debug_struct("Native").field("id", id).finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Property {
    name: String,
    kind: PropertyKind,
    value: Value,
    factory: Value,
    hidden: bool,
    read_only: bool,
    dynamic: bool,
    listeners: Vec<(ListenerMoment, Listener)>,
}

impl Property {
    /// Declare a property. The default is stored verbatim; declarations are
    /// trusted to be valid.
    pub fn new(name: &str, kind: PropertyKind, default: Value) -> Self {
        Property {
            name: name.to_ascii_lowercase(),
            kind,
            value: default.clone(),
            factory: default,
            hidden: false,
            read_only: false,
            dynamic: false,
            listeners: Vec::new(),
        }
    }

    pub fn string(name: &str, default: &str) -> Self {
        Self::new(name, PropertyKind::String, Value::from(default))
    }

    pub fn text(name: &str, default: &str) -> Self {
        Self::new(name, PropertyKind::Text, Value::from(default))
    }

    pub fn any(name: &str, default: Value) -> Self {
        Self::new(name, PropertyKind::Any, default)
    }

    pub fn on_off(name: &str, on: bool) -> Self {
        Self::new(name, PropertyKind::Bool, Value::from(on_off_str(on)))
    }

    pub fn radio(name: &str, choices: &str) -> Self {
        let radio = RadioValues::parse(choices);
        let default = Value::from(radio.default_value());
        Self::new(name, PropertyKind::Radio(radio), default)
    }

    pub fn double(name: &str, default: f64) -> Self {
        Self::new(name, PropertyKind::Double { range: None }, Value::Num(default))
    }

    /// Numeric scalar that also accepts the enumerated strings in `choices`.
    pub fn double_radio(name: &str, default: Value, choices: &str) -> Self {
        Self::new(
            name,
            PropertyKind::DoubleRadio {
                radio: RadioValues::parse(choices),
                range: None,
            },
            default,
        )
    }

    pub fn array(name: &str, default: Value) -> Self {
        Self::new(
            name,
            PropertyKind::Array(ArrayConstraints::default()),
            default,
        )
    }

    pub fn row_vector(name: &str, default: &[f64]) -> Self {
        Self::new(
            name,
            PropertyKind::Array(ArrayConstraints {
                shapes: vec![vec![1, default.len() as i64]],
                range: None,
                force_row: true,
            }),
            Value::row(default),
        )
    }

    pub fn color(name: &str, rgb: [f64; 3]) -> Self {
        Self::new(name, PropertyKind::Color { radio: None }, Value::row(&rgb))
    }

    /// Colour property that also accepts enumerated strings; the braced radio
    /// entry is the default unless `rgb` is given.
    pub fn color_radio(name: &str, rgb: Option<[f64; 3]>, choices: &str) -> Self {
        let radio = RadioValues::parse(choices);
        let default = match rgb {
            Some(rgb) => Value::row(&rgb),
            None => Value::from(radio.default_value()),
        };
        Self::new(name, PropertyKind::Color { radio: Some(radio) }, default)
    }

    pub fn handle(name: &str) -> Self {
        Self::new(name, PropertyKind::Handle, Value::Empty)
    }

    pub fn children() -> Self {
        Self::new("children", PropertyKind::Children, Value::Empty)
    }

    pub fn callback(name: &str) -> Self {
        Self::new(name, PropertyKind::Callback, Value::Empty)
    }

    pub fn callback_with(name: &str, default: Value) -> Self {
        Self::new(name, PropertyKind::Callback, default)
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn range(mut self, range: Range) -> Self {
        match &mut self.kind {
            PropertyKind::Double { range: r } | PropertyKind::DoubleRadio { range: r, .. } => {
                *r = Some(range)
            }
            PropertyKind::Array(c) => c.range = Some(range),
            _ => {}
        }
        self
    }

    /// Add an accepted array shape (`-1` = any extent).
    pub fn shape(mut self, dims: &[i64]) -> Self {
        if let PropertyKind::Array(c) = &mut self.kind {
            c.shapes.push(dims.to_vec());
        }
        self
    }

    /// Accept vectors of either orientation and store them as rows.
    pub fn force_row(mut self) -> Self {
        if let PropertyKind::Array(c) = &mut self.kind {
            c.force_row = true;
        }
        self
    }

    pub(crate) fn into_dynamic(mut self) -> Self {
        self.dynamic = true;
        self.read_only = false;
        self.hidden = false;
        self
    }

    /// Copy type and constraints under a new name, without listeners.
    pub fn clone_as(&self, name: &str) -> Self {
        Property {
            name: name.to_ascii_lowercase(),
            kind: self.kind.clone(),
            value: self.factory.clone(),
            factory: self.factory.clone(),
            hidden: false,
            read_only: false,
            dynamic: false,
            listeners: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    pub fn get(&self) -> &Value {
        &self.value
    }

    pub fn factory(&self) -> &Value {
        &self.factory
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Check `value` against the declared constraints and return its
    /// normalised form.
    pub fn validate(&self, value: &Value) -> Result<Value, Rejection> {
        match &self.kind {
            PropertyKind::Any => Ok(value.clone()),
            PropertyKind::String => match value {
                Value::String(s) => Ok(Value::String(s.clone())),
                Value::Empty => Ok(Value::String(String::new())),
                _ => Err(Rejection::new(format!(
                    "expected a string value, got {}",
                    value.class_name()
                ))),
            },
            PropertyKind::Text => validate_text(value),
            PropertyKind::Bool => validate_bool(value),
            PropertyKind::Radio(radio) => validate_radio(radio, value),
            PropertyKind::Double { range } => validate_double(value, range.as_ref()),
            PropertyKind::DoubleRadio { radio, range } => match value {
                Value::String(_) => validate_radio(radio, value),
                _ => validate_double(value, range.as_ref()).map_err(|mut r| {
                    r.candidates = radio.values().to_vec();
                    r
                }),
            },
            PropertyKind::Array(constraints) => validate_array(constraints, value),
            PropertyKind::Color { radio } => validate_color(radio.as_ref(), value),
            PropertyKind::Handle => match value {
                Value::Empty => Ok(Value::Empty),
                Value::Tensor(t) if t.is_empty() => Ok(Value::Empty),
                _ => match value.as_f64() {
                    Some(h) if h.is_nan() => Ok(Value::Empty),
                    Some(h) => Ok(Value::Num(h)),
                    None => Err(Rejection::new("expected a graphics handle")),
                },
            },
            PropertyKind::Children => match Handle::list_from_value(value) {
                Some(list) => Ok(Handle::list_to_value(&list)),
                None => Err(Rejection::new("expected a vector of graphics handles")),
            },
            PropertyKind::Callback => validate_callback(value),
        }
    }

    /// Validate and store; `Ok(false)` means the value was already current.
    pub fn set(&mut self, value: &Value) -> Result<bool, Rejection> {
        let normalized = self.validate(value)?;
        if normalized == self.value {
            return Ok(false);
        }
        self.value = normalized;
        Ok(true)
    }

    /// Store an already-normalised value without validation.
    pub(crate) fn store(&mut self, value: Value) -> bool {
        if value == self.value {
            return false;
        }
        self.value = value;
        true
    }

    pub fn add_listener(&mut self, moment: ListenerMoment, listener: Listener) {
        self.listeners.push((moment, listener));
    }

    /// Remove listeners registered for `moment`; `None` removes all of them.
    /// Registrations under other moments are left alone.
    pub fn remove_listener(&mut self, moment: ListenerMoment, listener: Option<&Listener>) {
        self.listeners.retain(|(m, l)| {
            let listener_hit = listener.map(|target| l.same_as(target)).unwrap_or(true);
            !(*m == moment && listener_hit)
        });
    }

    /// Drop every listener except persistent ones.
    pub fn clear_listeners(&mut self) {
        self.listeners
            .retain(|(m, _)| *m == ListenerMoment::Persistent);
    }

    /// Listeners to run for `moment`, in registration order. Post-set also
    /// runs persistent listeners.
    pub fn listeners(&self, moment: ListenerMoment) -> Vec<Listener> {
        self.listeners
            .iter()
            .filter(|(m, _)| {
                *m == moment
                    || (moment == ListenerMoment::PostSet && *m == ListenerMoment::Persistent)
            })
            .map(|(_, l)| l.clone())
            .collect()
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }
}

pub fn on_off_str(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

fn validate_text(value: &Value) -> Result<Value, Rejection> {
    match value {
        Value::String(s) => Ok(Value::String(s.clone())),
        Value::Empty => Ok(Value::String(String::new())),
        Value::Cell(items) if value.is_string_list() => Ok(Value::Cell(items.clone())),
        Value::Num(_) | Value::Bool(_) | Value::Tensor(_) => {
            let numbers = value.numbers().unwrap_or_default();
            let lines: Vec<String> = numbers
                .iter()
                .map(|n| crate::value::format_short_g(*n))
                .collect();
            if lines.len() == 1 {
                Ok(Value::String(lines[0].clone()))
            } else {
                Ok(Value::string_cell(&lines))
            }
        }
        _ => Err(Rejection::new(
            "expected a string, cell array of strings, or numeric value",
        )),
    }
}

fn validate_bool(value: &Value) -> Result<Value, Rejection> {
    let on_off = [String::from("on"), String::from("off")];
    match value {
        Value::Bool(b) => Ok(Value::from(on_off_str(*b))),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "on" => Ok(Value::from("on")),
            "off" => Ok(Value::from("off")),
            _ => Err(Rejection::with_candidates(
                format!("\"{s}\" is not a valid value; expected \"on\" or \"off\""),
                &on_off,
            )),
        },
        _ => match value.as_f64() {
            Some(n) if n == 0.0 || n == 1.0 => Ok(Value::from(on_off_str(n == 1.0))),
            _ => Err(Rejection::with_candidates(
                "expected \"on\" or \"off\"",
                &on_off,
            )),
        },
    }
}

fn validate_radio(radio: &RadioValues, value: &Value) -> Result<Value, Rejection> {
    match value {
        Value::String(s) => match radio.resolve(s) {
            Some(canonical) => Ok(Value::from(canonical)),
            None => Err(Rejection::with_candidates(
                format!("\"{s}\" is not a valid value; must be one of {radio}"),
                radio.values(),
            )),
        },
        _ => Err(Rejection::with_candidates(
            format!("expected a string, must be one of {radio}"),
            radio.values(),
        )),
    }
}

fn validate_double(value: &Value, range: Option<&Range>) -> Result<Value, Rejection> {
    let x = match value {
        Value::Num(_) | Value::Bool(_) | Value::Tensor(_) => value.as_f64(),
        _ => None,
    }
    .ok_or_else(|| Rejection::new("expected a real scalar value"))?;
    if let Some(range) = range {
        range.check(x).map_err(Rejection::new)?;
    }
    Ok(Value::Num(x))
}

fn validate_array(constraints: &ArrayConstraints, value: &Value) -> Result<Value, Rejection> {
    let tensor = match value {
        Value::Empty => return Ok(Value::Empty),
        Value::Num(_) | Value::Bool(_) | Value::Tensor(_) => value.to_tensor(),
        _ => None,
    }
    .ok_or_else(|| {
        Rejection::new(format!(
            "expected a numeric array, got {}",
            value.class_name()
        ))
    })?;
    if tensor.is_empty() {
        return Ok(Value::Empty);
    }
    let tensor = if constraints.force_row && tensor.is_vector() {
        Tensor::row(&tensor.data)
    } else {
        tensor
    };
    if !constraints.shape_ok(&tensor.shape) {
        return Err(Rejection::new(format!(
            "invalid dimensions {}, expected {}",
            tensor
                .shape
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join("x"),
            constraints.describe_shapes()
        )));
    }
    if let Some(range) = &constraints.range {
        for x in &tensor.data {
            range.check(*x).map_err(Rejection::new)?;
        }
    }
    Ok(Value::Tensor(tensor))
}

fn validate_color(radio: Option<&RadioValues>, value: &Value) -> Result<Value, Rejection> {
    let candidates: Vec<String> = radio.map(|r| r.values().to_vec()).unwrap_or_default();
    match value {
        Value::String(s) => {
            if let Some(canonical) = radio.and_then(|r| r.resolve(s)) {
                return Ok(Value::from(canonical));
            }
            match color::parse_color_name(s) {
                Some(rgb) => Ok(Value::row(&rgb)),
                None => Err(Rejection::with_candidates(
                    format!("invalid color specification \"{s}\""),
                    &candidates,
                )),
            }
        }
        _ => match value.numbers() {
            Some(rgb) if color::valid_rgb(&rgb) => Ok(Value::row(&rgb)),
            _ => Err(Rejection::with_candidates(
                "invalid color specification: expected a 1x3 RGB triple with values in [0, 1]",
                &candidates,
            )),
        },
    }
}

fn validate_callback(value: &Value) -> Result<Value, Rejection> {
    match value {
        Value::Empty | Value::FunctionHandle(_) | Value::String(_) => Ok(value.clone()),
        Value::Tensor(t) if t.is_empty() => Ok(Value::Empty),
        Value::Cell(items) if matches!(items.first(), Some(Value::FunctionHandle(_))) => {
            Ok(value.clone())
        }
        _ => Err(Rejection::new(
            "expected a function handle, a string, or a cell array starting with a function handle",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_double_rejects_negative() {
        let mut p = Property::double("linewidth", 0.5).range(Range::greater_than(0.0));
        let err = p.set(&Value::Num(-1.0)).unwrap_err();
        assert_eq!(err.reason, "must be greater than 0");
        assert_eq!(p.get(), &Value::Num(0.5));
    }

    #[test]
    fn unchanged_value_reports_no_change() {
        let mut p = Property::double("linewidth", 0.5);
        assert_eq!(p.set(&Value::Num(10.0)), Ok(true));
        assert_eq!(p.set(&Value::Num(10.0)), Ok(false));
    }

    #[test]
    fn radio_prefix_and_candidates() {
        let mut p = Property::radio("horizontalalignment", "{left}|center|right");
        assert_eq!(p.set(&Value::from("ce")), Ok(true));
        assert_eq!(p.get(), &Value::from("center"));
        let err = p.set(&Value::from("xyz")).unwrap_err();
        assert_eq!(err.candidates, vec!["left", "center", "right"]);
        assert_eq!(p.get(), &Value::from("center"));
    }

    #[test]
    fn double_radio_accepts_both_forms() {
        let p = Property::double_radio("facealpha", Value::Num(1.0), "flat|interp")
            .range(Range::between(0.0, 1.0));
        assert_eq!(p.validate(&Value::from("int")), Ok(Value::from("interp")));
        assert_eq!(p.validate(&Value::Num(0.25)), Ok(Value::Num(0.25)));
        let err = p.validate(&Value::Num(2.0)).unwrap_err();
        assert_eq!(err.reason, "must be less than or equal to 1");
    }

    #[test]
    fn row_vector_accepts_columns_and_checks_length() {
        let p = Property::row_vector("xlim", &[0.0, 1.0]);
        assert_eq!(
            p.validate(&Value::Tensor(Tensor::column(&[2.0, 3.0]))),
            Ok(Value::row(&[2.0, 3.0]))
        );
        assert!(p.validate(&Value::row(&[1.0, 2.0, 3.0])).is_err());
        assert_eq!(p.validate(&Value::Empty), Ok(Value::Empty));
    }

    #[test]
    fn color_accepts_names_triples_and_radio() {
        let p = Property::color_radio("facecolor", Some([0.0, 0.0, 0.0]), "none|flat|interp");
        assert_eq!(p.validate(&Value::from("r")), Ok(Value::row(&[1.0, 0.0, 0.0])));
        assert_eq!(p.validate(&Value::from("no")), Ok(Value::from("none")));
        assert!(p.validate(&Value::row(&[0.0, 2.0, 0.0])).is_err());
    }

    #[test]
    fn callback_forms() {
        let p = Property::callback("buttondownfcn");
        let cell = Value::Cell(vec![Value::FunctionHandle("f".into()), Value::Num(1.0)]);
        assert!(p.validate(&cell).is_ok());
        assert!(p.validate(&Value::from("disp(1)")).is_ok());
        assert!(p.validate(&Value::Num(3.0)).is_err());
        assert!(p
            .validate(&Value::Cell(vec![Value::Num(1.0)]))
            .is_err());
    }

    #[test]
    fn bool_property_normalises_logicals() {
        let p = Property::on_off("visible", true);
        assert_eq!(p.validate(&Value::Bool(false)), Ok(Value::from("off")));
        assert_eq!(p.validate(&Value::from("ON")), Ok(Value::from("on")));
        assert!(p.validate(&Value::from("maybe")).is_err());
    }

    #[test]
    fn persistent_listeners_survive_clear() {
        let mut p = Property::double("linewidth", 0.5);
        p.add_listener(
            ListenerMoment::PostSet,
            Listener::Callback(Value::FunctionHandle("a".into())),
        );
        p.add_listener(
            ListenerMoment::Persistent,
            Listener::Callback(Value::FunctionHandle("b".into())),
        );
        assert_eq!(p.listeners(ListenerMoment::PostSet).len(), 2);
        p.clear_listeners();
        let left = p.listeners(ListenerMoment::PostSet);
        assert_eq!(left.len(), 1);
        assert!(matches!(&left[0], Listener::Callback(Value::FunctionHandle(n)) if n == "b"));
    }

    #[test]
    fn removing_listeners_only_touches_the_requested_moment() {
        let mut p = Property::double("linewidth", 0.5);
        let cb = Listener::Callback(Value::FunctionHandle("cb".into()));
        p.add_listener(ListenerMoment::PostSet, cb.clone());
        p.add_listener(ListenerMoment::Persistent, cb.clone());

        p.remove_listener(ListenerMoment::Persistent, Some(&cb));
        assert_eq!(p.listeners(ListenerMoment::PostSet).len(), 1);
        assert!(p.listeners(ListenerMoment::Persistent).is_empty());

        p.add_listener(ListenerMoment::Persistent, cb.clone());
        p.remove_listener(ListenerMoment::PostSet, None);
        let left = p.listeners(ListenerMoment::Persistent);
        assert_eq!(left.len(), 1);
        assert_eq!(p.listeners(ListenerMoment::PostSet).len(), 1);
    }
}
