//! The engine context: one instance owns the scene graph, the event queue and
//! the collaborators, and implements every graphics operation.
//!
//! All mutation happens on the thread that owns the engine. Other threads
//! interact only through [`EventPoster`].

mod axes;
mod callbacks;
mod figure;
mod hooks;
mod lifecycle;
mod patch;
mod text;

pub use axes::ZoomMode;

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::config::GraphicsConfig;
use crate::defaults::{DefaultName, ValueKeyword};
use crate::error::{GraphicsError, GraphicsResult};
use crate::events::{BusyAction, EventPoster, EventQueue, GraphicsEvent};
use crate::guard::{CallbackStack, RecursionGuards};
use crate::handle::Handle;
use crate::kinds::ObjectKind;
use crate::manager::HandleManager;
use crate::object::GraphicsObject;
use crate::property::{
    Listener, ListenerMoment, Property, PropertyKind, PropertySet, RadioValues, Rejection,
};
use crate::props::factory_properties;
use crate::toolkit::{FallbackMeasurer, Interpreter, NullToolkit, TextMeasurer, Toolkit};
use crate::transform::GraphicsTransform;
use crate::value::{StructValue, Value};

/// Who is writing a property. Derived writes come from the engine's own
/// recomputation: they skip the read-only check and the kind hooks, so a
/// computed limit never flips its mode to manual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    User,
    Derived,
}

pub type ErrorSink = Rc<dyn Fn(&GraphicsError)>;

fn default_error_sink(err: &GraphicsError) {
    log::error!(target: "runmat_graphics::callback", "{err}");
}

pub struct GraphicsEngine {
    manager: HandleManager,
    factory: HashMap<ObjectKind, PropertySet>,
    queue: EventQueue,
    toolkit: Rc<dyn Toolkit>,
    interpreter: Option<Rc<dyn Interpreter>>,
    measurer: Rc<dyn TextMeasurer>,
    config: GraphicsConfig,
    error_sink: ErrorSink,
    interrupt: Arc<AtomicBool>,
    guards: RecursionGuards,
    callbacks: CallbackStack,
    /// Deleted objects whose callback is still on the stack.
    pending_erase: Vec<Handle>,
    /// Set by the `integerhandle` hook so callers holding the old handle can
    /// follow the figure.
    pending_renumber: Option<(Handle, Handle)>,
    next_listener_id: u64,
}

impl GraphicsEngine {
    pub fn new(config: GraphicsConfig) -> Self {
        let factory = ObjectKind::ALL
            .into_iter()
            .map(|k| (k, factory_properties(k)))
            .collect();
        let mut engine = GraphicsEngine {
            manager: HandleManager::new(config.handles.seed),
            factory,
            queue: EventQueue::new(),
            toolkit: Rc::new(NullToolkit),
            interpreter: None,
            measurer: Rc::new(FallbackMeasurer::new(&config.text)),
            config,
            error_sink: Rc::new(default_error_sink),
            interrupt: Arc::new(AtomicBool::new(false)),
            guards: RecursionGuards::default(),
            callbacks: CallbackStack::default(),
            pending_erase: Vec::new(),
            pending_renumber: None,
            next_listener_id: 1,
        };
        engine.sync_display_properties();
        engine
    }

    pub fn with_toolkit(mut self, toolkit: Rc<dyn Toolkit>) -> Self {
        self.toolkit = toolkit;
        self.sync_display_properties();
        self
    }

    pub fn with_interpreter(mut self, interpreter: Rc<dyn Interpreter>) -> Self {
        self.interpreter = Some(interpreter);
        self
    }

    pub fn with_text_measurer(mut self, measurer: Rc<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    /// Where callback and toolkit failures are reported.
    pub fn set_error_sink<F>(&mut self, sink: F)
    where
        F: Fn(&GraphicsError) + 'static,
    {
        self.error_sink = Rc::new(sink);
    }

    pub fn event_poster(&self) -> EventPoster {
        self.queue.poster()
    }

    pub fn event_queue(&self) -> &EventQueue {
        &self.queue
    }

    /// Flag checked by `waitfor`; set it from any thread to abort the wait.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupt.clone()
    }

    pub fn config(&self) -> &GraphicsConfig {
        &self.config
    }

    pub fn object(&self, h: Handle) -> Option<&GraphicsObject> {
        self.manager.get(h)
    }

    pub fn is_handle(&self, h: Handle) -> bool {
        self.manager.contains(h)
    }

    pub fn transform(&self, axes: Handle) -> Option<&GraphicsTransform> {
        self.manager
            .get(axes)
            .and_then(GraphicsObject::axes_state)
            .map(|s| &s.transform)
    }

    pub(crate) fn object_or_err(&self, h: Handle) -> GraphicsResult<&GraphicsObject> {
        self.manager
            .get(h)
            .ok_or_else(|| GraphicsError::invalid_handle(h.value()))
    }

    pub(crate) fn report(&self, err: GraphicsError) {
        (self.error_sink)(&err);
    }

    pub(crate) fn screen_dpi(&self) -> f64 {
        self.toolkit
            .screen_dpi()
            .filter(|d| *d > 0.0)
            .unwrap_or(self.config.display.dpi)
    }

    pub(crate) fn screen_size(&self) -> [f64; 2] {
        self.toolkit
            .screen_pixel_size()
            .map(|(w, h)| [w, h])
            .unwrap_or([
                self.config.display.screen_width,
                self.config.display.screen_height,
            ])
    }

    fn sync_display_properties(&mut self) {
        let dpi = self.screen_dpi();
        let [w, h] = self.screen_size();
        if let Some(root) = self.manager.get_mut(Handle::ROOT) {
            for (name, value) in [
                ("screenpixelsperinch", Value::Num(dpi)),
                ("screensize", Value::row(&[1.0, 1.0, w, h])),
                ("monitorpositions", Value::row(&[1.0, 1.0, w, h])),
            ] {
                if let Some(p) = root.props.get_mut(name) {
                    p.store(value);
                }
            }
        }
    }

    // ----- property access -------------------------------------------------

    /// Read a property. `name` may be abbreviated; `default<kind><prop>` and
    /// `factory<kind><prop>` read the default lists.
    pub fn get(&self, h: Handle, name: &str) -> GraphicsResult<Value> {
        let obj = self.object_or_err(h)?;
        if let Some(default_name) = DefaultName::parse(name) {
            return self.get_default_name(h, &default_name);
        }
        match name.to_ascii_lowercase().as_str() {
            "default" => return Ok(Value::Struct(obj.defaults.to_struct())),
            "factory" => return Ok(Value::Struct(self.factory_struct())),
            _ => {}
        }
        let key = obj.props.resolve(name)?;
        Ok(match key.as_str() {
            "children" => Handle::list_to_value(&self.visible_children(h)),
            "callbackobject" if obj.kind() == ObjectKind::Root => self
                .callbacks
                .current()
                .map(Value::from)
                .unwrap_or(Value::Empty),
            _ => obj.value(&key),
        })
    }

    /// Every property of `h` as a struct; hidden ones only on request.
    pub fn get_all(&self, h: Handle, include_hidden: bool) -> GraphicsResult<StructValue> {
        let obj = self.object_or_err(h)?;
        let mut all = obj.props.get_all(include_hidden);
        all.insert("children", Handle::list_to_value(&self.visible_children(h)));
        if obj.kind() == ObjectKind::Root {
            all.insert(
                "callbackobject",
                self.callbacks
                    .current()
                    .map(Value::from)
                    .unwrap_or(Value::Empty),
            );
        }
        Ok(all)
    }

    /// Write a property through the full pipeline: name resolution, default
    /// keywords, validation, listeners and derived-state hooks.
    pub fn set(&mut self, h: Handle, name: &str, value: &Value) -> GraphicsResult<()> {
        let obj = self.object_or_err(h)?;
        if let Some(default_name) = DefaultName::parse(name) {
            return self.set_default_name(h, default_name, value);
        }
        let key = obj.props.resolve(name)?;
        let kind = obj.kind();
        let value = match ValueKeyword::from_value(value) {
            Some(ValueKeyword::Default) => self.default_value(h, kind, &key),
            Some(ValueKeyword::Factory) => self.factory_value(kind, &key),
            None => unescape_keyword(value),
        };
        match key.as_str() {
            "parent" if kind != ObjectKind::Root => self.reparent(h, &value),
            "children" => self.reorder_children(h, &value),
            _ => self.set_property(h, &key, &value, Origin::User).map(|_| ()),
        }
    }

    /// Apply name/value pairs in order and return the object's handle
    /// afterwards, which differs from `h` when `integerhandle` renumbered a
    /// figure along the way.
    pub fn set_pairs(&mut self, h: Handle, pairs: &[(String, Value)]) -> GraphicsResult<Handle> {
        let mut h = h;
        for (name, value) in pairs {
            self.set(h, name, value)?;
            h = self.follow_renumber(h);
        }
        Ok(h)
    }

    /// Validate, store and propagate one canonical property. Returns whether
    /// the stored value changed.
    pub(crate) fn set_property(
        &mut self,
        h: Handle,
        key: &str,
        value: &Value,
        origin: Origin,
    ) -> GraphicsResult<bool> {
        let obj = self.object_or_err(h)?;
        let object = obj.kind().name();
        let prop = obj.props.get(key).ok_or_else(|| obj.props.unknown(key))?;
        if origin == Origin::User && prop.is_read_only() {
            return Err(GraphicsError::ReadOnly {
                object: object.to_string(),
                property: key.to_string(),
            });
        }
        let normalized = prop
            .validate(value)
            .map_err(|r| invalid_value(object, key, value, r))?;
        if matches!(prop.kind(), PropertyKind::Handle) {
            self.check_handle_property(h, key, &normalized)?;
        }
        if &normalized == prop.get() {
            return Ok(false);
        }
        let old = prop.get().clone();
        let pre = prop.listeners(ListenerMoment::PreSet);
        let post = prop.listeners(ListenerMoment::PostSet);

        self.run_listeners(h, &pre, &normalized);
        let Some(prop) = self
            .manager
            .get_mut(h)
            .and_then(|o| o.props.get_mut(key))
        else {
            return Ok(false);
        };
        prop.store(normalized.clone());
        self.mark_modified(h);
        self.notify_toolkit(h, key);
        if origin == Origin::User {
            self.after_set(h, key, &old);
        }
        self.run_listeners(h, &post, &normalized);
        Ok(true)
    }

    /// Engine-computed write. Failures indicate an internal inconsistency
    /// and are logged rather than surfaced.
    pub(crate) fn store_derived(&mut self, h: Handle, key: &str, value: Value) {
        if let Err(err) = self.set_property(h, key, &value, Origin::Derived) {
            log::debug!(target: "runmat_graphics", "derived update of {key} on {h} failed: {err}");
        }
    }

    fn check_handle_property(&self, h: Handle, key: &str, value: &Value) -> GraphicsResult<()> {
        let Some(target) = Handle::from_value(value) else {
            return Ok(());
        };
        let object = self.object_or_err(h)?.kind().name();
        let fail = |reason: String| GraphicsError::InvalidValue {
            object: object.to_string(),
            property: key.to_string(),
            value: value.to_string(),
            reason,
            candidates: Vec::new(),
        };
        let Some(target_kind) = self.manager.kind_of(target) else {
            return Err(fail("invalid graphics handle".to_string()));
        };
        let required = match key {
            "uicontextmenu" => Some(ObjectKind::UiContextMenu),
            "currentaxes" => Some(ObjectKind::Axes),
            "currentfigure" => Some(ObjectKind::Figure),
            "title" | "xlabel" | "ylabel" | "zlabel" => Some(ObjectKind::Text),
            _ => None,
        };
        if let Some(required) = required {
            if target_kind != required {
                return Err(fail(format!("expected a handle to a {required} object")));
            }
        }
        if key == "currentaxes" && self.manager.get(target).and_then(|o| o.parent()) != Some(h) {
            return Err(fail("axes is not a child of this figure".to_string()));
        }
        Ok(())
    }

    fn run_listeners(&mut self, h: Handle, listeners: &[Listener], value: &Value) {
        for listener in listeners {
            match listener {
                Listener::Callback(callback) => {
                    if self.callbacks.in_interpreter() {
                        self.execute_callback(h, callback, Value::Empty, "listener", true);
                    } else {
                        self.queue.post(GraphicsEvent::Callback {
                            handle: h,
                            name: None,
                            callback: Some(callback.clone()),
                            data: Value::Empty,
                            busy: BusyAction::Queue,
                        });
                    }
                }
                Listener::Native { action, .. } => action(self, h, value),
            }
        }
    }

    pub(crate) fn mark_modified(&mut self, h: Handle) {
        let mut current = Some(h);
        while let Some(c) = current.filter(|c| !c.is_root()) {
            let Some(obj) = self.manager.get_mut(c) else {
                break;
            };
            obj.modified = true;
            current = obj.parent();
        }
    }

    pub(crate) fn notify_toolkit(&self, h: Handle, key: &str) {
        if let Err(err) = self.toolkit.notify_property_changed(h, key) {
            self.toolkit_warning(err);
        }
    }

    pub(crate) fn toolkit_warning(&self, err: anyhow::Error) {
        log::warn!(target: "runmat_graphics", "{} toolkit: {err:#}", self.toolkit.name());
    }

    // ----- defaults ----------------------------------------------------------

    fn factory_struct(&self) -> StructValue {
        let mut out = StructValue::new();
        for (kind, set) in &self.factory {
            for prop in set.properties() {
                if prop.is_read_only() || prop.is_hidden() {
                    continue;
                }
                out.insert(
                    format!("factory{}{}", kind.name(), prop.name()),
                    prop.factory().clone(),
                );
            }
        }
        out
    }

    pub(crate) fn factory_property(&self, kind: ObjectKind, key: &str) -> Option<&Property> {
        self.factory.get(&kind).and_then(|set| set.get(key))
    }

    pub(crate) fn factory_value(&self, kind: ObjectKind, key: &str) -> Value {
        self.factory_property(kind, key)
            .map(|p| p.factory().clone())
            .unwrap_or_default()
    }

    /// Default for `kind.key` as seen from `h`: the first entry found walking
    /// from `h` up to the root, else the factory value.
    pub(crate) fn default_value(&self, h: Handle, kind: ObjectKind, key: &str) -> Value {
        let mut current = Some(h);
        while let Some(c) = current {
            let Some(obj) = self.manager.get(c) else {
                break;
            };
            if let Some(v) = obj.defaults.lookup(kind, key) {
                return v.clone();
            }
            current = obj.parent();
        }
        self.factory_value(kind, key)
    }

    fn resolve_default_property(
        &self,
        kind: ObjectKind,
        property: &str,
        prefix: &str,
    ) -> GraphicsResult<String> {
        self.factory
            .get(&kind)
            .and_then(|set| set.resolve(property).ok())
            .ok_or_else(|| GraphicsError::InvalidDefault(format!("{prefix}{kind}{property}")))
    }

    fn get_default_name(&self, h: Handle, name: &DefaultName) -> GraphicsResult<Value> {
        match name {
            DefaultName::Default { kind, property } => {
                let key = self.resolve_default_property(*kind, property, "default")?;
                Ok(self.default_value(h, *kind, &key))
            }
            DefaultName::Factory { kind, property } => {
                let key = self.resolve_default_property(*kind, property, "factory")?;
                Ok(self.factory_value(*kind, &key))
            }
        }
    }

    fn set_default_name(
        &mut self,
        h: Handle,
        name: DefaultName,
        value: &Value,
    ) -> GraphicsResult<()> {
        let (kind, property) = match name {
            DefaultName::Factory { kind, property } => {
                return Err(GraphicsError::ReadOnly {
                    object: self.object_or_err(h)?.kind().name().to_string(),
                    property: format!("factory{kind}{property}"),
                });
            }
            DefaultName::Default { kind, property } => (kind, property),
        };
        let key = self.resolve_default_property(kind, &property, "default")?;
        let is_remove = matches!(value, Value::String(s) if s.eq_ignore_ascii_case("remove"));
        let stored = if is_remove {
            value.clone()
        } else {
            let prop = self
                .factory_property(kind, &key)
                .ok_or_else(|| GraphicsError::InvalidDefault(format!("default{kind}{key}")))?;
            prop.validate(value)
                .map_err(|r| invalid_value(kind.name(), &key, value, r))?
        };
        if let Some(obj) = self.manager.get_mut(h) {
            obj.defaults.set(kind, &key, stored);
        }
        Ok(())
    }

    // ----- dynamic properties and listeners ----------------------------------

    /// Add a runtime property. `type_name` is one of `string`, `any`,
    /// `radio`, `double`, `handle`, `boolean`, `data`, `color`, or
    /// `<kind><property>` to clone an existing property's constraints.
    pub fn add_property(
        &mut self,
        h: Handle,
        name: &str,
        type_name: &str,
        args: &[Value],
    ) -> GraphicsResult<()> {
        let obj = self.object_or_err(h)?;
        let lowered = name.to_ascii_lowercase();
        if lowered.is_empty() || !lowered.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(GraphicsError::usage(
                "addproperty",
                format!("invalid property name \"{name}\""),
            ));
        }
        if obj.props.contains(&lowered) {
            return Err(GraphicsError::PropertyExists { name: lowered });
        }
        let usage = |message: String| GraphicsError::usage("addproperty", message);
        let text_arg = |i: usize| args.get(i).and_then(Value::as_str).map(str::to_string);
        let (property, initial) = match type_name.to_ascii_lowercase().as_str() {
            "string" => (Property::string(&lowered, ""), args.first().cloned()),
            "any" => (Property::any(&lowered, Value::Empty), args.first().cloned()),
            "radio" => {
                let spec = text_arg(0)
                    .ok_or_else(|| usage("a radio property needs a value list".to_string()))?;
                if RadioValues::parse(&spec).values().is_empty() {
                    return Err(usage(format!("invalid radio value list \"{spec}\"")));
                }
                (Property::radio(&lowered, &spec), None)
            }
            "double" => (Property::double(&lowered, 0.0), args.first().cloned()),
            "handle" => (Property::handle(&lowered), args.first().cloned()),
            "boolean" | "bool" => (Property::on_off(&lowered, false), args.first().cloned()),
            "data" => (Property::array(&lowered, Value::Empty), args.first().cloned()),
            "color" => {
                let property = match text_arg(1) {
                    Some(spec) => Property::color_radio(&lowered, Some([0.0, 0.0, 0.0]), &spec),
                    None => Property::color(&lowered, [0.0, 0.0, 0.0]),
                };
                (property, args.first().cloned())
            }
            other => {
                let (kind, source) = ObjectKind::split_prefixed(other)
                    .ok_or_else(|| usage(format!("invalid property type \"{type_name}\"")))?;
                let template = self
                    .factory
                    .get(&kind)
                    .and_then(|set| set.get(&source))
                    .ok_or_else(|| usage(format!("invalid property type \"{type_name}\"")))?;
                (template.clone_as(&lowered), args.first().cloned())
            }
        };
        let mut property = property;
        if let Some(initial) = initial {
            let normalized = property
                .validate(&initial)
                .map_err(|r| invalid_value(obj.kind().name(), &lowered, &initial, r))?;
            property = Property::new(&lowered, property.kind().clone(), normalized);
        }
        if let Some(obj) = self.manager.get_mut(h) {
            obj.props.add_dynamic(property)?;
        }
        Ok(())
    }

    /// Register `callback` to run after `name` changes on `h`. Persistent
    /// listeners survive `reset`.
    pub fn add_listener(
        &mut self,
        h: Handle,
        name: &str,
        callback: Value,
        persistent: bool,
    ) -> GraphicsResult<()> {
        let moment = if persistent {
            ListenerMoment::Persistent
        } else {
            ListenerMoment::PostSet
        };
        self.attach_listener(h, name, moment, Listener::Callback(callback))
            .map(|_| ())
    }

    /// Remove listeners of `name` (only the one matching `callback` when
    /// given). `persistent` selects the persistent registrations instead of
    /// the ordinary post-set ones; the other kind is kept.
    pub fn delete_listener(
        &mut self,
        h: Handle,
        name: &str,
        callback: Option<&Value>,
        persistent: bool,
    ) -> GraphicsResult<()> {
        let key = self.object_or_err(h)?.props.resolve(name)?;
        let moment = if persistent {
            ListenerMoment::Persistent
        } else {
            ListenerMoment::PostSet
        };
        let target = callback.cloned().map(Listener::Callback);
        if let Some(prop) = self.manager.get_mut(h).and_then(|o| o.props.get_mut(&key)) {
            prop.remove_listener(moment, target.as_ref());
        }
        Ok(())
    }

    pub(crate) fn attach_listener(
        &mut self,
        h: Handle,
        name: &str,
        moment: ListenerMoment,
        listener: Listener,
    ) -> GraphicsResult<String> {
        let key = self.object_or_err(h)?.props.resolve(name)?;
        if let Some(prop) = self.manager.get_mut(h).and_then(|o| o.props.get_mut(&key)) {
            prop.add_listener(moment, listener);
        }
        Ok(key)
    }

    pub(crate) fn next_listener_id(&mut self) -> u64 {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        id
    }

    // ----- queries -----------------------------------------------------------

    pub(crate) fn is_handle_visible(&self, obj: &GraphicsObject) -> bool {
        let shown = match obj.str_value("handlevisibility").as_str() {
            "on" => true,
            "callback" => self.callbacks.is_executing(),
            _ => false,
        };
        shown
            || self
                .manager
                .root()
                .map(|r| r.is_on("showhiddenhandles"))
                .unwrap_or(false)
    }

    /// Children of `h` subject to handle visibility, newest first.
    pub fn visible_children(&self, h: Handle) -> Vec<Handle> {
        let Some(obj) = self.manager.get(h) else {
            return Vec::new();
        };
        obj.children()
            .iter()
            .copied()
            .filter(|c| {
                self.manager
                    .get(*c)
                    .map(|o| self.is_handle_visible(o))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Every live handle except the root, depth first from the root.
    pub fn handles(&self, include_hidden: bool) -> Vec<Handle> {
        let mut out = Vec::new();
        let mut stack: Vec<Handle> = vec![Handle::ROOT];
        while let Some(h) = stack.pop() {
            let Some(obj) = self.manager.get(h) else {
                continue;
            };
            if !h.is_root() {
                if !include_hidden && !self.is_handle_visible(obj) {
                    continue;
                }
                out.push(h);
            }
            stack.extend(obj.children().iter().rev().copied());
        }
        out
    }

    /// Figures, most recently shown first.
    pub fn figure_handles(&self) -> Vec<Handle> {
        self.manager.figure_handles()
    }

    pub fn current_figure(&self) -> Option<Handle> {
        self.manager
            .root()
            .and_then(|r| r.handle_value("currentfigure"))
            .filter(|h| self.manager.contains(*h))
    }

    pub fn current_axes(&self) -> Option<Handle> {
        self.current_figure()
            .and_then(|f| self.manager.get(f))
            .and_then(|f| f.handle_value("currentaxes"))
    }

    /// Object whose callback is executing, innermost first.
    pub fn callback_object(&self) -> Option<Handle> {
        self.callbacks.current()
    }

    pub(crate) fn ancestor_of_kind(&self, h: Handle, kind: ObjectKind) -> Option<Handle> {
        let mut current = self.manager.get(h).and_then(|o| o.parent());
        while let Some(c) = current {
            let obj = self.manager.get(c)?;
            if obj.kind() == kind {
                return Some(c);
            }
            current = obj.parent();
        }
        None
    }

    pub(crate) fn ancestor_figure(&self, h: Handle) -> Option<Handle> {
        if self.manager.kind_of(h) == Some(ObjectKind::Figure) {
            return Some(h);
        }
        self.ancestor_of_kind(h, ObjectKind::Figure)
    }

    /// Store a value directly, outside the listener/hook pipeline. Used while
    /// wiring up new objects.
    pub(crate) fn store_raw(&mut self, h: Handle, key: &str, value: Value) {
        if let Some(prop) = self.manager.get_mut(h).and_then(|o| o.props.get_mut(key)) {
            prop.store(value);
        }
    }
}

fn invalid_value(object: &str, key: &str, value: &Value, rejection: Rejection) -> GraphicsError {
    GraphicsError::InvalidValue {
        object: object.to_string(),
        property: key.to_string(),
        value: value.to_string(),
        reason: rejection.reason,
        candidates: rejection.candidates,
    }
}

/// `"\default"` and `"\factory"` are the literal strings.
fn unescape_keyword(value: &Value) -> Value {
    match value {
        Value::String(s) => match s.strip_prefix('\\') {
            Some(rest) if ValueKeyword::from_value(&Value::from(rest)).is_some() => {
                Value::from(rest)
            }
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_escape() {
        assert_eq!(unescape_keyword(&Value::from("\\default")), Value::from("default"));
        assert_eq!(unescape_keyword(&Value::from("\\n")), Value::from("\\n"));
    }

    #[test]
    fn root_reports_display_fallbacks() {
        let engine = GraphicsEngine::new(GraphicsConfig::default());
        assert_eq!(
            engine.get(Handle::ROOT, "screenpixelsperinch").unwrap(),
            Value::Num(96.0)
        );
        assert_eq!(
            engine.get(Handle::ROOT, "screensize").unwrap(),
            Value::row(&[1.0, 1.0, 1920.0, 1080.0])
        );
    }

    #[test]
    fn read_only_properties_refuse_user_writes() {
        let mut engine = GraphicsEngine::new(GraphicsConfig::default());
        let err = engine
            .set(Handle::ROOT, "screensize", &Value::row(&[1.0, 1.0, 2.0, 2.0]))
            .unwrap_err();
        assert!(matches!(err, GraphicsError::ReadOnly { .. }));
    }
}
