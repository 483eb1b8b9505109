//! Object creation, deletion, reparenting and reset.

use crate::error::{GraphicsError, GraphicsResult};
use crate::events::{BusyAction, GraphicsEvent};
use crate::handle::Handle;
use crate::kinds::ObjectKind;
use crate::object::{GraphicsObject, ObjectState};
use crate::property::{ListenerMoment, PropertyKind};
use crate::value::Value;

use super::{GraphicsEngine, Origin};

/// Automatic axes labels: tag, horizontal and vertical alignment, rotation.
pub(super) const LABELS: [(&str, &str, &str, f64); 4] = [
    ("xlabel", "center", "top", 0.0),
    ("ylabel", "center", "bottom", 90.0),
    ("zlabel", "center", "bottom", 90.0),
    ("title", "center", "bottom", 0.0),
];

/// Properties `reset` never touches.
const RESET_SKIP: [&str; 4] = ["parent", "children", "uicontextmenu", "type"];

impl GraphicsEngine {
    /// Create an object of `kind` under `parent`, apply inherited defaults
    /// and then `props` in order. A failing property leaves no object
    /// behind.
    pub fn create(
        &mut self,
        kind: ObjectKind,
        parent: Handle,
        props: &[(&str, Value)],
    ) -> GraphicsResult<Handle> {
        self.create_object(kind, parent, props, None)
    }

    /// Create a figure, optionally with a requested integer number. An
    /// existing figure with that number becomes current instead.
    pub fn create_figure(
        &mut self,
        number: Option<f64>,
        props: &[(&str, Value)],
    ) -> GraphicsResult<Handle> {
        let forced = match number {
            None => None,
            Some(n) if n >= 1.0 && n.fract() == 0.0 => {
                let h = Handle::new(n);
                match self.manager.kind_of(h) {
                    Some(ObjectKind::Figure) => {
                        self.make_current_figure(h);
                        for (name, value) in props {
                            self.set(h, name, value)?;
                        }
                        return Ok(h);
                    }
                    Some(_) => {
                        return Err(GraphicsError::usage(
                            "figure",
                            format!("{n} is already in use by a non-figure object"),
                        ))
                    }
                    None => Some(h),
                }
            }
            Some(n) => {
                return Err(GraphicsError::usage(
                    "figure",
                    format!("figure number must be a positive integer, got {n}"),
                ))
            }
        };
        self.create_object(ObjectKind::Figure, Handle::ROOT, props, forced)
    }

    fn create_object(
        &mut self,
        kind: ObjectKind,
        parent: Handle,
        props: &[(&str, Value)],
        forced: Option<Handle>,
    ) -> GraphicsResult<Handle> {
        if kind == ObjectKind::Root {
            return Err(GraphicsError::structural("cannot create another root object"));
        }
        let parent_kind = self
            .manager
            .kind_of(parent)
            .ok_or_else(|| GraphicsError::invalid_handle(parent.value()))?;
        if !kind.accepts_parent(parent_kind) {
            return Err(GraphicsError::structural(format!(
                "{kind} object cannot be a child of a {parent_kind} object"
            )));
        }
        let mut h = forced.unwrap_or_else(|| self.manager.allocate(kind.is_figure()));
        self.manager.insert(GraphicsObject::new(h, kind, Some(parent)));
        self.manager.adopt(parent, h);
        log::debug!(target: "runmat_graphics", "created {kind} {h} under {parent}");

        if kind == ObjectKind::Axes {
            for (tag, ..) in LABELS {
                self.create_label(h, tag);
            }
        }

        for (name, value) in self.inherited_defaults(parent, kind) {
            if let Err(err) = self.set(h, &name, &value) {
                log::warn!(target: "runmat_graphics", "default {kind}{name} not applied: {err}");
            }
            h = self.follow_renumber(h);
        }
        self.initialize_state(h);

        for (name, value) in props {
            if let Err(err) = self.set(h, name, value) {
                self.discard(h);
                return Err(err);
            }
            h = self.follow_renumber(h);
        }

        if kind.is_figure() {
            self.make_current_figure(h);
        }
        if let Err(err) = self.toolkit.initialize(h) {
            self.toolkit_warning(err);
        }
        let has_createfcn = self
            .manager
            .get(h)
            .map(|o| !o.value("createfcn").is_empty())
            .unwrap_or(false);
        if has_createfcn {
            self.queue.post(GraphicsEvent::Callback {
                handle: h,
                name: Some("createfcn".to_string()),
                callback: None,
                data: Value::Empty,
                busy: BusyAction::Interrupt,
            });
        }
        Ok(h)
    }

    /// Remove a half-built object without running its callbacks.
    fn discard(&mut self, h: Handle) {
        let Some(obj) = self.manager.get(h) else {
            return;
        };
        let children = obj.children().to_vec();
        let parent = obj.parent();
        for child in children {
            self.discard(child);
        }
        if let Some(p) = parent {
            self.manager.remove_child(p, h);
        }
        self.manager.remove(h);
    }

    pub(super) fn make_current_figure(&mut self, figure: Handle) {
        self.manager.push_figure(figure);
        self.store_derived(Handle::ROOT, "currentfigure", Value::from(figure));
    }

    pub(super) fn follow_renumber(&mut self, h: Handle) -> Handle {
        match self.pending_renumber.take() {
            Some((old, new)) if old == h => new,
            other => {
                self.pending_renumber = other;
                h
            }
        }
    }

    /// Default entries for `kind` from the root down to `start`, nearer
    /// ancestors last so they win.
    fn inherited_defaults(&self, start: Handle, kind: ObjectKind) -> Vec<(String, Value)> {
        let mut chain = Vec::new();
        let mut current = Some(start);
        while let Some(c) = current {
            let Some(obj) = self.manager.get(c) else {
                break;
            };
            chain.push(
                obj.defaults
                    .entries_for(kind)
                    .map(|(n, v)| (n.clone(), v.clone()))
                    .collect::<Vec<_>>(),
            );
            current = obj.parent();
        }
        chain.into_iter().rev().flatten().collect()
    }

    fn initialize_state(&mut self, h: Handle) {
        let Some(kind) = self.manager.kind_of(h) else {
            return;
        };
        match kind {
            ObjectKind::Axes => self.update_all_limits(h),
            ObjectKind::Text => {
                self.update_data_cache(h);
                self.update_text_extent(h);
                self.update_parent_limits(h);
            }
            k if k.has_data_limits() => {
                self.update_data_cache(h);
                self.update_parent_limits(h);
            }
            ObjectKind::Figure => self.update_paper_position(h),
            ObjectKind::UiControl => self.update_ui_extent(h),
            _ => {}
        }
    }

    /// Build one of the hidden label texts of an axes and record it in the
    /// axes' `tag` property.
    pub(super) fn create_label(&mut self, axes: Handle, tag: &str) -> Handle {
        let h = self.manager.allocate(false);
        let (halign, valign, rotation) = LABELS
            .iter()
            .find(|(t, ..)| *t == tag)
            .map(|(_, ha, va, r)| (*ha, *va, *r))
            .unwrap_or(("center", "bottom", 0.0));
        let (font_size, weight) = self
            .manager
            .get(axes)
            .map(|ax| {
                let size = ax.f64_value("fontsize").unwrap_or(10.0);
                if tag == "title" {
                    (
                        size * ax.f64_value("titlefontsizemultiplier").unwrap_or(1.1),
                        ax.str_value("titlefontweight"),
                    )
                } else {
                    (
                        size * ax.f64_value("labelfontsizemultiplier").unwrap_or(1.1),
                        "normal".to_string(),
                    )
                }
            })
            .unwrap_or((11.0, "normal".to_string()));

        self.manager
            .insert(GraphicsObject::new(h, ObjectKind::Text, Some(axes)));
        self.manager.adopt(axes, h);
        for (name, value) in [
            ("__autopos_tag__", Value::from(tag)),
            ("handlevisibility", Value::from("off")),
            ("horizontalalignment", Value::from(halign)),
            ("verticalalignment", Value::from(valign)),
            ("rotation", Value::Num(rotation)),
            ("fontsize", Value::Num(font_size)),
            ("fontweight", Value::from(weight)),
        ] {
            self.store_raw(h, name, value);
        }
        self.store_raw(axes, tag, Value::from(h));
        h
    }

    /// Delete `h` and its subtree. Deleting an object already being deleted
    /// is a no-op; the root cannot be deleted.
    pub fn delete(&mut self, h: Handle) -> GraphicsResult<()> {
        if h.is_root() {
            return Err(GraphicsError::structural("cannot delete the root object"));
        }
        let obj = self.object_or_err(h)?;
        if obj.is_being_deleted() {
            return Ok(());
        }
        let kind = obj.kind();
        let predelete: Vec<_> = obj
            .props
            .properties()
            .flat_map(|p| p.listeners(ListenerMoment::PreDelete))
            .collect();
        if let Some(obj) = self.manager.get_mut(h) {
            obj.being_deleted = true;
            if let Some(p) = obj.props.get_mut("beingdeleted") {
                p.store(Value::from("on"));
            }
        }
        self.run_listeners(h, &predelete, &Value::Empty);
        if let Some(obj) = self.manager.get_mut(h) {
            for prop in obj.props.properties_mut() {
                prop.remove_listener(ListenerMoment::Persistent, None);
                prop.clear_listeners();
            }
        }

        let children = self
            .manager
            .get(h)
            .map(|o| o.children().to_vec())
            .unwrap_or_default();
        for child in children {
            self.delete(child)?;
        }

        self.execute_named_callback(h, "deletefcn", Value::Empty);
        if let Err(err) = self.toolkit.finalize(h) {
            self.toolkit_warning(err);
        }

        let parent = self.manager.get(h).and_then(|o| o.parent());
        let limits_owner = if kind.has_data_limits() {
            parent
        } else {
            None
        };
        if let Some(p) = parent {
            self.manager.remove_child(p, h);
        }
        if kind == ObjectKind::Figure {
            self.manager.pop_figure(h);
            let next = self.manager.figure_stack().first().copied();
            self.store_derived(
                Handle::ROOT,
                "currentfigure",
                next.map(Value::from).unwrap_or(Value::Empty),
            );
        }
        self.unlink_context_menu(h, kind);
        if let Some(p) = parent {
            self.clear_references(p, h);
        }
        if kind == ObjectKind::Text {
            if let Some(p) = parent {
                self.replace_deleted_label(p, h);
            }
        }
        if let Some(owner) = limits_owner {
            self.refresh_limits_from(owner);
        }

        if self.callbacks.contains(h) {
            log::debug!(target: "runmat_graphics", "deferring erase of {h} until its callback returns");
            self.pending_erase.push(h);
        } else {
            self.manager.remove(h);
        }
        Ok(())
    }

    /// Drop handle references to a deleted object held by its figure.
    fn clear_references(&mut self, parent: Handle, h: Handle) {
        let Some(figure) = self.ancestor_figure(parent) else {
            return;
        };
        if self
            .manager
            .get(figure)
            .and_then(|f| f.handle_value("currentobject"))
            == Some(h)
        {
            self.store_derived(figure, "currentobject", Value::Empty);
        }
    }

    fn unlink_context_menu(&mut self, h: Handle, kind: ObjectKind) {
        if kind == ObjectKind::UiContextMenu {
            let dependents = match self.manager.get(h).map(|o| &o.state) {
                Some(ObjectState::ContextMenu { dependents }) => dependents.clone(),
                _ => Vec::new(),
            };
            for dependent in dependents {
                self.store_derived(dependent, "uicontextmenu", Value::Empty);
            }
        }
        let menu = self.manager.get(h).and_then(|o| o.handle_value("uicontextmenu"));
        if let Some(menu) = menu {
            self.remove_menu_dependent(menu, h);
        }
    }

    /// Keep an axes' automatic label alive: a deleted label is replaced
    /// unless the axes itself is going away.
    fn replace_deleted_label(&mut self, axes: Handle, h: Handle) {
        let Some(ax) = self.manager.get(axes) else {
            return;
        };
        if ax.kind() != ObjectKind::Axes || ax.is_being_deleted() {
            return;
        }
        let tag = LABELS
            .iter()
            .map(|(t, ..)| *t)
            .find(|t| ax.handle_value(t) == Some(h));
        if let Some(tag) = tag {
            self.create_label(axes, tag);
            self.update_label_positions(axes);
        }
    }

    /// Move `h` under the handle in `value`.
    pub(super) fn reparent(&mut self, h: Handle, value: &Value) -> GraphicsResult<()> {
        let obj = self.object_or_err(h)?;
        let kind = obj.kind();
        let old_parent = obj.parent();
        let invalid = |reason: &str| GraphicsError::InvalidValue {
            object: kind.name().to_string(),
            property: "parent".to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
            candidates: Vec::new(),
        };
        let new_parent = Handle::from_value(value).ok_or_else(|| invalid("expected a graphics handle"))?;
        if new_parent == h {
            return Err(GraphicsError::structural(
                "an object cannot be its own parent",
            ));
        }
        let parent_kind = self
            .manager
            .kind_of(new_parent)
            .ok_or_else(|| invalid("invalid graphics handle"))?;
        let mut ancestor = self.manager.get(new_parent).and_then(|o| o.parent());
        while let Some(a) = ancestor {
            if a == h {
                return Err(GraphicsError::structural(
                    "cannot make an object a child of its own descendant",
                ));
            }
            ancestor = self.manager.get(a).and_then(|o| o.parent());
        }
        if !kind.accepts_parent(parent_kind) {
            return Err(GraphicsError::structural(format!(
                "{kind} object cannot be a child of a {parent_kind} object"
            )));
        }
        if old_parent == Some(new_parent) {
            return Ok(());
        }

        let post = self
            .manager
            .get(h)
            .and_then(|o| o.props.get("parent"))
            .map(|p| p.listeners(ListenerMoment::PostSet))
            .unwrap_or_default();
        if let Some(old) = old_parent {
            self.manager.remove_child(old, h);
            self.mark_modified(old);
        }
        self.manager.adopt(new_parent, h);
        self.mark_modified(h);
        self.notify_toolkit(h, "parent");

        if kind.has_data_limits() {
            if let Some(old) = old_parent {
                self.refresh_limits_from(old);
            }
            self.update_parent_limits(h);
        }
        if kind == ObjectKind::Axes || kind.is_ui_positioned() {
            self.refresh_container(h);
        }
        self.run_listeners(h, &post, &Value::from(new_parent));
        Ok(())
    }

    /// Reorder the visible children of `h`; hidden children keep their
    /// relative order after the visible ones.
    pub(super) fn reorder_children(&mut self, h: Handle, value: &Value) -> GraphicsResult<()> {
        let obj = self.object_or_err(h)?;
        let invalid = |reason: &str| GraphicsError::InvalidValue {
            object: obj.kind().name().to_string(),
            property: "children".to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
            candidates: Vec::new(),
        };
        let requested = Handle::list_from_value(value)
            .ok_or_else(|| invalid("expected a vector of graphics handles"))?;
        let visible = self.visible_children(h);
        let mut sorted_req: Vec<f64> = requested.iter().map(|c| c.value()).collect();
        let mut sorted_vis: Vec<f64> = visible.iter().map(|c| c.value()).collect();
        sorted_req.sort_by(f64::total_cmp);
        sorted_vis.sort_by(f64::total_cmp);
        if sorted_req != sorted_vis {
            return Err(invalid(
                "new children must be a permutation of the existing children",
            ));
        }
        let hidden: Vec<Handle> = obj
            .children()
            .iter()
            .copied()
            .filter(|c| !visible.contains(c))
            .collect();
        if let Some(obj) = self.manager.get_mut(h) {
            let children = obj.children_mut();
            children.clear();
            children.extend(requested);
            children.extend(hidden);
        }
        self.mark_modified(h);
        self.notify_toolkit(h, "children");
        Ok(())
    }

    /// Restore every settable property of `h` to its inherited default.
    /// Unit properties go first so positions are read in the right units;
    /// mode switches go last so automatic values are recomputed.
    pub fn reset(&mut self, h: Handle) -> GraphicsResult<()> {
        let obj = self.object_or_err(h)?;
        let kind = obj.kind();
        let parent = obj.parent().unwrap_or(Handle::ROOT);
        let mut units = Vec::new();
        let mut ordinary = Vec::new();
        let mut modes = Vec::new();
        for prop in obj.props.properties() {
            let name = prop.name();
            if prop.is_read_only()
                || prop.is_dynamic()
                || name.starts_with("__")
                || name.starts_with("current")
                || RESET_SKIP.contains(&name)
                || matches!(prop.kind(), PropertyKind::Children)
                || (kind == ObjectKind::Axes && LABELS.iter().any(|(t, ..)| *t == name))
            {
                continue;
            }
            let bucket = if name.ends_with("units") {
                &mut units
            } else if name.ends_with("mode") {
                &mut modes
            } else {
                &mut ordinary
            };
            bucket.push(name.to_string());
        }

        if let Some(obj) = self.manager.get_mut(h) {
            for prop in obj.props.properties_mut() {
                prop.clear_listeners();
            }
        }
        for name in units.into_iter().chain(ordinary).chain(modes) {
            let value = self.default_value(parent, kind, &name);
            if let Err(err) = self.set_property(h, &name, &value, Origin::User) {
                log::debug!(target: "runmat_graphics", "reset of {name} on {h} skipped: {err}");
            }
        }

        if kind == ObjectKind::Axes {
            self.reset_labels(h);
            self.clear_zoom_stack(h, false)?;
            self.update_all_limits(h);
        }
        Ok(())
    }

    /// Replace the automatic labels of an axes with fresh ones.
    fn reset_labels(&mut self, axes: Handle) {
        for (tag, ..) in LABELS {
            let old = self.manager.get(axes).and_then(|o| o.handle_value(tag));
            self.create_label(axes, tag);
            if let Some(old) = old {
                if let Err(err) = self.delete(old) {
                    log::debug!(target: "runmat_graphics", "stale {tag} {old} not deleted: {err}");
                }
            }
        }
        self.update_label_positions(axes);
    }
}
