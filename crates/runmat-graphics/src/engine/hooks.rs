//! Side effects of user writes. Every successful user `set` lands in
//! [`GraphicsEngine::after_set`], which keeps derived state consistent.

use crate::handle::Handle;
use crate::kinds::ObjectKind;
use crate::object::ObjectState;
use crate::value::Value;

use super::GraphicsEngine;

/// Data properties whose change invalidates an object's cached extrema.
fn is_data_property(kind: ObjectKind, key: &str) -> bool {
    match kind {
        ObjectKind::Line => matches!(key, "xdata" | "ydata" | "zdata"),
        ObjectKind::Image => matches!(
            key,
            "xdata" | "ydata" | "cdata" | "alphadata" | "cdatamapping" | "alphadatamapping"
        ),
        ObjectKind::Surface => matches!(
            key,
            "xdata"
                | "ydata"
                | "zdata"
                | "cdata"
                | "alphadata"
                | "cdatamapping"
                | "alphadatamapping"
        ),
        _ => false,
    }
}

impl GraphicsEngine {
    pub(super) fn after_set(&mut self, h: Handle, key: &str, old: &Value) {
        let Some(kind) = self.manager.kind_of(h) else {
            return;
        };
        match key {
            "visible" if kind.has_data_limits() => self.update_parent_limits(h),
            "uicontextmenu" => self.relink_context_menu(h, old),
            k if k.ends_with("liminclude") => self.update_parent_limits(h),
            _ => {}
        }
        match kind {
            ObjectKind::Root => self.root_hook(key),
            ObjectKind::Figure => self.figure_hook(h, key, old),
            ObjectKind::Axes => self.axes_hook(h, key, old),
            ObjectKind::Text => self.text_hook(h, key, old),
            ObjectKind::Patch => self.patch_hook(h, key),
            ObjectKind::UiControl | ObjectKind::UiPanel | ObjectKind::UiButtonGroup => {
                self.ui_hook(h, kind, key, old)
            }
            k if is_data_property(k, key) => {
                self.update_data_cache(h);
                self.update_parent_limits(h);
            }
            _ => {}
        }
    }

    fn root_hook(&mut self, key: &str) {
        if key == "currentfigure" {
            let figure = self
                .manager
                .root()
                .and_then(|r| r.handle_value("currentfigure"));
            if let Some(figure) = figure {
                self.manager.push_figure(figure);
            }
        }
    }

    fn relink_context_menu(&mut self, h: Handle, old: &Value) {
        if let Some(previous) = Handle::from_value(old) {
            self.remove_menu_dependent(previous, h);
        }
        let menu = self
            .manager
            .get(h)
            .and_then(|o| o.handle_value("uicontextmenu"));
        if let Some(menu) = menu {
            self.add_menu_dependent(menu, h);
        }
    }

    fn add_menu_dependent(&mut self, menu: Handle, h: Handle) {
        if let Some(ObjectState::ContextMenu { dependents }) =
            self.manager.get_mut(menu).map(|m| &mut m.state)
        {
            if !dependents.contains(&h) {
                dependents.push(h);
            }
        }
    }

    pub(super) fn remove_menu_dependent(&mut self, menu: Handle, h: Handle) {
        if let Some(ObjectState::ContextMenu { dependents }) =
            self.manager.get_mut(menu).map(|m| &mut m.state)
        {
            dependents.retain(|d| *d != h);
        }
    }

    /// The pixel geometry of `h`'s container changed: refresh every axes
    /// and extent below it.
    pub(super) fn refresh_container(&mut self, h: Handle) {
        match self.manager.kind_of(h) {
            Some(ObjectKind::Axes) => {
                self.update_transform(h);
                return;
            }
            Some(ObjectKind::UiControl) => {
                self.update_ui_extent(h);
                return;
            }
            Some(_) => {}
            None => return,
        }
        let children = self
            .manager
            .get(h)
            .map(|o| o.children().to_vec())
            .unwrap_or_default();
        for child in children {
            if matches!(
                self.manager.kind_of(child),
                Some(ObjectKind::Axes | ObjectKind::UiControl | ObjectKind::UiPanel | ObjectKind::UiButtonGroup)
            ) {
                self.refresh_container(child);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_properties_by_kind() {
        assert!(is_data_property(ObjectKind::Line, "zdata"));
        assert!(!is_data_property(ObjectKind::Line, "cdata"));
        assert!(is_data_property(ObjectKind::Image, "cdatamapping"));
        assert!(!is_data_property(ObjectKind::Text, "xdata"));
    }
}
