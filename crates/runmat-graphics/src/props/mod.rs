//! Factory property declarations for every object kind.
//!
//! Each kind starts from the shared base set and then declares its own
//! properties; a kind-level declaration replaces a base one of the same name.

mod axes;
mod figure;
mod primitives;
mod root;
mod ui;

use crate::kinds::ObjectKind;
use crate::property::{Property, PropertySet, Range};
use crate::value::{Tensor, Value};

pub(crate) const UNITS_RADIO: &str = "inches|centimeters|normalized|points|{pixels}|characters";
pub(crate) const FONT_UNITS_RADIO: &str = "{points}|inches|centimeters|normalized|pixels";
pub(crate) const LINE_STYLE_RADIO: &str = "{-}|--|:|-.|none";
pub(crate) const MARKER_RADIO: &str =
    "+|o|*|.|x|square|s|diamond|d|^|v|>|<|pentagram|p|hexagram|h|{none}";

/// Fresh factory-initialised property set for `kind`.
pub fn factory_properties(kind: ObjectKind) -> PropertySet {
    let mut set = PropertySet::new(kind.name());
    declare_base(&mut set, kind);
    match kind {
        ObjectKind::Root => root::declare(&mut set),
        ObjectKind::Figure => figure::declare(&mut set),
        ObjectKind::Axes => axes::declare(&mut set),
        ObjectKind::Line => primitives::declare_line(&mut set),
        ObjectKind::Text => primitives::declare_text(&mut set),
        ObjectKind::Image => primitives::declare_image(&mut set),
        ObjectKind::Patch => primitives::declare_patch(&mut set),
        ObjectKind::Surface => primitives::declare_surface(&mut set),
        ObjectKind::Light => primitives::declare_light(&mut set),
        ObjectKind::HgGroup => primitives::declare_hggroup(&mut set),
        ObjectKind::UiMenu => ui::declare_uimenu(&mut set),
        ObjectKind::UiControl => ui::declare_uicontrol(&mut set),
        ObjectKind::UiPanel => ui::declare_uipanel(&mut set),
        ObjectKind::UiButtonGroup => ui::declare_uibuttongroup(&mut set),
        ObjectKind::UiContextMenu => ui::declare_uicontextmenu(&mut set),
        ObjectKind::UiToolbar => ui::declare_uitoolbar(&mut set),
        ObjectKind::UiPushTool => ui::declare_uipushtool(&mut set),
        ObjectKind::UiToggleTool => ui::declare_uitoggletool(&mut set),
    }
    set
}

fn declare_base(set: &mut PropertySet, kind: ObjectKind) {
    set.declare(Property::on_off("beingdeleted", false).read_only());
    set.declare(Property::radio("busyaction", "queue|{cancel}"));
    set.declare(Property::callback("buttondownfcn"));
    set.declare(Property::children());
    set.declare(Property::on_off("clipping", true));
    set.declare(Property::callback("createfcn"));
    set.declare(Property::callback("deletefcn"));
    set.declare(Property::radio("handlevisibility", "{on}|callback|off"));
    set.declare(Property::on_off("hittest", true));
    set.declare(Property::on_off("interruptible", true));
    set.declare(Property::handle("parent"));
    set.declare(Property::radio("pickableparts", "{visible}|all|none"));
    set.declare(Property::on_off("selected", false));
    set.declare(Property::on_off("selectionhighlight", true));
    set.declare(Property::string("tag", ""));
    set.declare(Property::string("type", kind.name()).read_only());
    set.declare(Property::handle("uicontextmenu"));
    set.declare(Property::any("userdata", Value::Empty));
    set.declare(Property::on_off("visible", true));
}

/// `xliminclude` style switches controlling participation in axes limits.
fn declare_limit_includes(set: &mut PropertySet, on: bool, color_and_alpha: bool) {
    set.declare(Property::on_off("xliminclude", on));
    set.declare(Property::on_off("yliminclude", on));
    set.declare(Property::on_off("zliminclude", on));
    if color_and_alpha {
        set.declare(Property::on_off("climinclude", on));
        set.declare(Property::on_off("aliminclude", on));
    }
}

fn declare_font(set: &mut PropertySet, size: f64) {
    set.declare(Property::radio("fontangle", "{normal}|italic"));
    set.declare(Property::string("fontname", "Helvetica"));
    set.declare(Property::double("fontsize", size).range(Range::greater_than(0.0)));
    set.declare(Property::on_off("fontsmoothing", true));
    set.declare(Property::radio("fontunits", FONT_UNITS_RADIO));
    set.declare(Property::radio("fontweight", "{normal}|bold"));
}

fn declare_markers(set: &mut PropertySet) {
    set.declare(Property::radio("marker", MARKER_RADIO));
    set.declare(Property::color_radio("markeredgecolor", None, "{auto}|none"));
    set.declare(Property::color_radio("markerfacecolor", None, "auto|{none}"));
    set.declare(Property::double("markersize", 6.0).range(Range::greater_than(0.0)));
}

fn declare_stroke(set: &mut PropertySet) {
    set.declare(Property::radio("linestyle", LINE_STYLE_RADIO));
    set.declare(Property::double("linewidth", 0.5).range(Range::greater_than(0.0)));
}

fn unit_interval() -> Range {
    Range::between(0.0, 1.0)
}

/// 64-entry blue-to-red colormap.
pub(crate) fn default_colormap() -> Tensor {
    let n = 64usize;
    let mut rows: Vec<[f64; 3]> = Vec::with_capacity(n);
    for i in 0..n {
        let x = (i as f64 + 1.0) / n as f64;
        let ramp = |center: f64| (1.5 - (4.0 * x - center).abs()).clamp(0.0, 1.0);
        rows.push([ramp(3.0), ramp(2.0), ramp(1.0)]);
    }
    let refs: Vec<&[f64]> = rows.iter().map(|r| r.as_slice()).collect();
    Tensor::from_rows(&refs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_base_and_type() {
        for kind in ObjectKind::ALL {
            let set = factory_properties(kind);
            assert_eq!(set.value("type"), Some(&Value::from(kind.name())));
            assert!(set.get("busyaction").is_some());
            assert_eq!(set.value("busyaction"), Some(&Value::from("cancel")));
        }
    }

    #[test]
    fn colormap_spans_blue_to_red() {
        let map = default_colormap();
        assert_eq!(map.shape, vec![64, 3]);
        assert_eq!(map.get2(0, 0), 0.0);
        assert!(map.get2(0, 2) > 0.5);
        assert!(map.get2(63, 0) >= 0.5);
        assert_eq!(map.get2(63, 2), 0.0);
    }

    #[test]
    fn factory_defaults_validate() {
        for kind in ObjectKind::ALL {
            let set = factory_properties(kind);
            for prop in set.properties() {
                if matches!(prop.kind(), crate::property::PropertyKind::Handle) {
                    continue;
                }
                assert!(
                    prop.validate(prop.get()).is_ok(),
                    "{} {} default does not validate",
                    kind,
                    prop.name()
                );
            }
        }
    }
}
