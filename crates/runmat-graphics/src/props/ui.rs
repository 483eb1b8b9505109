use super::{declare_font, UNITS_RADIO};
use crate::property::{Property, PropertySet, Range};
use crate::value::Value;

const UI_GREY: [f64; 3] = [0.94, 0.94, 0.94];

pub(super) fn declare_uimenu(set: &mut PropertySet) {
    set.declare(Property::string("accelerator", ""));
    set.declare(Property::callback("menuselectedfcn"));
    set.declare(Property::on_off("checked", false));
    set.declare(Property::on_off("enable", true));
    set.declare(Property::color("foregroundcolor", [0.0, 0.0, 0.0]));
    set.declare(Property::double("position", 0.0).range(Range::at_least(0.0)));
    set.declare(Property::on_off("separator", false));
    set.declare(Property::string("text", ""));
}

pub(super) fn declare_uicontrol(set: &mut PropertySet) {
    set.declare(Property::color("backgroundcolor", UI_GREY));
    set.declare(Property::callback("callback"));
    set.declare(Property::array("cdata", Value::Empty));
    set.declare(Property::radio("enable", "{on}|inactive|off"));
    set.declare(
        Property::array("extent", Value::row(&[0.0, 0.0, 0.0, 0.0]))
            .shape(&[1, 4])
            .read_only(),
    );
    declare_font(set, 10.0);
    set.declare(Property::color("foregroundcolor", [0.0, 0.0, 0.0]));
    set.declare(Property::radio("horizontalalignment", "left|{center}|right"));
    set.declare(Property::callback("keypressfcn"));
    set.declare(Property::double("listboxtop", 1.0).range(Range::at_least(1.0)));
    set.declare(Property::double("max", 1.0));
    set.declare(Property::double("min", 0.0));
    set.declare(Property::row_vector("position", &[20.0, 20.0, 60.0, 20.0]));
    set.declare(Property::row_vector("sliderstep", &[0.01, 0.1]));
    set.declare(Property::text("string", ""));
    set.declare(Property::radio(
        "style",
        "{pushbutton}|togglebutton|radiobutton|checkbox|edit|text|slider|frame|listbox|popupmenu",
    ));
    set.declare(Property::string("tooltipstring", ""));
    set.declare(Property::radio("units", UNITS_RADIO));
    set.declare(Property::array("value", Value::Num(0.0)));
    set.declare(Property::radio("verticalalignment", "top|{middle}|bottom"));
}

pub(super) fn declare_uipanel(set: &mut PropertySet) {
    set.declare(Property::color("backgroundcolor", UI_GREY));
    set.declare(Property::radio(
        "bordertype",
        "none|{etchedin}|etchedout|beveledin|beveledout|line",
    ));
    set.declare(Property::double("borderwidth", 1.0).range(Range::at_least(0.0)));
    declare_font(set, 10.0);
    set.declare(Property::color("foregroundcolor", [0.0, 0.0, 0.0]));
    set.declare(Property::color("highlightcolor", [1.0, 1.0, 1.0]));
    set.declare(Property::row_vector("position", &[0.0, 0.0, 1.0, 1.0]));
    set.declare(Property::callback("resizefcn"));
    set.declare(Property::color("shadowcolor", [0.7, 0.7, 0.7]));
    set.declare(Property::callback("sizechangedfcn"));
    set.declare(Property::text("title", ""));
    set.declare(Property::radio(
        "titleposition",
        "{lefttop}|centertop|righttop|leftbottom|centerbottom|rightbottom",
    ));
    set.declare(Property::radio(
        "units",
        "inches|centimeters|{normalized}|points|pixels|characters",
    ));
}

pub(super) fn declare_uibuttongroup(set: &mut PropertySet) {
    declare_uipanel(set);
    set.declare(Property::handle("selectedobject"));
    set.declare(Property::callback("selectionchangedfcn"));
}

pub(super) fn declare_uicontextmenu(set: &mut PropertySet) {
    set.declare(Property::callback("callback"));
    set.declare(Property::row_vector("position", &[0.0, 0.0]));
}

pub(super) fn declare_uitoolbar(set: &mut PropertySet) {
    set.declare(Property::color("backgroundcolor", UI_GREY));
}

pub(super) fn declare_uipushtool(set: &mut PropertySet) {
    set.declare(Property::array("cdata", Value::Empty));
    set.declare(Property::callback("clickedcallback"));
    set.declare(Property::on_off("enable", true));
    set.declare(Property::on_off("separator", false));
    set.declare(Property::string("tooltipstring", ""));
}

pub(super) fn declare_uitoggletool(set: &mut PropertySet) {
    declare_uipushtool(set);
    set.declare(Property::callback("offcallback"));
    set.declare(Property::callback("oncallback"));
    set.declare(Property::on_off("state", false));
}
