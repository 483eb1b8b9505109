use super::{default_colormap, unit_interval, UNITS_RADIO};
use crate::property::{Property, PropertySet, Range};
use crate::value::Value;

pub(crate) const PAPER_TYPE_RADIO: &str = "{usletter}|uslegal|tabloid|a0|a1|a2|a3|a4|a5|b0|b1|b2|b3|b4|b5|arch-a|arch-b|arch-c|arch-d|arch-e|a|b|c|d|e|<custom>";

pub(super) fn declare(set: &mut PropertySet) {
    set.declare(Property::array("alphamap", Value::row(&[1.0; 64])).range(unit_interval()));
    set.declare(Property::callback_with(
        "closerequestfcn",
        Value::from("closereq"),
    ));
    set.declare(Property::color_radio("color", Some([1.0, 1.0, 1.0]), "none"));
    set.declare(
        Property::array("colormap", Value::Tensor(default_colormap()))
            .shape(&[-1, 3])
            .range(unit_interval()),
    );
    set.declare(Property::handle("currentaxes"));
    set.declare(Property::string("currentcharacter", ""));
    set.declare(Property::handle("currentobject"));
    set.declare(Property::row_vector("currentpoint", &[0.0, 0.0]));
    set.declare(Property::on_off("dockcontrols", true));
    set.declare(Property::string("filename", ""));
    set.declare(Property::on_off("integerhandle", true));
    set.declare(Property::on_off("inverthardcopy", true));
    set.declare(Property::callback("keypressfcn"));
    set.declare(Property::callback("keyreleasefcn"));
    set.declare(Property::radio("menubar", "{figure}|none"));
    set.declare(Property::string("name", ""));
    set.declare(Property::radio("nextplot", "new|{add}|replacechildren|replace"));
    set.declare(Property::on_off("numbertitle", true));
    set.declare(Property::row_vector("outerposition", &[300.0, 200.0, 560.0, 500.0]));
    set.declare(Property::radio("paperorientation", "{portrait}|landscape"));
    set.declare(Property::row_vector("paperposition", &[0.25, 2.5, 8.0, 6.0]));
    set.declare(Property::radio("paperpositionmode", "auto|{manual}"));
    set.declare(
        Property::row_vector("papersize", &[8.5, 11.0]).range(Range::greater_than(0.0)),
    );
    set.declare(Property::radio("papertype", PAPER_TYPE_RADIO));
    set.declare(Property::radio(
        "paperunits",
        "{inches}|centimeters|normalized|points",
    ));
    set.declare(Property::radio(
        "pointer",
        "crosshair|{arrow}|left|top|right|bottom|circle|cross|fleur|hand|ibeam|watch|custom",
    ));
    set.declare(Property::row_vector("position", &[300.0, 200.0, 560.0, 420.0]));
    set.declare(Property::string("renderer", "opengl"));
    set.declare(Property::radio("renderermode", "{auto}|manual"));
    set.declare(Property::on_off("resize", true));
    set.declare(Property::callback("resizefcn"));
    set.declare(Property::radio("selectiontype", "{normal}|extend|alt|open"));
    set.declare(Property::callback("sizechangedfcn"));
    set.declare(Property::radio("toolbar", "{auto}|figure|none"));
    set.declare(Property::radio("units", UNITS_RADIO));
    set.declare(Property::callback("windowbuttondownfcn"));
    set.declare(Property::callback("windowbuttonmotionfcn"));
    set.declare(Property::callback("windowbuttonupfcn"));
    set.declare(Property::callback("windowkeypressfcn"));
    set.declare(Property::callback("windowkeyreleasefcn"));
    set.declare(Property::callback("windowscrollwheelfcn"));
    set.declare(Property::radio("windowstyle", "{normal}|modal|docked"));
}
