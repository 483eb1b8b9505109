use super::UNITS_RADIO;
use crate::property::{Property, PropertySet};
use crate::value::Value;

pub(super) fn declare(set: &mut PropertySet) {
    set.declare(Property::handle("callbackobject").read_only());
    set.declare(Property::handle("currentfigure"));
    set.declare(Property::string("fixedwidthfontname", "Courier"));
    set.declare(
        Property::array("monitorpositions", Value::row(&[1.0, 1.0, 1920.0, 1080.0])).read_only(),
    );
    set.declare(Property::row_vector("pointerlocation", &[0.0, 0.0]));
    set.declare(Property::handle("pointerwindow").read_only());
    set.declare(Property::double("screendepth", 24.0).read_only());
    set.declare(Property::double("screenpixelsperinch", 96.0).read_only());
    set.declare(Property::row_vector("screensize", &[1.0, 1.0, 1920.0, 1080.0]).read_only());
    set.declare(Property::on_off("showhiddenhandles", false));
    set.declare(Property::radio("units", UNITS_RADIO));
    set.declare(Property::handle("parent").read_only());
}
