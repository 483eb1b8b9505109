use super::{
    declare_font, declare_limit_includes, declare_markers, declare_stroke, unit_interval,
    LINE_STYLE_RADIO,
};
use crate::property::{Property, PropertySet, Range};
use crate::value::{Tensor, Value};

const DATA_MAPPING_RADIO: &str = "none|direct|{scaled}";

pub(super) fn declare_line(set: &mut PropertySet) {
    set.declare(Property::color("color", [0.0, 0.0, 0.0]));
    set.declare(Property::string("displayname", ""));
    set.declare(Property::radio("linejoin", "{round}|miter|chamfer"));
    declare_stroke(set);
    declare_markers(set);
    set.declare(Property::array("xdata", Value::row(&[0.0, 1.0])));
    set.declare(Property::string("xdatasource", ""));
    set.declare(Property::array("ydata", Value::row(&[0.0, 1.0])));
    set.declare(Property::string("ydatasource", ""));
    set.declare(Property::array("zdata", Value::Empty));
    set.declare(Property::string("zdatasource", ""));
    declare_limit_includes(set, true, false);
}

pub(super) fn declare_text(set: &mut PropertySet) {
    set.declare(Property::radio(
        "__autopos_tag__",
        "{none}|xlabel|ylabel|zlabel|title",
    )
    .hidden());
    set.declare(Property::color_radio("backgroundcolor", None, "{none}"));
    set.declare(Property::color("color", [0.0, 0.0, 0.0]));
    set.declare(Property::color_radio("edgecolor", None, "{none}"));
    set.declare(Property::on_off("editing", false));
    set.declare(
        Property::array("extent", Value::row(&[0.0, 0.0, 0.0, 0.0]))
            .shape(&[1, 4])
            .read_only(),
    );
    declare_font(set, 10.0);
    set.declare(Property::radio("horizontalalignment", "{left}|center|right"));
    set.declare(Property::radio("horizontalalignmentmode", "{auto}|manual").hidden());
    set.declare(Property::radio("interpreter", "{tex}|none|latex"));
    set.declare(Property::radio("linestyle", LINE_STYLE_RADIO));
    set.declare(Property::double("linewidth", 0.5).range(Range::greater_than(0.0)));
    set.declare(Property::double("margin", 3.0).range(Range::greater_than(0.0)));
    set.declare(
        Property::array("position", Value::row(&[0.0, 0.0, 0.0]))
            .shape(&[1, 2])
            .shape(&[1, 3])
            .force_row(),
    );
    set.declare(Property::radio("positionmode", "{auto}|manual").hidden());
    set.declare(Property::double("rotation", 0.0));
    set.declare(Property::radio("rotationmode", "{auto}|manual").hidden());
    set.declare(Property::text("string", ""));
    set.declare(Property::radio(
        "units",
        "{data}|pixels|normalized|inches|centimeters|points|characters",
    ));
    set.declare(Property::radio(
        "verticalalignment",
        "top|cap|{middle}|baseline|bottom",
    ));
    set.declare(Property::radio("verticalalignmentmode", "{auto}|manual").hidden());
    declare_limit_includes(set, false, false);
}

pub(super) fn declare_image(set: &mut PropertySet) {
    set.declare(Property::array("alphadata", Value::Num(1.0)));
    set.declare(Property::radio("alphadatamapping", "{none}|direct|scaled"));
    set.declare(Property::array(
        "cdata",
        Value::Tensor(Tensor::from_rows(&[&[1.0, 2.0], &[3.0, 4.0]])),
    ));
    set.declare(Property::radio("cdatamapping", "{direct}|scaled"));
    set.declare(Property::array("xdata", Value::row(&[1.0, 2.0])));
    set.declare(Property::array("ydata", Value::row(&[1.0, 2.0])));
    declare_limit_includes(set, true, true);
}

pub(super) fn declare_patch(set: &mut PropertySet) {
    set.declare(Property::radio("alphadatamapping", DATA_MAPPING_RADIO));
    set.declare(Property::double("ambientstrength", 0.3).range(unit_interval()));
    set.declare(Property::radio("backfacelighting", "unlit|lit|{reverselit}"));
    set.declare(Property::array("cdata", Value::Empty));
    set.declare(Property::radio("cdatamapping", "direct|{scaled}"));
    set.declare(Property::double("diffusestrength", 0.6).range(unit_interval()));
    set.declare(Property::string("displayname", ""));
    set.declare(
        Property::double_radio("edgealpha", Value::Num(1.0), "flat|interp")
            .range(unit_interval()),
    );
    set.declare(Property::color_radio(
        "edgecolor",
        Some([0.0, 0.0, 0.0]),
        "none|flat|interp",
    ));
    set.declare(Property::radio("edgelighting", "{none}|flat|gouraud|phong"));
    set.declare(
        Property::double_radio("facealpha", Value::Num(1.0), "flat|interp")
            .range(unit_interval()),
    );
    set.declare(Property::color_radio(
        "facecolor",
        Some([0.0, 0.0, 0.0]),
        "none|flat|interp",
    ));
    set.declare(Property::radio("facelighting", "none|{flat}|gouraud|phong"));
    set.declare(Property::array("facenormals", Value::Empty));
    set.declare(Property::radio("facenormalsmode", "{auto}|manual"));
    set.declare(Property::array("facevertexalphadata", Value::Empty));
    set.declare(Property::array("facevertexcdata", Value::Empty));
    set.declare(Property::array("faces", Value::row(&[1.0, 2.0, 3.0])));
    declare_stroke(set);
    declare_markers(set);
    set.declare(Property::double("specularstrength", 0.9).range(unit_interval()));
    set.declare(Property::array("vertexnormals", Value::Empty));
    set.declare(Property::radio("vertexnormalsmode", "{auto}|manual"));
    set.declare(Property::array(
        "vertices",
        Value::Tensor(Tensor::from_rows(&[&[0.0, 1.0], &[1.0, 1.0], &[0.0, 0.0]])),
    ));
    set.declare(Property::array("xdata", Value::Tensor(Tensor::column(&[0.0, 1.0, 0.0]))));
    set.declare(Property::array("ydata", Value::Tensor(Tensor::column(&[1.0, 1.0, 0.0]))));
    set.declare(Property::array("zdata", Value::Empty));
    declare_limit_includes(set, true, true);
}

pub(super) fn declare_surface(set: &mut PropertySet) {
    set.declare(Property::array("alphadata", Value::Num(1.0)));
    set.declare(Property::radio("alphadatamapping", DATA_MAPPING_RADIO));
    set.declare(Property::double("ambientstrength", 0.3).range(unit_interval()));
    set.declare(Property::array(
        "cdata",
        Value::Tensor(Tensor::from_rows(&[
            &[0.0, 0.0, 0.0],
            &[0.0, 1.0, 0.0],
            &[0.0, 0.0, 0.0],
        ])),
    ));
    set.declare(Property::radio("cdatamapping", "direct|{scaled}"));
    set.declare(Property::string("cdatasource", ""));
    set.declare(Property::double("diffusestrength", 0.6).range(unit_interval()));
    set.declare(Property::string("displayname", ""));
    set.declare(
        Property::double_radio("edgealpha", Value::Num(1.0), "flat|interp")
            .range(unit_interval()),
    );
    set.declare(Property::color_radio(
        "edgecolor",
        Some([0.0, 0.0, 0.0]),
        "none|flat|interp",
    ));
    set.declare(
        Property::double_radio("facealpha", Value::Num(1.0), "flat|interp")
            .range(unit_interval()),
    );
    set.declare(Property::color_radio("facecolor", None, "none|{flat}|interp|texturemap"));
    set.declare(Property::radio("facelighting", "none|{flat}|gouraud|phong"));
    declare_stroke(set);
    declare_markers(set);
    set.declare(Property::radio("meshstyle", "{both}|row|column"));
    set.declare(Property::array("vertexnormals", Value::Empty));
    set.declare(Property::radio("vertexnormalsmode", "{auto}|manual"));
    set.declare(Property::array(
        "xdata",
        Value::Tensor(Tensor::from_rows(&[
            &[1.0, 2.0, 3.0],
            &[1.0, 2.0, 3.0],
            &[1.0, 2.0, 3.0],
        ])),
    ));
    set.declare(Property::string("xdatasource", ""));
    set.declare(Property::array(
        "ydata",
        Value::Tensor(Tensor::from_rows(&[
            &[1.0, 1.0, 1.0],
            &[2.0, 2.0, 2.0],
            &[3.0, 3.0, 3.0],
        ])),
    ));
    set.declare(Property::string("ydatasource", ""));
    set.declare(Property::array(
        "zdata",
        Value::Tensor(Tensor::from_rows(&[
            &[0.0, 0.0, 0.0],
            &[0.0, 1.0, 0.0],
            &[0.0, 0.0, 0.0],
        ])),
    ));
    set.declare(Property::string("zdatasource", ""));
    declare_limit_includes(set, true, true);
}

pub(super) fn declare_light(set: &mut PropertySet) {
    set.declare(Property::color("color", [1.0, 1.0, 1.0]));
    set.declare(Property::row_vector("position", &[1.0, 0.0, 1.0]));
    set.declare(Property::radio("style", "{infinite}|local"));
}

pub(super) fn declare_hggroup(set: &mut PropertySet) {
    set.declare(Property::string("displayname", ""));
    declare_limit_includes(set, true, true);
}
