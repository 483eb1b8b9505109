use super::{declare_font, unit_interval, LINE_STYLE_RADIO};
use crate::property::{Property, PropertySet, Range};
use crate::value::{Tensor, Value};

/// Default line colour cycle.
pub(crate) fn default_colororder() -> Tensor {
    Tensor::from_rows(&[
        &[0.0, 0.0, 1.0],
        &[0.0, 0.5, 0.0],
        &[1.0, 0.0, 0.0],
        &[0.0, 0.75, 0.75],
        &[0.75, 0.0, 0.75],
        &[0.75, 0.75, 0.0],
        &[0.25, 0.25, 0.25],
    ])
}

const AXIS_GREY: [f64; 3] = [0.15, 0.15, 0.15];

pub(super) fn declare(set: &mut PropertySet) {
    set.declare(Property::radio(
        "activepositionproperty",
        "{outerposition}|position",
    ));
    set.declare(Property::row_vector("alim", &[0.0, 1.0]));
    set.declare(Property::radio("alimmode", "{auto}|manual"));
    set.declare(Property::color("ambientlightcolor", [1.0, 1.0, 1.0]));
    set.declare(Property::on_off("box", false));
    set.declare(Property::radio("boxstyle", "{back}|full"));
    set.declare(Property::row_vector("cameraposition", &[0.5, 0.5, 9.1603]));
    set.declare(Property::radio("camerapositionmode", "{auto}|manual"));
    set.declare(Property::row_vector("cameratarget", &[0.5, 0.5, 0.5]));
    set.declare(Property::radio("cameratargetmode", "{auto}|manual"));
    set.declare(Property::row_vector("cameraupvector", &[0.0, 1.0, 0.0]));
    set.declare(Property::radio("cameraupvectormode", "{auto}|manual"));
    set.declare(Property::double("cameraviewangle", 6.6086).range(Range {
        min: Some(crate::property::Bound {
            value: 0.0,
            inclusive: false,
        }),
        max: Some(crate::property::Bound {
            value: 180.0,
            inclusive: false,
        }),
    }));
    set.declare(Property::radio("cameraviewanglemode", "{auto}|manual"));
    set.declare(Property::row_vector("clim", &[0.0, 1.0]));
    set.declare(Property::radio("climmode", "{auto}|manual"));
    set.declare(Property::radio("clippingstyle", "{3dbox}|rectangle"));
    set.declare(Property::color_radio("color", Some([1.0, 1.0, 1.0]), "none"));
    set.declare(
        Property::array("colororder", Value::Tensor(default_colororder()))
            .shape(&[-1, 3])
            .range(unit_interval()),
    );
    set.declare(Property::double("colororderindex", 1.0).range(Range::at_least(1.0)));
    set.declare(Property::array(
        "currentpoint",
        Value::Tensor(Tensor::zeros(2, 3)),
    ));
    set.declare(
        Property::row_vector("dataaspectratio", &[1.0, 1.0, 1.0]).range(Range::greater_than(0.0)),
    );
    set.declare(Property::radio("dataaspectratiomode", "{auto}|manual"));
    declare_font(set, 10.0);
    set.declare(Property::double("gridalpha", 0.15).range(unit_interval()));
    set.declare(Property::color_radio("gridcolor", Some(AXIS_GREY), "none"));
    set.declare(Property::radio("gridlinestyle", LINE_STYLE_RADIO));
    set.declare(
        Property::double("labelfontsizemultiplier", 1.1).range(Range::greater_than(0.0)),
    );
    set.declare(Property::radio("layer", "{bottom}|top"));
    set.declare(Property::any("linestyleorder", Value::from("-")));
    set.declare(Property::double("linewidth", 0.5).range(Range::greater_than(0.0)));
    set.declare(Property::double("minorgridalpha", 0.25).range(unit_interval()));
    set.declare(Property::color_radio("minorgridcolor", Some([0.1, 0.1, 0.1]), "none"));
    set.declare(Property::radio("minorgridlinestyle", "-|--|{:}|-.|none"));
    set.declare(Property::radio("nextplot", "new|add|replacechildren|{replace}"));
    set.declare(Property::row_vector("outerposition", &[0.0, 0.0, 1.0, 1.0]));
    set.declare(
        Property::row_vector("plotboxaspectratio", &[1.0, 1.0, 1.0])
            .range(Range::greater_than(0.0)),
    );
    set.declare(Property::radio("plotboxaspectratiomode", "{auto}|manual"));
    set.declare(Property::row_vector("position", &[0.13, 0.11, 0.775, 0.815]));
    set.declare(Property::radio("projection", "{orthographic}|perspective"));
    set.declare(Property::radio("sortmethod", "{depth}|childorder"));
    set.declare(Property::radio("tickdir", "{in}|out|both"));
    set.declare(Property::radio("tickdirmode", "{auto}|manual"));
    set.declare(Property::radio("ticklabelinterpreter", "{tex}|latex|none"));
    set.declare(Property::row_vector("ticklength", &[0.01, 0.025]));
    set.declare(Property::row_vector("tightinset", &[0.0, 0.0, 0.0, 0.0]).read_only());
    set.declare(Property::handle("title"));
    set.declare(
        Property::double("titlefontsizemultiplier", 1.1).range(Range::greater_than(0.0)),
    );
    set.declare(Property::radio("titlefontweight", "{bold}|normal"));
    set.declare(Property::radio(
        "units",
        "{normalized}|inches|centimeters|points|pixels|characters",
    ));
    set.declare(Property::row_vector("view", &[0.0, 90.0]));

    set.declare(Property::radio("xaxislocation", "{bottom}|top|origin"));
    set.declare(Property::radio("yaxislocation", "{left}|right|origin"));
    for axis in ["x", "y", "z"] {
        declare_axis(set, axis);
    }
}

fn declare_axis(set: &mut PropertySet, axis: &str) {
    let name = |suffix: &str| format!("{axis}{suffix}");
    set.declare(Property::color_radio(&name("color"), Some(AXIS_GREY), "none"));
    set.declare(Property::radio(&name("colormode"), "{auto}|manual"));
    set.declare(Property::radio(&name("dir"), "{normal}|reverse"));
    set.declare(Property::on_off(&name("grid"), false));
    set.declare(Property::handle(&name("label")));
    set.declare(Property::row_vector(&name("lim"), &[0.0, 1.0]));
    set.declare(Property::radio(&name("limmode"), "{auto}|manual"));
    set.declare(Property::on_off(&name("minorgrid"), false));
    set.declare(Property::on_off(&name("minortick"), false));
    set.declare(
        Property::array(&name("minortickvalues"), Value::Empty)
            .shape(&[1, -1])
            .force_row()
            .hidden(),
    );
    set.declare(Property::radio(&name("scale"), "{linear}|log"));
    set.declare(
        Property::array(
            &name("tick"),
            Value::row(&[0.0, 0.2, 0.4, 0.6, 0.8, 1.0]),
        )
        .shape(&[1, -1])
        .force_row(),
    );
    set.declare(Property::text(&name("ticklabel"), ""));
    set.declare(Property::radio(&name("ticklabelmode"), "{auto}|manual"));
    set.declare(Property::double(&name("ticklabelrotation"), 0.0));
    set.declare(Property::radio(&name("tickmode"), "{auto}|manual"));
}
