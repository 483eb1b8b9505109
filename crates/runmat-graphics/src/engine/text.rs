//! Text and uicontrol extents, and unit conversion of text positions and
//! font sizes.

use glam::DVec3;

use crate::handle::Handle;
use crate::kinds::ObjectKind;
use crate::toolkit::TextRequest;
use crate::transform::GraphicsTransform;
use crate::units::{convert_font_size, convert_position, Units};
use crate::value::Value;

use super::GraphicsEngine;

/// Fraction of the text width left of the anchor.
fn horizontal_fraction(align: &str) -> f64 {
    match align {
        "center" => 0.5,
        "right" => 1.0,
        _ => 0.0,
    }
}

/// Fraction of the text height above the anchor on screen.
fn vertical_fraction(align: &str) -> f64 {
    match align {
        "top" | "cap" => 0.0,
        "middle" => 0.5,
        _ => 1.0,
    }
}

/// What a text is drawn into: its axes' transform and pixel box.
struct TextFrame {
    transform: GraphicsTransform,
    bounding_box: [f64; 4],
}

impl TextFrame {
    fn size(&self) -> [f64; 2] {
        [self.bounding_box[2], self.bounding_box[3]]
    }

    /// Screen pixel of a position expressed in `units`.
    fn to_screen(&self, pos: &[f64], units: Units, dpi: f64) -> DVec3 {
        let at = |i: usize| pos.get(i).copied().unwrap_or(0.0);
        if units == Units::Data {
            return self.transform.transform(at(0), at(1), at(2), true);
        }
        let [left, top, _, height] = self.bounding_box;
        let ll = convert_position(&[at(0), at(1)], units, Units::Pixels, self.size(), dpi);
        let [near, far] = self.transform.depth_range();
        DVec3::new(left + ll[0] - 1.0, top + height - (ll[1] - 1.0), (near + far) / 2.0)
    }

    /// Inverse of [`TextFrame::to_screen`], keeping `len` coordinates.
    fn from_screen(&self, p: DVec3, units: Units, len: usize, dpi: f64) -> Vec<f64> {
        let mut out = if units == Units::Data {
            let d = self.transform.untransform(p.x, p.y, p.z, true);
            vec![d.x, d.y, d.z]
        } else {
            let [left, top, _, height] = self.bounding_box;
            let ll = [p.x - left + 1.0, top + height - p.y + 1.0];
            let mut v = convert_position(&ll, Units::Pixels, units, self.size(), dpi);
            v.push(0.0);
            v
        };
        out.truncate(len.clamp(2, 3));
        out
    }
}

impl GraphicsEngine {
    fn text_frame(&self, h: Handle) -> TextFrame {
        let axes = self.ancestor_of_kind(h, ObjectKind::Axes);
        let transform = axes
            .and_then(|ax| self.transform(ax))
            .cloned()
            .unwrap_or_default();
        let bounding_box = axes
            .map(|ax| self.axes_pixel_box(ax))
            .unwrap_or([0.0, 0.0, 1.0, 1.0]);
        TextFrame {
            transform,
            bounding_box,
        }
    }

    /// Pixel height that `normalized` font units of `h` refer to.
    fn font_reference_height(&self, h: Handle) -> f64 {
        match self.manager.kind_of(h) {
            Some(ObjectKind::Axes) => self.axes_pixel_box(h)[3],
            Some(ObjectKind::Text) => self.text_frame(h).bounding_box[3],
            Some(ObjectKind::UiControl) => self.ui_pixel_position(h)[3],
            Some(ObjectKind::UiPanel | ObjectKind::UiButtonGroup) => {
                self.container_pixel_size(h)[1]
            }
            _ => self.screen_size()[1],
        }
    }

    fn font_pixels(&self, h: Handle) -> f64 {
        let Some(obj) = self.manager.get(h) else {
            return 0.0;
        };
        let units = Units::parse(&obj.str_value("fontunits")).unwrap_or(Units::Points);
        convert_font_size(
            obj.f64_value("fontsize").unwrap_or(10.0),
            units,
            Units::Pixels,
            self.font_reference_height(h),
            self.screen_dpi(),
        )
    }

    fn measure_string(&self, h: Handle, rotation: f64) -> (f64, f64) {
        let Some(obj) = self.manager.get(h) else {
            return (0.0, 0.0);
        };
        let lines = obj.value("string").text_lines();
        if lines.is_empty() {
            return (0.0, 0.0);
        }
        let font_name = obj.str_value("fontname");
        let interpreter = match obj.str_value("interpreter") {
            s if s.is_empty() => "none".to_string(),
            s => s,
        };
        self.measurer
            .measure(&TextRequest {
                lines: &lines,
                font_name: &font_name,
                font_size: self.font_pixels(h),
                rotation,
                interpreter: &interpreter,
            })
            .unwrap_or((0.0, 0.0))
    }

    /// Recompute a text's `extent` from its string, font, alignment and
    /// position, in the text's own units.
    pub(super) fn update_text_extent(&mut self, h: Handle) {
        let Some(obj) = self.manager.get(h) else {
            return;
        };
        if obj.kind() != ObjectKind::Text {
            return;
        }
        let units = Units::parse(&obj.str_value("units")).unwrap_or(Units::Data);
        let pos = obj.numbers("position");
        let hf = horizontal_fraction(&obj.str_value("horizontalalignment"));
        let vf = vertical_fraction(&obj.str_value("verticalalignment"));
        let rotation = obj.f64_value("rotation").unwrap_or(0.0);
        let (w, height) = self.measure_string(h, rotation);
        let frame = self.text_frame(h);
        let dpi = self.screen_dpi();

        let anchor = frame.to_screen(&pos, units, dpi);
        let left = anchor.x - w * hf;
        let top = anchor.y - height * vf;
        let extent = if units == Units::Data {
            let a = frame.transform.untransform(left, top + height, anchor.z, true);
            let b = frame.transform.untransform(left + w, top, anchor.z, true);
            vec![a.x.min(b.x), a.y.min(b.y), (b.x - a.x).abs(), (b.y - a.y).abs()]
        } else {
            let [bx, by, _, bh] = frame.bounding_box;
            let ll = [left - bx + 1.0, by + bh - (top + height) + 1.0, w, height];
            convert_position(&ll, Units::Pixels, units, frame.size(), dpi)
        };
        self.store_derived(h, "extent", Value::row(&extent));
    }

    fn convert_text_position(&mut self, h: Handle, old: &Value) {
        let Some(obj) = self.manager.get(h) else {
            return;
        };
        let (Some(from), Some(to)) = (
            old.as_str().and_then(Units::parse),
            Units::parse(&obj.str_value("units")),
        ) else {
            return;
        };
        let pos = obj.numbers("position");
        let frame = self.text_frame(h);
        let dpi = self.screen_dpi();
        let screen = frame.to_screen(&pos, from, dpi);
        let converted = frame.from_screen(screen, to, pos.len(), dpi);
        self.store_derived(h, "position", Value::row(&converted));
    }

    /// Re-express `fontsize` after `fontunits` changed from `old`.
    pub(super) fn convert_font_units(&mut self, h: Handle, old: &Value) {
        let Some(obj) = self.manager.get(h) else {
            return;
        };
        let (Some(from), Some(to)) = (
            old.as_str().and_then(Units::parse),
            Units::parse(&obj.str_value("fontunits")),
        ) else {
            return;
        };
        let Some(size) = obj.f64_value("fontsize") else {
            return;
        };
        let converted = convert_font_size(
            size,
            from,
            to,
            self.font_reference_height(h),
            self.screen_dpi(),
        );
        self.store_derived(h, "fontsize", Value::Num(converted));
    }

    pub(super) fn text_hook(&mut self, h: Handle, key: &str, old: &Value) {
        match key {
            "position" => {
                self.store_derived(h, "positionmode", Value::from("manual"));
                self.update_data_cache(h);
                self.update_text_extent(h);
                self.update_parent_limits(h);
            }
            "rotation" | "horizontalalignment" | "verticalalignment" => {
                self.store_derived(h, &format!("{key}mode"), Value::from("manual"));
                self.update_text_extent(h);
            }
            "units" => {
                self.convert_text_position(h, old);
                self.update_data_cache(h);
                self.update_text_extent(h);
                self.update_parent_limits(h);
            }
            "fontunits" => self.convert_font_units(h, old),
            "string" | "fontsize" | "fontname" | "fontangle" | "fontweight" | "interpreter" => {
                self.update_text_extent(h);
                let autopos = self
                    .manager
                    .get(h)
                    .map(|o| o.str_value("__autopos_tag__") != "none")
                    .unwrap_or(false);
                if autopos {
                    if let Some(axes) = self.ancestor_of_kind(h, ObjectKind::Axes) {
                        self.update_label_positions(axes);
                    }
                }
            }
            _ => {}
        }
    }

    /// A uicontrol's `position` in container pixels.
    fn ui_pixel_position(&self, h: Handle) -> Vec<f64> {
        let Some(obj) = self.manager.get(h) else {
            return vec![0.0; 4];
        };
        let pos = obj.numbers("position");
        if pos.len() != 4 {
            return vec![0.0; 4];
        }
        let units = Units::parse(&obj.str_value("units")).unwrap_or(Units::Pixels);
        let container = self.container_pixel_size(obj.parent().unwrap_or(Handle::ROOT));
        convert_position(&pos, units, Units::Pixels, container, self.screen_dpi())
    }

    /// `extent` of a uicontrol: the size of its string, in its own units.
    pub(super) fn update_ui_extent(&mut self, h: Handle) {
        let Some(obj) = self.manager.get(h) else {
            return;
        };
        if obj.kind() != ObjectKind::UiControl {
            return;
        }
        let units = Units::parse(&obj.str_value("units")).unwrap_or(Units::Pixels);
        let container = self.container_pixel_size(obj.parent().unwrap_or(Handle::ROOT));
        let (w, height) = self.measure_string(h, 0.0);
        let size = convert_position(
            &[1.0, 1.0, w, height],
            Units::Pixels,
            units,
            container,
            self.screen_dpi(),
        );
        self.store_derived(h, "extent", Value::row(&[0.0, 0.0, size[2], size[3]]));
    }

    pub(super) fn ui_hook(&mut self, h: Handle, kind: ObjectKind, key: &str, old: &Value) {
        match key {
            "units" => {
                self.convert_container_positions(h, old, &["position"]);
                self.update_ui_extent(h);
            }
            "fontunits" => self.convert_font_units(h, old),
            "position" if kind == ObjectKind::UiControl => self.update_ui_extent(h),
            "position" => {
                for name in ["resizefcn", "sizechangedfcn"] {
                    if let Err(err) = self.post_callback(h, name, Value::Empty) {
                        log::debug!(target: "runmat_graphics", "{name} of {h} not posted: {err}");
                    }
                }
                self.refresh_container(h);
            }
            "string" | "fontsize" | "fontname" | "fontangle" | "fontweight" => {
                self.update_ui_extent(h)
            }
            "selectedobject" if kind == ObjectKind::UiButtonGroup => {
                if let Err(err) = self.post_callback(h, "selectionchangedfcn", old.clone()) {
                    log::debug!(target: "runmat_graphics", "selectionchangedfcn of {h} not posted: {err}");
                }
            }
            _ => {}
        }
    }
}
