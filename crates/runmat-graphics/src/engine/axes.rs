//! Axes derived state: data caches, automatic limits and ticks, the camera
//! transform, layout, automatic label placement and the zoom stack.

use glam::DVec3;

use crate::error::{GraphicsError, GraphicsResult};
use crate::handle::Handle;
use crate::kinds::ObjectKind;
use crate::object::{AxesLayout, AxisOrientation, DataCache, GraphicsObject, LimitAxis, ZoomSnapshot};
use crate::ticks::{axis_limits, calc_ticks, color_limits, tick_labels, DataLimits};
use crate::toolkit::TextRequest;
use crate::transform::{compute_camera, CameraInput, Scaler};
use crate::units::{convert_font_size, convert_position, Units};
use crate::value::Value;

use super::{GraphicsEngine, Origin};

/// Which axes `zoom` and `pan` act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomMode {
    Both,
    Horizontal,
    Vertical,
}

impl ZoomMode {
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "both" => Some(ZoomMode::Both),
            "horizontal" => Some(ZoomMode::Horizontal),
            "vertical" => Some(ZoomMode::Vertical),
            _ => None,
        }
    }

    fn axes(self) -> &'static [&'static str] {
        match self {
            ZoomMode::Both => &["x", "y"],
            ZoomMode::Horizontal => &["x"],
            ZoomMode::Vertical => &["y"],
        }
    }
}

/// Properties saved by the first zoom/pan/rotate and restored by `unzoom`.
/// Limits precede their mode switches so restoring `auto` recomputes.
const ZOOM_STATE: [&str; 7] = [
    "xlim", "ylim", "zlim", "view", "xlimmode", "ylimmode", "zlimmode",
];

fn limit_guard(axis: LimitAxis) -> &'static str {
    match axis {
        LimitAxis::X => "xlim",
        LimitAxis::Y => "ylim",
        LimitAxis::Z => "zlim",
        LimitAxis::C => "clim",
        LimitAxis::A => "alim",
    }
}

fn pair(values: &[f64], fallback: [f64; 2]) -> [f64; 2] {
    match values {
        [a, b, ..] => [*a, *b],
        _ => fallback,
    }
}

fn triple(values: &[f64], fallback: [f64; 3]) -> [f64; 3] {
    match values {
        [a, b, c, ..] => [*a, *b, *c],
        _ => fallback,
    }
}

fn limits_of(obj: &GraphicsObject, name: &str) -> [f64; 2] {
    pair(&obj.numbers(name), [0.0, 1.0])
}

fn classify(d: DVec3) -> AxisOrientation {
    let flat_x = d.x.abs() < 0.5;
    let flat_y = d.y.abs() < 0.5;
    match (flat_x, flat_y) {
        (true, true) => AxisOrientation::Depth,
        (false, true) => AxisOrientation::Horizontal,
        (true, false) => AxisOrientation::Vertical,
        (false, false) => AxisOrientation::Any,
    }
}

/// `[x0, xn]` widened by half a pixel on each side for `n` samples.
fn image_extent(ends: &[f64], n: usize, fallback: [f64; 2]) -> [f64; 2] {
    let [a, b] = pair(ends, fallback);
    let (lo, hi) = (a.min(b), a.max(b));
    let half = if n > 1 {
        (hi - lo) / (2.0 * (n as f64 - 1.0))
    } else {
        0.5
    };
    [lo - half, hi + half]
}

impl GraphicsEngine {
    // ----- data caches -------------------------------------------------------

    /// Recompute the extrema of `h`'s data arrays.
    pub(super) fn update_data_cache(&mut self, h: Handle) {
        let Some(obj) = self.manager.get(h) else {
            return;
        };
        let nums = |name: &str| obj.numbers(name);
        let mut cache = DataCache::default();
        match obj.kind() {
            ObjectKind::Line => {
                cache.set(LimitAxis::X, DataLimits::from_data(&nums("xdata")));
                cache.set(LimitAxis::Y, DataLimits::from_data(&nums("ydata")));
                cache.set(LimitAxis::Z, DataLimits::from_data(&nums("zdata")));
            }
            ObjectKind::Image => {
                let cdata = obj.value("cdata").to_tensor();
                let (rows, cols) = cdata
                    .as_ref()
                    .map(|t| (t.shape[0], t.shape.get(1).copied().unwrap_or(1)))
                    .unwrap_or((0, 0));
                let x = image_extent(&nums("xdata"), cols, [1.0, cols.max(1) as f64]);
                let y = image_extent(&nums("ydata"), rows, [1.0, rows.max(1) as f64]);
                cache.set(LimitAxis::X, DataLimits::from_data(&x));
                cache.set(LimitAxis::Y, DataLimits::from_data(&y));
                let rgb = cdata.as_ref().map(|t| t.ndims() == 3).unwrap_or(false);
                if !rgb && obj.str_value("cdatamapping") == "scaled" {
                    cache.set(LimitAxis::C, DataLimits::from_data(&nums("cdata")));
                }
                if obj.str_value("alphadatamapping") == "scaled" {
                    cache.set(LimitAxis::A, DataLimits::from_data(&nums("alphadata")));
                }
            }
            ObjectKind::Surface => {
                cache.set(LimitAxis::X, DataLimits::from_data(&nums("xdata")));
                cache.set(LimitAxis::Y, DataLimits::from_data(&nums("ydata")));
                cache.set(LimitAxis::Z, DataLimits::from_data(&nums("zdata")));
                let rgb = obj
                    .value("cdata")
                    .to_tensor()
                    .map(|t| t.ndims() == 3)
                    .unwrap_or(false);
                if !rgb && obj.str_value("cdatamapping") == "scaled" {
                    cache.set(LimitAxis::C, DataLimits::from_data(&nums("cdata")));
                }
                if obj.str_value("alphadatamapping") == "scaled" {
                    cache.set(LimitAxis::A, DataLimits::from_data(&nums("alphadata")));
                }
            }
            ObjectKind::Patch => {
                cache.set(LimitAxis::X, DataLimits::from_data(&nums("xdata")));
                cache.set(LimitAxis::Y, DataLimits::from_data(&nums("ydata")));
                cache.set(LimitAxis::Z, DataLimits::from_data(&nums("zdata")));
                let fvc = obj.value("facevertexcdata").to_tensor();
                if let Some(t) = fvc.filter(|t| t.cols == 1) {
                    cache.set(LimitAxis::C, DataLimits::from_data(&t.data));
                }
                cache.set(
                    LimitAxis::A,
                    DataLimits::from_data(&nums("facevertexalphadata")),
                );
            }
            ObjectKind::Text => {
                if obj.str_value("units") == "data" {
                    let pos = nums("position");
                    for (axis, v) in [LimitAxis::X, LimitAxis::Y, LimitAxis::Z].iter().zip(&pos) {
                        cache.set(*axis, DataLimits::from_data(&[*v]));
                    }
                }
            }
            ObjectKind::HgGroup => {
                for axis in LimitAxis::ALL {
                    cache.set(axis, self.collect_child_limits(h, axis));
                }
            }
            _ => return,
        }
        if let Some(slot) = self.manager.get_mut(h).and_then(|o| o.data_cache_mut()) {
            *slot = cache;
        }
    }

    /// Propagate `h`'s data change to the axes above it.
    pub(super) fn update_parent_limits(&mut self, h: Handle) {
        if let Some(parent) = self.manager.get(h).and_then(|o| o.parent()) {
            self.refresh_limits_from(parent);
        }
    }

    /// Recompute limits starting at a container: groups refresh their own
    /// cache and pass the change up, axes recompute their limits.
    pub(super) fn refresh_limits_from(&mut self, owner: Handle) {
        match self.manager.kind_of(owner) {
            Some(ObjectKind::HgGroup) => {
                self.update_data_cache(owner);
                self.update_parent_limits(owner);
            }
            Some(ObjectKind::Axes) => self.update_all_limits(owner),
            _ => {}
        }
    }

    fn collect_child_limits(&self, parent: Handle, axis: LimitAxis) -> DataLimits {
        let mut out = DataLimits::default();
        let Some(obj) = self.manager.get(parent) else {
            return out;
        };
        let include = format!("{}liminclude", axis.prefix());
        for child in obj.children() {
            let Some(c) = self.manager.get(*child) else {
                continue;
            };
            if !c.is_on("visible") || (c.properties().contains(&include) && !c.is_on(&include)) {
                continue;
            }
            if let Some(cache) = c.data_cache() {
                out.merge(cache.get(axis));
            }
        }
        out
    }

    // ----- limits and ticks --------------------------------------------------

    pub(super) fn update_all_limits(&mut self, ax: Handle) {
        for axis in LimitAxis::ALL {
            self.update_axis_limits(ax, axis);
        }
        self.update_transform(ax);
    }

    fn update_axis_limits(&mut self, ax: Handle, axis: LimitAxis) {
        let Some(_guard) = self.guards.enter(ax, limit_guard(axis)) else {
            return;
        };
        let Some(obj) = self.manager.get(ax) else {
            return;
        };
        let p = axis.prefix();
        if obj.is_auto(&format!("{p}lim")) {
            let data = self.collect_child_limits(ax, axis);
            let limits = match axis {
                LimitAxis::C | LimitAxis::A => color_limits(&data),
                _ => axis_limits(&data, obj.str_value(&format!("{p}scale")) == "log"),
            };
            self.store_derived(ax, &format!("{p}lim"), Value::row(&limits));
        }
        if matches!(axis, LimitAxis::X | LimitAxis::Y | LimitAxis::Z) {
            self.refresh_ticks(ax, axis);
        }
    }

    /// Recompute automatic ticks, minor ticks and tick labels of one axis.
    fn refresh_ticks(&mut self, ax: Handle, axis: LimitAxis) {
        self.compute_ticks(ax, axis, true);
    }

    /// With `grow` off, automatic limits stay as they are and the ticks are
    /// trimmed to them.
    fn compute_ticks(&mut self, ax: Handle, axis: LimitAxis, grow: bool) {
        let Some(obj) = self.manager.get(ax) else {
            return;
        };
        let p = axis.prefix();
        let lim_name = format!("{p}lim");
        let limits = limits_of(obj, &lim_name);
        let limits_auto = grow && obj.is_auto(&lim_name);
        let log = obj.str_value(&format!("{p}scale")) == "log";
        let tick_auto = obj.is_auto(&format!("{p}tick"));
        let label_auto = obj.is_auto(&format!("{p}ticklabel"));
        let manual_ticks = obj.numbers(&format!("{p}tick"));
        let layout = calc_ticks(limits, limits_auto, log);

        if limits_auto && layout.limits != limits {
            self.store_derived(ax, &lim_name, Value::row(&layout.limits));
        }
        let ticks = if tick_auto {
            let value = if layout.ticks.is_empty() {
                Value::Empty
            } else {
                Value::row(&layout.ticks)
            };
            self.store_derived(ax, &format!("{p}tick"), value);
            layout.ticks
        } else {
            manual_ticks
        };
        let minor = if layout.minor.is_empty() {
            Value::Empty
        } else {
            Value::row(&layout.minor)
        };
        self.store_derived(ax, &format!("{p}minortickvalues"), minor);
        if label_auto {
            self.store_derived(
                ax,
                &format!("{p}ticklabel"),
                Value::string_cell(&tick_labels(&ticks, log)),
            );
        }
    }

    // ----- transform and layout ----------------------------------------------

    /// Pixel bounding box `[left, top, width, height]` of the axes' plot box
    /// inside its container.
    pub(super) fn axes_pixel_box(&self, ax: Handle) -> [f64; 4] {
        let Some(obj) = self.manager.get(ax) else {
            return [0.0, 0.0, 1.0, 1.0];
        };
        let container = self.container_pixel_size(obj.parent().unwrap_or(Handle::ROOT));
        let units = Units::parse(&obj.str_value("units")).unwrap_or(Units::Normalized);
        let pos = obj.numbers("position");
        if pos.len() != 4 {
            return [0.0, 0.0, container[0], container[1]];
        }
        let px = convert_position(&pos, units, Units::Pixels, container, self.screen_dpi());
        [
            px[0] - 1.0,
            container[1] - (px[1] - 1.0) - px[3],
            px[2],
            px[3],
        ]
    }

    fn camera_input(&self, ax: Handle) -> Option<CameraInput> {
        let obj = self.manager.get(ax)?;
        let manual3 = |name: &str| {
            (!obj.is_auto(name)).then(|| triple(&obj.numbers(name), [0.0, 0.0, 0.0]))
        };
        Some(CameraInput {
            limits: [
                limits_of(obj, "xlim"),
                limits_of(obj, "ylim"),
                limits_of(obj, "zlim"),
            ],
            log_scale: ["x", "y", "z"].map(|p| obj.str_value(&format!("{p}scale")) == "log"),
            reversed: ["x", "y", "z"].map(|p| obj.str_value(&format!("{p}dir")) == "reverse"),
            plot_box: triple(&obj.numbers("plotboxaspectratio"), [1.0, 1.0, 1.0]),
            view: pair(&obj.numbers("view"), [0.0, 90.0]),
            bounding_box: self.axes_pixel_box(ax),
            camera_position: manual3("cameraposition"),
            camera_target: manual3("cameratarget"),
            camera_up: manual3("cameraupvector"),
            view_angle: (!obj.is_auto("cameraviewangle"))
                .then(|| obj.f64_value("cameraviewangle"))
                .flatten(),
            stretch_to_fill: obj.is_auto("dataaspectratio")
                && obj.is_auto("plotboxaspectratio")
                && obj.is_auto("cameraviewangle"),
        })
    }

    /// Rebuild the data-to-pixel transform, the automatic camera properties,
    /// the layout and the automatic label positions.
    pub(super) fn update_transform(&mut self, ax: Handle) {
        let Some(_guard) = self.guards.enter(ax, "transform") else {
            return;
        };
        self.update_aspect_ratios(ax);
        let Some(input) = self.camera_input(ax) else {
            return;
        };
        let out = compute_camera(&input);
        let Some(obj) = self.manager.get(ax) else {
            return;
        };
        let derived: Vec<(&str, Value)> = [
            ("cameraposition", Value::row(&out.position)),
            ("cameratarget", Value::row(&out.target)),
            ("cameraupvector", Value::row(&out.up)),
            ("cameraviewangle", Value::Num(out.view_angle)),
        ]
        .into_iter()
        .filter(|(name, _)| obj.is_auto(name))
        .collect();
        for (name, value) in derived {
            self.store_derived(ax, name, value);
        }
        if let Some(state) = self.manager.get_mut(ax).and_then(|o| o.axes_state_mut()) {
            state.transform = out.transform;
        }
        self.update_layout(ax);
        self.update_label_positions(ax);
    }

    /// Keep data and plot-box aspect ratios consistent with the limits.
    fn update_aspect_ratios(&mut self, ax: Handle) {
        let Some(_guard) = self.guards.enter(ax, "aspectratios") else {
            return;
        };
        let Some(obj) = self.manager.get(ax) else {
            return;
        };
        let scalers = ["x", "y", "z"].map(|p| {
            let l = limits_of(obj, &format!("{p}lim"));
            Scaler::for_axis(obj.str_value(&format!("{p}scale")) == "log", l)
        });
        let lims = [0, 1, 2].map(|i| {
            let name = ["xlim", "ylim", "zlim"][i];
            scalers[i].scale_limits(limits_of(obj, name))
        });
        let spans = lims.map(|l| (l[1] - l[0]).abs().max(f64::EPSILON));
        let da = triple(&obj.numbers("dataaspectratio"), [1.0, 1.0, 1.0]);
        let pba = triple(&obj.numbers("plotboxaspectratio"), [1.0, 1.0, 1.0]);
        let normalized = |factors: [f64; 3]| {
            let vals = [0, 1, 2].map(|i| spans[i] / factors[i].max(f64::EPSILON));
            let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
            vals.map(|v| v / min)
        };

        match (obj.is_auto("dataaspectratio"), obj.is_auto("plotboxaspectratio")) {
            (true, pba_auto) => {
                let pba = if pba_auto { [1.0, 1.0, 1.0] } else { pba };
                if pba_auto {
                    self.store_derived(ax, "plotboxaspectratio", Value::row(&pba));
                }
                self.store_derived(ax, "dataaspectratio", Value::row(&normalized(pba)));
            }
            (false, true) => {
                self.store_derived(ax, "plotboxaspectratio", Value::row(&normalized(da)));
            }
            (false, false) => {
                let all_auto = ["xlim", "ylim", "zlim"].iter().all(|n| obj.is_auto(n));
                if !all_auto {
                    return;
                }
                let s = (0..3)
                    .map(|i| spans[i] / (pba[i] * da[i]))
                    .fold(0.0, f64::max);
                // Widen in scaled space so log axes keep their decades.
                let widened = [0, 1, 2].map(|i| {
                    let mid = (lims[i][0] + lims[i][1]) / 2.0;
                    let half = s * pba[i] * da[i] / 2.0;
                    let a = scalers[i].unscale(mid - half);
                    let b = scalers[i].unscale(mid + half);
                    [a.min(b), a.max(b)]
                });
                for (axis, limits) in [LimitAxis::X, LimitAxis::Y, LimitAxis::Z]
                    .into_iter()
                    .zip(widened)
                {
                    self.store_derived(ax, &format!("{}lim", axis.prefix()), Value::row(&limits));
                    self.compute_ticks(ax, axis, false);
                }
            }
        }
    }

    fn update_layout(&mut self, ax: Handle) {
        let bounding_box = self.axes_pixel_box(ax);
        let Some(obj) = self.manager.get(ax) else {
            return;
        };
        let Some(state) = obj.axes_state() else {
            return;
        };
        let t = &state.transform;
        let scalers = t.scalers();
        let [xs, ys, zs] = [0, 1, 2].map(|i| {
            let name = ["xlim", "ylim", "zlim"][i];
            scalers[i].scale_limits(limits_of(obj, name))
        });
        let at = |x: f64, y: f64, z: f64| t.transform(x, y, z, false);
        let origin = at(xs[0], ys[0], zs[0]);
        let orientation = [
            classify(at(xs[1], ys[0], zs[0]) - origin),
            classify(at(xs[0], ys[1], zs[0]) - origin),
            classify(at(xs[0], ys[0], zs[1]) - origin),
        ];
        let x_on_top = obj.str_value("xaxislocation") == "top";
        let y_on_right = obj.str_value("yaxislocation") == "right";
        let mid = |l: [f64; 2]| (l[0] + l[1]) / 2.0;

        let pick = |candidates: [(f64, f64); 4], key: &dyn Fn(f64, f64) -> f64, largest: bool| {
            let mut best = candidates[0];
            let mut best_key = key(best.0, best.1);
            for c in &candidates[1..] {
                let k = key(c.0, c.1);
                if (largest && k > best_key + 1e-9) || (!largest && k < best_key - 1e-9) {
                    best = *c;
                    best_key = k;
                }
            }
            best
        };
        let x_anchor = pick(
            [(ys[0], zs[0]), (ys[1], zs[0]), (ys[0], zs[1]), (ys[1], zs[1])],
            &|y, z| at(mid(xs), y, z).y,
            !x_on_top,
        );
        let y_anchor = pick(
            [(xs[0], zs[0]), (xs[1], zs[0]), (xs[0], zs[1]), (xs[1], zs[1])],
            &|x, z| at(x, mid(ys), z).x,
            y_on_right,
        );
        let z_anchor = pick(
            [(xs[0], ys[0]), (xs[1], ys[0]), (xs[0], ys[1]), (xs[1], ys[1])],
            &|x, y| at(x, y, mid(zs)).x,
            false,
        );
        let flat = orientation[2] == AxisOrientation::Depth;
        let tick_length = obj.numbers("ticklength");
        let ratio = tick_length
            .get(if flat { 0 } else { 1 })
            .copied()
            .unwrap_or(0.01);
        let layout = AxesLayout {
            orientation,
            planes: [y_anchor.0, x_anchor.0, x_anchor.1],
            tick_anchor: [
                [x_anchor.0, x_anchor.1],
                [y_anchor.0, y_anchor.1],
                [z_anchor.0, z_anchor.1],
            ],
            x_on_top,
            y_on_right,
            bounding_box,
            tick_length: ratio * bounding_box[2].max(bounding_box[3]),
        };
        if let Some(state) = self.manager.get_mut(ax).and_then(|o| o.axes_state_mut()) {
            state.layout = layout;
        }
    }

    fn max_label_extent(&self, labels: &[String], font_name: &str, font_px: f64) -> (f64, f64) {
        labels
            .iter()
            .filter_map(|label| {
                let lines = [label.clone()];
                self.measurer.measure(&TextRequest {
                    lines: &lines,
                    font_name,
                    font_size: font_px,
                    rotation: 0.0,
                    interpreter: "tex",
                })
            })
            .fold((0.0, 0.0), |(w, h), (lw, lh)| (f64::max(w, lw), f64::max(h, lh)))
    }

    /// Place the automatic axes labels just outside the tick labels.
    pub(super) fn update_label_positions(&mut self, ax: Handle) {
        let Some(_guard) = self.guards.enter(ax, "labels") else {
            return;
        };
        let Some(obj) = self.manager.get(ax) else {
            return;
        };
        let Some(state) = obj.axes_state() else {
            return;
        };
        let t = &state.transform;
        let layout = &state.layout;
        let bb = layout.bounding_box;
        let dpi = self.screen_dpi();
        let font_units = Units::parse(&obj.str_value("fontunits")).unwrap_or(Units::Points);
        let font_px = convert_font_size(
            obj.f64_value("fontsize").unwrap_or(10.0),
            font_units,
            Units::Pixels,
            bb[3],
            dpi,
        );
        let font_name = obj.str_value("fontname");
        let tick_text = |p: &str| obj.value(&format!("{p}ticklabel")).text_lines();
        let (_, x_label_h) = self.max_label_extent(&tick_text("x"), &font_name, font_px);
        let (y_label_w, _) = self.max_label_extent(&tick_text("y"), &font_name, font_px);
        let (z_label_w, _) = self.max_label_extent(&tick_text("z"), &font_name, font_px);
        let tick_out = if obj.str_value("tickdir") == "out" {
            layout.tick_length
        } else {
            0.0
        };
        let margin = font_px / 2.0;
        let scalers = t.scalers();
        let [xs, ys, zs] = [0, 1, 2].map(|i| {
            let name = ["xlim", "ylim", "zlim"][i];
            scalers[i].scale_limits(limits_of(obj, name))
        });
        let mid = |l: [f64; 2]| (l[0] + l[1]) / 2.0;
        let to_data = |p: DVec3| {
            let v = t.untransform(p.x, p.y, p.z, true);
            [v.x, v.y, v.z]
        };

        let mut placements: Vec<(&str, [f64; 3], f64, &str)> = Vec::with_capacity(4);
        let [xa, ya, za] = layout.tick_anchor;

        let p = t.transform(mid(xs), xa[0], xa[1], false);
        let off = tick_out + x_label_h + margin;
        let (py, valign) = if layout.x_on_top {
            (p.y - off, "bottom")
        } else {
            (p.y + off, "top")
        };
        placements.push(("xlabel", to_data(DVec3::new(p.x, py, p.z)), 0.0, valign));

        let p = t.transform(ya[0], mid(ys), ya[1], false);
        let off = tick_out + y_label_w + margin;
        let (px, valign) = if layout.y_on_right {
            (p.x + off, "top")
        } else {
            (p.x - off, "bottom")
        };
        placements.push(("ylabel", to_data(DVec3::new(px, p.y, p.z)), 90.0, valign));

        let p = t.transform(za[0], za[1], mid(zs), false);
        let px = p.x - (tick_out + z_label_w + margin);
        placements.push(("zlabel", to_data(DVec3::new(px, p.y, p.z)), 90.0, "bottom"));

        let top = t.transform(mid(xs), mid(ys), zs[1], false);
        let above = if layout.x_on_top {
            tick_out + x_label_h + 2.0 * font_px
        } else {
            0.0
        };
        let title = DVec3::new(bb[0] + bb[2] / 2.0, bb[1] - margin - above, top.z);
        placements.push(("title", to_data(title), 0.0, "bottom"));

        let updates: Vec<(Handle, Vec<(&str, Value)>)> = placements
            .into_iter()
            .filter_map(|(tag, position, rotation, valign)| {
                let label = obj.handle_value(tag)?;
                let text = self.manager.get(label)?;
                if text.str_value("units") != "data" {
                    return None;
                }
                let mut writes = Vec::new();
                if text.is_auto("position") {
                    writes.push(("position", Value::row(&position)));
                }
                if text.is_auto("rotation") {
                    writes.push(("rotation", Value::Num(rotation)));
                }
                if text.is_auto("horizontalalignment") {
                    writes.push(("horizontalalignment", Value::from("center")));
                }
                if text.is_auto("verticalalignment") {
                    writes.push(("verticalalignment", Value::from(valign)));
                }
                Some((label, writes))
            })
            .collect();
        for (label, writes) in updates {
            for (name, value) in writes {
                self.store_derived(label, name, value);
            }
            self.update_text_extent(label);
        }
    }

    /// Scale label font sizes with the axes font size.
    fn sync_label_fonts(&mut self, ax: Handle) {
        let Some(obj) = self.manager.get(ax) else {
            return;
        };
        let size = obj.f64_value("fontsize").unwrap_or(10.0);
        let label_mult = obj.f64_value("labelfontsizemultiplier").unwrap_or(1.1);
        let title_mult = obj.f64_value("titlefontsizemultiplier").unwrap_or(1.1);
        let labels: Vec<(Handle, f64)> = ["xlabel", "ylabel", "zlabel", "title"]
            .iter()
            .filter_map(|tag| {
                let mult = if *tag == "title" { title_mult } else { label_mult };
                obj.handle_value(tag).map(|h| (h, size * mult))
            })
            .collect();
        for (label, size) in labels {
            self.store_derived(label, "fontsize", Value::Num(size));
        }
    }

    // ----- property hooks ----------------------------------------------------

    pub(super) fn axes_hook(&mut self, ax: Handle, key: &str, old: &Value) {
        let axis = key
            .get(..1)
            .and_then(LimitAxis::from_prefix)
            .map(|a| (a, &key[1..]));
        match (axis, key) {
            (Some((a, "lim")), _) => {
                self.store_derived(ax, &format!("{key}mode"), Value::from("manual"));
                if matches!(a, LimitAxis::X | LimitAxis::Y | LimitAxis::Z) {
                    self.refresh_ticks(ax, a);
                    self.update_transform(ax);
                }
            }
            (Some((a, "limmode")), _) => {
                self.update_axis_limits(ax, a);
                self.update_transform(ax);
            }
            (Some((a, "scale")), _) => {
                self.update_axis_limits(ax, a);
                self.update_transform(ax);
            }
            (Some((a, "tick")), _) => {
                self.store_derived(ax, &format!("{key}mode"), Value::from("manual"));
                self.refresh_ticks(ax, a);
                self.update_label_positions(ax);
            }
            (Some((a, "tickmode" | "ticklabelmode")), _) => {
                self.refresh_ticks(ax, a);
                self.update_label_positions(ax);
            }
            (Some((_, "ticklabel")), _) => {
                self.store_derived(ax, &format!("{key}mode"), Value::from("manual"));
                self.update_label_positions(ax);
            }
            (Some((_, "dir")), _) => self.update_transform(ax),
            (Some((_, "label")), _) => self.replace_label(ax, key, old),
            (_, "title") => self.replace_label(ax, key, old),
            (
                _,
                "cameraposition" | "cameratarget" | "cameraupvector" | "cameraviewangle"
                | "dataaspectratio" | "plotboxaspectratio",
            ) => {
                self.store_derived(ax, &format!("{key}mode"), Value::from("manual"));
                self.update_transform(ax);
            }
            (_, "tickdir") => {
                self.store_derived(ax, "tickdirmode", Value::from("manual"));
                self.update_transform(ax);
            }
            (_, "fontsize" | "labelfontsizemultiplier" | "titlefontsizemultiplier") => {
                self.sync_label_fonts(ax);
                self.update_transform(ax);
            }
            (_, "units") => {
                self.convert_container_positions(ax, old, &["position", "outerposition"]);
            }
            (_, "fontunits") => self.convert_font_units(ax, old),
            (_, k)
                if k.ends_with("mode")
                    || matches!(
                        k,
                        "view"
                            | "projection"
                            | "position"
                            | "outerposition"
                            | "ticklength"
                            | "xaxislocation"
                            | "yaxislocation"
                            | "fontname"
                    ) =>
            {
                self.update_transform(ax)
            }
            _ => {}
        }
    }

    /// A new text was assigned to one of the automatic label slots.
    fn replace_label(&mut self, ax: Handle, tag: &str, old: &Value) {
        let new = self.manager.get(ax).and_then(|o| o.handle_value(tag));
        let old = Handle::from_value(old);
        if let Some(new) = new {
            let previous_parent = self.manager.get(new).and_then(|o| o.parent());
            if previous_parent != Some(ax) {
                if let Some(p) = previous_parent {
                    self.manager.remove_child(p, new);
                    self.refresh_limits_from(p);
                }
                self.manager.adopt(ax, new);
            }
            self.store_derived(new, "handlevisibility", Value::from("off"));
            self.store_derived(new, "__autopos_tag__", Value::from(tag));
        }
        if let Some(old) = old.filter(|o| Some(*o) != new && self.manager.contains(*o)) {
            if let Err(err) = self.delete(old) {
                log::debug!(target: "runmat_graphics", "old {tag} {old} not deleted: {err}");
            }
        }
        self.update_label_positions(ax);
    }

    // ----- zoom, pan and rotate ----------------------------------------------

    fn axes_or_err(&self, ax: Handle, builtin: &'static str) -> GraphicsResult<&GraphicsObject> {
        let obj = self.object_or_err(ax)?;
        if obj.kind() != ObjectKind::Axes {
            return Err(GraphicsError::usage(builtin, format!("{ax} is not an axes object")));
        }
        Ok(obj)
    }

    fn push_zoom_snapshot(&mut self, ax: Handle) {
        let Some(obj) = self.manager.get(ax) else {
            return;
        };
        if obj.axes_state().map(|s| s.zoom.is_some()).unwrap_or(true) {
            return;
        }
        let entries = ZOOM_STATE
            .iter()
            .map(|name| (name.to_string(), obj.value(name)))
            .collect();
        if let Some(state) = self.manager.get_mut(ax).and_then(|o| o.axes_state_mut()) {
            state.zoom = Some(ZoomSnapshot { entries });
        }
    }

    fn set_limits(&mut self, ax: Handle, prefix: &str, limits: [f64; 2]) -> GraphicsResult<()> {
        let sorted = [limits[0].min(limits[1]), limits[0].max(limits[1])];
        self.set_property(ax, &format!("{prefix}lim"), &Value::row(&sorted), Origin::User)
            .map(|_| ())
    }

    fn scaler_for(&self, ax: Handle, prefix: &str) -> (Scaler, [f64; 2]) {
        let obj = self.manager.get(ax);
        let limits = obj
            .map(|o| limits_of(o, &format!("{prefix}lim")))
            .unwrap_or([0.0, 1.0]);
        let log = obj
            .map(|o| o.str_value(&format!("{prefix}scale")) == "log")
            .unwrap_or(false);
        (Scaler::for_axis(log, limits), limits)
    }

    /// Zoom by `factor` about the centre of the current view.
    pub fn zoom(&mut self, ax: Handle, mode: ZoomMode, factor: f64) -> GraphicsResult<()> {
        self.axes_or_err(ax, "zoom")?;
        let center: Vec<f64> = ["x", "y"]
            .iter()
            .map(|p| {
                let (scaler, limits) = self.scaler_for(ax, p);
                let s = scaler.scale_limits(limits);
                scaler.unscale((s[0] + s[1]) / 2.0)
            })
            .collect();
        self.zoom_about_point(ax, mode, center[0], center[1], factor, true)
    }

    /// Zoom by `factor` keeping the data point `(x, y)` fixed.
    pub fn zoom_about_point(
        &mut self,
        ax: Handle,
        mode: ZoomMode,
        x: f64,
        y: f64,
        factor: f64,
        push_to_stack: bool,
    ) -> GraphicsResult<()> {
        self.axes_or_err(ax, "zoom")?;
        if factor.is_nan() || factor <= 0.0 {
            return Err(GraphicsError::usage("zoom", "FACTOR must be greater than 0"));
        }
        if push_to_stack {
            self.push_zoom_snapshot(ax);
        }
        for prefix in mode.axes() {
            let (scaler, limits) = self.scaler_for(ax, prefix);
            let s = scaler.scale_limits(limits);
            let c = scaler.scale(if *prefix == "x" { x } else { y });
            let new = [
                scaler.unscale(c - (c - s[0]) / factor),
                scaler.unscale(c + (s[1] - c) / factor),
            ];
            self.set_limits(ax, prefix, new)?;
        }
        Ok(())
    }

    /// Zoom to an explicit data region. Degenerate regions are ignored.
    pub fn zoom_to(&mut self, ax: Handle, xlim: [f64; 2], ylim: [f64; 2]) -> GraphicsResult<()> {
        self.axes_or_err(ax, "zoom")?;
        if xlim[0] == xlim[1] || ylim[0] == ylim[1] {
            log::warn!(target: "runmat_graphics", "zoom: ignoring degenerate region");
            return Ok(());
        }
        self.push_zoom_snapshot(ax);
        self.set_limits(ax, "x", xlim)?;
        self.set_limits(ax, "y", ylim)
    }

    /// Pan so that the data point `from` moves to `to`.
    pub fn translate(
        &mut self,
        ax: Handle,
        mode: ZoomMode,
        from: [f64; 2],
        to: [f64; 2],
        push_to_stack: bool,
    ) -> GraphicsResult<()> {
        self.axes_or_err(ax, "pan")?;
        if push_to_stack {
            self.push_zoom_snapshot(ax);
        }
        for prefix in mode.axes() {
            let i = usize::from(*prefix == "y");
            let (scaler, limits) = self.scaler_for(ax, prefix);
            let s = scaler.scale_limits(limits);
            let delta = scaler.scale(from[i]) - scaler.scale(to[i]);
            self.set_limits(
                ax,
                prefix,
                [scaler.unscale(s[0] + delta), scaler.unscale(s[1] + delta)],
            )?;
        }
        Ok(())
    }

    /// Orbit the view. Elevation is clamped to `[-90, 90]`, azimuth wraps.
    pub fn rotate_view(
        &mut self,
        ax: Handle,
        delta_azimuth: f64,
        delta_elevation: f64,
        push_to_stack: bool,
    ) -> GraphicsResult<()> {
        let obj = self.axes_or_err(ax, "rotate3d")?;
        let [az, el] = pair(&obj.numbers("view"), [0.0, 90.0]);
        if push_to_stack {
            self.push_zoom_snapshot(ax);
        }
        let el = (el + delta_elevation).clamp(-90.0, 90.0);
        let az = (az + delta_azimuth).rem_euclid(360.0);
        self.set_property(ax, "view", &Value::row(&[az, el]), Origin::User)
            .map(|_| ())
    }

    /// Restore the state saved before the first zoom.
    pub fn unzoom(&mut self, ax: Handle) -> GraphicsResult<()> {
        self.axes_or_err(ax, "zoom")?;
        let snapshot = self
            .manager
            .get_mut(ax)
            .and_then(|o| o.axes_state_mut())
            .and_then(|s| s.zoom.take());
        if let Some(snapshot) = snapshot {
            for (name, value) in snapshot.entries {
                self.set_property(ax, &name, &value, Origin::User)?;
            }
        }
        Ok(())
    }

    /// Forget the saved zoom state, restoring it first when asked.
    pub fn clear_zoom_stack(&mut self, ax: Handle, restore: bool) -> GraphicsResult<()> {
        if restore {
            return self.unzoom(ax);
        }
        if let Some(state) = self.manager.get_mut(ax).and_then(|o| o.axes_state_mut()) {
            state.zoom = None;
        }
        Ok(())
    }

    pub fn zoom_stack_is_empty(&self, ax: Handle) -> bool {
        self.manager
            .get(ax)
            .and_then(|o| o.axes_state())
            .map(|s| s.zoom.is_none())
            .unwrap_or(true)
    }
}
