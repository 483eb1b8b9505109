//! Data-to-pixel transform pipeline for axes.
//!
//! Coordinates are first mapped through a per-axis [`Scaler`] (identity or
//! `log10`), then through a 4x4 matrix chain: plot-box normalisation, view
//! (eye/center/up), projection (view angle) and viewport (pixel bounding box).

use glam::{DMat4, DVec3, DVec4};

/// Per-axis coordinate scaling applied before the matrix pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scaler {
    #[default]
    Linear,
    Log,
    /// Logarithmic axis whose range is entirely negative; mirrored so that
    /// ordering is preserved.
    NegLog,
}

impl Scaler {
    /// Pick the scaler for an axis from its scale flag and current limits.
    pub fn for_axis(log_scale: bool, limits: [f64; 2]) -> Self {
        if !log_scale {
            Scaler::Linear
        } else if limits[0] < 0.0 && limits[1] <= 0.0 {
            Scaler::NegLog
        } else {
            Scaler::Log
        }
    }

    pub fn scale(self, v: f64) -> f64 {
        match self {
            Scaler::Linear => v,
            Scaler::Log => v.log10(),
            Scaler::NegLog => -(-v).log10(),
        }
    }

    pub fn unscale(self, v: f64) -> f64 {
        match self {
            Scaler::Linear => v,
            Scaler::Log => 10f64.powf(v),
            Scaler::NegLog => -(10f64.powf(-v)),
        }
    }

    pub fn is_log(self) -> bool {
        self != Scaler::Linear
    }

    fn default_limits(self) -> [f64; 2] {
        match self {
            Scaler::Linear => [0.0, 1.0],
            Scaler::Log => [0.1, 1.0],
            Scaler::NegLog => [-1.0, -0.1],
        }
    }

    /// Scaled limits, substituting the default range when the limits are
    /// non-finite or collapse to a point.
    pub fn scale_limits(self, limits: [f64; 2]) -> [f64; 2] {
        let lo = self.scale(limits[0]);
        let hi = self.scale(limits[1]);
        if lo.is_finite() && hi.is_finite() && lo != hi {
            [lo, hi]
        } else {
            let d = self.default_limits();
            [self.scale(d[0]), self.scale(d[1])]
        }
    }
}

/// Forward and inverse data/pixel mapping for one axes.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsTransform {
    render: DMat4,
    render_inv: DMat4,
    scalers: [Scaler; 3],
    depth_range: [f64; 2],
}

impl Default for GraphicsTransform {
    fn default() -> Self {
        GraphicsTransform {
            render: DMat4::IDENTITY,
            render_inv: DMat4::IDENTITY,
            scalers: [Scaler::Linear; 3],
            depth_range: [0.0, 1.0],
        }
    }
}

impl GraphicsTransform {
    pub fn scalers(&self) -> [Scaler; 3] {
        self.scalers
    }

    /// Pixel-space depth range spanned by the plot box.
    pub fn depth_range(&self) -> [f64; 2] {
        self.depth_range
    }

    pub fn matrix(&self) -> DMat4 {
        self.render
    }

    /// Data coordinates to pixels. With `use_scale` false the input is taken
    /// to be already scaled (e.g. log10 applied).
    pub fn transform(&self, x: f64, y: f64, z: f64, use_scale: bool) -> DVec3 {
        let p = if use_scale {
            DVec3::new(
                self.scalers[0].scale(x),
                self.scalers[1].scale(y),
                self.scalers[2].scale(z),
            )
        } else {
            DVec3::new(x, y, z)
        };
        (self.render * p.extend(1.0)).truncate()
    }

    /// Pixels back to data coordinates at pixel depth `pz`.
    pub fn untransform(&self, px: f64, py: f64, pz: f64, use_scale: bool) -> DVec3 {
        let v = (self.render_inv * DVec4::new(px, py, pz, 1.0)).truncate();
        if use_scale {
            DVec3::new(
                self.scalers[0].unscale(v.x),
                self.scalers[1].unscale(v.y),
                self.scalers[2].unscale(v.z),
            )
        } else {
            v
        }
    }
}

/// Everything the camera pipeline reads from an axes. Camera fields are
/// `None` when the matching mode is `auto`.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraInput {
    pub limits: [[f64; 2]; 3],
    pub log_scale: [bool; 3],
    pub reversed: [bool; 3],
    pub plot_box: [f64; 3],
    pub view: [f64; 2],
    /// Pixel bounding box `[left, top, width, height]`, y growing downwards.
    pub bounding_box: [f64; 4],
    pub camera_position: Option<[f64; 3]>,
    pub camera_target: Option<[f64; 3]>,
    pub camera_up: Option<[f64; 3]>,
    pub view_angle: Option<f64>,
    /// Stretch to fill the bounding box (both aspect-ratio modes auto).
    pub stretch_to_fill: bool,
}

/// Result of the camera pipeline, including the derived camera properties.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraOutput {
    pub transform: GraphicsTransform,
    pub position: [f64; 3],
    pub target: [f64; 3],
    pub up: [f64; 3],
    pub view_angle: f64,
}

fn signum(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn arr(v: DVec3) -> [f64; 3] {
    [v.x, v.y, v.z]
}

fn unit_cube_extent(m: &DMat4) -> (DVec3, DVec3) {
    let mut min = DVec3::splat(f64::INFINITY);
    let mut max = DVec3::splat(f64::NEG_INFINITY);
    for i in 0..8 {
        let corner = DVec4::new(
            (i & 1) as f64,
            ((i >> 1) & 1) as f64,
            ((i >> 2) & 1) as f64,
            1.0,
        );
        let p = (*m * corner).truncate();
        min = min.min(p);
        max = max.max(p);
    }
    (min, max)
}

/// Run the full camera pipeline.
pub fn compute_camera(input: &CameraInput) -> CameraOutput {
    let scalers = [0, 1, 2].map(|i| Scaler::for_axis(input.log_scale[i], input.limits[i]));
    let lims = [0, 1, 2].map(|i| scalers[i].scale_limits(input.limits[i]));
    let dir = [0, 1, 2].map(|i| if input.reversed[i] { -1.0 } else { 1.0 });
    let origin = DVec3::new(
        lims[0][if dir[0] > 0.0 { 0 } else { 1 }],
        lims[1][if dir[1] > 0.0 { 0 } else { 1 }],
        lims[2][if dir[2] > 0.0 { 0 } else { 1 }],
    );
    let span = DVec3::new(
        lims[0][1] - lims[0][0],
        lims[1][1] - lims[1][0],
        lims[2][1] - lims[2][0],
    );
    let pb = DVec3::from_array(input.plot_box.map(|v| if v > 0.0 { v } else { 1.0 }));
    let dirv = DVec3::new(dir[0], dir[1], dir[2]);

    let to_scaled = |p: [f64; 3]| {
        DVec3::new(
            scalers[0].scale(p[0]),
            scalers[1].scale(p[1]),
            scalers[2].scale(p[2]),
        )
    };
    let from_scaled = |p: DVec3| {
        [
            scalers[0].unscale(p.x),
            scalers[1].unscale(p.y),
            scalers[2].unscale(p.z),
        ]
    };

    let auto_camera = input.camera_position.is_none()
        && input.camera_target.is_none()
        && input.camera_up.is_none()
        && input.view_angle.is_none();
    let warp = auto_camera && input.stretch_to_fill;

    let mut center = match input.camera_target {
        Some(t) => to_scaled(t),
        None => DVec3::new(
            (lims[0][0] + lims[0][1]) / 2.0,
            (lims[1][0] + lims[1][1]) / 2.0,
            (lims[2][0] + lims[2][1]) / 2.0,
        ),
    };
    let target = from_scaled(center);

    let [az_deg, el_deg] = input.view;
    let mut eye = match input.camera_position {
        Some(p) => to_scaled(p),
        None => {
            let d = 5.0 * pb.length();
            let mut e = DVec3::ZERO;
            if el_deg == 90.0 || el_deg == -90.0 {
                e.z = d * signum(el_deg);
            } else {
                let (az, el) = (az_deg.to_radians(), el_deg.to_radians());
                e.x = d * el.cos() * az.sin();
                e.y = -d * el.cos() * az.cos();
                e.z = d * el.sin();
            }
            e * span / (dirv * pb) + center
        }
    };
    let position = from_scaled(eye);

    let mut up = match input.camera_up {
        Some(u) => DVec3::from_array(u),
        None => {
            if el_deg == 90.0 || el_deg == -90.0 {
                let az = az_deg.to_radians();
                DVec3::new(
                    -signum(el_deg) * az.sin() * span.x / pb.x,
                    signum(el_deg) * az.cos() * span.y / pb.y,
                    0.0,
                )
            } else {
                DVec3::Z
            }
        }
    };
    let up_out = arr(up);

    let x_pre = DMat4::from_scale(pb)
        * DMat4::from_translation(DVec3::splat(-0.5))
        * DMat4::from_scale(dirv / span)
        * DMat4::from_translation(-origin);
    eye = (x_pre * eye.extend(1.0)).truncate();
    center = (x_pre * center.extend(1.0)).truncate();
    up *= pb / span;
    let forward = center - eye;

    let f = forward.normalize_or_zero();
    let mut up_n = up.normalize_or_zero();
    if f.dot(up_n).abs() > 1e-15 {
        let fa = 1.0 / (1.0 - f.z * f.z).sqrt();
        if fa.is_finite() {
            up_n *= fa;
        }
    }
    let s = f.cross(up_n);
    let u = s.cross(f);

    // Rows s, u and -f.
    let look = DMat4::from_cols(s.extend(0.0), u.extend(0.0), (-f).extend(0.0), DVec4::W)
        .transpose();
    let x_view = DMat4::from_scale(DVec3::new(1.0, 1.0, -1.0))
        * look
        * DMat4::from_translation(-eye)
        * DMat4::from_scale(pb)
        * DMat4::from_translation(DVec3::splat(-0.5));

    let (cmin, cmax) = unit_cube_extent(&x_view);
    let mut x_m = (cmax.x - cmin.x).max(f64::EPSILON);
    let mut y_m = (cmax.y - cmin.y).max(f64::EPSILON);

    let bb = input.bounding_box;
    let (bw, bh) = (bb[2].max(1.0), bb[3].max(1.0));
    let wide = bw / bh > x_m / y_m;

    let view_angle = match input.view_angle {
        Some(angle) => angle,
        None => {
            let af = if wide { 1.0 / y_m } else { 1.0 / x_m };
            2.0 * (1.0 / (2.0 * af * forward.length())).atan().to_degrees()
        }
    };
    let pf = 1.0 / (2.0 * (view_angle / 2.0).to_radians().tan() * forward.length());
    let x_projection = DMat4::from_scale(DVec3::new(pf, pf, 1.0));

    let translate =
        DMat4::from_translation(DVec3::new(bb[0] + bw / 2.0, bb[1] + bh / 2.0, 0.0));
    let x_viewport = if warp {
        x_m *= pf;
        y_m *= pf;
        translate * DMat4::from_scale(DVec3::new(bw / x_m, -bh / y_m, 1.0))
    } else {
        let pix = if auto_camera {
            if wide {
                bh
            } else {
                bw
            }
        } else {
            bw.min(bh)
        };
        translate * DMat4::from_scale(DVec3::new(pix, -pix, 1.0))
    };

    let normrender = x_viewport * x_projection * x_view;
    let (zmin, zmax) = unit_cube_extent(&normrender);
    let render = normrender * DMat4::from_scale(dirv / span) * DMat4::from_translation(-origin);

    CameraOutput {
        transform: GraphicsTransform {
            render,
            render_inv: render.inverse(),
            scalers,
            depth_range: [zmin.z, zmax.z],
        },
        position,
        target,
        up: up_out,
        view_angle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_input() -> CameraInput {
        CameraInput {
            limits: [[0.0, 1.0], [0.0, 1.0], [-1.0, 1.0]],
            log_scale: [false; 3],
            reversed: [false; 3],
            plot_box: [1.0, 1.0, 1.0],
            view: [0.0, 90.0],
            bounding_box: [0.0, 0.0, 400.0, 300.0],
            camera_position: None,
            camera_target: None,
            camera_up: None,
            view_angle: None,
            stretch_to_fill: true,
        }
    }

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).abs().max_element() < 1e-6
    }

    #[test]
    fn flat_view_fills_bounding_box() {
        let out = compute_camera(&flat_input());
        let t = &out.transform;
        let origin = t.transform(0.0, 0.0, 0.0, true);
        assert!(origin.x.abs() < 1e-6);
        assert!((origin.y - 300.0).abs() < 1e-6);
        let top_right = t.transform(1.0, 1.0, 0.0, true);
        assert!((top_right.x - 400.0).abs() < 1e-6);
        assert!(top_right.y.abs() < 1e-6);
        assert_eq!(out.target, [0.5, 0.5, 0.0]);
        assert_eq!(out.up, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn reversed_axis_flips_pixels() {
        let mut input = flat_input();
        input.reversed[0] = true;
        let t = compute_camera(&input).transform;
        assert!((t.transform(0.0, 0.0, 0.0, true).x - 400.0).abs() < 1e-6);
    }

    #[test]
    fn untransform_inverts_transform() {
        let mut input = flat_input();
        input.view = [-37.5, 30.0];
        input.log_scale[0] = true;
        input.limits[0] = [1.0, 100.0];
        let t = compute_camera(&input).transform;
        let p = t.transform(10.0, 0.25, 0.5, true);
        let back = t.untransform(p.x, p.y, p.z, true);
        assert!(close(back, DVec3::new(10.0, 0.25, 0.5)));
    }

    #[test]
    fn negative_log_axis_keeps_order() {
        let s = Scaler::for_axis(true, [-1000.0, -1.0]);
        assert_eq!(s, Scaler::NegLog);
        assert!(s.scale(-1000.0) < s.scale(-1.0));
        assert!((s.unscale(s.scale(-10.0)) + 10.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_limits_use_default_range() {
        assert_eq!(Scaler::Linear.scale_limits([2.0, 2.0]), [0.0, 1.0]);
        assert_eq!(Scaler::Log.scale_limits([0.0, 0.0]), [-1.0, 0.0]);
        let out = compute_camera(&CameraInput {
            limits: [[f64::NAN, f64::NAN], [0.0, 1.0], [0.0, 1.0]],
            ..flat_input()
        });
        let p = out.transform.transform(0.5, 0.5, 0.5, true);
        assert!(p.x.is_finite() && p.y.is_finite());
    }

    #[test]
    fn auto_view_angle_is_positive() {
        let mut input = flat_input();
        input.view = [-37.5, 30.0];
        let out = compute_camera(&input);
        assert!(out.view_angle > 0.0 && out.view_angle < 180.0);
        assert!(out.position[2] > 1.0);
    }
}
