//! Unit conversion for positions, font sizes and paper geometry.
//!
//! Pixel positions are 1-based: the pixel origin of a container is `(1, 1)`.

/// Length units understood by `units`, `fontunits` and `paperunits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Pixels,
    Normalized,
    Characters,
    Points,
    Inches,
    Centimeters,
    /// Axes data coordinates (text only); resolved through the axes transform.
    Data,
}

impl Units {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "pixels" => Some(Units::Pixels),
            "normalized" => Some(Units::Normalized),
            "characters" => Some(Units::Characters),
            "points" => Some(Units::Points),
            "inches" => Some(Units::Inches),
            "centimeters" => Some(Units::Centimeters),
            "data" => Some(Units::Data),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Units::Pixels => "pixels",
            Units::Normalized => "normalized",
            Units::Characters => "characters",
            Units::Points => "points",
            Units::Inches => "inches",
            Units::Centimeters => "centimeters",
            Units::Data => "data",
        }
    }

    /// Pixels per unit for the absolute units.
    fn pixels_per_unit(self, dpi: f64) -> Option<f64> {
        match self {
            Units::Points => Some(dpi / 72.0),
            Units::Inches => Some(dpi),
            Units::Centimeters => Some(dpi / 2.54),
            _ => None,
        }
    }
}

/// Pixel height of a character cell; width is half of it.
fn character_factor(dpi: f64) -> f64 {
    12.0 * dpi / 74.951
}

/// Convert a 2-, 3- or 4-element position between units. `parent` is the
/// container's pixel size, needed for `normalized`. `Data` is treated as
/// pixels here; callers map data coordinates themselves.
pub fn convert_position(pos: &[f64], from: Units, to: Units, parent: [f64; 2], dpi: f64) -> Vec<f64> {
    let rect = pos.len() == 4;
    let point = pos.len() == 2;
    let mut out = pos.to_vec();
    if from == to {
        return out;
    }

    match from {
        Units::Pixels | Units::Data => {}
        Units::Normalized => {
            out[0] = pos[0] * parent[0] + 1.0;
            out[1] = pos[1] * parent[1] + 1.0;
            if rect {
                out[2] = pos[2] * parent[0];
                out[3] = pos[3] * parent[1];
            }
        }
        Units::Characters => {
            let f = character_factor(dpi);
            out[0] = 0.5 * pos[0] * f;
            out[1] = pos[1] * f;
            if rect {
                out[2] = 0.5 * pos[2] * f;
                out[3] = pos[3] * f;
            }
        }
        absolute => {
            if let Some(f) = absolute.pixels_per_unit(dpi) {
                out[0] = pos[0] * f + 1.0;
                out[1] = pos[1] * f + 1.0;
                if rect {
                    out[2] = pos[2] * f;
                    out[3] = pos[3] * f;
                }
            }
        }
    }
    if !rect && !point && from != Units::Pixels && from != Units::Data && out.len() > 2 {
        out[2] = 0.0;
    }

    match to {
        Units::Pixels | Units::Data => {}
        Units::Normalized => {
            if parent[0] > 0.0 && parent[1] > 0.0 {
                out[0] = (out[0] - 1.0) / parent[0];
                out[1] = (out[1] - 1.0) / parent[1];
                if rect {
                    out[2] /= parent[0];
                    out[3] /= parent[1];
                }
            }
        }
        Units::Characters => {
            let f = character_factor(dpi);
            out[0] = 2.0 * out[0] / f;
            out[1] /= f;
            if rect {
                out[2] = 2.0 * out[2] / f;
                out[3] /= f;
            }
        }
        absolute => {
            if let Some(f) = absolute.pixels_per_unit(dpi) {
                out[0] = (out[0] - 1.0) / f;
                out[1] = (out[1] - 1.0) / f;
                if rect {
                    out[2] /= f;
                    out[3] /= f;
                }
            }
        }
    }
    if !rect && !point && to != Units::Pixels && to != Units::Data && out.len() > 2 {
        out[2] = 0.0;
    }
    out
}

/// Convert a font size through points. `parent_height` (pixels) is used for
/// `normalized`.
pub fn convert_font_size(size: f64, from: Units, to: Units, parent_height: f64, dpi: f64) -> f64 {
    if from == to {
        return size;
    }
    let points = match from {
        Units::Pixels => size * 72.0 / dpi,
        Units::Inches => size * 72.0,
        Units::Centimeters => size * 72.0 / 2.54,
        Units::Normalized => size * parent_height * 72.0 / dpi,
        _ => size,
    };
    match to {
        Units::Pixels => points * dpi / 72.0,
        Units::Inches => points / 72.0,
        Units::Centimeters => points / 72.0 * 2.54,
        Units::Normalized if parent_height > 0.0 => points * dpi / (parent_height * 72.0),
        Units::Normalized => 0.0,
        _ => points,
    }
}

/// Paper sizes as `(name, width, height, millimetres?)`; otherwise inches.
const PAPER_TYPES: &[(&str, f64, f64, bool)] = &[
    ("usletter", 8.5, 11.0, false),
    ("uslegal", 8.5, 14.0, false),
    ("tabloid", 11.0, 17.0, false),
    ("a0", 841.0, 1189.0, true),
    ("a1", 594.0, 841.0, true),
    ("a2", 420.0, 594.0, true),
    ("a3", 297.0, 420.0, true),
    ("a4", 210.0, 297.0, true),
    ("a5", 148.0, 210.0, true),
    ("b0", 1029.0, 1456.0, true),
    ("b1", 728.0, 1028.0, true),
    ("b2", 514.0, 728.0, true),
    ("b3", 364.0, 514.0, true),
    ("b4", 257.0, 364.0, true),
    ("b5", 182.0, 257.0, true),
    ("arch-a", 9.0, 12.0, false),
    ("arch-b", 12.0, 18.0, false),
    ("arch-c", 18.0, 24.0, false),
    ("arch-d", 24.0, 36.0, false),
    ("arch-e", 36.0, 48.0, false),
    ("a", 8.5, 11.0, false),
    ("b", 11.0, 17.0, false),
    ("c", 17.0, 22.0, false),
    ("d", 22.0, 34.0, false),
    ("e", 34.0, 43.0, false),
];

/// Inches per paper unit; `None` for `normalized`.
fn paper_unit_inches(units: Units) -> Option<f64> {
    match units {
        Units::Inches => Some(1.0),
        Units::Centimeters => Some(1.0 / 2.54),
        Units::Points => Some(1.0 / 72.0),
        _ => None,
    }
}

/// Portrait size of a named paper type in `units`; `None` for `<custom>` or
/// unknown names. Normalized paper is always `[1, 1]`.
pub fn paper_size_for_type(paper_type: &str, units: Units) -> Option<[f64; 2]> {
    let (_, w, h, mm) = PAPER_TYPES
        .iter()
        .find(|(name, ..)| name.eq_ignore_ascii_case(paper_type))?;
    let Some(unit_in) = paper_unit_inches(units) else {
        return Some([1.0, 1.0]);
    };
    let scale = if *mm { 1.0 / 25.4 / unit_in } else { 1.0 / unit_in };
    Some([w * scale, h * scale])
}

/// Identify the paper type matching `size` (either orientation), or
/// `"<custom>"`.
pub fn paper_type_for_size(size: [f64; 2], units: Units) -> &'static str {
    let Some(unit_in) = paper_unit_inches(units) else {
        return "<custom>";
    };
    let (w, h) = (
        size[0].min(size[1]) * unit_in,
        size[0].max(size[1]) * unit_in,
    );
    const TOL: f64 = 0.01;
    PAPER_TYPES
        .iter()
        .find(|(_, pw, ph, mm)| {
            let k = if *mm { 1.0 / 25.4 } else { 1.0 };
            (w - pw * k).abs() + (h - ph * k).abs() < TOL
        })
        .map(|(name, ..)| *name)
        .unwrap_or("<custom>")
}

/// Re-express a paper length pair in new units.
pub fn convert_paper_size(size: [f64; 2], from: Units, to: Units) -> [f64; 2] {
    match (paper_unit_inches(from), paper_unit_inches(to)) {
        (Some(a), Some(b)) => [size[0] * a / b, size[1] * a / b],
        _ => size,
    }
}

/// Paper position centring a figure of `pixel_size` on `paper_size`.
pub fn auto_paper_position(
    pixel_size: [f64; 2],
    paper_size: [f64; 2],
    units: Units,
    paper_type: &str,
    dpi: f64,
) -> [f64; 4] {
    let inches = [pixel_size[0] / dpi, pixel_size[1] / dpi];
    let (w, h) = match paper_unit_inches(units) {
        Some(unit_in) => (inches[0] / unit_in, inches[1] / unit_in),
        None => {
            let page = paper_size_for_type(paper_type, Units::Inches).unwrap_or([8.5, 11.0]);
            (inches[0] / page[0], inches[1] / page[1])
        }
    };
    [
        paper_size[0] / 2.0 - w / 2.0,
        paper_size[1] / 2.0 - h / 2.0,
        w,
        h,
    ]
}
