//! Axis limit rounding and tick placement.

use crate::value::format_short_g;

/// Target number of major tick intervals.
pub const TICK_INTERVALS: f64 = 5.0;

/// Data extrema for one axis. `min_pos`/`max_neg` are the smallest strictly
/// positive and largest strictly negative values, needed for log scales.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataLimits {
    pub min: f64,
    pub max: f64,
    pub min_pos: f64,
    pub max_neg: f64,
}

impl Default for DataLimits {
    fn default() -> Self {
        DataLimits {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            min_pos: f64::INFINITY,
            max_neg: f64::NEG_INFINITY,
        }
    }
}

impl DataLimits {
    pub fn from_data(data: &[f64]) -> Self {
        let mut out = DataLimits::default();
        for &v in data {
            out.include(v);
        }
        out
    }

    pub fn include(&mut self, v: f64) {
        if !v.is_finite() {
            return;
        }
        self.min = self.min.min(v);
        self.max = self.max.max(v);
        if v > 0.0 {
            self.min_pos = self.min_pos.min(v);
        }
        if v < 0.0 {
            self.max_neg = self.max_neg.max(v);
        }
    }

    pub fn merge(&mut self, other: &DataLimits) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.min_pos = self.min_pos.min(other.min_pos);
        self.max_neg = self.max_neg.max(other.max_neg);
    }

    pub fn is_empty(&self) -> bool {
        !(self.min.is_finite() && self.max.is_finite())
    }
}

/// Split `x` into `a * 10^b` with `1 <= |a| < 10`.
pub fn magform(x: f64) -> (f64, i32) {
    if x == 0.0 {
        return (0.0, 0);
    }
    let b = x.abs().log10().floor() as i32;
    (x / 10f64.powi(b), b)
}

/// "Nice" spacing for roughly five intervals over `[lo, hi]`.
pub fn calc_tick_sep(lo: f64, hi: f64) -> f64 {
    let (a, b) = magform((hi - lo) / TICK_INTERVALS);
    let x = if a < 2f64.sqrt() {
        1.0
    } else if a < 10f64.sqrt() {
        2.0
    } else if a < 50f64.sqrt() {
        5.0
    } else {
        10.0
    };
    x * 10f64.powi(b)
}

pub fn default_limits(log_scale: bool) -> [f64; 2] {
    if log_scale {
        [0.1, 1.0]
    } else {
        [0.0, 1.0]
    }
}

/// Auto limits for the collected data, rounded outward to tick multiples
/// (linear) or whole decades (log). Empty data yields the default range.
pub fn axis_limits(data: &DataLimits, log_scale: bool) -> [f64; 2] {
    let mut min_val = data.min;
    let mut max_val = data.max;
    if data.is_empty() {
        return default_limits(log_scale);
    }
    let tiny = f64::EPSILON.sqrt();
    if log_scale {
        if !data.min_pos.is_finite() && !data.max_neg.is_finite() {
            log::warn!("axis: omitting non-positive data in log plot");
            return default_limits(true);
        }
        if min_val <= 0.0 && max_val > 0.0 {
            log::warn!("axis: omitting non-positive data in log plot");
            min_val = data.min_pos;
        }
        if (min_val - max_val).abs() < tiny {
            if min_val >= 0.0 {
                min_val *= 0.9;
                max_val *= 1.1;
            } else {
                min_val *= 1.1;
                max_val *= 0.9;
            }
        }
        if min_val > 0.0 {
            min_val = 10f64.powf(min_val.log10().floor());
            max_val = 10f64.powf(max_val.log10().ceil());
        } else {
            min_val = -(10f64.powf((-min_val).log10().ceil()));
            max_val = -(10f64.powf((-max_val).log10().floor()));
        }
    } else {
        if min_val == 0.0 && max_val == 0.0 {
            min_val = -1.0;
            max_val = 1.0;
        } else if (min_val - max_val).abs() < tiny {
            min_val -= 0.1 * min_val.abs();
            max_val += 0.1 * max_val.abs();
        }
        let sep = calc_tick_sep(min_val, max_val);
        let min_tick = (min_val / sep).floor();
        let max_tick = (max_val / sep).ceil();
        min_val = min_val.min(sep * min_tick);
        max_val = max_val.max(sep * max_tick);
    }
    [min_val, max_val]
}

/// Colour/alpha limits: raw extrema, widened by one when degenerate.
pub fn color_limits(data: &DataLimits) -> [f64; 2] {
    if data.is_empty() {
        return [0.0, 1.0];
    }
    if data.min == data.max {
        [data.min, data.min + 1.0]
    } else {
        [data.min, data.max]
    }
}

/// Major and minor tick positions for an axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TickLayout {
    pub limits: [f64; 2],
    pub ticks: Vec<f64>,
    pub minor: Vec<f64>,
}

/// Place ticks for `limits`. In auto mode the limits grow to the outermost
/// ticks; in manual mode ticks are trimmed to lie inside them.
pub fn calc_ticks(limits: [f64; 2], limits_auto: bool, log_scale: bool) -> TickLayout {
    let mut lims = limits;
    let (mut lo, mut hi) = (lims[0].min(lims[1]), lims[0].max(lims[1]));
    let negative_log = log_scale && hi < 0.0;
    if log_scale {
        if negative_log {
            let (a, b) = (-hi, -lo);
            lo = a.log10();
            hi = b.log10();
        } else {
            lo = lo.max(f64::MIN_POSITIVE).log10();
            hi = hi.max(f64::MIN_POSITIVE).log10();
        }
    }
    if !(lo.is_finite() && hi.is_finite()) || lo == hi {
        return TickLayout {
            limits: lims,
            ticks: Vec::new(),
            minor: Vec::new(),
        };
    }
    let sep = if log_scale {
        calc_tick_sep(lo, hi).round().max(1.0)
    } else {
        calc_tick_sep(lo, hi)
    };
    let mut i1 = (lo / sep).floor() as i64;
    let mut i2 = (hi / sep).ceil() as i64;
    if limits_auto {
        if !log_scale {
            lims = [lims[0].min(sep * i1 as f64), lims[1].max(sep * i2 as f64)];
        }
    } else {
        if (i1 as f64) * sep < lo {
            i1 += 1;
        }
        if (i2 as f64) * sep > hi && i2 > i1 {
            i2 -= 1;
        }
    }
    let to_axis = |v: f64| -> f64 {
        if !log_scale {
            v
        } else if negative_log {
            -(10f64.powf(v))
        } else {
            10f64.powf(v)
        }
    };
    let mut ticks: Vec<f64> = (i1..=i2).map(|i| to_axis(sep * i as f64)).collect();
    if negative_log {
        ticks.reverse();
    }

    let per_interval = if log_scale { 8 } else { 4 };
    let mut minor = Vec::new();
    for i in i1..i2 {
        let start = sep * i as f64;
        for k in 1..=per_interval {
            let v = if log_scale && sep == 1.0 {
                // 2..9 times the decade start.
                let decade = to_axis(start);
                decade * (k as f64 + 1.0)
            } else {
                to_axis(start + sep * k as f64 / (per_interval as f64 + 1.0))
            };
            if v >= lims[0].min(lims[1]) && v <= lims[0].max(lims[1]) {
                minor.push(v);
            }
        }
    }
    minor.sort_by(|a, b| a.total_cmp(b));

    TickLayout {
        limits: lims,
        ticks,
        minor,
    }
}

/// Auto tick labels: `%g` for linear axes, `10^{k}` for log axes.
pub fn tick_labels(ticks: &[f64], log_scale: bool) -> Vec<String> {
    ticks
        .iter()
        .map(|&t| {
            if log_scale && t != 0.0 {
                let exponent = t.abs().log10().round() as i64;
                let sign = if t < 0.0 { "-" } else { "" };
                format!("{sign}10^{{{exponent}}}")
            } else {
                // Avoid "-0" and round-off noise like 0.30000000000000004.
                let cleaned = if t.abs() < 1e-12 { 0.0 } else { t };
                format_short_g(cleaned)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn magform_splits_mantissa() {
        let (a, b) = magform(0.75);
        assert!(approx(a, 7.5));
        assert_eq!(b, -1);
        assert_eq!(magform(0.0), (0.0, 0));
    }

    #[test]
    fn tick_sep_thresholds() {
        assert!(approx(calc_tick_sep(0.0, 5.0), 1.0));
        assert!(approx(calc_tick_sep(0.0, 10.0), 2.0));
        assert!(approx(calc_tick_sep(0.0, 25.0), 5.0));
        assert!(approx(calc_tick_sep(4.75, 8.5), 1.0));
        assert!(approx(calc_tick_sep(0.0, 1.0), 0.2));
    }

    #[test]
    fn linear_limits_round_outward() {
        let data = DataLimits::from_data(&[2.0, 5.0, 8.0]);
        assert_eq!(axis_limits(&data, false), [2.0, 8.0]);
        let data = DataLimits::from_data(&[4.75, 8.5]);
        assert_eq!(axis_limits(&data, false), [4.0, 9.0]);
    }

    #[test]
    fn degenerate_linear_ranges_widen() {
        assert_eq!(axis_limits(&DataLimits::from_data(&[0.0]), false), [-1.0, 1.0]);
        let lims = axis_limits(&DataLimits::from_data(&[5.0]), false);
        assert!(lims[0] <= 4.5 && lims[1] >= 5.5);
    }

    #[test]
    fn log_limits_snap_to_decades() {
        let lims = axis_limits(&DataLimits::from_data(&[3.0, 250.0]), true);
        assert!(approx(lims[0], 1.0) && approx(lims[1], 1000.0));
        let lims = axis_limits(&DataLimits::from_data(&[-250.0, -3.0]), true);
        assert!(approx(lims[0], -1000.0) && approx(lims[1], -1.0));
    }

    #[test]
    fn empty_data_uses_defaults() {
        assert_eq!(axis_limits(&DataLimits::default(), false), [0.0, 1.0]);
        assert_eq!(axis_limits(&DataLimits::default(), true), [0.1, 1.0]);
    }

    #[test]
    fn manual_limits_trim_ticks() {
        let layout = calc_ticks([4.75, 8.5], false, false);
        assert_eq!(layout.ticks, vec![5.0, 6.0, 7.0, 8.0]);
        assert_eq!(layout.limits, [4.75, 8.5]);
    }

    #[test]
    fn auto_limits_grow_to_ticks() {
        let layout = calc_ticks([0.0, 1.0], true, false);
        assert_eq!(layout.limits, [0.0, 1.0]);
        assert_eq!(layout.ticks.len(), 6);
        assert!(approx(layout.ticks[1], 0.2));
        assert_eq!(layout.minor.len(), 20);
    }

    #[test]
    fn log_ticks_are_decades() {
        let layout = calc_ticks([1.0, 1000.0], true, true);
        assert_eq!(layout.ticks.len(), 4);
        assert!(approx(layout.ticks[3], 1000.0));
        assert_eq!(tick_labels(&layout.ticks, true)[2], "10^{2}");
        assert_eq!(layout.minor.len(), 24);
    }

    #[test]
    fn colour_limits_widen_single_value() {
        assert_eq!(color_limits(&DataLimits::from_data(&[3.0])), [3.0, 4.0]);
    }

    #[test]
    fn labels_drop_round_off() {
        let labels = tick_labels(&[0.0, 0.1 + 0.2, -1e-17], false);
        assert_eq!(labels, vec!["0", "0.3", "0"]);
    }
}
