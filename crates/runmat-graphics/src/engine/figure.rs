//! Figure geometry, paper layout and handle renumbering.

use crate::handle::Handle;
use crate::kinds::ObjectKind;
use crate::units::{
    auto_paper_position, convert_paper_size, convert_position, paper_size_for_type,
    paper_type_for_size, Units,
};
use crate::value::Value;

use super::GraphicsEngine;

fn pair(values: &[f64]) -> Option<[f64; 2]> {
    match values {
        [a, b] => Some([*a, *b]),
        _ => None,
    }
}

fn orient(size: [f64; 2], landscape: bool) -> [f64; 2] {
    let [w, h] = size;
    if landscape == (w < h) {
        [h, w]
    } else {
        size
    }
}

impl GraphicsEngine {
    /// Pixel size of the drawable area of `h` as seen by its children.
    pub(super) fn container_pixel_size(&self, h: Handle) -> [f64; 2] {
        let Some(obj) = self.manager.get(h) else {
            return self.screen_size();
        };
        match obj.kind() {
            ObjectKind::Root => self.screen_size(),
            ObjectKind::Figure => {
                if let Some((w, h)) = self.toolkit.canvas_pixel_size(h) {
                    return [w, h];
                }
                let px = self.figure_pixel_position(h);
                [px[2], px[3]]
            }
            ObjectKind::UiPanel | ObjectKind::UiButtonGroup => {
                let parent = self.container_pixel_size(obj.parent().unwrap_or(Handle::ROOT));
                let pos = obj.numbers("position");
                if pos.len() != 4 {
                    return parent;
                }
                let units = Units::parse(&obj.str_value("units")).unwrap_or(Units::Normalized);
                let px = convert_position(&pos, units, Units::Pixels, parent, self.screen_dpi());
                [px[2], px[3]]
            }
            _ => self.container_pixel_size(obj.parent().unwrap_or(Handle::ROOT)),
        }
    }

    /// A figure's `position` in screen pixels.
    fn figure_pixel_position(&self, figure: Handle) -> Vec<f64> {
        let Some(obj) = self.manager.get(figure) else {
            return vec![1.0, 1.0, 560.0, 420.0];
        };
        let pos = obj.numbers("position");
        let units = Units::parse(&obj.str_value("units")).unwrap_or(Units::Pixels);
        if pos.len() != 4 {
            return vec![1.0, 1.0, 560.0, 420.0];
        }
        convert_position(&pos, units, Units::Pixels, self.screen_size(), self.screen_dpi())
    }

    /// Re-express position-like properties of `h` after its `units` changed
    /// from the value in `old`.
    pub(super) fn convert_container_positions(&mut self, h: Handle, old: &Value, names: &[&str]) {
        let Some(obj) = self.manager.get(h) else {
            return;
        };
        let (Some(from), Some(to)) = (
            old.as_str().and_then(Units::parse),
            Units::parse(&obj.str_value("units")),
        ) else {
            return;
        };
        let parent = self.container_pixel_size(obj.parent().unwrap_or(Handle::ROOT));
        let dpi = self.screen_dpi();
        let converted: Vec<(&str, Vec<f64>)> = names
            .iter()
            .filter_map(|name| {
                let pos = obj.numbers(name);
                (!pos.is_empty())
                    .then(|| (*name, convert_position(&pos, from, to, parent, dpi)))
            })
            .collect();
        for (name, pos) in converted {
            self.store_derived(h, name, Value::row(&pos));
        }
    }

    pub(super) fn figure_hook(&mut self, fig: Handle, key: &str, old: &Value) {
        match key {
            "units" => self.convert_container_positions(fig, old, &["position", "outerposition"]),
            "position" => self.figure_moved(fig, old),
            "paperunits" => self.convert_paper_units(fig, old),
            "papertype" => {
                let Some(obj) = self.manager.get(fig) else {
                    return;
                };
                let units = Units::parse(&obj.str_value("paperunits")).unwrap_or(Units::Inches);
                let landscape = obj.str_value("paperorientation") == "landscape";
                if let Some(size) = paper_size_for_type(&obj.str_value("papertype"), units) {
                    self.store_derived(fig, "papersize", Value::row(&orient(size, landscape)));
                }
                self.update_paper_position(fig);
            }
            "papersize" => {
                let Some(obj) = self.manager.get(fig) else {
                    return;
                };
                let Some(size) = pair(&obj.numbers("papersize")) else {
                    return;
                };
                let units = Units::parse(&obj.str_value("paperunits")).unwrap_or(Units::Inches);
                let paper_type = paper_type_for_size(size, units);
                let orientation = if size[0] > size[1] { "landscape" } else { "portrait" };
                self.store_derived(fig, "papertype", Value::from(paper_type));
                self.store_derived(fig, "paperorientation", Value::from(orientation));
                self.update_paper_position(fig);
            }
            "paperorientation" => {
                let Some(obj) = self.manager.get(fig) else {
                    return;
                };
                let landscape = obj.str_value("paperorientation") == "landscape";
                if let Some(size) = pair(&obj.numbers("papersize")) {
                    let oriented = orient(size, landscape);
                    if oriented != size {
                        self.store_derived(fig, "papersize", Value::row(&oriented));
                    }
                }
                self.update_paper_position(fig);
            }
            "paperposition" => {
                self.store_derived(fig, "paperpositionmode", Value::from("manual"));
            }
            "paperpositionmode" => self.update_paper_position(fig),
            "integerhandle" => self.renumber_figure(fig),
            "visible" => {
                if self.manager.get(fig).map(|o| o.is_on("visible")).unwrap_or(false) {
                    self.make_current_figure(fig);
                }
            }
            _ => {}
        }
    }

    /// Size changes fire the figure's resize callbacks and relayout its
    /// contents.
    fn figure_moved(&mut self, fig: Handle, old: &Value) {
        let Some(obj) = self.manager.get(fig) else {
            return;
        };
        let units = Units::parse(&obj.str_value("units")).unwrap_or(Units::Pixels);
        let old_px = old
            .numbers()
            .filter(|p| p.len() == 4)
            .map(|p| convert_position(&p, units, Units::Pixels, self.screen_size(), self.screen_dpi()));
        let new_px = self.figure_pixel_position(fig);
        let resized = old_px
            .map(|o| (o[2] - new_px[2]).abs() > f64::EPSILON || (o[3] - new_px[3]).abs() > f64::EPSILON)
            .unwrap_or(true);
        if resized {
            for name in ["resizefcn", "sizechangedfcn"] {
                if let Err(err) = self.post_callback(fig, name, Value::Empty) {
                    log::debug!(target: "runmat_graphics", "{name} of {fig} not posted: {err}");
                }
            }
            self.refresh_container(fig);
        }
        self.update_paper_position(fig);
    }

    /// Convert `papersize` and `paperposition` after `paperunits` changed.
    /// Standard paper types are looked up again; custom sizes are scaled.
    fn convert_paper_units(&mut self, fig: Handle, old: &Value) {
        let Some(obj) = self.manager.get(fig) else {
            return;
        };
        let (Some(from), Some(to)) = (
            old.as_str().and_then(Units::parse),
            Units::parse(&obj.str_value("paperunits")),
        ) else {
            return;
        };
        let (Some(size), pos) = (pair(&obj.numbers("papersize")), obj.numbers("paperposition"))
        else {
            return;
        };
        if pos.len() != 4 {
            return;
        }
        let paper_type = obj.str_value("papertype");
        let landscape = obj.str_value("paperorientation") == "landscape";
        let new_size = match paper_size_for_type(&paper_type, to) {
            Some(standard) => orient(standard, landscape),
            None => convert_paper_size(size, from, to),
        };
        let new_pos = [
            pos[0] / size[0] * new_size[0],
            pos[1] / size[1] * new_size[1],
            pos[2] / size[0] * new_size[0],
            pos[3] / size[1] * new_size[1],
        ];
        self.store_derived(fig, "papersize", Value::row(&new_size));
        self.store_derived(fig, "paperposition", Value::row(&new_pos));
    }

    /// Centre the figure on the page when `paperpositionmode` is `auto`.
    pub(super) fn update_paper_position(&mut self, fig: Handle) {
        let Some(obj) = self.manager.get(fig) else {
            return;
        };
        if obj.str_value("paperpositionmode") != "auto" {
            return;
        }
        let Some(size) = pair(&obj.numbers("papersize")) else {
            return;
        };
        let units = Units::parse(&obj.str_value("paperunits")).unwrap_or(Units::Inches);
        let paper_type = obj.str_value("papertype");
        let px = self.figure_pixel_position(fig);
        let position =
            auto_paper_position([px[2], px[3]], size, units, &paper_type, self.screen_dpi());
        self.store_derived(fig, "paperposition", Value::row(&position));
    }

    /// Move a figure between integer and non-integer handles.
    fn renumber_figure(&mut self, fig: Handle) {
        let integer = self
            .manager
            .get(fig)
            .map(|o| o.is_on("integerhandle"))
            .unwrap_or(true);
        if integer == fig.is_integer() {
            return;
        }
        let new = if integer {
            self.manager.lowest_free_integer()
        } else {
            self.manager.allocate(false)
        };
        if self.manager.renumber(fig, new) {
            log::debug!(target: "runmat_graphics", "figure {fig} renumbered to {new}");
            self.pending_renumber = Some((fig, new));
            self.notify_toolkit(new, "integerhandle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_swaps_only_when_needed() {
        assert_eq!(orient([8.5, 11.0], true), [11.0, 8.5]);
        assert_eq!(orient([11.0, 8.5], true), [11.0, 8.5]);
        assert_eq!(orient([11.0, 8.5], false), [8.5, 11.0]);
        assert_eq!(orient([8.5, 11.0], false), [8.5, 11.0]);
    }
}
