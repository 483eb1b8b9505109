//! Seams to the collaborators the engine drives but does not implement:
//! a rendering toolkit, the interpreter, and text measurement.

use crate::config::TextConfig;
use crate::engine::GraphicsEngine;
use crate::handle::Handle;
use crate::value::Value;

/// Rendering backend. Every method has a no-op default so a backend only
/// implements what it supports; errors are reported and otherwise ignored.
pub trait Toolkit {
    fn name(&self) -> &str;

    fn initialize(&self, _handle: Handle) -> anyhow::Result<()> {
        Ok(())
    }

    fn finalize(&self, _handle: Handle) -> anyhow::Result<()> {
        Ok(())
    }

    fn notify_property_changed(&self, _handle: Handle, _property: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn redraw(&self, _figure: Handle) -> anyhow::Result<()> {
        Ok(())
    }

    fn print(
        &self,
        _figure: Handle,
        _format: &str,
        _destination: &str,
        _debug_destination: Option<&str>,
    ) -> anyhow::Result<()> {
        anyhow::bail!("printing is not supported by the {} toolkit", self.name())
    }

    /// Drawable size of a figure's canvas in pixels, if a window exists.
    fn canvas_pixel_size(&self, _figure: Handle) -> Option<(f64, f64)> {
        None
    }

    fn screen_dpi(&self) -> Option<f64> {
        None
    }

    fn screen_pixel_size(&self) -> Option<(f64, f64)> {
        None
    }
}

/// Headless backend used until a real toolkit is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullToolkit;

impl Toolkit for NullToolkit {
    fn name(&self) -> &str {
        "null"
    }
}

/// Evaluates callback values on behalf of the engine.
pub trait Interpreter {
    /// Run `callback` (a function handle or a string of code) with `args`.
    /// The first two arguments are the source handle and the event data;
    /// extra arguments from a `{fcn, extra...}` cell callback follow.
    fn evaluate_callback(
        &self,
        engine: &mut GraphicsEngine,
        callback: &Value,
        args: &[Value],
    ) -> anyhow::Result<()>;

    fn evaluate_listener(
        &self,
        engine: &mut GraphicsEngine,
        callback: &Value,
        args: &[Value],
    ) -> anyhow::Result<()> {
        self.evaluate_callback(engine, callback, args)
    }

    fn read_variable(&self, _name: &str) -> Option<Value> {
        None
    }

    fn write_variable(&self, _name: &str, _value: Value) -> anyhow::Result<()> {
        anyhow::bail!("variables are not available")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest<'a> {
    pub lines: &'a [String],
    pub font_name: &'a str,
    /// Font size in pixels.
    pub font_size: f64,
    pub rotation: f64,
    pub interpreter: &'a str,
}

pub trait TextMeasurer {
    /// Rotated bounding box `(width, height)` in pixels, or `None` when the
    /// text cannot be measured.
    fn measure(&self, request: &TextRequest<'_>) -> Option<(f64, f64)>;
}

/// Fixed-width heuristic used when no real measurer is available.
#[derive(Debug, Clone)]
pub struct FallbackMeasurer {
    char_width: f64,
    line_height: f64,
}

impl FallbackMeasurer {
    pub fn new(config: &TextConfig) -> Self {
        FallbackMeasurer {
            char_width: config.char_width_factor,
            line_height: config.line_height_factor,
        }
    }
}

impl TextMeasurer for FallbackMeasurer {
    fn measure(&self, request: &TextRequest<'_>) -> Option<(f64, f64)> {
        let longest = request
            .lines
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0) as f64;
        let w = longest * self.char_width * request.font_size;
        let h = request.lines.len().max(1) as f64 * self.line_height * request.font_size;
        let (s, c) = request.rotation.to_radians().sin_cos();
        Some((
            (w * c).abs() + (h * s).abs(),
            (w * s).abs() + (h * c).abs(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_swaps_extent_when_rotated() {
        let m = FallbackMeasurer::new(&TextConfig::default());
        let lines = vec!["abcd".to_string()];
        let req = TextRequest {
            lines: &lines,
            font_name: "Helvetica",
            font_size: 10.0,
            rotation: 0.0,
            interpreter: "tex",
        };
        let (w, h) = m.measure(&req).unwrap();
        let (rw, rh) = m.measure(&TextRequest { rotation: 90.0, ..req }).unwrap();
        assert!((w - rh).abs() < 1e-9);
        assert!((h - rw).abs() < 1e-9);
        assert!(w > h);
    }

    #[test]
    fn null_toolkit_refuses_print() {
        assert!(NullToolkit.print(Handle::new(1.0), "png", "out.png", None).is_err());
        assert!(NullToolkit.redraw(Handle::new(1.0)).is_ok());
    }
}
