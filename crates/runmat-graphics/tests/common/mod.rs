#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use runmat_graphics::{
    GraphicsConfig, GraphicsEngine, Handle, Interpreter, ObjectKind, Toolkit, Value,
};

type Action = Box<dyn Fn(&mut GraphicsEngine, &[Value])>;

/// Interpreter that treats string callbacks as names: every call is logged
/// and a registered action, if any, runs against the engine.
#[derive(Default)]
pub struct Recorder {
    calls: RefCell<Vec<String>>,
    actions: RefCell<HashMap<String, Action>>,
}

impl Recorder {
    pub fn on<F>(&self, name: &str, action: F)
    where
        F: Fn(&mut GraphicsEngine, &[Value]) + 'static,
    {
        self.actions
            .borrow_mut()
            .insert(name.to_string(), Box::new(action));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Interpreter for Recorder {
    fn evaluate_callback(
        &self,
        engine: &mut GraphicsEngine,
        callback: &Value,
        args: &[Value],
    ) -> anyhow::Result<()> {
        let name = callback.as_str().unwrap_or_default().to_string();
        self.calls.borrow_mut().push(name.clone());
        if let Some(action) = self.actions.borrow().get(&name) {
            action(engine, args);
        }
        Ok(())
    }
}

/// Toolkit that remembers what it was asked to do.
#[derive(Default)]
pub struct RecordingToolkit {
    pub redraws: RefCell<Vec<Handle>>,
    pub prints: RefCell<Vec<(Handle, String, String)>>,
    pub changes: RefCell<Vec<(Handle, String)>>,
}

impl Toolkit for RecordingToolkit {
    fn name(&self) -> &str {
        "recording"
    }

    fn notify_property_changed(&self, handle: Handle, property: &str) -> anyhow::Result<()> {
        self.changes
            .borrow_mut()
            .push((handle, property.to_string()));
        Ok(())
    }

    fn redraw(&self, figure: Handle) -> anyhow::Result<()> {
        self.redraws.borrow_mut().push(figure);
        Ok(())
    }

    fn print(
        &self,
        figure: Handle,
        format: &str,
        destination: &str,
        _debug_destination: Option<&str>,
    ) -> anyhow::Result<()> {
        self.prints
            .borrow_mut()
            .push((figure, format.to_string(), destination.to_string()));
        Ok(())
    }

    fn screen_dpi(&self) -> Option<f64> {
        Some(72.0)
    }

    fn screen_pixel_size(&self) -> Option<(f64, f64)> {
        Some((1280.0, 800.0))
    }
}

pub fn engine() -> GraphicsEngine {
    let mut config = GraphicsConfig::default();
    config.handles.seed = Some(7);
    GraphicsEngine::new(config)
}

pub fn engine_with_recorder() -> (GraphicsEngine, Rc<Recorder>) {
    let recorder = Rc::new(Recorder::default());
    let engine = engine().with_interpreter(recorder.clone());
    (engine, recorder)
}

pub fn engine_with_toolkit() -> (GraphicsEngine, Rc<RecordingToolkit>, Rc<Recorder>) {
    let toolkit = Rc::new(RecordingToolkit::default());
    let recorder = Rc::new(Recorder::default());
    let engine = engine()
        .with_toolkit(toolkit.clone())
        .with_interpreter(recorder.clone());
    (engine, toolkit, recorder)
}

/// A figure holding one axes.
pub fn figure_and_axes(engine: &mut GraphicsEngine) -> (Handle, Handle) {
    let fig = engine.create_figure(None, &[]).unwrap();
    let ax = engine.create(ObjectKind::Axes, fig, &[]).unwrap();
    (fig, ax)
}

pub fn numbers(engine: &GraphicsEngine, h: Handle, name: &str) -> Vec<f64> {
    engine.get(h, name).unwrap().numbers().unwrap()
}

pub fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-6, "{actual:?} vs {expected:?}");
    }
}
