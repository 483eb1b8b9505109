//! Callback execution, event posting and draining, `drawnow` and `waitfor`.

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use crate::error::{GraphicsError, GraphicsResult};
use crate::events::{BusyAction, GraphicsEvent};
use crate::handle::Handle;
use crate::kinds::ObjectKind;
use crate::property::{Listener, ListenerMoment, NativeAction};
use crate::value::Value;

use super::GraphicsEngine;

impl GraphicsEngine {
    /// A callback is running on an object that must not be interrupted.
    pub fn is_busy(&self) -> bool {
        self.callbacks
            .current()
            .and_then(|h| self.manager.get(h))
            .map(|o| !o.is_on("interruptible"))
            .unwrap_or(false)
    }

    /// Queue the callback stored in property `name` of `h`.
    ///
    /// Names on the always-drain list bypass busy handling; otherwise the
    /// object's `busyaction` decides, and a cancellable callback posted
    /// while busy is dropped on the spot.
    pub fn post_callback(&mut self, h: Handle, name: &str, data: Value) -> GraphicsResult<()> {
        let obj = self.object_or_err(h)?;
        let key = obj.props.resolve(name)?;
        if obj.value(&key).is_empty() {
            return Ok(());
        }
        let busy = if self
            .config
            .events
            .is_always_drain(&key, obj.kind().is_figure())
        {
            BusyAction::Interrupt
        } else if obj.str_value("busyaction") == "queue" {
            BusyAction::Queue
        } else {
            BusyAction::Cancel
        };
        if busy == BusyAction::Cancel && self.is_busy() {
            log::debug!(target: "runmat_graphics::events", "dropping {key} for {h}: busy");
            return Ok(());
        }
        self.queue.post(GraphicsEvent::Callback {
            handle: h,
            name: Some(key),
            callback: None,
            data,
            busy,
        });
        Ok(())
    }

    pub fn post_function<F>(&mut self, action: F)
    where
        F: FnOnce(&mut GraphicsEngine) + Send + 'static,
    {
        self.queue.post(GraphicsEvent::Function(Box::new(action)));
    }

    pub fn post_set(&mut self, h: Handle, name: &str, value: Value) {
        self.queue.post(GraphicsEvent::Set {
            handle: h,
            name: name.to_string(),
            value,
        });
    }

    /// Drain the event queue and return how many events ran. While busy
    /// (and not forced) only events allowed to interrupt run and
    /// cancellable ones are discarded.
    pub fn process_events(&mut self, force: bool) -> usize {
        let mut count = 0;
        loop {
            let next = if force || !self.is_busy() {
                self.queue.pop_front()
            } else {
                self.queue.take_interrupting()
            };
            let Some(event) = next else {
                break;
            };
            log::trace!(target: "runmat_graphics::events", "running {}", event.describe());
            self.run_event(event);
            count += 1;
        }
        count
    }

    fn run_event(&mut self, event: GraphicsEvent) {
        match event {
            GraphicsEvent::Callback {
                handle,
                name,
                callback,
                data,
                ..
            } => {
                if !self.manager.contains(handle) {
                    return;
                }
                let (callback, label) = match (callback, name) {
                    (Some(cb), name) => (cb, name.unwrap_or_else(|| "listener".to_string())),
                    (None, Some(name)) => {
                        let cb = self
                            .manager
                            .get(handle)
                            .map(|o| o.value(&name))
                            .unwrap_or_default();
                        (cb, name)
                    }
                    (None, None) => return,
                };
                let is_listener = label == "listener";
                self.execute_callback(handle, &callback, data, &label, is_listener);
            }
            GraphicsEvent::Function(action) => action(self),
            GraphicsEvent::Set {
                handle,
                name,
                value,
            } => {
                if let Err(err) = self.set(handle, &name, &value) {
                    self.report(err);
                }
            }
        }
    }

    /// Run the callback stored in property `name` of `h` right away.
    pub fn execute_named_callback(&mut self, h: Handle, name: &str, data: Value) {
        let callback = self
            .manager
            .get(h)
            .map(|o| o.value(name))
            .unwrap_or_default();
        self.execute_callback(h, &callback, data, name, false);
    }

    /// Run `callback` for `h` synchronously. Failures go to the error sink.
    pub(crate) fn execute_callback(
        &mut self,
        h: Handle,
        callback: &Value,
        data: Value,
        label: &str,
        listener: bool,
    ) {
        if callback.is_empty() {
            return;
        }
        let (callable, extra): (Value, Vec<Value>) = match callback {
            Value::FunctionHandle(_) | Value::String(_) => (callback.clone(), Vec::new()),
            Value::Cell(items) if matches!(items.first(), Some(Value::FunctionHandle(_))) => {
                (items[0].clone(), items[1..].to_vec())
            }
            other => {
                self.report(GraphicsError::Callback {
                    handle: h.to_string(),
                    callback: label.to_string(),
                    message: format!(
                        "trying to execute non-executable object (class = {})",
                        other.class_name()
                    ),
                });
                return;
            }
        };
        let Some(interpreter) = self.interpreter.clone() else {
            log::debug!(target: "runmat_graphics::callback", "no interpreter; {label} of {h} not run");
            return;
        };
        let mut args = vec![Value::from(h), data];
        args.extend(extra);

        let result = {
            let _frame = self.callbacks.push(h);
            let _interp = self.callbacks.interpreter_frame();
            if listener {
                interpreter.evaluate_listener(self, &callable, &args)
            } else {
                interpreter.evaluate_callback(self, &callable, &args)
            }
        };
        if let Err(err) = result {
            self.report(GraphicsError::Callback {
                handle: h.to_string(),
                callback: label.to_string(),
                message: format!("{err:#}"),
            });
        }

        let is_ui = self
            .manager
            .kind_of(h)
            .map(|k| {
                matches!(
                    k,
                    ObjectKind::UiControl
                        | ObjectKind::UiMenu
                        | ObjectKind::UiPushTool
                        | ObjectKind::UiToggleTool
                )
            })
            .unwrap_or(false);
        if is_ui {
            self.redraw_modified();
        }
        self.finish_pending_erase();
    }

    fn finish_pending_erase(&mut self) {
        if self.pending_erase.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_erase);
        for h in pending {
            if self.callbacks.contains(h) {
                self.pending_erase.push(h);
            } else {
                self.manager.remove(h);
            }
        }
    }

    fn redraw_modified(&mut self) {
        for figure in self.manager.figure_handles() {
            let Some(obj) = self.manager.get_mut(figure) else {
                continue;
            };
            if !obj.modified || !obj.is_on("visible") {
                continue;
            }
            obj.modified = false;
            if let Err(err) = self.toolkit.redraw(figure) {
                self.toolkit_warning(err);
            }
        }
    }

    /// Redraw modified figures, then run pending events unless only an
    /// expose was requested.
    pub fn drawnow(&mut self, expose_only: bool) -> GraphicsResult<()> {
        self.redraw_modified();
        if !expose_only {
            self.process_events(false);
        }
        Ok(())
    }

    /// Print the current figure through the toolkit.
    pub fn print_figure(
        &mut self,
        format: &str,
        file: &str,
        debug_file: Option<&str>,
    ) -> GraphicsResult<()> {
        let file = file.trim();
        if file.is_empty() {
            return Err(GraphicsError::usage("drawnow", "FILE must not be empty"));
        }
        if !file.starts_with('|') {
            if let Some(dir) = Path::new(file).parent().filter(|d| !d.as_os_str().is_empty()) {
                if !dir.is_dir() {
                    return Err(GraphicsError::usage(
                        "drawnow",
                        format!("nonexistent directory '{}'", dir.display()),
                    ));
                }
            }
        }
        let figure = self
            .current_figure()
            .ok_or_else(|| GraphicsError::usage("drawnow", "nothing to draw"))?;
        self.redraw_modified();
        self.toolkit
            .print(figure, format, file, debug_file)
            .map_err(|err| GraphicsError::Toolkit {
                toolkit: self.toolkit.name().to_string(),
                message: format!("{err:#}"),
            })
    }

    /// Block until `h` is deleted or, with `property`, until it changes (to
    /// `target` when given). Events keep being processed while waiting.
    pub fn waitfor(
        &mut self,
        h: Handle,
        property: Option<&str>,
        target: Option<Value>,
        timeout: Option<f64>,
    ) -> GraphicsResult<()> {
        if !self.manager.contains(h) || (h.is_root() && property.is_none()) {
            return Ok(());
        }
        let min_timeout = self.config.events.waitfor_min_timeout;
        let timeout = timeout.map(|t| {
            if t < min_timeout {
                log::warn!(target: "runmat_graphics", "waitfor: TIMEOUT value must be >= {min_timeout}, using {min_timeout}");
                min_timeout
            } else {
                t
            }
        });

        let done = Rc::new(Cell::new(false));
        let mut registered: Vec<(String, ListenerMoment, Listener)> = Vec::new();
        if let Some(name) = property {
            let obj = self.object_or_err(h)?;
            let key = obj.props.resolve(name)?;
            let prop = obj.props.get(&key).ok_or_else(|| obj.props.unknown(&key))?;
            let target = match target {
                Some(t) => Some(prop.validate(&t).unwrap_or(t)),
                None => None,
            };
            if let Some(t) = &target {
                if prop.get() == t {
                    return Ok(());
                }
            }
            let dynamic = prop.is_dynamic();

            let flag = done.clone();
            let action: NativeAction = Rc::new(move |_: &mut GraphicsEngine, _: Handle, value: &Value| {
                if target.as_ref().map(|t| t == value).unwrap_or(true) {
                    flag.set(true);
                }
            });
            let listener = Listener::Native {
                id: self.next_listener_id(),
                action,
            };
            self.attach_listener(h, &key, ListenerMoment::PostSet, listener.clone())?;
            registered.push((key.clone(), ListenerMoment::PostSet, listener));

            if dynamic {
                let flag = done.clone();
                let action: NativeAction =
                    Rc::new(move |_: &mut GraphicsEngine, _: Handle, _: &Value| flag.set(true));
                let listener = Listener::Native {
                    id: self.next_listener_id(),
                    action,
                };
                self.attach_listener(h, &key, ListenerMoment::PreDelete, listener.clone())?;
                registered.push((key, ListenerMoment::PreDelete, listener));
            }
        }

        let poll = Duration::from_millis(self.config.events.waitfor_poll_ms.max(1));
        let start = Instant::now();
        let finished = |engine: &GraphicsEngine| done.get() || !engine.manager.contains(h);
        let result = loop {
            if finished(self) {
                break Ok(());
            }
            self.process_events(false);
            if finished(self) {
                break Ok(());
            }
            if self.interrupt.swap(false, Ordering::SeqCst) {
                break Err(GraphicsError::Interrupted);
            }
            if let Some(t) = timeout {
                if start.elapsed().as_secs_f64() >= t {
                    break Ok(());
                }
            }
            std::thread::sleep(poll);
        };

        for (key, moment, listener) in registered {
            if let Some(prop) = self.manager.get_mut(h).and_then(|o| o.props.get_mut(&key)) {
                prop.remove_listener(moment, Some(&listener));
            }
        }
        result
    }
}
