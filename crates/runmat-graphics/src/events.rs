//! Deferred actions and the queue that serialises them.
//!
//! Any thread may post through an [`EventPoster`]; only the engine's own
//! thread drains. The mutex is held for a single push or pop, never while an
//! event runs.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::GraphicsEngine;
use crate::handle::Handle;
use crate::value::Value;

/// What to do with a callback posted while its object is busy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyAction {
    /// Keep it for a later drain.
    Queue,
    /// Drop it.
    Cancel,
    /// Run it even while busy (the always-drain callback names).
    Interrupt,
}

impl BusyAction {
    pub fn name(self) -> &'static str {
        match self {
            BusyAction::Queue => "queue",
            BusyAction::Cancel => "cancel",
            BusyAction::Interrupt => "interrupt",
        }
    }
}

pub type NativeFunction = Box<dyn FnOnce(&mut GraphicsEngine) + Send>;

pub enum GraphicsEvent {
    /// Run a callback: either the named callback property of `handle` or an
    /// explicit callback value.
    Callback {
        handle: Handle,
        name: Option<String>,
        callback: Option<Value>,
        data: Value,
        busy: BusyAction,
    },
    /// Run a native action, bypassing the interpreter.
    Function(NativeFunction),
    /// Apply a property write.
    Set {
        handle: Handle,
        name: String,
        value: Value,
    },
}

impl GraphicsEvent {
    pub fn busy_action(&self) -> BusyAction {
        match self {
            GraphicsEvent::Callback { busy, .. } => *busy,
            _ => BusyAction::Queue,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            GraphicsEvent::Callback { handle, name, .. } => format!(
                "callback {} on {handle}",
                name.as_deref().unwrap_or("<value>")
            ),
            GraphicsEvent::Function(_) => "function".to_string(),
            GraphicsEvent::Set { handle, name, .. } => format!("set {name} on {handle}"),
        }
    }
}

impl fmt::Debug for GraphicsEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

type DrainHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct QueueState {
    events: VecDeque<GraphicsEvent>,
    drain_requested: bool,
    drain_hook: Option<DrainHook>,
}

/// FIFO of [`GraphicsEvent`]s shared between the engine and any posters.
#[derive(Clone, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<QueueState>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail. The first event into an empty queue flags a drain
    /// request and fires the drain hook, if any.
    pub fn post(&self, event: GraphicsEvent) {
        let hook = {
            let mut state = self.inner.lock();
            let first = state.events.is_empty() && !state.drain_requested;
            state.events.push_back(event);
            if first {
                state.drain_requested = true;
                state.drain_hook.clone()
            } else {
                None
            }
        };
        if let Some(hook) = hook {
            hook();
        }
    }

    pub fn pop_front(&self) -> Option<GraphicsEvent> {
        self.inner.lock().events.pop_front()
    }

    /// Busy-mode drain step: drop every `Cancel` callback and remove the
    /// first `Interrupt` one for execution. `Queue` events stay in place.
    pub fn take_interrupting(&self) -> Option<GraphicsEvent> {
        let mut state = self.inner.lock();
        let before = state.events.len();
        state
            .events
            .retain(|e| e.busy_action() != BusyAction::Cancel);
        let dropped = before - state.events.len();
        if dropped > 0 {
            log::debug!(target: "runmat_graphics", "dropped {dropped} cancelled callback(s)");
        }
        let index = state
            .events
            .iter()
            .position(|e| e.busy_action() == BusyAction::Interrupt)?;
        state.events.remove(index)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().events.is_empty()
    }

    /// Consume the pending drain request, returning whether one was set.
    pub fn take_drain_request(&self) -> bool {
        std::mem::take(&mut self.inner.lock().drain_requested)
    }

    /// Install a function called (on the posting thread) whenever a drain is
    /// newly requested; front ends use it to schedule `process_events`.
    pub fn set_drain_hook<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.lock().drain_hook = Some(Arc::new(hook));
    }

    pub fn poster(&self) -> EventPoster {
        EventPoster {
            queue: self.clone(),
        }
    }
}

/// Cloneable, `Send` posting end of the engine's queue.
#[derive(Clone)]
pub struct EventPoster {
    queue: EventQueue,
}

impl EventPoster {
    /// Queue the named callback property of `handle`.
    pub fn post_callback(&self, handle: Handle, name: &str, data: Value) {
        self.queue.post(GraphicsEvent::Callback {
            handle,
            name: Some(name.to_ascii_lowercase()),
            callback: None,
            data,
            busy: BusyAction::Queue,
        });
    }

    pub fn post_function<F>(&self, action: F)
    where
        F: FnOnce(&mut GraphicsEngine) + Send + 'static,
    {
        self.queue.post(GraphicsEvent::Function(Box::new(action)));
    }

    pub fn post_set(&self, handle: Handle, name: &str, value: Value) {
        self.queue.post(GraphicsEvent::Set {
            handle,
            name: name.to_string(),
            value,
        });
    }
}
