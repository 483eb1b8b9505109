//! Re-entrancy bookkeeping: per-operation recursion guards and the stack of
//! objects whose callbacks are currently executing.
//!
//! Both are scoped: the returned token/frame undoes its registration when
//! dropped, so an error or early return inside a callback still unwinds.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::handle::Handle;

#[derive(Debug, Clone, Default)]
pub struct RecursionGuards {
    active: Rc<RefCell<HashSet<(Handle, &'static str)>>>,
}

impl RecursionGuards {
    /// Mark `(handle, operation)` as in progress. `None` means a caller up the
    /// stack is already doing this work and the nested call should no-op.
    pub fn enter(&self, handle: Handle, operation: &'static str) -> Option<GuardToken> {
        if !self.active.borrow_mut().insert((handle, operation)) {
            log::debug!(
                target: "runmat_graphics",
                "{operation} already in progress for {handle}; skipping"
            );
            return None;
        }
        Some(GuardToken {
            active: self.active.clone(),
            key: (handle, operation),
        })
    }

    #[cfg(test)]
    pub fn is_active(&self, handle: Handle, operation: &'static str) -> bool {
        self.active.borrow().contains(&(handle, operation))
    }
}

#[must_use]
pub struct GuardToken {
    active: Rc<RefCell<HashSet<(Handle, &'static str)>>>,
    key: (Handle, &'static str),
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        self.active.borrow_mut().remove(&self.key);
    }
}

#[derive(Debug, Default)]
struct StackState {
    objects: Vec<Handle>,
    interpreter_depth: usize,
}

/// The "current callback object" stack plus a counter of nested interpreter
/// evaluations started by the engine.
#[derive(Debug, Clone, Default)]
pub struct CallbackStack {
    state: Rc<RefCell<StackState>>,
}

impl CallbackStack {
    pub fn push(&self, handle: Handle) -> CallbackFrame {
        self.state.borrow_mut().objects.push(handle);
        CallbackFrame {
            state: self.state.clone(),
        }
    }

    pub fn interpreter_frame(&self) -> InterpreterFrame {
        self.state.borrow_mut().interpreter_depth += 1;
        InterpreterFrame {
            state: self.state.clone(),
        }
    }

    pub fn current(&self) -> Option<Handle> {
        self.state.borrow().objects.last().copied()
    }

    pub fn is_executing(&self) -> bool {
        !self.state.borrow().objects.is_empty()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.state.borrow().objects.contains(&handle)
    }

    pub fn in_interpreter(&self) -> bool {
        self.state.borrow().interpreter_depth > 0
    }
}

#[must_use]
pub struct CallbackFrame {
    state: Rc<RefCell<StackState>>,
}

impl Drop for CallbackFrame {
    fn drop(&mut self) {
        self.state.borrow_mut().objects.pop();
    }
}

#[must_use]
pub struct InterpreterFrame {
    state: Rc<RefCell<StackState>>,
}

impl Drop for InterpreterFrame {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.interpreter_depth = state.interpreter_depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_entry_is_refused_until_released() {
        let guards = RecursionGuards::default();
        let h = Handle::new(-1.5);
        let outer = guards.enter(h, "axis_limits");
        assert!(outer.is_some());
        assert!(guards.enter(h, "axis_limits").is_none());
        assert!(guards.enter(h, "transform").is_some());
        drop(outer);
        assert!(!guards.is_active(h, "axis_limits"));
        assert!(guards.enter(h, "axis_limits").is_some());
    }

    #[test]
    fn frames_unwind_in_order() {
        let stack = CallbackStack::default();
        let a = Handle::new(1.0);
        let b = Handle::new(-2.5);
        {
            let _fa = stack.push(a);
            {
                let _fb = stack.push(b);
                assert_eq!(stack.current(), Some(b));
                assert!(stack.contains(a));
            }
            assert_eq!(stack.current(), Some(a));
        }
        assert!(!stack.is_executing());
    }

    #[test]
    fn interpreter_depth_unwinds_on_error() {
        let stack = CallbackStack::default();
        let run = || -> Result<(), ()> {
            let _frame = stack.interpreter_frame();
            assert!(stack.in_interpreter());
            Err(())
        };
        assert!(run().is_err());
        assert!(!stack.in_interpreter());
    }
}
