//! Handle registry: owns every live [`GraphicsObject`], allocates and recycles
//! handles, and keeps parent/child links and the figure stack consistent.

use std::collections::{BTreeMap, HashMap};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::handle::Handle;
use crate::kinds::ObjectKind;
use crate::object::GraphicsObject;
use crate::value::Value;

pub struct HandleManager {
    objects: HashMap<Handle, GraphicsObject>,
    /// Recycled non-figure handles keyed by integer part.
    free_list: BTreeMap<i64, f64>,
    next_handle: f64,
    rng: StdRng,
    /// Most recently shown figure first.
    figure_stack: Vec<Handle>,
}

impl HandleManager {
    pub fn new(seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let next_handle = -1.0 - jitter(&mut rng);
        let mut objects = HashMap::new();
        objects.insert(
            Handle::ROOT,
            GraphicsObject::new(Handle::ROOT, ObjectKind::Root, None),
        );
        HandleManager {
            objects,
            free_list: BTreeMap::new(),
            next_handle,
            rng,
            figure_stack: Vec::new(),
        }
    }

    /// Fresh handle. Figures get the lowest unused positive integer; other
    /// kinds a recycled or new negative non-integer.
    pub fn allocate(&mut self, is_figure: bool) -> Handle {
        if is_figure {
            return self.lowest_free_integer();
        }
        if let Some((_, value)) = self.free_list.pop_first() {
            return Handle::new(value);
        }
        let h = self.next_handle;
        let f = jitter(&mut self.rng);
        self.next_handle = h.ceil() - 1.0 - f;
        Handle::new(h)
    }

    pub fn lowest_free_integer(&self) -> Handle {
        let mut n = 1.0;
        while self.objects.contains_key(&Handle::new(n)) {
            n += 1.0;
        }
        Handle::new(n)
    }

    /// Return a non-figure handle's integer slot to the free list with a new
    /// fractional part.
    fn recycle(&mut self, handle: Handle) {
        let v = handle.value();
        if v >= 0.0 || handle.is_integer() {
            return;
        }
        let base = v.ceil();
        let old_frac = base - v;
        let mut f = jitter(&mut self.rng);
        while (f - old_frac).abs() < f64::EPSILON {
            f = jitter(&mut self.rng);
        }
        self.free_list.insert(base as i64, base - f);
    }

    pub fn insert(&mut self, object: GraphicsObject) {
        self.objects.insert(object.handle(), object);
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.objects.contains_key(&handle)
    }

    pub fn get(&self, handle: Handle) -> Option<&GraphicsObject> {
        self.objects.get(&handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut GraphicsObject> {
        self.objects.get_mut(&handle)
    }

    pub fn root(&self) -> Option<&GraphicsObject> {
        self.objects.get(&Handle::ROOT)
    }

    /// Erase `handle` and recycle it. The root is never erased.
    pub fn remove(&mut self, handle: Handle) -> Option<GraphicsObject> {
        if handle.is_root() {
            return None;
        }
        let removed = self.objects.remove(&handle);
        if removed.is_some() {
            self.recycle(handle);
            self.figure_stack.retain(|h| *h != handle);
        }
        removed
    }

    pub fn kind_of(&self, handle: Handle) -> Option<ObjectKind> {
        self.objects.get(&handle).map(GraphicsObject::kind)
    }

    /// Put `child` at the front of `parent`'s children. A figure without a
    /// current axes adopts the first axes child as current.
    pub fn adopt(&mut self, parent: Handle, child: Handle) {
        let child_is_axes = self.kind_of(child) == Some(ObjectKind::Axes);
        if let Some(c) = self.objects.get_mut(&child) {
            c.set_parent(Some(parent));
        }
        if let Some(p) = self.objects.get_mut(&parent) {
            p.children_mut().retain(|h| *h != child);
            p.children_mut().insert(0, child);
            if p.kind() == ObjectKind::Figure
                && child_is_axes
                && p.value("currentaxes") == Value::Empty
            {
                if let Some(prop) = p.props.get_mut("currentaxes") {
                    prop.store(Value::from(child));
                }
            }
        }
    }

    /// Unlink `child` from `parent`. If it was the figure's current axes the
    /// next remaining axes (or none) becomes current.
    pub fn remove_child(&mut self, parent: Handle, child: Handle) {
        let Some(p) = self.objects.get(&parent) else {
            return;
        };
        let reselect = p.kind() == ObjectKind::Figure
            && p.handle_value("currentaxes") == Some(child);
        let replacement = if reselect {
            p.children()
                .iter()
                .copied()
                .filter(|h| *h != child)
                .find(|h| self.kind_of(*h) == Some(ObjectKind::Axes))
        } else {
            None
        };
        if let Some(p) = self.objects.get_mut(&parent) {
            p.children_mut().retain(|h| *h != child);
            if reselect {
                if let Some(prop) = p.props.get_mut("currentaxes") {
                    prop.store(replacement.map(Value::from).unwrap_or(Value::Empty));
                }
            }
        }
    }

    /// Give a figure a new handle, fixing every reference to the old one.
    pub fn renumber(&mut self, old: Handle, new: Handle) -> bool {
        if old == new || self.objects.contains_key(&new) {
            return false;
        }
        let Some(mut object) = self.objects.remove(&old) else {
            return false;
        };
        object.set_handle(new);
        let parent = object.parent();
        let children = object.children().to_vec();
        self.objects.insert(new, object);

        if let Some(p) = parent.and_then(|p| self.objects.get_mut(&p)) {
            for h in p.children_mut().iter_mut() {
                if *h == old {
                    *h = new;
                }
            }
        }
        for child in children {
            if let Some(c) = self.objects.get_mut(&child) {
                c.set_parent(Some(new));
            }
        }
        for h in self.figure_stack.iter_mut() {
            if *h == old {
                *h = new;
            }
        }
        if let Some(root) = self.objects.get_mut(&Handle::ROOT) {
            if root.handle_value("currentfigure") == Some(old) {
                if let Some(prop) = root.props.get_mut("currentfigure") {
                    prop.store(Value::from(new));
                }
            }
        }
        true
    }

    /// Move `figure` to the head of the figure stack.
    pub fn push_figure(&mut self, figure: Handle) {
        self.figure_stack.retain(|h| *h != figure);
        self.figure_stack.insert(0, figure);
    }

    pub fn pop_figure(&mut self, figure: Handle) {
        self.figure_stack.retain(|h| *h != figure);
    }

    pub fn figure_stack(&self) -> &[Handle] {
        &self.figure_stack
    }

    /// Every live handle except the root, in no particular order.
    pub fn all_handles(&self) -> Vec<Handle> {
        self.objects
            .keys()
            .copied()
            .filter(|h| !h.is_root())
            .collect()
    }

    /// Figure handles in figure-stack order, followed by any figure not on
    /// the stack (never shown).
    pub fn figure_handles(&self) -> Vec<Handle> {
        let mut out: Vec<Handle> = self.figure_stack.clone();
        let mut rest: Vec<Handle> = self
            .objects
            .values()
            .filter(|o| o.kind() == ObjectKind::Figure && !out.contains(&o.handle()))
            .map(GraphicsObject::handle)
            .collect();
        rest.sort_by(|a, b| a.value().total_cmp(&b.value()));
        out.extend(rest);
        out
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Fractional jitter in `(0, 1)`.
fn jitter(rng: &mut StdRng) -> f64 {
    let r: u32 = rng.gen();
    (r as f64 + 1.0) / (u32::MAX as f64 + 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> HandleManager {
        HandleManager::new(Some(11))
    }

    fn add(m: &mut HandleManager, kind: ObjectKind, parent: Handle) -> Handle {
        let h = m.allocate(kind.is_figure());
        m.insert(GraphicsObject::new(h, kind, Some(parent)));
        m.adopt(parent, h);
        h
    }

    #[test]
    fn figures_use_lowest_free_integer() {
        let mut m = manager();
        let f1 = add(&mut m, ObjectKind::Figure, Handle::ROOT);
        let f2 = add(&mut m, ObjectKind::Figure, Handle::ROOT);
        assert_eq!((f1.value(), f2.value()), (1.0, 2.0));
        m.remove(f1);
        assert_eq!(m.allocate(true).value(), 1.0);
    }

    #[test]
    fn non_figure_handles_are_negative_fractions() {
        let mut m = manager();
        let a = m.allocate(false);
        let b = m.allocate(false);
        assert!(a.value() < 0.0 && !a.is_integer());
        assert!(b.value() < a.value());
        assert_ne!(a.value().ceil(), b.value().ceil());
    }

    #[test]
    fn recycled_handles_get_new_jitter() {
        let mut m = manager();
        let f = add(&mut m, ObjectKind::Figure, Handle::ROOT);
        let ax = add(&mut m, ObjectKind::Axes, f);
        m.remove_child(f, ax);
        m.remove(ax);
        let again = m.allocate(false);
        assert_eq!(again.value().ceil(), ax.value().ceil());
        assert_ne!(again, ax);
    }

    #[test]
    fn adopt_selects_first_axes() {
        let mut m = manager();
        let f = add(&mut m, ObjectKind::Figure, Handle::ROOT);
        let ax1 = add(&mut m, ObjectKind::Axes, f);
        let ax2 = add(&mut m, ObjectKind::Axes, f);
        let fig = m.get(f).unwrap();
        assert_eq!(fig.handle_value("currentaxes"), Some(ax1));
        assert_eq!(fig.children(), &[ax2, ax1]);
        m.remove_child(f, ax1);
        assert_eq!(m.get(f).unwrap().handle_value("currentaxes"), Some(ax2));
        m.remove_child(f, ax2);
        assert_eq!(m.get(f).unwrap().value("currentaxes"), Value::Empty);
    }

    #[test]
    fn renumber_fixes_links() {
        let mut m = manager();
        let f = add(&mut m, ObjectKind::Figure, Handle::ROOT);
        let ax = add(&mut m, ObjectKind::Axes, f);
        m.push_figure(f);
        if let Some(p) = m
            .get_mut(Handle::ROOT)
            .and_then(|r| r.props.get_mut("currentfigure"))
        {
            p.store(Value::from(f));
        }
        let new = Handle::new(-7.25);
        assert!(m.renumber(f, new));
        assert!(!m.contains(f));
        assert_eq!(m.get(ax).unwrap().parent(), Some(new));
        assert_eq!(m.root().unwrap().children(), &[new]);
        assert_eq!(m.figure_stack(), &[new]);
        assert_eq!(m.root().unwrap().handle_value("currentfigure"), Some(new));
    }
}
