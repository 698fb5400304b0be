//! Lexical scope chain.
//!
//! Scopes are single-threaded (`Rc<RefCell>`) frames linked to their parent.
//! Each frame caches where non-local names were last found; the cache is
//! trusted only while the shared epoch is unchanged, and the epoch moves
//! whenever a frame gains a new name or is cleared.
//!
//! Scopes never cross threads. Detached tasks and closures receive a
//! [`ScopeSnapshot`] instead.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use sigma_heap::Gc;
use sigma_ir::Name;

/// A name's bound value and whether it may be reassigned.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub value: Gc,
    pub is_const: bool,
}

impl Binding {
    pub fn new(value: Gc, is_const: bool) -> Self {
        Binding { value, is_const }
    }
}

/// Why `Environment::reassign` failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignError {
    /// The binding is const.
    Const,
    /// No scope in the chain binds the name.
    Undefined,
}

/// Single-threaded shared frame.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

/// Shadowing epoch shared by every frame of one environment.
type Epoch = Rc<Cell<u64>>;

struct CacheEntry {
    owner: LocalScope<Scope>,
    epoch: u64,
}

/// One frame of bindings.
pub struct Scope {
    bindings: FxHashMap<Name, Binding>,
    parent: Option<LocalScope<Scope>>,
    cache: FxHashMap<Name, CacheEntry>,
    epoch: Epoch,
}

impl Scope {
    fn new(parent: Option<LocalScope<Scope>>, epoch: Epoch) -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent,
            cache: FxHashMap::default(),
            epoch,
        }
    }

    /// Insert or shadow `name` in this frame.
    pub fn declare(&mut self, name: Name, binding: Binding) {
        if self.bindings.insert(name, binding).is_none() {
            bump(&self.epoch);
        }
    }

    /// Binding of `name` in this frame only.
    pub fn local(&self, name: Name) -> Option<Binding> {
        self.bindings.get(&name).copied()
    }

    /// Resolve `name` through this frame and its ancestors.
    pub fn lookup(&mut self, name: Name) -> Option<Binding> {
        if let Some(binding) = self.bindings.get(&name) {
            return Some(*binding);
        }

        let now = self.epoch.get();
        if let Some(entry) = self.cache.get(&name) {
            if entry.epoch == now {
                if let Some(binding) = entry.owner.borrow().local(name) {
                    return Some(binding);
                }
            }
        }

        tracing::trace!(name = name.raw(), "scope cache miss");
        let owner = find_owner(self.parent.as_ref()?, name)?;
        let binding = owner.borrow().local(name)?;
        self.cache.insert(name, CacheEntry { owner, epoch: now });
        Some(binding)
    }

    /// Drop every binding while keeping the frame linked.
    pub fn clear(&mut self) {
        self.cache.clear();
        if !self.bindings.is_empty() {
            self.bindings.clear();
            bump(&self.epoch);
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("bindings", &self.bindings)
            .field("has_parent", &self.parent.is_some())
            .finish_non_exhaustive()
    }
}

fn bump(epoch: &Epoch) {
    epoch.set(epoch.get().wrapping_add(1));
}

/// First frame from `start` outward that binds `name`.
fn find_owner(start: &LocalScope<Scope>, name: Name) -> Option<LocalScope<Scope>> {
    let mut current = start.clone();
    loop {
        let next = {
            let scope = current.borrow();
            if scope.bindings.contains_key(&name) {
                break;
            }
            scope.parent.clone()?
        };
        current = next;
    }
    Some(current)
}

/// Immutable, thread-transferable copy of every visible binding.
#[derive(Clone, Default, PartialEq)]
pub struct ScopeSnapshot(Arc<FxHashMap<Name, Binding>>);

impl ScopeSnapshot {
    pub fn get(&self, name: Name) -> Option<Binding> {
        self.0.get(&name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Name, Binding)> + '_ {
        self.0.iter().map(|(name, binding)| (*name, *binding))
    }

    /// Bound handles, for tracing and pinning.
    pub fn values(&self) -> impl Iterator<Item = Gc> + '_ {
        self.0.values().map(|binding| binding.value)
    }
}

impl From<FxHashMap<Name, Binding>> for ScopeSnapshot {
    fn from(bindings: FxHashMap<Name, Binding>) -> Self {
        ScopeSnapshot(Arc::new(bindings))
    }
}

impl fmt::Debug for ScopeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeSnapshot({} bindings)", self.0.len())
    }
}

/// Stack of frames for one evaluation context.
pub struct Environment {
    /// Innermost frame last. Never empty.
    scopes: Vec<LocalScope<Scope>>,
    /// Program-level frame shared with closure calls.
    global: LocalScope<Scope>,
    epoch: Epoch,
}

impl Environment {
    /// Fresh environment with an empty root frame.
    pub fn new() -> Self {
        let epoch = Epoch::default();
        let global = LocalScope::new(Scope::new(None, Rc::clone(&epoch)));
        Environment {
            scopes: vec![global.clone()],
            global,
            epoch,
        }
    }

    /// Environment whose root frame holds the snapshot's bindings.
    pub fn from_snapshot(snapshot: &ScopeSnapshot) -> Self {
        let env = Environment::new();
        {
            let mut root = env.global.borrow_mut();
            for (name, binding) in snapshot.iter() {
                root.declare(name, binding);
            }
        }
        env
    }

    /// Environment for running a closure body: a frame holding the
    /// captured bindings, whose parent is this environment's global frame.
    pub fn for_closure(&self, captured: &ScopeSnapshot) -> Self {
        let epoch = Rc::clone(&self.epoch);
        let mut frame = Scope::new(Some(self.global.clone()), Rc::clone(&epoch));
        for (name, binding) in captured.iter() {
            frame.declare(name, binding);
        }
        Environment {
            scopes: vec![LocalScope::new(frame)],
            global: self.global.clone(),
            epoch,
        }
    }

    /// Number of frames on the stack.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    #[inline]
    fn current(&self) -> &LocalScope<Scope> {
        self.scopes.last().unwrap_or(&self.global)
    }

    pub fn push_scope(&mut self) {
        let frame = Scope::new(Some(self.current().clone()), Rc::clone(&self.epoch));
        self.scopes.push(LocalScope::new(frame));
    }

    /// Unlink the innermost frame. The bottom frame is never popped.
    /// Values stay in the arena.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn declare(&mut self, name: Name, value: Gc, is_const: bool) {
        self.current()
            .borrow_mut()
            .declare(name, Binding::new(value, is_const));
    }

    pub fn lookup(&self, name: Name) -> Option<Binding> {
        self.current().borrow_mut().lookup(name)
    }

    /// Rebind the nearest binding of `name`.
    pub fn reassign(&mut self, name: Name, value: Gc) -> Result<(), AssignError> {
        let mut current = self.current().clone();
        loop {
            let next = {
                let mut scope = current.borrow_mut();
                if let Some(binding) = scope.bindings.get_mut(&name) {
                    if binding.is_const {
                        return Err(AssignError::Const);
                    }
                    binding.value = value;
                    return Ok(());
                }
                scope.parent.clone()
            };
            match next {
                Some(parent) => current = parent,
                None => return Err(AssignError::Undefined),
            }
        }
    }

    /// Drop the innermost frame's bindings.
    pub fn clear_current(&mut self) {
        self.current().borrow_mut().clear();
    }

    /// Every visible name mapped to its binding; inner frames win.
    pub fn flatten(&self) -> FxHashMap<Name, Binding> {
        let mut visible = FxHashMap::default();
        self.walk(|scope| {
            for (name, binding) in &scope.bindings {
                visible.entry(*name).or_insert(*binding);
            }
        });
        visible
    }

    pub fn snapshot(&self) -> ScopeSnapshot {
        ScopeSnapshot::from(self.flatten())
    }

    /// Every handle bound anywhere in the chain, shadowed ones included.
    pub fn roots(&self) -> Vec<Gc> {
        let mut roots = Vec::new();
        self.walk(|scope| roots.extend(scope.bindings.values().map(|b| b.value)));
        roots
    }

    fn walk(&self, mut visit: impl FnMut(&Scope)) {
        let mut next = Some(self.current().clone());
        while let Some(frame) = next {
            let scope = frame.borrow();
            visit(&scope);
            next = scope.parent.clone();
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("depth", &self.scopes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
