//! Scope handles: the persistent storage behind linked state.
//!
//! A [`ScopeHandle`] is a slot that outlives the view that requested it. Views are rebuilt
//! on every pass; a handle is found again on the next pass through its key:
//!
//! - anonymous handles are keyed by their position: the enclosing handle, the owner view
//!   type and the ordinal among anonymous siblings of that type,
//! - identified handles are keyed by `(owner view type, identity)` only, so they follow the
//!   identity wherever it appears in the tree.
//!
//! Creating a handle pushes it onto a scope stack; the inflater pops it once the node is
//! built. Pops happen in reverse push order, matching the depth-first walk of the tree.
//!
//! [`ScopeAllocator`] is the contract the inflater consumes. [`ScopeRegistry`] is the stock
//! implementation.

use core::any::{Any, TypeId, type_name};
use core::cell::{Cell, RefCell};
use core::fmt::{self, Debug};
use core::hash::{Hash, Hasher};
use std::collections::HashMap;
use std::rc::Rc;

use crate::Error;

/// The view type that owns a scope handle or node.
#[derive(Clone, Copy)]
pub struct Owner {
    type_id: TypeId,
    name: &'static str,
}

impl Owner {
    /// Returns the owner for the type `V`.
    #[must_use]
    pub fn of<V: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<V>(),
            name: type_name::<V>(),
        }
    }

    /// Returns the [`TypeId`] of the owner type.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the full type name of the owner.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the type name without its module path or generic arguments.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let name = self.name.split('<').next().unwrap_or(self.name);
        name.rsplit("::").next().unwrap_or(name)
    }

    /// Whether this owner is the type `V`.
    #[must_use]
    pub fn is<V: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<V>()
    }
}

impl PartialEq for Owner {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Owner {}

impl Hash for Owner {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl Debug for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

trait AnyKey: Any + Debug {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn AnyKey) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
}

impl<T: 'static + Hash + Eq + Debug> AnyKey for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn AnyKey) -> bool {
        other.as_any().downcast_ref::<T>() == Some(self)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }
}

/// A type-erased, hashable identity value supplied by an [`Identifiable`](crate::Identifiable) view.
#[derive(Clone)]
pub struct Identity(Rc<dyn AnyKey>);

impl Identity {
    /// Wraps an identity value.
    pub fn new<T: 'static + Hash + Eq + Debug>(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// Returns the wrapped value if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(other.0.as_ref())
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.dyn_hash(state);
    }
}

impl Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

/// Identifier of a scope handle, stable for as long as the handle lives.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl ScopeId {
    /// Creates a scope id from its raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({})", self.0)
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct ScopeInner {
    id: ScopeId,
    owner: Owner,
    identity: Option<Identity>,
    slots: RefCell<Vec<Option<Box<dyn Any>>>>,
    dirty: Cell<bool>,
}

/// A persistent storage slot owned by a retained node.
///
/// Cloning the handle is cheap and yields another reference to the same storage. Two
/// handles compare equal when they refer to the same storage.
#[derive(Clone)]
pub struct ScopeHandle(Rc<ScopeInner>);

impl ScopeHandle {
    /// Creates a detached handle.
    ///
    /// Allocators call this; views receive handles through linking.
    #[must_use]
    pub fn new(id: ScopeId, owner: Owner, identity: Option<Identity>) -> Self {
        Self(Rc::new(ScopeInner {
            id,
            owner,
            identity,
            slots: RefCell::new(Vec::new()),
            dirty: Cell::new(false),
        }))
    }

    /// Returns the id of this handle.
    #[must_use]
    pub fn id(&self) -> ScopeId {
        self.0.id
    }

    /// Returns the view type that requested this handle.
    #[must_use]
    pub fn owner(&self) -> Owner {
        self.0.owner
    }

    /// Returns the explicit identity, or `None` for anonymous handles.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.0.identity.as_ref()
    }

    /// Number of slots currently allocated.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.0.slots.borrow().len()
    }

    /// Whether a slot at `position` holds a value.
    #[must_use]
    pub fn is_occupied(&self, position: usize) -> bool {
        self.0
            .slots
            .borrow()
            .get(position)
            .is_some_and(Option::is_some)
    }

    /// Whether the value at `position` has type `T`.
    #[must_use]
    pub fn holds<T: 'static>(&self, position: usize) -> bool {
        self.0
            .slots
            .borrow()
            .get(position)
            .and_then(Option::as_ref)
            .is_some_and(|value| value.is::<T>())
    }

    /// Returns a copy of the value at `position`, if it exists and has type `T`.
    ///
    /// No borrow of the slots outlives the call.
    #[must_use]
    pub fn load<T: Clone + 'static>(&self, position: usize) -> Option<T> {
        self.with_slot(position, T::clone)
    }

    /// Runs `f` with the value at `position`, if it exists and has type `T`.
    ///
    /// The slots stay borrowed while `f` runs, so `f` must not touch this handle.
    pub fn with_slot<T: 'static, R>(&self, position: usize, f: impl FnOnce(&T) -> R) -> Option<R> {
        let slots = self.0.slots.borrow();
        slots
            .get(position)
            .and_then(Option::as_ref)
            .and_then(|value| value.downcast_ref::<T>())
            .map(f)
    }

    /// Runs `f` with mutable access to the value at `position`, if it exists and has type `T`.
    ///
    /// The slots stay borrowed while `f` runs, so `f` must not touch this handle.
    pub fn update_slot<T: 'static, R>(
        &self,
        position: usize,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        let mut slots = self.0.slots.borrow_mut();
        slots
            .get_mut(position)
            .and_then(Option::as_mut)
            .and_then(|value| value.downcast_mut::<T>())
            .map(f)
    }

    /// Stores `value` at `position`, replacing whatever was there.
    pub fn store<T: 'static>(&self, position: usize, value: T) {
        let mut slots = self.0.slots.borrow_mut();
        if slots.len() <= position {
            slots.resize_with(position + 1, || None);
        }
        slots[position] = Some(Box::new(value));
    }

    /// Whether state stored in this handle changed since it was last acquired.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.0.dirty.get()
    }

    /// Flags the handle as changed.
    pub fn mark_dirty(&self) {
        self.0.dirty.set(true);
    }

    pub(crate) fn clear_dirty(&self) {
        self.0.dirty.set(false);
    }
}

impl PartialEq for ScopeHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ScopeHandle {}

impl Debug for ScopeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeHandle")
            .field("id", &self.0.id)
            .field("owner", &self.0.owner)
            .field("identity", &self.0.identity)
            .field("slots", &self.slot_count())
            .finish()
    }
}

/// The allocation contract the inflater relies on.
pub trait ScopeAllocator {
    /// Returns the handle for `(owner, identity)` and pushes it onto the scope stack.
    ///
    /// With an identity, the same pair must always yield the same handle. Without one,
    /// every call yields a distinct handle for the current position.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle cannot be allocated.
    fn create_scope_handle(
        &mut self,
        owner: Owner,
        identity: Option<Identity>,
    ) -> Result<ScopeHandle, Error>;

    /// Closes the most recently pushed scope and returns its handle.
    ///
    /// # Errors
    ///
    /// Returns an error if no scope is open.
    fn pop_scope(&mut self) -> Result<ScopeHandle, Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ScopeKey {
    Anonymous {
        parent: Option<ScopeId>,
        owner: Owner,
        ordinal: usize,
    },
    Identified {
        owner: Owner,
        identity: Identity,
    },
}

/// Handle churn of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassSummary {
    /// Handles allocated for the first time.
    pub created: usize,
    /// Handles carried over from the previous pass.
    pub reused: usize,
    /// Handles from the previous pass that were not requested again and got dropped.
    pub discarded: usize,
}

/// The default [`ScopeAllocator`]: an in-memory registry with a pass lifecycle.
///
/// Call [`begin_pass`](Self::begin_pass) before inflating and [`end_pass`](Self::end_pass)
/// afterwards. Handles requested during a pass are kept for the next one; the rest are
/// dropped together with their state.
#[derive(Debug, Default)]
pub struct ScopeRegistry {
    previous: HashMap<ScopeKey, ScopeHandle>,
    current: HashMap<ScopeKey, ScopeHandle>,
    ordinals: HashMap<(Option<ScopeId>, Owner), usize>,
    stack: Vec<ScopeHandle>,
    next_id: u64,
    in_pass: bool,
    summary: PassSummary,
}

impl ScopeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a pass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PassInProgress`] if a pass has not been ended.
    pub fn begin_pass(&mut self) -> Result<(), Error> {
        if self.in_pass {
            return Err(Error::PassInProgress);
        }
        self.in_pass = true;
        self.summary = PassSummary::default();
        self.ordinals.clear();
        tracing::trace!(live = self.previous.len(), "scope pass started");
        Ok(())
    }

    /// Ends the pass and drops every handle that was not requested during it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActivePass`] outside a pass, and
    /// [`Error::UnbalancedScopeStack`] if scopes are still open. The pass stays open in
    /// the latter case.
    pub fn end_pass(&mut self) -> Result<PassSummary, Error> {
        if !self.in_pass {
            return Err(Error::NoActivePass);
        }
        if !self.stack.is_empty() {
            return Err(Error::UnbalancedScopeStack {
                depth: self.stack.len(),
            });
        }
        self.in_pass = false;
        self.summary.discarded = self.previous.len();
        self.previous = core::mem::take(&mut self.current);
        let summary = self.summary;
        tracing::debug!(
            created = summary.created,
            reused = summary.reused,
            discarded = summary.discarded,
            "scope pass finished"
        );
        Ok(summary)
    }

    /// Abandons the running pass, keeping every handle from before and during it.
    ///
    /// Open scopes are closed. Does nothing outside a pass.
    pub fn abort_pass(&mut self) {
        if !self.in_pass {
            return;
        }
        self.stack.clear();
        self.previous.extend(self.current.drain());
        self.in_pass = false;
        tracing::debug!(live = self.previous.len(), "scope pass aborted");
    }

    /// Whether a pass is in progress.
    #[must_use]
    pub const fn in_pass(&self) -> bool {
        self.in_pass
    }

    /// Number of scopes currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns the innermost open scope.
    #[must_use]
    pub fn current_scope(&self) -> Option<&ScopeHandle> {
        self.stack.last()
    }

    /// Number of handles retained from the last finished pass, or acquired so far in the
    /// running one.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.in_pass {
            self.current.len()
        } else {
            self.previous.len()
        }
    }

    /// Whether no handles are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handles whose state changed since they were last acquired, ordered by id.
    #[must_use]
    pub fn dirty_scopes(&self) -> Vec<ScopeId> {
        let handles = if self.in_pass {
            &self.current
        } else {
            &self.previous
        };
        let mut dirty: Vec<_> = handles
            .values()
            .filter(|handle| handle.is_dirty())
            .map(ScopeHandle::id)
            .collect();
        dirty.sort_unstable();
        dirty
    }

    fn key_for(&mut self, owner: Owner, identity: Option<Identity>) -> ScopeKey {
        match identity {
            Some(identity) => ScopeKey::Identified { owner, identity },
            None => {
                let parent = self.stack.last().map(ScopeHandle::id);
                let counter = self.ordinals.entry((parent, owner)).or_insert(0);
                let ordinal = *counter;
                *counter += 1;
                ScopeKey::Anonymous {
                    parent,
                    owner,
                    ordinal,
                }
            }
        }
    }

    fn allocate(&mut self, owner: Owner, identity: Option<Identity>) -> ScopeHandle {
        self.next_id += 1;
        ScopeHandle::new(ScopeId(self.next_id), owner, identity)
    }
}

impl ScopeAllocator for ScopeRegistry {
    fn create_scope_handle(
        &mut self,
        owner: Owner,
        identity: Option<Identity>,
    ) -> Result<ScopeHandle, Error> {
        if !self.in_pass {
            return Err(Error::NoActivePass);
        }
        let key = self.key_for(owner, identity.clone());

        let handle = if let Some(handle) = self.current.get(&key) {
            tracing::warn!(
                owner = owner.name(),
                identity = ?identity,
                "duplicate identity in one pass; sharing the scope handle"
            );
            handle.clone()
        } else if let Some(handle) = self.previous.remove(&key) {
            handle.clear_dirty();
            self.summary.reused += 1;
            tracing::debug!(owner = owner.name(), scope = %handle.id(), "scope handle reused");
            self.current.insert(key, handle.clone());
            handle
        } else {
            let handle = self.allocate(owner, identity);
            self.summary.created += 1;
            tracing::debug!(owner = owner.name(), scope = %handle.id(), "scope handle created");
            self.current.insert(key, handle.clone());
            handle
        };

        self.stack.push(handle.clone());
        Ok(handle)
    }

    fn pop_scope(&mut self) -> Result<ScopeHandle, Error> {
        self.stack.pop().ok_or(Error::ScopeStackUnderflow)
    }
}

#[cfg(test)]
mod tests {
    use super::{Identity, Owner, ScopeAllocator, ScopeRegistry};
    use crate::Error;

    struct Parent;
    struct Child;

    #[test]
    fn identity_equality_is_typed() {
        assert_eq!(Identity::new(1_u32), Identity::new(1_u32));
        assert_ne!(Identity::new(1_u32), Identity::new(2_u32));
        assert_ne!(Identity::new(1_u32), Identity::new(1_u64));
        assert_eq!(Identity::new("row").downcast_ref::<&str>(), Some(&"row"));
    }

    #[test]
    fn owner_short_name_strips_path() {
        assert_eq!(Owner::of::<Parent>().short_name(), "Parent");
        assert!(Owner::of::<Parent>().is::<Parent>());
        assert_ne!(Owner::of::<Parent>(), Owner::of::<Child>());
    }

    #[test]
    fn requires_active_pass() {
        let mut registry = ScopeRegistry::new();
        assert_eq!(
            registry
                .create_scope_handle(Owner::of::<Parent>(), None)
                .unwrap_err(),
            Error::NoActivePass
        );
        assert_eq!(registry.end_pass().unwrap_err(), Error::NoActivePass);
        registry.begin_pass().unwrap();
        assert_eq!(registry.begin_pass().unwrap_err(), Error::PassInProgress);
    }

    #[test]
    fn anonymous_handles_are_distinct_within_a_pass() {
        let mut registry = ScopeRegistry::new();
        registry.begin_pass().unwrap();
        let first = registry
            .create_scope_handle(Owner::of::<Parent>(), None)
            .unwrap();
        registry.pop_scope().unwrap();
        let second = registry
            .create_scope_handle(Owner::of::<Parent>(), None)
            .unwrap();
        registry.pop_scope().unwrap();
        assert_ne!(first, second);
        registry.end_pass().unwrap();
    }

    #[test]
    fn anonymous_handles_persist_by_position() {
        let mut registry = ScopeRegistry::new();
        let run = |registry: &mut ScopeRegistry| {
            registry.begin_pass().unwrap();
            let parent = registry
                .create_scope_handle(Owner::of::<Parent>(), None)
                .unwrap();
            let child = registry
                .create_scope_handle(Owner::of::<Child>(), None)
                .unwrap();
            assert_eq!(registry.pop_scope().unwrap(), child);
            assert_eq!(registry.pop_scope().unwrap(), parent);
            let summary = registry.end_pass().unwrap();
            (parent, child, summary)
        };

        let (parent, child, summary) = run(&mut registry);
        assert_eq!(summary.created, 2);
        let (parent_again, child_again, summary) = run(&mut registry);
        assert_eq!(parent, parent_again);
        assert_eq!(child, child_again);
        assert_eq!(summary.reused, 2);
        assert_eq!(summary.created, 0);
    }

    #[test]
    fn identified_handles_follow_identity_across_parents() {
        let mut registry = ScopeRegistry::new();
        registry.begin_pass().unwrap();
        let keyed = registry
            .create_scope_handle(Owner::of::<Child>(), Some(Identity::new("row")))
            .unwrap();
        registry.pop_scope().unwrap();
        registry.end_pass().unwrap();

        registry.begin_pass().unwrap();
        registry
            .create_scope_handle(Owner::of::<Parent>(), None)
            .unwrap();
        let moved = registry
            .create_scope_handle(Owner::of::<Child>(), Some(Identity::new("row")))
            .unwrap();
        registry.pop_scope().unwrap();
        registry.pop_scope().unwrap();
        registry.end_pass().unwrap();

        assert_eq!(keyed, moved);
    }

    #[test]
    fn unrequested_handles_are_discarded() {
        let mut registry = ScopeRegistry::new();
        registry.begin_pass().unwrap();
        registry
            .create_scope_handle(Owner::of::<Parent>(), None)
            .unwrap();
        registry.pop_scope().unwrap();
        registry.end_pass().unwrap();
        assert_eq!(registry.len(), 1);

        registry.begin_pass().unwrap();
        let summary = registry.end_pass().unwrap();
        assert_eq!(summary.discarded, 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn unbalanced_stack_keeps_pass_open() {
        let mut registry = ScopeRegistry::new();
        registry.begin_pass().unwrap();
        registry
            .create_scope_handle(Owner::of::<Parent>(), None)
            .unwrap();
        assert_eq!(
            registry.end_pass().unwrap_err(),
            Error::UnbalancedScopeStack { depth: 1 }
        );
        assert!(registry.in_pass());
        registry.pop_scope().unwrap();
        assert_eq!(registry.pop_scope().unwrap_err(), Error::ScopeStackUnderflow);
        registry.end_pass().unwrap();
    }

    #[test]
    fn aborted_pass_keeps_handles() {
        let mut registry = ScopeRegistry::new();
        registry.begin_pass().unwrap();
        let first = registry
            .create_scope_handle(Owner::of::<Parent>(), None)
            .unwrap();
        registry.pop_scope().unwrap();
        registry.end_pass().unwrap();

        registry.begin_pass().unwrap();
        registry
            .create_scope_handle(Owner::of::<Child>(), None)
            .unwrap();
        registry.abort_pass();
        assert!(!registry.in_pass());
        assert_eq!(registry.depth(), 0);
        assert_eq!(registry.len(), 2);

        registry.begin_pass().unwrap();
        let again = registry
            .create_scope_handle(Owner::of::<Parent>(), None)
            .unwrap();
        assert_eq!(first, again);
        registry.pop_scope().unwrap();
        registry.end_pass().unwrap();
    }

    #[test]
    fn slots_store_typed_values() {
        let mut registry = ScopeRegistry::new();
        registry.begin_pass().unwrap();
        let handle = registry
            .create_scope_handle(Owner::of::<Parent>(), None)
            .unwrap();
        handle.store(1, 7_i32);
        assert_eq!(handle.slot_count(), 2);
        assert!(!handle.is_occupied(0));
        assert!(handle.holds::<i32>(1));
        assert_eq!(handle.with_slot(1, |value: &i32| *value), Some(7));
        assert_eq!(handle.with_slot(1, |value: &u8| *value), None);
        handle.update_slot(1, |value: &mut i32| *value += 1);
        assert_eq!(handle.with_slot(1, |value: &i32| *value), Some(8));
        registry.pop_scope().unwrap();
        registry.end_pass().unwrap();
    }
}
