//! Linkable state fields.
//!
//! A view is rebuilt on every pass, so a value stored directly in a view field is lost
//! between passes. A [`State`] field instead keeps its value inside the [`ScopeHandle`] of
//! the view's node once it has been linked, and the next instance of the same view picks
//! it up again.
//!
//! Fields are matched to storage by their position in [`View::linkable_state`](crate::View::linkable_state),
//! not by name. Reordering the list between passes hands one field's value to another.

use core::cell::{Cell, RefCell};
use core::fmt::{self, Debug};

use crate::ScopeHandle;

/// A field that can be bound to a position inside a scope handle.
pub trait LinkableState {
    /// Binds the field to slot `position` of `handle`.
    fn link(&self, handle: &ScopeHandle, position: usize);
}

/// The ordered list of linkable fields a view exposes.
///
/// Usually built with the [`linkable!`](crate::linkable) macro.
#[derive(Default)]
pub struct StateFields<'a> {
    fields: Vec<&'a dyn LinkableState>,
}

impl<'a> StateFields<'a> {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Creates a list from fields in declaration order.
    #[must_use]
    pub const fn from_fields(fields: Vec<&'a dyn LinkableState>) -> Self {
        Self { fields }
    }

    /// Appends a field.
    pub fn push(&mut self, field: &'a dyn LinkableState) {
        self.fields.push(field);
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the view exposes no linkable field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Links every field to `handle`, each at its position in this list.
    pub fn link_all(&self, handle: &ScopeHandle) {
        for (position, field) in self.fields.iter().enumerate() {
            tracing::trace!(scope = %handle.id(), position, "linking state field");
            field.link(handle, position);
        }
    }
}

impl Debug for StateFields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateFields")
            .field("len", &self.fields.len())
            .finish()
    }
}

/// A view field whose value persists across passes once linked.
///
/// Before linking, reads return the initial value and writes only change the local copy.
/// After linking, reads and writes go to the scope handle and mark it dirty.
pub struct State<T> {
    local: RefCell<T>,
    link: RefCell<Option<ScopeHandle>>,
    position: Cell<usize>,
}

impl<T: Clone + 'static> State<T> {
    /// Creates a field with the value used when no stored value exists yet.
    pub const fn new(initial: T) -> Self {
        Self {
            local: RefCell::new(initial),
            link: RefCell::new(None),
            position: Cell::new(0),
        }
    }

    /// Whether the field has been linked to a scope handle.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.link.borrow().is_some()
    }

    /// The handle and position this field is linked to.
    #[must_use]
    pub fn linked_to(&self) -> Option<(ScopeHandle, usize)> {
        self.link
            .borrow()
            .as_ref()
            .map(|handle| (handle.clone(), self.position.get()))
    }

    /// Returns a copy of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    /// Runs `f` with a reference to the current value.
    ///
    /// `f` runs on a copy, so it may read or write other fields of the same view.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self
            .linked_to()
            .and_then(|(handle, position)| handle.load::<T>(position))
            .unwrap_or_else(|| self.local.borrow().clone());
        f(&value)
    }

    /// Replaces the value.
    pub fn set(&self, value: T) {
        self.update(|current| *current = value);
    }

    /// Mutates the value.
    ///
    /// Once linked, `f` runs on a copy that is written back to the handle afterwards.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let Some((handle, position)) = self.linked_to() else {
            return f(&mut self.local.borrow_mut());
        };
        let mut value = handle
            .load::<T>(position)
            .unwrap_or_else(|| self.local.borrow().clone());
        let result = f(&mut value);
        handle.store(position, value);
        handle.mark_dirty();
        result
    }
}

impl<T: Clone + 'static> LinkableState for State<T> {
    fn link(&self, handle: &ScopeHandle, position: usize) {
        if !handle.is_occupied(position) {
            handle.store(position, self.local.borrow().clone());
        } else if !handle.holds::<T>(position) {
            tracing::warn!(
                owner = handle.owner().name(),
                position,
                expected = core::any::type_name::<T>(),
                "state slot holds a value of another type; resetting it"
            );
            handle.store(position, self.local.borrow().clone());
        }
        *self.link.borrow_mut() = Some(handle.clone());
        self.position.set(position);
    }
}

/// Clones into an unlinked field whose initial value is the current value.
impl<T: Clone + 'static> Clone for State<T> {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl<T: Clone + Default + 'static> Default for State<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Debug> Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let linked = self.link.borrow().as_ref().map(ScopeHandle::id);
        f.debug_struct("State")
            .field("initial", &self.local.borrow())
            .field("scope", &linked)
            .field("position", &self.position.get())
            .finish()
    }
}
