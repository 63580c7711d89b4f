//! Inflation: turning a view into a node.
//!
//! [`InflationContext::inflate`] runs the three steps for one view and recurses into the
//! body through [`Body::inflate_body`](crate::Body::inflate_body):
//!
//! ```text
//! classify ──▶ discover_and_link ──▶ materialize ──▶ pop scope (if one was created)
//! ```
//!
//! Every scope handle created while inflating a view is popped before `inflate` returns,
//! whether materialization succeeded or not, so scopes close in reverse creation order.

use core::any::type_name;

use crate::{
    Body, ConfigurationCapability, Error, IdentityCapability, InflationModel, Node, NodeContent,
    Owner, ScopeAllocator, ScopeHandle, ScopeRegistry, Strategy, View, classify,
};

/// The state shared by every view inflated during one pass.
pub struct InflationContext<'a> {
    scopes: &'a mut dyn ScopeAllocator,
}

impl_debug!(InflationContext<'_>);

impl<'a> InflationContext<'a> {
    /// Creates a context allocating scope handles from `scopes`.
    pub fn new(scopes: &'a mut dyn ScopeAllocator) -> Self {
        Self { scopes }
    }

    /// Inflates `view` into a node.
    ///
    /// Stateless anonymous containers do not get a node of their own; their inflated body is
    /// returned instead, and `model` is passed on to it.
    ///
    /// # Errors
    ///
    /// Propagates allocator errors from this view or any view below it.
    pub fn inflate<V: View>(
        &mut self,
        view: V,
        model: Option<&InflationModel>,
    ) -> Result<Node, Error> {
        let strategy = const { classify::<V>() };
        let span = tracing::trace_span!("inflate", view = type_name::<V>());
        let _entered = span.enter();
        tracing::trace!(?strategy, "classified view");

        let force_node =
            strategy.honors_forced_node() && model.is_some_and(InflationModel::requires_node);
        let scope = self.discover_and_link(&view, force_node)?;
        let strategy = strategy.resolve(scope.is_some());

        let node = self.materialize(strategy, view, scope.clone(), model);
        let closed = match &scope {
            Some(_) => self.scopes.pop_scope().map(Some),
            None => Ok(None),
        };
        let node = node?;
        let closed = closed?;
        debug_assert_eq!(closed, scope, "scopes must close in reverse creation order");
        Ok(node)
    }

    /// Finds the linkable fields of `view` and links them to a scope handle.
    ///
    /// A handle is requested when the view has linkable fields, when `force_node` is set,
    /// or when the view has a stable identity. Otherwise nothing is allocated and `None` is
    /// returned. Each field is linked once, at its position in
    /// [`View::linkable_state`].
    ///
    /// A returned handle has been pushed onto the allocator's scope stack; the caller owns
    /// the matching pop.
    ///
    /// # Errors
    ///
    /// Propagates allocator errors.
    pub fn discover_and_link<V: View>(
        &mut self,
        view: &V,
        force_node: bool,
    ) -> Result<Option<ScopeHandle>, Error> {
        let fields = view.linkable_state();
        let identity = <V::Identity as IdentityCapability<V>>::identity(view);
        if fields.is_empty() && !force_node && identity.is_none() {
            return Ok(None);
        }

        let handle = self
            .scopes
            .create_scope_handle(Owner::of::<V>(), identity)?;
        fields.link_all(&handle);
        tracing::trace!(scope = %handle.id(), fields = fields.len(), "linked view state");
        Ok(Some(handle))
    }

    /// Builds the result for `view` according to a resolved `strategy`.
    ///
    /// - [`Strategy::Collapse`] returns the inflated body, with `model` passed through.
    /// - Container strategies wrap the inflated body in a node.
    /// - Leaf strategies build a node from the view configuration; the body is never
    ///   produced.
    ///
    /// Nodes get `model`'s animations attached last.
    ///
    /// # Errors
    ///
    /// Propagates errors from inflating the body.
    pub fn materialize<V: View>(
        &mut self,
        strategy: Strategy,
        view: V,
        scope: Option<ScopeHandle>,
        model: Option<&InflationModel>,
    ) -> Result<Node, Error> {
        if strategy == Strategy::Collapse {
            tracing::debug!("stateless view collapsed into its body");
            return view.body().inflate_body(self, model);
        }

        let configuration = <V::Configuration as ConfigurationCapability<V>>::configuration(&view);
        let content = if strategy.is_leaf() {
            NodeContent::Leaf {
                configuration: configuration.expect("leaf views always carry a configuration"),
            }
        } else {
            let child = view.body().inflate_body(self, None)?;
            NodeContent::Container {
                child: Box::new(child),
                configuration,
            }
        };

        Ok(Node::new(view, scope, content).animated(model.and_then(InflationModel::animations)))
    }
}

/// Inflates `view` as the root of a full pass over `registry`.
///
/// Handles acquired during the pass are kept for the next call; the rest are dropped. If
/// inflation fails the pass is rolled back and every handle is kept.
///
/// # Errors
///
/// Returns the first error raised while inflating, or a registry lifecycle error.
pub fn inflate_root<V: View>(
    registry: &mut ScopeRegistry,
    view: V,
    model: Option<&InflationModel>,
) -> Result<Node, Error> {
    registry.begin_pass()?;
    let span = tracing::debug_span!("pass", root = type_name::<V>());
    let _entered = span.enter();

    let result = InflationContext::new(registry).inflate(view, model);
    match result {
        Ok(node) => {
            registry.end_pass()?;
            Ok(node)
        }
        Err(error) => {
            tracing::debug!(%error, "inflation failed; rolling back pass");
            registry.abort_pass();
            Err(error)
        }
    }
}
