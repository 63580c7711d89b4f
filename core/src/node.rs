//! Retained nodes produced by inflation.

use core::any::Any;
use core::fmt::{self, Debug, Write};

use crate::{AnimationSet, Owner, ScopeHandle, View, ViewConfiguration};

/// What a node holds besides its view.
#[derive(Debug)]
pub enum NodeContent {
    /// A node wrapping the inflated body of its view.
    Container {
        /// The inflated body.
        child: Box<Node>,
        /// The view's own configuration, for configured containers.
        configuration: Option<ViewConfiguration>,
    },
    /// A node built from its view's configuration.
    Leaf {
        /// The view's configuration.
        configuration: ViewConfiguration,
    },
}

/// A retained node of the component tree.
///
/// A node owns the view it was inflated from, the scope handle holding that view's state
/// (if one was needed) and either its inflated body or, for leaves, its configuration.
pub struct Node {
    owner: Owner,
    view: Box<dyn Any>,
    scope: Option<ScopeHandle>,
    content: NodeContent,
    animations: Option<AnimationSet>,
}

impl Node {
    /// Creates a node for `view`.
    pub fn new<V: View>(view: V, scope: Option<ScopeHandle>, content: NodeContent) -> Self {
        Self {
            owner: Owner::of::<V>(),
            view: Box::new(view),
            scope,
            content,
            animations: None,
        }
    }

    /// Attaches an animation set. Absent or empty sets leave the node unchanged.
    #[must_use]
    pub fn animated(mut self, animations: Option<&AnimationSet>) -> Self {
        if let Some(animations) = animations.filter(|set| !set.is_empty()) {
            self.animations = Some(*animations);
        }
        self
    }

    /// The view type this node was inflated from.
    #[must_use]
    pub const fn owner(&self) -> Owner {
        self.owner
    }

    /// Whether the node was inflated from a view of type `V`.
    #[must_use]
    pub fn is<V: View>(&self) -> bool {
        self.owner.is::<V>()
    }

    /// Returns the originating view if it has type `V`.
    #[must_use]
    pub fn view<V: View>(&self) -> Option<&V> {
        self.view.downcast_ref::<V>()
    }

    /// The scope handle holding the view's state.
    #[must_use]
    pub const fn scope(&self) -> Option<&ScopeHandle> {
        self.scope.as_ref()
    }

    /// The node content.
    #[must_use]
    pub const fn content(&self) -> &NodeContent {
        &self.content
    }

    /// The inflated body, for containers.
    #[must_use]
    pub fn child(&self) -> Option<&Self> {
        match &self.content {
            NodeContent::Container { child, .. } => Some(child.as_ref()),
            NodeContent::Leaf { .. } => None,
        }
    }

    /// The view configuration, if the node has one.
    #[must_use]
    pub const fn configuration(&self) -> Option<&ViewConfiguration> {
        match &self.content {
            NodeContent::Container { configuration, .. } => configuration.as_ref(),
            NodeContent::Leaf { configuration } => Some(configuration),
        }
    }

    /// Whether the node was built from configuration alone.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self.content, NodeContent::Leaf { .. })
    }

    /// The attached animations.
    #[must_use]
    pub const fn animations(&self) -> Option<&AnimationSet> {
        self.animations.as_ref()
    }

    /// Iterates over this node and every node below it, outermost first.
    pub fn descendants(&self) -> impl Iterator<Item = &Self> {
        core::iter::successors(Some(self), |node| node.child())
    }

    /// Number of nodes in this subtree, including this one.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.descendants().count()
    }

    /// Renders the subtree as an indented outline, one node per line.
    ///
    /// ```text
    /// Counter scope=#1
    ///   Label [Label text=0]
    /// ```
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (depth, node) in self.descendants().enumerate() {
            let _ = write!(out, "{:indent$}{}", "", node.owner.short_name(), indent = depth * 2);
            if let Some(scope) = &node.scope {
                let _ = write!(out, " scope={}", scope.id());
            }
            if let Some(configuration) = node.configuration() {
                let _ = write!(out, " [{}", configuration.class());
                for (name, value) in configuration.attributes() {
                    let _ = write!(out, " {name}={value}");
                }
                out.push(']');
            }
            if node.animations.is_some() {
                out.push_str(" animated");
            }
            out.push('\n');
        }
        out
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("owner", &self.owner)
            .field("scope", &self.scope.as_ref().map(ScopeHandle::id))
            .field("content", &self.content)
            .field("animations", &self.animations)
            .finish()
    }
}
