//! Per-call inflation options.

use crate::AnimationSet;

/// Options a parent passes along when inflating a view.
///
/// ```
/// use arbor_core::{Animation, AnimationSet, InflationModel};
/// use core::time::Duration;
///
/// let model = InflationModel::new()
///     .requiring_node()
///     .with_animations(AnimationSet::new().on_mount(Animation::new(Duration::from_millis(200))));
/// assert!(model.requires_node());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InflationModel {
    requires_node: bool,
    animations: Option<AnimationSet>,
}

impl InflationModel {
    /// Creates a model with no flags and no animations.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            requires_node: false,
            animations: None,
        }
    }

    /// Asks for a node even if the view holds no state.
    ///
    /// Honored by anonymous containers and anonymous leaves.
    #[must_use]
    pub const fn requiring_node(mut self) -> Self {
        self.requires_node = true;
        self
    }

    /// Attaches animations to the node produced for this view.
    #[must_use]
    pub const fn with_animations(mut self, animations: AnimationSet) -> Self {
        self.animations = Some(animations);
        self
    }

    /// Whether a node is required regardless of state.
    #[must_use]
    pub const fn requires_node(&self) -> bool {
        self.requires_node
    }

    /// The animations to attach, if any.
    #[must_use]
    pub const fn animations(&self) -> Option<&AnimationSet> {
        self.animations.as_ref()
    }
}
