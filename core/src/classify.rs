//! Capability classification.
//!
//! Every view type maps to exactly one [`Strategy`]. The mapping only looks at the view's
//! associated types, so it is resolved per type at compile time and never inspects a
//! view value.

use crate::view::{Body, ConfigurationCapability, IdentityCapability, View};

/// The structural capabilities a view type exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capabilities {
    /// The body is terminal ([`Never`](crate::Never)).
    pub leaf: bool,
    /// The view supplies an identity value.
    pub stable_identity: bool,
    /// The view supplies a [`ViewConfiguration`](crate::ViewConfiguration).
    pub intrinsic_configuration: bool,
}

impl Capabilities {
    /// Reads the capabilities declared by `V`.
    #[must_use]
    pub const fn of<V: View>() -> Self {
        Self {
            leaf: <V::Body as Body>::IS_LEAF,
            stable_identity: <V::Identity as IdentityCapability<V>>::PRESENT,
            intrinsic_configuration: <V::Configuration as ConfigurationCapability<V>>::PRESENT,
        }
    }
}

/// How a view is turned into a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    /// No node: the inflated body is returned directly.
    ///
    /// Never produced by [`classify`]; only [`Strategy::resolve`] yields it.
    Collapse,
    /// Container without identity or configuration.
    ContainerAnonymous,
    /// Container with a stable identity.
    ContainerIdentified,
    /// Container with its own view configuration.
    ContainerConfiguredAnonymous,
    /// Container with both identity and configuration.
    ContainerConfiguredIdentified,
    /// Leaf without identity.
    LeafAnonymous,
    /// Leaf with a stable identity.
    LeafIdentified,
}

impl Strategy {
    /// Looks up the strategy for a capability set.
    ///
    /// Returns `None` for a leaf without configuration, which no valid view type can
    /// declare.
    #[must_use]
    pub const fn from_capabilities(capabilities: Capabilities) -> Option<Self> {
        let Capabilities {
            leaf,
            stable_identity,
            intrinsic_configuration,
        } = capabilities;
        match (leaf, stable_identity, intrinsic_configuration) {
            (false, false, false) => Some(Self::ContainerAnonymous),
            (false, true, false) => Some(Self::ContainerIdentified),
            (false, false, true) => Some(Self::ContainerConfiguredAnonymous),
            (false, true, true) => Some(Self::ContainerConfiguredIdentified),
            (true, false, true) => Some(Self::LeafAnonymous),
            (true, true, true) => Some(Self::LeafIdentified),
            (true, _, false) => None,
        }
    }

    /// Settles the strategy once discovery knows whether a scope handle was created.
    ///
    /// Only [`Strategy::ContainerAnonymous`] without a handle collapses; every other
    /// strategy always produces a node.
    #[must_use]
    pub const fn resolve(self, handle_created: bool) -> Self {
        match self {
            Self::ContainerAnonymous if !handle_created => Self::Collapse,
            other => other,
        }
    }

    /// Whether the inflation model's forced-node flag is consulted on this path.
    #[must_use]
    pub const fn honors_forced_node(self) -> bool {
        matches!(self, Self::ContainerAnonymous | Self::LeafAnonymous)
    }

    /// Whether a scope handle is created even without linkable state.
    #[must_use]
    pub const fn is_identified(self) -> bool {
        matches!(
            self,
            Self::ContainerIdentified | Self::ContainerConfiguredIdentified | Self::LeafIdentified
        )
    }

    /// Whether the node is built from configuration instead of an inflated body.
    #[must_use]
    pub const fn is_leaf(self) -> bool {
        matches!(self, Self::LeafAnonymous | Self::LeafIdentified)
    }

    /// Whether the node carries the view's own configuration.
    #[must_use]
    pub const fn is_configured(self) -> bool {
        matches!(
            self,
            Self::ContainerConfiguredAnonymous
                | Self::ContainerConfiguredIdentified
                | Self::LeafAnonymous
                | Self::LeafIdentified
        )
    }
}

/// Selects the inflation strategy for the view type `V`.
///
/// # Panics
///
/// Panics if `V` is a leaf without configuration. When evaluated in a `const` context, as
/// the inflater does, this is a compile-time error instead.
#[must_use]
pub const fn classify<V: View>() -> Strategy {
    match Strategy::from_capabilities(Capabilities::of::<V>()) {
        Some(strategy) => strategy,
        None => panic!("leaf views must supply a view configuration"),
    }
}
