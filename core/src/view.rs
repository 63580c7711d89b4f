//! The [`View`] trait and the capabilities a view type can expose.
//!
//! A view describes one subtree of UI. It is rebuilt from scratch on every pass and only
//! lives for the duration of that pass, unless a [`Node`](crate::Node) takes ownership of it.
//!
//! What a view *can do* is declared through its associated types rather than at runtime:
//!
//! | associated type   | absent                         | present                                     |
//! |-------------------|--------------------------------|---------------------------------------------|
//! | `Body`            | [`Never`] (the view is a leaf) | any other [`View`]                          |
//! | `Identity`        | [`Anonymous`]                  | [`Identified`] (requires [`Identifiable`])  |
//! | `Configuration`   | [`Unconfigured`]               | [`Configured`] (requires [`ConfigurationRepresentable`]) |
//!
//! The [`classify`](crate::classify) step reads these types only, so two values of the same
//! view type always take the same inflation path.

use core::any::type_name;
use core::fmt::Debug;
use core::hash::Hash;

use crate::{
    Error, InflationContext, InflationModel, Node, StateFields, ViewConfiguration, scope::Identity,
};

/// A declarative, side-effect free description of a UI subtree.
///
/// Container views override [`View::body`] and return a child view. Leaf views use
/// [`Never`] as their body, keep the default `body`, and describe themselves through
/// [`ConfigurationRepresentable`] instead.
pub trait View: 'static + Sized {
    /// The child this view expands to, or [`Never`] for leaves.
    type Body: Body;
    /// [`Identified`] if the view supplies a stable identity, [`Anonymous`] otherwise.
    type Identity: IdentityCapability<Self>;
    /// [`Configured`] if the view supplies an intrinsic [`ViewConfiguration`].
    type Configuration: ConfigurationCapability<Self>;

    /// Produces the child description.
    ///
    /// # Panics
    ///
    /// The default implementation is the leaf path and always panics: a leaf's body is
    /// never produced by the inflater, so reaching it means the view's type contract is
    /// broken.
    fn body(&self) -> Self::Body {
        panic!("Attempting to call body on a leaf view ({})", type_name::<Self>())
    }

    /// Returns the view's linkable state fields in declaration order.
    ///
    /// The position of a field in this list is its identity inside the scope handle.
    fn linkable_state(&self) -> StateFields<'_> {
        StateFields::new()
    }
}

/// What a view expands to: another view, or [`Never`] for leaves.
pub trait Body: 'static + Sized {
    /// Whether this body marks the owning view as a leaf.
    const IS_LEAF: bool;

    /// Inflates the body into a node.
    ///
    /// # Errors
    ///
    /// Propagates any error raised while inflating the subtree.
    fn inflate_body(
        self,
        cx: &mut InflationContext<'_>,
        model: Option<&InflationModel>,
    ) -> Result<Node, Error>;
}

impl<V: View> Body for V {
    const IS_LEAF: bool = false;

    fn inflate_body(
        self,
        cx: &mut InflationContext<'_>,
        model: Option<&InflationModel>,
    ) -> Result<Node, Error> {
        cx.inflate(self, model)
    }
}

/// The body of a leaf view. It has no values, so a leaf body can never be inflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Never {}

impl Body for Never {
    const IS_LEAF: bool = true;

    fn inflate_body(
        self,
        _cx: &mut InflationContext<'_>,
        _model: Option<&InflationModel>,
    ) -> Result<Node, Error> {
        match self {}
    }
}

/// A view that supplies a stable identity.
///
/// Identified views always get a scope handle, keyed by `(view type, id)`, so their state
/// follows the id instead of the view's position in the tree.
pub trait Identifiable {
    /// The identity value.
    type Id: 'static + Hash + Eq + Debug;
    /// Returns the identity of this view.
    fn id(&self) -> Self::Id;
}

/// A view that supplies its own intrinsic visual configuration.
pub trait ConfigurationRepresentable {
    /// Returns the configuration of the native view backing this node.
    fn view_configuration(&self) -> ViewConfiguration;
}

/// Type-level switch for the identity capability of `V`.
pub trait IdentityCapability<V: ?Sized> {
    /// Whether `V` has a stable identity.
    const PRESENT: bool;
    /// Extracts the identity, if any.
    fn identity(view: &V) -> Option<Identity>;
}

/// Marker for views without a stable identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl<V: ?Sized> IdentityCapability<V> for Anonymous {
    const PRESENT: bool = false;

    fn identity(_view: &V) -> Option<Identity> {
        None
    }
}

/// Marker for views implementing [`Identifiable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Identified;

impl<V: Identifiable + ?Sized> IdentityCapability<V> for Identified {
    const PRESENT: bool = true;

    fn identity(view: &V) -> Option<Identity> {
        Some(Identity::new(view.id()))
    }
}

/// Type-level switch for the configuration capability of `V`.
pub trait ConfigurationCapability<V: ?Sized> {
    /// Whether `V` supplies a configuration.
    const PRESENT: bool;
    /// Extracts the configuration, if any.
    fn configuration(view: &V) -> Option<ViewConfiguration>;
}

/// Marker for views without intrinsic configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

impl<V: ?Sized> ConfigurationCapability<V> for Unconfigured {
    const PRESENT: bool = false;

    fn configuration(_view: &V) -> Option<ViewConfiguration> {
        None
    }
}

/// Marker for views implementing [`ConfigurationRepresentable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Configured;

impl<V: ConfigurationRepresentable + ?Sized> ConfigurationCapability<V> for Configured {
    const PRESENT: bool = true;

    fn configuration(view: &V) -> Option<ViewConfiguration> {
        Some(view.view_configuration())
    }
}
