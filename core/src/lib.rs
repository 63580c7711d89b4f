//! # Arbor Core
//!
//! Turns declarative [`View`] descriptions into retained [`Node`]s.
//!
//! A view is a plain value rebuilt on every pass. Inflation decides whether the view
//! needs a persistent node and, if it does, links the view's [`State`] fields to a
//! [`ScopeHandle`] so their values survive the next pass.
//!
//! The pipeline for a single view is:
//!
//! 1. [`classify`] picks a [`Strategy`] from the capabilities the view's *type* exposes.
//! 2. [`InflationContext::discover_and_link`] collects the view's linkable fields and,
//!    when required, obtains a scope handle and links each field at its position.
//! 3. [`InflationContext::materialize`] either returns the inflated body as-is
//!    (collapse) or wraps it in a new [`Node`].
//!
//! ```
//! use arbor_core::{
//!     Anonymous, Configured, ConfigurationRepresentable, Never, ScopeRegistry, State,
//!     StateFields, Unconfigured, View, ViewConfiguration, inflate_root, linkable,
//! };
//!
//! struct Label(String);
//!
//! impl View for Label {
//!     type Body = Never;
//!     type Identity = Anonymous;
//!     type Configuration = Configured;
//! }
//!
//! impl ConfigurationRepresentable for Label {
//!     fn view_configuration(&self) -> ViewConfiguration {
//!         ViewConfiguration::new("Label").attribute("text", self.0.clone())
//!     }
//! }
//!
//! struct Counter {
//!     count: State<i32>,
//! }
//!
//! impl View for Counter {
//!     type Body = Label;
//!     type Identity = Anonymous;
//!     type Configuration = Unconfigured;
//!
//!     fn body(&self) -> Label {
//!         Label(format!("{}", self.count.get()))
//!     }
//!
//!     fn linkable_state(&self) -> StateFields<'_> {
//!         linkable![&self.count]
//!     }
//! }
//!
//! let mut scopes = ScopeRegistry::new();
//! let node = inflate_root(&mut scopes, Counter { count: State::new(0) }, None).unwrap();
//! assert!(node.scope().is_some());
//! assert!(node.child().unwrap().is_leaf());
//! ```

#![allow(clippy::multiple_crate_versions)]

#[macro_use]
mod macros;

pub mod animation;
pub mod classify;
pub mod configuration;
pub mod error;
pub mod inflate;
pub mod model;
pub mod node;
pub mod scope;
pub mod state;
pub mod view;


#[doc(inline)]
pub use animation::{Animation, AnimationSet, Curve};
#[doc(inline)]
pub use classify::{Capabilities, Strategy, classify};
#[doc(inline)]
pub use configuration::ViewConfiguration;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use inflate::{InflationContext, inflate_root};
#[doc(inline)]
pub use model::InflationModel;
#[doc(inline)]
pub use node::{Node, NodeContent};
#[doc(inline)]
pub use scope::{Identity, Owner, PassSummary, ScopeAllocator, ScopeHandle, ScopeId, ScopeRegistry};
#[doc(inline)]
pub use state::{LinkableState, State, StateFields};
#[doc(inline)]
pub use view::{
    Anonymous, Body, ConfigurationCapability, ConfigurationRepresentable, Configured,
    Identifiable, Identified, IdentityCapability, Never, Unconfigured, View,
};
