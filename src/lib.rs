#![doc = include_str!("../README.md")]
#![allow(clippy::multiple_crate_versions)]

pub mod debug;

#[doc(inline)]
pub use arbor_core::*;

#[doc(inline)]
pub use tracing as log;

pub mod prelude {
    //! The types needed to declare views and run inflation passes.
    //!
    //! ```rust
    //! use arbor::prelude::*;
    //!
    //! let registry = ScopeRegistry::new();
    //! assert!(registry.is_empty());
    //! ```
    pub use arbor_core::{
        Anonymous, ConfigurationRepresentable, Configured, Error, Identifiable, Identified,
        InflationModel, Never, Node, ScopeRegistry, State, StateFields, Unconfigured, View,
        ViewConfiguration, inflate_root, linkable,
    };
}
