//! Errors raised while inflating a view tree.

use thiserror::Error;

/// Errors produced by scope allocation and the inflation pass.
///
/// The inflater never recovers from these; they reach the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// A scope handle was requested outside of a pass.
    #[error("no inflation pass is in progress")]
    NoActivePass,
    /// A pass was started while another one was still open.
    #[error("an inflation pass is already in progress")]
    PassInProgress,
    /// A scope was closed while none was open.
    #[error("scope stack underflow: no scope to close")]
    ScopeStackUnderflow,
    /// A pass ended with scopes still open.
    #[error("scope stack is unbalanced: {depth} scope(s) still open")]
    UnbalancedScopeStack {
        /// Number of scopes left on the stack.
        depth: usize,
    },
    /// A custom allocator could not provide a scope handle.
    #[error("failed to allocate a scope handle for {owner}: {reason}")]
    Allocation {
        /// Type name of the view that requested the handle.
        owner: &'static str,
        /// Allocator-specific description.
        reason: String,
    },
}
