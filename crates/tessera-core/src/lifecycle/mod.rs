//! # Tessera Core Lifecycle
//!
//! The lifecycle module is the single source of truth for which initialization
//! phase an application is in. Phases are totally ordered and only ever move
//! forward; [`LifecycleCoordinator::when`] lets any component rendezvous with a
//! phase, resolving once it is reached.
pub mod coordinator;
pub mod error;

use std::fmt;

use serde::Serialize;

pub use coordinator::LifecycleCoordinator;
pub use error::LifecycleError;

/// Initialization phases, in the order they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum Phase {
    /// Nothing has been configured yet.
    #[default]
    Uninitialized,
    /// Options are validated and the schema and code-runtime services are initialized.
    OptionsResolved,
    /// The render adapter has produced its render object.
    Ready,
    /// Initial plugins are active and initial packages are loaded.
    AfterInitPackageLoad,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Uninitialized,
        Phase::OptionsResolved,
        Phase::Ready,
        Phase::AfterInitPackageLoad,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Uninitialized => "Uninitialized",
            Phase::OptionsResolved => "OptionsResolved",
            Phase::Ready => "Ready",
            Phase::AfterInitPackageLoad => "AfterInitPackageLoad",
        }
    }

    /// The phase entered after this one, if any.
    pub fn next(&self) -> Option<Phase> {
        Phase::ALL.iter().copied().find(|phase| phase > self)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests;
