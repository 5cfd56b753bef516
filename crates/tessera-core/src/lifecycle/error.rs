//! # Tessera Core Lifecycle Errors
use thiserror::Error;

use crate::lifecycle::Phase;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("Cannot move the lifecycle back from {current} to {requested}")]
    PhaseRegression { current: Phase, requested: Phase },

    #[error("Lifecycle coordinator was disposed before the phase was reached")]
    Disposed,
}
