use std::fmt;

use futures::future::{self, BoxFuture, FutureExt};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::Phase;

struct PhaseWaiter {
    target: Phase,
    tx: oneshot::Sender<()>,
}

#[derive(Default)]
struct LifecycleState {
    phase: Phase,
    // Registration order.
    waiters: Vec<PhaseWaiter>,
    disposed: bool,
}

/// Ordered phase state machine and rendezvous point for initialization steps.
///
/// Phase changes only go through [`set_phase`](Self::set_phase), which refuses
/// to move backwards. Waiters released by one transition are resolved in
/// (target phase, registration order), before `set_phase` returns.
#[derive(Default)]
pub struct LifecycleCoordinator {
    state: Mutex<LifecycleState>,
}

impl LifecycleCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    /// Advance to `phase`. Setting the current phase again is a no-op.
    pub fn set_phase(&self, phase: Phase) -> Result<(), LifecycleError> {
        let released = {
            let mut state = self.state.lock();
            if state.disposed {
                return Err(LifecycleError::Disposed);
            }
            if phase < state.phase {
                return Err(LifecycleError::PhaseRegression {
                    current: state.phase,
                    requested: phase,
                });
            }
            if phase == state.phase {
                return Ok(());
            }

            log::info!("Lifecycle phase {} -> {}", state.phase, phase);
            state.phase = phase;
            let (mut reached, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut state.waiters)
                .into_iter()
                .partition(|waiter| waiter.target <= phase);
            state.waiters = pending;
            // Stable: registration order is kept within a phase.
            reached.sort_by_key(|waiter| waiter.target);
            reached
        };

        log::debug!("Releasing {} lifecycle waiters at {}", released.len(), phase);
        for waiter in released {
            let _ = waiter.tx.send(());
        }
        Ok(())
    }

    /// Resolve once the lifecycle reaches `target`; immediately if it already
    /// has. The waiter is registered at call time, not on first poll.
    pub fn when(&self, target: Phase) -> BoxFuture<'static, Result<(), LifecycleError>> {
        let mut state = self.state.lock();
        if state.phase >= target {
            return future::ready(Ok(())).boxed();
        }
        if state.disposed {
            return future::ready(Err(LifecycleError::Disposed)).boxed();
        }

        let (tx, rx) = oneshot::channel();
        state.waiters.push(PhaseWaiter { target, tx });
        log::trace!("Registered lifecycle waiter for {}", target);
        drop(state);

        async move { rx.await.map_err(|_| LifecycleError::Disposed) }.boxed()
    }

    /// Drop all pending waiters; their futures resolve with
    /// [`LifecycleError::Disposed`]. Later transitions are refused.
    pub fn dispose(&self) {
        let dropped = {
            let mut state = self.state.lock();
            state.disposed = true;
            std::mem::take(&mut state.waiters)
        };
        if !dropped.is_empty() {
            log::debug!("Disposed lifecycle coordinator with {} pending waiters", dropped.len());
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    pub fn pending_waiters(&self) -> usize {
        self.state.lock().waiters.len()
    }
}

impl fmt::Debug for LifecycleCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("LifecycleCoordinator")
            .field("phase", &state.phase)
            .field("pending_waiters", &state.waiters.len())
            .field("disposed", &state.disposed)
            .finish()
    }
}
