//! The guarded broadcast transform and its background re-publish loop.
//!
//! # Synchronization contract
//!
//! `TfHandle` is the ONE synchronized cell for the broadcast transform:
//! mutators take the lock briefly to apply a delta, the broadcast loop
//! takes it briefly to snapshot, and nobody holds it across publishing
//! I/O. All rotation/translation state lives here rather than being
//! scattered across the components that correct it.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use osmnav_core::PlanarPoint;
use osmnav_core::planar::normalize_angle;

// ── TransformState ────────────────────────────────────────────────────────────

/// Translation + rotation of the broadcast frame in the local planar frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TransformState {
    pub translation: PlanarPoint,
    /// Rotation about the vertical axis, radians in `[-pi, pi]`.
    pub yaw: f64,
}

// ── TfHandle ──────────────────────────────────────────────────────────────────

/// Cloneable handle to the shared transform cell.
///
/// Clones refer to the same underlying state; hand one to the broadcaster,
/// one to the estimator, one to the heading corrector.
#[derive(Clone, Default)]
pub struct TfHandle {
    state: Arc<Mutex<TransformState>>,
}

impl TfHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TransformState> {
        // A poisoned lock only means a writer panicked between two Copy
        // field stores; the state is still usable as-is.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy out the current state. The lock is held only for the copy.
    pub fn snapshot(&self) -> TransformState {
        *self.lock()
    }

    pub fn yaw(&self) -> f64 {
        self.lock().yaw
    }

    /// Replace the rotation outright (initialization).
    pub fn set_rotation(&self, yaw: f64) {
        self.lock().yaw = normalize_angle(yaw);
    }

    /// Add a correction delta to the rotation (heading correction).
    pub fn improve_rotation(&self, delta: f64) {
        let mut state = self.lock();
        state.yaw = normalize_angle(state.yaw + delta);
    }

    /// Re-seat the translation (initialization, gated GPS updates).
    pub fn set_translation(&self, translation: PlanarPoint) {
        self.lock().translation = translation;
    }
}

// ── FramePublisher ────────────────────────────────────────────────────────────

/// External transport collaborator that emits one frame per tick.
///
/// Called from the broadcast thread with the lock already released; the
/// implementation may block without stalling mutators.
pub trait FramePublisher: Send + 'static {
    fn publish(&mut self, state: &TransformState);
}

impl<F: FnMut(&TransformState) + Send + 'static> FramePublisher for F {
    fn publish(&mut self, state: &TransformState) {
        self(state)
    }
}

// ── TfBroadcaster ─────────────────────────────────────────────────────────────

/// Owned background task that re-publishes the current transform at a fixed
/// rate, whether or not a correction was just applied.
///
/// Stops on [`stop`](Self::stop) or on drop.
pub struct TfBroadcaster {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TfBroadcaster {
    /// Spawn the broadcast thread.
    ///
    /// Each tick: snapshot the shared state (brief lock), publish the
    /// snapshot (no lock), sleep for `period`.
    pub fn spawn<P: FramePublisher>(
        tf: TfHandle,
        period: Duration,
        mut publisher: P,
    ) -> io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("tf-broadcast".into())
            .spawn(move || {
                log::debug!("transform broadcast loop started ({period:?} period)");
                while flag.load(Ordering::Relaxed) {
                    let snapshot = tf.snapshot();
                    publisher.publish(&snapshot);
                    thread::sleep(period);
                }
                log::debug!("transform broadcast loop stopped");
            })?;

        Ok(Self { running, handle: Some(handle) })
    }

    /// Signal the loop to stop and wait for the thread to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::warn!("transform broadcast thread panicked");
        }
    }
}

impl Drop for TfBroadcaster {
    fn drop(&mut self) {
        self.shutdown();
    }
}
