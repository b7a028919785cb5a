use tracing::{debug, trace};

use super::backend::InputBackend;
use super::types::{DispatchError, DispatchResult};
use crate::cancel::CancelToken;
use crate::plan::ActionStep;

/// Aborts dispatch when the pointer rests on a corner of the main display.
///
/// The operator slams the mouse into a corner to stop a runaway run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailsafeGuard {
    width: i32,
    height: i32,
    /// Distance from a corner (in pixels) that still counts as the corner
    margin: i32,
}

impl FailsafeGuard {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            margin: 0,
        }
    }

    /// Build a guard for the backend's main display
    pub fn for_backend<B: InputBackend + ?Sized>(backend: &B) -> DispatchResult<Self> {
        let (width, height) = backend.screen_size()?;
        Ok(Self::new(width, height))
    }

    pub fn margin(mut self, margin: i32) -> Self {
        self.margin = margin.max(0);
        self
    }

    pub fn corners(&self) -> [(i32, i32); 4] {
        let right = self.width - 1;
        let bottom = self.height - 1;
        [(0, 0), (right, 0), (0, bottom), (right, bottom)]
    }

    pub fn is_triggered(&self, (x, y): (i32, i32)) -> bool {
        self.corners()
            .iter()
            .any(|&(cx, cy)| (x - cx).abs() <= self.margin && (y - cy).abs() <= self.margin)
    }
}

/// Executes primitives against a backend, polling for cancellation first.
///
/// Cancellation is only observed here, between primitives: a `Wait` that has
/// started always runs to completion.
pub struct Dispatcher<B> {
    backend: B,
    cancel: CancelToken,
    failsafe: Option<FailsafeGuard>,
    dispatched: usize,
}

impl<B: InputBackend> Dispatcher<B> {
    /// Create a dispatcher with the failsafe disabled
    pub fn new(backend: B, cancel: CancelToken) -> Self {
        Self {
            backend,
            cancel,
            failsafe: None,
            dispatched: 0,
        }
    }

    /// Guard every dispatch with the given failsafe
    pub fn with_failsafe(mut self, guard: FailsafeGuard) -> Self {
        self.failsafe = Some(guard);
        self
    }

    /// Guard every dispatch with a failsafe on the backend's main display
    pub fn enable_failsafe(self) -> DispatchResult<Self> {
        let guard = FailsafeGuard::for_backend(&self.backend)?;
        Ok(self.with_failsafe(guard))
    }

    pub fn failsafe(&self) -> Option<&FailsafeGuard> {
        self.failsafe.as_ref()
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Number of primitives delivered so far
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// Check both abort triggers without dispatching anything
    pub fn poll(&self) -> DispatchResult<()> {
        if self.cancel.is_cancelled() {
            return Err(DispatchError::Interrupted);
        }
        if let Some(guard) = &self.failsafe {
            let (x, y) = self.backend.pointer_position()?;
            if guard.is_triggered((x, y)) {
                return Err(DispatchError::Failsafe { x, y });
            }
        }
        Ok(())
    }

    /// Deliver one primitive
    pub fn dispatch(&mut self, step: &ActionStep) -> DispatchResult<()> {
        self.poll()?;
        trace!(source = self.backend.source_type(), "dispatching {}", step);

        match step {
            ActionStep::Click { x, y } => self.backend.click(*x, *y)?,
            ActionStep::Press { key } => self.backend.press(*key)?,
            ActionStep::Hotkey { modifier, key } => self.backend.hotkey(*modifier, *key)?,
            ActionStep::Type { text } => self.backend.type_text(text)?,
            ActionStep::Wait { duration } => self.backend.wait(*duration),
        }

        self.dispatched += 1;
        if self.dispatched % 50 == 0 {
            debug!(dispatched = self.dispatched, "primitives delivered");
        }
        Ok(())
    }
}
