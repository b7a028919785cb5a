//! Operator cancellation.
//!
//! Ctrl+C never kills the process in the middle of a run. While a run is in
//! progress the token is armed and the signal only raises a flag, which the
//! dispatcher observes before the next primitive. Outside a run the idle
//! callback decides what happens (normally: report and exit cleanly).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use tracing::{debug, warn};

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    armed: AtomicBool,
}

/// Shared cancellation flag polled at every primitive dispatch
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Arc<TokenState>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Mark a run as in progress; interrupts now cancel instead of exiting
    pub fn arm(&self) {
        self.state.armed.store(true, Ordering::SeqCst);
    }

    pub fn disarm(&self) {
        self.state.armed.store(false, Ordering::SeqCst);
    }

    pub fn is_armed(&self) -> bool {
        self.state.armed.load(Ordering::SeqCst)
    }

    /// Route one interrupt signal: cancel an armed run, otherwise defer to `on_idle`
    pub fn handle_interrupt(&self, on_idle: impl FnOnce()) {
        if self.is_armed() {
            debug!("interrupt received during run");
            self.cancel();
        } else {
            on_idle();
        }
    }
}

/// Listen for Ctrl+C on a background thread for the rest of the process.
pub fn install_interrupt_handler<F>(token: CancelToken, on_idle: F) -> std::io::Result<()>
where
    F: Fn() + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("interrupt-listener".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                loop {
                    if let Err(err) = tokio::signal::ctrl_c().await {
                        warn!("unable to listen for Ctrl+C: {}", err);
                        return;
                    }
                    token.handle_interrupt(&on_idle);
                }
            });
        })?;

    Ok(())
}
