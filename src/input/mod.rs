pub mod backend;
pub mod dispatch;
pub mod types;

pub use backend::{DesktopBackend, InputBackend, RecordingBackend};
pub use dispatch::{Dispatcher, FailsafeGuard};
pub use types::{DispatchError, DispatchResult};
