// Core types for primitive dispatch

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Reasons a primitive was not (or not fully) dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Pointer observed on a guard corner of the main display
    Failsafe { x: i32, y: i32 },

    /// Operator interrupt observed before dispatch
    Interrupted,

    /// The input-injection layer failed
    Injection(String),
}

impl DispatchError {
    /// Operator-initiated aborts, as opposed to faults
    pub fn is_operator_abort(&self) -> bool {
        matches!(self, DispatchError::Failsafe { .. } | DispatchError::Interrupted)
    }
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::Failsafe { x, y } => {
                write!(f, "Failsafe triggered: pointer at screen corner ({}, {})", x, y)
            }
            DispatchError::Interrupted => write!(f, "Interrupted by operator"),
            DispatchError::Injection(msg) => write!(f, "Input injection failed: {}", msg),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<enigo::InputError> for DispatchError {
    fn from(err: enigo::InputError) -> Self {
        DispatchError::Injection(err.to_string())
    }
}

impl From<enigo::NewConError> for DispatchError {
    fn from(err: enigo::NewConError) -> Self {
        DispatchError::Injection(format!("unable to connect to the input system: {}", err))
    }
}
