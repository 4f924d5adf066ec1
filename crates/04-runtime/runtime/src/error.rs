use events::{DispatchError, DispatchResult};
use queue::QueueError;
use std::collections::TryReserveError;
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// Result codes returned across the C ABI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum ResultCode {
    Ok = 0,
    InvalidArg = 1,
    OutOfMemory = 2,
    InvalidState = 3,
    NotInitialized = 4,
}

impl ResultCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<DispatchResult> for ResultCode {
    /// Unknown events are a silent no-op at the boundary and report `Ok`.
    fn from(status: DispatchResult) -> Self {
        match status {
            DispatchResult::Ok | DispatchResult::UnknownEvent => ResultCode::Ok,
            DispatchResult::NotInitialized => ResultCode::NotInitialized,
            DispatchResult::InvalidPayload => ResultCode::InvalidArg,
            DispatchResult::OutOfMemory => ResultCode::OutOfMemory,
        }
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("core not initialized")]
    NotInitialized,

    #[error("core already initialized")]
    AlreadyInitialized,

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArg(&'static str),

    #[error("allocation failed: {0}")]
    OutOfMemory(#[from] TryReserveError),

    #[error("queue rejected event: {0}")]
    Queue(#[from] QueueError),

    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}

impl CoreError {
    /// Result code reported to hosts for this error.
    pub fn code(&self) -> ResultCode {
        match self {
            CoreError::NotInitialized => ResultCode::NotInitialized,
            CoreError::AlreadyInitialized => ResultCode::InvalidState,
            CoreError::InvalidConfig(_) | CoreError::InvalidArg(_) => ResultCode::InvalidArg,
            CoreError::OutOfMemory(_) | CoreError::Queue(QueueError::Full { .. }) => {
                ResultCode::OutOfMemory
            }
            CoreError::Queue(_) => ResultCode::InvalidArg,
            CoreError::Dispatch(err) => err.status().into(),
        }
    }
}
