//! Local error type for host-command bring-up failures.
//!
//! Distinct from [`ec_host_cmd_abi::Status`]: `Status` is the wire-level
//! result code that goes *in a response header*; `HostCmdError` never
//! crosses the wire — it is returned to the Rust caller performing system
//! init (`Transport::init`) or static registry validation
//! (`HandlerRegistry::validate`). This crate never panics on host-controlled
//! input; `HostCmdError` has no relation to panics.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCmdError {
    /// `Transport::init` could not bind to the backend (spec.md §4.4).
    DeviceNotReady,
    /// `HandlerRegistry::validate` found two descriptors sharing an id
    /// (spec.md §4.3).
    DuplicateHandlerId(u16),
    /// A configured buffer is smaller than the protocol minimum
    /// (spec.md §5, `MIN_BUFFER_LEN`).
    BufferTooSmall,
    /// `Transport::send` reported a backend-specific failure.
    TransportFailed(i32),
}

impl fmt::Display for HostCmdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceNotReady => write!(f, "transport backend is not ready"),
            Self::DuplicateHandlerId(id) => write!(f, "duplicate handler id {id:#06x}"),
            Self::BufferTooSmall => write!(f, "buffer smaller than the configured minimum"),
            Self::TransportFailed(code) => {
                write!(f, "transport operation failed with code {code}")
            }
        }
    }
}

pub type HostCmdResult<T = ()> = Result<T, HostCmdError>;
