//! Host-command logging subsystem.
//!
//! All log output funnels through a single **backend** function pointer,
//! mirroring the registration scheme used for the EC's own kernel log: the
//! core crate never knows whether its log lines end up on a UART, an RTT
//! channel, or (in tests) an in-memory buffer — it just calls [`log_args`]
//! and lets whatever backend is currently registered deal with it.
//!
//! # Backend contract
//!
//! The backend receives the pre-formatted arguments for a single log line
//! and is responsible for writing the formatted text, followed by a
//! trailing newline, atomically with respect to any other caller.
//!
//! If no backend has been registered, log lines are silently dropped —
//! there is no early-boot fallback here (unlike the kernel's own klog),
//! since this crate has no guaranteed console to fall back to.

use core::fmt;
use core::sync::atomic::{AtomicPtr, AtomicU8, Ordering};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    fn from_raw(raw: u8) -> LogLevel {
        match raw {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

static CURRENT_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

#[inline(always)]
fn is_enabled(level: LogLevel) -> bool {
    level as u8 <= CURRENT_LEVEL.load(Ordering::Relaxed)
}

/// Signature of a logging backend.
pub type LogBackend = fn(LogLevel, fmt::Arguments<'_>);

/// Stored as a raw pointer; null means "no backend registered".
static BACKEND: AtomicPtr<()> = AtomicPtr::new(core::ptr::null_mut());

/// Register the backend that receives every subsequent log line.
pub fn register_backend(backend: LogBackend) {
    BACKEND.store(backend as *mut (), Ordering::Release);
}

/// Clear the registered backend, reverting to "drop everything".
pub fn clear_backend() {
    BACKEND.store(core::ptr::null_mut(), Ordering::Release);
}

pub fn set_level(level: LogLevel) {
    CURRENT_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn get_level() -> LogLevel {
    LogLevel::from_raw(CURRENT_LEVEL.load(Ordering::Relaxed))
}

/// Dispatch a log line through the active backend, if any and if enabled.
#[inline]
pub fn log_args(level: LogLevel, args: fmt::Arguments<'_>) {
    if !is_enabled(level) {
        return;
    }
    let ptr = BACKEND.load(Ordering::Acquire);
    if ptr.is_null() {
        return;
    }
    // SAFETY: `register_backend` only stores valid `LogBackend` fn pointers,
    // which are the same size as `*mut ()` on every target this crate builds
    // for.
    let backend: LogBackend = unsafe { core::mem::transmute(ptr) };
    backend(level, args);
}

#[macro_export]
macro_rules! hc_log {
    ($level:expr, $($arg:tt)*) => {{
        $crate::klog::log_args($level, ::core::format_args!($($arg)*));
    }};
}

#[macro_export]
macro_rules! hc_error {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::LogLevel::Error, ::core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! hc_warn {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::LogLevel::Warn, ::core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! hc_info {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::LogLevel::Info, ::core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! hc_debug {
    ($($arg:tt)*) => {
        $crate::klog::log_args($crate::klog::LogLevel::Debug, ::core::format_args!($($arg)*))
    };
}
