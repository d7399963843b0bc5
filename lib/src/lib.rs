//! Ambient, kernel-adjacent primitives shared by `ec-host-cmd-core` and
//! `ec-host-cmd-drivers`: the two-token ownership semaphore, the klog-style
//! logging backend, and a fixed-capacity ring buffer for the serial
//! backend's byte accumulator.
//!
//! Carries no protocol knowledge — everything here would be equally at
//! home backing a different wire protocol.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod klog;
pub mod ownership;
pub mod ring_buffer;

pub use klog::{log_args, LogBackend, LogLevel};
pub use ownership::OwnershipTokens;
pub use ring_buffer::RingBuffer;
