//! Transport backends for `ec-host-cmd-core` (spec.md §6 "External
//! interfaces" / SPEC_FULL.md §6): the shared-memory mailbox backend, the
//! byte-oriented serial backend, and the in-process simulator used by
//! tests.
//!
//! None of these touch `dev_owns` — spec.md §9's open question on which
//! side releases it is resolved in `ec-host-cmd-core::Dispatcher` (it
//! raises `dev_owns` itself right after `Transport::send` returns), so
//! every backend here only ever raises `handler_owns` and otherwise keeps
//! its hands off the ownership tokens.
//!
//! Backend "mutable state" here is in-process (an accumulator buffer, an
//! installed callback), not hardware registers, so unlike the teacher's
//! MMIO-backed drivers these do reach for ordinary interior mutability
//! (`std::sync::Mutex`, `std::sync::OnceLock`) rather than a raw pointer
//! plus a safety comment — see DESIGN.md.

pub mod mailbox;
pub mod serial;
pub mod simulator;

pub use mailbox::{MailboxBackend, MailboxWindow};
pub use serial::{SerialBackend, SerialFrameAccumulator, SerialWriter};
pub use simulator::SimulatorBackend;
