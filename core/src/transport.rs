//! Transport interface (spec.md §4.4): the abstract contract any backend
//! — mailbox, serial, or the in-process simulator — must satisfy.
//!
//! `&self` rather than `&mut self`: a real backend's "mutable state" is
//! hardware (FIFOs, shared-memory windows, interrupt-controller bits) that
//! Rust's aliasing rules don't — and can't — police; backends that do hold
//! genuine in-process mutable state (the serial accumulator, the
//! simulator) wrap it in their own interior mutability, the same way the
//! teacher's own driver singletons do.
//!
//! `init`/`send` take `&'static` contexts because a backend's rx
//! notification may fire from a different execution context (an ISR
//! callback, a bus-event handler, or — for the simulator — a direct call)
//! than the one that called `init`; spec.md §3 "Lifecycles" already commits
//! the contexts to living for the process lifetime, so `'static` merely
//! names that in the type system rather than smuggling in a new
//! requirement.

use crate::error::HostCmdResult;
use crate::rx_ctx::RxCtx;
use crate::tx_ctx::TxCtx;

pub trait Transport<const RX_N: usize, const TX_N: usize> {
    /// Backend-specific bring-up configuration threaded through from
    /// `Dispatcher::init`'s own `config` parameter (spec.md §4.4
    /// `init(config, &rx_ctx, &tx_ctx)`; SPEC_FULL.md §6
    /// `init(transport, transport_config)`) — e.g. the eSPI backend's
    /// `config: *const Device` in the original. Backends with nothing to
    /// configure at this layer (every backend in `ec-host-cmd-drivers`:
    /// the window/writer is already bound at construction time) set this
    /// to `()`.
    type Config;

    /// Bind the backend to the supplied contexts: arrange that future host
    /// transmissions land in `rx` and raise `handler_owns`, and point
    /// `tx` at a region the backend can later transmit from. May fail
    /// with [`crate::error::HostCmdError::DeviceNotReady`].
    fn init(
        &self,
        config: Self::Config,
        rx: &'static RxCtx<RX_N>,
        tx: &'static TxCtx<TX_N>,
    ) -> HostCmdResult<()>;

    /// Transmit `tx.filled()` to the host. The dispatcher raises
    /// `dev_owns` itself once this returns (spec.md §9 design note,
    /// resolving the open question on which side releases `dev_owns`) —
    /// backends never touch `dev_owns`.
    fn send(&self, tx: &'static TxCtx<TX_N>) -> HostCmdResult<()>;
}
