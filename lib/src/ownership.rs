//! Two-token ownership semaphore pair serializing access to the rx/tx
//! buffers between a transport backend and the dispatcher (spec.md §3, §5,
//! §9 "two-token ownership").
//!
//! `dev_owns` and `handler_owns` are never both held and never both free —
//! exactly one token is held at any observable moment. The transport holds
//! `dev_owns` while filling the rx buffer; once it has a complete request it
//! raises `handler_owns` and must not touch the rx buffer again until it
//! next observes `dev_owns`.
//!
//! Modeled on the teacher's "spin briefly, then block" discipline
//! (`IrqMutex` + `WaitQueue`), simplified to the single alternating bit the
//! spec describes rather than a general-purpose mutex or a scheduler-aware
//! wait queue: there is no kernel task handle to park here, so the blocking
//! half parks the calling OS thread on a `Condvar` (gated behind the `std`
//! feature, since that's the only environment this crate's dispatcher runs
//! a real OS thread in — see DESIGN.md). The `no_std` path spins
//! indefinitely with `core::hint::spin_loop()` backoff, which is the
//! correct behavior on bare metal where `WAIT_RX` would instead suspend the
//! one dispatcher task via a real scheduler this crate does not have.

use core::sync::atomic::{AtomicU8, Ordering};

const DEV_OWNS: u8 = 0;
const HANDLER_OWNS: u8 = 1;

/// Number of spin iterations attempted before falling back to a blocking
/// wait (std only). Keeps the common case — a request already waiting —
/// lock-free.
const SPIN_ITERS: u32 = 256;

pub struct OwnershipTokens {
    state: AtomicU8,
    #[cfg(feature = "std")]
    gate: std::sync::Mutex<()>,
    #[cfg(feature = "std")]
    wake: std::sync::Condvar,
}

impl OwnershipTokens {
    /// Initial state: `dev_owns` raised, `handler_owns` lowered (spec.md §3).
    pub const fn new() -> OwnershipTokens {
        OwnershipTokens {
            state: AtomicU8::new(DEV_OWNS),
            #[cfg(feature = "std")]
            gate: std::sync::Mutex::new(()),
            #[cfg(feature = "std")]
            wake: std::sync::Condvar::new(),
        }
    }

    #[inline]
    pub fn dev_owns(&self) -> bool {
        self.state.load(Ordering::Acquire) == DEV_OWNS
    }

    #[inline]
    pub fn handler_owns(&self) -> bool {
        self.state.load(Ordering::Acquire) == HANDLER_OWNS
    }

    /// Transport side: a complete request has landed in the rx buffer: hand
    /// it to the dispatcher. From this call onward the transport must not
    /// touch the rx buffer until [`OwnershipTokens::dev_owns`] is true again.
    pub fn raise_handler_owns(&self) {
        self.state.store(HANDLER_OWNS, Ordering::Release);
        self.wake_waiter();
    }

    /// Dispatcher side: the response has been sent, hand the rx buffer back
    /// to the transport for its next receive.
    pub fn raise_dev_owns(&self) {
        self.state.store(DEV_OWNS, Ordering::Release);
        self.wake_waiter();
    }

    #[cfg(feature = "std")]
    fn wake_waiter(&self) {
        let _guard = self.gate.lock().unwrap();
        self.wake.notify_one();
    }

    #[cfg(not(feature = "std"))]
    fn wake_waiter(&self) {}

    /// WAIT_RX: block until `handler_owns` is raised, with no timeout
    /// (spec.md §5: "the dispatcher does not time out on handler_owns").
    #[cfg(feature = "std")]
    pub fn wait_handler_owns(&self) {
        for _ in 0..SPIN_ITERS {
            if self.handler_owns() {
                return;
            }
            core::hint::spin_loop();
        }
        let mut guard = self.gate.lock().unwrap();
        while !self.handler_owns() {
            guard = self.wake.wait(guard).unwrap();
        }
    }

    #[cfg(not(feature = "std"))]
    pub fn wait_handler_owns(&self) {
        loop {
            if self.handler_owns() {
                return;
            }
            core::hint::spin_loop();
        }
    }
}

impl Default for OwnershipTokens {
    fn default() -> Self {
        Self::new()
    }
}
