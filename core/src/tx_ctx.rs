//! Tx context (spec.md §3): the 8-byte-aligned buffer the dispatcher
//! assembles a response into and the transport backend transmits from.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Wrapper forcing 8-byte alignment — some handler response structs
/// contain 64-bit fields (spec.md §3, tx context).
#[repr(align(8))]
struct AlignedBuf<const N: usize>([u8; N]);

/// Owned by the dispatcher. `N` is the compile-time configured capacity
/// (`len_max`, spec.md §5: at least [`ec_host_cmd_abi::MIN_BUFFER_LEN`]).
pub struct TxCtx<const N: usize> {
    buf: UnsafeCell<AlignedBuf<N>>,
    len: AtomicUsize,
}

// SAFETY: the dispatcher is the sole writer (during BUILD_RESPONSE /
// SEND_ERROR) and the transport is the sole reader (during `send`); the
// dispatcher never mutates `buf` again after calling `transport.send`
// until `send` returns (spec.md §5 "Shared resource policy").
unsafe impl<const N: usize> Sync for TxCtx<N> {}

impl<const N: usize> TxCtx<N> {
    pub const fn new() -> Self {
        Self {
            buf: UnsafeCell::new(AlignedBuf([0u8; N])),
            len: AtomicUsize::new(0),
        }
    }

    pub const fn len_max(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Dispatcher-only mutable access, used during BUILD_RESPONSE and
    /// SEND_ERROR.
    pub fn buf_mut(&self) -> &mut [u8] {
        // SAFETY: see the impl-level safety comment.
        unsafe { &mut (*self.buf.get()).0 }
    }

    /// Set the number of bytes to transmit. Must be `<= len_max()`
    /// (spec.md §3 invariant: "tx.len <= tx.len_max before any send call").
    pub fn set_len(&self, len: usize) {
        debug_assert!(len <= N, "tx.len exceeds tx.len_max");
        self.len.store(len.min(N), Ordering::Release);
    }

    /// Transport-only: the bytes to transmit, `buf[..len]`.
    pub fn filled(&self) -> &[u8] {
        let len = self.len();
        // SAFETY: see the impl-level safety comment.
        unsafe { &(*self.buf.get()).0[..len] }
    }
}

impl<const N: usize> Default for TxCtx<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buf_is_eight_byte_aligned() {
        let tx: TxCtx<256> = TxCtx::new();
        let ptr = tx.buf_mut().as_ptr();
        assert_eq!(ptr as usize % 8, 0);
    }

    #[test]
    fn filled_reflects_set_len() {
        let tx: TxCtx<16> = TxCtx::new();
        tx.buf_mut()[..4].copy_from_slice(&[1, 2, 3, 4]);
        tx.set_len(4);
        assert_eq!(tx.filled(), &[1, 2, 3, 4]);
    }

    #[test]
    fn set_len_clamps_to_capacity() {
        let tx: TxCtx<4> = TxCtx::new();
        tx.set_len(100);
        assert_eq!(tx.len(), 4);
    }
}
