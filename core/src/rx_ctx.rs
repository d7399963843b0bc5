//! Rx context (spec.md §3): the buffer a transport backend writes an
//! incoming request into, the ownership tokens guarding it, and the
//! optional scratch-window indirection used by shared-memory backends.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

use ec_host_cmd_abi::{RequestHeader, Status, HEADER_LEN};
use ec_host_cmd_lib::OwnershipTokens;

use crate::validator::validate_frame;

/// Owned by the dispatcher, lent to the transport backend while `dev_owns`
/// is held. `N` is the compile-time configured buffer size (spec.md §5:
/// at least [`ec_host_cmd_abi::MIN_BUFFER_LEN`]).
pub struct RxCtx<const N: usize> {
    buf: UnsafeCell<[u8; N]>,
    len: AtomicUsize,
    scratch_ptr: AtomicPtr<u8>,
    scratch_len: AtomicUsize,
    tokens: OwnershipTokens,
}

// SAFETY: every access to `buf` (and to the scratch window pointed at by
// `scratch_ptr`) is serialized by the `dev_owns`/`handler_owns`
// alternation in `tokens` — the transport touches it only while it holds
// `dev_owns`, the dispatcher only while it holds `handler_owns`, and the
// two are never both held (spec.md §5 "Shared resource policy").
unsafe impl<const N: usize> Sync for RxCtx<N> {}

impl<const N: usize> RxCtx<N> {
    pub const fn new() -> Self {
        Self {
            buf: UnsafeCell::new([0u8; N]),
            len: AtomicUsize::new(0),
            scratch_ptr: AtomicPtr::new(core::ptr::null_mut()),
            scratch_len: AtomicUsize::new(0),
            tokens: OwnershipTokens::new(),
        }
    }

    pub const fn len_max(&self) -> usize {
        N
    }

    pub fn tokens(&self) -> &OwnershipTokens {
        &self.tokens
    }

    /// Transport-only: copy `bytes` directly into the rx buffer and record
    /// the length written. Must only be called while `dev_owns` is held;
    /// backends that stage through a host-shared window use
    /// [`RxCtx::set_scratch`] instead, which leaves `buf` untouched until
    /// validation passes. Returns `false` if `bytes` does not fit.
    pub fn write_request(&self, bytes: &[u8]) -> bool {
        if bytes.len() > N {
            return false;
        }
        debug_assert!(self.tokens.dev_owns(), "rx buffer written without dev_owns");
        // SAFETY: see the impl-level safety comment.
        unsafe {
            (*self.buf.get())[..bytes.len()].copy_from_slice(bytes);
        }
        self.len.store(bytes.len(), Ordering::Release);
        self.clear_scratch();
        true
    }

    /// Transport-only: point at a host-writable staging window instead of
    /// writing through `buf` (spec.md §3 `scratch`, mailbox backend).
    /// `len` is how many bytes are currently available in the window.
    ///
    /// # Safety
    /// `ptr` must remain valid for at least `len` bytes for as long as
    /// `handler_owns` is held afterward — i.e. until the dispatcher has
    /// called [`RxCtx::validate_and_stage`] and this `RxCtx` next observes
    /// `dev_owns`.
    pub unsafe fn set_scratch(&self, ptr: *const u8, len: usize) {
        debug_assert!(self.tokens.dev_owns(), "scratch set without dev_owns");
        self.scratch_len.store(len, Ordering::Release);
        self.scratch_ptr.store(ptr as *mut u8, Ordering::Release);
    }

    fn clear_scratch(&self) {
        self.scratch_ptr.store(core::ptr::null_mut(), Ordering::Release);
        self.scratch_len.store(0, Ordering::Release);
    }

    fn has_scratch(&self) -> bool {
        !self.scratch_ptr.load(Ordering::Acquire).is_null()
    }

    /// # Safety
    /// Only call this while `handler_owns` is held (true for every caller
    /// in this module: `active_slice` is only reached from
    /// `validate_and_stage`, which `Dispatcher::run_once` only calls after
    /// `wait_handler_owns` returns).
    unsafe fn scratch_slice(&self) -> Option<&[u8]> {
        let ptr = self.scratch_ptr.load(Ordering::Acquire);
        if ptr.is_null() {
            return None;
        }
        let len = self.scratch_len.load(Ordering::Acquire);
        Some(core::slice::from_raw_parts(ptr, len))
    }

    fn active_slice(&self) -> &[u8] {
        // SAFETY: see `scratch_slice`.
        if let Some(scratch) = unsafe { self.scratch_slice() } {
            scratch
        } else {
            let len = self.len.load(Ordering::Acquire);
            // SAFETY: see the impl-level safety comment.
            unsafe { &(*self.buf.get())[..len] }
        }
    }

    /// Dispatcher-only: run the frame validator (spec.md §4.2) over
    /// whichever source the transport populated. If the transport used a
    /// scratch window, the verified bytes are snapshotted into `buf`
    /// *after* the checksum passes (step 5 of §4.2) — never before, so a
    /// failed validation never overwrites `buf` with unverified data.
    pub fn validate_and_stage(&self) -> Result<RequestHeader, Status> {
        let validated = validate_frame(self.active_slice())?;
        if validated.frame_len > N {
            return Err(Status::RequestTruncated);
        }
        if self.has_scratch() {
            let frame_len = validated.frame_len;
            // SAFETY: see `scratch_slice`; `frame_len <= scratch.len()`
            // was already checked by `validate_frame` against
            // `active_slice()`, which returned this same scratch slice.
            unsafe {
                if let Some(scratch) = self.scratch_slice() {
                    (*self.buf.get())[..frame_len].copy_from_slice(&scratch[..frame_len]);
                }
            }
            self.len.store(frame_len, Ordering::Release);
            self.clear_scratch();
        }
        Ok(validated.header)
    }

    /// Dispatcher-only: the validated frame (header + payload) currently
    /// staged in `buf`, `HEADER_LEN` bytes of header followed by the
    /// payload `validate_and_stage` last confirmed.
    pub fn frame(&self) -> &[u8] {
        let len = self.len.load(Ordering::Acquire);
        // SAFETY: see the impl-level safety comment.
        unsafe { &(*self.buf.get())[..len] }
    }

    /// Dispatcher-only convenience: the payload bytes after the header,
    /// clamped to `data_len`.
    pub fn payload(&self, data_len: u16) -> &[u8] {
        let frame = self.frame();
        let end = (HEADER_LEN + data_len as usize).min(frame.len());
        &frame[HEADER_LEN.min(end)..end]
    }
}

impl<const N: usize> Default for RxCtx<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec_host_cmd_abi::{checksum_of, PROTOCOL_VERSION};

    fn encode_frame(cmd_id: u16, payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_LEN + payload.len()];
        bytes[0] = PROTOCOL_VERSION;
        bytes[2..4].copy_from_slice(&cmd_id.to_le_bytes());
        bytes[6..8].copy_from_slice(&(payload.len() as u16).to_le_bytes());
        bytes[HEADER_LEN..].copy_from_slice(payload);
        bytes[1] = checksum_of(&bytes);
        bytes
    }

    #[test]
    fn write_request_then_validate_succeeds() {
        let rx: RxCtx<256> = RxCtx::new();
        let frame = encode_frame(0x10, &[1, 2, 3]);
        assert!(rx.write_request(&frame));
        let header = rx.validate_and_stage().expect("frame should validate");
        assert_eq!(header.cmd_id, 0x10);
        assert_eq!(rx.payload(header.data_len), &[1, 2, 3]);
    }

    #[test]
    fn scratch_path_leaves_buf_untouched_until_validated() {
        let rx: RxCtx<256> = RxCtx::new();
        let mut frame = encode_frame(0x20, &[9, 9]);
        // SAFETY: `frame` outlives the scratch use below within this test.
        unsafe { rx.set_scratch(frame.as_ptr(), frame.len()) };
        assert_eq!(rx.frame().len(), 0);
        let header = rx.validate_and_stage().expect("scratch frame should validate");
        assert_eq!(header.cmd_id, 0x20);
        assert_eq!(rx.payload(header.data_len), &[9, 9]);
        frame.clear();
    }

    #[test]
    fn oversized_declared_frame_is_rejected() {
        let rx: RxCtx<8> = RxCtx::new();
        let mut frame = encode_frame(0x10, &[1, 2, 3]);
        frame[1] = checksum_of(&frame);
        assert!(!rx.write_request(&frame));
    }
}
