//! Handler registry (spec.md §4.3): a statically materialized,
//! write-once-at-bring-up table of handler descriptors, exposed as an
//! opaque `for_each`/`find_by_id` capability.
//!
//! The teacher's syscall table is populated via a linker-section iterator;
//! without a real linker-section/`linkme`-style mechanism available outside
//! `no_std` + custom linker scripts, the idiomatic equivalent here is a
//! `HandlerRegistry` wrapping a `const`-built `&'static [HandlerDescriptor]`
//! the integrator supplies as a plain `static` array.

use ec_host_cmd_abi::Status;

use crate::error::{HostCmdError, HostCmdResult};

/// Arguments a handler reads from and writes a response into
/// (spec.md §4.5 INVOKE: `args = {command, version, input_buf, ...}`).
pub struct HandlerArgs<'a> {
    pub cmd_id: u16,
    pub cmd_ver: u8,
    pub input: &'a [u8],
    pub output: &'a mut [u8],
    output_len: usize,
}

impl<'a> HandlerArgs<'a> {
    pub(crate) fn new(cmd_id: u16, cmd_ver: u8, input: &'a [u8], output: &'a mut [u8]) -> Self {
        Self {
            cmd_id,
            cmd_ver,
            input,
            output,
            output_len: 0,
        }
    }

    /// Copy `bytes` to the front of `output` and record the length the
    /// dispatcher should send back. Returns `false` (handler should then
    /// return [`Status::InvalidResponse`] or similar) if `bytes` is larger
    /// than the output buffer.
    pub fn write_output(&mut self, bytes: &[u8]) -> bool {
        if bytes.len() > self.output.len() {
            return false;
        }
        self.output[..bytes.len()].copy_from_slice(bytes);
        self.output_len = bytes.len();
        true
    }

    /// Declare a response length without copying bytes through
    /// `write_output` — for handlers that have already written directly
    /// into `output`. Not clamped to `output.len()`: a handler that lies
    /// about how much it wrote is exactly the `INVALID_RESPONSE` case
    /// (spec.md §8 scenario 6), which the dispatcher's `BUILD_RESPONSE`
    /// guard catches, not this setter.
    pub fn set_output_len(&mut self, len: usize) {
        self.output_len = len;
    }

    pub fn output_len(&self) -> usize {
        self.output_len
    }
}

/// A handler bound to a `(cmd_id, version)` pair.
pub type HandlerFn = fn(&mut HandlerArgs<'_>) -> Status;

/// Handler descriptor (spec.md §3 "Handler descriptor").
#[derive(Clone, Copy)]
pub struct HandlerDescriptor {
    pub id: u16,
    /// Bit *v* set iff version *v* is supported.
    pub version_mask: u32,
    pub min_request_size: u16,
    pub min_response_size: u16,
    pub handler_fn: HandlerFn,
}

/// An immutable, iterable table of [`HandlerDescriptor`]s.
///
/// Lookup is a linear scan — spec.md §4.3 expects O(10²) entries at most,
/// so no indexing structure is warranted. The registry must not change
/// once dispatch begins; `HandlerRegistry` enforces this by borrowing the
/// backing slice rather than owning a mutable collection.
#[derive(Clone, Copy)]
pub struct HandlerRegistry<'a> {
    handlers: &'a [HandlerDescriptor],
}

impl<'a> HandlerRegistry<'a> {
    pub const fn new(handlers: &'a [HandlerDescriptor]) -> Self {
        Self { handlers }
    }

    /// Static duplicate-id check (spec.md §4.3: "Duplicate `id` entries
    /// are a static error at registration time"). Call once during bring
    /// up, before the dispatcher starts running.
    pub fn validate(&self) -> HostCmdResult<()> {
        for (i, candidate) in self.handlers.iter().enumerate() {
            if self.handlers[..i].iter().any(|h| h.id == candidate.id) {
                return Err(HostCmdError::DuplicateHandlerId(candidate.id));
            }
        }
        Ok(())
    }

    /// Linear lookup by id. If `validate` was skipped and duplicates slip
    /// through, the first match wins (spec.md §4.3 documented tie-break).
    pub fn find_by_id(&self, id: u16) -> Option<&HandlerDescriptor> {
        self.handlers.iter().find(|h| h.id == id)
    }

    pub fn for_each(&self, mut f: impl FnMut(&HandlerDescriptor)) {
        for handler in self.handlers {
            f(handler);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
