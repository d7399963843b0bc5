//! Status codes carried in the response header's `result` field.
//!
//! Values are assigned sequentially in spec order; the original Zephyr
//! source this protocol was distilled from (`ec_host_cmd_status`) does not
//! appear in the kept excerpt with explicit discriminants, so the numbering
//! below is this crate's own choice (recorded as an open question in
//! DESIGN.md) rather than a value load-bearing for wire compatibility with
//! any particular upstream build.

/// Status taxonomy returned in the response `result` field (spec §7).
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Handler executed and response valid.
    Success = 0,
    /// No handler registered for `cmd_id`.
    InvalidCommand = 1,
    /// Unspecified internal failure.
    Error = 2,
    /// Handler-reported bad argument.
    InvalidParam = 3,
    /// Policy reject.
    AccessDenied = 4,
    /// Handler produced a response that would overflow the tx buffer.
    InvalidResponse = 5,
    /// `cmd_ver` not in the handler's version mask.
    InvalidVersion = 6,
    /// Request checksum incorrect.
    InvalidChecksum = 7,
    /// Request shorter than header or declared length.
    RequestTruncated = 8,
    /// Wrong protocol version.
    InvalidHeader = 9,
}

impl Status {
    /// Decode a wire `result` value. Unknown codes map to `Error` rather
    /// than failing, since a status value only ever flows *out* over the
    /// wire in this crate — decoding is provided for tests and for a host
    /// side reading a captured response.
    #[inline]
    pub fn from_wire(value: u16) -> Status {
        match value {
            0 => Status::Success,
            1 => Status::InvalidCommand,
            2 => Status::Error,
            3 => Status::InvalidParam,
            4 => Status::AccessDenied,
            5 => Status::InvalidResponse,
            6 => Status::InvalidVersion,
            7 => Status::InvalidChecksum,
            8 => Status::RequestTruncated,
            9 => Status::InvalidHeader,
            _ => Status::Error,
        }
    }

    #[inline]
    pub const fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }
}

impl From<Status> for u16 {
    #[inline]
    fn from(status: Status) -> u16 {
        status as u16
    }
}
