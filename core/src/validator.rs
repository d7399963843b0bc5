//! Frame validator (spec.md §4.2): checks an incoming byte buffer is a
//! well-formed request before the dispatcher will hand it to a handler.
//!
//! Pure function over a byte slice — no knowledge of rx/tx contexts or
//! ownership tokens, so it is directly exercisable by both unit tests and
//! the fuzz target in `fuzz/fuzz_targets/validate_frame.rs`.

use ec_host_cmd_abi::{is_valid, RequestHeader, Status, HEADER_LEN, PROTOCOL_VERSION};

/// Outcome of a successful validation: the decoded header and the total
/// frame length (header + declared payload) actually present in `source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub header: RequestHeader,
    pub frame_len: usize,
}

/// Validate `source` as a request frame, in the order spec.md §4.2
/// prescribes: length floor, protocol version, declared length, checksum.
/// The first failing check determines the returned [`Status`].
///
/// Receiving more than `frame_len` bytes is allowed (some transports pad);
/// only the first `frame_len` bytes of `source` are considered part of the
/// frame.
pub fn validate_frame(source: &[u8]) -> Result<ValidatedRequest, Status> {
    if source.len() < HEADER_LEN {
        return Err(Status::RequestTruncated);
    }
    let header = RequestHeader::decode(source).ok_or(Status::RequestTruncated)?;
    if header.prtcl_ver != PROTOCOL_VERSION {
        return Err(Status::InvalidHeader);
    }
    let frame_len = header.declared_frame_len();
    if source.len() < frame_len {
        return Err(Status::RequestTruncated);
    }
    if !is_valid(&source[..frame_len]) {
        return Err(Status::InvalidChecksum);
    }
    Ok(ValidatedRequest { header, frame_len })
}
