//! Request/response header layout (spec §3). All multi-byte fields are
//! little-endian on the wire.

use crate::status::Status;

/// Only protocol version this crate accepts (spec §1 non-goals: "no support
/// for protocol versions other than 3").
pub const PROTOCOL_VERSION: u8 = 3;

/// Size in bytes of [`RequestHeader`] and [`ResponseHeader`] on the wire.
pub const HEADER_LEN: usize = 8;

/// Minimum rx/tx buffer size an integrator may configure (spec §5).
pub const MIN_BUFFER_LEN: usize = 256;

/// Highest `cmd_ver` value a 32-bit version mask can express.
pub const MAX_COMMAND_VERSION: u8 = 31;

/// Decoded request header (spec §3, "Request header").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub prtcl_ver: u8,
    pub checksum: u8,
    pub cmd_id: u16,
    pub cmd_ver: u8,
    pub reserved: u8,
    pub data_len: u16,
}

impl RequestHeader {
    /// Decode a header from the first [`HEADER_LEN`] bytes of `buf`.
    /// Returns `None` if `buf` is shorter than a header — callers that need
    /// a `Status` for this case should check length themselves first (the
    /// dispatcher's validator does, per spec §4.2 step 1).
    pub fn decode(buf: &[u8]) -> Option<RequestHeader> {
        if buf.len() < HEADER_LEN {
            return None;
        }
        Some(RequestHeader {
            prtcl_ver: buf[0],
            checksum: buf[1],
            cmd_id: u16::from_le_bytes([buf[2], buf[3]]),
            cmd_ver: buf[4],
            reserved: buf[5],
            data_len: u16::from_le_bytes([buf[6], buf[7]]),
        })
    }

    /// Encode into the first [`HEADER_LEN`] bytes of `buf`.
    ///
    /// # Panics
    /// Panics if `buf` is shorter than [`HEADER_LEN`] — this is a
    /// programmer error (undersized buffer), never triggered by host
    /// input, so it is not part of the `Status`/`HostCmdError` surface.
    pub fn encode_into(&self, buf: &mut [u8]) {
        assert!(buf.len() >= HEADER_LEN, "buffer too small for request header");
        buf[0] = self.prtcl_ver;
        buf[1] = self.checksum;
        let cmd_id = self.cmd_id.to_le_bytes();
        buf[2] = cmd_id[0];
        buf[3] = cmd_id[1];
        buf[4] = self.cmd_ver;
        buf[5] = self.reserved;
        let data_len = self.data_len.to_le_bytes();
        buf[6] = data_len[0];
        buf[7] = data_len[1];
    }

    /// Total frame length this header declares: header plus payload.
    #[inline]
    pub fn declared_frame_len(&self) -> usize {
        HEADER_LEN + self.data_len as usize
    }
}

/// Decoded response header (spec §3, "Response header").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub prtcl_ver: u8,
    pub checksum: u8,
    pub result: u16,
    pub data_len: u16,
    pub reserved: u16,
}

impl ResponseHeader {
    pub fn new(result: Status, data_len: u16) -> ResponseHeader {
        ResponseHeader {
            prtcl_ver: PROTOCOL_VERSION,
            checksum: 0,
            result: u16::from(result),
            data_len,
            reserved: 0,
        }
    }

    pub fn decode(buf: &[u8]) -> Option<ResponseHeader> {
        if buf.len() < HEADER_LEN {
            return None;
        }
        Some(ResponseHeader {
            prtcl_ver: buf[0],
            checksum: buf[1],
            result: u16::from_le_bytes([buf[2], buf[3]]),
            data_len: u16::from_le_bytes([buf[4], buf[5]]),
            reserved: u16::from_le_bytes([buf[6], buf[7]]),
        })
    }

    /// # Panics
    /// Panics if `buf` is shorter than [`HEADER_LEN`] (programmer error).
    pub fn encode_into(&self, buf: &mut [u8]) {
        assert!(buf.len() >= HEADER_LEN, "buffer too small for response header");
        buf[0] = self.prtcl_ver;
        buf[1] = self.checksum;
        let result = self.result.to_le_bytes();
        buf[2] = result[0];
        buf[3] = result[1];
        let data_len = self.data_len.to_le_bytes();
        buf[4] = data_len[0];
        buf[5] = data_len[1];
        let reserved = self.reserved.to_le_bytes();
        buf[6] = reserved[0];
        buf[7] = reserved[1];
    }

    pub fn status(&self) -> Status {
        Status::from_wire(self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_header_round_trips_every_field() {
        let header = RequestHeader {
            prtcl_ver: 3,
            checksum: 0xAB,
            cmd_id: 0xBEEF,
            cmd_ver: 17,
            reserved: 0,
            data_len: 0x1234,
        };
        let mut buf = [0u8; HEADER_LEN];
        header.encode_into(&mut buf);
        assert_eq!(RequestHeader::decode(&buf), Some(header));
    }

    #[test]
    fn request_header_decode_rejects_short_buffer() {
        assert_eq!(RequestHeader::decode(&[0u8; 7]), None);
    }

    #[test]
    fn response_header_round_trips_every_field() {
        let header = ResponseHeader {
            prtcl_ver: 3,
            checksum: 0x42,
            result: u16::from(Status::InvalidChecksum),
            data_len: 4,
            reserved: 0,
        };
        let mut buf = [0u8; HEADER_LEN];
        header.encode_into(&mut buf);
        assert_eq!(ResponseHeader::decode(&buf), Some(header));
    }

    #[test]
    fn declared_frame_len_adds_header_and_payload() {
        let header = RequestHeader {
            prtcl_ver: 3,
            checksum: 0,
            cmd_id: 0,
            cmd_ver: 0,
            reserved: 0,
            data_len: 40,
        };
        assert_eq!(header.declared_frame_len(), HEADER_LEN + 40);
    }
}
