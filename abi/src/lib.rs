//! Wire format for the embedded-controller host command protocol: request
//! and response headers, the additive checksum, and the response status
//! taxonomy. Pure data definitions — no I/O, no concurrency.

#![no_std]

pub mod checksum;
pub mod header;
pub mod status;

pub use checksum::{checksum_of, checksum_of_parts, is_valid, sum};
pub use header::{RequestHeader, ResponseHeader, HEADER_LEN, MAX_COMMAND_VERSION, MIN_BUFFER_LEN, PROTOCOL_VERSION};
pub use status::Status;
