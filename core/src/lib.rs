//! Transport-agnostic host-command request/response engine (spec.md §1
//! "THE CORE"): wire framing validation, the handler registry, the
//! abstract transport contract, and the dispatcher state machine.
//!
//! Concrete hardware wiring (mailbox registers, serial FIFOs, interrupt
//! routing) and the handler catalog (battery, thermal, ...) are external
//! collaborators — see `ec-host-cmd-drivers` for backends, and bring your
//! own `HandlerDescriptor` table.
//!
//! `no_std` by default off the `std` feature: the pure validation/registry
//! path (`validate_frame`, `HandlerRegistry`) has no `std` dependency, but
//! `Dispatcher`'s `WAIT_RX` blocking relies on `ec-host-cmd-lib`'s
//! condvar-backed wait under `std` — see that crate and DESIGN.md.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod rx_ctx;
pub mod transport;
pub mod tx_ctx;
pub mod validator;

pub use dispatcher::Dispatcher;
pub use error::{HostCmdError, HostCmdResult};
pub use registry::{HandlerArgs, HandlerDescriptor, HandlerFn, HandlerRegistry};
pub use rx_ctx::RxCtx;
pub use transport::Transport;
pub use tx_ctx::TxCtx;
pub use validator::{validate_frame, ValidatedRequest};

pub use ec_host_cmd_abi as abi;

#[cfg(test)]
mod dispatcher_tests {
    use super::*;
    use ec_host_cmd_abi::{checksum_of, ResponseHeader, Status, HEADER_LEN, PROTOCOL_VERSION};
    use std::sync::Mutex;

    fn encode_frame(cmd_id: u16, cmd_ver: u8, payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_LEN + payload.len()];
        bytes[0] = PROTOCOL_VERSION;
        bytes[2..4].copy_from_slice(&cmd_id.to_le_bytes());
        bytes[4] = cmd_ver;
        bytes[6..8].copy_from_slice(&(payload.len() as u16).to_le_bytes());
        bytes[HEADER_LEN..].copy_from_slice(payload);
        bytes[1] = checksum_of(&bytes);
        bytes
    }

    /// An in-process `Transport` that records every sent frame, for tests
    /// that drive the dispatcher directly without a real backend.
    struct RecordingTransport {
        sent: Mutex<Vec<Vec<u8>>>,
    }

    impl RecordingTransport {
        fn new() -> Self {
            Self { sent: Mutex::new(Vec::new()) }
        }

        fn last_response(&self) -> Vec<u8> {
            self.sent.lock().unwrap().last().cloned().expect("no response sent yet")
        }
    }

    impl Transport<256, 256> for RecordingTransport {
        type Config = ();

        fn init(&self, _config: (), _rx: &'static RxCtx<256>, _tx: &'static TxCtx<256>) -> HostCmdResult<()> {
            Ok(())
        }

        fn send(&self, tx: &'static TxCtx<256>) -> HostCmdResult<()> {
            self.sent.lock().unwrap().push(tx.filled().to_vec());
            Ok(())
        }
    }

    fn echo_handler(args: &mut HandlerArgs<'_>) -> Status {
        let bytes = [0xDE, 0xAD, 0xBE, 0xEF];
        args.write_output(&bytes);
        Status::Success
    }

    fn version_gated_handler(_args: &mut HandlerArgs<'_>) -> Status {
        Status::Success
    }

    fn new_dispatcher(
        handlers: &'static [HandlerDescriptor],
    ) -> &'static Dispatcher<RecordingTransport, 256, 256> {
        let registry = HandlerRegistry::new(handlers);
        let dispatcher = Dispatcher::new(RecordingTransport::new(), registry)
            .expect("registry should validate");
        let dispatcher: &'static _ = Box::leak(Box::new(dispatcher));
        dispatcher.init(()).expect("init should succeed");
        dispatcher
    }

    fn deliver(dispatcher: &'static Dispatcher<RecordingTransport, 256, 256>, frame: &[u8]) {
        assert!(dispatcher.rx_for_test().write_request(frame));
        dispatcher.rx_for_test().tokens().raise_handler_owns();
        dispatcher.run_once();
        assert!(dispatcher.rx_for_test().tokens().dev_owns());
    }

    #[test]
    fn scenario_1_happy_path() {
        static HANDLERS: [HandlerDescriptor; 1] = [HandlerDescriptor {
            id: 0x10,
            version_mask: 0b1,
            min_request_size: 0,
            min_response_size: 4,
            handler_fn: echo_handler,
        }];
        let dispatcher = new_dispatcher(&HANDLERS);
        let frame = encode_frame(0x10, 0, &[]);
        deliver(dispatcher, &frame);

        let response = dispatcher.transport_for_test().last_response();
        assert_eq!(response.len(), 12);
        let header = ResponseHeader::decode(&response).unwrap();
        assert_eq!(header.status(), Status::Success);
        assert_eq!(header.data_len, 4);
        assert_eq!(&response[HEADER_LEN..], &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn scenario_2_unknown_command() {
        static HANDLERS: [HandlerDescriptor; 0] = [];
        let dispatcher = new_dispatcher(&HANDLERS);
        let frame = encode_frame(0xFFFF, 0, &[]);
        deliver(dispatcher, &frame);

        let response = dispatcher.transport_for_test().last_response();
        assert_eq!(response.len(), HEADER_LEN);
        let header = ResponseHeader::decode(&response).unwrap();
        assert_eq!(header.status(), Status::InvalidCommand);
        assert_eq!(header.data_len, 0);
    }

    #[test]
    fn scenario_3_wrong_version() {
        static HANDLERS: [HandlerDescriptor; 1] = [HandlerDescriptor {
            id: 0x30,
            version_mask: 0b10,
            min_request_size: 0,
            min_response_size: 0,
            handler_fn: version_gated_handler,
        }];
        let dispatcher = new_dispatcher(&HANDLERS);
        let frame = encode_frame(0x30, 0, &[]);
        deliver(dispatcher, &frame);

        let response = dispatcher.transport_for_test().last_response();
        let header = ResponseHeader::decode(&response).unwrap();
        assert_eq!(header.status(), Status::InvalidVersion);
    }

    #[test]
    fn scenario_4_bad_checksum() {
        static HANDLERS: [HandlerDescriptor; 1] = [HandlerDescriptor {
            id: 0x10,
            version_mask: 0b1,
            min_request_size: 0,
            min_response_size: 4,
            handler_fn: echo_handler,
        }];
        let dispatcher = new_dispatcher(&HANDLERS);
        let mut frame = encode_frame(0x10, 0, &[]);
        frame[1] ^= 0x01;
        deliver(dispatcher, &frame);

        let response = dispatcher.transport_for_test().last_response();
        let header = ResponseHeader::decode(&response).unwrap();
        assert_eq!(header.status(), Status::InvalidChecksum);
        assert_eq!(header.data_len, 0);
    }

    #[test]
    fn scenario_5_truncated_frame() {
        static HANDLERS: [HandlerDescriptor; 0] = [];
        let dispatcher = new_dispatcher(&HANDLERS);
        let frame = [0x03u8, 0x00, 0x10, 0x00, 0x00];
        deliver(dispatcher, &frame);

        let response = dispatcher.transport_for_test().last_response();
        let header = ResponseHeader::decode(&response).unwrap();
        assert_eq!(header.status(), Status::RequestTruncated);
        assert_eq!(response.len(), HEADER_LEN);
    }

    #[test]
    fn scenario_6_oversized_response_declared() {
        fn overflow_handler(args: &mut HandlerArgs<'_>) -> Status {
            // Declares the full tx capacity as payload, ignoring that the
            // response header also needs room (spec.md §8 scenario 6).
            args.set_output_len(256);
            Status::Success
        }
        static HANDLERS: [HandlerDescriptor; 1] = [HandlerDescriptor {
            id: 0x40,
            version_mask: 0b1,
            min_request_size: 0,
            min_response_size: 0,
            handler_fn: overflow_handler,
        }];
        let dispatcher = new_dispatcher(&HANDLERS);
        let frame = encode_frame(0x40, 0, &[]);
        deliver(dispatcher, &frame);

        let response = dispatcher.transport_for_test().last_response();
        let header = ResponseHeader::decode(&response).unwrap();
        assert_eq!(header.status(), Status::InvalidResponse);
        assert_eq!(header.data_len, 0);
        assert_eq!(response.len(), HEADER_LEN);
    }

    #[test]
    fn response_is_checksum_valid() {
        static HANDLERS: [HandlerDescriptor; 1] = [HandlerDescriptor {
            id: 0x10,
            version_mask: 0b1,
            min_request_size: 0,
            min_response_size: 4,
            handler_fn: echo_handler,
        }];
        let dispatcher = new_dispatcher(&HANDLERS);
        let frame = encode_frame(0x10, 0, &[]);
        deliver(dispatcher, &frame);

        let response = dispatcher.transport_for_test().last_response();
        assert!(ec_host_cmd_abi::is_valid(&response));
    }
}
