//! In-process simulator backend (spec.md §6 "In-process simulator"),
//! grounded in
//! `examples/original_source/subsys/mgmt/ec_host_cmd/backends/ec_host_cmd_simulator.c`.
//!
//! Exposes exactly the two extra hooks the original carries:
//! `ec_host_cmd_periph_sim_data_received` →
//! [`SimulatorBackend::inject_request`], and
//! `ec_host_cmd_periph_sim_install_send_cb` →
//! [`SimulatorBackend::install_send_callback`]. Used by tests (and by
//! `ec-host-cmd-core`'s own dispatcher tests, which instead drive `RxCtx`
//! directly) to feed requests and observe responses without any real
//! hardware.

use std::sync::{Mutex, OnceLock};

use ec_host_cmd_core::{HostCmdError, HostCmdResult, RxCtx, Transport, TxCtx};

type SendCallback = Box<dyn Fn(&[u8]) + Send + Sync>;

pub struct SimulatorBackend<const RX_N: usize, const TX_N: usize> {
    rx: OnceLock<&'static RxCtx<RX_N>>,
    tx: OnceLock<&'static TxCtx<TX_N>>,
    send_callback: Mutex<Option<SendCallback>>,
}

impl<const RX_N: usize, const TX_N: usize> SimulatorBackend<RX_N, TX_N> {
    pub fn new() -> Self {
        Self {
            rx: OnceLock::new(),
            tx: OnceLock::new(),
            send_callback: Mutex::new(None),
        }
    }

    /// `ec_host_cmd_periph_sim_data_received`: feed `bytes` to the
    /// dispatcher as if the host had just sent them. Returns `false` (the
    /// original's `-EBUSY`) if `dev_owns` is not currently held — the
    /// previous request is still in flight — or if `bytes` doesn't fit in
    /// the rx buffer, and if [`Transport::init`] hasn't run yet.
    pub fn inject_request(&self, bytes: &[u8]) -> bool {
        let Some(rx) = self.rx.get() else {
            return false;
        };
        if !rx.tokens().dev_owns() {
            return false;
        }
        if !rx.write_request(bytes) {
            return false;
        }
        rx.tokens().raise_handler_owns();
        true
    }

    /// `ec_host_cmd_periph_sim_install_send_cb`: register the callback
    /// invoked with the raw response bytes on every subsequent `send`.
    /// Replaces any previously installed callback.
    pub fn install_send_callback(&self, callback: impl Fn(&[u8]) + Send + Sync + 'static) {
        *self.send_callback.lock().unwrap() = Some(Box::new(callback));
    }
}

impl<const RX_N: usize, const TX_N: usize> Default for SimulatorBackend<RX_N, TX_N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const RX_N: usize, const TX_N: usize> Transport<RX_N, TX_N> for SimulatorBackend<RX_N, TX_N> {
    /// No hardware to bring up; nothing to configure at `init` time.
    type Config = ();

    fn init(
        &self,
        _config: (),
        rx: &'static RxCtx<RX_N>,
        tx: &'static TxCtx<TX_N>,
    ) -> HostCmdResult<()> {
        self.rx.set(rx).map_err(|_| HostCmdError::DeviceNotReady)?;
        self.tx.set(tx).map_err(|_| HostCmdError::DeviceNotReady)?;
        Ok(())
    }

    /// No-op (`return 0`) unless a callback has been installed, matching
    /// the original's `if (tx != NULL) { return tx(...); } return 0;`.
    fn send(&self, tx: &'static TxCtx<TX_N>) -> HostCmdResult<()> {
        if let Some(callback) = self.send_callback.lock().unwrap().as_ref() {
            callback(tx.filled());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec_host_cmd_abi::{checksum_of, ResponseHeader, Status, HEADER_LEN, PROTOCOL_VERSION};
    use ec_host_cmd_core::{Dispatcher, HandlerArgs, HandlerDescriptor, HandlerRegistry};
    use std::sync::Mutex as StdMutex;

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
    fn inject_request_requires_transport_init() {
        let backend: SimulatorBackend<256, 256> = SimulatorBackend::new();
        assert!(!backend.inject_request(&encode_frame(0x10, &[])));
    }

    #[test]
    fn inject_request_rejects_while_handler_owns() {
        let backend: SimulatorBackend<256, 256> = SimulatorBackend::new();
        let rx: &'static RxCtx<256> = Box::leak(Box::new(RxCtx::new()));
        let tx: &'static TxCtx<256> = Box::leak(Box::new(TxCtx::new()));
        backend.init((), rx, tx).unwrap();
        rx.tokens().raise_handler_owns();

        assert!(!backend.inject_request(&encode_frame(0x10, &[])));
    }

    #[test]
    fn send_without_callback_is_a_silent_no_op() {
        let backend: SimulatorBackend<256, 256> = SimulatorBackend::new();
        let rx: &'static RxCtx<256> = Box::leak(Box::new(RxCtx::new()));
        let tx: &'static TxCtx<256> = Box::leak(Box::new(TxCtx::new()));
        backend.init((), rx, tx).unwrap();
        tx.set_len(8);
        assert!(backend.send(tx).is_ok());
    }

    #[test]
    fn end_to_end_through_dispatcher() {
        fn echo_handler(args: &mut HandlerArgs<'_>) -> Status {
            args.write_output(&[0xDE, 0xAD, 0xBE, 0xEF]);
            Status::Success
        }
        static HANDLERS: [HandlerDescriptor; 1] = [HandlerDescriptor {
            id: 0x10,
            version_mask: 0b1,
            min_request_size: 0,
            min_response_size: 4,
            handler_fn: echo_handler,
        }];

        let registry = HandlerRegistry::new(&HANDLERS);
        let dispatcher: &'static Dispatcher<SimulatorBackend<256, 256>, 256, 256> =
            Box::leak(Box::new(Dispatcher::new(SimulatorBackend::new(), registry).unwrap()));
        dispatcher.init(()).unwrap();

        let captured: &'static StdMutex<Vec<u8>> = Box::leak(Box::new(StdMutex::new(Vec::new())));
        dispatcher.transport_for_test().install_send_callback(move |bytes| {
            let mut guard = captured.lock().unwrap();
            guard.clear();
            guard.extend_from_slice(bytes);
        });

        let frame = encode_frame(0x10, &[]);
        assert!(dispatcher.transport_for_test().inject_request(&frame));
        dispatcher.run_once();

        let response = captured.lock().unwrap().clone();
        let header = ResponseHeader::decode(&response).unwrap();
        assert_eq!(header.status(), Status::Success);
        assert_eq!(&response[HEADER_LEN..], &[0xDE, 0xAD, 0xBE, 0xEF]);
    }
}
