//! Dispatcher (spec.md §4.5): the single long-lived task that waits on
//! `handler_owns`, validates, dispatches, assembles a response, and hands
//! the tx buffer back to the transport.
//!
//! `run_once` is the per-iteration step function; `run_forever` is a thin
//! loop around it, split the same way so tests can single-step the state
//! machine instead of needing a second thread per test.

use ec_host_cmd_abi::{ResponseHeader, Status, HEADER_LEN, MAX_COMMAND_VERSION, MIN_BUFFER_LEN};
use ec_host_cmd_lib::{hc_debug, hc_warn};

use crate::error::HostCmdResult;
use crate::registry::{HandlerArgs, HandlerRegistry};
use crate::rx_ctx::RxCtx;
use crate::tx_ctx::TxCtx;
use crate::transport::Transport;

pub struct Dispatcher<T, const RX_N: usize, const TX_N: usize> {
    rx: RxCtx<RX_N>,
    tx: TxCtx<TX_N>,
    registry: HandlerRegistry<'static>,
    transport: T,
}

impl<T, const RX_N: usize, const TX_N: usize> Dispatcher<T, RX_N, TX_N>
where
    T: Transport<RX_N, TX_N>,
{
    /// Rejects `RX_N`/`TX_N` below `MIN_BUFFER_LEN` (spec.md §5), then
    /// validates the registry (spec.md §4.3) and constructs the rx/tx
    /// contexts. Does not yet touch the transport — call [`Dispatcher::init`]
    /// once the dispatcher has a `'static` home (a `static` item, or a
    /// leaked `Box`), since the transport retains `&'static` references
    /// into the contexts for the process lifetime (spec.md §3
    /// "Lifecycles").
    pub fn new(transport: T, registry: HandlerRegistry<'static>) -> HostCmdResult<Self> {
        if RX_N < MIN_BUFFER_LEN || TX_N < MIN_BUFFER_LEN {
            return Err(crate::error::HostCmdError::BufferTooSmall);
        }
        registry.validate()?;
        Ok(Self {
            rx: RxCtx::new(),
            tx: TxCtx::new(),
            registry,
            transport,
        })
    }

    /// spec.md §6 "init(transport, transport_config)": binds the backend
    /// to this dispatcher's contexts, forwarding `transport_config`
    /// through unchanged to `Transport::init`. Ownership tokens start in
    /// their spec.md §3 initial state (`dev_owns` raised) as soon as
    /// `self` is constructed; this only wires up the transport side.
    pub fn init(&'static self, transport_config: T::Config) -> HostCmdResult<()> {
        self.transport.init(transport_config, &self.rx, &self.tx)
    }

    /// Run the dispatcher loop forever. Never returns.
    pub fn run_forever(&'static self) -> ! {
        loop {
            self.run_once();
        }
    }

    /// One iteration of the state machine in spec.md §4.5:
    /// `WAIT_RX → VALIDATE → FIND_HANDLER → CHECK_SIZES → INVOKE →
    /// BUILD_RESPONSE → SEND`, with every failure branching to
    /// `SEND_ERROR`. Blocks at `WAIT_RX`; returns once a response has been
    /// sent and `dev_owns` restored.
    pub fn run_once(&'static self) {
        self.rx.tokens().wait_handler_owns();

        match self.rx.validate_and_stage() {
            Ok(header) => {
                if let Some(descriptor) = self.registry.find_by_id(header.cmd_id) {
                    let descriptor = *descriptor;
                    if header.data_len < descriptor.min_request_size {
                        self.send_error(Status::RequestTruncated);
                    } else if self.tx.len_max() - HEADER_LEN
                        < descriptor.min_response_size as usize
                    {
                        self.send_error(Status::InvalidResponse);
                    } else if header.cmd_ver > MAX_COMMAND_VERSION
                        || (descriptor.version_mask >> header.cmd_ver) & 1 == 0
                    {
                        self.send_error(Status::InvalidVersion);
                    } else {
                        let input = self.rx.payload(header.data_len);
                        let output = &mut self.tx.buf_mut()[HEADER_LEN..];
                        let mut args =
                            HandlerArgs::new(header.cmd_id, header.cmd_ver, input, output);
                        let status = (descriptor.handler_fn)(&mut args);
                        let output_len = args.output_len();
                        if status.is_success() {
                            self.build_response(output_len);
                        } else {
                            self.send_error(status);
                        }
                    }
                } else {
                    hc_debug!("host-cmd: no handler registered for cmd_id {:#06x}", header.cmd_id);
                    self.send_error(Status::InvalidCommand);
                }
            }
            Err(status) => {
                hc_debug!("host-cmd: request validation rejected with {status:?}");
                self.send_error(status);
            }
        }

        self.rx.tokens().raise_dev_owns();
    }

    /// BUILD_RESPONSE: assemble a successful response carrying
    /// `output_len` bytes of handler output.
    fn build_response(&'static self, output_len: usize) {
        let frame_len = HEADER_LEN + output_len;
        if frame_len > self.tx.len_max() {
            self.send_error(Status::InvalidResponse);
            return;
        }
        self.write_response_header(Status::Success, output_len as u16, frame_len);
        self.send();
    }

    /// SEND_ERROR: a header-only response carrying `status`, `data_len=0`.
    fn send_error(&'static self, status: Status) {
        self.write_response_header(status, 0, HEADER_LEN);
        self.send();
    }

    fn write_response_header(&'static self, status: Status, data_len: u16, frame_len: usize) {
        let header = ResponseHeader::new(status, data_len);
        let buf = self.tx.buf_mut();
        header.encode_into(buf);
        let checksum = ec_host_cmd_abi::checksum_of(&buf[..frame_len]);
        buf[1] = checksum;
        self.tx.set_len(frame_len);
    }

    fn send(&'static self) {
        if let Err(err) = self.transport.send(&self.tx) {
            hc_warn!("host-cmd: transport send failed: {err}");
        }
    }

    /// Test-only escape hatch for driving the rx side directly without a
    /// real transport backend (used by `ec-host-cmd-core`'s own
    /// end-to-end scenario tests and by `ec-host-cmd-drivers`'s simulator
    /// tests).
    #[doc(hidden)]
    pub fn rx_for_test(&self) -> &RxCtx<RX_N> {
        &self.rx
    }

    #[doc(hidden)]
    pub fn transport_for_test(&self) -> &T {
        &self.transport
    }
}
