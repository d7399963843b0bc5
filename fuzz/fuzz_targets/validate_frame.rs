//! Fuzz target for the frame validator (spec.md §8: "fuzz the validator
//! with arbitrary byte sequences up to 512 bytes; assert that exactly one
//! response is emitted per input, that its framing is well-formed, and
//! that the ownership semaphore state is restored to the pre-test
//! condition afterward").
//!
//! `validate_frame` is pure (no rx/tx context, no ownership tokens), so
//! the ownership-restoration half of that property is exercised instead
//! in `ec-host-cmd-core`'s own `dispatcher_tests` (each test's `deliver`
//! helper asserts `dev_owns` is held again once `run_once` returns); this
//! target covers the framing half directly against arbitrary bytes,
//! grounded in `examples/mitander-lockframe/fuzz/fuzz_targets/frame_boundary_fuzzer.rs`.

#![no_main]

use ec_host_cmd_abi::{is_valid, Status, HEADER_LEN};
use ec_host_cmd_core::validate_frame;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 512 {
        return;
    }

    match validate_frame(data) {
        Ok(validated) => {
            assert!(validated.frame_len >= HEADER_LEN);
            assert!(validated.frame_len <= data.len());
            assert!(is_valid(&data[..validated.frame_len]));
        }
        Err(status) => {
            assert_ne!(status, Status::Success);
        }
    }
});
