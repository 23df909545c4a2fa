//! Formal invariants for device state verification
//!
//! Runtime-checkable invariants used by unit tests, by the driver's debug
//! assertions and by the Kani proofs below.
//!
//! # Invariants
//!
//! 1. **Fixed Capacity**: the buffer length always equals the capacity
//! 2. **Transfer Bounds**: a transfer never runs past the end of the buffer
//! 3. **Cursor Accounting**: `new_pos == pos + bytes`

use alloc::string::String;
use alloc::vec::Vec;

use crate::state::DeviceState;
use crate::types::Transfer;

/// An invariant violation with details
#[derive(Clone, Debug)]
pub struct InvariantViolation {
    /// Name of the violated invariant
    pub invariant: &'static str,
    /// Description of what went wrong
    pub description: String,
}

/// Check all state invariants.
///
/// Returns a list of violations (empty if all invariants hold).
pub fn check_all_invariants(state: &DeviceState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    if state.contents().len() != state.capacity() {
        violations.push(InvariantViolation {
            invariant: "fixed_capacity",
            description: alloc::format!(
                "Buffer holds {} bytes but capacity is {}",
                state.contents().len(),
                state.capacity()
            ),
        });
    }

    violations
}

/// Check a completed transfer against the request that produced it.
pub fn check_transfer(
    capacity: usize,
    pos: usize,
    requested: usize,
    transfer: &Transfer,
) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    if transfer.bytes > requested {
        violations.push(InvariantViolation {
            invariant: "transfer_bounds",
            description: alloc::format!(
                "Moved {} bytes but only {} were requested",
                transfer.bytes,
                requested
            ),
        });
    }

    if transfer.new_pos > capacity {
        violations.push(InvariantViolation {
            invariant: "transfer_bounds",
            description: alloc::format!(
                "Cursor {} ran past capacity {}",
                transfer.new_pos,
                capacity
            ),
        });
    }

    if transfer.new_pos != pos + transfer.bytes {
        violations.push(InvariantViolation {
            invariant: "cursor_accounting",
            description: alloc::format!(
                "Cursor moved from {} to {} after {} bytes",
                pos,
                transfer.new_pos,
                transfer.bytes
            ),
        });
    }

    violations
}


#[cfg(kani)]
mod proofs {
    use super::*;

    const CAPACITY: usize = 8;

    /// Proof: reads stay inside the buffer for any cursor and length
    #[kani::proof]
    #[kani::unwind(10)]
    fn read_stays_in_bounds() {
        let state = DeviceState::new(CAPACITY);
        let pos: usize = kani::any();
        let len: usize = kani::any();
        kani::assume(pos <= CAPACITY);

        let out = state.read(len, pos);
        kani::assert(out.is_ok(), "Read within capacity should succeed");
        if let Ok(out) = out {
            kani::assert(
                check_transfer(CAPACITY, pos, len, &out.transfer).is_empty(),
                "Read transfer should respect bounds",
            );
            kani::assert(out.data.len() == out.transfer.bytes, "Data length matches count");
        }
    }

    /// Proof: writes never grow the buffer
    #[kani::proof]
    #[kani::unwind(10)]
    fn write_preserves_capacity() {
        let mut state = DeviceState::new(CAPACITY);
        let pos: usize = kani::any();
        let data: [u8; 4] = kani::any();
        kani::assume(pos <= CAPACITY);

        let result = state.write(&data, pos);
        kani::assert(result.is_ok(), "Write within capacity should succeed");
        kani::assert(
            check_all_invariants(&state).is_empty(),
            "Writing should maintain invariants",
        );
    }

    /// Proof: a cursor past the end is always rejected
    #[kani::proof]
    #[kani::unwind(10)]
    fn past_end_rejected() {
        let mut state = DeviceState::new(CAPACITY);
        let pos: usize = kani::any();
        kani::assume(pos > CAPACITY);

        kani::assert(state.read(1, pos).is_err(), "Read past end must fail");
        kani::assert(state.write(&[1], pos).is_err(), "Write past end must fail");
    }
}
