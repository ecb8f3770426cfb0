//! Break sub-op executor (spec.md §4.5.6): decides whether this cycle's
//! break predicate fires. The actual debug-collaborator call and the
//! "defer other sub-ops until the collaborator returns" rule live in
//! [`crate::interpreter::Cpu::step`], since only the cycle engine can
//! sequence that against the other five sub-ops.

use crate::error::{CycleError, SubOp};
use crate::instruction::{BreakOpcode, BreakSlot};
use crate::registers::{checked_lr_index, Snapshot};

/// Whether this cycle's Break sub-op fires.
pub fn should_break(slot: &BreakSlot, snapshot: &Snapshot, pc: u32) -> Result<bool, CycleError> {
    match slot.opcode {
        BreakOpcode::Nop => Ok(false),
        BreakOpcode::Break => Ok(true),
        BreakOpcode::BreakIfEq => {
            let lr = checked_lr_index(slot.lr_idx, SubOp::Break, pc)?;
            Ok(snapshot.lr[lr] == slot.imm)
        }
        BreakOpcode::Unknown(raw) => {
            tracing::warn!(pc, raw, "break unknown opcode");
            Err(CycleError::UnknownOpcode { pc, subop: SubOp::Break, raw: raw as u32 })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::RegisterFile;

    #[test]
    fn nop_never_breaks() {
        let regs = RegisterFile::new();
        let slot = BreakSlot { opcode: BreakOpcode::Nop, lr_idx: 0, imm: 0 };
        assert!(!should_break(&slot, &Snapshot::capture(&regs), 0).unwrap());
    }

    #[test]
    fn break_ifeq_fires_on_match() {
        let mut regs = RegisterFile::new();
        regs.lr[2] = 5;
        let slot = BreakSlot { opcode: BreakOpcode::BreakIfEq, lr_idx: 2, imm: 5 };
        assert!(should_break(&slot, &Snapshot::capture(&regs), 0).unwrap());
    }

    #[test]
    fn break_ifeq_does_not_fire_on_mismatch() {
        let mut regs = RegisterFile::new();
        regs.lr[2] = 4;
        let slot = BreakSlot { opcode: BreakOpcode::BreakIfEq, lr_idx: 2, imm: 5 };
        assert!(!should_break(&slot, &Snapshot::capture(&regs), 0).unwrap());
    }
}
