//! Cond sub-op executor (spec.md §4.5.5): the sole authority (besides
//! debug QUIT) over the next program counter. Implements the mandated
//! *explicit fall-through* resolution of spec.md §9, Open Question 1: every
//! conditional branch's not-taken arm is `pc + 1`, never "leave pc alone".

use crate::consts::INST_MEM_SIZE;
use crate::error::{CycleError, SubOp};
use crate::instruction::{CondOpcode, CondSlot};
use crate::registers::{checked_lr_index, Snapshot};

/// Resolve the next program counter for this cycle.
pub fn execute(slot: &CondSlot, snapshot: &Snapshot, pc: u32) -> Result<u32, CycleError> {
    let fall_through = pc + 1;

    match slot.opcode {
        CondOpcode::Nop => Ok(fall_through),

        CondOpcode::Beq | CondOpcode::Bne | CondOpcode::Blt => {
            let lr1 = checked_lr_index(slot.lr1, SubOp::Cond, pc)?;
            let lr2 = checked_lr_index(slot.lr2, SubOp::Cond, pc)?;
            let (a, b) = (snapshot.lr[lr1], snapshot.lr[lr2]);
            let taken = match slot.opcode {
                CondOpcode::Beq => a == b,
                CondOpcode::Bne => a != b,
                CondOpcode::Blt => a < b,
                _ => unreachable!(),
            };
            Ok(if taken { slot.label } else { fall_through })
        }

        CondOpcode::Bz | CondOpcode::Bnz => {
            let lr1 = checked_lr_index(slot.lr1, SubOp::Cond, pc)?;
            let a = snapshot.lr[lr1];
            let taken = if matches!(slot.opcode, CondOpcode::Bz) { a == 0 } else { a != 0 };
            Ok(if taken { slot.label } else { fall_through })
        }

        CondOpcode::B => Ok(slot.label),

        CondOpcode::Br => {
            let lr1 = checked_lr_index(slot.lr1, SubOp::Cond, pc)?;
            Ok(snapshot.lr[lr1])
        }

        CondOpcode::Bkpt => Ok(INST_MEM_SIZE as u32),

        CondOpcode::Unknown(raw) => {
            tracing::warn!(pc, raw, "cond unknown opcode");
            Err(CycleError::UnknownOpcode { pc, subop: SubOp::Cond, raw: raw as u32 })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::RegisterFile;

    fn snap(regs: &RegisterFile) -> Snapshot {
        Snapshot::capture(regs)
    }

    #[test]
    fn nop_falls_through() {
        let regs = RegisterFile::new();
        let slot = CondSlot { opcode: CondOpcode::Nop, lr1: 0, lr2: 0, label: 0 };
        assert_eq!(execute(&slot, &snap(&regs), 5).unwrap(), 6);
    }

    #[test]
    fn bne_explicit_fall_through_when_not_taken() {
        let mut regs = RegisterFile::new();
        regs.lr[0] = 10;
        regs.lr[1] = 10;
        let slot = CondSlot { opcode: CondOpcode::Bne, lr1: 0, lr2: 1, label: 99 };
        assert_eq!(execute(&slot, &snap(&regs), 3).unwrap(), 4);
    }

    #[test]
    fn bne_branches_to_label_when_taken() {
        let mut regs = RegisterFile::new();
        regs.lr[0] = 1;
        regs.lr[1] = 2;
        let slot = CondSlot { opcode: CondOpcode::Bne, lr1: 0, lr2: 1, label: 99 };
        assert_eq!(execute(&slot, &snap(&regs), 3).unwrap(), 99);
    }

    #[test]
    fn bkpt_sets_terminal_pc() {
        let regs = RegisterFile::new();
        let slot = CondSlot { opcode: CondOpcode::Bkpt, lr1: 0, lr2: 0, label: 0 };
        assert_eq!(execute(&slot, &snap(&regs), 3).unwrap(), INST_MEM_SIZE as u32);
    }

    #[test]
    fn br_jumps_to_lr_value() {
        let mut regs = RegisterFile::new();
        regs.lr[4] = 77;
        let slot = CondSlot { opcode: CondOpcode::Br, lr1: 4, lr2: 0, label: 0 };
        assert_eq!(execute(&slot, &snap(&regs), 3).unwrap(), 77);
    }
}
