//! Acc sub-op executor (spec.md §4.5.4): consumes `mult_res`, reduces it
//! into the accumulator against the cycle-start snapshot's baseline.

use crate::consts::{ACC_RT_WORDS, R_REG_BYTES};
use crate::dtype::{self, DType, Num};
use crate::error::{CycleError, SubOp};
use crate::instruction::{AccOpcode, AccSlot};
use crate::registers::{checked_lr_index, RegisterFile, Snapshot};

/// Run the Acc sub-op.
pub fn execute(
    slot: &AccSlot,
    snapshot: &Snapshot,
    regs: &mut RegisterFile,
    dtype: DType,
    mult_res: &[u32; R_REG_BYTES],
    pc: u32,
) -> Result<(), CycleError> {
    match slot.opcode {
        AccOpcode::Nop => Ok(()),

        AccOpcode::ResetAcc => {
            regs.acc.reset();
            Ok(())
        }

        AccOpcode::Acc => {
            for i in 0..ACC_RT_WORDS as u32 {
                let base = Num::from_word_bits(snapshot.acc.rt_word(i, pc)?, dtype);
                let delta = Num::from_word_bits(mult_res[i as usize], dtype);
                let sum = dtype::add(base, delta, dtype);
                regs.acc.set_rt_word(i, sum.to_word_bits(), pc)?;
            }
            Ok(())
        }

        AccOpcode::Agg => {
            // spec.md §9, Open Question 3: multiply elementwise (already in
            // `mult_res`), sum across all 128 lanes, store to a single
            // LR-indexed accumulator word.
            let lr = checked_lr_index(slot.lr_idx, SubOp::Acc, pc)?;
            let idx = snapshot.lr[lr] % ACC_RT_WORDS as u32;
            let zero = if dtype.is_int() { Num::Int(0) } else { Num::Float(0.0) };
            let sum = mult_res
                .iter()
                .fold(zero, |acc, &w| dtype::add(acc, Num::from_word_bits(w, dtype), dtype));
            regs.acc.set_rt_word(idx, sum.to_word_bits(), pc)?;
            Ok(())
        }

        AccOpcode::Unknown(raw) => {
            tracing::warn!(pc, raw, "acc unknown opcode");
            Err(CycleError::UnknownOpcode { pc, subop: SubOp::Acc, raw: raw as u32 })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acc_adds_mult_res_to_baseline() {
        let mut regs = RegisterFile::new();
        regs.acc.set_rt_word(0, 10, 0).unwrap();
        let snapshot = Snapshot::capture(&regs);
        let mut mult_res = [0u32; R_REG_BYTES];
        mult_res[0] = 6;
        let slot = AccSlot { opcode: AccOpcode::Acc, lr_idx: 0 };
        execute(&slot, &snapshot, &mut regs, DType::Int8, &mult_res, 0).unwrap();
        assert_eq!(regs.acc.rt_word(0, 0).unwrap(), 16);
    }

    #[test]
    fn reset_acc_zeroes() {
        let mut regs = RegisterFile::new();
        regs.acc.set_rt_word(3, 99, 0).unwrap();
        let snapshot = Snapshot::capture(&regs);
        let mult_res = [0u32; R_REG_BYTES];
        let slot = AccSlot { opcode: AccOpcode::ResetAcc, lr_idx: 0 };
        execute(&slot, &snapshot, &mut regs, DType::Int8, &mult_res, 0).unwrap();
        assert_eq!(regs.acc.rt_word(3, 0).unwrap(), 0);
    }
}
