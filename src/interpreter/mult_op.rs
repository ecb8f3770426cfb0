//! Mult sub-op executor (spec.md §4.5.3): elementwise multiply into the
//! transient `mult_res` scratch, with cyclic-window/scalar-broadcast
//! sourcing and lane-mask gating (P7).

use crate::consts::R_REG_BYTES;
use crate::dtype::{self, DType};
use crate::error::{CycleError, SubOp};
use crate::instruction::{MultOpcode, MultSlot};
use crate::registers::{checked_lr_index, MultStageReg, Snapshot};

fn ra_bytes<'a>(slot: &MultSlot, snapshot: &'a Snapshot) -> &'a [u8; R_REG_BYTES] {
    match slot.ra {
        MultStageReg::R0 => &snapshot.mult.r[0],
        MultStageReg::R1 => &snapshot.mult.r[1],
        MultStageReg::Bypass => &snapshot.mem_bypass,
    }
}

/// Run the Mult sub-op, filling `mult_res` with this cycle's 128 lane
/// products (zeroed for masked-out or NOP lanes).
pub fn execute(
    slot: &MultSlot,
    snapshot: &Snapshot,
    dtype: DType,
    pc: u32,
    mult_res: &mut [u32; R_REG_BYTES],
) -> Result<(), CycleError> {
    match slot.opcode {
        MultOpcode::Nop => {
            *mult_res = [0; R_REG_BYTES];
            Ok(())
        }

        MultOpcode::MultEe | MultOpcode::MultEv => {
            let a = ra_bytes(slot, snapshot);

            let base_idx = checked_lr_index(slot.lr_cyclic_base, SubOp::Mult, pc)?;
            let cyclic_base = snapshot.lr[base_idx];
            let mut cyclic_window = [0u8; R_REG_BYTES];
            snapshot.mult.get_cyclic_at(cyclic_base, &mut cyclic_window);

            let scalar_b = if matches!(slot.opcode, MultOpcode::MultEv) {
                let scalar_idx = checked_lr_index(slot.lr_scalar_idx, SubOp::Mult, pc)?;
                Some(a[(snapshot.lr[scalar_idx] as usize) % R_REG_BYTES])
            } else {
                None
            };

            for (lane, &a_byte) in a.iter().enumerate() {
                let b_byte = scalar_b.unwrap_or(cyclic_window[lane]);
                mult_res[lane] = dtype::mult(a_byte, b_byte, dtype).to_word_bits();
            }

            let mask_idx_reg = checked_lr_index(slot.lr_mask_idx, SubOp::Mult, pc)?;
            let shift_reg = checked_lr_index(slot.lr_shift, SubOp::Mult, pc)?;
            let mask_idx = snapshot.lr[mask_idx_reg];
            let shift = snapshot.lr[shift_reg] as i32;
            for lane in 0..R_REG_BYTES {
                if !snapshot.mult.mask_bit(mask_idx, shift, lane) {
                    mult_res[lane] = 0;
                }
            }
            Ok(())
        }

        MultOpcode::Unknown(raw) => {
            tracing::warn!(pc, raw, "mult unknown opcode");
            Err(CycleError::UnknownOpcode { pc, subop: SubOp::Mult, raw: raw as u32 })
        }
    }
}
