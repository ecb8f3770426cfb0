//! XMEM sub-op executor (spec.md §4.5.1).

use crate::consts::R_REG_BYTES;
use crate::error::{CycleError, SubOp};
use crate::instruction::{XmemOpcode, XmemSlot};
use crate::registers::{checked_cr_index, checked_lr_index, MultStageReg, RegisterFile, Snapshot};
use crate::xmem::Xmem;

/// Run the XMEM sub-op, mutating the live register file and/or XMEM.
pub fn execute(
    slot: &XmemSlot,
    snapshot: &Snapshot,
    regs: &mut RegisterFile,
    xmem: &mut Xmem,
    pc: u32,
) -> Result<(), CycleError> {
    match slot.opcode {
        XmemOpcode::Nop => Ok(()),

        XmemOpcode::StrAccReg => {
            let lr = checked_lr_index(slot.lr_a, SubOp::Xmem, pc)?;
            let cr = checked_cr_index(slot.cr, SubOp::Xmem, pc)?;
            let addr = snapshot.lr[lr].wrapping_add(snapshot.cr[cr]);
            tracing::trace!(pc, addr, "xmem str_acc_reg");
            xmem.write(addr, snapshot.acc.as_bytes(), snapshot.acc.as_bytes().len(), pc, SubOp::Xmem)
        }

        XmemOpcode::LdrMultReg => {
            let lr = checked_lr_index(slot.lr_a, SubOp::Xmem, pc)?;
            let cr = checked_cr_index(slot.cr, SubOp::Xmem, pc)?;
            let addr = snapshot.lr[lr].wrapping_add(snapshot.cr[cr]);
            let mut buf = [0u8; R_REG_BYTES];
            xmem.read(addr, &mut buf, R_REG_BYTES, pc, SubOp::Xmem)?;
            match slot.target {
                MultStageReg::R0 => regs.mult.r[0] = buf,
                MultStageReg::R1 => regs.mult.r[1] = buf,
                MultStageReg::Bypass => regs.mem_bypass = buf,
            }
            Ok(())
        }

        XmemOpcode::LdrMultMaskReg => {
            let lr = checked_lr_index(slot.lr_a, SubOp::Xmem, pc)?;
            let cr = checked_cr_index(slot.cr, SubOp::Xmem, pc)?;
            let addr = snapshot.lr[lr].wrapping_add(snapshot.cr[cr]);
            xmem.read(addr, &mut regs.mult.r_mask, R_REG_BYTES, pc, SubOp::Xmem)
        }

        XmemOpcode::LdrCyclicMultReg => {
            let lr_base = checked_lr_index(slot.lr_a, SubOp::Xmem, pc)?;
            let cr = checked_cr_index(slot.cr, SubOp::Xmem, pc)?;
            let lr_idx = checked_lr_index(slot.lr_b, SubOp::Xmem, pc)?;
            let addr = snapshot.lr[lr_base].wrapping_add(snapshot.cr[cr]);
            let mut buf = [0u8; R_REG_BYTES];
            xmem.read(addr, &mut buf, R_REG_BYTES, pc, SubOp::Xmem)?;

            let deposit = snapshot.lr[lr_idx];
            if deposit % R_REG_BYTES as u32 != 0 {
                tracing::warn!(pc, deposit, "xmem ldr_cyclic_mult_reg misaligned deposit");
                return Err(CycleError::MisalignedCyclicDeposit {
                    pc,
                    lr_idx: slot.lr_b,
                    offset: deposit,
                    align: R_REG_BYTES,
                });
            }
            regs.mult.set_cyclic_at(deposit, &buf);
            Ok(())
        }

        XmemOpcode::Unknown(raw) => {
            tracing::warn!(pc, raw, "xmem unknown opcode");
            Err(CycleError::UnknownOpcode { pc, subop: SubOp::Xmem, raw: raw as u32 })
        }
    }
}
