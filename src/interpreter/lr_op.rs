//! LR sub-op executor (spec.md §4.5.2): up to two scalar register updates
//! per cycle, with a mandatory same-target conflict check (P2).

use crate::error::{CycleError, SubOp};
use crate::instruction::{LrOpcode, LrSlot};
use crate::registers::{checked_lr_index, Lcr, RegisterFile, Snapshot};

/// A slot's resolved effect: `None` means no write (absent slot, or an
/// `INCR` by zero, which spec.md §4.5.2 says "does not count as a write").
struct Write {
    target: usize,
    value: u32,
}

fn resolve(slot: &LrSlot, snapshot: &Snapshot, pc: u32) -> Result<Option<Write>, CycleError> {
    match slot.opcode {
        LrOpcode::Nop => Ok(None),

        LrOpcode::Set => {
            let target = checked_lr_index(slot.target, SubOp::Lr, pc)?;
            Ok(Some(Write { target, value: slot.imm }))
        }

        LrOpcode::Incr => {
            if slot.imm == 0 {
                return Ok(None);
            }
            let target = checked_lr_index(slot.target, SubOp::Lr, pc)?;
            let value = snapshot.lr[target].wrapping_add(slot.imm);
            Ok(Some(Write { target, value }))
        }

        LrOpcode::Add => {
            let target = checked_lr_index(slot.target, SubOp::Lr, pc)?;
            let a = Lcr::from_flat(slot.lcr_a, SubOp::Lr, pc)?.read(snapshot);
            let b = Lcr::from_flat(slot.lcr_b, SubOp::Lr, pc)?.read(snapshot);
            Ok(Some(Write { target, value: a.wrapping_add(b) }))
        }

        LrOpcode::Sub => {
            let target = checked_lr_index(slot.target, SubOp::Lr, pc)?;
            let a = Lcr::from_flat(slot.lcr_a, SubOp::Lr, pc)?.read(snapshot);
            let b = Lcr::from_flat(slot.lcr_b, SubOp::Lr, pc)?.read(snapshot);
            Ok(Some(Write { target, value: a.wrapping_sub(b) }))
        }

        LrOpcode::Unknown(raw) => {
            tracing::warn!(pc, raw, "lr unknown opcode");
            Err(CycleError::UnknownOpcode { pc, subop: SubOp::Lr, raw: raw as u32 })
        }
    }
}

/// Run both LR sub-op slots, detecting same-target write conflicts before
/// committing anything (spec.md Invariant 2, P2).
pub fn execute(
    slots: &[LrSlot; 2],
    snapshot: &Snapshot,
    regs: &mut RegisterFile,
    pc: u32,
) -> Result<(), CycleError> {
    let writes: Vec<Write> = slots
        .iter()
        .filter_map(|slot| resolve(slot, snapshot, pc).transpose())
        .collect::<Result<_, _>>()?;

    if let (Some(a), Some(b)) = (writes.first(), writes.get(1)) {
        if a.target == b.target {
            tracing::warn!(pc, index = a.target, "lr write conflict");
            return Err(CycleError::LrWriteConflict { pc, index: a.target as u8 });
        }
    }

    for w in &writes {
        regs.lr[w.target] = w.value;
    }
    Ok(())
}
