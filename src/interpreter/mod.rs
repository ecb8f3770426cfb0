//! Cycle engine (C6): fetch, snapshot, dispatch the six sub-ops, apply the
//! PC update rule, per spec.md §4.4. Grounded on the teacher's fetch ->
//! dispatch loop (`fuel-vm/src/interpreter/executors/instruction.rs`'s
//! `#[tracing::instrument]`-wrapped per-instruction step), generalized from
//! a single blockchain opcode dispatch to six independent, always-present
//! sub-op slots.

pub mod acc_op;
pub mod break_op;
pub mod cond_op;
pub mod lr_op;
pub mod mult_op;
pub mod xmem_op;

use crate::consts::{INST_MEM_SIZE, R_REG_BYTES};
use crate::debug::{DebugAction, DebugHandler};
use crate::error::CycleError;
use crate::instruction::Instruction;
use crate::registers::{RegisterFile, Snapshot};
use crate::xmem::Xmem;

/// The IPU: exclusive owner of the register file, XMEM, instruction memory,
/// and program counter (spec.md §3 Ownership).
pub struct Cpu {
    /// The live register file.
    pub regs: RegisterFile,
    /// External memory.
    pub xmem: Xmem,
    /// Decoded instruction memory, always exactly `INST_MEM_SIZE` entries
    /// (missing records are NOP-padded by [`crate::program::Program`]).
    pub inst_mem: Vec<Instruction>,
    /// Program counter; terminal once it reaches `INST_MEM_SIZE`.
    pub pc: u32,
    /// `misc.mult_res`: this cycle's Mult-stage output, consumed by Acc.
    mult_res: [u32; R_REG_BYTES],
}

impl Cpu {
    /// Build a fresh IPU over the given instruction memory, all other state
    /// zero-initialized (spec.md §3).
    pub fn new(inst_mem: Vec<Instruction>) -> Self {
        debug_assert_eq!(inst_mem.len(), INST_MEM_SIZE);
        Self {
            regs: RegisterFile::new(),
            xmem: Xmem::new(),
            inst_mem,
            pc: 0,
            mult_res: [0; R_REG_BYTES],
        }
    }

    /// Whether `pc` has reached its terminal value (spec.md §3 Invariant 3).
    pub fn is_terminal(&self) -> bool {
        self.pc as usize >= INST_MEM_SIZE
    }

    /// Run exactly one cycle: fetch, snapshot, break-priority check,
    /// dispatch, PC update (spec.md §4.4). No-op if already terminal.
    #[tracing::instrument(level = "trace", skip(self, debug))]
    pub fn step(&mut self, debug: &mut dyn DebugHandler) -> Result<(), CycleError> {
        if self.is_terminal() {
            return Ok(());
        }

        let inst = self.inst_mem[self.pc as usize];
        let snapshot = Snapshot::capture(&self.regs);
        let dtype = snapshot.dtype(self.pc)?;

        if break_op::should_break(&inst.brk, &snapshot, self.pc)? {
            tracing::trace!(pc = self.pc, "break fired");
            match debug.on_break(self, 0) {
                DebugAction::Quit => {
                    self.pc = INST_MEM_SIZE as u32;
                    return Ok(());
                }
                DebugAction::Continue | DebugAction::Step => {}
            }
        }

        xmem_op::execute(&inst.xmem, &snapshot, &mut self.regs, &mut self.xmem, self.pc)?;
        lr_op::execute(&inst.lr, &snapshot, &mut self.regs, self.pc)?;
        mult_op::execute(&inst.mult, &snapshot, dtype, self.pc, &mut self.mult_res)?;
        acc_op::execute(&inst.acc, &snapshot, &mut self.regs, dtype, &self.mult_res, self.pc)?;
        self.pc = cond_op::execute(&inst.cond, &snapshot, self.pc)?;

        Ok(())
    }
}
