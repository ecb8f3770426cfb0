//! Instruction decoder interface (C4): a passive data structure describing
//! one fetched wide instruction, with its six independent sub-op slots.
//!
//! spec.md §6 treats the assembler as an external collaborator and this
//! struct as the only part of its contract this crate owns. There being no
//! assembler crate in scope, [`Instruction::from_bytes`]/[`Instruction::to_bytes`]
//! define this crate's own fixed-width wire record (DESIGN.md documents the
//! layout) so [`crate::program::Program`] has something concrete to read a
//! program file's records from. Unrecognized opcode tags decode to an
//! `Unknown` variant rather than failing to parse -- per spec.md §7, an
//! unknown opcode is a cycle-engine (execution-time) fatal error, not a
//! program-load error; only truncated records are load errors.

use crate::registers::MultStageReg;

/// Byte-offsets and the total size of a serialized [`Instruction`] record.
pub const INSTRUCTION_RECORD_BYTES: usize = 42;

fn encode_mult_stage_reg(r: MultStageReg) -> u8 {
    match r {
        MultStageReg::R0 => 0,
        MultStageReg::R1 => 1,
        MultStageReg::Bypass => 2,
    }
}

fn decode_mult_stage_reg(raw: u8) -> MultStageReg {
    match raw {
        0 => MultStageReg::R0,
        1 => MultStageReg::R1,
        _ => MultStageReg::Bypass,
    }
}

/// XMEM sub-op opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmemOpcode {
    /// No effect.
    Nop,
    /// Copy the whole accumulator to XMEM.
    StrAccReg,
    /// Load a 128-byte block into a multiply-stage register (or bypass).
    LdrMultReg,
    /// Load a 128-byte block into the lane mask register.
    LdrMultMaskReg,
    /// Load a 128-byte block from XMEM, deposit it into the cyclic register.
    LdrCyclicMultReg,
    /// Unrecognized opcode tag; fatal if dispatched.
    Unknown(u8),
}

/// The XMEM sub-op slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmemSlot {
    /// The opcode.
    pub opcode: XmemOpcode,
    /// Target multiply-stage register (used by `LDR_MULT_REG`).
    pub target: MultStageReg,
    /// `token_2`: an LR index (address base for loads/stores, or the
    /// cyclic-deposit source base for `LDR_CYCLIC_MULT_REG`).
    pub lr_a: u8,
    /// `token_3`: an LR index, used only by `LDR_CYCLIC_MULT_REG` to name
    /// the LR holding the cyclic deposit index.
    pub lr_b: u8,
    /// `token_4`: a CR index (address offset).
    pub cr: u8,
}

impl Default for XmemSlot {
    fn default() -> Self {
        Self {
            opcode: XmemOpcode::Nop,
            target: MultStageReg::R0,
            lr_a: 0,
            lr_b: 0,
            cr: 0,
        }
    }
}

/// LR sub-op opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LrOpcode {
    /// Slot absent / no-op.
    Nop,
    /// `LRd := imm`.
    Set,
    /// `LRd := lr[LRd] + imm` (`imm == 0` is a no-write NOP).
    Incr,
    /// `LRd := read_lcr(a) + read_lcr(b)`.
    Add,
    /// `LRd := read_lcr(a) - read_lcr(b)`.
    Sub,
    /// Unrecognized opcode tag; fatal if dispatched.
    Unknown(u8),
}

/// One of the two LR sub-op slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LrSlot {
    /// The opcode.
    pub opcode: LrOpcode,
    /// Target LR index.
    pub target: u8,
    /// First LCR source (flat `0..32` index; `ADD`/`SUB` only).
    pub lcr_a: u8,
    /// Second LCR source (flat `0..32` index; `ADD`/`SUB` only).
    pub lcr_b: u8,
    /// Immediate (`SET`/`INCR` only).
    pub imm: u32,
}

impl Default for LrSlot {
    fn default() -> Self {
        Self {
            opcode: LrOpcode::Nop,
            target: 0,
            lcr_a: 0,
            lcr_b: 0,
            imm: 0,
        }
    }
}

/// Mult sub-op opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultOpcode {
    /// No effect.
    Nop,
    /// Elementwise multiply of two full 128-lane operands.
    MultEe,
    /// Elementwise multiply with a scalar broadcast from the opposite source.
    MultEv,
    /// Unrecognized opcode tag; fatal if dispatched.
    Unknown(u8),
}

/// The Mult sub-op slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultSlot {
    /// The opcode.
    pub opcode: MultOpcode,
    /// Source multiply-stage register (`r0`, `r1`, or bypass).
    pub ra: MultStageReg,
    /// LR holding the cyclic-window byte offset.
    pub lr_cyclic_base: u8,
    /// LR holding the lane-mask index.
    pub lr_mask_idx: u8,
    /// LR holding the signed mask shift amount.
    pub lr_shift: u8,
    /// LR holding the scalar-broadcast lane index (`MULT_EV` only).
    pub lr_scalar_idx: u8,
}

impl Default for MultSlot {
    fn default() -> Self {
        Self {
            opcode: MultOpcode::Nop,
            ra: MultStageReg::R0,
            lr_cyclic_base: 0,
            lr_mask_idx: 0,
            lr_shift: 0,
            lr_scalar_idx: 0,
        }
    }
}

/// Acc sub-op opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccOpcode {
    /// No effect.
    Nop,
    /// `r_acc.words[i] := add(r_acc.words[i], mult_res.words[i], dtype)`.
    Acc,
    /// Zero the entire accumulator.
    ResetAcc,
    /// Reduce a 128-lane product into one accumulator word
    /// (spec.md §9, Open Question 3: not in the final register layout,
    /// kept only in case a decoder surfaces it).
    Agg,
    /// Unrecognized opcode tag; fatal if dispatched.
    Unknown(u8),
}

/// The Acc sub-op slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccSlot {
    /// The opcode.
    pub opcode: AccOpcode,
    /// LR holding the destination word index (`AGG` only).
    pub lr_idx: u8,
}

impl Default for AccSlot {
    fn default() -> Self {
        Self {
            opcode: AccOpcode::Nop,
            lr_idx: 0,
        }
    }
}

/// Cond sub-op opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondOpcode {
    /// Slot absent / no-op; default `pc += 1` applies.
    Nop,
    /// Branch if `lr1 == lr2`.
    Beq,
    /// Branch if `lr1 != lr2`.
    Bne,
    /// Branch if `lr1 < lr2` (unsigned).
    Blt,
    /// Branch if `lr1 == 0`.
    Bz,
    /// Branch if `lr1 != 0`.
    Bnz,
    /// Unconditional branch to `label`.
    B,
    /// Unconditional branch to `lr1`.
    Br,
    /// Halt (`pc := INST_MEM_SIZE`).
    Bkpt,
    /// Unrecognized opcode tag; fatal if dispatched.
    Unknown(u8),
}

/// The Cond sub-op slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CondSlot {
    /// The opcode.
    pub opcode: CondOpcode,
    /// First LR operand.
    pub lr1: u8,
    /// Second LR operand.
    pub lr2: u8,
    /// Absolute instruction-memory label.
    pub label: u32,
}

impl Default for CondSlot {
    fn default() -> Self {
        Self {
            opcode: CondOpcode::Nop,
            lr1: 0,
            lr2: 0,
            label: 0,
        }
    }
}

/// Break sub-op opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakOpcode {
    /// No effect.
    Nop,
    /// Unconditional break.
    Break,
    /// Break if `lr[lr_idx] == imm`.
    BreakIfEq,
    /// Unrecognized opcode tag; fatal if dispatched.
    Unknown(u8),
}

/// The Break sub-op slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakSlot {
    /// The opcode.
    pub opcode: BreakOpcode,
    /// LR operand (`BREAK_IFEQ` only).
    pub lr_idx: u8,
    /// Immediate (`BREAK_IFEQ` only).
    pub imm: u32,
}

impl Default for BreakSlot {
    fn default() -> Self {
        Self {
            opcode: BreakOpcode::Nop,
            lr_idx: 0,
            imm: 0,
        }
    }
}

/// One fully-decoded wide IPU instruction: six independent sub-op slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Instruction {
    /// The XMEM sub-op.
    pub xmem: XmemSlot,
    /// The two LR sub-op slots.
    pub lr: [LrSlot; 2],
    /// The Mult sub-op.
    pub mult: MultSlot,
    /// The Acc sub-op.
    pub acc: AccSlot,
    /// The Cond sub-op.
    pub cond: CondSlot,
    /// The Break sub-op.
    pub brk: BreakSlot,
}

impl Instruction {
    /// An all-NOP instruction, used to pad instruction memory past EOF
    /// (spec.md §6).
    pub fn nop() -> Self {
        Self::default()
    }

    /// Serialize this instruction into this crate's fixed-width wire
    /// record (DESIGN.md).
    pub fn to_bytes(&self) -> [u8; INSTRUCTION_RECORD_BYTES] {
        let mut buf = [0u8; INSTRUCTION_RECORD_BYTES];
        let mut w = Writer { buf: &mut buf, at: 0 };

        w.u8(match self.xmem.opcode {
            XmemOpcode::Nop => 0,
            XmemOpcode::StrAccReg => 1,
            XmemOpcode::LdrMultReg => 2,
            XmemOpcode::LdrMultMaskReg => 3,
            XmemOpcode::LdrCyclicMultReg => 4,
            XmemOpcode::Unknown(raw) => raw,
        });
        w.u8(encode_mult_stage_reg(self.xmem.target));
        w.u8(self.xmem.lr_a);
        w.u8(self.xmem.lr_b);
        w.u8(self.xmem.cr);

        for slot in &self.lr {
            w.u8(match slot.opcode {
                LrOpcode::Nop => 0,
                LrOpcode::Set => 1,
                LrOpcode::Incr => 2,
                LrOpcode::Add => 3,
                LrOpcode::Sub => 4,
                LrOpcode::Unknown(raw) => raw,
            });
            w.u8(slot.target);
            w.u8(slot.lcr_a);
            w.u8(slot.lcr_b);
            w.u32(slot.imm);
        }

        w.u8(match self.mult.opcode {
            MultOpcode::Nop => 0,
            MultOpcode::MultEe => 1,
            MultOpcode::MultEv => 2,
            MultOpcode::Unknown(raw) => raw,
        });
        w.u8(encode_mult_stage_reg(self.mult.ra));
        w.u8(self.mult.lr_cyclic_base);
        w.u8(self.mult.lr_mask_idx);
        w.u8(self.mult.lr_shift);
        w.u8(self.mult.lr_scalar_idx);

        w.u8(match self.acc.opcode {
            AccOpcode::Nop => 0,
            AccOpcode::Acc => 1,
            AccOpcode::ResetAcc => 2,
            AccOpcode::Agg => 3,
            AccOpcode::Unknown(raw) => raw,
        });
        w.u8(self.acc.lr_idx);

        w.u8(match self.cond.opcode {
            CondOpcode::Nop => 0,
            CondOpcode::Beq => 1,
            CondOpcode::Bne => 2,
            CondOpcode::Blt => 3,
            CondOpcode::Bz => 4,
            CondOpcode::Bnz => 5,
            CondOpcode::B => 6,
            CondOpcode::Br => 7,
            CondOpcode::Bkpt => 8,
            CondOpcode::Unknown(raw) => raw,
        });
        w.u8(self.cond.lr1);
        w.u8(self.cond.lr2);
        w.u32(self.cond.label);

        w.u8(match self.brk.opcode {
            BreakOpcode::Nop => 0,
            BreakOpcode::Break => 1,
            BreakOpcode::BreakIfEq => 2,
            BreakOpcode::Unknown(raw) => raw,
        });
        w.u8(self.brk.lr_idx);
        w.u32(self.brk.imm);

        debug_assert_eq!(w.at, INSTRUCTION_RECORD_BYTES);
        buf
    }

    /// Deserialize one instruction from a fixed-width wire record.
    /// Unrecognized opcode tags become `Unknown`; this never fails.
    pub fn from_bytes(buf: &[u8; INSTRUCTION_RECORD_BYTES]) -> Self {
        let mut r = Reader { buf, at: 0 };

        let xmem = XmemSlot {
            opcode: match r.u8() {
                0 => XmemOpcode::Nop,
                1 => XmemOpcode::StrAccReg,
                2 => XmemOpcode::LdrMultReg,
                3 => XmemOpcode::LdrMultMaskReg,
                4 => XmemOpcode::LdrCyclicMultReg,
                raw => XmemOpcode::Unknown(raw),
            },
            target: decode_mult_stage_reg(r.u8()),
            lr_a: r.u8(),
            lr_b: r.u8(),
            cr: r.u8(),
        };

        let lr = [0, 1].map(|_| LrSlot {
            opcode: match r.u8() {
                0 => LrOpcode::Nop,
                1 => LrOpcode::Set,
                2 => LrOpcode::Incr,
                3 => LrOpcode::Add,
                4 => LrOpcode::Sub,
                raw => LrOpcode::Unknown(raw),
            },
            target: r.u8(),
            lcr_a: r.u8(),
            lcr_b: r.u8(),
            imm: r.u32(),
        });

        let mult = MultSlot {
            opcode: match r.u8() {
                0 => MultOpcode::Nop,
                1 => MultOpcode::MultEe,
                2 => MultOpcode::MultEv,
                raw => MultOpcode::Unknown(raw),
            },
            ra: decode_mult_stage_reg(r.u8()),
            lr_cyclic_base: r.u8(),
            lr_mask_idx: r.u8(),
            lr_shift: r.u8(),
            lr_scalar_idx: r.u8(),
        };

        let acc = AccSlot {
            opcode: match r.u8() {
                0 => AccOpcode::Nop,
                1 => AccOpcode::Acc,
                2 => AccOpcode::ResetAcc,
                3 => AccOpcode::Agg,
                raw => AccOpcode::Unknown(raw),
            },
            lr_idx: r.u8(),
        };

        let cond = CondSlot {
            opcode: match r.u8() {
                0 => CondOpcode::Nop,
                1 => CondOpcode::Beq,
                2 => CondOpcode::Bne,
                3 => CondOpcode::Blt,
                4 => CondOpcode::Bz,
                5 => CondOpcode::Bnz,
                6 => CondOpcode::B,
                7 => CondOpcode::Br,
                8 => CondOpcode::Bkpt,
                raw => CondOpcode::Unknown(raw),
            },
            lr1: r.u8(),
            lr2: r.u8(),
            label: r.u32(),
        };

        let brk = BreakSlot {
            opcode: match r.u8() {
                0 => BreakOpcode::Nop,
                1 => BreakOpcode::Break,
                2 => BreakOpcode::BreakIfEq,
                raw => BreakOpcode::Unknown(raw),
            },
            lr_idx: r.u8(),
            imm: r.u32(),
        };

        debug_assert_eq!(r.at, INSTRUCTION_RECORD_BYTES);
        Self { xmem, lr, mult, acc, cond, brk }
    }
}

struct Writer<'a> {
    buf: &'a mut [u8],
    at: usize,
}

impl Writer<'_> {
    fn u8(&mut self, v: u8) {
        self.buf[self.at] = v;
        self.at += 1;
    }

    fn u32(&mut self, v: u32) {
        self.buf[self.at..self.at + 4].copy_from_slice(&v.to_le_bytes());
        self.at += 4;
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    at: usize,
}

impl Reader<'_> {
    fn u8(&mut self) -> u8 {
        let v = self.buf[self.at];
        self.at += 1;
        v
    }

    fn u32(&mut self) -> u32 {
        let v = u32::from_le_bytes(self.buf[self.at..self.at + 4].try_into().unwrap());
        self.at += 4;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nop_round_trips() {
        let inst = Instruction::nop();
        assert_eq!(Instruction::from_bytes(&inst.to_bytes()), inst);
    }

    #[test]
    fn full_instruction_round_trips() {
        let inst = Instruction {
            xmem: XmemSlot {
                opcode: XmemOpcode::LdrCyclicMultReg,
                target: MultStageReg::Bypass,
                lr_a: 13,
                lr_b: 15,
                cr: 2,
            },
            lr: [
                LrSlot { opcode: LrOpcode::Set, target: 0, lcr_a: 0, lcr_b: 0, imm: 10 },
                LrSlot { opcode: LrOpcode::Add, target: 6, lcr_a: 5, lcr_b: 19, imm: 0 },
            ],
            mult: MultSlot {
                opcode: MultOpcode::MultEv,
                ra: MultStageReg::R1,
                lr_cyclic_base: 1,
                lr_mask_idx: 2,
                lr_shift: 3,
                lr_scalar_idx: 4,
            },
            acc: AccSlot { opcode: AccOpcode::Acc, lr_idx: 0 },
            cond: CondSlot { opcode: CondOpcode::Bne, lr1: 0, lr2: 1, label: 42 },
            brk: BreakSlot { opcode: BreakOpcode::BreakIfEq, lr_idx: 3, imm: 7 },
        };
        assert_eq!(Instruction::from_bytes(&inst.to_bytes()), inst);
    }

    #[test]
    fn unknown_opcode_tag_decodes_without_error() {
        let mut bytes = [0u8; INSTRUCTION_RECORD_BYTES];
        bytes[0] = 200;
        let inst = Instruction::from_bytes(&bytes);
        assert_eq!(inst.xmem.opcode, XmemOpcode::Unknown(200));
    }
}
