//! Register file (C3): typed multi-view storage for all named register
//! groups, plus the two nontrivial operations spec.md §4.3 calls out
//! (cyclic windowing, accumulator view pack/unpack).
//!
//! The teacher keeps registers as a flat `[Word; 64]` behind typed index
//! newtypes (`fuel-vm/src/interpreter/register.rs`'s `Registers`); this
//! register file instead groups the distinct shapes spec.md §3 defines
//! (scalar LR/CR, multiply-stage vectors, accumulator) into their own
//! structs, since they have materially different access patterns (cyclic
//! windowing, overlapping views) the teacher's uniform word array doesn't
//! need to model.

pub mod accumulator;
pub mod mult_stage;

pub use accumulator::Accumulator;
pub use mult_stage::MultStage;

use crate::consts::{CR_DTYPE_INDEX, CR_REGS, LR_REGS, R_REG_BYTES};
use crate::dtype::DType;
use crate::error::{CycleError, SubOp};

/// The full IPU register file: LR/CR scalars, the multiply stage, the
/// accumulator, and the bypass staging register.
#[derive(Clone)]
pub struct RegisterFile {
    /// 32-bit scalar address/counter/index registers.
    pub lr: [u32; LR_REGS],
    /// 32-bit scalar base-offset registers; `cr[15]` is the active dtype.
    pub cr: [u32; CR_REGS],
    /// The multiply stage's operand registers.
    pub mult: MultStage,
    /// The accumulate stage's register.
    pub acc: Accumulator,
    /// Scratch register used when an XMEM load/store names the bypass
    /// sentinel instead of a regular multiply-stage register.
    pub mem_bypass: [u8; R_REG_BYTES],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self {
            lr: [0; LR_REGS],
            cr: [0; CR_REGS],
            mult: MultStage::default(),
            acc: Accumulator::default(),
            mem_bypass: [0; R_REG_BYTES],
        }
    }
}

impl RegisterFile {
    /// A fresh, zero-initialized register file (spec.md §3: "all registers
    /// zero-initialized").
    pub fn new() -> Self {
        Self::default()
    }

    /// The active arithmetic dtype, decoded from `cr[15]`.
    pub fn dtype(&self, pc: u32) -> Result<DType, CycleError> {
        DType::from_cr15(self.cr[CR_DTYPE_INDEX], pc)
    }
}

/// Validate a raw LR index field, fatal (`RegisterIndexOutOfRange`) if it
/// names no LR register.
pub fn checked_lr_index(raw: u8, subop: SubOp, pc: u32) -> Result<usize, CycleError> {
    let index = raw as usize;
    if index < LR_REGS {
        Ok(index)
    } else {
        Err(CycleError::RegisterIndexOutOfRange {
            pc,
            subop,
            index: raw as u32,
            max: LR_REGS - 1,
        })
    }
}

/// Validate a raw CR index field, fatal (`RegisterIndexOutOfRange`) if it
/// names no CR register.
pub fn checked_cr_index(raw: u8, subop: SubOp, pc: u32) -> Result<usize, CycleError> {
    let index = raw as usize;
    if index < CR_REGS {
        Ok(index)
    } else {
        Err(CycleError::RegisterIndexOutOfRange {
            pc,
            subop,
            index: raw as u32,
            max: CR_REGS - 1,
        })
    }
}

/// A read-only copy of the register file captured at cycle start
/// (spec.md §4.4 step 2, Invariant 1: every sub-op reads exclusively from
/// this snapshot). Identical in shape to [`RegisterFile`]; kept as a
/// distinct (if thin) type so call sites can't accidentally read the live
/// register file when they meant to read the snapshot.
#[derive(Clone)]
pub struct Snapshot(RegisterFile);

impl Snapshot {
    /// Capture a snapshot of the given register file.
    pub fn capture(regs: &RegisterFile) -> Self {
        Self(regs.clone())
    }
}

impl core::ops::Deref for Snapshot {
    type Target = RegisterFile;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A multiply-stage register operand: `r0`, `r1`, or the bypass sentinel.
///
/// Modeled as a tagged variant rather than an index `-1` sentinel, per
/// spec.md §9's design notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultStageReg {
    /// `mult.r[0]`.
    R0,
    /// `mult.r[1]`.
    R1,
    /// The bypass staging register.
    Bypass,
}

/// A unified `{LR, CR}` index space used by LR `ADD`/`SUB` sources
/// (spec.md GLOSSARY: "LCR"). Indices `0..15` select an LR; `16..31`
/// select a CR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lcr {
    /// Selects `lr[index]`.
    Lr(u8),
    /// Selects `cr[index]`.
    Cr(u8),
}

impl Lcr {
    /// Resolve a flat `0..32` index into an `{LR, CR}` handle. Fatal
    /// (`RegisterIndexOutOfRange`) if `index >= 32`.
    pub fn from_flat(index: u8, subop: SubOp, pc: u32) -> Result<Self, CycleError> {
        if index < LR_REGS as u8 {
            Ok(Self::Lr(index))
        } else if index < (LR_REGS + CR_REGS) as u8 {
            Ok(Self::Cr(index - LR_REGS as u8))
        } else {
            Err(CycleError::RegisterIndexOutOfRange {
                pc,
                subop,
                index: index as u32,
                max: LR_REGS + CR_REGS - 1,
            })
        }
    }

    /// Read this handle's value out of a register-file snapshot.
    pub fn read(self, regs: &RegisterFile) -> u32 {
        match self {
            Self::Lr(i) => regs.lr[i as usize],
            Self::Cr(i) => regs.cr[i as usize],
        }
    }
}
