//! Runtime error taxonomy.
//!
//! Mirrors the split the teacher crate draws between per-cycle interpreter
//! faults and the outer run-loop error: [`CycleError`] covers the
//! program-well-formedness and state-bounds errors from spec.md §7 (all
//! fatal, all abort the cycle immediately, no partial cycle is ever
//! committed), and [`RunError`] wraps it for the run loop, adding the one
//! recoverable resource error (instruction file I/O).

use thiserror::Error;

/// Names one of the six sub-instruction slots, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum SubOp {
    #[strum(serialize = "xmem")]
    Xmem,
    #[strum(serialize = "lr")]
    Lr,
    #[strum(serialize = "mult")]
    Mult,
    #[strum(serialize = "acc")]
    Acc,
    #[strum(serialize = "cond")]
    Cond,
    #[strum(serialize = "break")]
    Break,
}

/// A fatal, cycle-aborting error.
///
/// Every variant carries the program counter of the cycle that raised it
/// and names the offending sub-op/field, per spec.md §7's user-visible
/// failure contract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CycleError {
    /// Unknown opcode encoding in a sub-op slot.
    #[error("pc={pc}: unknown opcode in {subop} slot (raw={raw})")]
    UnknownOpcode {
        /// Program counter of the cycle that raised the error.
        pc: u32,
        /// Sub-op slot that held the unknown opcode.
        subop: SubOp,
        /// The raw, unrecognized opcode value.
        raw: u32,
    },

    /// Two LR sub-ops in the same cycle wrote the same LR index.
    #[error("pc={pc}: lr conflict: both lr sub-op slots write lr{index}")]
    LrWriteConflict {
        /// Program counter of the cycle that raised the error.
        pc: u32,
        /// The LR index both slots targeted.
        index: u8,
    },

    /// An XMEM store named the bypass register as its source.
    #[error("pc={pc}: xmem str_acc_reg/store may not read from the bypass register")]
    BypassStoreSource {
        /// Program counter of the cycle that raised the error.
        pc: u32,
    },

    /// A cyclic-register deposit target was not 128-byte aligned.
    #[error(
        "pc={pc}: ldr_cyclic_mult_reg deposit offset {offset} (from lr{lr_idx}) is not aligned to {align} bytes"
    )]
    MisalignedCyclicDeposit {
        /// Program counter of the cycle that raised the error.
        pc: u32,
        /// LR index supplying the cyclic deposit offset.
        lr_idx: u8,
        /// The unaligned byte offset that was requested.
        offset: u32,
        /// Required alignment, in bytes.
        align: usize,
    },

    /// An XMEM access fell outside `[0, XMEM_SIZE)`.
    #[error("pc={pc}: xmem {subop} access out of range: addr={addr} len={len} size={size}")]
    XmemOutOfRange {
        /// Program counter of the cycle that raised the error.
        pc: u32,
        /// Sub-op that issued the access.
        subop: SubOp,
        /// Requested start address.
        addr: u32,
        /// Requested access length, in bytes.
        len: usize,
        /// Size of XMEM, in bytes.
        size: usize,
    },

    /// A register index (LR, CR, or multiply-stage) was out of range.
    #[error("pc={pc}: {subop} register index {index} out of range (max {max})")]
    RegisterIndexOutOfRange {
        /// Program counter of the cycle that raised the error.
        pc: u32,
        /// Sub-op that issued the access.
        subop: SubOp,
        /// The out-of-range index.
        index: u32,
        /// Largest valid index.
        max: usize,
    },

    /// An accumulator word index fell outside `0..128`.
    #[error("pc={pc}: accumulator word index {index} out of range 0..128")]
    AccIndexOutOfRange {
        /// Program counter of the cycle that raised the error.
        pc: u32,
        /// The out-of-range word index.
        index: u32,
    },

    /// `cr[15]` held a value that does not name a supported dtype.
    #[error("pc={pc}: cr[15] does not encode a supported dtype (raw={raw})")]
    InvalidDtype {
        /// Program counter of the cycle that raised the error.
        pc: u32,
        /// The raw, unrecognized dtype encoding.
        raw: u32,
    },
}

impl CycleError {
    /// The program counter of the cycle that raised this error.
    pub const fn pc(&self) -> u32 {
        match self {
            Self::UnknownOpcode { pc, .. }
            | Self::LrWriteConflict { pc, .. }
            | Self::BypassStoreSource { pc }
            | Self::MisalignedCyclicDeposit { pc, .. }
            | Self::XmemOutOfRange { pc, .. }
            | Self::RegisterIndexOutOfRange { pc, .. }
            | Self::AccIndexOutOfRange { pc, .. }
            | Self::InvalidDtype { pc, .. } => *pc,
        }
    }
}

/// Resource error at the program-loading boundary (spec.md §7: "recoverable
/// at the run-loop boundary, not inside the engine").
#[derive(Debug, Error)]
pub enum ProgramLoadError {
    /// The instruction stream ended mid-record.
    #[error("truncated instruction record at index {index}")]
    TruncatedRecord {
        /// Index of the partial record.
        index: usize,
    },
    /// Underlying I/O failure while reading the instruction stream.
    #[error("failed to read instruction stream: {0}")]
    Io(#[from] std::io::Error),
    /// More than `INST_MEM_SIZE` records were present in the stream.
    #[error("instruction stream holds more than {max} records")]
    TooManyRecords {
        /// Maximum number of records (`INST_MEM_SIZE`).
        max: usize,
    },
}

/// Top-level error returned by [`crate::runner::run`].
#[derive(Debug, Error)]
pub enum RunError {
    /// A fatal cycle-engine error aborted the run.
    #[error(transparent)]
    Cycle(#[from] CycleError),
    /// The instruction file could not be loaded.
    #[error(transparent)]
    ProgramLoad(#[from] ProgramLoadError),
}
