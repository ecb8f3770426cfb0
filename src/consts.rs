//! IPU parameters
//!
//! These are ISA facts, not configuration: they never change at runtime
//! and are not exposed through [`crate::runner::RunConfig`].

/// Width of a single multiply-stage register, in bytes.
pub const R_REG_BYTES: usize = 128;

/// Width of the cyclic multiply-stage register, in bytes.
pub const R_CYCLIC_BYTES: usize = 512;

/// Width of the accumulator register, in bytes.
///
/// Two TF32 lane vectors of 304 bytes each.
pub const R_ACC_BYTES: usize = 608;

/// Width of a single TF32 lane vector inside the accumulator, in bytes.
pub const R_ACC_TF32_VEC_BYTES: usize = 304;

/// Number of named multiply-stage `r` registers (r0, r1).
pub const MULT_STAGE_R_REGS: usize = 2;

/// Number of LR scalar registers.
pub const LR_REGS: usize = 16;

/// Number of CR scalar registers.
pub const CR_REGS: usize = 16;

/// Index of the CR register holding the active arithmetic dtype.
pub const CR_DTYPE_INDEX: usize = 15;

/// Number of instruction slots in instruction memory.
pub const INST_MEM_SIZE: usize = 1024;

/// Size of external memory, in bytes (2 MiB).
pub const XMEM_SIZE: usize = 2 * 1024 * 1024;

/// Width of an aligned XMEM block, in bytes.
pub const XMEM_WIDTH: usize = 128;

/// Number of 32-bit words addressable in the accumulator's "rt" view.
///
/// `R_ACC_BYTES` is 608, but the rt view only reinterprets the first
/// `R_CYCLIC_BYTES` (512) of it as 128 x 32-bit words.
pub const ACC_RT_WORDS: usize = R_CYCLIC_BYTES / 4;

/// Bit width of a packed TF32 value (1 sign + 8 exponent + 10 mantissa).
pub const FP_TF32_WIDTH: u32 = 1 + 8 + 10;

static_assertions::const_assert_eq!(R_ACC_BYTES, 2 * R_ACC_TF32_VEC_BYTES);
static_assertions::const_assert!(R_CYCLIC_BYTES <= R_ACC_BYTES);
static_assertions::const_assert_eq!(ACC_RT_WORDS, 128);
