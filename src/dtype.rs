//! Numeric kernel (C1): per-dtype `mult`, `add`, `mac` with bit-exact
//! low-precision float/int semantics, grounded the way the teacher's ALU
//! module (`fuel-vm/src/interpreter/alu.rs`) separates "which register/dtype"
//! plumbing from the pure arithmetic it delegates to.

use crate::error::CycleError;
use crate::float::{convert_from_fp32, convert_to_fp32};

/// One of the eight dtypes the active-dtype register (`cr[15]`) may select.
///
/// Encodings are this crate's own choice (spec.md leaves the assembler's
/// wire encoding out of scope); see DESIGN.md for the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum DType {
    #[strum(serialize = "int4_low")]
    Int4Low,
    #[strum(serialize = "int4_high")]
    Int4High,
    #[strum(serialize = "int8")]
    Int8,
    #[strum(serialize = "fp4")]
    Fp4,
    #[strum(serialize = "fp8_e4m3")]
    Fp8E4M3,
    #[strum(serialize = "fp8_e5m2")]
    Fp8E5M2,
    #[strum(serialize = "fp16")]
    Fp16,
    #[strum(serialize = "tf32")]
    Tf32,
}

/// `(exp_bits, man_bits, bias)` for each float dtype, per spec.md §4.1's table.
struct FloatLayout {
    exp_bits: u32,
    man_bits: u32,
    bias: i32,
}

impl DType {
    /// Decode `cr[15]`'s raw value into a dtype, per this crate's encoding
    /// table (DESIGN.md). Fatal (§7: invalid dtype is fatal) if unrecognized.
    pub fn from_cr15(raw: u32, pc: u32) -> Result<Self, CycleError> {
        match raw {
            0 => Ok(Self::Int4Low),
            1 => Ok(Self::Int4High),
            2 => Ok(Self::Int8),
            3 => Ok(Self::Fp4),
            4 => Ok(Self::Fp8E4M3),
            5 => Ok(Self::Fp8E5M2),
            6 => Ok(Self::Fp16),
            7 => Ok(Self::Tf32),
            _ => Err(CycleError::InvalidDtype { pc, raw }),
        }
    }

    /// This dtype's numeric encoding, the inverse of [`Self::from_cr15`].
    pub const fn to_cr15(self) -> u32 {
        match self {
            Self::Int4Low => 0,
            Self::Int4High => 1,
            Self::Int8 => 2,
            Self::Fp4 => 3,
            Self::Fp8E4M3 => 4,
            Self::Fp8E5M2 => 5,
            Self::Fp16 => 6,
            Self::Tf32 => 7,
        }
    }

    /// Whether this dtype's arithmetic domain is `f32` (as opposed to `i32`).
    pub const fn is_float(self) -> bool {
        !matches!(self, Self::Int4Low | Self::Int4High | Self::Int8)
    }

    /// Whether this dtype's arithmetic domain is `i32` (as opposed to `f32`).
    pub const fn is_int(self) -> bool {
        !self.is_float()
    }

    fn float_layout(self) -> FloatLayout {
        match self {
            Self::Fp4 => FloatLayout { exp_bits: 2, man_bits: 1, bias: 1 },
            Self::Fp8E4M3 => FloatLayout { exp_bits: 4, man_bits: 3, bias: 7 },
            Self::Fp8E5M2 => FloatLayout { exp_bits: 5, man_bits: 2, bias: 15 },
            Self::Fp16 => FloatLayout { exp_bits: 5, man_bits: 10, bias: 15 },
            Self::Tf32 => FloatLayout { exp_bits: 8, man_bits: 10, bias: 127 },
            Self::Int4Low | Self::Int4High | Self::Int8 => {
                unreachable!("float_layout called on an integer dtype")
            }
        }
    }

    /// Bit width of this dtype's packed float encoding (unused for ints).
    pub fn packed_bits(self) -> u32 {
        let l = self.float_layout();
        1 + l.exp_bits + l.man_bits
    }

    /// Decode a packed bit pattern of this dtype into `f32`.
    pub fn unpack_to_f32(self, bits: u32) -> f32 {
        let l = self.float_layout();
        let sign_bit = l.exp_bits + l.man_bits;
        let sign = (bits >> sign_bit) & 1 == 1;
        let man = bits & ((1 << l.man_bits) - 1);
        let exp = (bits >> l.man_bits) & ((1 << l.exp_bits) - 1);
        convert_to_fp32(sign, exp, man, l.exp_bits, l.man_bits, l.bias)
    }

    /// Encode an `f32` into this dtype's packed bit pattern.
    pub fn pack_from_f32(self, v: f32) -> u32 {
        let l = self.float_layout();
        let (sign, exp, man) = convert_from_fp32(v, l.exp_bits, l.man_bits, l.bias);
        (u32::from(sign) << (l.exp_bits + l.man_bits)) | (exp << l.man_bits) | man
    }
}

/// A sign-extended-to-32-bit operand or result, tagged by its dtype family.
///
/// Integer dtypes carry `i32`; float dtypes carry `f32`. This is the one
/// type `mult`/`add`/`mac` speak, so the Acc sub-op doesn't need to know
/// which family is active beyond picking the right variant when it reads a
/// raw accumulator word.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
    /// Integer dtypes' arithmetic domain.
    Int(i32),
    /// Float dtypes' arithmetic domain.
    Float(f32),
}

impl Num {
    /// Reinterpret a raw 32-bit register/XMEM word as this dtype's domain.
    pub fn from_word_bits(bits: u32, dtype: DType) -> Self {
        if dtype.is_float() {
            Self::Float(f32::from_bits(bits))
        } else {
            Self::Int(bits as i32)
        }
    }

    /// The raw 32-bit pattern to store back into a register/XMEM word.
    pub fn to_word_bits(self) -> u32 {
        match self {
            Self::Int(v) => v as u32,
            Self::Float(v) => v.to_bits(),
        }
    }
}

fn sign_extend_nibble(byte: u8, high: bool) -> i32 {
    let nibble = if high { byte >> 4 } else { byte & 0x0F } & 0x0F;
    ((nibble as i32) << 28) >> 28
}

fn int_operand(byte: u8, dtype: DType) -> i32 {
    match dtype {
        DType::Int4Low => sign_extend_nibble(byte, false),
        DType::Int4High => sign_extend_nibble(byte, true),
        DType::Int8 => byte as i8 as i32,
        _ => unreachable!("int_operand called on a float dtype"),
    }
}

fn float_operand(byte: u8, dtype: DType) -> f32 {
    // A single lane byte only ever carries FP4/FP8 operands (FP16/TF32
    // lanes are wider than a byte and are read as pre-packed words by the
    // caller); mult/mac route through this for the one-byte-per-lane dtypes.
    dtype.unpack_to_f32(byte as u32 & ((1 << dtype.packed_bits()) - 1))
}

/// `mult(a, b, dtype) -> result`, bit-exact per spec.md §4.1.
pub fn mult(a: u8, b: u8, dtype: DType) -> Num {
    if dtype.is_float() {
        Num::Float(float_operand(a, dtype) * float_operand(b, dtype))
    } else {
        Num::Int(int_operand(a, dtype).wrapping_mul(int_operand(b, dtype)))
    }
}

/// `add(a, b, dtype) -> result`, bit-exact per spec.md §4.1.
///
/// `a`/`b` are already `Num`s in this dtype's arithmetic domain (the raw
/// accumulator/mult-result words, already unpacked by the caller).
pub fn add(a: Num, b: Num, dtype: DType) -> Num {
    match (a, b, dtype.is_float()) {
        (Num::Int(x), Num::Int(y), false) => Num::Int(x.wrapping_add(y)),
        (Num::Float(x), Num::Float(y), true) => Num::Float(x + y),
        _ => panic!("add called with operands inconsistent with dtype {dtype}"),
    }
}

/// `mac(a, b, acc, dtype) -> acc + mult(a, b, dtype)`, per spec.md §4.1.
pub fn mac(a: u8, b: u8, acc: Num, dtype: DType) -> Num {
    add(acc, mult(a, b, dtype), dtype)
}
