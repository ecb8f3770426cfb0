//! Math-support (C8): generic low-precision float pack/unpack and TF32
//! bit-dense packing into byte buffers.
//!
//! The sign/exponent/mantissa conversion here is shared by every float
//! dtype in [`crate::dtype`]; only the `(exp_bits, man_bits, bias)` triple
//! changes per format. TF32's packed-byte representation (distinct from
//! its `(sign, exp, man)` triple) lives here too since both the
//! accumulator's `rt` view and `tf32_vecs` view need it.

use crate::consts::FP_TF32_WIDTH;

/// Convert a `(sign, exp, man)` triple in a `(exp_bits, man_bits, bias)`
/// format to `f32`, per spec.md §4.1's conversion rules.
pub fn convert_to_fp32(
    sign: bool,
    exp: u32,
    man: u32,
    exp_bits: u32,
    man_bits: u32,
    bias: i32,
) -> f32 {
    debug_assert!(exp < (1 << exp_bits));
    debug_assert!(man < (1 << man_bits));

    if exp == 0 && man == 0 {
        return if sign { -0.0 } else { 0.0 };
    }

    if exp == 0 {
        // Subnormal: (-1)^sign * (man / 2^man_bits) * 2^(1 - bias)
        let magnitude =
            (man as f64) / ((1u64 << man_bits) as f64) * 2f64.powi(1 - bias);
        let magnitude = magnitude as f32;
        return if sign { -magnitude } else { magnitude };
    }

    // Normal: assemble an IEEE-754 f32 pattern with rebiased exponent and
    // the mantissa left-shifted into the top of the 23-bit fraction.
    let new_exp = ((exp as i32 - bias) + 127) as u32;
    let mantissa = man << (23 - man_bits);
    let bits = ((sign as u32) << 31) | (new_exp << 23) | mantissa;
    f32::from_bits(bits)
}

/// Convert an `f32` to a `(sign, exp, man)` triple in a
/// `(exp_bits, man_bits, bias)` format, per spec.md §4.1's symmetric rules:
/// clamp to max on overflow, produce a subnormal on underflow, otherwise
/// truncate the mantissa to the top `man_bits` bits.
pub fn convert_from_fp32(v: f32, exp_bits: u32, man_bits: u32, bias: i32) -> (bool, u32, u32) {
    let bits = v.to_bits();
    let sign = (bits >> 31) & 1 == 1;
    let f32_exp = ((bits >> 23) & 0xFF) as i32;
    let f32_man = bits & 0x007F_FFFF;

    if f32_exp == 0 && f32_man == 0 {
        return (sign, 0, 0);
    }

    let target_exp = (f32_exp - 127) + bias;
    let max_exp = (1i32 << exp_bits) - 1;

    if target_exp >= max_exp {
        let all_man = (1u32 << man_bits) - 1;
        return (sign, max_exp as u32, all_man);
    }

    if target_exp <= 0 {
        // Underflow: rebuild the subnormal mantissa by shifting the full
        // (implicit-bit-included) f32 mantissa down to the target scale.
        let full_mantissa = f32_man | (1 << 23);
        let right_shift = 24 - man_bits as i32 - target_exp;
        let mask = (1u32 << man_bits) - 1;
        let man = if !(0..32).contains(&right_shift) {
            0
        } else {
            (full_mantissa >> right_shift) & mask
        };
        return (sign, 0, man);
    }

    let man = f32_man >> (23 - man_bits);
    (sign, target_exp as u32, man)
}

/// Read a `width`-bit (`width <= 32`) value starting at `bit_offset`,
/// LSB-first, from a byte buffer.
pub fn read_bits(buf: &[u8], bit_offset: u32, width: u32) -> u32 {
    let mut result: u32 = 0;
    for i in 0..width {
        let bit_index = bit_offset + i;
        let byte = buf[(bit_index / 8) as usize];
        let bit = (byte >> (bit_index % 8)) & 1;
        result |= (bit as u32) << i;
    }
    result
}

/// Write a `width`-bit (`width <= 32`) value starting at `bit_offset`,
/// LSB-first, into a byte buffer.
pub fn write_bits(buf: &mut [u8], bit_offset: u32, value: u32, width: u32) {
    for i in 0..width {
        let bit_index = bit_offset + i;
        let byte_index = (bit_index / 8) as usize;
        let bit_in_byte = bit_index % 8;
        if (value >> i) & 1 == 1 {
            buf[byte_index] |= 1 << bit_in_byte;
        } else {
            buf[byte_index] &= !(1 << bit_in_byte);
        }
    }
}

/// Pack an array of 19-bit TF32 words into a byte buffer, LSB-first,
/// `FP_TF32_WIDTH` bits per word. Inverse of [`unpack_tf32`].
pub fn pack_tf32(values: &[u32], out: &mut [u8]) {
    for (i, &v) in values.iter().enumerate() {
        write_bits(out, i as u32 * FP_TF32_WIDTH, v, FP_TF32_WIDTH);
    }
}

/// Unpack `out.len()` 19-bit TF32 words from a byte buffer, LSB-first,
/// `FP_TF32_WIDTH` bits per word. Inverse of [`pack_tf32`].
pub fn unpack_tf32(bytes: &[u8], out: &mut [u32]) {
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = read_bits(bytes, i as u32 * FP_TF32_WIDTH, FP_TF32_WIDTH);
    }
}
