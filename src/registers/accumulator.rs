//! The accumulate stage's register: three overlapping views over the same
//! 608 bytes, exposed as typed accessor methods rather than a C-style
//! union, per spec.md §9's design notes.

use crate::consts::{ACC_RT_WORDS, R_ACC_BYTES, R_ACC_TF32_VEC_BYTES};
use crate::error::CycleError;
use crate::float::{pack_tf32, unpack_tf32};

/// `acc.r_acc`: 608 raw bytes, viewed as two 304-byte TF32 lane vectors
/// and a 512-byte "rt" view of 128 x 32-bit words.
#[derive(Clone)]
pub struct Accumulator {
    r_acc: [u8; R_ACC_BYTES],
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            r_acc: [0; R_ACC_BYTES],
        }
    }
}

impl Accumulator {
    /// The raw 608-byte buffer, e.g. for a whole-accumulator XMEM store
    /// (`STR_ACC_REG`).
    pub fn as_bytes(&self) -> &[u8; R_ACC_BYTES] {
        &self.r_acc
    }

    /// Mutable access to the raw 608-byte buffer.
    pub fn as_bytes_mut(&mut self) -> &mut [u8; R_ACC_BYTES] {
        &mut self.r_acc
    }

    /// Zero the entire accumulator (`RESET_ACC`).
    pub fn reset(&mut self) {
        self.r_acc = [0; R_ACC_BYTES];
    }

    /// Read the rt view's word `index` (one of 128), as a raw 32-bit
    /// pattern. Fatal if `index` is out of `0..128` (spec.md §7).
    pub fn rt_word(&self, index: u32, pc: u32) -> Result<u32, CycleError> {
        let index = self.checked_rt_index(index, pc)?;
        let bytes = &self.r_acc[index * 4..index * 4 + 4];
        Ok(u32::from_ne_bytes(bytes.try_into().expect("4-byte slice")))
    }

    /// Write the rt view's word `index` with a raw 32-bit pattern. Fatal
    /// if `index` is out of `0..128` (spec.md §7).
    pub fn set_rt_word(&mut self, index: u32, bits: u32, pc: u32) -> Result<(), CycleError> {
        let index = self.checked_rt_index(index, pc)?;
        self.r_acc[index * 4..index * 4 + 4].copy_from_slice(&bits.to_ne_bytes());
        Ok(())
    }

    fn checked_rt_index(&self, index: u32, pc: u32) -> Result<usize, CycleError> {
        if (index as usize) < ACC_RT_WORDS {
            Ok(index as usize)
        } else {
            Err(CycleError::AccIndexOutOfRange { pc, index })
        }
    }

    /// Unpack TF32 lane vector `vec_idx` (0 or 1) into 128 19-bit words.
    pub fn tf32_words(&self, vec_idx: usize) -> [u32; 128] {
        let start = vec_idx * R_ACC_TF32_VEC_BYTES;
        let mut out = [0u32; 128];
        unpack_tf32(&self.r_acc[start..start + R_ACC_TF32_VEC_BYTES], &mut out);
        out
    }

    /// Pack 128 19-bit words into TF32 lane vector `vec_idx` (0 or 1).
    pub fn set_tf32_words(&mut self, vec_idx: usize, words: &[u32; 128]) {
        let start = vec_idx * R_ACC_TF32_VEC_BYTES;
        pack_tf32(words, &mut self.r_acc[start..start + R_ACC_TF32_VEC_BYTES]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_zeroes_everything() {
        let mut acc = Accumulator::default();
        acc.set_rt_word(3, 0xDEAD_BEEF, 0).unwrap();
        acc.reset();
        assert_eq!(acc.rt_word(3, 0).unwrap(), 0);
    }

    #[test]
    fn rt_word_round_trips() {
        let mut acc = Accumulator::default();
        acc.set_rt_word(10, 6, 0).unwrap();
        assert_eq!(acc.rt_word(10, 0).unwrap(), 6);
    }

    #[test]
    fn rt_index_out_of_range_is_fatal() {
        let acc = Accumulator::default();
        let err = acc.rt_word(128, 9).unwrap_err();
        assert!(matches!(
            err,
            CycleError::AccIndexOutOfRange { pc: 9, index: 128 }
        ));
    }

    #[test]
    fn tf32_views_round_trip() {
        let mut acc = Accumulator::default();
        let mut words = [0u32; 128];
        for (i, w) in words.iter_mut().enumerate() {
            *w = (i as u32 * 37) & 0x7FFFF;
        }
        acc.set_tf32_words(0, &words);
        assert_eq!(acc.tf32_words(0), words);
    }

    #[test]
    fn tf32_vec_and_rt_view_share_storage() {
        let mut acc = Accumulator::default();
        acc.set_rt_word(0, 0xFFFF_FFFF, 0).unwrap();
        // The rt view's word 0 occupies r_acc[0..4], which also backs
        // tf32_vecs[0]'s packed bits -- the views genuinely overlap.
        assert_ne!(acc.tf32_words(0)[0], 0);
    }
}
