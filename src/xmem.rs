//! External memory (C2): a flat, byte-addressable 2 MiB RAM.
//!
//! Grounded on the teacher's `Memory` wrapper (`fuel-vm/src/interpreter/memory.rs`)
//! in spirit only: XMEM has none of the stack/heap-split complexity the
//! teacher's blockchain VM needs (no call frames, no gas-metered growth) —
//! spec.md §3 fixes it at a flat 2 MiB buffer that is simply bounds-checked
//! on every access, so this module keeps the teacher's "bounds-check then
//! slice" idiom and drops the rest.

use crate::consts::{XMEM_SIZE, XMEM_WIDTH};
use crate::error::{CycleError, SubOp};

/// External memory: `XMEM_SIZE` bytes, zero-initialized, byte-addressable.
#[derive(Clone)]
pub struct Xmem {
    bytes: Box<[u8]>,
}

impl Default for Xmem {
    fn default() -> Self {
        Self {
            bytes: vec![0u8; XMEM_SIZE].into_boxed_slice(),
        }
    }
}

impl Xmem {
    /// A fresh, zero-initialized XMEM.
    pub fn new() -> Self {
        Self::default()
    }

    fn bounds_check(
        &self,
        addr: u32,
        len: usize,
        pc: u32,
        subop: SubOp,
    ) -> Result<usize, CycleError> {
        let addr = addr as usize;
        let end = addr
            .checked_add(len)
            .filter(|&end| end <= XMEM_SIZE)
            .ok_or(CycleError::XmemOutOfRange {
                pc,
                subop,
                addr: addr as u32,
                len,
                size: XMEM_SIZE,
            })?;
        Ok(end)
    }

    /// Read `len` bytes starting at `addr` into `buf[..len]`.
    pub fn read(
        &self,
        addr: u32,
        buf: &mut [u8],
        len: usize,
        pc: u32,
        subop: SubOp,
    ) -> Result<(), CycleError> {
        let end = self.bounds_check(addr, len, pc, subop)?;
        buf[..len].copy_from_slice(&self.bytes[addr as usize..end]);
        Ok(())
    }

    /// Write `len` bytes from `buf[..len]` starting at `addr`.
    pub fn write(
        &mut self,
        addr: u32,
        buf: &[u8],
        len: usize,
        pc: u32,
        subop: SubOp,
    ) -> Result<(), CycleError> {
        let end = self.bounds_check(addr, len, pc, subop)?;
        self.bytes[addr as usize..end].copy_from_slice(&buf[..len]);
        Ok(())
    }

    /// Load a flat array of `len` bytes from `src` at `start`. Helper over
    /// [`Self::write`] for application preload code (spec.md §6).
    pub fn load_array(
        &mut self,
        src: &[u8],
        len: usize,
        start: u32,
        pc: u32,
    ) -> Result<(), CycleError> {
        self.write(start, src, len, pc, SubOp::Xmem)
    }

    /// Load a `rows x cols` matrix from `src`, one row per 128-byte-aligned
    /// row start, per spec.md §4.2.
    pub fn load_matrix(
        &mut self,
        src: &[u8],
        rows: usize,
        cols: usize,
        start: u32,
        pc: u32,
    ) -> Result<(), CycleError> {
        for row in 0..rows {
            let row_addr = start
                .checked_add((row * Self::align(cols)) as u32)
                .expect("matrix row address overflowed u32");
            let row_src = &src[row * cols..row * cols + cols];
            self.write(row_addr, row_src, cols, pc, SubOp::Xmem)?;
        }
        Ok(())
    }

    /// Preload raw bytes at an application-specified base address
    /// (spec.md §6's "data files" contract).
    pub fn load_bytes(&mut self, addr: u32, data: &[u8]) -> Result<(), CycleError> {
        self.write(addr, data, data.len(), 0, SubOp::Xmem)
    }

    /// Dump `len` raw bytes starting at `addr` (spec.md §6's output contract).
    pub fn dump_bytes(&self, addr: u32, len: usize) -> Result<Vec<u8>, CycleError> {
        let mut out = vec![0u8; len];
        self.read(addr, &mut out, len, 0, SubOp::Xmem)?;
        Ok(out)
    }

    /// Round `addr` up to the next multiple of `XMEM_WIDTH`.
    pub const fn align(addr: usize) -> usize {
        (addr + XMEM_WIDTH - 1) / XMEM_WIDTH * XMEM_WIDTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_bytes_read_as_zero() {
        let xmem = Xmem::new();
        let mut buf = [0xFFu8; 4];
        xmem.read(0, &mut buf, 4, 0, SubOp::Xmem).unwrap();
        assert_eq!(buf, [0, 0, 0, 0]);
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut xmem = Xmem::new();
        xmem.write(0x1000, &[1, 2, 3, 4], 4, 0, SubOp::Xmem).unwrap();
        let mut buf = [0u8; 4];
        xmem.read(0x1000, &mut buf, 4, 0, SubOp::Xmem).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn out_of_range_is_fatal() {
        let xmem = Xmem::new();
        let mut buf = [0u8; 4];
        let err = xmem
            .read((XMEM_SIZE - 2) as u32, &mut buf, 4, 3, SubOp::Xmem)
            .unwrap_err();
        assert!(matches!(err, CycleError::XmemOutOfRange { pc: 3, .. }));
    }

    #[test]
    fn align_rounds_up_to_width() {
        assert_eq!(Xmem::align(0), 0);
        assert_eq!(Xmem::align(1), XMEM_WIDTH);
        assert_eq!(Xmem::align(XMEM_WIDTH), XMEM_WIDTH);
        assert_eq!(Xmem::align(XMEM_WIDTH + 1), 2 * XMEM_WIDTH);
    }
}
