//! Program file loading (spec.md §6): an ordered sequence of decoded
//! instruction records read from a binary stream. Partial records are
//! fatal; missing records past EOF are NOP-padded; maximum `INST_MEM_SIZE`
//! records. Grounded in the teacher's fixed-width wire-format (de)serializers
//! for its own binary types (e.g. `fuel-tx`'s canonical encoding), adapted
//! here to a pad-to-fixed-length record stream rather than a length-prefixed
//! variable encoding, since spec.md's instruction memory is a fixed-size
//! array rather than a growable list.

use std::io::Read;

use crate::consts::INST_MEM_SIZE;
use crate::error::ProgramLoadError;
use crate::instruction::{Instruction, INSTRUCTION_RECORD_BYTES};

/// Loads a sequence of decoded instruction records into a full, NOP-padded
/// instruction memory.
pub struct Program;

impl Program {
    /// Read instruction records from `reader` until EOF, padding the result
    /// up to `INST_MEM_SIZE` with NOPs.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Vec<Instruction>, ProgramLoadError> {
        let mut instructions = Vec::new();
        let mut buf = [0u8; INSTRUCTION_RECORD_BYTES];

        loop {
            let mut filled = 0;
            while filled < INSTRUCTION_RECORD_BYTES {
                let n = reader.read(&mut buf[filled..])?;
                if n == 0 {
                    break;
                }
                filled += n;
            }

            if filled == 0 {
                break;
            }
            if filled < INSTRUCTION_RECORD_BYTES {
                return Err(ProgramLoadError::TruncatedRecord { index: instructions.len() });
            }
            if instructions.len() >= INST_MEM_SIZE {
                return Err(ProgramLoadError::TooManyRecords { max: INST_MEM_SIZE });
            }
            instructions.push(Instruction::from_bytes(&buf));
        }

        instructions.resize(INST_MEM_SIZE, Instruction::nop());
        Ok(instructions)
    }
}
