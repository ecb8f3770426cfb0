//! Run loop (C7): drives the cycle engine with a max-cycles safety limit,
//! per spec.md §7's classification of PC-terminal and max-cycles as
//! termination conditions rather than errors. Grounded on the teacher's
//! `Interpreter::transact`/`StateTransition`-returning outer loop
//! (`fuel-vm/src/interpreter/executors/transaction.rs`) in the sense that
//! both report *why* execution stopped as data, not as a `Result` variant.

use crate::debug::DebugHandler;
use crate::error::RunError;
use crate::interpreter::Cpu;

/// Configures [`run`]. ISA-fixed sizes stay in [`crate::consts`]; this is
/// the one runtime-tunable knob spec.md leaves to the caller.
#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    /// Maximum number of cycles to execute before giving up.
    pub max_cycles: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { max_cycles: 1_000_000 }
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// `pc` reached `INST_MEM_SIZE`, via BKPT or a debug QUIT.
    Halted {
        /// Number of cycles executed.
        cycles: u64,
    },
    /// The safety limit was reached before the program halted.
    MaxCyclesReached {
        /// Number of cycles executed (equal to `RunConfig::max_cycles`).
        cycles: u64,
    },
}

/// Drive `cpu` one cycle at a time until it halts or `config.max_cycles` is
/// exhausted.
pub fn run(
    cpu: &mut Cpu,
    config: &RunConfig,
    debug: &mut dyn DebugHandler,
) -> Result<RunOutcome, RunError> {
    let mut cycles: u64 = 0;
    while !cpu.is_terminal() {
        if cycles >= config.max_cycles {
            tracing::warn!(cycles, "max cycles reached before program halted");
            return Ok(RunOutcome::MaxCyclesReached { cycles });
        }
        cpu.step(debug)?;
        cycles += 1;
    }
    tracing::info!(cycles, "program halted");
    Ok(RunOutcome::Halted { cycles })
}
