//! Debug collaborator (spec.md §6: `enter_prompt(ipu_handle, level) ->
//! {CONTINUE, STEP, QUIT}`), given first-class shape the way the teacher's
//! `state::Debugger` is a concrete type the interpreter owns rather than a
//! raw closure, with a no-op default for running headless
//! (`fuel-vm`'s `NoopEcal`/default-`Debugger` fill the same role).

use crate::interpreter::Cpu;

/// The action a debug collaborator returns after a break fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugAction {
    /// Resume normal execution.
    Continue,
    /// Resume, but break again at the very next cycle.
    Step,
    /// Halt the run immediately.
    Quit,
}

/// An external collaborator invoked whenever a Break sub-op fires.
pub trait DebugHandler {
    /// Called with the IPU state as of this cycle's break and the
    /// requested debug level (spec.md §6's `enter_prompt`).
    fn on_break(&mut self, cpu: &Cpu, level: u32) -> DebugAction;
}

/// A [`DebugHandler`] that always continues; used when nothing wires up an
/// interactive debugger.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDebugHandler;

impl DebugHandler for NoopDebugHandler {
    fn on_break(&mut self, _cpu: &Cpu, _level: u32) -> DebugAction {
        DebugAction::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Instruction;

    #[test]
    fn noop_handler_always_continues() {
        let cpu = Cpu::new(vec![Instruction::nop(); 1]);
        let mut handler = NoopDebugHandler;
        assert_eq!(handler.on_break(&cpu, 0), DebugAction::Continue);
    }
}
