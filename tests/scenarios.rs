//! End-to-end scenarios from spec.md §8 (S1-S6), driven entirely through
//! the public `Cpu`/`Program` API rather than poking at interpreter
//! internals -- the same way the teacher's top-level `tests/` directory
//! drives `Interpreter` through full transactions rather than unit-testing
//! its executors directly.

use ipu_emu::consts::{CR_DTYPE_INDEX, INST_MEM_SIZE};
use ipu_emu::debug::NoopDebugHandler;
use ipu_emu::dtype::DType;
use ipu_emu::instruction::{
    AccOpcode, AccSlot, CondOpcode, CondSlot, Instruction, LrOpcode, LrSlot, MultOpcode, MultSlot,
    XmemOpcode, XmemSlot,
};
use ipu_emu::registers::MultStageReg;
use ipu_emu::runner::{self, RunConfig, RunOutcome};
use ipu_emu::Cpu;

fn blank_program() -> Vec<Instruction> {
    vec![Instruction::nop(); INST_MEM_SIZE]
}

fn set_slot(target: u8, imm: u32) -> LrSlot {
    LrSlot { opcode: LrOpcode::Set, target, lcr_a: 0, lcr_b: 0, imm }
}

fn incr_slot(target: u8, imm: u32) -> LrSlot {
    LrSlot { opcode: LrOpcode::Incr, target, lcr_a: 0, lcr_b: 0, imm }
}

#[test]
fn s1_increment_loop() {
    let mut program = blank_program();
    program[0].lr[0] = set_slot(0, 0);
    program[0].lr[1] = set_slot(1, 10);
    program[1].lr[0] = incr_slot(0, 1);
    program[1].cond = CondSlot { opcode: CondOpcode::Bne, lr1: 0, lr2: 1, label: 1 };
    program[2].cond = CondSlot { opcode: CondOpcode::Bkpt, lr1: 0, lr2: 0, label: 0 };

    let mut cpu = Cpu::new(program);
    let outcome = runner::run(&mut cpu, &RunConfig::default(), &mut NoopDebugHandler).unwrap();

    assert!(matches!(outcome, RunOutcome::Halted { .. }));
    assert_eq!(cpu.regs.lr[0], 10);
    assert_eq!(cpu.regs.lr[1], 10);
    assert!(cpu.is_terminal());
}

#[test]
fn s2_elementwise_multiply_int8() {
    let mut program = blank_program();
    // set lr13 0x1000; ldr_mult_reg r1 lr13 cr0
    program[0].lr[0] = set_slot(13, 0x1000);
    program[0].xmem = XmemSlot {
        opcode: XmemOpcode::LdrMultReg,
        target: MultStageReg::R1,
        lr_a: 13,
        lr_b: 0,
        cr: 0,
    };
    // set lr14 0x2000; set lr15 0; ldr_cyclic_mult_reg lr14 cr0 lr15
    program[1].lr[0] = set_slot(14, 0x2000);
    program[1].lr[1] = set_slot(15, 0);
    program[1].xmem = XmemSlot {
        opcode: XmemOpcode::LdrCyclicMultReg,
        target: MultStageReg::R0,
        lr_a: 14,
        lr_b: 15,
        cr: 0,
    };
    // reset_acc
    program[2].acc = AccSlot { opcode: AccOpcode::ResetAcc, lr_idx: 0 };
    // mult.ee r1 lr0 lr0 lr0
    program[3].mult = MultSlot {
        opcode: MultOpcode::MultEe,
        ra: MultStageReg::R1,
        lr_cyclic_base: 0,
        lr_mask_idx: 0,
        lr_shift: 0,
        lr_scalar_idx: 0,
    };
    // acc
    program[4].acc = AccSlot { opcode: AccOpcode::Acc, lr_idx: 0 };
    // set lr0 0x3000; str_acc_reg lr0 cr0
    program[5].lr[0] = set_slot(0, 0x3000);
    program[5].xmem = XmemSlot {
        opcode: XmemOpcode::StrAccReg,
        target: MultStageReg::R0,
        lr_a: 0,
        lr_b: 0,
        cr: 0,
    };
    program[6].cond = CondSlot { opcode: CondOpcode::Bkpt, lr1: 0, lr2: 0, label: 0 };

    let mut cpu = Cpu::new(program);
    cpu.xmem.load_bytes(0x1000, &[2u8; 128]).unwrap();
    cpu.xmem.load_bytes(0x2000, &[3u8; 512]).unwrap();
    cpu.regs.cr[CR_DTYPE_INDEX] = DType::Int8.to_cr15();

    runner::run(&mut cpu, &RunConfig::default(), &mut NoopDebugHandler).unwrap();

    let dumped = cpu.xmem.dump_bytes(0x3000, 608).unwrap();
    for i in 0..128 {
        let word = i32::from_ne_bytes(dumped[i * 4..i * 4 + 4].try_into().unwrap());
        assert_eq!(word, 6, "lane {i}");
    }
    assert_eq!(&dumped[512..], &[0u8; 96]);
}

#[test]
fn s3_mask_gating() {
    let mut program = blank_program();
    program[0].lr[0] = set_slot(13, 0x1000);
    program[0].xmem = XmemSlot {
        opcode: XmemOpcode::LdrMultReg,
        target: MultStageReg::R1,
        lr_a: 13,
        lr_b: 0,
        cr: 0,
    };
    program[1].lr[0] = set_slot(14, 0x2000);
    program[1].lr[1] = set_slot(15, 0);
    program[1].xmem = XmemSlot {
        opcode: XmemOpcode::LdrCyclicMultReg,
        target: MultStageReg::R0,
        lr_a: 14,
        lr_b: 15,
        cr: 0,
    };
    program[2].acc = AccSlot { opcode: AccOpcode::ResetAcc, lr_idx: 0 };
    program[3].mult = MultSlot {
        opcode: MultOpcode::MultEe,
        ra: MultStageReg::R1,
        lr_cyclic_base: 0,
        lr_mask_idx: 0,
        lr_shift: 0,
        lr_scalar_idx: 0,
    };
    program[4].acc = AccSlot { opcode: AccOpcode::Acc, lr_idx: 0 };
    program[5].lr[0] = set_slot(0, 0x3000);
    program[5].xmem = XmemSlot {
        opcode: XmemOpcode::StrAccReg,
        target: MultStageReg::R0,
        lr_a: 0,
        lr_b: 0,
        cr: 0,
    };
    program[6].cond = CondSlot { opcode: CondOpcode::Bkpt, lr1: 0, lr2: 0, label: 0 };

    let mut cpu = Cpu::new(program);
    cpu.xmem.load_bytes(0x1000, &[2u8; 128]).unwrap();
    cpu.xmem.load_bytes(0x2000, &[3u8; 512]).unwrap();
    cpu.regs.cr[CR_DTYPE_INDEX] = DType::Int8.to_cr15();
    // First 64 bits ones, rest zero.
    for byte in cpu.regs.mult.r_mask.iter_mut().take(8) {
        *byte = 0xFF;
    }
    for byte in cpu.regs.mult.r_mask.iter_mut().skip(8) {
        *byte = 0;
    }

    runner::run(&mut cpu, &RunConfig::default(), &mut NoopDebugHandler).unwrap();

    let dumped = cpu.xmem.dump_bytes(0x3000, 512).unwrap();
    for i in 0..64 {
        let word = i32::from_ne_bytes(dumped[i * 4..i * 4 + 4].try_into().unwrap());
        assert_eq!(word, 0, "masked lane {i}");
    }
    for i in 64..128 {
        let word = i32::from_ne_bytes(dumped[i * 4..i * 4 + 4].try_into().unwrap());
        assert_eq!(word, 6, "unmasked lane {i}");
    }
}

#[test]
fn s4_fp8_e4m3_round_trip() {
    for bits in 0u32..256 {
        let v = DType::Fp8E4M3.unpack_to_f32(bits);
        assert_eq!(DType::Fp8E4M3.pack_from_f32(v), bits, "bits={bits:#04x}");
    }
}

#[test]
fn s5_branch_fall_through() {
    let mut program = blank_program();
    program[0].lr[0] = set_slot(0, 10);
    program[0].lr[1] = set_slot(1, 20);
    program[0].cond = CondSlot { opcode: CondOpcode::Bne, lr1: 0, lr2: 1, label: 2 };
    program[1].lr[0] = set_slot(2, 0);
    program[1].cond = CondSlot { opcode: CondOpcode::Bkpt, lr1: 0, lr2: 0, label: 0 };
    program[2].lr[0] = set_slot(2, 1);
    program[2].cond = CondSlot { opcode: CondOpcode::Bkpt, lr1: 0, lr2: 0, label: 0 };

    let mut cpu = Cpu::new(program);
    runner::run(&mut cpu, &RunConfig::default(), &mut NoopDebugHandler).unwrap();

    assert_eq!(cpu.regs.lr[2], 1);
}

#[test]
fn s6_add_lr_across_cr() {
    let mut program = blank_program();
    program[0].lr[0] = set_slot(5, 7);
    program[1].lr[0] = LrSlot { opcode: LrOpcode::Add, target: 6, lcr_a: 5, lcr_b: 16 + 3, imm: 0 };
    program[2].cond = CondSlot { opcode: CondOpcode::Bkpt, lr1: 0, lr2: 0, label: 0 };

    let mut cpu = Cpu::new(program);
    cpu.regs.cr[3] = 100; // set cr[3] := 100, a harness-level preload (no CR-writing sub-op exists).
    runner::run(&mut cpu, &RunConfig::default(), &mut NoopDebugHandler).unwrap();

    assert_eq!(cpu.regs.lr[6], 107);
}
