// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! 8085 instruction table.

use crate::core::instructions::{Encoding, InstructionEntry, OperandKind, OperandSpec};

use Encoding::{Immediate, Literal, Shift};
use OperandKind::{Byte, Reg16, Reg8, Symbol, Word};

const NONE: &[OperandSpec] = &[];
const REG8: &[OperandSpec] = &[OperandSpec::new(Reg8, Shift(0))];
const REG8_DST: &[OperandSpec] = &[OperandSpec::new(Reg8, Shift(3))];
const PAIR: &[OperandSpec] = &[OperandSpec::new(Reg16, Shift(4))];
const IMM8: &[OperandSpec] = &[OperandSpec::new(Byte, Immediate)];
const VECTOR: &[OperandSpec] = &[OperandSpec::new(Byte, Shift(3))];
const IMM16: &[OperandSpec] = &[OperandSpec::new(Word, Immediate)];
const MOV_OPS: &[OperandSpec] = &[
    OperandSpec::new(Reg8, Shift(3)),
    OperandSpec::new(Symbol, Literal(',')),
    OperandSpec::new(Reg8, Shift(0)),
];
const MVI_OPS: &[OperandSpec] = &[
    OperandSpec::new(Reg8, Shift(3)),
    OperandSpec::new(Symbol, Literal(',')),
    OperandSpec::new(Byte, Immediate),
];
const LXI_OPS: &[OperandSpec] = &[
    OperandSpec::new(Reg16, Shift(4)),
    OperandSpec::new(Symbol, Literal(',')),
    OperandSpec::new(Word, Immediate),
];

macro_rules! op {
    ($mnemonic:literal, $opcode:literal, $operands:expr) => {
        InstructionEntry {
            mnemonic: $mnemonic,
            opcode: $opcode,
            operands: $operands,
        }
    };
}

/// Sorted by mnemonic for binary search.
pub static INSTRUCTION_TABLE: &[InstructionEntry] = &[
    op!("aci", 0xCE, IMM8),
    op!("adc", 0x88, REG8),
    op!("add", 0x80, REG8),
    op!("adi", 0xC6, IMM8),
    op!("ana", 0xA0, REG8),
    op!("ani", 0xE6, IMM8),
    op!("call", 0xCD, IMM16),
    op!("cc", 0xDC, IMM16),
    op!("cm", 0xFC, IMM16),
    op!("cma", 0x2F, NONE),
    op!("cmc", 0x3F, NONE),
    op!("cmp", 0xB8, REG8),
    op!("cnc", 0xD4, IMM16),
    op!("cnz", 0xC4, IMM16),
    op!("cp", 0xF4, IMM16),
    op!("cpe", 0xEC, IMM16),
    op!("cpi", 0xFE, IMM8),
    op!("cpo", 0xE4, IMM16),
    op!("cz", 0xCC, IMM16),
    op!("daa", 0x27, NONE),
    op!("dad", 0x09, PAIR),
    op!("dcr", 0x05, REG8_DST),
    op!("dcx", 0x0B, PAIR),
    op!("di", 0xF3, NONE),
    op!("ei", 0xFB, NONE),
    op!("hlt", 0x76, NONE),
    op!("in", 0xDB, IMM8),
    op!("inr", 0x04, REG8_DST),
    op!("inx", 0x03, PAIR),
    op!("jc", 0xDA, IMM16),
    op!("jm", 0xFA, IMM16),
    op!("jmp", 0xC3, IMM16),
    op!("jnc", 0xD2, IMM16),
    op!("jnz", 0xC2, IMM16),
    op!("jp", 0xF2, IMM16),
    op!("jpe", 0xEA, IMM16),
    op!("jpo", 0xE2, IMM16),
    op!("jz", 0xCA, IMM16),
    op!("lda", 0x3A, IMM16),
    op!("ldax", 0x0A, PAIR),
    op!("lhld", 0x2A, IMM16),
    op!("lxi", 0x01, LXI_OPS),
    op!("mov", 0x40, MOV_OPS),
    op!("mvi", 0x06, MVI_OPS),
    op!("nop", 0x00, NONE),
    op!("ora", 0xB0, REG8),
    op!("ori", 0xF6, IMM8),
    op!("out", 0xD3, IMM8),
    op!("pchl", 0xE9, NONE),
    op!("pop", 0xC1, PAIR),
    op!("push", 0xC5, PAIR),
    op!("ral", 0x17, NONE),
    op!("rar", 0x1F, NONE),
    op!("rc", 0xD8, NONE),
    op!("ret", 0xC9, NONE),
    op!("rim", 0x20, NONE),
    op!("rlc", 0x07, NONE),
    op!("rm", 0xF8, NONE),
    op!("rnc", 0xD0, NONE),
    op!("rnz", 0xC0, NONE),
    op!("rp", 0xF0, NONE),
    op!("rpe", 0xE8, NONE),
    op!("rpo", 0xE0, NONE),
    op!("rrc", 0x0F, NONE),
    op!("rst", 0xC7, VECTOR),
    op!("rz", 0xC8, NONE),
    op!("sbb", 0x98, REG8),
    op!("sbi", 0xDE, IMM8),
    op!("shld", 0x22, IMM16),
    op!("sim", 0x30, NONE),
    op!("sphl", 0xF9, NONE),
    op!("sta", 0x32, IMM16),
    op!("stax", 0x02, PAIR),
    op!("stc", 0x37, NONE),
    op!("sub", 0x90, REG8),
    op!("sui", 0xD6, IMM8),
    op!("xchg", 0xEB, NONE),
    op!("xra", 0xA8, REG8),
    op!("xri", 0xEE, IMM8),
    op!("xthl", 0xE3, NONE),
];
