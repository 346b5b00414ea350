// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! 8085 implementation of the target architecture interface.

use crate::core::cpu::{CpuType, TargetArchitecture};
use crate::core::instructions::{Encoding, InstructionEntry, OperandKind, OperandValue};
use crate::core::lexer::{convert, is_numeric};
use crate::core::symbol_table::SymbolTable;
use crate::core::tokenizer::Token;

use super::table::INSTRUCTION_TABLE;
use super::{register16_code, register8_code, CPU_ID};

/// Highest restart vector accepted by `RST`.
const MAX_RST_VECTOR: u32 = 7;

#[derive(Debug, Default, Clone, Copy)]
pub struct I8085Architecture;

impl I8085Architecture {
    pub fn new() -> Self {
        Self
    }
}

fn token_is(tokens: &[Token], index: usize, text: &str) -> bool {
    tokens
        .get(index)
        .is_some_and(|token| token.text.eq_ignore_ascii_case(text))
}

fn rst_vector(token: Option<&Token>, symbols: &SymbolTable) -> Option<u32> {
    let text = token?.text.as_str();
    if is_numeric(text) {
        return Some(convert(text));
    }
    symbols.identifier(text).map(|id| u32::from(id.value))
}

impl TargetArchitecture for I8085Architecture {
    fn cpu_type(&self) -> CpuType {
        CPU_ID
    }

    fn encode_register8(&self, token: &str) -> Option<u8> {
        register8_code(token)
    }

    fn encode_register16(&self, token: &str) -> Option<u8> {
        register16_code(token)
    }

    fn instructions(&self) -> &'static [InstructionEntry] {
        INSTRUCTION_TABLE
    }

    fn compute_operand_size(&self, instr: &InstructionEntry) -> usize {
        1 + instr
            .operands
            .iter()
            .map(|spec| match (spec.kind, spec.encoding) {
                (OperandKind::Byte, Encoding::Immediate) => 1,
                (OperandKind::Word, _) => 2,
                _ => 0,
            })
            .sum::<usize>()
    }

    fn generate_code(&self, instr: &InstructionEntry, values: &[OperandValue], buffer: &mut Vec<u8>) {
        buffer.clear();
        buffer.push(instr.opcode);
        for (spec, value) in instr.operands.iter().zip(values) {
            match (spec.encoding, *value) {
                (Encoding::Shift(shift), OperandValue::Register(code))
                | (Encoding::Shift(shift), OperandValue::Byte(code)) => {
                    buffer[0] |= code << shift;
                }
                (Encoding::Immediate, OperandValue::Byte(byte)) => buffer.push(byte),
                (Encoding::Immediate, OperandValue::Word(word)) => {
                    buffer.extend_from_slice(&word.to_le_bytes())
                }
                _ => {}
            }
        }
    }

    fn filter(&self, instr: &InstructionEntry, tokens: &[Token], symbols: &SymbolTable) -> bool {
        let invalid = match instr.mnemonic {
            "mov" => token_is(tokens, 1, "m") && token_is(tokens, 3, "m"),
            "push" | "pop" => token_is(tokens, 1, "sp"),
            "ldax" | "stax" => ["h", "psw", "sp"]
                .iter()
                .any(|name| token_is(tokens, 1, name)),
            "dad" | "inx" | "dcx" | "lxi" => token_is(tokens, 1, "psw"),
            "rst" => rst_vector(tokens.get(1), symbols).is_some_and(|v| v > MAX_RST_VECTOR),
            _ => false,
        };
        !invalid
    }
}
