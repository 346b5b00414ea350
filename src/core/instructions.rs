// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Instruction and directive metadata shared by every target table.

use std::cmp::Ordering;

use crate::core::tokenizer::Token;

/// Textual shape an operand token must have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandKind {
    Reg8,
    Reg16,
    Reg32,
    Byte,
    Word,
    Symbol,
}

/// How an operand ends up in the encoded instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    /// Appended after the opcode; words are little-endian.
    Immediate,
    /// ORed into the opcode byte after shifting left.
    Shift(u8),
    /// Fixed punctuation that must match exactly and emits nothing.
    Literal(char),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperandSpec {
    pub kind: OperandKind,
    pub encoding: Encoding,
}

impl OperandSpec {
    pub const fn new(kind: OperandKind, encoding: Encoding) -> Self {
        Self { kind, encoding }
    }
}

#[derive(Debug)]
pub struct InstructionEntry {
    pub mnemonic: &'static str,
    pub opcode: u8,
    pub operands: &'static [OperandSpec],
}

impl InstructionEntry {
    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }
}

/// A resolved operand handed to the code generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandValue {
    Register(u8),
    Byte(u8),
    Word(u16),
    Symbol,
}

fn cmp_mnemonic(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

/// Binary search for a mnemonic, ignoring case.
pub fn find_instruction<'a>(table: &'a [InstructionEntry], mnemonic: &str) -> Option<&'a InstructionEntry> {
    table
        .binary_search_by(|entry| cmp_mnemonic(entry.mnemonic, mnemonic))
        .ok()
        .map(|idx| &table[idx])
}

/// Check that a table is strictly ordered for [`find_instruction`].
pub fn is_sorted_by_mnemonic(table: &[InstructionEntry]) -> bool {
    table
        .windows(2)
        .all(|pair| cmp_mnemonic(pair[0].mnemonic, pair[1].mnemonic) == Ordering::Less)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectiveKind {
    Equ,
    Org,
    End,
    Label,
}

#[derive(Debug)]
pub struct DirectiveEntry {
    pub kind: DirectiveKind,
    pub command: &'static str,
    /// Position of the command token in the statement.
    pub token_index: usize,
    /// Exact token count the statement must have.
    pub token_count: usize,
}

impl DirectiveEntry {
    /// Name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self.kind {
            DirectiveKind::Label => "label",
            _ => self.command,
        }
    }
}

pub static DIRECTIVE_TABLE: &[DirectiveEntry] = &[
    DirectiveEntry {
        kind: DirectiveKind::Equ,
        command: "equ",
        token_index: 1,
        token_count: 3,
    },
    DirectiveEntry {
        kind: DirectiveKind::Org,
        command: "org",
        token_index: 0,
        token_count: 2,
    },
    DirectiveEntry {
        kind: DirectiveKind::End,
        command: "end",
        token_index: 0,
        token_count: 1,
    },
    DirectiveEntry {
        kind: DirectiveKind::Label,
        command: ":",
        token_index: 1,
        token_count: 2,
    },
];

/// Find the first directive whose command sits at its expected position.
pub fn match_directive(tokens: &[Token]) -> Option<&'static DirectiveEntry> {
    DIRECTIVE_TABLE.iter().find(|entry| {
        tokens
            .get(entry.token_index)
            .is_some_and(|token| token.text.eq_ignore_ascii_case(entry.command))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tokenizer::{Tokenizer, MAX_TOKENS};

    static TABLE: &[InstructionEntry] = &[
        InstructionEntry {
            mnemonic: "add",
            opcode: 0x80,
            operands: &[],
        },
        InstructionEntry {
            mnemonic: "mov",
            opcode: 0x40,
            operands: &[],
        },
        InstructionEntry {
            mnemonic: "nop",
            opcode: 0x00,
            operands: &[],
        },
    ];

    fn directive_for(line: &str) -> Option<DirectiveKind> {
        let mut tok = Tokenizer::new();
        let tokens = tok.tokenize_line(line, MAX_TOKENS).unwrap();
        match_directive(tokens).map(|entry| entry.kind)
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(find_instruction(TABLE, "MOV").map(|e| e.opcode), Some(0x40));
        assert_eq!(find_instruction(TABLE, "Nop").map(|e| e.opcode), Some(0x00));
        assert!(find_instruction(TABLE, "jmp").is_none());
    }

    #[test]
    fn sortedness_check_catches_disorder() {
        assert!(is_sorted_by_mnemonic(TABLE));
        static BAD: &[InstructionEntry] = &[
            InstructionEntry {
                mnemonic: "nop",
                opcode: 0,
                operands: &[],
            },
            InstructionEntry {
                mnemonic: "ADD",
                opcode: 0x80,
                operands: &[],
            },
        ];
        assert!(!is_sorted_by_mnemonic(BAD));
    }

    #[test]
    fn directives_match_by_position() {
        assert_eq!(directive_for("X EQU 5"), Some(DirectiveKind::Equ));
        assert_eq!(directive_for("org 100h"), Some(DirectiveKind::Org));
        assert_eq!(directive_for("END"), Some(DirectiveKind::End));
        assert_eq!(directive_for("START:"), Some(DirectiveKind::Label));
        assert_eq!(directive_for("MOV A,B"), None);
        assert_eq!(directive_for("EQU"), None);
    }

    #[test]
    fn label_directive_reports_as_label() {
        let label = DIRECTIVE_TABLE
            .iter()
            .find(|entry| entry.kind == DirectiveKind::Label)
            .map(|entry| entry.name());
        assert_eq!(label, Some("label"));
    }
}
