// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Target architecture abstraction.
//!
//! The engine is table driven. Everything it needs to know about a
//! processor (register names, the instruction table, encoded sizes, code
//! generation and legality rules) comes through [`TargetArchitecture`].

use crate::core::instructions::{InstructionEntry, OperandValue};
use crate::core::symbol_table::SymbolTable;
use crate::core::tokenizer::Token;

/// Identifier for a CPU type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CpuType(&'static str);

impl CpuType {
    /// Create a new CPU type identifier.
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    /// Return the identifier string.
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Capability set of one target processor.
pub trait TargetArchitecture {
    fn cpu_type(&self) -> CpuType;

    /// Register code for an 8-bit register name.
    fn encode_register8(&self, token: &str) -> Option<u8>;

    /// Register code for a 16-bit register pair name.
    fn encode_register16(&self, token: &str) -> Option<u8>;

    /// Register code for a 32-bit register name. 8-bit targets have none.
    fn encode_register32(&self, _token: &str) -> Option<u8> {
        None
    }

    fn is_register8(&self, token: &str) -> bool {
        self.encode_register8(token).is_some()
    }

    fn is_register16(&self, token: &str) -> bool {
        self.encode_register16(token).is_some()
    }

    fn is_register32(&self, token: &str) -> bool {
        self.encode_register32(token).is_some()
    }

    /// True for any register name; such names cannot be redefined.
    fn is_register(&self, token: &str) -> bool {
        self.is_register8(token) || self.is_register16(token) || self.is_register32(token)
    }

    /// Instruction table sorted by mnemonic, ignoring case.
    fn instructions(&self) -> &'static [InstructionEntry];

    /// Encoded size of an instruction, opcode and immediates included.
    fn compute_operand_size(&self, instr: &InstructionEntry) -> usize;

    /// Encode `instr` with resolved operand values into `buffer`.
    fn generate_code(&self, instr: &InstructionEntry, values: &[OperandValue], buffer: &mut Vec<u8>);

    /// Veto operand combinations the table alone cannot rule out.
    ///
    /// `tokens` is the whole statement, mnemonic first.
    fn filter(&self, instr: &InstructionEntry, tokens: &[Token], symbols: &SymbolTable) -> bool;
}
