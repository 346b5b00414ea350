// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! CPU-agnostic assembler core.
//!
//! Everything here is shared by every target; a processor plugs in through
//! [`cpu::TargetArchitecture`].
//!
//! # Components
//!
//! - [`lexer`] - Character classes and numeric literal rules
//! - [`tokenizer`] - Line tokenizer
//! - [`symbol_table`] - Constants and labels
//! - [`instructions`] - Instruction and directive descriptors
//! - [`cpu`] - Target architecture trait
//! - [`output`] - Intel Hex, binary and debug map emitters
//! - [`assembler`] - Error codes and diagnostics

pub mod assembler;
pub mod cpu;
pub mod instructions;
pub mod lexer;
pub mod output;
pub mod symbol_table;
pub mod tokenizer;

// Re-exports for convenience
pub use cpu::{CpuType, TargetArchitecture};
pub use instructions::{InstructionEntry, OperandKind, OperandValue};
pub use output::{Emitter, OutputFormat};
pub use symbol_table::{IdKind, SymbolError, SymbolTable};
pub use tokenizer::{Token, TokenKind, TokenizeError, Tokenizer};
