// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Intel 8085 CPU support module.
//!
//! This module provides 8085-specific functionality:
//! - Register definitions
//! - The instruction table
//! - The architecture handler with its legality filter

pub mod handler;
pub mod table;

use crate::core::cpu::CpuType;

pub use handler::I8085Architecture;
pub use table::INSTRUCTION_TABLE;

pub const CPU_ID: CpuType = CpuType::new("8085");

/// Code of an 8-bit register: A B C D E H L M.
pub fn register8_code(ident: &str) -> Option<u8> {
    if ident.len() != 1 {
        return None;
    }
    match ident.as_bytes()[0].to_ascii_lowercase() {
        b'a' => Some(7),
        b'b' => Some(0),
        b'c' => Some(1),
        b'd' => Some(2),
        b'e' => Some(3),
        b'h' => Some(4),
        b'l' => Some(5),
        b'm' => Some(6),
        _ => None,
    }
}

/// Code of a register pair: B D H SP PSW.
pub fn register16_code(ident: &str) -> Option<u8> {
    match ident.to_ascii_lowercase().as_str() {
        "b" => Some(0),
        "d" => Some(1),
        "h" => Some(2),
        "sp" | "psw" => Some(3),
        _ => None,
    }
}

/// Check if an identifier is an 8085 register name.
///
/// Valid registers: A, B, C, D, E, H, L, M, SP, PSW
pub fn is_register(ident: &str) -> bool {
    register8_code(ident).is_some() || register16_code(ident).is_some()
}
