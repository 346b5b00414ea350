// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Output channels fed by the second pass.
//!
//! Every channel sees the same event stream: one `BeginAssembly`, a
//! `SetOrg` per origin change, a `Code` per encoded instruction and a final
//! `EndAssembly` when the run had no errors.

pub mod bin;
pub mod dbg;
pub mod hex;

use std::io::{self, Seek, Write};

pub use bin::BinEmitter;
pub use dbg::DbgEmitter;
pub use hex::HexEmitter;

/// Event delivered to an emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitState {
    BeginAssembly,
    EndAssembly,
    SetOrg,
    Code,
}

/// Data accompanying an event.
#[derive(Debug, Clone, Copy)]
pub struct EmitContext<'a> {
    /// Current program counter, the instruction start for `Code`.
    pub address: u16,
    pub line_num: u32,
    pub bytes: &'a [u8],
    /// Bytes emitted so far in this run.
    pub total_size: u32,
}

impl<'a> EmitContext<'a> {
    pub fn new(address: u16, line_num: u32, bytes: &'a [u8], total_size: u32) -> Self {
        Self {
            address,
            line_num,
            bytes,
            total_size,
        }
    }
}

/// A sink for assembled code.
pub trait Emitter {
    fn emit(&mut self, state: EmitState, ctx: &EmitContext<'_>) -> io::Result<()>;
}

impl<E: Emitter + ?Sized> Emitter for Box<E> {
    fn emit(&mut self, state: EmitState, ctx: &EmitContext<'_>) -> io::Result<()> {
        (**self).emit(state, ctx)
    }
}

/// Output file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Hex,
    Bin,
    Dbg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Hex => "hex",
            OutputFormat::Bin => "bin",
            OutputFormat::Dbg => "dbg",
        }
    }
}

/// Build the emitter for `format` writing to `out`.
pub fn emitter_for<'a, W>(format: OutputFormat, out: W) -> Box<dyn Emitter + 'a>
where
    W: Write + Seek + 'a,
{
    match format {
        OutputFormat::Hex => Box::new(HexEmitter::new(out)),
        OutputFormat::Bin => Box::new(BinEmitter::new(out)),
        OutputFormat::Dbg => Box::new(DbgEmitter::new(out)),
    }
}
