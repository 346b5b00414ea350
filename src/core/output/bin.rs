// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Raw binary output.

use std::io::{self, Write};

use super::{EmitContext, EmitState, Emitter};

/// Writes instruction bytes verbatim in program order.
pub struct BinEmitter<W: Write> {
    out: W,
    written: u32,
}

impl<W: Write> BinEmitter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn bytes_written(&self) -> u32 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Emitter for BinEmitter<W> {
    fn emit(&mut self, state: EmitState, ctx: &EmitContext<'_>) -> io::Result<()> {
        match state {
            EmitState::Code => {
                self.out.write_all(ctx.bytes)?;
                self.written += ctx.bytes.len() as u32;
            }
            EmitState::EndAssembly => self.out.flush()?,
            EmitState::BeginAssembly | EmitState::SetOrg => {}
        }
        Ok(())
    }
}
