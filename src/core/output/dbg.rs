// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Debug map output.
//!
//! Layout, all little-endian: a `u32` total byte count, then one
//! `(u16 address, u32 line)` record per instruction. The header is written
//! as zero and patched at the end.

use std::io::{self, Seek, SeekFrom, Write};

use super::{EmitContext, EmitState, Emitter};

pub struct DbgEmitter<W: Write + Seek> {
    out: W,
}

impl<W: Write + Seek> DbgEmitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Seek> Emitter for DbgEmitter<W> {
    fn emit(&mut self, state: EmitState, ctx: &EmitContext<'_>) -> io::Result<()> {
        match state {
            EmitState::BeginAssembly => self.out.write_all(&0u32.to_le_bytes())?,
            EmitState::Code => {
                self.out.write_all(&ctx.address.to_le_bytes())?;
                self.out.write_all(&ctx.line_num.to_le_bytes())?;
            }
            EmitState::EndAssembly => {
                self.out.seek(SeekFrom::Start(0))?;
                self.out.write_all(&ctx.total_size.to_le_bytes())?;
                self.out.seek(SeekFrom::End(0))?;
                self.out.flush()?;
            }
            EmitState::SetOrg => {}
        }
        Ok(())
    }
}
