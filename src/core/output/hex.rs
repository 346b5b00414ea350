// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Streaming Intel HEX output.
//!
//! Records are written as the bytes arrive. The header of the open record
//! carries a placeholder length that is patched in place once the record is
//! closed, so the writer must be seekable.

use std::io::{self, Seek, SeekFrom, Write};

use super::{EmitContext, EmitState, Emitter};
use crate::core::lexer::{hex16, hex8};

/// Maximum data bytes per record.
pub const MAX_HEX_RECORD_LEN: u8 = 16;

const DATA_RECORD: u8 = 0x00;
const EOF_RECORD: &str = ":00000001FF\r\n";

/// Record checksum: two's complement of the XOR of every header and data
/// byte.
pub fn record_checksum(length: u8, address: u16, record_type: u8, data_xor: u8) -> u8 {
    let [hi, lo] = address.to_be_bytes();
    (data_xor ^ length ^ hi ^ lo ^ record_type).wrapping_neg()
}

#[derive(Debug, Clone, Copy)]
struct OpenRecord {
    start: u16,
    header_pos: u64,
    length: u8,
    data_xor: u8,
}

pub struct HexEmitter<W: Write + Seek> {
    out: W,
    record: Option<OpenRecord>,
    next_addr: u16,
}

impl<W: Write + Seek> HexEmitter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            record: None,
            next_addr: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn open_record(&mut self) -> io::Result<OpenRecord> {
        let header_pos = self.out.stream_position()?;
        write!(self.out, ":00{}{}", hex16(self.next_addr), hex8(DATA_RECORD))?;
        Ok(OpenRecord {
            start: self.next_addr,
            header_pos,
            length: 0,
            data_xor: 0,
        })
    }

    fn close_record(&mut self) -> io::Result<()> {
        let Some(record) = self.record.take() else {
            return Ok(());
        };
        let end = self.out.stream_position()?;
        self.out.seek(SeekFrom::Start(record.header_pos + 1))?;
        write!(self.out, "{}", hex8(record.length))?;
        self.out.seek(SeekFrom::Start(end))?;
        let checksum = record_checksum(record.length, record.start, DATA_RECORD, record.data_xor);
        write!(self.out, "{}\r\n", hex8(checksum))
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        let mut record = match self.record {
            Some(record) => record,
            None => self.open_record()?,
        };
        write!(self.out, "{}", hex8(byte))?;
        record.data_xor ^= byte;
        record.length += 1;
        self.record = Some(record);
        self.next_addr = self.next_addr.wrapping_add(1);
        if record.length >= MAX_HEX_RECORD_LEN {
            self.close_record()?;
        }
        Ok(())
    }
}

impl<W: Write + Seek> Emitter for HexEmitter<W> {
    fn emit(&mut self, state: EmitState, ctx: &EmitContext<'_>) -> io::Result<()> {
        match state {
            EmitState::BeginAssembly | EmitState::SetOrg => {
                self.close_record()?;
                self.next_addr = ctx.address;
            }
            EmitState::Code => {
                if ctx.address != self.next_addr {
                    self.close_record()?;
                    self.next_addr = ctx.address;
                }
                for &byte in ctx.bytes {
                    self.write_byte(byte)?;
                }
            }
            EmitState::EndAssembly => {
                self.close_record()?;
                self.out.write_all(EOF_RECORD.as_bytes())?;
                self.out.flush()?;
            }
        }
        Ok(())
    }
}
