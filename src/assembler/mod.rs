// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Two-pass assembler engine.
//!
//! Pass 1 scans the source, builds the symbol table and sizes every
//! instruction. Pass 2 rewinds the input, encodes each instruction through
//! the target architecture and streams the bytes to every output channel.

pub mod cli;

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{debug, trace, warn};

use crate::core::assembler::error::{
    AsmError, AsmErrorKind, AsmRunError, AsmRunReport, Diagnostic, FatalError, LineStatus,
    PassCounts, Severity,
};
use crate::core::cpu::TargetArchitecture;
use crate::core::instructions::{
    find_instruction, is_sorted_by_mnemonic, match_directive, DirectiveEntry, DirectiveKind,
    Encoding, InstructionEntry, OperandKind, OperandSpec, OperandValue,
};
use crate::core::lexer::{convert, is_byte, is_identifier, is_wide_hex, is_word};
use crate::core::output::{emitter_for, EmitContext, EmitState, Emitter, OutputFormat};
use crate::core::symbol_table::{IdKind, SymbolError, SymbolTable};
use crate::core::tokenizer::{trim_line, Token, TokenKind, TokenizeError, Tokenizer, MAX_TOKENS};
use crate::i8085::I8085Architecture;

use cli::{validate_cli, Cli};

pub use cli::VERSION;

/// Input plus output channels.
pub const MAX_IO_CHANNELS: usize = 5;
pub const MAX_LINE_LEN: usize = 255;
/// Size of the 16-bit address space.
pub const ADDRESS_SPACE: u32 = 0x10000;

/// Run the assembler with command-line arguments.
pub fn run() -> Result<AsmRunReport, AsmRunError> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .init();
    run_with_cli(&cli)
}

/// Run the assembler for already parsed arguments.
pub fn run_with_cli(cli: &Cli) -> Result<AsmRunReport, AsmRunError> {
    let config = validate_cli(cli)?;

    let mut assembler = Assembler::new(Box::new(I8085Architecture::new()));
    let attach = |assembler: &mut Assembler| -> Result<(), FatalError> {
        assembler.attach_io(ChannelMode::Input, &config.input)?;
        for (format, path) in &config.outputs {
            assembler.attach_io(ChannelMode::Output(*format), path)?;
        }
        Ok(())
    };
    if let Err(err) = attach(&mut assembler) {
        return Err(AsmRunError::new(err.to_asm_error(), Vec::new(), Vec::new()));
    }

    let mut report = assembler.run()?;
    if config.symbols {
        let mut dump = Vec::new();
        if let Err(err) = assembler.symbols().dump(&mut dump) {
            let err = FatalError::from(err);
            return Err(AsmRunError::new(err.to_asm_error(), Vec::new(), Vec::new()));
        }
        for line in String::from_utf8_lossy(&dump).lines() {
            report.push_message(line.to_string());
        }
    }
    Ok(report)
}

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Pass1Scanning,
    Pass2Assembling,
    Done,
    FatalAborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Input,
    Output(OutputFormat),
}

/// Result of both passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblySummary {
    pub counts: PassCounts,
    pub size: u32,
}

impl AssemblySummary {
    pub fn is_ok(&self) -> bool {
        self.counts.errors == 0
    }
}

/// Core assembler state.
pub struct Assembler {
    arch: Box<dyn TargetArchitecture>,
    symbols: SymbolTable,
    tokenizer: Tokenizer,
    input: Option<PathBuf>,
    outputs: Vec<(OutputFormat, PathBuf)>,
    state: EngineState,
    pass: u8,
    line_num: u32,
    pc: u32,
    org: u16,
    total_size: u32,
    counts: PassCounts,
    buffer: Vec<u8>,
    values: Vec<OperandValue>,
    scan_error_lines: HashSet<u32>,
    diagnostics: Vec<Diagnostic>,
    messages: Vec<String>,
    source_lines: Vec<String>,
    source_name: Option<String>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new(Box::new(I8085Architecture::new()))
    }
}

impl Assembler {
    /// Create an engine for `arch`.
    ///
    /// # Panics
    ///
    /// Panics if the architecture's instruction table is not sorted.
    pub fn new(arch: Box<dyn TargetArchitecture>) -> Self {
        assert!(
            is_sorted_by_mnemonic(arch.instructions()),
            "instruction table for {} is not sorted by mnemonic",
            arch.cpu_type().as_str()
        );
        Self {
            arch,
            symbols: SymbolTable::new(),
            tokenizer: Tokenizer::new(),
            input: None,
            outputs: Vec::new(),
            state: EngineState::Idle,
            pass: 0,
            line_num: 0,
            pc: 0,
            org: 0,
            total_size: 0,
            counts: PassCounts::new(),
            buffer: Vec::with_capacity(3),
            values: Vec::with_capacity(MAX_TOKENS),
            scan_error_lines: HashSet::new(),
            diagnostics: Vec::new(),
            messages: Vec::new(),
            source_lines: Vec::new(),
            source_name: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn counts(&self) -> PassCounts {
        self.counts
    }

    pub fn org(&self) -> u16 {
        self.org
    }

    /// Register the source file or an output file.
    pub fn attach_io(&mut self, mode: ChannelMode, path: impl AsRef<Path>) -> Result<(), FatalError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let used = usize::from(self.input.is_some()) + self.outputs.len();
        if used >= MAX_IO_CHANNELS {
            return Err(FatalError::TooManyChannels);
        }
        match mode {
            ChannelMode::Input => {
                if display.is_empty() || self.input.is_some() {
                    return Err(FatalError::InvalidInputPath(display));
                }
                self.input = Some(path.to_path_buf());
            }
            ChannelMode::Output(format) => {
                let clashes = self.input.as_deref() == Some(path)
                    || self.outputs.iter().any(|(_, existing)| existing == path);
                if display.is_empty() || clashes {
                    return Err(FatalError::InvalidOutputPath(display));
                }
                self.outputs.push((format, path.to_path_buf()));
            }
        }
        Ok(())
    }

    /// Assemble the attached input into every attached output.
    ///
    /// Output files are removed again when the run has errors.
    pub fn run(&mut self) -> Result<AsmRunReport, AsmRunError> {
        let outcome = self.run_channels();
        let failed = outcome.is_err() || self.counts.errors > 0;

        if failed {
            self.remove_outputs();
        } else {
            for (_, path) in &self.outputs {
                self.messages.push(format!(
                    "written {} bytes to {}",
                    self.total_size,
                    path.display()
                ));
            }
        }
        self.messages.push(format!(
            "{} error(s) {} warning(s)",
            self.counts.errors, self.counts.warnings
        ));

        let messages = std::mem::take(&mut self.messages);
        let diagnostics = std::mem::take(&mut self.diagnostics);
        let source_lines = std::mem::take(&mut self.source_lines);
        match outcome {
            Err(err) => Err(
                AsmRunError::new(err.to_asm_error(), diagnostics, source_lines)
                    .with_messages(messages),
            ),
            Ok(_) if failed => {
                let kind = diagnostics
                    .iter()
                    .find(|diag| !diag.is_warning())
                    .map(|diag| diag.kind())
                    .unwrap_or(AsmErrorKind::InvalidInstruction);
                let err = AsmError::new(
                    kind,
                    "Errors detected in source. No output files created.",
                    None,
                );
                Err(AsmRunError::new(err, diagnostics, source_lines).with_messages(messages))
            }
            Ok(summary) => Ok(AsmRunReport::new(diagnostics, source_lines)
                .with_messages(messages)
                .with_bytes_written(summary.size)),
        }
    }

    fn run_channels(&mut self) -> Result<AssemblySummary, FatalError> {
        let Some(input_path) = self.input.clone() else {
            self.state = EngineState::FatalAborted;
            return Err(FatalError::InvalidInputPath(String::new()));
        };
        let input = match File::open(&input_path) {
            Ok(file) => file,
            Err(source) => {
                self.state = EngineState::FatalAborted;
                return Err(FatalError::FileOpen {
                    path: input_path.display().to_string(),
                    source,
                });
            }
        };

        let mut emitters = Vec::with_capacity(self.outputs.len());
        for (format, path) in &self.outputs {
            match File::create(path) {
                Ok(file) => emitters.push(emitter_for(*format, BufWriter::new(file))),
                Err(source) => {
                    self.state = EngineState::FatalAborted;
                    return Err(FatalError::FileOpen {
                        path: path.display().to_string(),
                        source,
                    });
                }
            }
        }

        let mut refs: Vec<&mut dyn Emitter> = emitters
            .iter_mut()
            .map(|emitter| &mut **emitter as &mut dyn Emitter)
            .collect();
        let name = input_path.display().to_string();
        self.assemble_named(&name, &mut BufReader::new(input), &mut refs)
    }

    fn remove_outputs(&self) {
        for (_, path) in &self.outputs {
            match fs::remove_file(path) {
                Ok(()) => debug!("removed {}", path.display()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => warn!("cannot remove {}: {err}", path.display()),
            }
        }
    }

    /// Run both passes over `input`, feeding `emitters` during pass 2.
    pub fn assemble<R: BufRead + Seek>(
        &mut self,
        input: &mut R,
        emitters: &mut [&mut dyn Emitter],
    ) -> Result<AssemblySummary, FatalError> {
        self.assemble_named("<input>", input, emitters)
    }

    fn assemble_named<R: BufRead + Seek>(
        &mut self,
        name: &str,
        input: &mut R,
        emitters: &mut [&mut dyn Emitter],
    ) -> Result<AssemblySummary, FatalError> {
        self.reset(name);
        match self.run_passes(input, emitters) {
            Ok(()) => {
                self.state = EngineState::Done;
                Ok(AssemblySummary {
                    counts: self.counts,
                    size: self.total_size,
                })
            }
            Err(err) => {
                self.state = EngineState::FatalAborted;
                self.counts.errors += 1;
                self.diagnostics.push(
                    Diagnostic::new(self.line_num, Severity::Error, err.to_asm_error())
                        .with_fatal(true)
                        .with_file(self.source_name.clone()),
                );
                Err(err)
            }
        }
    }

    fn reset(&mut self, name: &str) {
        self.symbols = SymbolTable::new();
        self.counts = PassCounts::new();
        self.total_size = 0;
        self.scan_error_lines.clear();
        self.diagnostics.clear();
        self.messages.clear();
        self.source_lines.clear();
        self.source_name = Some(name.to_string());
        self.state = EngineState::Idle;
    }

    fn begin_pass(&mut self, pass: u8) {
        self.pass = pass;
        self.line_num = 0;
        self.pc = 0;
        self.org = 0;
    }

    fn run_passes<R: BufRead + Seek>(
        &mut self,
        input: &mut R,
        emitters: &mut [&mut dyn Emitter],
    ) -> Result<(), FatalError> {
        let name = self.source_name.clone().unwrap_or_default();

        self.state = EngineState::Pass1Scanning;
        self.begin_pass(1);
        self.messages.push(format!("scanning {name}"));
        debug!("starting pass 1 on {name}");
        self.run_pass(input, &mut [])?;
        self.counts.lines = self.line_num;
        debug!(
            "pass 1 done: {} lines, {} symbols, {} bytes",
            self.line_num,
            self.symbols.len(),
            self.pc
        );

        self.state = EngineState::Pass2Assembling;
        input.seek(SeekFrom::Start(0))?;
        self.begin_pass(2);
        self.messages.push(format!("assembling {name}"));
        debug!("starting pass 2 on {name}");
        self.notify(emitters, EmitState::BeginAssembly, &[])?;
        self.run_pass(input, emitters)?;
        if self.counts.errors == 0 {
            self.notify(emitters, EmitState::EndAssembly, &[])?;
        }
        debug!("pass 2 done: {} bytes emitted", self.total_size);
        Ok(())
    }

    fn run_pass<R: BufRead>(
        &mut self,
        input: &mut R,
        emitters: &mut [&mut dyn Emitter],
    ) -> Result<(), FatalError> {
        let mut buf = Vec::with_capacity(MAX_LINE_LEN + 2);
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            self.line_num += 1;
            while matches!(buf.last(), Some(b'\n' | b'\r')) {
                buf.pop();
            }
            // Invalid UTF-8 decodes to U+FFFD; the length limit counts raw bytes.
            let raw = String::from_utf8_lossy(&buf);
            if self.pass == 1 {
                self.source_lines.push(raw.to_string());
            }
            if self.process_line(&raw, buf.len(), emitters)? == LineStatus::End {
                break;
            }
        }
        Ok(())
    }

    fn notify(
        &self,
        emitters: &mut [&mut dyn Emitter],
        state: EmitState,
        bytes: &[u8],
    ) -> Result<(), FatalError> {
        let ctx = EmitContext::new(self.pc as u16, self.line_num, bytes, self.total_size);
        for emitter in emitters.iter_mut() {
            emitter.emit(state, &ctx)?;
        }
        Ok(())
    }

    fn error(&mut self, kind: AsmErrorKind, msg: &str, param: Option<&str>) {
        self.counts.errors += 1;
        if self.pass == 1 {
            self.scan_error_lines.insert(self.line_num);
        }
        trace!("line {}: {msg}", self.line_num);
        self.diagnostics.push(
            Diagnostic::new(self.line_num, Severity::Error, AsmError::new(kind, msg, param))
                .with_file(self.source_name.clone()),
        );
    }

    /// Report a problem the first pass can see; pass 2 meets the same line
    /// again and stays quiet.
    fn scan_error(&mut self, kind: AsmErrorKind, msg: &str, param: Option<&str>) {
        if self.pass == 1 {
            self.error(kind, msg, param);
        }
    }

    fn scan_warning(&mut self, kind: AsmErrorKind, msg: &str, param: Option<&str>) {
        if self.pass != 1 {
            return;
        }
        self.counts.warnings += 1;
        self.diagnostics.push(
            Diagnostic::new(self.line_num, Severity::Warning, AsmError::new(kind, msg, param))
                .with_file(self.source_name.clone()),
        );
    }

    fn symbol_error(&mut self, err: SymbolError) {
        let kind = match err {
            SymbolError::Redefined(_) => AsmErrorKind::Redefined,
            SymbolError::TooManyIds | SymbolError::TooManyLabels => AsmErrorKind::TooManyIds,
            SymbolError::NameTooLong(_) => AsmErrorKind::InvalidId,
        };
        self.scan_error(kind, &err.to_string(), None);
    }

    fn process_line(
        &mut self,
        raw: &str,
        raw_len: usize,
        emitters: &mut [&mut dyn Emitter],
    ) -> Result<LineStatus, FatalError> {
        if raw_len > MAX_LINE_LEN {
            self.scan_error(AsmErrorKind::LineTooLong, "line too long", None);
            return Ok(LineStatus::Error);
        }
        let text = trim_line(raw);
        if text.is_empty() {
            return Ok(LineStatus::NothingDone);
        }

        let mut tokenizer = std::mem::take(&mut self.tokenizer);
        let status = self.process_text(&mut tokenizer, text, emitters);
        self.tokenizer = tokenizer;
        status
    }

    fn process_text(
        &mut self,
        tokenizer: &mut Tokenizer,
        text: &str,
        emitters: &mut [&mut dyn Emitter],
    ) -> Result<LineStatus, FatalError> {
        // Room for a `name :` prefix in front of a full statement.
        let tokens = match tokenizer.tokenize_line(text, MAX_TOKENS + 2) {
            Ok(tokens) => tokens,
            Err(TokenizeError::TooManyTokens) => {
                self.scan_error(AsmErrorKind::TooManyTokens, "too many tokens", None);
                return Ok(LineStatus::Error);
            }
            Err(TokenizeError::UnterminatedString) => {
                self.scan_error(AsmErrorKind::UnterminatedString, "unterminated string", None);
                return Ok(LineStatus::Error);
            }
        };

        let statement = if tokens.len() > 2 && tokens[1].is_symbol(':') {
            if self.pass == 1 {
                self.define_label(&tokens[0]);
            }
            &tokens[2..]
        } else {
            tokens
        };
        if statement.len() > MAX_TOKENS {
            self.scan_error(AsmErrorKind::TooManyTokens, "too many tokens", None);
            return Ok(LineStatus::Error);
        }

        if let Some(directive) = match_directive(statement) {
            return self.process_directive(directive, statement, emitters);
        }
        self.process_instruction(text, statement, emitters)
    }

    fn process_directive(
        &mut self,
        directive: &DirectiveEntry,
        statement: &[Token],
        emitters: &mut [&mut dyn Emitter],
    ) -> Result<LineStatus, FatalError> {
        if statement.len() != directive.token_count {
            self.scan_error(
                AsmErrorKind::InvalidOperands,
                "invalid number of operands",
                Some(directive.name()),
            );
            return Ok(LineStatus::Error);
        }
        trace!("line {}: directive {}", self.line_num, directive.name());

        match directive.kind {
            DirectiveKind::End => Ok(LineStatus::End),
            DirectiveKind::Org => self.set_org(statement, emitters),
            DirectiveKind::Equ => {
                if self.pass == 1 {
                    return Ok(self.define_equ(&statement[0], &statement[2]));
                }
                Ok(LineStatus::Ok)
            }
            DirectiveKind::Label => {
                if self.pass == 1 {
                    return Ok(self.define_label(&statement[0]));
                }
                Ok(LineStatus::Ok)
            }
        }
    }

    fn define_label(&mut self, token: &Token) -> LineStatus {
        let name = token.text.as_str();
        if token.kind != TokenKind::Word || !is_identifier(name) {
            self.scan_error(AsmErrorKind::InvalidId, "invalid label-identifier", Some(name));
            return LineStatus::Error;
        }
        if self.arch.is_register(name) {
            self.scan_error(
                AsmErrorKind::ReservedName,
                "use of register name as label-identifier",
                Some(name),
            );
            return LineStatus::Error;
        }
        match self.symbols.define_label(name, self.pc as u16) {
            Ok(()) => {
                debug!("label {name} = {:04X}", self.pc);
                LineStatus::Ok
            }
            Err(err) => {
                self.symbol_error(err);
                LineStatus::Error
            }
        }
    }

    fn define_equ(&mut self, name_token: &Token, value_token: &Token) -> LineStatus {
        let name = name_token.text.as_str();
        if name_token.kind != TokenKind::Word || !is_identifier(name) {
            self.scan_error(AsmErrorKind::InvalidId, "invalid identifier", Some(name));
            return LineStatus::Error;
        }
        if self.arch.is_register(name) {
            self.scan_error(
                AsmErrorKind::ReservedName,
                "use of register name as identifier",
                Some(name),
            );
            return LineStatus::Error;
        }

        let value = value_token.text.as_str();
        let literal = value_token.kind == TokenKind::Word;
        let (number, kind) = if !literal {
            self.scan_error(AsmErrorKind::ConstExpected, "constant expected", Some(name));
            return LineStatus::Error;
        } else if is_byte(value) {
            if is_wide_hex(value) {
                self.scan_warning(AsmErrorKind::DataTruncation, "data truncation", Some(name));
            }
            (convert(value) as u16, IdKind::Byte)
        } else if is_word(value) {
            (convert(value) as u16, IdKind::Word)
        } else if is_identifier(value) {
            match self.symbols.identifier(value) {
                Some(id) => (id.value, id.kind),
                None => {
                    self.scan_error(
                        AsmErrorKind::UndefinedId,
                        "undefined label or identifier",
                        Some(value),
                    );
                    return LineStatus::Error;
                }
            }
        } else {
            self.scan_error(AsmErrorKind::ConstExpected, "constant expected", Some(name));
            return LineStatus::Error;
        };

        match self.symbols.define_identifier(name, number, kind) {
            Ok(()) => {
                debug!("equ {name} = {number:04X} ({kind:?})");
                LineStatus::Ok
            }
            Err(err) => {
                self.symbol_error(err);
                LineStatus::Error
            }
        }
    }

    fn set_org(
        &mut self,
        statement: &[Token],
        emitters: &mut [&mut dyn Emitter],
    ) -> Result<LineStatus, FatalError> {
        let operand = statement[1].text.as_str();
        let literal = statement[1].kind == TokenKind::Word;
        let value = if literal && is_word(operand) {
            convert(operand) as u16
        } else if literal && is_identifier(operand) {
            match self.symbols.identifier(operand) {
                Some(id) => id.value,
                None => {
                    self.scan_error(AsmErrorKind::ConstExpected, "constant expected", Some("org"));
                    return Ok(LineStatus::Error);
                }
            }
        } else {
            let directive = statement[0].text.as_str();
            self.scan_error(AsmErrorKind::ConstExpected, "constant expected", Some(directive));
            return Ok(LineStatus::Error);
        };

        self.org = value;
        self.pc = u32::from(value);
        debug!("org {value:04X}");
        if self.pass == 2 {
            self.notify(emitters, EmitState::SetOrg, &[])?;
        }
        Ok(LineStatus::Ok)
    }

    fn operand_matches(&self, spec: &OperandSpec, token: &Token) -> bool {
        let text = token.text.as_str();
        if spec.kind == OperandKind::Symbol {
            return match spec.encoding {
                Encoding::Literal(c) => token.is_symbol(c),
                _ => token.kind == TokenKind::Symbol,
            };
        }
        if token.kind != TokenKind::Word {
            return false;
        }
        match spec.kind {
            OperandKind::Reg8 => self.arch.is_register8(text),
            OperandKind::Reg16 => self.arch.is_register16(text),
            OperandKind::Reg32 => self.arch.is_register32(text),
            OperandKind::Byte => is_byte(text) || is_identifier(text),
            OperandKind::Word => is_word(text) || is_identifier(text),
            OperandKind::Symbol => false,
        }
    }

    /// Index of the first operand whose shape does not fit the table entry.
    fn first_mismatch(&self, instr: &InstructionEntry, operands: &[Token]) -> Option<usize> {
        instr
            .operands
            .iter()
            .zip(operands)
            .position(|(spec, token)| !self.operand_matches(spec, token))
    }

    fn process_instruction(
        &mut self,
        text: &str,
        statement: &[Token],
        emitters: &mut [&mut dyn Emitter],
    ) -> Result<LineStatus, FatalError> {
        let mnemonic = statement[0].text.as_str();
        let Some(instr) = find_instruction(self.arch.instructions(), mnemonic) else {
            self.scan_error(AsmErrorKind::InvalidInstruction, "invalid instruction", Some(mnemonic));
            return Ok(LineStatus::Error);
        };

        let operands = &statement[1..];
        if instr.operand_count() != operands.len() {
            self.scan_error(
                AsmErrorKind::InvalidOperands,
                "invalid number of operands",
                Some(mnemonic),
            );
            return Ok(LineStatus::Error);
        }
        if let Some(idx) = self.first_mismatch(instr, operands) {
            match instr.operands[idx].encoding {
                Encoding::Literal(c) => {
                    let expected = c.to_string();
                    self.scan_error(AsmErrorKind::SymbolExpected, "symbol expected", Some(&expected));
                }
                _ => self.scan_error(
                    AsmErrorKind::TypeMismatch,
                    "operand type mismatch",
                    Some(mnemonic),
                ),
            }
            return Ok(LineStatus::Error);
        }

        if self.pass == 1 {
            self.scan_instruction(instr, text, statement)
        } else {
            self.assemble_instruction(instr, text, statement, emitters)
        }
    }

    fn scan_instruction(
        &mut self,
        instr: &InstructionEntry,
        text: &str,
        statement: &[Token],
    ) -> Result<LineStatus, FatalError> {
        if !self.arch.filter(instr, statement, &self.symbols) {
            self.scan_error(
                AsmErrorKind::InvalidInstruction,
                "instruction not allowed; may be invalid operand(s)",
                Some(text),
            );
            return Ok(LineStatus::Error);
        }
        let size = self.arch.compute_operand_size(instr) as u32;
        self.advance(size)?;
        Ok(LineStatus::Ok)
    }

    fn advance(&mut self, size: u32) -> Result<(), FatalError> {
        if self.pc + size > ADDRESS_SPACE {
            return Err(FatalError::OffsetOutOfRange);
        }
        self.pc += size;
        Ok(())
    }

    fn assemble_instruction(
        &mut self,
        instr: &InstructionEntry,
        text: &str,
        statement: &[Token],
        emitters: &mut [&mut dyn Emitter],
    ) -> Result<LineStatus, FatalError> {
        self.values.clear();
        for (spec, token) in instr.operands.iter().zip(&statement[1..]) {
            match self.resolve_operand(spec, token) {
                Some(value) => self.values.push(value),
                None => return Ok(LineStatus::Error),
            }
        }

        self.arch.generate_code(instr, &self.values, &mut self.buffer);
        if !self.arch.filter(instr, statement, &self.symbols) {
            // Rejections pass 1 could not see, e.g. a forward RST vector.
            if !self.scan_error_lines.contains(&self.line_num) {
                self.error(
                    AsmErrorKind::InvalidInstruction,
                    "instruction not allowed; may be invalid operand(s)",
                    Some(text),
                );
            }
            return Ok(LineStatus::Error);
        }

        let size = self.buffer.len() as u32;
        if self.pc + size > ADDRESS_SPACE {
            return Err(FatalError::OffsetOutOfRange);
        }
        self.total_size += size;
        trace!(
            "{:04X}: {:02X?} line {}",
            self.pc,
            self.buffer,
            self.line_num
        );
        self.notify(emitters, EmitState::Code, &self.buffer)?;
        self.pc += size;
        Ok(LineStatus::Ok)
    }

    fn resolve_operand(&mut self, spec: &OperandSpec, token: &Token) -> Option<OperandValue> {
        let text = token.text.as_str();
        match spec.kind {
            OperandKind::Reg8 => {
                let code = self.arch.encode_register8(text);
                self.register(code, AsmErrorKind::Register8Expected, "8 bit register name expected")
            }
            OperandKind::Reg16 => {
                let code = self.arch.encode_register16(text);
                self.register(code, AsmErrorKind::Register16Expected, "16 bit register name expected")
            }
            OperandKind::Reg32 => {
                let code = self.arch.encode_register32(text);
                self.register(code, AsmErrorKind::Register32Expected, "32 bit register name expected")
            }
            OperandKind::Symbol => Some(OperandValue::Symbol),
            OperandKind::Byte => self.resolve_byte(text),
            OperandKind::Word => self.resolve_word(text),
        }
    }

    fn register(&mut self, code: Option<u8>, kind: AsmErrorKind, msg: &str) -> Option<OperandValue> {
        match code {
            Some(code) => Some(OperandValue::Register(code)),
            None => {
                self.error(kind, msg, None);
                None
            }
        }
    }

    fn resolve_byte(&mut self, text: &str) -> Option<OperandValue> {
        if is_byte(text) {
            return Some(OperandValue::Byte(convert(text) as u8));
        }
        if !is_identifier(text) {
            self.error(AsmErrorKind::ByteExpected, "byte expected", None);
            return None;
        }
        match self.symbols.identifier(text).map(|id| (id.value, id.kind)) {
            Some((value, IdKind::Byte)) => Some(OperandValue::Byte(value as u8)),
            Some((_, IdKind::Word)) => {
                self.error(AsmErrorKind::InvalidConversion, "cannot convert dbl to byte", Some(text));
                None
            }
            None => {
                self.error(AsmErrorKind::UndefinedId, "undefined identifier", Some(text));
                None
            }
        }
    }

    fn resolve_word(&mut self, text: &str) -> Option<OperandValue> {
        if is_word(text) {
            return Some(OperandValue::Word(convert(text) as u16));
        }
        if !is_identifier(text) {
            self.error(AsmErrorKind::WordExpected, "word expected", None);
            return None;
        }
        match self.symbols.resolve_word(text) {
            Some(value) => Some(OperandValue::Word(value)),
            None => {
                self.error(AsmErrorKind::UndefinedId, "undefined label or identifier", Some(text));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests;
