// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Error types, diagnostics, and reporting for the assembler.

use std::fmt;
use std::io;

use thiserror::Error;

/// Line processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    Ok,
    NothingDone,
    Error,
    End,
}

/// Broad class of an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Syntax,
    Semantic,
    Fatal,
    Warning,
}

/// Assembler error codes.
///
/// Syntax codes start at 1, semantic codes at 50, fatal codes at 100 and
/// warnings at 150.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsmErrorKind {
    Register8Expected = 1,
    Register16Expected = 2,
    Register32Expected = 3,
    SymbolExpected = 5,
    ByteExpected = 6,
    WordExpected = 7,
    ConstExpected = 9,
    InvalidOperands = 10,
    TooManyTokens = 11,
    UnterminatedString = 12,
    LineTooLong = 13,

    InvalidId = 50,
    ReservedName = 51,
    Redefined = 52,
    TooManyIds = 53,
    UndefinedId = 54,
    TypeMismatch = 55,
    InvalidInstruction = 56,
    InvalidConversion = 57,

    OffsetOutOfRange = 100,
    OutOfMemory = 101,
    FileOpen = 102,
    FileIoFailed = 103,
    InvalidInputPath = 104,
    InvalidOutputPath = 105,

    DataTruncation = 150,
}

impl AsmErrorKind {
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn class(self) -> ErrorClass {
        match self.code() {
            0..=49 => ErrorClass::Syntax,
            50..=99 => ErrorClass::Semantic,
            100..=149 => ErrorClass::Fatal,
            _ => ErrorClass::Warning,
        }
    }
}

/// An assembler error with a kind and message.
#[derive(Debug, Clone)]
pub struct AsmError {
    kind: AsmErrorKind,
    message: String,
}

impl AsmError {
    pub fn new(kind: AsmErrorKind, msg: &str, param: Option<&str>) -> Self {
        Self {
            kind,
            message: format_error(msg, param),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> AsmErrorKind {
        self.kind
    }
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AsmError {}

/// Errors that abort the run immediately.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("offset out of range")]
    OffsetOutOfRange,
    #[error("too many io channels")]
    TooManyChannels,
    #[error("cannot open file : {path}")]
    FileOpen {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("file io failed : {0}")]
    FileIo(#[from] io::Error),
    #[error("invalid input path : {0}")]
    InvalidInputPath(String),
    #[error("invalid output path : {0}")]
    InvalidOutputPath(String),
}

impl FatalError {
    pub fn kind(&self) -> AsmErrorKind {
        match self {
            FatalError::OffsetOutOfRange => AsmErrorKind::OffsetOutOfRange,
            FatalError::TooManyChannels => AsmErrorKind::OutOfMemory,
            FatalError::FileOpen { .. } => AsmErrorKind::FileOpen,
            FatalError::FileIo(_) => AsmErrorKind::FileIoFailed,
            FatalError::InvalidInputPath(_) => AsmErrorKind::InvalidInputPath,
            FatalError::InvalidOutputPath(_) => AsmErrorKind::InvalidOutputPath,
        }
    }

    pub fn to_asm_error(&self) -> AsmError {
        AsmError::new(self.kind(), &self.to_string(), None)
    }
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A diagnostic message with location and context.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub(crate) line: u32,
    pub(crate) severity: Severity,
    pub(crate) fatal: bool,
    pub(crate) error: AsmError,
    pub(crate) file: Option<String>,
}

impl Diagnostic {
    pub fn new(line: u32, severity: Severity, error: AsmError) -> Self {
        Self {
            line,
            severity,
            fatal: false,
            error,
            file: None,
        }
    }

    pub fn with_fatal(mut self, fatal: bool) -> Self {
        self.fatal = fatal;
        self
    }

    pub fn with_file(mut self, file: Option<String>) -> Self {
        self.file = file;
        self
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    pub fn kind(&self) -> AsmErrorKind {
        self.error.kind()
    }

    pub fn code(&self) -> u32 {
        self.error.kind().code()
    }

    pub fn description(&self) -> &str {
        self.error.message()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    fn label(&self) -> &'static str {
        match (self.severity, self.fatal) {
            (_, true) => "FATAL",
            (Severity::Warning, _) => "WARNING",
            (Severity::Error, _) => "ERROR",
        }
    }

    pub fn format_with_context(&self, lines: Option<&[String]>, use_color: bool) -> String {
        let sev = paint(self.label(), self.severity, use_color);
        let header = match &self.file {
            Some(file) => format!("{file}:{}: {sev} {}", self.line, self.code()),
            None => format!("{}: {sev} {}", self.line, self.code()),
        };

        let mut out = String::new();
        out.push_str(&header);
        out.push('\n');

        for line in build_context_lines(self.line, lines) {
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str(&format!("{sev}: {}", self.error.message()));
        out
    }
}

fn paint(text: &str, severity: Severity, use_color: bool) -> String {
    if !use_color {
        return text.to_string();
    }
    let color = match severity {
        Severity::Warning => "33",
        Severity::Error => "31",
    };
    format!("\x1b[1;{color}m{text}\x1b[0m")
}

/// Report from a successful assembly run.
#[derive(Debug)]
pub struct AsmRunReport {
    diagnostics: Vec<Diagnostic>,
    source_lines: Vec<String>,
    messages: Vec<String>,
    bytes_written: u32,
}

impl AsmRunReport {
    pub fn new(diagnostics: Vec<Diagnostic>, source_lines: Vec<String>) -> Self {
        Self {
            diagnostics,
            source_lines,
            messages: Vec::new(),
            bytes_written: 0,
        }
    }

    pub fn with_messages(mut self, messages: Vec<String>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_bytes_written(mut self, bytes_written: u32) -> Self {
        self.bytes_written = bytes_written;
        self
    }

    pub fn push_message(&mut self, message: String) {
        self.messages.push(message);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn source_lines(&self) -> &[String] {
        &self.source_lines
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn bytes_written(&self) -> u32 {
        self.bytes_written
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

}

/// Error from a failed assembly run.
#[derive(Debug)]
pub struct AsmRunError {
    error: AsmError,
    diagnostics: Vec<Diagnostic>,
    source_lines: Vec<String>,
    messages: Vec<String>,
}

impl AsmRunError {
    pub fn new(error: AsmError, diagnostics: Vec<Diagnostic>, source_lines: Vec<String>) -> Self {
        Self {
            error,
            diagnostics,
            source_lines,
            messages: Vec::new(),
        }
    }

    pub fn with_messages(mut self, messages: Vec<String>) -> Self {
        self.messages = messages;
        self
    }

    pub fn error(&self) -> &AsmError {
        &self.error
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn source_lines(&self) -> &[String] {
        &self.source_lines
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl fmt::Display for AsmRunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for AsmRunError {}

/// Pass statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassCounts {
    pub lines: u32,
    pub errors: u32,
    pub warnings: u32,
}

impl PassCounts {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Build context lines for error display.
pub fn build_context_lines(line_num: u32, lines: Option<&[String]>) -> Vec<String> {
    let mut out = Vec::new();
    let line_idx = line_num.saturating_sub(1) as usize;

    match lines.and_then(|lines| lines.get(line_idx)) {
        Some(line) if line_num > 0 => out.push(format!("{:>5} | {}", line_num, line)),
        _ => out.push(format!("{:>5} | <source unavailable>", line_num)),
    }
    out
}

/// Format an error message with an optional parameter.
pub fn format_error(msg: &str, param: Option<&str>) -> String {
    match param {
        Some(p) => format!("{msg} : {p}"),
        None => msg.to_string(),
    }
}
