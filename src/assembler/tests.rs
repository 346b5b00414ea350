// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

use super::*;
use crate::core::cpu::CpuType;
use crate::core::output::{BinEmitter, DbgEmitter, HexEmitter};
use std::io::Cursor;

struct Output {
    result: Result<AssemblySummary, FatalError>,
    hex: String,
    bin: Vec<u8>,
    dbg: Vec<u8>,
}

fn assemble_with(asm: &mut Assembler, source: &str) -> Output {
    let mut hex = HexEmitter::new(Cursor::new(Vec::new()));
    let mut bin = BinEmitter::new(Cursor::new(Vec::new()));
    let mut dbg = DbgEmitter::new(Cursor::new(Vec::new()));
    let result = {
        let mut emitters: [&mut dyn Emitter; 3] = [&mut hex, &mut bin, &mut dbg];
        asm.assemble(&mut Cursor::new(source.as_bytes()), &mut emitters)
    };
    Output {
        result,
        hex: String::from_utf8(hex.into_inner().into_inner()).expect("hex is ascii"),
        bin: bin.into_inner().into_inner(),
        dbg: dbg.into_inner().into_inner(),
    }
}

fn assemble(source: &str) -> (Assembler, Output) {
    let mut asm = Assembler::default();
    let out = assemble_with(&mut asm, source);
    (asm, out)
}

fn first_error(asm: &Assembler) -> &Diagnostic {
    asm.diagnostics()
        .iter()
        .find(|diag| !diag.is_warning())
        .expect("an error diagnostic")
}

fn hex_lines(text: &str) -> Vec<&str> {
    text.split("\r\n").filter(|line| !line.is_empty()).collect()
}

fn verify_checksum(line: &str) {
    let body = line.trim_start_matches(':');
    let bytes: Vec<u8> = (0..body.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&body[i..i + 2], 16).unwrap())
        .collect();
    let (checksum, fields) = bytes.split_last().unwrap();
    let xor = fields.iter().fold(0u8, |acc, b| acc ^ b);
    assert_eq!(xor.wrapping_neg(), *checksum, "bad checksum in {line}");
}

#[test]
fn assembles_small_program_to_every_format() {
    let (asm, out) = assemble("START: MVI A,05H\n       MOV B,A\n       END\n");
    let summary = out.result.expect("assembly succeeds");
    assert!(summary.is_ok());
    assert_eq!(summary.size, 3);
    assert_eq!(asm.state(), EngineState::Done);

    assert_eq!(out.bin, vec![0x3E, 0x05, 0x47]);
    assert_eq!(asm.symbols().label("START").map(|l| l.address), Some(0));

    let lines = hex_lines(&out.hex);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(":030000003E0547"));
    verify_checksum(lines[0]);
    assert_eq!(lines[1], ":00000001FF");

    assert_eq!(&out.dbg[..4], &3u32.to_le_bytes());
    assert_eq!(out.dbg.len(), 4 + 2 * 6);
    assert_eq!(&out.dbg[4..10], &[0x00, 0x00, 1, 0, 0, 0]);
    assert_eq!(&out.dbg[10..16], &[0x02, 0x00, 2, 0, 0, 0]);

    assert_eq!(
        asm.messages(),
        &["scanning <input>".to_string(), "assembling <input>".to_string()]
    );
}

#[test]
fn register_order_follows_destination_then_source() {
    let (_, out) = assemble("MOV A,B\nmov b,a\nMOV M,A\n");
    assert_eq!(out.bin, vec![0x78, 0x47, 0x77]);
}

#[test]
fn immediates_are_little_endian() {
    let (_, out) = assemble("LXI H,1234H\nJMP 0x0800\nMVI M,0FFh\nRST 7\n");
    assert_eq!(
        out.bin,
        vec![0x21, 0x34, 0x12, 0xC3, 0x00, 0x08, 0x36, 0xFF, 0xFF]
    );
}

#[test]
fn mov_m_m_is_rejected_once() {
    let (asm, out) = assemble("MOV M,M\nEND\n");
    assert!(out.result.expect("not fatal").counts.errors == 1);
    let diag = first_error(&asm);
    assert_eq!(diag.kind(), AsmErrorKind::InvalidInstruction);
    assert_eq!(diag.line(), 1);
    assert_eq!(
        diag.description(),
        "instruction not allowed; may be invalid operand(s) : MOV M,M"
    );
    assert!(out.bin.is_empty());
    assert!(!out.hex.contains(":00000001FF"));
}

#[test]
fn filter_rejects_illegal_register_pairs() {
    for line in ["PUSH SP", "POP SP", "LDAX H", "STAX PSW", "DAD PSW", "LXI PSW,0", "RST 8"] {
        let (asm, _) = assemble(line);
        assert_eq!(asm.counts().errors, 1, "{line}");
        assert_eq!(first_error(&asm).kind(), AsmErrorKind::InvalidInstruction);
    }
    let (asm, out) = assemble("PUSH PSW\nLDAX D\nINX SP\n");
    assert_eq!(asm.counts().errors, 0);
    assert_eq!(out.bin, vec![0xF5, 0x1A, 0x33]);
}

#[test]
fn forward_references_resolve_to_pass_one_addresses() {
    let (asm, out) = assemble("      JMP LATER\n      NOP\nLATER: HLT\n      END\n");
    assert!(out.result.expect("assembles").is_ok());
    assert_eq!(out.bin, vec![0xC3, 0x04, 0x00, 0x00, 0x76]);
    assert_eq!(asm.symbols().resolve_word("LATER"), Some(4));
}

#[test]
fn backward_labels_record_the_program_counter() {
    let (asm, _) = assemble("A1: NOP\nA2: MVI A,1\nA3:\nA4: LXI H,A1\nA5: END\n");
    let addresses: Vec<(String, u16)> = asm
        .symbols()
        .labels()
        .map(|label| (label.name.clone(), label.address))
        .collect();
    assert_eq!(
        addresses,
        vec![
            ("A1".to_string(), 0),
            ("A2".to_string(), 1),
            ("A3".to_string(), 3),
            ("A4".to_string(), 3),
            ("A5".to_string(), 6),
        ]
    );
}

#[test]
fn forward_rst_vector_is_caught_in_second_pass() {
    let (asm, out) = assemble("RST V\nV EQU 9\nEND\n");
    assert_eq!(asm.counts().errors, 1);
    assert_eq!(first_error(&asm).kind(), AsmErrorKind::InvalidInstruction);
    assert!(out.bin.is_empty());

    let (asm, out) = assemble("V EQU 2\nRST V\n");
    assert_eq!(asm.counts().errors, 0);
    assert_eq!(out.bin, vec![0xD7]);
}

#[test]
fn full_address_space_fits() {
    let source = "NOP\n".repeat(ADDRESS_SPACE as usize);
    let (asm, out) = assemble(&source);
    let summary = out.result.expect("65536 bytes fit");
    assert_eq!(summary.size, ADDRESS_SPACE);
    assert_eq!(out.bin.len(), ADDRESS_SPACE as usize);
    assert_eq!(asm.state(), EngineState::Done);
}

#[test]
fn one_byte_past_the_address_space_is_fatal() {
    let source = "NOP\n".repeat(ADDRESS_SPACE as usize + 1);
    let (asm, out) = assemble(&source);
    assert!(matches!(out.result, Err(FatalError::OffsetOutOfRange)));
    assert_eq!(asm.state(), EngineState::FatalAborted);
    let diag = asm.diagnostics().last().expect("fatal diagnostic");
    assert!(diag.is_fatal());
    assert_eq!(diag.kind(), AsmErrorKind::OffsetOutOfRange);
    assert_eq!(diag.line(), ADDRESS_SPACE + 1);
    assert!(out.bin.is_empty());
}

#[test]
fn org_near_the_top_overflows_on_a_wide_instruction() {
    let (_, out) = assemble("ORG 0xFFFD\nJMP 0\nEND\n");
    assert!(out.result.is_ok());
    let (_, out) = assemble("ORG 0xFFFE\nJMP 0\nEND\n");
    assert!(matches!(out.result, Err(FatalError::OffsetOutOfRange)));
}

#[test]
fn redefinition_keeps_the_first_value() {
    let (asm, _) = assemble("X EQU 5\nX EQU 6\nX: NOP\nEND\n");
    assert_eq!(asm.counts().errors, 2);
    let errors: Vec<&Diagnostic> = asm.diagnostics().iter().collect();
    assert_eq!(errors[0].kind(), AsmErrorKind::Redefined);
    assert_eq!(errors[0].description(), "redefinition : X");
    assert_eq!(errors[0].line(), 2);
    assert_eq!(errors[1].line(), 3);
    assert_eq!(asm.symbols().identifier("X").map(|id| id.value), Some(5));
    assert!(asm.symbols().label("X").is_none());
}

#[test]
fn assembling_twice_is_byte_identical() {
    let source = "      ORG 100H\nSTART: LXI SP,0x2000\n      CALL SUB\n      HLT\nSUB:  MVI A,0AAh\n      RET\n      END\n";
    let mut asm = Assembler::default();
    let first = assemble_with(&mut asm, source);
    let second = assemble_with(&mut asm, source);
    assert!(first.result.expect("first run").is_ok());
    assert!(second.result.expect("second run").is_ok());
    assert_eq!(first.hex, second.hex);
    assert_eq!(first.bin, second.bin);
    assert_eq!(first.dbg, second.dbg);
    assert_eq!(asm.symbols().len(), 2);
}

#[test]
fn org_opens_a_new_hex_record() {
    let (asm, out) = assemble("ORG 0x0800\nNOP\nORG 0900h\nHLT\nEND\n");
    assert_eq!(asm.org(), 0x0900);
    let lines = hex_lines(&out.hex);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with(":0108000000"));
    assert!(lines[1].starts_with(":0109000076"));
    verify_checksum(lines[0]);
    verify_checksum(lines[1]);
    assert_eq!(out.bin, vec![0x00, 0x76]);
    assert_eq!(&out.dbg[4..6], &0x0800u16.to_le_bytes());
}

#[test]
fn org_accepts_identifiers_but_not_labels() {
    let (asm, out) = assemble("BASE EQU 0x4000\nORG BASE\nHERE: NOP\n");
    assert_eq!(asm.counts().errors, 0);
    assert_eq!(asm.symbols().resolve_word("HERE"), Some(0x4000));
    assert_eq!(out.bin, vec![0x00]);

    let (asm, _) = assemble("ORG NOWHERE\n");
    assert_eq!(first_error(&asm).description(), "constant expected : org");
    let (asm, _) = assemble("ORG \"x\"\n");
    assert_eq!(first_error(&asm).description(), "constant expected : ORG");
}

#[test]
fn undefined_byte_identifier_is_reported_in_pass_two() {
    let (asm, out) = assemble("MVI A,FOO\nEND\n");
    let summary = out.result.expect("not fatal");
    assert_eq!(summary.counts.errors, 1);
    let diag = first_error(&asm);
    assert_eq!(diag.kind(), AsmErrorKind::UndefinedId);
    assert_eq!(diag.description(), "undefined identifier : FOO");
    assert!(!out.hex.contains(":00000001FF"));
}

#[test]
fn undefined_word_reference_names_both_kinds() {
    let (asm, _) = assemble("CALL NOWHERE\n");
    assert_eq!(
        first_error(&asm).description(),
        "undefined label or identifier : NOWHERE"
    );
}

#[test]
fn word_identifier_cannot_feed_a_byte_operand() {
    let (asm, _) = assemble("W EQU 0x1234\nMVI A,W\nEND\n");
    let diag = first_error(&asm);
    assert_eq!(diag.kind(), AsmErrorKind::InvalidConversion);
    assert_eq!(diag.description(), "cannot convert dbl to byte : W");
}

#[test]
fn labels_are_not_byte_operands() {
    let (asm, _) = assemble("L1: NOP\nMVI A,L1\n");
    assert_eq!(first_error(&asm).description(), "undefined identifier : L1");
}

#[test]
fn wide_hex_byte_constant_warns_but_assembles() {
    let (asm, out) = assemble("B1 EQU 0x00FF\nMVI A,B1\nEND\n");
    let summary = out.result.expect("assembles");
    assert!(summary.is_ok());
    assert_eq!(summary.counts.warnings, 1);
    let warning = &asm.diagnostics()[0];
    assert!(warning.is_warning());
    assert_eq!(warning.kind(), AsmErrorKind::DataTruncation);
    assert_eq!(out.bin, vec![0x3E, 0xFF]);
}

#[test]
fn too_many_tokens_are_rejected() {
    let (asm, _) = assemble("MVI A , 5 , 6\n");
    assert_eq!(first_error(&asm).kind(), AsmErrorKind::TooManyTokens);
    let (asm, _) = assemble("LXI H, 1, 2, 3\n");
    assert_eq!(first_error(&asm).kind(), AsmErrorKind::TooManyTokens);
    assert_eq!(asm.counts().errors, 1);
}

#[test]
fn unknown_mnemonic_is_an_invalid_instruction() {
    let (asm, _) = assemble("FOO A\nEND\n");
    let diag = first_error(&asm);
    assert_eq!(diag.kind(), AsmErrorKind::InvalidInstruction);
    assert_eq!(diag.description(), "invalid instruction : FOO");
}

#[test]
fn operand_shape_errors() {
    let (asm, _) = assemble("MOV A.B\n");
    let diag = first_error(&asm);
    assert_eq!(diag.kind(), AsmErrorKind::SymbolExpected);
    assert_eq!(diag.description(), "symbol expected : ,");

    let (asm, _) = assemble("MOV A,5\n");
    assert_eq!(first_error(&asm).description(), "operand type mismatch : MOV");

    let (asm, _) = assemble("NOP A\n");
    assert_eq!(first_error(&asm).description(), "invalid number of operands : NOP");

    let (asm, _) = assemble("MVI A,\"5\"\n");
    assert_eq!(first_error(&asm).kind(), AsmErrorKind::TypeMismatch);
}

#[test]
fn register_names_cannot_be_symbols() {
    let (asm, _) = assemble("A EQU 5\n");
    assert_eq!(
        first_error(&asm).description(),
        "use of register name as identifier : A"
    );
    let (asm, _) = assemble("sp:\n");
    assert_eq!(
        first_error(&asm).description(),
        "use of register name as label-identifier : sp"
    );
    let (asm, _) = assemble("1X EQU 5\n");
    assert_eq!(first_error(&asm).description(), "invalid identifier : 1X");
}

#[test]
fn equ_copies_an_existing_identifier() {
    let (asm, out) = assemble("ONE EQU 1\nALSO EQU ONE\nMVI A,ALSO\n");
    assert_eq!(asm.counts().errors, 0);
    let also = asm.symbols().identifier("ALSO").expect("ALSO defined");
    assert_eq!((also.value, also.kind), (1, IdKind::Byte));
    assert_eq!(out.bin, vec![0x3E, 0x01]);

    let (asm, _) = assemble("X EQU MISSING\n");
    assert_eq!(
        first_error(&asm).description(),
        "undefined label or identifier : MISSING"
    );
}

#[test]
fn end_stops_both_passes() {
    let (asm, out) = assemble("NOP\nEND\nTHIS IS NOT CODE\n");
    assert_eq!(asm.counts().errors, 0);
    assert_eq!(asm.counts().lines, 2);
    assert_eq!(out.bin, vec![0x00]);
}

#[test]
fn comments_blank_lines_and_case() {
    let (asm, out) = assemble("; header\n\n   mvi a,0ffh ; load\n\tHlt\n");
    assert_eq!(asm.counts().errors, 0);
    assert_eq!(out.bin, vec![0x3E, 0xFF, 0x76]);
}

#[test]
fn overlong_line_is_rejected() {
    let source = format!("NOP ;{}\nHLT\n", "x".repeat(MAX_LINE_LEN));
    let (asm, out) = assemble(&source);
    assert_eq!(first_error(&asm).kind(), AsmErrorKind::LineTooLong);
    assert_eq!(asm.counts().errors, 1);
    assert_eq!(out.bin, vec![0x76]);
}

#[test]
fn non_utf8_bytes_in_comments_are_tolerated() {
    let mut asm = Assembler::default();
    let mut bin = BinEmitter::new(Cursor::new(Vec::new()));
    let result = {
        let mut emitters: [&mut dyn Emitter; 1] = [&mut bin];
        let source: &[u8] = b"NOP ; caf\xE9\r\nHLT\nEND\n";
        asm.assemble(&mut Cursor::new(source), &mut emitters)
    };
    let summary = result.expect("stray bytes are not fatal");
    assert!(summary.is_ok());
    assert_eq!(bin.into_inner().into_inner(), vec![0x00, 0x76]);
    assert_eq!(asm.counts().lines, 3);
}

#[test]
fn line_limit_counts_raw_bytes() {
    let mut source = b"NOP ;".to_vec();
    source.extend(std::iter::repeat(0xE9u8).take(MAX_LINE_LEN - 5));
    source.extend_from_slice(b"\nHLT\n");
    let mut asm = Assembler::default();
    let result = asm.assemble(&mut Cursor::new(source.as_slice()), &mut []);
    assert!(result.expect("not fatal").is_ok());
}

#[test]
fn quoted_strings_cannot_name_symbols() {
    let (asm, out) = assemble("\"abc\": NOP\n");
    let diag = first_error(&asm);
    assert_eq!(diag.kind(), AsmErrorKind::InvalidId);
    assert_eq!(diag.description(), "invalid label-identifier : abc");
    assert!(asm.symbols().label("abc").is_none());
    assert_eq!(out.bin, vec![0x00]);

    let (asm, _) = assemble("\"abc\":\n");
    assert_eq!(first_error(&asm).description(), "invalid label-identifier : abc");
    assert!(asm.symbols().is_empty());

    let (asm, _) = assemble("\"x\" EQU 5\n");
    assert_eq!(first_error(&asm).description(), "invalid identifier : x");
    assert!(asm.symbols().identifier("x").is_none());
}

#[test]
fn attach_io_limits_channels() {
    let mut asm = Assembler::default();
    asm.attach_io(ChannelMode::Input, "prog.asm").expect("input");
    assert!(matches!(
        asm.attach_io(ChannelMode::Output(OutputFormat::Hex), "prog.asm"),
        Err(FatalError::InvalidOutputPath(_))
    ));
    for name in ["a.hex", "b.hex", "c.bin", "d.dbg"] {
        asm.attach_io(ChannelMode::Output(OutputFormat::Hex), name)
            .expect("output slot");
    }
    assert!(matches!(
        asm.attach_io(ChannelMode::Output(OutputFormat::Bin), "e.bin"),
        Err(FatalError::TooManyChannels)
    ));
    assert!(matches!(
        Assembler::default().attach_io(ChannelMode::Input, ""),
        Err(FatalError::InvalidInputPath(_))
    ));
}

struct Unsorted;

static UNSORTED: &[InstructionEntry] = &[
    InstructionEntry {
        mnemonic: "nop",
        opcode: 0x00,
        operands: &[],
    },
    InstructionEntry {
        mnemonic: "hlt",
        opcode: 0x76,
        operands: &[],
    },
];

impl TargetArchitecture for Unsorted {
    fn cpu_type(&self) -> CpuType {
        CpuType::new("unsorted")
    }

    fn encode_register8(&self, _token: &str) -> Option<u8> {
        None
    }

    fn encode_register16(&self, _token: &str) -> Option<u8> {
        None
    }

    fn instructions(&self) -> &'static [InstructionEntry] {
        UNSORTED
    }

    fn compute_operand_size(&self, _instr: &InstructionEntry) -> usize {
        1
    }

    fn generate_code(&self, instr: &InstructionEntry, _values: &[OperandValue], buffer: &mut Vec<u8>) {
        buffer.clear();
        buffer.push(instr.opcode);
    }

    fn filter(&self, _instr: &InstructionEntry, _tokens: &[Token], _symbols: &SymbolTable) -> bool {
        true
    }
}

#[test]
#[should_panic(expected = "not sorted")]
fn unsorted_instruction_table_panics() {
    let _ = Assembler::new(Box::new(Unsorted));
}
