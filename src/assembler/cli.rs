// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing and argument validation.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use tracing::Level;

use crate::core::assembler::error::{AsmError, AsmErrorKind, AsmRunError};
use crate::core::output::OutputFormat;

pub const VERSION: &str = "1.0";

const LONG_ABOUT: &str = "Two-pass Intel 8085 assembler.

The input file must end with .asm. Outputs are written next to the input
unless -o/--outfile sets another base name.
When neither -x/--hex nor -b/--bin is given, an Intel Hex file is written.
-x and -b may be combined; -d/--dbg adds a binary address-to-line map.
Output files are removed again when the source has errors.";

#[derive(Parser, Debug)]
#[command(
    name = "asm8085",
    version = VERSION,
    about = "Two-pass Intel 8085 assembler",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    #[arg(value_name = "INPUT", conflicts_with = "infile")]
    pub input: Option<PathBuf>,
    #[arg(
        short = 'i',
        long = "infile",
        value_name = "FILE",
        long_help = "Input assembly file. Same as the positional INPUT; the file must end with .asm."
    )]
    pub infile: Option<PathBuf>,
    #[arg(
        short = 'x',
        long = "hex",
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = "",
        long_help = "Emit an Intel Hex file. FILE is optional; when omitted, the output base is used and a .hex extension is added."
    )]
    pub hex_name: Option<String>,
    #[arg(
        short = 'b',
        long = "bin",
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = "",
        long_help = "Emit a raw binary image. FILE is optional; when omitted, the output base is used and a .bin extension is added."
    )]
    pub bin_name: Option<String>,
    #[arg(
        short = 'd',
        long = "dbg",
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = "",
        long_help = "Emit a debug map of (address, line) records. FILE is optional; when omitted, the output base is used and a .dbg extension is added."
    )]
    pub dbg_name: Option<String>,
    #[arg(
        short = 'o',
        long = "outfile",
        value_name = "BASE",
        long_help = "Output filename base when -x/-b/-d omit filenames. Defaults to the input path without its .asm extension."
    )]
    pub outfile: Option<String>,
    #[arg(
        short = 's',
        long = "symbols",
        action = ArgAction::SetTrue,
        long_help = "Print the symbol table after a successful run."
    )]
    pub symbols: bool,
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value_t = Level::WARN,
        long_help = "Tracing verbosity written to stderr: error, warn, info, debug or trace."
    )]
    pub log_level: Level,
}

fn cli_error(kind: AsmErrorKind, msg: &str, param: Option<&str>) -> AsmRunError {
    AsmRunError::new(AsmError::new(kind, msg, param), Vec::new(), Vec::new())
}

pub fn resolve_output_path(base: &str, name: Option<String>, extension: &str) -> Option<String> {
    let name = name?;
    if name.is_empty() {
        return Some(format!("{base}.{extension}"));
    }
    let mut path = PathBuf::from(&name);
    if path.extension().is_none() {
        path = PathBuf::from(format!("{name}.{extension}"));
    }
    Some(path.to_string_lossy().to_string())
}

/// Check the input name and return the default output base.
///
/// The base keeps the input's directory, so outputs land next to the source.
pub fn input_base_from_path(path: &Path) -> Result<String, AsmRunError> {
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(name) => name,
        None => {
            return Err(cli_error(
                AsmErrorKind::InvalidInputPath,
                "Invalid input file name",
                None,
            ))
        }
    };
    if !file_name.ends_with(".asm") || file_name.len() == ".asm".len() {
        return Err(cli_error(
            AsmErrorKind::InvalidInputPath,
            "Input file must end with .asm",
            None,
        ));
    }
    Ok(path.with_extension("").to_string_lossy().to_string())
}

/// Validate CLI arguments and return parsed configuration.
pub fn validate_cli(cli: &Cli) -> Result<CliConfig, AsmRunError> {
    let input = match (cli.input.as_ref(), cli.infile.as_ref()) {
        (Some(path), None) | (None, Some(path)) => path.clone(),
        (Some(_), Some(_)) => {
            return Err(cli_error(
                AsmErrorKind::InvalidInputPath,
                "Give the input either as INPUT or with -i/--infile, not both",
                None,
            ))
        }
        (None, None) => {
            return Err(cli_error(
                AsmErrorKind::InvalidInputPath,
                "No input file specified. Use INPUT or -i/--infile",
                None,
            ))
        }
    };

    let input_base = input_base_from_path(&input)?;
    let base = match cli.outfile.as_deref() {
        Some("") => {
            return Err(cli_error(
                AsmErrorKind::InvalidOutputPath,
                "-o/--outfile needs a base name",
                None,
            ))
        }
        Some(out) => out.to_string(),
        None => input_base,
    };

    let hex_name = match (&cli.hex_name, &cli.bin_name) {
        (None, None) => Some(String::new()),
        (hex, _) => hex.clone(),
    };
    let requested = [
        (OutputFormat::Hex, hex_name),
        (OutputFormat::Bin, cli.bin_name.clone()),
        (OutputFormat::Dbg, cli.dbg_name.clone()),
    ];

    let mut outputs: Vec<(OutputFormat, PathBuf)> = Vec::new();
    for (format, name) in requested {
        let Some(path) = resolve_output_path(&base, name, format.extension()) else {
            continue;
        };
        let path = PathBuf::from(path);
        if path == input || outputs.iter().any(|(_, existing)| *existing == path) {
            return Err(cli_error(
                AsmErrorKind::InvalidOutputPath,
                "Output file clashes with another file of this run",
                Some(&path.to_string_lossy()),
            ));
        }
        outputs.push((format, path));
    }

    Ok(CliConfig {
        input,
        outputs,
        symbols: cli.symbols,
    })
}

/// Validated CLI configuration.
#[derive(Debug)]
pub struct CliConfig {
    pub input: PathBuf,
    pub outputs: Vec<(OutputFormat, PathBuf)>,
    pub symbols: bool,
}
