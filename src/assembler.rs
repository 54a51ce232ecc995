// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Two-pass assembler core and binary output generation.

use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::imagestore::ImageStore;
use crate::instructions::{self, Encoding, PairPolicy};
use crate::parser::{parse, parse_number, Statement};
use crate::symbol_table::{SymbolTable, SymbolTableResult};

const VERSION: &str = "1.0";

#[derive(Parser, Debug)]
#[command(
    name = "asm80",
    version = VERSION,
    about = "Two-pass Intel 8080 assembler producing a 64KB binary image"
)]
struct Cli {
    /// Input assembly source file.
    #[arg(value_name = "FILE")]
    infile: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsmErrorKind {
    ArgumentShape,
    InvalidRegister,
    InvalidRegisterPair,
    MalformedNumber,
    DuplicateLabel,
    UndefinedLabel,
    UnknownMnemonic,
    InvalidResetVector,
    InvalidEquExpression,
    Io,
}

/// Fatal assembly diagnostic. The first error halts the whole run;
/// there is no accumulation and no partial output.
#[derive(Debug, Clone)]
pub struct AsmError {
    kind: AsmErrorKind,
    line: u32,
    message: String,
}

impl AsmError {
    fn new(kind: AsmErrorKind, line: u32, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }

    fn io(message: impl Into<String>) -> Self {
        Self::new(AsmErrorKind::Io, 0, message)
    }

    pub fn kind(&self) -> AsmErrorKind {
        self.kind
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "{}: {}", self.line, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for AsmError {}

/// Entry point for the `asm80` binary.
pub fn run() -> Result<(), AsmError> {
    let cli = Cli::parse();
    assemble_file(&cli.infile)?;
    Ok(())
}

/// Assemble one source file and write the 64KB image next to it, with
/// the input extension replaced by `.com`. Returns the output path.
pub fn assemble_file(path: &Path) -> Result<PathBuf, AsmError> {
    let source = fs::read_to_string(path).map_err(|err| AsmError::io(err.to_string()))?;
    let program: Vec<Statement> = source
        .lines()
        .enumerate()
        .map(|(ix, line)| parse(line, ix as u32 + 1))
        .collect();

    let mut assembler = Assembler::new();
    assembler.assemble(&program)?;

    let out_path = path.with_extension("com");
    let mut out = File::create(&out_path).map_err(|err| AsmError::io(err.to_string()))?;
    assembler
        .image()
        .write_bin_file(&mut out)
        .map_err(|err| AsmError::io(err.to_string()))?;
    Ok(out_path)
}

/// Two-pass assembler state: symbol table, output image, address
/// cursor, and the running pass number. All per-statement operations
/// take this context explicitly; there is no ambient state.
pub struct Assembler {
    symbols: SymbolTable,
    image: ImageStore,
    addr: u16,
    pass: u8,
}

impl Assembler {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            image: ImageStore::new(),
            addr: 0,
            pass: 1,
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn image(&self) -> &ImageStore {
        &self.image
    }

    /// Run both passes over the parsed program. Pass 1 defines labels
    /// and sizes every statement; pass 2 re-walks the same statements
    /// and emits bytes. Forward references resolve because the symbol
    /// table is complete before pass 2 begins.
    pub fn assemble(&mut self, program: &[Statement]) -> Result<(), AsmError> {
        self.run_pass(program, 1)?;
        self.run_pass(program, 2)
    }

    fn run_pass(&mut self, program: &[Statement], pass: u8) -> Result<(), AsmError> {
        self.pass = pass;
        self.addr = 0;
        for stmt in program {
            self.process(stmt)?;
        }
        Ok(())
    }

    fn process(&mut self, stmt: &Statement) -> Result<(), AsmError> {
        let mnemonic = match stmt.mnemonic.as_deref() {
            Some(m) => m,
            None => {
                if stmt.operand1.is_some() || stmt.operand2.is_some() {
                    return Err(AsmError::new(
                        AsmErrorKind::ArgumentShape,
                        stmt.line,
                        "operands without a mnemonic",
                    ));
                }
                if let Some(label) = &stmt.label {
                    self.define_label(label, self.addr, stmt.line)?;
                }
                return Ok(());
            }
        };

        // equ defines its label at the computed value instead of the
        // current address; every other mnemonic defines it here first.
        if mnemonic != "equ" {
            if let Some(label) = &stmt.label {
                self.define_label(label, self.addr, stmt.line)?;
            }
        }

        match mnemonic {
            "org" => self.dir_org(stmt),
            "equ" => self.dir_equ(stmt),
            "db" => self.dir_db(stmt),
            "dw" => self.dir_dw(stmt),
            "ds" => self.dir_ds(stmt),
            "name" | "title" => self.dir_titled(stmt, mnemonic),
            "end" => self.dir_end(stmt),
            _ => self.instruction(stmt, mnemonic),
        }
    }

    fn define_label(&mut self, name: &str, value: u16, line: u32) -> Result<(), AsmError> {
        if self.pass != 1 {
            return Ok(());
        }
        match self.symbols.add(name, value) {
            SymbolTableResult::Ok => Ok(()),
            SymbolTableResult::Duplicate => Err(AsmError::new(
                AsmErrorKind::DuplicateLabel,
                line,
                format!("duplicate label {name}"),
            )),
        }
    }

    /// Resolve an operand token to a 16-bit value: a digit-initial
    /// token is a numeric literal, anything else a symbol reference.
    /// Unknown symbols resolve to 0 during pass 1 so forward references
    /// can be sized; during pass 2 they are fatal.
    fn resolve(&self, token: &str, line: u32) -> Result<u16, AsmError> {
        if token.as_bytes().first().is_some_and(u8::is_ascii_digit) {
            return parse_number(token).ok_or_else(|| {
                AsmError::new(
                    AsmErrorKind::MalformedNumber,
                    line,
                    format!("unable to convert {token} into a number"),
                )
            });
        }
        match self.symbols.lookup(token) {
            Some(value) => Ok(value),
            None if self.pass == 1 => Ok(0),
            None => Err(AsmError::new(
                AsmErrorKind::UndefinedLabel,
                line,
                format!("label {token} undefined"),
            )),
        }
    }

    /// Append encoded bytes: pass 2 writes them at the image cursor,
    /// and both passes advance the address by the same length.
    fn emit(&mut self, bytes: &[u8]) {
        if self.pass == 2 {
            self.image.store_slice(bytes);
        }
        self.addr = self.addr.wrapping_add(bytes.len() as u16);
    }

    fn instruction(&mut self, stmt: &Statement, mnemonic: &str) -> Result<(), AsmError> {
        let entry = instructions::lookup(mnemonic).ok_or_else(|| {
            AsmError::new(
                AsmErrorKind::UnknownMnemonic,
                stmt.line,
                format!("unknown mnemonic: {mnemonic}"),
            )
        })?;

        let bytes = match entry.encoding {
            Encoding::Implied => {
                self.expect_shape(stmt, mnemonic, false, false)?;
                vec![entry.opcode]
            }
            Encoding::Reg => {
                self.expect_shape(stmt, mnemonic, true, false)?;
                let reg = self.reg_code(stmt, 1)?;
                vec![entry.opcode + reg]
            }
            Encoding::RegHigh => {
                self.expect_shape(stmt, mnemonic, true, false)?;
                let reg = self.reg_code(stmt, 1)?;
                vec![entry.opcode + (reg << 3)]
            }
            Encoding::MovRegReg => {
                self.expect_shape(stmt, mnemonic, true, true)?;
                let dst = self.reg_code(stmt, 1)?;
                let src = self.reg_code(stmt, 2)?;
                vec![entry.opcode + (dst << 3) + src]
            }
            Encoding::Pair(policy) => {
                self.expect_shape(stmt, mnemonic, true, false)?;
                let pair = self.pair_code(stmt, mnemonic, policy)?;
                vec![entry.opcode + pair]
            }
            Encoding::Imm8 => {
                self.expect_shape(stmt, mnemonic, true, false)?;
                let value = self.resolve(operand(stmt, 1), stmt.line)?;
                vec![entry.opcode, value as u8]
            }
            Encoding::Addr16 => {
                self.expect_shape(stmt, mnemonic, true, false)?;
                let value = self.resolve(operand(stmt, 1), stmt.line)?;
                vec![entry.opcode, value as u8, (value >> 8) as u8]
            }
            Encoding::RegImm8 => {
                self.expect_shape(stmt, mnemonic, true, true)?;
                let reg = self.reg_code(stmt, 1)?;
                let value = self.resolve(operand(stmt, 2), stmt.line)?;
                vec![entry.opcode + (reg << 3), value as u8]
            }
            Encoding::PairImm16 => {
                self.expect_shape(stmt, mnemonic, true, true)?;
                let pair = self.pair_code(stmt, mnemonic, PairPolicy::Sp)?;
                let value = self.resolve(operand(stmt, 2), stmt.line)?;
                vec![entry.opcode + pair, value as u8, (value >> 8) as u8]
            }
            Encoding::Rst => {
                self.expect_shape(stmt, mnemonic, true, false)?;
                let token = operand(stmt, 1);
                // Vectors are plain decimal digits; the hex suffix is
                // not accepted here.
                let vector = token
                    .parse::<u8>()
                    .ok()
                    .filter(|n| *n <= 7)
                    .ok_or_else(|| {
                        AsmError::new(
                            AsmErrorKind::InvalidResetVector,
                            stmt.line,
                            format!("invalid reset vector {token}"),
                        )
                    })?;
                vec![entry.opcode + ((vector as u8) << 3)]
            }
            Encoding::AccPair => {
                self.expect_shape(stmt, mnemonic, true, false)?;
                match operand(stmt, 1) {
                    "b" => vec![entry.opcode],
                    "d" => vec![entry.opcode + 0x10],
                    _ => {
                        return Err(AsmError::new(
                            AsmErrorKind::ArgumentShape,
                            stmt.line,
                            format!("{mnemonic} operates on registers b and d"),
                        ))
                    }
                }
            }
        };

        self.emit(&bytes);
        Ok(())
    }

    fn dir_org(&mut self, stmt: &Statement) -> Result<(), AsmError> {
        if stmt.label.is_some() {
            return Err(self.shape_error(stmt, "org"));
        }
        self.expect_shape(stmt, "org", true, false)?;
        let token = operand(stmt, 1);
        if !token.as_bytes().first().is_some_and(u8::is_ascii_digit) {
            return Err(AsmError::new(
                AsmErrorKind::MalformedNumber,
                stmt.line,
                "org requires a number",
            ));
        }
        // Both passes rebase here so their address cursors agree.
        self.addr = self.resolve(token, stmt.line)?;
        Ok(())
    }

    fn dir_equ(&mut self, stmt: &Statement) -> Result<(), AsmError> {
        let label = stmt.label.as_deref().ok_or_else(|| {
            AsmError::new(
                AsmErrorKind::ArgumentShape,
                stmt.line,
                "equ statement requires a label",
            )
        })?;
        self.expect_shape(stmt, "equ", true, false)?;

        let token = operand(stmt, 1);
        let value = if token.starts_with('$') {
            self.dollar_expr(token, stmt.line)?
        } else {
            parse_number(token).ok_or_else(|| {
                AsmError::new(
                    AsmErrorKind::MalformedNumber,
                    stmt.line,
                    format!("unable to convert {token} into a number"),
                )
            })?
        };

        self.define_label(label, value, stmt.line)
    }

    /// Evaluate a `$`-relative equ expression: `$` alone is the current
    /// address; `$<op><number>` combines it with one of `+ - * / %`.
    fn dollar_expr(&self, token: &str, line: u32) -> Result<u16, AsmError> {
        let mut chars = token.chars();
        chars.next();
        let op = match chars.next() {
            None => return Ok(self.addr),
            Some(op) => op,
        };
        if !matches!(op, '+' | '-' | '*' | '/' | '%') {
            return Err(AsmError::new(
                AsmErrorKind::InvalidEquExpression,
                line,
                "invalid operator in equ",
            ));
        }

        let rest = chars.as_str();
        let rhs = parse_number(rest).ok_or_else(|| {
            AsmError::new(
                AsmErrorKind::MalformedNumber,
                line,
                format!("unable to convert {rest} into a number"),
            )
        })?;

        match op {
            '+' => Ok(self.addr.wrapping_add(rhs)),
            '-' => Ok(self.addr.wrapping_sub(rhs)),
            '*' => Ok(self.addr.wrapping_mul(rhs)),
            '/' => self.addr.checked_div(rhs).ok_or_else(|| {
                AsmError::new(
                    AsmErrorKind::InvalidEquExpression,
                    line,
                    "division by zero in equ",
                )
            }),
            _ => self.addr.checked_rem(rhs).ok_or_else(|| {
                AsmError::new(
                    AsmErrorKind::InvalidEquExpression,
                    line,
                    "division by zero in equ",
                )
            }),
        }
    }

    fn dir_db(&mut self, stmt: &Statement) -> Result<(), AsmError> {
        self.expect_shape(stmt, "db", true, false)?;
        let token = operand(stmt, 1);
        if stmt.is_string {
            let bytes = token.as_bytes().to_vec();
            self.emit(&bytes);
        } else if token.as_bytes().first().is_some_and(u8::is_ascii_digit) {
            let value = parse_number(token).ok_or_else(|| {
                AsmError::new(
                    AsmErrorKind::MalformedNumber,
                    stmt.line,
                    format!("unable to convert {token} into a number"),
                )
            })?;
            self.emit(&[value as u8]);
        }
        // A bare symbol operand only names the statement label, which is
        // already defined at the current address; nothing is emitted.
        Ok(())
    }

    fn dir_dw(&mut self, stmt: &Statement) -> Result<(), AsmError> {
        self.expect_shape(stmt, "dw", true, false)?;
        let value = self.resolve(operand(stmt, 1), stmt.line)?;
        self.emit(&[value as u8, (value >> 8) as u8]);
        Ok(())
    }

    fn dir_ds(&mut self, stmt: &Statement) -> Result<(), AsmError> {
        self.expect_shape(stmt, "ds", true, false)?;
        let token = operand(stmt, 1);
        let count = parse_number(token).ok_or_else(|| {
            AsmError::new(
                AsmErrorKind::MalformedNumber,
                stmt.line,
                format!("unable to convert {token} into a number"),
            )
        })?;
        if self.pass == 2 {
            for _ in 0..count {
                self.image.store(0);
            }
        }
        self.addr = self.addr.wrapping_add(count);
        Ok(())
    }

    fn dir_titled(&mut self, stmt: &Statement, mnemonic: &str) -> Result<(), AsmError> {
        if stmt.label.is_some() {
            return Err(self.shape_error(stmt, mnemonic));
        }
        self.expect_shape(stmt, mnemonic, true, false)
    }

    fn dir_end(&mut self, stmt: &Statement) -> Result<(), AsmError> {
        if stmt.label.is_some() {
            return Err(self.shape_error(stmt, "end"));
        }
        self.expect_shape(stmt, "end", false, false)
    }

    fn expect_shape(
        &self,
        stmt: &Statement,
        mnemonic: &str,
        want1: bool,
        want2: bool,
    ) -> Result<(), AsmError> {
        if stmt.operand1.is_some() == want1 && stmt.operand2.is_some() == want2 {
            Ok(())
        } else {
            Err(self.shape_error(stmt, mnemonic))
        }
    }

    fn shape_error(&self, stmt: &Statement, mnemonic: &str) -> AsmError {
        AsmError::new(
            AsmErrorKind::ArgumentShape,
            stmt.line,
            format!("arguments not correct for mnemonic {mnemonic}"),
        )
    }

    fn reg_code(&self, stmt: &Statement, which: u8) -> Result<u8, AsmError> {
        let token = operand(stmt, which);
        instructions::reg_code(token).ok_or_else(|| {
            AsmError::new(
                AsmErrorKind::InvalidRegister,
                stmt.line,
                format!("invalid register {token}"),
            )
        })
    }

    fn pair_code(
        &self,
        stmt: &Statement,
        mnemonic: &str,
        policy: PairPolicy,
    ) -> Result<u8, AsmError> {
        let token = operand(stmt, 1);
        instructions::pair_code(token, policy).ok_or_else(|| {
            let message = if instructions::is_pair_name(token) {
                format!("{token} may not be used with {mnemonic}")
            } else {
                format!("invalid register pair for {mnemonic}")
            };
            AsmError::new(AsmErrorKind::InvalidRegisterPair, stmt.line, message)
        })
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Operand accessor used after `expect_shape` has verified presence.
fn operand(stmt: &Statement, which: u8) -> &str {
    let field = if which == 1 {
        &stmt.operand1
    } else {
        &stmt.operand2
    };
    field.as_deref().unwrap_or("")
}
