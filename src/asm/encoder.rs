use tracing::warn;

use super::lexer::SourceLine;
use super::parser::{looks_numeric, parse_number, register, Directive, Stmt};
use super::symbols::SymbolTable;
use super::{AsmError, AsmErrorKind, Program, MAX_IMAGE_WORDS};
use crate::decoder::Format;
use crate::instructions::InstrDesc;
use crate::isa::fasm32::{encode_j, encode_ri, encode_rm, encode_rr};

struct Encoder<'a> {
    symbols: &'a SymbolTable,
    words: Vec<u32>,
    line: usize,
}

impl Encoder<'_> {
    fn emit(&mut self, word: u32) -> Result<(), AsmErrorKind> {
        if self.words.len() as u32 >= MAX_IMAGE_WORDS {
            return Err(AsmErrorKind::ImageOverflow);
        }
        self.words.push(word);
        Ok(())
    }

    fn reg(&self, tok: &str) -> Result<u8, AsmErrorKind> {
        register(tok).ok_or_else(|| AsmErrorKind::UnknownRegister(tok.to_string()))
    }

    fn number(&self, tok: &str) -> Result<i64, AsmErrorKind> {
        parse_number(tok).ok_or_else(|| AsmErrorKind::BadNumber(tok.to_string()))
    }

    /// Numeric literal, or a label resolved to its slot.
    fn value(&self, tok: &str) -> Result<i64, AsmErrorKind> {
        if looks_numeric(tok) {
            self.number(tok)
        } else {
            self.symbols.resolve(tok).map(i64::from)
        }
    }

    /// Masking happens in the encoder; this only reports lost bits.
    fn field(&self, value: i64, bits: u32) -> i64 {
        let lo = -(1i64 << (bits - 1));
        let hi = (1i64 << bits) - 1;
        if value < lo || value > hi {
            warn!(line = self.line, value, bits, "operand truncated to field width");
        }
        value
    }

    fn instruction(&mut self, desc: &InstrDesc, ops: &[String]) -> Result<(), AsmErrorKind> {
        let op = desc.op;
        let word = match desc.format {
            Format::Rm => {
                let reg = self.reg(&ops[0])?;
                let addr = self.field(self.value(&ops[1])?, 20);
                encode_rm(op, reg, addr as u32)
            }
            Format::Rr => {
                let r1 = self.reg(&ops[0])?;
                let r2 = self.reg(&ops[1])?;
                let imm = self.field(self.number(&ops[2])?, 16);
                encode_rr(op, r1, r2, imm as i32)
            }
            Format::Ri => {
                let reg = self.reg(&ops[0])?;
                let imm = self.field(self.value(&ops[1])?, 20);
                encode_ri(op, reg, imm as i32)
            }
            Format::J => {
                let addr = self.field(self.value(&ops[0])?, 20);
                encode_j(op, addr as u32)
            }
        };
        self.emit(word)
    }

    fn word(&mut self, tok: &str) -> Result<(), AsmErrorKind> {
        let v = self.number(tok)?;
        if v < i32::MIN as i64 || v > u32::MAX as i64 {
            return Err(AsmErrorKind::BadNumber(tok.to_string()));
        }
        self.emit(v as u32)
    }

    /// Full IEEE-754 pattern, low word first, as in a register pair.
    fn double(&mut self, tok: &str) -> Result<(), AsmErrorKind> {
        let v: f64 = tok
            .parse()
            .map_err(|_| AsmErrorKind::BadNumber(tok.to_string()))?;
        let bits = v.to_bits();
        self.emit(bits as u32)?;
        self.emit((bits >> 32) as u32)
    }
}

fn check_arity(mnemonic: &'static str, expected: usize, ops: &[String]) -> Result<(), AsmErrorKind> {
    if ops.is_empty() {
        return Err(AsmErrorKind::MissingOperands);
    }
    if ops.len() != expected {
        return Err(AsmErrorKind::OperandCount {
            mnemonic,
            expected,
            found: ops.len(),
        });
    }
    Ok(())
}

/// Pass 2. Stops at `END` or at the first error.
pub fn encode(lines: &[SourceLine], symbols: &SymbolTable) -> Result<Program, AsmError> {
    let mut enc = Encoder {
        symbols,
        words: Vec::new(),
        line: 0,
    };
    let mut entry = None;

    for line in lines {
        let Some(mnemonic) = &line.mnemonic else {
            continue;
        };
        enc.line = line.number;
        let ops = line.operands.as_slice();
        let result = match Stmt::classify(mnemonic) {
            None => Err(AsmErrorKind::UnknownMnemonic(mnemonic.clone())),
            Some(Stmt::Directive(d)) => check_arity(d.name(), 1, ops).and_then(|()| match d {
                Directive::End => symbols.resolve(&ops[0]).map(|e| entry = Some(e)),
                Directive::Word => enc.word(&ops[0]),
                Directive::Double => enc.double(&ops[0]),
            }),
            Some(Stmt::Instruction(desc)) => check_arity(desc.mnemonic, desc.format.arity(), ops)
                .and_then(|()| enc.instruction(desc, ops)),
        };
        result.map_err(|kind| AsmError::new(line.number, kind))?;
        if entry.is_some() {
            break;
        }
    }

    let code_len = enc.words.len() as u32;
    let entry = entry.unwrap_or_else(|| {
        warn!("no END directive; starting at address 0");
        0
    });
    Ok(Program {
        words: enc.words,
        code_len,
        entry,
    })
}
