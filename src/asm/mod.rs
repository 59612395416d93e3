//! Two-pass assembler: labels first, then encoding.
//!
//! ```text
//! [label:]... [MNEMONIC operand[, operand]...] [; comment]
//! ```
//!
//! Mnemonics are case-insensitive; labels and register names (`r0`..`r15`)
//! are not. Besides the opcodes in [`TABLE`](crate::instructions::TABLE)
//! three directives exist: `WORD n`, `DOUBLE x` (two words) and `END label`,
//! which stops assembly and names the entry point.

pub mod encoder;
pub mod lexer;
pub mod parser;
pub mod symbols;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use lexer::{tokenize, SourceLine};
pub use parser::{Directive, Stmt};
pub use symbols::SymbolTable;

/// Largest program image the word format can address.
pub const MAX_IMAGE_WORDS: u32 = 1 << 20;

/// Assembled program, ready to load at address 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub words: Vec<u32>,
    /// Words emitted before `END`; execution stops once the PC leaves this range.
    pub code_len: u32,
    pub entry: u32,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmErrorKind {
    #[error("label `{0}` is already defined")]
    DuplicateLabel(String),
    #[error("`{0}` is a reserved mnemonic or register name")]
    ReservedName(String),
    #[error("missing operands")]
    MissingOperands,
    #[error("unknown mnemonic `{0}`")]
    UnknownMnemonic(String),
    #[error("{mnemonic} takes {expected} operand(s), found {found}")]
    OperandCount {
        mnemonic: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("`{0}` is not a register")]
    UnknownRegister(String),
    #[error("malformed number `{0}`")]
    BadNumber(String),
    #[error("undefined label `{0}`")]
    UndefinedLabel(String),
    #[error("program does not fit in {} words", MAX_IMAGE_WORDS)]
    ImageOverflow,
}

/// Fatal assembly error. Displays as the classic `error in line N`; the
/// cause is available through `source()`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("error in line {line}")]
pub struct AsmError {
    pub line: usize,
    #[source]
    pub kind: AsmErrorKind,
}

impl AsmError {
    pub fn new(line: usize, kind: AsmErrorKind) -> Self {
        Self { line, kind }
    }
}

pub fn assemble(src: &str) -> Result<Program, AsmError> {
    let lines = tokenize(src);
    let symbols = SymbolTable::build(&lines)?;
    debug!(labels = symbols.len(), "pass 1 done");
    let program = encoder::encode(&lines, &symbols)?;
    debug!(
        words = program.words.len(),
        code_len = program.code_len,
        entry = program.entry,
        "pass 2 done"
    );
    Ok(program)
}
