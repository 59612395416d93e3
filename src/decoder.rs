use serde::{Deserialize, Serialize};

use crate::instructions::Op;

/// Operand layout of an instruction word. The top byte is always the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    /// Register + 20-bit address (zero-extended).
    Rm,
    /// Two registers + 16-bit signed immediate.
    Rr,
    /// Register + 20-bit signed immediate.
    Ri,
    /// 20-bit unsigned address, no register.
    J,
}

impl Format {
    /// Number of source operands the assembler expects for this layout.
    pub fn arity(self) -> usize {
        match self {
            Format::Rm | Format::Ri => 2,
            Format::Rr => 3,
            Format::J => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    pub op: Op,
    pub r1: u8,
    pub r2: u8,
    /// Sign-extended immediate (RR, RI); zero otherwise.
    pub imm: i32,
    /// Zero-extended address field (RM, J); zero otherwise.
    pub addr: u32,
}

pub trait Decoder {
    fn decode(&self, raw32: u32) -> Option<Decoded>;
}
