use crate::decoder::{Decoded, Decoder, Format};
use crate::instructions::Op;

/// Width of the address / immediate field in RM, RI and J words.
pub const FIELD20_MASK: u32 = 0xF_FFFF;
/// Width of the immediate field in RR words.
pub const FIELD16_MASK: u32 = 0xFFFF;

#[inline]
fn sign_ext(v: u32, bits: u32) -> i32 {
    let s = 32 - bits;
    ((v << s) as i32) >> s
}

#[inline]
fn op_bits(op: Op) -> u32 {
    (op.code() as u32) << 24
}

#[inline]
fn reg_bits(reg: u8, shift: u32) -> u32 {
    ((reg as u32) & 0xF) << shift
}

/// `(op << 24) | (reg << 20) | (addr & 0xFFFFF)`
pub fn encode_rm(op: Op, reg: u8, addr: u32) -> u32 {
    op_bits(op) | reg_bits(reg, 20) | (addr & FIELD20_MASK)
}

/// `(op << 24) | (r1 << 20) | (r2 << 16) | (imm & 0xFFFF)`
pub fn encode_rr(op: Op, r1: u8, r2: u8, imm: i32) -> u32 {
    op_bits(op) | reg_bits(r1, 20) | reg_bits(r2, 16) | ((imm as u32) & FIELD16_MASK)
}

/// `(op << 24) | (reg << 20) | (imm & 0xFFFFF)`
pub fn encode_ri(op: Op, reg: u8, imm: i32) -> u32 {
    op_bits(op) | reg_bits(reg, 20) | ((imm as u32) & FIELD20_MASK)
}

/// `(op << 24) | (addr & 0xFFFFF)`
pub fn encode_j(op: Op, addr: u32) -> u32 {
    op_bits(op) | (addr & FIELD20_MASK)
}

/// Decoder for the 32-bit word format: opcode in bits 31..24, fields below.
#[derive(Debug, Default, Clone, Copy)]
pub struct Fasm32Decoder;

impl Fasm32Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for Fasm32Decoder {
    fn decode(&self, raw32: u32) -> Option<Decoded> {
        let op = Op::from_code((raw32 >> 24) as u8)?;
        let r1 = ((raw32 >> 20) & 0xF) as u8;
        let d = match op.format() {
            Format::Rm => Decoded { op, r1, r2: 0, imm: 0, addr: raw32 & FIELD20_MASK },
            Format::Rr => Decoded {
                op,
                r1,
                r2: ((raw32 >> 16) & 0xF) as u8,
                imm: sign_ext(raw32 & FIELD16_MASK, 16),
                addr: 0,
            },
            Format::Ri => Decoded { op, r1, r2: 0, imm: sign_ext(raw32 & FIELD20_MASK, 20), addr: 0 },
            Format::J => Decoded { op, r1: 0, r2: 0, imm: 0, addr: raw32 & FIELD20_MASK },
        };
        Some(d)
    }
}
