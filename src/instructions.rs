use serde::{Deserialize, Serialize};

use crate::decoder::Format;

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub op: Op,
    pub mnemonic: &'static str,
    pub format: Format,
}

// One list drives the enum, the code/format/mnemonic matches and TABLE, so
// the three can never disagree.
macro_rules! opcodes {
    ($($name:ident = $code:literal, $mnemonic:literal, $format:ident;)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(u8)]
        pub enum Op {
            $($name = $code,)*
        }

        impl Op {
            pub fn from_code(code: u8) -> Option<Op> {
                match code {
                    $($code => Some(Op::$name),)*
                    _ => None,
                }
            }

            pub fn format(self) -> Format {
                match self {
                    $(Op::$name => Format::$format,)*
                }
            }

            pub fn mnemonic(self) -> &'static str {
                match self {
                    $(Op::$name => $mnemonic,)*
                }
            }
        }

        pub const TABLE: &[InstrDesc] = &[
            $(InstrDesc { op: Op::$name, mnemonic: $mnemonic, format: Format::$format },)*
        ];
    };
}

opcodes! {
    Halt = 0, "HALT", Ri;
    Syscall = 1, "SYSCALL", Ri;
    Add = 2, "ADD", Rr;
    AddI = 3, "ADDI", Ri;
    Sub = 4, "SUB", Rr;
    SubI = 5, "SUBI", Ri;
    Mul = 6, "MUL", Rr;
    MulI = 7, "MULI", Ri;
    Div = 8, "DIV", Rr;
    DivI = 9, "DIVI", Ri;
    Lc = 12, "LC", Ri;
    Shl = 13, "SHL", Rr;
    ShlI = 14, "SHLI", Ri;
    Shr = 15, "SHR", Rr;
    ShrI = 16, "SHRI", Ri;
    And = 17, "AND", Rr;
    AndI = 18, "ANDI", Ri;
    Or = 19, "OR", Rr;
    OrI = 20, "ORI", Ri;
    Xor = 21, "XOR", Rr;
    XorI = 22, "XORI", Ri;
    Not = 23, "NOT", Ri;
    Mov = 24, "MOV", Rr;
    AddD = 32, "ADDD", Rr;
    SubD = 33, "SUBD", Rr;
    MulD = 34, "MULD", Rr;
    DivD = 35, "DIVD", Rr;
    IToD = 36, "ITOD", Rr;
    DToI = 37, "DTOI", Rr;
    Push = 38, "PUSH", Ri;
    Pop = 39, "POP", Ri;
    Call = 40, "CALL", Rr;
    CallI = 41, "CALLI", J;
    Ret = 42, "RET", J;
    Cmp = 43, "CMP", Rr;
    CmpI = 44, "CMPI", Ri;
    CmpD = 45, "CMPD", Rr;
    Jmp = 46, "JMP", J;
    Jne = 47, "JNE", J;
    Jeq = 48, "JEQ", J;
    Jle = 49, "JLE", J;
    Jl = 50, "JL", J;
    Jge = 51, "JGE", J;
    Jg = 52, "JG", J;
    Load = 64, "LOAD", Rm;
    Store = 65, "STORE", Rm;
    Load2 = 66, "LOAD2", Rm;
    Store2 = 67, "STORE2", Rm;
    LoadR = 68, "LOADR", Rr;
    LoadR2 = 69, "LOADR2", Rr;
    StoreR = 70, "STORER", Rr;
    StoreR2 = 71, "STORER2", Rr;
}

impl Op {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Case-insensitive mnemonic lookup.
pub fn lookup(mnemonic: &str) -> Option<&'static InstrDesc> {
    TABLE
        .iter()
        .find(|d| d.mnemonic.eq_ignore_ascii_case(mnemonic))
}
