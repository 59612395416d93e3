pub mod asm;
pub mod cpu;
pub mod decoder;
pub mod exec;
pub mod host;
pub mod instructions;
pub mod memory;
pub mod vm;

pub mod isa {
    pub mod fasm32; // 32-bit word encoding: opcode byte + RM/RR/RI/J fields
}

pub use asm::{assemble, AsmError, AsmErrorKind, Program};
pub use cpu::{Cpu, Trap, VmConfig};
pub use host::{Console, Host};
pub use memory::{Bus, LinearMemory};
pub use vm::{Outcome, Vm};
