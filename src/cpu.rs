use anyhow::Error;
use serde::{Deserialize, Serialize};

use crate::decoder::Decoder;
use crate::exec::Executor;
use crate::host::Host;
use crate::memory::Bus;

/// Number of addressable words in the default program image.
pub const MEM_WORDS: u32 = 1 << 20;

pub const SP: usize = 14;
pub const PC: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmConfig {
    pub memory_words: u32,
    /// Initial stack pointer; the first push lands one word below it.
    /// Unset means the last word of memory.
    pub stack_top: Option<u32>,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            memory_words: MEM_WORDS,
            stack_top: None,
        }
    }
}

impl VmConfig {
    pub fn initial_sp(&self) -> u32 {
        self.stack_top
            .unwrap_or_else(|| self.memory_words.saturating_sub(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    pub gpr: [u32; 16], // r15 doubles as PC, r14 as SP
    pub flags: i32,     // register 16, only written by CMP/CMPI/CMPD
    pub cfg: VmConfig,
}

#[derive(thiserror::Error, Debug)]
pub enum Trap {
    #[error("halt with status {code}")]
    Halt { code: i32 },
    #[error("exit requested")]
    Exit,
    #[error("division by zero at {pc:#07x}")]
    DivideByZero { pc: u32 },
    #[error("double {value} does not fit in a 32-bit integer at {pc:#07x}")]
    ConversionOverflow { pc: u32, value: f64 },
    #[error("invalid instruction {word:#010x} at {pc:#07x}")]
    InvalidInstruction { pc: u32, word: u32 },
    #[error("register pair rooted at r{reg} is out of range")]
    RegisterPair { reg: u8 },
    #[error("bus error at {addr:#07x}: {source}")]
    Bus {
        addr: u32,
        #[source]
        source: Error,
    },
    #[error("host i/o failed: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
}

impl Trap {
    /// True for the engine-internal terminations (everything but HALT and exit).
    pub fn is_fault(&self) -> bool {
        !matches!(self, Trap::Halt { .. } | Trap::Exit)
    }
}

impl Cpu {
    pub fn new(cfg: VmConfig) -> Self {
        Self {
            gpr: [0; 16],
            flags: 0,
            cfg,
        }
    }

    pub fn reset(&mut self, entry: u32) {
        self.gpr = [0; 16];
        self.flags = 0;
        self.gpr[SP] = self.cfg.initial_sp();
        self.gpr[PC] = entry;
    }

    pub fn pc(&self) -> u32 {
        self.gpr[PC]
    }

    pub fn set_pc(&mut self, pc: u32) {
        self.gpr[PC] = pc;
    }

    pub fn sp(&self) -> u32 {
        self.gpr[SP]
    }

    pub fn set_sp(&mut self, sp: u32) {
        self.gpr[SP] = sp;
    }

    /// 64-bit value held in `r` (low) and `r + 1` (high).
    pub fn pair(&self, r: u8) -> Result<u64, Trap> {
        let (lo, hi) = self.pair_slots(r)?;
        Ok((self.gpr[lo] as u64) | ((self.gpr[hi] as u64) << 32))
    }

    /// Writes both halves only after the index check, so a pair is never torn.
    pub fn set_pair(&mut self, r: u8, v: u64) -> Result<(), Trap> {
        let (lo, hi) = self.pair_slots(r)?;
        self.gpr[lo] = v as u32;
        self.gpr[hi] = (v >> 32) as u32;
        Ok(())
    }

    pub fn double(&self, r: u8) -> Result<f64, Trap> {
        self.pair(r).map(f64::from_bits)
    }

    pub fn set_double(&mut self, r: u8, v: f64) -> Result<(), Trap> {
        self.set_pair(r, v.to_bits())
    }

    fn pair_slots(&self, r: u8) -> Result<(usize, usize), Trap> {
        let lo = r as usize;
        // r15 would pair with the flags slot
        if lo + 1 >= self.gpr.len() {
            return Err(Trap::RegisterPair { reg: r });
        }
        Ok((lo, lo + 1))
    }

    pub fn step<B: Bus, H: Host, D: Decoder, X: Executor>(
        &mut self,
        bus: &mut B,
        host: &mut H,
        dec: &D,
        exec: &X,
    ) -> Result<(), Trap> {
        let pc = self.pc();
        let word = bus
            .read_word(pc)
            .map_err(|source| Trap::Bus { addr: pc, source })?;
        let d = dec
            .decode(word)
            .ok_or(Trap::InvalidInstruction { pc, word })?;
        // Control transfers are measured from the next word.
        self.set_pc(pc.wrapping_add(1));
        exec.exec(self, bus, host, d)
    }
}
