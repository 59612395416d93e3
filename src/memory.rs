use anyhow::{bail, ensure, Result};
use serde::{Deserialize, Serialize};

/// Word-addressed memory as seen by the execution engine.
///
/// Addresses count 32-bit words, not bytes. Every access is bounds-checked;
/// an address outside the backing store is an error, which the engine turns
/// into a fault-halt.
pub trait Bus {
    fn read_word(&mut self, addr: u32) -> Result<u32>;
    fn write_word(&mut self, addr: u32, val: u32) -> Result<()>;

    /// Two consecutive words, `addr` first (the low half of a pair).
    fn read_pair(&mut self, addr: u32) -> Result<(u32, u32)> {
        let lo = self.read_word(addr)?;
        let hi = self.read_word(addr.wrapping_add(1))?;
        Ok((lo, hi))
    }

    fn write_pair(&mut self, addr: u32, lo: u32, hi: u32) -> Result<()> {
        // Probe the high word first so a failing pair leaves memory untouched.
        self.read_word(addr.wrapping_add(1))?;
        self.write_word(addr, lo)?;
        self.write_word(addr.wrapping_add(1), hi)
    }
}

/// Flat program image: code and data grow up from 0, the stack grows down
/// from the top. Nothing stops the two from meeting; keeping them apart is
/// the program's responsibility.
#[derive(Clone, Serialize, Deserialize)]
pub struct LinearMemory {
    pub mem: Vec<u32>,
}

impl LinearMemory {
    pub fn new(words: usize) -> Self {
        Self { mem: vec![0; words] }
    }

    pub fn len(&self) -> usize {
        self.mem.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mem.is_empty()
    }

    /// Copy an assembled image to address 0.
    pub fn load(&mut self, image: &[u32]) -> Result<()> {
        ensure!(
            image.len() <= self.mem.len(),
            "program image of {} words does not fit in {} words of memory",
            image.len(),
            self.mem.len()
        );
        self.mem[..image.len()].copy_from_slice(image);
        Ok(())
    }

    fn slot(&self, addr: u32) -> Result<usize> {
        let off = addr as usize;
        if off >= self.mem.len() {
            bail!("address {addr:#07x} outside {} words of memory", self.mem.len());
        }
        Ok(off)
    }
}

impl Bus for LinearMemory {
    fn read_word(&mut self, addr: u32) -> Result<u32> {
        let off = self.slot(addr)?;
        Ok(self.mem[off])
    }

    fn write_word(&mut self, addr: u32, val: u32) -> Result<()> {
        let off = self.slot(addr)?;
        self.mem[off] = val;
        Ok(())
    }
}
