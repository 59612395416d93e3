use anyhow::{ensure, Result};
use tracing::{debug, info, warn};

use crate::asm::Program;
use crate::cpu::{Cpu, Trap, VmConfig};
use crate::exec::IntExecutor;
use crate::host::Host;
use crate::isa::fasm32::Fasm32Decoder;
use crate::memory::LinearMemory;

/// Exit status reported for a fault-halt.
pub const FAULT_STATUS: i32 = 1;

/// How a run ended.
#[derive(Debug)]
pub enum Outcome {
    /// `HALT` with its immediate operand.
    Halted { code: i32 },
    /// `SYSCALL 0`.
    Exited,
    /// The program counter left the assembled code.
    Finished,
    /// Engine-internal termination.
    Faulted(Trap),
}

impl Outcome {
    pub fn status(&self) -> i32 {
        match self {
            Outcome::Halted { code } => *code,
            Outcome::Exited | Outcome::Finished => 0,
            Outcome::Faulted(_) => FAULT_STATUS,
        }
    }
}

/// One execution context: registers, memory and the host it talks to.
///
/// The stack grows down from `VmConfig::initial_sp` towards the program
/// image. Nothing checks that the two stay apart; a program that lets them
/// meet overwrites its own code or data.
pub struct Vm<H> {
    pub cpu: Cpu,
    pub mem: LinearMemory,
    host: H,
    code_len: u32,
    dec: Fasm32Decoder,
    exec: IntExecutor,
}

impl<H: Host> Vm<H> {
    pub fn new(program: &Program, cfg: VmConfig, host: H) -> Result<Self> {
        ensure!(
            cfg.initial_sp() <= cfg.memory_words,
            "stack top {} lies outside {} words of memory",
            cfg.initial_sp(),
            cfg.memory_words
        );
        let mut mem = LinearMemory::new(cfg.memory_words as usize);
        mem.load(&program.words)?;
        let mut cpu = Cpu::new(cfg);
        cpu.reset(program.entry);
        debug!(
            entry = program.entry,
            code_len = program.code_len,
            sp = cpu.sp(),
            "program loaded"
        );
        Ok(Self {
            cpu,
            mem,
            host,
            code_len: program.code_len,
            dec: Fasm32Decoder::new(),
            exec: IntExecutor,
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// True while the program counter is inside the assembled code.
    pub fn running(&self) -> bool {
        self.cpu.pc() < self.code_len
    }

    pub fn step(&mut self) -> Result<(), Trap> {
        self.cpu
            .step(&mut self.mem, &mut self.host, &self.dec, &self.exec)
    }

    pub fn run(&mut self) -> Outcome {
        let mut steps = 0u64;
        let outcome = loop {
            if !self.running() {
                break Outcome::Finished;
            }
            steps += 1;
            match self.step() {
                Ok(()) => {}
                Err(Trap::Halt { code }) => break Outcome::Halted { code },
                Err(Trap::Exit) => break Outcome::Exited,
                Err(fault) => break Outcome::Faulted(fault),
            }
        };
        if let Err(e) = self.host.flush() {
            warn!(error = %e, "flushing host output failed");
        }
        match &outcome {
            Outcome::Faulted(trap) => warn!(%trap, steps, "fault-halt"),
            other => info!(status = other.status(), steps, "program ended"),
        }
        outcome
    }
}
