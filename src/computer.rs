//! Composition root: one CPU, one memory, one I/O channel, the assembler.
//!
//! [`Computer`] is the surface a front end drives: it assembles source,
//! loads machine code, steps or runs the CPU, feeds input, and exposes read
//! accessors over every piece of machine state. There is no partial reset;
//! [`Computer::new`] reconstructs the whole machine.

use crate::asm::{self, AssemblerError};
use crate::cpu::{Cpu, CpuState, Flags, Instruction, IoChannel, Memory};
use std::time::Duration;

/// A complete machine: CPU, 256-byte memory, attached I/O channel.
#[derive(Debug, Clone)]
pub struct Computer {
    cpu: Cpu,
}

impl Computer {
    /// Build a fresh machine: zeroed registers and memory, clear flags,
    /// empty I/O queues, running state.
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(Memory::with_io(IoChannel::new())),
        }
    }

    /// Assemble source text to machine code.
    pub fn assemble(&self, source: &str) -> Result<Vec<u8>, AssemblerError> {
        asm::assemble(source)
    }

    /// Load machine code sequentially from address 0, through the normal
    /// (possibly port-mapped) write path.
    pub fn load_program(&mut self, code: &[u8]) {
        self.cpu.mem.load(0, code);
    }

    /// Execute one instruction. Returns `None` once halted.
    pub fn step(&mut self) -> Option<Instruction> {
        self.cpu.step()
    }

    /// Run until halted, optionally sleeping between steps.
    ///
    /// The delay paces external observers only; it has no effect on the
    /// simulated semantics. A program that never reaches HLT keeps this
    /// loop alive; interleave [`Computer::run_limited`] or [`Computer::step`]
    /// with [`Computer::feed_input`] to drive WAIT-based programs.
    pub fn run(&mut self, delay: Option<Duration>) -> u64 {
        let start_cycles = self.cpu.cycles;

        while self.cpu.is_running() {
            self.cpu.step();
            if let Some(delay) = delay {
                std::thread::sleep(delay);
            }
        }

        self.cpu.cycles - start_cycles
    }

    /// Run for at most `max_cycles` instructions.
    pub fn run_limited(&mut self, max_cycles: u64) -> u64 {
        self.cpu.run_limited(max_cycles)
    }

    /// Queue input text for the machine to read from the input port.
    pub fn feed_input(&mut self, text: &str) {
        if let Some(io) = self.cpu.mem.io_mut() {
            io.feed(text);
        }
    }

    // ==================== Read accessors ====================

    /// The general-purpose registers R0-R3.
    pub fn registers(&self) -> [u8; 4] {
        self.cpu.regs.r
    }

    /// The program counter.
    pub fn pc(&self) -> u8 {
        self.cpu.regs.pc
    }

    /// The status flags.
    pub fn flags(&self) -> Flags {
        self.cpu.regs.flags
    }

    /// Whether the CPU has halted.
    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    /// The current execution state.
    pub fn state(&self) -> CpuState {
        self.cpu.state
    }

    /// Instructions executed so far.
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    /// The memory backing cells (non-popping view).
    pub fn memory(&self) -> &[u8] {
        self.cpu.mem.cells()
    }

    /// The emitted output bytes.
    pub fn output(&self) -> &[u8] {
        self.cpu.mem.io().map_or(&[], IoChannel::output)
    }

    /// The emitted output decoded as text (lossy).
    pub fn output_text(&self) -> String {
        self.output().iter().map(|&b| b as char).collect()
    }

    /// The underlying CPU, for drivers that need full state access.
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }
}

impl Default for Computer {
    fn default() -> Self {
        Self::new()
    }
}
