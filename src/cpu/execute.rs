//! CPU execution engine.
//!
//! Implements the fetch-decode-execute cycle. One [`Cpu::step`] is one full
//! cycle: fetch both instruction bytes through the (possibly port-mapped)
//! read path, pre-advance the program counter by 2, decode, dispatch.
//! Control-flow instructions account for the pre-advance: JMP overrides the
//! counter outright and WAIT rewinds it to spin in place.
//!
//! Execution never fails. Unknown opcodes are no-ops and every address and
//! register index is in range by construction of the bit fields.

use crate::cpu::Memory;
use crate::cpu::decode::{self, Instruction};
use crate::cpu::registers::Registers;
use serde::{Serialize, Deserialize};

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// CPU is running normally.
    Running,
    /// CPU has executed HLT. Terminal; no instruction clears it.
    Halted,
}

/// The CPU: register file, memory, and execution state.
#[derive(Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// CPU registers and flags.
    pub regs: Registers,
    /// Main memory with its attached I/O channel.
    pub mem: Memory,
    /// Current execution state.
    pub state: CpuState,
    /// Instruction count (for profiling).
    pub cycles: u64,
    /// Last executed instruction (for debugging).
    last_instr: Option<Instruction>,
}

impl Cpu {
    /// Create a CPU with zeroed registers and the given memory.
    pub fn new(mem: Memory) -> Self {
        Self {
            regs: Registers::new(),
            mem,
            state: CpuState::Running,
            cycles: 0,
            last_instr: None,
        }
    }

    /// Reset the CPU to initial state, clearing memory as well.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.state = CpuState::Running;
        self.cycles = 0;
        self.last_instr = None;
    }

    /// Execute a single instruction.
    ///
    /// Returns the decoded instruction, or `None` if the CPU is halted.
    pub fn step(&mut self) -> Option<Instruction> {
        if self.state != CpuState::Running {
            return None;
        }

        // Fetch both bytes through the normal read path
        let pc = self.regs.pc;
        let byte1 = self.mem.read(pc);
        let operand = self.mem.read(pc.wrapping_add(1));

        // Advance PC before dispatch (jumps and WAIT will override)
        self.regs.advance_pc();

        let instr = decode::decode(byte1, operand);
        self.execute(instr);

        self.cycles += 1;
        self.last_instr = Some(instr);

        Some(instr)
    }

    /// Run until halted.
    ///
    /// Returns the number of instructions executed. A program that never
    /// reaches HLT keeps this loop alive; see [`Cpu::run_limited`] for the
    /// bounded variant.
    pub fn run(&mut self) -> u64 {
        let start_cycles = self.cycles;

        while self.state == CpuState::Running {
            self.step();
        }

        self.cycles - start_cycles
    }

    /// Run for at most `max_cycles` instructions.
    pub fn run_limited(&mut self, max_cycles: u64) -> u64 {
        let start_cycles = self.cycles;
        let limit = self.cycles + max_cycles;

        while self.state == CpuState::Running && self.cycles < limit {
            self.step();
        }

        self.cycles - start_cycles
    }

    /// Execute a decoded instruction.
    fn execute(&mut self, instr: Instruction) {
        match instr {
            Instruction::Nop | Instruction::Unknown { .. } => {}

            Instruction::Mov { rd, rs } => {
                let value = self.regs.get(rs);
                self.regs.set(rd, value);
            }

            Instruction::Add { rd, rs } => {
                let (result, carry) = self.regs.get(rd).overflowing_add(self.regs.get(rs));
                self.regs.flags.carry = carry;
                self.regs.set(rd, result);
                self.regs.set_zero_from(result);
            }

            Instruction::Sub { rd, rs } => {
                // Carry doubles as the borrow flag
                let (result, borrow) = self.regs.get(rd).overflowing_sub(self.regs.get(rs));
                self.regs.flags.carry = borrow;
                self.regs.set(rd, result);
                self.regs.set_zero_from(result);
            }

            Instruction::Ldi { rd, imm } => {
                self.regs.set(rd, imm);
                self.regs.set_zero_from(imm);
            }

            Instruction::Ldr { rd, addr } => {
                let value = self.mem.read(addr);
                self.regs.set(rd, value);
                self.regs.set_zero_from(value);
            }

            Instruction::Str { rs, addr } => {
                let value = self.regs.get(rs);
                self.mem.write(addr, value);
            }

            Instruction::Jmp { addr } => {
                self.regs.jump(addr);
            }

            Instruction::Wait => {
                // No input: land back on this instruction and retry next step
                if !self.mem.has_input() {
                    self.regs.rewind_pc();
                }
            }

            Instruction::Hlt => {
                self.state = CpuState::Halted;
            }
        }
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    /// Check if the CPU is halted.
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Check if the CPU is running.
    pub fn is_running(&self) -> bool {
        self.state == CpuState::Running
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new(Memory::new())
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .finish()
    }
}
