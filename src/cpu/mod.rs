//! CPU emulation for the 8-bit machine.
//!
//! This module implements the complete architecture:
//! - 256 byte memory cells with two memory-mapped I/O ports
//! - 4 general-purpose registers, program counter, zero/carry flags
//! - 10-instruction set with fixed 2-byte encoding

pub mod memory;
pub mod io;
pub mod registers;
pub mod decode;
pub mod execute;

pub use memory::{Memory, MEMORY_SIZE, INPUT_PORT, OUTPUT_PORT};
pub use io::IoChannel;
pub use registers::{Registers, Flags};
pub use decode::Instruction;
pub use execute::{Cpu, CpuState};
