//! Disassembler for the 8-bit machine.
//!
//! Converts machine-code images back to readable assembly.

use crate::cpu::decode::{decode, Instruction};

/// Disassemble a single 2-byte instruction to text.
pub fn disassemble_instruction(byte1: u8, byte2: u8) -> String {
    format_instruction(&decode(byte1, byte2))
}

/// Disassemble a whole machine-code image with addresses.
///
/// A trailing odd byte is listed as raw data.
pub fn disassemble(code: &[u8]) -> String {
    let mut output = String::new();

    let mut chunks = code.chunks_exact(2);
    for (i, pair) in chunks.by_ref().enumerate() {
        let addr = i * 2;
        let line = disassemble_instruction(pair[0], pair[1]);
        output.push_str(&format!(
            "{:03}: {:<12} ; {:02X} {:02X}\n",
            addr, line, pair[0], pair[1]
        ));
    }

    if let [byte] = chunks.remainder() {
        output.push_str(&format!("{:03}: .byte {}\n", code.len() - 1, byte));
    }

    output
}

/// Format a decoded instruction as assembly text.
fn format_instruction(instr: &Instruction) -> String {
    match *instr {
        Instruction::Nop => "NOP".to_string(),
        Instruction::Mov { rd, rs } => format!("MOV R{}, R{}", rd, rs),
        Instruction::Add { rd, rs } => format!("ADD R{}, R{}", rd, rs),
        Instruction::Sub { rd, rs } => format!("SUB R{}, R{}", rd, rs),
        Instruction::Ldi { rd, imm } => format!("LDI R{}, {}", rd, imm),
        Instruction::Ldr { rd, addr } => format!("LDR R{}, [{}]", rd, addr),
        Instruction::Str { rs, addr } => format!("STR R{}, [{}]", rs, addr),
        Instruction::Jmp { addr } => format!("JMP {}", addr),
        Instruction::Wait => "WAIT".to_string(),
        Instruction::Hlt => "HLT".to_string(),
        Instruction::Unknown { opcode } => format!("??? ; opcode {:#X}", opcode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::assembler::assemble;

    #[test]
    fn test_disassemble_hlt() {
        assert_eq!(disassemble_instruction(0xF0, 0), "HLT");
    }

    #[test]
    fn test_disassemble_operands() {
        assert_eq!(disassemble_instruction(0x39, 0), "ADD R2, R1");
        assert_eq!(disassemble_instruction(0x54, 99), "LDI R1, 99");
        assert_eq!(disassemble_instruction(0x60, 240), "LDR R0, [240]");
    }

    #[test]
    fn test_disassemble_unknown() {
        let text = disassemble_instruction(0x20, 0);
        assert!(text.contains("???"));
    }

    #[test]
    fn test_assemble_disassemble_agree() {
        let source = "LDI R0, 5\nADD R0, R1\nJMP 0\nHLT";
        let code = assemble(source).unwrap();
        let listing = disassemble(&code);

        for mnemonic in ["LDI R0, 5", "ADD R0, R1", "JMP 0", "HLT"] {
            assert!(listing.contains(mnemonic), "missing {:?} in {}", mnemonic, listing);
        }
    }

    #[test]
    fn test_trailing_odd_byte() {
        let listing = disassemble(&[0xF0, 0x00, 0x2A]);
        assert!(listing.contains(".byte 42"));
    }
}
