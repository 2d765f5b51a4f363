//! Assembler for the 8-bit machine.
//!
//! Syntax:
//! ```text
//! ; Comment
//! LDI R0, 5       ; R0 = 5
//! LDI R1, 3
//! ADD R0, R1      ; R0 += R1, sets Z/C
//! STR R0, [16]    ; mem[16] = R0 (brackets optional)
//! JMP 0
//! WAIT            ; spin until input queued
//! HLT
//! ```
//!
//! One source line is one 2-byte instruction; addresses are implicit
//! (instruction N occupies bytes 2N and 2N+1). Commas count as whitespace,
//! mnemonics and register names are case-insensitive, numeric operands are
//! decimal and masked to a byte. Assembly is all-or-nothing: the first
//! malformed line aborts with no partial output.

use crate::cpu::decode::{Instruction, encode};
use thiserror::Error;

/// Assemble source text to a flat machine-code image.
pub fn assemble(source: &str) -> Result<Vec<u8>, AssemblerError> {
    let mut output = Vec::new();

    for (line_num, line) in source.lines().enumerate() {
        if let Some(instr) = parse_line(line, line_num + 1)? {
            output.extend_from_slice(&encode(&instr));
        }
    }

    Ok(output)
}

/// Parse one source line. Returns `None` for blank and comment lines.
fn parse_line(line: &str, line_num: usize) -> Result<Option<Instruction>, AssemblerError> {
    let line = line.trim();

    // Skip empty lines and comments
    if line.is_empty() || line.starts_with(';') {
        return Ok(None);
    }

    // Remove inline comments
    let line = match line.find(';') {
        Some(idx) => line[..idx].trim(),
        None => line,
    };

    if line.is_empty() {
        return Ok(None);
    }

    // Commas are token separators, nothing more
    let cleaned = line.replace(',', " ");
    let mut tokens = cleaned.split_whitespace();

    let Some(first) = tokens.next() else {
        return Ok(None);
    };
    let mnemonic = first.to_uppercase();

    let mut next_operand = || {
        tokens.next().ok_or_else(|| AssemblerError::MissingOperand {
            line: line_num,
            mnemonic: mnemonic.clone(),
        })
    };

    let instr = match mnemonic.as_str() {
        "NOP" => Instruction::Nop,
        "MOV" => {
            let rd = parse_register(next_operand()?, line_num)?;
            let rs = parse_register(next_operand()?, line_num)?;
            Instruction::Mov { rd, rs }
        }
        "ADD" => {
            let rd = parse_register(next_operand()?, line_num)?;
            let rs = parse_register(next_operand()?, line_num)?;
            Instruction::Add { rd, rs }
        }
        "SUB" => {
            let rd = parse_register(next_operand()?, line_num)?;
            let rs = parse_register(next_operand()?, line_num)?;
            Instruction::Sub { rd, rs }
        }
        "LDI" => {
            let rd = parse_register(next_operand()?, line_num)?;
            let imm = parse_byte(next_operand()?, line_num)?;
            Instruction::Ldi { rd, imm }
        }
        "LDR" => {
            let rd = parse_register(next_operand()?, line_num)?;
            let addr = parse_byte(next_operand()?, line_num)?;
            Instruction::Ldr { rd, addr }
        }
        "STR" => {
            let rs = parse_register(next_operand()?, line_num)?;
            let addr = parse_byte(next_operand()?, line_num)?;
            Instruction::Str { rs, addr }
        }
        "JMP" => {
            let addr = parse_byte(next_operand()?, line_num)?;
            Instruction::Jmp { addr }
        }
        "WAIT" => Instruction::Wait,
        "HLT" => Instruction::Hlt,

        _ => {
            return Err(AssemblerError::UnknownMnemonic {
                line: line_num,
                mnemonic: mnemonic.clone(),
            })
        }
    };

    Ok(Some(instr))
}

/// Resolve a register name `R0`-`R3` to its index.
fn parse_register(token: &str, line_num: usize) -> Result<u8, AssemblerError> {
    match token.to_uppercase().as_str() {
        "R0" => Ok(0),
        "R1" => Ok(1),
        "R2" => Ok(2),
        "R3" => Ok(3),
        _ => Err(AssemblerError::UnknownRegister {
            line: line_num,
            register: token.to_string(),
        }),
    }
}

/// Parse a decimal operand, masked to a byte. Surrounding brackets on
/// address operands (`[16]`) are tolerated.
fn parse_byte(token: &str, line_num: usize) -> Result<u8, AssemblerError> {
    let digits = token.trim_matches(|c| c == '[' || c == ']');

    digits
        .parse::<i64>()
        .map(|value| (value & 0xFF) as u8)
        .map_err(|_| AssemblerError::InvalidOperand {
            line: line_num,
            operand: token.to_string(),
        })
}

/// Errors that abort assembly.
#[derive(Debug, Clone, Error)]
pub enum AssemblerError {
    #[error("unknown mnemonic on line {line}: {mnemonic}")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("unknown register on line {line}: {register}")]
    UnknownRegister { line: usize, register: String },

    #[error("malformed integer operand on line {line}: {operand}")]
    InvalidOperand { line: usize, operand: String },

    #[error("missing operand on line {line} for {mnemonic}")]
    MissingOperand { line: usize, mnemonic: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_simple() {
        let source = r#"
            ; Simple test program
            LDI R0, 5
            LDI R1, 3
            ADD R0, R1
            HLT
        "#;

        let code = assemble(source).unwrap();
        assert_eq!(code.len(), 8);
        assert_eq!(code[0], 0x50); // LDI R0
        assert_eq!(code[1], 5);
        assert_eq!(code[6], 0xF0); // HLT
        assert_eq!(code[7], 0);
    }

    #[test]
    fn test_instruction_encoding_layout() {
        // ADD R2, R1: opcode 0x3, rd 2, rs 1 -> 0b0011_10_01
        let code = assemble("ADD R2, R1").unwrap();
        assert_eq!(code, vec![0x39, 0x00]);
    }

    #[test]
    fn test_commas_and_case_are_flexible() {
        let a = assemble("mov r1 r0").unwrap();
        let b = assemble("MOV R1, R0").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bracketed_address() {
        let a = assemble("LDR R1, [16]").unwrap();
        let b = assemble("LDR R1, 16").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_inline_comment_stripped() {
        let code = assemble("HLT ; stop here").unwrap();
        assert_eq!(code, vec![0xF0, 0x00]);
    }

    #[test]
    fn test_operand_masked_to_byte() {
        let code = assemble("LDI R0, 300").unwrap();
        assert_eq!(code[1], 300u16 as u8);
    }

    #[test]
    fn test_unknown_mnemonic_fails() {
        let err = assemble("FOO R0, R1").unwrap_err();
        assert!(matches!(err, AssemblerError::UnknownMnemonic { line: 1, .. }));
    }

    #[test]
    fn test_unknown_register_fails() {
        let err = assemble("MOV R0, R7").unwrap_err();
        assert!(matches!(err, AssemblerError::UnknownRegister { line: 1, .. }));
    }

    #[test]
    fn test_malformed_integer_fails() {
        let err = assemble("JMP banana").unwrap_err();
        assert!(matches!(err, AssemblerError::InvalidOperand { line: 1, .. }));
    }

    #[test]
    fn test_missing_operand_fails() {
        let err = assemble("LDI R0").unwrap_err();
        assert!(matches!(err, AssemblerError::MissingOperand { line: 1, .. }));
    }

    #[test]
    fn test_failure_is_all_or_nothing() {
        let source = "LDI R0, 5\nFOO\nHLT";
        assert!(assemble(source).is_err());
    }

    #[test]
    fn test_error_reports_offending_line() {
        let source = "LDI R0, 5\n\n; comment\nFOO";
        let err = assemble(source).unwrap_err();
        assert!(matches!(err, AssemblerError::UnknownMnemonic { line: 4, .. }));
    }
}
