//! Octo Emulator - CLI Entry Point
//!
//! Commands:
//! - `octo-emu run <program>` - Assemble (if needed) and run a program
//! - `octo-emu asm <source>` - Assemble to a flat binary image
//! - `octo-emu disasm <image>` - Disassemble a binary image

use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "octo-emu")]
#[command(version = "0.1.0")]
#[command(about = "An emulator of a minimal 8-bit stored-program computer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it halts
    Run {
        /// Path to the .asm or .bin file to execute
        program: String,
        /// Maximum number of cycles to run (default: 10000)
        #[arg(short, long, default_value = "10000")]
        max_cycles: u64,
        /// Show a per-instruction trace
        #[arg(short, long)]
        trace: bool,
        /// Text to queue on the input port before running
        #[arg(short, long)]
        input: Option<String>,
        /// Print the final machine state as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Assemble source to a flat binary image
    Asm {
        /// Path to the source file
        source: String,
        /// Output image file (default: source with .bin extension)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Disassemble a binary image to readable text
    Disasm {
        /// Path to the image file
        image: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { program, max_cycles, trace, input, json } => {
            run_program(&program, max_cycles, trace, input.as_deref(), json);
        }
        Commands::Asm { source, output } => {
            assemble_file(&source, output);
        }
        Commands::Disasm { image } => {
            disassemble_file(&image);
        }
    }
}

/// Final machine state as reported by `run --json`.
#[derive(Serialize)]
struct StateReport {
    registers: [u8; 4],
    pc: u8,
    zero: bool,
    carry: bool,
    halted: bool,
    cycles: u64,
    output: Vec<u8>,
}

fn run_program(path: &str, max_cycles: u64, trace: bool, input: Option<&str>, json: bool) {
    use octo::Computer;
    use octo::asm::disassemble_instruction;
    use octo::cpu::decode::encode;

    let code = load_code(path);

    if code.is_empty() {
        eprintln!("❌ No instructions to execute");
        std::process::exit(1);
    }

    let mut computer = Computer::new();
    computer.load_program(&code);

    if let Some(text) = input {
        computer.feed_input(text);
    }

    println!("━━━ Execution ━━━");

    let mut cycles = 0u64;
    while !computer.is_halted() && cycles < max_cycles {
        let pc = computer.pc();

        match computer.step() {
            Some(instr) => {
                if trace {
                    let [byte1, byte2] = encode(&instr);
                    let flags = computer.flags();
                    println!(
                        "{:03}: {:<12} R={:?} Z={} C={}",
                        pc,
                        disassemble_instruction(byte1, byte2),
                        computer.registers(),
                        flags.zero as u8,
                        flags.carry as u8
                    );
                }
                cycles += 1;
            }
            None => break,
        }
    }

    println!();
    println!("━━━ Result ━━━");
    println!("Cycles: {}", cycles);
    println!("State: {:?}", computer.state());
    let regs = computer.registers();
    for (i, value) in regs.iter().enumerate() {
        println!("R{}: {:3} ({:08b})", i, value, value);
    }
    println!("PC: {}", computer.pc());
    let flags = computer.flags();
    println!("Flags: Z={} C={}", flags.zero as u8, flags.carry as u8);
    println!("Output: {:?}", computer.output());
    if !computer.output().is_empty() {
        println!("Output text: {}", computer.output_text());
    }

    if cycles >= max_cycles && !computer.is_halted() {
        println!();
        println!("⚠️  Reached max cycles limit ({}). Use --max-cycles to increase.", max_cycles);
    }

    if json {
        let report = StateReport {
            registers: regs,
            pc: computer.pc(),
            zero: flags.zero,
            carry: flags.carry,
            halted: computer.is_halted(),
            cycles: computer.cycles(),
            output: computer.output().to_vec(),
        };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to serialize state: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// Load a program: assemble `.asm` sources, read anything else as a raw image.
fn load_code(path: &str) -> Vec<u8> {
    use octo::assemble;

    if path.ends_with(".asm") {
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Failed to read file: {}", e);
                std::process::exit(1);
            }
        };

        match assemble(&source) {
            Ok(code) => {
                println!("📝 Assembled {} instructions", code.len() / 2);
                code
            }
            Err(e) => {
                eprintln!("❌ Assembly error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        match std::fs::read(path) {
            Ok(code) => {
                println!("📂 Loaded {} bytes", code.len());
                code
            }
            Err(e) => {
                eprintln!("❌ Failed to read image: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn assemble_file(source_path: &str, output: Option<String>) {
    use octo::assemble;

    let out_path = output.unwrap_or_else(|| source_path.replace(".asm", ".bin"));

    println!("📝 Assembling: {} → {}", source_path, out_path);

    let source = match std::fs::read_to_string(source_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Failed to read file: {}", e);
            std::process::exit(1);
        }
    };

    let code = match assemble(&source) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Assembly error: {}", e);
            std::process::exit(1);
        }
    };

    println!("✓ Assembled {} instructions", code.len() / 2);

    if let Err(e) = std::fs::write(&out_path, &code) {
        eprintln!("❌ Failed to write image: {}", e);
        std::process::exit(1);
    }

    println!("✓ Saved to {}", out_path);
}

fn disassemble_file(image_path: &str) {
    use octo::disassemble;

    println!("📖 Disassembling: {}", image_path);
    println!();

    let code = match std::fs::read(image_path) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Failed to read image: {}", e);
            std::process::exit(1);
        }
    };

    print!("{}", disassemble(&code));
}
