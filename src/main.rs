use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use gmachine::{assemble_file_to_binary, disassemble, read_words, Disassembled, Error, GMachine,
               DEFAULT_MEM_SIZE};

#[derive(Parser, Debug)]
#[command(author, version, about = "Assembler and virtual machine for the G-machine")]
struct Opts {
  #[command(subcommand)]
  command: Command
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Assemble a source file into a binary word file
  Assemble {
    source: PathBuf,
    /// Output path (defaults to the source path with a `.gbin` extension)
    #[arg(short, long)]
    output: Option<PathBuf>
  },
  /// Load a binary word file at address 0 and run it until HALT
  Run {
    binary: PathBuf,
    /// Memory size in words
    #[arg(long, default_value_t = DEFAULT_MEM_SIZE)]
    memory: usize,
    /// Print the final machine state to stderr
    #[arg(long)]
    dump: bool
  },
  /// Print a binary word file as assembly text
  Disasm {
    binary: PathBuf
  }
}

fn main() -> ExitCode {
  // clap exits with status 2 on usage errors.
  let opts = Opts::parse();

  match dispatch(opts.command) {
    Ok(())     => ExitCode::SUCCESS,
    Err(error) => {
      eprintln!("error: {}", error);
      ExitCode::from(1)
    }
  }
}

fn dispatch(command: Command) -> Result<(), Error> {
  match command {

    Command::Assemble { source, output } => {
      let output = output.unwrap_or_else(|| source.with_extension("gbin"));
      assemble_file_to_binary(&source, &output)
    }

    Command::Run { binary, memory, dump } => {
      let mut machine = GMachine::with_memory_size(memory);
      let result      = machine.execute_binary(&binary);
      if dump {
        eprintln!("{}", machine);
      }
      result
    }

    Command::Disasm { binary } => {
      let words = read_words(File::open(&binary)?)?;
      // Addresses go in trailing comments so the listing assembles back to the same words.
      for line in disassemble(&words) {
        let kind = match line {
          Disassembled::Instruction { .. } => "",
          Disassembled::Data { .. }        => " data"
        };
        println!("{:<24} # {}{}", line.to_string(), line.address(), kind);
      }
      Ok(())
    }

  }
}
