/*!
  The G-machine: a minimal virtual CPU with a word-addressed memory, a single-pass assembler
  and a big-endian binary format for programs.

  The pipeline is this:
  ```text
  text -> [`assemble_text`] -> `Word`s -> [`write_words`] -> binary file
                                 `Word`s -> [`GMachine::run_program`] -> output + machine state
  ```
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;
extern crate strum;
extern crate strum_macros;

pub mod bytecode;
pub mod error;
pub mod gmachine;
pub mod memory;
pub mod symboltable;

pub use bytecode::{
  assemble, assemble_data, assemble_file, assemble_file_to_binary, assemble_reader,
  assemble_text, disassemble, read_words, tokenize, write_words, Disassembled, Instruction,
  Operation, Token, Word
};
pub use error::{AssemblyError, CodecError, Error, ExecutionError};
pub use gmachine::{GMachine, Stop, DEFAULT_MEM_SIZE};
pub use memory::Memory;
pub use symboltable::{IO_OPERATIONS, IO_PORTS};
