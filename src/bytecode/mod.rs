/*!

  The VM uses a 64 bit word for everything: memory cells, registers, opcodes and operands.
  Memory is word addressed. There is no separate instruction format; an instruction is an
  opcode word followed by as many operand words as the opcode takes, and whether a word is an
  opcode, an operand or data is decided only by where the program counter happens to land.

  On disk, a program is its words in order, each as 8 big-endian bytes.

  One design decision that needed to be made is whether the run loop should consume operand
  words positionally or work on a decoded value. The operand count of each opcode lives in one
  place, `Operation::arity()`, and `Instruction::decode` uses it to pull operands into an enum
  variant that carries exactly the fields that opcode needs. The assembler, the disassembler
  and the machine all go through these two functions, so they cannot disagree about how wide
  an instruction is, and the machine's dispatch is an exhaustive match.

*/

mod assembly;
mod binary;
mod disassembly;
pub mod instruction;

pub use assembly::{assemble, assemble_data, assemble_file, assemble_file_to_binary,
                   assemble_reader, assemble_text, tokenize, Token};
pub use binary::{read_words, write_words, Word, WORD_SIZE};
pub use disassembly::{decode_at, disassemble, disassemble_to_text, Disassembled};
pub use instruction::{Instruction, Operation, INSTRUCTION_TABLE};
