//! Renders words back into assembly. Code and data are not distinguished in memory, so every
//! word that is a valid opcode with all of its operands present is shown as an instruction,
//! and everything else as a data word. Either way, assembling the output reproduces the input.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use crate::bytecode::{Instruction, Operation, Word};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Disassembled {
  Instruction {
    address: Word,
    instruction: Instruction
  },
  Data {
    address: Word,
    value: Word
  }
}

impl Disassembled {
  pub fn address(&self) -> Word {
    match self {
      | Disassembled::Instruction { address, .. }
      | Disassembled::Data { address, .. } => *address
    }
  }

  /// Size in words.
  pub fn size(&self) -> usize {
    match self {
      Disassembled::Instruction { instruction, .. } => instruction.size(),
      Disassembled::Data { .. }                     => 1
    }
  }
}

impl Display for Disassembled {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Disassembled::Instruction { instruction, .. } => write!(f, "{}", instruction),
      Disassembled::Data { value, .. }              => write!(f, "{}", value)
    }
  }
}

/// Decodes the instruction starting at `words[0]`, if there is a complete one.
pub fn decode_at(words: &[Word]) -> Option<Instruction> {
  let (first, rest) = words.split_first()?;
  let operation     = Operation::try_from(*first).ok()?;
  if rest.len() < operation.arity() {
    return None;
  }
  let mut operands = rest.iter().copied();
  // `fetch` is called exactly `arity()` times, which we just checked is in range.
  Some(Instruction::decode(operation, || operands.next().unwrap_or_default()))
}

pub fn disassemble(words: &[Word]) -> Vec<Disassembled> {
  let mut lines = Vec::new();
  let mut idx   = 0;

  while idx < words.len() {
    let address = idx as Word;
    let line = match decode_at(&words[idx..]) {
      Some(instruction) => Disassembled::Instruction { address, instruction },
      None              => Disassembled::Data { address, value: words[idx] }
    };
    idx += line.size();
    lines.push(line);
  }

  lines
}

/// The disassembly as source text, one line per instruction or data word.
pub fn disassemble_to_text(words: &[Word]) -> String {
  disassemble(words)
    .iter()
    .map(|line| format!("{}\n", line))
    .collect()
}
