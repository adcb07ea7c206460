use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use strum::IntoEnumIterator;
use strum_macros::{Display as StrumDisplay, EnumIter, IntoStaticStr};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::bytecode::Word;
use crate::symboltable::{IO_OPERATIONS, IO_PORTS};

/// The operand token selecting indirect addressing through the index register.
pub const INDIRECT_MARKER: &str = "[I]";

/**
  Opcodes of the virtual machine.

  The discriminant of each variant is the word value of the opcode in memory, so the order the
  opcodes are listed below is significant: reordering them changes the binary format.
  Order-dependencies:
      ```
      Operation::arity()
      binary programs written by earlier builds
      ```
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumIter, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,       PartialEq,        Debug,         Hash
)]
#[strum(serialize_all = "UPPERCASE")]
#[repr(u64)]
pub enum Operation {
  Halt,   // halt
  Noop,   // noop
  IncA,   // inca
  DecA,   // deca
  SetA,   // seta( value )
  Bios,   // bios( operation, port )
  CmpA,   // cmpa( value )
  Jeq,    // jeq( address )
  Jump,   // jump( address )
  Call,   // call( address )
  Retn,   // retn
  IncI,   // inci
  CmpI,   // cmpi( value )
  SetI,   // seti( value )
  // Opcode 14

  // Not a mnemonic. Written as `SETA [I]`.
  SetAM,  // seta( [I] )
  Break,  // break
}

impl Operation {
  pub fn code(&self) -> Word {
    Into::<Word>::into(*self)
  }

  /// The number of operand words that follow the opcode in memory.
  pub fn arity(&self) -> usize {
    match self {
      Operation::Bios => 2,

      | Operation::SetA
      | Operation::CmpA
      | Operation::Jeq
      | Operation::Jump
      | Operation::Call
      | Operation::CmpI
      | Operation::SetI => 1,

      | Operation::Halt
      | Operation::Noop
      | Operation::IncA
      | Operation::DecA
      | Operation::Retn
      | Operation::IncI
      | Operation::SetAM
      | Operation::Break => 0,
    }
  }

  /// The variant of this opcode that takes `[I]` in place of its first operand, if any.
  pub fn indirect(&self) -> Option<Operation> {
    match self {
      Operation::SetA => Some(Operation::SetAM),
      _               => None
    }
  }

  /// Whether the opcode can be written by name in assembly source.
  pub fn is_mnemonic(&self) -> bool {
    *self != Operation::SetAM
  }

  /// Case-insensitive lookup in the instruction table.
  pub fn from_mnemonic(name: &str) -> Option<Operation> {
    INSTRUCTION_TABLE.get(name.to_ascii_uppercase().as_str()).copied()
  }
}

lazy_static! {
  /// Mnemonic to opcode. The operand count travels with the `Operation` via `arity()`.
  pub static ref INSTRUCTION_TABLE: HashMap<&'static str, Operation> =
    Operation::iter()
      .filter(Operation::is_mnemonic)
      .map(|operation| (operation.into(), operation))
      .collect();
}

/// A decoded instruction: the opcode together with exactly the operands it takes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  Halt,
  Noop,
  IncA,
  DecA,
  SetA(Word),
  Bios {
    operation: Word,
    port: Word
  },
  CmpA(Word),
  Jeq(Word),
  Jump(Word),
  Call(Word),
  Retn,
  IncI,
  CmpI(Word),
  SetI(Word),
  SetAM,
  Break,
}

impl Instruction {

  /**
    Builds the instruction for `operation`, pulling its operands from `fetch` in order.
    `fetch` is called exactly `operation.arity()` times.
  */
  pub fn decode<F>(operation: Operation, mut fetch: F) -> Instruction
    where F: FnMut() -> Word
  {
    match operation {
      Operation::Halt  => Instruction::Halt,
      Operation::Noop  => Instruction::Noop,
      Operation::IncA  => Instruction::IncA,
      Operation::DecA  => Instruction::DecA,
      Operation::SetA  => Instruction::SetA(fetch()),
      Operation::Bios  => {
        let operation = fetch();
        let port      = fetch();
        Instruction::Bios { operation, port }
      }
      Operation::CmpA  => Instruction::CmpA(fetch()),
      Operation::Jeq   => Instruction::Jeq(fetch()),
      Operation::Jump  => Instruction::Jump(fetch()),
      Operation::Call  => Instruction::Call(fetch()),
      Operation::Retn  => Instruction::Retn,
      Operation::IncI  => Instruction::IncI,
      Operation::CmpI  => Instruction::CmpI(fetch()),
      Operation::SetI  => Instruction::SetI(fetch()),
      Operation::SetAM => Instruction::SetAM,
      Operation::Break => Instruction::Break,
    }
  }

  pub fn operation(&self) -> Operation {
    match self {
      Instruction::Halt        => Operation::Halt,
      Instruction::Noop        => Operation::Noop,
      Instruction::IncA        => Operation::IncA,
      Instruction::DecA        => Operation::DecA,
      Instruction::SetA(_)     => Operation::SetA,
      Instruction::Bios { .. } => Operation::Bios,
      Instruction::CmpA(_)     => Operation::CmpA,
      Instruction::Jeq(_)      => Operation::Jeq,
      Instruction::Jump(_)     => Operation::Jump,
      Instruction::Call(_)     => Operation::Call,
      Instruction::Retn        => Operation::Retn,
      Instruction::IncI        => Operation::IncI,
      Instruction::CmpI(_)     => Operation::CmpI,
      Instruction::SetI(_)     => Operation::SetI,
      Instruction::SetAM       => Operation::SetAM,
      Instruction::Break       => Operation::Break,
    }
  }

  /// The operand words, in memory order.
  pub fn operands(&self) -> Vec<Word> {
    match *self {
      Instruction::Bios { operation, port } => vec![operation, port],

      | Instruction::SetA(value)
      | Instruction::CmpA(value)
      | Instruction::Jeq(value)
      | Instruction::Jump(value)
      | Instruction::Call(value)
      | Instruction::CmpI(value)
      | Instruction::SetI(value) => vec![value],

      _ => vec![]
    }
  }

  /// Size in words, including the opcode.
  pub fn size(&self) -> usize {
    1 + self.operation().arity()
  }

  /// The words this instruction occupies in memory.
  pub fn encode(&self) -> Vec<Word> {
    let mut words = Vec::with_capacity(self.size());
    words.push(self.operation().code());
    words.extend(self.operands());
    words
  }
}

/// Prints the instruction in assembly syntax, so that the text assembles back to `encode()`.
impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {

      Instruction::SetAM => {
        write!(f, "{} {}", Operation::SetA, INDIRECT_MARKER)
      }

      Instruction::Bios { operation, port } => {
        let operation_text = IO_OPERATIONS.name_of(*operation)
                                          .map(str::to_string)
                                          .unwrap_or_else(|| operation.to_string());
        let port_text      = IO_PORTS.name_of(*port)
                                     .map(str::to_string)
                                     .unwrap_or_else(|| port.to_string());
        write!(f, "{} {} {}", Operation::Bios, operation_text, port_text)
      }

      instruction => {
        write!(f, "{}", instruction.operation())?;
        for operand in instruction.operands() {
          write!(f, " {}", operand)?;
        }
        Ok(())
      }

    }
  }
}
