use bimap::BiMap;

use crate::bytecode::Word;

/**
  A symbol table maps the predefined constant names usable as operands in assembly source to
  their word values. It is really just a convenience wrapper around a BiMap, so that the
  disassembler can recover a name from a value.

  Names are stored uppercase. The names of different tables overlap in value (`WRITE` and
  `STDIN` are both 0), which is why each family of constants gets its own table.
*/
pub struct SymbolTable {
  table: BiMap<&'static str, Word>,
  /// Alternative spellings, resolved to the canonical name before lookup.
  aliases: &'static [(&'static str, &'static str)]
}

impl SymbolTable {

  pub fn new(entries: &[(&'static str, Word)]) -> SymbolTable {
    SymbolTable {
      table: entries.iter().copied().collect(),
      aliases: &[]
    }
  }

  pub fn with_aliases(mut self, aliases: &'static [(&'static str, &'static str)]) -> SymbolTable {
    self.aliases = aliases;
    self
  }

  /// Case-insensitive lookup of a constant by name or alias.
  pub fn value_of(&self, name: &str) -> Option<Word> {
    let name = name.to_ascii_uppercase();
    let name = self.aliases
                   .iter()
                   .find(|(alias, _)| *alias == name)
                   .map_or(name.as_str(), |(_, canonical)| *canonical);
    self.table.get_by_left(name).copied()
  }

  /// The canonical name of a value, if it has one.
  pub fn name_of(&self, value: Word) -> Option<&'static str> {
    self.table.get_by_right(&value).copied()
  }

  pub fn len(&self) -> usize {
    self.table.len()
  }

  pub fn is_empty(&self) -> bool {
    self.table.is_empty()
  }
}

pub const IO_WRITE   : Word = 0;
pub const IO_READ    : Word = 1;

pub const PORT_STDIN : Word = 0;
pub const PORT_STDOUT: Word = 1;
pub const PORT_STDERR: Word = 2;

lazy_static! {
  /// The first operand of `BIOS`.
  pub static ref IO_OPERATIONS: SymbolTable =
    SymbolTable::new(&[("WRITE", IO_WRITE), ("READ", IO_READ)])
      .with_aliases(&[("IOWRITE", "WRITE"), ("IOREAD", "READ")]);

  /// The second operand of `BIOS`.
  pub static ref IO_PORTS: SymbolTable =
    SymbolTable::new(&[("STDIN", PORT_STDIN), ("STDOUT", PORT_STDOUT), ("STDERR", PORT_STDERR)]);
}

/// Resolves a name against every predefined constant table.
pub fn resolve_constant(name: &str) -> Option<Word> {
  IO_OPERATIONS.value_of(name)
               .or_else(|| IO_PORTS.value_of(name))
}
