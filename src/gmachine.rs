//! Structures and functions for the G-machine, a minimal word-addressed virtual CPU.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{self, BufReader, Read, Stderr, Stdout, Write};
use std::path::Path;

use prettytable::{format as TableFormat, Table};

use crate::bytecode::{decode_at, read_words, Instruction, Operation, Word};
use crate::error::{Error, ExecutionError};
use crate::memory::Memory;
use crate::symboltable::{IO_WRITE, PORT_STDOUT};

/// The number of words of memory allocated to a new machine by default.
pub const DEFAULT_MEM_SIZE: usize = 1024;

/// Why the run loop handed control back to the caller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stop {
  Halted,
  /// A `BREAK` was executed. The machine can be resumed.
  Break
}

/**
  The machine owns its registers, its memory and two output sinks. The sinks are any byte
  writers; by default they are the process's standard output and standard error, and tests
  substitute in-memory buffers.
*/
pub struct GMachine<O = Stdout, E = Stderr> {

  // Registers //
  a : Word, // Accumulator
  i : Word, // Index register, for indirect loads
  n : Word, // Link register, the return address of the last `CALL`
  p : Word, // Program counter

  // Flags
  flag_z : bool, // Set by comparisons, read by `JEQ`

  memory : Memory,

  stdout : O,
  stderr : E,
}

impl GMachine<Stdout, Stderr> {

  /// A machine with `DEFAULT_MEM_SIZE` words bound to the process's standard streams.
  pub fn new() -> Self {
    GMachine::with_memory_size(DEFAULT_MEM_SIZE)
  }

  pub fn with_memory_size(memory_size: usize) -> Self {
    GMachine::with_sinks(memory_size, io::stdout(), io::stderr())
  }
}

impl Default for GMachine<Stdout, Stderr> {
  fn default() -> Self {
    GMachine::new()
  }
}

impl<O, E> GMachine<O, E> {

  // region Construction and accessors

  pub fn with_sinks(memory_size: usize, stdout: O, stderr: E) -> Self {
    GMachine {
      a      : 0,
      i      : 0,
      n      : 0,
      p      : 0,
      flag_z : false,
      memory : Memory::new(memory_size),
      stdout,
      stderr,
    }
  }

  /// Replaces the standard output sink.
  pub fn with_stdout<T>(self, stdout: T) -> GMachine<T, E> {
    GMachine {
      a      : self.a,
      i      : self.i,
      n      : self.n,
      p      : self.p,
      flag_z : self.flag_z,
      memory : self.memory,
      stdout,
      stderr : self.stderr,
    }
  }

  /// Replaces the standard error sink.
  pub fn with_stderr<T>(self, stderr: T) -> GMachine<O, T> {
    GMachine {
      a      : self.a,
      i      : self.i,
      n      : self.n,
      p      : self.p,
      flag_z : self.flag_z,
      memory : self.memory,
      stdout : self.stdout,
      stderr,
    }
  }

  pub fn a(&self) -> Word {
    self.a
  }

  pub fn i(&self) -> Word {
    self.i
  }

  /// The link register.
  pub fn n(&self) -> Word {
    self.n
  }

  pub fn p(&self) -> Word {
    self.p
  }

  pub fn flag_z(&self) -> bool {
    self.flag_z
  }

  pub fn memory(&self) -> &Memory {
    &self.memory
  }

  pub fn memory_mut(&mut self) -> &mut Memory {
    &mut self.memory
  }

  pub fn stdout(&self) -> &O {
    &self.stdout
  }

  pub fn stderr(&self) -> &E {
    &self.stderr
  }

  pub fn into_sinks(self) -> (O, E) {
    (self.stdout, self.stderr)
  }

  /// The instruction at `P`, which is what the machine will execute next. `None` if `P` is
  /// out of bounds or does not point at a complete instruction.
  pub fn next_instruction(&self) -> Option<Instruction> {
    usize::try_from(self.p)
      .ok()
      .and_then(|p| self.memory.as_slice().get(p..))
      .and_then(decode_at)
  }

  // endregion

  // region Display methods

  fn make_memory_table<T>(
      name      : &str,
      registers : &[T],
      highlight : Option<usize>,
      start     : usize
    ) -> Table
    where T: Display
  {

    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    for (i, cell) in registers.iter().enumerate() {
      match Some(i) == highlight {

        true  => {
          table.add_row(
            row![r->format!("* --> {}[{}] =", name, i+start), format!("{}", cell)]
          );
        }

        false => {
          table.add_row(
            row![r->format!("{}[{}] =", name, i+start), format!("{}", cell)]
          );
        }

      } // end match on highlight
    } // end for
    table
  }

  fn make_flag_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Register", ubl->"Contents"]);
    table.add_row(row![r->"A =",     self.a]);
    table.add_row(row![r->"I =",     self.i]);
    table.add_row(row![r->"N =",     self.n]);
    table.add_row(row![r->"P =",     self.p]);
    table.add_row(row![r->"FlagZ =", self.flag_z]);
    table
  }

  // endregion

}

impl<O: Write, E: Write> GMachine<O, E> {

  // region Loading

  /**
    Copies `words` into memory starting at address 0 and runs from `P = 0` until `HALT`.
    Memory past the end of `words` is left as it was.
  */
  pub fn run_program(&mut self, words: &[Word]) -> Result<(), ExecutionError> {
    self.memory.load(words);
    self.p = 0;
    self.run()
  }

  pub fn run_program_from_reader<R: Read>(&mut self, reader: R) -> Result<(), Error> {
    let words = read_words(reader)?;
    self.run_program(&words)?;
    Ok(())
  }

  /// Loads and runs the binary program at `path`.
  pub fn execute_binary<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
    let file = File::open(path)?;
    self.run_program_from_reader(BufReader::new(file))
  }

  // endregion

  // region Run loop

  /// Runs from the current `P` until `HALT`. `BREAK` is ignored.
  pub fn run(&mut self) -> Result<(), ExecutionError> {
    loop {
      if let Some(Stop::Halted) = self.step()? {
        return self.stop();
      }
    }
  }

  /**
    Runs from the current `P` until `HALT` or `BREAK`. After a break, the machine's state and
    `next_instruction()` can be inspected, and calling this again resumes where it left off.
  */
  pub fn run_until_break(&mut self) -> Result<Stop, ExecutionError> {
    loop {
      if let Some(stop) = self.step()? {
        self.stop()?;
        return Ok(stop);
      }
    }
  }

  /// Executes exactly one instruction.
  pub fn step(&mut self) -> Result<Option<Stop>, ExecutionError> {
    #[cfg(feature = "trace_computation")] let address = self.p;

    let instruction = self.fetch()?;

    #[cfg(feature = "trace_computation")] eprintln!("{:>6}: {}", address, instruction);

    self.execute(instruction)
  }

  fn stop(&mut self) -> Result<(), ExecutionError> {
    #[cfg(feature = "trace_computation")] eprintln!("{}", self);

    self.stdout.flush()?;
    self.stderr.flush()?;
    Ok(())
  }

  /// Reads the word at `P` and advances `P`.
  fn next_word(&mut self) -> Word {
    let word = self.memory.read(self.p);
    self.p += 1;
    word
  }

  /// Reads the opcode at `P` and its operands, leaving `P` at the following instruction.
  fn fetch(&mut self) -> Result<Instruction, ExecutionError> {
    let address   = self.p;
    let word      = self.next_word();
    let operation = Operation::try_from(word)
                      .map_err(|_| ExecutionError::IllegalInstruction { address, word })?;
    Ok(Instruction::decode(operation, || self.next_word()))
  }

  fn execute(&mut self, instruction: Instruction) -> Result<Option<Stop>, ExecutionError> {
    match instruction {

      Instruction::Halt => return Ok(Some(Stop::Halted)),

      Instruction::Break => return Ok(Some(Stop::Break)),

      Instruction::Noop => {}

      Instruction::IncA => self.a = self.a.wrapping_add(1),

      Instruction::DecA => self.a = self.a.wrapping_sub(1),

      Instruction::IncI => self.i = self.i.wrapping_add(1),

      Instruction::SetA(value) => self.a = value,

      Instruction::SetI(value) => self.i = value,

      Instruction::SetAM => self.a = self.memory.read(self.i),

      Instruction::CmpA(value) => self.flag_z = self.a == value,

      Instruction::CmpI(value) => self.flag_z = self.i == value,

      // The operand has already been consumed, so not jumping falls through past it.
      Instruction::Jeq(address) => {
        if !self.flag_z {
          self.p = address;
        }
      }

      Instruction::Jump(address) => self.p = address,

      Instruction::Call(address) => {
        self.n = self.p;
        self.p = address;
      }

      Instruction::Retn => {
        self.p = self.n;
        self.n = 0;
      }

      Instruction::Bios { operation, port } => self.bios(operation, port)?,

    }

    Ok(None)
  }

  /// Writes the low byte of `A` to the sink selected by `port`. Reading is reserved.
  fn bios(&mut self, operation: Word, port: Word) -> io::Result<()> {
    if operation != IO_WRITE {
      return Ok(());
    }

    let byte = [self.a as u8];
    match port {
      PORT_STDOUT => self.stdout.write_all(&byte),
      _           => self.stderr.write_all(&byte),
    }
  }

  // endregion

}


lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

// Memory is shown up to the last non-zero word or `P`, whichever is further.
impl<O, E> Display for GMachine<O, E> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let p         = usize::try_from(self.p).ok();
    let shown     = p.map_or(0, |p| p.saturating_add(1))
                     .max(self.memory.used())
                     .min(self.memory.len());
    let m_table   = GMachine::<O, E>::make_memory_table(
                      "M", &self.memory.as_slice()[..shown], p, 0
                    );
    let r_table   = self.make_flag_table();

    let mut combined_table = table!([r_table, m_table]);

    combined_table.set_titles(row![ub->"Registers", ub->"Memory"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    let next = match self.next_instruction() {
      Some(instruction) => instruction.to_string(),
      None              => "-".to_string()
    };

    write!(f, "Next: {}\n{}", next, combined_table)
  }
}


#[cfg(test)]
mod tests {
  use std::io::Cursor;
  use std::thread;

  use super::*;
  use crate::bytecode::{assemble_text, write_words};

  type TestMachine = GMachine<Vec<u8>, Vec<u8>>;

  fn machine() -> TestMachine {
    GMachine::with_sinks(DEFAULT_MEM_SIZE, Vec::new(), Vec::new())
  }

  fn code(operation: Operation) -> Word {
    operation.code()
  }

  const HELLO_WORLD: &str = "
    JUMP 12
    72 101 108 108 111 87 111 114 108 100
    SETI 2
    SETA [I]
    BIOS IOWRITE STDOUT
    INCI
    CMPI 12
    JEQ 14
  ";

  const HELLO_WORLD_QUOTED: &str = "
    JUMP 12
    \"HelloWorld\"
    SETI 2
    SETA [I]
    BIOS WRITE STDOUT
    INCI
    CMPI 12
    JEQ 14
  ";

  // region Construction

  #[test]
  fn new_machine_is_zeroed() {
    let g = GMachine::new();
    assert_eq!(g.memory().len(), DEFAULT_MEM_SIZE);
    assert_eq!(g.memory()[(DEFAULT_MEM_SIZE - 1) as Word], 0);
    assert_eq!(g.a(), 0);
    assert_eq!(g.i(), 0);
    assert_eq!(g.n(), 0);
    assert_eq!(g.p(), 0);
    assert!(!g.flag_z());
  }

  #[test]
  fn memory_size_is_configurable() {
    let g = GMachine::with_memory_size(16);
    assert_eq!(g.memory().len(), 16);
  }

  // endregion

  // region Opcodes

  #[test]
  fn halt_alone_advances_p_only() {
    let mut g = machine();
    g.run().unwrap();
    assert_eq!(g.p(), 1);
    assert_eq!(g.a(), 0);
    assert_eq!(g.i(), 0);
    assert_eq!(g.n(), 0);
    assert!(!g.flag_z());
    assert!(g.stdout().is_empty());
  }

  #[test]
  fn noop() {
    let mut g = machine();
    g.memory_mut()[0] = code(Operation::Noop);
    g.run().unwrap();
    assert_eq!(g.p(), 2);
  }

  #[test]
  fn run_program_loads_from_zero() {
    let mut g = machine();
    g.run_program(&[code(Operation::Noop), code(Operation::Halt)]).unwrap();
    assert_eq!(g.p(), 2);
  }

  #[test]
  fn inca_and_deca() {
    let mut g = machine();
    g.memory_mut().load(&[
      code(Operation::IncA),
      code(Operation::IncA),
      code(Operation::IncA),
      code(Operation::DecA),
      code(Operation::DecA),
    ]);
    g.run().unwrap();
    assert_eq!(g.a(), 1);
  }

  #[test]
  fn deca_wraps() {
    let mut g = machine();
    g.memory_mut()[0] = code(Operation::DecA);
    g.run().unwrap();
    assert_eq!(g.a(), Word::MAX);
  }

  #[test]
  fn deca_from_a_preset_value() {
    let mut g = machine();
    g.a = 2;
    g.memory_mut()[0] = code(Operation::DecA);
    g.run().unwrap();
    assert_eq!(g.a(), 1);
  }

  #[test]
  fn seta_then_subtract_two() {
    for &(value, want) in &[(3, 1), (200, 198), (2, 0), (0, Word::MAX - 1)] {
      let mut g = machine();
      g.memory_mut().load(&[code(Operation::SetA), value, code(Operation::DecA), code(Operation::DecA)]);
      g.run().unwrap();
      assert_eq!(g.a(), want, "SETA {}", value);
      assert_eq!(g.p(), 5, "SETA {}", value);
    }
  }

  #[test]
  fn seta() {
    let mut g = machine();
    g.memory_mut().load(&[code(Operation::SetA), 5]);
    g.run().unwrap();
    assert_eq!(g.a(), 5);
    assert_eq!(g.p(), 3);
  }

  #[test]
  fn index_register() {
    let mut g = machine();
    g.run_program(&assemble_text("SETI 7\nINCI\nCMPI 8").unwrap()).unwrap();
    assert_eq!(g.i(), 8);
    assert!(g.flag_z());
  }

  #[test]
  fn indirect_load_reads_through_i() {
    let mut g = machine();
    g.memory_mut()[100] = 42;
    g.run_program(&assemble_text("SETI 100\nSETA [I]").unwrap()).unwrap();
    assert_eq!(g.a(), 42);
  }

  #[test]
  fn jump() {
    let mut g = machine();
    g.memory_mut().load(&[
      code(Operation::IncA),
      code(Operation::Jump), 3,
      code(Operation::Jump), 6,
      code(Operation::DecA),
    ]);
    g.run().unwrap();
    assert_eq!(g.a(), 1);
    assert_eq!(g.p(), 7);
  }

  #[test]
  fn jeq_falls_through_when_flag_is_set() {
    let mut g = machine();
    g.memory_mut().load(&assemble_text("INCA\nCMPA 1\nJEQ 40").unwrap());
    for _ in 0..3 {
      assert_eq!(g.step().unwrap(), None);
    }
    assert!(g.flag_z());
    assert_eq!(g.p(), 5);
  }

  #[test]
  fn jeq_jumps_when_flag_is_clear() {
    let mut g = machine();
    g.memory_mut().load(&assemble_text("INCA\nCMPA 2\nJEQ 40").unwrap());
    for _ in 0..3 {
      g.step().unwrap();
    }
    assert!(!g.flag_z());
    assert_eq!(g.p(), 40);
  }

  #[test]
  fn call_and_return() {
    let mut g = machine();
    let words = assemble_text("
      INCA
      CALL 5
      INCA
      HALT
      # add_one:
      INCA
      RETN
    ").unwrap();
    g.memory_mut().load(&words);

    g.step().unwrap();
    g.step().unwrap();
    assert_eq!(g.n(), 3);
    assert_eq!(g.p(), 5);

    g.run().unwrap();
    assert_eq!(g.a(), 3);
    assert_eq!(g.p(), 5);
    assert_eq!(g.n(), 0);
  }

  #[test]
  fn bios_writes_to_stdout() {
    let mut g = machine();
    g.memory_mut().load(&[code(Operation::SetA), 'A' as Word, code(Operation::Bios), 0, 1]);
    g.run().unwrap();
    assert_eq!(g.stdout().as_slice(), b"A");
    assert!(g.stderr().is_empty());
    assert_eq!(g.p(), 6);
  }

  #[test]
  fn bios_writes_to_stderr() {
    let mut g = machine();
    g.memory_mut().load(&[code(Operation::SetA), 'A' as Word, code(Operation::Bios), 0, 2]);
    g.run().unwrap();
    assert_eq!(g.stderr().as_slice(), b"A");
    assert!(g.stdout().is_empty());
    assert_eq!(g.p(), 6);
  }

  #[test]
  fn bios_unknown_port_goes_to_stderr() {
    let mut g = machine();
    g.run_program(&assemble_text("SETA 66\nBIOS WRITE 9\nBIOS WRITE STDIN").unwrap()).unwrap();
    assert_eq!(g.stderr().as_slice(), b"BB");
    assert!(g.stdout().is_empty());
  }

  #[test]
  fn bios_writes_only_the_low_byte() {
    let mut g = machine();
    g.run_program(&assemble_text("SETA 321\nBIOS WRITE STDOUT").unwrap()).unwrap();
    assert_eq!(g.stdout().as_slice(), &[(321 % 256) as u8]);
  }

  #[test]
  fn bios_read_is_a_noop() {
    let mut g = machine();
    g.run_program(&assemble_text("SETA 65\nBIOS READ STDIN\nINCA").unwrap()).unwrap();
    assert!(g.stdout().is_empty());
    assert!(g.stderr().is_empty());
    assert_eq!(g.a(), 66);
    assert_eq!(g.p(), 7);
  }

  // endregion

  // region Faults

  #[test]
  fn unknown_opcode_is_trapped() {
    let mut g = machine();
    g.memory_mut().load(&[code(Operation::IncA), 99]);
    match g.run() {
      Err(ExecutionError::IllegalInstruction { address, word }) => {
        assert_eq!(address, 1);
        assert_eq!(word, 99);
      }
      other => panic!("expected an illegal instruction, got {:?}", other),
    }
    assert_eq!(g.p(), 2);
    assert_eq!(g.a(), 1);
  }

  #[test]
  #[should_panic(expected = "out of bounds")]
  fn jumping_out_of_memory_faults() {
    let mut g = machine();
    g.run_program(&assemble_text("JUMP 5000").unwrap()).ok();
  }

  #[test]
  #[should_panic(expected = "out of bounds")]
  fn indirect_load_out_of_memory_faults() {
    let mut g = machine();
    g.run_program(&assemble_text("SETI 1024\nSETA [I]").unwrap()).ok();
  }

  #[test]
  #[should_panic(expected = "out of bounds")]
  fn running_off_the_end_faults() {
    let mut g: TestMachine = GMachine::with_sinks(3, Vec::new(), Vec::new());
    g.run_program(&[code(Operation::Noop), code(Operation::Noop), code(Operation::Noop)]).ok();
  }

  /// Refuses every write.
  struct BrokenSink;

  impl Write for BrokenSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
      Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
      Ok(())
    }
  }

  #[test]
  fn failed_sink_write_is_an_output_error() {
    let mut g = GMachine::with_sinks(16, BrokenSink, Vec::new());
    match g.run_program(&assemble_text("SETA 65\nBIOS WRITE STDOUT").unwrap()) {
      Err(ExecutionError::Output(error)) => assert_eq!(error.kind(), io::ErrorKind::BrokenPipe),
      other => panic!("expected an output error, got {:?}", other),
    }
    assert!(g.stderr().is_empty());
  }

  // endregion

  // region Breakpoints

  #[test]
  fn run_until_break_stops_and_resumes() {
    let mut g = machine();
    g.memory_mut().load(&assemble_text("INCA\nBREAK\nSETA 7\nBREAK\nHALT").unwrap());

    assert_eq!(g.run_until_break().unwrap(), Stop::Break);
    assert_eq!(g.a(), 1);
    assert_eq!(g.p(), 2);
    assert_eq!(g.next_instruction(), Some(Instruction::SetA(7)));

    assert_eq!(g.run_until_break().unwrap(), Stop::Break);
    assert_eq!(g.a(), 7);
    assert_eq!(g.next_instruction(), Some(Instruction::Halt));

    assert_eq!(g.run_until_break().unwrap(), Stop::Halted);
    assert_eq!(g.p(), 6);
  }

  #[test]
  fn demo_programs_run() {
    let mut g = machine();
    g.run_program(&assemble_text(include_str!("../demos/hello_world.gasm")).unwrap()).unwrap();
    assert_eq!(g.stdout().as_slice(), b"HelloWorld");

    let mut g = machine();
    g.memory_mut().load(&assemble_text(include_str!("../demos/call_and_break.gasm")).unwrap());
    assert_eq!(g.run_until_break().unwrap(), Stop::Break);
    assert_eq!(g.stderr().as_slice(), b"A");
    assert_eq!(g.next_instruction(), Some(Instruction::Call(8)));
    assert_eq!(g.run_until_break().unwrap(), Stop::Halted);
    assert_eq!(g.stderr().as_slice(), b"AB");
    assert_eq!(g.n(), 0);
  }

  #[test]
  fn run_ignores_break() {
    let mut g = machine();
    g.run_program(&assemble_text("INCA\nBREAK\nINCA").unwrap()).unwrap();
    assert_eq!(g.a(), 2);
  }

  // endregion

  // region Loading from binary and text

  #[test]
  fn run_program_from_reader() {
    // SETA 258
    // DECA
    let program = Cursor::new(vec![
      0u8, 0, 0, 0, 0, 0, 0, 4,
      0, 0, 0, 0, 0, 0, 1, 2,
      0, 0, 0, 0, 0, 0, 0, 3,
    ]);
    let mut g = machine();
    g.run_program_from_reader(program).unwrap();
    assert_eq!(g.a(), 257);
    assert_eq!(g.p(), 4);
  }

  #[test]
  fn run_program_from_reader_rejects_partial_words() {
    let mut g = machine();
    match g.run_program_from_reader(Cursor::new(vec![0u8; 12])) {
      Err(Error::Codec(_)) => {}
      other => panic!("expected a codec error, got {:?}", other),
    }
  }

  #[test]
  fn execute_binary() {
    let dir  = tempfile::tempdir().unwrap();
    let path = dir.path().join("setadeca.gbin");
    let file = File::create(&path).unwrap();
    write_words(file, &assemble_text("SETA 5\nDECA\nDECA").unwrap()).unwrap();

    let mut g = machine();
    g.execute_binary(&path).unwrap();
    assert_eq!(g.a(), 3);
    assert_eq!(g.p(), 5);
  }

  #[test]
  fn assembled_write_to_stdout() {
    let mut g = machine();
    g.run_program(&assemble_text("SETA 65\nBIOS WRITE STDOUT").unwrap()).unwrap();
    assert_eq!(g.stdout().as_slice(), b"A");
    assert!(g.stderr().is_empty());
  }

  #[test]
  fn hello_world() {
    let mut g = machine();
    g.run_program(&assemble_text(HELLO_WORLD).unwrap()).unwrap();
    assert_eq!(String::from_utf8_lossy(g.stdout()), "HelloWorld");
  }

  #[test]
  fn hello_world_from_a_quoted_literal() {
    let mut g = machine();
    g.run_program(&assemble_text(HELLO_WORLD_QUOTED).unwrap()).unwrap();
    let (stdout, stderr) = g.into_sinks();
    assert_eq!(stdout, b"HelloWorld");
    assert!(stderr.is_empty());
  }

  #[test]
  fn independent_machines_run_in_parallel() {
    let words = assemble_text(HELLO_WORLD_QUOTED).unwrap();
    let handles: Vec<_> = (0..4)
      .map(|_| {
        let words = words.clone();
        thread::spawn(move || {
          let mut g = machine();
          g.run_program(&words).unwrap();
          g.into_sinks().0
        })
      })
      .collect();

    for handle in handles {
      assert_eq!(handle.join().unwrap(), b"HelloWorld");
    }
  }

  // endregion

  #[test]
  fn sinks_can_be_swapped() {
    let g = GMachine::new().with_stdout(Vec::new()).with_stderr(Vec::new());
    let mut g: TestMachine = g;
    g.run_program(&assemble_text("SETA 90\nBIOS WRITE STDOUT").unwrap()).unwrap();
    assert_eq!(g.stdout().as_slice(), b"Z");
  }

  #[test]
  fn display_survives_p_at_the_top_of_the_address_space() {
    let mut g = machine();
    g.memory_mut().load(&assemble_text("JUMP 18446744073709551615").unwrap());
    g.step().unwrap();
    assert_eq!(g.p(), Word::MAX);
    let text = g.to_string();
    assert!(text.starts_with("Next: -"));
    assert!(text.contains("M[2]"));
  }

  #[test]
  fn display_shows_registers_and_highlights_p() {
    let mut g = machine();
    g.run_program(&assemble_text("SETA 5").unwrap()).unwrap();
    let text = g.to_string();
    assert!(text.contains("FlagZ"));
    assert!(text.contains("* --> M[3]"));
    assert!(text.starts_with("Next: HALT"));
  }
}
