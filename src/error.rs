//! Error types for assembly, the binary word codec and execution. Out-of-bounds memory access
//! is not represented here; it is a fatal fault (see `crate::memory`).

use std::io;

use thiserror::Error;

use crate::bytecode::{Operation, Word};

/// Errors produced while translating tokens into words. Assembly stops at the first error.
/// `position` is the index of the offending token in the token stream and `line` is the
/// 1-based source line it came from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
  #[error("line {line}: {operation} requires {expected} operand(s) but the source ended after {found}")]
  MissingOperand {
    operation: Operation,
    expected: usize,
    found: usize,
    position: usize,
    line: usize,
  },

  #[error("line {line}: cannot resolve operand {token:?} of {operation} at position {position}")]
  UnresolvedOperand {
    operation: Operation,
    token: String,
    position: usize,
    line: usize,
  },

  #[error("line {line}: invalid data literal {token:?} at position {position}")]
  InvalidData {
    token: String,
    position: usize,
    line: usize,
  },

  #[error("line {line}: {operation} has no indirect form, but was given {token} at position {position}")]
  NoIndirectForm {
    operation: Operation,
    token: String,
    position: usize,
    line: usize,
  },
}

impl AssemblyError {
  /// The index of the offending token in the token stream.
  pub fn position(&self) -> usize {
    match self {
      | AssemblyError::MissingOperand { position, .. }
      | AssemblyError::UnresolvedOperand { position, .. }
      | AssemblyError::InvalidData { position, .. }
      | AssemblyError::NoIndirectForm { position, .. } => *position,
    }
  }

  pub fn line(&self) -> usize {
    match self {
      | AssemblyError::MissingOperand { line, .. }
      | AssemblyError::UnresolvedOperand { line, .. }
      | AssemblyError::InvalidData { line, .. }
      | AssemblyError::NoIndirectForm { line, .. } => *line,
    }
  }
}

#[derive(Error, Debug)]
pub enum CodecError {
  #[error("i/o error: {0}")]
  Io(#[from] io::Error),

  /// The stream did not end on a word boundary.
  #[error("stream ends with {trailing} byte(s) that do not form a whole word")]
  Framing { trailing: usize },
}

/// Recoverable conditions that stop the run loop.
#[derive(Error, Debug)]
pub enum ExecutionError {
  #[error("illegal instruction {word} at address {address}")]
  IllegalInstruction { address: Word, word: Word },

  #[error("failed to write to output sink: {0}")]
  Output(#[from] io::Error),
}

/// Umbrella error for the file-level entry points.
#[derive(Error, Debug)]
pub enum Error {
  #[error(transparent)]
  Io(#[from] io::Error),

  #[error(transparent)]
  Assembly(#[from] AssemblyError),

  #[error(transparent)]
  Codec(#[from] CodecError),

  #[error(transparent)]
  Execution(#[from] ExecutionError),
}
