//! A fixed-size word store. Any address outside the store is a fatal fault: the access panics
//! rather than returning an error, since the machine trusts the program it was given.

use std::convert::TryFrom;
use std::ops::{Index, IndexMut};

use crate::bytecode::Word;

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Memory {
  words: Vec<Word>
}

impl Memory {

  /// Allocates `size` zeroed words.
  pub fn new(size: usize) -> Memory {
    Memory {
      words: vec![0; size]
    }
  }

  pub fn len(&self) -> usize {
    self.words.len()
  }

  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }

  /// Converts an address to an index into the store, panicking if it is out of bounds.
  pub fn idx(&self, address: Word) -> usize {
    match usize::try_from(address) {
      Ok(idx) if idx < self.words.len() => idx,
      _ => panic!(
        "memory access out of bounds: address {} in a memory of {} words",
        address,
        self.words.len()
      )
    }
  }

  pub fn read(&self, address: Word) -> Word {
    self.words[self.idx(address)]
  }

  pub fn write(&mut self, address: Word, value: Word) {
    let idx = self.idx(address);
    self.words[idx] = value;
  }

  /// Copies `words` into the store starting at address 0. Words past the end of `words` keep
  /// their previous value.
  pub fn load(&mut self, words: &[Word]) {
    if words.len() > self.words.len() {
      panic!(
        "program of {} words does not fit in a memory of {} words",
        words.len(),
        self.words.len()
      );
    }
    self.words[..words.len()].copy_from_slice(words);
  }

  /// The number of words up to and including the last non-zero word.
  pub fn used(&self) -> usize {
    self.words
        .iter()
        .rposition(|word| *word != 0)
        .map_or(0, |last| last + 1)
  }

  pub fn as_slice(&self) -> &[Word] {
    &self.words
  }
}

impl Index<Word> for Memory {
  type Output = Word;

  fn index(&self, address: Word) -> &Word {
    &self.words[self.idx(address)]
  }
}

impl IndexMut<Word> for Memory {
  fn index_mut(&mut self, address: Word) -> &mut Word {
    let idx = self.idx(address);
    &mut self.words[idx]
  }
}
