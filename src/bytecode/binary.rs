/*!
  This module is responsible for the encoding and decoding of binary programs: a flat sequence
  of 8-byte big-endian words with no header, length prefix or magic number.
*/
use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::CodecError;

// If you change this you must also change `WORD_SIZE` and the byteorder calls below.
pub type Word = u64;

/// Size in bytes of an encoded word.
pub const WORD_SIZE: usize = 8;

/**
  Decodes words from `reader` until the stream is exhausted. A stream whose length is not a
  multiple of `WORD_SIZE` is a framing error; any other read failure is passed through.
*/
pub fn read_words<R: Read>(mut reader: R) -> Result<Vec<Word>, CodecError> {
  let mut words  = Vec::new();
  let mut buffer = [0u8; WORD_SIZE];

  loop {
    let filled = fill(&mut reader, &mut buffer)?;
    match filled {
      0                   => break,
      WORD_SIZE           => words.push((&buffer[..]).read_u64::<BigEndian>()?),
      trailing            => return Err(CodecError::Framing { trailing }),
    }
  }

  Ok(words)
}

/// Reads until `buffer` is full or the stream ends, returning how many bytes were read.
fn fill<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
  let mut filled = 0;
  while filled < buffer.len() {
    match reader.read(&mut buffer[filled..]) {
      Ok(0)                                           => break,
      Ok(n)                                           => filled += n,
      Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
      Err(e)                                          => return Err(e),
    }
  }
  Ok(filled)
}

/// Encodes each word as `WORD_SIZE` big-endian bytes, in order.
pub fn write_words<W: Write>(mut writer: W, words: &[Word]) -> io::Result<()> {
  for word in words {
    writer.write_u64::<BigEndian>(*word)?;
  }
  writer.flush()
}
