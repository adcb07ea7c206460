/*!
  The human readable textual form of a program is called assembly. Translation is a single pass
  over a token stream:

    ```text
    text -> [`tokenize`] -> `Token`s -> [`assemble`] -> `Word`s
    ```

  A token that names an instruction is emitted as its opcode followed by exactly as many
  operand words as the instruction takes. Any other token is a data literal: a quoted string
  becomes one word per character, anything else must be a list of decimal integers.

  Operands are resolved in this order:

   1. `[I]` as the first operand selects the indirect form of the instruction (`SETA [I]`
      assembles to `SETAM`) and emits no operand word;
   2. a predefined constant name, see `crate::symboltable`;
   3. a decimal integer, optionally negative (stored as two's complement).

  Lines whose first token begins with `#` are comments, as is everything after a `#` token.
*/

use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::Path;
use std::str::FromStr;

use nom::{
  branch::alt,
  bytes::complete::{is_not, take_till},
  character::complete::{char as one_char, digit1, multispace0, multispace1},
  combinator::{all_consuming, eof, map, map_res, opt, peek, recognize},
  multi::many0,
  sequence::{delimited, pair, preceded, terminated},
  IResult
};

use crate::bytecode::instruction::INDIRECT_MARKER;
use crate::bytecode::{write_words, Operation, Word};
use crate::error::{AssemblyError, Error};
use crate::symboltable::resolve_constant;

const COMMENT_CHAR: char = '#';

/// A whitespace-delimited piece of source text and the 1-based line it came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Token<'a> {
  pub text: &'a str,
  pub line: usize
}

// region Parsers

fn quoted_p(input: &str) -> IResult<&str, &str> {
  alt((
    delimited(one_char('"'), take_till(|c| c == '"'), one_char('"')),
    delimited(one_char('\''), take_till(|c| c == '\''), one_char('\'')),
  ))(input)
}

/// A quoted literal may contain spaces; anything else runs to the next whitespace.
fn token_p(input: &str) -> IResult<&str, &str> {
  alt((
    terminated(recognize(quoted_p), peek(alt((multispace1, eof)))),
    is_not(" \t\r\n"),
  ))(input)
}

fn line_p(input: &str) -> IResult<&str, Vec<&str>> {
  many0(preceded(multispace0, token_p))(input)
}

fn decimal_p(input: &str) -> IResult<&str, Word> {
  map(
    pair(opt(one_char('-')), map_res(digit1, Word::from_str)),
    |(sign, value): (Option<char>, Word)| match sign {
      Some(_) => value.wrapping_neg(),
      None    => value
    }
  )(input)
}

fn parse_decimal(text: &str) -> Option<Word> {
  all_consuming(decimal_p)(text)
    .ok()
    .map(|(_, value)| value)
}

fn parse_quoted(text: &str) -> Option<&str> {
  all_consuming(quoted_p)(text)
    .ok()
    .map(|(_, body)| body)
}

fn is_indirect_marker(text: &str) -> bool {
  text.eq_ignore_ascii_case(INDIRECT_MARKER)
}

// endregion

/// Splits source text into tokens, dropping blank lines and comments.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
  let mut tokens = Vec::new();

  for (idx, line) in text.lines().enumerate() {
    // `line_p` cannot fail: `many0` stops at the first token it cannot read.
    let (_rest, texts) = line_p(line).unwrap_or((line, vec![]));
    tokens.extend(
      texts.into_iter()
           .take_while(|text| !text.starts_with(COMMENT_CHAR))
           .map(|text| Token { text, line: idx + 1 })
    );
  }

  tokens
}

/**
  Expands a data literal into words. A quoted literal gives the ordinal of each character, with
  the quotes stripped; otherwise every whitespace-separated piece must be a decimal integer.
  Returns the first piece that is not, or the whole text if there are no pieces at all.
*/
fn expand_data(text: &str) -> Result<Vec<Word>, &str> {
  if let Some(body) = parse_quoted(text) {
    return Ok(body.chars().map(|c| c as Word).collect());
  }

  if text.trim().is_empty() {
    return Err(text);
  }

  text.split_whitespace()
      .map(|piece| parse_decimal(piece).ok_or(piece))
      .collect()
}

/// Expands a single data literal, e.g. `"Abc"` or `120 121 122`.
pub fn assemble_data(text: &str) -> Result<Vec<Word>, AssemblyError> {
  expand_data(text).map_err(|piece| AssemblyError::InvalidData {
    token: piece.to_string(),
    position: 0,
    line: 1
  })
}

/// Resolves a single operand token that is not the indirect marker.
fn resolve_operand(text: &str) -> Option<Word> {
  resolve_constant(text).or_else(|| parse_decimal(text))
}

struct Assembler<'t, 'a> {
  tokens   : &'t [Token<'a>],
  position : usize,
  words    : Vec<Word>
}

impl<'t, 'a> Assembler<'t, 'a> {

  fn new(tokens: &'t [Token<'a>]) -> Self {
    Assembler {
      tokens,
      position: 0,
      words: Vec::with_capacity(tokens.len())
    }
  }

  fn peek(&self) -> Option<&'t Token<'a>> {
    self.tokens.get(self.position)
  }

  fn next_token(&mut self) -> Option<&'t Token<'a>> {
    let token = self.tokens.get(self.position);
    if token.is_some() {
      self.position += 1;
    }
    token
  }

  fn assemble(mut self) -> Result<Vec<Word>, AssemblyError> {
    while let Some(token) = self.next_token() {
      let position = self.position - 1;
      match Operation::from_mnemonic(token.text) {
        Some(operation) => self.instruction(operation, token, position)?,
        None            => self.data(token, position)?,
      }
    }

    #[cfg(feature = "trace_computation")]
    {
      eprintln!("Assembled {} words from {} tokens:", self.words.len(), self.tokens.len());
      for (address, word) in self.words.iter().enumerate() {
        eprintln!("{:>6}: {}", address, word);
      }
    }

    Ok(self.words)
  }

  /// Emits `operation` and its operands. `token` is the mnemonic at `position`.
  fn instruction(
    &mut self,
    operation: Operation,
    token: &Token<'a>,
    position: usize
  ) -> Result<(), AssemblyError> {
    let expected      = operation.arity();
    let mut operation = operation;
    let mut found     = 0;

    // Decide on the indirect form before the opcode word is emitted.
    if operation.arity() > 0 {
      if let Some(next) = self.peek() {
        if is_indirect_marker(next.text) {
          operation = operation.indirect().ok_or_else(|| AssemblyError::NoIndirectForm {
            operation,
            token: next.text.to_string(),
            position: self.position,
            line: next.line
          })?;
          self.position += 1;
          found         += 1;
        }
      }
    }

    self.words.push(operation.code());

    for _ in 0..operation.arity() {
      let operand = self.next_token().ok_or_else(|| AssemblyError::MissingOperand {
        operation,
        expected,
        found,
        position,
        line: token.line
      })?;

      let word = resolve_operand(operand.text).ok_or_else(|| AssemblyError::UnresolvedOperand {
        operation,
        token: operand.text.to_string(),
        position: self.position - 1,
        line: operand.line
      })?;

      self.words.push(word);
      found += 1;
    }

    Ok(())
  }

  fn data(&mut self, token: &Token<'a>, position: usize) -> Result<(), AssemblyError> {
    let words = expand_data(token.text).map_err(|_| AssemblyError::InvalidData {
      token: token.text.to_string(),
      position,
      line: token.line
    })?;
    self.words.extend(words);
    Ok(())
  }
}

/// Translates a token stream into words. Stops at the first error.
pub fn assemble(tokens: &[Token<'_>]) -> Result<Vec<Word>, AssemblyError> {
  Assembler::new(tokens).assemble()
}

pub fn assemble_text(text: &str) -> Result<Vec<Word>, AssemblyError> {
  assemble(&tokenize(text))
}

pub fn assemble_reader<R: Read>(mut reader: R) -> Result<Vec<Word>, Error> {
  let mut text = String::new();
  reader.read_to_string(&mut text)?;
  Ok(assemble_text(&text)?)
}

pub fn assemble_file<P: AsRef<Path>>(path: P) -> Result<Vec<Word>, Error> {
  assemble_reader(File::open(path)?)
}

/// Assembles the source at `in_path` and writes the binary program to `out_path`.
pub fn assemble_file_to_binary<P, Q>(in_path: P, out_path: Q) -> Result<(), Error>
  where P: AsRef<Path>,
        Q: AsRef<Path>
{
  let words = assemble_file(in_path)?;
  let file  = File::create(out_path)?;
  write_words(BufWriter::new(file), &words)?;
  Ok(())
}
