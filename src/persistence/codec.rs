//! Line codec
//!
//! One record per line, fields separated by single spaces, numeric id first.
//! Fields cannot contain whitespace; the reader splits on any run of it.

use std::str::{FromStr, SplitWhitespace};

use thiserror::Error;

/// Reason a line could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DecodeError(pub String);

/// A record that can be written to and read back from one line of text.
pub trait LineRecord: Sized {
    /// Formats the record without a trailing newline.
    fn encode(&self) -> String;

    /// Parses a line produced by `encode`.
    fn decode(line: &str) -> Result<Self, DecodeError>;
}

/// Positional reader over the fields of one line.
pub struct Fields<'a> {
    parts: SplitWhitespace<'a>,
    position: usize,
}

impl<'a> Fields<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            parts: line.split_whitespace(),
            position: 0,
        }
    }

    /// Next raw field.
    pub fn text(&mut self, name: &str) -> Result<&'a str, DecodeError> {
        self.position += 1;
        self.parts.next().ok_or_else(|| {
            DecodeError(format!("missing field {} ({})", self.position, name))
        })
    }

    /// Next field parsed as `T`.
    pub fn parse<T: FromStr>(&mut self, name: &str) -> Result<T, DecodeError> {
        let raw = self.text(name)?;
        raw.parse()
            .map_err(|_| DecodeError(format!("field {} ({}) is not valid: '{}'", self.position, name, raw)))
    }

    /// Fails if anything is left on the line.
    pub fn finish(mut self) -> Result<(), DecodeError> {
        match self.parts.next() {
            None => Ok(()),
            Some(extra) => Err(DecodeError(format!(
                "unexpected trailing field '{}' after {} fields",
                extra, self.position
            ))),
        }
    }
}
