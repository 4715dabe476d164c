//! Reading values from their string representation.
//!
//! This module provides [`SubstringReader`], a cursor over an immutable
//! string that supports look-ahead, marking and resetting, and bounded
//! sub-slicing. It is the parsing substrate used by the DN and RDN
//! decoders in [`crate::base::name`].

use core::fmt;

//------------ SubstringReader -----------------------------------------------

/// A cursor over an immutable string.
///
/// The reader keeps a current position within the string it wraps and
/// advances it as characters are consumed. A position can be saved with
/// [`mark`][Self::mark] and later restored with [`reset`][Self::reset],
/// which the decoders use for bounded look-ahead.
///
/// A reader is cheap to create and is not meant to be shared: each decode
/// attempt gets its own.
#[derive(Clone, Debug)]
pub struct SubstringReader<'a> {
    /// The string being read.
    source: &'a str,

    /// The byte position of the next unread character.
    pos: usize,

    /// The position saved by the last call to `mark`.
    mark: Option<usize>,
}

impl<'a> SubstringReader<'a> {
    /// Creates a new reader positioned at the start of `source`.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        SubstringReader {
            source,
            pos: 0,
            mark: None,
        }
    }

    /// Returns the number of unread characters.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.source[self.pos..].chars().count()
    }

    /// Returns the string the reader was created with.
    #[must_use]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Returns the current position as a byte index into the source.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the next character without consuming it.
    pub fn peek(&self) -> Result<char, EndOfInput> {
        self.source[self.pos..].chars().next().ok_or(EndOfInput(()))
    }

    /// Consumes and returns the next character.
    pub fn read(&mut self) -> Result<char, EndOfInput> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Ok(ch)
    }

    /// Consumes and returns the next `n` characters as a sub-slice.
    ///
    /// Fails without consuming anything if fewer than `n` characters
    /// remain.
    pub fn read_n(&mut self, n: usize) -> Result<&'a str, EndOfInput> {
        let start = self.pos;
        let mut end = start;
        let mut iter = self.source[start..].chars();
        for _ in 0..n {
            match iter.next() {
                Some(ch) => end += ch.len_utf8(),
                None => return Err(EndOfInput(())),
            }
        }
        self.pos = end;
        Ok(&self.source[start..end])
    }

    /// Consumes and returns everything that is still unread.
    pub fn read_remaining(&mut self) -> &'a str {
        let res = &self.source[self.pos..];
        self.pos = self.source.len();
        res
    }

    /// Steps the cursor back over the most recently read character.
    ///
    /// Does nothing when positioned at the start of the source.
    pub fn unread(&mut self) {
        if let Some(ch) = self.source[..self.pos].chars().next_back() {
            self.pos -= ch.len_utf8();
        }
    }

    /// Advances the cursor past consecutive space characters.
    pub fn skip_whitespace(&mut self) {
        while let Ok(' ') = self.peek() {
            self.pos += 1;
        }
    }

    /// Saves the current position for a later [`reset`][Self::reset].
    pub fn mark(&mut self) {
        self.mark = Some(self.pos);
    }

    /// Rewinds the cursor to the last marked position.
    ///
    /// # Panics
    ///
    /// Calling `reset` without a prior `mark` is a programming error and
    /// panics.
    pub fn reset(&mut self) {
        match self.mark {
            Some(pos) => self.pos = pos,
            None => panic!("reset without mark"),
        }
    }
}

//============ Error Types ===================================================

//------------ EndOfInput ----------------------------------------------------

/// A read was attempted past the end of the source string.
///
/// At the DN decoder boundary this always surfaces as an invalid name
/// syntax error; the input was truncated or malformed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EndOfInput(pub(crate) ());

//--- Display and Error

impl fmt::Display for EndOfInput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("unexpected end of input")
    }
}

impl std::error::Error for EndOfInput {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn read_and_peek() {
        let mut reader = SubstringReader::new("ab");
        assert_eq!(reader.remaining(), 2);
        assert_eq!(reader.peek(), Ok('a'));
        assert_eq!(reader.read(), Ok('a'));
        assert_eq!(reader.read(), Ok('b'));
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.peek(), Err(EndOfInput(())));
        assert_eq!(reader.read(), Err(EndOfInput(())));
    }

    #[test]
    fn read_n() {
        let mut reader = SubstringReader::new("dc=example,dc=com");
        assert_eq!(reader.read_n(3), Ok("dc="));
        assert_eq!(reader.read_n(7), Ok("example"));
        assert_eq!(reader.read_n(20), Err(EndOfInput(())));

        // A failed bounded read must not move the cursor.
        assert_eq!(reader.read(), Ok(','));
    }

    #[test]
    fn mark_and_reset() {
        let mut reader = SubstringReader::new("ou=people");
        assert_eq!(reader.read_n(3), Ok("ou="));
        reader.mark();
        assert_eq!(reader.read_remaining(), "people");
        assert_eq!(reader.remaining(), 0);
        reader.reset();
        assert_eq!(reader.read_remaining(), "people");
    }

    #[test]
    #[should_panic(expected = "reset without mark")]
    fn reset_without_mark() {
        SubstringReader::new("cn=foo").reset();
    }

    #[test]
    fn skip_whitespace() {
        let mut reader = SubstringReader::new("   a  ");
        reader.skip_whitespace();
        assert_eq!(reader.read(), Ok('a'));
        reader.skip_whitespace();
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn unread() {
        let mut reader = SubstringReader::new("o=A");
        reader.unread();
        assert_eq!(reader.read(), Ok('o'));
        assert_eq!(reader.read(), Ok('='));
        reader.unread();
        assert_eq!(reader.read(), Ok('='));
    }

    #[test]
    fn multibyte() {
        let mut reader = SubstringReader::new("cn=Jürgen");
        assert_eq!(reader.read_n(4), Ok("cn=J"));
        assert_eq!(reader.read(), Ok('ü'));
        assert_eq!(reader.read_remaining(), "rgen");
    }
}
