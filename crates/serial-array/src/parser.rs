//! State-machine decoder for the serial array format.
//!
//! The input is scanned once, left to right, one byte at a time. Nesting is
//! tracked on an explicit frame stack instead of the call stack, so deeply
//! nested input costs heap rather than stack and is bounded by
//! [`ParserConfig::max_depth`].
//!
//! Digit runs are not converted as they are read: the state remembers where
//! the run started and the slice is parsed once its terminator arrives.
//!
//! # Tracing Support
//!
//! Enable the `tracing` feature for parse instrumentation:
//!
//! ```toml
//! serial-array = { version = "0.1", features = ["tracing"] }
//! ```

use bstr::decode_utf8;

#[cfg(feature = "tracing")]
use tracing::{debug, instrument, trace, warn};

use crate::error::{ErrorKind, Result, SerialArrayError, Token};
use crate::value::{SerialArray, SerialValue};

/// Maximum nesting depth to bound memory on hostile input.
const MAX_DEPTH: usize = 512;

/// Upper bound on capacity reserved from a declared length.
const MAX_PREALLOC: usize = 1024;

/// Parser configuration options.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximum nesting depth for arrays.
    pub max_depth: usize,
    /// Accept arrays whose declared length or indices disagree with their contents.
    ///
    /// Legacy writers removed elements without reindexing, leaving gaps in the
    /// declared indices and a stale length header. With this enabled every
    /// element present is kept and the header is ignored.
    pub allow_dirty_arrays: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            allow_dirty_arrays: false,
        }
    }
}

impl ParserConfig {
    /// Configuration for reading legacy rows that may be dirty.
    pub fn lenient() -> Self {
        Self {
            allow_dirty_arrays: true,
            ..Self::default()
        }
    }
}

/// What a `:` separator follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    /// `a` value tag.
    Array,
    /// `i` value tag.
    Int,
    /// `i` tag of an element index.
    Index,
}

/// Decoder states. Digit-run states carry the offset the run started at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// A value tag, `a` or `i`.
    ExpectingType,
    /// The `:` after a tag.
    ExpectingSeparator(Tag),
    /// First digit of an array length.
    ExpectingArrayLength,
    /// Further length digits or the closing `:`.
    ExpectingArrayLengthOrSeparator { start: usize },
    /// The `{` opening an array of the given declared length.
    ExpectingArrayStart { len: usize },
    /// The next element's index tag or the `}` closing the array.
    ExpectingArrayIndexOrEnd,
    /// First digit of an element index.
    ExpectingArrayIndex,
    /// Further index digits or the closing `;`.
    ExpectingArrayIndexOrSeparator { start: usize },
    /// A `-` or the first digit of an integer value.
    ExpectingArrayInt,
    /// The first digit after a `-`.
    ExpectingArrayIntDigit { start: usize },
    /// Further value digits or the closing `;`.
    ExpectingArrayIntOrSeparator { start: usize },
}

impl State {
    /// The token class this state accepts, for error reporting.
    fn expected(self) -> Token {
        match self {
            State::ExpectingType => Token::TypeTag,
            State::ExpectingSeparator(_) => Token::Separator,
            State::ExpectingArrayLength
            | State::ExpectingArrayIndex
            | State::ExpectingArrayIntDigit { .. } => Token::Digit,
            State::ExpectingArrayLengthOrSeparator { .. } => Token::DigitOrSeparator,
            State::ExpectingArrayStart { .. } => Token::ArrayStart,
            State::ExpectingArrayIndexOrEnd => Token::IndexOrArrayEnd,
            State::ExpectingArrayIndexOrSeparator { .. }
            | State::ExpectingArrayIntOrSeparator { .. } => Token::DigitOrTerminator,
            State::ExpectingArrayInt => Token::DigitOrSign,
        }
    }
}

/// An array being collected.
#[derive(Debug)]
struct Frame {
    /// Length written in the array header.
    declared_len: usize,
    /// Offset of the opening `{`.
    opened_at: usize,
    items: Vec<SerialValue>,
    /// Index declared for the element currently being read.
    pending_index: usize,
    /// First `(position, declared_index)` pair that disagreed.
    misplaced: Option<(usize, usize)>,
}

/// Result of feeding one byte to the state machine.
enum Step {
    Next(State),
    Done(SerialValue),
}

/// A single-pass serial array decoder.
pub struct Parser<'a> {
    /// Input data.
    data: &'a [u8],
    /// Current position in the input.
    pos: usize,
    /// Parser configuration.
    config: ParserConfig,
    /// Arrays opened but not yet closed, innermost last.
    stack: Vec<Frame>,
}

impl<'a> Parser<'a> {
    /// Create a new parser with default configuration.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_config(data, ParserConfig::default())
    }

    /// Create a new parser with custom configuration.
    pub fn with_config(data: &'a [u8], config: ParserConfig) -> Self {
        Self {
            data,
            pos: 0,
            config,
            stack: Vec::new(),
        }
    }

    /// Parse the outermost array and return it with any nested arrays.
    ///
    /// Bytes after the outermost `}` are not examined; see [`Parser::remaining`].
    #[cfg_attr(feature = "tracing", instrument(skip(self), fields(data_len = self.data.len())))]
    pub fn parse(&mut self) -> Result<SerialValue> {
        #[cfg(feature = "tracing")]
        debug!(data_len = self.data.len(), "Starting serial array decode");

        let result = self.check_preamble().and_then(|()| self.run());

        #[cfg(feature = "tracing")]
        match &result {
            Ok(value) => {
                debug!(value_type = value.type_name(), consumed = self.pos, "Decode completed");
                if self.pos < self.data.len() {
                    trace!(
                        trailing = self.data.len() - self.pos,
                        "Ignoring bytes after outermost array"
                    );
                }
            }
            Err(e) => warn!(error = %e, "Decode failed"),
        }

        result
    }

    /// Input left after the outermost array, once [`Parser::parse`] has succeeded.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    /// The top-level value must be an array.
    fn check_preamble(&self) -> Result<()> {
        match self.data.first() {
            None => Err(SerialArrayError::malformed(Token::ArrayTag, None, 0)
                .with_context("empty input")),
            Some(b'a') => Ok(()),
            Some(_) => Err(SerialArrayError::malformed(
                Token::ArrayTag,
                Some(char_at(self.data, 0)),
                0,
            )
            .with_context("top-level value must be an array")
            .with_input_preview(self.data, 0)),
        }
    }

    fn run(&mut self) -> Result<SerialValue> {
        let mut state = State::ExpectingType;

        while self.pos < self.data.len() {
            let byte = self.data[self.pos];
            let step = self.step(state, byte)?;
            self.pos += 1;
            match step {
                Step::Next(next) => state = next,
                Step::Done(value) => return Ok(value),
            }
        }

        Err(SerialArrayError::malformed(state.expected(), None, self.pos)
            .with_context("input ended inside an array")
            .with_input_preview(self.data, self.pos))
    }

    /// Advance the state machine by one byte at `self.pos`.
    #[inline]
    fn step(&mut self, state: State, byte: u8) -> Result<Step> {
        let pos = self.pos;
        let next = match (state, byte) {
            (State::ExpectingType, b'a') => State::ExpectingSeparator(Tag::Array),
            (State::ExpectingType, b'i') => State::ExpectingSeparator(Tag::Int),

            (State::ExpectingSeparator(Tag::Array), b':') => State::ExpectingArrayLength,
            (State::ExpectingSeparator(Tag::Int), b':') => State::ExpectingArrayInt,
            (State::ExpectingSeparator(Tag::Index), b':') => State::ExpectingArrayIndex,

            (State::ExpectingArrayLength, b'0'..=b'9') => {
                State::ExpectingArrayLengthOrSeparator { start: pos }
            }
            (State::ExpectingArrayLengthOrSeparator { .. }, b'0'..=b'9') => state,
            (State::ExpectingArrayLengthOrSeparator { start }, b':') => {
                let len = self.parse_digits::<usize>(start)?;
                State::ExpectingArrayStart { len }
            }

            (State::ExpectingArrayStart { len }, b'{') => {
                self.open_array(len)?;
                State::ExpectingArrayIndexOrEnd
            }

            (State::ExpectingArrayIndexOrEnd, b'i') => State::ExpectingSeparator(Tag::Index),
            (State::ExpectingArrayIndexOrEnd, b'}') => {
                let items = self.close_array()?;
                return Ok(self.complete(SerialValue::Array(items)));
            }

            (State::ExpectingArrayIndex, b'0'..=b'9') => {
                State::ExpectingArrayIndexOrSeparator { start: pos }
            }
            (State::ExpectingArrayIndexOrSeparator { .. }, b'0'..=b'9') => state,
            (State::ExpectingArrayIndexOrSeparator { start }, b';') => {
                let index = self.parse_digits::<usize>(start)?;
                if let Some(frame) = self.stack.last_mut() {
                    frame.pending_index = index;
                }
                State::ExpectingType
            }

            (State::ExpectingArrayInt, b'-') => State::ExpectingArrayIntDigit { start: pos },
            (State::ExpectingArrayInt, b'0'..=b'9') => {
                State::ExpectingArrayIntOrSeparator { start: pos }
            }
            (State::ExpectingArrayIntDigit { start }, b'0'..=b'9') => {
                State::ExpectingArrayIntOrSeparator { start }
            }
            (State::ExpectingArrayIntOrSeparator { .. }, b'0'..=b'9') => state,
            (State::ExpectingArrayIntOrSeparator { start }, b';') => {
                let value = self.parse_digits::<i64>(start)?;
                return Ok(self.complete(SerialValue::Int(value)));
            }

            (state, _) => return Err(self.make_unexpected_char_error(state)),
        };
        Ok(Step::Next(next))
    }

    /// Push a frame for an array whose `{` is at `self.pos`.
    fn open_array(&mut self, declared_len: usize) -> Result<()> {
        if self.stack.len() >= self.config.max_depth {
            #[cfg(feature = "tracing")]
            warn!(depth = self.stack.len(), max_depth = self.config.max_depth, "Max depth exceeded");
            return Err(SerialArrayError::new(
                ErrorKind::MaxDepthExceeded(self.config.max_depth),
                self.pos,
            ));
        }
        self.stack.push(Frame {
            declared_len,
            opened_at: self.pos,
            items: Vec::with_capacity(declared_len.min(MAX_PREALLOC)),
            pending_index: 0,
            misplaced: None,
        });
        Ok(())
    }

    /// Pop the innermost frame at its `}` and validate it against its header.
    fn close_array(&mut self) -> Result<Vec<SerialValue>> {
        let Some(frame) = self.stack.pop() else {
            // `}` is only accepted while a frame is open.
            return Err(self.make_unexpected_char_error(State::ExpectingType));
        };
        let actual = frame.items.len();

        // A gap in the declared indices is the same reindexing bug as a stale
        // length, even when the count happens to match the header.
        if actual != frame.declared_len || frame.misplaced.is_some() {
            if !self.config.allow_dirty_arrays {
                let mut context = format!("array opened at position {}", frame.opened_at);
                if let Some((position, declared_index)) = frame.misplaced {
                    context = format!(
                        "element {} declared with index {}, {}",
                        position, declared_index, context
                    );
                }
                return Err(SerialArrayError::new(
                    ErrorKind::DirtyArray {
                        declared: frame.declared_len,
                        actual,
                    },
                    self.pos,
                )
                .with_context(context));
            }
            #[cfg(feature = "tracing")]
            warn!(
                declared = frame.declared_len,
                actual,
                misplaced = ?frame.misplaced,
                "Dirty array accepted, keeping every collected element"
            );
        }

        Ok(frame.items)
    }

    /// Attach a finished value to its parent, or finish the parse.
    fn complete(&mut self, value: SerialValue) -> Step {
        match self.stack.last_mut() {
            Some(frame) => {
                let position = frame.items.len();
                if frame.pending_index != position && frame.misplaced.is_none() {
                    frame.misplaced = Some((position, frame.pending_index));
                }
                frame.items.push(value);
                Step::Next(State::ExpectingArrayIndexOrEnd)
            }
            None => Step::Done(value),
        }
    }

    /// Convert the digit run `start..self.pos` once its terminator is reached.
    fn parse_digits<T: std::str::FromStr>(&self, start: usize) -> Result<T> {
        let digits = &self.data[start..self.pos];
        let text = std::str::from_utf8(digits).map_err(|_| {
            SerialArrayError::new(ErrorKind::InvalidInteger("invalid UTF-8".into()), start)
        })?;
        text.parse().map_err(|_| {
            SerialArrayError::new(ErrorKind::InvalidInteger(text.to_string()), start)
                .with_input_preview(self.data, start)
        })
    }

    /// Create an unexpected character error with proper context.
    #[cold]
    #[inline(never)]
    fn make_unexpected_char_error(&self, state: State) -> SerialArrayError {
        let found = char_at(self.data, self.pos);
        SerialArrayError::malformed(state.expected(), Some(found), self.pos)
            .with_input_preview(self.data, self.pos)
    }
}

/// The character starting at `pos`; invalid UTF-8 reads as U+FFFD.
fn char_at(data: &[u8], pos: usize) -> char {
    let (ch, _) = decode_utf8(&data[pos..]);
    ch.unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Decode a serial array from bytes with the strict default configuration.
///
/// # Example
///
/// ```rust
/// use serial_array::from_bytes;
///
/// let list = from_bytes(b"a:2:{i:0;i:33027;i:1;i:5333;}").unwrap();
/// assert_eq!(list.as_slice(), &[33027, 5333]);
/// ```
#[inline]
pub fn from_bytes(data: &[u8]) -> Result<SerialArray> {
    from_bytes_with_config(data, ParserConfig::default())
}

/// Decode a serial array from bytes with custom configuration.
///
/// Elements come back in the order they appear in the input, whatever
/// indices they declare. Nested arrays are parsed and then dropped.
///
/// # Example
///
/// ```rust
/// use serial_array::{from_bytes_with_config, ParserConfig};
///
/// // Header says 3, but only two elements were written.
/// let dirty = b"a:3:{i:0;i:10;i:2;i:30;}";
/// assert!(from_bytes_with_config(dirty, ParserConfig::default()).is_err());
///
/// let list = from_bytes_with_config(dirty, ParserConfig::lenient()).unwrap();
/// assert_eq!(list.as_slice(), &[10, 30]);
/// ```
#[inline]
pub fn from_bytes_with_config(data: &[u8], config: ParserConfig) -> Result<SerialArray> {
    #[cfg(feature = "tracing")]
    trace!(data_len = data.len(), ?config, "from_bytes_with_config called");

    let mut parser = Parser::with_config(data, config);
    parser.parse().map(SerialValue::into_serial_array)
}

/// Decode a serial array from text with the strict default configuration.
#[inline]
pub fn from_str(text: &str) -> Result<SerialArray> {
    from_bytes(text.as_bytes())
}

/// Decode a serial array from text with custom configuration.
#[inline]
pub fn from_str_with_config(text: &str, config: ParserConfig) -> Result<SerialArray> {
    from_bytes_with_config(text.as_bytes(), config)
}
