//! Error types for the serial array codec.
//!
//! Every failure carries the byte offset it was detected at, and decode
//! failures can carry a short preview of the surrounding input.

use std::fmt;

use bstr::ByteSlice;
use thiserror::Error;

/// The main error type for encoding and decoding serial arrays.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct SerialArrayError {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Byte offset in the input (decode) or element index (encode).
    pub position: usize,
    /// Optional context about what was being processed.
    pub context: Option<String>,
    /// Preview of input around error position for debugging.
    pub input_preview: Option<String>,
}

impl fmt::Display for SerialArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.kind, self.position)?;
        if let Some(ref ctx) = self.context {
            write!(f, " ({})", ctx)?;
        }
        if let Some(ref preview) = self.input_preview {
            write!(f, "\n{}", preview)?;
        }
        Ok(())
    }
}

/// The class of token the decoder was waiting for when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// The top-level `a` tag.
    ArrayTag,
    /// A value tag, `a` or `i`.
    TypeTag,
    /// The `i` tag introducing an element index.
    IndexTag,
    /// Either an `i` index tag or the closing `}`.
    IndexOrArrayEnd,
    /// The `:` separator.
    Separator,
    /// The `;` terminator.
    Terminator,
    /// A decimal digit.
    Digit,
    /// A decimal digit or a leading `-`.
    DigitOrSign,
    /// A decimal digit or the `:` ending a length.
    DigitOrSeparator,
    /// A decimal digit or the `;` ending an index or value.
    DigitOrTerminator,
    /// The opening `{`.
    ArrayStart,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Token::ArrayTag => "array tag 'a'",
            Token::TypeTag => "type tag 'a' or 'i'",
            Token::IndexTag => "index tag 'i'",
            Token::IndexOrArrayEnd => "index tag 'i' or '}'",
            Token::Separator => "separator ':'",
            Token::Terminator => "terminator ';'",
            Token::Digit => "digit",
            Token::DigitOrSign => "digit or '-'",
            Token::DigitOrSeparator => "digit or ':'",
            Token::DigitOrTerminator => "digit or ';'",
            Token::ArrayStart => "'{'",
        };
        f.write_str(s)
    }
}

/// Renders the character found at a failure offset.
fn describe_found(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("'{}'", c.escape_default()),
        None => "end of input".to_string(),
    }
}

/// Specific kinds of codec errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The text does not follow the wire grammar. `found` is `None` at end of input.
    #[error("malformed input: expected {expected}, found {}", describe_found(.found))]
    MalformedInput {
        /// The token class that was expected.
        expected: Token,
        /// The character that was found instead.
        found: Option<char>,
    },

    /// A digit run that does not fit its integer type.
    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    /// Nesting depth exceeded.
    #[error("maximum nesting depth ({0}) exceeded")]
    MaxDepthExceeded(usize),

    /// The array header or declared indices disagree with the elements present.
    ///
    /// Raised when the declared length differs from the number of elements,
    /// or when an element's declared index differs from its position; the
    /// error context names the first such element.
    #[error("dirty array: declared length {declared}, found {actual} elements")]
    DirtyArray {
        /// Length written in the array header.
        declared: usize,
        /// Number of elements actually collected.
        actual: usize,
    },

    /// An element handed to the encoder is not a 64-bit integer.
    #[error("unsupported element type: {0}")]
    UnsupportedElementType(String),
}

impl ErrorKind {
    /// Whether the input does not follow the wire grammar at all.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ErrorKind::MalformedInput { .. }
                | ErrorKind::InvalidInteger(_)
                | ErrorKind::MaxDepthExceeded(_)
        )
    }

    /// Whether the input is well-formed but dirty, i.e. readable with
    /// [`ParserConfig::allow_dirty_arrays`](crate::ParserConfig::allow_dirty_arrays).
    pub fn is_dirty(&self) -> bool {
        matches!(self, ErrorKind::DirtyArray { .. })
    }
}

impl SerialArrayError {
    /// Create a new error with the given kind and position.
    #[inline]
    pub fn new(kind: ErrorKind, position: usize) -> Self {
        Self {
            kind,
            position,
            context: None,
            input_preview: None,
        }
    }

    /// Shorthand for a [`ErrorKind::MalformedInput`] error.
    #[inline]
    pub fn malformed(expected: Token, found: Option<char>, position: usize) -> Self {
        Self::new(ErrorKind::MalformedInput { expected, found }, position)
    }

    /// Add context to the error.
    #[inline]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add input preview around the error position for debugging.
    ///
    /// Shows up to 20 bytes before and after the error position.
    #[cold]
    pub fn with_input_preview(mut self, data: &[u8], error_pos: usize) -> Self {
        let start = error_pos.saturating_sub(20).min(data.len());
        let end = (error_pos + 20).min(data.len());

        if start < end {
            let preview = data[start..end].to_str_lossy();

            let relative_pos = error_pos - start;
            let mut result = String::with_capacity(preview.len() + relative_pos + 2);
            result.push_str(&preview);
            result.push('\n');
            result.push_str(&" ".repeat(relative_pos));
            result.push('^');

            self.input_preview = Some(result);
        }
        self
    }
}

/// Result type alias for the codec.
pub type Result<T> = std::result::Result<T, SerialArrayError>;
