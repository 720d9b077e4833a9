//! Value types produced and consumed by the codec.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::error::{Result, SerialArrayError};
use crate::parser::from_str;
use crate::writer::write_ints;

/// A decoded value.
///
/// Stored lists only ever hold integers, but the decoder accepts nested
/// arrays as element values so that well-formed nested input still parses.
/// Array elements are kept in the order they were read; declared indices
/// are not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialValue {
    /// Integer value (`i:<n>;`).
    Int(i64),

    /// Array value (`a:<len>:{...}`).
    Array(Vec<SerialValue>),
}

impl SerialValue {
    /// Check if the value is an integer.
    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, SerialValue::Int(_))
    }

    /// Check if the value is an array.
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, SerialValue::Array(_))
    }

    /// Get the value as an integer.
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SerialValue::Int(i) => Some(*i),
            SerialValue::Array(_) => None,
        }
    }

    /// Get the value as an array.
    #[inline]
    pub fn as_array(&self) -> Option<&[SerialValue]> {
        match self {
            SerialValue::Array(a) => Some(a.as_slice()),
            SerialValue::Int(_) => None,
        }
    }

    /// Keep the integers of a top-level array, dropping nested arrays.
    ///
    /// An integer value becomes a one-element list.
    pub fn into_serial_array(self) -> SerialArray {
        match self {
            SerialValue::Int(i) => SerialArray(vec![i]),
            SerialValue::Array(items) => items
                .into_iter()
                .filter_map(|item| item.as_int())
                .collect(),
        }
    }

    /// Get a type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            SerialValue::Int(_) => "integer",
            SerialValue::Array(_) => "array",
        }
    }
}

impl fmt::Display for SerialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerialValue::Int(i) => write!(f, "{}", i),
            SerialValue::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// An ordered list of integers persisted in the serial array format.
///
/// Duplicates are allowed. Mutations beyond appending are expressed as a
/// wholesale [`replace`](SerialArray::replace) followed by re-serializing the
/// whole list; the wire format has no patch form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SerialArray(Vec<i64>);

impl SerialArray {
    /// Create an empty list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Create an empty list with room for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Append an item.
    #[inline]
    pub fn push(&mut self, value: i64) {
        self.0.push(value);
    }

    /// Replace the whole contents.
    pub fn replace<I: IntoIterator<Item = i64>>(&mut self, items: I) {
        self.0.clear();
        self.0.extend(items);
    }

    /// Borrow the items.
    #[inline]
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    /// Take the items.
    #[inline]
    pub fn into_vec(self) -> Vec<i64> {
        self.0
    }

    /// Encode to the wire format. Always succeeds.
    pub fn to_serial_string(&self) -> String {
        self.to_string()
    }

    /// Decode with the strict default configuration.
    pub fn from_serial_str(text: &str) -> Result<Self> {
        from_str(text)
    }
}

impl Deref for SerialArray {
    type Target = [i64];

    #[inline]
    fn deref(&self) -> &[i64] {
        &self.0
    }
}

impl From<Vec<i64>> for SerialArray {
    fn from(items: Vec<i64>) -> Self {
        Self(items)
    }
}

impl From<SerialArray> for Vec<i64> {
    fn from(array: SerialArray) -> Self {
        array.0
    }
}

impl FromIterator<i64> for SerialArray {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<i64> for SerialArray {
    fn extend<I: IntoIterator<Item = i64>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for SerialArray {
    type Item = i64;
    type IntoIter = std::vec::IntoIter<i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SerialArray {
    type Item = &'a i64;
    type IntoIter = std::slice::Iter<'a, i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Displays the wire text.
impl fmt::Display for SerialArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ints(f, self.0.iter().copied(), self.0.len())
    }
}

impl FromStr for SerialArray {
    type Err = SerialArrayError;

    fn from_str(s: &str) -> Result<Self> {
        from_str(s)
    }
}
