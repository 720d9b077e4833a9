//! Encoder for the serial array format.
//!
//! Output is byte-for-byte what PHP's `serialize()` produces for a packed,
//! integer-valued array: `a:<len>:{i:<pos>;i:<value>;...}` with no whitespace.
//! Indices are always written contiguously from 0.

use std::fmt::{self, Write};

use crate::error::{ErrorKind, Result, SerialArrayError};
use crate::value::{SerialArray, SerialValue};

/// An element the encoder can write as a PHP integer.
pub trait SerialElement {
    /// The element as a 64-bit signed integer, or `None` if it is not one.
    fn to_serial_int(&self) -> Option<i64>;

    /// Describe the element for error messages.
    fn describe(&self) -> String;
}

macro_rules! impl_serial_element_lossless {
    ($($t:ty),*) => {
        $(
            impl SerialElement for $t {
                #[inline]
                fn to_serial_int(&self) -> Option<i64> {
                    Some(i64::from(*self))
                }

                fn describe(&self) -> String {
                    format!("{} {}", stringify!($t), self)
                }
            }
        )*
    };
}

macro_rules! impl_serial_element_checked {
    ($($t:ty),*) => {
        $(
            impl SerialElement for $t {
                #[inline]
                fn to_serial_int(&self) -> Option<i64> {
                    i64::try_from(*self).ok()
                }

                fn describe(&self) -> String {
                    format!("{} {}", stringify!($t), self)
                }
            }
        )*
    };
}

impl_serial_element_lossless!(i8, i16, i32, i64, u8, u16, u32);
impl_serial_element_checked!(isize, usize, u64, i128, u128);

/// Only finite floats with no fractional part inside the `i64` range qualify.
fn float_to_int(value: f64) -> Option<i64> {
    // 2^63 is exactly representable; anything at or above it overflows i64.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if value.is_finite() && value.fract() == 0.0 && value >= -LIMIT && value < LIMIT {
        Some(value as i64)
    } else {
        None
    }
}

impl SerialElement for f64 {
    fn to_serial_int(&self) -> Option<i64> {
        float_to_int(*self)
    }

    fn describe(&self) -> String {
        format!("f64 {}", self)
    }
}

impl SerialElement for f32 {
    fn to_serial_int(&self) -> Option<i64> {
        float_to_int(f64::from(*self))
    }

    fn describe(&self) -> String {
        format!("f32 {}", self)
    }
}

impl SerialElement for SerialValue {
    fn to_serial_int(&self) -> Option<i64> {
        self.as_int()
    }

    fn describe(&self) -> String {
        format!("{} {}", self.type_name(), self)
    }
}

impl<T: SerialElement + ?Sized> SerialElement for &T {
    #[inline]
    fn to_serial_int(&self) -> Option<i64> {
        (**self).to_serial_int()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Write `len` integers from `items` in wire format.
pub(crate) fn write_ints<W, I>(out: &mut W, items: I, len: usize) -> fmt::Result
where
    W: Write + ?Sized,
    I: IntoIterator<Item = i64>,
{
    write!(out, "a:{}:{{", len)?;
    for (i, value) in items.into_iter().enumerate() {
        write!(out, "i:{};i:{};", i, value)?;
    }
    out.write_char('}')
}

/// Check every element up front so nothing is written for a bad sequence.
fn collect_ints<T: SerialElement>(items: &[T]) -> Result<Vec<i64>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.to_serial_int().ok_or_else(|| {
                SerialArrayError::new(ErrorKind::UnsupportedElementType(item.describe()), i)
                    .with_context("element index")
            })
        })
        .collect()
}

/// Encode a sequence into the wire format.
///
/// # Example
///
/// ```rust
/// let text = serial_array::to_string(&[33027, 5333]).unwrap();
/// assert_eq!(text, "a:2:{i:0;i:33027;i:1;i:5333;}");
/// ```
///
/// # Errors
///
/// [`ErrorKind::UnsupportedElementType`] if an element is not an integer;
/// the error position is the element's index.
pub fn to_string<T: SerialElement>(items: &[T]) -> Result<String> {
    collect_ints(items).map(|ints| SerialArray::from(ints).to_serial_string())
}
