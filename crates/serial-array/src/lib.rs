//! Codec for the legacy PHP-serialize integer array format.
//!
//! Saved item lists are stored as the text PHP's `serialize()` produces for a
//! packed integer array, so rows written by the old ORM layer and rows
//! written by new code stay readable by both:
//!
//! ```text
//! a:2:{i:0;i:33027;i:1;i:5333;}
//! ```
//!
//! # Features
//!
//! - **Byte-exact encoding** - Output matches PHP's `serialize()` for packed arrays
//! - **Single-pass decoding** - Explicit state machine with a heap-allocated frame stack
//! - **Dirty array tolerance** - Opt-in recovery of rows with stale length headers
//! - **Detailed errors** - Expected token class, offending character and offset
//!
//! # Quick Start
//!
//! ```rust
//! use serial_array::{from_str, to_string};
//!
//! let text = to_string(&[33027, 5333]).unwrap();
//! assert_eq!(text, "a:2:{i:0;i:33027;i:1;i:5333;}");
//!
//! let items = from_str(&text).unwrap();
//! assert_eq!(items.as_slice(), &[33027, 5333]);
//! ```
//!
//! # Dirty Arrays
//!
//! Older writers removed elements without reindexing, so some stored rows
//! declare a length that no longer matches their contents. Strict decoding
//! rejects them; [`ParserConfig::lenient`] keeps every element present:
//!
//! ```rust
//! use serial_array::{from_str, from_str_with_config, ErrorKind, ParserConfig};
//!
//! let row = "a:2:{i:0;i:10;i:1;i:20;i:3;i:40;}";
//! let err = from_str(row).unwrap_err();
//! assert_eq!(err.kind, ErrorKind::DirtyArray { declared: 2, actual: 3 });
//!
//! let items = from_str_with_config(row, ParserConfig::lenient()).unwrap();
//! assert_eq!(items.as_slice(), &[10, 20, 40]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::inline_always)]

pub mod error;
pub mod parser;
pub mod value;
pub mod writer;

#[cfg(feature = "serde")]
pub mod json;

pub use error::{ErrorKind, Result, SerialArrayError, Token};
pub use parser::{
    from_bytes, from_bytes_with_config, from_str, from_str_with_config, Parser, ParserConfig,
};
pub use value::{SerialArray, SerialValue};
pub use writer::{to_string, SerialElement};

#[cfg(feature = "serde")]
pub use json::{deserialize_lenient, to_json, to_string_from_json};
