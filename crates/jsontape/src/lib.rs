//! Typed access to tape-encoded JSON documents.
//!
//! A tape is the flat sequence of tagged 64-bit words an upstream structural
//! parser emits for a JSON document: a pre-order traversal where scalars carry
//! their raw bit patterns, strings reference a side buffer of unescaped bytes,
//! and arrays/objects are bracketed by paired start/end words that allow
//! skipping a whole sub-tree in constant time. This crate reads such tapes
//! back into typed values without re-parsing any text.
//!
//! ```
//! use jsontape::TapeBuilder;
//!
//! let mut b = TapeBuilder::new();
//! b.begin_array();
//! b.int(1);
//! b.int(2);
//! b.end_array()?;
//! let tape = b.finish()?;
//!
//! let mut root = tape.iter();
//! let (_, doc) = root.next_iter()?.expect("document root");
//! assert_eq!(doc.array()?.as_ints()?, vec![1, 2]);
//! # Ok::<(), jsontape::TapeError>(())
//! ```

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod array;
mod error;
mod iter;
mod tape;
mod value;

#[cfg(test)]
mod tests;

pub use array::Array;
pub use error::TapeError;
pub use iter::Iter;
pub use tape::{Tag, Tape, TapeBuilder, Type};
pub use value::{Map, Value};
