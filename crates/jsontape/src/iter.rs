//! The tape cursor.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use bstr::ByteSlice;

use crate::{
    array::Array,
    error::TapeError,
    tape::{PAYLOAD_BITS, PAYLOAD_MASK, Tag, Type},
    value::{Map, Value, escape_string},
};

/// A read cursor over one tape scope.
///
/// The cursor borrows the tape and owns only its offset, which always points
/// at the next unread tag word. Copies are cheap and independent: draining
/// one cursor never moves another.
///
/// End of scope is reported as `None` rather than a sentinel type: a cursor
/// standing on the close word of the scope it iterates (or on the document's
/// trailing root word) has no further elements.
#[derive(Debug, Clone, Copy)]
pub struct Iter<'a> {
    words: &'a [u64],
    strings: &'a [u8],
    off: usize,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(words: &'a [u64], strings: &'a [u8], off: usize) -> Self {
        Self { words, strings, off }
    }

    fn word_at(&self, off: usize) -> Option<u64> {
        self.words.get(off).copied()
    }

    fn current(&self) -> Result<(Tag, u64), TapeError> {
        let word = self
            .word_at(self.off)
            .ok_or(TapeError::Corrupt("expected an element, but tape ends"))?;
        let tag = Tag::from_byte((word >> PAYLOAD_BITS) as u8)
            .ok_or(TapeError::Corrupt("unrecognized tag byte"))?;
        Ok((tag, word & PAYLOAD_MASK))
    }

    /// The raw discriminant under the cursor, without advancing.
    ///
    /// `None` past the end of the scope or on a byte that is not a tag.
    #[must_use]
    pub fn peek_tag(&self) -> Option<Tag> {
        self.word_at(self.off)
            .and_then(|w| Tag::from_byte((w >> PAYLOAD_BITS) as u8))
    }

    /// Classify the element under the cursor without advancing.
    ///
    /// `Ok(None)` marks the end of the scope being iterated. An unrecognized
    /// tag byte is reported as corruption rather than silently ending the
    /// scope.
    pub fn peek(&self) -> Result<Option<Type>, TapeError> {
        let Some(word) = self.word_at(self.off) else {
            return Ok(None);
        };
        let tag = Tag::from_byte((word >> PAYLOAD_BITS) as u8)
            .ok_or(TapeError::Corrupt("unrecognized tag byte"))?;
        // The trailing root word points backwards; it closes the document.
        if tag == Tag::Root && ((word & PAYLOAD_MASK) as usize) <= self.off {
            return Ok(None);
        }
        Ok(tag.value_type())
    }

    /// Step over the element under the cursor, landing on its next sibling.
    ///
    /// Compound elements are skipped whole in O(1) via the offset recorded in
    /// their open word. Returns the type stepped over, or `Ok(None)` (without
    /// moving) at the end of the scope.
    pub fn advance(&mut self) -> Result<Option<Type>, TapeError> {
        let Some(t) = self.peek()? else {
            return Ok(None);
        };
        let (tag, payload) = self.current()?;
        match tag {
            Tag::Root | Tag::ArrayStart | Tag::ObjectStart => {
                let next = payload as usize;
                if next <= self.off || next > self.words.len() {
                    return Err(TapeError::Corrupt("scope skip offset out of bounds"));
                }
                self.off = next;
            }
            _ => {
                let n = tag.word_count();
                if self.off + n > self.words.len() {
                    return Err(TapeError::Corrupt("expected a value payload, but tape ends"));
                }
                self.off += n;
            }
        }
        Ok(Some(t))
    }

    /// Yield the element under the cursor and advance past it entirely.
    ///
    /// A compound element comes back as a sub-cursor scoped to its contents;
    /// a scalar comes back as a copy positioned on the element. `Ok(None)` at
    /// the end of the scope.
    pub fn next_iter(&mut self) -> Result<Option<(Type, Iter<'a>)>, TapeError> {
        let Some(t) = self.peek()? else {
            return Ok(None);
        };
        let elem = match t {
            Type::Array | Type::Object | Type::Root => self.scope()?,
            _ => *self,
        };
        self.advance()?;
        Ok(Some((t, elem)))
    }

    // A sub-cursor over the contents of the compound element under the
    // cursor. The word slice ends one past the scope's close word, so slice
    // exhaustion only ever means a truncated tape.
    fn scope(&self) -> Result<Iter<'a>, TapeError> {
        let (_, payload) = self.current()?;
        let end = payload as usize;
        if end <= self.off || end > self.words.len() {
            return Err(TapeError::Corrupt("scope skip offset out of bounds"));
        }
        Ok(Iter {
            words: &self.words[..end],
            strings: self.strings,
            off: self.off + 1,
        })
    }

    fn payload_word(&self) -> Result<u64, TapeError> {
        self.word_at(self.off + 1)
            .ok_or(TapeError::Corrupt("expected a value payload, but tape ends"))
    }

    fn mismatch(&self, wanted: Type, tag: Tag) -> TapeError {
        match tag.value_type() {
            Some(found) => TapeError::TypeMismatch { wanted, found },
            None => TapeError::Corrupt("no element under the cursor"),
        }
    }

    /// Read the element as a float. Integer elements widen losslessly in
    /// magnitude (beyond 2^53 the nearest float is returned).
    pub fn as_f64(&self) -> Result<f64, TapeError> {
        let (tag, _) = self.current()?;
        match tag {
            Tag::Float => Ok(f64::from_bits(self.payload_word()?)),
            Tag::Int => Ok(self.payload_word()? as i64 as f64),
            Tag::Uint => Ok(self.payload_word()? as f64),
            _ => Err(self.mismatch(Type::Float, tag)),
        }
    }

    /// Read the element as a signed integer.
    ///
    /// Unsigned elements must fit in `i64`; float elements must lie in
    /// [-2^63, 2^63) and have their fraction truncated toward zero. Anything
    /// out of range fails, it is never wrapped or saturated.
    pub fn as_i64(&self) -> Result<i64, TapeError> {
        let (tag, _) = self.current()?;
        match tag {
            Tag::Int => Ok(self.payload_word()? as i64),
            Tag::Uint => i64::try_from(self.payload_word()?)
                .map_err(|_| TapeError::OutOfRange("unsigned value overflows i64")),
            Tag::Float => float_to_i64(f64::from_bits(self.payload_word()?)),
            _ => Err(self.mismatch(Type::Int, tag)),
        }
    }

    /// Read the element as an unsigned integer.
    ///
    /// Signed elements must be non-negative; float elements must lie in
    /// [0, 2^64) and have their fraction truncated.
    pub fn as_u64(&self) -> Result<u64, TapeError> {
        let (tag, _) = self.current()?;
        match tag {
            Tag::Uint => self.payload_word(),
            Tag::Int => u64::try_from(self.payload_word()? as i64)
                .map_err(|_| TapeError::OutOfRange("negative value cannot convert to u64")),
            Tag::Float => float_to_u64(f64::from_bits(self.payload_word()?)),
            _ => Err(self.mismatch(Type::Uint, tag)),
        }
    }

    /// Borrow the element as a string slice into the tape's string buffer.
    pub fn as_str(&self) -> Result<&'a str, TapeError> {
        let (tag, payload) = self.current()?;
        if tag != Tag::String {
            return Err(self.mismatch(Type::String, tag));
        }
        let start = payload as usize;
        let tail = self
            .strings
            .get(start..)
            .ok_or(TapeError::Corrupt("string offset past the string buffer"))?;
        let Some((len_bytes, rest)) = tail.split_first_chunk::<4>() else {
            return Err(TapeError::Corrupt("string length prefix is truncated"));
        };
        let len = u32::from_le_bytes(*len_bytes) as usize;
        let bytes = rest
            .get(..len)
            .ok_or(TapeError::Corrupt("string bytes are truncated"))?;
        bytes
            .to_str()
            .map_err(|_| TapeError::Corrupt("string bytes are not valid UTF-8"))
    }

    /// Read the element as a boolean.
    pub fn as_bool(&self) -> Result<bool, TapeError> {
        let (tag, _) = self.current()?;
        match tag {
            Tag::True => Ok(true),
            Tag::False => Ok(false),
            _ => Err(self.mismatch(Type::Bool, tag)),
        }
    }

    /// Bind the array accessor when the cursor sits on an array element.
    pub fn array(&self) -> Result<Array<'a>, TapeError> {
        let (tag, _) = self.current()?;
        if tag != Tag::ArrayStart {
            return Err(self.mismatch(Type::Array, tag));
        }
        let sub = self.scope()?;
        Ok(Array::new(sub.words, sub.strings, sub.off))
    }

    /// Materialize the element under the cursor into a [`Value`] tree.
    ///
    /// Nested arrays and objects recurse; the document root materializes its
    /// single top-level element.
    pub fn value(&self) -> Result<Value, TapeError> {
        let Some(t) = self.peek()? else {
            return Err(TapeError::Corrupt("no element under the cursor"));
        };
        match t {
            Type::Null => Ok(Value::Null),
            Type::Bool => Ok(Value::Bool(self.as_bool()?)),
            Type::Int => Ok(Value::Int(self.as_i64()?)),
            Type::Uint => Ok(Value::Uint(self.as_u64()?)),
            Type::Float => Ok(Value::Float(self.as_f64()?)),
            Type::String => Ok(Value::String(String::from(self.as_str()?))),
            Type::Array => Ok(Value::Array(self.array()?.values()?)),
            Type::Object => {
                let mut sub = self.scope()?;
                let mut map = Map::new();
                while sub.peek()?.is_some() {
                    let key = sub.as_str()?;
                    sub.advance()?;
                    let Some((_, elem)) = sub.next_iter()? else {
                        return Err(TapeError::Corrupt("object scope ends mid-pair"));
                    };
                    map.insert(String::from(key), elem.value()?);
                }
                Ok(Value::Object(map))
            }
            Type::Root => self.scope()?.value(),
        }
    }

    /// Append the element's canonical JSON rendering to `dst`.
    ///
    /// Output is appended, never overwritten. Fails on non-finite floats and
    /// on scopes that do not end with their matching close word.
    pub fn serialize_into(&self, dst: &mut Vec<u8>) -> Result<(), TapeError> {
        let Some(t) = self.peek()? else {
            return Err(TapeError::Corrupt("no element under the cursor"));
        };
        match t {
            Type::Null => dst.extend_from_slice(b"null"),
            Type::Bool => {
                let lit: &[u8] = if self.as_bool()? { b"true" } else { b"false" };
                dst.extend_from_slice(lit);
            }
            Type::Int => dst.extend_from_slice(self.as_i64()?.to_string().as_bytes()),
            Type::Uint => dst.extend_from_slice(self.as_u64()?.to_string().as_bytes()),
            Type::Float => {
                let v = self.as_f64()?;
                if !v.is_finite() {
                    return Err(TapeError::NonFinite);
                }
                dst.extend_from_slice(v.to_string().as_bytes());
            }
            Type::String => {
                dst.push(b'"');
                dst.extend_from_slice(escape_string(self.as_str()?).as_bytes());
                dst.push(b'"');
            }
            Type::Array => self.array()?.serialize_into(dst)?,
            Type::Object => {
                let mut sub = self.scope()?;
                dst.push(b'{');
                let mut first = true;
                while sub.peek()?.is_some() {
                    if !first {
                        dst.push(b',');
                    }
                    first = false;
                    let key = sub.as_str()?;
                    sub.advance()?;
                    dst.push(b'"');
                    dst.extend_from_slice(escape_string(key).as_bytes());
                    dst.extend_from_slice(b"\":");
                    let Some((_, elem)) = sub.next_iter()? else {
                        return Err(TapeError::Corrupt("object scope ends mid-pair"));
                    };
                    elem.serialize_into(dst)?;
                }
                if sub.peek_tag() != Some(Tag::ObjectEnd) {
                    return Err(TapeError::Corrupt("expected object close tag at end of scope"));
                }
                dst.push(b'}');
            }
            Type::Root => self.scope()?.serialize_into(dst)?,
        }
        Ok(())
    }

    /// The element's canonical JSON rendering as fresh bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, TapeError> {
        let mut dst = Vec::new();
        self.serialize_into(&mut dst)?;
        Ok(dst)
    }
}

// 2^63 rounds to itself as f64, so the exclusive upper bound is exact; the
// lower bound -2^63 is exactly representable and therefore inclusive.
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const U64_UPPER: f64 = 18_446_744_073_709_551_616.0;

pub(crate) fn float_to_i64(v: f64) -> Result<i64, TapeError> {
    if v.is_nan() {
        return Err(TapeError::OutOfRange("NaN has no integer value"));
    }
    if v >= I64_UPPER {
        return Err(TapeError::OutOfRange("float value overflows i64"));
    }
    if v < I64_LOWER {
        return Err(TapeError::OutOfRange("float value underflows i64"));
    }
    Ok(v as i64)
}

pub(crate) fn float_to_u64(v: f64) -> Result<u64, TapeError> {
    if v.is_nan() {
        return Err(TapeError::OutOfRange("NaN has no integer value"));
    }
    if v >= U64_UPPER {
        return Err(TapeError::OutOfRange("float value overflows u64"));
    }
    if v < 0.0 {
        return Err(TapeError::OutOfRange("negative value cannot convert to u64"));
    }
    Ok(v as u64)
}
