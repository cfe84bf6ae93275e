//! The scoped array accessor.

use alloc::vec::Vec;

use crate::{
    error::TapeError,
    iter::{Iter, float_to_i64},
    tape::{PAYLOAD_BITS, Tag, Type},
    value::Value,
};

/// A JSON array bound to its region of the tape.
///
/// Obtained from [`Iter::array`]. Mixed-content arrays are walked through
/// [`Array::iter`]; homogeneous arrays convert in a single pass through the
/// `as_*` accessors, which stop at the array's close word and fail on the
/// first element that does not fit the requested type.
#[derive(Debug, Clone, Copy)]
pub struct Array<'a> {
    words: &'a [u64],
    strings: &'a [u8],
    off: usize,
}

impl<'a> Array<'a> {
    pub(crate) fn new(words: &'a [u64], strings: &'a [u8], off: usize) -> Self {
        Self { words, strings, off }
    }

    /// A fresh cursor positioned on the first element.
    ///
    /// Cursors are independent: draining one does not move another.
    #[must_use]
    pub fn iter(&self) -> Iter<'a> {
        Iter::new(self.words, self.strings, self.off)
    }

    /// The type of the first element, or `None` for an empty array.
    pub fn first_type(&self) -> Result<Option<Type>, TapeError> {
        self.iter().peek()
    }

    // Assume one value word per element when sizing the output.
    fn size_hint(&self) -> usize {
        self.words.len().saturating_sub(self.off + 1) / 2
    }

    fn tag_at(&self, off: usize) -> Result<Tag, TapeError> {
        let word = self
            .words
            .get(off)
            .copied()
            .ok_or(TapeError::Corrupt("array scope ends without a close tag"))?;
        Tag::from_byte((word >> PAYLOAD_BITS) as u8)
            .ok_or(TapeError::Corrupt("unrecognized tag byte"))
    }

    fn payload_at(&self, off: usize, msg: &'static str) -> Result<u64, TapeError> {
        self.words.get(off).copied().ok_or(TapeError::Corrupt(msg))
    }

    fn mismatch(&self, wanted: Type, tag: Tag) -> TapeError {
        match tag.value_type() {
            Some(found) => TapeError::TypeMismatch { wanted, found },
            None => TapeError::Corrupt("unexpected close tag inside array"),
        }
    }

    /// Materialize every element into a [`Value`] sequence.
    ///
    /// Nested arrays and objects recurse. Fails atomically: the first element
    /// that cannot convert aborts the whole call.
    pub fn values(&self) -> Result<Vec<Value>, TapeError> {
        let mut dst = Vec::with_capacity(self.size_hint());
        let mut i = self.iter();
        while let Some((_, elem)) = i.next_iter()? {
            dst.push(elem.value()?);
        }
        Ok(dst)
    }

    /// Convert every element to a float in one pass over the tape.
    ///
    /// Integer elements widen to float; any other element type fails with a
    /// type mismatch.
    pub fn as_floats(&self) -> Result<Vec<f64>, TapeError> {
        let mut dst = Vec::with_capacity(self.size_hint());
        let mut off = self.off;
        loop {
            let tag = self.tag_at(off)?;
            off += 1;
            match tag {
                Tag::Float => {
                    let bits = self.payload_at(off, "expected float payload, but tape ends")?;
                    dst.push(f64::from_bits(bits));
                }
                Tag::Int => {
                    let bits = self.payload_at(off, "expected integer payload, but tape ends")?;
                    dst.push(bits as i64 as f64);
                }
                Tag::Uint => {
                    let bits = self.payload_at(off, "expected integer payload, but tape ends")?;
                    dst.push(bits as f64);
                }
                Tag::ArrayEnd => break,
                _ => return Err(self.mismatch(Type::Float, tag)),
            }
            off += 1;
        }
        Ok(dst)
    }

    /// Convert every element to a signed integer in one pass over the tape.
    ///
    /// Floats must lie in the `i64` range (the fraction truncates toward
    /// zero) and unsigned values must fit; anything out of range fails, it is
    /// never wrapped or saturated.
    pub fn as_ints(&self) -> Result<Vec<i64>, TapeError> {
        let mut dst = Vec::with_capacity(self.size_hint());
        let mut off = self.off;
        loop {
            let tag = self.tag_at(off)?;
            off += 1;
            match tag {
                Tag::Float => {
                    let bits = self.payload_at(off, "expected float payload, but tape ends")?;
                    dst.push(float_to_i64(f64::from_bits(bits))?);
                }
                Tag::Int => {
                    let bits = self.payload_at(off, "expected integer payload, but tape ends")?;
                    dst.push(bits as i64);
                }
                Tag::Uint => {
                    let bits = self.payload_at(off, "expected integer payload, but tape ends")?;
                    let v = i64::try_from(bits)
                        .map_err(|_| TapeError::OutOfRange("unsigned value overflows i64"))?;
                    dst.push(v);
                }
                Tag::ArrayEnd => break,
                _ => return Err(self.mismatch(Type::Int, tag)),
            }
            off += 1;
        }
        Ok(dst)
    }

    /// Borrow every element as a string slice into the tape's string buffer.
    ///
    /// Non-string elements fail with a type mismatch; an element whose string
    /// reference cannot be decoded propagates its error immediately.
    pub fn as_strings(&self) -> Result<Vec<&'a str>, TapeError> {
        let mut dst = Vec::with_capacity(self.words.len().saturating_sub(self.off + 1));
        let mut i = self.iter();
        loop {
            match i.peek()? {
                None => return Ok(dst),
                Some(Type::String) => {
                    dst.push(i.as_str()?);
                    i.advance()?;
                }
                Some(found) => {
                    return Err(TapeError::TypeMismatch {
                        wanted: Type::String,
                        found,
                    });
                }
            }
        }
    }

    /// Append the array's canonical JSON rendering to `dst`.
    ///
    /// Elements delegate to their own serializers; output is appended, never
    /// overwritten. Fails with a corruption error if the scope does not
    /// terminate on the array's close word.
    pub fn serialize_into(&self, dst: &mut Vec<u8>) -> Result<(), TapeError> {
        dst.push(b'[');
        let mut i = self.iter();
        let mut first = true;
        while i.peek()?.is_some() {
            if !first {
                dst.push(b',');
            }
            first = false;
            i.serialize_into(dst)?;
            i.advance()?;
        }
        if i.peek_tag() != Some(Tag::ArrayEnd) {
            return Err(TapeError::Corrupt("expected array close tag at end of scope"));
        }
        dst.push(b']');
        Ok(())
    }

    /// The array's canonical JSON rendering as fresh bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, TapeError> {
        let mut dst = Vec::new();
        self.serialize_into(&mut dst)?;
        Ok(dst)
    }
}
