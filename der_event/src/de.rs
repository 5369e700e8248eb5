//! DER deserialisation tooling

use crate::error::Error;
use crate::oid::Oid;
use crate::result::Result;
use crate::{TAG_BIT_STRING, TAG_CONTEXT, TAG_INTEGER, TAG_NULL, TAG_OCTET_STRING, TAG_OID, TAG_SEQUENCE};

pub trait Deserialize: Sized {
    /// method to implement to deserialise an object from the given
    /// `Reader`.
    fn deserialize(reader: &mut Reader) -> Result<Self>;
}

impl Deserialize for u64 {
    fn deserialize(reader: &mut Reader) -> Result<Self> {
        reader.unsigned()
    }
}
impl Deserialize for u32 {
    fn deserialize(reader: &mut Reader) -> Result<Self> {
        let v = reader.unsigned()?;
        if v > u64::from(u32::max_value()) {
            Err(Error::IntegerTooLarge)
        } else {
            Ok(v as u32)
        }
    }
}
impl Deserialize for Oid {
    fn deserialize(reader: &mut Reader) -> Result<Self> {
        reader.oid()
    }
}
impl Deserialize for Vec<u8> {
    fn deserialize(reader: &mut Reader) -> Result<Self> {
        reader.octet_string().map(|b| b.to_vec())
    }
}

/// a cursor over a DER encoded buffer; elements are consumed in order
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> From<&'a [u8]> for Reader<'a> {
    fn from(bytes: &'a [u8]) -> Reader<'a> {
        Reader { bytes, pos: 0 }
    }
}

impl<'a> Reader<'a> {
    /// true when every byte has been consumed
    pub fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// fail unless the reader has been fully consumed
    pub fn expect_end(&self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::TrailingData(self.remaining()))
        }
    }

    /// the tag byte of the next element, without consuming anything
    pub fn peek_tag(&self) -> Result<u8> {
        if self.is_empty() {
            return Err(Error::NotEnough(0, 1));
        }
        Ok(self.bytes[self.pos])
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::NotEnough(self.remaining(), n));
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn read_length(&mut self) -> Result<usize> {
        let first = self.take(1)?[0];
        if first < 0x80 {
            return Ok(first as usize);
        }
        if first == 0x80 {
            return Err(Error::IndefiniteLength);
        }
        let n = (first & 0x7f) as usize;
        if n > 4 {
            return Err(Error::LengthTooLarge);
        }
        let mut len: usize = 0;
        for &b in self.take(n)? {
            len = (len << 8) | b as usize;
        }
        Ok(len)
    }

    /// consume the next element whole, returning its tag and content
    pub fn read_tlv(&mut self) -> Result<(u8, &'a [u8])> {
        let tag = self.take(1)?[0];
        let len = self.read_length()?;
        let content = self.take(len)?;
        Ok((tag, content))
    }

    /// consume the next element whole, returning the raw encoding
    /// (tag, length and content)
    pub fn raw_element(&mut self) -> Result<&'a [u8]> {
        let start = self.pos;
        let _ = self.read_tlv()?;
        Ok(&self.bytes[start..self.pos])
    }

    fn expect(&mut self, tag: u8) -> Result<&'a [u8]> {
        let actual = self.peek_tag()?;
        if actual != tag {
            return Err(Error::Expected(tag, actual));
        }
        let (_, content) = self.read_tlv()?;
        Ok(content)
    }

    /// INTEGER as a native unsigned value
    pub fn unsigned(&mut self) -> Result<u64> {
        let content = self.expect(TAG_INTEGER)?;
        if content.is_empty() {
            return Err(Error::IntegerTooLarge);
        }
        if content[0] & 0x80 != 0 {
            return Err(Error::UnexpectedNegative);
        }
        let trimmed = if content[0] == 0 { &content[1..] } else { content };
        if trimmed.len() > 8 {
            return Err(Error::IntegerTooLarge);
        }
        let mut v: u64 = 0;
        for &b in trimmed {
            v = (v << 8) | u64::from(b);
        }
        Ok(v)
    }

    /// INTEGER as the big-endian magnitude of a non-negative bignum,
    /// with the sign octet stripped
    pub fn unsigned_bytes(&mut self) -> Result<&'a [u8]> {
        let content = self.expect(TAG_INTEGER)?;
        if content.is_empty() {
            return Err(Error::IntegerTooLarge);
        }
        if content[0] & 0x80 != 0 {
            return Err(Error::UnexpectedNegative);
        }
        if content[0] == 0 && content.len() > 1 {
            Ok(&content[1..])
        } else {
            Ok(content)
        }
    }

    pub fn octet_string(&mut self) -> Result<&'a [u8]> {
        self.expect(TAG_OCTET_STRING)
    }

    /// BIT STRING content; only zero unused bits are accepted
    pub fn bit_string(&mut self) -> Result<&'a [u8]> {
        let content = self.expect(TAG_BIT_STRING)?;
        if content.is_empty() {
            return Err(Error::NotEnough(0, 1));
        }
        if content[0] != 0 {
            return Err(Error::UnsupportedBitString(content[0]));
        }
        Ok(&content[1..])
    }

    pub fn null(&mut self) -> Result<()> {
        let content = self.expect(TAG_NULL)?;
        if !content.is_empty() {
            return Err(Error::TrailingData(content.len()));
        }
        Ok(())
    }

    pub fn oid(&mut self) -> Result<Oid> {
        let content = self.expect(TAG_OID)?;
        Oid::from_content_bytes(content)
    }

    /// enter a SEQUENCE, returning a sub-reader over its content
    pub fn sequence(&mut self) -> Result<Reader<'a>> {
        let content = self.expect(TAG_SEQUENCE)?;
        Ok(Reader::from(content))
    }

    /// enter a constructed context-specific element `[n]`
    pub fn context(&mut self, n: u8) -> Result<Reader<'a>> {
        let content = self.expect(TAG_CONTEXT | n)?;
        Ok(Reader::from(content))
    }

    /// enter `[n]` if it is the next element
    pub fn optional_context(&mut self, n: u8) -> Result<Option<Reader<'a>>> {
        if self.is_empty() || self.peek_tag()? != TAG_CONTEXT | n {
            return Ok(None);
        }
        self.context(n).map(Some)
    }

    pub fn deserialize<T: Deserialize>(&mut self) -> Result<T> {
        Deserialize::deserialize(self)
    }
}
