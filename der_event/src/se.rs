//! DER serialisation tooling

use crate::error::Error;
use crate::oid::Oid;
use crate::result::Result;
use crate::{TAG_BIT_STRING, TAG_CONTEXT, TAG_INTEGER, TAG_NULL, TAG_OCTET_STRING, TAG_OID, TAG_SEQUENCE};

pub trait Serialize {
    fn serialize(&self, writer: Writer) -> Result<Writer>;
}
impl<'a, T: Serialize> Serialize for &'a T {
    fn serialize(&self, writer: Writer) -> Result<Writer> {
        (*self).serialize(writer)
    }
}
impl Serialize for u64 {
    fn serialize(&self, writer: Writer) -> Result<Writer> {
        writer.write_unsigned(*self)
    }
}
impl Serialize for u32 {
    fn serialize(&self, writer: Writer) -> Result<Writer> {
        writer.write_unsigned(u64::from(*self))
    }
}
impl Serialize for Oid {
    fn serialize(&self, writer: Writer) -> Result<Writer> {
        writer.write_oid(self)
    }
}
impl<'a> Serialize for &'a [u8] {
    fn serialize(&self, writer: Writer) -> Result<Writer> {
        writer.write_octet_string(self)
    }
}
impl Serialize for Vec<u8> {
    fn serialize(&self, writer: Writer) -> Result<Writer> {
        writer.write_octet_string(self)
    }
}

/// a DER encoder accumulating bytes; methods consume and return the
/// writer so elements chain with `?`.
#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Writer {
        Writer { buf: Vec::new() }
    }

    pub fn finalize(self) -> Vec<u8> {
        self.buf
    }

    fn write_header(&mut self, tag: u8, len: usize) {
        self.buf.push(tag);
        if len < 0x80 {
            self.buf.push(len as u8);
        } else {
            let bytes = (len as u32).to_be_bytes();
            let skip = bytes.iter().take_while(|&&b| b == 0).count();
            self.buf.push(0x80 | (4 - skip) as u8);
            self.buf.extend_from_slice(&bytes[skip..]);
        }
    }

    fn write_tlv(mut self, tag: u8, content: &[u8]) -> Result<Writer> {
        self.write_header(tag, content.len());
        self.buf.extend_from_slice(content);
        Ok(self)
    }

    /// INTEGER from a native unsigned value
    pub fn write_unsigned(self, v: u64) -> Result<Writer> {
        let bytes = v.to_be_bytes();
        let mut skip = bytes.iter().take_while(|&&b| b == 0).count();
        if skip == 8 {
            skip = 7;
        }
        let mut content = Vec::with_capacity(9);
        // a leading zero octet keeps the value positive
        if bytes[skip] & 0x80 != 0 {
            content.push(0);
        }
        content.extend_from_slice(&bytes[skip..]);
        self.write_tlv(TAG_INTEGER, &content)
    }

    /// INTEGER from the big-endian magnitude of a non-negative bignum
    pub fn write_unsigned_bytes(self, magnitude: &[u8]) -> Result<Writer> {
        let skip = magnitude.iter().take_while(|&&b| b == 0).count();
        let rest = &magnitude[skip..];
        let mut content = Vec::with_capacity(rest.len() + 1);
        if rest.is_empty() || rest[0] & 0x80 != 0 {
            content.push(0);
        }
        content.extend_from_slice(rest);
        self.write_tlv(TAG_INTEGER, &content)
    }

    pub fn write_octet_string(self, bytes: &[u8]) -> Result<Writer> {
        self.write_tlv(TAG_OCTET_STRING, bytes)
    }

    /// BIT STRING with zero unused bits
    pub fn write_bit_string(self, bytes: &[u8]) -> Result<Writer> {
        let mut content = Vec::with_capacity(bytes.len() + 1);
        content.push(0);
        content.extend_from_slice(bytes);
        self.write_tlv(TAG_BIT_STRING, &content)
    }

    pub fn write_null(self) -> Result<Writer> {
        self.write_tlv(TAG_NULL, &[])
    }

    pub fn write_oid(self, oid: &Oid) -> Result<Writer> {
        let content = oid.to_content_bytes();
        self.write_tlv(TAG_OID, &content)
    }

    /// SEQUENCE whose content is produced by the given closure
    pub fn write_sequence<F>(self, f: F) -> Result<Writer>
    where
        F: FnOnce(Writer) -> Result<Writer>,
    {
        let inner = f(Writer::new())?;
        let content = inner.finalize();
        self.write_tlv(TAG_SEQUENCE, &content)
    }

    /// constructed context-specific element `[n]`
    pub fn write_context<F>(self, n: u8, f: F) -> Result<Writer>
    where
        F: FnOnce(Writer) -> Result<Writer>,
    {
        if n > 0x1e {
            return Err(Error::CustomError(format!("context tag {} out of range", n)));
        }
        let inner = f(Writer::new())?;
        let content = inner.finalize();
        self.write_tlv(TAG_CONTEXT | n, &content)
    }

    /// splice an already encoded DER element
    pub fn write_raw(mut self, der: &[u8]) -> Result<Writer> {
        self.buf.extend_from_slice(der);
        Ok(self)
    }

    pub fn serialize<T: Serialize>(self, value: &T) -> Result<Writer> {
        value.serialize(self)
    }
}
