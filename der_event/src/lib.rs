//! # DER event library
//!
//! [`Reader`]: ./de/struct.Reader.html
//! [`Deserialize`]: ./de/trait.Deserialize.html
//! [`Writer`]: ./se/struct.Writer.html
//! [`Serialize`]: ./se/trait.Serialize.html
//! [`Error`]: ./enum.Error.html
//!
//! `der_event` is a minimalist implementation of the ASN.1 DER binary
//! encoding, covering the subset the PKCS family of formats needs. It
//! provides a simple way to produce and consume DER without an
//! intermediate tree representation.
//!
//! Supported elements:
//!
//! - INTEGER (as `u64` and as raw big-endian magnitudes for bignums);
//! - OCTET STRING and BIT STRING (**zero unused bits only**);
//! - OBJECT IDENTIFIER (the [`Oid`](./struct.Oid.html) type);
//! - NULL;
//! - SEQUENCE and constructed context-specific tags;
//! - raw splicing of pre-encoded elements.
//!
//! Only definite lengths are produced and accepted, as DER requires.
//!
//! ## Deserialisation: [`Reader`]
//!
//! ```
//! use der_event::de::*;
//!
//! let bytes = vec![0x04, 0x03, 0x01, 0x02, 0x03];
//! let mut reader = Reader::from(&bytes[..]);
//! let content = reader.octet_string().unwrap();
//!
//! # assert_eq!(content, [1, 2, 3].as_ref());
//! ```
//!
//! ## Serialisation: [`Writer`]
//!
//! ```
//! use der_event::se::Writer;
//!
//! let writer = Writer::new();
//! let writer = writer.write_unsigned(7).expect("write an integer");
//!
//! # let bytes = writer.finalize();
//! # assert_eq!(bytes, [0x02, 0x01, 0x07].as_ref());
//! ```

mod error;
mod oid;
mod result;
pub mod de;
pub mod se;

pub use de::Deserialize;
pub use error::Error;
pub use oid::Oid;
pub use result::Result;
pub use se::Serialize;

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_BIT_STRING: u8 = 0x03;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_NULL: u8 = 0x05;
pub const TAG_OID: u8 = 0x06;
pub const TAG_SEQUENCE: u8 = 0x30;
pub const TAG_CONTEXT: u8 = 0xa0;

/// exported as a convenient function to test the implementation of
/// [`Serialize`](./se/trait.Serialize.html) and
/// [`Deserialize`](./de/trait.Deserialize.html).
pub fn test_encode_decode<V: Sized + PartialEq + Serialize + Deserialize>(v: &V) -> Result<bool> {
    let bytes = Serialize::serialize(v, se::Writer::new())?.finalize();

    let mut reader = de::Reader::from(&bytes[..]);
    let v_: V = Deserialize::deserialize(&mut reader)?;
    reader.expect_end()?;

    Ok(v == &v_)
}
