use std::fmt;

/// all expected errors for DER parsing and serialising
#[derive(Debug)]
pub enum Error {
    /// not enough data, the first element is the actual size, the second
    /// is the expected size.
    NotEnough(usize, usize),
    /// were expecting a different tag byte. The first element is the
    /// expected tag, the second is the tag found.
    Expected(u8, u8),
    /// indefinite lengths are forbidden in DER
    IndefiniteLength,
    /// the length field does not fit in a usize or uses more than 4 bytes
    LengthTooLarge,
    /// INTEGER does not fit the requested native type
    IntegerTooLarge,
    /// negative INTEGER where an unsigned magnitude was expected
    UnexpectedNegative,
    /// BIT STRING with a non-zero number of unused bits
    UnsupportedBitString(u8),
    /// malformed OBJECT IDENTIFIER content
    InvalidOid,
    /// bytes remain after the last expected element
    TrailingData(usize),

    CustomError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotEnough(actual, expected) => {
                write!(f, "not enough data, expected {} bytes but got {}", expected, actual)
            }
            Error::Expected(expected, actual) => write!(
                f,
                "expected tag 0x{:02x} but found tag 0x{:02x}",
                expected, actual
            ),
            Error::IndefiniteLength => write!(f, "indefinite length is forbidden in DER"),
            Error::LengthTooLarge => write!(f, "length field too large"),
            Error::IntegerTooLarge => write!(f, "INTEGER does not fit the native type"),
            Error::UnexpectedNegative => write!(f, "unexpected negative INTEGER"),
            Error::UnsupportedBitString(unused) => {
                write!(f, "BIT STRING with {} unused bits is not supported", unused)
            }
            Error::InvalidOid => write!(f, "malformed OBJECT IDENTIFIER"),
            Error::TrailingData(n) => write!(f, "{} trailing bytes after the last element", n),
            Error::CustomError(err) => write!(f, "{}", err),
        }
    }
}

impl ::std::error::Error for Error {}
