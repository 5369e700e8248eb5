use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// a malformed ASN.1 structure
    Asn1(der_event::Error),
    /// the cipher or KDF layer refused the operation
    Cipher(cipher_suite::Error),
    /// PEM framing could not be parsed or produced
    Pem(pem::PemError),
    /// an envelope field that does not match the format
    InvalidFormat(&'static str),
    /// an algorithm identifier this layer does not handle
    UnsupportedEnvelope(String),
    /// wrong password or corrupted payload; deliberately opaque
    Decryption,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Asn1(err) => write!(f, "ASN.1 error: {}", err),
            Error::Cipher(err) => write!(f, "cipher error: {}", err),
            Error::Pem(err) => write!(f, "PEM error: {}", err),
            Error::InvalidFormat(what) => write!(f, "invalid envelope: {}", what),
            Error::UnsupportedEnvelope(what) => write!(f, "unsupported envelope: {}", what),
            Error::Decryption => write!(f, "decryption failed"),
        }
    }
}

impl ::std::error::Error for Error {}

impl From<der_event::Error> for Error {
    fn from(err: der_event::Error) -> Error {
        Error::Asn1(err)
    }
}

impl From<cipher_suite::Error> for Error {
    fn from(err: cipher_suite::Error) -> Error {
        Error::Cipher(err)
    }
}

impl From<pem::PemError> for Error {
    fn from(err: pem::PemError) -> Error {
        Error::Pem(err)
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;
