use std::fmt;

#[derive(Debug)]
pub enum Error {
    InvalidKeySize { expected: usize, got: usize },
    InvalidIvSize { expected: usize, got: usize },
    InvalidNonceSize(usize),
    InvalidTagSize(usize),
    /// ciphertext length is not a whole number of blocks, or too short
    InvalidDataLength,
    /// malformed or forged padding; deliberately carries no detail
    InvalidPadding,
    /// authenticated decryption failed; deliberately carries no detail
    Decryption,
    /// RC2 parameter version outside the [1, 1024] range
    Rc2Version(u64),
    /// RC5 parameter record with an unsupported word or round count
    Rc5Params,
    UnsupportedCipher(String),
    UnsupportedKdf(String),
    KdfParams,
    Asn1(der_event::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidKeySize { expected, got } => {
                write!(f, "invalid key size, expected {} but received {} bytes", expected, got)
            }
            Error::InvalidIvSize { expected, got } => {
                write!(f, "invalid IV size, expected {} but received {} bytes", expected, got)
            }
            Error::InvalidNonceSize(got) => write!(f, "invalid nonce size {}", got),
            Error::InvalidTagSize(got) => write!(f, "invalid integrity tag size {}", got),
            Error::InvalidDataLength => write!(f, "input length is invalid for the cipher"),
            Error::InvalidPadding => write!(f, "invalid padding"),
            Error::Decryption => write!(f, "decryption failed"),
            Error::Rc2Version(v) => write!(f, "RC2 parameter version {} out of range", v),
            Error::Rc5Params => write!(f, "unsupported RC5 parameters"),
            Error::UnsupportedCipher(name) => write!(f, "unsupported cipher {}", name),
            Error::UnsupportedKdf(name) => write!(f, "unsupported KDF {}", name),
            Error::KdfParams => write!(f, "invalid KDF parameters"),
            Error::Asn1(err) => write!(f, "malformed parameter record: {}", err),
        }
    }
}

impl ::std::error::Error for Error {}

impl From<der_event::Error> for Error {
    fn from(e: der_event::Error) -> Error {
        Error::Asn1(e)
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;
