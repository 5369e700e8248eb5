use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// a coordinate pair that does not satisfy the curve equation
    NotOnCurve,
    /// a point, scalar or ciphertext encoding of the wrong length
    InvalidEncoding { expected: usize, got: usize },
    /// a scalar outside the (0, n) range
    InvalidScalar,
    /// signature h or S failed its range or group checks
    InvalidSignature,
    /// refusing to encrypt nothing
    EmptyPlaintext,
    /// authentication failed during decryption; deliberately opaque
    Decryption,
    /// the randomness source kept producing unusable values
    RetriesExceeded,
    /// a modular inverse that does not exist
    NotInvertible,
    /// derivation of the fixed group parameters failed
    Setup(&'static str),
    /// a key exchange call arrived in the wrong phase
    ExchangeState(&'static str),
    /// the peer's confirmation value did not match
    ConfirmationFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotOnCurve => write!(f, "point is not on the curve"),
            Error::InvalidEncoding { expected, got } => {
                write!(f, "invalid encoding, expected {} bytes but received {}", expected, got)
            }
            Error::InvalidScalar => write!(f, "scalar is out of range"),
            Error::InvalidSignature => write!(f, "malformed signature"),
            Error::EmptyPlaintext => write!(f, "plaintext is empty"),
            Error::Decryption => write!(f, "decryption failed"),
            Error::RetriesExceeded => write!(f, "randomness retries exceeded"),
            Error::NotInvertible => write!(f, "value is not invertible"),
            Error::Setup(what) => write!(f, "could not derive the {}", what),
            Error::ExchangeState(phase) => write!(f, "key exchange is not in the {} phase", phase),
            Error::ConfirmationFailed => write!(f, "key confirmation failed"),
        }
    }
}

impl ::std::error::Error for Error {}

pub type Result<T> = ::std::result::Result<T, Error>;
