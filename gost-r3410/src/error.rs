use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// curve parameters that fail their consistency checks
    InvalidCurve(&'static str),
    /// a coordinate pair that does not satisfy the curve equation
    NotOnCurve,
    /// a point or key encoding of the wrong length
    InvalidEncoding { expected: usize, got: usize },
    /// a scalar outside the (0, q) range
    InvalidScalar,
    /// signature r or s outside the (0, q) range, or a bad length
    InvalidSignature,
    /// the randomness source kept producing unusable values
    RetriesExceeded,
    /// the curve has no Edwards form
    NoEdwardsForm,
    /// a modular inverse that does not exist
    NotInvertible,
    UnknownCurve(String),
    UnsupportedAlgorithm(String),
    Asn1(der_event::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidCurve(what) => write!(f, "invalid curve parameters: {}", what),
            Error::NotOnCurve => write!(f, "point is not on the curve"),
            Error::InvalidEncoding { expected, got } => {
                write!(f, "invalid encoding, expected {} bytes but received {}", expected, got)
            }
            Error::InvalidScalar => write!(f, "scalar is out of range"),
            Error::InvalidSignature => write!(f, "malformed signature"),
            Error::RetriesExceeded => write!(f, "randomness retries exceeded"),
            Error::NoEdwardsForm => write!(f, "curve has no twisted Edwards form"),
            Error::NotInvertible => write!(f, "value is not invertible"),
            Error::UnknownCurve(name) => write!(f, "unknown curve {}", name),
            Error::UnsupportedAlgorithm(oid) => write!(f, "unsupported algorithm {}", oid),
            Error::Asn1(err) => write!(f, "malformed key record: {}", err),
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
