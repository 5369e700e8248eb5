//! GOST R 34.10 public key cryptography.
//!
//! Short Weierstrass curves over prime fields with the GOST signature
//! scheme (34.10-2001 and the 34.10-2012 revision share the math, only
//! the digest differs), VKO key agreement deriving key encryption keys
//! from a Diffie-Hellman point, and the PKCS#8 shapes of GOST keys.
//!
//! Two conventions differ from most ECC code and are kept throughout:
//! digests are interpreted as little-endian integers, and private key
//! bytes are little-endian as well.

pub mod curve;
pub mod error;
pub mod key;
pub mod pkcs8;
pub mod registry;
pub mod vko;

pub use curve::{Curve, Point};
pub use error::{Error, Result};
pub use key::{PrivateKey, PublicKey};
pub use registry::{curve_by_name, curve_by_oid, register_curve};

/// how many times probabilistic steps re-draw before giving up
pub(crate) const MAX_RETRIES: usize = 1024;
