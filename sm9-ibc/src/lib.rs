//! SM9 identity-based cryptography.
//!
//! Digital signatures, public key encryption and authenticated key
//! exchange where the public key *is* the identity: a key generation
//! centre holds a master secret and extracts per-identity private
//! keys on demand. All three schemes are built on the reduced Tate
//! pairing over the fixed SM9 Barreto-Naehrig curve; the curve, its
//! extension tower and both group generators are derived from the BN
//! parameter at start-up.
//!
//! ```no_run
//! use rand::rngs::OsRng;
//! use sm9_ibc::{sign, verify, SignMasterKey};
//!
//! # fn main() -> sm9_ibc::Result<()> {
//! let master = SignMasterKey::generate(&mut OsRng)?;
//! let public = master.public()?;
//! let key = master.user_key(b"alice@example.com")?;
//!
//! let sig = sign(&mut OsRng, &public, &key, b"hello")?;
//! assert!(verify(&public, b"alice@example.com", b"hello", &sig)?);
//! # Ok(())
//! # }
//! ```

mod encrypt;
mod error;
mod exchange;
mod fp;
mod hash;
mod keys;
mod pairing;
mod points;
mod sign;
mod tower;

pub use crate::encrypt::{decrypt, encrypt, BlockMode};
pub use crate::error::{Error, Result};
pub use crate::exchange::{AgreedKeys, KeyExchange};
pub use crate::keys::{
    EncryptMasterKey, EncryptMasterPublic, EncryptUserKey, Hid, SignMasterKey,
    SignMasterPublic, SignUserKey,
};
pub use crate::pairing::{pairing, Gt};
pub use crate::points::{G1Point, G2Point, G1_BYTES};
pub use crate::sign::{sign, verify, Signature, SIGNATURE_BYTES};

use num_bigint::{BigInt, RandBigInt};
use num_traits::One;
use rand_core::{CryptoRng, RngCore};

/// bound on loops that retry with fresh randomness
pub(crate) const MAX_RETRIES: usize = 1024;

/// a uniform scalar in `[1, n - 1]`
pub(crate) fn rand_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> BigInt {
    rng.gen_bigint_range(&BigInt::one(), &fp::N)
}
