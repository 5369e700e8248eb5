//! Symmetric cipher suites behind a uniform capability.
//!
//! This crate wraps block-cipher primitives behind the object-safe
//! [`Cipher`](./suite/trait.Cipher.html) contract used by the PKCS
//! encryption schemes: `encrypt` draws the IV or nonce from a caller
//! supplied randomness source, applies padding where the mode needs it
//! and serialises the mode parameters into an ASN.1 DER record;
//! `decrypt` re-derives everything from the parameter record. Suites
//! are identified by name and by OID and live in process-wide
//! registries (pbes2, pkcs1 PEM, ssh), populated at first use and
//! extendable afterwards through the `add_*` calls.
//!
//! Individual suite objects are stateless and safe to share; the modes
//! re-key the underlying primitive on every call.

pub mod block;
pub mod ccm;
pub mod error;
pub mod gcm;
pub mod kdf;
pub mod modes;
pub mod padding;
pub mod rc5;
pub mod registry;
pub mod suite;

pub use block::{BlockAlg, BlockOp};
pub use error::{Error, Result};
pub use kdf::{KdfScheme, Pbkdf2Opts, Prf, ScryptOpts};
pub use registry::{
    add_cipher, add_kdf, add_pem_cipher, add_ssh_cipher, get_cipher_from_name,
    get_cipher_from_oid, get_cipher_or_default, get_kdf, get_pem_cipher, get_ssh_cipher,
    PemCipher, SshCipher, DEFAULT_CIPHER,
};
pub use suite::Cipher;
