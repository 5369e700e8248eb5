//! Private key envelopes.
//!
//! Three containers around opaque key material: PKCS#8
//! `PrivateKeyInfo` with PBES2 password encryption, RFC 1423
//! `DEK-Info` PEM encryption for legacy PKCS#1 blocks, and the
//! OpenSSH v1 binary envelope with its bcrypt KDF. Ciphers and KDFs
//! come from the `cipher-suite` registries, so anything registered
//! there is usable here by name or OID.

mod error;
pub mod pkcs8;
pub mod rfc1423;
pub mod ssh;

pub use crate::error::{Error, Result};
pub use crate::pkcs8::{
    decrypt_private_key_info, encrypt_private_key_info, marshal_private_key_info,
    parse_private_key_info, KdfOpts,
};
pub use crate::rfc1423::{decrypt_pem_block, encrypt_pem_block, is_encrypted_pem_block};
pub use crate::ssh::{SshKey, DEFAULT_ROUNDS};
