//! PKCS#8 `PrivateKeyInfo` and PBES2 `EncryptedPrivateKeyInfo`.
//!
//! The plaintext shape carries an algorithm OID and the opaque key
//! bytes; the encrypted shape nests a KDF record and a cipher record
//! under the PBES2 OID, with both parameter blobs embedded verbatim so
//! the suite and KDF layers parse their own formats. Encryption looks
//! the suite up by name through the registry's default-fallback path,
//! so a misspelt name still yields a well-encrypted envelope under the
//! default suite (logged, and recoverable on decrypt via the OID).

use cipher_suite::{get_cipher_from_oid, get_cipher_or_default, get_kdf, Pbkdf2Opts, ScryptOpts};
use der_event::de::Reader;
use der_event::se::Writer;
use der_event::Oid;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::error::{Error, Result};

const OID_PBES2: &str = "1.2.840.113549.1.5.13";

fn pbes2_oid() -> Oid {
    match OID_PBES2.parse() {
        Ok(oid) => oid,
        Err(_) => unreachable!("the PBES2 OID literal is well formed"),
    }
}

/// how the encryption key is derived from the password
pub enum KdfOpts {
    Pbkdf2(Pbkdf2Opts),
    Scrypt(ScryptOpts),
}

impl Default for KdfOpts {
    fn default() -> Self {
        KdfOpts::Pbkdf2(Pbkdf2Opts::default())
    }
}

impl KdfOpts {
    fn oid(&self) -> Oid {
        match self {
            KdfOpts::Pbkdf2(opts) => opts.oid(),
            KdfOpts::Scrypt(opts) => opts.oid(),
        }
    }

    fn derive_new(
        &self,
        rng: &mut dyn RngCore,
        password: &[u8],
        size: usize,
        with_key_length: bool,
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        match self {
            KdfOpts::Pbkdf2(opts) => {
                let opts = Pbkdf2Opts { with_key_length, ..*opts };
                Ok(opts.derive_new(rng, password, size)?)
            }
            KdfOpts::Scrypt(opts) => Ok(opts.derive_new(rng, password, size)?),
        }
    }
}

/// wrap raw key bytes in a `PrivateKeyInfo` record
pub fn marshal_private_key_info(algorithm: &Oid, private_key: &[u8]) -> Result<Vec<u8>> {
    let algorithm = algorithm.clone();
    Ok(Writer::new()
        .write_sequence(move |w| {
            w.write_unsigned(0)?
                .write_sequence(move |alg| alg.write_oid(&algorithm)?.write_null())?
                .write_octet_string(private_key)
        })?
        .finalize())
}

/// the algorithm OID and raw key bytes of a `PrivateKeyInfo` record
pub fn parse_private_key_info(der: &[u8]) -> Result<(Oid, Vec<u8>)> {
    let mut reader = Reader::from(der);
    let mut seq = reader.sequence()?;
    reader.expect_end()?;

    let version = seq.unsigned()?;
    if version != 0 {
        return Err(Error::InvalidFormat("PrivateKeyInfo version"));
    }
    let mut alg = seq.sequence()?;
    let oid = alg.oid()?;
    // algorithm parameters vary per scheme and are not interpreted here
    let key = seq.octet_string()?.to_vec();
    Ok((oid, key))
}

/// encrypt a DER blob into an `EncryptedPrivateKeyInfo`
pub fn encrypt_private_key_info<R: RngCore + CryptoRng>(
    rng: &mut R,
    password: &[u8],
    plaintext: &[u8],
    cipher_name: &str,
    kdf: &KdfOpts,
) -> Result<Vec<u8>> {
    let cipher = get_cipher_or_default(cipher_name);
    let (mut key, kdf_params) =
        kdf.derive_new(rng, password, cipher.key_size(), cipher.needs_key_length())?;
    let outcome = cipher.encrypt(rng, &key, plaintext);
    key.zeroize();
    let (encrypted, cipher_params) = outcome?;

    let kdf_oid = kdf.oid();
    let cipher_oid = cipher.oid();
    Ok(Writer::new()
        .write_sequence(move |w| {
            let w = w.write_sequence(move |alg| {
                alg.write_oid(&pbes2_oid())?.write_sequence(move |params| {
                    let params = params.write_sequence(move |k| {
                        k.write_oid(&kdf_oid)?.write_raw(&kdf_params)
                    })?;
                    params.write_sequence(move |c| {
                        c.write_oid(&cipher_oid)?.write_raw(&cipher_params)
                    })
                })
            })?;
            w.write_octet_string(&encrypted)
        })?
        .finalize())
}

/// decrypt an `EncryptedPrivateKeyInfo` back to its DER plaintext
pub fn decrypt_private_key_info(password: &[u8], der: &[u8]) -> Result<Vec<u8>> {
    let mut reader = Reader::from(der);
    let mut seq = reader.sequence()?;
    reader.expect_end()?;

    let mut alg = seq.sequence()?;
    let outer = alg.oid()?;
    if outer != pbes2_oid() {
        return Err(Error::UnsupportedEnvelope(outer.to_string()));
    }
    let mut params = alg.sequence()?;
    let mut kdf_record = params.sequence()?;
    let kdf_oid = kdf_record.oid()?;
    let kdf_params = kdf_record.raw_element()?;
    let mut cipher_record = params.sequence()?;
    let cipher_oid = cipher_record.oid()?;
    let cipher_params = cipher_record.raw_element()?;

    let encrypted = seq.octet_string()?;
    seq.expect_end()?;

    let cipher = get_cipher_from_oid(&cipher_oid)
        .ok_or_else(|| Error::UnsupportedEnvelope(cipher_oid.to_string()))?;
    let kdf = get_kdf(&kdf_oid)?;
    let mut key = kdf.derive(password, kdf_params, cipher.key_size())?;
    let outcome = cipher.decrypt(&key, cipher_params, encrypted);
    key.zeroize();
    // a wrong password surfaces as a padding or tag failure; keep it opaque
    outcome.map_err(|_| Error::Decryption)
}
