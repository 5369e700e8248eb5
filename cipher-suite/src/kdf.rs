//! Password based key derivation for the PBES2 envelope.
//!
//! Derivation schemes are identified by OID and carry their settings
//! in a DER parameter record next to the encrypted data. The parsing
//! side is an object-safe [`KdfScheme`] so new schemes can be added to
//! the registry; the generating side are the `*Opts` builders which
//! draw a fresh salt and emit the matching record.

use rand_core::RngCore;

use der_event::de::Reader;
use der_event::Oid;
use der_event::se::Writer;

use crate::error::{Error, Result};

/// PBKDF2 RFC 8018
pub const OID_PBKDF2: &str = "1.2.840.113549.1.5.12";
/// scrypt RFC 7914
pub const OID_SCRYPT: &str = "1.3.6.1.4.1.11591.4.11";

const OID_HMAC_SHA1: &str = "1.2.840.113549.2.7";
const OID_HMAC_SHA256: &str = "1.2.840.113549.2.9";
const OID_HMAC_SHA512: &str = "1.2.840.113549.2.11";

fn oid(text: &str) -> Oid {
    match text.parse() {
        Ok(oid) => oid,
        Err(_) => unreachable!("built-in OID strings are well formed"),
    }
}

/// the PBKDF2 pseudo random function choices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prf {
    HmacSha1,
    HmacSha256,
    HmacSha512,
}

impl Prf {
    pub fn oid(self) -> Oid {
        match self {
            Prf::HmacSha1 => oid(OID_HMAC_SHA1),
            Prf::HmacSha256 => oid(OID_HMAC_SHA256),
            Prf::HmacSha512 => oid(OID_HMAC_SHA512),
        }
    }

    fn from_oid(value: &Oid) -> Result<Prf> {
        let text = value.to_string();
        match text.as_str() {
            OID_HMAC_SHA1 => Ok(Prf::HmacSha1),
            OID_HMAC_SHA256 => Ok(Prf::HmacSha256),
            OID_HMAC_SHA512 => Ok(Prf::HmacSha512),
            _ => Err(Error::UnsupportedKdf(text)),
        }
    }

    fn derive(self, password: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]) {
        match self {
            Prf::HmacSha1 => pbkdf2::pbkdf2_hmac::<sha1::Sha1>(password, salt, iterations, out),
            Prf::HmacSha256 => pbkdf2::pbkdf2_hmac::<sha2::Sha256>(password, salt, iterations, out),
            Prf::HmacSha512 => pbkdf2::pbkdf2_hmac::<sha2::Sha512>(password, salt, iterations, out),
        }
    }
}

/// a registered derivation scheme: parse its parameter record and
/// derive `size` bytes of key material
pub trait KdfScheme: Send + Sync {
    fn oid(&self) -> Oid;
    fn derive(&self, password: &[u8], params: &[u8], size: usize) -> Result<Vec<u8>>;
}

pub struct Pbkdf2Scheme;

impl KdfScheme for Pbkdf2Scheme {
    fn oid(&self) -> Oid {
        oid(OID_PBKDF2)
    }

    fn derive(&self, password: &[u8], params: &[u8], size: usize) -> Result<Vec<u8>> {
        let mut reader = Reader::from(params);
        let mut seq = reader.sequence()?;
        let salt = seq.octet_string()?.to_vec();
        let iterations = seq.deserialize::<u32>()?;
        if iterations == 0 {
            return Err(Error::KdfParams);
        }
        // optional keyLength; when present it must agree with the suite
        if !seq.is_empty() && seq.peek_tag()? == der_event::TAG_INTEGER {
            let key_length = seq.deserialize::<u32>()? as usize;
            if key_length != size {
                return Err(Error::KdfParams);
            }
        }
        let prf = if seq.is_empty() {
            Prf::HmacSha1
        } else {
            let mut alg = seq.sequence()?;
            let prf = Prf::from_oid(&alg.oid()?)?;
            if !alg.is_empty() {
                alg.null()?;
            }
            prf
        };
        seq.expect_end()?;

        let mut out = vec![0u8; size];
        prf.derive(password, &salt, iterations, &mut out);
        Ok(out)
    }
}

pub struct ScryptScheme;

impl KdfScheme for ScryptScheme {
    fn oid(&self) -> Oid {
        oid(OID_SCRYPT)
    }

    fn derive(&self, password: &[u8], params: &[u8], size: usize) -> Result<Vec<u8>> {
        let mut reader = Reader::from(params);
        let mut seq = reader.sequence()?;
        let salt = seq.octet_string()?.to_vec();
        let cost = seq.deserialize::<u64>()?;
        let block_size = seq.deserialize::<u32>()?;
        let parallelization = seq.deserialize::<u32>()?;
        if !seq.is_empty() {
            let key_length = seq.deserialize::<u32>()? as usize;
            if key_length != size {
                return Err(Error::KdfParams);
            }
        }
        seq.expect_end()?;

        scrypt_derive(password, &salt, cost, block_size, parallelization, size)
    }
}

fn scrypt_derive(
    password: &[u8],
    salt: &[u8],
    cost: u64,
    block_size: u32,
    parallelization: u32,
    size: usize,
) -> Result<Vec<u8>> {
    if cost < 2 || !cost.is_power_of_two() {
        return Err(Error::KdfParams);
    }
    let log_n = cost.trailing_zeros() as u8;
    let params =
        scrypt::Params::new(log_n, block_size, parallelization, size).map_err(|_| Error::KdfParams)?;
    let mut out = vec![0u8; size];
    scrypt::scrypt(password, salt, &params, &mut out).map_err(|_| Error::KdfParams)?;
    Ok(out)
}

/// PBKDF2 settings for the generating side
#[derive(Debug, Clone, Copy)]
pub struct Pbkdf2Opts {
    pub iterations: u32,
    pub prf: Prf,
    pub salt_len: usize,
    /// emit the optional keyLength field; suites with a negotiable key
    /// size (RC2, RC5) need it
    pub with_key_length: bool,
}

impl Default for Pbkdf2Opts {
    fn default() -> Self {
        Pbkdf2Opts { iterations: 10_000, prf: Prf::HmacSha256, salt_len: 16, with_key_length: false }
    }
}

impl Pbkdf2Opts {
    pub fn oid(&self) -> Oid {
        oid(OID_PBKDF2)
    }

    /// derive `size` bytes with a fresh salt, returning the key and
    /// the parameter record
    pub fn derive_new(
        &self,
        rng: &mut dyn RngCore,
        password: &[u8],
        size: usize,
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        if self.iterations == 0 {
            return Err(Error::KdfParams);
        }
        let mut salt = vec![0u8; self.salt_len];
        rng.fill_bytes(&mut salt);

        let mut key = vec![0u8; size];
        self.prf.derive(password, &salt, self.iterations, &mut key);

        let with_key_length = self.with_key_length;
        let prf = self.prf;
        let iterations = self.iterations;
        let params = Writer::new()
            .write_sequence(move |writer| {
                let mut writer = writer
                    .write_octet_string(&salt)?
                    .write_unsigned(u64::from(iterations))?;
                if with_key_length {
                    writer = writer.write_unsigned(size as u64)?;
                }
                if prf != Prf::HmacSha1 {
                    writer = writer
                        .write_sequence(|alg| alg.write_oid(&prf.oid())?.write_null())?;
                }
                Ok(writer)
            })?
            .finalize();
        Ok((key, params))
    }
}

/// scrypt settings for the generating side
#[derive(Debug, Clone, Copy)]
pub struct ScryptOpts {
    pub cost: u64,
    pub block_size: u32,
    pub parallelization: u32,
    pub salt_len: usize,
}

impl Default for ScryptOpts {
    fn default() -> Self {
        ScryptOpts { cost: 1 << 15, block_size: 8, parallelization: 1, salt_len: 16 }
    }
}

impl ScryptOpts {
    pub fn oid(&self) -> Oid {
        oid(OID_SCRYPT)
    }

    pub fn derive_new(
        &self,
        rng: &mut dyn RngCore,
        password: &[u8],
        size: usize,
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        let mut salt = vec![0u8; self.salt_len];
        rng.fill_bytes(&mut salt);

        let key = scrypt_derive(password, &salt, self.cost, self.block_size, self.parallelization, size)?;

        let cost = self.cost;
        let block_size = self.block_size;
        let parallelization = self.parallelization;
        let params = Writer::new()
            .write_sequence(move |writer| {
                writer
                    .write_octet_string(&salt)?
                    .write_unsigned(cost)?
                    .write_unsigned(u64::from(block_size))?
                    .write_unsigned(u64::from(parallelization))
            })?
            .finalize();
        Ok((key, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn pbkdf2_record_roundtrip() {
        for &prf in [Prf::HmacSha1, Prf::HmacSha256, Prf::HmacSha512].iter() {
            let opts = Pbkdf2Opts { iterations: 600, prf, salt_len: 8, with_key_length: false };
            let (key, params) = opts.derive_new(&mut OsRng, b"password", 24).unwrap();
            assert_eq!(key.len(), 24);

            let again = Pbkdf2Scheme.derive(b"password", &params, 24).unwrap();
            assert_eq!(again, key);
            let other = Pbkdf2Scheme.derive(b"Password", &params, 24).unwrap();
            assert_ne!(other, key);
        }
    }

    #[test]
    fn pbkdf2_key_length_field() {
        let opts = Pbkdf2Opts { with_key_length: true, iterations: 600, ..Pbkdf2Opts::default() };
        let (key, params) = opts.derive_new(&mut OsRng, b"secret", 16).unwrap();
        assert_eq!(Pbkdf2Scheme.derive(b"secret", &params, 16).unwrap(), key);
        // a record demanding a different size is rejected
        assert!(Pbkdf2Scheme.derive(b"secret", &params, 32).is_err());
    }

    #[test]
    fn scrypt_record_roundtrip() {
        let opts = ScryptOpts { cost: 1 << 10, ..ScryptOpts::default() };
        let (key, params) = opts.derive_new(&mut OsRng, b"password", 32).unwrap();
        assert_eq!(key.len(), 32);
        assert_eq!(ScryptScheme.derive(b"password", &params, 32).unwrap(), key);
    }

    #[test]
    fn scrypt_rejects_non_power_of_two_cost() {
        let opts = ScryptOpts { cost: 1000, ..ScryptOpts::default() };
        assert!(opts.derive_new(&mut OsRng, b"password", 32).is_err());
    }

    #[test]
    fn pbkdf2_salt_makes_keys_unique() {
        let opts = Pbkdf2Opts { iterations: 600, ..Pbkdf2Opts::default() };
        let (a, _) = opts.derive_new(&mut OsRng, b"password", 16).unwrap();
        let (b, _) = opts.derive_new(&mut OsRng, b"password", 16).unwrap();
        assert_ne!(a, b);
    }
}
