//! The OpenSSH v1 private key envelope.
//!
//! Binary layout: the magic, then SSH wire strings for the cipher
//! name, KDF name, KDF options, a key count (always one here), the
//! public key blob and the private block. The private block opens
//! with a duplicated random 32-bit check value, carries the key type
//! string and the opaque key payload, and is padded with the bytes
//! 1, 2, 3, ... to the cipher block size before encryption. The key
//! payload is kept opaque so the envelope stays bit-faithful without
//! per-algorithm codecs.
//!
//! Encoding always names the `bcrypt` KDF as OpenSSH does; parsing
//! also accepts the `bcryptbin` (raw salt plus rounds word) and
//! `pcrypt` (PBKDF2-HMAC-SHA256) option variants.

use cipher_suite::get_ssh_cipher;
use log::debug;
use pem::Pem;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::error::{Error, Result};

const MAGIC: &[u8] = b"openssh-key-v1\x00";
const KDF_BCRYPT: &str = "bcrypt";
const KDF_BCRYPT_BIN: &str = "bcryptbin";
const KDF_PBKDF2: &str = "pcrypt";
const KDF_NONE: &str = "none";
const CIPHER_NONE: &str = "none";
const SALT_LEN: usize = 16;
const PEM_TAG: &str = "OPENSSH PRIVATE KEY";

/// the bcrypt work factor used when none is given
pub const DEFAULT_ROUNDS: u32 = 16;

/// one private key as the envelope carries it: the algorithm name,
/// the public blob and the opaque private payload (per-algorithm
/// fields plus the trailing comment string)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshKey {
    pub key_type: String,
    pub public: Vec<u8>,
    pub payload: Vec<u8>,
}

fn write_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn write_string(out: &mut Vec<u8>, data: &[u8]) {
    write_u32(out, data.len() as u32);
    out.extend_from_slice(data);
}

/// a cursor over SSH wire data
struct WireReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    fn from(bytes: &'a [u8]) -> WireReader<'a> {
        WireReader { bytes, pos: 0 }
    }

    fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.bytes.len() - self.pos < n {
            return Err(Error::InvalidFormat("truncated wire data"));
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn u32(&mut self) -> Result<u32> {
        let raw = self.take(4)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn string(&mut self) -> Result<&'a [u8]> {
        let len = self.u32()? as usize;
        self.take(len)
    }
}

fn derive_key_iv(password: &[u8], salt: &[u8], rounds: u32, size: usize) -> Result<Vec<u8>> {
    if rounds == 0 {
        return Err(Error::InvalidFormat("bcrypt rounds"));
    }
    let mut out = vec![0u8; size];
    bcrypt_pbkdf::bcrypt_pbkdf(password, salt, rounds, &mut out)
        .map_err(|_| Error::InvalidFormat("bcrypt parameters"))?;
    Ok(out)
}

/// interpret the KDF options blob for one of the named variants.
/// `bcrypt` and `pcrypt` frame the salt as an SSH string followed by a
/// rounds word; `bcryptbin` is the bare salt with the rounds word
/// appended.
fn derive_for_kdf(
    kdf_name: &str,
    kdf_opts: &[u8],
    password: &[u8],
    size: usize,
) -> Result<Vec<u8>> {
    let (salt, rounds) = match kdf_name {
        KDF_BCRYPT | KDF_PBKDF2 => {
            let mut opts = WireReader::from(kdf_opts);
            let salt = opts.string()?.to_vec();
            (salt, opts.u32()?)
        }
        KDF_BCRYPT_BIN => {
            if kdf_opts.len() <= 4 {
                return Err(Error::InvalidFormat("bcryptbin options"));
            }
            let (salt, tail) = kdf_opts.split_at(kdf_opts.len() - 4);
            (salt.to_vec(), u32::from_be_bytes([tail[0], tail[1], tail[2], tail[3]]))
        }
        _ => return Err(Error::UnsupportedEnvelope(kdf_name.to_string())),
    };
    if kdf_name == KDF_PBKDF2 {
        if rounds == 0 {
            return Err(Error::InvalidFormat("pbkdf2 rounds"));
        }
        let mut out = vec![0u8; size];
        pbkdf2::pbkdf2_hmac::<sha2::Sha256>(password, &salt, rounds, &mut out);
        Ok(out)
    } else {
        derive_key_iv(password, &salt, rounds, size)
    }
}

/// strip the 1, 2, 3, ... padding suffix; the payload is opaque, so
/// the longest well-formed suffix shorter than a block is removed
fn strip_padding(data: &[u8], block_size: usize) -> &[u8] {
    let mut pad = 0usize;
    for candidate in 1..block_size {
        if candidate > data.len() {
            break;
        }
        let tail = &data[data.len() - candidate..];
        if tail.iter().enumerate().all(|(i, b)| *b == (i + 1) as u8) {
            pad = candidate;
        }
    }
    &data[..data.len() - pad]
}

/// serialise a key, encrypting the private block when a password is
/// given
pub fn encode<R: RngCore + CryptoRng>(
    rng: &mut R,
    key: &SshKey,
    password: Option<&[u8]>,
    cipher_name: &str,
    rounds: u32,
) -> Result<Vec<u8>> {
    let (cipher_name, kdf_name) = match password {
        Some(_) => (cipher_name, KDF_BCRYPT),
        None => (CIPHER_NONE, KDF_NONE),
    };
    let cipher = get_ssh_cipher(cipher_name)?;

    // private block: check, check, type, payload, then pad to the block
    let check = rng.next_u32();
    let mut private = Vec::new();
    write_u32(&mut private, check);
    write_u32(&mut private, check);
    write_string(&mut private, key.key_type.as_bytes());
    private.extend_from_slice(&key.payload);
    let mut pad: u8 = 1;
    while private.len() % cipher.block_size() != 0 {
        private.push(pad);
        pad = pad.wrapping_add(1);
    }

    let mut kdf_opts = Vec::new();
    if let Some(password) = password {
        let mut salt = [0u8; SALT_LEN];
        rng.fill_bytes(&mut salt);
        write_string(&mut kdf_opts, &salt);
        write_u32(&mut kdf_opts, rounds);

        let mut key_iv =
            derive_key_iv(password, &salt, rounds, cipher.key_size() + cipher.iv_size())?;
        let (enc_key, iv) = key_iv.split_at(cipher.key_size());
        let outcome = cipher.encrypt(enc_key, iv, &mut private);
        let outcome = outcome.map_err(Error::Cipher);
        key_iv.zeroize();
        outcome?;
    }

    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    write_string(&mut out, cipher_name.as_bytes());
    write_string(&mut out, kdf_name.as_bytes());
    write_string(&mut out, &kdf_opts);
    write_u32(&mut out, 1);
    write_string(&mut out, &key.public);
    write_string(&mut out, &private);
    Ok(out)
}

/// parse a binary envelope, decrypting with `password` when needed
pub fn parse(data: &[u8], password: Option<&[u8]>) -> Result<SshKey> {
    if data.len() < MAGIC.len() || &data[..MAGIC.len()] != MAGIC {
        return Err(Error::InvalidFormat("openssh magic"));
    }
    let mut reader = WireReader::from(&data[MAGIC.len()..]);
    let cipher_name = String::from_utf8_lossy(reader.string()?).into_owned();
    let kdf_name = String::from_utf8_lossy(reader.string()?).into_owned();
    let kdf_opts = reader.string()?.to_vec();
    let num_keys = reader.u32()?;
    if num_keys != 1 {
        debug!("openssh envelope carries {} keys", num_keys);
        return Err(Error::InvalidFormat("expected exactly one key"));
    }
    let public = reader.string()?.to_vec();
    let mut private = reader.string()?.to_vec();

    let cipher = get_ssh_cipher(&cipher_name)?;
    if private.is_empty() || private.len() % cipher.block_size() != 0 {
        return Err(Error::InvalidFormat("private block alignment"));
    }

    if kdf_name != KDF_NONE {
        let password = password.ok_or(Error::Decryption)?;
        let mut key_iv = derive_for_kdf(
            &kdf_name,
            &kdf_opts,
            password,
            cipher.key_size() + cipher.iv_size(),
        )?;
        let (enc_key, iv) = key_iv.split_at(cipher.key_size());
        let outcome = cipher.decrypt(enc_key, iv, &mut private).map_err(Error::Cipher);
        key_iv.zeroize();
        outcome?;
    }

    let mut inner = WireReader::from(&private);
    let check1 = inner.u32()?;
    let check2 = inner.u32()?;
    if check1 != check2 {
        // wrong password, or a corrupted block
        return Err(Error::Decryption);
    }
    let key_type = String::from_utf8_lossy(inner.string()?).into_owned();
    let payload = strip_padding(inner.remaining(), cipher.block_size()).to_vec();
    Ok(SshKey { key_type, public, payload })
}

/// [`encode`], wrapped in `OPENSSH PRIVATE KEY` PEM armor
pub fn encode_pem<R: RngCore + CryptoRng>(
    rng: &mut R,
    key: &SshKey,
    password: Option<&[u8]>,
    cipher_name: &str,
    rounds: u32,
) -> Result<String> {
    let der = encode(rng, key, password, cipher_name, rounds)?;
    Ok(pem::encode(&Pem::new(PEM_TAG, der)))
}

/// parse PEM armored input produced by [`encode_pem`]
pub fn parse_pem(text: &str, password: Option<&[u8]>) -> Result<SshKey> {
    let block = pem::parse(text)?;
    if block.tag() != PEM_TAG {
        return Err(Error::UnsupportedEnvelope(block.tag().to_string()));
    }
    parse(block.contents(), password)
}
