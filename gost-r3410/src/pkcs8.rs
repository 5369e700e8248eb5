//! PKCS#8 shapes of GOST keys.
//!
//! Private keys are `PrivateKeyInfo` records whose algorithm
//! parameters name the curve by OID; public keys are
//! `SubjectPublicKeyInfo` records whose BIT STRING wraps an OCTET
//! STRING holding the little-endian point. The algorithm OID carries
//! the protocol generation, not the math, so encoding takes an
//! explicit [`ParamMode`].

use der_event::de::Reader;
use der_event::Oid;
use der_event::se::Writer;

use crate::error::{Error, Result};
use crate::key::{PrivateKey, PublicKey};
use crate::registry::{curve_by_oid, oid_for_curve};

const OID_GOST2001: &str = "1.2.643.2.2.19";
const OID_GOST2012_256: &str = "1.2.643.7.1.1.1.1";
const OID_GOST2012_512: &str = "1.2.643.7.1.1.1.2";

fn parse_oid(text: &str) -> Oid {
    match text.parse() {
        Ok(oid) => oid,
        Err(_) => unreachable!("built-in OID strings are well formed"),
    }
}

/// which generation of the standard names the key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamMode {
    Gost2001,
    Gost2012,
}

impl ParamMode {
    fn algorithm_oid(self, point_size: usize) -> Oid {
        match self {
            ParamMode::Gost2001 => parse_oid(OID_GOST2001),
            ParamMode::Gost2012 if point_size > 32 => parse_oid(OID_GOST2012_512),
            ParamMode::Gost2012 => parse_oid(OID_GOST2012_256),
        }
    }
}

fn check_algorithm(oid: &Oid) -> Result<()> {
    let text = oid.to_string();
    match text.as_str() {
        OID_GOST2001 | OID_GOST2012_256 | OID_GOST2012_512 => Ok(()),
        _ => Err(Error::UnsupportedAlgorithm(text)),
    }
}

fn algorithm_identifier(writer: Writer, mode: ParamMode, point_size: usize, curve_oid: &Oid) -> der_event::Result<Writer> {
    let alg = mode.algorithm_oid(point_size);
    let curve_oid = curve_oid.clone();
    writer.write_sequence(move |w| {
        w.write_oid(&alg)?
            .write_sequence(move |params| params.write_oid(&curve_oid))
    })
}

pub fn encode_private_key(mode: ParamMode, key: &PrivateKey) -> Result<Vec<u8>> {
    let curve_oid = oid_for_curve(&key.curve.name)?;
    let raw = key.to_bytes()?;
    let point_size = key.curve.point_size();
    Ok(Writer::new()
        .write_sequence(move |w| {
            let w = w.write_unsigned(0)?;
            let w = algorithm_identifier(w, mode, point_size, &curve_oid)?;
            w.write_octet_string(&raw)
        })?
        .finalize())
}

pub fn parse_private_key(der: &[u8]) -> Result<PrivateKey> {
    let mut reader = Reader::from(der);
    let mut seq = reader.sequence()?;
    reader.expect_end()?;

    let version = seq.unsigned()?;
    if version != 0 {
        return Err(Error::Asn1(der_event::Error::CustomError(format!(
            "unsupported PrivateKeyInfo version {}",
            version
        ))));
    }

    let mut alg = seq.sequence()?;
    check_algorithm(&alg.oid()?)?;
    let mut params = alg.sequence()?;
    let curve = curve_by_oid(&params.oid()?)?;

    let raw = seq.octet_string()?;
    seq.expect_end()?;
    PrivateKey::from_bytes(curve, raw)
}

pub fn encode_public_key(mode: ParamMode, key: &PublicKey) -> Result<Vec<u8>> {
    let curve_oid = oid_for_curve(&key.curve.name)?;
    let raw = key.to_bytes()?;
    let point_size = key.curve.point_size();
    let wrapped = Writer::new().write_octet_string(&raw)?.finalize();
    Ok(Writer::new()
        .write_sequence(move |w| {
            let w = algorithm_identifier(w, mode, point_size, &curve_oid)?;
            w.write_bit_string(&wrapped)
        })?
        .finalize())
}

pub fn parse_public_key(der: &[u8]) -> Result<PublicKey> {
    let mut reader = Reader::from(der);
    let mut seq = reader.sequence()?;
    reader.expect_end()?;

    let mut alg = seq.sequence()?;
    check_algorithm(&alg.oid()?)?;
    let mut params = alg.sequence()?;
    let curve = curve_by_oid(&params.oid()?)?;

    let wrapped = seq.bit_string()?;
    seq.expect_end()?;
    let mut inner = Reader::from(wrapped);
    let raw = inner.octet_string()?;
    inner.expect_end()?;
    PublicKey::from_bytes(curve, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::curve_by_name;
    use rand::rngs::OsRng;

    #[test]
    fn private_key_roundtrip() {
        let curve = curve_by_name("GostR3410-2001-CryptoPro-A").unwrap();
        let prv = PrivateKey::generate(&mut OsRng, curve);
        for &mode in [ParamMode::Gost2001, ParamMode::Gost2012].iter() {
            let der = encode_private_key(mode, &prv).unwrap();
            let back = parse_private_key(&der).unwrap();
            assert_eq!(back.to_bytes().unwrap(), prv.to_bytes().unwrap());
            assert_eq!(back.curve.name, "GostR3410-2001-CryptoPro-A");
        }
    }

    #[test]
    fn public_key_roundtrip() {
        let curve = curve_by_name("GostR3410-2001-Test").unwrap();
        let prv = PrivateKey::generate(&mut OsRng, curve);
        let public = prv.public_key().unwrap();
        let der = encode_public_key(ParamMode::Gost2012, &public).unwrap();
        let back = parse_public_key(&der).unwrap();
        assert_eq!(back.point, public.point);
    }

    #[test]
    fn foreign_records_are_rejected() {
        // an EC key record with a non-GOST algorithm OID
        let der = Writer::new()
            .write_sequence(|w| {
                w.write_unsigned(0)?.write_sequence(|alg| {
                    alg.write_oid(&"1.2.840.10045.2.1".parse().unwrap())?
                        .write_sequence(|p| p.write_oid(&"1.2.840.10045.3.1.7".parse().unwrap()))
                })?
                .write_octet_string(&[0u8; 32])
            })
            .unwrap()
            .finalize();
        assert!(matches!(parse_private_key(&der), Err(Error::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn unknown_curve_oid_is_reported() {
        let der = Writer::new()
            .write_sequence(|w| {
                w.write_unsigned(0)?.write_sequence(|alg| {
                    alg.write_oid(&OID_GOST2001.parse().unwrap())?
                        .write_sequence(|p| p.write_oid(&"1.2.643.2.2.35.9".parse().unwrap()))
                })?
                .write_octet_string(&[0u8; 32])
            })
            .unwrap()
            .finalize();
        assert!(matches!(parse_private_key(&der), Err(Error::UnknownCurve(_))));
    }

    #[test]
    fn trailing_data_is_rejected() {
        let curve = curve_by_name("GostR3410-2001-Test").unwrap();
        let prv = PrivateKey::generate(&mut OsRng, curve);
        let mut der = encode_private_key(ParamMode::Gost2001, &prv).unwrap();
        der.push(0x00);
        assert!(parse_private_key(&der).is_err());
    }
}
