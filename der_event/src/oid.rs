use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::result::Result;

/// An ASN.1 OBJECT IDENTIFIER, stored as its sequence of arcs.
///
/// ```
/// use der_event::Oid;
///
/// let oid: Oid = "1.2.840.113549.1.5.13".parse().unwrap();
/// assert_eq!(oid.to_string(), "1.2.840.113549.1.5.13");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid(Vec<u64>);

impl Oid {
    pub fn new(arcs: Vec<u64>) -> Result<Oid> {
        if arcs.len() < 2 || arcs[0] > 2 || (arcs[0] < 2 && arcs[1] >= 40) {
            return Err(Error::InvalidOid);
        }
        Ok(Oid(arcs))
    }

    pub fn arcs(&self) -> &[u64] {
        &self.0
    }

    /// the DER content octets (without tag and length)
    pub fn to_content_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_base128(&mut out, self.0[0] * 40 + self.0[1]);
        for &arc in &self.0[2..] {
            write_base128(&mut out, arc);
        }
        out
    }

    /// parse the DER content octets (without tag and length)
    pub fn from_content_bytes(bytes: &[u8]) -> Result<Oid> {
        if bytes.is_empty() {
            return Err(Error::InvalidOid);
        }
        let mut arcs = Vec::new();
        let mut pos = 0;
        while pos < bytes.len() {
            let (v, used) = read_base128(&bytes[pos..])?;
            pos += used;
            if arcs.is_empty() {
                if v < 40 {
                    arcs.push(0);
                    arcs.push(v);
                } else if v < 80 {
                    arcs.push(1);
                    arcs.push(v - 40);
                } else {
                    arcs.push(2);
                    arcs.push(v - 80);
                }
            } else {
                arcs.push(v);
            }
        }
        Ok(Oid(arcs))
    }
}

fn write_base128(out: &mut Vec<u8>, mut v: u64) {
    let mut tmp = [0u8; 10];
    let mut n = 0;
    loop {
        tmp[n] = (v & 0x7f) as u8;
        v >>= 7;
        n += 1;
        if v == 0 {
            break;
        }
    }
    for i in (0..n).rev() {
        let mut b = tmp[i];
        if i != 0 {
            b |= 0x80;
        }
        out.push(b);
    }
}

fn read_base128(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut v: u64 = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if i >= 9 {
            return Err(Error::InvalidOid);
        }
        v = (v << 7) | u64::from(b & 0x7f);
        if b & 0x80 == 0 {
            return Ok((v, i + 1));
        }
    }
    Err(Error::InvalidOid)
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, arc) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Oid> {
        let mut arcs = Vec::new();
        for part in s.split('.') {
            let arc = part.parse::<u64>().map_err(|_| Error::InvalidOid)?;
            arcs.push(arc);
        }
        Oid::new(arcs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_roundtrip() {
        let cases = [
            "1.2.840.113549.1.5.13",
            "2.16.840.1.101.3.4.1.42",
            "1.2.643.2.2.19",
            "1.2.156.10197.1.302.1",
            "0.4.0",
        ];
        for s in cases.iter() {
            let oid: Oid = s.parse().unwrap();
            let content = oid.to_content_bytes();
            let back = Oid::from_content_bytes(&content).unwrap();
            assert_eq!(oid, back, "{}", s);
            assert_eq!(&back.to_string(), s);
        }
    }

    #[test]
    fn known_encoding() {
        // 1.2.840.113549 is the classic RSADSI arc
        let oid: Oid = "1.2.840.113549".parse().unwrap();
        assert_eq!(oid.to_content_bytes(), vec![0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d]);
    }

    #[test]
    fn rejects_bad_oids() {
        assert!("1".parse::<Oid>().is_err());
        assert!("3.1".parse::<Oid>().is_err());
        assert!("1.40".parse::<Oid>().is_err());
        assert!("a.b".parse::<Oid>().is_err());
    }
}
