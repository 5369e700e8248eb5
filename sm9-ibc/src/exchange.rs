//! Authenticated identity-based key exchange.
//!
//! Both sides send one ephemeral G1 point and derive three shared
//! pairing values: `g1 = g^rA`, `g2 = g^rB` and `g3 = g^(rA rB)` for
//! `g = e(Ppub, P2)`. The session key is the KDF over both identities,
//! both ephemeral points and the three values; two SM3 tags with
//! distinct prefixes give optional explicit key confirmation.

use num_bigint::BigInt;
use num_traits::Zero;
use rand_core::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::hash::{kdf, sm3_digest};
use crate::keys::{EncryptMasterPublic, EncryptUserKey, Hid};
use crate::pairing::pairing;
use crate::points::{g2_generator, G1Point};
use crate::rand_scalar;
use crate::tower::Fp12;

const CONFIRM_INITIATOR: u8 = 0x83;
const CONFIRM_RESPONDER: u8 = 0x82;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Started,
    Agreed,
}

/// one side of a key exchange; drive it with `start`, `derive` and
/// optionally `confirm`
pub struct KeyExchange {
    initiator: bool,
    id: Vec<u8>,
    peer_id: Vec<u8>,
    master: EncryptMasterPublic,
    key: EncryptUserKey,
    key_len: usize,
    phase: Phase,
    secret: BigInt,
    own_point: Option<G1Point>,
    session_key: Vec<u8>,
    own_tag: [u8; 32],
    peer_tag: [u8; 32],
}

/// what `derive` hands back; `own_confirmation` goes to the peer and
/// `peer_confirmation` is what the peer is expected to send
pub struct AgreedKeys {
    pub session_key: Vec<u8>,
    pub own_confirmation: [u8; 32],
    pub peer_confirmation: [u8; 32],
}

impl KeyExchange {
    pub fn new(
        master: EncryptMasterPublic,
        key: EncryptUserKey,
        id: &[u8],
        peer_id: &[u8],
        initiator: bool,
        key_len: usize,
    ) -> KeyExchange {
        KeyExchange {
            initiator,
            id: id.to_vec(),
            peer_id: peer_id.to_vec(),
            master,
            key,
            key_len,
            phase: Phase::Created,
            secret: BigInt::zero(),
            own_point: None,
            session_key: Vec::new(),
            own_tag: [0u8; 32],
            peer_tag: [0u8; 32],
        }
    }

    /// the ephemeral point `[r] ([H1(peer || hid)] P1 + Ppub)` to send
    pub fn start<R: RngCore + CryptoRng>(&mut self, rng: &mut R) -> Result<Vec<u8>> {
        if self.phase != Phase::Created {
            return Err(Error::ExchangeState("start"));
        }
        let peer_point = self.master.identity_point(&self.peer_id, Hid::KeyExchange)?;
        self.secret = rand_scalar(rng);
        let own = peer_point.scalar_mult(&self.secret)?;
        let raw = own.to_bytes()?;
        self.own_point = Some(own);
        self.phase = Phase::Started;
        Ok(raw)
    }

    /// absorb the peer's ephemeral point and derive the session key
    pub fn derive(&mut self, peer_point: &[u8]) -> Result<AgreedKeys> {
        if self.phase != Phase::Started {
            return Err(Error::ExchangeState("derive"));
        }
        let own = match &self.own_point {
            Some(point) => point.clone(),
            None => return Err(Error::ExchangeState("derive")),
        };
        let peer = G1Point::from_bytes(peer_point)?;

        let g = pairing(&self.master.point, &g2_generator()?)?;
        let g_own = g.pow(&self.secret);
        let g_peer = pairing(&peer, &self.key.point)?;
        let g_both = g_peer.pow(&self.secret);

        // initiator ordering: IDA || IDB || RA || RB || g1 || g2 || g3
        let (g1, g2) = if self.initiator { (&g_own, &g_peer) } else { (&g_peer, &g_own) };
        let (first_id, second_id) = if self.initiator {
            (&self.id, &self.peer_id)
        } else {
            (&self.peer_id, &self.id)
        };
        let (first_point, second_point) =
            if self.initiator { (&own, &peer) } else { (&peer, &own) };

        let mut material = Vec::new();
        material.extend_from_slice(first_id);
        material.extend_from_slice(second_id);
        material.extend_from_slice(&first_point.to_bytes()?);
        material.extend_from_slice(&second_point.to_bytes()?);
        material.extend_from_slice(&g1.to_bytes());
        material.extend_from_slice(&g2.to_bytes());
        material.extend_from_slice(&g_both.to_bytes());
        self.session_key = kdf(&material, self.key_len);

        let inner = confirmation_inner(
            g2,
            &g_both,
            first_id,
            second_id,
            &first_point.to_bytes()?,
            &second_point.to_bytes()?,
        );
        let initiator_tag = confirmation_tag(CONFIRM_INITIATOR, g1, &inner);
        let responder_tag = confirmation_tag(CONFIRM_RESPONDER, g1, &inner);
        let (own_tag, peer_tag) = if self.initiator {
            (initiator_tag, responder_tag)
        } else {
            (responder_tag, initiator_tag)
        };
        self.own_tag = own_tag;
        self.peer_tag = peer_tag;
        self.phase = Phase::Agreed;
        Ok(AgreedKeys {
            session_key: self.session_key.clone(),
            own_confirmation: own_tag,
            peer_confirmation: peer_tag,
        })
    }

    /// check the confirmation tag received from the peer
    pub fn confirm(&self, received: &[u8]) -> Result<()> {
        if self.phase != Phase::Agreed {
            return Err(Error::ExchangeState("confirm"));
        }
        if self.peer_tag[..].ct_eq(received).unwrap_u8() != 1 {
            return Err(Error::ConfirmationFailed);
        }
        Ok(())
    }

    /// wipe all session material and return to the initial phase
    pub fn reset(&mut self) {
        self.secret = BigInt::zero();
        self.own_point = None;
        self.session_key.zeroize();
        self.session_key = Vec::new();
        self.own_tag.zeroize();
        self.peer_tag.zeroize();
        self.phase = Phase::Created;
    }
}

impl Drop for KeyExchange {
    fn drop(&mut self) {
        self.reset();
    }
}

fn confirmation_inner(
    g2: &Fp12,
    g3: &Fp12,
    first_id: &[u8],
    second_id: &[u8],
    first_point: &[u8],
    second_point: &[u8],
) -> [u8; 32] {
    let mut material = Vec::new();
    material.extend_from_slice(&g2.to_bytes());
    material.extend_from_slice(&g3.to_bytes());
    material.extend_from_slice(first_id);
    material.extend_from_slice(second_id);
    material.extend_from_slice(first_point);
    material.extend_from_slice(second_point);
    sm3_digest(&material)
}

fn confirmation_tag(prefix: u8, g1: &Fp12, inner: &[u8; 32]) -> [u8; 32] {
    let mut material = Vec::with_capacity(1 + 384 + 32);
    material.push(prefix);
    material.extend_from_slice(&g1.to_bytes());
    material.extend_from_slice(inner);
    sm3_digest(&material)
}
