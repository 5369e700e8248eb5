//! Named curve registry.
//!
//! Parameter sets are registered by name and by the OID that names
//! them in key records. The two built-in sets cover the 34.10-2001
//! test parameters and CryptoPro parameter set A; more can be
//! registered at runtime.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lazy_static::lazy_static;
use log::debug;
use num_bigint::BigInt;
use num_traits::Num;

use der_event::Oid;

use crate::curve::Curve;
use crate::error::{Error, Result};

fn bigint(hex: &str) -> BigInt {
    match BigInt::from_str_radix(hex, 16) {
        Ok(v) => v,
        Err(_) => unreachable!("built-in curve constants are well formed"),
    }
}

fn parse_oid(text: &str) -> Oid {
    match text.parse() {
        Ok(oid) => oid,
        Err(_) => unreachable!("built-in OID strings are well formed"),
    }
}

struct CurveRegistry {
    by_name: HashMap<String, Arc<Curve>>,
    by_oid: HashMap<Oid, Arc<Curve>>,
    oids: HashMap<String, Oid>,
}

impl CurveRegistry {
    fn insert(&mut self, curve: Arc<Curve>, oid: Option<Oid>) {
        self.by_name.insert(curve.name.clone(), curve.clone());
        if let Some(oid) = oid {
            self.oids.insert(curve.name.clone(), oid.clone());
            self.by_oid.insert(oid, curve);
        }
    }
}

fn builtin_curves() -> Result<CurveRegistry> {
    let mut reg = CurveRegistry {
        by_name: HashMap::new(),
        by_oid: HashMap::new(),
        oids: HashMap::new(),
    };

    // id-GostR3410-2001-TestParamSet
    let test = Curve::new(
        "GostR3410-2001-Test",
        bigint("8000000000000000000000000000000000000000000000000000000000000431"),
        BigInt::from(7u32),
        bigint("5FBFF498AA938CE739B8E022FBAFEF40563F6E6A3472FC2A514C0CE9DAE23B7E"),
        bigint("8000000000000000000000000000000150FE8A1892976154C59CFC193ACCF5B3"),
        BigInt::from(1u32),
        BigInt::from(2u32),
    )?;
    reg.insert(Arc::new(test), Some(parse_oid("1.2.643.2.2.35.0")));

    // id-GostR3410-2001-CryptoPro-A-ParamSet; p is 2^256 - 617
    let cryptopro_a = Curve::new(
        "GostR3410-2001-CryptoPro-A",
        bigint("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFD97"),
        bigint("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFD94"),
        BigInt::from(166u32),
        bigint("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF6C611070995AD10045841B09B761B893"),
        BigInt::from(1u32),
        BigInt::from(1u32),
    )?;
    reg.insert(Arc::new(cryptopro_a), Some(parse_oid("1.2.643.2.2.35.1")));

    Ok(reg)
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

lazy_static! {
    static ref CURVES: RwLock<Result<CurveRegistry>> = RwLock::new(builtin_curves());
}

fn with_registry<T>(f: impl FnOnce(&CurveRegistry) -> Result<T>) -> Result<T> {
    match &*read_lock(&CURVES) {
        Ok(reg) => f(reg),
        Err(_) => Err(Error::InvalidCurve("built-in parameter sets")),
    }
}

/// register a curve, optionally reachable by OID from key records
pub fn register_curve(curve: Arc<Curve>, oid: Option<Oid>) {
    if let Ok(reg) = &mut *write_lock(&CURVES) {
        reg.insert(curve, oid);
    }
}

pub fn curve_by_name(name: &str) -> Result<Arc<Curve>> {
    with_registry(|reg| {
        reg.by_name.get(name).cloned().ok_or_else(|| {
            debug!("no registered curve named {}", name);
            Error::UnknownCurve(name.to_string())
        })
    })
}

pub fn curve_by_oid(oid: &Oid) -> Result<Arc<Curve>> {
    with_registry(|reg| {
        reg.by_oid.get(oid).cloned().ok_or_else(|| {
            debug!("no registered curve under {}", oid);
            Error::UnknownCurve(oid.to_string())
        })
    })
}

/// the OID a registered curve is encoded under, if it has one
pub fn oid_for_curve(name: &str) -> Result<Oid> {
    with_registry(|reg| {
        reg.oids.get(name).cloned().ok_or_else(|| Error::UnknownCurve(name.to_string()))
    })
}
