// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! The structured certificate shape this crate assumes an external DER/PEM
//! decoder produces (spec §3, §6). This crate never parses bytes into these
//! types itself — only builds/compares them — so identity (`CertId`) stands
//! in for "DER identity": a real decoder would derive it from the encoded
//! bytes (e.g. a digest of the DER), but since no such bytes exist here it is
//! assigned at construction time and is stable for the lifetime of the value.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::common::{AlgorithmIdentifier, Time};
use crate::extensions::Extensions;

static NEXT_CERT_ID: AtomicU64 = AtomicU64::new(1);

/// A stable per-certificate identity token, standing in for DER identity
/// (spec §9: "Identity for cycle-prevention is DER-identity ... not
/// subject-name equality").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CertId(u64);

impl CertId {
    pub fn fresh() -> Self {
        Self(NEXT_CERT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An X.501 distinguished name, simplified to an ordered list of
/// (attribute-type OID, value) pairs. Full RDN-SET semantics (multi-valued
/// RDNs) are out of this crate's scope; subject/issuer comparisons only need
/// structural equality, which this representation preserves.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Name(Vec<(asn1::ObjectIdentifier, String)>);

impl Name {
    pub fn new(attrs: Vec<(asn1::ObjectIdentifier, String)>) -> Self {
        Self(attrs)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: Time,
    pub not_after: Time,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EcCurve {
    P192,
    P256,
    P384,
    Other(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKey {
    Rsa { modulus_bits: u32 },
    Ec { curve: EcCurve },
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectPublicKeyInfo {
    pub algorithm: AlgorithmIdentifier,
    pub key: PublicKey,

    /// The DER encoding of this key, exactly as it appeared in the
    /// certificate. `key` is a structural summary sufficient for policy
    /// decisions (algorithm, strength); a cryptographic backend needs the
    /// raw bytes to actually reconstruct a key and verify a signature with
    /// it, so both are kept side by side.
    pub key_bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TbsCertificate {
    pub serial: Vec<u8>,
    pub signature_alg: AlgorithmIdentifier,
    pub issuer: Name,
    pub validity: Validity,
    pub subject: Name,
    pub spki: SubjectPublicKeyInfo,
    pub extensions: Extensions,
}

/// An immutable, value-typed decoded certificate (spec §3).
#[derive(Clone, Debug)]
pub struct Certificate {
    id: CertId,
    pub tbs_cert: TbsCertificate,
    pub signature_alg: AlgorithmIdentifier,
    pub signature: Vec<u8>,
    pub tbs_bytes: Vec<u8>,
}

impl Certificate {
    pub fn new(
        tbs_cert: TbsCertificate,
        signature_alg: AlgorithmIdentifier,
        signature: Vec<u8>,
        tbs_bytes: Vec<u8>,
    ) -> Self {
        Self {
            id: CertId::fresh(),
            tbs_cert,
            signature_alg,
            signature,
            tbs_bytes,
        }
    }

    pub fn id(&self) -> CertId {
        self.id
    }

    pub fn subject(&self) -> &Name {
        &self.tbs_cert.subject
    }

    pub fn issuer(&self) -> &Name {
        &self.tbs_cert.issuer
    }

    pub fn extensions(&self) -> &Extensions {
        &self.tbs_cert.extensions
    }

    pub fn validity(&self) -> &Validity {
        &self.tbs_cert.validity
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.tbs_cert.spki.key
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Certificate {}

impl std::hash::Hash for Certificate {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
