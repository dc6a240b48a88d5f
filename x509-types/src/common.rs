// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

use crate::oid;

/// A signature or SubjectPublicKeyInfo algorithm identifier: an OID plus its
/// (possibly absent) parameters.
///
/// The real decoder this crate's `Certificate` is assumed to come from parses
/// this straight off the wire with `asn1`'s derive macros; decoding itself is
/// out of scope here, so this type only needs to support comparison against
/// the allowlists in `Policy` and skips the `Asn1Read`/`Asn1Write` derives —
/// it is constructed directly by callers (or by the test fixtures in this
/// workspace).
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct AlgorithmIdentifier {
    pub params: AlgorithmParameters,
}

impl AlgorithmIdentifier {
    pub fn oid(&self) -> &asn1::ObjectIdentifier {
        self.params.oid()
    }
}

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum AlgorithmParameters {
    Sha1,
    Sha256,
    Sha384,
    Sha512,

    Rsa,
    RsaWithSha1,
    RsaWithSha256,
    RsaWithSha384,
    RsaWithSha512,

    EcDsaWithSha1,
    EcDsaWithSha256,
    EcDsaWithSha384,
    EcDsaWithSha512,

    Dsa,
    DsaWithSha256,
    Ed25519,

    Other(asn1::ObjectIdentifier),
}

impl AlgorithmParameters {
    pub fn oid(&self) -> &asn1::ObjectIdentifier {
        match self {
            AlgorithmParameters::Sha1 => &oid::SHA1_OID,
            AlgorithmParameters::Sha256 => &oid::SHA256_OID,
            AlgorithmParameters::Sha384 => &oid::SHA384_OID,
            AlgorithmParameters::Sha512 => &oid::SHA512_OID,
            AlgorithmParameters::Rsa => &oid::RSA_OID,
            AlgorithmParameters::RsaWithSha1 => &oid::RSA_WITH_SHA1_OID,
            AlgorithmParameters::RsaWithSha256 => &oid::RSA_WITH_SHA256_OID,
            AlgorithmParameters::RsaWithSha384 => &oid::RSA_WITH_SHA384_OID,
            AlgorithmParameters::RsaWithSha512 => &oid::RSA_WITH_SHA512_OID,
            AlgorithmParameters::EcDsaWithSha1 => &oid::ECDSA_WITH_SHA1_OID,
            AlgorithmParameters::EcDsaWithSha256 => &oid::ECDSA_WITH_SHA256_OID,
            AlgorithmParameters::EcDsaWithSha384 => &oid::ECDSA_WITH_SHA384_OID,
            AlgorithmParameters::EcDsaWithSha512 => &oid::ECDSA_WITH_SHA512_OID,
            AlgorithmParameters::Dsa => &oid::DSA_OID,
            AlgorithmParameters::DsaWithSha256 => &oid::DSA_WITH_SHA256_OID,
            AlgorithmParameters::Ed25519 => &oid::ED25519_OID,
            AlgorithmParameters::Other(oid) => oid,
        }
    }
}

/// A certificate validity timestamp. The decoder this crate assumes produces
/// either ASN.1 `UTCTime` or `GeneralizedTime`; both collapse to the same
/// `asn1::DateTime` for comparison purposes, matching RFC 5280 4.1.2.5.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Time {
    UtcTime(asn1::DateTime),
    GeneralizedTime(asn1::DateTime),
}

impl Time {
    pub fn as_datetime(&self) -> &asn1::DateTime {
        match self {
            Time::UtcTime(dt) => dt,
            Time::GeneralizedTime(dt) => dt,
        }
    }

    /// RFC 5280 4.1.2.5: dates before 2050 MUST be UTCTime; dates in or
    /// after 2050 MUST be GeneralizedTime.
    pub fn is_canonically_encoded(&self) -> bool {
        const GENERALIZED_DATE_CUTOFF_YEAR: u16 = 2050;
        match self {
            Time::UtcTime(dt) => dt.year() < GENERALIZED_DATE_CUTOFF_YEAR,
            Time::GeneralizedTime(dt) => dt.year() >= GENERALIZED_DATE_CUTOFF_YEAR,
        }
    }
}

/// A `DNSName` is an ASCII domain name with the invariants of [RFC 5280
/// 4.2.1.6], which in turn uses the preferred name syntax defined in
/// [RFC 1034 3.5] and amended in [RFC 1123 2.1].
///
/// Non-ASCII domain names (i.e., internationalized names) must be
/// pre-encoded; comparisons are case-insensitive.
///
/// [RFC 5280 4.2.1.6]: https://datatracker.ietf.org/doc/html/rfc5280#section-4.2.1.6
/// [RFC 1034 3.5]: https://datatracker.ietf.org/doc/html/rfc1034#section-3.5
/// [RFC 1123 2.1]: https://datatracker.ietf.org/doc/html/rfc1123#section-2.1
#[derive(Debug, Clone)]
pub struct DNSName(String);

impl DNSName {
    pub fn new(value: &str) -> Option<Self> {
        // Domains cannot be empty; cannot contain whitespace; must
        // (practically) be less than 253 characters (255 in RFC 1034's
        // octet encoding).
        if value.is_empty() || value.chars().any(char::is_whitespace) || value.len() > 253 {
            return None;
        }
        for label in value.split('.') {
            // Individual labels cannot be empty; cannot exceed 63
            // characters; cannot start or end with `-`.
            if label.is_empty() || label.len() > 63 || label.starts_with('-') || label.ends_with('-')
            {
                return None;
            }
            if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return None;
            }
        }
        Some(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return this `DNSName`'s parent domain, if it has one.
    pub fn parent(&self) -> Option<Self> {
        match self.as_str().split_once('.') {
            Some((_, parent)) => Self::new(parent),
            None => None,
        }
    }
}

impl PartialEq for DNSName {
    fn eq(&self, other: &Self) -> bool {
        // DNS names are always case-insensitive.
        self.as_str().eq_ignore_ascii_case(other.as_str())
    }
}
impl Eq for DNSName {}

/// A `DNSPattern` represents a subset of the domain name wildcard matching
/// behavior defined in [RFC 6125 6.4.3]. In particular, all DNS patterns
/// must either be exact matches (post-normalization) *or* a single wildcard
/// matching a full label in the left-most label position. Partial label
/// matching (e.g. `f*o.example.com`) is not supported, nor is non-left-most
/// matching (e.g. `foo.*.example.com`).
///
/// [RFC 6125 6.4.3]: https://datatracker.ietf.org/doc/html/rfc6125#section-6.4.3
#[derive(Debug, PartialEq, Eq)]
pub enum DNSPattern {
    Exact(DNSName),
    Wildcard(DNSName),
}

impl DNSPattern {
    pub fn new(pat: &str) -> Option<Self> {
        if let Some(pat) = pat.strip_prefix("*.") {
            DNSName::new(pat).map(Self::Wildcard)
        } else {
            DNSName::new(pat).map(Self::Exact)
        }
    }

    pub fn matches(&self, name: &DNSName) -> bool {
        match self {
            Self::Exact(pat) => pat == name,
            Self::Wildcard(pat) => match name.parent() {
                Some(ref parent) => pat == parent,
                // No parent means a single label; wildcards never match those.
                None => false,
            },
        }
    }
}
