// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

#![forbid(unsafe_code)]

pub mod ops;
pub mod policy;
pub mod trust_store;
pub mod types;

use std::collections::HashSet;

use x509_types::certificate::{CertId, Certificate};

pub use ops::CryptoOps;
pub use trust_store::TrustStore;
pub use types::{NameConstraintSet, Subject};

use policy::Policy;

/// An ordered chain `[leaf, i1, ..., ik, anchor]`, produced fresh by each
/// successful `Validator::validate` call.
pub type Chain = Vec<Certificate>;

/// The diagnostic category of a `ValidationError` (spec §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    UntrustedRoot,
    SignatureFailure,
    Expired,
    NotYetValid,
    NotACA,
    PathLengthExceeded,
    MaxChainDepthExceeded,
    UnsupportedAlgorithm,
    WeakKey,
    UnknownCriticalExtension,
    NameMismatch,
    NameConstraintViolation,
    ExtendedKeyUsageMismatch,
    MalformedCertificate,
}

/// The error type returned by a failed `Validator::validate` call.
///
/// Hand-rolled rather than built with an error-derive macro, matching the
/// teacher crate's own verification crate, which carries no such
/// dependency.
#[derive(Debug)]
pub struct ValidationError {
    kind: ValidationErrorKind,
    message: String,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn kind(&self) -> &ValidationErrorKind {
        &self.kind
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Per-call parameters a `Validator` applies on top of its fixed trust store
/// (spec §3 "ValidationContext").
pub struct ValidationContext<'a> {
    /// The requested server identity, if any. `None` skips name matching
    /// entirely (spec §4.4 step 2).
    pub name: Option<Subject>,

    /// The extended key usage the leaf (and every CA above it) must permit.
    /// Defaults to `id-kp-serverAuth`.
    pub extended_key_usage: asn1::ObjectIdentifier,

    /// An untrusted pool of candidate intermediates the chain builder may
    /// draw on in addition to the validator's trust store.
    pub extra_certs: &'a [Certificate],

    /// The instant validity windows are checked against. `None` defaults to
    /// the wall-clock time of the call.
    pub clock: Option<asn1::DateTime>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(extra_certs: &'a [Certificate]) -> Self {
        Self {
            name: None,
            extended_key_usage: x509_types::oid::EKU_SERVER_AUTH_OID,
            extra_certs,
            clock: None,
        }
    }

    pub fn with_name(mut self, name: Subject) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_extended_key_usage(mut self, eku: asn1::ObjectIdentifier) -> Self {
        self.extended_key_usage = eku;
        self
    }

    pub fn with_clock(mut self, clock: asn1::DateTime) -> Self {
        self.clock = Some(clock);
        self
    }
}

/// The top-level entry point (spec §4.4 "Validator Facade"): owns a fixed
/// trust store and a crypto backend, and builds chains on demand.
///
/// `Validator` is `Send + Sync` whenever its backend `B` is (enforced by
/// `CryptoOps: Send + Sync`), so a single instance can be shared behind an
/// `Arc` and used to validate concurrently from multiple threads (spec §5).
pub struct Validator<B: CryptoOps> {
    trust_store: TrustStore,
    ops: B,
    max_chain_depth: Option<u8>,
}

impl<B: CryptoOps> Validator<B> {
    pub fn new(trust_store: TrustStore, ops: B) -> Self {
        Self { trust_store, ops, max_chain_depth: None }
    }

    /// Overrides the policy's default maximum chain depth. Always clamped
    /// to the hard protocol bound of 15 by `Policy::new`.
    pub fn with_max_chain_depth(mut self, max_chain_depth: u8) -> Self {
        self.max_chain_depth = Some(max_chain_depth);
        self
    }

    pub fn trust_store(&self) -> &TrustStore {
        &self.trust_store
    }

    /// Attempts to build a chain from `leaf` to a certificate in this
    /// validator's trust store, subject to `ctx` (spec §4.4 "validate").
    pub fn validate(
        &self,
        leaf: &Certificate,
        ctx: &ValidationContext<'_>,
    ) -> Result<Chain, ValidationError> {
        let validation_time = ctx.clock.clone().unwrap_or_else(now);
        let policy = Policy::new(&self.ops, ctx.name.clone(), validation_time, self.max_chain_depth);

        policy.permits_leaf(leaf)?;

        if let Some(subject) = &policy.subject {
            let san_matches = leaf
                .extensions()
                .subject_alternative_name()
                .is_some_and(|san| !san.is_empty() && subject.matches(san));
            if !san_matches {
                return Err(ValidationError::new(
                    ValidationErrorKind::NameMismatch,
                    "requested name is not covered by the leaf's subjectAltName",
                ));
            }
        }

        let mut path = vec![leaf.clone()];
        let mut visited = HashSet::from([leaf.id()]);
        let mut deepest_failure: Option<(usize, ValidationError)> = None;

        let chain = search(
            &policy,
            &self.trust_store,
            ctx.extra_certs,
            &mut path,
            &mut visited,
            &NameConstraintSet::default(),
            &mut deepest_failure,
        )
        .ok_or_else(|| {
            deepest_failure.map(|(_, e)| e).unwrap_or_else(|| {
                ValidationError::new(
                    ValidationErrorKind::UntrustedRoot,
                    "no chain to a trusted root could be built",
                )
            })
        })?;

        check_extended_key_usage(&chain, &ctx.extended_key_usage)?;

        log::debug!("validated chain of {} certificates", chain.len());
        Ok(chain)
    }
}

fn record_failure(slot: &mut Option<(usize, ValidationError)>, depth: usize, err: ValidationError) {
    let replace = match slot {
        Some((best_depth, _)) => depth > *best_depth,
        None => true,
    };
    if replace {
        *slot = Some((depth, err));
    }
}

/// The chain-building depth-first search (spec §4.3). `path` holds
/// `[leaf, ..., n]`; this call looks for an issuer of `n`.
#[allow(clippy::too_many_arguments)]
fn search<B: CryptoOps>(
    policy: &Policy<'_, B>,
    trust_store: &TrustStore,
    pool: &[Certificate],
    path: &mut Vec<Certificate>,
    visited: &mut HashSet<CertId>,
    constraints: &NameConstraintSet,
    deepest_failure: &mut Option<(usize, ValidationError)>,
) -> Option<Chain> {
    let n = path.last().expect("path is never empty").clone();

    let mut candidates: Vec<&Certificate> =
        trust_store.iter().filter(|c| c.subject() == n.issuer()).collect();
    candidates.extend(pool.iter().filter(|c| c.subject() == n.issuer()));

    for candidate in candidates {
        if visited.contains(&candidate.id()) {
            log::trace!("skipping candidate already on the current path");
            continue;
        }

        // Number of CA certificates already confirmed below `candidate`.
        let current_depth = (path.len() - 1) as u8;

        if let Err(e) = policy.valid_issuer(candidate, &n, current_depth) {
            log::trace!("candidate rejected: {e}");
            record_failure(deepest_failure, path.len(), e);
            continue;
        }

        let next_constraints = match candidate.extensions().name_constraints() {
            Some(nc) => constraints.push(&nc.permitted_subtrees, &nc.excluded_subtrees),
            None => constraints.clone(),
        };

        if trust_store.contains(candidate) {
            let leaf = &path[0];
            if let Some(san) = leaf.extensions().subject_alternative_name() {
                if !next_constraints.permits(san) {
                    let e = ValidationError::new(
                        ValidationErrorKind::NameConstraintViolation,
                        "leaf's subjectAltName violates accumulated name constraints",
                    );
                    log::trace!("candidate rejected: {e}");
                    record_failure(deepest_failure, path.len(), e);
                    continue;
                }
            }

            let mut chain = path.clone();
            chain.push(candidate.clone());
            log::debug!("chain terminated at a trust anchor, length {}", chain.len());
            return Some(chain);
        }

        if path.len() > policy.max_chain_depth as usize {
            let e = ValidationError::new(
                ValidationErrorKind::MaxChainDepthExceeded,
                "chain exceeded the maximum supported depth",
            );
            log::trace!("candidate rejected: {e}");
            record_failure(deepest_failure, path.len(), e);
            continue;
        }

        visited.insert(candidate.id());
        path.push(candidate.clone());
        let result = search(policy, trust_store, pool, path, visited, &next_constraints, deepest_failure);
        path.pop();
        visited.remove(&candidate.id());

        if result.is_some() {
            return result;
        }
    }

    None
}

/// Spec §4.2 "ExtendedKeyUsage propagation": every certificate in the chain
/// that declares an EKU extension must permit `requested`.
fn check_extended_key_usage(
    chain: &[Certificate],
    requested: &asn1::ObjectIdentifier,
) -> Result<(), ValidationError> {
    for cert in chain {
        if let Some(eku) = cert.extensions().extended_key_usage() {
            if !eku.permits(requested) {
                return Err(ValidationError::new(
                    ValidationErrorKind::ExtendedKeyUsageMismatch,
                    "a certificate in the chain does not permit the requested extended key usage",
                ));
            }
        }
    }
    Ok(())
}

/// The wall-clock default for `ValidationContext::clock`. `asn1::DateTime`
/// has no constructor from a Unix timestamp, so this converts
/// `SystemTime::now()` by hand.
fn now() -> asn1::DateTime {
    let since_epoch = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock is set before the Unix epoch");

    let secs = since_epoch.as_secs();
    let days = (secs / 86_400) as i64;
    let time_of_day = secs % 86_400;
    let (hour, minute, second) =
        ((time_of_day / 3600) as u8, ((time_of_day / 60) % 60) as u8, (time_of_day % 60) as u8);
    let (year, month, day) = civil_from_days(days);

    asn1::DateTime::new(year, month, day, hour, minute, second)
        .expect("current date is within asn1::DateTime's supported range")
}

/// Howard Hinnant's days-since-epoch-to-civil-date algorithm:
/// <http://howardhinnant.github.io/date_algorithms.html#civil_from_days>.
fn civil_from_days(z: i64) -> (u16, u8, u8) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097; // [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365; // [0, 399]
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let d = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = (if m <= 2 { y + 1 } else { y }) as u16;
    (year, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ops::tests_support::{signed_by, FakeCryptoOps};
    use x509_types::certificate::{EcCurve, Name, PublicKey, SubjectPublicKeyInfo, TbsCertificate, Validity};
    use x509_types::common::{AlgorithmIdentifier, AlgorithmParameters, Time};
    use x509_types::extensions::{
        BasicConstraints, Extension, ExtensionValue, Extensions, ExtendedKeyUsage, KeyUsage,
        NameConstraints, SubjectAlternativeName,
    };
    use x509_types::name::GeneralName;
    use x509_types::oid;

    const COMMON_NAME_OID: asn1::ObjectIdentifier = asn1::oid!(2, 5, 4, 3);

    fn dt(year: u16) -> asn1::DateTime {
        asn1::DateTime::new(year, 1, 1, 0, 0, 0).unwrap()
    }

    fn name(cn: &str) -> Name {
        Name::new(vec![(COMMON_NAME_OID, cn.to_string())])
    }

    struct CertBuilder {
        subject: String,
        issuer: String,
        not_before: u16,
        not_after: u16,
        is_ca: bool,
        path_length: Option<u64>,
        key_cert_sign: bool,
        san: Vec<GeneralName>,
        name_constraints: Option<NameConstraints>,
        eku: Option<Vec<asn1::ObjectIdentifier>>,
        public_key: PublicKey,
        unknown_critical_extension: bool,
    }

    impl CertBuilder {
        fn new(subject: &str, issuer: &str) -> Self {
            Self {
                subject: subject.to_string(),
                issuer: issuer.to_string(),
                not_before: 2020,
                not_after: 2030,
                is_ca: false,
                path_length: None,
                key_cert_sign: false,
                san: vec![],
                name_constraints: None,
                eku: None,
                public_key: PublicKey::Ec { curve: EcCurve::P256 },
                unknown_critical_extension: false,
            }
        }

        fn ca(mut self, path_length: Option<u64>) -> Self {
            self.is_ca = true;
            self.path_length = path_length;
            self.key_cert_sign = true;
            self
        }

        fn key_cert_sign(mut self, value: bool) -> Self {
            self.key_cert_sign = value;
            self
        }

        fn validity(mut self, not_before: u16, not_after: u16) -> Self {
            self.not_before = not_before;
            self.not_after = not_after;
            self
        }

        fn dns_san(mut self, name: &str) -> Self {
            self.san.push(GeneralName::DNSName(name.to_string()));
            self
        }

        fn name_constraints(mut self, permitted: Vec<GeneralName>, excluded: Vec<GeneralName>) -> Self {
            self.name_constraints =
                Some(NameConstraints { permitted_subtrees: permitted, excluded_subtrees: excluded });
            self
        }

        fn eku(mut self, oids: Vec<asn1::ObjectIdentifier>) -> Self {
            self.eku = Some(oids);
            self
        }

        fn weak_rsa(mut self) -> Self {
            self.public_key = PublicKey::Rsa { modulus_bits: 1024 };
            self
        }

        fn unknown_critical_extension(mut self) -> Self {
            self.unknown_critical_extension = true;
            self
        }

        fn issued_by(self, issuer_key: &PublicKey) -> Certificate {
            let mut extensions = vec![];
            if self.is_ca {
                extensions.push(Extension {
                    oid: oid::BASIC_CONSTRAINTS_OID,
                    critical: false,
                    value: ExtensionValue::BasicConstraints(BasicConstraints {
                        is_ca: true,
                        path_length: self.path_length,
                    }),
                });
            }
            extensions.push(Extension {
                oid: oid::KEY_USAGE_OID,
                critical: false,
                value: ExtensionValue::KeyUsage(KeyUsage {
                    key_cert_sign: self.key_cert_sign,
                    ..Default::default()
                }),
            });
            if !self.san.is_empty() {
                extensions.push(Extension {
                    oid: oid::SUBJECT_ALTERNATIVE_NAME_OID,
                    critical: false,
                    value: ExtensionValue::SubjectAlternativeName(SubjectAlternativeName::new(self.san)),
                });
            }
            if let Some(nc) = self.name_constraints {
                extensions.push(Extension {
                    oid: oid::NAME_CONSTRAINTS_OID,
                    critical: false,
                    value: ExtensionValue::NameConstraints(nc),
                });
            }
            if let Some(oids) = self.eku {
                extensions.push(Extension {
                    oid: oid::EXTENDED_KEY_USAGE_OID,
                    critical: false,
                    value: ExtensionValue::ExtendedKeyUsage(ExtendedKeyUsage::new(oids)),
                });
            }
            if self.unknown_critical_extension {
                extensions.push(Extension {
                    oid: asn1::oid!(1, 2, 3, 4, 5),
                    critical: true,
                    value: ExtensionValue::Opaque(vec![]),
                });
            }

            let sig_alg = AlgorithmIdentifier { params: AlgorithmParameters::EcDsaWithSha256 };
            let tbs = TbsCertificate {
                serial: vec![1],
                signature_alg: sig_alg.clone(),
                issuer: name(&self.issuer),
                validity: Validity {
                    not_before: Time::UtcTime(dt(self.not_before)),
                    not_after: Time::UtcTime(dt(self.not_after)),
                },
                subject: name(&self.subject),
                spki: SubjectPublicKeyInfo {
                    algorithm: sig_alg.clone(),
                    key: self.public_key,
                    key_bytes: vec![],
                },
                extensions: Extensions::new(extensions),
            };
            Certificate::new(tbs, sig_alg, signed_by(issuer_key), vec![])
        }
    }

    fn ca_key() -> PublicKey {
        PublicKey::Ec { curve: EcCurve::P256 }
    }

    fn fixed_ctx(extra: &[Certificate]) -> ValidationContext<'_> {
        ValidationContext::new(extra).with_clock(dt(2025))
    }

    #[test]
    fn test_empty_trust_store_fails() {
        let root_key = ca_key();
        let leaf = CertBuilder::new("leaf", "root").issued_by(&root_key);
        let validator = Validator::new(TrustStore::default(), FakeCryptoOps);
        let err = validator.validate(&leaf, &fixed_ctx(&[])).unwrap_err();
        assert_eq!(err.kind(), &ValidationErrorKind::UntrustedRoot);
    }

    #[test]
    fn test_simple_issuance_succeeds() {
        let root_key = ca_key();
        let root = CertBuilder::new("root", "root").ca(None).issued_by(&root_key);
        let leaf = CertBuilder::new("leaf", "root").issued_by(&root_key);

        let validator = Validator::new(TrustStore::new(vec![root.clone()]), FakeCryptoOps);
        let chain = validator.validate(&leaf, &fixed_ctx(&[])).unwrap();
        assert_eq!(chain, vec![leaf, root]);
    }

    #[test]
    fn test_untrusted_issuer_fails() {
        let root_key = ca_key();
        let other_key = ca_key();
        let root = CertBuilder::new("root", "root").ca(None).issued_by(&root_key);
        let untrusted_root = CertBuilder::new("other-root", "other-root").ca(None).issued_by(&other_key);
        let leaf = CertBuilder::new("leaf", "other-root").issued_by(&other_key);

        let validator = Validator::new(TrustStore::new(vec![root]), FakeCryptoOps);
        let err = validator.validate(&leaf, &fixed_ctx(&[untrusted_root])).unwrap_err();
        assert_eq!(err.kind(), &ValidationErrorKind::UntrustedRoot);
    }

    #[test]
    fn test_intermediate_chain_succeeds() {
        let root_key = ca_key();
        let intermediate_key = ca_key();
        let root = CertBuilder::new("root", "root").ca(None).issued_by(&root_key);
        let intermediate = CertBuilder::new("intermediate", "root").ca(None).issued_by(&root_key);
        let leaf = CertBuilder::new("leaf", "intermediate").issued_by(&intermediate_key);

        let validator = Validator::new(TrustStore::new(vec![root.clone()]), FakeCryptoOps);
        let chain = validator.validate(&leaf, &fixed_ctx(&[intermediate.clone()])).unwrap();
        assert_eq!(chain, vec![leaf, intermediate, root]);
    }

    #[test]
    fn test_path_length_zero_rejects_intermediate() {
        let root_key = ca_key();
        let intermediate_key = ca_key();
        let root = CertBuilder::new("root", "root").ca(Some(0)).issued_by(&root_key);
        let intermediate = CertBuilder::new("intermediate", "root").ca(None).issued_by(&root_key);
        let leaf = CertBuilder::new("leaf", "intermediate").issued_by(&intermediate_key);

        let validator = Validator::new(TrustStore::new(vec![root]), FakeCryptoOps);
        let err = validator.validate(&leaf, &fixed_ctx(&[intermediate])).unwrap_err();
        assert_eq!(err.kind(), &ValidationErrorKind::PathLengthExceeded);

        let direct_leaf = CertBuilder::new("leaf", "root").issued_by(&root_key);
        assert!(validator.validate(&direct_leaf, &fixed_ctx(&[])).is_ok());
    }

    #[test]
    fn test_expired_and_not_yet_valid() {
        let root_key = ca_key();
        let root = CertBuilder::new("root", "root").ca(None).issued_by(&root_key);
        let expired = CertBuilder::new("leaf", "root").validity(2000, 2010).issued_by(&root_key);
        let not_yet_valid = CertBuilder::new("leaf", "root").validity(2040, 2045).issued_by(&root_key);

        let validator = Validator::new(TrustStore::new(vec![root]), FakeCryptoOps);
        assert_eq!(
            validator.validate(&expired, &fixed_ctx(&[])).unwrap_err().kind(),
            &ValidationErrorKind::Expired
        );
        assert_eq!(
            validator.validate(&not_yet_valid, &fixed_ctx(&[])).unwrap_err().kind(),
            &ValidationErrorKind::NotYetValid
        );
    }

    #[test]
    fn test_name_constraints_permit_and_exclude() {
        let root_key = ca_key();
        let root = CertBuilder::new("root", "root")
            .ca(None)
            .name_constraints(
                vec![GeneralName::DNSName(".example.com".to_string())],
                vec![GeneralName::DNSName("subsub.example.com".to_string())],
            )
            .issued_by(&root_key);

        let validator = Validator::new(TrustStore::new(vec![root]), FakeCryptoOps);

        let good_leaf = CertBuilder::new("leaf", "root").dns_san("sub.example.com").issued_by(&root_key);
        let good_ctx =
            fixed_ctx(&[]).with_name(Subject::Dns(types::DNSName::new("sub.example.com").unwrap()));
        assert!(validator.validate(&good_leaf, &good_ctx).is_ok());

        let excluded_leaf =
            CertBuilder::new("leaf", "root").dns_san("subsub.example.com").issued_by(&root_key);
        let excluded_ctx =
            fixed_ctx(&[]).with_name(Subject::Dns(types::DNSName::new("subsub.example.com").unwrap()));
        assert_eq!(
            validator.validate(&excluded_leaf, &excluded_ctx).unwrap_err().kind(),
            &ValidationErrorKind::NameConstraintViolation
        );
    }

    #[test]
    fn test_wildcard_san_matching() {
        let root_key = ca_key();
        let root = CertBuilder::new("root", "root").ca(None).issued_by(&root_key);
        let leaf = CertBuilder::new("leaf", "root").dns_san("*.example.com").issued_by(&root_key);

        let validator = Validator::new(TrustStore::new(vec![root]), FakeCryptoOps);

        let sub = types::DNSName::new("sub.example.com").unwrap();
        assert!(validator.validate(&leaf, &fixed_ctx(&[]).with_name(Subject::Dns(sub))).is_ok());

        let apex = types::DNSName::new("example.com").unwrap();
        assert_eq!(
            validator
                .validate(&leaf, &fixed_ctx(&[]).with_name(Subject::Dns(apex)))
                .unwrap_err()
                .kind(),
            &ValidationErrorKind::NameMismatch
        );
    }

    #[test]
    fn test_extended_key_usage_propagation() {
        let root_key = ca_key();
        let intermediate_key = ca_key();
        let root = CertBuilder::new("root", "root").ca(None).issued_by(&root_key);
        let restricted_intermediate = CertBuilder::new("intermediate", "root")
            .ca(None)
            .eku(vec![oid::EKU_CLIENT_AUTH_OID])
            .issued_by(&root_key);
        let leaf = CertBuilder::new("leaf", "intermediate").issued_by(&intermediate_key);

        let validator = Validator::new(TrustStore::new(vec![root.clone()]), FakeCryptoOps);
        let err = validator.validate(&leaf, &fixed_ctx(&[restricted_intermediate])).unwrap_err();
        assert_eq!(err.kind(), &ValidationErrorKind::ExtendedKeyUsageMismatch);

        let any_eku_intermediate = CertBuilder::new("intermediate", "root")
            .ca(None)
            .eku(vec![oid::ANY_EXTENDED_KEY_USAGE_OID])
            .issued_by(&root_key);
        assert!(validator.validate(&leaf, &fixed_ctx(&[any_eku_intermediate])).is_ok());
    }

    #[test]
    fn test_ca_without_key_usage_is_rejected() {
        let root_key = ca_key();
        let intermediate_key = ca_key();
        let root = CertBuilder::new("root", "root").ca(None).issued_by(&root_key);
        let bad_intermediate = CertBuilder::new("intermediate", "root")
            .ca(None)
            .key_cert_sign(false)
            .issued_by(&root_key);
        let leaf = CertBuilder::new("leaf", "intermediate").issued_by(&intermediate_key);

        let validator = Validator::new(TrustStore::new(vec![root]), FakeCryptoOps);
        let err = validator.validate(&leaf, &fixed_ctx(&[bad_intermediate])).unwrap_err();
        assert_eq!(err.kind(), &ValidationErrorKind::NotACA);
    }

    #[test]
    fn test_weak_key_is_rejected() {
        let root_key = ca_key();
        let root = CertBuilder::new("root", "root").ca(None).issued_by(&root_key);
        let leaf = CertBuilder::new("leaf", "root").weak_rsa().issued_by(&root_key);

        let validator = Validator::new(TrustStore::new(vec![root]), FakeCryptoOps);
        assert_eq!(
            validator.validate(&leaf, &fixed_ctx(&[])).unwrap_err().kind(),
            &ValidationErrorKind::WeakKey
        );
    }

    #[test]
    fn test_unknown_critical_extension_is_rejected() {
        let root_key = ca_key();
        let root = CertBuilder::new("root", "root").ca(None).issued_by(&root_key);
        let leaf = CertBuilder::new("leaf", "root").unknown_critical_extension().issued_by(&root_key);

        let validator = Validator::new(TrustStore::new(vec![root]), FakeCryptoOps);
        assert_eq!(
            validator.validate(&leaf, &fixed_ctx(&[])).unwrap_err().kind(),
            &ValidationErrorKind::UnknownCriticalExtension
        );
    }

    /// Builds a chain of `count` intermediate CAs under `root`, all issued by
    /// the same `root_key` (this uses `FakeCryptoOps`, which checks the
    /// signature marker only, not the actual issuer identity), plus a leaf
    /// issued by the last one. Returns `(leaf, extra_certs)`.
    fn intermediate_chain(root_key: &PublicKey, count: usize) -> (Certificate, Vec<Certificate>) {
        let mut extra = vec![];
        let mut issuer_name = "root".to_string();
        for i in 0..count {
            let subject_name = format!("intermediate-{i}");
            extra.push(CertBuilder::new(&subject_name, &issuer_name).ca(None).issued_by(root_key));
            issuer_name = subject_name;
        }
        let leaf = CertBuilder::new("leaf", &issuer_name).issued_by(root_key);
        (leaf, extra)
    }

    #[test]
    fn test_max_chain_depth_boundary_succeeds() {
        let root_key = ca_key();
        let root = CertBuilder::new("root", "root").ca(None).issued_by(&root_key);
        let (leaf, extra) = intermediate_chain(&root_key, policy::MAX_CHAIN_DEPTH as usize);

        let validator = Validator::new(TrustStore::new(vec![root]), FakeCryptoOps)
            .with_max_chain_depth(policy::MAX_CHAIN_DEPTH);
        let chain = validator.validate(&leaf, &fixed_ctx(&extra)).unwrap();
        // leaf + 15 intermediates + anchor = 17 certificates, 16 excluding the leaf.
        assert_eq!(chain.len(), policy::MAX_CHAIN_DEPTH as usize + 2);
    }

    #[test]
    fn test_max_chain_depth_exceeded() {
        let root_key = ca_key();
        let root = CertBuilder::new("root", "root").ca(None).issued_by(&root_key);
        let (leaf, extra) = intermediate_chain(&root_key, policy::MAX_CHAIN_DEPTH as usize + 1);

        let validator = Validator::new(TrustStore::new(vec![root]), FakeCryptoOps)
            .with_max_chain_depth(policy::MAX_CHAIN_DEPTH);
        let err = validator.validate(&leaf, &fixed_ctx(&extra)).unwrap_err();
        assert_eq!(err.kind(), &ValidationErrorKind::MaxChainDepthExceeded);
    }

    #[test]
    fn test_civil_from_days_matches_known_dates() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(19_723), (2023, 12, 13));
    }
}
