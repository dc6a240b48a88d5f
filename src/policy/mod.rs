// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

mod extension;

use std::collections::HashSet;

use asn1::ObjectIdentifier;
use once_cell::sync::Lazy;

use x509_types::certificate::{Certificate, EcCurve, PublicKey};
use x509_types::common::{AlgorithmIdentifier, AlgorithmParameters, Time};
use x509_types::extensions::Extensions;
use x509_types::oid::{
    BASIC_CONSTRAINTS_OID, EKU_SERVER_AUTH_OID, EXTENDED_KEY_USAGE_OID, KEY_USAGE_OID,
    NAME_CONSTRAINTS_OID, SUBJECT_ALTERNATIVE_NAME_OID,
};

use self::extension::{ca, ee, Criticality, ExtensionPolicy};
use crate::ops::CryptoOps;
use crate::types::Subject;
use crate::{ValidationError, ValidationErrorKind};

/// Permitted certificate and TBS-certificate signature algorithms (spec
/// §4.2 "Signature algorithm"): the hash must be SHA-256, SHA-384 or
/// SHA-512, under either RSA PKCS#1 v1.5 or ECDSA.
static PERMITTED_SIGNATURE_ALGORITHMS: Lazy<HashSet<AlgorithmParameters>> = Lazy::new(|| {
    HashSet::from([
        AlgorithmParameters::RsaWithSha256,
        AlgorithmParameters::RsaWithSha384,
        AlgorithmParameters::RsaWithSha512,
        AlgorithmParameters::EcDsaWithSha256,
        AlgorithmParameters::EcDsaWithSha384,
        AlgorithmParameters::EcDsaWithSha512,
    ])
});

/// A default reasonable maximum chain depth.
///
/// This depth was chosen to balance between common validation lengths
/// (chains in the Web PKI are ordinarily no longer than 2 or 3 intermediates
/// in the longest cases) and support for pathological cases. It is distinct
/// from the hard protocol-level bound of 15 intermediates (spec §3 "Chain"):
/// a caller may tighten this further, but never loosen it past 15.
const DEFAULT_MAX_CHAIN_DEPTH: u8 = 8;

/// The hard upper bound on the number of intermediate CAs `max_chain_depth`
/// may be configured to, regardless of policy configuration (spec §3
/// "Chain", §4.3 "Termination").
///
/// The chain excluding the leaf is `[intermediates..., anchor]`, and spec §3
/// invariant #2 bounds that whole suffix at 16 certificates — so at most 15
/// of them may be intermediates, leaving room for the anchor itself.
pub(crate) const MAX_CHAIN_DEPTH: u8 = 15;

/// A `Policy` describes user-configurable aspects of X.509 path validation.
///
/// Holds a borrowed `CryptoOps` rather than an owned one so that a single
/// `Validator` can build a fresh `Policy` per `validate()` call without
/// requiring its backend to be `Clone` (spec §5: a `Validator` is shared
/// immutably across concurrent validations).
pub struct Policy<'a, B: CryptoOps> {
    pub ops: &'a B,

    /// A top-level constraint on the length of intermediate CA paths
    /// constructed under this policy.
    ///
    /// Per RFC 5280, this limits the length of the non-self-issued intermediate
    /// CA chain, without counting either the leaf or trust anchor.
    pub max_chain_depth: u8,

    /// A subject (i.e. DNS name or other name format) that any EE certificates
    /// validated by this policy must match, if requested.
    pub subject: Option<Subject>,

    /// The validation time. All certificates validated by this policy must
    /// be valid at this time.
    pub validation_time: asn1::DateTime,

    /// An extended key usage that must appear in EEs validated by this policy.
    pub extended_key_usage: ObjectIdentifier,

    common_extension_policies: Vec<ExtensionPolicy<B>>,
    ca_extension_policies: Vec<ExtensionPolicy<B>>,
    ee_extension_policies: Vec<ExtensionPolicy<B>>,
}

impl<'a, B: CryptoOps> Policy<'a, B> {
    /// Creates a new policy with the extension requirements described in
    /// spec §4.2.
    pub fn new(
        ops: &'a B,
        subject: Option<Subject>,
        time: asn1::DateTime,
        max_chain_depth: Option<u8>,
    ) -> Self {
        Self {
            ops,
            max_chain_depth: max_chain_depth
                .unwrap_or(DEFAULT_MAX_CHAIN_DEPTH)
                .min(MAX_CHAIN_DEPTH),
            subject,
            validation_time: time,
            extended_key_usage: EKU_SERVER_AUTH_OID,
            common_extension_policies: Vec::from([
                // 5280 4.2.1.12: Extended Key Usage. Propagation across the
                // chain is handled separately by the chain builder; this
                // entry just keeps a present-and-critical EKU from tripping
                // the unknown-critical-extension check.
                ExtensionPolicy::maybe_present(EXTENDED_KEY_USAGE_OID, Criticality::Agnostic, None),
                // 5280 4.2.1.6: Subject Alternative Name. Matched against
                // the requested name by the validator facade, not here.
                ExtensionPolicy::maybe_present(
                    SUBJECT_ALTERNATIVE_NAME_OID,
                    Criticality::Agnostic,
                    None,
                ),
                // 5280 4.2.1.10: Name Constraints. Accumulated by the chain
                // builder, not evaluated per-certificate.
                ExtensionPolicy::maybe_present(NAME_CONSTRAINTS_OID, Criticality::Agnostic, None),
            ]),
            ca_extension_policies: Vec::from([
                // 5280 4.2.1.9: Basic Constraints. A CA certificate must
                // assert `cA = true`.
                ExtensionPolicy::present(
                    BASIC_CONSTRAINTS_OID,
                    Criticality::Agnostic,
                    Some(ca::basic_constraints),
                ),
                // 5280 4.2.1.3: Key Usage. Required on CA certificates; the
                // `keyCertSign` bit must be set (spec §4.2 "CA role
                // requirements").
                ExtensionPolicy::present(KEY_USAGE_OID, Criticality::Agnostic, Some(ca::key_usage)),
            ]),
            ee_extension_policies: Vec::from([
                // 5280 4.2.1.9: Basic Constraints. Optional on a leaf, but
                // if present must not assert `cA = true`.
                ExtensionPolicy::maybe_present(
                    BASIC_CONSTRAINTS_OID,
                    Criticality::Agnostic,
                    Some(ee::basic_constraints),
                ),
                ExtensionPolicy::maybe_present(KEY_USAGE_OID, Criticality::Agnostic, None),
            ]),
        }
    }

    fn permits_basic(&self, cert: &Certificate) -> Result<(), ValidationError> {
        let extensions = cert.extensions();

        // 5280 4.1.1.2 / 4.1.2.3: signatureAlgorithm / TBS Certificate Signature
        // The top-level signatureAlgorithm and TBSCert signature algorithm
        // MUST match.
        if cert.signature_alg != cert.tbs_cert.signature_alg {
            return Err(ValidationError::new(
                ValidationErrorKind::MalformedCertificate,
                "mismatch between outer signatureAlgorithm and TBS signature algorithm",
            ));
        }

        // 5280 4.1.2.2: Serial Number. Must be a positive integer encoded
        // in at most 20 octets (21 if a leading zero byte was needed to
        // keep a high-bit-set value non-negative).
        if !(1..=21).contains(&cert.tbs_cert.serial.len()) {
            return Err(ValidationError::new(
                ValidationErrorKind::MalformedCertificate,
                "certificate must have a serial between 1 and 21 octets",
            ));
        } else if cert.tbs_cert.serial[0] & 0x80 == 0x80 {
            return Err(ValidationError::new(
                ValidationErrorKind::MalformedCertificate,
                "certificate serial number cannot be negative",
            ));
        }

        // 5280 4.1.2.4: Issuer. MUST be a non-empty distinguished name.
        if cert.issuer().is_empty() {
            return Err(ValidationError::new(
                ValidationErrorKind::MalformedCertificate,
                "certificate must have a non-empty issuer",
            ));
        }

        // 5280 4.1.2.5: Validity.
        permits_validity_date(&cert.tbs_cert.validity.not_before)?;
        permits_validity_date(&cert.tbs_cert.validity.not_after)?;
        let not_before = cert.tbs_cert.validity.not_before.as_datetime();
        let not_after = cert.tbs_cert.validity.not_after.as_datetime();
        if &self.validation_time < not_before {
            return Err(ValidationError::new(
                ValidationErrorKind::NotYetValid,
                "certificate is not yet valid at the validation time",
            ));
        }
        if &self.validation_time > not_after {
            return Err(ValidationError::new(
                ValidationErrorKind::Expired,
                "certificate has expired as of the validation time",
            ));
        }

        // Signature algorithm (spec §4.2 "Signature algorithm").
        if !PERMITTED_SIGNATURE_ALGORITHMS.contains(&cert.signature_alg.params) {
            return Err(ValidationError::new(
                ValidationErrorKind::UnsupportedAlgorithm,
                format!("unsupported signature algorithm: {:?}", cert.signature_alg.params),
            ));
        }

        // Public key strength (spec §4.2 "Public key strength").
        permits_public_key(cert.public_key())?;

        // Extension policy checks.
        for ext_policy in self.common_extension_policies.iter() {
            ext_policy.permits(self, cert, extensions)?;
        }

        // Every critical extension must be accounted for by one of the
        // policies that apply to this certificate's eventual role; since we
        // don't know the role yet, we check against the union of all three
        // (common ∪ ca ∪ ee) here and let `permits_ca`/`permits_ee` apply
        // their own policies on top.
        let critical_extensions: HashSet<_> = extensions.critical_oids().cloned().collect();
        let recognized: HashSet<_> = self
            .common_extension_policies
            .iter()
            .chain(self.ca_extension_policies.iter())
            .chain(self.ee_extension_policies.iter())
            .map(|p| p.oid.clone())
            .collect();

        if critical_extensions.difference(&recognized).next().is_some() {
            return Err(ValidationError::new(
                ValidationErrorKind::UnknownCriticalExtension,
                "certificate contains an unrecognized critical extension",
            ));
        }

        Ok(())
    }

    /// Checks whether the given "leaf" certificate is compatible with this policy.
    ///
    /// A "leaf" certificate is just the certificate in the leaf position during
    /// path validation, whether it be a CA or EE. As such, `permits_leaf`
    /// is logically equivalent to `permits_ee(leaf) || permits_ca(leaf)`.
    pub(crate) fn permits_leaf(&self, leaf: &Certificate) -> Result<(), ValidationError> {
        // NOTE: Avoid refactoring this to `permits_ee() || permits_ca()` or
        // any variation thereof: doing so would propagate irrelevant error
        // messages out of the API.
        if let Some(key_usage) = leaf.extensions().key_usage() {
            if key_usage.key_cert_sign() {
                return self.permits_ca(leaf, 0);
            }
        }
        self.permits_ee(leaf)
    }

    /// Checks whether the given CA certificate is compatible with this
    /// policy at path-building depth `current_depth`.
    pub(crate) fn permits_ca(&self, cert: &Certificate, current_depth: u8) -> Result<(), ValidationError> {
        self.permits_basic(cert)?;

        // NOTE: This conceptually belongs in `valid_issuer`, but is easier
        // to test here. `BasicConstraints` is required via
        // `ca_extension_policies`, so `extensions.basic_constraints()` is
        // always `Some` by the time we reach this line.
        if let Some(bc) = cert.extensions().basic_constraints() {
            if bc.path_length.is_some_and(|len| u64::from(current_depth) > len) {
                return Err(ValidationError::new(
                    ValidationErrorKind::PathLengthExceeded,
                    "path length constraint violated",
                ));
            }
        }

        for ext_policy in self.ca_extension_policies.iter() {
            ext_policy.permits(self, cert, cert.extensions())?;
        }

        Ok(())
    }

    /// Checks whether the given EE certificate is compatible with this policy.
    pub(crate) fn permits_ee(&self, cert: &Certificate) -> Result<(), ValidationError> {
        self.permits_basic(cert)?;

        for ext_policy in self.ee_extension_policies.iter() {
            ext_policy.permits(self, cert, cert.extensions())?;
        }

        Ok(())
    }

    /// Checks whether `issuer` is a valid issuing CA for `child` at a
    /// path-building depth of `current_depth`.
    ///
    /// This checks that `issuer` is permitted under this policy and that
    /// it was used to sign `child`.
    ///
    /// As a precondition, the caller must have already checked that
    /// `issuer.subject() == child.issuer()`.
    pub(crate) fn valid_issuer(
        &self,
        issuer: &Certificate,
        child: &Certificate,
        current_depth: u8,
    ) -> Result<(), ValidationError> {
        self.permits_ca(issuer, current_depth)?;

        self.ops.verify_signed_by(child, issuer).map_err(|e| {
            ValidationError::new(ValidationErrorKind::SignatureFailure, e.to_string())
        })
    }
}

fn permits_public_key(key: &PublicKey) -> Result<(), ValidationError> {
    match key {
        PublicKey::Rsa { modulus_bits } if *modulus_bits >= 2048 => Ok(()),
        PublicKey::Rsa { modulus_bits } => Err(ValidationError::new(
            ValidationErrorKind::WeakKey,
            format!("RSA modulus of {modulus_bits} bits is below the 2048-bit floor"),
        )),
        PublicKey::Ec { curve: EcCurve::P256 | EcCurve::P384 } => Ok(()),
        PublicKey::Ec { curve } => Err(ValidationError::new(
            ValidationErrorKind::UnsupportedAlgorithm,
            format!("unsupported elliptic curve: {curve:?}"),
        )),
        PublicKey::Unsupported => Err(ValidationError::new(
            ValidationErrorKind::UnsupportedAlgorithm,
            "unsupported public key algorithm",
        )),
    }
}

fn permits_validity_date(validity_date: &Time) -> Result<(), ValidationError> {
    if !validity_date.is_canonically_encoded() {
        return Err(ValidationError::new(
            ValidationErrorKind::MalformedCertificate,
            "validity date is not canonically encoded for its year",
        ));
    }
    Ok(())
}
