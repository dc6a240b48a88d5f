// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! The small framework `Policy` uses to describe, per role, which
//! extensions are expected on a certificate, whether they must be marked
//! critical, and (optionally) a structural check over their decoded value.

use asn1::ObjectIdentifier;

use x509_types::certificate::Certificate;
use x509_types::extensions::Extensions;

use super::Policy;
use crate::ops::CryptoOps;
use crate::{ValidationError, ValidationErrorKind};

/// Whether an extension's criticality is constrained.
pub(crate) enum Criticality {
    Critical,
    NonCritical,
    Agnostic,
}

impl Criticality {
    fn permits(&self, critical: bool) -> bool {
        match self {
            Criticality::Critical => critical,
            Criticality::NonCritical => !critical,
            Criticality::Agnostic => true,
        }
    }
}

enum Requirement {
    MustBePresent,
    MaybePresent,
}

type Validator<B> = fn(&Policy<'_, B>, &Certificate, &Extensions) -> Result<(), ValidationError>;

/// A single extension's expected shape within a `Policy`.
pub(crate) struct ExtensionPolicy<B: CryptoOps> {
    pub(crate) oid: ObjectIdentifier,
    requirement: Requirement,
    criticality: Criticality,
    validator: Option<Validator<B>>,
}

impl<B: CryptoOps> ExtensionPolicy<B> {
    pub(crate) fn present(
        oid: ObjectIdentifier,
        criticality: Criticality,
        validator: Option<Validator<B>>,
    ) -> Self {
        Self { oid, requirement: Requirement::MustBePresent, criticality, validator }
    }

    pub(crate) fn maybe_present(
        oid: ObjectIdentifier,
        criticality: Criticality,
        validator: Option<Validator<B>>,
    ) -> Self {
        Self { oid, requirement: Requirement::MaybePresent, criticality, validator }
    }

    pub(crate) fn permits(
        &self,
        policy: &Policy<'_, B>,
        cert: &Certificate,
        extensions: &Extensions,
    ) -> Result<(), ValidationError> {
        match extensions.get(&self.oid) {
            Some(ext) => {
                if !self.criticality.permits(ext.critical) {
                    return Err(ValidationError::new(
                        ValidationErrorKind::MalformedCertificate,
                        format!("extension {:?} has unexpected criticality", self.oid),
                    ));
                }
                if let Some(validator) = self.validator {
                    validator(policy, cert, extensions)?;
                }
                Ok(())
            }
            None => match self.requirement {
                Requirement::MustBePresent => Err(ValidationError::new(
                    ValidationErrorKind::NotACA,
                    format!("required extension {:?} is missing", self.oid),
                )),
                Requirement::MaybePresent => Ok(()),
            },
        }
    }
}

/// Validators that apply when a certificate is in the CA role (spec §4.2
/// "CA role requirements").
pub(crate) mod ca {
    use super::*;

    pub(crate) fn basic_constraints<B: CryptoOps>(
        _policy: &Policy<'_, B>,
        _cert: &Certificate,
        extensions: &Extensions,
    ) -> Result<(), ValidationError> {
        match extensions.basic_constraints() {
            Some(bc) if bc.is_ca => Ok(()),
            _ => Err(ValidationError::new(
                ValidationErrorKind::NotACA,
                "certificate lacks CA basic constraints",
            )),
        }
    }

    pub(crate) fn key_usage<B: CryptoOps>(
        _policy: &Policy<'_, B>,
        _cert: &Certificate,
        extensions: &Extensions,
    ) -> Result<(), ValidationError> {
        match extensions.key_usage() {
            Some(ku) if ku.key_cert_sign() => Ok(()),
            _ => Err(ValidationError::new(
                ValidationErrorKind::NotACA,
                "CA certificate's keyCertSign bit is not set",
            )),
        }
    }
}

/// Validators that apply when a certificate is in the end-entity role
/// (spec §4.2 "Leaf role requirements").
pub(crate) mod ee {
    use super::*;

    pub(crate) fn basic_constraints<B: CryptoOps>(
        _policy: &Policy<'_, B>,
        _cert: &Certificate,
        extensions: &Extensions,
    ) -> Result<(), ValidationError> {
        match extensions.basic_constraints() {
            Some(bc) if bc.is_ca => Err(ValidationError::new(
                ValidationErrorKind::NotACA,
                "end-entity certificate must not assert the CA basic constraint",
            )),
            _ => Ok(()),
        }
    }
}
