// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! The fixed set of recognized extension variants (spec §3) plus the
//! `Extensions` map the rest of the crate reads them out of. Everything
//! outside this closed set decodes to `ExtensionValue::Opaque` — the
//! decoder still records whether it was marked critical, since an
//! unrecognized *critical* extension must fail validation (RFC 5280 4.2) even
//! though its content is never inspected.

use std::collections::HashMap;

use crate::name::GeneralName;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicConstraints {
    pub is_ca: bool,
    pub path_length: Option<u64>,
}

/// The nine key usage bits from RFC 5280 4.2.1.3, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct KeyUsage {
    pub digital_signature: bool,
    pub content_commitment: bool,
    pub key_encipherment: bool,
    pub data_encipherment: bool,
    pub key_agreement: bool,
    pub key_cert_sign: bool,
    pub crl_sign: bool,
    pub encipher_only: bool,
    pub decipher_only: bool,
}

impl KeyUsage {
    pub fn key_cert_sign(&self) -> bool {
        self.key_cert_sign
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedKeyUsage {
    oids: Vec<asn1::ObjectIdentifier>,
}

impl ExtendedKeyUsage {
    pub fn new(oids: Vec<asn1::ObjectIdentifier>) -> Self {
        Self { oids }
    }

    /// Whether this EKU set permits `requested`, honoring
    /// `anyExtendedKeyUsage` as a wildcard.
    pub fn permits(&self, requested: &asn1::ObjectIdentifier) -> bool {
        self.oids
            .iter()
            .any(|oid| oid == requested || *oid == crate::oid::ANY_EXTENDED_KEY_USAGE_OID)
    }

    pub fn iter(&self) -> impl Iterator<Item = &asn1::ObjectIdentifier> {
        self.oids.iter()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectAlternativeName {
    names: Vec<GeneralName>,
}

impl SubjectAlternativeName {
    pub fn new(names: Vec<GeneralName>) -> Self {
        Self { names }
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneralName> {
        self.names.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct NameConstraints {
    pub permitted_subtrees: Vec<GeneralName>,
    pub excluded_subtrees: Vec<GeneralName>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtensionValue {
    BasicConstraints(BasicConstraints),
    KeyUsage(KeyUsage),
    ExtendedKeyUsage(ExtendedKeyUsage),
    SubjectAlternativeName(SubjectAlternativeName),
    NameConstraints(NameConstraints),
    /// Anything this crate's (assumed external) decoder didn't recognize.
    Opaque(Vec<u8>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extension {
    pub oid: asn1::ObjectIdentifier,
    pub critical: bool,
    pub value: ExtensionValue,
}

/// The decoded extension set of a single certificate, keyed by OID.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extensions {
    by_oid: HashMap<asn1::ObjectIdentifier, Extension>,
}

impl Extensions {
    pub fn new(extensions: Vec<Extension>) -> Self {
        Self {
            by_oid: extensions.into_iter().map(|e| (e.oid.clone(), e)).collect(),
        }
    }

    pub fn get(&self, oid: &asn1::ObjectIdentifier) -> Option<&Extension> {
        self.by_oid.get(oid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Extension> {
        self.by_oid.values()
    }

    pub fn critical_oids(&self) -> impl Iterator<Item = &asn1::ObjectIdentifier> {
        self.by_oid.values().filter(|e| e.critical).map(|e| &e.oid)
    }

    pub fn basic_constraints(&self) -> Option<&BasicConstraints> {
        match &self.get(&crate::oid::BASIC_CONSTRAINTS_OID)?.value {
            ExtensionValue::BasicConstraints(bc) => Some(bc),
            _ => None,
        }
    }

    pub fn key_usage(&self) -> Option<&KeyUsage> {
        match &self.get(&crate::oid::KEY_USAGE_OID)?.value {
            ExtensionValue::KeyUsage(ku) => Some(ku),
            _ => None,
        }
    }

    pub fn extended_key_usage(&self) -> Option<&ExtendedKeyUsage> {
        match &self.get(&crate::oid::EXTENDED_KEY_USAGE_OID)?.value {
            ExtensionValue::ExtendedKeyUsage(eku) => Some(eku),
            _ => None,
        }
    }

    pub fn subject_alternative_name(&self) -> Option<&SubjectAlternativeName> {
        match &self.get(&crate::oid::SUBJECT_ALTERNATIVE_NAME_OID)?.value {
            ExtensionValue::SubjectAlternativeName(san) => Some(san),
            _ => None,
        }
    }

    pub fn name_constraints(&self) -> Option<&NameConstraints> {
        match &self.get(&crate::oid::NAME_CONSTRAINTS_OID)?.value {
            ExtensionValue::NameConstraints(nc) => Some(nc),
            _ => None,
        }
    }
}
