// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! A set of trust anchors (spec §3 "TrustStore"). Membership is the only
//! thing this type needs to answer: "is this certificate a trust anchor?"
//! The chain builder treats trust-store membership, not self-signedness, as
//! the termination condition for a path (spec §4.3).

use std::collections::HashMap;

use x509_types::certificate::{CertId, Certificate};

/// An immutable collection of trust anchors.
///
/// Built once from a list of anchor certificates; `Validator::validate` never
/// mutates it, so a single `TrustStore` can be shared across concurrently
/// running validations (spec §5).
#[derive(Clone, Debug, Default)]
pub struct TrustStore {
    anchors: HashMap<CertId, Certificate>,
}

impl TrustStore {
    pub fn new(anchors: impl IntoIterator<Item = Certificate>) -> Self {
        Self {
            anchors: anchors.into_iter().map(|c| (c.id(), c)).collect(),
        }
    }

    pub fn contains(&self, cert: &Certificate) -> bool {
        self.anchors.contains_key(&cert.id())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Certificate> {
        self.anchors.values()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }
}

impl FromIterator<Certificate> for TrustStore {
    fn from_iter<T: IntoIterator<Item = Certificate>>(iter: T) -> Self {
        Self::new(iter)
    }
}
