// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! An OpenSSL-backed implementation of `x509_path_validator::CryptoOps`.
//!
//! This is the only place in the workspace that links against OpenSSL; the
//! validator core never sees a raw key or touches `openssl`/`openssl-sys`
//! directly. Signature verification needs the issuer's DER-encoded
//! `SubjectPublicKeyInfo` (`TbsCertificate::spki::key_bytes`) and the raw
//! bytes `child` was signed over (`Certificate::tbs_bytes`); both are
//! populated by whatever decoder produced the `Certificate` in the first
//! place.

#![forbid(unsafe_code)]

use openssl::hash::MessageDigest;
use openssl::pkey::{Id, PKey, Public};
use openssl::sign::Verifier;

use x509_path_validator::ops::{CryptoOps, SignatureError};
use x509_types::certificate::Certificate;
use x509_types::common::AlgorithmParameters;

/// A `CryptoOps` backend that verifies signatures with OpenSSL.
///
/// Stateless: every call reparses the issuer's key from the bytes on the
/// certificate it's handed. A validator that repeatedly checks the same
/// issuer (e.g. during chain building, where one CA can be tried against
/// several children) pays a re-parse per call; callers who care can wrap
/// this in their own caching layer without anything here needing to change.
#[derive(Default, Debug, Clone, Copy)]
pub struct OpenSslCryptoOps;

impl OpenSslCryptoOps {
    pub fn new() -> Self {
        Self
    }
}

/// Maps a certificate's signature algorithm to the digest OpenSSL's
/// `Verifier` should use, and the key family it's expected to be pinned
/// against. `None` for the digest means the algorithm is self-hashing
/// (Ed25519), which `openssl::sign::Verifier` handles via a digest-less
/// one-shot verify.
fn digest_and_key_family(alg: &AlgorithmParameters) -> Result<(Option<MessageDigest>, Id), SignatureError> {
    match alg {
        AlgorithmParameters::RsaWithSha1 => Ok((Some(MessageDigest::sha1()), Id::RSA)),
        AlgorithmParameters::RsaWithSha256 => Ok((Some(MessageDigest::sha256()), Id::RSA)),
        AlgorithmParameters::RsaWithSha384 => Ok((Some(MessageDigest::sha384()), Id::RSA)),
        AlgorithmParameters::RsaWithSha512 => Ok((Some(MessageDigest::sha512()), Id::RSA)),
        AlgorithmParameters::EcDsaWithSha1 => Ok((Some(MessageDigest::sha1()), Id::EC)),
        AlgorithmParameters::EcDsaWithSha256 => Ok((Some(MessageDigest::sha256()), Id::EC)),
        AlgorithmParameters::EcDsaWithSha384 => Ok((Some(MessageDigest::sha384()), Id::EC)),
        AlgorithmParameters::EcDsaWithSha512 => Ok((Some(MessageDigest::sha512()), Id::EC)),
        AlgorithmParameters::DsaWithSha256 => Ok((Some(MessageDigest::sha256()), Id::DSA)),
        AlgorithmParameters::Ed25519 => Ok((None, Id::ED25519)),
        other => Err(SignatureError::new(format!(
            "{other:?} is not a signature algorithm this backend can verify"
        ))),
    }
}

fn verify(key: &PKey<Public>, digest: Option<MessageDigest>, data: &[u8], signature: &[u8]) -> Result<bool, SignatureError> {
    match digest {
        Some(digest) => {
            let mut verifier =
                Verifier::new(digest, key).map_err(|e| SignatureError::new(e.to_string()))?;
            verifier.update(data).map_err(|e| SignatureError::new(e.to_string()))?;
            verifier.verify(signature).map_err(|e| SignatureError::new(e.to_string()))
        }
        None => {
            let mut verifier =
                Verifier::new_without_digest(key).map_err(|e| SignatureError::new(e.to_string()))?;
            verifier
                .verify_oneshot(signature, data)
                .map_err(|e| SignatureError::new(e.to_string()))
        }
    }
}

impl CryptoOps for OpenSslCryptoOps {
    fn verify_signed_by(&self, child: &Certificate, issuer: &Certificate) -> Result<(), SignatureError> {
        let (digest, expected_family) = digest_and_key_family(&child.signature_alg.params)?;

        let issuer_key = PKey::public_key_from_der(&issuer.tbs_cert.spki.key_bytes)
            .map_err(|e| SignatureError::new(format!("failed to parse issuer public key: {e}")))?;

        if issuer_key.id() != expected_family {
            return Err(SignatureError::new(format!(
                "signature algorithm expects a {:?} key but issuer key is {:?}",
                expected_family,
                issuer_key.id()
            )));
        }

        if verify(&issuer_key, digest, &child.tbs_bytes, &child.signature)? {
            Ok(())
        } else {
            Err(SignatureError::new("signature did not verify"))
        }
    }
}


#[cfg(test)]
mod tests_support {
    use openssl::pkey::{HasPublic, PKey};

    use x509_types::certificate::{
        Certificate, EcCurve, Name, PublicKey, SubjectPublicKeyInfo, TbsCertificate, Validity,
    };
    use x509_types::common::{AlgorithmIdentifier, AlgorithmParameters, Time};
    use x509_types::extensions::Extensions;

    fn time(year: u16) -> Time {
        Time::UtcTime(asn1::DateTime::new(year, 1, 1, 0, 0, 0).unwrap())
    }

    pub fn cert_with_key<T: HasPublic>(key: &PKey<T>) -> Certificate {
        let der = key.public_key_to_der().unwrap();
        let alg = AlgorithmIdentifier { params: AlgorithmParameters::Ed25519 };
        Certificate::new(
            TbsCertificate {
                serial: vec![1],
                signature_alg: alg.clone(),
                issuer: Name::new(vec![]),
                validity: Validity { not_before: time(2020), not_after: time(2030) },
                subject: Name::new(vec![]),
                spki: SubjectPublicKeyInfo {
                    algorithm: alg.clone(),
                    key: PublicKey::Ec { curve: EcCurve::P256 },
                    key_bytes: der,
                },
                extensions: Extensions::new(vec![]),
            },
            alg,
            vec![],
            vec![],
        )
    }

    pub fn cert_signed(alg: AlgorithmParameters, tbs_bytes: Vec<u8>, signature: Vec<u8>) -> Certificate {
        let sig_alg = AlgorithmIdentifier { params: alg };
        Certificate::new(
            TbsCertificate {
                serial: vec![1],
                signature_alg: sig_alg.clone(),
                issuer: Name::new(vec![]),
                validity: Validity { not_before: time(2020), not_after: time(2030) },
                subject: Name::new(vec![]),
                spki: SubjectPublicKeyInfo {
                    algorithm: sig_alg.clone(),
                    key: PublicKey::Unsupported,
                    key_bytes: vec![],
                },
                extensions: Extensions::new(vec![]),
            },
            sig_alg,
            signature,
            tbs_bytes,
        )
    }

    pub fn cert_signed_with(alg: AlgorithmParameters, tbs_bytes: &[u8]) -> Certificate {
        cert_signed(alg, tbs_bytes.to_vec(), vec![0; 64])
    }
}
