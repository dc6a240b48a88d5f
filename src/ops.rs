// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! The seam between this crate's chain-building/policy logic and an actual
//! cryptographic backend. Signature verification is the only cryptographic
//! primitive the validator needs, and it needs it in exactly one shape: "was
//! `child` signed by the key in `issuer`?" Everything else (parsing keys out
//! of bytes, hashing) is the backend's problem.
//!
//! `x509-openssl` in this workspace provides the only concrete
//! implementation; tests in this crate use a deterministic fake instead so
//! that policy and chain-building logic can be exercised without linking
//! against OpenSSL.

use x509_types::certificate::Certificate;

/// An error produced while verifying a signature. Deliberately opaque: the
/// validator only needs to know that verification failed, not why — the
/// underlying backend's error is preserved for diagnostics via `Display`.
#[derive(Debug)]
pub struct SignatureError(String);

impl SignatureError {
    /// Wraps a backend-specific failure (e.g. an OpenSSL error stack) as a
    /// `SignatureError` the validator can surface uniformly.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl std::fmt::Display for SignatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "signature verification failed: {}", self.0)
    }
}

impl std::error::Error for SignatureError {}

/// Cryptographic operations the chain builder and policy layer need from an
/// external backend (spec §4.4 "Abstract crypto boundary").
///
/// Implementations must be `Send + Sync` so that a `Validator<B>` built over
/// them can itself be shared across threads (spec §5).
pub trait CryptoOps: Send + Sync {
    /// Verifies that `child` was signed by `issuer`'s key, using `child`'s
    /// own recorded `signature_alg`. Implementations must reject a cert
    /// whose outer signature algorithm doesn't match the key type it's
    /// pinned against (e.g. an RSA signature "verified" against an EC key).
    fn verify_signed_by(&self, child: &Certificate, issuer: &Certificate) -> Result<(), SignatureError>;
}
