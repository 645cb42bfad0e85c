//! ID Permanence: reversible per-relationship pseudonymisation of internal
//! identifiers.
//!
//! The CDR ID Permanence rules require that every identifier exposed to a
//! data recipient is stable for one (software product, consumer) pair and
//! unlinkable across pairs. This module converts internal account and
//! customer identifiers to opaque URL-safe pseudonyms on the way out, and
//! reverses the transform on the way in.
//!
//! This module is intentionally free of HTTP and repository dependencies.

pub mod codec;
pub mod secret;

pub use codec::{IdPermanenceCodec, IdPermanenceContext};
pub use secret::ServerSecret;

use thiserror::Error;

/// Errors produced by the ID Permanence layer.
#[derive(Debug, Error)]
pub enum PermanenceError {
    /// A required input was missing or empty. Indicates an upstream bug,
    /// not recipient-supplied data.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The ciphertext could not be decrypted under the given context and
    /// secret. Routine for forged, stale, or foreign-context identifiers;
    /// callers map this to a domain-level not-found. Deliberately carries
    /// no detail distinguishing malformed input from a context mismatch.
    #[error("identifier could not be decrypted")]
    DecryptionFailure,

    /// The cipher primitive itself failed (bad key material). A deployment
    /// defect, detected at startup by [`ServerSecret`] validation.
    #[error("cryptographic primitive failure")]
    CryptoFailure,
}
