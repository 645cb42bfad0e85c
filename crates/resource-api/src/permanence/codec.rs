//! Deterministic encryption of identifiers under a per-relationship context.
//!
//! **Algorithm:** a per-context key and nonce are derived from the server
//! secret and the lowercased context via HMAC-SHA-256 under distinct
//! domain-separation labels, then the identifier is encrypted with
//! AES-256-GCM-SIV (RFC 8452) and encoded base64url without padding.
//!
//! The nonce is constant per context, so the same identifier always maps to
//! the same pseudonym for the same caller. This is a deliberate deviation
//! from fresh-nonce AEAD usage: ID Permanence requires stability, and
//! GCM-SIV is nonce-misuse-resistant, so a reused nonce leaks only equality
//! of plaintexts within one context.
//!
//! **Do NOT substitute plain AES-256-GCM with a fixed nonce.** GCM nonce
//! reuse is catastrophic — it breaks both confidentiality and authentication.

use aes_gcm_siv::{
    aead::{Aead, KeyInit},
    Aes256GcmSiv, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::{PermanenceError, ServerSecret};

type HmacSha256 = Hmac<Sha256>;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

// Domain-separation labels for the HMAC-based derivation. Changing either
// invalidates every pseudonym issued so far.
const KEY_LABEL: &[u8] = b"id-permanence/key/v1";
const NONCE_LABEL: &[u8] = b"id-permanence/nonce/v1";

/// The per-relationship context a pseudonym is bound to.
///
/// `software_product_id` identifies the data recipient's registered software
/// product; `relying_party_id` is the customer login id for resource
/// identifiers, or the sector-identifier-uri for token subject claims. Both
/// are lowercased on construction so that case can never affect the derived
/// pseudonym. Built fresh per request from validated token claims; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdPermanenceContext {
    software_product_id: String,
    relying_party_id: String,
}

impl IdPermanenceContext {
    /// Construct a context, lowercasing both fields.
    ///
    /// # Errors
    ///
    /// Returns [`PermanenceError::InvalidArgument`] if either field is
    /// empty — empty context fields indicate an upstream claims bug, and
    /// deriving keys from them would collapse distinct relationships.
    pub fn new(
        software_product_id: &str,
        relying_party_id: &str,
    ) -> Result<Self, PermanenceError> {
        if software_product_id.trim().is_empty() {
            return Err(PermanenceError::InvalidArgument(
                "software product id must not be empty",
            ));
        }
        if relying_party_id.trim().is_empty() {
            return Err(PermanenceError::InvalidArgument(
                "relying party identifier must not be empty",
            ));
        }
        Ok(Self {
            software_product_id: software_product_id.to_lowercase(),
            relying_party_id: relying_party_id.to_lowercase(),
        })
    }
}

/// Stateless codec converting internal identifiers to and from per-caller
/// pseudonyms.
///
/// Holds only the injected [`ServerSecret`]; every operation is a pure
/// function of its inputs, so one instance may be shared across request
/// handlers without locking.
pub struct IdPermanenceCodec {
    secret: ServerSecret,
}

impl IdPermanenceCodec {
    /// Create a codec over the given server secret.
    pub fn new(secret: ServerSecret) -> Self {
        Self { secret }
    }

    /// Encrypt an internal identifier into the pseudonym exposed to the
    /// data recipient identified by `ctx`.
    ///
    /// The output is deterministic for identical inputs and uses only the
    /// base64url alphabet, so it is safe in a URL path segment or JSON
    /// field as-is.
    ///
    /// # Errors
    ///
    /// Returns [`PermanenceError::InvalidArgument`] for an empty plaintext
    /// and [`PermanenceError::CryptoFailure`] if the AEAD primitive errors.
    pub fn encrypt_id(
        &self,
        plaintext: &str,
        ctx: &IdPermanenceContext,
    ) -> Result<String, PermanenceError> {
        if plaintext.is_empty() {
            return Err(PermanenceError::InvalidArgument(
                "plaintext identifier must not be empty",
            ));
        }

        let (cipher, nonce) = self.cipher_for(ctx)?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| PermanenceError::CryptoFailure)?;

        Ok(URL_SAFE_NO_PAD.encode(ciphertext))
    }

    /// Recover the internal identifier from a pseudonym supplied by the
    /// data recipient identified by `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`PermanenceError::DecryptionFailure`] when the value is
    /// malformed, truncated, tampered with, or was issued under a different
    /// context or secret. All of these are routine for client-supplied
    /// identifiers; callers translate the failure to a domain not-found
    /// before any further processing.
    pub fn decrypt_id(
        &self,
        pseudonym: &str,
        ctx: &IdPermanenceContext,
    ) -> Result<String, PermanenceError> {
        if pseudonym.is_empty() {
            return Err(PermanenceError::DecryptionFailure);
        }

        let ciphertext = URL_SAFE_NO_PAD
            .decode(pseudonym)
            .map_err(|_| PermanenceError::DecryptionFailure)?;

        let (cipher, nonce) = self.cipher_for(ctx)?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_ref())
            .map_err(|_| PermanenceError::DecryptionFailure)?;

        String::from_utf8(plaintext).map_err(|_| PermanenceError::DecryptionFailure)
    }

    /// Produce the pairwise pseudonymous `sub` claim for a customer.
    ///
    /// The relying-party identifier for subject claims is the software
    /// product's sector-identifier-uri, so every product in one recipient
    /// ecosystem sees the same `sub` while distinct ecosystems cannot
    /// correlate customers.
    pub fn encrypt_subject_claim(
        &self,
        login_id: &str,
        software_product_id: &str,
        sector_identifier_uri: &str,
    ) -> Result<String, PermanenceError> {
        let ctx = IdPermanenceContext::new(software_product_id, sector_identifier_uri)?;
        self.encrypt_id(login_id, &ctx)
    }

    /// Recover the customer login id from an opaque OIDC `sub` claim.
    ///
    /// # Errors
    ///
    /// Same failure semantics as [`decrypt_id`](Self::decrypt_id).
    pub fn decrypt_subject_claim(
        &self,
        subject_claim: &str,
        software_product_id: &str,
        sector_identifier_uri: &str,
    ) -> Result<String, PermanenceError> {
        let ctx = IdPermanenceContext::new(software_product_id, sector_identifier_uri)?;
        self.decrypt_id(subject_claim, &ctx)
    }

    /// Encrypt one identifier field in place across a response collection.
    ///
    /// Every element is encrypted under the same `ctx` and the collection
    /// order is untouched, so repeated calls with the same caller identity
    /// observe identical pseudonyms in identical positions.
    pub fn encrypt_ids<T, F>(
        &self,
        items: &mut [T],
        ctx: &IdPermanenceContext,
        mut select: F,
    ) -> Result<(), PermanenceError>
    where
        F: FnMut(&mut T) -> &mut String,
    {
        for item in items.iter_mut() {
            let field = select(item);
            *field = self.encrypt_id(field, ctx)?;
        }
        Ok(())
    }

    /// Build the AEAD instance and nonce for a context.
    ///
    /// Key and nonce come from independent HMAC invocations so the nonce
    /// reveals nothing about the key stream. The context fields are joined
    /// with a `0x00` separator to keep `("ab","c")` and `("a","bc")`
    /// distinct.
    fn cipher_for(
        &self,
        ctx: &IdPermanenceContext,
    ) -> Result<(Aes256GcmSiv, [u8; NONCE_LEN]), PermanenceError> {
        let key = self.derive(KEY_LABEL, ctx)?;
        let digest = self.derive(NONCE_LABEL, ctx)?;
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&digest[..NONCE_LEN]);

        let cipher = Aes256GcmSiv::new_from_slice(&key)
            .map_err(|_| PermanenceError::CryptoFailure)?;
        Ok((cipher, nonce))
    }

    fn derive(
        &self,
        label: &[u8],
        ctx: &IdPermanenceContext,
    ) -> Result<[u8; KEY_LEN], PermanenceError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.secret.bytes())
            .map_err(|_| PermanenceError::CryptoFailure)?;
        mac.update(label);
        mac.update(&[0x00]);
        mac.update(ctx.software_product_id.as_bytes());
        mac.update(&[0x00]);
        mac.update(ctx.relying_party_id.as_bytes());

        let mut out = [0u8; KEY_LEN];
        out.copy_from_slice(&mac.finalize().into_bytes());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Fixture values mirroring the seeded consumer data.
    const SECRET: &[u8] = b"90733A75F19347118B3BE0030AB590A8";
    const SOFTWARE_PRODUCT_ID: &str = "c6327f87-687a-4369-99a4-eaacd3bb8210";
    const OTHER_SOFTWARE_PRODUCT_ID: &str = "86ecbdd8-3c27-42ee-a041-6b3a8b8e3b3b";
    const LOGIN_ID: &str = "mmoss";
    const ACCOUNT_ID: &str = "0011223301";
    const SECTOR_URI: &str = "api.adr-ecosystem.example/sector";

    fn codec() -> IdPermanenceCodec {
        IdPermanenceCodec::new(ServerSecret::new(SECRET.to_vec()).unwrap())
    }

    fn ctx() -> IdPermanenceContext {
        IdPermanenceContext::new(SOFTWARE_PRODUCT_ID, LOGIN_ID).unwrap()
    }

    #[test]
    fn round_trip_recovers_plaintext() {
        let codec = codec();
        let pseudonym = codec.encrypt_id(ACCOUNT_ID, &ctx()).unwrap();
        assert_ne!(pseudonym, ACCOUNT_ID);
        assert_eq!(codec.decrypt_id(&pseudonym, &ctx()).unwrap(), ACCOUNT_ID);
    }

    #[test]
    fn round_trip_across_identifier_charset() {
        let codec = codec();
        let context = ctx();
        let long = "A".repeat(100);
        for plaintext in [
            "1",
            "0011223301",
            "db1ddad1-a033-4088-8d0f-c800ed462717",
            "NMI-3001234567890",
            long.as_str(),
        ] {
            let pseudonym = codec.encrypt_id(plaintext, &context).unwrap();
            assert_eq!(codec.decrypt_id(&pseudonym, &context).unwrap(), plaintext);
        }
    }

    #[test]
    fn repeated_encryption_is_stable() {
        // Two fresh authorise/token/fetch cycles for the same consumer and
        // software product must expose byte-identical account ids.
        let first = codec().encrypt_id(ACCOUNT_ID, &ctx()).unwrap();
        let second = codec().encrypt_id(ACCOUNT_ID, &ctx()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn different_software_product_sees_different_pseudonym() {
        let codec = codec();
        let ctx2 = IdPermanenceContext::new(OTHER_SOFTWARE_PRODUCT_ID, LOGIN_ID).unwrap();
        let p1 = codec.encrypt_id(ACCOUNT_ID, &ctx()).unwrap();
        let p2 = codec.encrypt_id(ACCOUNT_ID, &ctx2).unwrap();
        assert_ne!(p1, p2);
    }

    #[test]
    fn different_customer_sees_different_pseudonym() {
        let codec = codec();
        let ctx2 = IdPermanenceContext::new(SOFTWARE_PRODUCT_ID, "sken").unwrap();
        let p1 = codec.encrypt_id(ACCOUNT_ID, &ctx()).unwrap();
        let p2 = codec.encrypt_id(ACCOUNT_ID, &ctx2).unwrap();
        assert_ne!(p1, p2);
    }

    #[test]
    fn cross_context_decryption_fails() {
        let codec = codec();
        let ctx2 = IdPermanenceContext::new(OTHER_SOFTWARE_PRODUCT_ID, LOGIN_ID).unwrap();
        let pseudonym = codec.encrypt_id(ACCOUNT_ID, &ctx()).unwrap();
        let result = codec.decrypt_id(&pseudonym, &ctx2);
        assert!(matches!(result, Err(PermanenceError::DecryptionFailure)));
    }

    #[test]
    fn wrong_secret_fails_decryption() {
        let pseudonym = codec().encrypt_id(ACCOUNT_ID, &ctx()).unwrap();
        let other =
            IdPermanenceCodec::new(ServerSecret::new(vec![0x17u8; 32]).unwrap());
        assert!(matches!(
            other.decrypt_id(&pseudonym, &ctx()),
            Err(PermanenceError::DecryptionFailure)
        ));
    }

    #[test]
    fn context_is_case_insensitive() {
        let codec = codec();
        let upper = IdPermanenceContext::new(
            &SOFTWARE_PRODUCT_ID.to_uppercase(),
            &LOGIN_ID.to_uppercase(),
        )
        .unwrap();
        assert_eq!(
            codec.encrypt_id(ACCOUNT_ID, &ctx()).unwrap(),
            codec.encrypt_id(ACCOUNT_ID, &upper).unwrap()
        );
    }

    #[test]
    fn pseudonym_is_url_path_segment_safe() {
        let pseudonym = codec().encrypt_id(ACCOUNT_ID, &ctx()).unwrap();
        assert!(pseudonym
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn single_character_tamper_is_detected() {
        let codec = codec();
        let pseudonym = codec.encrypt_id(ACCOUNT_ID, &ctx()).unwrap();
        // Flip every position in turn; each mutation must fail to decrypt.
        for i in 0..pseudonym.len() {
            let mut chars: Vec<char> = pseudonym.chars().collect();
            chars[i] = if chars[i] == 'A' { 'B' } else { 'A' };
            let mutated: String = chars.into_iter().collect();
            if mutated == pseudonym {
                continue;
            }
            assert!(
                codec.decrypt_id(&mutated, &ctx()).is_err(),
                "mutation at {i} decrypted successfully"
            );
        }
    }

    #[test]
    fn truncated_pseudonym_fails() {
        let codec = codec();
        let pseudonym = codec.encrypt_id(ACCOUNT_ID, &ctx()).unwrap();
        let truncated = &pseudonym[..pseudonym.len() / 2];
        assert!(matches!(
            codec.decrypt_id(truncated, &ctx()),
            Err(PermanenceError::DecryptionFailure)
        ));
    }

    #[test]
    fn garbage_input_fails_not_panics() {
        let codec = codec();
        for garbage in ["", "not base64!!", "AAAA", ACCOUNT_ID] {
            assert!(matches!(
                codec.decrypt_id(garbage, &ctx()),
                Err(PermanenceError::DecryptionFailure)
            ));
        }
    }

    #[test]
    fn empty_plaintext_is_invalid_argument() {
        assert!(matches!(
            codec().encrypt_id("", &ctx()),
            Err(PermanenceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn empty_context_fields_rejected() {
        assert!(IdPermanenceContext::new("", LOGIN_ID).is_err());
        assert!(IdPermanenceContext::new(SOFTWARE_PRODUCT_ID, " ").is_err());
    }

    #[test]
    fn subject_claim_round_trip() {
        let codec = codec();
        let sub = codec
            .encrypt_subject_claim(LOGIN_ID, SOFTWARE_PRODUCT_ID, SECTOR_URI)
            .unwrap();
        assert_ne!(sub, LOGIN_ID);
        let recovered = codec
            .decrypt_subject_claim(&sub, SOFTWARE_PRODUCT_ID, SECTOR_URI)
            .unwrap();
        assert_eq!(recovered, LOGIN_ID);
    }

    #[test]
    fn subject_claim_bound_to_sector() {
        let codec = codec();
        let sub = codec
            .encrypt_subject_claim(LOGIN_ID, SOFTWARE_PRODUCT_ID, SECTOR_URI)
            .unwrap();
        let result =
            codec.decrypt_subject_claim(&sub, SOFTWARE_PRODUCT_ID, "other-sector.example");
        assert!(matches!(result, Err(PermanenceError::DecryptionFailure)));
    }

    #[test]
    fn subject_claim_differs_from_resource_pseudonym() {
        // The sub claim uses the sector uri, not the login id, as the
        // relying-party identifier; the two derivations must not collide.
        let codec = codec();
        let as_sub = codec
            .encrypt_subject_claim(ACCOUNT_ID, SOFTWARE_PRODUCT_ID, SECTOR_URI)
            .unwrap();
        let as_resource = codec.encrypt_id(ACCOUNT_ID, &ctx()).unwrap();
        assert_ne!(as_sub, as_resource);
    }

    #[test]
    fn batch_encrypts_in_place_preserving_order() {
        struct Row {
            account_id: String,
        }
        let codec = codec();
        let context = ctx();
        let mut rows: Vec<Row> = ["0011223301", "0011223302", "0011223303"]
            .iter()
            .map(|id| Row {
                account_id: (*id).into(),
            })
            .collect();

        codec
            .encrypt_ids(&mut rows, &context, |r| &mut r.account_id)
            .unwrap();

        // Each element matches the single-value encryption of its original
        // id, proving order and context were preserved.
        for (row, original) in rows.iter().zip(["0011223301", "0011223302", "0011223303"]) {
            assert_eq!(
                row.account_id,
                codec.encrypt_id(original, &context).unwrap()
            );
        }
    }
}
