//! [`ServerSecret`]: validated ID Permanence key material.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::PermanenceError;

/// Minimum accepted secret length in bytes.
pub const MIN_SECRET_LEN: usize = 16;

/// The process-wide ID Permanence private key.
///
/// Provisioned out-of-band and read once from configuration at startup;
/// constructed explicitly and injected into [`IdPermanenceCodec`] so tests
/// can substitute distinct keys without process-wide state. The memory is
/// overwritten with zeroes on drop to minimise the window during which key
/// material lives in RAM.
///
/// [`IdPermanenceCodec`]: super::IdPermanenceCodec
#[derive(Clone)]
pub struct ServerSecret(Vec<u8>);

impl ServerSecret {
    /// Validate and wrap raw key material, applying no decoding.
    ///
    /// # Errors
    ///
    /// Returns [`PermanenceError::CryptoFailure`] if the material is
    /// shorter than [`MIN_SECRET_LEN`] bytes. This is a startup-class
    /// deployment defect; the caller should fail fast rather than serve
    /// requests.
    pub fn new(material: impl Into<Vec<u8>>) -> Result<Self, PermanenceError> {
        let bytes = material.into();
        if bytes.len() < MIN_SECRET_LEN {
            return Err(PermanenceError::CryptoFailure);
        }
        Ok(Self(bytes))
    }

    /// Parse the configured secret string into key material.
    ///
    /// The value must be hex- or base64-encoded. Hex is tried first: the
    /// rare string that is valid under both encodings (even length, only
    /// `[0-9A-Fa-f]`) is read as hex, so operators using base64 should
    /// avoid all-hex alphabets.
    ///
    /// # Errors
    ///
    /// Returns [`PermanenceError::CryptoFailure`] if the value decodes
    /// under neither encoding or the decoded key is shorter than
    /// [`MIN_SECRET_LEN`] bytes.
    pub fn from_config(value: &str) -> Result<Self, PermanenceError> {
        let trimmed = value.trim();
        let bytes = match hex::decode(trimmed) {
            Ok(bytes) => bytes,
            Err(_) => STANDARD
                .decode(trimmed)
                .map_err(|_| PermanenceError::CryptoFailure)?,
        };
        Self::new(bytes)
    }

    /// Borrow the raw key material. Never logged, never echoed.
    pub(super) fn bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for ServerSecret {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for ServerSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("ServerSecret([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_minimum_length_material() {
        assert!(ServerSecret::new(vec![0x5au8; MIN_SECRET_LEN]).is_ok());
    }

    #[test]
    fn rejects_short_material() {
        let result = ServerSecret::new(b"too-short".to_vec());
        assert!(matches!(result, Err(PermanenceError::CryptoFailure)));
    }

    #[test]
    fn rejects_empty_material() {
        assert!(ServerSecret::new(Vec::new()).is_err());
    }

    #[test]
    fn from_config_decodes_hex() {
        // 32 hex characters decode to a 16-byte key, not 32 ASCII bytes.
        let secret = ServerSecret::from_config("90733A75F19347118B3BE0030AB590A8").unwrap();
        assert_eq!(secret.bytes().len(), 16);
        assert_eq!(secret.bytes()[0], 0x90);
        assert_eq!(secret.bytes()[15], 0xA8);
    }

    #[test]
    fn from_config_decodes_base64() {
        let key = vec![0x42u8; 32];
        let encoded = STANDARD.encode(&key);
        let secret = ServerSecret::from_config(&encoded).unwrap();
        assert_eq!(secret.bytes(), key.as_slice());
    }

    #[test]
    fn from_config_rejects_undecodable_value() {
        let result = ServerSecret::from_config("not hex, not base64!");
        assert!(matches!(result, Err(PermanenceError::CryptoFailure)));
    }

    #[test]
    fn from_config_rejects_short_decoded_key() {
        // Valid hex, but only 4 bytes of key material.
        let result = ServerSecret::from_config("DEADBEEF");
        assert!(matches!(result, Err(PermanenceError::CryptoFailure)));
    }

    #[test]
    fn redacted_in_debug() {
        let secret = ServerSecret::new(b"90733A75F19347118B3BE0030AB590A8".to_vec()).unwrap();
        let printed = format!("{secret:?}");
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains("90733A75"));
    }
}
