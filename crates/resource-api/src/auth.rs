//! Access-token claims forwarded by the identity gateway.
//!
//! Token validation (FAPI / OIDC) happens upstream; the gateway forwards the
//! claims this API needs as trusted headers. The `sub` claim arrives still
//! encrypted under ID Permanence rules and is decrypted per request by the
//! handlers.

use axum::http::HeaderMap;
use thiserror::Error;
use uuid::Uuid;

/// Header carrying the `software_id` claim (the data recipient's software
/// product GUID).
pub const SOFTWARE_PRODUCT_ID_HEADER: &str = "x-software-product-id";

/// Header carrying the pairwise-pseudonymous `sub` claim.
pub const SUBJECT_HEADER: &str = "x-subject";

/// Header carrying the `sector_identifier_uri` claim.
pub const SECTOR_IDENTIFIER_URI_HEADER: &str = "x-sector-identifier-uri";

/// Header carrying the consented internal account ids, comma-separated.
pub const ACCOUNT_IDS_HEADER: &str = "x-account-ids";

/// Errors extracting claims from the forwarded headers.
///
/// All variants mean the same thing to the caller: the request is not
/// properly authorised and gets a 401 with the CDR invalid-token error.
#[derive(Debug, Error)]
pub enum ClaimsError {
    #[error("missing claim header: {0}")]
    Missing(&'static str),

    #[error("claim header is not valid: {0}")]
    Invalid(&'static str),
}

/// The validated claims a resource handler needs.
#[derive(Debug, Clone)]
pub struct AuthClaims {
    /// The data recipient's software product id, normalised to lowercase
    /// hyphenated UUID form.
    pub software_product_id: String,
    /// The opaque `sub` claim; decrypt with
    /// [`crate::permanence::IdPermanenceCodec::decrypt_subject_claim`] to
    /// obtain the login id.
    pub subject: String,
    /// The recipient ecosystem's sector-identifier-uri.
    pub sector_identifier_uri: String,
    /// Internal ids of the accounts the consumer consented to share.
    pub account_ids: Vec<String>,
}

impl AuthClaims {
    /// Extract and validate claims from the forwarded headers.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimsError`] if a required header is absent, non-ASCII,
    /// empty, or (for the software product id) not a UUID.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ClaimsError> {
        let software_product_id = required(headers, SOFTWARE_PRODUCT_ID_HEADER)?;
        // Software products are registered with GUID keys; anything else is
        // a malformed or forged claim set.
        let software_product_id = Uuid::parse_str(&software_product_id)
            .map_err(|_| ClaimsError::Invalid(SOFTWARE_PRODUCT_ID_HEADER))?
            .to_string();

        let subject = required(headers, SUBJECT_HEADER)?;
        let sector_identifier_uri = required(headers, SECTOR_IDENTIFIER_URI_HEADER)?;

        let account_ids = match headers.get(ACCOUNT_IDS_HEADER) {
            Some(raw) => raw
                .to_str()
                .map_err(|_| ClaimsError::Invalid(ACCOUNT_IDS_HEADER))?
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from)
                .collect(),
            // A consent with no account scope is legal; it just grants
            // access to no accounts.
            None => Vec::new(),
        };

        Ok(Self {
            software_product_id,
            subject,
            sector_identifier_uri,
            account_ids,
        })
    }

    /// Whether the consumer consented to sharing this internal account id.
    pub fn has_consented_account(&self, account_id: &str) -> bool {
        self.account_ids.iter().any(|id| id == account_id)
    }
}

fn required(headers: &HeaderMap, name: &'static str) -> Result<String, ClaimsError> {
    let value = headers
        .get(name)
        .ok_or(ClaimsError::Missing(name))?
        .to_str()
        .map_err(|_| ClaimsError::Invalid(name))?;
    if value.trim().is_empty() {
        return Err(ClaimsError::Missing(name));
    }
    Ok(value.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn valid_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            SOFTWARE_PRODUCT_ID_HEADER,
            HeaderValue::from_static("C6327F87-687A-4369-99A4-EAACD3BB8210"),
        );
        headers.insert(SUBJECT_HEADER, HeaderValue::from_static("b3BhcXVlLXN1Yg"));
        headers.insert(
            SECTOR_IDENTIFIER_URI_HEADER,
            HeaderValue::from_static("api.adr-ecosystem.example/sector"),
        );
        headers.insert(
            ACCOUNT_IDS_HEADER,
            HeaderValue::from_static("0011223301, 0011223302"),
        );
        headers
    }

    #[test]
    fn extracts_all_claims() {
        let claims = AuthClaims::from_headers(&valid_headers()).unwrap();
        assert_eq!(
            claims.software_product_id,
            "c6327f87-687a-4369-99a4-eaacd3bb8210"
        );
        assert_eq!(claims.account_ids, vec!["0011223301", "0011223302"]);
        assert!(claims.has_consented_account("0011223302"));
        assert!(!claims.has_consented_account("9999999999"));
    }

    #[test]
    fn software_product_id_must_be_uuid() {
        let mut headers = valid_headers();
        headers.insert(
            SOFTWARE_PRODUCT_ID_HEADER,
            HeaderValue::from_static("not-a-guid"),
        );
        assert!(matches!(
            AuthClaims::from_headers(&headers),
            Err(ClaimsError::Invalid(SOFTWARE_PRODUCT_ID_HEADER))
        ));
    }

    #[test]
    fn missing_subject_rejected() {
        let mut headers = valid_headers();
        headers.remove(SUBJECT_HEADER);
        assert!(matches!(
            AuthClaims::from_headers(&headers),
            Err(ClaimsError::Missing(SUBJECT_HEADER))
        ));
    }

    #[test]
    fn absent_account_ids_is_empty_consent() {
        let mut headers = valid_headers();
        headers.remove(ACCOUNT_IDS_HEADER);
        let claims = AuthClaims::from_headers(&headers).unwrap();
        assert!(claims.account_ids.is_empty());
    }
}
