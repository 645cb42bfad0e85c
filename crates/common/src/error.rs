//! CDR error catalogue shared across crates.
//!
//! The Consumer Data Standards mandate a fixed error envelope:
//!
//! ```json
//! { "errors": [ { "code": "urn:au-cds:error:...", "title": "...", "detail": "..." } ] }
//! ```
//!
//! Only the subset of the catalogue that the resource API surfaces is
//! defined here. Detail strings must never contain internal identifiers;
//! where an identifier is echoed it is the opaque value as received.

use serde::{Deserialize, Serialize};

/// A single CDR error entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdsError {
    /// CDR URN error code (e.g. `urn:au-cds:error:cds-all:Authorisation/InvalidEnergyAccount`).
    pub code: String,
    /// Human-readable error title from the standards.
    pub title: String,
    /// Error-specific detail safe to expose to the data recipient.
    pub detail: String,
}

impl CdsError {
    /// The supplied energy account id is invalid, unknown, or not decryptable
    /// for this caller. `account_id` is the opaque id exactly as received.
    pub fn invalid_energy_account(account_id: &str) -> Self {
        Self {
            code: "urn:au-cds:error:cds-all:Authorisation/InvalidEnergyAccount".into(),
            title: "Invalid Energy Account".into(),
            detail: account_id.into(),
        }
    }

    /// The account exists but is not covered by the current consent.
    pub fn consent_not_found() -> Self {
        Self {
            code: "urn:au-cds:error:cds-all:Authorisation/InvalidConsent".into(),
            title: "Consent Is Invalid".into(),
            detail: "The authorised consumer's consent does not cover this account".into(),
        }
    }

    /// The requested page is past the end of the result set.
    pub fn page_out_of_range(total_pages: u32) -> Self {
        Self {
            code: "urn:au-cds:error:cds-all:Field/InvalidPage".into(),
            title: "Invalid Page".into(),
            detail: format!("Page is out of range. Maximum page is {total_pages}"),
        }
    }

    /// A query parameter failed validation.
    pub fn invalid_field(field: &str) -> Self {
        Self {
            code: "urn:au-cds:error:cds-all:Field/Invalid".into(),
            title: "Invalid Field".into(),
            detail: field.into(),
        }
    }

    /// The access-token claims forwarded with the request are missing or invalid.
    pub fn invalid_token() -> Self {
        Self {
            code: "urn:au-cds:error:cds-all:Authorisation/InvalidToken".into(),
            title: "Invalid Token".into(),
            detail: "The supplied access token claims are missing or invalid".into(),
        }
    }

    /// The requested URL does not correspond to any resource.
    pub fn resource_not_found() -> Self {
        Self {
            code: "urn:au-cds:error:cds-all:Resource/NotFound".into(),
            title: "Resource Not Found".into(),
            detail: "The requested resource does not exist".into(),
        }
    }

    /// Catch-all for unexpected internal failures.
    pub fn unexpected() -> Self {
        Self {
            code: "urn:au-cds:error:cds-all:GeneralError/Unexpected".into(),
            title: "Unexpected Error Encountered".into(),
            detail: "An unexpected error was encountered".into(),
        }
    }
}

/// The CDR error envelope: a list of [`CdsError`] entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorList {
    pub errors: Vec<CdsError>,
}

impl ErrorList {
    /// Wrap a single error in an envelope.
    pub fn of(error: CdsError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl From<CdsError> for ErrorList {
    fn from(error: CdsError) -> Self {
        Self::of(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_energy_account_echoes_opaque_id() {
        let e = CdsError::invalid_energy_account("4oaNRZnO_opaque");
        assert!(e.code.ends_with("Authorisation/InvalidEnergyAccount"));
        assert_eq!(e.detail, "4oaNRZnO_opaque");
    }

    #[test]
    fn page_out_of_range_names_maximum() {
        let e = CdsError::page_out_of_range(7);
        assert!(e.detail.contains('7'));
    }

    #[test]
    fn envelope_serialises_to_errors_array() {
        let list = ErrorList::of(CdsError::consent_not_found());
        let json = serde_json::to_value(&list).unwrap();
        assert!(json["errors"].is_array());
        assert_eq!(json["errors"][0]["title"], "Consent Is Invalid");
    }
}
