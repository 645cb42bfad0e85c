//! CDR wire types returned by the resource API.
//!
//! Shapes follow the Consumer Data Standards energy payloads: camelCase
//! field names, a `data` envelope, `links` for navigation, and paginated
//! responses carrying `meta` with record/page totals.
//!
//! `accountId` fields always hold the ID Permanence pseudonym by the time a
//! value of these types is serialised; the internal identifier never
//! appears on the wire.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Links and meta
// ---------------------------------------------------------------------------

/// Navigation links for an unpaginated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    /// Fully qualified URL of this request.
    #[serde(rename = "self")]
    pub self_link: String,
}

/// Navigation links for a paginated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinksPaginated {
    /// Fully qualified URL of this request.
    #[serde(rename = "self")]
    pub self_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

/// Record and page totals for a paginated response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaPaginated {
    pub total_records: u32,
    pub total_pages: u32,
}

// ---------------------------------------------------------------------------
// Energy accounts
// ---------------------------------------------------------------------------

/// A plan attached to an energy account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyAccountPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    pub service_point_ids: Vec<String>,
}

/// A single energy account as exposed to a data recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyAccount {
    /// ID Permanence pseudonym for this account (opaque, per-caller).
    pub account_id: String,
    pub account_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// `yyyy-MM-dd` date the account was created.
    pub creation_date: String,
    pub plans: Vec<EnergyAccountPlan>,
}

/// `data` envelope for the account list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyAccounts {
    pub accounts: Vec<EnergyAccount>,
}

/// Response body for `GET /cds-au/v1/energy/accounts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyAccountListResponse {
    pub data: EnergyAccounts,
    pub links: LinksPaginated,
    pub meta: MetaPaginated,
}

// ---------------------------------------------------------------------------
// Concessions
// ---------------------------------------------------------------------------

/// A concession or rebate attached to an energy account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyConcession {
    #[serde(rename = "type")]
    pub concession_type: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info_uri: Option<String>,
    pub start_date: String,
    pub end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_frequency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<String>,
    pub applied_to: Vec<String>,
}

/// `data` envelope for the concession list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyConcessions {
    pub concessions: Vec<EnergyConcession>,
}

/// Response body for `GET /cds-au/v1/energy/accounts/{accountId}/concessions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcessionsResponse {
    pub data: EnergyConcessions,
    pub links: Links,
}

// ---------------------------------------------------------------------------
// Common customer
// ---------------------------------------------------------------------------

/// Person detail for an individual customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub last_updated_time: String,
    pub first_name: String,
    pub last_name: String,
}

/// `data` envelope for the common customer payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonCustomer {
    /// Always `"person"` for the seeded individual customers.
    pub customer_u_type: String,
    pub person: Person,
}

/// Response body for `GET /cds-au/v1/common/customer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerResponse {
    pub data: CommonCustomer,
    pub links: Links,
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Number of customers in the seeded repository.
    pub customers_seeded: usize,
}
