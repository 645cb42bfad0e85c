//! Axum request handlers for the resource API endpoints.
//!
//! Every handler follows the same shape: extract the forwarded token
//! claims, decrypt the subject claim to the customer login id, perform the
//! lookup, and pass any identifier through the ID Permanence codec at the
//! boundary. Decrypt failures on inbound identifiers are routine and map to
//! CDR not-found errors; they never surface as 5xx.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::error::{CdsError, ErrorList};
use common::protocol::{
    ConcessionsResponse, CustomerResponse, EnergyAccountListResponse, EnergyAccounts,
    EnergyConcessions, HealthResponse, Links, LinksPaginated, MetaPaginated,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::state::{AppState, PageLimits};
use crate::auth::AuthClaims;
use crate::permanence::{IdPermanenceContext, PermanenceError};

/// An authorised caller: validated claims plus the decrypted login id.
struct Caller {
    claims: AuthClaims,
    login_id: String,
}

/// Extract claims and recover the customer login id from the `sub` claim.
///
/// Any claims or subject-decryption problem yields the CDR invalid-token
/// response; a recipient holding a token minted under a different secret or
/// sector gets a 401, not an error oracle.
fn authorise(state: &AppState, headers: &HeaderMap) -> Result<Caller, Response> {
    let claims = match AuthClaims::from_headers(headers) {
        Ok(claims) => claims,
        Err(e) => {
            warn!(error = %e, "request rejected: claim headers invalid");
            return Err(error_response(
                StatusCode::UNAUTHORIZED,
                CdsError::invalid_token(),
            ));
        }
    };

    let login_id = match state.codec.decrypt_subject_claim(
        &claims.subject,
        &claims.software_product_id,
        &claims.sector_identifier_uri,
    ) {
        Ok(login_id) => login_id,
        Err(PermanenceError::DecryptionFailure) => {
            warn!("request rejected: subject claim could not be decrypted");
            return Err(error_response(
                StatusCode::UNAUTHORIZED,
                CdsError::invalid_token(),
            ));
        }
        Err(e) => {
            error!(error = %e, "subject claim decryption failed unexpectedly");
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                CdsError::unexpected(),
            ));
        }
    };

    Ok(Caller { claims, login_id })
}

/// `GET /cds-au/v1/common/customer` — basic profile of the consenting customer.
pub async fn get_customer(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let caller = match authorise(&state, &headers) {
        Ok(caller) => caller,
        Err(resp) => return resp,
    };

    let Some(customer) = state.repository.customer_by_login_id(&caller.login_id) else {
        // The token authorised a login id this holder does not know; an
        // upstream data inconsistency rather than recipient input.
        warn!("no customer record for authorised login id");
        return error_response(StatusCode::BAD_REQUEST, CdsError::unexpected());
    };

    let body = CustomerResponse {
        data: customer,
        links: Links {
            self_link: format!("{}/cds-au/v1/common/customer", state.base_uri),
        },
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Query parameters for the account list endpoint.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
    #[serde(rename = "page-size")]
    page_size: Option<String>,
}

/// `GET /cds-au/v1/energy/accounts` — paginated consented accounts, with
/// every `accountId` replaced by its per-caller pseudonym.
pub async fn get_energy_accounts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    let caller = match authorise(&state, &headers) {
        Ok(caller) => caller,
        Err(resp) => return resp,
    };

    let (page, page_size) = match parse_page_params(&query, state.page_limits) {
        Ok(parsed) => parsed,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    // Only accounts covered by the consent are visible at all.
    let mut accounts = state.repository.accounts_for_login_id(&caller.login_id);
    accounts.retain(|a| caller.claims.has_consented_account(&a.account_id));

    let total_records = accounts.len() as u32;
    let total_pages = total_records.div_ceil(page_size);
    if page != 1 && page > total_pages {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            CdsError::page_out_of_range(total_pages),
        );
    }

    let start = (page as u64 - 1) * page_size as u64;
    let mut page_accounts: Vec<_> = accounts
        .into_iter()
        .skip(start as usize)
        .take(page_size as usize)
        .collect();

    // Replace internal account ids with pseudonyms, in place, all under the
    // caller's single context.
    let ctx = match IdPermanenceContext::new(&caller.claims.software_product_id, &caller.login_id)
    {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(error = %e, "could not build id permanence context");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, CdsError::unexpected());
        }
    };
    if let Err(e) = state
        .codec
        .encrypt_ids(&mut page_accounts, &ctx, |a| &mut a.account_id)
    {
        error!(error = %e, "account id encryption failed");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, CdsError::unexpected());
    }

    let body = EnergyAccountListResponse {
        data: EnergyAccounts {
            accounts: page_accounts,
        },
        links: paginated_links(&state.base_uri, page, page_size, total_pages),
        meta: MetaPaginated {
            total_records,
            total_pages,
        },
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// `GET /cds-au/v1/energy/accounts/{accountId}/concessions`.
///
/// The path id is the caller's pseudonym and is decrypted before any lookup.
/// Per the standards, an undecryptable or unknown account takes precedence
/// over a missing consent in the error ordering.
pub async fn get_concessions(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let caller = match authorise(&state, &headers) {
        Ok(caller) => caller,
        Err(resp) => return resp,
    };

    let ctx = match IdPermanenceContext::new(&caller.claims.software_product_id, &caller.login_id)
    {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(error = %e, "could not build id permanence context");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, CdsError::unexpected());
        }
    };

    let internal_id = match state.codec.decrypt_id(&account_id, &ctx) {
        Ok(id) => id,
        Err(PermanenceError::DecryptionFailure) => {
            // Forged, stale, or foreign-context id. The response must not
            // reveal which; only the opaque id as received is echoed.
            info!("account id could not be decrypted for this caller");
            return error_response(
                StatusCode::NOT_FOUND,
                CdsError::invalid_energy_account(&account_id),
            );
        }
        Err(e) => {
            error!(error = %e, "account id decryption failed unexpectedly");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, CdsError::unexpected());
        }
    };

    if !state.repository.can_access_account(&internal_id) {
        info!("decrypted account id is unknown to this holder");
        return error_response(
            StatusCode::NOT_FOUND,
            CdsError::invalid_energy_account(&account_id),
        );
    }

    if !caller.claims.has_consented_account(&internal_id) {
        info!("consent does not cover the requested account");
        return error_response(StatusCode::NOT_FOUND, CdsError::consent_not_found());
    }

    let body = ConcessionsResponse {
        data: EnergyConcessions {
            concessions: state.repository.concessions_for_account(&internal_id),
        },
        links: Links {
            self_link: format!(
                "{}/cds-au/v1/energy/accounts/{}/concessions",
                state.base_uri, account_id
            ),
        },
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// `GET /health` — liveness and readiness check.
pub async fn health(State(state): State<AppState>) -> Response {
    let customers_seeded = state.repository.customer_count();
    let (status_code, status_str) = if customers_seeded > 0 {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        customers_seeded,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorList::of(CdsError::resource_not_found())),
    )
}

// ---------------------------------------------------------------------------
// Pagination helpers
// ---------------------------------------------------------------------------

/// Parse and bound the `page` / `page-size` parameters.
fn parse_page_params(query: &PageQuery, limits: PageLimits) -> Result<(u32, u32), CdsError> {
    let page = match query.page.as_deref() {
        None | Some("") => 1,
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| CdsError::invalid_field("page"))?,
    };

    let page_size = match query.page_size.as_deref() {
        None | Some("") => limits.default_page_size,
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|s| (1..=limits.max_page_size).contains(s))
            .ok_or_else(|| CdsError::invalid_field("page-size"))?,
    };

    Ok((page, page_size))
}

/// Build paginated navigation links for the account list.
fn paginated_links(base_uri: &str, page: u32, page_size: u32, total_pages: u32) -> LinksPaginated {
    let link = |p: u32| format!("{base_uri}/cds-au/v1/energy/accounts?page={p}&page-size={page_size}");
    LinksPaginated {
        self_link: link(page),
        first: (total_pages > 0).then(|| link(1)),
        prev: (page > 1).then(|| link(page - 1)),
        next: (page < total_pages).then(|| link(page + 1)),
        last: (total_pages > 0).then(|| link(total_pages)),
    }
}

fn error_response(status: StatusCode, error: CdsError) -> Response {
    (status, Json(ErrorList::of(error))).into_response()
}
