//! Circulation endpoints: borrowed listings and loan renewal

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{copy::CopyDetails, user::CAN_MARK_RETURNED},
    services::circulation::{RenewalOutcome, ALL_BORROWED_ROUTE},
};

use super::{AuthenticatedUser, PaginatedResponse};

#[derive(Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Renewal form payload: the copy and the suggested new due date
#[derive(Serialize, ToSchema)]
pub struct RenewalFormResponse {
    pub copy: CopyDetails,
    /// Name of the date field being confirmed
    pub field: String,
    /// Suggested renewal date (today + the configured proposal offset)
    pub renewal_date: NaiveDate,
}

/// Renewal submission
#[derive(Deserialize, ToSchema)]
pub struct RenewRequest {
    /// Proposed new due date; omit to receive the default proposal
    pub renewal_date: Option<NaiveDate>,
}

/// Successful renewal
#[derive(Serialize, ToSchema)]
pub struct RenewedResponse {
    pub status: String,
    pub due_back: NaiveDate,
    /// Where the caller should navigate next
    pub redirect: String,
}

/// Rejected renewal: re-present the form with the offending value
#[derive(Serialize, ToSchema)]
pub struct RenewalRejection {
    pub field: String,
    /// The submitted value that failed validation
    pub value: NaiveDate,
    pub error_message: String,
    /// Fresh default proposal for the re-displayed field
    pub renewal_date: NaiveDate,
}

/// Copies on loan to the authenticated user, ordered by due date
#[utoipa::path(
    get,
    path = "/me/loans",
    tag = "circulation",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (default: 10)")
    ),
    responses(
        (status = 200, description = "The caller's borrowed copies", body = PaginatedResponse<CopyDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(params): Query<PageParams>,
) -> AppResult<Json<PaginatedResponse<CopyDetails>>> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(state.config.catalog.page_size);

    let (items, total) = state
        .services
        .circulation
        .borrowed_by_user(claims.user_id, page, per_page)
        .await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page,
        per_page,
    }))
}

/// All copies currently on loan (librarian only)
#[utoipa::path(
    get,
    path = "/loans/borrowed",
    tag = "circulation",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (default: 10)")
    ),
    responses(
        (status = 200, description = "All borrowed copies", body = PaginatedResponse<CopyDetails>),
        (status = 403, description = "Missing capability")
    )
)]
pub async fn all_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(params): Query<PageParams>,
) -> AppResult<Json<PaginatedResponse<CopyDetails>>> {
    claims.require_capability(CAN_MARK_RETURNED)?;

    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(state.config.catalog.page_size);

    let (items, total) = state
        .services
        .circulation
        .all_borrowed(page, per_page)
        .await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page,
        per_page,
    }))
}

/// Display the renewal form for a copy (librarian only)
#[utoipa::path(
    get,
    path = "/copies/{id}/renewal",
    tag = "circulation",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy details and suggested renewal date", body = RenewalFormResponse),
        (status = 403, description = "Missing capability"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renewal_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(copy_id): Path<Uuid>,
) -> AppResult<Json<RenewalFormResponse>> {
    claims.require_capability(CAN_MARK_RETURNED)?;

    let (copy, renewal_date) = state.services.circulation.renewal_form(copy_id).await?;

    Ok(Json(RenewalFormResponse {
        copy,
        field: "renewal_date".to_string(),
        renewal_date,
    }))
}

/// Renew a loan by setting a new due date (librarian only)
#[utoipa::path(
    post,
    path = "/copies/{id}/renewal",
    tag = "circulation",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body = RenewRequest,
    responses(
        (status = 200, description = "Loan renewed", body = RenewedResponse),
        (status = 400, description = "Date outside the renewal window", body = RenewalRejection),
        (status = 403, description = "Missing capability"),
        (status = 404, description = "Copy not found"),
        (status = 422, description = "Copy is not on loan")
    )
)]
pub async fn renew(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(copy_id): Path<Uuid>,
    Json(request): Json<RenewRequest>,
) -> AppResult<Response> {
    claims.require_capability(CAN_MARK_RETURNED)?;

    let outcome = state
        .services
        .circulation
        .renew(copy_id, request.renewal_date)
        .await?;

    let response = match outcome {
        RenewalOutcome::Proposal { renewal_date } => {
            let (copy, _) = state.services.circulation.renewal_form(copy_id).await?;
            Json(RenewalFormResponse {
                copy,
                field: "renewal_date".to_string(),
                renewal_date,
            })
            .into_response()
        }
        RenewalOutcome::Renewed { due_back } => Json(RenewedResponse {
            status: "renewed".to_string(),
            due_back,
            redirect: ALL_BORROWED_ROUTE.to_string(),
        })
        .into_response(),
        RenewalOutcome::Rejected {
            value,
            error_message,
            renewal_date,
        } => (
            StatusCode::BAD_REQUEST,
            Json(RenewalRejection {
                field: "renewal_date".to_string(),
                value,
                error_message,
                renewal_date,
            }),
        )
            .into_response(),
    };

    Ok(response)
}
