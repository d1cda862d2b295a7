//! Promotion handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::error;

use super::dto::{PromotionDto, PromotionQuery};
use crate::domain::PromotionRepositoryInterface;
use crate::interfaces::http::common::{api_error, internal_error, ApiError, ApiResponse};

#[derive(Clone)]
pub struct PromotionState {
    pub promotions: Arc<dyn PromotionRepositoryInterface>,
}

#[utoipa::path(
    get,
    path = "/api/v1/promotions/{code}",
    tag = "Promotions",
    params(
        ("code" = String, Path, description = "Promotion code, case-insensitive"),
        PromotionQuery
    ),
    responses(
        (status = 200, description = "Promotion found", body = ApiResponse<PromotionDto>),
        (status = 400, description = "Negative amount"),
        (status = 404, description = "Unknown promotion code")
    )
)]
pub async fn get_promotion(
    State(state): State<PromotionState>,
    Path(code): Path<String>,
    Query(query): Query<PromotionQuery>,
) -> Result<Json<ApiResponse<PromotionDto>>, ApiError> {
    if query.amount.is_some_and(|amount| amount < Decimal::ZERO) {
        return Err(api_error(StatusCode::BAD_REQUEST, "amount must not be negative"));
    }

    let promotion = state
        .promotions
        .find_by_code(&code)
        .await
        .map_err(|e| {
            error!(error = %e, "Promotion lookup failed");
            internal_error()
        })?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Promotion not found"))?;

    Ok(Json(ApiResponse::success(PromotionDto::new(
        promotion,
        Utc::now(),
        query.amount,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/promotions",
    tag = "Promotions",
    responses(
        (status = 200, description = "All promotions", body = ApiResponse<Vec<PromotionDto>>),
        (status = 303, description = "Not signed in, or not an admin")
    )
)]
pub async fn list_promotions(
    State(state): State<PromotionState>,
) -> Result<Json<ApiResponse<Vec<PromotionDto>>>, ApiError> {
    let promotions = state.promotions.list().await.map_err(|e| {
        error!(error = %e, "Failed to list promotions");
        internal_error()
    })?;

    let now = Utc::now();
    let items = promotions
        .into_iter()
        .map(|promotion| PromotionDto::new(promotion, now, None))
        .collect();

    Ok(Json(ApiResponse::success(items)))
}
