use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use uuid::Uuid;

use greenlands_types::api::{Claims, CreateListingRequest, ListingStatusRequest};
use greenlands_types::models::{ListingStatus, MarketplaceItem};

use crate::access::{Action, ResourceKind, authorize};
use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;

/// Any authenticated user (farmer or government) may post a listing.
pub async fn create_listing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateListingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".into()));
    }
    if req.description.trim().is_empty() {
        return Err(ApiError::Validation("Description is required".into()));
    }
    if req.price < 0.0 {
        return Err(ApiError::Validation("Price cannot be negative".into()));
    }

    let item = MarketplaceItem {
        id: Uuid::new_v4(),
        title: req.title.trim().to_string(),
        description: req.description,
        kind: req.kind,
        price: req.price,
        unit: req.unit,
        images: req.images,
        posted_by: claims.sub,
        status: ListingStatus::Available,
        created_at: Utc::now(),
    };

    let db = state.clone();
    let item = blocking(move || {
        db.db.insert_listing(&item)?;
        Ok(item)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Listings are public reads for authenticated users.
pub async fn list_listings(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = blocking(move || db.db.list_listings()).await?;

    let items = rows
        .into_iter()
        .map(|r| r.into_item())
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(items))
}

/// Only the poster may flip a listing to sold/leased. One atomic UPDATE.
pub async fn update_listing_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<ListingStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item = load_listing(&state, id).await?;
    authorize(
        &claims,
        ResourceKind::Listing,
        Action::Mutate,
        Some(item.posted_by),
    )?;

    let db = state.clone();
    let key = id.to_string();
    blocking(move || db.db.set_listing_status(&key, req.status)).await?;

    let updated = load_listing(&state, id).await?;
    Ok(Json(updated))
}

pub async fn delete_listing(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = load_listing(&state, id).await?;
    authorize(
        &claims,
        ResourceKind::Listing,
        Action::Mutate,
        Some(item.posted_by),
    )?;

    let db = state.clone();
    let key = id.to_string();
    blocking(move || db.db.delete_listing(&key)).await?;

    Ok(Json(serde_json::json!({ "message": "Item deleted" })))
}

async fn load_listing(state: &AppState, id: Uuid) -> Result<MarketplaceItem, ApiError> {
    let db = state.clone();
    let key = id.to_string();
    blocking(move || db.db.get_listing(&key))
        .await?
        .ok_or(ApiError::NotFound("Item"))?
        .into_item()
        .map_err(ApiError::from)
}
