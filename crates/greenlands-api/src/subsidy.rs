use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use uuid::Uuid;

use greenlands_types::api::{
    ApplySubsidyRequest, Claims, SubsidyStatusRequest, UpdateSubsidyRequest,
};
use greenlands_types::models::{Role, Subsidy, SubsidyStatus};

use crate::access::{Action, ResourceKind, authorize, require_role};
use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;

pub async fn apply_for_subsidy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ApplySubsidyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Farmer)?;

    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    if req.description.trim().is_empty() {
        return Err(ApiError::Validation("Description is required".into()));
    }
    if req.amount <= 0.0 {
        return Err(ApiError::Validation("Amount must be positive".into()));
    }

    let now = Utc::now();
    let subsidy = Subsidy {
        id: Uuid::new_v4(),
        farmer: Some(claims.sub),
        name: req.name.trim().to_string(),
        description: req.description,
        amount: req.amount,
        status: SubsidyStatus::Pending,
        application_date: now,
        approval_date: None,
        government_notes: None,
        created_at: now,
        updated_at: now,
    };

    let db = state.clone();
    let subsidy = blocking(move || {
        db.db.insert_subsidy(&subsidy)?;
        Ok(subsidy)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(subsidy)))
}

pub async fn list_my_subsidies(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Farmer)?;

    let db = state.clone();
    let uid = claims.sub.to_string();
    let rows = blocking(move || db.db.list_subsidies_by_farmer(&uid)).await?;

    let subsidies = rows
        .into_iter()
        .map(|r| r.into_subsidy())
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(subsidies))
}

pub async fn get_subsidy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let subsidy = load_subsidy(&state, id).await?;
    authorize(&claims, ResourceKind::Subsidy, Action::Read, subsidy.farmer)?;

    Ok(Json(subsidy))
}

/// Farmers may amend their own pending applications; a decided application
/// is terminal.
pub async fn update_subsidy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSubsidyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut subsidy = load_subsidy(&state, id).await?;
    authorize(&claims, ResourceKind::Subsidy, Action::Mutate, subsidy.farmer)?;

    if claims.role == Role::Farmer && subsidy.status != SubsidyStatus::Pending {
        return Err(ApiError::Validation(
            "Only pending applications can be updated".into(),
        ));
    }

    if let Some(name) = req.name {
        subsidy.name = name;
    }
    if let Some(description) = req.description {
        subsidy.description = description;
    }
    if let Some(amount) = req.amount {
        subsidy.amount = amount;
    }
    subsidy.updated_at = Utc::now();

    let db = state.clone();
    let subsidy = blocking(move || {
        db.db.update_subsidy(&subsidy)?;
        Ok(subsidy)
    })
    .await?;

    Ok(Json(subsidy))
}

pub async fn delete_subsidy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let subsidy = load_subsidy(&state, id).await?;
    authorize(&claims, ResourceKind::Subsidy, Action::Mutate, subsidy.farmer)?;

    let db = state.clone();
    let key = id.to_string();
    blocking(move || db.db.delete_subsidy(&key)).await?;

    Ok(Json(serde_json::json!({ "message": "Subsidy application removed" })))
}

/// Government view over every application.
pub async fn list_all_subsidies(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Government)?;

    let db = state.clone();
    let rows = blocking(move || db.db.list_all_subsidies()).await?;

    let subsidies = rows
        .into_iter()
        .map(|r| r.into_subsidy())
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(subsidies))
}

/// Approve/reject. The transition is one conditional UPDATE in storage, so
/// two concurrent decisions cannot interleave and the approval date is
/// stamped exactly once.
pub async fn update_subsidy_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubsidyStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Government)?;

    // Resolve before deciding, so missing ids report not-found
    let subsidy = load_subsidy(&state, id).await?;
    authorize(&claims, ResourceKind::Subsidy, Action::Mutate, subsidy.farmer)?;

    let db = state.clone();
    let key = id.to_string();
    blocking(move || {
        db.db.set_subsidy_status(
            &key,
            req.status,
            req.government_notes.as_deref(),
            &Utc::now().to_rfc3339(),
        )
    })
    .await?;

    let updated = load_subsidy(&state, id).await?;
    Ok(Json(updated))
}

async fn load_subsidy(state: &AppState, id: Uuid) -> Result<Subsidy, ApiError> {
    let db = state.clone();
    let key = id.to_string();
    blocking(move || db.db.get_subsidy(&key))
        .await?
        .ok_or(ApiError::NotFound("Subsidy"))?
        .into_subsidy()
        .map_err(ApiError::from)
}
