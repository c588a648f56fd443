use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use uuid::Uuid;

use greenlands_types::api::{Claims, CreatePolicyRequest, UpdatePolicyRequest};
use greenlands_types::models::{Policy, PolicyStatus, Role};

use crate::access::require_role;
use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;

pub async fn create_policy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePolicyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Government)?;

    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".into()));
    }
    if req.description.trim().is_empty() {
        return Err(ApiError::Validation("Description is required".into()));
    }

    let now = Utc::now();
    let policy = Policy {
        id: Uuid::new_v4(),
        title: req.title.trim().to_string(),
        description: req.description,
        department: req.department,
        status: req.status.unwrap_or(PolicyStatus::Draft),
        effective_date: req.effective_date,
        expiry_date: req.expiry_date,
        budget: req.budget.unwrap_or(0.0),
        beneficiaries: req.beneficiaries.unwrap_or(0),
        created_by: claims.sub,
        created_at: now,
        updated_at: now,
    };

    let db = state.clone();
    let policy = blocking(move || {
        db.db.insert_policy(&policy)?;
        Ok(policy)
    })
    .await?;
    state.notifier.policy_changed(policy.id, &policy.title);

    Ok((StatusCode::CREATED, Json(policy)))
}

/// Policies are public to every authenticated user.
pub async fn list_policies(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = blocking(move || db.db.list_policies()).await?;

    let policies = rows
        .into_iter()
        .map(|r| r.into_policy())
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(policies))
}

pub async fn update_policy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePolicyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut policy = load_policy(&state, id).await?;
    require_role(&claims, Role::Government)?;

    if let Some(title) = req.title {
        policy.title = title;
    }
    if let Some(description) = req.description {
        policy.description = description;
    }
    if let Some(department) = req.department {
        policy.department = department;
    }
    if let Some(status) = req.status {
        policy.status = status;
    }
    if let Some(effective_date) = req.effective_date {
        policy.effective_date = effective_date;
    }
    if let Some(expiry_date) = req.expiry_date {
        policy.expiry_date = Some(expiry_date);
    }
    if let Some(budget) = req.budget {
        policy.budget = budget;
    }
    if let Some(beneficiaries) = req.beneficiaries {
        policy.beneficiaries = beneficiaries;
    }
    policy.updated_at = Utc::now();

    let db = state.clone();
    let policy = blocking(move || {
        db.db.update_policy(&policy)?;
        Ok(policy)
    })
    .await?;
    state.notifier.policy_changed(policy.id, &policy.title);

    Ok(Json(policy))
}

pub async fn delete_policy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let _policy = load_policy(&state, id).await?;
    require_role(&claims, Role::Government)?;

    let db = state.clone();
    let key = id.to_string();
    blocking(move || db.db.delete_policy(&key)).await?;

    Ok(Json(serde_json::json!({ "message": "Policy deleted" })))
}

/// Announce a policy through the configured notification sink. With the
/// default null-object sink this acknowledges and delivers nothing.
pub async fn notify_policy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let policy = load_policy(&state, id).await?;
    require_role(&claims, Role::Government)?;

    state.notifier.policy_changed(policy.id, &policy.title);

    Ok(Json(serde_json::json!({ "message": "Notification sent" })))
}

async fn load_policy(state: &AppState, id: Uuid) -> Result<Policy, ApiError> {
    let db = state.clone();
    let key = id.to_string();
    blocking(move || db.db.get_policy(&key))
        .await?
        .ok_or(ApiError::NotFound("Policy"))?
        .into_policy()
        .map_err(ApiError::from)
}
