//! Government-only surface: oversight listings, dashboard analytics,
//! subsidy programme management, and department administration.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use uuid::Uuid;

use greenlands_types::api::{
    AdminUpdateSubsidyRequest, AnalyticsResponse, BucketCount, Claims, CreateDepartmentRequest,
    CreateSubsidyRequest, UpdateDepartmentRequest, UserProfile,
};
use greenlands_types::models::{Department, Role, Subsidy, SubsidyStatus};

use crate::access::require_role;
use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;

pub async fn analytics(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Government)?;

    let db = state.clone();
    let response = blocking(move || {
        Ok(AnalyticsResponse {
            total_farmers: db.db.count_users_with_role(Role::Farmer)?,
            total_lands: db.db.count_lands()?,
            total_land_area: db.db.total_land_area()?,
            soil_distribution: buckets(db.db.soil_distribution()?),
            sustainability_scores: buckets(db.db.sustainability_distribution()?),
        })
    })
    .await?;

    Ok(Json(response))
}

pub async fn list_farmers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Government)?;

    let db = state.clone();
    let rows = blocking(move || db.db.list_farmers()).await?;

    let farmers = rows
        .into_iter()
        .map(|r| r.into_user().map(|u| UserProfile::from(&u)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(farmers))
}

pub async fn list_all_lands(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Government)?;

    let db = state.clone();
    let rows = blocking(move || db.db.list_all_lands()).await?;

    let lands = rows
        .into_iter()
        .map(|r| r.into_land())
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(lands))
}

// -- Subsidy programmes --

/// Government-created subsidies may target one farmer or stay open
/// (farmer = None).
pub async fn create_subsidy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateSubsidyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Government)?;

    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    if req.amount <= 0.0 {
        return Err(ApiError::Validation("Amount must be positive".into()));
    }
    if let Some(farmer_id) = req.farmer {
        let db = state.clone();
        let key = farmer_id.to_string();
        if blocking(move || db.db.get_user_by_id(&key)).await?.is_none() {
            return Err(ApiError::NotFound("Farmer"));
        }
    }

    let now = Utc::now();
    let subsidy = Subsidy {
        id: Uuid::new_v4(),
        farmer: req.farmer,
        name: req.name.trim().to_string(),
        description: req.description,
        amount: req.amount,
        status: req.status.unwrap_or(SubsidyStatus::Pending),
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

pub async fn update_subsidy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<AdminUpdateSubsidyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Government)?;

    let db = state.clone();
    let key = id.to_string();
    let mut subsidy = blocking(move || db.db.get_subsidy(&key))
        .await?
        .ok_or(ApiError::NotFound("Subsidy"))?
        .into_subsidy()?;

    if let Some(name) = req.name {
        subsidy.name = name;
    }
    if let Some(description) = req.description {
        subsidy.description = description;
    }
    if let Some(amount) = req.amount {
        subsidy.amount = amount;
    }
    if let Some(notes) = req.government_notes {
        subsidy.government_notes = Some(notes);
    }
    if let Some(status) = req.status {
        subsidy.status = status;
        if status == SubsidyStatus::Approved && subsidy.approval_date.is_none() {
            subsidy.approval_date = Some(Utc::now());
        }
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

// -- Departments --

pub async fn list_departments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Government)?;

    let db = state.clone();
    let rows = blocking(move || db.db.list_active_departments()).await?;

    let departments = rows
        .into_iter()
        .map(|r| r.into_department())
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(departments))
}

pub async fn create_department(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateDepartmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Government)?;

    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }

    let now = Utc::now();
    let department = Department {
        id: Uuid::new_v4(),
        name: req.name.trim().to_string(),
        description: req.description,
        head: req.head,
        budget: req.budget.unwrap_or(0.0),
        active: true,
        created_at: now,
        updated_at: now,
    };

    let db = state.clone();
    let department = blocking(move || {
        db.db.insert_department(&department)?;
        Ok(department)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(department)))
}

pub async fn update_department(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateDepartmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Government)?;

    let db = state.clone();
    let key = id.to_string();
    let mut department = blocking(move || db.db.get_department(&key))
        .await?
        .ok_or(ApiError::NotFound("Department"))?
        .into_department()?;

    if let Some(name) = req.name {
        department.name = name;
    }
    if let Some(description) = req.description {
        department.description = description;
    }
    if let Some(head) = req.head {
        department.head = Some(head);
    }
    if let Some(budget) = req.budget {
        department.budget = budget;
    }
    department.updated_at = Utc::now();

    let db = state.clone();
    let department = blocking(move || {
        db.db.update_department(&department)?;
        Ok(department)
    })
    .await?;

    Ok(Json(department))
}

/// Soft delete: the department row stays for historical references.
pub async fn delete_department(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Government)?;

    let db = state.clone();
    let key = id.to_string();
    let deactivated =
        blocking(move || db.db.deactivate_department(&key, &Utc::now().to_rfc3339())).await?;
    if !deactivated {
        return Err(ApiError::NotFound("Department"));
    }

    Ok(Json(serde_json::json!({ "message": "Department deactivated" })))
}

fn buckets(pairs: Vec<(String, u64)>) -> Vec<BucketCount> {
    pairs
        .into_iter()
        .map(|(label, count)| BucketCount { label, count })
        .collect()
}
