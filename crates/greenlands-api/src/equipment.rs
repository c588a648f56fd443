use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use uuid::Uuid;

use greenlands_types::api::{
    AddMaintenanceRequest, Claims, CreateEquipmentRequest, UpdateEquipmentRequest,
    UsageHoursRequest,
};
use greenlands_types::models::{Equipment, EquipmentStatus, MaintenanceRecord, Role};

use crate::access::{Action, ResourceKind, authorize, require_role};
use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;

pub async fn add_equipment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateEquipmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Farmer)?;

    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    if req.kind.trim().is_empty() {
        return Err(ApiError::Validation("Type is required".into()));
    }

    let now = Utc::now();
    let equipment = Equipment {
        id: Uuid::new_v4(),
        farmer: claims.sub,
        name: req.name.trim().to_string(),
        kind: req.kind.trim().to_string(),
        manufacturer: req.manufacturer,
        model: req.model,
        purchase_date: req.purchase_date,
        purchase_price: req.purchase_price,
        status: EquipmentStatus::Active,
        maintenance_schedule: vec![],
        usage_hours: 0.0,
        last_maintenance_date: None,
        created_at: now,
        updated_at: now,
    };

    let db = state.clone();
    let equipment = blocking(move || {
        db.db.insert_equipment(&equipment)?;
        Ok(equipment)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(equipment)))
}

pub async fn list_my_equipment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Farmer)?;

    let db = state.clone();
    let uid = claims.sub.to_string();
    let rows = blocking(move || db.db.list_equipment_by_farmer(&uid)).await?;

    let equipment = rows
        .into_iter()
        .map(|r| r.into_equipment())
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(equipment))
}

pub async fn get_equipment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let equipment = load_equipment(&state, id).await?;
    authorize(
        &claims,
        ResourceKind::Equipment,
        Action::Read,
        Some(equipment.farmer),
    )?;

    Ok(Json(equipment))
}

pub async fn update_equipment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEquipmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut equipment = load_equipment(&state, id).await?;
    authorize(
        &claims,
        ResourceKind::Equipment,
        Action::Mutate,
        Some(equipment.farmer),
    )?;

    if let Some(name) = req.name {
        equipment.name = name;
    }
    if let Some(kind) = req.kind {
        equipment.kind = kind;
    }
    if let Some(manufacturer) = req.manufacturer {
        equipment.manufacturer = Some(manufacturer);
    }
    if let Some(model) = req.model {
        equipment.model = Some(model);
    }
    if let Some(purchase_date) = req.purchase_date {
        equipment.purchase_date = Some(purchase_date);
    }
    if let Some(purchase_price) = req.purchase_price {
        equipment.purchase_price = Some(purchase_price);
    }
    if let Some(status) = req.status {
        equipment.status = status;
    }
    equipment.updated_at = Utc::now();

    let db = state.clone();
    let equipment = blocking(move || {
        db.db.update_equipment(&equipment)?;
        Ok(equipment)
    })
    .await?;

    Ok(Json(equipment))
}

pub async fn delete_equipment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let equipment = load_equipment(&state, id).await?;
    authorize(
        &claims,
        ResourceKind::Equipment,
        Action::Mutate,
        Some(equipment.farmer),
    )?;

    let db = state.clone();
    let key = id.to_string();
    blocking(move || db.db.delete_equipment(&key)).await?;

    Ok(Json(serde_json::json!({ "message": "Equipment removed" })))
}

pub async fn add_maintenance_record(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMaintenanceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut equipment = load_equipment(&state, id).await?;
    authorize(
        &claims,
        ResourceKind::Equipment,
        Action::Mutate,
        Some(equipment.farmer),
    )?;

    equipment.maintenance_schedule.push(MaintenanceRecord {
        date: req.date,
        description: req.description,
        cost: req.cost,
    });
    equipment.last_maintenance_date = Some(req.date);
    equipment.updated_at = Utc::now();

    let db = state.clone();
    let equipment = blocking(move || {
        db.db.update_equipment(&equipment)?;
        Ok(equipment)
    })
    .await?;

    Ok(Json(equipment))
}

pub async fn update_usage_hours(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UsageHoursRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let equipment = load_equipment(&state, id).await?;
    authorize(
        &claims,
        ResourceKind::Equipment,
        Action::Mutate,
        Some(equipment.farmer),
    )?;

    if req.hours < 0.0 {
        return Err(ApiError::Validation("Hours cannot be negative".into()));
    }

    // Single-field UPDATE so concurrent submissions cannot lose each other's
    // unrelated edits
    let db = state.clone();
    let key = id.to_string();
    blocking(move || db.db.set_equipment_usage_hours(&key, req.hours, &Utc::now().to_rfc3339()))
        .await?;

    let updated = load_equipment(&state, id).await?;
    Ok(Json(updated))
}

async fn load_equipment(state: &AppState, id: Uuid) -> Result<Equipment, ApiError> {
    let db = state.clone();
    let key = id.to_string();
    blocking(move || db.db.get_equipment(&key))
        .await?
        .ok_or(ApiError::NotFound("Equipment"))?
        .into_equipment()
        .map_err(ApiError::from)
}
