use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use uuid::Uuid;

use greenlands_types::api::{
    Claims, ContactInfo, CreateLandRequest, LandReport, LandReportSummary, UpdateLandRequest,
};
use greenlands_types::models::{
    Crop, FertilizerUsage, Land, LandLocation, Role, WaterUsage,
};

use crate::access::{Action, ResourceKind, authorize, require_role};
use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;

pub async fn create_land(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateLandRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Farmer)?;

    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    if req.size <= 0.0 {
        return Err(ApiError::Validation("Size must be positive".into()));
    }

    let now = Utc::now();
    let land = Land {
        id: Uuid::new_v4(),
        farmer: claims.sub,
        name: req.name.trim().to_string(),
        size: req.size,
        location: LandLocation {
            address: req.address,
            longitude: req.longitude,
            latitude: req.latitude,
        },
        soil_type: req.soil_type,
        crops: vec![],
        water_usage: vec![],
        fertilizer_usage: vec![],
        pesticide_usage: vec![],
        sustainability_score: 0.0,
        certifications: vec![],
        created_at: now,
        updated_at: now,
    };

    let db = state.clone();
    let land = blocking(move || {
        db.db.insert_land(&land)?;
        Ok(land)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(land)))
}

pub async fn list_my_lands(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&claims, Role::Farmer)?;

    let db = state.clone();
    let uid = claims.sub.to_string();
    let rows = blocking(move || db.db.list_lands_by_farmer(&uid)).await?;

    let lands = rows
        .into_iter()
        .map(|r| r.into_land())
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(lands))
}

pub async fn get_land(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let land = load_land(&state, id).await?;
    authorize(&claims, ResourceKind::Land, Action::Read, Some(land.farmer))?;

    Ok(Json(land))
}

pub async fn update_land(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateLandRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut land = load_land(&state, id).await?;
    authorize(&claims, ResourceKind::Land, Action::Mutate, Some(land.farmer))?;

    if let Some(name) = req.name {
        land.name = name;
    }
    if let Some(size) = req.size {
        land.size = size;
    }
    if let Some(soil_type) = req.soil_type {
        land.soil_type = soil_type;
    }
    if let Some(address) = req.address {
        land.location.address = Some(address);
    }
    if let Some(longitude) = req.longitude {
        land.location.longitude = Some(longitude);
    }
    if let Some(latitude) = req.latitude {
        land.location.latitude = Some(latitude);
    }
    if let Some(score) = req.sustainability_score {
        if !(0.0..=100.0).contains(&score) {
            return Err(ApiError::Validation(
                "Sustainability score must be between 0 and 100".into(),
            ));
        }
        land.sustainability_score = score;
    }
    land.updated_at = Utc::now();

    let db = state.clone();
    let land = blocking(move || {
        db.db.update_land(&land)?;
        Ok(land)
    })
    .await?;

    Ok(Json(land))
}

pub async fn delete_land(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let land = load_land(&state, id).await?;
    authorize(&claims, ResourceKind::Land, Action::Mutate, Some(land.farmer))?;

    let db = state.clone();
    let key = id.to_string();
    blocking(move || db.db.delete_land(&key)).await?;

    Ok(Json(serde_json::json!({ "message": "Land removed" })))
}

pub async fn add_crop(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(crop): Json<Crop>,
) -> Result<impl IntoResponse, ApiError> {
    let mut land = load_land(&state, id).await?;
    authorize(&claims, ResourceKind::Land, Action::Mutate, Some(land.farmer))?;

    land.crops.push(crop);
    land.updated_at = Utc::now();

    let db = state.clone();
    let land = blocking(move || {
        db.db.update_land(&land)?;
        Ok(land)
    })
    .await?;

    Ok(Json(land))
}

pub async fn add_water_usage(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(record): Json<WaterUsage>,
) -> Result<impl IntoResponse, ApiError> {
    let mut land = load_land(&state, id).await?;
    authorize(&claims, ResourceKind::Land, Action::Mutate, Some(land.farmer))?;

    land.water_usage.push(record);
    land.updated_at = Utc::now();

    let db = state.clone();
    let land = blocking(move || {
        db.db.update_land(&land)?;
        Ok(land)
    })
    .await?;

    Ok(Json(land))
}

pub async fn add_fertilizer_usage(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(record): Json<FertilizerUsage>,
) -> Result<impl IntoResponse, ApiError> {
    let mut land = load_land(&state, id).await?;
    authorize(&claims, ResourceKind::Land, Action::Mutate, Some(land.farmer))?;

    land.fertilizer_usage.push(record);
    land.updated_at = Utc::now();

    let db = state.clone();
    let land = blocking(move || {
        db.db.update_land(&land)?;
        Ok(land)
    })
    .await?;

    Ok(Json(land))
}

/// Usage report for one parcel: owner or government oversight.
pub async fn land_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let land = load_land(&state, id).await?;
    authorize(&claims, ResourceKind::Land, Action::Read, Some(land.farmer))?;

    let db = state.clone();
    let fid = land.farmer.to_string();
    let land_id = land.id;
    let farmer = blocking(move || {
        db.db
            .get_user_by_id(&fid)?
            .ok_or_else(|| anyhow::anyhow!("land {} references missing farmer", land_id))?
            .into_user()
    })
    .await?;

    let report = LandReport {
        land: LandReportSummary {
            name: land.name.clone(),
            size: land.size,
            soil_type: land.soil_type,
            sustainability_score: land.sustainability_score,
            address: land.location.address.clone(),
            certifications: land.certifications.clone(),
        },
        farmer: ContactInfo {
            name: farmer.name,
            email: farmer.email,
        },
        total_water_used: land.water_usage.iter().map(|w| w.amount).sum(),
        total_fertilizer_used: land.fertilizer_usage.iter().map(|f| f.amount).sum(),
        total_pesticide_used: land
            .pesticide_usage
            .iter()
            .filter_map(|p| p.amount)
            .sum(),
        crops: land.crops,
        water_usage: land.water_usage,
        fertilizer_usage: land.fertilizer_usage,
        pesticide_usage: land.pesticide_usage,
        report_date: Utc::now(),
    };

    Ok(Json(report))
}

/// Resolve first so callers get not-found before any ownership answer.
async fn load_land(state: &AppState, id: Uuid) -> Result<Land, ApiError> {
    let db = state.clone();
    let key = id.to_string();
    blocking(move || db.db.get_land(&key))
        .await?
        .ok_or(ApiError::NotFound("Land"))?
        .into_land()
        .map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use greenlands_db::Database;
    use greenlands_types::api::UpdateLandRequest;
    use greenlands_types::models::{SoilType, User};

    use crate::auth::AppStateInner;
    use crate::notify::NoopNotifier;

    fn test_state() -> AppState {
        Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            jwt_secret: "test-secret".into(),
            notifier: Arc::new(NoopNotifier),
        })
    }

    fn seed_user(state: &AppState, name: &str, role: Role) -> Claims {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role,
            location: None,
            farm_size: Some(10.0),
            department: None,
            phone: None,
            active: true,
            created_at: now,
            updated_at: now,
        };
        state.db.create_user(&user, "not-a-real-hash").unwrap();
        Claims {
            sub: user.id,
            name: user.name,
            role,
            exp: 0,
        }
    }

    async fn seed_land(state: &AppState, owner: &Claims) -> Uuid {
        let req = CreateLandRequest {
            name: "North field".into(),
            size: 12.0,
            soil_type: SoilType::Loamy,
            address: None,
            longitude: None,
            latitude: None,
        };
        create_land(State(state.clone()), Extension(owner.clone()), Json(req))
            .await
            .map_err(|e| e.to_string())
            .expect("create_land failed");
        let rows = state
            .db
            .list_lands_by_farmer(&owner.sub.to_string())
            .unwrap();
        rows[0].id.parse().unwrap()
    }

    fn empty_update() -> UpdateLandRequest {
        UpdateLandRequest {
            name: Some("Renamed".into()),
            size: None,
            soil_type: None,
            address: None,
            longitude: None,
            latitude: None,
            sustainability_score: None,
        }
    }

    #[tokio::test]
    async fn missing_land_is_not_found_before_ownership() {
        let state = test_state();
        let stranger = seed_user(&state, "Ines", Role::Farmer);

        // Unknown id: the caller learns "not found", never "forbidden"
        let result = update_land(
            State(state.clone()),
            Extension(stranger),
            Path(Uuid::new_v4()),
            Json(empty_update()),
        )
        .await;
        assert!(matches!(result, Err(ApiError::NotFound("Land"))));
    }

    #[tokio::test]
    async fn existing_land_is_forbidden_for_non_owners() {
        let state = test_state();
        let owner = seed_user(&state, "Owner", Role::Farmer);
        let stranger = seed_user(&state, "Ines", Role::Farmer);
        let land_id = seed_land(&state, &owner).await;

        let result = update_land(
            State(state.clone()),
            Extension(stranger),
            Path(land_id),
            Json(empty_update()),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Forbidden)));

        // The owner's update goes through
        let result = update_land(
            State(state.clone()),
            Extension(owner),
            Path(land_id),
            Json(empty_update()),
        )
        .await;
        assert!(result.is_ok());
    }
}
