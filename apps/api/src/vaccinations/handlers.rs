use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::vaccination::{VaccinationEvent, VaccineType};
use crate::schedule::due::{parse_dose_date, today};
use crate::state::AppState;
use crate::vaccinations::store::{self, NewVaccination};

#[derive(Debug, Deserialize)]
pub struct CreateVaccinationRequest {
    pub horse_id: Uuid,
    pub vaccine_type: String,
    pub date: String,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DoneTodayRequest {
    pub vaccine_type: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVaccinationRequest {
    pub date: String,
}

/// POST /api/v1/vaccinations
pub async fn handle_create_vaccination(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateVaccinationRequest>,
) -> Result<(StatusCode, Json<VaccinationEvent>), AppError> {
    let vaccine_type = parse_vaccine_type(&req.vaccine_type)?;
    let date = require_date(&req.date)?;
    let note = req.note.as_deref().map(str::trim).filter(|n| !n.is_empty());

    let event = log_dose(&state, req.horse_id, vaccine_type, date, note).await?;
    info!(user_id = %user.id, "Vaccination {} recorded", event.id);
    Ok((StatusCode::CREATED, Json(event)))
}

/// POST /api/v1/horses/:id/vaccinations/today
pub async fn handle_done_today(
    user: AuthUser,
    State(state): State<AppState>,
    Path(horse_id): Path<Uuid>,
    Json(req): Json<DoneTodayRequest>,
) -> Result<(StatusCode, Json<VaccinationEvent>), AppError> {
    let vaccine_type = parse_vaccine_type(&req.vaccine_type)?;
    let event = log_dose(&state, horse_id, vaccine_type, today(), None).await?;
    info!(user_id = %user.id, "Vaccination {} recorded as done today", event.id);
    Ok((StatusCode::CREATED, Json(event)))
}

/// PATCH /api/v1/vaccinations/:id
pub async fn handle_update_vaccination(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateVaccinationRequest>,
) -> Result<Json<VaccinationEvent>, AppError> {
    let date = require_date(&req.date)?;
    let event = store::update_vaccination_date(&state.db, id, date)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vaccination {id} not found")))?;
    info!(user_id = %user.id, "Vaccination {id} moved to {date}");
    Ok(Json(event))
}

/// DELETE /api/v1/vaccinations/:id
pub async fn handle_delete_vaccination(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !store::delete_vaccination(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Vaccination {id} not found")));
    }
    info!(user_id = %user.id, "Vaccination {id} deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn log_dose(
    state: &AppState,
    horse_id: Uuid,
    vaccine_type: VaccineType,
    date: NaiveDate,
    note: Option<&str>,
) -> Result<VaccinationEvent, AppError> {
    if !store::horse_exists(&state.db, horse_id).await? {
        return Err(AppError::NotFound(format!("Horse {horse_id} not found")));
    }
    Ok(store::insert_vaccination(
        &state.db,
        NewVaccination {
            horse_id,
            vaccine_type,
            date,
            note,
        },
    )
    .await?)
}

fn parse_vaccine_type(raw: &str) -> Result<VaccineType, AppError> {
    raw.parse().map_err(AppError::Validation)
}

/// Explicit dose writes reject bad dates instead of silently dropping them.
fn require_date(raw: &str) -> Result<NaiveDate, AppError> {
    parse_dose_date(raw)
        .ok_or_else(|| AppError::Validation(format!("Invalid date '{raw}', expected YYYY-MM-DD")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_date() {
        assert_eq!(
            require_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(matches!(require_date("2023-02-29"), Err(AppError::Validation(_))));
        assert!(matches!(require_date(""), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_vaccine_type_maps_to_validation() {
        assert_eq!(parse_vaccine_type("RHINO").unwrap(), VaccineType::Rhino);
        assert!(matches!(parse_vaccine_type("BCG"), Err(AppError::Validation(_))));
    }
}
