use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::horses::display::{age_label, display_name};
use crate::horses::search::matches_query;
use crate::horses::store::{self, HorseFields};
use crate::models::horse::HorseRow;
use crate::models::vaccination::{VaccinationEvent, VaccineType};
use crate::schedule::due::{parse_dose_date, today};
use crate::schedule::grouping::{group_by_bucket, BucketCounts, Buckets};
use crate::schedule::tracks::{dose_history, DoseEntry, HorseStatus};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BirthMode {
    Full,
    Year,
}

#[derive(Debug, Deserialize)]
pub struct InitialDose {
    pub vaccine_type: String,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateHorseRequest {
    pub name: String,
    pub affixe: String,
    pub sire: Option<String>,
    pub dam: Option<String>,
    pub dam_sire: Option<String>,
    pub birth_mode: Option<BirthMode>,
    pub birthdate: Option<NaiveDate>,
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub vaccinations: Vec<InitialDose>,
}

#[derive(Debug, Serialize)]
pub struct CreateHorseResponse {
    pub horse_id: Uuid,
}

/// Partial update: absent fields keep their value, blank optional strings clear it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateHorseRequest {
    pub name: Option<String>,
    pub affixe: Option<String>,
    pub sire: Option<String>,
    pub dam: Option<String>,
    pub dam_sire: Option<String>,
    pub birth_mode: Option<BirthMode>,
    pub birthdate: Option<NaiveDate>,
    pub birth_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct HorseListQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HorseCard {
    pub id: Uuid,
    pub display_name: String,
    pub age_label: String,
    #[serde(flatten)]
    pub status: HorseStatus,
}

#[derive(Debug, Serialize)]
pub struct HorseListResponse {
    pub today: NaiveDate,
    pub counts: BucketCounts,
    #[serde(flatten)]
    pub buckets: Buckets<HorseCard>,
}

#[derive(Debug, Serialize)]
pub struct DoseHistoryView {
    pub influenza: Vec<DoseEntry>,
    pub rhino: Vec<DoseEntry>,
}

#[derive(Debug, Serialize)]
pub struct HorseDetailResponse {
    pub today: NaiveDate,
    pub horse: HorseRow,
    pub display_name: String,
    pub age_label: String,
    pub status: HorseStatus,
    pub history: DoseHistoryView,
}

/// GET /api/v1/horses
pub async fn handle_list_horses(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<HorseListQuery>,
) -> Result<Json<HorseListResponse>, AppError> {
    let today = today();
    let horses = store::list_horses(&state.db).await?;
    let ids: Vec<Uuid> = horses.iter().map(|h| h.id).collect();
    let mut events = store::events_by_horse(store::list_vaccinations(&state.db, &ids).await?);

    let query = params.q.unwrap_or_default();
    let cards: Vec<HorseCard> = horses
        .into_iter()
        .map(|horse| {
            let horse_events = events.remove(&horse.id).unwrap_or_default();
            horse_card(&horse, &horse_events, today)
        })
        .filter(|card| matches_query(&card.display_name, &query))
        .collect();

    let buckets = group_by_bucket(cards, |card| &card.status);
    Ok(Json(HorseListResponse {
        today,
        counts: buckets.counts(),
        buckets,
    }))
}

/// GET /api/v1/horses/:id
pub async fn handle_get_horse(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HorseDetailResponse>, AppError> {
    let horse = store::get_horse(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Horse {id} not found")))?;
    let events = store::list_vaccinations(&state.db, &[id]).await?;
    Ok(Json(horse_detail(horse, &events, today())))
}

/// POST /api/v1/horses
pub async fn handle_create_horse(
    user: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateHorseRequest>,
) -> Result<(StatusCode, Json<CreateHorseResponse>), AppError> {
    let (birthdate, birth_year) = birth_fields(req.birth_mode, req.birthdate, req.birth_year);
    let fields = HorseFields {
        name: required(&req.name, "name")?,
        affixe: required(&req.affixe, "affixe")?,
        sire: clean_optional(req.sire),
        dam: clean_optional(req.dam),
        dam_sire: clean_optional(req.dam_sire),
        birthdate,
        birth_year,
    };
    let doses = initial_doses(&req.vaccinations);

    let horse_id = store::insert_horse(&state.db, &fields, &doses).await?;
    info!(user_id = %user.id, "Horse {horse_id} created");
    Ok((StatusCode::CREATED, Json(CreateHorseResponse { horse_id })))
}

/// PATCH /api/v1/horses/:id
pub async fn handle_update_horse(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateHorseRequest>,
) -> Result<StatusCode, AppError> {
    let existing = store::get_horse(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Horse {id} not found")))?;

    let fields = apply_update(HorseFields::from(&existing), req)?;
    if !store::update_horse(&state.db, id, &fields).await? {
        return Err(AppError::NotFound(format!("Horse {id} not found")));
    }

    info!(user_id = %user.id, "Horse {id} updated");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/horses/:id
pub async fn handle_delete_horse(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !store::delete_horse(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Horse {id} not found")));
    }
    info!(user_id = %user.id, "Horse {id} deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn horse_card(horse: &HorseRow, events: &[VaccinationEvent], today: NaiveDate) -> HorseCard {
    HorseCard {
        id: horse.id,
        display_name: display_name(&horse.name, &horse.affixe),
        age_label: age_label(horse.birthdate, horse.birth_year, today),
        status: HorseStatus::compute(events, today),
    }
}

fn horse_detail(horse: HorseRow, events: &[VaccinationEvent], today: NaiveDate) -> HorseDetailResponse {
    HorseDetailResponse {
        today,
        display_name: display_name(&horse.name, &horse.affixe),
        age_label: age_label(horse.birthdate, horse.birth_year, today),
        status: HorseStatus::compute(events, today),
        history: DoseHistoryView {
            influenza: dose_history(events, VaccineType::Influenza),
            rhino: dose_history(events, VaccineType::Rhino),
        },
        horse,
    }
}

fn required(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("'{field}' is required")));
    }
    Ok(trimmed.to_string())
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// FULL keeps only the birthdate, YEAR only the birth year. Without a mode a
/// birthdate takes precedence over a year.
fn birth_fields(
    mode: Option<BirthMode>,
    birthdate: Option<NaiveDate>,
    birth_year: Option<i32>,
) -> (Option<NaiveDate>, Option<i32>) {
    match mode {
        Some(BirthMode::Full) => (birthdate, None),
        Some(BirthMode::Year) => (None, birth_year),
        None if birthdate.is_some() => (birthdate, None),
        None => (None, birth_year),
    }
}

/// Initial doses entered with a new horse. Entries with an unknown vaccine or an
/// unparseable date are dropped rather than failing the whole creation.
fn initial_doses(raw: &[InitialDose]) -> Vec<(VaccineType, NaiveDate)> {
    raw.iter()
        .filter_map(|dose| {
            let vaccine_type = match dose.vaccine_type.parse::<VaccineType>() {
                Ok(t) => t,
                Err(e) => {
                    warn!("Dropping initial dose: {e}");
                    return None;
                }
            };
            parse_dose_date(&dose.date).map(|date| (vaccine_type, date))
        })
        .collect()
}

fn apply_update(mut fields: HorseFields, req: UpdateHorseRequest) -> Result<HorseFields, AppError> {
    if let Some(name) = req.name {
        fields.name = required(&name, "name")?;
    }
    if let Some(affixe) = req.affixe {
        fields.affixe = required(&affixe, "affixe")?;
    }
    if req.sire.is_some() {
        fields.sire = clean_optional(req.sire);
    }
    if req.dam.is_some() {
        fields.dam = clean_optional(req.dam);
    }
    if req.dam_sire.is_some() {
        fields.dam_sire = clean_optional(req.dam_sire);
    }

    if req.birth_mode.is_some() {
        (fields.birthdate, fields.birth_year) =
            birth_fields(req.birth_mode, req.birthdate, req.birth_year);
    } else {
        if req.birthdate.is_some() {
            fields.birthdate = req.birthdate;
        }
        if req.birth_year.is_some() {
            fields.birth_year = req.birth_year;
        }
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::grouping::Bucket;
    use crate::schedule::due::DueStatus;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn fields() -> HorseFields {
        HorseFields {
            name: "Tornado".into(),
            affixe: "du Tricastin".into(),
            sire: Some("Quick Star".into()),
            dam: None,
            dam_sire: None,
            birthdate: Some(d(2015, 4, 2)),
            birth_year: None,
        }
    }

    fn horse_row() -> HorseRow {
        HorseRow {
            id: Uuid::new_v4(),
            name: "Bijou".into(),
            affixe: "de l'Étang".into(),
            sire: None,
            dam: None,
            dam_sire: None,
            birthdate: None,
            birth_year: Some(2018),
            created_at: chrono::Utc::now(),
        }
    }

    fn event(horse_id: Uuid, vaccine_type: VaccineType, date: NaiveDate) -> VaccinationEvent {
        VaccinationEvent {
            id: Uuid::new_v4(),
            horse_id,
            vaccine_type,
            date,
            note: None,
        }
    }

    #[test]
    fn test_birth_fields_follow_mode() {
        let bd = Some(d(2015, 4, 2));
        assert_eq!(birth_fields(Some(BirthMode::Full), bd, Some(2015)), (bd, None));
        assert_eq!(birth_fields(Some(BirthMode::Year), bd, Some(2015)), (None, Some(2015)));
        assert_eq!(birth_fields(None, bd, Some(2015)), (bd, None));
        assert_eq!(birth_fields(None, None, Some(2015)), (None, Some(2015)));
    }

    #[test]
    fn test_required_rejects_blank() {
        assert!(matches!(required("  ", "name"), Err(AppError::Validation(_))));
        assert_eq!(required("  Tornado ", "name").unwrap(), "Tornado");
    }

    #[test]
    fn test_initial_doses_drop_invalid_entries() {
        let raw = vec![
            InitialDose { vaccine_type: "INFLUENZA".into(), date: "2024-01-10".into() },
            InitialDose { vaccine_type: "RHINO".into(), date: "2024-13-01".into() },
            InitialDose { vaccine_type: "TETANUS".into(), date: "2024-01-10".into() },
            InitialDose { vaccine_type: "rhino".into(), date: "2024-02-01".into() },
        ];
        assert_eq!(
            initial_doses(&raw),
            vec![
                (VaccineType::Influenza, d(2024, 1, 10)),
                (VaccineType::Rhino, d(2024, 2, 1)),
            ]
        );
    }

    #[test]
    fn test_apply_update_is_partial() {
        let updated = apply_update(
            fields(),
            UpdateHorseRequest {
                dam: Some("Belle".into()),
                sire: Some("   ".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.name, "Tornado");
        assert_eq!(updated.dam.as_deref(), Some("Belle"));
        assert_eq!(updated.sire, None);
        assert_eq!(updated.birthdate, Some(d(2015, 4, 2)));
    }

    #[test]
    fn test_apply_update_switches_birth_mode() {
        let updated = apply_update(
            fields(),
            UpdateHorseRequest {
                birth_mode: Some(BirthMode::Year),
                birth_year: Some(2014),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.birthdate, None);
        assert_eq!(updated.birth_year, Some(2014));
    }

    #[test]
    fn test_apply_update_rejects_blank_name() {
        let result = apply_update(
            fields(),
            UpdateHorseRequest {
                name: Some(" ".into()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_horse_card_lands_in_rhino_todo() {
        let horse = horse_row();
        let today = d(2024, 6, 1);
        let events = vec![
            event(horse.id, VaccineType::Influenza, d(2023, 1, 1)),
            event(horse.id, VaccineType::Influenza, d(2023, 2, 1)),
            event(horse.id, VaccineType::Influenza, d(2024, 3, 1)),
        ];
        let card = horse_card(&horse, &events, today);
        assert_eq!(card.display_name, "Bijou de l'Étang");
        assert_eq!(card.age_label, "6 ans (né en 2018)");
        assert_eq!(card.status.influenza.status, DueStatus::UpToDate);
        assert_eq!(Bucket::classify(&card.status), Bucket::RhinoTodo);
    }

    #[test]
    fn test_horse_detail_history_split_by_vaccine() {
        let horse = horse_row();
        let id = horse.id;
        let events = vec![
            event(id, VaccineType::Rhino, d(2024, 1, 20)),
            event(id, VaccineType::Influenza, d(2024, 1, 10)),
            event(id, VaccineType::Rhino, d(2024, 1, 10)),
        ];
        let detail = horse_detail(horse, &events, d(2024, 7, 10));
        assert_eq!(detail.history.influenza.len(), 1);
        assert_eq!(detail.history.rhino.len(), 2);
        assert_eq!(detail.history.rhino[0].date, d(2024, 1, 20));
        assert_eq!(detail.history.rhino[0].dose_label, "Primo 2");
        assert_eq!(detail.status.rhino.status, DueStatus::DueSoon);
        assert_eq!(detail.status.influenza.status, DueStatus::Overdue);
        assert_eq!(detail.status.overall, DueStatus::Overdue);
    }

    #[test]
    fn test_list_response_serializes_buckets_and_counts() {
        let horse = horse_row();
        let card = horse_card(&horse, &[], d(2024, 6, 1));
        let buckets = group_by_bucket(vec![card], |c| &c.status);
        let body = serde_json::to_value(HorseListResponse {
            today: d(2024, 6, 1),
            counts: buckets.counts(),
            buckets,
        })
        .unwrap();
        assert_eq!(body["counts"]["ok"], 1);
        assert_eq!(body["ok"][0]["display_name"], "Bijou de l'Étang");
        assert_eq!(body["ok"][0]["overall"], "not_started");
        assert_eq!(body["ok"][0]["influenza"]["vaccine_type"], "INFLUENZA");
        assert!(body["urgent"].as_array().unwrap().is_empty());
    }
}
