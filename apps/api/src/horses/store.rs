use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::horse::HorseRow;
use crate::models::vaccination::{events_from_rows, VaccinationEvent, VaccinationRow, VaccineType};

/// Column values for a horse insert or full update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HorseFields {
    pub name: String,
    pub affixe: String,
    pub sire: Option<String>,
    pub dam: Option<String>,
    pub dam_sire: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub birth_year: Option<i32>,
}

impl From<&HorseRow> for HorseFields {
    fn from(row: &HorseRow) -> Self {
        HorseFields {
            name: row.name.clone(),
            affixe: row.affixe.clone(),
            sire: row.sire.clone(),
            dam: row.dam.clone(),
            dam_sire: row.dam_sire.clone(),
            birthdate: row.birthdate,
            birth_year: row.birth_year,
        }
    }
}

/// All horses, alphabetical by name.
pub async fn list_horses(pool: &PgPool) -> Result<Vec<HorseRow>> {
    Ok(
        sqlx::query_as::<_, HorseRow>("SELECT * FROM horses ORDER BY name ASC")
            .fetch_all(pool)
            .await?,
    )
}

pub async fn get_horse(pool: &PgPool, id: Uuid) -> Result<Option<HorseRow>> {
    Ok(
        sqlx::query_as::<_, HorseRow>("SELECT * FROM horses WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Inserts a horse and its initial doses in one transaction.
pub async fn insert_horse(
    pool: &PgPool,
    fields: &HorseFields,
    initial_doses: &[(VaccineType, NaiveDate)],
) -> Result<Uuid> {
    let mut tx = pool.begin().await?;

    let horse_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO horses (name, affixe, sire, dam, dam_sire, birthdate, birth_year)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(&fields.name)
    .bind(&fields.affixe)
    .bind(&fields.sire)
    .bind(&fields.dam)
    .bind(&fields.dam_sire)
    .bind(fields.birthdate)
    .bind(fields.birth_year)
    .fetch_one(&mut *tx)
    .await?;

    for (vaccine_type, date) in initial_doses {
        sqlx::query("INSERT INTO vaccinations (horse_id, vaccine_type, date) VALUES ($1, $2, $3)")
            .bind(horse_id)
            .bind(vaccine_type.as_str())
            .bind(date)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    info!(
        "Created horse {horse_id} with {} initial dose(s)",
        initial_doses.len()
    );
    Ok(horse_id)
}

/// Overwrites every editable column. Returns false when the horse does not exist.
pub async fn update_horse(pool: &PgPool, id: Uuid, fields: &HorseFields) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE horses
        SET name = $1, affixe = $2, sire = $3, dam = $4, dam_sire = $5,
            birthdate = $6, birth_year = $7
        WHERE id = $8
        "#,
    )
    .bind(&fields.name)
    .bind(&fields.affixe)
    .bind(&fields.sire)
    .bind(&fields.dam)
    .bind(&fields.dam_sire)
    .bind(fields.birthdate)
    .bind(fields.birth_year)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Deletes a horse; its vaccinations go with it (ON DELETE CASCADE).
pub async fn delete_horse(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM horses WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Vaccination events for the given horses.
pub async fn list_vaccinations(pool: &PgPool, horse_ids: &[Uuid]) -> Result<Vec<VaccinationEvent>> {
    if horse_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, VaccinationRow>(
        "SELECT * FROM vaccinations WHERE horse_id = ANY($1) ORDER BY date DESC",
    )
    .bind(horse_ids)
    .fetch_all(pool)
    .await?;

    Ok(events_from_rows(rows))
}

/// Buckets events by owning horse.
pub fn events_by_horse(events: Vec<VaccinationEvent>) -> HashMap<Uuid, Vec<VaccinationEvent>> {
    let mut by_horse: HashMap<Uuid, Vec<VaccinationEvent>> = HashMap::new();
    for event in events {
        by_horse.entry(event.horse_id).or_default().push(event);
    }
    by_horse
}
