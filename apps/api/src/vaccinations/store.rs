use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::vaccination::{VaccinationEvent, VaccinationRow, VaccineType};

pub struct NewVaccination<'a> {
    pub horse_id: Uuid,
    pub vaccine_type: VaccineType,
    pub date: NaiveDate,
    pub note: Option<&'a str>,
}

pub async fn insert_vaccination(pool: &PgPool, new: NewVaccination<'_>) -> Result<VaccinationEvent> {
    let row = sqlx::query_as::<_, VaccinationRow>(
        r#"
        INSERT INTO vaccinations (horse_id, vaccine_type, date, note)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(new.horse_id)
    .bind(new.vaccine_type.as_str())
    .bind(new.date)
    .bind(new.note)
    .fetch_one(pool)
    .await?;

    info!(
        "Logged {} dose for horse {} on {}",
        new.vaccine_type, new.horse_id, new.date
    );
    to_event(row)
}

/// Date correction. Returns `None` when the row does not exist.
pub async fn update_vaccination_date(
    pool: &PgPool,
    id: Uuid,
    date: NaiveDate,
) -> Result<Option<VaccinationEvent>> {
    let row = sqlx::query_as::<_, VaccinationRow>(
        "UPDATE vaccinations SET date = $1 WHERE id = $2 RETURNING *",
    )
    .bind(date)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(to_event).transpose()
}

pub async fn delete_vaccination(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM vaccinations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn horse_exists(pool: &PgPool, horse_id: Uuid) -> Result<bool> {
    Ok(
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM horses WHERE id = $1)")
            .bind(horse_id)
            .fetch_one(pool)
            .await?,
    )
}

fn to_event(row: VaccinationRow) -> Result<VaccinationEvent> {
    VaccinationEvent::try_from(row).map_err(anyhow::Error::msg)
}
