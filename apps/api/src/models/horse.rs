use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HorseRow {
    pub id: Uuid,
    pub name: String,
    pub affixe: String,
    pub sire: Option<String>,
    pub dam: Option<String>,
    pub dam_sire: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub birth_year: Option<i32>,
    pub created_at: DateTime<Utc>,
}
