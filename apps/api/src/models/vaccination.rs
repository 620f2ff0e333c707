use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The two vaccines covered by the national protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VaccineType {
    Influenza,
    Rhino,
}

impl VaccineType {
    pub const ALL: [VaccineType; 2] = [VaccineType::Influenza, VaccineType::Rhino];

    /// Value stored in the `vaccinations.vaccine_type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            VaccineType::Influenza => "INFLUENZA",
            VaccineType::Rhino => "RHINO",
        }
    }

    /// Short label shown to stable staff.
    pub fn label(self) -> &'static str {
        match self {
            VaccineType::Influenza => "Grippe",
            VaccineType::Rhino => "Rhino",
        }
    }
}

impl fmt::Display for VaccineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VaccineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            // GRIPPE is the legacy column value for influenza
            "INFLUENZA" | "GRIPPE" => Ok(VaccineType::Influenza),
            "RHINO" => Ok(VaccineType::Rhino),
            other => Err(format!("Unknown vaccine type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VaccinationRow {
    pub id: Uuid,
    pub horse_id: Uuid,
    pub vaccine_type: String,
    pub date: NaiveDate,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A single administered dose with its vaccine type resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccinationEvent {
    pub id: Uuid,
    pub horse_id: Uuid,
    pub vaccine_type: VaccineType,
    pub date: NaiveDate,
    pub note: Option<String>,
}

impl TryFrom<VaccinationRow> for VaccinationEvent {
    type Error = String;

    fn try_from(row: VaccinationRow) -> Result<Self, Self::Error> {
        Ok(VaccinationEvent {
            id: row.id,
            horse_id: row.horse_id,
            vaccine_type: row.vaccine_type.parse()?,
            date: row.date,
            note: row.note,
        })
    }
}

/// Converts stored rows to events, dropping rows whose vaccine type is not recognised.
pub fn events_from_rows(rows: Vec<VaccinationRow>) -> Vec<VaccinationEvent> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match VaccinationEvent::try_from(row) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!("Skipping vaccination {id}: {e}");
                    None
                }
            }
        })
        .collect()
}
