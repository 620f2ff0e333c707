use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::vaccination::{VaccinationEvent, VaccineType};
use crate::schedule::due::{days_until, due_status, next_due_date, DueStatus};

/// Status of one vaccine on one horse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccineTrack {
    pub vaccine_type: VaccineType,
    pub label: String,
    pub last_date: Option<NaiveDate>,
    pub next_due: Option<NaiveDate>,
    pub status: DueStatus,
    pub dose_count: usize,
    pub kind: String,
    pub days_until: Option<i64>,
}

impl VaccineTrack {
    pub fn compute(vaccine_type: VaccineType, doses: &[NaiveDate], today: NaiveDate) -> Self {
        let next_due = next_due_date(doses);
        VaccineTrack {
            vaccine_type,
            label: vaccine_type.label().to_string(),
            last_date: doses.iter().max().copied(),
            next_due,
            status: due_status(next_due, today),
            dose_count: doses.len(),
            kind: dose_kind_label(doses.len()),
            days_until: days_until(next_due, today),
        }
    }

    pub fn has_doses(&self) -> bool {
        self.dose_count > 0
    }
}

/// Both vaccine tracks for a horse plus the most urgent of the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorseStatus {
    pub influenza: VaccineTrack,
    pub rhino: VaccineTrack,
    pub overall: DueStatus,
    pub needs_action: bool,
}

impl HorseStatus {
    /// Builds both tracks from a horse's events. Events for other horses are not
    /// filtered out here; callers pass one horse's history.
    pub fn compute(events: &[VaccinationEvent], today: NaiveDate) -> Self {
        let influenza = VaccineTrack::compute(
            VaccineType::Influenza,
            &dose_dates(events, VaccineType::Influenza),
            today,
        );
        let rhino = VaccineTrack::compute(
            VaccineType::Rhino,
            &dose_dates(events, VaccineType::Rhino),
            today,
        );
        let overall = influenza.status.most_urgent(rhino.status);
        let needs_action = [influenza.status, rhino.status]
            .iter()
            .any(|s| *s != DueStatus::UpToDate);

        HorseStatus {
            influenza,
            rhino,
            overall,
            needs_action,
        }
    }

    pub fn track(&self, vaccine_type: VaccineType) -> &VaccineTrack {
        match vaccine_type {
            VaccineType::Influenza => &self.influenza,
            VaccineType::Rhino => &self.rhino,
        }
    }
}

/// Dose dates for one vaccine type, in whatever order the events came in.
pub fn dose_dates(events: &[VaccinationEvent], vaccine_type: VaccineType) -> Vec<NaiveDate> {
    events
        .iter()
        .filter(|e| e.vaccine_type == vaccine_type)
        .map(|e| e.date)
        .collect()
}

/// "Primo 1".."Primo 3" for the primary series, then "Rappel n" for boosters.
/// Used both for a track's dose count and for a dose's chronological position.
pub fn dose_kind_label(n: usize) -> String {
    match n {
        0 => "—".to_string(),
        1..=3 => format!("Primo {n}"),
        _ => format!("Rappel {}", n - 3),
    }
}

/// One entry in a horse's dose history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoseEntry {
    pub id: uuid::Uuid,
    pub date: NaiveDate,
    pub note: Option<String>,
    pub dose_label: String,
}

/// History for one vaccine, most recent first, each dose labelled by its
/// chronological position.
pub fn dose_history(events: &[VaccinationEvent], vaccine_type: VaccineType) -> Vec<DoseEntry> {
    let mut of_type: Vec<&VaccinationEvent> = events
        .iter()
        .filter(|e| e.vaccine_type == vaccine_type)
        .collect();
    // oldest first so the index is the dose number; id keeps same-day doses stable
    of_type.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

    of_type
        .into_iter()
        .enumerate()
        .map(|(i, e)| DoseEntry {
            id: e.id,
            date: e.date,
            note: e.note.clone(),
            dose_label: dose_kind_label(i + 1),
        })
        .rev()
        .collect()
}
