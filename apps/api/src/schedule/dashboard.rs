use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::vaccination::{VaccinationEvent, VaccineType};
use crate::schedule::due::DueStatus;
use crate::schedule::tracks::{dose_dates, HorseStatus};

/// Window used by the compliance counter, independent of the due-soon lookahead.
pub const COMPLIANCE_WINDOW: Months = Months::new(12);

/// One horse and its full vaccination history, as fetched from the store.
#[derive(Debug, Clone)]
pub struct HorseVaccinations {
    pub horse_id: Uuid,
    pub horse_name: String,
    pub events: Vec<VaccinationEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingEntry {
    pub horse_id: Uuid,
    pub horse_name: String,
    pub vaccine_type: VaccineType,
    pub due_date: NaiveDate,
    pub status: DueStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub today: NaiveDate,
    pub total_horses: usize,
    pub upcoming_count: usize,
    pub up_to_date_count: usize,
    pub up_to_date_percentage: f64,
    pub upcoming: Vec<UpcomingEntry>,
}

pub fn build_dashboard(horses: &[HorseVaccinations], today: NaiveDate) -> Dashboard {
    let mut upcoming = Vec::new();
    let mut up_to_date_count = 0;

    for horse in horses {
        let status = HorseStatus::compute(&horse.events, today);
        for vaccine_type in VaccineType::ALL {
            let track = status.track(vaccine_type);
            if !track.status.has_deadline() {
                continue;
            }
            if let Some(due_date) = track.next_due {
                upcoming.push(UpcomingEntry {
                    horse_id: horse.horse_id,
                    horse_name: horse.horse_name.clone(),
                    vaccine_type,
                    due_date,
                    status: track.status,
                });
            }
        }

        if vaccinated_within_year(&horse.events, today) {
            up_to_date_count += 1;
        }
    }

    sort_upcoming(&mut upcoming);

    let total_horses = horses.len();
    let up_to_date_percentage = if total_horses > 0 {
        up_to_date_count as f64 / total_horses as f64 * 100.0
    } else {
        0.0
    };

    Dashboard {
        today,
        total_horses,
        upcoming_count: upcoming.len(),
        up_to_date_count,
        up_to_date_percentage,
        upcoming,
    }
}

/// Overdue entries first, then due-soon; soonest due date first inside each group.
pub fn sort_upcoming(entries: &mut [UpcomingEntry]) {
    entries.sort_by(|a, b| {
        a.status
            .urgency_rank()
            .cmp(&b.status.urgency_rank())
            .then_with(|| a.due_date.cmp(&b.due_date))
    });
}

/// Compliance check for the headline counter: both vaccines have a dose, and the
/// latest dose of each is less than twelve months old. Does not look at the
/// protocol due date at all.
pub fn vaccinated_within_year(events: &[VaccinationEvent], today: NaiveDate) -> bool {
    VaccineType::ALL.iter().all(|vaccine_type| {
        dose_dates(events, *vaccine_type)
            .into_iter()
            .max()
            .and_then(|last| last.checked_add_months(COMPLIANCE_WINDOW))
            .is_some_and(|window_end| today < window_end)
    })
}
