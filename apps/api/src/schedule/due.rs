//! Due-date calculator for the national influenza / rhinopneumonitis protocol.
//!
//! Primary series and boosters are anchored on the most recent dose:
//! - 1 dose recorded  -> next dose one month later
//! - 2 doses recorded -> next dose six months later
//! - 3+ doses recorded -> yearly booster
//!
//! Calendar arithmetic goes through `NaiveDate::checked_add_months`, which clamps
//! to the last day of the target month (Jan 31 + 1 month = Feb 28 or 29).

use chrono::{Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Days before the due date during which a dose is reported as due soon.
pub const DUE_SOON_DAYS: i64 = 30;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueStatus {
    NotStarted,
    Overdue,
    DueSoon,
    UpToDate,
}

impl DueStatus {
    /// Lower rank means more urgent: overdue, due soon, not started, up to date.
    pub fn urgency_rank(self) -> u8 {
        match self {
            DueStatus::Overdue => 0,
            DueStatus::DueSoon => 1,
            DueStatus::NotStarted => 2,
            DueStatus::UpToDate => 3,
        }
    }

    /// Returns whichever of the two statuses is more urgent.
    pub fn most_urgent(self, other: DueStatus) -> DueStatus {
        if other.urgency_rank() < self.urgency_rank() {
            other
        } else {
            self
        }
    }

    /// Overdue and due-soon tracks are the ones that show up in the upcoming feed.
    pub fn has_deadline(self) -> bool {
        matches!(self, DueStatus::Overdue | DueStatus::DueSoon)
    }
}

/// The server's current calendar date. Handlers read it once per request and
/// pass it down so every calculation in a response agrees on "today".
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses a `YYYY-MM-DD` dose date. Invalid values yield `None` so callers can
/// drop them and carry on with the doses that did parse.
pub fn parse_dose_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            debug!("Ignoring invalid dose date {value:?}: {e}");
            None
        }
    }
}

/// Interval to the next dose given how many doses have been recorded so far.
pub fn protocol_interval(dose_count: usize) -> Option<Months> {
    match dose_count {
        0 => None,
        1 => Some(Months::new(1)),
        2 => Some(Months::new(6)),
        _ => Some(Months::new(12)),
    }
}

/// Next due date for one vaccine on one horse.
///
/// `doses` may be unsorted and may contain duplicates; only the most recent date
/// and the total count matter. Returns `None` when no dose has been recorded
/// (or if the date arithmetic would leave chrono's supported range).
pub fn next_due_date(doses: &[NaiveDate]) -> Option<NaiveDate> {
    let anchor = doses.iter().max()?;
    anchor.checked_add_months(protocol_interval(doses.len())?)
}

/// Classifies a due date relative to `today`.
///
/// Both sides are calendar dates, so the comparison is already at day
/// granularity and cannot flip with the time of day.
pub fn due_status(due: Option<NaiveDate>, today: NaiveDate) -> DueStatus {
    let Some(days) = days_until(due, today) else {
        return DueStatus::NotStarted;
    };

    if days < 0 {
        DueStatus::Overdue
    } else if days <= DUE_SOON_DAYS {
        DueStatus::DueSoon
    } else {
        DueStatus::UpToDate
    }
}

/// Whole days from `today` until `due` (negative once the date has passed).
pub fn days_until(due: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    due.map(|due| (due - today).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_no_doses_means_not_started() {
        assert_eq!(next_due_date(&[]), None);
        assert_eq!(due_status(None, d(2024, 6, 1)), DueStatus::NotStarted);
        assert_eq!(due_status(None, d(1999, 1, 1)), DueStatus::NotStarted);
    }

    #[test]
    fn test_single_dose_adds_one_month() {
        assert_eq!(next_due_date(&[d(2024, 3, 15)]), Some(d(2024, 4, 15)));
    }

    #[test]
    fn test_two_doses_add_six_months_from_latest() {
        // the earlier dose does not matter, even when given last
        assert_eq!(
            next_due_date(&[d(2024, 1, 20), d(2023, 2, 3)]),
            Some(d(2024, 7, 20))
        );
    }

    #[test]
    fn test_three_or_more_doses_add_one_year() {
        let doses = [d(2022, 1, 1), d(2022, 2, 1), d(2023, 1, 1)];
        assert_eq!(next_due_date(&doses), Some(d(2024, 1, 1)));

        let many = [d(2020, 5, 5), d(2021, 5, 5), d(2019, 1, 1), d(2022, 5, 5), d(2023, 5, 5)];
        assert_eq!(next_due_date(&many), Some(d(2024, 5, 5)));
    }

    #[test]
    fn test_duplicate_dates_count_as_doses() {
        let doses = [d(2024, 1, 10), d(2024, 1, 10)];
        assert_eq!(next_due_date(&doses), Some(d(2024, 7, 10)));
    }

    #[test]
    fn test_month_end_clamps_to_last_valid_day() {
        assert_eq!(next_due_date(&[d(2024, 1, 31)]), Some(d(2024, 2, 29)));
        assert_eq!(next_due_date(&[d(2023, 1, 31)]), Some(d(2023, 2, 28)));
        let leap = [d(2023, 1, 1), d(2023, 2, 1), d(2024, 2, 29)];
        assert_eq!(next_due_date(&leap), Some(d(2025, 2, 28)));
    }

    #[test]
    fn test_status_boundaries() {
        let today = d(2024, 6, 1);
        assert_eq!(due_status(Some(today), today), DueStatus::DueSoon);
        assert_eq!(due_status(Some(d(2024, 7, 1)), today), DueStatus::DueSoon); // +30
        assert_eq!(due_status(Some(d(2024, 7, 2)), today), DueStatus::UpToDate); // +31
        assert_eq!(due_status(Some(d(2024, 5, 31)), today), DueStatus::Overdue); // -1
    }

    #[test]
    fn test_status_monotonic_as_today_moves_back() {
        let due = Some(d(2024, 6, 1));
        let mut previous = due_status(due, d(2024, 9, 1));
        let mut today = d(2024, 9, 1);
        while today > d(2024, 1, 1) {
            today = today.pred_opt().unwrap();
            let current = due_status(due, today);
            assert!(
                current.urgency_rank() >= previous.urgency_rank(),
                "{previous:?} -> {current:?} at {today}"
            );
            previous = current;
        }
        assert_eq!(previous, DueStatus::UpToDate);
    }

    #[test]
    fn test_single_dose_scenario_overdue() {
        let due = next_due_date(&[d(2024, 1, 10)]);
        assert_eq!(due, Some(d(2024, 2, 10)));
        assert_eq!(due_status(due, d(2024, 2, 15)), DueStatus::Overdue);
        assert_eq!(days_until(due, d(2024, 2, 15)), Some(-5));
    }

    #[test]
    fn test_two_dose_scenario_due_soon() {
        let due = next_due_date(&[d(2024, 1, 10), d(2024, 1, 20)]);
        assert_eq!(due, Some(d(2024, 7, 20)));
        assert_eq!(days_until(due, d(2024, 7, 10)), Some(10));
        assert_eq!(due_status(due, d(2024, 7, 10)), DueStatus::DueSoon);
    }

    #[test]
    fn test_booster_scenario_overdue() {
        let due = next_due_date(&[d(2022, 1, 1), d(2022, 2, 1), d(2023, 1, 1)]);
        assert_eq!(due, Some(d(2024, 1, 1)));
        assert_eq!(due_status(due, d(2024, 6, 1)), DueStatus::Overdue);
    }

    #[test]
    fn test_parse_drops_invalid_dates() {
        let parsed: Vec<_> = ["2024-01-10", "not a date", "2024-02-30", " 2024-03-01 ", ""]
            .into_iter()
            .filter_map(parse_dose_date)
            .collect();
        assert_eq!(parsed, vec![d(2024, 1, 10), d(2024, 3, 1)]);
    }

    #[test]
    fn test_all_invalid_input_is_not_started() {
        let parsed: Vec<_> = ["", "31/12/2023"].into_iter().filter_map(parse_dose_date).collect();
        let due = next_due_date(&parsed);
        assert_eq!(due_status(due, d(2024, 1, 1)), DueStatus::NotStarted);
    }

    #[test]
    fn test_date_overflow_yields_none() {
        assert_eq!(next_due_date(&[NaiveDate::MAX]), None);
    }

    #[test]
    fn test_most_urgent_ordering() {
        use DueStatus::*;
        assert_eq!(UpToDate.most_urgent(Overdue), Overdue);
        assert_eq!(DueSoon.most_urgent(NotStarted), DueSoon);
        assert_eq!(NotStarted.most_urgent(UpToDate), NotStarted);
        assert_eq!(UpToDate.most_urgent(UpToDate), UpToDate);
        assert!(Overdue.has_deadline() && DueSoon.has_deadline());
        assert!(!NotStarted.has_deadline() && !UpToDate.has_deadline());
    }
}
