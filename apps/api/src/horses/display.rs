use chrono::{Datelike, NaiveDate};

const UNNAMED: &str = "Sans nom";
const UNKNOWN_AGE: &str = "Âge inconnu";
const MIN_BIRTH_YEAR: i32 = 1900;

/// Name followed by the breeder's affixe, skipping blank parts.
pub fn display_name(name: &str, affixe: &str) -> String {
    let joined = [name.trim(), affixe.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        UNNAMED.to_string()
    } else {
        joined
    }
}

/// Age as shown on horse cards. A full birthdate wins; otherwise the birth year
/// gives an approximate age.
pub fn age_label(birthdate: Option<NaiveDate>, birth_year: Option<i32>, today: NaiveDate) -> String {
    if let Some(years) = birthdate.and_then(|b| today.years_since(b)) {
        return format!("{years} {}", plural_years(years as i64));
    }

    match birth_year {
        Some(year) if (MIN_BIRTH_YEAR..=today.year()).contains(&year) => {
            let years = (today.year() - year) as i64;
            format!("{years} {} (né en {year})", plural_years(years))
        }
        _ => UNKNOWN_AGE.to_string(),
    }
}

fn plural_years(years: i64) -> &'static str {
    if years > 1 {
        "ans"
    } else {
        "an"
    }
}
