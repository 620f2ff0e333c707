use axum::{extract::State, Json};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::horses::display::display_name;
use crate::horses::store;
use crate::schedule::dashboard::{build_dashboard, Dashboard, HorseVaccinations};
use crate::schedule::due::today;
use crate::state::AppState;

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Dashboard>, AppError> {
    let horses = store::list_horses(&state.db).await?;
    let ids: Vec<Uuid> = horses.iter().map(|h| h.id).collect();
    let mut events = store::events_by_horse(store::list_vaccinations(&state.db, &ids).await?);

    let stable: Vec<HorseVaccinations> = horses
        .into_iter()
        .map(|horse| HorseVaccinations {
            horse_id: horse.id,
            horse_name: display_name(&horse.name, &horse.affixe),
            events: events.remove(&horse.id).unwrap_or_default(),
        })
        .collect();

    Ok(Json(build_dashboard(&stable, today())))
}
