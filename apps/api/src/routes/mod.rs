pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::horses::handlers as horses;
use crate::schedule::handlers as schedule;
use crate::state::AppState;
use crate::vaccinations::handlers as vaccinations;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/dashboard", get(schedule::handle_dashboard))
        // Horses
        .route(
            "/api/v1/horses",
            get(horses::handle_list_horses).post(horses::handle_create_horse),
        )
        .route(
            "/api/v1/horses/:id",
            get(horses::handle_get_horse)
                .patch(horses::handle_update_horse)
                .delete(horses::handle_delete_horse),
        )
        .route(
            "/api/v1/horses/:id/vaccinations/today",
            post(vaccinations::handle_done_today),
        )
        // Vaccinations
        .route(
            "/api/v1/vaccinations",
            post(vaccinations::handle_create_vaccination),
        )
        .route(
            "/api/v1/vaccinations/:id",
            patch(vaccinations::handle_update_vaccination)
                .delete(vaccinations::handle_delete_vaccination),
        )
        .with_state(state)
}
