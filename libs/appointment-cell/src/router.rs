// libs/appointment-cell/src/router.rs
use axum::{
    Router,
    routing::{get, post},
};

use shared_database::AppState;

use crate::handlers;

pub fn appointment_routes(state: AppState) -> Router {
    Router::new()
        .route("/appointments", post(handlers::create_appointment))
        .route("/appointments/conflicts/check", get(handlers::check_conflicts))
        .route("/appointments/{doctor_id}", get(handlers::list_appointments))
        .with_state(state)
}
