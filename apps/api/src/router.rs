use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use doctor_cell::router::doctor_routes;
use shared_database::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic scheduling API is running!" }))
        .nest("/api", doctor_routes(state.clone()).merge(appointment_routes(state)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use tower::ServiceExt;

    #[tokio::test]
    async fn root_and_api_routes_are_mounted() {
        let router = create_router(AppState::in_memory());

        let root = router
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(root.status(), StatusCode::OK);

        let doctors = router
            .oneshot(Request::builder().uri("/api/doctors").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(doctors.status(), StatusCode::OK);
    }
}
