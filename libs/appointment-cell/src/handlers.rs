// libs/appointment-cell/src/handlers.rs
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::{AppState, SchedulingStore};
use shared_models::error::AppError;
use shared_models::SchedulingError;

use crate::models::{
    parse_date_iso, parse_start_at, AppointmentListQuery, ConflictCheckQuery,
    ConflictCheckResponse, CreateAppointmentRequest,
};
use crate::services::{
    booking::AppointmentBookingService, conflict::ConflictDetectionService,
    query::AppointmentQueryService,
};

// ==============================================================================
// APPOINTMENT BOOKING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor = state
        .store
        .get_doctor(request.doctor_id)
        .await
        .map_err(SchedulingError::from)?
        .ok_or_else(|| AppError::NotFound("Doctor not found".to_string()))?;

    let start_at = parse_start_at(&request.start_at)?;

    let booking_service = AppointmentBookingService::from_state(&state);
    let appointment = booking_service
        .create_appointment_with_checks(&doctor, start_at, &request.appt_type, request.patient_name)
        .await?;

    Ok(Json(json!(appointment)))
}

// ==============================================================================
// APPOINTMENT QUERY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<AppState>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Value>, AppError> {
    let date = query
        .date_iso
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(parse_date_iso)
        .transpose()?;

    let query_service = AppointmentQueryService::from_state(&state);
    let appointments = query_service.list_for_doctor(doctor_id, date).await?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn check_conflicts(
    State(state): State<AppState>,
    Query(query): Query<ConflictCheckQuery>,
) -> Result<Json<ConflictCheckResponse>, AppError> {
    let conflict_service = ConflictDetectionService::new(state.store.clone());

    let response = conflict_service
        .check_conflicts(query.doctor_id, query.start_at, query.end_at)
        .await?;

    Ok(Json(response))
}
