use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::error::AppError;

use crate::models::{AvailableSlotsRequest, AvailableSlotsResponse, CreateDoctorRequest};
use crate::services::{availability::AvailabilityService, doctor::DoctorService};

// ==============================================================================
// DOCTOR REGISTRY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<AppState>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::from_state(&state);

    let doctor = doctor_service.create_doctor(request).await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<AppState>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::from_state(&state);

    let doctor = doctor_service.get_doctor(doctor_id).await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::from_state(&state);

    let doctors = doctor_service.list_doctors().await?;

    Ok(Json(json!(doctors)))
}

// ==============================================================================
// AVAILABILITY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn available_slots(
    State(state): State<AppState>,
    Json(request): Json<AvailableSlotsRequest>,
) -> Result<Json<AvailableSlotsResponse>, AppError> {
    let doctor = DoctorService::from_state(&state).get_doctor(request.doctor_id).await?;
    let availability_service = AvailabilityService::from_state(&state);

    let slots = availability_service.compute_available_slots(
        &doctor,
        request.date_iso,
        &request.appt_type,
        request.timezone.as_deref(),
    ).await?;

    Ok(Json(AvailableSlotsResponse {
        slots: slots.into_iter().map(|slot| slot.fixed_offset()).collect(),
    }))
}
